use std::sync::mpsc::TryRecvError;

use eframe::egui::{self, Align, Context, Layout, Vec2};
use tracing::info;

use crate::atlas::{Metric, NavigationRequest, SelectionController, SimilarityMatrix};
use crate::data::{DataSource, Dataset, LoadCache, LoadState};

use super::super::{AtlasData, ViewModel, spawn_matrix_load};

impl ViewModel {
    pub(in crate::app) const INITIAL_RANKING_ROWS: usize = 20;
    pub(in crate::app) const RANKING_PAGE_ROWS: usize = 20;
    pub(in crate::app) const RANKING_PREFETCH_MARGIN: usize = 4;
    const CLOSEST_PAIR_LIMIT: usize = 12;

    pub(in crate::app) fn new(dataset: Dataset, source: DataSource) -> Self {
        let Dataset {
            nodes,
            rates,
            metric,
            matrix,
        } = dataset;

        let mut matrices = LoadCache::new();
        matrices.insert_loaded(metric, matrix);

        let data = AtlasData {
            source,
            nodes,
            rates,
            metric,
            matrices,
            pending_matrices: Vec::new(),
            no_data: SimilarityMatrix::new(),
        };
        let controller = SelectionController::new(data.inputs());
        let closest_pairs = data.matrix().closest_pairs(Self::CLOSEST_PAIR_LIMIT);

        Self {
            data,
            controller,
            search: String::new(),
            pan: Vec2::ZERO,
            zoom: 1.0,
            comparison: None,
            closest_pairs,
            ranking_rows_visible: Self::INITIAL_RANKING_ROWS,
            show_labels: true,
            hovered_arc: None,
        }
    }

    pub(in crate::app) fn show(&mut self, ctx: &Context, reload_requested: &mut bool, is_loading: bool) {
        self.poll_matrix_loads(ctx);

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Syntax Atlas");
                    ui.separator();
                    ui.label(format!("data: {}", self.data.source.data_dir.display()));
                    ui.label(format!("metric: {}", self.data.metric.label()));
                    ui.label(format!("languages: {}", self.data.nodes.primaries().count()));
                    ui.label(format!("nodes: {}", self.data.nodes.len()));
                    ui.label(format!(
                        "matrices: {}/{}",
                        self.data.matrices.loaded_entries().count(),
                        Metric::ALL.len()
                    ));
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload data"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    if ui.button("Reset view").clicked() {
                        self.pan = Vec2::ZERO;
                        self.zoom = 1.0;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(self.visible_graph_text());
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(360.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Reloading similarity atlas...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_map(ui);
            }
        });

        self.draw_comparison(ctx);
    }

    fn visible_graph_text(&self) -> String {
        let graph = self.controller.graph();
        let mut text = format!(
            "points {}  |  similarity arcs {}  |  variant links {}",
            graph.points.len(),
            graph.similarity_arcs().count(),
            graph.same_language_arcs().count()
        );
        if matches!(self.data.matrices.state(&self.data.metric), LoadState::Loading) {
            text.push_str("  |  loading matrix...");
        }
        text
    }

    pub(in crate::app) fn select_node(&mut self, code: &str) {
        self.controller.click_node(code, self.data.inputs());
        self.ranking_rows_visible = Self::INITIAL_RANKING_ROWS;
    }

    /// Selects `code` unless it already is the selection.
    pub(in crate::app) fn focus_node(&mut self, code: &str) {
        if self.controller.selected_code() != Some(code) {
            self.select_node(code);
        }
    }

    pub(in crate::app) fn clear_selection(&mut self) {
        self.controller.clear(self.data.inputs());
    }

    pub(in crate::app) fn open_comparison(&mut self, request: NavigationRequest) {
        info!(route = %request.route(), "comparison requested");
        self.comparison = Some(request);
    }

    pub(in crate::app) fn switch_metric(&mut self, metric: Metric) {
        if self.data.metric == metric {
            return;
        }

        self.data.metric = metric;
        self.request_matrix(metric);
        self.refresh_graph();
    }

    /// Starts a background load for `metric` unless it is cached, in flight or failed.
    pub(in crate::app) fn request_matrix(&mut self, metric: Metric) {
        if self.data.matrices.begin(metric) {
            self.spawn_matrix(metric);
        }
    }

    pub(in crate::app) fn retry_matrix(&mut self, metric: Metric) {
        if self.data.matrices.retry(&metric) {
            self.spawn_matrix(metric);
        }
    }

    fn spawn_matrix(&mut self, metric: Metric) {
        let data = &mut self.data;
        data.pending_matrices
            .push((metric, spawn_matrix_load(data.source.clone(), metric)));
    }

    pub(in crate::app) fn reload_matrix(&mut self, metric: Metric) {
        self.data.matrices.invalidate(&metric);
        self.request_matrix(metric);
        if metric == self.data.metric {
            self.refresh_graph();
        }
    }

    fn refresh_graph(&mut self) {
        self.controller.refresh(self.data.inputs());
        self.closest_pairs = self
            .data
            .matrix()
            .closest_pairs(Self::CLOSEST_PAIR_LIMIT);
        self.hovered_arc = None;
    }

    fn poll_matrix_loads(&mut self, ctx: &Context) {
        if self.data.pending_matrices.is_empty() {
            return;
        }

        let mut active_changed = false;
        let pending = std::mem::take(&mut self.data.pending_matrices);
        for (metric, rx) in pending {
            let result = match rx.try_recv() {
                Ok(result) => result,
                Err(TryRecvError::Empty) => {
                    self.data.pending_matrices.push((metric, rx));
                    continue;
                }
                Err(TryRecvError::Disconnected) => {
                    Err("Background matrix worker disconnected".to_owned())
                }
            };

            self.data.matrices.finish(metric, result);
            active_changed |= metric == self.data.metric;
        }

        if active_changed {
            self.refresh_graph();
        }
        if !self.data.pending_matrices.is_empty() {
            ctx.request_repaint();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::atlas::{HeadDirectionRates, Metric, NodeRegistry, SimilarityMatrix};
    use crate::data::{DataSource, Dataset, LoadState};

    use super::super::super::ViewModel;

    fn view_model() -> ViewModel {
        let dataset = Dataset {
            nodes: NodeRegistry::builtin().unwrap(),
            rates: HeadDirectionRates::default(),
            metric: Metric::Upos,
            matrix: SimilarityMatrix::new(),
        };
        let source = DataSource {
            data_dir: PathBuf::from("missing-results-dir"),
            nodes_path: None,
        };
        ViewModel::new(dataset, source)
    }

    #[test]
    fn switching_to_a_failed_metric_keeps_the_failure() {
        let mut model = view_model();
        assert!(model.data.matrices.begin(Metric::Deprel));
        model
            .data
            .matrices
            .finish(Metric::Deprel, Err("unreadable".to_owned()));

        model.switch_metric(Metric::Deprel);
        assert_eq!(model.data.metric, Metric::Deprel);
        assert_eq!(
            model.data.matrices.state(&Metric::Deprel),
            &LoadState::Failed("unreadable".to_owned())
        );
        assert!(model.data.pending_matrices.is_empty());

        model.retry_matrix(Metric::Deprel);
        assert_eq!(model.data.matrices.state(&Metric::Deprel), &LoadState::Loading);
        assert_eq!(model.data.pending_matrices.len(), 1);
    }

    #[test]
    fn switching_to_an_absent_metric_starts_one_load() {
        let mut model = view_model();
        model.switch_metric(Metric::Phrase);
        model.request_matrix(Metric::Phrase);
        assert_eq!(model.data.matrices.state(&Metric::Phrase), &LoadState::Loading);
        assert_eq!(model.data.pending_matrices.len(), 1);
    }
}
