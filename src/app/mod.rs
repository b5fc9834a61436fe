use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Vec2};

use crate::atlas::{
    GraphInputs, HeadDirectionRates, LanguagePair, Metric, NavigationRequest, NodeRegistry,
    SelectionController, SimilarityMatrix,
};
use crate::data::{DataSource, Dataset, LoadCache, collect_dataset, load_matrix};

mod map;
mod render_utils;
mod ui;

pub struct AtlasApp {
    source: DataSource,
    metric: Metric,
    state: AppState,
    reload_rx: Option<Receiver<Result<Dataset, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<Dataset, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

/// Loaded inputs of the atlas. Matrices other than the startup metric are
/// fetched lazily through the load cache.
struct AtlasData {
    source: DataSource,
    nodes: NodeRegistry,
    rates: HeadDirectionRates,
    metric: Metric,
    matrices: LoadCache<Metric, SimilarityMatrix>,
    pending_matrices: Vec<(Metric, Receiver<Result<SimilarityMatrix, String>>)>,
    no_data: SimilarityMatrix,
}

impl AtlasData {
    fn matrix(&self) -> &SimilarityMatrix {
        self.matrices.loaded(&self.metric).unwrap_or(&self.no_data)
    }

    fn inputs(&self) -> GraphInputs<'_> {
        GraphInputs {
            nodes: &self.nodes,
            matrix: self.matrix(),
        }
    }
}

struct ViewModel {
    data: AtlasData,
    controller: SelectionController,
    search: String,
    pan: Vec2,
    zoom: f32,
    comparison: Option<NavigationRequest>,
    closest_pairs: Vec<LanguagePair>,
    ranking_rows_visible: usize,
    show_labels: bool,
    hovered_arc: Option<usize>,
}

fn spawn_load(source: DataSource, metric: Metric) -> Receiver<Result<Dataset, String>> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let result = collect_dataset(&source, metric).map_err(|error| format!("{error:#}"));
        let _ = tx.send(result);
    });

    rx
}

fn spawn_matrix_load(source: DataSource, metric: Metric) -> Receiver<Result<SimilarityMatrix, String>> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let result = load_matrix(&source, metric).map_err(|error| format!("{error:#}"));
        let _ = tx.send(result);
    });

    rx
}

/// Next state for a pending load, or `None` while the worker is still running.
fn loading_transition(
    received: Result<Result<Dataset, String>, TryRecvError>,
    source: &DataSource,
) -> Option<AppState> {
    match received {
        Ok(Ok(dataset)) => Some(AppState::Ready(Box::new(ViewModel::new(
            dataset,
            source.clone(),
        )))),
        Ok(Err(error)) => Some(AppState::Error(error)),
        Err(TryRecvError::Empty) => None,
        Err(TryRecvError::Disconnected) => Some(AppState::Error(
            "Background load worker disconnected".to_owned(),
        )),
    }
}

impl AtlasApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, source: DataSource, metric: Metric) -> Self {
        let state = Self::start_load(source.clone(), metric);
        Self {
            source,
            metric,
            state,
            reload_rx: None,
        }
    }

    fn start_load(source: DataSource, metric: Metric) -> AppState {
        AppState::Loading {
            rx: spawn_load(source, metric),
        }
    }
}

impl eframe::App for AtlasApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                transition = loading_transition(rx.try_recv(), &self.source);
                if transition.is_none() {
                    ctx.request_repaint();
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading similarity atlas...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the similarity atlas");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.source.clone(), self.metric));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &mut reload_requested, is_reloading);
                self.metric = model.data.metric;

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(spawn_load(self.source.clone(), self.metric));
                }

                if let Some(rx) = self.reload_rx.take() {
                    transition = loading_transition(rx.try_recv(), &self.source);
                    if transition.is_none() {
                        self.reload_rx = Some(rx);
                        ctx.request_repaint();
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
