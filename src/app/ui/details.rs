use eframe::egui::{self, Context, RichText, Ui};

use crate::atlas::{Metric, WORD_ORDER_KEY, categorize};
use crate::util::{format_distance, format_percent, format_rate};

use super::super::ViewModel;

const RATE_PROFILE_HEIGHT: f32 = 220.0;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        let Some(selected_code) = self.controller.selected_code().map(str::to_owned) else {
            ui.label("Click a language on the map or pick one from the search results.");
            return;
        };

        let Some(summary) = self.controller.details(&self.data.nodes, &self.data.rates) else {
            ui.label(format!(
                "{selected_code} is not linked to a language with similarity data."
            ));
            return;
        };

        ui.label(RichText::new(&summary.display_name).strong());
        if summary.localized_name != summary.display_name {
            ui.label(summary.localized_name.as_str());
        }
        if summary.code != selected_code {
            ui.small(format!("variant {selected_code} of {}", summary.code));
        } else {
            ui.small(summary.code.as_str());
        }
        if summary.non_standard_corpus {
            ui.small("Not based on the parallel PUD corpus.");
        }

        ui.separator();
        ui.label(RichText::new("Word order").strong());
        if self.data.rates.is_empty() {
            ui.small("No head-direction rates loaded.");
        }
        ui.label(format!(
            "Head-initial rate ({WORD_ORDER_KEY}): {}",
            summary.rate.map(format_rate).unwrap_or_else(|| "n/a".to_owned())
        ));
        ui.label(format!("Classification: {}", summary.direction));

        let mut picked = None;
        if !summary.similar.is_empty() {
            ui.add_space(4.0);
            ui.label("Similar word order:");
            for similar in &summary.similar {
                let label = format!(
                    "{}  {}  (Δ {})",
                    similar.display_name,
                    format_rate(similar.rate),
                    format_rate(similar.difference)
                );
                if ui.link(label).clicked() {
                    picked = Some(similar.code.clone());
                }
            }
        }

        let profile = self.data.rates.profile(&summary.display_name);
        if !profile.is_empty() {
            ui.add_space(4.0);
            egui::CollapsingHeader::new(format!("Head-direction profile ({})", profile.len()))
                .default_open(false)
                .show(ui, |ui| {
                    egui::ScrollArea::vertical()
                        .id_salt("rate_profile_scroll")
                        .max_height(RATE_PROFILE_HEIGHT)
                        .show(ui, |ui| {
                            for (key, rate) in &profile {
                                ui.label(format!("{key}: {}", format_percent(*rate)));
                            }
                        });
                });
        }

        ui.separator();
        ui.label(RichText::new(format!("Nearest languages ({})", self.data.metric.label())).strong());
        if let Some(code) = self.draw_ranking(ui) {
            picked = Some(code);
        }

        if let Some(code) = picked {
            self.focus_node(&code);
        }
    }

    fn draw_ranking(&mut self, ui: &mut Ui) -> Option<String> {
        let ranking = self.controller.ranking(self.data.inputs());
        if ranking.is_empty() {
            ui.label("No distances recorded for this language.");
            return None;
        }

        let row_count = ranking.len().min(self.ranking_rows_visible);
        let mut should_load_more = false;
        let mut picked = None;

        egui::ScrollArea::vertical()
            .id_salt("ranking_scroll")
            .max_height(320.0)
            .auto_shrink([false, false])
            .show_rows(ui, 22.0, row_count, |ui, row_range| {
                if row_range.end + Self::RANKING_PREFETCH_MARGIN >= row_count {
                    should_load_more = true;
                }

                for index in row_range {
                    let Some(entry) = ranking.get(index) else {
                        continue;
                    };
                    let label = format!(
                        "{}. {}  {}  ({} similar)",
                        index + 1,
                        entry.display_name,
                        format_distance(entry.distance),
                        format_percent(entry.similarity)
                    );
                    if ui
                        .link(label)
                        .on_hover_text(categorize(entry.distance).label())
                        .clicked()
                    {
                        picked = Some(entry.code.clone());
                    }
                }
            });

        if should_load_more && row_count < ranking.len() {
            self.ranking_rows_visible = (row_count + Self::RANKING_PAGE_ROWS).min(ranking.len());
        }

        picked
    }

    pub(in crate::app) fn draw_comparison(&mut self, ctx: &Context) {
        let Some(request) = self.comparison.clone() else {
            return;
        };

        let names = [&request.from_code, &request.to_code].map(|code| {
            self.data
                .nodes
                .get(code)
                .map(|node| node.display_name.clone())
                .unwrap_or_else(|| code.clone())
        });

        let mut open = true;
        egui::Window::new(format!("{} ↔ {}", names[0], names[1]))
            .id(egui::Id::new("comparison_window"))
            .open(&mut open)
            .resizable(false)
            .collapsible(false)
            .show(ctx, |ui| {
                ui.small(request.route());
                ui.add_space(4.0);

                egui::Grid::new("comparison_grid")
                    .num_columns(3)
                    .striped(true)
                    .show(ui, |ui| {
                        for metric in Metric::ALL {
                            ui.label(metric.label());
                            match self
                                .data
                                .matrices
                                .loaded(&metric)
                                .and_then(|matrix| matrix.distance(&names[0], &names[1]))
                            {
                                Some(distance) => {
                                    ui.label(format_distance(distance));
                                    ui.label(categorize(distance).label());
                                }
                                None if self.data.matrices.loaded(&metric).is_some() => {
                                    ui.label("n/a");
                                    ui.label("");
                                }
                                None => {
                                    ui.label("not loaded");
                                    ui.label("");
                                }
                            }
                            ui.end_row();
                        }
                    });

                ui.add_space(6.0);
                if ui.button("Load all metrics").clicked() {
                    for metric in Metric::ALL {
                        self.request_matrix(metric);
                    }
                }
            });

        if !open {
            self.comparison = None;
        }
    }
}
