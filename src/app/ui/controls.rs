use eframe::egui::{self, Key, RichText, Sense, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::atlas::{DistanceCategory, DistanceFilter, Metric, arc_color};
use crate::data::LoadState;
use crate::util::format_distance;

use super::super::ViewModel;
use super::super::render_utils::to_color32;

const SEARCH_RESULT_LIMIT: usize = 8;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Atlas Controls");
        ui.separator();
        ui.add_space(4.0);

        self.draw_metric_picker(ui);
        ui.separator();
        self.draw_search(ui);
        ui.separator();
        self.draw_filter(ui);
        ui.separator();

        ui.checkbox(&mut self.show_labels, "Show language labels")
            .on_hover_text("Draw names next to primary languages on the map.");
        let clear = ui.add_enabled(
            self.controller.selected_code().is_some(),
            egui::Button::new("Clear selection"),
        );
        if clear.clicked() {
            self.clear_selection();
        }

        ui.separator();
        egui::CollapsingHeader::new("Closest pairs")
            .default_open(true)
            .show(ui, |ui| self.draw_closest_pairs(ui));
    }

    fn draw_metric_picker(&mut self, ui: &mut Ui) {
        ui.label("Distance metric");

        let mut metric = self.data.metric;
        egui::ComboBox::from_id_salt("metric_picker")
            .selected_text(metric.label())
            .show_ui(ui, |ui| {
                for candidate in Metric::ALL {
                    ui.selectable_value(&mut metric, candidate, candidate.label());
                }
            });
        if metric != self.data.metric {
            self.switch_metric(metric);
        }

        match self.data.matrices.state(&self.data.metric) {
            LoadState::Loading => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading matrix...");
                });
            }
            LoadState::Failed(error) => {
                let error = error.clone();
                ui.colored_label(ui.visuals().error_fg_color, error);
                if ui.button("Retry").clicked() {
                    self.retry_matrix(self.data.metric);
                }
            }
            LoadState::Loaded(matrix) => {
                if matrix.is_empty() {
                    ui.label("No data for this metric.");
                }
                if ui.small_button("Reload matrix").clicked() {
                    self.reload_matrix(self.data.metric);
                }
            }
            LoadState::Absent => {}
        }
    }

    fn draw_search(&mut self, ui: &mut Ui) {
        ui.label("Search languages")
            .on_hover_text("Fuzzy match on name, native name or code.");
        let search_response = ui.text_edit_singleline(&mut self.search);
        let submitted = search_response.lost_focus() && ui.input(|input| input.key_pressed(Key::Enter));

        let query = self.search.trim();
        if query.is_empty() {
            return;
        }

        let matcher = SkimMatcherV2::default();
        let mut matches = self
            .data
            .nodes
            .nodes()
            .iter()
            .filter_map(|node| {
                [
                    node.display_name.as_str(),
                    node.localized_name.as_str(),
                    node.code.as_str(),
                ]
                .into_iter()
                .filter_map(|text| fuzzy_match_score(&matcher, text, query))
                .max()
                .map(|score| (score, node.code.clone(), node.display_name.clone(), node.country.clone()))
            })
            .collect::<Vec<_>>();
        matches.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        matches.truncate(SEARCH_RESULT_LIMIT);

        if matches.is_empty() {
            ui.label("No matching languages.");
            return;
        }

        let mut picked = submitted.then(|| matches[0].1.clone());
        for (_, code, name, country) in &matches {
            let label = if country.is_empty() {
                format!("{name} ({code})")
            } else {
                format!("{name} ({code}, {country})")
            };
            let is_selected = self.controller.selected_code() == Some(code.as_str());
            if ui.selectable_label(is_selected, label).clicked() {
                picked = Some(code.clone());
            }
        }

        if let Some(code) = picked {
            self.focus_node(&code);
            self.search.clear();
        }
    }

    fn draw_filter(&mut self, ui: &mut Ui) {
        let mut filter = *self.controller.filter();
        let mut changed = None;
        ui.label(
            RichText::new(format!(
                "Distance categories ({}/{})",
                filter.enabled_count(),
                DistanceCategory::ALL.len()
            ))
            .strong(),
        );

        for (index, category) in DistanceCategory::ALL.into_iter().enumerate() {
            ui.horizontal(|ui| {
                let (swatch, swatch_response) =
                    ui.allocate_exact_size(vec2(12.0, 12.0), Sense::click());
                if swatch_response
                    .on_hover_text(format!("Show only {}", category.label()))
                    .clicked()
                {
                    filter = DistanceFilter::only(category);
                }
                ui.painter().rect_filled(
                    swatch,
                    2.0,
                    to_color32(arc_color(category.lower_bound())),
                );

                let range = match DistanceCategory::ALL.get(index + 1) {
                    Some(next) => format!(
                        "{} to {}",
                        format_distance(category.lower_bound()),
                        format_distance(next.lower_bound())
                    ),
                    None => format!("{} and above", format_distance(category.lower_bound())),
                };
                let arc_count = self
                    .controller
                    .graph()
                    .similarity_arcs()
                    .filter(|arc| arc.category() == Some(category))
                    .count();
                let mut enabled = filter.is_enabled(category);
                if ui
                    .checkbox(&mut enabled, format!("{} ({arc_count})", category.label()))
                    .on_hover_text(range)
                    .changed()
                {
                    changed = Some((category, enabled));
                }
            });
        }

        ui.horizontal(|ui| {
            if ui.button("All").clicked() {
                filter = DistanceFilter::all();
            }
            if ui.button("None").clicked() {
                filter = DistanceFilter::none();
            }
        });

        if let Some((category, enabled)) = changed {
            self.controller.set_filter(category, enabled, self.data.inputs());
        } else if filter != *self.controller.filter() {
            self.controller.replace_filter(filter, self.data.inputs());
        }

        if self.controller.selected_code().is_some() {
            ui.small("Filter is ignored while a language is selected.");
        }
    }

    fn draw_closest_pairs(&mut self, ui: &mut Ui) {
        if self.closest_pairs.is_empty() {
            ui.label("No distances loaded for this metric.");
            return;
        }

        let mut picked = None;
        for pair in &self.closest_pairs {
            let label = format!(
                "{} ↔ {}  {}",
                pair.first,
                pair.second,
                format_distance(pair.distance)
            );
            if ui.link(label).clicked() {
                picked = Some(pair.first.clone());
            }
        }

        if let Some(name) = picked {
            let code = self
                .data
                .nodes
                .primaries()
                .find(|node| node.display_name == name)
                .map(|node| node.code.clone());
            if let Some(code) = code {
                self.focus_node(&code);
            }
        }
    }
}
