use eframe::egui::{self, Align2, Color32, FontId, Sense, Shape, Stroke, Ui, vec2};

use crate::atlas::PointRole;

use super::super::ViewModel;
use super::super::render_utils::{
    arc_polyline, circle_visible, draw_background, polyline_visible, project, to_color32,
    world_to_screen,
};

/// Screen pixels per unit of point radius.
const POINT_SCALE: f32 = 11.0;
/// Screen pixels per unit of arc stroke.
const STROKE_SCALE: f32 = 3.2;

impl ViewModel {
    pub(in crate::app) fn draw_map(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.pan, self.zoom);

        self.handle_map_zoom(ui, rect, &response);
        self.handle_map_pan(&response);

        let pan = self.pan;
        let zoom = self.zoom;
        let graph = self.controller.graph();
        let pointer = ui.input(|input| input.pointer.hover_pos());

        let positions = graph
            .points
            .iter()
            .map(|point| world_to_screen(rect, pan, zoom, project(point.lat, point.lng)))
            .collect::<Vec<_>>();
        let radii = graph
            .points
            .iter()
            .map(|point| (point.radius * POINT_SCALE * zoom.powf(0.4)).clamp(2.0, 18.0))
            .collect::<Vec<_>>();
        let hovered_point = Self::hovered_point(pointer, &positions, &radii);
        let hovered_code = hovered_point
            .and_then(|index| graph.points.get(index))
            .map(|point| point.code.as_str());

        let mut clickable_arcs = Vec::new();
        for (index, arc) in graph.arcs.iter().enumerate() {
            let start = world_to_screen(rect, pan, zoom, project(arc.start_lat, arc.start_lng));
            let end = world_to_screen(rect, pan, zoom, project(arc.end_lat, arc.end_lng));
            let points = arc_polyline(start, end, arc.altitude, zoom);
            if !polyline_visible(rect, &points, 2.0) {
                continue;
            }

            let highlighted = self.hovered_arc == Some(index);
            let width = arc.stroke * STROKE_SCALE * zoom.sqrt().clamp(0.7, 2.0);
            let stroke = if highlighted {
                Stroke::new(width * 2.2, Color32::from_rgb(255, 255, 255))
            } else if hovered_code.is_some_and(|code| arc.touches(code)) {
                Stroke::new(width * 1.8, to_color32(arc.color.with_alpha(1.0)))
            } else {
                Stroke::new(width, to_color32(arc.color))
            };
            painter.add(Shape::line(points.clone(), stroke));

            if arc.clickable() {
                clickable_arcs.push((index, points));
            }
        }

        let hovered_arc = if hovered_point.is_none() && response.hovered() {
            Self::hovered_arc(pointer, &clickable_arcs)
        } else {
            None
        };

        for (index, point) in graph.points.iter().enumerate() {
            let position = positions[index];
            let radius = radii[index];
            if !circle_visible(rect, position, radius) {
                continue;
            }

            let is_hovered = hovered_point == Some(index);
            painter.circle_filled(position, radius, to_color32(point.color));
            painter.circle_stroke(
                position,
                radius,
                Stroke::new(
                    if is_hovered { 2.0 } else { 1.0 },
                    Color32::from_rgba_unmultiplied(15, 15, 15, 190),
                ),
            );

            let should_draw_label = is_hovered
                || point.role == PointRole::Selected
                || (self.show_labels && point.role == PointRole::Primary && zoom > 0.8)
                || zoom > 3.0;
            if should_draw_label {
                painter.text(
                    position + vec2(radius + 4.0, 0.0),
                    Align2::LEFT_CENTER,
                    point.label.as_str(),
                    FontId::proportional(12.0),
                    Color32::from_gray(238),
                );
            }
        }

        if hovered_point.is_some() || hovered_arc.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        let hover_text = hovered_point
            .and_then(|index| graph.points.get(index))
            .map(|point| format!("{}  |  {}", point.label, point.code))
            .or_else(|| {
                hovered_arc
                    .and_then(|index| graph.arcs.get(index))
                    .map(|arc| arc.label.clone())
            });
        if let Some(text) = hover_text {
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                text,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        let clicked = response.clicked_by(egui::PointerButton::Primary);
        let clicked_code = hovered_point
            .filter(|_| clicked)
            .and_then(|index| graph.points.get(index))
            .map(|point| point.code.clone());
        let navigation = hovered_arc
            .filter(|_| clicked)
            .and_then(|index| graph.arcs.get(index))
            .and_then(|arc| self.controller.activate_arc(arc, &self.data.nodes));

        if self.hovered_arc != hovered_arc {
            self.hovered_arc = hovered_arc;
            ui.ctx().request_repaint();
        }

        if let Some(code) = clicked_code {
            self.select_node(&code);
        } else if let Some(request) = navigation {
            self.open_comparison(request);
        }
    }
}
