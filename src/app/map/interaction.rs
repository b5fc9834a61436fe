use eframe::egui::{self, Pos2, Rect, Ui};

use super::super::ViewModel;
use super::super::render_utils::{distance_to_polyline, screen_to_world};

const ARC_HIT_TOLERANCE: f32 = 5.0;

impl ViewModel {
    pub(in crate::app) fn handle_map_zoom(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.4, 12.0);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    pub(in crate::app) fn handle_map_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Primary)
            || response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }

    /// Nearest point under the pointer, as an index into `positions`.
    pub(in crate::app) fn hovered_point(
        pointer: Option<Pos2>,
        positions: &[Pos2],
        radii: &[f32],
    ) -> Option<usize> {
        let pointer = pointer?;
        positions
            .iter()
            .zip(radii)
            .enumerate()
            .filter_map(|(index, (position, radius))| {
                let distance = position.distance(pointer);
                (distance <= radius + 2.0).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    /// Nearest clickable arc under the pointer. `polylines` pairs each arc
    /// index with its sampled screen path.
    pub(in crate::app) fn hovered_arc(
        pointer: Option<Pos2>,
        polylines: &[(usize, Vec<Pos2>)],
    ) -> Option<usize> {
        let pointer = pointer?;
        polylines
            .iter()
            .map(|(index, points)| (*index, distance_to_polyline(points, pointer)))
            .filter(|(_, distance)| *distance <= ARC_HIT_TOLERANCE)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;

    #[test]
    fn nearest_point_wins_when_circles_overlap() {
        let positions = [pos2(10.0, 10.0), pos2(14.0, 10.0), pos2(100.0, 100.0)];
        let radii = [6.0, 6.0, 6.0];
        assert_eq!(
            ViewModel::hovered_point(Some(pos2(13.0, 10.0)), &positions, &radii),
            Some(1)
        );
        assert_eq!(
            ViewModel::hovered_point(Some(pos2(50.0, 50.0)), &positions, &radii),
            None
        );
        assert_eq!(ViewModel::hovered_point(None, &positions, &radii), None);
    }

    #[test]
    fn arcs_are_hit_within_tolerance() {
        let polylines = vec![
            (3, vec![pos2(0.0, 0.0), pos2(100.0, 0.0)]),
            (7, vec![pos2(0.0, 20.0), pos2(100.0, 20.0)]),
        ];
        assert_eq!(ViewModel::hovered_arc(Some(pos2(50.0, 4.0)), &polylines), Some(3));
        assert_eq!(ViewModel::hovered_arc(Some(pos2(50.0, 17.0)), &polylines), Some(7));
        assert_eq!(ViewModel::hovered_arc(Some(pos2(50.0, 10.0)), &polylines), None);
    }
}
