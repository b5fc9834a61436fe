use eframe::egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Stroke, Vec2, vec2};

use crate::atlas::Rgba;

/// World units per degree of latitude or longitude at zoom 1.
pub(super) const WORLD_UNITS_PER_DEGREE: f32 = 2.4;

/// Screen lift of an arc apex per unit of altitude, in world units.
const ARC_LIFT: f32 = 260.0;
const ARC_SEGMENTS: usize = 24;

pub(super) fn to_color32(color: Rgba) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.alpha_u8())
}

/// Equirectangular projection with north up.
pub(super) fn project(lat: f64, lng: f64) -> Vec2 {
    vec2(
        lng as f32 * WORLD_UNITS_PER_DEGREE,
        -(lat as f32) * WORLD_UNITS_PER_DEGREE,
    )
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

/// Quadratic bezier from `start` to `end` whose control point is lifted
/// "up" the screen in proportion to `altitude`.
pub(super) fn arc_polyline(start: Pos2, end: Pos2, altitude: f64, zoom: f32) -> Vec<Pos2> {
    let lift = altitude as f32 * ARC_LIFT * zoom;
    let control = start + (end - start) * 0.5 - vec2(0.0, lift);

    (0..=ARC_SEGMENTS)
        .map(|step| {
            let t = step as f32 / ARC_SEGMENTS as f32;
            let inverse = 1.0 - t;
            let point = start.to_vec2() * (inverse * inverse)
                + control.to_vec2() * (2.0 * inverse * t)
                + end.to_vec2() * (t * t);
            point.to_pos2()
        })
        .collect()
}

pub(super) fn polyline_visible(rect: Rect, points: &[Pos2], padding: f32) -> bool {
    let expanded = rect.expand(padding);
    points.windows(2).any(|segment| {
        expanded.intersects(Rect::from_two_pos(segment[0], segment[1]))
    })
}

pub(super) fn distance_to_polyline(points: &[Pos2], pointer: Pos2) -> f32 {
    points
        .windows(2)
        .map(|segment| distance_to_segment(segment[0], segment[1], pointer))
        .fold(f32::INFINITY, f32::min)
}

fn distance_to_segment(start: Pos2, end: Pos2, point: Pos2) -> f32 {
    let segment = end - start;
    let length_sq = segment.length_sq();
    if length_sq <= f32::EPSILON {
        return start.distance(point);
    }
    let t = ((point - start).dot(segment) / length_sq).clamp(0.0, 1.0);
    (start + segment * t).distance(point)
}

/// Ocean fill with a 30° graticule.
pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let grid = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));
    let equator = Stroke::new(1.2, Color32::from_rgba_unmultiplied(90, 104, 118, 110));

    for lng in (-180..=180).step_by(30) {
        let top = world_to_screen(rect, pan, zoom, project(90.0, f64::from(lng)));
        let bottom = world_to_screen(rect, pan, zoom, project(-90.0, f64::from(lng)));
        if top.x < rect.left() || top.x > rect.right() {
            continue;
        }
        painter.line_segment([top, bottom], grid);
    }

    for lat in (-90..=90).step_by(30) {
        let left = world_to_screen(rect, pan, zoom, project(f64::from(lat), -180.0));
        let right = world_to_screen(rect, pan, zoom, project(f64::from(lat), 180.0));
        if left.y < rect.top() || left.y > rect.bottom() {
            continue;
        }
        painter.line_segment([left, right], if lat == 0 { equator } else { grid });
        if zoom > 0.6 {
            painter.text(
                Pos2::new(rect.left() + 4.0, left.y - 2.0),
                Align2::LEFT_BOTTOM,
                format!("{lat}°"),
                FontId::proportional(10.0),
                Color32::from_rgba_unmultiplied(120, 130, 140, 140),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen() -> Rect {
        Rect::from_min_size(Pos2::ZERO, vec2(800.0, 600.0))
    }

    #[test]
    fn projection_puts_north_up_and_east_right() {
        let tokyo = project(35.68, 139.69);
        let london = project(51.51, -0.13);
        assert!(tokyo.x > london.x);
        assert!(london.y < tokyo.y);
        assert_eq!(project(0.0, 0.0), Vec2::ZERO);
    }

    #[test]
    fn screen_and_world_coordinates_are_inverse() {
        let pan = vec2(35.0, -12.0);
        let zoom = 1.7;
        let world = vec2(-120.0, 48.5);
        let back = screen_to_world(screen(), pan, zoom, world_to_screen(screen(), pan, zoom, world));
        assert!((back - world).length() < 1e-3);
    }

    #[test]
    fn arcs_bulge_upward_with_altitude() {
        let start = Pos2::new(100.0, 300.0);
        let end = Pos2::new(500.0, 300.0);
        let flat = arc_polyline(start, end, 0.0, 1.0);
        let raised = arc_polyline(start, end, 0.3, 1.0);

        assert_eq!(flat.first(), Some(&start));
        assert_eq!(raised.last(), Some(&end));
        let apex = raised.iter().map(|point| point.y).fold(f32::INFINITY, f32::min);
        assert!(apex < 300.0 - 30.0);
        assert!(flat.iter().all(|point| (point.y - 300.0).abs() < 1e-3));
    }

    #[test]
    fn pointer_distance_uses_the_nearest_segment() {
        let points = [Pos2::new(0.0, 0.0), Pos2::new(10.0, 0.0), Pos2::new(10.0, 10.0)];
        assert!((distance_to_polyline(&points, Pos2::new(5.0, 3.0)) - 3.0).abs() < 1e-4);
        assert!((distance_to_polyline(&points, Pos2::new(14.0, 5.0)) - 4.0).abs() < 1e-4);
        assert!((distance_to_polyline(&points, Pos2::new(-3.0, -4.0)) - 5.0).abs() < 1e-4);
    }

    #[test]
    fn colors_keep_their_alpha() {
        let color = to_color32(Rgba::rgb(10, 20, 30).with_alpha(0.5));
        assert_eq!(color.a(), 128);
    }
}
