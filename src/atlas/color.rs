use std::fmt;

use serde::{Serialize, Serializer};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn alpha_u8(self) -> u8 {
        (self.a.clamp(0.0, 1.0) * 255.0).round() as u8
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {:.2})", self.r, self.g, self.b, self.a)
    }
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Palette anchors at t = 0, 0.25, 0.5, 0.75, 1.
const ANCHORS: [(u8, u8, u8); 5] = [
    (59, 130, 246),
    (34, 197, 94),
    (74, 222, 128),
    (250, 204, 21),
    (239, 68, 68),
];

const SEGMENT_WIDTH: f64 = 0.25;

/// Arc opacity: similar languages are drawn brighter, floored at 0.2.
pub fn opacity(distance: f64) -> f64 {
    if distance * 1.2 >= 0.6 {
        0.2
    } else {
        0.8 - distance * 1.2
    }
}

pub fn color(distance: f64, opacity: f64) -> Rgba {
    let t = (distance * 2.0).clamp(0.0, 1.0);
    let segment = ((t / SEGMENT_WIDTH).floor() as usize).min(ANCHORS.len() - 2);
    let local = ((t - segment as f64 * SEGMENT_WIDTH) / SEGMENT_WIDTH).clamp(0.0, 1.0);

    let (r0, g0, b0) = ANCHORS[segment];
    let (r1, g1, b1) = ANCHORS[segment + 1];

    Rgba {
        r: lerp_channel(r0, r1, local),
        g: lerp_channel(g0, g1, local),
        b: lerp_channel(b0, b1, local),
        a: opacity as f32,
    }
}

/// Color and opacity for an arc of the given distance.
pub fn arc_color(distance: f64) -> Rgba {
    color(distance, opacity(distance))
}

fn lerp_channel(from: u8, to: u8, amount: f64) -> u8 {
    let from = f64::from(from);
    let to = f64::from(to);
    (from + (to - from) * amount).round().clamp(0.0, 255.0) as u8
}
