//! Deterministic rotating polygon colours.

use crate::model::Color;

const START: [f64; 3] = [0.99, 0.0, 0.0];
const STEP: [f64; 3] = [0.32, 0.46, 0.65];

/// Hands out a new colour on every call by advancing each RGB channel by a
/// fixed step and wrapping it into [0, 1).
///
/// Each editor owns one, so two editors produce the same sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    channels: [f64; 3],
}

impl Default for Palette {
    fn default() -> Self {
        Self { channels: START }
    }
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next colour with the given alpha.
    pub fn next_color(&mut self, alpha: f64) -> Color {
        let [r, g, b] = self.channels.map(|v| (v % 1.0).abs() as f32);
        for (channel, step) in self.channels.iter_mut().zip(STEP) {
            *channel += step;
        }
        Color::rgba(r, g, b, alpha as f32)
    }
}
