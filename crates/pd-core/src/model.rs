//! Value types shared by the entity model and the scene collaborator.

use serde::{Deserialize, Serialize};

/// Opaque application data attached to a polygon group.
pub type Payload = serde_json::Map<String, serde_json::Value>;

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Same hue, different alpha.
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// CSS hex form without alpha (`#rrggbb`), the form reported to hosts.
    pub fn to_css_hex(&self) -> String {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            channel(self.r),
            channel(self.g),
            channel(self.b)
        )
    }
}

// ─── Center marker ───────────────────────────────────────────────────────

/// The draggable point associated with a polygon group.
///
/// Render parameters are captured from the configuration when the marker is
/// (re)built, so moving it never needs the configuration again.
#[derive(Debug, Clone, PartialEq)]
pub struct CenterMarker {
    pub position: kurbo::Point,
    pub label: Option<String>,
    pub radius: f64,
    pub font_size: f64,
    pub hidden: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_hex_drops_alpha() {
        let c = Color::rgba(1.0, 0.5, 0.0, 0.7);
        assert_eq!(c.to_css_hex(), "#ff8000");
    }

    #[test]
    fn with_alpha_keeps_hue() {
        let c = Color::rgba(0.2, 0.4, 0.6, 1.0).with_alpha(0.3);
        assert_eq!(c, Color::rgba(0.2, 0.4, 0.6, 0.3));
    }
}
