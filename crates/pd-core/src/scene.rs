//! Scene graph collaborator interface.
//!
//! The editor never draws anything itself. It keeps opaque [`NodeHandle`]s
//! into a retained scene tree owned by a [`Scene`] implementation, pushes
//! [`Shape`] descriptions into it, and asks it for raw hit results. The
//! `pd-render` crate ships the reference implementation; hosts with their
//! own renderer implement the trait directly.

use crate::model::Color;
use crate::view::ViewTransform;
use kurbo::{Point, Rect, Size};
use serde::Serialize;

/// Opaque arena handle to a node in the scene tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeHandle(u32);

impl NodeHandle {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// What a scene node looks like. Coordinates are project (logical) space.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    /// Container; hit as a whole through the bounds of its descendants.
    Group,
    /// Closed outline with fill and stroke.
    Polygon {
        points: Vec<Point>,
        fill: Color,
        stroke: Color,
    },
    Circle {
        center: Point,
        radius: f64,
        fill: Color,
        stroke: Color,
    },
    /// Text centred on `center` inside a padded rounded box.
    Label {
        center: Point,
        text: String,
        font_size: f64,
        text_color: Color,
        background: Color,
    },
    /// Highlight overlay; never hit.
    Overlay { points: Vec<Point>, fill: Color },
    /// In-progress freehand outline; never hit.
    Draft { points: Vec<Point>, stroke: Color },
    /// One row of the context menu.
    MenuItem {
        rect: Rect,
        label: String,
        hovered: bool,
    },
    /// Backdrop image placeholder; never hit.
    Backdrop { rect: Rect },
}

/// Which part of a node a raw hit landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HitKind {
    /// Interior of a filled shape.
    Fill,
    /// Polygon edge `edge`, running from vertex `edge` to vertex `edge + 1`
    /// (wrapping).
    Stroke { edge: usize },
    /// Polygon vertex handle.
    Segment { vertex: usize },
    /// Container whose descendant was hit (groups only).
    Bounds,
}

/// One entry of the scene's ordered hit list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RawHit {
    pub node: NodeHandle,
    pub kind: HitKind,
}

/// Pointer cursor hint for the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
}

/// The retained-mode scene the editor renders into.
pub trait Scene {
    /// Create a node under `parent` (top level when `None`), drawn above its
    /// existing siblings.
    fn insert(&mut self, parent: Option<NodeHandle>, shape: Shape) -> NodeHandle;

    /// Replace a node's shape in place, keeping its z-order and children.
    fn update(&mut self, node: NodeHandle, shape: Shape);

    /// Remove a node together with all of its descendants.
    fn remove(&mut self, node: NodeHandle);

    fn parent(&self, node: NodeHandle) -> Option<NodeHandle>;

    fn contains(&self, node: NodeHandle) -> bool;

    /// Invisible nodes and their descendants are neither drawn nor hit.
    fn set_visible(&mut self, node: NodeHandle, visible: bool);

    /// Toggle the "selected" emphasis (vertex handles drawn on outlines).
    fn set_selected(&mut self, node: NodeHandle, selected: bool);

    fn is_selected(&self, node: NodeHandle) -> bool;

    /// Drop the selection emphasis from every node.
    fn clear_selection(&mut self);

    /// All nodes under `point`, ordered in paint order: the last entry is
    /// the topmost. `point` and `tolerance` are in project space.
    fn hit_test_all(&self, point: Point, tolerance: f64) -> Vec<RawHit>;

    fn view(&self) -> &ViewTransform;

    fn view_mut(&mut self) -> &mut ViewTransform;

    fn set_cursor(&mut self, cursor: Cursor);

    fn cursor(&self) -> Cursor;
}

/// Approximate text box used for labels and menu rows.
///
/// Real glyph metrics belong to the host renderer; this keeps hit areas
/// close enough without one.
pub fn measure_text(text: &str, font_size: f64) -> Size {
    let chars = text.chars().count() as f64;
    Size::new(chars * font_size * 0.6, font_size * 1.2)
}

/// Padding between a center label's text and its box edge.
pub const LABEL_PADDING: f64 = 4.0;

/// Box of a center label drawn at `center`.
pub fn label_rect(center: Point, text: &str, font_size: f64) -> Rect {
    let text_size = measure_text(text, font_size);
    Rect::from_center_size(
        center,
        Size::new(
            text_size.width + LABEL_PADDING * 2.0,
            text_size.height + LABEL_PADDING * 2.0,
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_rect_is_centered_and_padded() {
        let rect = label_rect(Point::new(50.0, 50.0), "ab", 10.0);
        assert_eq!(rect.center(), Point::new(50.0, 50.0));
        assert!((rect.width() - (12.0 + 8.0)).abs() < 1e-9);
        assert!((rect.height() - (12.0 + 8.0)).abs() < 1e-9);
    }
}
