//! Polygon group: the owning aggregate of an outline, its center marker and
//! its payload.
//!
//! The group keeps the authoritative geometry and mirrors it into a
//! [`Scene`] through the handles in [`GroupNodes`]:
//!
//! ```text
//! container (Group)
//! ├── outline (Polygon)
//! └── marker (Group, hidden when centers are hidden)
//!     └── marker body (Circle, or Label when the payload formats to text)
//! overlay (Overlay, top level, only while highlighted)
//! ```

use crate::bus::ChangeBus;
use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::id::GroupId;
use crate::model::{CenterMarker, Color, Payload};
use crate::scene::{NodeHandle, Scene, Shape};
use kurbo::{Point, Rect, Vec2};

const HIGHLIGHT: Color = Color::rgba(1.0, 1.0, 1.0, 0.48);

/// Scene handles owned by one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupNodes {
    pub container: NodeHandle,
    pub outline: NodeHandle,
    pub marker: NodeHandle,
    pub marker_body: NodeHandle,
    pub overlay: Option<NodeHandle>,
}

/// Which of a group's nodes a scene node is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    Container,
    Outline,
    Marker,
    MarkerBody,
}

/// Everything needed to build a group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSeed {
    pub outline: Vec<Point>,
    /// Defaults to the center of the outline's bounding box.
    pub center: Option<Point>,
    pub color: Color,
    pub payload: Option<Payload>,
}

#[derive(Debug, Clone)]
pub struct PolygonGroup {
    id: GroupId,
    outline: Vec<Point>,
    center: CenterMarker,
    payload: Option<Payload>,
    color: Color,
    nodes: GroupNodes,
}

impl PolygonGroup {
    /// Create the group and its scene nodes. Announcing the addition is the
    /// caller's business.
    pub fn build(
        scene: &mut dyn Scene,
        config: &EditorConfig,
        id: GroupId,
        seed: GroupSeed,
    ) -> Result<Self, EditorError> {
        if seed.outline.is_empty() {
            return Err(EditorError::EmptyOutline);
        }
        let position = seed
            .center
            .unwrap_or_else(|| outline_bounds(&seed.outline).center());
        let center = CenterMarker {
            position,
            label: config.label_for(seed.payload.as_ref()),
            radius: config.center_radius,
            font_size: config.label_font_size,
            hidden: config.centers_hidden,
        };
        let nodes = insert_nodes(scene, &seed.outline, &center, seed.color);

        log::trace!("built {id} with {} vertices", seed.outline.len());
        Ok(Self {
            id,
            outline: seed.outline,
            center,
            payload: seed.payload,
            color: seed.color,
            nodes,
        })
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn outline(&self) -> &[Point] {
        &self.outline
    }

    pub fn vertex_count(&self) -> usize {
        self.outline.len()
    }

    pub fn center(&self) -> &CenterMarker {
        &self.center
    }

    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn nodes(&self) -> &GroupNodes {
        &self.nodes
    }

    pub fn is_highlighted(&self) -> bool {
        self.nodes.overlay.is_some()
    }

    /// Role of `node` within this group, if it belongs to it. The overlay is
    /// not a member: it is never hit.
    pub fn role_of(&self, node: NodeHandle) -> Option<NodeRole> {
        let n = &self.nodes;
        if node == n.container {
            Some(NodeRole::Container)
        } else if node == n.outline {
            Some(NodeRole::Outline)
        } else if node == n.marker {
            Some(NodeRole::Marker)
        } else if node == n.marker_body {
            Some(NodeRole::MarkerBody)
        } else {
            None
        }
    }

    // ─── Geometry ────────────────────────────────────────────────────────

    /// Insert `point` so it becomes vertex `index`.
    pub fn insert_vertex(&mut self, scene: &mut dyn Scene, index: usize, point: Point) {
        let index = index.min(self.outline.len());
        self.outline.insert(index, point);
        self.sync_outline(scene);
    }

    /// Shift vertex `index` by `delta`. Returns `false` for a stale index.
    pub fn move_vertex(&mut self, scene: &mut dyn Scene, index: usize, delta: Vec2) -> bool {
        let Some(vertex) = self.outline.get_mut(index) else {
            return false;
        };
        *vertex += delta;
        self.sync_outline(scene);
        true
    }

    /// Drop vertex `index` without any underflow check; see
    /// `PolygonStore::remove_vertex` for the rule that keeps outlines valid.
    pub(crate) fn remove_vertex_at(&mut self, scene: &mut dyn Scene, index: usize) -> bool {
        if index >= self.outline.len() {
            return false;
        }
        self.outline.remove(index);
        self.sync_outline(scene);
        true
    }

    /// Move the whole group: outline and center marker alike.
    pub fn translate(&mut self, scene: &mut dyn Scene, delta: Vec2) {
        for vertex in &mut self.outline {
            *vertex += delta;
        }
        self.center.position += delta;
        self.sync_outline(scene);
        self.sync_marker(scene);
    }

    pub fn move_center(&mut self, scene: &mut dyn Scene, delta: Vec2) {
        self.center.position += delta;
        self.sync_marker(scene);
    }

    // ─── Payload ─────────────────────────────────────────────────────────

    /// Replace the payload, refresh the marker label and announce it.
    pub fn set_payload(
        &mut self,
        scene: &mut dyn Scene,
        config: &EditorConfig,
        bus: &ChangeBus,
        payload: Option<Payload>,
    ) {
        self.center.label = config.label_for(payload.as_ref());
        self.payload = payload;
        self.sync_marker(scene);
        bus.payload_changed(self.id);
    }

    // ─── Presentation ────────────────────────────────────────────────────

    pub fn highlight(&mut self, scene: &mut dyn Scene) {
        if self.nodes.overlay.is_some() {
            return;
        }
        let overlay = scene.insert(
            None,
            Shape::Overlay {
                points: self.outline.clone(),
                fill: HIGHLIGHT,
            },
        );
        self.nodes.overlay = Some(overlay);
    }

    pub fn unhighlight(&mut self, scene: &mut dyn Scene) {
        if let Some(overlay) = self.nodes.overlay.take() {
            scene.remove(overlay);
        }
    }

    /// Toggle the outline's selected emphasis (vertex handles).
    pub fn set_emphasis(&self, scene: &mut dyn Scene, on: bool) {
        scene.set_selected(self.nodes.outline, on);
    }

    /// Refresh the scene nodes from the current configuration. The nodes
    /// are updated in place, so handles, z-order, selection and highlight
    /// survive. Geometry, payload, identity and hue are kept; alpha, marker
    /// size, label and visibility are refreshed.
    pub fn rebuild(&mut self, scene: &mut dyn Scene, config: &EditorConfig) {
        self.color = self.color.with_alpha(config.fill_opacity as f32);
        self.center = CenterMarker {
            position: self.center.position,
            label: config.label_for(self.payload.as_ref()),
            radius: config.center_radius,
            font_size: config.label_font_size,
            hidden: config.centers_hidden,
        };
        self.sync_outline(scene);
        self.sync_marker(scene);
        scene.set_visible(self.nodes.marker, !self.center.hidden);
    }

    /// Remove every scene node the group owns.
    pub fn destroy(&mut self, scene: &mut dyn Scene) {
        self.unhighlight(scene);
        scene.remove(self.nodes.container);
    }

    fn sync_outline(&self, scene: &mut dyn Scene) {
        scene.update(
            self.nodes.outline,
            outline_shape(&self.outline, self.color),
        );
        if let Some(overlay) = self.nodes.overlay {
            scene.update(
                overlay,
                Shape::Overlay {
                    points: self.outline.clone(),
                    fill: HIGHLIGHT,
                },
            );
        }
    }

    fn sync_marker(&self, scene: &mut dyn Scene) {
        scene.update(self.nodes.marker_body, marker_shape(&self.center, self.color));
    }
}

/// Bounding box of a non-empty outline.
pub fn outline_bounds(points: &[Point]) -> Rect {
    let first = points.first().copied().unwrap_or(Point::ZERO);
    points
        .iter()
        .fold(Rect::from_points(first, first), |rect, p| rect.union_pt(*p))
}

fn outline_shape(points: &[Point], color: Color) -> Shape {
    Shape::Polygon {
        points: points.to_vec(),
        fill: color,
        stroke: color,
    }
}

fn marker_shape(center: &CenterMarker, color: Color) -> Shape {
    match &center.label {
        Some(text) => Shape::Label {
            center: center.position,
            text: text.clone(),
            font_size: center.font_size,
            text_color: Color::WHITE,
            background: color,
        },
        None => Shape::Circle {
            center: center.position,
            radius: center.radius,
            fill: color,
            stroke: Color::WHITE,
        },
    }
}

fn insert_nodes(
    scene: &mut dyn Scene,
    outline: &[Point],
    center: &CenterMarker,
    color: Color,
) -> GroupNodes {
    let container = scene.insert(None, Shape::Group);
    let outline = scene.insert(Some(container), outline_shape(outline, color));
    let marker = scene.insert(Some(container), Shape::Group);
    let marker_body = scene.insert(Some(marker), marker_shape(center, color));
    if center.hidden {
        scene.set_visible(marker, false);
    }
    GroupNodes {
        container,
        outline,
        marker,
        marker_body,
        overlay: None,
    }
}
