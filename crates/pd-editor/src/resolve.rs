//! Hit resolution: raw scene hits → what the pointer is over.
//!
//! A single location can be over a center marker, a polygon and a group
//! container at once (different z-layers), so each category is resolved
//! separately. Raw hits arrive back to front and the last hit in each
//! category wins.

use pd_core::{GroupId, HitKind, NodeHandle, NodeRole, PolygonStore, RawHit, Scene};

/// Which part of an outline was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonPart {
    Fill,
    /// Edge from vertex `e` to vertex `e + 1`, wrapping.
    Edge(usize),
    Vertex(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolygonHit {
    pub group: GroupId,
    pub part: PolygonPart,
}

#[derive(Debug, Clone, Default)]
pub struct Hits {
    group: Option<GroupId>,
    polygon: Option<PolygonHit>,
    center: Option<GroupId>,
    raw: Vec<RawHit>,
}

impl Hits {
    /// Classify `raw` (back to front) against the groups in `store`.
    pub fn resolve(scene: &dyn Scene, store: &PolygonStore, raw: Vec<RawHit>) -> Self {
        let mut hits = Hits::default();
        for hit in &raw {
            let Some((group, role)) = store.owner_of(hit.node) else {
                continue;
            };
            match role {
                NodeRole::Container => hits.group = Some(group),
                NodeRole::Outline => {
                    check_parent(scene, store, hit.node, group);
                    hits.polygon = Some(PolygonHit {
                        group,
                        part: part_of(hit.kind),
                    });
                }
                // A hit on the marker body is attributed to the marker.
                NodeRole::Marker | NodeRole::MarkerBody => {
                    check_parent(scene, store, hit.node, group);
                    hits.center = Some(group);
                }
            }
        }
        log::trace!(
            "resolved {} raw hit(s): group={:?} polygon={:?} center={:?}",
            raw.len(),
            hits.group,
            hits.polygon,
            hits.center
        );
        hits.raw = raw;
        hits
    }

    pub fn group(&self) -> Option<GroupId> {
        self.group
    }

    pub fn polygon(&self) -> Option<PolygonHit> {
        self.polygon
    }

    pub fn center(&self) -> Option<GroupId> {
        self.center
    }

    /// Unclassified hits, back to front.
    pub fn raw(&self) -> &[RawHit] {
        &self.raw
    }

    /// Whether the topmost raw hit is on `node`.
    pub fn is_topmost(&self, node: NodeHandle) -> bool {
        self.raw.last().is_some_and(|h| h.node == node)
    }

    /// Anything belonging to a polygon group at all.
    pub fn any(&self) -> bool {
        self.group.is_some() || self.polygon.is_some() || self.center.is_some()
    }
}

fn part_of(kind: HitKind) -> PolygonPart {
    match kind {
        HitKind::Segment { vertex } => PolygonPart::Vertex(vertex),
        HitKind::Stroke { edge } => PolygonPart::Edge(edge),
        HitKind::Fill | HitKind::Bounds => PolygonPart::Fill,
    }
}

/// Verify `node` still sits where its group expects it. A mismatch means
/// the scene tree was rearranged behind the editor's back; it is logged and
/// the hit is used anyway.
fn check_parent(scene: &dyn Scene, store: &PolygonStore, node: NodeHandle, group: GroupId) {
    let Some(nodes) = store.by_id(group).map(|g| *g.nodes()) else {
        return;
    };
    let expected = if node == nodes.outline || node == nodes.marker {
        nodes.container
    } else {
        nodes.marker
    };
    let actual = scene.parent(node);
    if actual != Some(expected) {
        log::warn!(
            "node {node:?} of {group} expected under {expected:?}, found under {actual:?}"
        );
    }
}
