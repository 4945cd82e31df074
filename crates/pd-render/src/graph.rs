//! Retained scene tree.
//!
//! A `petgraph` stable graph whose edges go parent → child. Sibling order is
//! the z-order and is kept explicitly per parent, because a stable graph
//! reuses freed indices and index order would stop meaning "inserted later".

use crate::hit;
use pd_core::{Cursor, NodeHandle, Point, RawHit, Scene, Shape, Size, ViewTransform};
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use serde::Serialize;
use std::collections::HashMap;

/// One node of the scene tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneNode {
    pub shape: Shape,
    pub visible: bool,
    pub selected: bool,
}

impl SceneNode {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            visible: true,
            selected: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SceneGraph {
    pub graph: StableDiGraph<SceneNode, ()>,
    /// Invisible container every top-level node hangs off.
    pub root: NodeIndex,
    /// Children of each parent, back to front.
    child_order: HashMap<NodeIndex, Vec<NodeIndex>>,
    view: ViewTransform,
    cursor: Cursor,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new(Size::new(800.0, 600.0))
    }
}

pub(crate) fn index_of(handle: NodeHandle) -> NodeIndex {
    NodeIndex::new(handle.raw() as usize)
}

pub(crate) fn handle_of(idx: NodeIndex) -> NodeHandle {
    NodeHandle::from_raw(idx.index() as u32)
}

impl SceneGraph {
    #[must_use]
    pub fn new(view_size: Size) -> Self {
        let mut graph = StableDiGraph::new();
        let root = graph.add_node(SceneNode::new(Shape::Group));
        Self {
            graph,
            root,
            child_order: HashMap::new(),
            view: ViewTransform::new(view_size),
            cursor: Cursor::Default,
        }
    }

    /// Children of `idx`, back to front.
    pub fn children(&self, idx: NodeIndex) -> &[NodeIndex] {
        self.child_order.get(&idx).map_or(&[], Vec::as_slice)
    }

    pub fn node(&self, handle: NodeHandle) -> Option<&SceneNode> {
        let idx = index_of(handle);
        if idx == self.root {
            return None;
        }
        self.graph.node_weight(idx)
    }

    pub fn len(&self) -> usize {
        self.graph.node_count() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Visible nodes in paint order (back to front, parents before their
    /// children).
    pub fn paint_order(&self) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        self.collect_visible(self.root, &mut out);
        out
    }

    fn collect_visible(&self, idx: NodeIndex, out: &mut Vec<NodeHandle>) {
        for &child in self.children(idx) {
            if self.graph[child].visible {
                out.push(handle_of(child));
                self.collect_visible(child, out);
            }
        }
    }

    fn live(&self, handle: NodeHandle) -> Option<NodeIndex> {
        let idx = index_of(handle);
        (idx != self.root && self.graph.contains_node(idx)).then_some(idx)
    }

    fn remove_subtree(&mut self, idx: NodeIndex) {
        if let Some(children) = self.child_order.remove(&idx) {
            for child in children {
                self.remove_subtree(child);
            }
        }
        self.graph.remove_node(idx);
    }
}

impl Scene for SceneGraph {
    fn insert(&mut self, parent: Option<NodeHandle>, shape: Shape) -> NodeHandle {
        let parent = match parent {
            Some(p) => self.live(p).unwrap_or_else(|| {
                log::warn!("insert under missing node {p:?}, using the root");
                self.root
            }),
            None => self.root,
        };
        let idx = self.graph.add_node(SceneNode::new(shape));
        self.graph.add_edge(parent, idx, ());
        self.child_order.entry(parent).or_default().push(idx);
        handle_of(idx)
    }

    fn update(&mut self, node: NodeHandle, shape: Shape) {
        if let Some(idx) = self.live(node) {
            self.graph[idx].shape = shape;
        }
    }

    fn remove(&mut self, node: NodeHandle) {
        let Some(idx) = self.live(node) else {
            return;
        };
        if let Some(parent) = self.parent_index(idx)
            && let Some(siblings) = self.child_order.get_mut(&parent)
        {
            siblings.retain(|&s| s != idx);
        }
        self.remove_subtree(idx);
    }

    fn parent(&self, node: NodeHandle) -> Option<NodeHandle> {
        let idx = self.live(node)?;
        self.parent_index(idx)
            .filter(|&p| p != self.root)
            .map(handle_of)
    }

    fn contains(&self, node: NodeHandle) -> bool {
        self.live(node).is_some()
    }

    fn set_visible(&mut self, node: NodeHandle, visible: bool) {
        if let Some(idx) = self.live(node) {
            self.graph[idx].visible = visible;
        }
    }

    fn set_selected(&mut self, node: NodeHandle, selected: bool) {
        if let Some(idx) = self.live(node) {
            self.graph[idx].selected = selected;
        }
    }

    fn is_selected(&self, node: NodeHandle) -> bool {
        self.live(node).is_some_and(|idx| self.graph[idx].selected)
    }

    fn clear_selection(&mut self) {
        for node in self.graph.node_weights_mut() {
            node.selected = false;
        }
    }

    fn hit_test_all(&self, point: Point, tolerance: f64) -> Vec<RawHit> {
        hit::hit_test_all(self, point, tolerance)
    }

    fn view(&self) -> &ViewTransform {
        &self.view
    }

    fn view_mut(&mut self) -> &mut ViewTransform {
        &mut self.view
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    fn cursor(&self) -> Cursor {
        self.cursor
    }
}

impl SceneGraph {
    fn parent_index(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .next()
    }
}
