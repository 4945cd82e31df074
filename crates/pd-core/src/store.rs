//! The editor-wide ordered collection of polygon groups.
//!
//! Insertion order is the external addressing scheme: hosts refer to groups
//! by index, and indices shift whenever an earlier group goes away.

use crate::bus::ChangeBus;
use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::group::{GroupSeed, NodeRole, PolygonGroup};
use crate::id::GroupId;
use crate::scene::{NodeHandle, Scene};
use kurbo::Point;

/// Whether a mutation is published on the change bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Announce {
    Emit,
    /// Used for bulk loads and re-renders, which are followed by a single
    /// consolidated notification instead.
    Silent,
}

/// What a vertex removal ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexRemoval {
    Vertex,
    /// The outline would have dropped below two vertices, so the whole
    /// group went instead.
    Group,
    Missing,
}

#[derive(Debug, Default)]
pub struct PolygonStore {
    groups: Vec<PolygonGroup>,
}

impl PolygonStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PolygonGroup> {
        self.groups.iter()
    }

    pub fn get(&self, index: usize) -> Option<&PolygonGroup> {
        self.groups.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut PolygonGroup> {
        self.groups.get_mut(index)
    }

    pub fn index_of(&self, id: GroupId) -> Option<usize> {
        self.groups.iter().position(|g| g.id() == id)
    }

    pub fn by_id(&self, id: GroupId) -> Option<&PolygonGroup> {
        self.groups.iter().find(|g| g.id() == id)
    }

    pub fn by_id_mut(&mut self, id: GroupId) -> Option<&mut PolygonGroup> {
        self.groups.iter_mut().find(|g| g.id() == id)
    }

    /// Find the group owning `node` and the node's role in it.
    pub fn owner_of(&self, node: NodeHandle) -> Option<(GroupId, NodeRole)> {
        self.groups
            .iter()
            .find_map(|g| g.role_of(node).map(|role| (g.id(), role)))
    }

    /// Build a group at the end of the collection.
    pub fn create(
        &mut self,
        scene: &mut dyn Scene,
        config: &EditorConfig,
        bus: &ChangeBus,
        seed: GroupSeed,
        announce: Announce,
    ) -> Result<GroupId, EditorError> {
        let group = PolygonGroup::build(scene, config, GroupId::next(), seed)?;
        let id = group.id();
        self.groups.push(group);
        if announce == Announce::Emit {
            bus.group_added(id);
        }
        Ok(id)
    }

    /// Destroy a group with all of its nodes. Returns `false` if it was
    /// already gone.
    pub fn remove(
        &mut self,
        scene: &mut dyn Scene,
        bus: &ChangeBus,
        id: GroupId,
        announce: Announce,
    ) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let mut group = self.groups.remove(index);
        group.destroy(scene);
        log::debug!("removed {id} (was index {index})");
        if announce == Announce::Emit {
            bus.group_removed(id);
        }
        true
    }

    /// Insert `point` as vertex `index` of group `id`.
    pub fn insert_vertex(
        &mut self,
        scene: &mut dyn Scene,
        bus: &ChangeBus,
        id: GroupId,
        index: usize,
        point: Point,
    ) -> bool {
        let Some(group) = self.by_id_mut(id) else {
            return false;
        };
        group.insert_vertex(scene, index, point);
        bus.vertex_added(id);
        true
    }

    /// Remove vertex `index` of group `id`. When the group has two vertices
    /// or fewer the whole group is removed instead, so no outline ever ends
    /// up with a single vertex.
    pub fn remove_vertex(
        &mut self,
        scene: &mut dyn Scene,
        bus: &ChangeBus,
        id: GroupId,
        index: usize,
    ) -> VertexRemoval {
        let Some(group) = self.by_id_mut(id) else {
            return VertexRemoval::Missing;
        };
        if index >= group.vertex_count() {
            return VertexRemoval::Missing;
        }
        if group.vertex_count() <= 2 {
            self.remove(scene, bus, id, Announce::Emit);
            return VertexRemoval::Group;
        }
        group.remove_vertex_at(scene, index);
        bus.vertex_removed(id);
        VertexRemoval::Vertex
    }

    /// Rebuild every group against `config` without announcing anything.
    pub fn rerender(&mut self, scene: &mut dyn Scene, config: &EditorConfig) {
        for group in &mut self.groups {
            group.rebuild(scene, config);
        }
        log::debug!("re-rendered {} group(s)", self.groups.len());
    }

    pub fn unhighlight_all(&mut self, scene: &mut dyn Scene) {
        for group in &mut self.groups {
            group.unhighlight(scene);
        }
    }

    /// Destroy every group silently.
    pub fn clear(&mut self, scene: &mut dyn Scene) {
        for mut group in self.groups.drain(..) {
            group.destroy(scene);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{ChangeKind, recorder};
    use crate::group::tests::{FakeScene, square_seed};
    use pretty_assertions::assert_eq;

    fn store_with(scene: &mut FakeScene, bus: &ChangeBus, n: usize) -> (PolygonStore, Vec<GroupId>) {
        let mut store = PolygonStore::new();
        let config = EditorConfig::default();
        let ids = (0..n)
            .map(|_| {
                store
                    .create(scene, &config, bus, square_seed(), Announce::Silent)
                    .unwrap()
            })
            .collect();
        (store, ids)
    }

    #[test]
    fn indices_shift_after_removal() {
        let mut scene = FakeScene::new();
        let bus = ChangeBus::new();
        let (mut store, ids) = store_with(&mut scene, &bus, 3);
        assert!(store.remove(&mut scene, &bus, ids[0], Announce::Emit));
        assert_eq!(store.get(0).map(|g| g.id()), Some(ids[1]));
        assert_eq!(store.index_of(ids[2]), Some(1));
        assert!(!store.remove(&mut scene, &bus, ids[0], Announce::Emit));
    }

    #[test]
    fn create_announces_unless_silent() {
        let mut scene = FakeScene::new();
        let bus = ChangeBus::new();
        let (listener, seen) = recorder();
        bus.subscribe(listener);
        let (mut store, _) = store_with(&mut scene, &bus, 2);
        assert!(seen.borrow().is_empty());

        let id = store
            .create(
                &mut scene,
                &EditorConfig::default(),
                &bus,
                square_seed(),
                Announce::Emit,
            )
            .unwrap();
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(seen.borrow()[0].kind, ChangeKind::GroupAdded);
        assert_eq!(seen.borrow()[0].group, id);
    }

    #[test]
    fn removing_second_to_last_vertex_removes_group() {
        let mut scene = FakeScene::new();
        let bus = ChangeBus::new();
        let (listener, seen) = recorder();
        bus.subscribe(listener);
        let (mut store, ids) = store_with(&mut scene, &bus, 1);
        let id = ids[0];

        assert_eq!(store.remove_vertex(&mut scene, &bus, id, 0), VertexRemoval::Vertex);
        assert_eq!(store.remove_vertex(&mut scene, &bus, id, 0), VertexRemoval::Vertex);
        assert_eq!(store.by_id(id).map(|g| g.vertex_count()), Some(2));

        assert_eq!(store.remove_vertex(&mut scene, &bus, id, 1), VertexRemoval::Group);
        assert!(store.is_empty());
        assert!(scene.nodes.is_empty());

        let kinds: Vec<ChangeKind> = seen.borrow().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ChangeKind::VertexRemoved,
                ChangeKind::VertexRemoved,
                ChangeKind::GroupRemoved
            ]
        );
        assert_eq!(
            store.remove_vertex(&mut scene, &bus, id, 0),
            VertexRemoval::Missing
        );
    }

    #[test]
    fn owner_lookup_reports_roles() {
        let mut scene = FakeScene::new();
        let bus = ChangeBus::new();
        let (store, ids) = store_with(&mut scene, &bus, 2);
        let nodes = *store.get(1).unwrap().nodes();
        assert_eq!(store.owner_of(nodes.outline), Some((ids[1], NodeRole::Outline)));
        assert_eq!(store.owner_of(nodes.marker_body), Some((ids[1], NodeRole::MarkerBody)));
        assert_eq!(store.owner_of(NodeHandle::from_raw(999)), None);
    }

    #[test]
    fn rerender_is_silent_and_keeps_order() {
        let mut scene = FakeScene::new();
        let bus = ChangeBus::new();
        let (listener, seen) = recorder();
        bus.subscribe(listener);
        let (mut store, ids) = store_with(&mut scene, &bus, 3);
        let mut config = EditorConfig::default();
        config.center_radius = 20.0;
        store.rerender(&mut scene, &config);
        assert!(seen.borrow().is_empty());
        let after: Vec<GroupId> = store.iter().map(|g| g.id()).collect();
        assert_eq!(after, ids);
        assert!(store.iter().all(|g| g.center().radius == 20.0));
    }
}
