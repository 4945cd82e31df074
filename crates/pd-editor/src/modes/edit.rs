//! Drag editing of existing groups.
//!
//! ## Press behaviour
//!
//! | Target | Plain | Shift |
//! |--------|-------|-------|
//! | Center marker | drag the marker | - |
//! | Vertex | select group, drag vertex | delete vertex |
//! | Edge | select group, insert vertex, drag it | - |
//! | Fill | select group, drag group | - |
//! | Empty canvas | clear selection | - |
//!
//! A drag announces its move once on release, and only if the pointer
//! actually moved.

use super::{Binding, Mode, ModeContext};
use crate::confirm::confirmed;
use crate::input::{Key, MouseButton, PointerEvent, ToolEvent};
use crate::resolve::PolygonPart;
use pd_core::{Announce, Cursor, GroupId, Vec2};
use std::any::Any;

/// What the current drag moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    Idle,
    Vertex { group: GroupId, index: usize },
    Group(GroupId),
    Center(GroupId),
}

pub struct EditMode {
    binding: Binding,
    drag: DragTarget,
    did_drag: bool,
    selected: Option<GroupId>,
}

impl Default for EditMode {
    fn default() -> Self {
        Self::new()
    }
}

impl EditMode {
    pub fn new() -> Self {
        Self {
            binding: Binding::new(),
            drag: DragTarget::Idle,
            did_drag: false,
            selected: None,
        }
    }

    pub fn drag_target(&self) -> DragTarget {
        self.drag
    }

    /// The click-selected group, if any.
    pub fn selected(&self) -> Option<GroupId> {
        self.selected
    }

    fn select(&mut self, group: GroupId, ctx: &mut ModeContext<'_>) {
        self.clear_selection(ctx);
        if let Some(g) = ctx.polygons.by_id(group) {
            g.set_emphasis(ctx.scene, true);
        }
        self.selected = Some(group);
    }

    fn clear_selection(&mut self, ctx: &mut ModeContext<'_>) {
        if let Some(previous) = self.selected.take()
            && let Some(g) = ctx.polygons.by_id(previous)
        {
            g.set_emphasis(ctx.scene, false);
        }
    }

    fn on_press(&mut self, pointer: &PointerEvent, ctx: &mut ModeContext<'_>) {
        if pointer.button != MouseButton::Left {
            return;
        }
        self.did_drag = false;
        self.drag = DragTarget::Idle;

        let hits = ctx.hits(pointer.point);

        if pointer.modifiers.shift
            && let Some(hit) = hits.polygon()
        {
            if let PolygonPart::Vertex(index) = hit.part {
                ctx.polygons
                    .remove_vertex(ctx.scene, ctx.bus, hit.group, index);
            }
            return;
        }

        if let Some(group) = hits.center() {
            self.drag = DragTarget::Center(group);
            return;
        }

        if let Some(hit) = hits.polygon() {
            self.select(hit.group, ctx);
            self.drag = match hit.part {
                PolygonPart::Vertex(index) => DragTarget::Vertex {
                    group: hit.group,
                    index,
                },
                PolygonPart::Edge(edge) => {
                    let index = edge + 1;
                    ctx.polygons
                        .insert_vertex(ctx.scene, ctx.bus, hit.group, index, pointer.point);
                    DragTarget::Vertex {
                        group: hit.group,
                        index,
                    }
                }
                PolygonPart::Fill => DragTarget::Group(hit.group),
            };
            return;
        }

        self.clear_selection(ctx);
    }

    fn on_drag(&mut self, pointer: &PointerEvent, ctx: &mut ModeContext<'_>) {
        let delta = pointer.delta;
        if self.drag == DragTarget::Idle || delta == Vec2::ZERO {
            return;
        }
        self.did_drag = true;
        match self.drag {
            DragTarget::Vertex { group, index } => {
                if let Some(g) = ctx.polygons.by_id_mut(group) {
                    g.move_vertex(ctx.scene, index, delta);
                }
            }
            DragTarget::Group(group) => {
                if let Some(g) = ctx.polygons.by_id_mut(group) {
                    g.translate(ctx.scene, delta);
                }
            }
            DragTarget::Center(group) => {
                if let Some(g) = ctx.polygons.by_id_mut(group) {
                    g.move_center(ctx.scene, delta);
                }
            }
            DragTarget::Idle => {}
        }
    }

    fn on_release(&mut self, ctx: &mut ModeContext<'_>) {
        let target = std::mem::replace(&mut self.drag, DragTarget::Idle);
        if !std::mem::take(&mut self.did_drag) {
            return;
        }
        log::trace!("drag finished: {target:?}");
        match target {
            DragTarget::Vertex { group, .. } => ctx.bus.vertex_moved(group),
            DragTarget::Group(group) => ctx.bus.group_moved(group),
            DragTarget::Center(group) => ctx.bus.center_moved(group),
            DragTarget::Idle => {}
        }
    }

    /// Emphasize the selected group and whatever group is under the pointer.
    fn on_hover(&mut self, pointer: &PointerEvent, ctx: &mut ModeContext<'_>) {
        let hits = ctx.hits(pointer.point);
        ctx.scene.clear_selection();

        if let Some(selected) = self.selected {
            match ctx.polygons.by_id(selected) {
                Some(g) => g.set_emphasis(ctx.scene, true),
                None => self.selected = None,
            }
        }
        if let Some(hovered) = hits.group()
            && let Some(g) = ctx.polygons.by_id(hovered)
        {
            g.set_emphasis(ctx.scene, true);
        }
        ctx.scene.set_cursor(if hits.center().is_some() {
            Cursor::Pointer
        } else {
            Cursor::Default
        });
    }

    fn on_key(&mut self, key: &Key, ctx: &mut ModeContext<'_>) {
        let Some(selected) = self.selected else {
            return;
        };
        match key {
            Key::Delete => {
                if confirmed(
                    ctx.confirm,
                    ctx.config.confirm_deletion,
                    &ctx.config.delete_confirm_text,
                ) {
                    self.selected = None;
                    ctx.polygons
                        .remove(ctx.scene, ctx.bus, selected, Announce::Emit);
                }
            }
            Key::Escape => self.clear_selection(ctx),
            Key::Other(_) => {}
        }
    }
}

impl Mode for EditMode {
    fn name(&self) -> &'static str {
        "edit"
    }

    fn binding(&self) -> &Binding {
        &self.binding
    }

    fn binding_mut(&mut self) -> &mut Binding {
        &mut self.binding
    }

    fn handle(&mut self, event: &ToolEvent, ctx: &mut ModeContext<'_>) {
        match event {
            ToolEvent::Press(pointer) => self.on_press(pointer, ctx),
            ToolEvent::Drag(pointer) => self.on_drag(pointer, ctx),
            ToolEvent::Release(_) => self.on_release(ctx),
            ToolEvent::Move(pointer) => self.on_hover(pointer, ctx),
            ToolEvent::Key { key, .. } => self.on_key(key, ctx),
        }
    }

    fn cancel(&mut self, ctx: &mut ModeContext<'_>) {
        self.drag = DragTarget::Idle;
        self.did_drag = false;
        self.clear_selection(ctx);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;
    use pd_core::{
        ChangeBus, ChangeEvent, ChangeKind, Color, EditorConfig, GroupSeed, Palette, Point,
        PolygonStore, Scene, Vec2,
    };
    use pd_render::SceneGraph;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Rig {
        scene: SceneGraph,
        store: PolygonStore,
        bus: ChangeBus,
        config: EditorConfig,
        palette: Palette,
        mode: EditMode,
        answer: bool,
        events: Rc<RefCell<Vec<ChangeEvent>>>,
        id: GroupId,
    }

    impl Rig {
        fn new() -> Self {
            let mut scene = SceneGraph::default();
            let mut store = PolygonStore::new();
            let bus = ChangeBus::new();
            let config = EditorConfig::default();
            let id = store
                .create(
                    &mut scene,
                    &config,
                    &bus,
                    GroupSeed {
                        outline: vec![
                            Point::new(100.0, 100.0),
                            Point::new(300.0, 100.0),
                            Point::new(300.0, 300.0),
                            Point::new(100.0, 300.0),
                        ],
                        center: Some(Point::new(150.0, 150.0)),
                        color: Color::rgba(0.99, 0.0, 0.0, 0.7),
                        payload: None,
                    },
                    Announce::Silent,
                )
                .unwrap();
            let events: Rc<RefCell<Vec<ChangeEvent>>> = Rc::default();
            let sink = Rc::clone(&events);
            bus.subscribe(Rc::new(move |e: &ChangeEvent| sink.borrow_mut().push(*e)));
            Self {
                scene,
                store,
                bus,
                config,
                palette: Palette::new(),
                mode: EditMode::new(),
                answer: true,
                events,
                id,
            }
        }

        fn send(&mut self, event: ToolEvent) {
            let answer = self.answer;
            let mut confirm = move |_: &str| answer;
            let mut ctx = ModeContext::new(
                &mut self.scene,
                &mut self.store,
                &self.bus,
                &self.config,
                &mut self.palette,
                &mut confirm,
            );
            self.mode.handle(&event, &mut ctx);
        }

        fn press(&mut self, x: f64, y: f64, modifiers: Modifiers) {
            self.send(ToolEvent::Press(PointerEvent {
                point: Point::new(x, y),
                delta: Vec2::ZERO,
                button: MouseButton::Left,
                modifiers,
            }));
        }

        fn drag(&mut self, x: f64, y: f64, dx: f64, dy: f64) {
            self.send(ToolEvent::Drag(PointerEvent {
                point: Point::new(x, y),
                delta: Vec2::new(dx, dy),
                button: MouseButton::Left,
                modifiers: Modifiers::NONE,
            }));
        }

        fn release(&mut self, x: f64, y: f64) {
            self.send(ToolEvent::Release(PointerEvent {
                point: Point::new(x, y),
                delta: Vec2::ZERO,
                button: MouseButton::Left,
                modifiers: Modifiers::NONE,
            }));
        }

        fn kinds(&self) -> Vec<ChangeKind> {
            self.events.borrow().iter().map(|e| e.kind).collect()
        }

        fn outline(&self) -> Vec<Point> {
            self.store.by_id(self.id).unwrap().outline().to_vec()
        }
    }

    #[test]
    fn vertex_drag_emits_one_move() {
        let mut rig = Rig::new();
        rig.press(300.0, 100.0, Modifiers::NONE);
        assert_eq!(
            rig.mode.drag_target(),
            DragTarget::Vertex {
                group: rig.id,
                index: 1
            }
        );
        rig.drag(305.0, 100.0, 5.0, 0.0);
        rig.drag(310.0, 104.0, 5.0, 4.0);
        rig.release(310.0, 104.0);

        assert_eq!(rig.outline()[1], Point::new(310.0, 104.0));
        assert_eq!(rig.kinds(), vec![ChangeKind::VertexMoved]);
        assert_eq!(rig.mode.drag_target(), DragTarget::Idle);
    }

    #[test]
    fn click_without_motion_emits_nothing() {
        let mut rig = Rig::new();
        rig.press(300.0, 100.0, Modifiers::NONE);
        rig.release(300.0, 100.0);
        assert!(rig.kinds().is_empty());
        assert_eq!(rig.mode.selected(), Some(rig.id));
        assert!(rig.scene.is_selected(rig.store.by_id(rig.id).unwrap().nodes().outline));
    }

    #[test]
    fn stationary_drag_emits_nothing() {
        let mut rig = Rig::new();
        rig.press(300.0, 100.0, Modifiers::NONE);
        rig.drag(300.0, 100.0, 0.0, 0.0);
        rig.release(300.0, 100.0);
        assert!(rig.kinds().is_empty());
        assert_eq!(rig.outline()[1], Point::new(300.0, 100.0));

        rig.press(150.0, 150.0, Modifiers::NONE);
        assert_eq!(rig.mode.drag_target(), DragTarget::Center(rig.id));
        rig.drag(150.0, 150.0, 0.0, 0.0);
        rig.release(150.0, 150.0);
        assert!(rig.kinds().is_empty());
    }

    #[test]
    fn edge_press_inserts_vertex_and_drags_it() {
        let mut rig = Rig::new();
        rig.press(200.0, 102.0, Modifiers::NONE);
        assert_eq!(rig.outline().len(), 5);
        assert_eq!(rig.outline()[1], Point::new(200.0, 102.0));
        rig.drag(200.0, 90.0, 0.0, -12.0);
        rig.release(200.0, 90.0);
        assert_eq!(rig.outline()[1], Point::new(200.0, 90.0));
        assert_eq!(
            rig.kinds(),
            vec![ChangeKind::VertexAdded, ChangeKind::VertexMoved]
        );
    }

    #[test]
    fn fill_drag_moves_group_and_center() {
        let mut rig = Rig::new();
        rig.press(250.0, 250.0, Modifiers::NONE);
        rig.drag(260.0, 250.0, 10.0, 0.0);
        rig.release(260.0, 250.0);
        assert_eq!(rig.outline()[0], Point::new(110.0, 100.0));
        let group = rig.store.by_id(rig.id).unwrap();
        assert_eq!(group.center().position, Point::new(160.0, 150.0));
        assert_eq!(rig.kinds(), vec![ChangeKind::GroupMoved]);
    }

    #[test]
    fn center_drag_moves_only_the_marker() {
        let mut rig = Rig::new();
        rig.press(150.0, 150.0, Modifiers::NONE);
        assert_eq!(rig.mode.drag_target(), DragTarget::Center(rig.id));
        rig.drag(170.0, 150.0, 20.0, 0.0);
        rig.release(170.0, 150.0);
        assert_eq!(rig.outline()[0], Point::new(100.0, 100.0));
        assert_eq!(
            rig.store.by_id(rig.id).unwrap().center().position,
            Point::new(170.0, 150.0)
        );
        assert_eq!(rig.kinds(), vec![ChangeKind::CenterMoved]);
        assert_eq!(rig.mode.selected(), None, "center press does not select");
    }

    #[test]
    fn shift_press_deletes_vertex_only_on_vertices() {
        let mut rig = Rig::new();
        rig.press(200.0, 100.0, Modifiers::SHIFT);
        assert_eq!(rig.outline().len(), 4, "edge is not a vertex");
        rig.press(300.0, 100.0, Modifiers::SHIFT);
        assert_eq!(rig.outline().len(), 3);
        assert_eq!(rig.kinds(), vec![ChangeKind::VertexRemoved]);
        assert_eq!(rig.mode.drag_target(), DragTarget::Idle);
    }

    #[test]
    fn delete_key_honours_confirmation() {
        let mut rig = Rig::new();
        rig.press(250.0, 250.0, Modifiers::NONE);
        rig.release(250.0, 250.0);

        rig.answer = false;
        rig.send(ToolEvent::Key {
            key: Key::Delete,
            modifiers: Modifiers::NONE,
        });
        assert_eq!(rig.store.len(), 1);

        rig.answer = true;
        rig.send(ToolEvent::Key {
            key: Key::Delete,
            modifiers: Modifiers::NONE,
        });
        assert!(rig.store.is_empty());
        assert_eq!(rig.kinds(), vec![ChangeKind::GroupRemoved]);
        assert_eq!(rig.mode.selected(), None);
    }

    #[test]
    fn empty_press_and_escape_clear_selection() {
        let mut rig = Rig::new();
        rig.press(250.0, 250.0, Modifiers::NONE);
        rig.release(250.0, 250.0);
        rig.press(600.0, 500.0, Modifiers::NONE);
        assert_eq!(rig.mode.selected(), None);

        rig.press(250.0, 250.0, Modifiers::NONE);
        rig.send(ToolEvent::Key {
            key: Key::Escape,
            modifiers: Modifiers::NONE,
        });
        assert_eq!(rig.mode.selected(), None);
        assert!(!rig.scene.is_selected(rig.store.by_id(rig.id).unwrap().nodes().outline));
    }

    #[test]
    fn hover_emphasizes_and_sets_cursor() {
        let mut rig = Rig::new();
        rig.send(ToolEvent::Move(PointerEvent {
            point: Point::new(150.0, 150.0),
            delta: Vec2::ZERO,
            button: MouseButton::None,
            modifiers: Modifiers::NONE,
        }));
        let outline = rig.store.by_id(rig.id).unwrap().nodes().outline;
        assert!(rig.scene.is_selected(outline));
        assert_eq!(rig.scene.cursor(), Cursor::Pointer);

        rig.send(ToolEvent::Move(PointerEvent {
            point: Point::new(600.0, 500.0),
            delta: Vec2::ZERO,
            button: MouseButton::None,
            modifiers: Modifiers::NONE,
        }));
        assert!(!rig.scene.is_selected(outline));
        assert_eq!(rig.scene.cursor(), Cursor::Default);
    }

    #[test]
    fn hover_just_off_a_corner_emphasizes_nothing() {
        let mut rig = Rig::new();
        // Within the tolerance-inflated bounding box, beyond every vertex
        // and edge.
        rig.send(ToolEvent::Move(PointerEvent {
            point: Point::new(308.0, 308.0),
            delta: Vec2::ZERO,
            button: MouseButton::None,
            modifiers: Modifiers::NONE,
        }));
        let outline = rig.store.by_id(rig.id).unwrap().nodes().outline;
        assert!(!rig.scene.is_selected(outline));
    }
}
