//! Mode system for canvas interactions.
//!
//! A mode is one pluggable interactive behaviour (drawing, editing, the
//! context menu). The [`ModeController`] owns the attached modes and decides
//! which of them receive input. A mode can ask, through its
//! [`ModeContext`], for exclusive input focus (every other mode is
//! deactivated but keeps its state) or for focus to be restored to all.
//!
//! | Mode | Press | Drag | Release | Keys |
//! |------|-------|------|---------|------|
//! | Edit | select / start drag / shift-delete vertex | move target | announce move | Delete, Escape |
//! | Draw | start / add point / close | trailing vertex | - | cancel |
//! | Menu | - | - | show / invoke / hide | Escape |

pub mod draw;
pub mod edit;
pub mod menu;

pub use draw::DrawingMode;
pub use edit::EditMode;
pub use menu::{ContextMenuMode, MenuAction};

use crate::confirm::Confirm;
use crate::input::ToolEvent;
use crate::resolve::Hits;
use pd_core::{ChangeBus, EditorConfig, Palette, Point, PolygonStore, Scene};
use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one mode instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModeId(u64);

/// Identity of one controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControllerId(u64);

impl ModeId {
    fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl ControllerId {
    fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A mode's attachment and activation state.
#[derive(Debug)]
pub struct Binding {
    id: ModeId,
    controller: Option<ControllerId>,
    active: bool,
}

impl Default for Binding {
    fn default() -> Self {
        Self::new()
    }
}

impl Binding {
    pub fn new() -> Self {
        Self {
            id: ModeId::next(),
            controller: None,
            active: false,
        }
    }

    pub fn id(&self) -> ModeId {
        self.id
    }

    pub fn controller(&self) -> Option<ControllerId> {
        self.controller
    }

    pub fn is_attached(&self) -> bool {
        self.controller.is_some()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Start receiving input.
    ///
    /// # Panics
    ///
    /// When the mode is not attached to a controller. There is nothing
    /// sensible to fall back to, so this is treated as a programming error.
    pub fn activate(&mut self, name: &str) {
        if self.controller.is_none() {
            panic!("trying to activate detached mode `{name}`");
        }
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }
}

/// What a mode asked the controller for while handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusRequest {
    /// Deactivate every other mode.
    Exclusive,
    /// Reactivate every mode.
    Restore,
}

/// Everything a mode may read or mutate while handling one event.
pub struct ModeContext<'a> {
    pub scene: &'a mut dyn Scene,
    pub polygons: &'a mut PolygonStore,
    pub bus: &'a ChangeBus,
    pub config: &'a EditorConfig,
    pub palette: &'a mut Palette,
    pub confirm: &'a mut dyn Confirm,
    focus: Option<FocusRequest>,
}

impl<'a> ModeContext<'a> {
    pub fn new(
        scene: &'a mut dyn Scene,
        polygons: &'a mut PolygonStore,
        bus: &'a ChangeBus,
        config: &'a EditorConfig,
        palette: &'a mut Palette,
        confirm: &'a mut dyn Confirm,
    ) -> Self {
        Self {
            scene,
            polygons,
            bus,
            config,
            palette,
            confirm,
            focus: None,
        }
    }

    /// Pointer tolerance in project units at the current zoom.
    pub fn tolerance(&self) -> f64 {
        self.scene.view().hit_tolerance(self.config.pointer_tolerance)
    }

    /// Resolve what lies under `point`.
    pub fn hits(&self, point: Point) -> Hits {
        let raw = self.scene.hit_test_all(point, self.tolerance());
        Hits::resolve(&*self.scene, &*self.polygons, raw)
    }

    pub fn request_exclusive(&mut self) {
        self.focus = Some(FocusRequest::Exclusive);
    }

    pub fn restore_focus(&mut self) {
        self.focus = Some(FocusRequest::Restore);
    }

    fn take_focus(&mut self) -> Option<FocusRequest> {
        self.focus.take()
    }
}

/// Trait for interactive behaviours driven by the controller.
pub trait Mode: Any {
    fn name(&self) -> &'static str;

    fn binding(&self) -> &Binding;

    fn binding_mut(&mut self) -> &mut Binding;

    /// Handle one event. Only called while the mode is active.
    fn handle(&mut self, event: &ToolEvent, ctx: &mut ModeContext<'_>);

    /// Abandon any in-progress interaction and drop transient scene nodes.
    fn cancel(&mut self, _ctx: &mut ModeContext<'_>) {}

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn id(&self) -> ModeId {
        self.binding().id()
    }

    fn is_active(&self) -> bool {
        self.binding().is_active()
    }

    /// See [`Binding::activate`]; panics when detached.
    fn activate(&mut self) {
        let name = self.name();
        self.binding_mut().activate(name);
    }

    fn deactivate(&mut self) {
        self.binding_mut().deactivate();
    }
}

/// Owns attached modes and routes input to the active ones.
pub struct ModeController {
    id: ControllerId,
    modes: Vec<Box<dyn Mode>>,
}

impl Default for ModeController {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeController {
    pub fn new() -> Self {
        Self {
            id: ControllerId::next(),
            modes: Vec::new(),
        }
    }

    pub fn id(&self) -> ControllerId {
        self.id
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    /// Attach `mode`. Attaching a mode that is already attached (same id) is
    /// a no-op. Modes attach inactive.
    pub fn attach(&mut self, mut mode: Box<dyn Mode>) -> ModeId {
        let id = mode.id();
        if self.contains(id) {
            return id;
        }
        let binding = mode.binding_mut();
        binding.controller = Some(self.id);
        binding.active = false;
        log::debug!("attached mode `{}`", mode.name());
        self.modes.push(mode);
        id
    }

    /// Detach and hand back the mode. Unknown ids are ignored.
    pub fn detach(&mut self, id: ModeId) -> Option<Box<dyn Mode>> {
        let pos = self.modes.iter().position(|m| m.id() == id)?;
        let mut mode = self.modes.remove(pos);
        let binding = mode.binding_mut();
        binding.active = false;
        binding.controller = None;
        log::debug!("detached mode `{}`", mode.name());
        Some(mode)
    }

    pub fn contains(&self, id: ModeId) -> bool {
        self.modes.iter().any(|m| m.id() == id)
    }

    pub fn is_active(&self, id: ModeId) -> bool {
        self.modes.iter().any(|m| m.id() == id && m.is_active())
    }

    pub fn activate_all(&mut self) {
        for mode in &mut self.modes {
            mode.activate();
        }
    }

    pub fn deactivate_all(&mut self) {
        for mode in &mut self.modes {
            mode.deactivate();
        }
    }

    /// Give `id` exclusive input focus. The others keep their state.
    pub fn deactivate_all_except(&mut self, id: ModeId) {
        for mode in &mut self.modes {
            if mode.id() != id {
                mode.deactivate();
            }
        }
    }

    pub fn mode<M: Mode>(&self) -> Option<&M> {
        self.modes.iter().find_map(|m| m.as_any().downcast_ref::<M>())
    }

    pub fn mode_mut<M: Mode>(&mut self) -> Option<&mut M> {
        self.modes
            .iter_mut()
            .find_map(|m| m.as_any_mut().downcast_mut::<M>())
    }

    /// Route one event.
    ///
    /// The set of recipients is fixed when dispatch starts. A mode that gets
    /// deactivated by an earlier recipient is skipped; one reactivated during
    /// dispatch first hears the next event.
    pub fn dispatch(&mut self, event: &ToolEvent, ctx: &mut ModeContext<'_>) {
        let recipients: Vec<ModeId> = self
            .modes
            .iter()
            .filter(|m| m.is_active())
            .map(|m| m.id())
            .collect();

        for id in recipients {
            let Some(mode) = self.modes.iter_mut().find(|m| m.id() == id) else {
                continue;
            };
            if !mode.is_active() {
                continue;
            }
            log::trace!("{event:?} -> `{}`", mode.name());
            mode.handle(event, ctx);

            match ctx.take_focus() {
                Some(FocusRequest::Exclusive) => self.deactivate_all_except(id),
                Some(FocusRequest::Restore) => self.activate_all(),
                None => {}
            }
        }
    }

    /// Cancel every mode's in-progress interaction.
    pub fn cancel_all(&mut self, ctx: &mut ModeContext<'_>) {
        for mode in &mut self.modes {
            mode.cancel(ctx);
        }
        ctx.take_focus();
    }
}
