//! Editor facade: wires the scene, the polygon collection, the change bus,
//! the modes and the debounced host callback together.
//!
//! The host owns the event loop. It feeds [`InputEvent`]s through
//! [`Editor::handle_input`] and calls [`Editor::poll`] regularly (once per
//! animation frame is plenty) so debounced change notifications get
//! delivered.

use crate::confirm::{AlwaysConfirm, Confirm};
use crate::debounce::{Clock, Debouncer, SystemClock};
use crate::input::{InputEvent, PointerTracker};
use crate::modes::{ContextMenuMode, DrawingMode, EditMode, ModeContext, ModeController};
use pd_core::{
    Announce, ChangeBus, ChangeEvent, ConfigField, CoordinateSpace, EditorConfig, EditorError,
    Listener, NodeHandle, Palette, PartialConfig, Payload, Point, PolygonStore, PrimitivePolygon,
    Rect, Scene, Shape, Size, load_primitives, to_primitive,
};
use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

/// Receives the full polygon list, in relative coordinates, after each
/// burst of changes.
pub type ChangeCallback = Box<dyn FnMut(&[PrimitivePolygon])>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Created,
    Running,
    Destroyed,
}

pub struct Editor<S: Scene> {
    scene: S,
    polygons: PolygonStore,
    bus: ChangeBus,
    config: EditorConfig,
    palette: Palette,
    modes: ModeController,
    tracker: PointerTracker,
    confirm: Box<dyn Confirm>,
    clock: Rc<dyn Clock>,
    debounce: Rc<RefCell<Debouncer>>,
    bus_listener: Option<Listener>,
    on_change: Option<ChangeCallback>,
    backdrop: Option<NodeHandle>,
    lifecycle: Lifecycle,
}

impl<S: Scene> Editor<S> {
    pub fn new(scene: S, config: EditorConfig) -> Self {
        Self::with_clock(scene, config, Rc::new(SystemClock::default()))
    }

    /// Like [`Editor::new`] with an explicit time source for the debounce.
    pub fn with_clock(scene: S, config: EditorConfig, clock: Rc<dyn Clock>) -> Self {
        Self {
            scene,
            polygons: PolygonStore::new(),
            bus: ChangeBus::new(),
            config,
            palette: Palette::new(),
            modes: ModeController::new(),
            tracker: PointerTracker::new(),
            confirm: Box::new(AlwaysConfirm),
            clock,
            debounce: Rc::new(RefCell::new(Debouncer::default())),
            bus_listener: None,
            on_change: None,
            backdrop: None,
            lifecycle: Lifecycle::Created,
        }
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    /// Wait for the backdrop to load, then bring the editor up.
    ///
    /// No mode is active (so no input is handled) until this resolves.
    pub async fn init<F>(
        &mut self,
        backdrop: F,
        initial: &[PrimitivePolygon],
    ) -> Result<(), EditorError>
    where
        F: Future<Output = Result<Size, EditorError>>,
    {
        let size = backdrop.await?;
        self.init_with_backdrop(size, initial)
    }

    /// Bring the editor up around an already-loaded backdrop of `image`
    /// pixels.
    ///
    /// The backdrop is fitted into the current view with its aspect ratio
    /// kept, and the view shrinks to the fitted size. `initial` polygons
    /// (relative coordinates) are loaded silently and reported once.
    pub fn init_with_backdrop(
        &mut self,
        image: Size,
        initial: &[PrimitivePolygon],
    ) -> Result<(), EditorError> {
        if self.lifecycle != Lifecycle::Created {
            log::warn!("init called on a {:?} editor, ignoring", self.lifecycle);
            return Ok(());
        }
        if !(image.width > 0.0 && image.height > 0.0) {
            return Err(EditorError::Backdrop(format!(
                "image has no area ({}x{})",
                image.width, image.height
            )));
        }

        let fitted = fit_into(image, self.scene.view().view_size());
        self.scene.view_mut().set_view_size(fitted);
        self.backdrop = Some(self.scene.insert(
            None,
            Shape::Backdrop {
                rect: Rect::from_origin_size(Point::ZERO, fitted),
            },
        ));
        log::debug!("backdrop {image:?} fitted to {fitted:?}");

        let loaded = load_primitives(
            &mut self.polygons,
            &mut self.scene,
            &self.config,
            &self.bus,
            &mut self.palette,
            initial,
        );
        if !initial.is_empty() {
            self.schedule_change();
        }

        let debounce = Rc::clone(&self.debounce);
        let clock = Rc::clone(&self.clock);
        let listener: Listener = Rc::new(move |event: &ChangeEvent| {
            log::trace!("{:?} on {}", event.kind, event.group);
            debounce.borrow_mut().schedule(clock.now());
        });
        self.bus.subscribe(Rc::clone(&listener));
        self.bus_listener = Some(listener);

        self.modes.attach(Box::new(EditMode::new()));
        self.modes.attach(Box::new(ContextMenuMode::new()));
        self.modes.attach(Box::new(DrawingMode::new()));
        self.modes.activate_all();

        self.lifecycle = Lifecycle::Running;
        log::debug!("editor initialised with {loaded} polygon(s)");
        Ok(())
    }

    /// Stop handling input and drop the host callback. Idempotent.
    pub fn destroy(&mut self) {
        if self.lifecycle == Lifecycle::Destroyed {
            return;
        }
        let (modes, mut ctx) = self.split();
        modes.cancel_all(&mut ctx);
        modes.deactivate_all();

        if let Some(listener) = self.bus_listener.take() {
            self.bus.unsubscribe(&listener);
        }
        self.debounce.borrow_mut().cancel();
        self.on_change = None;
        self.lifecycle = Lifecycle::Destroyed;
        log::debug!("editor destroyed");
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    // ─── Change delivery ─────────────────────────────────────────────────

    pub fn set_on_change_listener(&mut self, callback: Option<ChangeCallback>) {
        self.on_change = callback;
    }

    /// Deliver the pending change notification if its delay has elapsed.
    /// Returns whether the callback was due.
    pub fn poll(&mut self) -> bool {
        let now = self.clock.now();
        let due = self.debounce.borrow_mut().poll(now);
        if due {
            self.deliver();
        }
        due
    }

    /// Deliver the pending change notification right away, if any.
    pub fn flush(&mut self) -> bool {
        let pending = self.debounce.borrow_mut().take();
        if pending {
            self.deliver();
        }
        pending
    }

    pub fn has_pending_change(&self) -> bool {
        self.debounce.borrow().is_pending()
    }

    fn schedule_change(&self) {
        self.debounce.borrow_mut().schedule(self.clock.now());
    }

    /// The snapshot is taken now, not when the change was scheduled.
    fn deliver(&mut self) {
        let Some(callback) = self.on_change.as_mut() else {
            return;
        };
        let snapshot = to_primitive(&self.polygons, CoordinateSpace::Relative, self.scene.view());
        log::debug!("delivering {} polygon(s)", snapshot.len());
        callback(&snapshot);
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Install the prompt used for deletion confirmation.
    pub fn set_confirm(&mut self, confirm: Box<dyn Confirm>) {
        self.confirm = confirm;
    }

    /// Route one device-space event. Ignored unless the editor is running.
    pub fn handle_input(&mut self, event: &InputEvent) {
        if self.lifecycle != Lifecycle::Running {
            return;
        }
        if let InputEvent::Wheel { x, y, delta_y } = *event {
            let zoom = self
                .scene
                .view_mut()
                .zoom_at(Point::new(x, y), delta_y < 0.0, self.config.zoom_factor);
            log::trace!("zoom -> {zoom}");
            return;
        }
        let Some(tool_event) = self.tracker.translate(event, self.scene.view()) else {
            return;
        };
        let (modes, mut ctx) = self.split();
        modes.dispatch(&tool_event, &mut ctx);
    }

    fn split(&mut self) -> (&mut ModeController, ModeContext<'_>) {
        (
            &mut self.modes,
            ModeContext::new(
                &mut self.scene,
                &mut self.polygons,
                &self.bus,
                &self.config,
                &mut self.palette,
                &mut *self.confirm,
            ),
        )
    }

    // ─── Index-addressed operations ──────────────────────────────────────

    /// Highlight group `index`, removing any other highlight. Returns
    /// `false` for an unknown index.
    pub fn highlight_by_index(&mut self, index: usize) -> bool {
        if index >= self.polygons.len() {
            return false;
        }
        self.polygons.unhighlight_all(&mut self.scene);
        if let Some(group) = self.polygons.get_mut(index) {
            group.highlight(&mut self.scene);
        }
        true
    }

    pub fn unhighlight_all(&mut self) {
        self.polygons.unhighlight_all(&mut self.scene);
    }

    /// Delete group `index` without confirmation.
    pub fn delete_by_index(&mut self, index: usize) -> bool {
        let Some(id) = self.polygons.get(index).map(|g| g.id()) else {
            return false;
        };
        self.polygons
            .remove(&mut self.scene, &self.bus, id, Announce::Emit)
    }

    /// Replace group `index`'s payload; `None` clears it.
    pub fn set_payload_by_index(&mut self, index: usize, payload: Option<Payload>) -> bool {
        let Some(group) = self.polygons.get_mut(index) else {
            return false;
        };
        group.set_payload(&mut self.scene, &self.config, &self.bus, payload);
        true
    }

    // ─── Configuration ───────────────────────────────────────────────────

    pub fn set_config_field(&mut self, field: ConfigField) {
        self.config.set(field);
        self.rerender();
    }

    pub fn set_config(&mut self, partial: PartialConfig) {
        if partial.is_empty() {
            return;
        }
        self.config.apply(partial);
        self.rerender();
    }

    /// Parse and apply a JSON configuration object.
    pub fn set_config_json(&mut self, json: &str) -> Result<(), EditorError> {
        let partial = PartialConfig::from_json(json)?;
        self.set_config(partial);
        Ok(())
    }

    fn rerender(&mut self) {
        self.polygons.rerender(&mut self.scene, &self.config);
        self.schedule_change();
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    /// Current polygon list in either space.
    pub fn snapshot(&self, space: CoordinateSpace) -> Vec<PrimitivePolygon> {
        to_primitive(&self.polygons, space, self.scene.view())
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn polygons(&self) -> &PolygonStore {
        &self.polygons
    }

    pub fn modes(&self) -> &ModeController {
        &self.modes
    }

    pub fn backdrop(&self) -> Option<NodeHandle> {
        self.backdrop
    }

    pub fn bus(&self) -> &ChangeBus {
        &self.bus
    }
}

/// Largest size with `image`'s aspect ratio that fits inside `bounds`.
fn fit_into(image: Size, bounds: Size) -> Size {
    let scale = (bounds.width / image.width).min(bounds.height / image.height);
    Size::new(image.width * scale, image.height * scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debounce::ManualClock;
    use pd_render::SceneGraph;
    use pretty_assertions::assert_eq;

    #[test]
    fn fit_keeps_aspect() {
        assert_eq!(
            fit_into(Size::new(1600.0, 800.0), Size::new(800.0, 600.0)),
            Size::new(800.0, 400.0)
        );
        assert_eq!(
            fit_into(Size::new(100.0, 300.0), Size::new(800.0, 600.0)),
            Size::new(200.0, 600.0)
        );
    }

    #[test]
    fn input_before_init_is_ignored() {
        let mut editor = Editor::with_clock(
            SceneGraph::default(),
            EditorConfig::default(),
            Rc::new(ManualClock::new()),
        );
        editor.handle_input(&InputEvent::pointer_down(
            10.0,
            10.0,
            crate::input::MouseButton::Left,
        ));
        assert!(editor.scene().is_empty());
        assert!(!editor.is_running());
    }

    #[test]
    fn empty_backdrop_is_an_error() {
        let mut editor = Editor::new(SceneGraph::default(), EditorConfig::default());
        let err = editor
            .init_with_backdrop(Size::new(0.0, 10.0), &[])
            .unwrap_err();
        assert!(matches!(err, EditorError::Backdrop(_)));
    }

    #[test]
    fn destroy_is_idempotent_and_unsubscribes() {
        let mut editor = Editor::new(SceneGraph::default(), EditorConfig::default());
        editor
            .init_with_backdrop(Size::new(800.0, 600.0), &[])
            .unwrap();
        assert_eq!(editor.bus().listener_count(), 1);
        editor.destroy();
        editor.destroy();
        assert_eq!(editor.bus().listener_count(), 0);
        assert!(!editor.is_running());
    }
}
