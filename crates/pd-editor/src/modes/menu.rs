//! Right-click context menu over polygon groups.
//!
//! Releasing the right button over a polygon opens a menu of the actions
//! that apply to the part under the pointer. While open the menu holds
//! exclusive focus; any release that does not land on an item closes it.

use super::{Binding, Mode, ModeContext};
use crate::confirm::confirmed;
use crate::input::{Key, MouseButton, PointerEvent, ToolEvent};
use crate::resolve::{PolygonHit, PolygonPart};
use pd_core::scene::measure_text;
use pd_core::{Announce, Cursor, NodeHandle, Point, Rect, Shape, Size};
use smallvec::SmallVec;
use std::any::Any;

const ITEM_FONT_SIZE: f64 = 12.0;
const ITEM_PADDING: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    DeletePolygon,
    DeleteVertex,
}

impl MenuAction {
    pub const ALL: [MenuAction; 2] = [MenuAction::DeletePolygon, MenuAction::DeleteVertex];

    /// Whether the action makes sense for a hit on `part`.
    pub fn applies_to(self, part: PolygonPart) -> bool {
        match self {
            MenuAction::DeletePolygon => true,
            MenuAction::DeleteVertex => matches!(part, PolygonPart::Vertex(_)),
        }
    }

    fn label(self, config: &pd_core::EditorConfig) -> &str {
        match self {
            MenuAction::DeletePolygon => &config.delete_polygon_label,
            MenuAction::DeleteVertex => &config.delete_vertex_label,
        }
    }
}

/// One visible row.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuEntry {
    pub node: NodeHandle,
    pub action: MenuAction,
    pub label: String,
    pub rect: Rect,
    pub hovered: bool,
}

type Entries = SmallVec<[MenuEntry; 2]>;

#[derive(Debug, Clone, PartialEq)]
pub enum MenuState {
    Hidden,
    Shown {
        target: PolygonHit,
        anchor: Point,
        container: NodeHandle,
        items: Entries,
    },
}

pub struct ContextMenuMode {
    binding: Binding,
    state: MenuState,
}

impl Default for ContextMenuMode {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextMenuMode {
    pub fn new() -> Self {
        Self {
            binding: Binding::new(),
            state: MenuState::Hidden,
        }
    }

    pub fn state(&self) -> &MenuState {
        &self.state
    }

    pub fn is_shown(&self) -> bool {
        matches!(self.state, MenuState::Shown { .. })
    }

    /// Visible rows, top to bottom. Empty while hidden.
    pub fn items(&self) -> &[MenuEntry] {
        match &self.state {
            MenuState::Shown { items, .. } => items,
            MenuState::Hidden => &[],
        }
    }

    /// Run row `index` and close the menu. Returns `false` when there is no
    /// such row.
    pub fn invoke(&mut self, index: usize, ctx: &mut ModeContext<'_>) -> bool {
        let (target, action) = match &self.state {
            MenuState::Shown { target, items, .. } => match items.get(index) {
                Some(item) => (*target, item.action),
                None => return false,
            },
            MenuState::Hidden => return false,
        };
        self.hide(ctx);
        ctx.restore_focus();
        log::debug!("menu action {action:?} on {}", target.group);

        match action {
            MenuAction::DeletePolygon => {
                if confirmed(
                    ctx.confirm,
                    ctx.config.confirm_deletion,
                    &ctx.config.delete_confirm_text,
                ) {
                    ctx.polygons
                        .remove(ctx.scene, ctx.bus, target.group, Announce::Emit);
                }
            }
            MenuAction::DeleteVertex => {
                if let PolygonPart::Vertex(index) = target.part {
                    ctx.polygons
                        .remove_vertex(ctx.scene, ctx.bus, target.group, index);
                }
            }
        }
        true
    }

    fn show(&mut self, target: PolygonHit, anchor: Point, ctx: &mut ModeContext<'_>) {
        if let Some(group) = ctx.polygons.by_id(target.group) {
            ctx.scene.set_selected(group.nodes().outline, false);
        }

        // Rows keep a constant on-screen size whatever the zoom.
        let scale = 1.0 / ctx.scene.view().zoom();
        let actions: SmallVec<[(MenuAction, String, Size); 2]> = MenuAction::ALL
            .into_iter()
            .filter(|action| action.applies_to(target.part))
            .map(|action| {
                let label = action.label(ctx.config).to_string();
                let text = measure_text(&label, ITEM_FONT_SIZE);
                let size = Size::new(
                    (text.width + ITEM_PADDING * 2.0) * scale,
                    (text.height + ITEM_PADDING * 2.0) * scale,
                );
                (action, label, size)
            })
            .collect();
        let width = actions
            .iter()
            .map(|(_, _, size)| size.width)
            .fold(0.0, f64::max);

        let container = ctx.scene.insert(None, Shape::Group);
        let mut top = anchor.y;
        let items: Entries = actions
            .into_iter()
            .map(|(action, label, size)| {
                let rect = Rect::new(anchor.x, top, anchor.x + width, top + size.height);
                top += size.height;
                let node = ctx.scene.insert(
                    Some(container),
                    Shape::MenuItem {
                        rect,
                        label: label.clone(),
                        hovered: false,
                    },
                );
                MenuEntry {
                    node,
                    action,
                    label,
                    rect,
                    hovered: false,
                }
            })
            .collect();

        log::debug!(
            "menu opened on {} with {} item(s)",
            target.group,
            items.len()
        );
        self.state = MenuState::Shown {
            target,
            anchor,
            container,
            items,
        };
        ctx.request_exclusive();
    }

    fn hide(&mut self, ctx: &mut ModeContext<'_>) {
        if let MenuState::Shown { container, .. } =
            std::mem::replace(&mut self.state, MenuState::Hidden)
        {
            ctx.scene.remove(container);
            ctx.scene.set_cursor(Cursor::Default);
        }
    }

    fn item_under(&self, pointer: Point, ctx: &ModeContext<'_>) -> Option<usize> {
        let hits = ctx.hits(pointer);
        self.items()
            .iter()
            .position(|item| hits.is_topmost(item.node))
    }

    fn on_release(&mut self, pointer: &PointerEvent, ctx: &mut ModeContext<'_>) {
        if self.is_shown() {
            if pointer.button == MouseButton::Left
                && let Some(index) = self.item_under(pointer.point, ctx)
            {
                self.invoke(index, ctx);
                return;
            }
            self.hide(ctx);
            ctx.restore_focus();
        }

        if pointer.button == MouseButton::Right
            && let Some(target) = ctx.hits(pointer.point).polygon()
        {
            self.show(target, pointer.point, ctx);
        }
    }

    fn on_move(&mut self, pointer: &PointerEvent, ctx: &mut ModeContext<'_>) {
        let hovered = self.item_under(pointer.point, ctx);
        let MenuState::Shown { items, .. } = &mut self.state else {
            return;
        };
        for (i, item) in items.iter_mut().enumerate() {
            let on = hovered == Some(i);
            if item.hovered != on {
                item.hovered = on;
                ctx.scene.update(
                    item.node,
                    Shape::MenuItem {
                        rect: item.rect,
                        label: item.label.clone(),
                        hovered: on,
                    },
                );
            }
        }
        ctx.scene.set_cursor(if hovered.is_some() {
            Cursor::Pointer
        } else {
            Cursor::Default
        });
    }
}

impl Mode for ContextMenuMode {
    fn name(&self) -> &'static str {
        "menu"
    }

    fn binding(&self) -> &Binding {
        &self.binding
    }

    fn binding_mut(&mut self) -> &mut Binding {
        &mut self.binding
    }

    fn handle(&mut self, event: &ToolEvent, ctx: &mut ModeContext<'_>) {
        match event {
            ToolEvent::Release(pointer) => self.on_release(pointer, ctx),
            ToolEvent::Move(pointer) | ToolEvent::Drag(pointer) => self.on_move(pointer, ctx),
            ToolEvent::Key {
                key: Key::Escape, ..
            } if self.is_shown() => {
                self.hide(ctx);
                ctx.restore_focus();
            }
            ToolEvent::Press(_) | ToolEvent::Key { .. } => {}
        }
    }

    fn cancel(&mut self, ctx: &mut ModeContext<'_>) {
        self.hide(ctx);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
