//! Input abstraction layer.
//!
//! Hosts feed device-space [`InputEvent`]s (view pixels, as reported by the
//! browser). The [`PointerTracker`] turns them into project-space
//! [`ToolEvent`]s with per-event deltas, which is what modes consume.

use pd_core::{Point, Vec2, ViewTransform};

/// Keyboard modifiers held during an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseButton {
    /// No button involved (plain hover).
    #[default]
    None,
    Left,
    Middle,
    Right,
    Other,
}

impl MouseButton {
    /// Map a DOM `MouseEvent.button` index.
    pub fn from_index(index: i32) -> Self {
        match index {
            0 => Self::Left,
            1 => Self::Middle,
            2 => Self::Right,
            i if i < 0 => Self::None,
            _ => Self::Other,
        }
    }
}

/// The keys the editor reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Delete,
    Escape,
    Other(String),
}

impl Key {
    /// Parse a key name (`"Delete"`, `"escape"`, …), ignoring case.
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("delete") {
            Self::Delete
        } else if name.eq_ignore_ascii_case("escape") {
            Self::Escape
        } else {
            Self::Other(name.to_string())
        }
    }

    /// Delete and escape both abort in-progress work.
    pub fn is_cancel(&self) -> bool {
        matches!(self, Self::Delete | Self::Escape)
    }
}

/// A normalized device-space input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown {
        x: f64,
        y: f64,
        button: MouseButton,
        modifiers: Modifiers,
    },
    PointerMove {
        x: f64,
        y: f64,
        modifiers: Modifiers,
    },
    PointerUp {
        x: f64,
        y: f64,
        button: MouseButton,
        modifiers: Modifiers,
    },
    /// Mouse wheel; negative `delta_y` zooms in.
    Wheel { x: f64, y: f64, delta_y: f64 },
    Key { key: Key, modifiers: Modifiers },
}

impl InputEvent {
    pub fn pointer_down(x: f64, y: f64, button: MouseButton) -> Self {
        Self::PointerDown {
            x,
            y,
            button,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn pointer_move(x: f64, y: f64) -> Self {
        Self::PointerMove {
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn pointer_up(x: f64, y: f64, button: MouseButton) -> Self {
        Self::PointerUp {
            x,
            y,
            button,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn key(name: &str) -> Self {
        Self::Key {
            key: Key::from_name(name),
            modifiers: Modifiers::NONE,
        }
    }

    /// Device-space position if this is a pointer or wheel event.
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y, .. }
            | Self::PointerUp { x, y, .. }
            | Self::Wheel { x, y, .. } => Some(Point::new(*x, *y)),
            Self::Key { .. } => None,
        }
    }
}

/// Project-space pointer data handed to modes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub point: Point,
    /// Motion since the previous pointer event.
    pub delta: Vec2,
    pub button: MouseButton,
    pub modifiers: Modifiers,
}

/// What a mode sees.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolEvent {
    Press(PointerEvent),
    /// Motion with no button held.
    Move(PointerEvent),
    /// Motion with a button held; `button` is the held one.
    Drag(PointerEvent),
    Release(PointerEvent),
    Key { key: Key, modifiers: Modifiers },
}

/// Tracks button state and the last pointer position across events.
#[derive(Debug, Default)]
pub struct PointerTracker {
    held: Option<MouseButton>,
    last: Option<Point>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.held.is_some()
    }

    /// Convert a device event. Wheel events are view operations and yield
    /// `None`.
    pub fn translate(&mut self, event: &InputEvent, view: &ViewTransform) -> Option<ToolEvent> {
        match event {
            InputEvent::PointerDown {
                x,
                y,
                button,
                modifiers,
            } => {
                let pointer = self.step(Point::new(*x, *y), *button, *modifiers, view);
                self.held = Some(*button);
                Some(ToolEvent::Press(pointer))
            }
            InputEvent::PointerMove { x, y, modifiers } => match self.held {
                Some(button) => Some(ToolEvent::Drag(self.step(
                    Point::new(*x, *y),
                    button,
                    *modifiers,
                    view,
                ))),
                None => Some(ToolEvent::Move(self.step(
                    Point::new(*x, *y),
                    MouseButton::None,
                    *modifiers,
                    view,
                ))),
            },
            InputEvent::PointerUp {
                x,
                y,
                button,
                modifiers,
            } => {
                let pointer = self.step(Point::new(*x, *y), *button, *modifiers, view);
                self.held = None;
                Some(ToolEvent::Release(pointer))
            }
            InputEvent::Wheel { .. } => None,
            InputEvent::Key { key, modifiers } => Some(ToolEvent::Key {
                key: key.clone(),
                modifiers: *modifiers,
            }),
        }
    }

    fn step(
        &mut self,
        device: Point,
        button: MouseButton,
        modifiers: Modifiers,
        view: &ViewTransform,
    ) -> PointerEvent {
        let point = view.view_to_project(device);
        let delta = self.last.map_or(Vec2::ZERO, |last| point - last);
        self.last = Some(point);
        PointerEvent {
            point,
            delta,
            button,
            modifiers,
        }
    }
}
