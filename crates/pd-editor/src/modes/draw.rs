//! Freehand polygon drawing.
//!
//! A left press on empty canvas starts an outline and takes exclusive focus.
//! Each further press commits a vertex; pressing near the first vertex
//! closes the outline. While drawing, a trailing vertex follows the pointer
//! and snaps onto the first vertex when close enough.

use super::{Binding, Mode, ModeContext};
use crate::input::{MouseButton, PointerEvent, ToolEvent};
use pd_core::{Announce, Color, Cursor, GroupSeed, NodeHandle, Point, Shape};
use std::any::Any;

const DRAFT_STROKE: Color = Color::rgba(0.102, 0.612, 0.922, 1.0);

/// Per-axis proximity test used for closing and snapping.
fn near(a: Point, b: Point, tolerance: f64) -> bool {
    (a.x - b.x).abs() < tolerance && (a.y - b.y).abs() < tolerance
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawState {
    Idle,
    Drawing {
        /// Committed vertices.
        points: Vec<Point>,
        /// Cursor-following vertex; never counted as committed.
        trailing: Point,
        closeable: bool,
        draft: NodeHandle,
    },
}

pub struct DrawingMode {
    binding: Binding,
    state: DrawState,
}

impl Default for DrawingMode {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawingMode {
    pub fn new() -> Self {
        Self {
            binding: Binding::new(),
            state: DrawState::Idle,
        }
    }

    pub fn state(&self) -> &DrawState {
        &self.state
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, DrawState::Drawing { .. })
    }

    fn on_press(&mut self, pointer: &PointerEvent, ctx: &mut ModeContext<'_>) {
        if pointer.button != MouseButton::Left || pointer.modifiers.alt {
            return;
        }
        let tolerance = ctx.tolerance();
        match &mut self.state {
            DrawState::Idle => {
                if ctx.hits(pointer.point).any() {
                    return;
                }
                self.start(pointer.point, ctx);
            }
            DrawState::Drawing { points, .. } => {
                if points
                    .first()
                    .is_some_and(|first| near(*first, pointer.point, tolerance))
                {
                    self.finish(ctx);
                } else {
                    points.push(pointer.point);
                    self.set_trailing(pointer.point, tolerance, ctx);
                }
            }
        }
    }

    fn start(&mut self, point: Point, ctx: &mut ModeContext<'_>) {
        let draft = ctx.scene.insert(
            None,
            Shape::Draft {
                points: vec![point, point],
                stroke: DRAFT_STROKE,
            },
        );
        ctx.scene.set_selected(draft, true);
        self.state = DrawState::Drawing {
            points: vec![point],
            trailing: point,
            closeable: false,
            draft,
        };
        log::debug!("drawing started at {point:?}");
        ctx.request_exclusive();
    }

    /// Close the outline. Three or more committed vertices become a group;
    /// anything shorter is dropped without a trace.
    fn finish(&mut self, ctx: &mut ModeContext<'_>) {
        let state = std::mem::replace(&mut self.state, DrawState::Idle);
        let DrawState::Drawing { points, draft, .. } = state else {
            return;
        };
        ctx.scene.remove(draft);
        ctx.scene.set_cursor(Cursor::Default);

        if points.len() >= 3 {
            let seed = GroupSeed {
                outline: points,
                center: None,
                color: ctx.palette.next_color(ctx.config.fill_opacity),
                payload: None,
            };
            match ctx
                .polygons
                .create(ctx.scene, ctx.config, ctx.bus, seed, Announce::Emit)
            {
                Ok(id) => log::debug!("drawing closed as {id}"),
                Err(err) => log::warn!("drawing could not be closed: {err}"),
            }
        } else {
            log::debug!("drawing discarded with {} vertex(es)", points.len());
        }
        ctx.restore_focus();
    }

    fn set_trailing(&mut self, pointer: Point, tolerance: f64, ctx: &mut ModeContext<'_>) {
        let DrawState::Drawing {
            points,
            trailing,
            closeable,
            draft,
        } = &mut self.state
        else {
            return;
        };
        let first = points[0];
        *closeable = near(pointer, first, tolerance);
        *trailing = if *closeable { first } else { pointer };

        let mut outline = points.clone();
        outline.push(*trailing);
        ctx.scene.update(
            *draft,
            Shape::Draft {
                points: outline,
                stroke: DRAFT_STROKE,
            },
        );
        ctx.scene.set_cursor(if *closeable {
            Cursor::Pointer
        } else {
            Cursor::Default
        });
    }
}

impl Mode for DrawingMode {
    fn name(&self) -> &'static str {
        "draw"
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
            ToolEvent::Move(pointer) | ToolEvent::Drag(pointer) => {
                if self.is_drawing() {
                    let tolerance = ctx.tolerance();
                    self.set_trailing(pointer.point, tolerance, ctx);
                }
            }
            ToolEvent::Release(_) => {}
            ToolEvent::Key { key, .. } => {
                if self.is_drawing() && key.is_cancel() {
                    self.cancel(ctx);
                    ctx.restore_focus();
                }
            }
        }
    }

    fn cancel(&mut self, ctx: &mut ModeContext<'_>) {
        if let DrawState::Drawing { draft, .. } = self.state {
            ctx.scene.remove(draft);
            ctx.scene.set_cursor(Cursor::Default);
            log::debug!("drawing cancelled");
        }
        self.state = DrawState::Idle;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
