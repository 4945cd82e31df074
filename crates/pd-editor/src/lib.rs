pub mod confirm;
pub mod debounce;
pub mod editor;
pub mod input;
pub mod modes;
pub mod resolve;

pub use confirm::{AlwaysConfirm, Confirm};
pub use debounce::{CHANGE_DEBOUNCE, Clock, Debouncer, ManualClock, SystemClock};
pub use editor::{ChangeCallback, Editor};
pub use input::{InputEvent, Key, Modifiers, MouseButton, PointerTracker, ToolEvent};
pub use modes::{
    ContextMenuMode, DrawingMode, EditMode, MenuAction, Mode, ModeContext, ModeController,
};
pub use resolve::{Hits, PolygonHit, PolygonPart};
