pub mod bus;
pub mod config;
pub mod coords;
pub mod error;
pub mod group;
pub mod id;
pub mod model;
pub mod palette;
pub mod primitive;
pub mod scene;
pub mod store;
pub mod view;

pub use bus::{ChangeBus, ChangeEvent, ChangeKind, Listener};
pub use config::{ConfigField, EditorConfig, LabelFormatter, PartialConfig};
pub use coords::{CoordinateSpace, to_absolute, to_relative};
pub use error::EditorError;
pub use group::{GroupNodes, GroupSeed, NodeRole, PolygonGroup};
pub use id::GroupId;
pub use model::*;
pub use palette::Palette;
pub use primitive::{PrimitivePoint, PrimitivePolygon, load_primitives, to_primitive};
pub use scene::{Cursor, HitKind, NodeHandle, RawHit, Scene, Shape};
pub use store::{Announce, PolygonStore, VertexRemoval};
pub use view::ViewTransform;

// Re-export kurbo geometry so downstream crates and hosts share one version
pub use kurbo::{Point, Rect, Size, Vec2};
