pub mod graph;
pub mod hit;

pub use graph::{SceneGraph, SceneNode};
pub use hit::{hit_test, hit_test_all};
