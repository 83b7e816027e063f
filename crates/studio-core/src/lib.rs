pub mod compose;
pub mod document;
pub mod geometry;
pub mod guides;
pub mod hit;
pub mod id;
pub mod model;

pub use document::{Document, Selection};
pub use geometry::{AlignEdge, Axis, ResizeHandle};
pub use guides::{Guide, GuideSettings, smart_guides};
pub use hit::hit_test;
pub use id::LayerId;
pub use model::*;

// Re-export kurbo types so downstream crates share one geometry vocabulary
pub use kurbo::{Point, Rect, Vec2};
