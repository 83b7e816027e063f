//! Hit testing: document point → layer lookup.
//!
//! Walks layers from the highest z-index down, so the first match is the
//! topmost painted layer.

use crate::document::Document;
use crate::id::LayerId;
use crate::model::{Layer, LayerType};
use kurbo::Point;

/// Whether `layer` can be picked with the pointer at all.
pub fn is_pickable(layer: &Layer) -> bool {
    layer.visible && !layer.is_clip_source() && layer.layer_type() != LayerType::Adjustment
}

/// Find the topmost pickable layer containing `point` (document units).
/// Returns `None` over empty canvas.
pub fn hit_test(doc: &Document, point: Point) -> Option<LayerId> {
    doc.layers_by_z()
        .into_iter()
        .rev()
        .filter(|l| is_pickable(l))
        .find(|l| l.rect().contains(point))
        .map(|l| l.id)
}
