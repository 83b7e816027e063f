//! Crop session for image layers.
//!
//! The crop rectangle is kept in fractions of the layer box (`0.0..=1.0` on
//! both axes), so it is independent of zoom and of the layer's size. Only
//! confirming the crop touches the document.

use crate::input::InputEvent;
use studio_core::{Layer, LayerId, LayerPatch, Point, Rect, ResizeHandle, Vec2};

/// Smallest crop extent, as a fraction of the layer.
pub const MIN_CROP_FRACTION: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
struct CropDrag {
    handle: ResizeHandle,
    origin: Point,
    start: Rect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CropSession {
    layer: LayerId,
    rect: Rect,
    drag: Option<CropDrag>,
}

impl CropSession {
    /// Start with the whole layer selected.
    pub fn new(layer: LayerId) -> Self {
        Self {
            layer,
            rect: Rect::new(0.0, 0.0, 1.0, 1.0),
            drag: None,
        }
    }

    pub fn layer(&self) -> LayerId {
        self.layer
    }

    /// Current crop rectangle in layer fractions.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Feed a pointer event. `layer_size` is the cropped layer's size in
    /// document units. Returns whether the crop rectangle changed.
    pub fn handle(&mut self, event: &InputEvent, layer_size: Vec2, zoom: f64) -> bool {
        match event {
            InputEvent::PointerDown {
                screen,
                target: crate::input::PointerTarget::CropHandle(handle),
                ..
            } => {
                self.drag = Some(CropDrag {
                    handle: *handle,
                    origin: *screen,
                    start: self.rect,
                });
                false
            }
            InputEvent::PointerMove { screen } => {
                let Some(drag) = self.drag else {
                    return false;
                };
                let scale = Vec2::new(layer_size.x * zoom, layer_size.y * zoom);
                if scale.x <= 0.0 || scale.y <= 0.0 {
                    return false;
                }
                let d = *screen - drag.origin;
                let delta = Vec2::new(d.x / scale.x, d.y / scale.y);
                let next = crop_from_handle(drag.start, drag.handle, delta);
                let changed = next != self.rect;
                self.rect = next;
                changed
            }
            InputEvent::PointerUp { .. } | InputEvent::Cancel => {
                self.drag = None;
                false
            }
            _ => false,
        }
    }

    /// The patch that applies this crop to `layer`.
    pub fn confirm_patch(&self, layer: &Layer) -> LayerPatch {
        let r = self.rect;
        LayerPatch::rect(Rect::new(
            layer.x + layer.width * r.x0,
            layer.y + layer.height * r.y0,
            layer.x + layer.width * r.x0 + layer.width * r.width(),
            layer.y + layer.height * r.y0 + layer.height * r.height(),
        ))
    }
}

/// Move the edges `handle` controls by `delta` (fractions), clamped to the
/// unit square and never crossing the opposite edge.
fn crop_from_handle(start: Rect, handle: ResizeHandle, delta: Vec2) -> Rect {
    let mut r = start;
    if handle.moves_left() {
        r.x0 = (start.x0 + delta.x).clamp(0.0, start.x1 - MIN_CROP_FRACTION);
    }
    if handle.moves_right() {
        r.x1 = (start.x1 + delta.x).clamp(start.x0 + MIN_CROP_FRACTION, 1.0);
    }
    if handle.moves_top() {
        r.y0 = (start.y0 + delta.y).clamp(0.0, start.y1 - MIN_CROP_FRACTION);
    }
    if handle.moves_bottom() {
        r.y1 = (start.y1 + delta.y).clamp(start.y0 + MIN_CROP_FRACTION, 1.0);
    }
    r
}
