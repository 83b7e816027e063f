//! Geometry engine: pure functions over layer rectangles.
//!
//! Nothing here mutates a document. Bulk operations return `(id, patch)`
//! pairs for the caller to apply through `Document::update_layer`.

use crate::id::LayerId;
use crate::model::{Layer, LayerContent, LayerPatch};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest width/height a resize gesture may produce.
pub const MIN_LAYER_SIZE: f64 = 20.0;

/// Rotation snap increment, in degrees.
pub const ROTATION_STEP: f64 = 15.0;

/// Spacing presets offered by the "smart spacing" action.
pub const SPACING_PRESETS: [f64; 3] = [10.0, 20.0, 40.0];

pub type Placement = (LayerId, LayerPatch);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignEdge {
    Left,
    Center,
    Right,
    Top,
    Middle,
    Bottom,
}

// ─── Bounds ──────────────────────────────────────────────────────────────

/// Union of the layers' boxes. `None` for an empty input.
pub fn bounding_box<'a>(layers: impl IntoIterator<Item = &'a Layer>) -> Option<Rect> {
    layers
        .into_iter()
        .map(Layer::rect)
        .reduce(|acc, r| acc.union(r))
}

/// Rectangle spanned by two arbitrary corners.
pub fn normalize_rect(a: Point, b: Point) -> Rect {
    Rect::from_points(a, b)
}

/// Layers whose boxes strictly overlap `rect`. Touching edges do not count.
pub fn marquee_hits<'a>(
    layers: impl IntoIterator<Item = &'a Layer>,
    rect: Rect,
) -> Vec<LayerId> {
    let rect = rect.abs();
    layers
        .into_iter()
        .filter(|l| {
            l.x < rect.x1 && l.x + l.width > rect.x0 && l.y < rect.y1 && l.y + l.height > rect.y0
        })
        .map(|l| l.id)
        .collect()
}

// ─── Alignment & distribution ────────────────────────────────────────────

/// Align every layer's edge or center to `reference`. The other axis is
/// left untouched.
pub fn align(layers: &[&Layer], edge: AlignEdge, reference: Rect) -> Vec<Placement> {
    layers
        .iter()
        .map(|l| {
            let patch = match edge {
                AlignEdge::Left => LayerPatch::x(reference.x0),
                AlignEdge::Center => LayerPatch::x(reference.center().x - l.width / 2.0),
                AlignEdge::Right => LayerPatch::x(reference.x1 - l.width),
                AlignEdge::Top => LayerPatch::y(reference.y0),
                AlignEdge::Middle => LayerPatch::y(reference.center().y - l.height / 2.0),
                AlignEdge::Bottom => LayerPatch::y(reference.y1 - l.height),
            };
            (l.id, patch)
        })
        .collect()
}

fn lead(l: &Layer, axis: Axis) -> f64 {
    match axis {
        Axis::Horizontal => l.x,
        Axis::Vertical => l.y,
    }
}

fn extent(l: &Layer, axis: Axis) -> f64 {
    match axis {
        Axis::Horizontal => l.width,
        Axis::Vertical => l.height,
    }
}

fn place(axis: Axis, value: f64) -> LayerPatch {
    match axis {
        Axis::Horizontal => LayerPatch::x(value),
        Axis::Vertical => LayerPatch::y(value),
    }
}

fn sorted_by_lead<'a>(layers: &[&'a Layer], axis: Axis) -> Vec<&'a Layer> {
    let mut sorted = layers.to_vec();
    sorted.sort_by(|a, b| lead(a, axis).total_cmp(&lead(b, axis)));
    sorted
}

/// Equalize the gaps between consecutive layers along `axis`.
///
/// Needs at least three layers. The first and last (by leading edge) stay
/// put; interior layers are repositioned.
pub fn distribute(layers: &[&Layer], axis: Axis) -> Vec<Placement> {
    if layers.len() < 3 {
        return Vec::new();
    }
    let sorted = sorted_by_lead(layers, axis);
    let (first, last) = (sorted[0], sorted[sorted.len() - 1]);

    let span = lead(last, axis) + extent(last, axis) - lead(first, axis);
    let total: f64 = sorted.iter().map(|l| extent(l, axis)).sum();
    let gap = (span - total) / (sorted.len() - 1) as f64;

    let mut cursor = lead(first, axis) + extent(first, axis);
    sorted[1..sorted.len() - 1]
        .iter()
        .map(|l| {
            let at = cursor + gap;
            cursor = at + extent(l, axis);
            (l.id, place(axis, at))
        })
        .collect()
}

/// Pack layers along `axis` with a fixed `spacing` between them, keeping the
/// first one in place. Needs at least two layers.
pub fn space_evenly(layers: &[&Layer], axis: Axis, spacing: f64) -> Vec<Placement> {
    if layers.len() < 2 {
        return Vec::new();
    }
    let sorted = sorted_by_lead(layers, axis);
    let mut cursor = lead(sorted[0], axis) + extent(sorted[0], axis);
    sorted[1..]
        .iter()
        .map(|l| {
            let at = cursor + spacing;
            cursor = at + extent(l, axis);
            (l.id, place(axis, at))
        })
        .collect()
}

/// Size a text layer's box to an estimate of its content. `None` for
/// non-text layers.
pub fn fit_text(layer: &Layer) -> Option<LayerPatch> {
    let LayerContent::Text(text) = &layer.content else {
        return None;
    };
    let chars = text.content.chars().count() as f64;
    Some(LayerPatch {
        width: Some((chars * text.font_size * 0.6).max(50.0)),
        height: Some((text.font_size * 1.2).max(30.0)),
        ..LayerPatch::default()
    })
}

// ─── Direct manipulation ─────────────────────────────────────────────────

/// The eight compass handles around a selected layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeHandle {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::TopLeft,
        ResizeHandle::TopCenter,
        ResizeHandle::TopRight,
        ResizeHandle::MiddleLeft,
        ResizeHandle::MiddleRight,
        ResizeHandle::BottomLeft,
        ResizeHandle::BottomCenter,
        ResizeHandle::BottomRight,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "top-left" => ResizeHandle::TopLeft,
            "top-center" => ResizeHandle::TopCenter,
            "top-right" => ResizeHandle::TopRight,
            "middle-left" => ResizeHandle::MiddleLeft,
            "middle-right" => ResizeHandle::MiddleRight,
            "bottom-left" => ResizeHandle::BottomLeft,
            "bottom-center" => ResizeHandle::BottomCenter,
            "bottom-right" => ResizeHandle::BottomRight,
            _ => return None,
        })
    }

    pub fn moves_left(self) -> bool {
        matches!(
            self,
            ResizeHandle::TopLeft | ResizeHandle::MiddleLeft | ResizeHandle::BottomLeft
        )
    }

    pub fn moves_right(self) -> bool {
        matches!(
            self,
            ResizeHandle::TopRight | ResizeHandle::MiddleRight | ResizeHandle::BottomRight
        )
    }

    pub fn moves_top(self) -> bool {
        matches!(
            self,
            ResizeHandle::TopLeft | ResizeHandle::TopCenter | ResizeHandle::TopRight
        )
    }

    pub fn moves_bottom(self) -> bool {
        matches!(
            self,
            ResizeHandle::BottomLeft | ResizeHandle::BottomCenter | ResizeHandle::BottomRight
        )
    }
}

/// Resize along one axis. Returns `(position, size)`.
fn resize_span(
    pos: f64,
    size: f64,
    delta: f64,
    leading: bool,
    trailing: bool,
    min: f64,
) -> (f64, f64) {
    if leading {
        let grown = size - delta;
        if grown < min {
            // Trailing edge stays anchored.
            (pos + size - min, min)
        } else {
            (pos + delta, grown)
        }
    } else if trailing {
        (pos, (size + delta).max(min))
    } else {
        (pos, size)
    }
}

/// New box for a resize gesture that started at `start` and has moved the
/// handle by `delta` (document units).
pub fn resize_from_handle(start: Rect, handle: ResizeHandle, delta: Vec2, min_size: f64) -> Rect {
    let (x, w) = resize_span(
        start.x0,
        start.width(),
        delta.x,
        handle.moves_left(),
        handle.moves_right(),
        min_size,
    );
    let (y, h) = resize_span(
        start.y0,
        start.height(),
        delta.y,
        handle.moves_top(),
        handle.moves_bottom(),
        min_size,
    );
    Rect::new(x, y, x + w, y + h)
}

/// Rotation for a pointer at `pointer` around `center`, offset by the
/// rotation the layer had when the gesture began, snapped to `step` degrees.
pub fn rotation_from_pointer(center: Point, pointer: Point, start_rotation: f64, step: f64) -> f64 {
    let d = pointer - center;
    let angle = d.y.atan2(d.x).to_degrees();
    snap_to_grid(start_rotation + angle, step)
}

/// Round `value` to the nearest multiple of `grid`. A non-positive grid
/// leaves the value unchanged.
pub fn snap_to_grid(value: f64, grid: f64) -> f64 {
    if grid > 0.0 {
        (value / grid).round() * grid
    } else {
        value
    }
}

/// Position of a dragged layer: its start position plus the screen-space
/// pointer delta scaled by zoom, optionally snapped.
pub fn drag_position(start: Point, screen_delta: Vec2, zoom: f64, grid: Option<f64>) -> Point {
    let moved = start + screen_delta / zoom;
    match grid {
        Some(g) => Point::new(snap_to_grid(moved.x, g), snap_to_grid(moved.y, g)),
        None => moved,
    }
}
