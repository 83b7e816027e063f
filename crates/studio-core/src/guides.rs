//! Smart guides: advisory alignment and spacing lines shown while dragging.
//!
//! Guides are reported in document units; the host scales them by zoom when
//! drawing. They never move anything.

use crate::model::Layer;
use kurbo::Rect;
use serde::{Deserialize, Serialize};

/// Screen-pixel distance within which an edge counts as aligned.
pub const DEFAULT_SNAP_THRESHOLD: f64 = 5.0;
/// Gap, in document units, recognised as a deliberate spacing.
pub const DEFAULT_SPACING: f64 = 20.0;
pub const DEFAULT_SPACING_TOLERANCE: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// A line of constant x.
    Vertical,
    /// A line of constant y.
    Horizontal,
}

/// What a guide lines up against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuideKind {
    Canvas,
    Layer,
    Spacing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guide {
    pub orientation: Orientation,
    /// x for vertical guides, y for horizontal ones.
    pub position: f64,
    pub start: f64,
    pub end: f64,
    pub kind: GuideKind,
    pub label: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideSettings {
    pub threshold: f64,
    pub spacing: f64,
    pub spacing_tolerance: f64,
}

impl Default for GuideSettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SNAP_THRESHOLD,
            spacing: DEFAULT_SPACING,
            spacing_tolerance: DEFAULT_SPACING_TOLERANCE,
        }
    }
}

fn near_any(values: [f64; 3], target: f64, threshold: f64) -> bool {
    values.iter().any(|v| (v - target).abs() < threshold)
}

fn xs(r: Rect) -> [f64; 3] {
    [r.x0, r.center().x, r.x1]
}

fn ys(r: Rect) -> [f64; 3] {
    [r.y0, r.center().y, r.y1]
}

/// Compute guides for `dragged` against the canvas and `others`.
///
/// `others` should exclude the current selection. The alignment threshold is
/// in screen pixels and is divided by `zoom`.
pub fn smart_guides<'a>(
    dragged: &Layer,
    others: impl IntoIterator<Item = &'a Layer>,
    canvas: Rect,
    zoom: f64,
    settings: &GuideSettings,
) -> Vec<Guide> {
    let threshold = settings.threshold / zoom;
    let d = dragged.rect();
    let mut guides = Vec::new();

    let vertical_marks = [
        (canvas.x0, "Left edge"),
        (canvas.x0 + canvas.width() * 0.25, "Quarter"),
        (canvas.center().x, "Center"),
        (canvas.x0 + canvas.width() * 0.75, "Three quarters"),
        (canvas.x1, "Right edge"),
    ];
    for (x, label) in vertical_marks {
        if near_any(xs(d), x, threshold) {
            guides.push(Guide {
                orientation: Orientation::Vertical,
                position: x,
                start: canvas.y0,
                end: canvas.y1,
                kind: GuideKind::Canvas,
                label: Some(label),
            });
        }
    }

    let horizontal_marks = [
        (canvas.y0, "Top edge"),
        (canvas.y0 + canvas.height() * 0.25, "Quarter"),
        (canvas.center().y, "Center"),
        (canvas.y0 + canvas.height() * 0.75, "Three quarters"),
        (canvas.y1, "Bottom edge"),
    ];
    for (y, label) in horizontal_marks {
        if near_any(ys(d), y, threshold) {
            guides.push(Guide {
                orientation: Orientation::Horizontal,
                position: y,
                start: canvas.x0,
                end: canvas.x1,
                kind: GuideKind::Canvas,
                label: Some(label),
            });
        }
    }

    for other in others {
        if other.id == dragged.id {
            continue;
        }
        let o = other.rect();
        let y_span = (o.y0.min(d.y0), o.y1.max(d.y1));
        let x_span = (o.x0.min(d.x0), o.x1.max(d.x1));

        for x in xs(o) {
            if near_any(xs(d), x, threshold) {
                guides.push(Guide {
                    orientation: Orientation::Vertical,
                    position: x,
                    start: y_span.0,
                    end: y_span.1,
                    kind: GuideKind::Layer,
                    label: None,
                });
            }
        }
        for y in ys(o) {
            if near_any(ys(d), y, threshold) {
                guides.push(Guide {
                    orientation: Orientation::Horizontal,
                    position: y,
                    start: x_span.0,
                    end: x_span.1,
                    kind: GuideKind::Layer,
                    label: None,
                });
            }
        }

        let gap = settings.spacing;
        let tol = settings.spacing_tolerance;
        let spaced = |a: f64, b: f64| (a - b - gap).abs() < tol;

        // Dragged sits `gap` right of / left of / below / above the other.
        if spaced(d.x0, o.x1) {
            guides.push(spacing_guide(Orientation::Vertical, o.x1 + gap, y_span));
        }
        if spaced(o.x0, d.x1) {
            guides.push(spacing_guide(Orientation::Vertical, d.x1 + gap, y_span));
        }
        if spaced(d.y0, o.y1) {
            guides.push(spacing_guide(Orientation::Horizontal, o.y1 + gap, x_span));
        }
        if spaced(o.y0, d.y1) {
            guides.push(spacing_guide(Orientation::Horizontal, d.y1 + gap, x_span));
        }
    }

    log::trace!("smart_guides for {}: {} guide(s)", dragged.id, guides.len());
    guides
}

fn spacing_guide(orientation: Orientation, position: f64, span: (f64, f64)) -> Guide {
    Guide {
        orientation,
        position,
        start: span.0,
        end: span.1,
        kind: GuideKind::Spacing,
        label: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::model::{LayerType, NewLayer};

    fn canvas() -> Rect {
        Rect::new(0.0, 0.0, 1000.0, 800.0)
    }

    #[test]
    fn canvas_center_guide() {
        let mut doc = Document::new();
        // Center x is 498, two units off the canvas center.
        let id = doc.add_layer(NewLayer::new(LayerType::Shape).at(450.0, 300.0).sized(96.0, 37.0));
        let guides = smart_guides(doc.get(id).unwrap(), [], canvas(), 1.0, &GuideSettings::default());
        assert!(guides.iter().any(|g| g.orientation == Orientation::Vertical
            && g.position == 500.0
            && g.kind == GuideKind::Canvas));
        assert!(guides.iter().all(|g| g.orientation == Orientation::Vertical));
    }

    #[test]
    fn threshold_shrinks_with_zoom() {
        let mut doc = Document::new();
        let id = doc.add_layer(NewLayer::new(LayerType::Shape).at(503.0, 333.0).sized(10.0, 10.0));
        let layer = doc.get(id).unwrap();
        let settings = GuideSettings::default();
        assert!(!smart_guides(layer, [], canvas(), 1.0, &settings).is_empty());
        assert!(smart_guides(layer, [], canvas(), 2.0, &settings).is_empty());
    }

    #[test]
    fn layer_edge_and_spacing_guides() {
        let mut doc = Document::new();
        let other = doc.add_layer(NewLayer::new(LayerType::Shape).at(100.0, 100.0).sized(100.0, 50.0));
        // Left edge 221 sits ~20 right of the other's right edge (200).
        let dragged = doc.add_layer(NewLayer::new(LayerType::Shape).at(221.0, 101.0).sized(40.0, 40.0));
        let guides = smart_guides(
            doc.get(dragged).unwrap(),
            [doc.get(other).unwrap()],
            canvas(),
            1.0,
            &GuideSettings::default(),
        );
        assert!(guides.iter().any(|g| g.kind == GuideKind::Spacing
            && g.orientation == Orientation::Vertical
            && g.position == 220.0));
        assert!(guides.iter().any(|g| g.kind == GuideKind::Layer
            && g.orientation == Orientation::Horizontal
            && g.position == 100.0
            && g.start == 100.0
            && g.end == 261.0));
    }
}
