//! Pointer interaction for the canvas.
//!
//! Translates pointer events into document mutations. Each gesture goes
//! `idle → active → idle`: it starts on pointer-down over a valid target and
//! ends on pointer-up or cancel. Moves mutate the document live but never
//! record history; the controller reports `Completed` once per gesture that
//! actually changed something, and the caller snapshots then.
//!
//! ## Gestures
//!
//! | Pointer-down on        | Gesture | Ends with                         |
//! |------------------------|---------|-----------------------------------|
//! | unlocked layer body    | drag    | one snapshot of all moved layers  |
//! | resize handle          | resize  | one snapshot                      |
//! | rotation handle        | rotate  | one snapshot                      |
//! | empty canvas or locked | marquee | selection replaced, no snapshot   |

use crate::input::{InputEvent, Modifiers, PointerTarget};
use studio_core::geometry::{
    MIN_LAYER_SIZE, ROTATION_STEP, drag_position, marquee_hits, normalize_rect,
    resize_from_handle, rotation_from_pointer,
};
use studio_core::{
    CanvasView, Document, Guide, GuideSettings, LayerId, LayerPatch, Point, Rect, ResizeHandle,
    hit_test, smart_guides,
};

/// The active gesture, if any.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    Idle,
    Drag {
        /// The layer under the pointer; smart guides are computed for it.
        primary: LayerId,
        origin: Point,
        starts: Vec<(LayerId, Point)>,
    },
    Resize {
        layer: LayerId,
        handle: ResizeHandle,
        origin: Point,
        start: Rect,
    },
    Rotate {
        layer: LayerId,
        /// Layer center in screen coordinates.
        center: Point,
        start_rotation: f64,
    },
    Marquee {
        /// Document-space corners.
        origin: Point,
        current: Point,
    },
}

/// What a handled event did to the document or selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureOutcome {
    /// Nothing changed.
    None,
    /// Layers or selection changed; not a history boundary.
    Updated,
    /// A gesture finished with a net change; record one history entry.
    Completed(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionSettings {
    pub min_layer_size: f64,
    pub rotation_step: f64,
    pub guides: GuideSettings,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            min_layer_size: MIN_LAYER_SIZE,
            rotation_step: ROTATION_STEP,
            guides: GuideSettings::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InteractionController {
    gesture: Gesture,
    guides: Vec<Guide>,
    settings: InteractionSettings,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(InteractionSettings::default())
    }
}

impl InteractionController {
    pub fn new(settings: InteractionSettings) -> Self {
        Self {
            gesture: Gesture::Idle,
            guides: Vec::new(),
            settings,
        }
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn is_active(&self) -> bool {
        self.gesture != Gesture::Idle
    }

    /// Smart guides for the current drag. Empty outside a drag.
    pub fn guides(&self) -> &[Guide] {
        &self.guides
    }

    /// The marquee rectangle in document units, while one is being drawn.
    pub fn marquee_rect(&self) -> Option<Rect> {
        match self.gesture {
            Gesture::Marquee { origin, current } => Some(normalize_rect(origin, current)),
            _ => None,
        }
    }

    /// Handle a pointer event. Keyboard events are ignored here.
    pub fn handle(
        &mut self,
        event: &InputEvent,
        doc: &mut Document,
        view: &CanvasView,
    ) -> GestureOutcome {
        match event {
            InputEvent::PointerDown {
                screen,
                target,
                modifiers,
            } => {
                if self.is_active() {
                    return GestureOutcome::None;
                }
                self.pointer_down(*screen, *target, *modifiers, doc, view)
            }
            InputEvent::PointerMove { screen } => self.pointer_move(*screen, doc, view),
            InputEvent::PointerUp { .. } => self.pointer_up(doc),
            InputEvent::Cancel => self.cancel(doc),
            InputEvent::Key(_) => GestureOutcome::None,
        }
    }

    /// Abort the active gesture. Drag, resize and rotate put the layers back
    /// where they started; a marquee leaves the selection as it was.
    pub fn cancel(&mut self, doc: &mut Document) -> GestureOutcome {
        let gesture = std::mem::replace(&mut self.gesture, Gesture::Idle);
        self.guides.clear();
        match gesture {
            Gesture::Idle => GestureOutcome::None,
            Gesture::Drag { starts, .. } => {
                for (id, start) in starts {
                    doc.update_layer(id, LayerPatch::position(start));
                }
                GestureOutcome::Updated
            }
            Gesture::Resize { layer, start, .. } => {
                doc.update_layer(layer, LayerPatch::rect(start));
                GestureOutcome::Updated
            }
            Gesture::Rotate {
                layer,
                start_rotation,
                ..
            } => {
                doc.update_layer(layer, LayerPatch::rotation(start_rotation));
                GestureOutcome::Updated
            }
            Gesture::Marquee { .. } => GestureOutcome::Updated,
        }
    }

    // ─── Pointer down ────────────────────────────────────────────────────

    fn pointer_down(
        &mut self,
        screen: Point,
        target: PointerTarget,
        modifiers: Modifiers,
        doc: &mut Document,
        view: &CanvasView,
    ) -> GestureOutcome {
        let target = match target {
            PointerTarget::Canvas => match hit_test(doc, view.screen_to_document(screen)) {
                Some(id) => PointerTarget::Layer(id),
                None => PointerTarget::Canvas,
            },
            other => other,
        };
        // Locked layers let the press through to the canvas.
        let target = match target {
            PointerTarget::Layer(id) if doc.get(id).is_some_and(|l| l.locked) => {
                PointerTarget::Canvas
            }
            other => other,
        };

        match target {
            PointerTarget::Canvas => {
                if !modifiers.shift {
                    doc.select_layer(None, false);
                }
                let at = view.screen_to_document(screen);
                self.gesture = Gesture::Marquee {
                    origin: at,
                    current: at,
                };
                GestureOutcome::Updated
            }
            PointerTarget::Layer(id) => self.begin_drag(id, screen, modifiers, doc),
            PointerTarget::Handle(id, handle) => {
                let Some(layer) = doc.get(id).filter(|l| !l.locked) else {
                    return GestureOutcome::None;
                };
                let start = layer.rect();
                if !doc.is_selected(id) {
                    doc.select_layer(Some(id), false);
                }
                self.gesture = Gesture::Resize {
                    layer: id,
                    handle,
                    origin: screen,
                    start,
                };
                GestureOutcome::Updated
            }
            PointerTarget::RotationHandle(id) => {
                let Some(layer) = doc.get(id).filter(|l| !l.locked) else {
                    return GestureOutcome::None;
                };
                self.gesture = Gesture::Rotate {
                    layer: id,
                    center: view.document_to_screen(layer.center()),
                    start_rotation: layer.rotation,
                };
                GestureOutcome::Updated
            }
            // Crop handles belong to the crop session.
            PointerTarget::CropHandle(_) => GestureOutcome::None,
        }
    }

    fn begin_drag(
        &mut self,
        id: LayerId,
        screen: Point,
        modifiers: Modifiers,
        doc: &mut Document,
    ) -> GestureOutcome {
        match doc.get(id) {
            Some(layer) if !layer.locked => {}
            _ => return GestureOutcome::None,
        }

        // Shift toggles; a plain click on an unselected layer replaces.
        if modifiers.shift {
            doc.select_layer(Some(id), true);
            if !doc.is_selected(id) {
                return GestureOutcome::Updated;
            }
        } else if !doc.is_selected(id) {
            doc.select_layer(Some(id), false);
        }

        let starts = doc
            .selected_layers()
            .into_iter()
            .filter(|l| !l.locked)
            .map(|l| (l.id, l.origin()))
            .collect();
        self.gesture = Gesture::Drag {
            primary: id,
            origin: screen,
            starts,
        };
        GestureOutcome::Updated
    }

    // ─── Pointer move ────────────────────────────────────────────────────

    fn pointer_move(
        &mut self,
        screen: Point,
        doc: &mut Document,
        view: &CanvasView,
    ) -> GestureOutcome {
        match &mut self.gesture {
            Gesture::Idle => GestureOutcome::None,
            Gesture::Drag {
                primary,
                origin,
                starts,
            } => {
                let delta = screen - *origin;
                let grid = view.snap_grid();
                for (id, start) in starts.iter() {
                    let at = drag_position(*start, delta, view.zoom, grid);
                    doc.update_layer(*id, LayerPatch::position(at));
                }
                let primary = *primary;
                self.guides = match doc.get(primary) {
                    Some(dragged) => smart_guides(
                        dragged,
                        doc.layers().iter().filter(|l| !doc.is_selected(l.id)),
                        view.bounds(),
                        view.zoom,
                        &self.settings.guides,
                    ),
                    None => Vec::new(),
                };
                GestureOutcome::Updated
            }
            Gesture::Resize {
                layer,
                handle,
                origin,
                start,
            } => {
                let delta = (screen - *origin) / view.zoom;
                let rect = resize_from_handle(*start, *handle, delta, self.settings.min_layer_size);
                doc.update_layer(*layer, LayerPatch::rect(rect));
                GestureOutcome::Updated
            }
            Gesture::Rotate {
                layer,
                center,
                start_rotation,
            } => {
                let rotation = rotation_from_pointer(
                    *center,
                    screen,
                    *start_rotation,
                    self.settings.rotation_step,
                );
                doc.update_layer(*layer, LayerPatch::rotation(rotation));
                GestureOutcome::Updated
            }
            Gesture::Marquee { current, .. } => {
                *current = view.screen_to_document(screen);
                GestureOutcome::Updated
            }
        }
    }

    // ─── Pointer up ──────────────────────────────────────────────────────

    fn pointer_up(&mut self, doc: &mut Document) -> GestureOutcome {
        let gesture = std::mem::replace(&mut self.gesture, Gesture::Idle);
        self.guides.clear();
        match gesture {
            Gesture::Idle => GestureOutcome::None,
            Gesture::Drag { starts, .. } => {
                let moved = starts
                    .iter()
                    .filter(|(id, start)| doc.get(*id).is_some_and(|l| l.origin() != *start))
                    .count();
                match moved {
                    0 => GestureOutcome::None,
                    1 => GestureOutcome::Completed("Move layer".into()),
                    n => GestureOutcome::Completed(format!("Move {n} layers")),
                }
            }
            Gesture::Resize { layer, start, .. } => {
                if doc.get(layer).is_some_and(|l| l.rect() != start) {
                    GestureOutcome::Completed("Resize layer".into())
                } else {
                    GestureOutcome::None
                }
            }
            Gesture::Rotate {
                layer,
                start_rotation,
                ..
            } => {
                if doc.get(layer).is_some_and(|l| l.rotation != start_rotation) {
                    GestureOutcome::Completed("Rotate layer".into())
                } else {
                    GestureOutcome::None
                }
            }
            Gesture::Marquee { origin, current } => {
                let rect = normalize_rect(origin, current);
                if rect.area() == 0.0 {
                    return GestureOutcome::None;
                }
                let hits = marquee_hits(doc.layers(), rect);
                log::debug!("marquee {rect:?} selected {} layer(s)", hits.len());
                doc.select_many(hits);
                GestureOutcome::Updated
            }
        }
    }
}
