//! The studio aggregate.
//!
//! `Studio` owns the document, its history, the canvas view and all
//! in-progress interaction state. Every user-level operation goes through it,
//! and every completed operation that changes layers records exactly one
//! history entry.

use crate::config::StudioConfig;
use crate::crop::CropSession;
use crate::generation::{
    GenerationClient, GenerationError, GenerationRequest, GenerationResponse, GenerationState,
    generated_layer,
};
use crate::history::History;
use crate::import::{ImportError, LayerSeed, import_image};
use crate::input::{InputEvent, Modifiers, PointerTarget};
use crate::interaction::{GestureOutcome, InteractionController, InteractionSettings};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use studio_core::geometry::{self, bounding_box};
use studio_core::{
    AlignEdge, Axis, CanvasView, Document, Layer, LayerId, LayerPatch, LayerType, MaskType,
    NewLayer, Point, Rect, Vec2,
};

/// Default size of a seeded image when the seed does not say.
const SEED_IMAGE_SIZE: f64 = 512.0;
const PREVIEW_IMAGE_SIZE: f64 = 1024.0;

/// What an alignment lines layers up against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlignReference {
    /// Bounding box of the selected layers.
    Selection,
    /// The whole document.
    Canvas,
    /// The part of the document visible through a viewport of this screen
    /// size.
    Viewport { width: f64, height: f64 },
}

#[derive(Debug)]
pub struct Studio {
    doc: Document,
    history: History,
    view: CanvasView,
    interaction: InteractionController,
    crop: Option<CropSession>,
    generation: GenerationState,
    config: StudioConfig,
}

impl Default for Studio {
    fn default() -> Self {
        Self::new(StudioConfig::default())
    }
}

impl Studio {
    pub fn new(config: StudioConfig) -> Self {
        let history = match config.history_depth {
            Some(depth) => History::with_max_depth(depth),
            None => History::new(),
        };
        let interaction = InteractionController::new(InteractionSettings {
            min_layer_size: config.min_layer_size,
            rotation_step: config.rotation_step,
            guides: config.guide_settings(),
        });
        let mut studio = Self {
            doc: Document::new(),
            history,
            view: config.canvas_view(),
            interaction,
            crop: None,
            generation: GenerationState::default(),
            config,
        };
        studio.history.snapshot(&studio.doc, "Initial state");
        studio
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn layers(&self) -> &[Layer] {
        self.doc.layers()
    }

    pub fn selection(&self) -> &[LayerId] {
        self.doc.selection()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn view(&self) -> &CanvasView {
        &self.view
    }

    pub fn interaction(&self) -> &InteractionController {
        &self.interaction
    }

    pub fn crop(&self) -> Option<&CropSession> {
        self.crop.as_ref()
    }

    pub fn generation(&self) -> &GenerationState {
        &self.generation
    }

    pub fn generation_mut(&mut self) -> &mut GenerationState {
        &mut self.generation
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    /// Run `f` against the document and record `description` if the layer
    /// list changed.
    fn edit<R>(&mut self, description: &str, f: impl FnOnce(&mut Document) -> R) -> R {
        let before = self.doc.layers().to_vec();
        let result = f(&mut self.doc);
        if self.doc.layers() != before.as_slice() {
            self.history.snapshot(&self.doc, description);
        } else {
            log::debug!("{description}: no change, nothing recorded");
        }
        result
    }

    fn apply(&mut self, description: &str, placements: Vec<geometry::Placement>) {
        self.edit(description, |doc| {
            for (id, patch) in placements {
                doc.update_layer(id, patch);
            }
        });
    }

    // ─── Layers ──────────────────────────────────────────────────────────

    pub fn add_layer(&mut self, layer: NewLayer) -> LayerId {
        let description = format!("Add {} layer", layer.content.layer_type().as_str());
        self.edit(&description, |doc| doc.add_layer(layer))
    }

    pub fn add_layer_of(&mut self, ty: LayerType) -> LayerId {
        self.add_layer(NewLayer::new(ty))
    }

    pub fn update_layer(&mut self, id: LayerId, patch: LayerPatch) {
        self.edit("Update layer", |doc| doc.update_layer(id, patch));
    }

    /// Replace every layer, e.g. when loading a saved document.
    pub fn set_layers(&mut self, layers: Vec<Layer>) {
        self.edit("Replace layers", |doc| doc.set_layers(layers));
    }

    pub fn delete_selected(&mut self) -> usize {
        self.edit("Delete layers", Document::delete_selected)
    }

    pub fn duplicate_selected(&mut self) -> Vec<LayerId> {
        self.edit("Duplicate layers", |doc| doc.duplicate_selected().into_vec())
    }

    pub fn reorder_layers(&mut self, dragged: LayerId, target: LayerId) {
        self.edit("Reorder layers", |doc| doc.reorder_layers(dragged, target));
    }

    pub fn toggle_visibility(&mut self, id: LayerId) {
        self.edit("Toggle visibility", |doc| doc.toggle_visibility(id));
    }

    pub fn toggle_lock(&mut self, id: LayerId) {
        self.edit("Toggle lock", |doc| doc.toggle_lock(id));
    }

    /// Resize a text layer's box to fit its content.
    pub fn fit_text(&mut self, id: LayerId) {
        if let Some(patch) = self.doc.get(id).and_then(geometry::fit_text) {
            self.update_layer(id, patch);
        }
    }

    // ─── Selection (not historized) ──────────────────────────────────────

    pub fn select_layer(&mut self, id: Option<LayerId>, additive: bool) {
        self.doc.select_layer(id, additive);
    }

    pub fn select_many(&mut self, ids: impl IntoIterator<Item = LayerId>) {
        self.doc.select_many(ids);
    }

    pub fn select_all(&mut self) {
        self.doc.select_all();
    }

    // ─── Composition ─────────────────────────────────────────────────────

    pub fn group_selected(&mut self) -> Option<LayerId> {
        self.edit("Group layers", Document::group_selected)
    }

    pub fn ungroup_selected(&mut self) -> Vec<LayerId> {
        self.edit("Ungroup layers", |doc| doc.ungroup_selected().into_vec())
    }

    pub fn create_mask(&mut self, mask_type: MaskType) -> bool {
        self.edit("Create mask", |doc| doc.create_mask(mask_type))
    }

    pub fn release_mask(&mut self) -> bool {
        self.edit("Release mask", Document::release_mask)
    }

    // ─── Alignment ───────────────────────────────────────────────────────

    fn reference_rect(&self, reference: AlignReference) -> Option<Rect> {
        match reference {
            AlignReference::Selection => bounding_box(self.doc.selected_layers()),
            AlignReference::Canvas => Some(self.view.bounds()),
            AlignReference::Viewport { width, height } => {
                Some(self.view.visible_rect(width, height))
            }
        }
    }

    /// Selected layers that geometry actions may move.
    fn movable_selection(&self) -> Vec<&Layer> {
        self.doc
            .selected_layers()
            .into_iter()
            .filter(|l| !l.locked)
            .collect()
    }

    /// Locked layers stay put but still count towards the selection bounds.
    pub fn align_selected(&mut self, edge: AlignEdge, reference: AlignReference) {
        let Some(rect) = self.reference_rect(reference) else {
            return;
        };
        let placements = geometry::align(&self.movable_selection(), edge, rect);
        let target = match reference {
            AlignReference::Selection => "selection",
            AlignReference::Canvas => "canvas",
            AlignReference::Viewport { .. } => "visible area",
        };
        let description = format!(
            "Aligned {} layers {} to {target}",
            placements.len(),
            format!("{edge:?}").to_lowercase()
        );
        self.apply(&description, placements);
    }

    pub fn distribute_selected(&mut self, axis: Axis) {
        let placements = geometry::distribute(&self.movable_selection(), axis);
        self.apply(&format!("Distribute layers {axis:?}"), placements);
    }

    /// Pack the selection with a fixed gap (see `geometry::SPACING_PRESETS`).
    pub fn space_selected(&mut self, axis: Axis, spacing: f64) {
        let placements = geometry::space_evenly(&self.movable_selection(), axis, spacing);
        self.apply(&format!("Space layers {spacing} apart"), placements);
    }

    /// Turn every unlocked selected layer by a fixed amount, e.g. the
    /// context menu's +90, -90 and 180 degree steps.
    pub fn rotate_selected_by(&mut self, degrees: f64) {
        let placements: Vec<geometry::Placement> = self
            .movable_selection()
            .into_iter()
            .map(|l| (l.id, LayerPatch::rotation(l.rotation + degrees)))
            .collect();
        let description = match placements.len() {
            1 => "Rotate layer".to_string(),
            n => format!("Rotate {n} layers"),
        };
        self.apply(&description, placements);
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> Option<String> {
        self.history.undo(&mut self.doc)
    }

    pub fn redo(&mut self) -> Option<String> {
        self.history.redo(&mut self.doc)
    }

    pub fn jump_to(&mut self, index: usize) -> bool {
        self.history.jump_to(index, &mut self.doc)
    }

    /// Forget all history; the current document becomes the new baseline.
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.history.snapshot(&self.doc, "Initial state");
    }

    // ─── Canvas view (not historized) ────────────────────────────────────

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.view.zoom * self.config.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.view.zoom / self.config.zoom_step);
    }

    pub fn reset_zoom(&mut self) {
        self.view.zoom = 1.0;
        self.view.pan = Vec2::ZERO;
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.view.zoom = self.config.clamp_zoom(zoom);
    }

    pub fn set_pan(&mut self, pan: Vec2) {
        self.view.pan = pan;
    }

    pub fn set_canvas_size(&mut self, width: f64, height: f64) {
        self.view.width = width;
        self.view.height = height;
    }

    pub fn set_grid_size(&mut self, size: f64) {
        self.view.grid.size = size;
    }

    pub fn set_grid_opacity(&mut self, opacity: f64) {
        self.view.grid.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn toggle_grid(&mut self) {
        self.view.grid.visible = !self.view.grid.visible;
    }

    pub fn toggle_snap(&mut self) {
        self.view.grid.snap = !self.view.grid.snap;
    }

    // ─── Crop ────────────────────────────────────────────────────────────

    /// Start cropping an unlocked image layer. Any active gesture is
    /// cancelled first.
    pub fn begin_crop(&mut self, id: LayerId) -> bool {
        match self.doc.get(id) {
            Some(layer) if layer.layer_type() == LayerType::Image && !layer.locked => {}
            _ => return false,
        }
        self.interaction.cancel(&mut self.doc);
        self.crop = Some(CropSession::new(id));
        true
    }

    /// Apply the crop rectangle to its layer and record it.
    pub fn confirm_crop(&mut self) -> bool {
        let Some(session) = self.crop.take() else {
            return false;
        };
        let Some(patch) = self.doc.get(session.layer()).map(|l| session.confirm_patch(l)) else {
            return false;
        };
        self.edit("Crop layer", |doc| doc.update_layer(session.layer(), patch));
        true
    }

    pub fn cancel_crop(&mut self) {
        self.crop = None;
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Feed one input event from the host.
    pub fn handle_input(&mut self, event: &InputEvent) -> GestureOutcome {
        if let InputEvent::Key(key) = event {
            return match ShortcutMap::resolve(key) {
                Some(action) => self.run_shortcut(action),
                None => GestureOutcome::None,
            };
        }

        if let Some(session) = &mut self.crop {
            let size = self
                .doc
                .get(session.layer())
                .map(|l| Vec2::new(l.width, l.height))
                .unwrap_or(Vec2::ZERO);
            return if session.handle(event, size, self.view.zoom) {
                GestureOutcome::Updated
            } else {
                GestureOutcome::None
            };
        }

        let outcome = self.interaction.handle(event, &mut self.doc, &self.view);
        if let GestureOutcome::Completed(description) = &outcome {
            self.history.snapshot(&self.doc, description.as_str());
        }
        outcome
    }

    fn run_shortcut(&mut self, action: ShortcutAction) -> GestureOutcome {
        log::trace!("shortcut {action:?}");
        match action {
            ShortcutAction::Undo => self.undo().map(|_| GestureOutcome::Updated),
            ShortcutAction::Redo => self.redo().map(|_| GestureOutcome::Updated),
            ShortcutAction::Delete => (self.delete_selected() > 0).then_some(GestureOutcome::Updated),
            ShortcutAction::Duplicate => {
                (!self.duplicate_selected().is_empty()).then_some(GestureOutcome::Updated)
            }
            ShortcutAction::SelectAll => {
                self.select_all();
                Some(GestureOutcome::Updated)
            }
            ShortcutAction::Group => self.group_selected().map(|_| GestureOutcome::Updated),
            ShortcutAction::Ungroup => {
                (!self.ungroup_selected().is_empty()).then_some(GestureOutcome::Updated)
            }
            ShortcutAction::ZoomIn => {
                self.zoom_in();
                Some(GestureOutcome::Updated)
            }
            ShortcutAction::ZoomOut => {
                self.zoom_out();
                Some(GestureOutcome::Updated)
            }
            ShortcutAction::ZoomReset => {
                self.reset_zoom();
                Some(GestureOutcome::Updated)
            }
            ShortcutAction::Escape => Some(self.escape()),
        }
        .unwrap_or(GestureOutcome::None)
    }

    /// Cancel the active gesture, else the crop, else clear the selection.
    pub fn escape(&mut self) -> GestureOutcome {
        if self.interaction.is_active() {
            self.interaction.cancel(&mut self.doc)
        } else if self.crop.is_some() {
            self.cancel_crop();
            GestureOutcome::Updated
        } else {
            self.doc.select_layer(None, false);
            GestureOutcome::Updated
        }
    }

    /// Convenience for hosts that only know where the pointer is: the target
    /// is resolved by hit testing.
    pub fn pointer_down_at(&mut self, screen: Point) -> GestureOutcome {
        self.handle_input(&InputEvent::PointerDown {
            screen,
            target: PointerTarget::Canvas,
            modifiers: Modifiers::NONE,
        })
    }

    // ─── Generation ──────────────────────────────────────────────────────

    /// Validate the generation inputs and mark a request as in flight.
    ///
    /// Refuses while another request is running. A validation failure is
    /// recorded in `generation().error`.
    pub fn begin_generation(&mut self) -> Result<GenerationRequest, GenerationError> {
        if self.generation.is_generating {
            return Err(GenerationError::Busy);
        }
        match self.generation.request() {
            Ok(request) => {
                self.generation.is_generating = true;
                self.generation.error = None;
                self.generation.variations.clear();
                self.generation.selected_variation = None;
                Ok(request)
            }
            Err(err) => {
                self.generation.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Complete a request started with `begin_generation`. On success the
    /// first image becomes a new layer; on failure the message is stored and
    /// the document is untouched.
    pub fn finish_generation(
        &mut self,
        prompt: &str,
        result: Result<GenerationResponse, GenerationError>,
    ) -> Option<LayerId> {
        self.generation.is_generating = false;
        let response = match result {
            Ok(response) if !response.images.is_empty() => response,
            Ok(_) => {
                self.fail_generation(GenerationError::Malformed(
                    "response contained no images".into(),
                ));
                return None;
            }
            Err(err) => {
                self.fail_generation(err);
                return None;
            }
        };

        self.generation.error = None;
        let layer = generated_layer(prompt, &response.images[0]);
        self.generation.variations = response.images;
        self.generation.selected_variation = Some(0);
        Some(self.add_layer(layer))
    }

    fn fail_generation(&mut self, err: GenerationError) {
        log::warn!("generation failed: {err}");
        self.generation.error = Some(err.to_string());
    }

    /// Run one full generation round trip against `client`.
    pub async fn generate_image<C>(&mut self, client: &C) -> Option<LayerId>
    where
        C: GenerationClient + ?Sized,
    {
        let request = self.begin_generation().ok()?;
        let result = client.generate(&request).await;
        self.finish_generation(&request.user_prompt, result)
    }

    /// Add another image from the last generation as its own layer.
    pub fn use_variation(&mut self, index: usize) -> Option<LayerId> {
        let image = self.generation.variations.get(index)?.clone();
        self.generation.selected_variation = Some(index);
        let prompt = self.generation.prompt.clone();
        Some(self.add_layer(generated_layer(&prompt, &image)))
    }

    // ─── Import ──────────────────────────────────────────────────────────

    /// Add a local image file as a layer sized to the image.
    pub fn import_file(&mut self, name: &str, bytes: &[u8]) -> Result<LayerId, ImportError> {
        let imported = import_image(name, bytes)?;
        Ok(self.add_layer(
            NewLayer::image(imported.data_url)
                .named(imported.name)
                .sized(imported.width as f64, imported.height as f64),
        ))
    }

    /// Add a seeded image centered on the canvas.
    pub fn open_seed(&mut self, seed: &LayerSeed) -> LayerId {
        let width = seed.width.unwrap_or(SEED_IMAGE_SIZE);
        let height = seed.height.unwrap_or(SEED_IMAGE_SIZE);
        self.add_layer(
            NewLayer::image(seed.image_url.clone())
                .named("Imported from Discovery")
                .at(self.view.width / 2.0 - width / 2.0, self.view.height / 2.0 - height / 2.0)
                .sized(width, height),
        )
    }

    /// Preview mode: drop everything and show the seeded image alone,
    /// locked. The preview becomes the history baseline.
    pub fn enter_preview(&mut self, seed: &LayerSeed) -> LayerId {
        self.interaction.cancel(&mut self.doc);
        self.crop = None;
        self.doc.set_layers(Vec::new());
        let id = self.doc.add_layer(
            NewLayer::image(seed.image_url.clone())
                .named("Preview Image")
                .at(50.0, 50.0)
                .sized(
                    seed.width.unwrap_or(PREVIEW_IMAGE_SIZE),
                    seed.height.unwrap_or(PREVIEW_IMAGE_SIZE),
                )
                .locked(true),
        );
        self.clear_history();
        id
    }
}
