//! The document model: the canonical layer list plus the selection.
//!
//! All mutation goes through `Document` methods. Operations given unknown ids
//! or unmet preconditions are silent no-ops; they correspond to UI affordances
//! that should already be disabled.

use crate::id::LayerId;
use crate::model::*;
use smallvec::SmallVec;

/// Offset applied to duplicated layers, in document units.
pub const DUPLICATE_OFFSET: f64 = 20.0;

pub(crate) const DEFAULT_X: f64 = 50.0;
pub(crate) const DEFAULT_Y: f64 = 50.0;
pub(crate) const DEFAULT_WIDTH: f64 = 300.0;
pub(crate) const DEFAULT_HEIGHT: f64 = 100.0;

pub type Selection = SmallVec<[LayerId; 4]>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub(crate) layers: Vec<Layer>,
    pub(crate) selection: Selection,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    /// Layers in list order (the layers panel order).
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn position_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    /// Selected ids in toggle order.
    pub fn selection(&self) -> &[LayerId] {
        &self.selection
    }

    pub fn is_selected(&self, id: LayerId) -> bool {
        self.selection.contains(&id)
    }

    /// Selected layers in list order.
    pub fn selected_layers(&self) -> Vec<&Layer> {
        self.layers
            .iter()
            .filter(|l| self.selection.contains(&l.id))
            .collect()
    }

    /// Layers sorted by paint order (bottom first).
    pub fn layers_by_z(&self) -> Vec<&Layer> {
        let mut sorted: Vec<&Layer> = self.layers.iter().collect();
        sorted.sort_by_key(|l| l.z_index);
        sorted
    }

    pub fn max_z(&self) -> Option<i64> {
        self.layers.iter().map(|l| l.z_index).max()
    }

    pub(crate) fn next_z(&self) -> i64 {
        self.max_z().map_or(0, |z| z + 1)
    }

    fn fresh_id(&self, ty: LayerType) -> LayerId {
        LayerId::with_prefix(ty.as_str())
    }

    // ─── Layer lifecycle ─────────────────────────────────────────────────

    /// Add a layer on top of the stack and select it.
    pub fn add_layer(&mut self, new: NewLayer) -> LayerId {
        let ty = new.content.layer_type();
        let id = match new.id {
            Some(id) if !self.contains(id) => id,
            Some(id) => {
                log::debug!("add_layer: id {id} already in use, generating a fresh one");
                self.fresh_id(ty)
            }
            None => self.fresh_id(ty),
        };

        let layer = Layer {
            id,
            name: new
                .name
                .unwrap_or_else(|| format!("Layer {}", self.layers.len() + 1)),
            x: new.x.unwrap_or(DEFAULT_X),
            y: new.y.unwrap_or(DEFAULT_Y),
            width: new.width.unwrap_or(DEFAULT_WIDTH),
            height: new.height.unwrap_or(DEFAULT_HEIGHT),
            rotation: new.rotation.unwrap_or(0.0),
            z_index: self.next_z(),
            visible: new.visible.unwrap_or(true),
            locked: new.locked.unwrap_or(false),
            opacity: new.opacity.unwrap_or(1.0).clamp(0.0, 1.0),
            blend_mode: new.blend_mode.unwrap_or_default(),
            content: new.content,
            is_mask: false,
            masked_by: None,
            mask_type: None,
        };

        log::debug!("add_layer {id} ({}) z={}", ty.as_str(), layer.z_index);
        self.layers.push(layer);
        self.selection = SmallVec::from_elem(id, 1);
        id
    }

    /// Merge `patch` into the layer with `id`. Returns whether it was found.
    ///
    /// Geometry is not clamped here; interaction code clamps before calling.
    pub fn update_layer(&mut self, id: LayerId, patch: LayerPatch) -> bool {
        match self.get_mut(id) {
            Some(layer) => {
                patch.apply(layer);
                true
            }
            None => false,
        }
    }

    /// Replace the whole layer list and clear the selection.
    pub fn set_layers(&mut self, layers: Vec<Layer>) {
        self.layers = layers;
        self.selection.clear();
    }

    /// Replace the whole layer list, keeping only the selected ids that
    /// still exist afterwards.
    pub fn restore_layers(&mut self, layers: Vec<Layer>) {
        self.layers = layers;
        let layers = &self.layers;
        self.selection.retain(|id| layers.iter().any(|l| l.id == *id));
    }

    pub fn toggle_visibility(&mut self, id: LayerId) {
        if let Some(layer) = self.get_mut(id) {
            layer.visible = !layer.visible;
        }
    }

    pub fn toggle_lock(&mut self, id: LayerId) {
        if let Some(layer) = self.get_mut(id) {
            layer.locked = !layer.locked;
        }
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// `None` clears. Non-additive replaces; additive toggles membership.
    pub fn select_layer(&mut self, id: Option<LayerId>, additive: bool) {
        let Some(id) = id else {
            self.selection.clear();
            return;
        };
        if !self.contains(id) {
            return;
        }
        if !additive {
            self.selection = SmallVec::from_elem(id, 1);
        } else if let Some(pos) = self.selection.iter().position(|s| *s == id) {
            self.selection.remove(pos);
        } else {
            self.selection.push(id);
        }
    }

    /// Replace the selection with the given ids, dropping unknown and
    /// repeated ones.
    pub fn select_many(&mut self, ids: impl IntoIterator<Item = LayerId>) {
        let mut next = Selection::new();
        for id in ids {
            if self.contains(id) && !next.contains(&id) {
                next.push(id);
            }
        }
        self.selection = next;
    }

    pub fn select_all(&mut self) {
        self.selection = self.layers.iter().map(|l| l.id).collect();
    }

    // ─── Bulk edits ──────────────────────────────────────────────────────

    /// Remove every selected layer and clear the selection.
    /// Returns how many layers were removed.
    pub fn delete_selected(&mut self) -> usize {
        if self.selection.is_empty() {
            return 0;
        }
        let doomed = std::mem::take(&mut self.selection);
        let before = self.layers.len();
        self.layers.retain(|l| !doomed.contains(&l.id));
        let removed = before - self.layers.len();

        // Keep mask and group links pointing at live layers only.
        for layer in &mut self.layers {
            if layer.masked_by.is_some_and(|m| doomed.contains(&m)) {
                layer.masked_by = None;
            }
            if let LayerContent::Group { children, .. } = &mut layer.content {
                children.retain(|c| !doomed.contains(c));
            }
        }
        let still_masking: Vec<LayerId> =
            self.layers.iter().filter_map(|l| l.masked_by).collect();
        for layer in &mut self.layers {
            if layer.is_mask && !still_masking.contains(&layer.id) {
                layer.is_mask = false;
                layer.mask_type = None;
            }
        }

        log::debug!("delete_selected removed {removed} layer(s)");
        removed
    }

    /// Copy every selected layer, offset by `DUPLICATE_OFFSET`, stacked above
    /// everything else. The copies become the selection.
    pub fn duplicate_selected(&mut self) -> Selection {
        let sources: Vec<Layer> = self
            .layers
            .iter()
            .filter(|l| self.selection.contains(&l.id))
            .cloned()
            .collect();
        if sources.is_empty() {
            return Selection::new();
        }

        let mut z = self.next_z();
        let mut copies = Selection::new();
        let mut renamed: Vec<(LayerId, LayerId)> = Vec::with_capacity(sources.len());
        let first_copy = self.layers.len();
        for source in &sources {
            let id = self.fresh_id(source.layer_type());
            let copy = Layer {
                id,
                name: format!("{} Copy", source.name),
                x: source.x + DUPLICATE_OFFSET,
                y: source.y + DUPLICATE_OFFSET,
                z_index: z,
                ..source.clone()
            };
            z += 1;
            self.layers.push(copy);
            copies.push(id);
            renamed.push((source.id, id));
        }

        // A mask pair copied together stays linked; a lone copy of either
        // half drops the relation.
        let copy_of = |id: LayerId| {
            renamed
                .iter()
                .find(|(from, _)| *from == id)
                .map(|(_, to)| *to)
        };
        for (copy, source) in self.layers[first_copy..].iter_mut().zip(&sources) {
            copy.masked_by = source.masked_by.and_then(copy_of);
            copy.is_mask =
                source.is_mask && sources.iter().any(|s| s.masked_by == Some(source.id));
            if !copy.is_mask {
                copy.mask_type = None;
            }
        }

        log::debug!("duplicate_selected created {} layer(s)", copies.len());
        self.selection = copies.clone();
        copies
    }

    /// Move `dragged` to `target`'s list slot, then renumber every layer as
    /// `z = count - 1 - index` so the first list entry paints on top.
    pub fn reorder_layers(&mut self, dragged: LayerId, target: LayerId) -> bool {
        let (Some(from), Some(to)) = (self.position_of(dragged), self.position_of(target)) else {
            return false;
        };
        let item = self.layers.remove(from);
        self.layers.insert(to, item);

        let count = self.layers.len() as i64;
        for (index, layer) in self.layers.iter_mut().enumerate() {
            layer.z_index = count - 1 - index as i64;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc_with(names: &[&str]) -> (Document, Vec<LayerId>) {
        let mut doc = Document::new();
        let ids = names
            .iter()
            .map(|n| doc.add_layer(NewLayer::new(LayerType::Shape).named(*n)))
            .collect();
        (doc, ids)
    }

    #[test]
    fn add_layer_fills_text_defaults() {
        let mut doc = Document::new();
        let id = doc.add_layer(NewLayer::new(LayerType::Text));
        let layer = doc.get(id).unwrap();
        assert_eq!(layer.name, "Layer 1");
        assert_eq!((layer.x, layer.y), (50.0, 50.0));
        assert_eq!((layer.width, layer.height), (300.0, 100.0));
        match &layer.content {
            LayerContent::Text(t) => {
                assert_eq!(t.content, "New Text");
                assert_eq!(t.font_size, 48.0);
                assert_eq!(t.align, TextAlign::Center);
            }
            other => panic!("expected text content, got {other:?}"),
        }
        assert_eq!(doc.selection(), &[id]);
    }

    #[test]
    fn add_layer_stacks_on_top() {
        let (doc, ids) = doc_with(&["a", "b", "c"]);
        let zs: Vec<i64> = ids.iter().map(|id| doc.get(*id).unwrap().z_index).collect();
        assert_eq!(zs, vec![0, 1, 2]);
        assert_eq!(doc.selection(), &[ids[2]]);
    }

    #[test]
    fn add_layer_replaces_taken_id() {
        let mut doc = Document::new();
        let wanted = LayerId::intern("taken_id");
        let first = doc.add_layer(NewLayer::new(LayerType::Frame).id(wanted));
        let second = doc.add_layer(NewLayer::new(LayerType::Frame).id(wanted));
        assert_eq!(first, wanted);
        assert_ne!(second, wanted);
    }

    #[test]
    fn update_unknown_id_is_noop() {
        let (mut doc, _) = doc_with(&["a"]);
        let before = doc.clone();
        assert!(!doc.update_layer(LayerId::intern("ghost"), LayerPatch::x(5.0)));
        assert_eq!(doc, before);
    }

    #[test]
    fn select_toggle_and_clear() {
        let (mut doc, ids) = doc_with(&["a", "b", "c"]);
        doc.select_layer(Some(ids[0]), false);
        doc.select_layer(Some(ids[2]), true);
        doc.select_layer(Some(ids[1]), true);
        assert_eq!(doc.selection(), &[ids[0], ids[2], ids[1]]);
        doc.select_layer(Some(ids[2]), true);
        assert_eq!(doc.selection(), &[ids[0], ids[1]]);
        doc.select_layer(None, false);
        assert!(doc.selection().is_empty());
    }

    #[test]
    fn delete_selected_removes_all_and_clears() {
        let (mut doc, ids) = doc_with(&["a", "b", "c"]);
        doc.select_many([ids[0], ids[2]]);
        assert_eq!(doc.delete_selected(), 2);
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.layers()[0].id, ids[1]);
        assert!(doc.selection().is_empty());
        assert_eq!(doc.delete_selected(), 0);
    }

    #[test]
    fn duplicate_keeps_mask_pairs_only_together() {
        let (mut doc, ids) = doc_with(&["content", "mask"]);
        doc.select_many([ids[0], ids[1]]);
        assert!(doc.create_mask(MaskType::Raster));

        doc.select_many([ids[1]]);
        let lone = doc.duplicate_selected()[0];
        let lone = doc.get(lone).unwrap();
        assert!(!lone.is_mask);
        assert_eq!(lone.mask_type, None);

        doc.select_many([ids[0], ids[1]]);
        let pair = doc.duplicate_selected();
        let (content, mask) = (doc.get(pair[0]).unwrap(), doc.get(pair[1]).unwrap());
        assert_eq!(content.masked_by, Some(mask.id));
        assert!(mask.is_mask);
        assert_eq!(mask.mask_type, Some(MaskType::Raster));

        doc.select_many([ids[0]]);
        let orphan = doc.duplicate_selected()[0];
        assert_eq!(doc.get(orphan).unwrap().masked_by, None);
        // The originals are untouched.
        assert_eq!(doc.get(ids[0]).unwrap().masked_by, Some(ids[1]));
    }

    #[test]
    fn duplicate_offsets_and_selects_copies() {
        let (mut doc, ids) = doc_with(&["a", "b"]);
        doc.select_many([ids[1], ids[0]]);
        let copies = doc.duplicate_selected();
        assert_eq!(copies.len(), 2);
        assert_eq!(doc.selection(), copies.as_slice());

        let a_copy = doc.get(copies[0]).unwrap();
        assert_eq!(a_copy.name, "a Copy");
        assert_eq!((a_copy.x, a_copy.y), (70.0, 70.0));
        assert_eq!(a_copy.z_index, 2);
        assert_eq!(doc.get(copies[1]).unwrap().z_index, 3);
    }

    #[test]
    fn reorder_renumbers_z_from_list_position() {
        let (mut doc, ids) = doc_with(&["a", "b", "c", "d"]);
        assert!(doc.reorder_layers(ids[3], ids[0]));
        let order: Vec<LayerId> = doc.layers().iter().map(|l| l.id).collect();
        assert_eq!(order, vec![ids[3], ids[0], ids[1], ids[2]]);
        let zs: Vec<i64> = doc.layers().iter().map(|l| l.z_index).collect();
        assert_eq!(zs, vec![3, 2, 1, 0]);

        assert!(!doc.reorder_layers(ids[0], LayerId::intern("nowhere")));
    }

    #[test]
    fn restore_prunes_missing_selection() {
        let (mut doc, ids) = doc_with(&["a", "b"]);
        let snapshot = doc.layers()[..1].to_vec();
        doc.select_many([ids[0], ids[1]]);
        doc.restore_layers(snapshot);
        assert_eq!(doc.selection(), &[ids[0]]);
    }
}
