//! Composition: grouping and masking over the current selection.

use crate::document::{Document, Selection};
use crate::geometry::bounding_box;
use crate::id::LayerId;
use crate::model::*;
use smallvec::SmallVec;

impl Document {
    /// Wrap the selection (two or more layers) in a new group layer.
    ///
    /// The group takes the union box of its members and is stacked above
    /// every existing layer; members are hidden and the group becomes the
    /// selection.
    pub fn group_selected(&mut self) -> Option<LayerId> {
        if self.selection.len() < 2 {
            log::debug!("group_selected: need at least two layers");
            return None;
        }
        let members = self.selected_layers();
        let bounds = bounding_box(members.iter().copied())?;
        let z_index = self.next_z();

        let group_count = self
            .layers
            .iter()
            .filter(|l| l.layer_type() == LayerType::Group)
            .count();
        let id = LayerId::with_prefix(LayerType::Group.as_str());
        let children: SmallVec<[LayerId; 4]> = self.selection.clone();

        let group = Layer {
            id,
            name: format!("Group {}", group_count + 1),
            x: bounds.x0,
            y: bounds.y0,
            width: bounds.width(),
            height: bounds.height(),
            rotation: 0.0,
            z_index,
            visible: true,
            locked: false,
            opacity: 1.0,
            blend_mode: BlendMode::Normal,
            content: LayerContent::Group {
                children: children.clone(),
                expanded: false,
            },
            is_mask: false,
            masked_by: None,
            mask_type: None,
        };

        for layer in &mut self.layers {
            if children.contains(&layer.id) {
                layer.visible = false;
            }
        }
        self.layers.push(group);
        self.selection = SmallVec::from_elem(id, 1);
        log::debug!("group_selected: {id} with {} member(s)", children.len());
        Some(id)
    }

    /// Dissolve every selected group. Members are shown again and become
    /// the selection. Selected non-group layers are left alone.
    pub fn ungroup_selected(&mut self) -> Selection {
        let groups: Vec<(LayerId, SmallVec<[LayerId; 4]>)> = self
            .layers
            .iter()
            .filter(|l| l.layer_type() == LayerType::Group && self.selection.contains(&l.id))
            .map(|l| (l.id, SmallVec::from(l.children())))
            .collect();
        if groups.is_empty() {
            return Selection::new();
        }

        let mut released = Selection::new();
        for (_, children) in &groups {
            for child in children {
                if let Some(layer) = self.get_mut(*child) {
                    layer.visible = true;
                    if !released.contains(child) {
                        released.push(*child);
                    }
                }
            }
        }

        self.layers
            .retain(|l| !groups.iter().any(|(group, _)| *group == l.id));
        self.selection = released.clone();
        log::debug!(
            "ungroup_selected: dissolved {} group(s), released {} layer(s)",
            groups.len(),
            released.len()
        );
        released
    }

    /// Turn a two-layer selection into a mask pair. The layer with the
    /// higher z-index becomes the mask; the other is the content layer and
    /// ends up selected.
    ///
    /// No-op unless exactly two layers are selected and neither already
    /// takes part in a mask relation.
    pub fn create_mask(&mut self, mask_type: MaskType) -> bool {
        if self.selection.len() != 2 {
            return false;
        }
        let mut pair = self.selected_layers();
        if pair.len() != 2 {
            return false;
        }
        if pair.iter().any(|l| l.is_mask || l.masked_by.is_some()) {
            log::debug!("create_mask: selection already participates in a mask");
            return false;
        }
        pair.sort_by_key(|l| std::cmp::Reverse(l.z_index));
        let (mask_id, content_id) = (pair[0].id, pair[1].id);

        if let Some(mask) = self.get_mut(mask_id) {
            mask.is_mask = true;
            mask.mask_type = Some(mask_type);
            mask.name = mask_type.layer_name().to_string();
        }
        if let Some(content) = self.get_mut(content_id) {
            content.masked_by = Some(mask_id);
        }
        self.selection = SmallVec::from_elem(content_id, 1);
        true
    }

    /// Undo the mask relation of the first selected masked layer.
    pub fn release_mask(&mut self) -> bool {
        let Some((content_id, mask_id)) = self
            .layers
            .iter()
            .filter(|l| self.selection.contains(&l.id))
            .find_map(|l| l.masked_by.map(|m| (l.id, m)))
        else {
            return false;
        };

        if let Some(mask) = self.get_mut(mask_id) {
            mask.is_mask = false;
            mask.mask_type = None;
        }
        if let Some(content) = self.get_mut(content_id) {
            content.masked_by = None;
        }
        self.selection = SmallVec::from_elem(content_id, 1);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn three() -> (Document, [LayerId; 3]) {
        let mut doc = Document::new();
        let a = doc.add_layer(NewLayer::new(LayerType::Shape).at(10.0, 10.0).sized(50.0, 50.0));
        let b = doc.add_layer(NewLayer::new(LayerType::Image).at(100.0, 40.0).sized(30.0, 80.0));
        let c = doc.add_layer(NewLayer::new(LayerType::Text).at(0.0, 0.0).sized(5.0, 5.0));
        (doc, [a, b, c])
    }

    #[test]
    fn group_covers_members() {
        let (mut doc, [a, b, _]) = three();
        doc.select_many([a, b]);
        let group = doc.group_selected().unwrap();
        let g = doc.get(group).unwrap();
        assert_eq!(g.name, "Group 1");
        assert_eq!(g.rect(), kurbo::Rect::new(10.0, 10.0, 130.0, 120.0));
        assert_eq!(g.z_index, 3);
        assert_eq!(g.children(), &[a, b]);
        assert!(!doc.get(a).unwrap().visible);
        assert_eq!(doc.selection(), &[group]);
    }

    #[test]
    fn group_below_top_layer_keeps_z_unique() {
        let (mut doc, [a, b, c]) = three();
        doc.select_many([a, b]);
        let group = doc.group_selected().unwrap();
        let gz = doc.get(group).unwrap().z_index;
        assert!(gz > doc.get(c).unwrap().z_index);

        let mut zs: Vec<i64> = doc.layers().iter().map(|l| l.z_index).collect();
        zs.sort_unstable();
        zs.dedup();
        assert_eq!(zs.len(), doc.len());
    }

    #[test]
    fn group_needs_two() {
        let (mut doc, [a, ..]) = three();
        doc.select_many([a]);
        assert_eq!(doc.group_selected(), None);
        assert_eq!(doc.len(), 3);
    }

    #[test]
    fn ungroup_without_group_is_noop() {
        let (mut doc, [a, b, _]) = three();
        doc.select_many([a, b]);
        let before = doc.clone();
        assert!(doc.ungroup_selected().is_empty());
        assert_eq!(doc, before);
    }

    #[test]
    fn mask_uses_higher_z() {
        let (mut doc, [a, b, _]) = three();
        doc.select_many([a, b]);
        assert!(doc.create_mask(MaskType::Vector));
        let mask = doc.get(b).unwrap();
        assert!(mask.is_mask);
        assert_eq!(mask.name, "Vector Mask");
        assert_eq!(doc.get(a).unwrap().masked_by, Some(b));
        assert_eq!(doc.selection(), &[a]);

        // Already masked: a second attempt changes nothing.
        doc.select_many([a, b]);
        assert!(!doc.create_mask(MaskType::Raster));

        doc.select_many([a]);
        assert!(doc.release_mask());
        assert_eq!(doc.get(a).unwrap().masked_by, None);
        assert!(!doc.get(b).unwrap().is_mask);
        assert_eq!(doc.get(b).unwrap().mask_type, None);
    }

    #[test]
    fn deleting_mask_clears_link() {
        let (mut doc, [a, b, _]) = three();
        doc.select_many([a, b]);
        doc.create_mask(MaskType::Raster);
        doc.select_many([b]);
        doc.delete_selected();
        assert_eq!(doc.get(a).unwrap().masked_by, None);
    }

    #[test]
    fn mask_needs_exactly_two() {
        let (mut doc, [a, b, c]) = three();
        doc.select_many([a, b, c]);
        let before = doc.clone();
        assert!(!doc.create_mask(MaskType::Raster));
        assert_eq!(doc, before);
        assert!(!doc.release_mask());
    }
}
