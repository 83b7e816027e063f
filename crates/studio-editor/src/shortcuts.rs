//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. Events whose
//! focus is in a text-entry control never resolve, so typing in a layer name
//! or prompt field cannot delete layers.

use crate::input::KeyEvent;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Edit ──
    Undo,
    Redo,
    Delete,
    SelectAll,
    Duplicate,

    // ── Composition ──
    Group,
    Ungroup,

    // ── View ──
    ZoomIn,
    ZoomOut,
    ZoomReset,

    /// Cancel the active gesture or crop; otherwise clear the selection.
    Escape,
}

/// Resolves key events into shortcut actions.
///
/// Uses platform-aware modifier detection: on macOS `meta` is ⌘,
/// on other platforms `ctrl` serves the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(event: &KeyEvent) -> Option<ShortcutAction> {
        if event.in_text_input {
            return None;
        }
        let key = event.key.as_str();
        let cmd = event.modifiers.command();
        let shift = event.modifiers.shift;

        // ── Modifier combos first (most specific) ──
        if cmd && shift {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Redo),
                "g" | "G" => Some(ShortcutAction::Ungroup),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Undo),
                "y" | "Y" => Some(ShortcutAction::Redo),
                "a" | "A" => Some(ShortcutAction::SelectAll),
                "d" | "D" => Some(ShortcutAction::Duplicate),
                "g" | "G" => Some(ShortcutAction::Group),
                "=" | "+" => Some(ShortcutAction::ZoomIn),
                "-" => Some(ShortcutAction::ZoomOut),
                "0" => Some(ShortcutAction::ZoomReset),
                _ => None,
            };
        }

        match key {
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Escape),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;

    fn resolve(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        ShortcutMap::resolve(&KeyEvent::new(key, modifiers))
    }

    #[test]
    fn resolve_undo_redo() {
        // Cmd+Z → Undo
        assert_eq!(resolve("z", Modifiers::CMD), Some(ShortcutAction::Undo));
        // Ctrl+Z → Undo
        let ctrl = Modifiers {
            ctrl: true,
            ..Modifiers::NONE
        };
        assert_eq!(resolve("z", ctrl), Some(ShortcutAction::Undo));
        // Cmd+Shift+Z → Redo
        let cmd_shift = Modifiers {
            shift: true,
            ..Modifiers::CMD
        };
        assert_eq!(resolve("Z", cmd_shift), Some(ShortcutAction::Redo));
        // Cmd+Y → Redo
        assert_eq!(resolve("y", Modifiers::CMD), Some(ShortcutAction::Redo));
    }

    #[test]
    fn resolve_delete() {
        assert_eq!(resolve("Delete", Modifiers::NONE), Some(ShortcutAction::Delete));
        assert_eq!(resolve("Backspace", Modifiers::NONE), Some(ShortcutAction::Delete));
    }

    #[test]
    fn delete_ignored_in_text_input() {
        let event = KeyEvent::new("Backspace", Modifiers::NONE).in_text_input();
        assert_eq!(ShortcutMap::resolve(&event), None);
        let event = KeyEvent::new("z", Modifiers::CMD).in_text_input();
        assert_eq!(ShortcutMap::resolve(&event), None);
    }

    #[test]
    fn resolve_grouping() {
        assert_eq!(resolve("g", Modifiers::CMD), Some(ShortcutAction::Group));
        let cmd_shift = Modifiers {
            shift: true,
            ..Modifiers::CMD
        };
        assert_eq!(resolve("g", cmd_shift), Some(ShortcutAction::Ungroup));
    }

    #[test]
    fn resolve_zoom() {
        assert_eq!(resolve("=", Modifiers::CMD), Some(ShortcutAction::ZoomIn));
        assert_eq!(resolve("-", Modifiers::CMD), Some(ShortcutAction::ZoomOut));
        assert_eq!(resolve("0", Modifiers::CMD), Some(ShortcutAction::ZoomReset));
    }

    #[test]
    fn resolve_modifier_precedence() {
        assert_eq!(resolve("z", Modifiers::NONE), None);
        assert_eq!(resolve("d", Modifiers::SHIFT), None);
        assert_eq!(resolve("Escape", Modifiers::NONE), Some(ShortcutAction::Escape));
    }
}
