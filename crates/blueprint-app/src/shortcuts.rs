//! Keyboard and pointer shortcut registry.

use blueprint_core::{Key, KeyEvent};

/// A canvas shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }

    /// Key events that trigger this shortcut on the canvas, modifiers first.
    /// `None` for pointer gestures.
    pub fn key_events(&self) -> Option<Vec<KeyEvent>> {
        let key = match Key::from_name(self.key) {
            Key::Other(_) => return None,
            key => key,
        };
        let mut events = Vec::new();
        if self.ctrl {
            events.push(KeyEvent::Pressed(Key::Control));
        }
        if self.shift {
            events.push(KeyEvent::Pressed(Key::Shift));
        }
        events.push(KeyEvent::Pressed(key.clone()));
        events.push(KeyEvent::Released(key));
        if self.shift {
            events.push(KeyEvent::Released(Key::Shift));
        }
        if self.ctrl {
            events.push(KeyEvent::Released(Key::Control));
        }
        Some(events)
    }
}

/// Registry of all canvas shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("Backspace", false, false, "Remove the last placed point"),
            Shortcut::new("Z", true, false, "Undo"),
            Shortcut::new("Z", true, true, "Redo"),
            Shortcut::new("Y", true, false, "Redo"),
            Shortcut::new("Drag", false, true, "Move a point or path (edit mode)"),
            Shortcut::new("Right-Drag", false, false, "Erase points or paths"),
        ]
    }

    /// Print all shortcuts to console.
    pub fn print_all() {
        println!("\n=== Canvas Shortcuts ===");
        for shortcut in Self::all() {
            println!("  {:20} {}", shortcut.format(), shortcut.description);
        }
        println!();
    }
}
