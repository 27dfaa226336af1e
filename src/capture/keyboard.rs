use crate::event::{EventCategory, InputEvent};
use rdev::Key;

/// A normalized key press plus whether it was the session ender key.
pub struct TranslatedKey {
    pub event: InputEvent,
    pub is_ender: bool,
}

/// Key-down adapter. Distinguishes printable keys (rdev supplies the
/// produced unicode text) from special keys, and flags the configured
/// termination key so the dispatcher can stop the session after the
/// press itself has been recorded.
pub struct KeyAdapter {
    ender: Key,
}

impl KeyAdapter {
    pub fn new(ender: Key) -> Self {
        Self { ender }
    }

    pub fn translate(&self, key: Key, name: Option<&str>) -> TranslatedKey {
        let description = match name {
            Some(text) if is_printable(text) => format!("Key Pressed: {}", text),
            _ => format!("Special Key Pressed: {:?}", key),
        };
        TranslatedKey {
            event: InputEvent::new(EventCategory::Key, description),
            is_ender: key == self.ender,
        }
    }
}

fn is_printable(text: &str) -> bool {
    let mut chars = text.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if !c.is_control())
}

/// Parses a configured ender key name. The termination trigger is a
/// function key, so only `f1`..`f12` are recognized.
pub fn parse_function_key(name: &str) -> Option<Key> {
    match name.to_ascii_lowercase().as_str() {
        "f1" => Some(Key::F1),
        "f2" => Some(Key::F2),
        "f3" => Some(Key::F3),
        "f4" => Some(Key::F4),
        "f5" => Some(Key::F5),
        "f6" => Some(Key::F6),
        "f7" => Some(Key::F7),
        "f8" => Some(Key::F8),
        "f9" => Some(Key::F9),
        "f10" => Some(Key::F10),
        "f11" => Some(Key::F11),
        "f12" => Some(Key::F12),
        _ => None,
    }
}
