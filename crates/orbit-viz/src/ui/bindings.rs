//! Keyboard bindings and input handling.

use nannou::prelude::*;

/// Actions that can be triggered by key presses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    TogglePlayback,
    ReloadSettings,
    ToggleHud,
}

pub fn parse_key(key: Key) -> Option<Action> {
    match key {
        Key::Q | Key::Escape => Some(Action::Quit),
        Key::Space => Some(Action::TogglePlayback),
        Key::R => Some(Action::ReloadSettings),
        Key::H => Some(Action::ToggleHud),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key() {
        assert_eq!(parse_key(Key::Q), Some(Action::Quit));
        assert_eq!(parse_key(Key::Escape), Some(Action::Quit));
        assert_eq!(parse_key(Key::Space), Some(Action::TogglePlayback));
        assert_eq!(parse_key(Key::R), Some(Action::ReloadSettings));
        assert_eq!(parse_key(Key::H), Some(Action::ToggleHud));
        assert_eq!(parse_key(Key::X), None);
    }
}
