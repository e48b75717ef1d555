use std::collections::HashSet;

use super::types::{InputEvent, Key, KeyState};

/// Current input state for the window.
///
/// Answers level queries ("is this key held right now"), which is what the
/// frame loop polls once per iteration.
#[derive(Debug, Default)]
pub struct InputState {
    keys_down: HashSet<Key>,
}

impl InputState {
    /// Applies a platform-agnostic input event to the current state.
    pub fn apply_event(&mut self, ev: &InputEvent) {
        match ev {
            // Release events are not delivered to unfocused windows.
            InputEvent::Focused(false) => self.keys_down.clear(),
            InputEvent::Focused(true) => {}

            InputEvent::Key { key, state, .. } => match state {
                KeyState::Pressed => {
                    self.keys_down.insert(*key);
                }
                KeyState::Released => {
                    self.keys_down.remove(key);
                }
            },
        }
    }

    #[inline]
    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: Key, state: KeyState, repeat: bool) -> InputEvent {
        InputEvent::Key { key, state, repeat }
    }

    #[test]
    fn press_then_release() {
        let mut s = InputState::default();
        s.apply_event(&key(Key::Escape, KeyState::Pressed, false));
        assert!(s.key_down(Key::Escape));
        s.apply_event(&key(Key::Escape, KeyState::Released, false));
        assert!(!s.key_down(Key::Escape));
    }

    #[test]
    fn repeats_keep_key_held() {
        let mut s = InputState::default();
        s.apply_event(&key(Key::Escape, KeyState::Pressed, false));
        s.apply_event(&key(Key::Escape, KeyState::Pressed, true));
        s.apply_event(&key(Key::Escape, KeyState::Pressed, true));
        assert!(s.key_down(Key::Escape));
        assert_eq!(s.keys_down.len(), 1);
    }

    #[test]
    fn focus_loss_releases_everything() {
        let mut s = InputState::default();
        s.apply_event(&InputEvent::Focused(true));
        s.apply_event(&key(Key::Escape, KeyState::Pressed, false));
        s.apply_event(&key(Key::Unknown(57), KeyState::Pressed, false));
        s.apply_event(&InputEvent::Focused(false));
        assert!(!s.key_down(Key::Escape));
        assert!(s.keys_down.is_empty());
    }

    #[test]
    fn release_of_unheld_key_is_ignored() {
        let mut s = InputState::default();
        s.apply_event(&key(Key::Unknown(16), KeyState::Released, false));
        assert!(s.keys_down.is_empty());
    }
}
