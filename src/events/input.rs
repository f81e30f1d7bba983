//! Key binding parsing and matching.
//!
//! Bindings in the config are written as `"q"`, `"Shift+S"`, `"Ctrl+c"`,
//! `"Enter"` or `"F2"`.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::str::FromStr;

/// Keys the application binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Tab,
    Up,
    Down,
    Left,
    Right,
    F(u8),
    Other,
}

impl From<KeyCode> for Key {
    fn from(code: KeyCode) -> Self {
        match code {
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Enter => Key::Enter,
            KeyCode::Esc => Key::Escape,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Tab => Key::Tab,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::F(n) => Key::F(n),
            _ => Key::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl From<KeyModifiers> for Modifiers {
    fn from(mods: KeyModifiers) -> Self {
        Self {
            ctrl: mods.contains(KeyModifiers::CONTROL),
            alt: mods.contains(KeyModifiers::ALT),
            shift: mods.contains(KeyModifiers::SHIFT),
        }
    }
}

/// A parsed key binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyBinding {
    /// Single punctuation characters, whose Shift state varies by layout.
    fn is_symbol(&self) -> bool {
        matches!(self.key, Key::Char(c) if !c.is_ascii_alphanumeric())
    }
}

impl FromStr for KeyBinding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut modifiers = Modifiers::default();
        let mut key = None;

        for part in s.split('+') {
            let lower = part.to_ascii_lowercase();
            key = match lower.as_str() {
                "ctrl" => {
                    modifiers.ctrl = true;
                    continue;
                }
                "alt" => {
                    modifiers.alt = true;
                    continue;
                }
                "shift" => {
                    modifiers.shift = true;
                    continue;
                }
                "enter" => Some(Key::Enter),
                "esc" | "escape" => Some(Key::Escape),
                "backspace" => Some(Key::Backspace),
                "tab" => Some(Key::Tab),
                "up" => Some(Key::Up),
                "down" => Some(Key::Down),
                "left" => Some(Key::Left),
                "right" => Some(Key::Right),
                f if f.len() > 1 && f.starts_with('f') => {
                    f[1..].parse::<u8>().ok().map(Key::F)
                }
                _ => {
                    let mut chars = part.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => Some(Key::Char(c)),
                        _ => None,
                    }
                }
            };
            if key.is_none() {
                return Err(format!("unknown key in binding {:?}", s));
            }
        }

        key.map(|key| Self { key, modifiers })
            .ok_or_else(|| format!("binding {:?} names no key", s))
    }
}

/// A key press from the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl From<KeyEvent> for InputEvent {
    fn from(event: KeyEvent) -> Self {
        Self {
            key: Key::from(event.code),
            modifiers: Modifiers::from(event.modifiers),
        }
    }
}

impl InputEvent {
    /// The typed character, if any.
    pub fn char(&self) -> Option<char> {
        match self.key {
            Key::Char(c) => Some(c),
            _ => None,
        }
    }

    /// Whether this press triggers `binding`. Unparseable bindings never match.
    pub fn matches(&self, binding: &str) -> bool {
        binding
            .parse::<KeyBinding>()
            .is_ok_and(|b| self.matches_binding(&b))
    }

    pub fn matches_binding(&self, binding: &KeyBinding) -> bool {
        if self.modifiers.ctrl != binding.modifiers.ctrl
            || self.modifiers.alt != binding.modifiers.alt
        {
            return false;
        }
        // Terminals disagree on whether symbols like '?' carry Shift.
        if self.modifiers.shift != binding.modifiers.shift && !binding.is_symbol() {
            return false;
        }

        match (self.key, binding.key) {
            (Key::Char(pressed), Key::Char(bound)) => pressed.eq_ignore_ascii_case(&bound),
            (pressed, bound) => pressed == bound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> InputEvent {
        InputEvent::from(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn test_parse_bindings() {
        let b: KeyBinding = "Shift+S".parse().unwrap();
        assert_eq!(b.key, Key::Char('S'));
        assert!(b.modifiers.shift);

        assert_eq!("F2".parse::<KeyBinding>().unwrap().key, Key::F(2));
        assert_eq!("/".parse::<KeyBinding>().unwrap().key, Key::Char('/'));
        assert!("Ctrl+".parse::<KeyBinding>().is_err());
        assert!("Shift+nope".parse::<KeyBinding>().is_err());
    }

    #[test]
    fn test_plain_and_shifted_letters() {
        let s = press(KeyCode::Char('s'), KeyModifiers::NONE);
        assert!(s.matches("s"));
        assert!(!s.matches("Shift+S"));

        let shifted = press(KeyCode::Char('S'), KeyModifiers::SHIFT);
        assert!(shifted.matches("Shift+S"));
        assert!(!shifted.matches("s"));
    }

    #[test]
    fn test_symbols_ignore_shift() {
        assert!(press(KeyCode::Char('?'), KeyModifiers::SHIFT).matches("?"));
        assert!(press(KeyCode::Char('?'), KeyModifiers::NONE).matches("?"));
        assert!(press(KeyCode::Char(']'), KeyModifiers::NONE).matches("]"));
        assert!(!press(KeyCode::Char('/'), KeyModifiers::CONTROL).matches("/"));
    }

    #[test]
    fn test_named_keys() {
        assert!(press(KeyCode::Enter, KeyModifiers::NONE).matches("Enter"));
        assert!(press(KeyCode::F(2), KeyModifiers::NONE).matches("F2"));
        assert!(press(KeyCode::Char('c'), KeyModifiers::CONTROL).matches("Ctrl+c"));
        assert!(!press(KeyCode::Char('c'), KeyModifiers::NONE).matches("Ctrl+c"));
        assert!(!press(KeyCode::Home, KeyModifiers::NONE).matches("Enter"));
        assert_eq!(press(KeyCode::Char('x'), KeyModifiers::NONE).char(), Some('x'));
    }
}
