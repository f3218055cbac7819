use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use winit::event::{MouseButton as WinitMouseButton, VirtualKeyCode};

/// Identifier for a physical keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    Named(NamedKey),
    Character(char),
    Digit(u8),
}

impl KeyCode {
    /// Maps a winit key to the subset of keys the viewer reacts to.
    pub fn from_winit(code: VirtualKeyCode) -> Option<Self> {
        use VirtualKeyCode as Key;
        Some(match code {
            Key::Escape => KeyCode::Named(NamedKey::Escape),
            Key::Up => KeyCode::Named(NamedKey::Up),
            Key::Down => KeyCode::Named(NamedKey::Down),
            Key::LShift => KeyCode::Named(NamedKey::LeftShift),
            Key::RShift => KeyCode::Named(NamedKey::RightShift),
            Key::Key1 | Key::Numpad1 => KeyCode::Digit(1),
            Key::Key2 | Key::Numpad2 => KeyCode::Digit(2),
            Key::Key3 | Key::Numpad3 => KeyCode::Digit(3),
            Key::A => KeyCode::Character('A'),
            Key::C => KeyCode::Character('C'),
            Key::D => KeyCode::Character('D'),
            Key::E => KeyCode::Character('E'),
            Key::N => KeyCode::Character('N'),
            Key::Q => KeyCode::Character('Q'),
            Key::S => KeyCode::Character('S'),
            Key::W => KeyCode::Character('W'),
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedKey {
    Escape,
    Up,
    Down,
    LeftShift,
    RightShift,
}

/// Identifier for a mouse button (left button is zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MouseButton(u8);

impl MouseButton {
    pub const LEFT: Self = Self(0);
    pub const RIGHT: Self = Self(1);
    pub const MIDDLE: Self = Self(2);

    pub fn from_winit(button: WinitMouseButton) -> Self {
        match button {
            WinitMouseButton::Left => Self::LEFT,
            WinitMouseButton::Right => Self::RIGHT,
            WinitMouseButton::Middle => Self::MIDDLE,
            WinitMouseButton::Other(value) => Self(value.min(u8::MAX as u16) as u8),
        }
    }
}

/// Pressed keys and buttons as of the latest window event.
#[derive(Debug, Default, Clone)]
pub struct InputState {
    keys: HashSet<KeyCode>,
    mouse_buttons: HashSet<MouseButton>,
    mouse_position: Option<Vec2>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key_down(&mut self, key: KeyCode) {
        self.keys.insert(key);
    }

    pub fn set_key_up(&mut self, key: KeyCode) {
        self.keys.remove(&key);
    }

    pub fn set_mouse_button_down(&mut self, button: MouseButton) {
        self.mouse_buttons.insert(button);
    }

    pub fn set_mouse_button_up(&mut self, button: MouseButton) {
        self.mouse_buttons.remove(&button);
    }

    pub fn set_mouse_position(&mut self, position: Vec2) {
        self.mouse_position = Some(position);
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }

    pub fn is_char_down(&self, ch: char) -> bool {
        self.is_key_down(KeyCode::Character(ch.to_ascii_uppercase()))
    }

    pub fn is_shift_down(&self) -> bool {
        self.is_key_down(KeyCode::Named(NamedKey::LeftShift))
            || self.is_key_down(KeyCode::Named(NamedKey::RightShift))
    }

    pub fn is_mouse_button_down(&self, button: MouseButton) -> bool {
        self.mouse_buttons.contains(&button)
    }

    /// Last known cursor position, `None` until the cursor first moves.
    pub fn mouse_position(&self) -> Option<Vec2> {
        self.mouse_position
    }

    /// Forgets held keys and buttons, e.g. after the window loses focus.
    pub fn clear(&mut self) {
        self.keys.clear();
        self.mouse_buttons.clear();
    }
}
