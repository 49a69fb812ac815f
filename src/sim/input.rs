//! Discrete input commands delivered to boards
//!
//! The window layer decodes raw events into these. Every event goes to every
//! board; each board decides for itself whether the event is meant for it
//! (pointer inside its rectangle, or a key from its own bindings).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::launcher::TurnDirection;

/// Keys the boards can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    A,
    D,
    Q,
    E,
    W,
    S,
    Left,
    Right,
    Up,
    Down,
    Comma,
    Period,
    Space,
    Enter,
    LeftShift,
    RightShift,
}

/// One decoded input event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer moved to a viewport position
    PointerMoved(Vec2),
    /// Pointer pressed at a viewport position (aim and fire)
    PointerPressed(Vec2),
    KeyDown(Key),
    KeyUp(Key),
    /// Window closed
    Quit,
}

/// Key bindings for one board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controls {
    pub coarse_left: Key,
    pub coarse_right: Key,
    pub fine_left: Key,
    pub fine_right: Key,
    pub fire: Key,
    /// Held to show the aim guide
    pub assist: Key,
}

impl Controls {
    /// Left-hand bindings
    pub fn player_one() -> Self {
        Self {
            coarse_left: Key::A,
            coarse_right: Key::D,
            fine_left: Key::Q,
            fine_right: Key::E,
            fire: Key::W,
            assist: Key::LeftShift,
        }
    }

    /// Right-hand bindings
    pub fn player_two() -> Self {
        Self {
            coarse_left: Key::Left,
            coarse_right: Key::Right,
            fine_left: Key::Comma,
            fine_right: Key::Period,
            fire: Key::Up,
            assist: Key::RightShift,
        }
    }

    /// Turning intent bound to `key`
    pub fn turn_for(&self, key: Key) -> Option<TurnDirection> {
        [
            (self.coarse_left, TurnDirection::CoarseLeft),
            (self.coarse_right, TurnDirection::CoarseRight),
            (self.fine_left, TurnDirection::FineLeft),
            (self.fine_right, TurnDirection::FineRight),
        ]
        .into_iter()
        .find_map(|(bound, direction)| (bound == key).then_some(direction))
    }

    /// Whether the bindings use `key` at all
    pub fn binds(&self, key: Key) -> bool {
        self.turn_for(key).is_some() || key == self.fire || key == self.assist
    }
}

impl Default for Controls {
    fn default() -> Self {
        Self::player_one()
    }
}
