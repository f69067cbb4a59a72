//! Game, keyboard and pointer events
//!
//! Every event carries one cancel flag. Dispatch stops handing the event on
//! as soon as the flag is set; handlers already called are not undone.

use serde::{Deserialize, Serialize};

use super::state::Value;

/// Shared cancellation contract
pub trait Cancellable {
    fn cancel(&mut self);
    fn is_cancelled(&self) -> bool;
}

/// Named game event queued for the next running step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    pub name: String,
    pub payload: Option<Value>,
    #[serde(skip)]
    cancelled: bool,
}

impl GameEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: None,
            cancelled: false,
        }
    }

    pub fn with_payload(mut self, payload: impl Into<Value>) -> Self {
        self.payload = Some(payload.into());
        self
    }
}

impl Cancellable for GameEvent {
    fn cancel(&mut self) {
        self.cancelled = true;
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyPhase {
    Down,
    Up,
}

/// Raw key transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyboardEvent {
    pub key: String,
    pub phase: KeyPhase,
    #[serde(skip)]
    cancelled: bool,
}

impl KeyboardEvent {
    pub fn new(key: impl Into<String>, phase: KeyPhase) -> Self {
        Self {
            key: key.into(),
            phase,
            cancelled: false,
        }
    }

    pub fn down(key: impl Into<String>) -> Self {
        Self::new(key, KeyPhase::Down)
    }

    pub fn up(key: impl Into<String>) -> Self {
        Self::new(key, KeyPhase::Up)
    }
}

impl Cancellable for KeyboardEvent {
    fn cancel(&mut self) {
        self.cancelled = true;
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

/// Pointer transition; handlers are registered per phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerPhase {
    Down,
    Up,
    Move,
}

/// Input device that produced a pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PointerKind {
    #[default]
    Mouse,
    Touch,
    Pen,
}

/// Pointer event; coordinates are screen space until routed through a camera
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub x: f32,
    pub y: f32,
    pub phase: PointerPhase,
    pub kind: PointerKind,
    #[serde(skip)]
    cancelled: bool,
}

impl PointerEvent {
    pub fn new(x: f32, y: f32, phase: PointerPhase) -> Self {
        Self {
            x,
            y,
            phase,
            kind: PointerKind::Mouse,
            cancelled: false,
        }
    }

    pub fn with_kind(mut self, kind: PointerKind) -> Self {
        self.kind = kind;
        self
    }
}

impl Cancellable for PointerEvent {
    fn cancel(&mut self) {
        self.cancelled = true;
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

/// Input waiting for the next running step
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum InputEvent {
    Keyboard(KeyboardEvent),
    Pointer(PointerEvent),
}
