//! Input hub
//!
//! The host forwards raw pointer/keyboard events as `RawInput`. The hub keeps
//! the latest pointer position and held keys, and turns each raw event into a
//! typed `InputEvent` delivered to channel subscribers in registration order.
//! The owning model receives the same event as the return value of `apply`.

use std::collections::HashSet;
use std::fmt;

use crate::sim::Vector2;

/// Physical key, named after DOM `KeyboardEvent.code`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyCode {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    KeyA,
    KeyD,
    KeyW,
    KeyR,
    Space,
    ShiftLeft,
    ShiftRight,
    Other(String),
}

impl KeyCode {
    pub fn from_code(code: &str) -> Self {
        match code {
            "ArrowLeft" => KeyCode::ArrowLeft,
            "ArrowRight" => KeyCode::ArrowRight,
            "ArrowUp" => KeyCode::ArrowUp,
            "ArrowDown" => KeyCode::ArrowDown,
            "KeyA" => KeyCode::KeyA,
            "KeyD" => KeyCode::KeyD,
            "KeyW" => KeyCode::KeyW,
            "KeyR" => KeyCode::KeyR,
            "Space" => KeyCode::Space,
            "ShiftLeft" => KeyCode::ShiftLeft,
            "ShiftRight" => KeyCode::ShiftRight,
            other => KeyCode::Other(other.to_string()),
        }
    }

    pub fn is_shift(&self) -> bool {
        matches!(self, KeyCode::ShiftLeft | KeyCode::ShiftRight)
    }
}

/// Mouse button, from DOM `MouseEvent.button`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    Other(i16),
}

impl MouseButton {
    pub fn from_index(button: i16) -> Self {
        match button {
            0 => MouseButton::Left,
            1 => MouseButton::Middle,
            2 => MouseButton::Right,
            n => MouseButton::Other(n),
        }
    }
}

/// Untyped event as delivered by the host, positions in surface pixels
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    PointerMove { x: f32, y: f32 },
    PointerDown { x: f32, y: f32, button: i16 },
    PointerUp { x: f32, y: f32, button: i16 },
    KeyDown { code: String },
    KeyUp { code: String },
}

/// Subscription channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    PointerDown,
    PointerUp,
    PointerMove,
    KeyDown,
}

/// Typed event emitted on a channel
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { pos: Vector2, button: MouseButton },
    PointerUp { pos: Vector2, button: MouseButton },
    PointerMove { pos: Vector2 },
    KeyDown { code: KeyCode },
}

impl InputEvent {
    pub fn channel(&self) -> Channel {
        match self {
            InputEvent::PointerDown { .. } => Channel::PointerDown,
            InputEvent::PointerUp { .. } => Channel::PointerUp,
            InputEvent::PointerMove { .. } => Channel::PointerMove,
            InputEvent::KeyDown { .. } => Channel::KeyDown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&InputEvent)>;

struct Subscription {
    id: SubscriptionId,
    channel: Channel,
    listener: Listener,
}

/// Per-model input state and channel dispatcher
#[derive(Default)]
pub struct InputHub {
    pointer: Vector2,
    pointer_down: bool,
    keys_held: HashSet<KeyCode>,
    subscriptions: Vec<Subscription>,
    next_id: u64,
}

impl fmt::Debug for InputHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputHub")
            .field("pointer", &self.pointer)
            .field("pointer_down", &self.pointer_down)
            .field("keys_held", &self.keys_held)
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

impl InputHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener on `channel`
    pub fn subscribe(
        &mut self,
        channel: Channel,
        listener: impl FnMut(&InputEvent) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription {
            id,
            channel,
            listener: Box::new(listener),
        });
        id
    }

    /// Remove a listener; returns false if it was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Fold a raw event into the state and dispatch the typed event, if any.
    ///
    /// Pointer position is updated on every pointer event. Key-up only
    /// releases the held key and emits nothing.
    pub fn apply(&mut self, raw: RawInput) -> Option<InputEvent> {
        let event = match raw {
            RawInput::PointerMove { x, y } => {
                self.pointer = Vector2::new(x, y);
                InputEvent::PointerMove { pos: self.pointer }
            }
            RawInput::PointerDown { x, y, button } => {
                self.pointer = Vector2::new(x, y);
                self.pointer_down = true;
                InputEvent::PointerDown {
                    pos: self.pointer,
                    button: MouseButton::from_index(button),
                }
            }
            RawInput::PointerUp { x, y, button } => {
                self.pointer = Vector2::new(x, y);
                self.pointer_down = false;
                InputEvent::PointerUp {
                    pos: self.pointer,
                    button: MouseButton::from_index(button),
                }
            }
            RawInput::KeyDown { code } => {
                let code = KeyCode::from_code(&code);
                self.keys_held.insert(code.clone());
                InputEvent::KeyDown { code }
            }
            RawInput::KeyUp { code } => {
                self.keys_held.remove(&KeyCode::from_code(&code));
                return None;
            }
        };
        self.emit(&event);
        Some(event)
    }

    fn emit(&mut self, event: &InputEvent) {
        let channel = event.channel();
        for sub in self.subscriptions.iter_mut().filter(|s| s.channel == channel) {
            (sub.listener)(event);
        }
    }

    pub fn pointer(&self) -> Vector2 {
        self.pointer
    }

    pub fn is_pointer_down(&self) -> bool {
        self.pointer_down
    }

    pub fn is_key_held(&self, code: &KeyCode) -> bool {
        self.keys_held.contains(code)
    }

    /// True if any of `codes` is held
    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.keys_held.contains(c))
    }

    /// No-op: the hub lives as long as the host surface
    pub fn destroy(&mut self) {}
}
