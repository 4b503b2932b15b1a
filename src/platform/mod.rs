//! Platform abstraction layer
//!
//! Handles the host-facing plumbing shared by every model:
//! - Input events (pointer, keyboard) and channel subscriptions
//! - Frame timing and the update/draw cycle

pub mod input;
pub mod scheduler;

pub use input::{Channel, InputEvent, InputHub, KeyCode, MouseButton, RawInput, SubscriptionId};
pub use scheduler::{FrameRequest, FrameTime, Scheduler};
