//! Model-to-host notifications
//!
//! Models push events while handling input or stepping; the host drains the
//! queue once per frame.

use super::electrostatics::Charge;
use super::optics::Mirror;

#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    /// A charge was selected (snapshot) or the selection was cleared
    SelectionChanged(Option<Charge>),
    /// Laser/stencil signal strength changed (0-100)
    SignalUpdated(f32),
    /// A mirror was accepted into the level
    MirrorPlaced(Mirror),
    /// The platformer goal was reached
    LevelComplete,
    /// The platformer level was reset (explicitly or by falling)
    LevelReset,
}

#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<SimEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    /// Take every queued event, oldest first
    pub fn drain(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_empties_in_order() {
        let mut queue = EventQueue::new();
        queue.push(SimEvent::SignalUpdated(100.0));
        queue.push(SimEvent::LevelComplete);
        assert_eq!(
            queue.drain(),
            vec![SimEvent::SignalUpdated(100.0), SimEvent::LevelComplete]
        );
        assert!(queue.drain().is_empty());
    }
}
