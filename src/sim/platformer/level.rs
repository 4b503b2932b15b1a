//! Platformer level layout

use serde::{Deserialize, Serialize};

use crate::sim::{Rect, Vector2};

/// Static AABB the player can land on
pub type Platform = Rect;

/// Fixed magnetic pole
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Magnet {
    pub pos: Vector2,
    /// Polarity, -1 or +1
    pub q: f32,
    pub radius: f32,
}

impl Magnet {
    pub const fn new(x: f32, y: f32, q: f32, radius: f32) -> Self {
        Self {
            pos: Vector2::new(x, y),
            q,
            radius,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub platforms: Vec<Platform>,
    pub magnets: Vec<Magnet>,
    pub goal: Rect,
}

impl Level {
    /// The built-in level, anchored to the canvas bottom and right edges
    pub fn standard(width: f32, height: f32) -> Self {
        Self {
            platforms: vec![
                // Ground
                Rect::new(0.0, height - 20.0, width, 20.0),
                // Steps
                Rect::new(200.0, height - 150.0, 150.0, 20.0),
                Rect::new(500.0, height - 300.0, 150.0, 20.0),
                Rect::new(100.0, height - 450.0, 150.0, 20.0),
                // Goal ledge
                Rect::new(width - 200.0, 100.0, 200.0, 20.0),
            ],
            magnets: vec![
                // Lift from the start
                Magnet::new(275.0, height - 250.0, -1.0, 25.0),
                // Push across the gap
                Magnet::new(425.0, height - 200.0, 1.0, 25.0),
                // Pull to the high step
                Magnet::new(175.0, height - 550.0, 1.0, 25.0),
                // Guards the goal
                Magnet::new(width - 100.0, 250.0, -1.0, 30.0),
            ],
            goal: Rect::new(width - 150.0, 40.0, 100.0, 60.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_layout() {
        let level = Level::standard(1000.0, 700.0);
        assert_eq!(level.platforms.len(), 5);
        assert_eq!(level.platforms[0], Rect::new(0.0, 680.0, 1000.0, 20.0));
        assert_eq!(level.magnets.len(), 4);
        assert!(level.magnets.iter().all(|m| m.q.abs() == 1.0));
        assert_eq!(level.goal, Rect::new(850.0, 40.0, 100.0, 60.0));
        // Goal sits on its ledge
        assert_eq!(level.goal.bottom(), level.platforms[4].top());
    }
}
