//! Flat mirrors placed on the grid

use serde::{Deserialize, Serialize};

use crate::deg_to_rad;
use crate::sim::Vector2;

/// Brush angles in degrees; the brush cycles through these
pub const BRUSH_ANGLES: [u16; 4] = [0, 45, 90, 135];

/// Next brush angle after `angle`
pub fn next_brush_angle(angle: u16) -> u16 {
    (angle + 45) % 180
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mirror {
    pub id: u32,
    /// Center cell
    pub x: i32,
    pub y: i32,
    /// Degrees, one of `BRUSH_ANGLES`
    pub angle: u16,
    /// Length in cells
    pub length: f32,
}

impl Mirror {
    /// Pixel-space half extent along the mirror
    fn half_extent(&self, scale: f32) -> Vector2 {
        Vector2::from_angle(deg_to_rad(self.angle as f32)) * (self.length / 2.0 * scale)
    }

    pub fn center(&self, scale: f32) -> Vector2 {
        Vector2::new(self.x as f32 * scale, self.y as f32 * scale)
    }

    /// Endpoints in pixels
    pub fn segment(&self, scale: f32) -> (Vector2, Vector2) {
        let c = self.center(scale);
        let half = self.half_extent(scale);
        (c - half, c + half)
    }

    /// Unit normal, `(-dy, dx)` of the mirror direction
    pub fn normal(&self) -> Vector2 {
        Vector2::from_angle(deg_to_rad(self.angle as f32)).perp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brush_cycles() {
        let mut angle = 0;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(angle);
            angle = next_brush_angle(angle);
        }
        assert_eq!(seen, BRUSH_ANGLES);
        assert_eq!(angle, 0);
    }

    #[test]
    fn test_segment_and_normal() {
        let m = Mirror {
            id: 1,
            x: 50,
            y: 40,
            angle: 90,
            length: 15.0,
        };
        let (a, b) = m.segment(2.0);
        assert!((a.x - 100.0).abs() < 1e-4 && (a.y - 65.0).abs() < 1e-4);
        assert!((b.x - 100.0).abs() < 1e-4 && (b.y - 95.0).abs() < 1e-4);
        let n = m.normal();
        assert!((n.x + 1.0).abs() < 1e-6 && n.y.abs() < 1e-6);
    }
}
