//! Point charge entity

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::consts::TRAIL_LENGTH;
use crate::sim::Vector2;

/// A movable (or pinned) point charge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Charge {
    pub id: u32,
    pub pos: Vector2,
    pub vel: Vector2,
    /// Acceleration applied during the last step
    pub acc: Vector2,
    pub q: f32,
    pub mass: f32,
    pub radius: f32,
    pub is_fixed: bool,
    pub is_dragging: bool,
    /// Where the charge was spawned; `reset_positions` returns it here
    pub spawn: Vector2,
    /// Recent positions, oldest first
    #[serde(skip)]
    pub trail: VecDeque<Vector2>,
}

impl Charge {
    pub fn new(id: u32, pos: Vector2, q: f32, mass: f32, radius: f32) -> Self {
        Self {
            id,
            pos,
            vel: Vector2::ZERO,
            acc: Vector2::ZERO,
            q,
            mass,
            radius,
            is_fixed: false,
            is_dragging: false,
            spawn: pos,
            trail: VecDeque::with_capacity(TRAIL_LENGTH),
        }
    }

    pub fn fixed(mut self) -> Self {
        self.is_fixed = true;
        self
    }

    pub fn with_velocity(mut self, vel: Vector2) -> Self {
        self.vel = vel;
        self
    }

    /// Whether the integrator may move this charge
    #[inline]
    pub fn is_free(&self) -> bool {
        !self.is_fixed && !self.is_dragging
    }

    /// Inverse mass for impulses; pinned and dragged charges are immovable
    #[inline]
    pub fn inv_mass(&self) -> f32 {
        if self.is_free() { 1.0 / self.mass } else { 0.0 }
    }

    /// Record current position, dropping the oldest sample past the cap
    pub fn record_trail(&mut self) {
        self.trail.push_back(self.pos);
        while self.trail.len() > TRAIL_LENGTH {
            self.trail.pop_front();
        }
    }

    pub fn clear_trail(&mut self) {
        self.trail.clear();
    }

    /// Keep the disc inside `[0, width] x [0, height]`
    pub fn clamp_to(&mut self, width: f32, height: f32) {
        self.pos = Vector2::new(
            self.pos.x.clamp(self.radius, (width - self.radius).max(self.radius)),
            self.pos.y.clamp(self.radius, (height - self.radius).max(self.radius)),
        );
    }
}

/// Partial property update from the host inspector.
///
/// Invalid values (non-finite, or non-positive mass/radius) are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChargePatch {
    pub q: Option<f32>,
    pub mass: Option<f32>,
    pub radius: Option<f32>,
    pub is_fixed: Option<bool>,
    pub pos_x: Option<f32>,
    pub pos_y: Option<f32>,
    pub vel_x: Option<f32>,
    pub vel_y: Option<f32>,
}

impl ChargePatch {
    pub fn apply(&self, charge: &mut Charge) {
        if let Some(q) = self.q.filter(|q| q.is_finite()) {
            charge.q = q;
        }
        match self.mass {
            Some(m) if m.is_finite() && m > 0.0 => charge.mass = m,
            Some(m) => log::debug!("Ignoring mass {} for charge {}", m, charge.id),
            None => {}
        }
        match self.radius {
            Some(r) if r.is_finite() && r > 0.0 => charge.radius = r,
            Some(r) => log::debug!("Ignoring radius {} for charge {}", r, charge.id),
            None => {}
        }
        if let Some(fixed) = self.is_fixed {
            charge.is_fixed = fixed;
            if fixed {
                charge.vel = Vector2::ZERO;
            }
        }
        if let Some(x) = self.pos_x.filter(|v| v.is_finite()) {
            charge.pos = charge.pos.with_x(x);
            charge.clear_trail();
        }
        if let Some(y) = self.pos_y.filter(|v| v.is_finite()) {
            charge.pos = charge.pos.with_y(y);
            charge.clear_trail();
        }
        if let Some(x) = self.vel_x.filter(|v| v.is_finite()) {
            charge.vel = charge.vel.with_x(x);
        }
        if let Some(y) = self.vel_y.filter(|v| v.is_finite()) {
            charge.vel = charge.vel.with_y(y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trail_is_capped_dropping_oldest() {
        let mut c = Charge::new(1, Vector2::ZERO, 1.0, 1.0, 5.0);
        for i in 0..(TRAIL_LENGTH + 10) {
            c.pos = Vector2::new(i as f32, 0.0);
            c.record_trail();
        }
        assert_eq!(c.trail.len(), TRAIL_LENGTH);
        assert_eq!(c.trail.front().unwrap().x, 10.0);
        assert_eq!(c.trail.back().unwrap().x, (TRAIL_LENGTH + 9) as f32);
    }

    #[test]
    fn test_inv_mass() {
        let c = Charge::new(1, Vector2::ZERO, 1.0, 4.0, 5.0);
        assert_eq!(c.inv_mass(), 0.25);
        assert_eq!(c.clone().fixed().inv_mass(), 0.0);
        let mut dragged = c;
        dragged.is_dragging = true;
        assert_eq!(dragged.inv_mass(), 0.0);
    }

    #[test]
    fn test_patch_rejects_invalid_values() {
        let mut c = Charge::new(1, Vector2::new(5.0, 5.0), 10.0, 2.0, 8.0);
        ChargePatch {
            q: Some(-20.0),
            mass: Some(0.0),
            radius: Some(f32::NAN),
            vel_x: Some(3.0),
            ..Default::default()
        }
        .apply(&mut c);
        assert_eq!(c.q, -20.0);
        assert_eq!(c.mass, 2.0);
        assert_eq!(c.radius, 8.0);
        assert_eq!(c.vel, Vector2::new(3.0, 0.0));
    }

    #[test]
    fn test_patch_deserializes_camel_case() {
        let patch: ChargePatch = serde_json::from_str(r#"{"isFixed": true, "posX": 12.5}"#).unwrap();
        assert_eq!(patch.is_fixed, Some(true));
        assert_eq!(patch.pos_x, Some(12.5));
        assert_eq!(patch.q, None);
    }

    #[test]
    fn test_clamp_to_bounds() {
        let mut c = Charge::new(1, Vector2::new(-5.0, 500.0), 1.0, 1.0, 10.0);
        c.clamp_to(100.0, 100.0);
        assert_eq!(c.pos, Vector2::new(10.0, 90.0));
    }
}
