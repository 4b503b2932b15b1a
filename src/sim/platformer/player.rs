//! Player ball and celebration particles

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::level::Magnet;
use crate::renderer::Color;
use crate::sim::Vector2;

pub const PLAYER_RADIUS: f32 = 15.0;
/// Spawn offset from the bottom-left corner
const SPAWN_X: f32 = 100.0;
const SPAWN_ABOVE_FLOOR: f32 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vector2,
    pub vel: Vector2,
    /// Acceleration applied during the last step
    pub acc: Vector2,
    pub radius: f32,
    /// Polarity, -1 or +1
    pub q: f32,
    pub grounded: bool,
}

impl Player {
    pub fn spawn(height: f32) -> Self {
        Self {
            pos: Vector2::new(SPAWN_X, height - SPAWN_ABOVE_FLOOR),
            vel: Vector2::ZERO,
            acc: Vector2::ZERO,
            radius: PLAYER_RADIUS,
            q: 1.0,
            grounded: false,
        }
    }

    pub fn toggle_polarity(&mut self) {
        self.q = -self.q;
    }

    /// Opposite signs attract
    pub fn is_attracted_to(&self, magnet: &Magnet) -> bool {
        self.q * magnet.q < 0.0
    }

    pub fn overlaps(&self, magnet: &Magnet) -> bool {
        self.pos.dist(magnet.pos) < self.radius + magnet.radius
    }
}

/// Spread of burst velocities (pixels/s)
const BURST_SPEED: f32 = 500.0;
/// Particle square size
pub const PARTICLE_SIZE: f32 = 8.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pos: Vector2,
    pub vel: Vector2,
    /// Seconds left; also used as opacity
    pub life: f32,
    pub color: Color,
}

impl Particle {
    pub fn step(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        self.life -= dt;
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

/// Randomly colored, randomly directed particles at `origin`
pub fn burst(origin: Vector2, count: usize, rng: &mut Pcg32) -> Vec<Particle> {
    (0..count)
        .map(|_| Particle {
            pos: origin,
            vel: Vector2::new(
                (rng.random::<f32>() - 0.5) * BURST_SPEED,
                (rng.random::<f32>() - 0.5) * BURST_SPEED,
            ),
            life: 1.0,
            color: Color::hsl(rng.random::<f32>() * 360.0, 1.0, 0.5),
        })
        .collect()
}
