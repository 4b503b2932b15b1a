//! Polarity Lab - an interactive 2D physics sandbox
//!
//! Core modules:
//! - `sim`: Simulation models (electrostatics, wave optics, magnetic platformer)
//! - `platform`: Input hub and frame scheduler shared by every model
//! - `renderer`: Immediate-mode drawing surface abstraction
//! - `settings`: Tunables and preferences

pub mod error;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::SandboxError;
pub use settings::Settings;
pub use sim::{Simulation, SimulationKind, SimulationModel, Vector2};

/// Engine-wide constants
pub mod consts {
    /// Largest delta time handed to `update` (seconds)
    pub const MAX_FRAME_DT: f32 = 0.05;

    /// Maximum stored trail samples per charge
    pub const TRAIL_LENGTH: usize = 200;

    /// Maximum mirror bounces per laser path
    pub const MAX_BOUNCES: usize = 20;
    /// Maximum total laser path length (pixels)
    pub const MAX_RAY_DISTANCE: f32 = 2000.0;

    /// Field line integration limits
    pub const FIELD_LINE_MAX_STEPS: usize = 500;
    pub const FIELD_LINE_STEP: f32 = 10.0;
    /// Most lines seeded from a single charge
    pub const MAX_LINES_PER_CHARGE: usize = 64;

    /// Default RNG seed when none is configured
    pub const DEFAULT_SEED: u64 = 0x5EED_1A85;
}

/// Degrees to radians
#[inline]
pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees * std::f32::consts::PI / 180.0
}

/// Shortest distance from `p` to the segment `a`-`b`.
///
/// A zero-length segment yields `f32::INFINITY` so callers never count a
/// degenerate segment as a hit.
pub fn point_segment_distance(p: Vector2, a: Vector2, b: Vector2) -> f32 {
    let ab = b - a;
    let l2 = ab.mag_sq();
    if l2 == 0.0 {
        return f32::INFINITY;
    }
    let t = ((p - a).dot(ab) / l2).clamp(0.0, 1.0);
    let closest = a + ab * t;
    p.dist(closest)
}
