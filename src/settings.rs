//! Sandbox settings and tunables
//!
//! Preferences are persisted in LocalStorage on the web. Simulation state is
//! never persisted; only these settings are.

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_SEED;
use crate::error::SandboxResult;
use crate::sim::optics::maze::MIN_SPLIT_REGION;

/// Most stencil sub-steps per update
const MAX_SUBSTEPS: usize = 32;

/// Electrostatics tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectrostaticsConfig {
    /// Coulomb constant used for forces between charges
    pub physics_k: f32,
    /// Coulomb constant used for field visualization
    pub visual_k: f32,
    /// Per-pair force magnitude cap
    pub max_force: f32,
    /// Velocity kept per step (ambient friction)
    pub damping: f32,
    /// Velocity kept (sign-flipped) off canvas edges
    pub wall_restitution: f32,
    /// Restitution for charge-charge impacts
    pub collision_restitution: f32,
    /// Vector field sampling cell size
    pub field_cell_size: f32,
    pub default_radius: f32,
    pub default_mass: f32,
}

impl Default for ElectrostaticsConfig {
    fn default() -> Self {
        Self {
            physics_k: 5000.0,
            visual_k: 20000.0,
            max_force: 5000.0,
            damping: 0.95,
            wall_restitution: 0.8,
            collision_restitution: 0.8,
            field_cell_size: 30.0,
            default_radius: 20.0,
            default_mass: 1.0,
        }
    }
}

/// Wave optics tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpticsConfig {
    /// Pixels per grid cell
    pub scale: f32,
    /// Hit radius around the target (pixels)
    pub target_radius: f32,
    /// Mirror length in grid cells
    pub mirror_length: f32,
    /// Border band as a fraction of each grid dimension
    pub margin_fraction: f32,
    /// Maze wall thickness in cells
    pub wall_thickness: usize,
    /// Maze gap width in cells
    pub gap_size: usize,
    /// Regions smaller than this (cells) are not split further
    pub min_region: usize,
    /// Stencil source angular frequency (radians per sub-step)
    pub frequency: f32,
    /// Stencil sub-steps per update
    pub substeps: usize,
}

impl Default for OpticsConfig {
    fn default() -> Self {
        Self {
            scale: 2.0,
            target_radius: 15.0,
            mirror_length: 15.0,
            margin_fraction: 0.25,
            wall_thickness: 5,
            gap_size: 30,
            min_region: 100,
            frequency: 0.2,
            substeps: 2,
        }
    }
}

impl OpticsConfig {
    /// Clamp values that would leave the grid or the maze degenerate.
    ///
    /// Non-finite numbers fall back to the defaults.
    pub fn validated(self) -> Self {
        let defaults = Self::default();
        let positive = |v: f32, fallback: f32| if v.is_finite() && v > 0.0 { v } else { fallback };
        let fixed = Self {
            scale: positive(self.scale, defaults.scale).max(1.0),
            target_radius: positive(self.target_radius, defaults.target_radius),
            mirror_length: positive(self.mirror_length, defaults.mirror_length),
            margin_fraction: if self.margin_fraction.is_finite() {
                self.margin_fraction.clamp(0.0, 0.45)
            } else {
                defaults.margin_fraction
            },
            wall_thickness: self.wall_thickness.max(1),
            gap_size: self.gap_size.max(1),
            min_region: self.min_region.max(MIN_SPLIT_REGION),
            frequency: if self.frequency.is_finite() {
                self.frequency
            } else {
                defaults.frequency
            },
            substeps: self.substeps.clamp(1, MAX_SUBSTEPS),
        };
        if fixed != self {
            log::warn!("Optics settings out of range, clamped: {:?}", fixed);
        }
        fixed
    }
}

/// Platformer tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformerConfig {
    pub gravity: f32,
    pub move_force: f32,
    /// Coulomb constant between player and magnets
    pub magnet_k: f32,
    pub max_magnet_force: f32,
    /// Distances below this are clamped when computing magnet force
    pub min_magnet_distance: f32,
    pub jump_speed: f32,
    pub magnet_jump_speed: f32,
    /// Seconds after a magnet jump before sticking is allowed again
    pub jump_cooldown: f32,
    pub damping: f32,
    pub ground_friction: f32,
    pub max_speed: f32,
    pub wall_restitution: f32,
    pub burst_particles: usize,
}

impl Default for PlatformerConfig {
    fn default() -> Self {
        Self {
            gravity: 800.0,
            move_force: 2500.0,
            magnet_k: 60_000_000.0,
            max_magnet_force: 4000.0,
            min_magnet_distance: 25.0,
            jump_speed: 600.0,
            magnet_jump_speed: 1200.0,
            jump_cooldown: 0.2,
            damping: 0.98,
            ground_friction: 0.85,
            max_speed: 1000.0,
            wall_restitution: 0.5,
            burst_particles: 50,
        }
    }
}

/// Sandbox settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seed for mazes, random scenarios and particle bursts
    pub seed: u64,

    // === Presentation ===
    /// Draw control hints
    pub hints: bool,
    /// Glow (shadow blur) on charges, laser and player
    pub glow: bool,
    /// Reduced motion (no goal pulse, no glow)
    pub reduced_motion: bool,

    // === Models ===
    pub electrostatics: ElectrostaticsConfig,
    pub optics: OpticsConfig,
    pub platformer: PlatformerConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            hints: true,
            glow: true,
            reduced_motion: false,
            electrostatics: ElectrostaticsConfig::default(),
            optics: OpticsConfig::default(),
            platformer: PlatformerConfig::default(),
        }
    }
}

impl Settings {
    /// Default settings with a specific seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Effective glow (respects reduced_motion)
    pub fn effective_glow(&self) -> bool {
        self.glow && !self.reduced_motion
    }

    /// Parse settings; missing fields fall back to defaults and
    /// out-of-range tunables are clamped
    pub fn from_json(json: &str) -> SandboxResult<Self> {
        let settings: Self = serde_json::from_str(json)?;
        Ok(settings.validated())
    }

    pub fn validated(mut self) -> Self {
        self.optics = self.optics.validated();
        self
    }

    pub fn to_json(&self) -> SandboxResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "polarity_lab_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = self.to_json() {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SandboxError;

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = Settings::from_json(r#"{"seed": 7, "optics": {"scale": 4.0}}"#).unwrap();
        assert_eq!(settings.seed, 7);
        assert_eq!(settings.optics.scale, 4.0);
        assert_eq!(settings.optics.target_radius, 15.0);
        assert_eq!(settings.electrostatics, ElectrostaticsConfig::default());
    }

    #[test]
    fn test_json_round_trip() {
        let settings = Settings::with_seed(42);
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let err = Settings::from_json("{not json").unwrap_err();
        assert!(matches!(err, SandboxError::Settings(_)));
    }

    #[test]
    fn test_degenerate_optics_values_are_clamped() {
        let settings =
            Settings::from_json(r#"{"optics": {"scale": 0.0, "min_region": 0, "substeps": 0, "margin_fraction": 3.0}}"#)
                .unwrap();
        assert_eq!(settings.optics.scale, 1.0);
        assert_eq!(settings.optics.min_region, MIN_SPLIT_REGION);
        assert_eq!(settings.optics.substeps, 1);
        assert_eq!(settings.optics.margin_fraction, 0.45);

        // In-range values pass through untouched
        assert_eq!(OpticsConfig::default().validated(), OpticsConfig::default());
    }

    #[test]
    fn test_reduced_motion_disables_glow() {
        let mut settings = Settings::default();
        assert!(settings.effective_glow());
        settings.reduced_motion = true;
        assert!(!settings.effective_glow());
    }
}
