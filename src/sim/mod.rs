//! Simulation models
//!
//! Every model implements `SimulationModel`; `Simulation` is the tagged
//! variant the host holds so dispatch stays uniform without trait objects.
//! Models own their entities outright. The host reads snapshots and pushes
//! whole replacements through setters, never partial mutations.

pub mod electrostatics;
pub mod events;
pub mod optics;
pub mod platformer;
pub mod rect;
pub mod vector;

pub use electrostatics::{Charge, ChargePatch, ElectrostaticsModel, Scenario, VisualizationMode};
pub use events::{EventQueue, SimEvent};
pub use optics::{Material, Mirror, PropagationMode, WallGrid, WaveOpticsModel};
pub use platformer::{Magnet, PlatformerModel, PlatformerPhase, Player};
pub use rect::Rect;
pub use vector::Vector2;

use std::str::FromStr;

use crate::error::SandboxError;
use crate::platform::RawInput;
use crate::renderer::Surface;
use crate::settings::Settings;

/// Host-facing contract shared by all models
pub trait SimulationModel {
    /// Advance by `dt` seconds
    fn update(&mut self, dt: f32);
    /// Render the current state
    fn draw(&mut self, surface: &mut dyn Surface);
    /// Rebuild size-dependent state
    fn resize(&mut self, width: f32, height: f32);
    /// Terminal: later update/draw/input calls are ignored
    fn destroy(&mut self);
    /// Feed one raw host event
    fn handle_input(&mut self, raw: RawInput);
    /// Take pending notifications
    fn drain_events(&mut self) -> Vec<SimEvent>;
}

/// Which model to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimulationKind {
    #[default]
    Electrostatics,
    WaveOptics,
    Platformer,
}

impl SimulationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimulationKind::Electrostatics => "electrostatics",
            SimulationKind::WaveOptics => "waves",
            SimulationKind::Platformer => "arcade",
        }
    }
}

impl FromStr for SimulationKind {
    type Err = SandboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "electrostatics" | "lab" => Ok(SimulationKind::Electrostatics),
            "waves" | "optics" | "wave" => Ok(SimulationKind::WaveOptics),
            "arcade" | "platformer" | "polarity" => Ok(SimulationKind::Platformer),
            _ => Err(SandboxError::UnknownSimulation(s.to_string())),
        }
    }
}

/// One of the three models
#[derive(Debug)]
pub enum Simulation {
    Electrostatics(ElectrostaticsModel),
    WaveOptics(WaveOpticsModel),
    Platformer(PlatformerModel),
}

impl Simulation {
    pub fn new(kind: SimulationKind, width: f32, height: f32, settings: &Settings) -> Self {
        match kind {
            SimulationKind::Electrostatics => {
                Simulation::Electrostatics(ElectrostaticsModel::with_settings(width, height, settings))
            }
            SimulationKind::WaveOptics => {
                Simulation::WaveOptics(WaveOpticsModel::with_settings(width, height, settings))
            }
            SimulationKind::Platformer => {
                Simulation::Platformer(PlatformerModel::with_settings(width, height, settings))
            }
        }
    }

    pub fn kind(&self) -> SimulationKind {
        match self {
            Simulation::Electrostatics(_) => SimulationKind::Electrostatics,
            Simulation::WaveOptics(_) => SimulationKind::WaveOptics,
            Simulation::Platformer(_) => SimulationKind::Platformer,
        }
    }

    fn model(&mut self) -> &mut dyn SimulationModel {
        match self {
            Simulation::Electrostatics(m) => m,
            Simulation::WaveOptics(m) => m,
            Simulation::Platformer(m) => m,
        }
    }
}

impl SimulationModel for Simulation {
    fn update(&mut self, dt: f32) {
        self.model().update(dt);
    }

    fn draw(&mut self, surface: &mut dyn Surface) {
        self.model().draw(surface);
    }

    fn resize(&mut self, width: f32, height: f32) {
        self.model().resize(width, height);
    }

    fn destroy(&mut self) {
        self.model().destroy();
    }

    fn handle_input(&mut self, raw: RawInput) {
        self.model().handle_input(raw);
    }

    fn drain_events(&mut self) -> Vec<SimEvent> {
        self.model().drain_events()
    }
}
