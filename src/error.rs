//! Host-facing error type
//!
//! The simulation core itself never fails; these errors only surface when the
//! host hands the engine a string it cannot parse.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("unknown visualization mode: {0}")]
    UnknownVisualization(String),

    #[error("unknown simulation: {0}")]
    UnknownSimulation(String),

    #[error("unknown material: {0}")]
    UnknownMaterial(String),

    #[error("unknown propagation mode: {0}")]
    UnknownPropagation(String),

    #[error("invalid settings: {0}")]
    Settings(#[from] serde_json::Error),
}

pub type SandboxResult<T> = Result<T, SandboxError>;
