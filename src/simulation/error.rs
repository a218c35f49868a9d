//! Error types for simulation setup.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    #[error("gravitational constant must be finite and non-negative, got {0}")]
    InvalidGravitationalConstant(f64),

    #[error("softening length must be finite and non-negative, got {0}")]
    InvalidSoftening(f64),

    #[error("opening angle theta must be finite and positive, got {0}")]
    InvalidTheta(f64),

    #[error("time step must be finite and positive, got {0}")]
    InvalidTimeStep(f64),

    #[error("body {field} must have 3 components, got {len}")]
    InvalidVector { field: &'static str, len: usize },
}

pub type Result<T> = std::result::Result<T, SimError>;
