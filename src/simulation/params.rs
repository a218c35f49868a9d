//! Physical parameters for the simulation
//!
//! `Parameters` holds the run-wide constants:
//! - gravitational constant `g`,
//! - softening length `softening` (epsilon, not squared),
//! - Barnes–Hut opening angle `theta` when the tree engine is selected
//!
//! They are fixed once a `Simulation` is built.

use super::error::{Result, SimError};

/// Opening angle used when a scenario does not specify one
pub const DEFAULT_THETA: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameters {
    pub g: f64, // gravitational constant
    pub softening: f64, // epsilon, added in quadrature to separations
    pub theta: Option<f64>, // Some(_) selects Barnes-Hut
}

impl Parameters {
    /// Parameters for direct summation
    pub fn direct(g: f64, softening: f64) -> Result<Self> {
        let p = Self { g, softening, theta: None };
        p.validate()?;
        Ok(p)
    }

    /// Parameters for the Barnes–Hut engine
    pub fn barnes_hut(g: f64, softening: f64, theta: f64) -> Result<Self> {
        let p = Self { g, softening, theta: Some(theta) };
        p.validate()?;
        Ok(p)
    }

    /// Reject configurations that would make the run meaningless.
    ///
    /// `softening == 0` is accepted, but then exactly coincident bodies
    /// divide by zero; callers that cannot rule that out need `softening > 0`.
    pub fn validate(&self) -> Result<()> {
        if !self.g.is_finite() || self.g < 0.0 {
            return Err(SimError::InvalidGravitationalConstant(self.g));
        }
        if !self.softening.is_finite() || self.softening < 0.0 {
            return Err(SimError::InvalidSoftening(self.softening));
        }
        if let Some(theta) = self.theta {
            if !theta.is_finite() || theta <= 0.0 {
                return Err(SimError::InvalidTheta(theta));
            }
        }
        Ok(())
    }

    /// Squared softening, the form the force kernel consumes
    pub fn eps2(&self) -> f64 {
        self.softening * self.softening
    }
}
