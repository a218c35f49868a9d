//! Core state types for the N-body simulation.
//!
//! - `Body`         a point mass with position, velocity and an acceleration slot
//! - `BodyId`       stable handle returned when a body is registered
//! - `BodySnapshot` read-only position/velocity pair handed to renderers
//!
//! All vectors are `NVec3` (nalgebra `Vector3<f64>`).

use nalgebra::Vector3;
pub type NVec3 = Vector3<f64>;

/// Handle to a body inside a `Simulation`; the index into its body list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyId(pub usize);

impl BodyId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A single point mass.
///
/// `acceleration` is only meaningful right after a force computation. Once
/// positions drift it is stale until the next force pass refreshes it.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub position: NVec3,
    pub velocity: NVec3,
    pub acceleration: NVec3,
    pub mass: f64, // fixed for the lifetime of the body
}

impl Body {
    pub fn new(position: NVec3, velocity: NVec3, mass: f64) -> Self {
        Self {
            position,
            velocity,
            acceleration: NVec3::zeros(),
            mass,
        }
    }

    /// Linear momentum m * v
    pub fn momentum(&self) -> NVec3 {
        self.velocity * self.mass
    }

    /// 0.5 * m * |v|^2
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.norm_squared()
    }

    pub fn snapshot(&self) -> BodySnapshot {
        BodySnapshot {
            position: self.position,
            velocity: self.velocity,
        }
    }
}

/// Position and velocity of one body, as consumed by a rendering layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySnapshot {
    pub position: NVec3,
    pub velocity: NVec3,
}
