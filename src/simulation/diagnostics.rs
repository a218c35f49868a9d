//! Read-only diagnostics over body state.
//!
//! Energy, momentum and angular momentum of a body set, plus a small
//! monitor that tracks their drift against a baseline. Nothing here depends
//! on which force engine produced the state.

use super::states::{Body, NVec3};

/// Sum of 0.5 * m * |v|^2
pub fn kinetic_energy(bodies: &[Body]) -> f64 {
    bodies.iter().map(Body::kinetic_energy).sum()
}

/// Pairwise potential energy, sum over i < j of -G * m_i * m_j / r.
///
/// Pairs with `r <= softening` are left out, so coincident or overlapping
/// bodies do not contribute a divergent term. The separation is the plain
/// distance, not the softened one.
pub fn potential_energy(bodies: &[Body], g: f64, softening: f64) -> f64 {
    let mut pe = 0.0;
    for (i, bi) in bodies.iter().enumerate() {
        for bj in &bodies[i + 1..] {
            let r = (bj.position - bi.position).norm();
            if r > softening {
                pe -= g * bi.mass * bj.mass / r;
            }
        }
    }
    pe
}

/// Sum of m * v
pub fn total_momentum(bodies: &[Body]) -> NVec3 {
    bodies.iter().fold(NVec3::zeros(), |acc, b| acc + b.momentum())
}

/// Sum of m * (r x v) about the origin
pub fn angular_momentum(bodies: &[Body]) -> NVec3 {
    bodies
        .iter()
        .fold(NVec3::zeros(), |acc, b| acc + b.position.cross(&b.velocity) * b.mass)
}

/// Mass-weighted mean position, `None` when the total mass is zero
pub fn center_of_mass(bodies: &[Body]) -> Option<NVec3> {
    let total: f64 = bodies.iter().map(|b| b.mass).sum();
    if total == 0.0 {
        return None;
    }
    let weighted = bodies.iter().fold(NVec3::zeros(), |acc, b| acc + b.position * b.mass);
    Some(weighted / total)
}

/// Energy split at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyReport {
    pub kinetic: f64,
    pub potential: f64,
    pub total: f64,
}

impl EnergyReport {
    pub fn measure(bodies: &[Body], g: f64, softening: f64) -> Self {
        let kinetic = kinetic_energy(bodies);
        let potential = potential_energy(bodies, g, softening);
        Self {
            kinetic,
            potential,
            total: kinetic + potential,
        }
    }
}

/// Baseline conserved quantities, captured once and compared later.
#[derive(Debug, Clone)]
pub struct DriftMonitor {
    pub baseline_energy: f64,
    pub baseline_momentum: NVec3,
    pub baseline_angular_momentum: NVec3,
    g: f64,
    softening: f64,
}

/// Conservation errors relative to a [`DriftMonitor`] baseline
#[derive(Debug, Clone, Copy)]
pub struct Drift {
    /// |E - E0| / |E0|, or absolute when E0 is ~0
    pub energy_error: f64,
    pub momentum_error: NVec3,
    pub angular_momentum_error: NVec3,
}

impl DriftMonitor {
    pub fn new(bodies: &[Body], g: f64, softening: f64) -> Self {
        Self {
            baseline_energy: EnergyReport::measure(bodies, g, softening).total,
            baseline_momentum: total_momentum(bodies),
            baseline_angular_momentum: angular_momentum(bodies),
            g,
            softening,
        }
    }

    pub fn check(&self, bodies: &[Body]) -> Drift {
        let energy = EnergyReport::measure(bodies, self.g, self.softening).total;

        let energy_error = if self.baseline_energy.abs() > 1e-12 {
            (energy - self.baseline_energy).abs() / self.baseline_energy.abs()
        } else {
            (energy - self.baseline_energy).abs()
        };

        Drift {
            energy_error,
            momentum_error: total_momentum(bodies) - self.baseline_momentum,
            angular_momentum_error: angular_momentum(bodies) - self.baseline_angular_momentum,
        }
    }
}

impl Drift {
    pub fn is_violated(&self, energy_tol: f64, momentum_tol: f64) -> bool {
        self.energy_error > energy_tol || self.momentum_error.norm() > momentum_tol
    }
}
