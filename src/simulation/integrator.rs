//! Fixed-step leapfrog integration for the N-body system
//!
//! Kick-drift-kick form, driven by any [`ForceEngine`]. Accelerations are
//! carried on the bodies between steps, so each step costs one force
//! evaluation.

use super::forces::ForceEngine;
use super::states::Body;

/// Kick: v += dt_kick * a
pub fn kick(bodies: &mut [Body], dt_kick: f64) {
    for b in bodies.iter_mut() {
        b.velocity += b.acceleration * dt_kick;
    }
}

/// Drift: x += dt * v
pub fn drift(bodies: &mut [Body], dt: f64) {
    for b in bodies.iter_mut() {
        b.position += b.velocity * dt;
    }
}

/// Advance the bodies by one kick-drift-kick step of size `dt`.
///
/// Expects `acceleration` on every body to be current for the present
/// positions; on return it is current again for the new positions.
pub fn leapfrog_step(bodies: &mut [Body], forces: &mut dyn ForceEngine, dt: f64) {
    if bodies.is_empty() {
        return;
    }
    let half_dt = 0.5 * dt;

    // v_n+1/2 = v_n + (dt/2) a_n
    kick(bodies, half_dt);

    // x_n+1 = x_n + dt v_n+1/2
    drift(bodies, dt);

    // a_n+1 from x_n+1
    forces.compute_accelerations(bodies);

    // v_n+1 = v_n+1/2 + (dt/2) a_n+1
    kick(bodies, half_dt);
}
