//! Gravitational force engines for the n-body core
//!
//! - [`softened_accel`]: the pairwise softened Newtonian kernel
//! - [`ForceEngine`]: anything that refreshes every body's acceleration
//! - [`DirectGravity`]: exact O(n^2) pair summation
//! - [`BarnesHutGravity`]: O(n log n) octree approximation

use crate::simulation::barnes_hut::Octree;
use crate::simulation::params::{Parameters, DEFAULT_THETA};
use crate::simulation::states::{Body, NVec3};

/// Acceleration exerted by a point mass `mass` displaced by `d` from the
/// point being accelerated:
///
/// ```text
/// r2 = |d|^2 + eps^2
/// a  = G * mass / (r2 * sqrt(r2)) * d
/// ```
///
/// `eps2` is added before the square root, so the denominator is strictly
/// positive whenever `eps2 > 0`, even for coincident points.
#[inline]
pub fn softened_accel(d: NVec3, mass: f64, g: f64, eps2: f64) -> NVec3 {
    let r2 = d.norm_squared() + eps2;
    let r = r2.sqrt();
    d * (g * mass / (r2 * r))
}

/// A source of gravitational acceleration for the whole body set.
///
/// Implementations overwrite `acceleration` on every body: it is reset to
/// zero and fully accumulated before the call returns. Nothing else on the
/// bodies is touched.
pub trait ForceEngine {
    /// Short name used in reports
    fn name(&self) -> &'static str;

    fn compute_accelerations(&mut self, bodies: &mut [Body]);
}

/// 3D Newtonian gravity with softening (direct n^2 sum)
#[derive(Debug, Clone)]
pub struct DirectGravity {
    pub g: f64,
    pub eps2: f64,
}

impl DirectGravity {
    pub fn new(params: &Parameters) -> Self {
        Self {
            g: params.g,
            eps2: params.eps2(),
        }
    }
}

impl ForceEngine for DirectGravity {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn compute_accelerations(&mut self, bodies: &mut [Body]) {
        for b in bodies.iter_mut() {
            b.acceleration = NVec3::zeros();
        }

        let n = bodies.len();

        // Each unordered pair (i, j) with i < j, applied to both sides
        for i in 0..n {
            let xi = bodies[i].position;
            let mi = bodies[i].mass;

            for j in (i + 1)..n {
                let xj = bodies[j].position;
                let mj = bodies[j].mass;

                // d points from i to j: i is pulled along +d, j along -d
                let d = xj - xi;
                let r2 = d.norm_squared() + self.eps2;
                let r = r2.sqrt();
                let coef = self.g / (r2 * r);

                // massless tracers feel force but exert none
                if mj != 0.0 {
                    bodies[i].acceleration += d * (coef * mj);
                }
                if mi != 0.0 {
                    bodies[j].acceleration -= d * (coef * mi);
                }
            }
        }
    }
}

/// 3D Newtonian gravity evaluated via a Barnes–Hut octree.
///
/// The octree is owned here and rebuilt in place every call, so its arena
/// allocation is reused from step to step.
#[derive(Debug, Clone)]
pub struct BarnesHutGravity {
    pub g: f64,
    pub eps2: f64,
    pub theta: f64,
    tree: Octree,
}

impl BarnesHutGravity {
    pub fn new(params: &Parameters) -> Self {
        Self {
            g: params.g,
            eps2: params.eps2(),
            theta: params.theta.unwrap_or(DEFAULT_THETA),
            tree: Octree::new(),
        }
    }

    /// The tree built by the most recent force computation
    pub fn tree(&self) -> &Octree {
        &self.tree
    }
}

impl ForceEngine for BarnesHutGravity {
    fn name(&self) -> &'static str {
        "barnes-hut"
    }

    fn compute_accelerations(&mut self, bodies: &mut [Body]) {
        self.tree.build(bodies);
        for (i, b) in bodies.iter_mut().enumerate() {
            b.acceleration = self.tree.acceleration_on(i, self.g, self.eps2, self.theta);
        }
    }
}

/// Engine matching `params`: Barnes–Hut when a theta is set, direct otherwise
pub fn engine_for(params: &Parameters) -> Box<dyn ForceEngine + Send + Sync> {
    match params.theta {
        Some(_) => Box::new(BarnesHutGravity::new(params)),
        None => Box::new(DirectGravity::new(params)),
    }
}
