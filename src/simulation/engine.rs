//! The `Simulation` aggregate root
//!
//! Owns the bodies, the physical parameters and the selected force engine,
//! and advances them with kick-drift-kick leapfrog steps.

use log::info;

use crate::simulation::diagnostics::{self, EnergyReport};
use crate::simulation::error::Result;
use crate::simulation::forces::{engine_for, ForceEngine};
use crate::simulation::integrator::leapfrog_step;
use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, BodyId, BodySnapshot, NVec3};

/// A gravitational N-body simulation.
///
/// Not meant to be shared across threads while stepping: one owner calls
/// `step`/`run` and reads the bodies between calls.
pub struct Simulation {
    params: Parameters,
    bodies: Vec<Body>,
    forces: Box<dyn ForceEngine + Send + Sync>,
    accels_current: bool, // false after add_body until the next force pass
    time: f64,
    steps: u64,
}

impl Simulation {
    /// Direct-summation simulation with constant `g` and softening length `softening`
    pub fn new(g: f64, softening: f64) -> Result<Self> {
        Ok(Self::from_parameters(Parameters::direct(g, softening)?))
    }

    /// Barnes–Hut simulation with opening angle `theta`
    pub fn with_barnes_hut(g: f64, softening: f64, theta: f64) -> Result<Self> {
        Ok(Self::from_parameters(Parameters::barnes_hut(g, softening, theta)?))
    }

    /// Build from already validated parameters
    pub fn from_parameters(params: Parameters) -> Self {
        Self::with_engine(params, engine_for(&params))
    }

    /// Build around a caller-supplied force engine
    pub fn with_engine(params: Parameters, forces: Box<dyn ForceEngine + Send + Sync>) -> Self {
        Self {
            params,
            bodies: Vec::new(),
            forces,
            accels_current: false,
            time: 0.0,
            steps: 0,
        }
    }

    /// Register a body and return its handle
    pub fn add_body(&mut self, position: NVec3, velocity: NVec3, mass: f64) -> BodyId {
        let id = BodyId(self.bodies.len());
        self.bodies.push(Body::new(position, velocity, mass));
        self.accels_current = false;
        id
    }

    /// Refresh every body's acceleration without advancing time
    pub fn compute_accelerations(&mut self) {
        self.forces.compute_accelerations(&mut self.bodies);
        self.accels_current = true;
    }

    /// Advance by one kick-drift-kick step.
    ///
    /// If bodies were added since the last force pass, accelerations are
    /// computed first so the opening half-kick uses current values.
    pub fn step(&mut self, dt: f64) {
        if !self.accels_current {
            self.compute_accelerations();
        }
        leapfrog_step(&mut self.bodies, self.forces.as_mut(), dt);
        self.time += dt;
        self.steps += 1;
    }

    /// One initial force computation followed by `steps` calls to [`step`](Self::step)
    pub fn run(&mut self, dt: f64, steps: usize) {
        info!(
            "run: {} bodies, engine {}, dt = {}, steps = {}",
            self.bodies.len(),
            self.forces.name(),
            dt,
            steps
        );
        self.compute_accelerations();
        for _ in 0..steps {
            self.step(dt);
        }
        info!("run: finished at t = {}", self.time);
    }

    // read-only access ======================================================================

    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    pub fn engine_name(&self) -> &'static str {
        self.forces.name()
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Position/velocity of every body, in registration order
    pub fn snapshot(&self) -> impl Iterator<Item = BodySnapshot> + '_ {
        self.bodies.iter().map(Body::snapshot)
    }

    /// Simulated time elapsed through `step`
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn steps_taken(&self) -> u64 {
        self.steps
    }

    // diagnostics ===========================================================================

    pub fn kinetic_energy(&self) -> f64 {
        diagnostics::kinetic_energy(&self.bodies)
    }

    pub fn potential_energy(&self) -> f64 {
        diagnostics::potential_energy(&self.bodies, self.params.g, self.params.softening)
    }

    pub fn total_energy(&self) -> f64 {
        self.kinetic_energy() + self.potential_energy()
    }

    pub fn energy(&self) -> EnergyReport {
        EnergyReport::measure(&self.bodies, self.params.g, self.params.softening)
    }

    pub fn momentum(&self) -> NVec3 {
        diagnostics::total_momentum(&self.bodies)
    }

    pub fn angular_momentum(&self) -> NVec3 {
        diagnostics::angular_momentum(&self.bodies)
    }

    pub fn center_of_mass(&self) -> Option<NVec3> {
        diagnostics::center_of_mass(&self.bodies)
    }
}
