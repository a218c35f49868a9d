//! Build ready-to-run simulations from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a `Scenario`:
//! - a `Simulation` with the configured engine and all bodies registered
//! - the run settings (`dt`, step count, report interval)
//!
//! Also hosts the built-in initial-condition generators.

use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::configuration::config::{BodyConfig, EngineKind, GeneratorConfig, ScenarioConfig};
use crate::simulation::engine::Simulation;
use crate::simulation::error::{Result, SimError};
use crate::simulation::params::{Parameters, DEFAULT_THETA};
use crate::simulation::states::{Body, NVec3};

/// How long and how finely to run a scenario
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSettings {
    pub dt: f64,
    pub steps: usize,
    pub report_every: usize,
}

/// A fully-initialized simulation plus its run settings
pub struct Scenario {
    pub simulation: Simulation,
    pub run: RunSettings,
}

impl Scenario {
    pub fn build(cfg: ScenarioConfig) -> Result<Self> {
        let p_cfg = &cfg.parameters;
        if !p_cfg.dt.is_finite() || p_cfg.dt <= 0.0 {
            return Err(SimError::InvalidTimeStep(p_cfg.dt));
        }

        let params = match cfg.engine.kind {
            EngineKind::Direct => Parameters::direct(p_cfg.g, p_cfg.softening)?,
            EngineKind::BarnesHut => Parameters::barnes_hut(
                p_cfg.g,
                p_cfg.softening,
                cfg.engine.theta.unwrap_or(DEFAULT_THETA),
            )?,
        };

        // Bodies: explicit ones first, then generated
        let mut bodies = cfg
            .bodies
            .iter()
            .map(body_from_config)
            .collect::<Result<Vec<Body>>>()?;

        if let Some(generator) = &cfg.generator {
            bodies.extend(generate(generator, params.g));
        }

        let mut simulation = Simulation::from_parameters(params);
        for b in bodies {
            simulation.add_body(b.position, b.velocity, b.mass);
        }

        Ok(Self {
            simulation,
            run: RunSettings {
                dt: p_cfg.dt,
                steps: p_cfg.steps,
                report_every: p_cfg.report_every,
            },
        })
    }
}

fn body_from_config(bc: &BodyConfig) -> Result<Body> {
    Ok(Body::new(
        vec3("position", &bc.position)?,
        vec3("velocity", &bc.velocity)?,
        bc.mass,
    ))
}

fn vec3(field: &'static str, v: &[f64]) -> Result<NVec3> {
    match v {
        [x, y, z] => Ok(NVec3::new(*x, *y, *z)),
        _ => Err(SimError::InvalidVector { field, len: v.len() }),
    }
}

/// Bodies for a generator config; `g` is the run's gravitational constant
pub fn generate(generator: &GeneratorConfig, g: f64) -> Vec<Body> {
    match *generator {
        GeneratorConfig::Kepler => kepler_pair(),
        GeneratorConfig::SolarSystem { seed } => solar_system(g, seed),
        GeneratorConfig::Cluster { n, radius, mass, seed } => random_cluster(n, radius, mass, seed),
    }
}

// =========================================================================================
// generators
// =========================================================================================

pub const SUN_MASS: f64 = 1.989e30; // kg
pub const EARTH_MASS: f64 = 5.972e24; // kg
pub const EARTH_ORBIT: f64 = 1.496e11; // m
pub const EARTH_SPEED: f64 = 29780.0; // m/s
pub const G_SI: f64 = 6.674e-11;

/// Sun at the origin at rest, Earth at 1 AU moving along +y (SI units)
pub fn kepler_pair() -> Vec<Body> {
    vec![
        Body::new(NVec3::zeros(), NVec3::zeros(), SUN_MASS),
        Body::new(
            NVec3::new(EARTH_ORBIT, 0.0, 0.0),
            NVec3::new(0.0, EARTH_SPEED, 0.0),
            EARTH_MASS,
        ),
    ]
}

const STAR_MASS: f64 = 1000.0;
const PLANET_RADII: [f64; 5] = [60.0, 100.0, 150.0, 200.0, 280.0];
const PLANET_MASSES: [f64; 5] = [0.1, 0.5, 1.0, 0.8, 0.3];

/// Toy planetary system in the plane z = 0.
///
/// A star of mass 1000 at the origin and five planets, each on a
/// tangential orbit at half the circular speed sqrt(G M / r), with a
/// random phase drawn from `seed`.
pub fn solar_system(g: f64, seed: u64) -> Vec<Body> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut bodies = vec![Body::new(NVec3::zeros(), NVec3::zeros(), STAR_MASS)];

    for (&r, &m) in PLANET_RADII.iter().zip(PLANET_MASSES.iter()) {
        let angle: f64 = rng.gen_range(0.0..TAU);
        let (sin, cos) = angle.sin_cos();
        let v = (g * STAR_MASS / r).sqrt() * 0.5;

        bodies.push(Body::new(
            NVec3::new(r * cos, r * sin, 0.0),
            NVec3::new(-v * sin, v * cos, 0.0),
            m,
        ));
    }

    bodies
}

/// `n` bodies of equal `mass`, uniform inside a sphere of `radius`, at rest
pub fn random_cluster(n: usize, radius: f64, mass: f64, seed: u64) -> Vec<Body> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut bodies = Vec::with_capacity(n);

    while bodies.len() < n {
        // rejection sample the unit ball
        let p = NVec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        if p.norm_squared() <= 1.0 {
            bodies.push(Body::new(p * radius, NVec3::zeros(), mass));
        }
    }

    bodies
}
