//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – force engine selection (direct or Barnes–Hut) and theta
//! - [`ParametersConfig`] – physical constants and run length
//! - [`BodyConfig`]       – explicit initial state for individual bodies
//! - [`GeneratorConfig`]  – optional built-in initial conditions
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! A Sun–Earth scenario matching these types:
//!
//! ```yaml
//! engine:
//!   kind: direct            # or "barnes_hut"
//!   theta: 0.5              # only read by barnes_hut
//!
//! parameters:
//!   G: 6.674e-11            # gravitational constant
//!   softening: 0.0          # softening length epsilon
//!   dt: 86400.0             # fixed step size
//!   steps: 365              # number of steps
//!   report_every: 30        # print diagnostics every N steps, 0 = only at the end
//!
//! bodies:
//!   - position: [0.0, 0.0, 0.0]
//!     velocity: [0.0, 0.0, 0.0]
//!     mass: 1.989e30
//!   - position: [1.496e11, 0.0, 0.0]
//!     velocity: [0.0, 29780.0, 0.0]
//!     mass: 5.972e24
//! ```
//!
//! Generated bodies (`generator:`) are appended after the explicit ones.

use serde::Deserialize;

/// Which force engine the simulation uses
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    #[serde(rename = "direct")] // exact all-pairs summation, O(n^2)
    Direct,

    #[serde(rename = "barnes_hut")] // octree approximation, O(n log n), accuracy set by theta
    BarnesHut,
}

/// Force engine configuration
#[derive(Deserialize, Debug, Clone)]
pub struct EngineConfig {
    pub kind: EngineKind,
    pub theta: Option<f64>, // opening angle, defaults to 0.5 for barnes_hut
}

/// Physical constants and run settings
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    #[serde(rename = "G")]
    pub g: f64, // gravitational constant
    #[serde(default)]
    pub softening: f64, // softening length, prevents singular forces at small separations
    pub dt: f64, // time step size
    pub steps: usize, // number of steps to run
    #[serde(default)]
    pub report_every: usize, // 0 = report only at the end
}

/// A single body's initial state
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub position: Vec<f64>,
    #[serde(default = "zero_vec")]
    pub velocity: Vec<f64>,
    pub mass: f64,
}

fn zero_vec() -> Vec<f64> {
    vec![0.0; 3]
}

fn default_seed() -> u64 {
    42
}

/// Built-in initial conditions
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeneratorConfig {
    /// Sun at the origin, Earth at 1 AU on a circular-ish orbit (SI units)
    Kepler,

    /// Central mass with five planets on tangential orbits, random phases
    SolarSystem {
        #[serde(default = "default_seed")]
        seed: u64,
    },

    /// `n` bodies of mass `mass` uniformly inside a sphere of `radius`, at rest
    Cluster {
        n: usize,
        radius: f64,
        mass: f64,
        #[serde(default = "default_seed")]
        seed: u64,
    },
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub engine: EngineConfig,
    pub parameters: ParametersConfig,
    #[serde(default)]
    pub bodies: Vec<BodyConfig>,
    #[serde(default)]
    pub generator: Option<GeneratorConfig>,
}

impl ScenarioConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(s)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_reader(reader)
    }
}
