pub mod simulation;
pub mod configuration;
pub mod benchmark;

pub use simulation::states::{Body, BodyId, BodySnapshot, NVec3};
pub use simulation::error::SimError;
pub use simulation::params::{Parameters, DEFAULT_THETA};
pub use simulation::engine::Simulation;
pub use simulation::forces::{softened_accel, ForceEngine, DirectGravity, BarnesHutGravity};
pub use simulation::barnes_hut::{Octree, OctreeNode, NodeId};
pub use simulation::diagnostics::{DriftMonitor, Drift, EnergyReport};
pub use simulation::scenario::{Scenario, RunSettings};

pub use configuration::config::{EngineKind, EngineConfig, ParametersConfig, BodyConfig, GeneratorConfig, ScenarioConfig};

pub use benchmark::benchmark::{bench_gravity, bench_step, bench_step_curve};
