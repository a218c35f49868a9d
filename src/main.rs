use gravsim::{bench_gravity, bench_step, bench_step_curve};
use gravsim::{DriftMonitor, Scenario, ScenarioConfig, Simulation};

use anyhow::{Context, Result};
use clap::Parser;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    /// Scenario file; looked up under scenarios/ if not found as given
    #[arg(short, long, default_value = "kepler.yaml")]
    file_name: String,

    /// Print a final position/velocity line per body
    #[arg(long)]
    snapshot: bool,

    /// Run the engine benchmarks instead of a scenario
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let mut config_path = PathBuf::from(file_name);
    if !config_path.exists() {
        config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name);
    }

    let file = File::open(&config_path)
        .with_context(|| format!("failed to open scenario {}", config_path.display()))?;
    let reader = BufReader::new(file);
    let scenario_cfg = ScenarioConfig::from_reader(reader)
        .with_context(|| format!("failed to parse scenario {}", config_path.display()))?;

    Ok(scenario_cfg)
}

fn report(sim: &Simulation, monitor: &DriftMonitor) {
    let energy = sim.energy();
    let drift = monitor.check(sim.bodies());
    println!(
        "step {:6}  t = {:.6e}  KE = {:.6e}  PE = {:.6e}  E = {:.6e}  dE/E = {:.3e}  |dP| = {:.3e}",
        sim.steps_taken(),
        sim.time(),
        energy.kinetic,
        energy.potential,
        energy.total,
        drift.energy_error,
        drift.momentum_error.norm(),
    );
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.bench {
        bench_gravity(&[200, 400, 800, 1600, 3200, 6400]);
        bench_step(&[200, 400, 800, 1600, 3200], 2);
        bench_step_curve(3200);
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let Scenario { mut simulation, run } = Scenario::build(scenario_cfg)?;

    println!(
        "{} bodies, engine = {}, dt = {}, steps = {}",
        simulation.len(),
        simulation.engine_name(),
        run.dt,
        run.steps
    );

    let params = *simulation.parameters();
    let monitor = DriftMonitor::new(simulation.bodies(), params.g, params.softening);

    simulation.compute_accelerations();
    report(&simulation, &monitor);

    for s in 1..=run.steps {
        simulation.step(run.dt);
        if run.report_every > 0 && s % run.report_every == 0 && s != run.steps {
            report(&simulation, &monitor);
        }
    }
    report(&simulation, &monitor);

    if args.snapshot {
        for (i, b) in simulation.snapshot().enumerate() {
            println!(
                "{i},{},{},{},{},{},{}",
                b.position.x, b.position.y, b.position.z, b.velocity.x, b.velocity.y, b.velocity.z
            );
        }
    }

    Ok(())
}
