//! Timing harness comparing the direct and Barnes–Hut engines.
//!
//! Output goes to stdout; `bench_step_curve` prints CSV for plotting.

use std::time::Instant;

use crate::simulation::forces::{BarnesHutGravity, DirectGravity, ForceEngine};
use crate::simulation::integrator::leapfrog_step;
use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, NVec3};

const BENCH_G: f64 = 0.1;
const BENCH_SOFTENING: f64 = 1e-2;
const BENCH_THETA: f64 = 0.7;
const BENCH_DT: f64 = 0.001;

/// Deterministic body set of size `n`, no rng needed
fn make_bodies(n: usize) -> Vec<Body> {
    (0..n)
        .map(|i| {
            let i_f = i as f64;
            let x = NVec3::new(
                (i_f * 0.37).sin() * 5.0,
                (i_f * 0.13).cos() * 5.0,
                (i_f * 0.07).sin() * 5.0,
            );
            Body::new(x, NVec3::zeros(), 1.0)
        })
        .collect()
}

fn make_engines() -> (DirectGravity, BarnesHutGravity) {
    // constants above are valid by construction
    let direct = Parameters { g: BENCH_G, softening: BENCH_SOFTENING, theta: None };
    let bh = Parameters { theta: Some(BENCH_THETA), ..direct };
    (DirectGravity::new(&direct), BarnesHutGravity::new(&bh))
}

/// Seconds per call of `f`, averaged over `reps` calls after one warm-up
fn time_per_call(reps: usize, mut f: impl FnMut()) -> f64 {
    f();
    let t0 = Instant::now();
    for _ in 0..reps {
        f();
    }
    t0.elapsed().as_secs_f64() / reps.max(1) as f64
}

/// Time one force computation per engine for each `n`
pub fn bench_gravity(ns: &[usize]) {
    for &n in ns {
        let (mut direct, mut bh) = make_engines();
        let mut bodies = make_bodies(n);

        let dt_direct = time_per_call(1, || direct.compute_accelerations(&mut bodies));
        let dt_bh = time_per_call(1, || bh.compute_accelerations(&mut bodies));

        println!("N = {n:6}, direct = {:8.6} s, BH = {:8.6} s", dt_direct, dt_bh);
    }
}

/// Time full leapfrog steps per engine for each `n`
pub fn bench_step(ns: &[usize], steps: usize) {
    for &n in ns {
        let (mut direct, mut bh) = make_engines();

        let mut sys_direct = make_bodies(n);
        direct.compute_accelerations(&mut sys_direct);
        let direct_per_step = time_per_call(steps, || leapfrog_step(&mut sys_direct, &mut direct, BENCH_DT));

        let mut sys_bh = make_bodies(n);
        bh.compute_accelerations(&mut sys_bh);
        let bh_per_step = time_per_call(steps, || leapfrog_step(&mut sys_bh, &mut bh, BENCH_DT));

        println!("N = {:6}, direct step = {:8.6} s,   BH step = {:8.6} s", n, direct_per_step, bh_per_step);
    }
}

/// Per-step cost in ms for n = 200..=max_n, as CSV
pub fn bench_step_curve(max_n: usize) {
    println!("N,direct_ms,bh_ms");

    for n in (200..=max_n).step_by(200) {
        // average small n over a few steps, large n only once
        let steps_direct = if n <= 800 { 5 } else { 1 };
        let steps_bh = if n <= 2000 { 3 } else { 1 };

        let (mut direct, mut bh) = make_engines();

        let mut sys_direct = make_bodies(n);
        direct.compute_accelerations(&mut sys_direct);
        let ms_direct = 1000.0 * time_per_call(steps_direct, || leapfrog_step(&mut sys_direct, &mut direct, BENCH_DT));

        let mut sys_bh = make_bodies(n);
        bh.compute_accelerations(&mut sys_bh);
        let ms_bh = 1000.0 * time_per_call(steps_bh, || leapfrog_step(&mut sys_bh, &mut bh, BENCH_DT));

        println!("{},{:.6},{:.6}", n, ms_direct, ms_bh);
    }
}
