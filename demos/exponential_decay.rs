//! Basic usage: exponential decay against its exact solution.
//!
//! Compares dense and linear sampling between accepted steps.
//!
//! Run with:
//!   cargo run --example exponential_decay

use dopri45::{linspace, Dopri45, Interpolation, OdeSystem, Settings};

/// dy/dt = -k y
struct Decay {
    k: f64,
}

impl OdeSystem<1> for Decay {
    fn rhs(&self, _t: f64, y: &[f64; 1], dydt: &mut [f64; 1]) {
        dydt[0] = -self.k * y[0];
    }
}

fn main() {
    let sys = Decay { k: 0.7 };
    let y0 = 5.0;
    let tf = 10.0;
    let times = linspace(0.0, tf, 101);

    println!("Exponential Decay (k = {})", sys.k);
    for mode in [Interpolation::Dense, Interpolation::Linear] {
        let settings = Settings::builder().rtol(1e-6).atol(1e-9).interpolation(mode).build();
        let mut solver = Dopri45::new(settings);
        let solution = solver.integrate(&sys, 0.0, tf, &[y0], &times).unwrap();

        let max_err = solution
            .samples
            .iter()
            .map(|(t, y)| (y[0] - y0 * (-sys.k * t).exp()).abs())
            .fold(0.0, f64::max);

        println!();
        println!("  {:?} sampling", mode);
        println!("    Max sample error: {:.2e}", max_err);
        println!("    Accepted steps:   {}", solver.stats.accepted_steps);
        println!("    Rejected steps:   {}", solver.stats.rejected_steps);
        println!("    Function evals:   {}", solver.stats.fn_evals);
    }
}
