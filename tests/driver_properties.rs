//! Behavioural properties of the adaptive driver through the public API.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use approx::assert_relative_eq;
use dopri45::{
    linspace, Dopri45, EnergyBalanceModel, IntegrationError, Interpolation, OdeSystem, Settings,
    Solution,
};

/// Logistic growth: y' = r y (1 - y), with closed-form solution
struct Logistic {
    r: f64,
}

impl Logistic {
    fn exact(&self, y0: f64, t: f64) -> f64 {
        y0 / (y0 + (1.0 - y0) * (-self.r * t).exp())
    }
}

impl OdeSystem<1> for Logistic {
    fn rhs(&self, _t: f64, y: &[f64; 1], dydt: &mut [f64; 1]) {
        dydt[0] = self.r * y[0] * (1.0 - y[0]);
    }
}

fn max_sample_error(sys: &Logistic, y0: f64, sol: &Solution<1>) -> f64 {
    sol.samples
        .iter()
        .map(|(t, y)| (y[0] - sys.exact(y0, *t)).abs())
        .fold(0.0, f64::max)
}

#[test]
fn test_samples_in_caller_order() {
    let sys = Logistic { r: 2.0 };
    let times = [3.0, 0.5, 5.0, 0.0, 0.5, 1.75];
    let mut solver = Dopri45::new(Settings::builder().rtol(1e-9).atol(1e-12).build());
    let sol = solver.integrate(&sys, 0.0, 5.0, &[0.1], &times).unwrap();

    assert_eq!(sol.samples.len(), times.len());
    for (&t, &(ts, y)) in times.iter().zip(sol.samples.iter()) {
        assert_eq!(t, ts);
        assert_relative_eq!(y[0], sys.exact(0.1, t), epsilon = 1e-7);
    }
    // Duplicates get identical values
    assert_eq!(sol.samples[1], sol.samples[4]);
}

#[test]
fn test_error_decreases_with_tolerance() {
    let sys = Logistic { r: 3.0 };
    let times = linspace(0.0, 4.0, 33);
    let mut previous = f64::INFINITY;
    for &tol in &[1e-4, 1e-6, 1e-8, 1e-10] {
        let mut solver = Dopri45::new(Settings::builder().rtol(tol).atol(tol).build());
        let sol = solver.integrate(&sys, 0.0, 4.0, &[0.05], &times).unwrap();
        let err = max_sample_error(&sys, 0.05, &sol);
        println!("tol = {:e}: max error = {:e}, steps = {}", tol, err, sol.stats.accepted_steps);
        assert!(err < previous, "tol = {:e}: {:e} >= {:e}", tol, err, previous);
        previous = err;
    }
    assert!(previous < 1e-8);
}

#[test]
fn test_samples_at_accepted_points_are_exact() {
    let sys = Logistic { r: 1.5 };
    for mode in [Interpolation::Dense, Interpolation::Linear] {
        let mut solver = Dopri45::new(Settings::builder().interpolation(mode).build());
        let first = solver.integrate(&sys, 0.0, 6.0, &[0.2], &[6.0]).unwrap();

        // Step selection does not depend on the sample times, so sampling at
        // the accepted points reproduces them bit for bit.
        let times = first.trajectory.times().to_vec();
        let second = solver.integrate(&sys, 0.0, 6.0, &[0.2], &times).unwrap();
        assert_eq!(second.trajectory, first.trajectory);
        for ((t, y), (ts, ys)) in first.trajectory.iter().zip(second.samples.iter()) {
            assert_eq!(t, *ts);
            assert_eq!(y, ys);
        }
    }
}

#[test]
fn test_failure_converts_with_question_mark() {
    fn run() -> Result<Solution<1>, IntegrationError> {
        let mut solver = Dopri45::new(Settings::default());
        let sol = solver.integrate(&EnergyBalanceModel::default(), 10.0, 0.0, &[288.0], &[5.0])?;
        Ok(sol)
    }

    match run() {
        Err(IntegrationError::InvalidConfiguration { message }) => {
            assert!(message.contains("t_start"), "message: {}", message);
        }
        other => panic!("expected InvalidConfiguration, got {:?}", other),
    }
}

#[test]
fn test_error_messages() {
    let err = IntegrationError::StepSizeUnderflow {
        t: 1.5,
        y: vec![0.0],
        h: 1e-20,
    };
    let text = err.to_string();
    assert!(text.contains("1e-20"), "{}", text);
    assert!(text.contains("1.5"), "{}", text);

    let sys = |_t: f64, _y: &[f64; 1], dydt: &mut [f64; 1]| dydt[0] = f64::NAN;
    let mut solver = Dopri45::new(Settings::default());
    let failure = solver.integrate(&sys, 0.0, 1.0, &[1.0], &[1.0]).unwrap_err();
    assert!(failure.to_string().starts_with("non-finite derivative"));
    let source = std::error::Error::source(&failure).map(|e| e.to_string());
    assert_eq!(source, Some(failure.error.to_string()));
}

#[test]
fn test_cancel_from_inside_rhs() {
    let cancel = AtomicBool::new(false);
    let calls = AtomicUsize::new(0);
    let sys = |_t: f64, y: &[f64; 1], dydt: &mut [f64; 1]| {
        if calls.fetch_add(1, Ordering::Relaxed) == 30 {
            cancel.store(true, Ordering::Relaxed);
        }
        dydt[0] = -y[0];
    };

    let mut solver = Dopri45::new(Settings::builder().initial_step(1e-3).build());
    let failure = solver
        .integrate_cancellable(&sys, 0.0, 1e6, &[1.0], &[1e6], &cancel)
        .unwrap_err();

    let partial = failure.partial.unwrap();
    let (t_last, _) = partial.final_state();
    assert_eq!(failure.error, IntegrationError::Cancelled { t: t_last });
    assert!(t_last > 0.0);
    // The attempt in flight finishes; the next one is never started.
    assert_eq!(partial.stats.fn_evals, 1 + 6 * 5);
}

#[test]
fn test_solvers_run_on_separate_threads() {
    let model = EnergyBalanceModel::default();
    let times = linspace(0.0, 50.0, 11);

    let results: Vec<Solution<1>> = std::thread::scope(|scope| {
        let handles: Vec<_> = [280.0, 288.0, 300.0]
            .into_iter()
            .map(|t0| {
                let model = &model;
                let times = &times;
                scope.spawn(move || {
                    let mut solver = Dopri45::new(Settings::default());
                    solver.integrate(model, 0.0, 50.0, &[t0], times).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let mut solver = Dopri45::new(Settings::default());
    let serial = solver.integrate(&model, 0.0, 50.0, &[288.0], &times).unwrap();
    assert_eq!(results[1], serial);
}
