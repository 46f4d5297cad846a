//! # dopri45: Adaptive Dormand-Prince 5(4) Integrator
//!
//! An error-controlled ODE integrator with continuous output, and a
//! zero-dimensional energy-balance climate model built on it.
//!
//! ## Features
//!
//! - 7-stage embedded RK5(4) pair with first-same-as-last reuse
//!   (6 right-hand-side evaluations per step)
//! - Adaptive step-size control against mixed absolute/relative tolerances
//! - Automatic initial step selection
//! - Samples at arbitrary output times through a 4th-order dense
//!   interpolant, or a linear one as a reduced-fidelity mode
//! - Failures return the trajectory computed so far
//! - Cooperative cancellation between steps
//!
//! ## Basic Usage
//!
//! ```rust
//! use dopri45::{linspace, Dopri45, EnergyBalanceModel, Settings};
//!
//! let model = EnergyBalanceModel::default();
//! let times = linspace(0.0, 100.0, 10);
//!
//! let mut solver = Dopri45::new(Settings::default());
//! let solution = solver.integrate(&model, 0.0, 100.0, &[288.0], &times).unwrap();
//!
//! let (t, y) = solution.samples[9];
//! assert_eq!(t, 100.0);
//! assert!(y[0] < 288.0);
//! ```
//!
//! ## Custom Systems
//!
//! Implement [`OdeSystem`] for a type, or pass a closure:
//!
//! ```rust
//! use dopri45::{Dopri45, Settings, Tolerances};
//!
//! let oscillator = |_t: f64, y: &[f64; 2], dydt: &mut [f64; 2]| {
//!     dydt[0] = y[1];
//!     dydt[1] = -y[0];
//! };
//!
//! let mut solver = Dopri45::new(Settings::default());
//! solver.set_tolerances(Tolerances::new(1e-10, 1e-10));
//! let tf = std::f64::consts::PI;
//! let solution = solver.integrate(&oscillator, 0.0, tf, &[1.0, 0.0], &[tf]).unwrap();
//! assert!((solution.samples[0].1[0] + 1.0).abs() < 1e-8);
//! ```
//!
//! ## Failures
//!
//! Every failure after validation carries the partial solution:
//!
//! ```rust
//! use dopri45::{Dopri45, IntegrationError, Settings};
//!
//! let blow_up = |t: f64, _y: &[f64; 1], dydt: &mut [f64; 1]| {
//!     dydt[0] = if t < 0.5 { 1.0 } else { f64::NAN };
//! };
//! let mut solver = Dopri45::new(Settings::default());
//! let failure = solver.integrate(&blow_up, 0.0, 1.0, &[0.0], &[0.25, 1.0]).unwrap_err();
//!
//! assert!(matches!(failure.error, IntegrationError::NumericalFailure { .. }));
//! let partial = failure.partial.unwrap();
//! assert!(partial.final_state().0 < 0.5);
//! ```
//!
//! ## Logging
//!
//! Progress is reported through the [`log`] facade: `debug` at the start
//! and end of each integration, `trace` per step and `warn` on failure.
//! No logger is installed by this crate.
//!
//! ## References
//!
//! 1. Dormand, J.R. & Prince, P.J. (1980). "A family of embedded
//!    Runge-Kutta formulae". J. Comp. Appl. Math. 6(1), 19-26.
//!
//! 2. Hairer, E., Nørsett, S.P., & Wanner, G. (1993). "Solving
//!    Ordinary Differential Equations I: Nonstiff Problems".
//!    Springer.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod climate;
pub mod coefficients;
pub mod dense;
pub mod error;
pub mod samples;
pub mod solver;
pub mod step;
pub mod system;
pub mod tolerance;

pub use climate::{ClimateParams, EnergyBalanceModel};
pub use dense::{DenseSegment, Interpolate, Interpolation, LinearSegment};
pub use error::{Failure, IntegrationError};
pub use samples::linspace;
pub use solver::{Dopri45, Settings, Solution, Stats, StepController, Trajectory};
pub use step::{attempt_step, Step};
pub use system::OdeSystem;
pub use tolerance::Tolerances;
