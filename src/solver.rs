//! Adaptive Dormand-Prince 5(4) driver
//!
//! Repeats step attempts from `t_start` to `t_end`, accepting a step when
//! its scaled error is at most 1, resizing the step with an I-controller,
//! and sampling the solution at the caller's output times through each
//! accepted step's interpolant.

use std::sync::atomic::{AtomicBool, Ordering};

use bon::Builder;
use log::{debug, trace, warn};

use crate::coefficients::{EMBEDDED_ORDER, STAGES};
use crate::dense::Interpolation;
use crate::error::{Failure, IntegrationError};
use crate::samples::SampleSchedule;
use crate::step::attempt_step;
use crate::system::OdeSystem;
use crate::tolerance::{Tolerances, DEFAULT_ATOL, DEFAULT_RTOL};

/// Integration statistics for diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    /// Total number of function evaluations
    pub fn_evals: u64,
    /// Number of accepted steps
    pub accepted_steps: u64,
    /// Number of rejected steps
    pub rejected_steps: u64,
}

/// Solver configuration
///
/// ```
/// use dopri45::{Interpolation, Settings};
///
/// let settings = Settings::builder()
///     .rtol(1e-8)
///     .atol(1e-10)
///     .interpolation(Interpolation::Linear)
///     .build();
/// assert_eq!(settings.max_step_growth, 5.0);
/// assert_eq!(settings.initial_step, None);
/// ```
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct Settings {
    /// Relative tolerance. Default is 1e-3.
    #[builder(default = DEFAULT_RTOL)]
    pub rtol: f64,
    /// Absolute tolerance. Default is 1e-6.
    #[builder(default = DEFAULT_ATOL)]
    pub atol: f64,
    /// Largest factor by which one step may exceed the previous. Default is 5.0.
    #[builder(default = 5.0)]
    pub max_step_growth: f64,
    /// Smallest factor a rejected step is shrunk to. Default is 0.2.
    #[builder(default = 0.2)]
    pub min_step_shrink: f64,
    /// Safety factor in step-size prediction. Default is 0.9.
    #[builder(default = 0.9)]
    pub safety: f64,
    /// Initial step size. None selects one from the problem scales.
    pub initial_step: Option<f64>,
    /// Step size below which a rejected step is fatal.
    /// None uses `10 * EPSILON * max(|t|, 1)`.
    pub min_step: Option<f64>,
    /// Maximal step size. None leaves steps bounded only by the interval.
    pub max_step: Option<f64>,
    /// Maximum number of step attempts. Default is 100,000.
    #[builder(default = 100_000)]
    pub max_steps: u64,
    /// How sample times between accepted points are evaluated.
    #[builder(default)]
    pub interpolation: Interpolation,
}

impl Default for Settings {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Settings {
    fn validate(&self) -> Result<(), IntegrationError> {
        if !self.max_step_growth.is_finite() || self.max_step_growth <= 1.0 {
            return Err(IntegrationError::invalid(format!(
                "max_step_growth must be finite and > 1 (got {})",
                self.max_step_growth
            )));
        }
        if !(self.min_step_shrink > 0.0 && self.min_step_shrink < 1.0) {
            return Err(IntegrationError::invalid(format!(
                "min_step_shrink must be in (0, 1) (got {})",
                self.min_step_shrink
            )));
        }
        if !(self.safety > 0.0 && self.safety <= 1.0) {
            return Err(IntegrationError::invalid(format!(
                "safety must be in (0, 1] (got {})",
                self.safety
            )));
        }
        if let Some(h0) = self.initial_step {
            if !h0.is_finite() || h0 <= 0.0 {
                return Err(IntegrationError::invalid(format!(
                    "initial_step must be positive and finite (got {})",
                    h0
                )));
            }
        }
        if let Some(h_min) = self.min_step {
            if !h_min.is_finite() || h_min <= 0.0 {
                return Err(IntegrationError::invalid(format!(
                    "min_step must be positive and finite (got {})",
                    h_min
                )));
            }
        }
        if let Some(h_max) = self.max_step {
            if h_max.is_nan() || h_max <= 0.0 {
                return Err(IntegrationError::invalid(format!(
                    "max_step must be positive (got {})",
                    h_max
                )));
            }
        }
        if let (Some(h_min), Some(h_max)) = (self.min_step, self.max_step) {
            if h_min > h_max {
                return Err(IntegrationError::invalid(format!(
                    "min_step {} exceeds max_step {}",
                    h_min, h_max
                )));
            }
        }
        if self.max_steps == 0 {
            return Err(IntegrationError::invalid("max_steps must be positive"));
        }
        Ok(())
    }
}

/// Step-size controller using an I-controller
///
/// h_new = safety * h * error^(-1/(q+1))
/// where q = 4 is the order of the embedded error estimate
#[derive(Debug, Clone)]
pub struct StepController {
    /// Safety factor (0.8-0.9 typical)
    pub safety: f64,
    /// Maximum growth factor per step
    pub max_factor: f64,
    /// Minimum reduction factor per step
    pub min_factor: f64,
    /// Exponent = 1/(q + 1)
    exponent: f64,
}

impl Default for StepController {
    fn default() -> Self {
        Self {
            safety: 0.9,
            max_factor: 5.0,
            min_factor: 0.2,
            exponent: 1.0 / (EMBEDDED_ORDER as f64 + 1.0),
        }
    }
}

impl StepController {
    /// Controller with the growth and shrink bounds from `settings`
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            safety: settings.safety,
            max_factor: settings.max_step_growth,
            min_factor: settings.min_step_shrink,
            ..Self::default()
        }
    }

    /// Compute the step size adjustment factor
    pub fn compute_factor(&self, error: f64) -> f64 {
        if error == 0.0 {
            return self.max_factor;
        }

        let factor = self.safety * error.powf(-self.exponent);
        factor.clamp(self.min_factor, self.max_factor)
    }
}

/// Accepted solution points, strictly increasing in time
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory<const N: usize> {
    times: Vec<f64>,
    states: Vec<[f64; N]>,
}

impl<const N: usize> Trajectory<N> {
    fn new(t0: f64, y0: [f64; N]) -> Self {
        Self {
            times: vec![t0],
            states: vec![y0],
        }
    }

    fn push(&mut self, t: f64, y: [f64; N]) {
        debug_assert!(self.times.last().map_or(true, |&last| t > last));
        self.times.push(t);
        self.states.push(y);
    }

    /// Number of stored points, the initial point included
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Always false: the initial point is stored on construction
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Times of the accepted points
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// States at the accepted points
    pub fn states(&self) -> &[[f64; N]] {
        &self.states
    }

    /// Last accepted point
    pub fn last(&self) -> (f64, &[f64; N]) {
        let i = self.times.len() - 1;
        (self.times[i], &self.states[i])
    }

    /// Iterate over `(t, y)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (f64, &[f64; N])> + '_ {
        self.times.iter().copied().zip(self.states.iter())
    }
}

/// Result of a completed integration
#[derive(Debug, Clone, PartialEq)]
pub struct Solution<const N: usize> {
    /// One `(t, y)` per requested sample time, in the caller's order
    pub samples: Vec<(f64, [f64; N])>,
    /// Every accepted point, starting with `(t_start, y0)`
    pub trajectory: Trajectory<N>,
    /// Work done
    pub stats: Stats,
}

impl<const N: usize> Solution<N> {
    /// Sampled values of component `i`, in the caller's order
    pub fn component(&self, i: usize) -> Vec<f64> {
        self.samples.iter().map(|(_, y)| y[i]).collect()
    }

    /// Time and state of the last accepted point
    pub fn final_state(&self) -> (f64, [f64; N]) {
        let (t, y) = self.trajectory.last();
        (t, *y)
    }
}

/// Adaptive Dormand-Prince 5(4) integrator
///
/// # Type Parameters
/// * `N` - Dimension of the state vector
///
/// # Example
/// ```
/// use dopri45::{Dopri45, OdeSystem, Settings};
///
/// struct Decay { k: f64 }
///
/// impl OdeSystem<1> for Decay {
///     fn rhs(&self, _t: f64, y: &[f64; 1], dydt: &mut [f64; 1]) {
///         dydt[0] = -self.k * y[0];
///     }
/// }
///
/// let mut solver = Dopri45::new(Settings::builder().rtol(1e-8).atol(1e-10).build());
/// let sol = solver
///     .integrate(&Decay { k: 0.5 }, 0.0, 4.0, &[2.0], &[1.0, 2.0, 4.0])
///     .unwrap();
/// let exact = 2.0 * (-0.5f64 * 2.0).exp();
/// assert!((sol.samples[1].1[0] - exact).abs() < 1e-7);
/// ```
#[derive(Debug, Clone)]
pub struct Dopri45<const N: usize> {
    /// Tolerance specification
    tol: Tolerances<N>,
    /// Step-size controller
    controller: StepController,
    settings: Settings,
    /// Statistics of the most recent integration
    pub stats: Stats,
}

impl<const N: usize> Default for Dopri45<N> {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl<const N: usize> Dopri45<N> {
    /// Create a solver with uniform tolerances taken from `settings`
    pub fn new(settings: Settings) -> Self {
        Self {
            tol: Tolerances::new(settings.atol, settings.rtol),
            controller: StepController::from_settings(&settings),
            settings,
            stats: Stats::default(),
        }
    }

    /// Replace the tolerances, e.g. with per-component values
    ///
    /// The scalar `rtol`/`atol` in [`settings`](Self::settings) are left as
    /// built and no longer describe the active tolerances; read them back
    /// with [`tolerances`](Self::tolerances).
    pub fn set_tolerances(&mut self, tol: Tolerances<N>) {
        self.tol = tol;
    }

    /// Current tolerances
    pub fn tolerances(&self) -> &Tolerances<N> {
        &self.tol
    }

    /// Settings the solver was built with
    ///
    /// `rtol` and `atol` here are only the construction-time values; after
    /// [`set_tolerances`](Self::set_tolerances) the active ones are in
    /// [`tolerances`](Self::tolerances).
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Integrate from `t_start` to `t_end` and sample at `sample_times`.
    ///
    /// # Arguments
    /// * `sys` - The ODE system to integrate
    /// * `t_start` - Initial time
    /// * `t_end` - Final time, strictly greater than `t_start`
    /// * `y0` - Initial state
    /// * `sample_times` - Output times in `[t_start, t_end]`, any order
    ///
    /// # Returns
    /// * `Ok(Solution)` with one sample per requested time
    /// * `Err(Failure)` with the error and, unless the configuration was
    ///   invalid, the solution up to the last accepted point
    pub fn integrate<S>(
        &mut self,
        sys: &S,
        t_start: f64,
        t_end: f64,
        y0: &[f64; N],
        sample_times: &[f64],
    ) -> Result<Solution<N>, Failure<N>>
    where
        S: OdeSystem<N> + ?Sized,
    {
        self.run(sys, t_start, t_end, y0, sample_times, None)
    }

    /// Like [`integrate`](Self::integrate), checking `cancel` before each
    /// step attempt.
    ///
    /// Raising the flag stops the integration with
    /// [`IntegrationError::Cancelled`] at the last accepted point.
    pub fn integrate_cancellable<S>(
        &mut self,
        sys: &S,
        t_start: f64,
        t_end: f64,
        y0: &[f64; N],
        sample_times: &[f64],
        cancel: &AtomicBool,
    ) -> Result<Solution<N>, Failure<N>>
    where
        S: OdeSystem<N> + ?Sized,
    {
        self.run(sys, t_start, t_end, y0, sample_times, Some(cancel))
    }

    fn run<S>(
        &mut self,
        sys: &S,
        t_start: f64,
        t_end: f64,
        y0: &[f64; N],
        sample_times: &[f64],
        cancel: Option<&AtomicBool>,
    ) -> Result<Solution<N>, Failure<N>>
    where
        S: OdeSystem<N> + ?Sized,
    {
        self.validate_inputs(t_start, t_end, y0)
            .map_err(Failure::config)?;
        let samples =
            SampleSchedule::new(sample_times, t_start, t_end).map_err(Failure::config)?;

        self.stats = Stats::default();
        let mut run = Run {
            samples,
            trajectory: Trajectory::new(t_start, *y0),
        };
        run.samples.record_exact(t_start, y0);

        debug!(
            "integrating {} component(s) over [{}, {}] with {} sample(s)",
            N,
            t_start,
            t_end,
            sample_times.len()
        );

        let mut f0 = [0.0; N];
        sys.rhs(t_start, y0, &mut f0);
        self.stats.fn_evals += 1;
        if !f0.iter().all(|v| v.is_finite()) {
            let error = IntegrationError::NumericalFailure {
                t: t_start,
                y: y0.to_vec(),
            };
            return Err(self.fail(run, error));
        }

        let span = t_end - t_start;
        let h_max = self.settings.max_step.unwrap_or(f64::INFINITY);
        let mut h = match self.settings.initial_step {
            Some(h0) => h0,
            None => match self.initial_step(sys, t_start, y0, &f0) {
                Ok(h0) => h0,
                Err(error) => return Err(self.fail(run, error)),
            },
        };
        h = h.min(h_max).max(self.min_step(t_start)).min(span);
        trace!("initial step h = {:e}", h);

        let mut t = t_start;
        let mut y = *y0;
        let mut previous_rejected = false;
        let mut attempts = 0u64;

        while t < t_end {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                return Err(self.fail(run, IntegrationError::Cancelled { t }));
            }

            attempts += 1;
            if attempts > self.settings.max_steps {
                let error = IntegrationError::MaxStepsExceeded {
                    t,
                    max_steps: self.settings.max_steps,
                };
                return Err(self.fail(run, error));
            }

            let h_min = self.min_step(t);
            h = h.max(h_min);

            // Don't overshoot the endpoint, and don't leave a sliver behind.
            let last = t_end - (t + h) <= h_min;
            if last {
                h = t_end - t;
            } else {
                // Step to a representable time so t + h lands exactly on it.
                h = (t + h) - t;
            }
            if h <= 0.0 {
                let error = IntegrationError::StepSizeUnderflow {
                    t,
                    y: y.to_vec(),
                    h,
                };
                return Err(self.fail(run, error));
            }

            let step = match attempt_step(sys, t, &y, &f0, h) {
                Ok(step) => step,
                Err(error) => {
                    self.stats.fn_evals += (STAGES - 1) as u64;
                    return Err(self.fail(run, error));
                }
            };
            self.stats.fn_evals += (STAGES - 1) as u64;

            let err = step.error_norm(&self.tol);
            let mut factor = self.controller.compute_factor(err);

            if err <= 1.0 {
                let t_new = if last { t_end } else { t + h };

                let sampled = match self.settings.interpolation {
                    Interpolation::Dense => run.samples.record_segment(&step.dense_segment(t_new)),
                    Interpolation::Linear => {
                        run.samples.record_segment(&step.linear_segment(t_new))
                    }
                };

                t = t_new;
                y = step.y;
                f0 = *step.f_end();
                run.trajectory.push(t, y);
                self.stats.accepted_steps += 1;

                trace!(
                    "accepted t = {}, h = {:e}, err = {:.3e}, {} sample(s)",
                    t,
                    h,
                    err,
                    sampled
                );

                // No growth right after a rejection
                if previous_rejected {
                    factor = factor.min(1.0);
                }
                previous_rejected = false;
                h = (h * factor).min(h_max);
            } else {
                self.stats.rejected_steps += 1;
                previous_rejected = true;
                h *= factor;

                trace!("rejected t = {}, err = {:.3e}, retry h = {:e}", t, err, h);

                if h < h_min {
                    let error = IntegrationError::StepSizeUnderflow {
                        t,
                        y: y.to_vec(),
                        h,
                    };
                    return Err(self.fail(run, error));
                }
            }
        }

        debug_assert!(run.samples.is_complete());
        debug!(
            "reached t = {} after {} accepted / {} rejected steps, {} evaluations",
            t, self.stats.accepted_steps, self.stats.rejected_steps, self.stats.fn_evals
        );

        Ok(Solution {
            samples: run.samples.collect(),
            trajectory: run.trajectory,
            stats: self.stats.clone(),
        })
    }

    fn fail(&self, run: Run<N>, error: IntegrationError) -> Failure<N> {
        warn!("integration stopped: {}", error);
        Failure {
            error,
            partial: Some(Solution {
                samples: run.samples.collect(),
                trajectory: run.trajectory,
                stats: self.stats.clone(),
            }),
        }
    }

    fn min_step(&self, t: f64) -> f64 {
        self.settings
            .min_step
            .unwrap_or_else(|| 10.0 * f64::EPSILON * t.abs().max(1.0))
    }

    /// Initial step guess from the scales of y, f(t0, y) and an estimate of
    /// the second derivative (Hairer, Nørsett & Wanner, II.4).
    ///
    /// Costs one extra function evaluation.
    fn initial_step<S>(
        &mut self,
        sys: &S,
        t: f64,
        y: &[f64; N],
        f0: &[f64; N],
    ) -> Result<f64, IntegrationError>
    where
        S: OdeSystem<N> + ?Sized,
    {
        let d0 = self.rms_norm(y, y);
        let d1 = self.rms_norm(f0, y);
        let h0 = if d0 < 1e-5 || d1 < 1e-5 {
            1e-6
        } else {
            0.01 * d0 / d1
        };

        // Explicit Euler probe
        let mut y1 = [0.0; N];
        for ((out, &yi), &fi) in y1.iter_mut().zip(y.iter()).zip(f0.iter()) {
            *out = yi + h0 * fi;
        }
        let mut f1 = [0.0; N];
        sys.rhs(t + h0, &y1, &mut f1);
        self.stats.fn_evals += 1;
        if !f1.iter().all(|v| v.is_finite()) {
            return Err(IntegrationError::NumericalFailure {
                t: t + h0,
                y: y1.to_vec(),
            });
        }

        let mut df = [0.0; N];
        for ((out, &a), &b) in df.iter_mut().zip(f1.iter()).zip(f0.iter()) {
            *out = a - b;
        }
        let d2 = self.rms_norm(&df, y) / h0;

        let h1 = if d1 <= 1e-15 && d2 <= 1e-15 {
            (h0 * 1e-3).max(1e-6)
        } else {
            (0.01 / d1.max(d2)).powf(1.0 / (EMBEDDED_ORDER as f64 + 1.0))
        };

        Ok((100.0 * h0).min(h1))
    }

    /// Root-mean-square of `v` weighted by the tolerances at `y`
    #[allow(clippy::needless_range_loop)]
    fn rms_norm(&self, v: &[f64; N], y: &[f64; N]) -> f64 {
        if N == 0 {
            return 0.0;
        }
        let mut sum = 0.0;
        for i in 0..N {
            let w = v[i] / self.tol.scale(i, y[i].abs());
            sum += w * w;
        }
        (sum / N as f64).sqrt()
    }

    /// Validate integration inputs
    fn validate_inputs(&self, t_start: f64, t_end: f64, y0: &[f64; N]) -> Result<(), IntegrationError> {
        if !t_start.is_finite() || !t_end.is_finite() {
            return Err(IntegrationError::invalid("t_start and t_end must be finite"));
        }
        if t_start >= t_end {
            return Err(IntegrationError::invalid(format!(
                "t_start ({}) must be less than t_end ({})",
                t_start, t_end
            )));
        }
        for (i, &val) in y0.iter().enumerate() {
            if !val.is_finite() {
                return Err(IntegrationError::invalid(format!("y0[{}] is not finite", i)));
            }
        }
        self.tol.validate().map_err(IntegrationError::invalid)?;
        self.settings.validate()
    }
}

/// Per-call bookkeeping handed back inside a [`Failure`]
struct Run<const N: usize> {
    samples: SampleSchedule<N>,
    trajectory: Trajectory<N>,
}
