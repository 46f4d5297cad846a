//! Single Dormand-Prince 5(4) step attempt
//!
//! [`attempt_step`] is a pure function of its inputs: it evaluates the
//! stages, forms the 5th-order solution and the embedded error estimate,
//! and hands everything back as a [`Step`] for the driver to accept or
//! reject.

use crate::coefficients::{A, B_ERR, C, ORDER, STAGES};
use crate::dense::{DenseSegment, LinearSegment};
use crate::error::IntegrationError;
use crate::system::OdeSystem;
use crate::tolerance::Tolerances;

/// One attempted step, alive for a single accept/reject decision
#[derive(Debug, Clone)]
pub struct Step<const N: usize> {
    /// Start of the step
    pub t: f64,
    /// Step size
    pub h: f64,
    /// State at the start of the step
    pub y0: [f64; N],
    /// Proposed state at `t + h` (5th order)
    pub y: [f64; N],
    /// Local error estimate `y_high - y_low`
    pub error: [f64; N],
    /// Formal order of `y`
    pub order: u8,
    /// Stage derivatives; the last one is f(t + h, y)
    k: [[f64; N]; STAGES],
}

impl<const N: usize> Step<N> {
    /// Derivative at the proposed state, reused as the next step's first stage
    pub fn f_end(&self) -> &[f64; N] {
        &self.k[STAGES - 1]
    }

    /// Derivative at the start of the step
    pub fn f_start(&self) -> &[f64; N] {
        &self.k[0]
    }

    /// Normalized error estimate (≤ 1.0 means acceptable)
    ///
    /// Max norm of the scaled error:
    /// `max_i |error[i]| / (atol[i] + rtol[i] * max(|y0[i]|, |y[i]|))`
    pub fn error_norm(&self, tol: &Tolerances<N>) -> f64 {
        let mut max_err: f64 = 0.0;
        for i in 0..N {
            let scale = tol.scale(i, self.y0[i].abs().max(self.y[i].abs()));
            max_err = max_err.max(self.error[i].abs() / scale);
        }
        max_err
    }

    /// Continuous 4th-order extension over `[t, t_end]`
    ///
    /// `t_end` is normally `t + h`; the driver passes the exact interval end
    /// when the step was clamped onto it.
    pub fn dense_segment(&self, t_end: f64) -> DenseSegment<N> {
        DenseSegment::new(self.t, t_end, self.h, &self.y0, &self.y, &self.k)
    }

    /// Straight line between the step endpoints
    pub fn linear_segment(&self, t_end: f64) -> LinearSegment<N> {
        LinearSegment::new(self.t, t_end, self.y0, self.y)
    }
}

/// Attempt one Dormand-Prince step of size `h` from `(t, y)`.
///
/// `f0` must be `f(t, y)`; the driver carries it over from the previous
/// accepted step, so only six stages are evaluated here.
///
/// # Errors
/// [`IntegrationError::NumericalFailure`] if a stage derivative or the
/// proposed state is not finite.
#[allow(clippy::needless_range_loop)]
pub fn attempt_step<S, const N: usize>(
    sys: &S,
    t: f64,
    y: &[f64; N],
    f0: &[f64; N],
    h: f64,
) -> Result<Step<N>, IntegrationError>
where
    S: OdeSystem<N> + ?Sized,
{
    let mut k = [[0.0; N]; STAGES];
    k[0] = *f0;

    let mut y_stage = [0.0; N];
    for i in 1..STAGES {
        for n in 0..N {
            let mut sum = 0.0;
            for j in 0..i {
                sum += A[i][j] * k[j][n];
            }
            y_stage[n] = y[n] + h * sum;
        }

        let t_stage = t + C[i] * h;
        sys.rhs(t_stage, &y_stage, &mut k[i]);
        if !k[i].iter().all(|v| v.is_finite()) {
            return Err(IntegrationError::NumericalFailure {
                t: t_stage,
                y: y_stage.to_vec(),
            });
        }
    }

    // The last stage input is the 5th-order solution (A[6] == B).
    let y_high = y_stage;
    if !y_high.iter().all(|v| v.is_finite()) {
        return Err(IntegrationError::NumericalFailure {
            t: t + h,
            y: y_high.to_vec(),
        });
    }

    let mut error = [0.0; N];
    for n in 0..N {
        let mut sum = 0.0;
        for i in 0..STAGES {
            sum += B_ERR[i] * k[i][n];
        }
        error[n] = h * sum;
    }

    Ok(Step {
        t,
        h,
        y0: *y,
        y: y_high,
        error,
        order: ORDER,
        k,
    })
}
