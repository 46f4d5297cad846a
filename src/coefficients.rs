//! Dormand-Prince 5(4) Coefficients
//!
//! Coefficients for the 7-stage embedded RK5(4) pair from:
//! Dormand, J.R. & Prince, P.J. (1980). "A family of embedded Runge-Kutta
//! formulae". Journal of Computational and Applied Mathematics 6(1), 19-26.
//!
//! The 5th-order solution advances the state; the embedded 4th-order
//! solution is only used for error estimation. The last stage is evaluated
//! at the accepted point itself (first-same-as-last), so an accepted step
//! costs six fresh right-hand-side evaluations.
//!
//! The continuous extension weights are Shampine's, as tabulated in
//! Hairer, Nørsett & Wanner, "Solving Ordinary Differential Equations I",
//! Section II.6.

/// Number of stages in the Dormand-Prince method
pub const STAGES: usize = 7;

/// Order of the higher-order method (used for advancing the solution)
pub const ORDER: u8 = 5;

/// Order of the embedded method (used for error estimation)
pub const EMBEDDED_ORDER: u8 = 4;

/// Order of the continuous extension used for dense output
pub const DENSE_ORDER: u8 = 4;

/// Node coefficients (c_i): stage i is evaluated at t_n + c[i]*h
pub const C: [f64; STAGES] = [
    0.0,        // c[0]
    1.0 / 5.0,  // c[1]
    3.0 / 10.0, // c[2]
    4.0 / 5.0,  // c[3]
    8.0 / 9.0,  // c[4]
    1.0,        // c[5]
    1.0,        // c[6]  FSAL stage
];

/// Runge-Kutta matrix (a_ij), lower triangular
///
/// k_i = f(t_n + c_i*h, y_n + h * sum_{j=0}^{i-1} a_{i,j} * k_j)
///
/// Row 6 equals the 5th-order weights, which is what makes the last stage
/// f(t_n + h, y_{n+1}).
#[rustfmt::skip]
pub const A: [[f64; 6]; STAGES] = [
    [0.0; 6],
    [1.0/5.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [3.0/40.0, 9.0/40.0, 0.0, 0.0, 0.0, 0.0],
    [44.0/45.0, -56.0/15.0, 32.0/9.0, 0.0, 0.0, 0.0],
    [19372.0/6561.0, -25360.0/2187.0, 64448.0/6561.0, -212.0/729.0, 0.0, 0.0],
    [9017.0/3168.0, -355.0/33.0, 46732.0/5247.0, 49.0/176.0, -5103.0/18656.0, 0.0],
    [35.0/384.0, 0.0, 500.0/1113.0, 125.0/192.0, -2187.0/6784.0, 11.0/84.0],
];

/// Weights for the 5th-order solution (b_i)
#[rustfmt::skip]
pub const B: [f64; STAGES] = [
    35.0/384.0,
    0.0,
    500.0/1113.0,
    125.0/192.0,
    -2187.0/6784.0,
    11.0/84.0,
    0.0,
];

/// Weights for the embedded 4th-order solution (b_hat_i)
#[rustfmt::skip]
pub const B_HAT: [f64; STAGES] = [
    5179.0/57600.0,
    0.0,
    7571.0/16695.0,
    393.0/640.0,
    -92097.0/339200.0,
    187.0/2100.0,
    1.0/40.0,
];

/// Error weights: B[i] - B_HAT[i]
///
/// y_high - y_low = h * sum_i B_ERR[i] * k_i
#[rustfmt::skip]
pub const B_ERR: [f64; STAGES] = [
    71.0/57600.0,
    0.0,
    -71.0/16695.0,
    71.0/1920.0,
    -17253.0/339200.0,
    22.0/525.0,
    -1.0/40.0,
];

/// Weights of the fifth dense-output coefficient
///
/// r5 = h * sum_i D[i] * k_i, the only continuous-extension term that is not
/// a combination of the step endpoints and their derivatives.
#[rustfmt::skip]
pub const D: [f64; STAGES] = [
    -12715105075.0/11282082432.0,
    0.0,
    87487479700.0/32700410799.0,
    -10690763975.0/1880347072.0,
    701980252875.0/199316789632.0,
    -1453857185.0/822651844.0,
    69997945.0/29380423.0,
];
