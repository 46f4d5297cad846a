//! User-supplied right-hand side

/// System of ordinary differential equations: dy/dt = f(t, y)
///
/// Implementations must be pure: the integrator may call `rhs` any number
/// of times, at any abscissa inside the current step, and assumes equal
/// inputs give equal outputs.
pub trait OdeSystem<const N: usize> {
    /// Evaluate the right-hand side of the ODE system
    ///
    /// # Arguments
    /// * `t` - Current time
    /// * `y` - Current state vector
    /// * `dydt` - Output: derivative dy/dt
    fn rhs(&self, t: f64, y: &[f64; N], dydt: &mut [f64; N]);
}

/// Plain functions and closures are systems too.
///
/// ```
/// use dopri45::OdeSystem;
///
/// let decay = |_t: f64, y: &[f64; 1], dydt: &mut [f64; 1]| dydt[0] = -0.5 * y[0];
/// let mut out = [0.0];
/// decay.rhs(0.0, &[2.0], &mut out);
/// assert_eq!(out[0], -1.0);
/// ```
impl<F, const N: usize> OdeSystem<N> for F
where
    F: Fn(f64, &[f64; N], &mut [f64; N]),
{
    fn rhs(&self, t: f64, y: &[f64; N], dydt: &mut [f64; N]) {
        self(t, y, dydt)
    }
}
