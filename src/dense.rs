//! Interpolation inside an accepted step

use crate::coefficients::{D, STAGES};

/// How sample times between accepted points are evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    /// 4th-order continuous extension built from the step's own stages
    #[default]
    Dense,
    /// Straight line between the step endpoints.
    ///
    /// Reduced fidelity: interior samples are only 2nd-order accurate in the
    /// step size, although samples that coincide with accepted points are
    /// still exact.
    Linear,
}

/// Trait for interpolating the solution within a step.
pub trait Interpolate<const N: usize> {
    /// Interval covered, `(t_start, t_end)`
    fn span(&self) -> (f64, f64);

    /// Interpolate the solution at `t` inside [`span`](Self::span).
    fn interpolate(&self, t: f64) -> [f64; N];
}

/// Dormand-Prince continuous extension for one accepted step
///
/// With θ = (t - t0) / (t1 - t0):
/// `y(θ) = r1 + θ (r2 + (1-θ) (r3 + θ (r4 + (1-θ) r5)))`
#[derive(Debug, Clone)]
pub struct DenseSegment<const N: usize> {
    t0: f64,
    t1: f64,
    y1: [f64; N],
    r: [[f64; N]; 5],
}

impl<const N: usize> DenseSegment<N> {
    /// `h` is the step size the stages `k` were taken with; the polynomial
    /// is mapped onto `[t0, t1]` whatever rounding separates the two.
    pub(crate) fn new(
        t0: f64,
        t1: f64,
        h: f64,
        y0: &[f64; N],
        y1: &[f64; N],
        k: &[[f64; N]; STAGES],
    ) -> Self {
        let mut r = [[0.0; N]; 5];
        for i in 0..N {
            let ydiff = y1[i] - y0[i];
            let bspl = h * k[0][i] - ydiff;
            r[0][i] = y0[i];
            r[1][i] = ydiff;
            r[2][i] = bspl;
            r[3][i] = ydiff - h * k[STAGES - 1][i] - bspl;

            let mut sum = 0.0;
            for s in 0..STAGES {
                sum += D[s] * k[s][i];
            }
            r[4][i] = h * sum;
        }
        Self {
            t0,
            t1,
            y1: *y1,
            r,
        }
    }
}

impl<const N: usize> Interpolate<N> for DenseSegment<N> {
    fn span(&self) -> (f64, f64) {
        (self.t0, self.t1)
    }

    fn interpolate(&self, t: f64) -> [f64; N] {
        if t == self.t0 {
            return self.r[0];
        }
        if t == self.t1 {
            return self.y1;
        }
        let theta = (t - self.t0) / (self.t1 - self.t0);
        let theta1 = 1.0 - theta;
        let mut y = [0.0; N];
        for i in 0..N {
            y[i] = self.r[0][i]
                + theta
                    * (self.r[1][i]
                        + theta1
                            * (self.r[2][i]
                                + theta * (self.r[3][i] + theta1 * self.r[4][i])));
        }
        y
    }
}

/// Linear interpolation between two accepted points
#[derive(Debug, Clone)]
pub struct LinearSegment<const N: usize> {
    t0: f64,
    t1: f64,
    y0: [f64; N],
    y1: [f64; N],
}

impl<const N: usize> LinearSegment<N> {
    pub(crate) fn new(t0: f64, t1: f64, y0: [f64; N], y1: [f64; N]) -> Self {
        Self { t0, t1, y0, y1 }
    }
}

impl<const N: usize> Interpolate<N> for LinearSegment<N> {
    fn span(&self) -> (f64, f64) {
        (self.t0, self.t1)
    }

    fn interpolate(&self, t: f64) -> [f64; N] {
        if t == self.t0 {
            return self.y0;
        }
        if t == self.t1 {
            return self.y1;
        }
        let w = (t - self.t0) / (self.t1 - self.t0);
        let mut y = [0.0; N];
        for i in 0..N {
            y[i] = self.y0[i] + w * (self.y1[i] - self.y0[i]);
        }
        y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::attempt_step;

    fn cos_rhs(t: f64, _y: &[f64; 1], dydt: &mut [f64; 1]) {
        dydt[0] = t.cos();
    }

    #[test]
    fn test_dense_endpoints_exact() {
        let step = attempt_step(&cos_rhs, 0.0, &[0.0], &[1.0], 0.5).unwrap();
        let seg = step.dense_segment(0.5);
        assert_eq!(seg.interpolate(0.0), [0.0]);
        assert_eq!(seg.interpolate(0.5), step.y);
        assert_eq!(seg.span(), (0.0, 0.5));
    }

    #[test]
    fn test_dense_interior_accuracy() {
        // y' = cos(t), y(0) = 0, exact y = sin(t)
        let h = 0.5;
        let step = attempt_step(&cos_rhs, 0.0, &[0.0], &[1.0], h).unwrap();
        let seg = step.dense_segment(h);
        for i in 1..10 {
            let t = h * i as f64 / 10.0;
            let y = seg.interpolate(t)[0];
            assert!(
                (y - t.sin()).abs() < 1e-5,
                "t = {}, dense = {}, exact = {}",
                t,
                y,
                t.sin()
            );
        }
    }

    #[test]
    fn test_dense_beats_linear() {
        let h = 0.5;
        let step = attempt_step(&cos_rhs, 0.0, &[0.0], &[1.0], h).unwrap();
        let dense = step.dense_segment(h);
        let linear = step.linear_segment(h);
        let t = 0.25;
        let err_dense = (dense.interpolate(t)[0] - t.sin()).abs();
        let err_linear = (linear.interpolate(t)[0] - t.sin()).abs();
        assert!(err_dense < err_linear / 100.0, "dense {:e} vs linear {:e}", err_dense, err_linear);
    }

    #[test]
    fn test_dense_converges_at_fourth_order() {
        // Midpoint error of the continuous extension scales like h^5 locally.
        let mid_error = |h: f64| {
            let step = attempt_step(&cos_rhs, 0.0, &[0.0], &[1.0], h).unwrap();
            let t = 0.5 * h;
            (step.dense_segment(h).interpolate(t)[0] - t.sin()).abs()
        };
        let ratio = mid_error(0.8) / mid_error(0.4);
        assert!(ratio > 16.0, "ratio = {}", ratio);
    }

    #[test]
    fn test_dense_segment_maps_onto_its_span() {
        // A segment ending away from t + h still runs continuously from y0
        // to y1 across [t0, t1].
        let h = 0.5;
        let step = attempt_step(&cos_rhs, 0.0, &[0.0], &[1.0], h).unwrap();
        let seg = step.dense_segment(0.6);
        assert_eq!(seg.span(), (0.0, 0.6));

        let near_end = seg.interpolate(0.6 - 1e-12)[0];
        assert!((near_end - step.y[0]).abs() < 1e-9, "near_end = {}", near_end);
        let near_start = seg.interpolate(1e-12)[0];
        assert!(near_start.abs() < 1e-9, "near_start = {}", near_start);
    }

    #[test]
    fn test_linear_segment() {
        let seg = LinearSegment::new(1.0, 3.0, [2.0, -2.0], [4.0, 0.0]);
        assert_eq!(seg.interpolate(2.0), [3.0, -1.0]);
        assert_eq!(seg.interpolate(1.0), [2.0, -2.0]);
        assert_eq!(seg.interpolate(3.0), [4.0, 0.0]);
    }

    #[test]
    fn test_default_is_dense() {
        assert_eq!(Interpolation::default(), Interpolation::Dense);
    }
}
