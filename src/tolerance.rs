//! Tolerance specification for error control

/// Relative tolerance used when none is given
pub const DEFAULT_RTOL: f64 = 1e-3;

/// Absolute tolerance used when none is given
pub const DEFAULT_ATOL: f64 = 1e-6;

/// Tolerance specification for error control
///
/// A step is accepted when, for every component,
/// `|y_high - y_low| <= atol + rtol * max(|y_old|, |y_high|)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tolerances<const N: usize> {
    /// Absolute tolerance per component
    pub atol: [f64; N],
    /// Relative tolerance per component
    pub rtol: [f64; N],
}

impl<const N: usize> Tolerances<N> {
    /// Create tolerances with uniform values
    pub fn new(atol: f64, rtol: f64) -> Self {
        Self {
            atol: [atol; N],
            rtol: [rtol; N],
        }
    }

    /// Create tolerances with per-component values
    pub fn with_components(atol: [f64; N], rtol: [f64; N]) -> Self {
        Self { atol, rtol }
    }

    /// Error weight of component `i` for the given magnitude
    #[inline]
    pub(crate) fn scale(&self, i: usize, magnitude: f64) -> f64 {
        self.atol[i] + self.rtol[i] * magnitude
    }

    /// Both tolerances must be strictly positive and finite.
    pub(crate) fn validate(&self) -> Result<(), String> {
        for (i, (&a, &r)) in self.atol.iter().zip(self.rtol.iter()).enumerate() {
            if !a.is_finite() || a <= 0.0 {
                return Err(format!("atol[{}] must be positive and finite (got {})", i, a));
            }
            if !r.is_finite() || r <= 0.0 {
                return Err(format!("rtol[{}] must be positive and finite (got {})", i, r));
            }
        }
        Ok(())
    }
}

impl<const N: usize> Default for Tolerances<N> {
    fn default() -> Self {
        Self::new(DEFAULT_ATOL, DEFAULT_RTOL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let tol = Tolerances::<2>::default();
        assert_eq!(tol.atol, [1e-6, 1e-6]);
        assert_eq!(tol.rtol, [1e-3, 1e-3]);
    }

    #[test]
    fn test_scale() {
        let tol = Tolerances::with_components([1e-6, 1e-3], [1e-2, 0.5]);
        assert_eq!(tol.scale(0, 0.0), 1e-6);
        assert!((tol.scale(1, 2.0) - 1.001).abs() < 1e-15);
    }

    #[test]
    fn test_validate_rejects_non_positive() {
        assert!(Tolerances::<1>::new(0.0, 1e-3).validate().is_err());
        assert!(Tolerances::<1>::new(1e-6, 0.0).validate().is_err());
        assert!(Tolerances::<1>::new(-1e-6, 1e-3).validate().is_err());
        assert!(Tolerances::<1>::new(f64::NAN, 1e-3).validate().is_err());
        assert!(Tolerances::<1>::new(1e-6, f64::INFINITY).validate().is_err());
        assert!(Tolerances::<1>::new(1e-6, 1e-3).validate().is_ok());
    }
}
