//! Errors reported by the integrator

use thiserror::Error;

use crate::solver::Solution;

/// Errors that can occur during integration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntegrationError {
    /// Rejected before any right-hand-side evaluation
    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        /// Description of the invalid input
        message: String,
    },
    /// The right-hand side produced a non-finite value
    #[error("non-finite derivative at t = {t} (state {y:?})")]
    NumericalFailure {
        /// Abscissa of the failing evaluation
        t: f64,
        /// State handed to the failing evaluation
        y: Vec<f64>,
    },
    /// Step size collapsed below the minimum while being rejected
    #[error("step size {h:e} fell below the minimum after the last accepted point t = {t}")]
    StepSizeUnderflow {
        /// Time of the last accepted point
        t: f64,
        /// State at the last accepted point
        y: Vec<f64>,
        /// Step size that was too small
        h: f64,
    },
    /// Maximum number of step attempts exceeded
    #[error("maximum number of step attempts ({max_steps}) exceeded at t = {t}")]
    MaxStepsExceeded {
        /// Time of the last accepted point
        t: f64,
        /// Configured limit
        max_steps: u64,
    },
    /// The cancellation flag was raised between steps
    #[error("integration cancelled at t = {t}")]
    Cancelled {
        /// Time of the last accepted point
        t: f64,
    },
}

impl IntegrationError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        IntegrationError::InvalidConfiguration {
            message: message.into(),
        }
    }
}

/// A failed integration: the error plus everything computed before it.
///
/// `partial` is `None` only for [`IntegrationError::InvalidConfiguration`],
/// which is detected before any work is done. Otherwise it holds the
/// trajectory up to the last accepted point and the samples already reached.
#[derive(Debug, Clone, Error)]
#[error("{error}")]
pub struct Failure<const N: usize> {
    /// What went wrong
    #[source]
    pub error: IntegrationError,
    /// Solution up to the last accepted point
    pub partial: Option<Solution<N>>,
}

impl<const N: usize> Failure<N> {
    pub(crate) fn config(error: IntegrationError) -> Self {
        Self {
            error,
            partial: None,
        }
    }
}

impl<const N: usize> From<Failure<N>> for IntegrationError {
    fn from(failure: Failure<N>) -> Self {
        failure.error
    }
}
