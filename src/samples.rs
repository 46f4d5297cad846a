//! Requested output times
//!
//! The caller may list sample times in any order; the driver consumes them
//! in time order while results are written back to the caller's slots.

use crate::dense::Interpolate;
use crate::error::IntegrationError;

/// `n` evenly spaced points from `start` to `end`, both included
///
/// ```
/// let grid = dopri45::linspace(0.0, 100.0, 11);
/// assert_eq!(grid.len(), 11);
/// assert_eq!(grid[0], 0.0);
/// assert_eq!(grid[10], 100.0);
/// assert_eq!(grid[3], 30.0);
/// ```
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Pending sample times, sorted, with their original positions
#[derive(Debug, Clone)]
pub(crate) struct SampleSchedule<const N: usize> {
    order: Vec<usize>,
    times: Vec<f64>,
    next: usize,
    values: Vec<Option<[f64; N]>>,
}

impl<const N: usize> SampleSchedule<N> {
    /// Validate the requested times against `[t_start, t_end]`.
    pub(crate) fn new(times: &[f64], t_start: f64, t_end: f64) -> Result<Self, IntegrationError> {
        if times.is_empty() {
            return Err(IntegrationError::invalid("sample_times must not be empty"));
        }
        for (i, &t) in times.iter().enumerate() {
            if !t.is_finite() {
                return Err(IntegrationError::invalid(format!(
                    "sample_times[{}] is not finite",
                    i
                )));
            }
            if t < t_start || t > t_end {
                return Err(IntegrationError::invalid(format!(
                    "sample_times[{}] = {} lies outside [{}, {}]",
                    i, t, t_start, t_end
                )));
            }
        }

        let mut order: Vec<usize> = (0..times.len()).collect();
        // Stable, so equal times keep the caller's relative order.
        order.sort_by(|&a, &b| times[a].total_cmp(&times[b]));

        Ok(Self {
            order,
            times: times.to_vec(),
            next: 0,
            values: vec![None; times.len()],
        })
    }

    /// Record every pending sample that equals `t`.
    pub(crate) fn record_exact(&mut self, t: f64, y: &[f64; N]) {
        while let Some(&idx) = self.order.get(self.next) {
            if self.times[idx] != t {
                break;
            }
            self.values[idx] = Some(*y);
            self.next += 1;
        }
    }

    /// Record every pending sample inside the segment's span.
    pub(crate) fn record_segment<I: Interpolate<N>>(&mut self, segment: &I) -> usize {
        let (_, t_end) = segment.span();
        let mut recorded = 0;
        while let Some(&idx) = self.order.get(self.next) {
            let t = self.times[idx];
            if t > t_end {
                break;
            }
            self.values[idx] = Some(segment.interpolate(t));
            self.next += 1;
            recorded += 1;
        }
        recorded
    }

    /// Samples reached so far, in the caller's order.
    ///
    /// Times not yet reached are skipped, so after a failure this is a
    /// prefix-in-time of the request.
    pub(crate) fn collect(&self) -> Vec<(f64, [f64; N])> {
        self.times
            .iter()
            .zip(self.values.iter())
            .filter_map(|(&t, v)| v.map(|y| (t, y)))
            .collect()
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.next == self.order.len()
    }
}
