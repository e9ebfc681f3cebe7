//! Sampled solution of an initial value problem.

use ndarray::prelude::*;

/// Accepted `(time, state)` samples of one integration run, plus basic
/// work statistics.
///
/// The sampling is non-uniform: it contains exactly the accepted step
/// points, starting at `t0` and ending at exactly `tf`, with strictly
/// increasing times. The struct is plain data; nothing mutates it after the
/// solver returns it.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    /// Sampled times.
    pub t: Vec<f64>,
    /// State vectors corresponding to `t`, all of equal length.
    pub y: Vec<Array1<f64>>,
    /// Number of derivative evaluations, including those of rejected steps.
    pub nfev: usize,
    /// Number of accepted steps.
    pub naccpt: usize,
    /// Number of rejected steps.
    pub nrejct: usize,
}

impl Trajectory {
    pub(crate) fn with_capacity(capacity: usize) -> Trajectory {
        Trajectory {
            t: Vec::with_capacity(capacity),
            y: Vec::with_capacity(capacity),
            nfev: 0,
            naccpt: 0,
            nrejct: 0,
        }
    }

    pub(crate) fn push(&mut self, t: f64, y: Array1<f64>) {
        debug_assert!(self.t.last().map_or(true, |&last| t > last));
        self.t.push(t);
        self.y.push(y);
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// Last sampled time, i.e. the requested `tf`.
    pub fn final_time(&self) -> f64 {
        *self.t.last().expect("trajectory holds at least the initial point")
    }

    /// State at the last sampled time.
    pub fn final_state(&self) -> ArrayView1<'_, f64> {
        self.y
            .last()
            .expect("trajectory holds at least the initial point")
            .view()
    }

    /// Extracts component `i` of the state across all samples, e.g. for
    /// handing `x(t)` of the Lorenz system to a plotting layer.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of bounds for the state vector.
    pub fn component(&self, i: usize) -> Vec<f64> {
        self.y.iter().map(|y| y[i]).collect()
    }

    /// Iterates over `(t_i, y_i)` sample pairs.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            t: self.t.iter(),
            y: self.y.iter(),
        }
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = (f64, ArrayView1<'a, f64>);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

/// Iterator over the `(t, y)` samples of a [`Trajectory`].
pub struct Iter<'a> {
    t: std::slice::Iter<'a, f64>,
    y: std::slice::Iter<'a, Array1<f64>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (f64, ArrayView1<'a, f64>);

    fn next(&mut self) -> Option<Self::Item> {
        let t = *self.t.next()?;
        let y = self.y.next()?.view();
        Some((t, y))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.t.size_hint()
    }
}

impl<'a> ExactSizeIterator for Iter<'a> {}
