//! Example dynamical systems used for demonstration and testing.

use ndarray::azip;
use ndarray::prelude::*;

/// The Lorenz system
///
/// ```text
/// dx/dt = σ (y − x)
/// dy/dt = x (ρ − z) − y
/// dz/dt = x y − β z
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lorenz {
    pub sigma: f64,
    pub rho: f64,
    pub beta: f64,
}

impl Default for Lorenz {
    /// The classic chaotic parameters σ = 10, ρ = 28, β = 8/3.
    fn default() -> Lorenz {
        Lorenz {
            sigma: 10.,
            rho: 28.,
            beta: 8. / 3.,
        }
    }
}

impl Lorenz {
    /// Evaluates the right-hand side at `(t, y)` into `dy`.
    ///
    /// The system is autonomous; `t` is unused.
    pub fn rhs(&self, _t: f64, y: ArrayView1<'_, f64>, mut dy: ArrayViewMut1<'_, f64>) {
        dy[0] = self.sigma * (y[1] - y[0]);
        dy[1] = y[0] * (self.rho - y[2]) - y[1];
        dy[2] = y[0] * y[1] - self.beta * y[2];
    }
}

/// Samples a bifurcation diagram of the logistic map `x ← r x (1 − x)`.
///
/// For `num_r` evenly spaced rates in `[r_min, r_max]`, iterates the map
/// from `x = 0.1`, discards the first `transient` iterates, and returns the
/// rate grid together with the next `keep` iterates as a `keep × num_r`
/// array (row `i` holds iterate `transient + i + 1` for every rate).
pub fn logistic_bifurcation(
    r_min: f64,
    r_max: f64,
    num_r: usize,
    transient: usize,
    keep: usize,
) -> (Array1<f64>, Array2<f64>) {
    let r = Array1::linspace(r_min, r_max, num_r);
    let mut x = Array1::from_elem(num_r, 0.1);
    let mut kept = Array2::zeros((keep, num_r));

    for _ in 0..transient {
        azip!((x in &mut x, &r in &r) { *x = r * *x * (1. - *x) });
    }
    for i in 0..keep {
        azip!((x in &mut x, &r in &r) { *x = r * *x * (1. - *x) });
        kept.row_mut(i).assign(&x);
    }

    (r, kept)
}
