//! Adaptive Runge–Kutta–Fehlberg 4(5) initial value problem solver.
//!
//! The crate integrates systems of ordinary differential equations
//! `dy/dt = f(t, y)` with the classic Fehlberg embedded 4(5) pair,
//! adjusting the step size so the local error estimate per unit step stays
//! below a caller-supplied tolerance. The accepted steps form the returned
//! [`Trajectory`]; the sampling is non-uniform by design.
//!
//! # Example
//!
//! ```
//! use ndarray::array;
//! use ndarray_rkf45::integrate;
//!
//! // Scalar decay dy/dt = -y, y(0) = 1.
//! let sol = integrate(
//!     |_t, y, mut dy| {
//!         dy[0] = -y[0];
//!         Ok(())
//!     },
//!     (0., 1.),
//!     array![1.],
//!     1e-8,
//! )?;
//! assert!((sol.final_state()[0] - (-1.0f64).exp()).abs() < 1e-6);
//! # Ok::<(), ndarray_rkf45::Error>(())
//! ```

pub mod error;
pub mod rk;
pub mod systems;
pub mod trajectory;

pub use crate::error::{DerivError, Error};
pub use crate::rk::{integrate, Fehlberg45, RkMethod, Rkf45, RungeKutta, DEFAULT_TOL};
pub use crate::trajectory::Trajectory;

use ndarray::prelude::*;

/// Driver interface of an adaptive ODE stepper.
pub trait OdeIntegrate {
    /// Returns the number of elements in the state.
    fn len(&self) -> usize;
    /// Perform one accepted step (adaptive step size).
    fn step(&mut self) -> Result<(), Error>;
    /// Current time.
    fn time(&self) -> f64;
    /// The ending time.
    fn time_bound(&self) -> f64;
    /// Current state.
    fn state(&self) -> ArrayView1<'_, f64>;
    /// Returns `true` if the integration has reached `time_bound`.
    fn finished(&self) -> bool {
        self.time() == self.time_bound()
    }
    /// Integrate until reaching `time_bound`.
    fn run_to_bound(&mut self) -> Result<(), Error> {
        while !self.finished() {
            self.step()?;
        }
        Ok(())
    }
}
