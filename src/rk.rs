//! The Runge–Kutta–Fehlberg solver.

use lazy_static::lazy_static;
use ndarray::prelude::*;
use std::marker::PhantomData;

use crate::error::{DerivError, Error};
use crate::trajectory::Trajectory;
use crate::OdeIntegrate;

/// Default local-error tolerance per unit step.
pub const DEFAULT_TOL: f64 = 1e-6;

/// Maximum allowed increase in a step size.
const MAX_FACTOR: f64 = 1.5;
/// Minimum allowed decrease in a step size.
const MIN_FACTOR: f64 = 0.5;
/// Exponent of the tolerance/error ratio in step-size updates.
const ERROR_EXPONENT: f64 = 0.25;

/// Infinity norm (maximum absolute value) of a vector.
///
/// NaN elements yield NaN, so a poisoned error estimate compares false
/// against the tolerance and the step is rejected rather than accepted.
fn inf_norm(x: ArrayView1<'_, f64>) -> f64 {
    let mut max: f64 = 0.;
    for &v in x.iter() {
        if v.is_nan() {
            return f64::NAN;
        }
        max = max.max(v.abs());
    }
    max
}

/// Distance from `x` to the next representable value toward `+∞`.
///
/// Used as a floor for the step size: steps below a few ULPs of the current
/// time cannot advance it.
fn ulp_at(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    let next = if x == 0. {
        f64::from_bits(1)
    } else if x > 0. {
        f64::from_bits(x.to_bits() + 1)
    } else {
        f64::from_bits(x.to_bits() - 1)
    };
    (next - x).abs()
}

/// Butcher tableau of an explicit embedded Runge–Kutta pair.
///
/// The first stage is always evaluated at the step's left end, so `c` and
/// `a` only cover stages `2..=STAGES`.
pub trait RkMethod {
    /// Number of stages in the method.
    const STAGES: usize;

    /// Abscissae for incrementing time at consecutive stages, length
    /// `STAGES - 1`.
    fn c() -> ArrayView1<'static, f64>;

    /// Coefficients for combining previous stages to compute the next
    /// stage, length `STAGES - 1`.
    ///
    /// For explicit methods the coefficients above the main diagonal are
    /// zeros, so `a` is stored as a list of rows of increasing lengths.
    fn a() -> &'static [ArrayView1<'static, f64>];

    /// Higher-order combination row, length `STAGES`. The step advances
    /// with this estimate.
    fn b() -> ArrayView1<'static, f64>;

    /// Lower-order combination row, length `STAGES`, used only for the
    /// local error estimate.
    fn b_hat() -> ArrayView1<'static, f64>;
}

/// The classic Fehlberg 4(5) embedded pair.
///
/// Six stages yield a 4th- and a 5th-order estimate; their difference
/// drives the step-size control and the 5th-order estimate advances the
/// solution.
///
/// # References
///
/// 1. E. Fehlberg, "Low-order classical Runge-Kutta formulas with stepsize
///    control and their application to some heat transfer problems", NASA
///    Technical Report R-315, 1969.
pub struct Fehlberg45;

impl RkMethod for Fehlberg45 {
    const STAGES: usize = 6;

    fn c() -> ArrayView1<'static, f64> {
        aview1(&[1./4., 3./8., 12./13., 1., 1./2.])
    }

    fn a() -> &'static [ArrayView1<'static, f64>] {
        lazy_static! {
            static ref A: [ArrayView1<'static, f64>; 6 - 1] = [
                aview1(&[1./4.]),
                aview1(&[3./32., 9./32.]),
                aview1(&[1932./2197., -7200./2197., 7296./2197.]),
                aview1(&[439./216., -8., 3680./513., -845./4104.]),
                aview1(&[-8./27., 2., -3544./2565., 1859./4104., -11./40.]),
            ];
        }
        &*A
    }

    fn b() -> ArrayView1<'static, f64> {
        aview1(&[16./135., 0., 6656./12825., 28561./56430., -9./50., 2./55.])
    }

    fn b_hat() -> ArrayView1<'static, f64> {
        aview1(&[25./216., 0., 1408./2565., 2197./4104., -1./5., 0.])
    }
}

/// Adaptive explicit Runge–Kutta stepper over an embedded pair.
pub struct RungeKutta<F, M>
where
    F: FnMut(f64, ArrayView1<'_, f64>, ArrayViewMut1<'_, f64>) -> Result<(), DerivError>,
    M: RkMethod,
{
    fun: F,
    method: PhantomData<M>,
    /// Current time.
    t: f64,
    /// Current state.
    y: Array1<f64>,
    /// Boundary time, `>= t`.
    t_bound: f64,
    /// Local-error tolerance per unit step.
    tol: f64,
    /// Step size proposed for the next `.step()`.
    h: f64,
    /// Storage for the stage derivatives, shape `(M::STAGES, self.len())`.
    k: Array2<f64>,
    /// Number of derivative evaluations so far.
    nfev: usize,
    /// Number of accepted steps so far.
    naccpt: usize,
    /// Number of rejected steps so far.
    nrejct: usize,
}

/// One trial step's outcome.
struct StepOutput {
    /// Solution at `t + h` from the higher-order estimate.
    y_new: Array1<f64>,
    /// Infinity norm of the difference between the two estimates, divided
    /// by `h`.
    error_norm: f64,
}

impl<F, M> RungeKutta<F, M>
where
    F: FnMut(f64, ArrayView1<'_, f64>, ArrayViewMut1<'_, f64>) -> Result<(), DerivError>,
    M: RkMethod,
{
    /// Creates a new `RungeKutta` stepper.
    ///
    /// # Parameters
    ///
    /// * `fun`: Right-hand side of the system, where calling `fun(t, y,
    ///   deriv_y)` should fill in `deriv_y` with the derivative of `y` at
    ///   time `t`. An `Err` return aborts the integration and is carried to
    ///   the caller unchanged.
    ///
    /// * `t0`: Initial value of the independent variable.
    ///
    /// * `y0`: Initial values of the dependent variable.
    ///
    /// * `t_bound`: Boundary time — the integration stops exactly there.
    ///   Must not precede `t0`; backward integration is not supported.
    ///
    /// * `tol`: Positive local-error tolerance per unit step. Each step is
    ///   accepted only while the infinity norm of the difference between
    ///   the embedded estimates, divided by the step size, stays below it.
    pub fn new(
        fun: F,
        t0: f64,
        y0: Array1<f64>,
        t_bound: f64,
        tol: f64,
    ) -> Result<RungeKutta<F, M>, Error> {
        if !t0.is_finite() || !t_bound.is_finite() || t0 > t_bound {
            return Err(Error::InvalidRange { t0, tf: t_bound });
        }
        if !(tol > 0.) {
            return Err(Error::InvalidTolerance(tol));
        }

        let k = Array2::zeros((M::STAGES, y0.len()));
        Ok(RungeKutta {
            fun,
            method: PhantomData,
            t: t0,
            y: y0,
            t_bound,
            tol,
            h: (t_bound - t0).min(0.1),
            k,
            nfev: 0,
            naccpt: 0,
            nrejct: 0,
        })
    }

    /// Local-error tolerance the stepper was built with.
    pub fn tol(&self) -> f64 {
        self.tol
    }

    /// Number of derivative evaluations so far, rejected trials included.
    pub fn nfev(&self) -> usize {
        self.nfev
    }

    /// Number of accepted steps so far.
    pub fn naccpt(&self) -> usize {
        self.naccpt
    }

    /// Number of rejected steps so far.
    pub fn nrejct(&self) -> usize {
        self.nrejct
    }

    /// Evaluates all stages for a trial step of size `h > 0` and forms the
    /// embedded estimates.
    ///
    /// Notation for the Butcher tableau is as in (ref 1).
    ///
    /// # References
    ///
    /// 1. E. Hairer, S. P. Norsett, G. Wanner, "Solving Ordinary
    ///    Differential Equations I: Nonstiff Problems", Sec. II.4.
    fn trial_step(&mut self, h: f64) -> Result<StepOutput, Error> {
        (self.fun)(self.t, self.y.view(), self.k.slice_mut(s![0, ..]))
            .map_err(|source| Error::Derivative { t: self.t, source })?;
        self.nfev += 1;

        for (s, (a, &c)) in M::a().iter().zip(M::c()).enumerate() {
            let t_stage = self.t + c * h;
            let y_stage = self.k.slice(s![..s + 1, ..]).t().dot(a) * h + &self.y;
            (self.fun)(t_stage, y_stage.view(), self.k.slice_mut(s![s + 1, ..]))
                .map_err(|source| Error::Derivative { t: t_stage, source })?;
            self.nfev += 1;
        }

        let y_low = self.k.t().dot(&M::b_hat()) * h + &self.y;
        let y_new = self.k.t().dot(&M::b()) * h + &self.y;
        let error_norm = inf_norm((&y_low - &y_new).view()) / h;

        Ok(StepOutput { y_new, error_norm })
    }
}

impl<F, M> OdeIntegrate for RungeKutta<F, M>
where
    F: FnMut(f64, ArrayView1<'_, f64>, ArrayViewMut1<'_, f64>) -> Result<(), DerivError>,
    M: RkMethod,
{
    fn len(&self) -> usize {
        self.y.len()
    }

    fn step(&mut self) -> Result<(), Error> {
        if self.t == self.t_bound {
            return Ok(());
        }

        let min_step = 10. * ulp_at(self.t);
        let mut h = self.h;
        loop {
            if h < min_step {
                return Err(Error::StepSizeTooSmall {
                    t: self.t,
                    required: h,
                    minimum: min_step,
                });
            }

            // Clamp so the step never lands past the bound; landing exactly
            // on it terminates the run without floating-point overshoot.
            let t_new = if h >= self.t_bound - self.t {
                self.t_bound
            } else {
                self.t + h
            };
            let h_clamped = t_new - self.t;

            let StepOutput { y_new, error_norm } = self.trial_step(h_clamped)?;

            if error_norm < self.tol {
                // A zero error estimate makes the ratio infinite and takes
                // the growth cap.
                let factor = MAX_FACTOR.min((self.tol / error_norm).powf(ERROR_EXPONENT));
                self.t = t_new;
                self.y = y_new;
                self.h = h_clamped * factor;
                self.naccpt += 1;
                return Ok(());
            } else {
                // A NaN error norm lands here too; `max` ignores the NaN
                // ratio and the step simply halves.
                h = h_clamped * MIN_FACTOR.max((self.tol / error_norm).powf(ERROR_EXPONENT));
                self.nrejct += 1;
            }
        }
    }

    fn time(&self) -> f64 {
        self.t
    }

    fn time_bound(&self) -> f64 {
        self.t_bound
    }

    fn state(&self) -> ArrayView1<'_, f64> {
        self.y.view()
    }
}

/// The Fehlberg 4(5) stepper.
pub type Rkf45<F> = RungeKutta<F, Fehlberg45>;

/// Integrates `dy/dt = fun(t, y)` from `y0` over `t_span = (t0, tf)` with
/// the Fehlberg 4(5) method, keeping the local error estimate per unit step
/// below `tol`.
///
/// Returns the trajectory of accepted `(t, y)` samples, starting at
/// `(t0, y0)` and ending at exactly `tf` with strictly increasing,
/// non-uniform times. A degenerate span with `t0 == tf` yields the
/// single-point trajectory `([t0], [y0])`.
///
/// # Errors
///
/// * [`Error::InvalidRange`] if `t0 > tf` or a bound is not finite.
/// * [`Error::InvalidTolerance`] if `tol <= 0` or is NaN.
/// * [`Error::Derivative`] if `fun` fails; its error is propagated
///   unchanged as the source.
/// * [`Error::StepSizeTooSmall`] if step control cannot find an acceptable
///   step above the floating-point floor.
pub fn integrate<F>(
    fun: F,
    t_span: (f64, f64),
    y0: Array1<f64>,
    tol: f64,
) -> Result<Trajectory, Error>
where
    F: FnMut(f64, ArrayView1<'_, f64>, ArrayViewMut1<'_, f64>) -> Result<(), DerivError>,
{
    let (t0, tf) = t_span;
    let mut solver = Rkf45::<F>::new(fun, t0, y0, tf, tol)?;

    let mut trajectory = Trajectory::with_capacity(128);
    trajectory.push(solver.time(), solver.state().to_owned());
    while !solver.finished() {
        solver.step()?;
        trajectory.push(solver.time(), solver.state().to_owned());
    }

    trajectory.nfev = solver.nfev();
    trajectory.naccpt = solver.naccpt();
    trajectory.nrejct = solver.nrejct();
    Ok(trajectory)
}
