//! Integration errors.

use thiserror::Error;

/// Boxed error a derivative function may return.
pub type DerivError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by the solver.
///
/// The internal accept/reject retry loop is not an error condition; every
/// variant here surfaces immediately to the caller and no partial trajectory
/// is returned.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested time span runs backwards (`t0 > tf`) or a bound is not
    /// finite.
    #[error("invalid time span: t0 ({t0}) must not exceed tf ({tf})")]
    InvalidRange { t0: f64, tf: f64 },

    /// The local-error tolerance is zero, negative, or NaN.
    #[error("tolerance must be positive (got {0})")]
    InvalidTolerance(f64),

    /// The supplied derivative function failed; its error is carried
    /// unchanged as the source.
    #[error("derivative evaluation failed at t = {t}")]
    Derivative {
        t: f64,
        #[source]
        source: DerivError,
    },

    /// Step-size control drove the step below the smallest meaningful step
    /// at the current time. Raised instead of looping forever on inputs the
    /// method cannot resolve (e.g. stiff systems at tight tolerances).
    #[error(
        "required step size {required:e} is smaller than the minimum \
         allowable step size {minimum:e} at t = {t}"
    )]
    StepSizeTooSmall { t: f64, required: f64, minimum: f64 },
}
