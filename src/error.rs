//! Error type shared by every fallible operation in the crate.

use thiserror::Error;

/// Error returned when an input cannot produce a valid result.
///
/// Every fallible operation validates its arguments up front and fails
/// with this error instead of returning a value with NaN, infinite or
/// negative fields.
#[derive(Error, Copy, Clone, Debug, PartialEq)]
pub enum Error {
    /// A dimension, rate or tolerance was zero, negative, NaN or infinite.
    #[error("invalid argument `{argument}`: {value} (must be positive and finite)")]
    InvalidArgument {
        /// Name of the offending argument.
        argument: &'static str,
        /// The rejected value.
        value: f64,
    },
}

/// Result alias for crate operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Check that `value` is strictly positive and finite.
pub(crate) fn positive(argument: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        log::debug!("rejecting {argument} = {value}");
        Err(Error::InvalidArgument { argument, value })
    }
}
