use std::error::Error;
use std::fmt;
use std::fmt::Display;

/// This enum contains all error messages this library can return. The fallible
/// constructors and the `try_*` sampling functions return a [`RngResult`].
///
/// Environment faults ([`RngError::EntropyUnavailable`],
/// [`RngError::SeedAttemptsExhausted`]) are only surfaced by the explicit
/// constructors. The implicit per-thread initialization behind
/// [`random_uniform`] treats them as fatal.
///
/// [`random_uniform`]: crate::random_uniform
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RngError {
    /// A bound of `0` was passed to a bounded sampler. The range `[0, 0)` is empty.
    ZeroLimit,
    /// An explicit generator state was all-zero, the one illegal xoshiro128** state.
    DegenerateState,
    /// The entropy source failed or returned fewer bytes than requested.
    EntropyUnavailable {
        /// A description of the underlying failure.
        context: String,
    },
    /// Every entropy draw allowed by the [`SeedConfig`] produced an all-zero state.
    ///
    /// [`SeedConfig`]: crate::SeedConfig
    SeedAttemptsExhausted {
        /// How many 16-byte draws were made before giving up.
        attempts: u32,
    },
    /// A configuration value was rejected by validation.
    InvalidConfig {
        /// Further specifies why the configuration was invalid.
        info: String,
    },
}

impl Display for RngError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RngError::ZeroLimit => {
                write!(f, "Bounded sampling requires a limit greater than zero.")
            }
            RngError::DegenerateState => {
                write!(f, "Generator state must not be all-zero.")
            }
            RngError::EntropyUnavailable { context } => {
                write!(f, "Entropy source unavailable: {}", context)
            }
            RngError::SeedAttemptsExhausted { attempts } => {
                write!(
                    f,
                    "Entropy source produced an all-zero state on all {} attempts",
                    attempts
                )
            }
            RngError::InvalidConfig { info } => {
                write!(f, "Invalid configuration: {}", info)
            }
        }
    }
}

impl Error for RngError {}

/// Convenience alias used throughout the crate.
pub type RngResult<T> = Result<T, RngError>;

#[cfg(test)]
#[allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_context() {
        let err = RngError::EntropyUnavailable {
            context: "getrandom: Operation not permitted".to_owned(),
        };
        let display = err.to_string();
        assert!(display.contains("Entropy source unavailable"));
        assert!(display.contains("Operation not permitted"));

        let err = RngError::SeedAttemptsExhausted { attempts: 3 };
        assert!(err.to_string().contains("all 3 attempts"));
    }

    #[test]
    fn test_error_is_std_error() {
        fn assert_error<E: Error + Send + Sync + 'static>(_: &E) {}
        assert_error(&RngError::ZeroLimit);

        let boxed: Box<dyn Error> = Box::new(RngError::DegenerateState);
        assert_eq!(boxed.to_string(), "Generator state must not be all-zero.");
    }
}
