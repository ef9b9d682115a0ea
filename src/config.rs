//! Configuration for seeding generators from an entropy source.
//!
//! | Config Type | Purpose | Key Presets |
//! |-------------|---------|-------------|
//! | `SeedConfig` | All-zero draw retry policy | `strict()`, `patient()` |
//!
//! # Example
//!
//! ```
//! use xoshiro_bounded::{SeedConfig, Xoshiro128StarStar};
//!
//! let config = SeedConfig::patient();
//! let rng = Xoshiro128StarStar::from_entropy_with(config)?;
//! # Ok::<(), xoshiro_bounded::RngError>(())
//! ```

use crate::RngError;

/// Default number of 16-byte entropy draws before seeding gives up.
///
/// An all-zero draw from a healthy OS source has probability 2^-128, so any
/// repeat is evidence of a broken source rather than bad luck.
pub const DEFAULT_SEED_ATTEMPTS: u32 = 8;

/// Controls how many entropy draws are made while seeding a generator.
///
/// Each draw fills the full 128-bit state. A draw is rejected only when every
/// word is zero, which is the single illegal xoshiro128** state.
///
/// # Example
///
/// ```
/// use xoshiro_bounded::SeedConfig;
///
/// let default = SeedConfig::default();
/// assert_eq!(default.max_attempts, 8);
///
/// let strict = SeedConfig::strict();
/// assert_eq!(strict.max_attempts, 1);
///
/// assert!(SeedConfig { max_attempts: 0 }.validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "SeedConfig has no effect unless passed to a seeding constructor"]
pub struct SeedConfig {
    /// Maximum number of entropy draws. Must be at least 1.
    ///
    /// Default: 8
    pub max_attempts: u32,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_SEED_ATTEMPTS,
        }
    }
}

impl SeedConfig {
    /// Creates a new `SeedConfig` with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail on the first all-zero draw.
    pub fn strict() -> Self {
        Self { max_attempts: 1 }
    }

    /// Tolerate a flaky entropy source that occasionally returns zeroed buffers.
    pub fn patient() -> Self {
        Self { max_attempts: 64 }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RngError::InvalidConfig`] if `max_attempts` is zero.
    pub fn validate(&self) -> Result<(), RngError> {
        if self.max_attempts == 0 {
            return Err(RngError::InvalidConfig {
                info: "max_attempts must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

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
    fn test_presets_validate() {
        for config in [
            SeedConfig::default(),
            SeedConfig::new(),
            SeedConfig::strict(),
            SeedConfig::patient(),
        ] {
            assert!(config.validate().is_ok(), "{config:?} should be valid");
        }
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let err = SeedConfig { max_attempts: 0 }.validate().unwrap_err();
        assert!(matches!(err, RngError::InvalidConfig { .. }));
    }
}
