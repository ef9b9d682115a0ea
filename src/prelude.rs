//! Convenient re-exports for common usage.
//!
//! ```rust
//! use xoshiro_bounded::prelude::*;
//!
//! let mut rng = thread_rng();
//! let value = rng.gen_range(10..20);
//! assert!((10..20).contains(&value));
//! ```

// Generator and sampling
pub use crate::{random_uniform, thread_rng, try_random_uniform, Rng, ThreadRng, Xoshiro128StarStar};

// Seeding
pub use crate::{EntropySource, OsEntropy, SeedConfig};

// Error handling
pub use crate::{RngError, RngResult};
