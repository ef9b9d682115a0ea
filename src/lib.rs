//! # xoshiro-bounded
//!
//! A self-seeding, per-thread pseudo-random number generator with a single
//! headline operation: [`random_uniform`], which returns an integer uniformly
//! distributed over `[0, limit)` with no modulo bias.
//!
//! Two pieces do the work:
//!
//! - [`Xoshiro128StarStar`], the xoshiro128** 1.0 generator: 128 bits of
//!   state, one scrambled 32-bit output per step.
//! - [`bounded`], Lemire's nearly-divisionless multiply-and-reject mapping
//!   from raw 32-bit values to `[0, limit)`. Most calls perform no division.
//!
//! Each thread gets its own generator, seeded from 16 bytes of operating
//! system entropy the first time that thread asks for a number. No state is
//! shared between threads and no locks are taken on the sampling path.
//!
//! ```rust
//! use xoshiro_bounded::prelude::*;
//!
//! // Implicit thread-local generator
//! let cell = random_uniform(1000);
//! assert!(cell < 1000);
//!
//! // Explicit generator, passed by the caller
//! let mut rng = Xoshiro128StarStar::from_entropy()?;
//! let roll = rng.bounded(6) + 1;
//! assert!((1..=6).contains(&roll));
//! # Ok::<(), RngError>(())
//! ```
//!
//! This generator is NOT cryptographically secure. Use it for simulations,
//! games, sampling and testing, never for keys or tokens.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub use config::SeedConfig;
pub use entropy::{EntropySource, OsEntropy};
pub use error::{RngError, RngResult};
pub use rng::{random_uniform, thread_rng, try_random_uniform, Rng, ThreadRng, Xoshiro128StarStar};

/// Lemire's nearly-divisionless bounded sampler.
pub mod bounded;
pub mod config;
pub mod entropy;
#[doc(hidden)]
pub mod error;
pub mod prelude;
/// The xoshiro128** generator, the [`Rng`] trait and the thread-local handle.
pub mod rng;
pub mod telemetry;
