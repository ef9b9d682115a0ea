//! The xoshiro128** generator and the per-thread handle built on it.
//!
//! # xoshiro128** Algorithm
//!
//! xoshiro128** 1.0 (Blackman & Vigna, 2018) is a 32-bit generator with
//! 128 bits of state:
//! - Produces one 32-bit output per step
//! - Period of 2^128 - 1
//! - Passes BigCrush and PractRand
//! - Two multiplications and a handful of shifts/rotations per step
//!
//! The all-zero state is a fixed point of the transition, so it is the one
//! state a generator must never hold. Every constructor in this module rejects
//! it, and the transition is a bijection, so a generator that starts non-zero
//! stays non-zero forever.
//!
//! Reference: <https://prng.di.unimi.it/>
//!
//! # Usage
//!
//! ```rust
//! use xoshiro_bounded::rng::{random_uniform, Rng, Xoshiro128StarStar};
//!
//! // Thread-local, seeded from the OS on first use
//! let roll = random_uniform(6);
//! assert!(roll < 6);
//!
//! // Explicit state for reproducible streams
//! let mut rng = Xoshiro128StarStar::from_state([1, 2, 3, 4])?;
//! assert_eq!(rng.next_u32(), 5760);
//! let value = rng.gen_range(10..20);
//! assert!((10..20).contains(&value));
//! # Ok::<(), xoshiro_bounded::RngError>(())
//! ```
//!
//! NOT cryptographically secure. Outputs reveal the state after four draws.

use crate::{
    bounded::sample_below,
    config::SeedConfig,
    debug_check_invariants,
    entropy::{draw_state, EntropySource, OsEntropy},
    report_violation_to,
    telemetry::{
        report_to_observer, ContractViolation, InvariantChecker, InvariantViolation,
        ViolationKind, ViolationObserver, ViolationSeverity,
    },
    RngError, RngResult,
};
use std::cell::RefCell;
use std::sync::Arc;

/// xoshiro128** random number generator.
///
/// Owns four words of state, never all zero. Cloning a generator forks the
/// stream: both copies produce the same sequence from that point on and share
/// the same violation observer.
///
/// Equality compares state only.
#[derive(Clone)]
pub struct Xoshiro128StarStar {
    s: [u32; 4],
    /// Receives violations raised by this generator; `None` logs via tracing.
    observer: Option<Arc<dyn ViolationObserver>>,
}

impl std::fmt::Debug for Xoshiro128StarStar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Xoshiro128StarStar")
            .field("s", &self.s)
            .field("has_violation_observer", &self.observer.is_some())
            .finish()
    }
}

impl PartialEq for Xoshiro128StarStar {
    fn eq(&self, other: &Self) -> bool {
        self.s == other.s
    }
}

impl Eq for Xoshiro128StarStar {}

impl Xoshiro128StarStar {
    /// Creates a generator from an explicit state.
    ///
    /// # Errors
    ///
    /// Returns [`RngError::DegenerateState`] if every word is zero.
    pub fn from_state(state: [u32; 4]) -> RngResult<Self> {
        if state == [0; 4] {
            return Err(RngError::DegenerateState);
        }
        let rng = Self {
            s: state,
            observer: None,
        };
        debug_check_invariants!(rng, "from_state");
        Ok(rng)
    }

    /// Routes this generator's contract violations to `observer` instead of
    /// the default tracing log.
    ///
    /// ```
    /// use std::sync::Arc;
    /// use xoshiro_bounded::telemetry::{CollectingObserver, ViolationKind};
    /// use xoshiro_bounded::{Rng, Xoshiro128StarStar};
    ///
    /// let observer = Arc::new(CollectingObserver::new());
    /// let mut rng = Xoshiro128StarStar::from_state([1, 2, 3, 4])?
    ///     .with_observer(observer.clone());
    /// let _ = rng.gen_range(5..5);
    /// assert!(observer.has_violation(ViolationKind::Configuration));
    /// # Ok::<(), xoshiro_bounded::RngError>(())
    /// ```
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ViolationObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Seeds a generator with 16 bytes of OS entropy.
    ///
    /// Uses [`SeedConfig::default`] for the all-zero retry policy.
    pub fn from_entropy() -> RngResult<Self> {
        Self::from_entropy_with(SeedConfig::default())
    }

    /// Seeds a generator from OS entropy with a custom retry policy.
    pub fn from_entropy_with(config: SeedConfig) -> RngResult<Self> {
        Self::from_entropy_source(&mut OsEntropy, config)
    }

    /// Seeds a generator from an arbitrary entropy source.
    ///
    /// Each attempt draws exactly [`SEED_BYTES`](crate::entropy::SEED_BYTES)
    /// bytes. An all-zero draw is discarded and retried, up to
    /// `config.max_attempts` draws in total.
    ///
    /// # Errors
    ///
    /// - [`RngError::InvalidConfig`] if `config` fails validation
    /// - [`RngError::EntropyUnavailable`] if the source fails
    /// - [`RngError::SeedAttemptsExhausted`] if every draw was all-zero
    pub fn from_entropy_source<S: EntropySource + ?Sized>(
        source: &mut S,
        config: SeedConfig,
    ) -> RngResult<Self> {
        Self::from_entropy_source_observed(source, config, None)
    }

    /// Like [`from_entropy_source`](Self::from_entropy_source), reporting
    /// discarded all-zero draws to `observer`. The returned generator keeps
    /// the observer.
    pub fn from_entropy_source_observed<S: EntropySource + ?Sized>(
        source: &mut S,
        config: SeedConfig,
        observer: Option<Arc<dyn ViolationObserver>>,
    ) -> RngResult<Self> {
        config.validate()?;

        for attempt in 1..=config.max_attempts {
            let state = draw_state(source)?;
            if state != [0; 4] {
                let mut rng = Self::from_state(state)?;
                rng.observer = observer;
                return Ok(rng);
            }
            let violation = ContractViolation::new(
                ViolationSeverity::Warning,
                ViolationKind::Entropy,
                "entropy draw produced an all-zero state",
                concat!(file!(), ":", line!()),
            )
            .with_context("attempt", attempt.to_string())
            .with_context("max_attempts", config.max_attempts.to_string());
            report_to_observer(observer.as_ref(), &violation);
        }

        Err(RngError::SeedAttemptsExhausted {
            attempts: config.max_attempts,
        })
    }

    /// Returns a copy of the current state words.
    #[must_use]
    pub const fn state(&self) -> [u32; 4] {
        self.s
    }

    /// Advances the state and returns the next raw 32-bit value.
    ///
    /// The output is scrambled from the state as it was *before* the update.
    #[inline]
    #[must_use]
    pub fn next_u32(&mut self) -> u32 {
        let result = self.s[0].wrapping_mul(5).rotate_left(7).wrapping_mul(9);
        let t = self.s[1] << 9;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;

        self.s[3] = self.s[3].rotate_left(11);

        result
    }
}

impl InvariantChecker for Xoshiro128StarStar {
    fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if self.s == [0; 4] {
            return Err(InvariantViolation::new(
                "Xoshiro128StarStar",
                "state must not be all-zero",
            ));
        }
        Ok(())
    }
}

/// Trait for random number generation.
///
/// Implementors supply raw 32-bit values; bounded sampling is provided on top.
pub trait Rng {
    /// Returns the next raw 32-bit value.
    fn next_u32(&mut self) -> u32;

    /// Returns the observer that receives this generator's contract
    /// violations. `None` means they are logged through
    /// [`TracingObserver`](crate::telemetry::TracingObserver).
    fn violation_observer(&self) -> Option<Arc<dyn ViolationObserver>> {
        None
    }

    /// Returns a value uniformly distributed over `[0, limit)`.
    ///
    /// # Zero Limit Behavior
    /// If `limit == 0`, reports a `Configuration` violation to the
    /// [`violation_observer`](Self::violation_observer) and returns `0` without
    /// drawing. Use [`try_bounded`](Self::try_bounded) to get an error
    /// instead.
    fn bounded(&mut self, limit: u32) -> u32 {
        match sample_below(self, limit) {
            Ok(value) => value,
            Err(_) => {
                let observer = self.violation_observer();
                report_violation_to!(
                    observer,
                    ViolationSeverity::Error,
                    ViolationKind::Configuration,
                    "bounded called with limit 0; the range [0, 0) is empty"
                );
                0
            },
        }
    }

    /// Returns a value uniformly distributed over `[0, limit)`.
    ///
    /// # Errors
    ///
    /// Returns [`RngError::ZeroLimit`] if `limit == 0`.
    fn try_bounded(&mut self, limit: u32) -> RngResult<u32> {
        sample_below(self, limit)
    }

    /// Generates a random `u32` value in the given range `[low, high)`.
    ///
    /// # Empty Range Behavior
    /// If `range.is_empty()`, reports a `Configuration` violation to the
    /// [`violation_observer`](Self::violation_observer) and returns `range.start`.
    fn gen_range(&mut self, range: std::ops::Range<u32>) -> u32 {
        if range.is_empty() {
            let observer = self.violation_observer();
            report_violation_to!(
                observer,
                ViolationSeverity::Error,
                ViolationKind::Configuration,
                "gen_range called with empty range [{}..{})",
                range.start,
                range.end
            );
            return range.start;
        }
        let span = range.end - range.start;
        range.start + self.bounded(span)
    }
}

impl Rng for Xoshiro128StarStar {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        Self::next_u32(self)
    }

    fn violation_observer(&self) -> Option<Arc<dyn ViolationObserver>> {
        self.observer.clone()
    }
}

// Thread-local generator behind random_uniform()

thread_local! {
    static THREAD_RNG: RefCell<Xoshiro128StarStar> = RefCell::new(seed_thread_rng());
}

/// Seeds the calling thread's generator. Runs once per thread, on first use.
///
/// An entropy failure here has no caller to report to, so it aborts the
/// process after logging.
fn seed_thread_rng() -> Xoshiro128StarStar {
    match Xoshiro128StarStar::from_entropy() {
        Ok(rng) => {
            tracing::debug!(
                thread = ?std::thread::current().id(),
                "seeded thread-local xoshiro128** generator"
            );
            rng
        },
        Err(err) => {
            tracing::error!(
                error = %err,
                thread = ?std::thread::current().id(),
                "cannot seed thread-local generator; aborting"
            );
            std::process::abort()
        },
    }
}

/// Returns a value uniformly distributed over `[0, limit)` from the calling
/// thread's generator.
///
/// The generator is seeded from OS entropy the first time a thread calls this
/// (or any other thread-local entry point). If the OS cannot supply entropy
/// the process aborts.
///
/// A `limit` of `0` is a contract violation: it is reported to the thread's
/// observer (see [`ThreadRng::set_violation_observer`]) and `0` is returned. See [`try_random_uniform`] for a checked variant.
///
/// ```rust
/// use xoshiro_bounded::random_uniform;
///
/// let cell = random_uniform(1000);
/// assert!(cell < 1000);
/// assert_eq!(random_uniform(1), 0);
/// ```
#[must_use]
pub fn random_uniform(limit: u32) -> u32 {
    thread_rng().bounded(limit)
}

/// Checked variant of [`random_uniform`].
///
/// # Errors
///
/// Returns [`RngError::ZeroLimit`] if `limit == 0`.
pub fn try_random_uniform(limit: u32) -> RngResult<u32> {
    thread_rng().try_bounded(limit)
}

/// Returns a handle to the thread-local RNG.
///
/// Useful when you need to call multiple RNG methods without naming the
/// thread-local directly.
#[must_use]
pub fn thread_rng() -> ThreadRng {
    ThreadRng { _private: () }
}

/// A handle to the thread-local random number generator.
///
/// This is lightweight (zero-sized) and just provides access to the
/// thread-local RNG. It carries no state of its own, so a handle moved to
/// another thread draws from that thread's generator.
#[derive(Debug)]
pub struct ThreadRng {
    _private: (),
}

impl ThreadRng {
    /// Returns a copy of this thread's generator state, seeding it if needed.
    #[must_use]
    pub fn state(&self) -> [u32; 4] {
        THREAD_RNG.with(|rng| rng.borrow().state())
    }

    /// Attaches `observer` to this thread's generator, or detaches the current
    /// one with `None`. Affects every handle and [`random_uniform`] call on
    /// this thread only.
    pub fn set_violation_observer(&self, observer: Option<Arc<dyn ViolationObserver>>) {
        THREAD_RNG.with(|rng| rng.borrow_mut().observer = observer);
    }
}

impl Rng for ThreadRng {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        THREAD_RNG.with(|rng| rng.borrow_mut().next_u32())
    }

    // Cloned out so the observer can itself draw from this thread's generator.
    fn violation_observer(&self) -> Option<Arc<dyn ViolationObserver>> {
        THREAD_RNG.with(|rng| rng.borrow().observer.clone())
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
    use crate::telemetry::CollectingObserver;
    use crate::{assert_no_violations, assert_violation};

    struct Zeros {
        draws: u32,
    }

    impl EntropySource for Zeros {
        fn fill(&mut self, dest: &mut [u8]) -> RngResult<()> {
            self.draws += 1;
            dest.fill(0);
            Ok(())
        }
    }

    /// Returns `zeros` all-zero buffers, then a buffer of 0x01 bytes.
    struct ZerosThenOnes {
        zeros: u32,
        draws: u32,
    }

    impl EntropySource for ZerosThenOnes {
        fn fill(&mut self, dest: &mut [u8]) -> RngResult<()> {
            self.draws += 1;
            let byte = if self.draws <= self.zeros { 0 } else { 1 };
            dest.fill(byte);
            Ok(())
        }
    }

    struct Broken;

    impl EntropySource for Broken {
        fn fill(&mut self, _dest: &mut [u8]) -> RngResult<()> {
            Err(RngError::EntropyUnavailable {
                context: "short read: 7 of 16 bytes".to_owned(),
            })
        }
    }

    #[test]
    fn test_regression_vector_ones() {
        let mut rng = Xoshiro128StarStar::from_state([1, 1, 1, 1]).unwrap();
        assert_eq!(rng.next_u32(), 5760);

        let expected = [
            0x0000_1680_u32,
            0x0000_0000_u32,
            0x00e1_0000_u32,
            0x08b4_1680_u32,
            0xfab4_45c0_u32,
            0x69c2_4650_u32,
            0x117e_adbd_u32,
        ];
        for &exp in &expected {
            assert_eq!(rng.next_u32(), exp, "Golden test failed");
        }
        assert_eq!(rng.state(), [14419012, 552605441, 10226946, 3769249859]);
    }

    // Published reference outputs for state {1, 2, 3, 4}.
    #[test]
    fn test_reference_vector() {
        let mut rng = Xoshiro128StarStar::from_state([1, 2, 3, 4]).unwrap();
        let expected = [5760_u32, 40320, 70819200, 3297914139, 2480851620, 1792823698];
        for &exp in &expected {
            assert_eq!(rng.next_u32(), exp);
        }
    }

    #[test]
    fn test_output_reads_pre_update_state() {
        let mut rng = Xoshiro128StarStar::from_state([3, 0, 0, 0]).unwrap();
        let expected = 15_u32.rotate_left(7).wrapping_mul(9);
        assert_eq!(rng.next_u32(), expected);
        assert_ne!(rng.state(), [3, 0, 0, 0]);
    }

    #[test]
    fn test_from_state_rejects_zero() {
        assert_eq!(
            Xoshiro128StarStar::from_state([0; 4]),
            Err(RngError::DegenerateState)
        );
        assert!(Xoshiro128StarStar::from_state([0, 0, 0, 1]).is_ok());
    }

    #[test]
    fn test_deterministic_replay() {
        let mut rng1 = Xoshiro128StarStar::from_state([0xdead_beef, 7, 0, 42]).unwrap();
        let mut rng2 = Xoshiro128StarStar::from_state([0xdead_beef, 7, 0, 42]).unwrap();

        for _ in 0..1000 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_from_entropy_distinct() {
        let rng1 = Xoshiro128StarStar::from_entropy().unwrap();
        let rng2 = Xoshiro128StarStar::from_entropy().unwrap();
        assert_ne!(rng1.state(), rng2.state());
        assert!(rng1.check_invariants().is_ok());
    }

    #[test]
    fn test_entropy_retries_all_zero_draw() {
        let mut source = ZerosThenOnes { zeros: 2, draws: 0 };
        let rng = Xoshiro128StarStar::from_entropy_source(&mut source, SeedConfig::default())
            .unwrap();
        assert_eq!(source.draws, 3);
        assert_eq!(rng.state(), [0x0101_0101; 4]);
    }

    #[test]
    fn test_entropy_all_zero_draws_reach_observer() {
        let collector = Arc::new(CollectingObserver::new());
        let mut source = ZerosThenOnes { zeros: 2, draws: 0 };
        let rng = Xoshiro128StarStar::from_entropy_source_observed(
            &mut source,
            SeedConfig::default(),
            Some(collector.clone()),
        )
        .unwrap();

        assert_eq!(collector.len(), 2);
        assert_violation!(collector, ViolationKind::Entropy);
        assert!(collector.has_severity(ViolationSeverity::Warning));
        let first = &collector.violations()[0];
        assert_eq!(first.context.get("attempt"), Some(&"1".to_owned()));
        assert_eq!(first.context.get("max_attempts"), Some(&"8".to_owned()));

        // The seeded generator keeps the observer.
        assert!(rng.violation_observer().is_some());
    }

    #[test]
    fn test_entropy_exhaustion_reports_every_discarded_draw() {
        let collector = Arc::new(CollectingObserver::new());
        let mut source = Zeros { draws: 0 };
        let err = Xoshiro128StarStar::from_entropy_source_observed(
            &mut source,
            SeedConfig { max_attempts: 3 },
            Some(collector.clone()),
        )
        .unwrap_err();

        assert_eq!(err, RngError::SeedAttemptsExhausted { attempts: 3 });
        assert_eq!(collector.len(), 3);
    }

    #[test]
    fn test_entropy_gives_up_after_max_attempts() {
        let mut source = Zeros { draws: 0 };
        let err = Xoshiro128StarStar::from_entropy_source(&mut source, SeedConfig::strict())
            .unwrap_err();
        assert_eq!(err, RngError::SeedAttemptsExhausted { attempts: 1 });
        assert_eq!(source.draws, 1);

        let mut source = Zeros { draws: 0 };
        let config = SeedConfig { max_attempts: 5 };
        let err = Xoshiro128StarStar::from_entropy_source(&mut source, config).unwrap_err();
        assert_eq!(err, RngError::SeedAttemptsExhausted { attempts: 5 });
        assert_eq!(source.draws, 5);
    }

    #[test]
    fn test_entropy_failure_propagates() {
        let err = Xoshiro128StarStar::from_entropy_source(&mut Broken, SeedConfig::default())
            .unwrap_err();
        assert!(matches!(err, RngError::EntropyUnavailable { .. }));
    }

    #[test]
    fn test_invalid_config_checked_before_drawing() {
        let mut source = Zeros { draws: 0 };
        let err = Xoshiro128StarStar::from_entropy_source(&mut source, SeedConfig { max_attempts: 0 })
            .unwrap_err();
        assert!(matches!(err, RngError::InvalidConfig { .. }));
        assert_eq!(source.draws, 0);
    }

    #[test]
    fn test_bounded_zero_limit_returns_zero_without_drawing() {
        let mut rng = Xoshiro128StarStar::from_state([1, 2, 3, 4]).unwrap();
        let before = rng.state();
        assert_eq!(rng.bounded(0), 0);
        assert_eq!(rng.state(), before);
        assert_eq!(rng.try_bounded(0), Err(RngError::ZeroLimit));
        assert_eq!(rng.state(), before);
    }

    #[test]
    fn test_bounded_zero_limit_reports_configuration_violation() {
        let collector = Arc::new(CollectingObserver::new());
        let mut rng = Xoshiro128StarStar::from_state([1, 2, 3, 4])
            .unwrap()
            .with_observer(collector.clone());

        assert!(rng.bounded(1000) < 1000);
        assert_no_violations!(collector);

        assert_eq!(rng.bounded(0), 0);
        assert_violation!(collector, ViolationKind::Configuration);
        assert!(collector.has_severity(ViolationSeverity::Error));
        assert_eq!(collector.len(), 1);

        // The checked variant returns an error and reports nothing.
        assert_eq!(rng.try_bounded(0), Err(RngError::ZeroLimit));
        assert_eq!(collector.len(), 1);
    }

    #[test]
    fn test_gen_range_empty_reports_configuration_violation() {
        let collector = Arc::new(CollectingObserver::new());
        let mut rng = Xoshiro128StarStar::from_state([42, 0, 0, 0])
            .unwrap()
            .with_observer(collector.clone());

        assert_eq!(rng.gen_range(9..9), 9);
        assert_violation!(collector, ViolationKind::Configuration);
        assert!(collector.violations()[0].message.contains("[9..9)"));
    }

    #[test]
    fn test_clone_shares_observer() {
        let collector = Arc::new(CollectingObserver::new());
        let rng = Xoshiro128StarStar::from_state([1, 2, 3, 4])
            .unwrap()
            .with_observer(collector.clone());
        let mut fork = rng.clone();

        let _ = fork.bounded(0);
        assert_eq!(collector.len(), 1);
        assert_eq!(fork, rng);
    }

    #[test]
    fn test_observer_is_not_attached_by_default() {
        let rng = Xoshiro128StarStar::from_state([1, 2, 3, 4]).unwrap();
        assert!(rng.violation_observer().is_none());
        assert!(format!("{rng:?}").contains("has_violation_observer: false"));

        let rng = rng.with_observer(Arc::new(CollectingObserver::new()));
        assert!(format!("{rng:?}").contains("has_violation_observer: true"));
    }

    #[test]
    fn test_bounded_one_is_zero() {
        let mut rng = Xoshiro128StarStar::from_state([9, 8, 7, 6]).unwrap();
        for _ in 0..1000 {
            assert_eq!(rng.bounded(1), 0);
        }
    }

    #[test]
    fn test_gen_range() {
        let mut rng = Xoshiro128StarStar::from_state([42, 0, 0, 0]).unwrap();

        for _ in 0..1000 {
            let val = rng.gen_range(10..20);
            assert!(val >= 10);
            assert!(val < 20);
        }
    }

    #[test]
    fn test_gen_range_full_width() {
        let mut rng = Xoshiro128StarStar::from_state([42, 0, 0, 0]).unwrap();
        for _ in 0..1000 {
            assert!(rng.gen_range(0..u32::MAX) < u32::MAX);
        }
    }

    /// Tests that gen_range with an empty range returns start instead of
    /// panicking. A violation is reported via telemetry.
    #[test]
    #[allow(clippy::reversed_empty_ranges)]
    fn test_gen_range_empty_returns_start() {
        let mut rng = Xoshiro128StarStar::from_state([42, 0, 0, 0]).unwrap();

        assert_eq!(rng.gen_range(100..100), 100);
        assert_eq!(rng.gen_range(0..0), 0);
        assert_eq!(rng.gen_range(50..10), 50);
        assert_eq!(rng.gen_range(u32::MAX..u32::MAX), u32::MAX);
    }

    #[test]
    fn test_thread_rng() {
        let val1 = thread_rng().next_u32();
        let val2 = thread_rng().next_u32();
        // 2^-32 chance of a false failure
        assert_ne!(val1, val2, "Two thread_rng draws returned same value");
    }

    #[test]
    fn test_thread_rng_state_advances() {
        let handle = thread_rng();
        let before = handle.state();
        assert_ne!(before, [0; 4]);
        let _ = random_uniform(1000);
        assert_ne!(handle.state(), before);
    }

    #[test]
    fn test_random_uniform_zero_limit_reports_to_thread_observer() {
        std::thread::spawn(|| {
            let collector = Arc::new(CollectingObserver::new());
            thread_rng().set_violation_observer(Some(collector.clone()));

            let _ = random_uniform(10);
            assert_no_violations!(collector);

            assert_eq!(random_uniform(0), 0);
            assert_violation!(collector, ViolationKind::Configuration);
            assert!(thread_rng().violation_observer().is_some());

            thread_rng().set_violation_observer(None);
            let _ = random_uniform(0);
            assert_eq!(collector.len(), 1);
        })
        .join()
        .expect("thread panicked");
    }

    #[test]
    fn test_random_uniform_zero_limit() {
        let before = thread_rng().state();
        assert_eq!(random_uniform(0), 0);
        assert_eq!(try_random_uniform(0), Err(RngError::ZeroLimit));
        assert_eq!(thread_rng().state(), before);
    }
}

// =============================================================================
// Property-Based Tests
// =============================================================================

#[cfg(test)]
#[allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing
)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn nonzero_state() -> impl Strategy<Value = [u32; 4]> {
        any::<[u32; 4]>().prop_filter("all-zero state is illegal", |s| *s != [0; 4])
    }

    proptest! {
        /// Property: Same state always produces identical sequence.
        #[test]
        fn prop_determinism_same_state_same_sequence(state in nonzero_state()) {
            let mut rng1 = Xoshiro128StarStar::from_state(state).unwrap();
            let mut rng2 = Xoshiro128StarStar::from_state(state).unwrap();

            for _ in 0..100 {
                prop_assert_eq!(
                    rng1.next_u32(), rng2.next_u32(),
                    "Same state must produce identical sequences"
                );
            }
        }

        /// Property: The state never becomes all-zero.
        #[test]
        fn prop_state_never_all_zero(state in nonzero_state(), steps in 1usize..2000) {
            let mut rng = Xoshiro128StarStar::from_state(state).unwrap();
            for _ in 0..steps {
                let _ = rng.next_u32();
                prop_assert_ne!(rng.state(), [0; 4]);
            }
            prop_assert!(rng.check_invariants().is_ok());
        }

        /// Property: Sparse states (a single set bit) also escape to a full stream.
        #[test]
        fn prop_single_bit_state_stays_legal(word in 0usize..4, bit in 0u32..32) {
            let mut state = [0u32; 4];
            state[word] = 1 << bit;
            let mut rng = Xoshiro128StarStar::from_state(state).unwrap();
            for _ in 0..256 {
                let _ = rng.next_u32();
                prop_assert_ne!(rng.state(), [0; 4]);
            }
        }

        /// Property: bounded output is always below the limit.
        #[test]
        fn prop_bounded_below_limit(state in nonzero_state(), limit in 1u32..=u32::MAX) {
            let mut rng = Xoshiro128StarStar::from_state(state).unwrap();
            for _ in 0..100 {
                let val = rng.bounded(limit);
                prop_assert!(val < limit, "bounded({}) produced {}", limit, val);
            }
        }

        /// Property: bounded touches nothing but the generator's own state, and
        /// a clone taken beforehand sees the same raw stream.
        #[test]
        fn prop_bounded_consumes_only_generator_state(state in nonzero_state(), limit in 1u32..=u32::MAX) {
            let mut rng = Xoshiro128StarStar::from_state(state).unwrap();
            let mut shadow = rng.clone();

            let value = rng.bounded(limit);

            // Replay the same draws by hand against the shadow copy.
            let mut num = u64::from(shadow.next_u32()) * u64::from(limit);
            let residue = limit.wrapping_neg() % limit;
            while (num as u32) < residue {
                num = u64::from(shadow.next_u32()) * u64::from(limit);
            }
            prop_assert_eq!(value, (num >> 32) as u32);
            prop_assert_eq!(rng.state(), shadow.state());
        }

        /// Property: gen_range output is always within the specified range.
        #[test]
        fn prop_gen_range_within_bounds(
            state in nonzero_state(),
            start in 0u32..1000,
            span in 1u32..1000,
        ) {
            let end = start + span;
            let mut rng = Xoshiro128StarStar::from_state(state).unwrap();

            for _ in 0..100 {
                let val = rng.gen_range(start..end);
                prop_assert!(val >= start, "gen_range output {} below start {}", val, start);
                prop_assert!(val < end, "gen_range output {} >= end {}", val, end);
            }
        }

        /// Property: Clone produces identical RNG that generates same sequence.
        #[test]
        fn prop_clone_produces_identical_sequence(state in nonzero_state(), advance in 0usize..100) {
            let mut rng1 = Xoshiro128StarStar::from_state(state).unwrap();

            for _ in 0..advance {
                let _ = rng1.next_u32();
            }

            let mut rng2 = rng1.clone();

            for _ in 0..50 {
                prop_assert_eq!(
                    rng1.next_u32(), rng2.next_u32(),
                    "Cloned RNG must produce identical sequence"
                );
            }
        }
    }
}
