//! Unbiased sampling of `[0, limit)` from a raw 32-bit stream.
//!
//! Uses Daniel Lemire's nearly-divisionless method
//! (<https://arxiv.org/abs/1805.10941>). A raw value `x` is multiplied by
//! `limit` into a 64-bit product that reads as a 32.32 fixed-point number:
//! the high word is a candidate in `[0, limit)`, the low word is the
//! fraction. Candidates are biased only when the fraction falls into the
//! `2^32 mod limit` values that would give some outputs one extra preimage;
//! those draws are rejected and resampled.
//!
//! The comparison `fraction < limit` is a cheap over-estimate of the exact
//! threshold, so the division that computes `2^32 mod limit` only runs on the
//! rare slow path, and at most once per call.

use crate::rng::Rng;
use crate::{RngError, RngResult};

/// Samples uniformly from `[0, limit)`.
///
/// Returns [`RngError::ZeroLimit`] without consuming a raw value when
/// `limit == 0`.
///
/// # Example
///
/// ```
/// use xoshiro_bounded::{bounded::sample_below, Xoshiro128StarStar};
///
/// let mut rng = Xoshiro128StarStar::from_state([1, 2, 3, 4])?;
/// let die = sample_below(&mut rng, 6)?;
/// assert!(die < 6);
/// # Ok::<(), xoshiro_bounded::RngError>(())
/// ```
pub fn sample_below<R: Rng + ?Sized>(rng: &mut R, limit: u32) -> RngResult<u32> {
    if limit == 0 {
        return Err(RngError::ZeroLimit);
    }
    Ok(sample_below_nonzero(rng, limit))
}

/// The sampling loop proper. `limit` must be non-zero.
#[inline]
fn sample_below_nonzero<R: Rng + ?Sized>(rng: &mut R, limit: u32) -> u32 {
    let mut num = widening_mul(rng.next_u32(), limit);
    if fraction(num) < limit {
        // 2^32 mod limit, computed in 32 bits as (2^32 - limit) mod limit.
        let residue = limit.wrapping_neg() % limit;
        while fraction(num) < residue {
            num = widening_mul(rng.next_u32(), limit);
        }
    }
    integer_part(num)
}

#[inline]
fn widening_mul(raw: u32, limit: u32) -> u64 {
    u64::from(raw) * u64::from(limit)
}

#[inline]
fn fraction(num: u64) -> u32 {
    num as u32
}

#[inline]
fn integer_part(num: u64) -> u32 {
    (num >> 32) as u32
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
    use crate::Xoshiro128StarStar;
    use std::collections::VecDeque;

    /// Replays a fixed list of raw values and counts how many were consumed.
    struct Scripted {
        raws: VecDeque<u32>,
        drawn: usize,
    }

    impl Scripted {
        fn new(raws: &[u32]) -> Self {
            Self {
                raws: raws.iter().copied().collect(),
                drawn: 0,
            }
        }
    }

    impl Rng for Scripted {
        fn next_u32(&mut self) -> u32 {
            self.drawn += 1;
            self.raws.pop_front().expect("script exhausted")
        }
    }

    #[test]
    fn test_zero_limit_is_rejected_without_drawing() {
        let mut rng = Scripted::new(&[]);
        assert_eq!(sample_below(&mut rng, 0), Err(RngError::ZeroLimit));
        assert_eq!(rng.drawn, 0);
    }

    #[test]
    fn test_limit_one_always_zero() {
        let mut rng = Scripted::new(&[0, 1, u32::MAX, 0x8000_0000]);
        for _ in 0..4 {
            assert_eq!(sample_below(&mut rng, 1).unwrap(), 0);
        }
        assert_eq!(rng.drawn, 4);
    }

    #[test]
    fn test_fast_path_takes_high_word() {
        // fraction 10 clears the limit, so no residue is computed
        let raw = 0x8000_0001_u32;
        let num = u64::from(raw) * 10;
        assert!((num as u32) >= 10);

        let mut rng = Scripted::new(&[raw]);
        assert_eq!(sample_below(&mut rng, 10).unwrap(), (num >> 32) as u32);
        assert_eq!(rng.drawn, 1);
    }

    #[test]
    fn test_slow_path_rejects_biased_fraction() {
        // limit 3: 2^32 mod 3 = 1, so only fraction 0 is rejected. raw 0 gives
        // fraction 0; raw 5 gives 15.
        let mut rng = Scripted::new(&[0, 5]);
        assert_eq!(sample_below(&mut rng, 3).unwrap(), 0);
        assert_eq!(rng.drawn, 2);
    }

    #[test]
    fn test_slow_path_accepts_fraction_at_or_above_residue() {
        // limit 10: residue 6. raw 0x3333_3334 * 10 has fraction 8, which is
        // below the limit but not below the residue.
        let raw = 0x3333_3334_u32;
        let mut rng = Scripted::new(&[raw]);
        assert_eq!(sample_below(&mut rng, 10).unwrap(), 2);
        assert_eq!(rng.drawn, 1);
    }

    #[test]
    fn test_slow_path_redraws_below_residue() {
        // limit 10: residue 6. raw 0x1999_999A * 10 has fraction 4 and is
        // rejected; raw 0x3333_3334 gives fraction 8 and is kept.
        let first = 0x1999_999A_u32;
        let second = 0x3333_3334_u32;
        assert_eq!((u64::from(first) * 10) as u32, 4);
        assert_eq!((u64::from(second) * 10) as u32, 8);

        let mut rng = Scripted::new(&[first, second]);
        assert_eq!(sample_below(&mut rng, 10).unwrap(), 2);
        assert_eq!(rng.drawn, 2);
    }

    #[test]
    fn test_large_limit_rejection() {
        // limit 2^31 + 1 rejects nearly half of all raws.
        let limit = 0x8000_0001_u32;
        assert_eq!(limit.wrapping_neg() % limit, 0x7fff_ffff);

        // raw 2 -> fraction 2, rejected; raw 1 -> fraction 2^31 + 1, kept.
        let mut rng = Scripted::new(&[2, 1]);
        assert_eq!(sample_below(&mut rng, limit).unwrap(), 0);
        assert_eq!(rng.drawn, 2);
    }

    #[test]
    fn test_max_limit_in_range() {
        let mut rng = Scripted::new(&[u32::MAX]);
        let value = sample_below(&mut rng, u32::MAX).unwrap();
        assert!(value < u32::MAX);
        assert_eq!(value, u32::MAX - 1);
    }

    #[test]
    fn test_regression_sequence() {
        let mut rng = Xoshiro128StarStar::from_state([1, 2, 3, 4]).unwrap();
        let drawn: Vec<u32> = (0..8).map(|_| sample_below(&mut rng, 1000).unwrap()).collect();
        assert_eq!(drawn, [0, 0, 16, 767, 577, 417, 958, 291]);
    }

    #[test]
    fn test_power_of_two_never_rejects() {
        // 2^32 mod 2^k = 0, so the residue is 0 and every raw is accepted.
        let raws: Vec<u32> = (0..64).map(|i| i * 0x0400_0000).collect();
        let mut rng = Scripted::new(&raws);
        for &raw in &raws {
            assert_eq!(sample_below(&mut rng, 16).unwrap(), raw >> 28);
        }
        assert_eq!(rng.drawn, raws.len());
    }
}
