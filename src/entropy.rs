//! Seed material for generators.
//!
//! [`OsEntropy`] is the production source: it asks the operating system for
//! cryptographically strong bytes through the `getrandom` crate (Linux
//! `getrandom(2)`, macOS `getentropy`, Windows `BCryptGenRandom`, the Web
//! Crypto API on wasm). The [`EntropySource`] trait exists so seeding logic can
//! be driven by a scripted source in tests.

use crate::{RngError, RngResult};

/// Number of bytes in one seed draw: the full 128-bit xoshiro128** state.
pub const SEED_BYTES: usize = 16;

/// A source of seed bytes.
pub trait EntropySource {
    /// Fills `dest` completely.
    ///
    /// A source that cannot produce every requested byte must return
    /// [`RngError::EntropyUnavailable`] rather than a partially filled buffer.
    fn fill(&mut self, dest: &mut [u8]) -> RngResult<()>;
}

/// Operating-system entropy via `getrandom`.
///
/// This is a zero-sized handle; every call goes straight to the platform.
/// The call may block until the kernel entropy pool is initialized, which only
/// matters very early in boot.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEntropy;

impl OsEntropy {
    /// Creates a new OS entropy handle.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl EntropySource for OsEntropy {
    fn fill(&mut self, dest: &mut [u8]) -> RngResult<()> {
        getrandom::getrandom(dest).map_err(|err| RngError::EntropyUnavailable {
            context: format!("getrandom failed for {} bytes: {err}", dest.len()),
        })
    }
}

impl<S: EntropySource + ?Sized> EntropySource for &mut S {
    fn fill(&mut self, dest: &mut [u8]) -> RngResult<()> {
        (**self).fill(dest)
    }
}

/// Draws one seed's worth of bytes and decodes them as four little-endian words.
pub(crate) fn draw_state<S: EntropySource + ?Sized>(source: &mut S) -> RngResult<[u32; 4]> {
    let mut bytes = [0u8; SEED_BYTES];
    source.fill(&mut bytes)?;

    let mut state = [0u32; 4];
    for (word, chunk) in state.iter_mut().zip(bytes.chunks_exact(4)) {
        *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    Ok(state)
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

    struct Counting {
        next: u8,
    }

    impl EntropySource for Counting {
        fn fill(&mut self, dest: &mut [u8]) -> RngResult<()> {
            for byte in dest {
                *byte = self.next;
                self.next = self.next.wrapping_add(1);
            }
            Ok(())
        }
    }

    #[test]
    fn test_os_entropy_fills_seed() {
        let mut bytes = [0u8; SEED_BYTES];
        OsEntropy::new().fill(&mut bytes).unwrap();
        // 2^-128 chance of a false failure
        assert_ne!(bytes, [0u8; SEED_BYTES]);
    }

    #[test]
    fn test_os_entropy_draws_differ() {
        let a = draw_state(&mut OsEntropy).unwrap();
        let b = draw_state(&mut OsEntropy).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_draw_state_little_endian() {
        let mut source = Counting { next: 0 };
        let state = draw_state(&mut source).unwrap();
        assert_eq!(state, [0x03020100, 0x07060504, 0x0b0a0908, 0x0f0e0d0c]);
    }

    #[test]
    fn test_draw_state_through_mut_ref() {
        let mut source = Counting { next: 16 };
        let by_ref: &mut dyn EntropySource = &mut source;
        let state = draw_state(by_ref).unwrap();
        assert_eq!(state[0], 0x13121110);
    }
}
