//! Fuzz target for bounded sampling.
//!
//! Drives the generator from arbitrary states through arbitrary sequences of
//! limits and ranges. It verifies:
//!
//! 1. **Range**: `bounded(limit) < limit` for every non-zero limit
//! 2. **Zero limit**: `bounded(0)` returns 0 and `try_bounded(0)` errors
//!    without advancing the state
//! 3. **State legality**: the state never becomes all-zero
//! 4. **Determinism**: a clone taken up front replays the same outputs

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use xoshiro_bounded::{Rng, RngError, Xoshiro128StarStar};

#[derive(Debug, Arbitrary)]
struct BoundedInput {
    state: [u32; 4],
    ops: Vec<Op>,
}

#[derive(Debug, Arbitrary)]
enum Op {
    Raw,
    Bounded(u32),
    TryBounded(u32),
    Range { start: u32, end: u32 },
}

fuzz_target!(|input: BoundedInput| {
    let Ok(mut rng) = Xoshiro128StarStar::from_state(input.state) else {
        assert_eq!(input.state, [0; 4]);
        return;
    };
    let mut replay = rng.clone();

    for op in input.ops.iter().take(1024) {
        let output = match *op {
            Op::Raw => rng.next_u32(),
            Op::Bounded(limit) => {
                let before = rng.state();
                let value = rng.bounded(limit);
                if limit == 0 {
                    assert_eq!(value, 0);
                    assert_eq!(rng.state(), before);
                } else {
                    assert!(value < limit);
                }
                value
            },
            Op::TryBounded(limit) => match rng.try_bounded(limit) {
                Ok(value) => {
                    assert!(value < limit);
                    value
                },
                Err(err) => {
                    assert_eq!(err, RngError::ZeroLimit);
                    assert_eq!(limit, 0);
                    0
                },
            },
            Op::Range { start, end } => {
                let value = rng.gen_range(start..end);
                if start < end {
                    assert!(value >= start && value < end);
                } else {
                    assert_eq!(value, start);
                }
                value
            },
        };

        let replayed = match *op {
            Op::Raw => replay.next_u32(),
            Op::Bounded(limit) => replay.bounded(limit),
            Op::TryBounded(limit) => replay.try_bounded(limit).unwrap_or(0),
            Op::Range { start, end } => replay.gen_range(start..end),
        };
        assert_eq!(output, replayed);
        assert_ne!(rng.state(), [0; 4]);
    }
});
