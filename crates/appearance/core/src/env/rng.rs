//! Deterministic randomness for the `randomize` action.
//!
//! The client predicts the outcome of a randomize action before the server
//! commits it, so both must draw the same numbers. Every draw is therefore a
//! pure function of a seed derived from the action's seed string.

/// RNG oracle. Implementations must return the same value for the same seed.
pub trait RngOracle: Send + Sync {
    fn next_u32(&self, seed: u64) -> u32;

    /// Uniform-ish index in `0..len`. `len` must be non-zero.
    fn index(&self, seed: u64, len: usize) -> usize {
        (self.next_u32(seed) as usize) % len
    }

    /// Value in `[min, max]` inclusive.
    fn range(&self, seed: u64, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        let range = max - min + 1;
        min + (self.next_u32(seed) % range)
    }
}

/// PCG-XSH-RR: 64-bit LCG state, 32-bit permuted output.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }
}

/// Derives the seed for one draw of a randomize action.
///
/// `seed` is the action's seed string, `character` the randomized character
/// and `draw` distinguishes independent draws within the same action.
pub fn compute_seed(seed: &str, character: &str, draw: u32) -> u64 {
    // FNV-1a over the strings, then the SplitMix-style avalanche
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in seed.bytes().chain([0xff]).chain(character.bytes()) {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }

    hash ^= u64::from(draw).wrapping_mul(0x9e3779b97f4a7c15);

    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}
