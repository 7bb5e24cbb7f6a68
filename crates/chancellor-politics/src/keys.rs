//! Stable hashing for reproducible per-member randomness.
//!
//! Stance jitter must not come from a live RNG: a preview recomputation
//! would otherwise shift gameplay-affecting scores. Instead every roll is
//! a pure function of `(seed, member, turn)`.

/// `SplitMix64` finaliser.
const fn mix(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Hash a sequence of words into one.
pub fn stable_hash(parts: &[u64]) -> u64 {
    parts.iter().fold(0x9E37_79B9_7F4A_7C15, |acc, part| {
        mix(acc.wrapping_add(0x9E37_79B9_7F4A_7C15) ^ *part)
    })
}

/// A value in `[0, 1)` fixed by `(seed, member, turn)`.
#[allow(clippy::cast_precision_loss)]
pub fn stable_unit(seed: u64, member: u32, turn: u32) -> f64 {
    let bits = stable_hash(&[seed, u64::from(member), u64::from(turn)]) >> 11;
    bits as f64 / (1_u64 << 53) as f64
}
