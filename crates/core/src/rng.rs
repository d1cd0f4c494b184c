//! RNG module - linear congruential hash and range scaler
//!
//! A pure function pair: call `hash` repeatedly (feeding each output back in
//! as the next seed) to generate the sequence of hashes, and `scale` to map a
//! hash into the shape-selection range.

/// LCG modulus (2^31)
pub const MODULUS: i64 = 1 << 31;
/// LCG multiplier (GCC's constant)
pub const MULTIPLIER: i64 = 1_103_515_245;
/// LCG increment
pub const INCREMENT: i64 = 12_345;

/// One LCG step: `(a * seed + c) mod m`.
///
/// Wrapping arithmetic plus a Euclidean remainder keep this total over every
/// `i64` seed; the result is always in `[0, 2^31)`.
pub fn hash(seed: i64) -> i64 {
    MULTIPLIER
        .wrapping_mul(seed)
        .wrapping_add(INCREMENT)
        .rem_euclid(MODULUS)
}

/// Scale a hash into the shape-selection range: `7 * hash / (m - 1)`.
///
/// The modulus boundary maps to exactly 7.0; the block catalog's fallback
/// branch absorbs that index.
pub fn scale(hash: i64) -> f64 {
    7.0 * hash as f64 / (MODULUS - 1) as f64
}

/// Sample the decoupled randomness channel at timer tick `elapsed`.
///
/// This channel ticks on its own timer, independent of gameplay ticks, so the
/// next block's shape stays unpredictable relative to player action timing.
pub fn channel_sample(elapsed: i64) -> f64 {
    scale(hash(elapsed.wrapping_mul(MULTIPLIER).wrapping_add(21)))
}
