//! 32-bit integer mixing functions.
//!
//! Two stable, pure mixers for turning small integer keys into well-spread
//! hash values:
//!
//! - [`mix1`]: Knuth's multiplicative hash (golden-ratio multiplier).
//! - [`mix2`]: the MurmurHash3 `fmix32` finalizer, full avalanche.
//!
//! Both are `const fn`, so tables of hashed keys can be built at compile
//! time. Outputs are part of the public contract and never change.
//!
//! ```
//! assert_eq!(tidal_hash::mix1(0xCAFE_BABE), 0x2334_EB5E);
//! assert_eq!(tidal_hash::mix2(0xCAFE_BABE), 0x79FF_04E8);
//! ```

#![no_std]

/// Knuth's multiplicative constant, `floor(2^32 / phi)`.
pub const KNUTH_MULT: u32 = 2_654_435_761;

/// First `fmix32` multiplier.
pub const FMIX_MULT_1: u32 = 0x85EB_CA6B;

/// Second `fmix32` multiplier.
pub const FMIX_MULT_2: u32 = 0xC2B2_AE35;

/// Knuth multiplicative mix.
///
/// Cheap, but only the high bits are well distributed. Prefer [`mix2`] when
/// the low bits are used directly (e.g. masking into a power-of-two table).
#[inline]
#[must_use]
pub const fn mix1(key: u32) -> u32 {
    key.wrapping_mul(KNUTH_MULT)
}

/// MurmurHash3 32-bit finalizer.
///
/// Zero maps to zero.
#[inline]
#[must_use]
pub const fn mix2(mut key: u32) -> u32 {
    key ^= key >> 16;
    key = key.wrapping_mul(FMIX_MULT_1);
    key ^= key >> 13;
    key = key.wrapping_mul(FMIX_MULT_2);
    key ^= key >> 16;
    key
}
