//! Q8.24 fixed-point values as carried on the escape-time core's data ports.
//!
//! A [`Fixed`] is a 32-bit signed word with [`FRAC_BITS`] fractional bits.
//! Encoding from `f64` uses round-to-nearest (ties away from zero); values
//! whose rounded encoding does not fit the word are rejected with a
//! [`RangeError`] rather than wrapped.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of fractional bits in the wire format.
pub const FRAC_BITS: u32 = 24;

/// Scale factor between real values and raw words (`2^24`).
pub const SCALE: f64 = (1u64 << FRAC_BITS) as f64;

/// Width of the encoded word in bits.
pub const WORD_BITS: u32 = 32;

/// Weight of one least-significant bit (`2^-24`).
pub const LSB: f64 = 1.0 / SCALE;

/// Smallest representable real value (`-128.0`).
pub const MIN_VALUE: f64 = i32::MIN as f64 / SCALE;

/// Largest representable real value (`128.0 - 2^-24`).
pub const MAX_VALUE: f64 = i32::MAX as f64 / SCALE;

/// Error returned when a real value cannot be encoded as Q8.24.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("value {value} is outside the Q8.24 range [-128, 128)")]
pub struct RangeError {
    /// The value that failed to encode.
    pub value: f64,
}

/// A signed Q8.24 fixed-point value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Fixed(i32);

impl Fixed {
    /// The value zero.
    pub const ZERO: Fixed = Fixed(0);

    /// Encodes a real value, rounding to the nearest representable word.
    pub fn encode(value: f64) -> Result<Self, RangeError> {
        if !value.is_finite() {
            return Err(RangeError { value });
        }
        let scaled = (value * SCALE).round();
        if scaled < i32::MIN as f64 || scaled > i32::MAX as f64 {
            return Err(RangeError { value });
        }
        Ok(Self(scaled as i32))
    }

    /// Decodes back to a real value. Exact: every Q8.24 word is an `f64`.
    pub fn decode(self) -> f64 {
        self.0 as f64 / SCALE
    }

    /// Creates a value from its raw signed word.
    pub fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Returns the raw signed word.
    pub fn raw(self) -> i32 {
        self.0
    }

    /// Returns the two's-complement bit pattern as driven onto a port.
    pub fn to_bits(self) -> u32 {
        self.0 as u32
    }

    /// Reinterprets a 32-bit port value as a signed Q8.24 word.
    pub fn from_bits(bits: u32) -> Self {
        Self(bits as i32)
    }

    /// Wrapping addition, as a 32-bit adder would compute it.
    pub fn wrapping_add(self, rhs: Self) -> Self {
        Self(self.0.wrapping_add(rhs.0))
    }

    /// Wrapping subtraction.
    pub fn wrapping_sub(self, rhs: Self) -> Self {
        Self(self.0.wrapping_sub(rhs.0))
    }

    /// Q8.24 multiply: full 64-bit product, arithmetic shift right by
    /// [`FRAC_BITS`], truncated to 32 bits.
    pub fn mul(self, rhs: Self) -> Self {
        Self((self.wide_mul(rhs) >> FRAC_BITS) as i32)
    }

    /// Full-precision product in Q16.48, before renormalization.
    pub fn wide_mul(self, rhs: Self) -> i64 {
        self.0 as i64 * rhs.0 as i64
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:08x})", self.decode(), self.to_bits())
    }
}

/// Encodes a real value as Q8.24. See [`Fixed::encode`].
pub fn encode(value: f64) -> Result<Fixed, RangeError> {
    Fixed::encode(value)
}

/// Decodes a Q8.24 value. See [`Fixed::decode`].
pub fn decode(value: Fixed) -> f64 {
    value.decode()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_one() {
        assert_eq!(Fixed::encode(1.0).unwrap().raw(), 1 << 24);
    }

    #[test]
    fn encode_negative_two() {
        assert_eq!(Fixed::encode(-2.0).unwrap().raw(), -(2 << 24));
    }

    #[test]
    fn encode_rounds_to_nearest() {
        // 0.6 LSB rounds up, 0.4 LSB rounds down.
        assert_eq!(Fixed::encode(0.6 * LSB).unwrap().raw(), 1);
        assert_eq!(Fixed::encode(0.4 * LSB).unwrap().raw(), 0);
    }

    #[test]
    fn negative_values_are_not_biased_toward_zero() {
        // A truncating cast would give -1 here.
        assert_eq!(Fixed::encode(-1.6 * LSB).unwrap().raw(), -2);
        assert_eq!(Fixed::encode(-0.6 * LSB).unwrap().raw(), -1);
    }

    #[test]
    fn ties_round_away_from_zero() {
        assert_eq!(Fixed::encode(0.5 * LSB).unwrap().raw(), 1);
        assert_eq!(Fixed::encode(-0.5 * LSB).unwrap().raw(), -1);
    }

    #[test]
    fn decode_is_exact() {
        assert_eq!(Fixed::from_raw(1 << 23).decode(), 0.5);
        assert_eq!(Fixed::from_raw(-(3 << 22)).decode(), -0.75);
    }

    #[test]
    fn round_trip_within_one_lsb() {
        let mut v = -127.9;
        while v < 127.9 {
            let back = Fixed::encode(v).unwrap().decode();
            assert!((back - v).abs() < LSB, "v = {v}, back = {back}");
            v += 0.013_7;
        }
    }

    #[test]
    fn round_trip_fractal_domain() {
        for v in [-2.0, -1.5, -0.8, -0.5, 0.0, 0.156, 0.333_333_333, 1.0, 1.5, 2.0] {
            let back = decode(encode(v).unwrap());
            assert!((back - v).abs() < LSB);
        }
    }

    #[test]
    fn range_limits() {
        assert_eq!(Fixed::encode(MIN_VALUE).unwrap().raw(), i32::MIN);
        assert_eq!(Fixed::encode(MAX_VALUE).unwrap().raw(), i32::MAX);
    }

    #[test]
    fn overflow_is_range_error() {
        assert_eq!(Fixed::encode(128.0), Err(RangeError { value: 128.0 }));
        assert!(Fixed::encode(-128.1).is_err());
        assert!(Fixed::encode(1.0e9).is_err());
    }

    #[test]
    fn non_finite_is_range_error() {
        assert!(Fixed::encode(f64::NAN).is_err());
        assert!(Fixed::encode(f64::INFINITY).is_err());
        assert!(Fixed::encode(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn range_error_display() {
        let e = RangeError { value: 200.0 };
        assert!(e.to_string().starts_with("value 200 is outside the Q8.24 range"));
    }

    #[test]
    fn bits_round_trip() {
        let f = Fixed::encode(-0.8).unwrap();
        assert_eq!(Fixed::from_bits(f.to_bits()), f);
        assert_eq!(Fixed::from_raw(-1).to_bits(), 0xffff_ffff);
    }

    #[test]
    fn multiply() {
        let a = Fixed::encode(1.5).unwrap();
        let b = Fixed::encode(-2.0).unwrap();
        assert_eq!(a.mul(b).decode(), -3.0);
        assert_eq!(a.mul(a).decode(), 2.25);
    }

    #[test]
    fn multiply_truncates_toward_negative_infinity() {
        // -1 LSB * 0.5 = -0.5 LSB, arithmetic shift floors to -1 LSB.
        let tiny = Fixed::from_raw(-1);
        let half = Fixed::encode(0.5).unwrap();
        assert_eq!(tiny.mul(half).raw(), -1);
    }

    #[test]
    fn add_sub() {
        let a = Fixed::encode(0.25).unwrap();
        let b = Fixed::encode(0.5).unwrap();
        assert_eq!(a.wrapping_add(b).decode(), 0.75);
        assert_eq!(a.wrapping_sub(b).decode(), -0.25);
    }

    #[test]
    fn display_shows_value_and_word() {
        assert_eq!(Fixed::encode(1.0).unwrap().to_string(), "1 (0x01000000)");
    }

    #[test]
    fn serde_roundtrip() {
        let f = Fixed::encode(0.156).unwrap();
        let json = serde_json::to_string(&f).unwrap();
        let back: Fixed = serde_json::from_str(&json).unwrap();
        assert_eq!(f, back);
    }
}
