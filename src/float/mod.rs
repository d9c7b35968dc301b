//! Double-word and quad-word floating composites built from native floats.
//!
//! A composite holds limbs in decreasing magnitude whose mantissas do not
//! overlap; the value is their exact sum. Non-finite values keep the special
//! value in the leading limb and zeros below.

#[macro_use]
mod composite;
mod double;
pub mod eft;
mod exact;
mod quad;
mod text;

use std::fmt;

use num_traits::Float;

pub use double::{DoubleDouble, DoubleFloat, DoubleSingle};
pub use exact::Dyadic;
pub use quad::{QuadDouble, QuadFloat, QuadSingle};

/// A native binary float usable as a composite limb.
pub trait FloatLimb:
    Float + Default + fmt::Debug + fmt::Display + fmt::LowerExp + Send + Sync + 'static
{
    /// Significand bits including the implicit one.
    const MANTISSA_DIGITS: u32;
    /// `x = m * 2^e` with `0.5 <= m < 1` is normal for `e >= MIN_EXP`.
    const MIN_EXP: i32;
    /// Values at or above `2^MAX_EXP` overflow.
    const MAX_EXP: i32;
    /// `2^ceil(p / 2) + 1`, the Dekker splitting constant.
    const SPLITTER: Self;
    /// Magnitude above which [`eft::split`] rescales to avoid overflow.
    const SPLIT_THRESHOLD: Self;
    const SPLIT_SHIFT: i32;
    const HALF: Self;
    const TWO: Self;

    /// Exact conversion of an integer below `2^MANTISSA_DIGITS`.
    fn from_mantissa(m: u64) -> Self;

    /// `2^e` for `MIN_EXP - 1 <= e < MAX_EXP`.
    fn exp2i(e: i32) -> Self;

    fn to_f64_lossy(self) -> f64;

    fn from_f64_lossy(v: f64) -> Self;

    /// `self * 2^e`, stepping so intermediate scale factors stay normal.
    fn ldexp(self, mut e: i32) -> Self {
        let up = Self::MAX_EXP - 1;
        let down = Self::MIN_EXP - 1;
        let mut x = self;
        while e > up {
            x = x * Self::exp2i(up);
            e -= up;
            if x.is_infinite() {
                return x;
            }
        }
        while e < down {
            x = x * Self::exp2i(down);
            e -= down;
            if x.is_zero() {
                return x;
            }
        }
        x * Self::exp2i(e)
    }

    /// `(m, e)` with `self = m * 2^e` and `0.5 <= |m| < 1`; zero and
    /// non-finite values return `(self, 0)`.
    fn frexp(self) -> (Self, i32) {
        if self.is_zero() || !self.is_finite() {
            return (self, 0);
        }
        let (mantissa, exp, _) = self.integer_decode();
        let e = exp as i32 + (64 - mantissa.leading_zeros()) as i32;
        (self.ldexp(-e), e)
    }
}

macro_rules! impl_float_limb {
    ($t:ty, $bits:ty, $split_shift:expr, $threshold:expr) => {
        impl FloatLimb for $t {
            const MANTISSA_DIGITS: u32 = <$t>::MANTISSA_DIGITS;
            const MIN_EXP: i32 = <$t>::MIN_EXP;
            const MAX_EXP: i32 = <$t>::MAX_EXP;
            const SPLITTER: Self = ((1u64 << <$t>::MANTISSA_DIGITS.div_ceil(2)) + 1) as $t;
            const SPLIT_THRESHOLD: Self = $threshold;
            const SPLIT_SHIFT: i32 = $split_shift;
            const HALF: Self = 0.5;
            const TWO: Self = 2.0;

            fn from_mantissa(m: u64) -> Self {
                m as $t
            }

            fn exp2i(e: i32) -> Self {
                let bias = <$t>::MAX_EXP - 1;
                let shift = <$t>::MANTISSA_DIGITS - 1;
                <$t>::from_bits(((e + bias) as $bits) << shift)
            }

            fn to_f64_lossy(self) -> f64 {
                self as f64
            }

            fn from_f64_lossy(v: f64) -> Self {
                v as $t
            }
        }
    };
}

// Threshold 2^(MAX_EXP - ceil(p/2) - 1).
impl_float_limb!(f64, u64, 28, 6.696_928_794_914_171e299);
impl_float_limb!(f32, u32, 13, 4.153_837_5e34);
