//! Compile-time numeric properties, the counterpart of the native types'
//! `MAX`, `EPSILON`, `DIGITS` and friends.

use crate::float::{DoubleFloat, FloatLimb, QuadFloat};
use crate::int::BigInt;

/// `floor(bits * log10(2))`.
const fn bits_to_digits10(bits: u32) -> u32 {
    (bits as u64 * 30_103 / 100_000) as u32
}

pub trait NumericLimits: Sized {
    const IS_SIGNED: bool;
    const IS_INTEGER: bool;
    const IS_EXACT: bool;
    const IS_BOUNDED: bool;
    /// Overflow wraps around.
    const IS_MODULO: bool;
    const HAS_INFINITY: bool;
    const HAS_QUIET_NAN: bool;
    const RADIX: u32;
    /// Radix digits representable without change; `u32::MAX` when unbounded.
    const DIGITS: u32;
    /// Decimal digits representable without change; `u32::MAX` when
    /// unbounded.
    const DIGITS10: u32;
    /// Decimal digits needed to round-trip any value; 0 for integers.
    const MAX_DIGITS10: u32;

    /// `None` for unbounded types.
    fn max_value() -> Option<Self>;

    /// `None` for unbounded types.
    fn min_value() -> Option<Self>;

    /// Difference between one and the next value above it; zero for
    /// integers.
    fn epsilon() -> Self;

    fn infinity() -> Option<Self>;

    fn quiet_nan() -> Option<Self>;

    /// Smallest positive normal value.
    fn min_positive() -> Self;
}

impl<const BITS: usize, const SIGNED: bool, const CHECKED: bool> NumericLimits
    for BigInt<BITS, SIGNED, CHECKED>
{
    const IS_SIGNED: bool = SIGNED;
    const IS_INTEGER: bool = true;
    const IS_EXACT: bool = true;
    const IS_BOUNDED: bool = BITS != 0;
    const IS_MODULO: bool = BITS != 0 && !CHECKED;
    const HAS_INFINITY: bool = false;
    const HAS_QUIET_NAN: bool = false;
    const RADIX: u32 = 2;
    const DIGITS: u32 = if BITS == 0 {
        u32::MAX
    } else {
        (BITS - SIGNED as usize) as u32
    };
    const DIGITS10: u32 = if BITS == 0 {
        u32::MAX
    } else {
        bits_to_digits10(Self::DIGITS)
    };
    const MAX_DIGITS10: u32 = 0;

    fn max_value() -> Option<Self> {
        BigInt::max_value()
    }

    fn min_value() -> Option<Self> {
        BigInt::min_value()
    }

    fn epsilon() -> Self {
        BigInt::zero()
    }

    fn infinity() -> Option<Self> {
        None
    }

    fn quiet_nan() -> Option<Self> {
        None
    }

    fn min_positive() -> Self {
        BigInt::one()
    }
}

macro_rules! impl_float_limits {
    ($($name:ident)*) => {$(
        impl<F: FloatLimb> NumericLimits for $name<F> {
            const IS_SIGNED: bool = true;
            const IS_INTEGER: bool = false;
            const IS_EXACT: bool = false;
            const IS_BOUNDED: bool = true;
            const IS_MODULO: bool = false;
            const HAS_INFINITY: bool = true;
            const HAS_QUIET_NAN: bool = true;
            const RADIX: u32 = 2;
            const DIGITS: u32 = $name::<F>::DIGITS;
            const DIGITS10: u32 = $name::<F>::DIGITS10;
            const MAX_DIGITS10: u32 = $name::<F>::MAX_DIGITS10;

            fn max_value() -> Option<Self> {
                Some($name::max_value())
            }

            fn min_value() -> Option<Self> {
                Some($name::min_value())
            }

            fn epsilon() -> Self {
                $name::epsilon()
            }

            fn infinity() -> Option<Self> {
                Some($name::infinity())
            }

            fn quiet_nan() -> Option<Self> {
                Some($name::nan())
            }

            fn min_positive() -> Self {
                $name::min_positive()
            }
        }
    )*};
}

impl_float_limits!(DoubleFloat QuadFloat);
