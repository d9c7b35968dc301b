//! A generic numeric type over either backend, with native-style operators.
//!
//! Operators evaluate eagerly and panic on errors, the way native integer
//! arithmetic panics on overflow in debug builds; the `checked_*` methods
//! return the error instead.

mod backend;
mod limits;

use std::cmp::Ordering;
use std::fmt;
use std::iter::{Product, Sum};
use std::ops::{
    Add, AddAssign, BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Div,
    DivAssign, Mul, MulAssign, Neg, Not, Rem, RemAssign, Shl, ShlAssign, Shr, ShrAssign, Sub,
    SubAssign,
};
use std::str::FromStr;

use num_traits::{FromPrimitive, Num, One, ToPrimitive, Zero};

pub use backend::{Backend, FloatBackend, IntegerBackend};
pub use limits::NumericLimits;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::float::{DoubleDouble, QuadDouble};
use crate::int::{
    CheckedI128, CheckedI256, CheckedU128, CheckedU256, Int, UInt, I128, I256, I512, U128, U256,
    U512,
};

pub type Integer = Number<Int>;
pub type Natural = Number<UInt>;
pub type Int128 = Number<I128>;
pub type UInt128 = Number<U128>;
pub type Int256 = Number<I256>;
pub type UInt256 = Number<U256>;
pub type Int512 = Number<I512>;
pub type UInt512 = Number<U512>;
pub type CheckedInt128 = Number<CheckedI128>;
pub type CheckedUInt128 = Number<CheckedU128>;
pub type CheckedInt256 = Number<CheckedI256>;
pub type CheckedUInt256 = Number<CheckedU256>;
pub type Float128 = Number<DoubleDouble>;
pub type Float256 = Number<QuadDouble>;

/// A number held by value in backend `B`.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
pub struct Number<B> {
    backend: B,
}

#[track_caller]
fn raise<T>(result: Result<T>) -> T {
    match result {
        Ok(v) => v,
        Err(err) => panic!("{err}"),
    }
}

impl<B: Backend> Number<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    pub fn from_i128(v: i128) -> Result<Self> {
        B::from_i128(v).map(Self::new)
    }

    pub fn from_u128(v: u128) -> Result<Self> {
        B::from_u128(v).map(Self::new)
    }

    pub fn from_f64(v: f64) -> Result<Self> {
        B::from_f64(v).map(Self::new)
    }

    fn apply(&self, op: impl FnOnce(&mut B) -> Result<()>) -> Result<Self> {
        let mut backend = self.backend.clone();
        op(&mut backend)?;
        Ok(Self::new(backend))
    }

    pub fn checked_add(&self, rhs: &Self) -> Result<Self> {
        self.apply(|b| b.eval_add(&rhs.backend))
    }

    pub fn checked_sub(&self, rhs: &Self) -> Result<Self> {
        self.apply(|b| b.eval_subtract(&rhs.backend))
    }

    pub fn checked_mul(&self, rhs: &Self) -> Result<Self> {
        self.apply(|b| b.eval_multiply(&rhs.backend))
    }

    pub fn checked_div(&self, rhs: &Self) -> Result<Self> {
        self.apply(|b| b.eval_divide(&rhs.backend))
    }

    pub fn checked_neg(&self) -> Result<Self> {
        self.apply(B::eval_negate)
    }

    pub fn checked_abs(&self) -> Result<Self> {
        self.apply(B::eval_abs)
    }

    /// Integer backends round down.
    pub fn checked_sqrt(&self) -> Result<Self> {
        self.apply(B::eval_sqrt)
    }

    #[track_caller]
    pub fn abs(&self) -> Self {
        raise(self.checked_abs())
    }

    #[track_caller]
    pub fn sqrt(&self) -> Self {
        raise(self.checked_sqrt())
    }

    pub fn signum(&self) -> i32 {
        self.backend.eval_sign()
    }

    pub fn is_zero(&self) -> bool {
        self.backend.eval_is_zero()
    }

    pub fn to_f64(&self) -> f64 {
        self.backend.to_f64()
    }

    pub fn to_i128(&self) -> Option<i128> {
        self.backend.to_i128()
    }

    pub fn to_u128(&self) -> Option<u128> {
        self.backend.to_u128()
    }

    pub fn to_string_ctx(&self, ctx: &Context) -> String {
        self.backend.to_string_ctx(ctx)
    }
}

impl<B: IntegerBackend> Number<B> {
    pub fn from_str_radix(s: &str, radix: u32) -> Result<Self> {
        B::parse_radix(s, radix).map(Self::new)
    }

    pub fn checked_rem(&self, rhs: &Self) -> Result<Self> {
        self.apply(|b| b.eval_modulus(&rhs.backend))
    }

    pub fn checked_shl(&self, n: usize) -> Result<Self> {
        self.apply(|b| b.eval_left_shift(n))
    }

    pub fn checked_shr(&self, n: usize) -> Result<Self> {
        self.apply(|b| b.eval_right_shift(n))
    }

    pub fn checked_pow(&self, exp: u64) -> Result<Self> {
        self.apply(|b| b.eval_pow(exp))
    }

    #[track_caller]
    pub fn pow(&self, exp: u64) -> Self {
        raise(self.checked_pow(exp))
    }

    #[track_caller]
    pub fn gcd(&self, rhs: &Self) -> Self {
        raise(self.apply(|b| b.eval_gcd(&rhs.backend)))
    }

    /// Truncated quotient and the remainder with the dividend's sign.
    pub fn divide_qr(&self, rhs: &Self) -> Result<(Self, Self)> {
        let (q, r) = self.backend.divide_qr(&rhs.backend)?;
        Ok((Self::new(q), Self::new(r)))
    }

    pub fn bit_test(&self, index: usize) -> bool {
        self.backend.bit_test(index)
    }

    pub fn set_bit(&mut self, index: usize) -> Result<()> {
        self.backend.bit_set(index)
    }

    pub fn clear_bit(&mut self, index: usize) -> Result<()> {
        self.backend.bit_unset(index)
    }

    pub fn flip_bit(&mut self, index: usize) -> Result<()> {
        self.backend.bit_flip(index)
    }
}

impl<B: FloatBackend> Number<B> {
    fn map(mut self, op: impl FnOnce(&mut B)) -> Self {
        op(&mut self.backend);
        self
    }

    pub fn floor(self) -> Self {
        self.map(B::eval_floor)
    }

    pub fn ceil(self) -> Self {
        self.map(B::eval_ceil)
    }

    pub fn trunc(self) -> Self {
        self.map(B::eval_trunc)
    }

    /// Halfway cases round away from zero.
    pub fn round(self) -> Self {
        self.map(B::eval_round)
    }

    pub fn ldexp(self, e: i32) -> Self {
        self.map(|b| b.eval_ldexp(e))
    }

    /// `self = m * 2^e` with `0.5 <= |m| < 1`.
    pub fn frexp(self) -> (Self, i32) {
        let (m, e) = self.backend.eval_frexp();
        (Self::new(m), e)
    }

    pub fn powi(self, n: i32) -> Self {
        self.map(|b| b.eval_powi(n))
    }

    pub fn is_nan(&self) -> bool {
        self.backend.is_nan()
    }

    pub fn is_infinite(&self) -> bool {
        self.backend.is_infinite()
    }

    pub fn is_finite(&self) -> bool {
        self.backend.is_finite()
    }
}

impl<B: Backend> From<B> for Number<B> {
    fn from(backend: B) -> Self {
        Self::new(backend)
    }
}

macro_rules! impl_binary_op {
    ($bound:ident: $($op:ident $method:ident $op_assign:ident $assign:ident => $eval:ident;)*) => {$(
        impl<B: $bound> $op_assign<&Number<B>> for Number<B> {
            #[track_caller]
            fn $assign(&mut self, rhs: &Number<B>) {
                raise(self.backend.$eval(&rhs.backend));
            }
        }

        impl<B: $bound> $op_assign for Number<B> {
            #[track_caller]
            fn $assign(&mut self, rhs: Number<B>) {
                $op_assign::$assign(self, &rhs);
            }
        }

        impl<B: $bound> $op<&Number<B>> for Number<B> {
            type Output = Number<B>;

            #[track_caller]
            fn $method(mut self, rhs: &Number<B>) -> Number<B> {
                $op_assign::$assign(&mut self, rhs);
                self
            }
        }

        impl<B: $bound> $op for Number<B> {
            type Output = Number<B>;

            #[track_caller]
            fn $method(mut self, rhs: Number<B>) -> Number<B> {
                $op_assign::$assign(&mut self, &rhs);
                self
            }
        }

        impl<B: $bound> $op<&Number<B>> for &Number<B> {
            type Output = Number<B>;

            #[track_caller]
            fn $method(self, rhs: &Number<B>) -> Number<B> {
                $op::$method(self.clone(), rhs)
            }
        }

        impl<B: $bound> $op<Number<B>> for &Number<B> {
            type Output = Number<B>;

            #[track_caller]
            fn $method(self, rhs: Number<B>) -> Number<B> {
                $op::$method(self.clone(), &rhs)
            }
        }
    )*};
}

impl_binary_op! { Backend:
    Add add AddAssign add_assign => eval_add;
    Sub sub SubAssign sub_assign => eval_subtract;
    Mul mul MulAssign mul_assign => eval_multiply;
    Div div DivAssign div_assign => eval_divide;
}

impl_binary_op! { IntegerBackend:
    Rem rem RemAssign rem_assign => eval_modulus;
    BitAnd bitand BitAndAssign bitand_assign => eval_bitwise_and;
    BitOr bitor BitOrAssign bitor_assign => eval_bitwise_or;
    BitXor bitxor BitXorAssign bitxor_assign => eval_bitwise_xor;
}

/// Native right-hand sides, converted into the backend first.
macro_rules! impl_native_op {
    ($bound:ident, $convert:ident, $wide:ty: $($t:ident)*) => {$(
        impl_native_op!(@op $bound, $convert, $wide, $t, Add add AddAssign add_assign);
        impl_native_op!(@op $bound, $convert, $wide, $t, Sub sub SubAssign sub_assign);
        impl_native_op!(@op $bound, $convert, $wide, $t, Mul mul MulAssign mul_assign);
        impl_native_op!(@op $bound, $convert, $wide, $t, Div div DivAssign div_assign);
    )*};
    (@op $bound:ident, $convert:ident, $wide:ty, $t:ty, $op:ident $method:ident $op_assign:ident $assign:ident) => {
        impl<B: $bound> $op_assign<$t> for Number<B> {
            #[track_caller]
            fn $assign(&mut self, rhs: $t) {
                let rhs = raise(Number::<B>::$convert(<$wide>::from(rhs)));
                $op_assign::$assign(self, &rhs);
            }
        }

        impl<B: $bound> $op<$t> for Number<B> {
            type Output = Number<B>;

            #[track_caller]
            fn $method(mut self, rhs: $t) -> Number<B> {
                $op_assign::$assign(&mut self, rhs);
                self
            }
        }

        impl<B: $bound> $op<$t> for &Number<B> {
            type Output = Number<B>;

            #[track_caller]
            fn $method(self, rhs: $t) -> Number<B> {
                $op::$method(self.clone(), rhs)
            }
        }
    };
}

impl_native_op!(Backend, from_i128, i128: i32 i64 u32 u64);
impl_native_op!(FloatBackend, from_f64, f64: f64);

impl<B: IntegerBackend> RemAssign<i64> for Number<B> {
    #[track_caller]
    fn rem_assign(&mut self, rhs: i64) {
        let rhs = raise(Number::<B>::from_i128(i128::from(rhs)));
        *self %= &rhs;
    }
}

impl<B: IntegerBackend> Rem<i64> for Number<B> {
    type Output = Number<B>;

    #[track_caller]
    fn rem(mut self, rhs: i64) -> Number<B> {
        self %= rhs;
        self
    }
}

macro_rules! impl_shift {
    ($($op:ident $method:ident $op_assign:ident $assign:ident => $eval:ident;)*) => {$(
        impl<B: IntegerBackend> $op_assign<usize> for Number<B> {
            #[track_caller]
            fn $assign(&mut self, n: usize) {
                raise(self.backend.$eval(n));
            }
        }

        impl<B: IntegerBackend> $op<usize> for Number<B> {
            type Output = Number<B>;

            #[track_caller]
            fn $method(mut self, n: usize) -> Number<B> {
                $op_assign::$assign(&mut self, n);
                self
            }
        }

        impl<B: IntegerBackend> $op<usize> for &Number<B> {
            type Output = Number<B>;

            #[track_caller]
            fn $method(self, n: usize) -> Number<B> {
                $op::$method(self.clone(), n)
            }
        }
    )*};
}

impl_shift! {
    Shl shl ShlAssign shl_assign => eval_left_shift;
    Shr shr ShrAssign shr_assign => eval_right_shift;
}

impl<B: Backend> Neg for Number<B> {
    type Output = Number<B>;

    #[track_caller]
    fn neg(mut self) -> Number<B> {
        raise(self.backend.eval_negate());
        self
    }
}

impl<B: Backend> Neg for &Number<B> {
    type Output = Number<B>;

    #[track_caller]
    fn neg(self) -> Number<B> {
        -self.clone()
    }
}

impl<B: IntegerBackend> Not for Number<B> {
    type Output = Number<B>;

    #[track_caller]
    fn not(mut self) -> Number<B> {
        raise(self.backend.eval_complement());
        self
    }
}

impl<B: IntegerBackend> Not for &Number<B> {
    type Output = Number<B>;

    #[track_caller]
    fn not(self) -> Number<B> {
        !self.clone()
    }
}

impl<B: Backend> Sum for Number<B> {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::new(B::zero()), |acc, x| acc + x)
    }
}

impl<B: Backend> Product for Number<B> {
    fn product<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::new(B::one()), |acc, x| acc * x)
    }
}

impl<B: Backend + PartialEq> PartialOrd for Number<B> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.backend.eval_compare(&other.backend)
    }
}

impl<B: IntegerBackend> Ord for Number<B> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.backend.cmp(&other.backend)
    }
}

macro_rules! impl_native_cmp {
    ($($t:ident)*) => {$(
        impl<B: Backend> PartialEq<$t> for Number<B> {
            fn eq(&self, other: &$t) -> bool {
                self.backend.eval_compare_native(i128::from(*other)) == Some(Ordering::Equal)
            }
        }

        impl<B: Backend> PartialOrd<$t> for Number<B> {
            fn partial_cmp(&self, other: &$t) -> Option<Ordering> {
                self.backend.eval_compare_native(i128::from(*other))
            }
        }
    )*};
}

impl_native_cmp!(i32 i64 u32 u64 i128);

impl<B: FloatBackend> PartialEq<f64> for Number<B> {
    fn eq(&self, other: &f64) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl<B: FloatBackend> PartialOrd<f64> for Number<B> {
    fn partial_cmp(&self, other: &f64) -> Option<Ordering> {
        let other = B::from_f64(*other).ok()?;
        self.backend.eval_compare(&other)
    }
}

impl<B: Backend> fmt::Display for Number<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.backend, f)
    }
}

impl<B: Backend> FromStr for Number<B> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        B::parse(s).map(Self::new)
    }
}

impl<B: Backend> Zero for Number<B> {
    fn zero() -> Self {
        Self::new(B::zero())
    }

    fn is_zero(&self) -> bool {
        self.backend.eval_is_zero()
    }
}

impl<B: Backend> One for Number<B> {
    fn one() -> Self {
        Self::new(B::one())
    }
}

impl<B: IntegerBackend> Num for Number<B> {
    type FromStrRadixErr = Error;

    fn from_str_radix(s: &str, radix: u32) -> Result<Self> {
        Number::from_str_radix(s, radix)
    }
}

impl<B: Backend> ToPrimitive for Number<B> {
    fn to_i64(&self) -> Option<i64> {
        self.backend.to_i128().and_then(|v| i64::try_from(v).ok())
    }

    fn to_u64(&self) -> Option<u64> {
        self.backend.to_u128().and_then(|v| u64::try_from(v).ok())
    }

    fn to_i128(&self) -> Option<i128> {
        self.backend.to_i128()
    }

    fn to_u128(&self) -> Option<u128> {
        self.backend.to_u128()
    }

    fn to_f64(&self) -> Option<f64> {
        Some(self.backend.to_f64())
    }
}

impl<B: Backend> FromPrimitive for Number<B> {
    fn from_i64(n: i64) -> Option<Self> {
        Number::from_i128(i128::from(n)).ok()
    }

    fn from_u64(n: u64) -> Option<Self> {
        Number::from_u128(u128::from(n)).ok()
    }

    fn from_i128(n: i128) -> Option<Self> {
        Number::from_i128(n).ok()
    }

    fn from_u128(n: u128) -> Option<Self> {
        Number::from_u128(n).ok()
    }

    fn from_f64(n: f64) -> Option<Self> {
        Number::from_f64(n).ok()
    }
}

impl<B: Backend + NumericLimits> NumericLimits for Number<B> {
    const IS_SIGNED: bool = B::IS_SIGNED;
    const IS_INTEGER: bool = B::IS_INTEGER;
    const IS_EXACT: bool = B::IS_EXACT;
    const IS_BOUNDED: bool = B::IS_BOUNDED;
    const IS_MODULO: bool = B::IS_MODULO;
    const HAS_INFINITY: bool = B::HAS_INFINITY;
    const HAS_QUIET_NAN: bool = B::HAS_QUIET_NAN;
    const RADIX: u32 = B::RADIX;
    const DIGITS: u32 = B::DIGITS;
    const DIGITS10: u32 = B::DIGITS10;
    const MAX_DIGITS10: u32 = B::MAX_DIGITS10;

    fn max_value() -> Option<Self> {
        B::max_value().map(Self::new)
    }

    fn min_value() -> Option<Self> {
        B::min_value().map(Self::new)
    }

    fn epsilon() -> Self {
        Self::new(B::epsilon())
    }

    fn infinity() -> Option<Self> {
        B::infinity().map(Self::new)
    }

    fn quiet_nan() -> Option<Self> {
        B::quiet_nan().map(Self::new)
    }

    fn min_positive() -> Self {
        Self::new(B::min_positive())
    }
}
