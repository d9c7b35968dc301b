//! The operations a representation must provide to sit behind [`Number`].
//!
//! [`Number`]: super::Number

use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;

use crate::context::Context;
use crate::error::Result;
use crate::float::{DoubleFloat, FloatLimb, QuadFloat};
use crate::int::BigInt;

/// Arithmetic shared by integer and floating representations. Every `eval_*`
/// method updates `self` in place.
pub trait Backend: Clone + Default + fmt::Debug + fmt::Display + Send + Sync + 'static {
    fn zero() -> Self;

    fn one() -> Self;

    fn from_i128(v: i128) -> Result<Self>;

    fn from_u128(v: u128) -> Result<Self>;

    fn from_f64(v: f64) -> Result<Self>;

    fn eval_add(&mut self, rhs: &Self) -> Result<()>;

    fn eval_subtract(&mut self, rhs: &Self) -> Result<()>;

    fn eval_multiply(&mut self, rhs: &Self) -> Result<()>;

    fn eval_divide(&mut self, rhs: &Self) -> Result<()>;

    fn eval_negate(&mut self) -> Result<()>;

    fn eval_abs(&mut self) -> Result<()>;

    fn eval_sqrt(&mut self) -> Result<()>;

    /// `None` when the values are unordered (NaN).
    fn eval_compare(&self, rhs: &Self) -> Option<Ordering>;

    fn eval_is_zero(&self) -> bool;

    /// -1, 0 or 1; 0 for NaN.
    fn eval_sign(&self) -> i32;

    fn to_f64(&self) -> f64;

    /// Truncated toward zero; `None` when out of range or not finite.
    fn to_i128(&self) -> Option<i128>;

    fn to_u128(&self) -> Option<u128>;

    /// Ordering against a native integer without wrapping it to this width.
    fn eval_compare_native(&self, rhs: i128) -> Option<Ordering>;

    fn to_string_ctx(&self, ctx: &Context) -> String;

    fn parse(s: &str) -> Result<Self>;
}

/// Exact integer representations.
pub trait IntegerBackend: Backend + Eq + Ord + Hash {
    fn eval_modulus(&mut self, rhs: &Self) -> Result<()>;

    fn divide_qr(&self, rhs: &Self) -> Result<(Self, Self)>;

    fn eval_bitwise_and(&mut self, rhs: &Self) -> Result<()>;

    fn eval_bitwise_or(&mut self, rhs: &Self) -> Result<()>;

    fn eval_bitwise_xor(&mut self, rhs: &Self) -> Result<()>;

    fn eval_complement(&mut self) -> Result<()>;

    fn eval_left_shift(&mut self, n: usize) -> Result<()>;

    fn eval_right_shift(&mut self, n: usize) -> Result<()>;

    fn bit_test(&self, index: usize) -> bool;

    fn bit_set(&mut self, index: usize) -> Result<()>;

    fn bit_unset(&mut self, index: usize) -> Result<()>;

    fn bit_flip(&mut self, index: usize) -> Result<()>;

    fn eval_gcd(&mut self, rhs: &Self) -> Result<()>;

    fn eval_pow(&mut self, exp: u64) -> Result<()>;

    fn parse_radix(s: &str, radix: u32) -> Result<Self>;
}

/// Binary floating representations with IEEE special values.
pub trait FloatBackend: Backend + Copy {
    fn eval_floor(&mut self);

    fn eval_ceil(&mut self);

    fn eval_trunc(&mut self);

    fn eval_round(&mut self);

    fn eval_ldexp(&mut self, e: i32);

    fn eval_frexp(&self) -> (Self, i32);

    fn eval_powi(&mut self, n: i32);

    fn is_nan(&self) -> bool;

    fn is_infinite(&self) -> bool;

    fn is_finite(&self) -> bool;
}

impl<const BITS: usize, const SIGNED: bool, const CHECKED: bool> Backend
    for BigInt<BITS, SIGNED, CHECKED>
{
    fn zero() -> Self {
        BigInt::zero()
    }

    fn one() -> Self {
        BigInt::one()
    }

    fn from_i128(v: i128) -> Result<Self> {
        BigInt::from_i128(v)
    }

    fn from_u128(v: u128) -> Result<Self> {
        BigInt::from_u128(v)
    }

    fn from_f64(v: f64) -> Result<Self> {
        BigInt::from_f64(v)
    }

    fn eval_add(&mut self, rhs: &Self) -> Result<()> {
        BigInt::eval_add(self, rhs)
    }

    fn eval_subtract(&mut self, rhs: &Self) -> Result<()> {
        BigInt::eval_subtract(self, rhs)
    }

    fn eval_multiply(&mut self, rhs: &Self) -> Result<()> {
        BigInt::eval_multiply(self, rhs)
    }

    fn eval_divide(&mut self, rhs: &Self) -> Result<()> {
        BigInt::eval_divide(self, rhs)
    }

    fn eval_negate(&mut self) -> Result<()> {
        BigInt::eval_negate(self)
    }

    fn eval_abs(&mut self) -> Result<()> {
        BigInt::eval_abs(self)
    }

    /// Integer square root, rounded down.
    fn eval_sqrt(&mut self) -> Result<()> {
        *self = self.isqrt()?;
        Ok(())
    }

    fn eval_compare(&self, rhs: &Self) -> Option<Ordering> {
        Some(self.compare(rhs))
    }

    fn eval_is_zero(&self) -> bool {
        self.is_zero()
    }

    fn eval_sign(&self) -> i32 {
        self.signum()
    }

    fn to_f64(&self) -> f64 {
        BigInt::to_f64(self)
    }

    fn to_i128(&self) -> Option<i128> {
        BigInt::to_i128(self)
    }

    fn to_u128(&self) -> Option<u128> {
        BigInt::to_u128(self)
    }

    fn eval_compare_native(&self, rhs: i128) -> Option<Ordering> {
        Some(match BigInt::to_i128(self) {
            Some(v) => v.cmp(&rhs),
            None if self.is_negative() => Ordering::Less,
            None => Ordering::Greater,
        })
    }

    fn to_string_ctx(&self, ctx: &Context) -> String {
        BigInt::to_string_ctx(self, ctx)
    }

    fn parse(s: &str) -> Result<Self> {
        s.parse()
    }
}

impl<const BITS: usize, const SIGNED: bool, const CHECKED: bool> IntegerBackend
    for BigInt<BITS, SIGNED, CHECKED>
{
    fn eval_modulus(&mut self, rhs: &Self) -> Result<()> {
        BigInt::eval_modulus(self, rhs)
    }

    fn divide_qr(&self, rhs: &Self) -> Result<(Self, Self)> {
        BigInt::divide_qr(self, rhs)
    }

    fn eval_bitwise_and(&mut self, rhs: &Self) -> Result<()> {
        BigInt::eval_bitwise_and(self, rhs)
    }

    fn eval_bitwise_or(&mut self, rhs: &Self) -> Result<()> {
        BigInt::eval_bitwise_or(self, rhs)
    }

    fn eval_bitwise_xor(&mut self, rhs: &Self) -> Result<()> {
        BigInt::eval_bitwise_xor(self, rhs)
    }

    fn eval_complement(&mut self) -> Result<()> {
        BigInt::eval_complement(self)
    }

    fn eval_left_shift(&mut self, n: usize) -> Result<()> {
        BigInt::eval_left_shift(self, n)
    }

    fn eval_right_shift(&mut self, n: usize) -> Result<()> {
        BigInt::eval_right_shift(self, n)
    }

    fn bit_test(&self, index: usize) -> bool {
        BigInt::bit_test(self, index)
    }

    fn bit_set(&mut self, index: usize) -> Result<()> {
        BigInt::bit_set(self, index)
    }

    fn bit_unset(&mut self, index: usize) -> Result<()> {
        BigInt::bit_unset(self, index)
    }

    fn bit_flip(&mut self, index: usize) -> Result<()> {
        BigInt::bit_flip(self, index)
    }

    fn eval_gcd(&mut self, rhs: &Self) -> Result<()> {
        BigInt::eval_gcd(self, rhs)
    }

    fn eval_pow(&mut self, exp: u64) -> Result<()> {
        BigInt::eval_pow(self, exp)
    }

    fn parse_radix(s: &str, radix: u32) -> Result<Self> {
        BigInt::from_str_radix(s, radix)
    }
}

/// Both composite widths share one implementation; errors never arise, the
/// results carry NaN and infinities instead.
macro_rules! impl_float_backend {
    ($($name:ident)*) => {$(
        impl<F: FloatLimb> Backend for $name<F> {
            fn zero() -> Self {
                $name::zero()
            }

            fn one() -> Self {
                $name::one()
            }

            fn from_i128(v: i128) -> Result<Self> {
                Ok($name::from_i128(v))
            }

            fn from_u128(v: u128) -> Result<Self> {
                Ok($name::from_u128(v))
            }

            fn from_f64(v: f64) -> Result<Self> {
                Ok($name::from_f64(v))
            }

            fn eval_add(&mut self, rhs: &Self) -> Result<()> {
                *self += *rhs;
                Ok(())
            }

            fn eval_subtract(&mut self, rhs: &Self) -> Result<()> {
                *self -= *rhs;
                Ok(())
            }

            fn eval_multiply(&mut self, rhs: &Self) -> Result<()> {
                *self *= *rhs;
                Ok(())
            }

            fn eval_divide(&mut self, rhs: &Self) -> Result<()> {
                *self /= *rhs;
                Ok(())
            }

            fn eval_negate(&mut self) -> Result<()> {
                *self = -*self;
                Ok(())
            }

            fn eval_abs(&mut self) -> Result<()> {
                *self = self.abs();
                Ok(())
            }

            fn eval_sqrt(&mut self) -> Result<()> {
                *self = self.sqrt();
                Ok(())
            }

            fn eval_compare(&self, rhs: &Self) -> Option<Ordering> {
                self.partial_cmp(rhs)
            }

            fn eval_is_zero(&self) -> bool {
                self.is_zero()
            }

            fn eval_sign(&self) -> i32 {
                if self.is_nan() || self.is_zero() {
                    0
                } else if self.is_sign_negative() {
                    -1
                } else {
                    1
                }
            }

            fn to_f64(&self) -> f64 {
                $name::to_f64(self)
            }

            fn to_i128(&self) -> Option<i128> {
                $name::to_i128(self)
            }

            fn to_u128(&self) -> Option<u128> {
                self.to_int().ok()?.to_u128()
            }

            fn eval_compare_native(&self, rhs: i128) -> Option<Ordering> {
                self.partial_cmp(&$name::from_i128(rhs))
            }

            fn to_string_ctx(&self, ctx: &Context) -> String {
                $name::to_string_ctx(self, ctx)
            }

            fn parse(s: &str) -> Result<Self> {
                s.parse()
            }
        }

        impl<F: FloatLimb> FloatBackend for $name<F> {
            fn eval_floor(&mut self) {
                *self = self.floor();
            }

            fn eval_ceil(&mut self) {
                *self = self.ceil();
            }

            fn eval_trunc(&mut self) {
                *self = self.trunc();
            }

            fn eval_round(&mut self) {
                *self = self.round();
            }

            fn eval_ldexp(&mut self, e: i32) {
                *self = self.ldexp(e);
            }

            fn eval_frexp(&self) -> (Self, i32) {
                self.frexp()
            }

            fn eval_powi(&mut self, n: i32) {
                *self = self.powi(n);
            }

            fn is_nan(&self) -> bool {
                $name::is_nan(self)
            }

            fn is_infinite(&self) -> bool {
                $name::is_infinite(self)
            }

            fn is_finite(&self) -> bool {
                $name::is_finite(self)
            }
        }
    )*};
}

impl_float_backend!(DoubleFloat QuadFloat);
