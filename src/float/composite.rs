//! Behaviour shared by every composite width: constants, conversions, text,
//! operator traits and comparisons. Each width supplies `sum`, `product`,
//! `quotient`, `sum_limb`, `product_limb`, `sqr`, `floor` and `ceil`.

/// `floor((bits - 1) * log10(2))`.
pub(crate) const fn digits10(bits: u32) -> u32 {
    ((bits as u64 - 1) * 30_103 / 100_000) as u32
}

/// `ceil(bits * log10(2)) + 1`.
pub(crate) const fn max_digits10(bits: u32) -> u32 {
    ((bits as u64 * 30_103).div_ceil(100_000) + 1) as u32
}

macro_rules! impl_composite {
    ($name:ident, $n:literal) => {
        impl<F: $crate::float::FloatLimb> $name<F> {
            /// Binary digits carried by the limbs together.
            pub const DIGITS: u32 = $n * F::MANTISSA_DIGITS;
            /// Decimal digits that survive text -> value -> text.
            pub const DIGITS10: u32 = $crate::float::composite::digits10(Self::DIGITS);
            /// Decimal digits needed to tell any two values apart.
            pub const MAX_DIGITS10: u32 = $crate::float::composite::max_digits10(Self::DIGITS);

            /// Limbs in decreasing magnitude.
            pub fn limbs(&self) -> [F; $n] {
                self.limbs
            }

            /// The leading limb, the nearest native value.
            pub fn hi(&self) -> F {
                self.limbs[0]
            }

            /// A native value with exact zeros below it.
            pub fn from_limb(v: F) -> Self {
                let mut limbs = [F::zero(); $n];
                limbs[0] = v;
                Self { limbs }
            }

            pub fn zero() -> Self {
                Self::from_limb(F::zero())
            }

            pub fn one() -> Self {
                Self::from_limb(F::one())
            }

            pub fn nan() -> Self {
                Self::from_limb(F::nan())
            }

            pub fn infinity() -> Self {
                Self::from_limb(F::infinity())
            }

            pub fn neg_infinity() -> Self {
                Self::from_limb(F::neg_infinity())
            }

            pub fn is_nan(&self) -> bool {
                self.limbs[0].is_nan()
            }

            pub fn is_infinite(&self) -> bool {
                self.limbs[0].is_infinite()
            }

            pub fn is_finite(&self) -> bool {
                self.limbs[0].is_finite()
            }

            pub fn is_zero(&self) -> bool {
                self.limbs[0].is_zero()
            }

            pub fn is_sign_negative(&self) -> bool {
                self.limbs[0].is_sign_negative()
            }

            pub fn abs(self) -> Self {
                if self.is_sign_negative() {
                    -self
                } else {
                    self
                }
            }

            /// `1 / self`.
            pub fn recip(self) -> Self {
                Self::one() / self
            }

            pub fn trunc(self) -> Self {
                if self.is_sign_negative() {
                    self.ceil()
                } else {
                    self.floor()
                }
            }

            /// Nearest integer, halfway cases away from zero.
            pub fn round(self) -> Self {
                if !self.is_finite() {
                    return self;
                }
                let floor = self.floor();
                let diff = self - floor;
                let half = Self::from_limb(F::HALF);
                let rounded = if diff > half || (diff == half && !self.is_sign_negative()) {
                    floor + F::one()
                } else {
                    floor
                };
                if rounded.is_zero() && self.is_sign_negative() {
                    -Self::zero()
                } else {
                    rounded
                }
            }

            /// `self * 2^e`, exact unless a limb leaves the exponent range.
            pub fn ldexp(self, e: i32) -> Self {
                Self {
                    limbs: self.limbs.map(|l| $crate::float::FloatLimb::ldexp(l, e)),
                }
            }

            /// `(m, e)` with `self = m * 2^e` and `0.5 <= |m| < 1`.
            pub fn frexp(self) -> (Self, i32) {
                if self.is_zero() || !self.is_finite() {
                    return (self, 0);
                }
                let (_, mut e) = $crate::float::FloatLimb::frexp(self.limbs[0]);
                let mut m = self.ldexp(-e);
                let [hi, lo, ..] = m.limbs;
                if hi.abs() == F::HALF
                    && !lo.is_zero()
                    && lo.is_sign_negative() != hi.is_sign_negative()
                {
                    m = m.ldexp(1);
                    e -= 1;
                }
                (m, e)
            }

            /// `self^n` by repeated squaring; `x^0 == 1`.
            pub fn powi(self, n: i32) -> Self {
                let mut base = self;
                let mut k = n.unsigned_abs();
                let mut acc = Self::one();
                while k > 0 {
                    if k & 1 == 1 {
                        acc = acc * base;
                    }
                    k >>= 1;
                    if k > 0 {
                        base = base.sqr();
                    }
                }
                if n < 0 {
                    acc.recip()
                } else {
                    acc
                }
            }

            fn exact_limbs(v: &$crate::int::Int) -> $crate::error::Result<[F; $n]> {
                $crate::float::exact::Ratio::from_dyadic($crate::float::Dyadic::from_int(v))
                    .into_limbs()
            }

            /// Unbounded integers never fail here; a failure would be a bug,
            /// surfaced as NaN rather than a plausible value.
            fn from_exact(exact: $crate::error::Result<[F; $n]>) -> Self {
                exact.map_or_else(|_| Self::nan(), |limbs| Self { limbs })
            }

            /// Nearest composite, each limb the correctly rounded residual.
            pub fn from_int<const B: usize, const S: bool, const C: bool>(
                v: &$crate::int::BigInt<B, S, C>,
            ) -> Self {
                Self::from_exact(v.convert().and_then(|v| Self::exact_limbs(&v)))
            }

            pub fn from_i128(v: i128) -> Self {
                Self::from_exact($crate::int::Int::from_i128(v).and_then(|v| Self::exact_limbs(&v)))
            }

            pub fn from_u128(v: u128) -> Self {
                Self::from_exact($crate::int::Int::from_u128(v).and_then(|v| Self::exact_limbs(&v)))
            }

            /// Exact whenever the limbs can hold every bit of `v`.
            pub fn from_f64(v: f64) -> Self {
                if v == 0.0 || !v.is_finite() {
                    return Self::from_limb(F::from_f64_lossy(v));
                }
                match $crate::float::Dyadic::from_limbs(&[v]) {
                    Ok(Some(d)) => Self::from_exact(
                        $crate::float::exact::Ratio::from_dyadic(d).into_limbs(),
                    ),
                    _ => Self::nan(),
                }
            }

            /// The exact value; `None` for NaN and infinities.
            pub fn to_dyadic(&self) -> Option<$crate::float::Dyadic> {
                $crate::float::Dyadic::from_limbs(&self.limbs).ok().flatten()
            }

            /// The integer part, rounded toward zero.
            pub fn to_int(&self) -> $crate::error::Result<$crate::int::Int> {
                match $crate::float::Dyadic::from_limbs(&self.limbs)? {
                    Some(d) => d.trunc(),
                    None => Err($crate::error::Error::domain("to_int", "value is not finite")),
                }
            }

            pub fn to_i128(&self) -> Option<i128> {
                self.to_int().ok()?.to_i128()
            }

            pub fn to_f64(&self) -> f64 {
                self.limbs
                    .iter()
                    .rev()
                    .fold(0.0, |acc, l| acc + l.to_f64_lossy())
            }

            fn style(
                &self,
                notation: $crate::context::Notation,
                precision: Option<usize>,
                uppercase: bool,
            ) -> $crate::float::text::Style {
                $crate::float::text::Style {
                    notation,
                    precision,
                    uppercase,
                    round_trip_digits: Self::MAX_DIGITS10 as usize,
                }
            }

            /// Text in the context's notation and precision.
            pub fn to_string_ctx(&self, ctx: &$crate::context::Context) -> String {
                let style = self.style(ctx.notation(), ctx.precision(), ctx.uppercase());
                $crate::float::text::format_limbs(&self.limbs, style)
                    .unwrap_or_else(|_| "NaN".to_string())
            }
        }

        impl<F: $crate::float::FloatLimb> std::ops::Neg for $name<F> {
            type Output = Self;

            fn neg(self) -> Self {
                Self {
                    limbs: self.limbs.map(|l| -l),
                }
            }
        }

        impl<F: $crate::float::FloatLimb> std::ops::Add for $name<F> {
            type Output = Self;

            fn add(self, rhs: Self) -> Self {
                Self::sum(self, rhs)
            }
        }

        impl<F: $crate::float::FloatLimb> std::ops::Sub for $name<F> {
            type Output = Self;

            fn sub(self, rhs: Self) -> Self {
                Self::sum(self, -rhs)
            }
        }

        impl<F: $crate::float::FloatLimb> std::ops::Mul for $name<F> {
            type Output = Self;

            fn mul(self, rhs: Self) -> Self {
                Self::product(self, rhs)
            }
        }

        impl<F: $crate::float::FloatLimb> std::ops::Div for $name<F> {
            type Output = Self;

            fn div(self, rhs: Self) -> Self {
                Self::quotient(self, rhs)
            }
        }

        impl<F: $crate::float::FloatLimb> std::ops::Add<F> for $name<F> {
            type Output = Self;

            fn add(self, rhs: F) -> Self {
                Self::sum_limb(self, rhs)
            }
        }

        impl<F: $crate::float::FloatLimb> std::ops::Sub<F> for $name<F> {
            type Output = Self;

            fn sub(self, rhs: F) -> Self {
                Self::sum_limb(self, -rhs)
            }
        }

        impl<F: $crate::float::FloatLimb> std::ops::Mul<F> for $name<F> {
            type Output = Self;

            fn mul(self, rhs: F) -> Self {
                Self::product_limb(self, rhs)
            }
        }

        impl<F: $crate::float::FloatLimb> std::ops::Div<F> for $name<F> {
            type Output = Self;

            fn div(self, rhs: F) -> Self {
                Self::quotient(self, Self::from_limb(rhs))
            }
        }

        impl_composite!(@assign $name, AddAssign add_assign +);
        impl_composite!(@assign $name, SubAssign sub_assign -);
        impl_composite!(@assign $name, MulAssign mul_assign *);
        impl_composite!(@assign $name, DivAssign div_assign /);

        impl<F: $crate::float::FloatLimb> std::iter::Sum for $name<F> {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                iter.fold(Self::zero(), |acc, x| acc + x)
            }
        }

        impl<F: $crate::float::FloatLimb> std::iter::Product for $name<F> {
            fn product<I: Iterator<Item = Self>>(iter: I) -> Self {
                iter.fold(Self::one(), |acc, x| acc * x)
            }
        }

        impl<F: $crate::float::FloatLimb> PartialEq for $name<F> {
            fn eq(&self, other: &Self) -> bool {
                self.limbs == other.limbs
            }
        }

        impl<F: $crate::float::FloatLimb> PartialOrd for $name<F> {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                for (a, b) in self.limbs.iter().zip(&other.limbs) {
                    match a.partial_cmp(b)? {
                        std::cmp::Ordering::Equal => continue,
                        ord => return Some(ord),
                    }
                }
                Some(std::cmp::Ordering::Equal)
            }
        }

        impl<F: $crate::float::FloatLimb> PartialEq<F> for $name<F> {
            fn eq(&self, other: &F) -> bool {
                *self == Self::from_limb(*other)
            }
        }

        impl<F: $crate::float::FloatLimb> PartialOrd<F> for $name<F> {
            fn partial_cmp(&self, other: &F) -> Option<std::cmp::Ordering> {
                self.partial_cmp(&Self::from_limb(*other))
            }
        }

        impl From<f64> for $name<f64> {
            fn from(v: f64) -> Self {
                Self::from_limb(v)
            }
        }

        impl From<f32> for $name<f32> {
            fn from(v: f32) -> Self {
                Self::from_limb(v)
            }
        }

        impl_composite!(@from_int $name, from_i128: i8 i16 i32 i64 i128 isize);
        impl_composite!(@from_int $name, from_u128: u8 u16 u32 u64 u128 usize);

        impl<F: $crate::float::FloatLimb> std::str::FromStr for $name<F> {
            type Err = $crate::error::Error;

            fn from_str(s: &str) -> $crate::error::Result<Self> {
                $crate::float::text::parse_limbs(s).map(|limbs| Self { limbs })
            }
        }

        /// General notation with round-trip digits; `{:.N}` prints `N`
        /// digits after the point.
        impl<F: $crate::float::FloatLimb> std::fmt::Display for $name<F> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let notation = match f.precision() {
                    Some(_) => $crate::context::Notation::Fixed,
                    None => $crate::context::Notation::General,
                };
                let style = self.style(notation, f.precision(), false);
                let s = $crate::float::text::format_limbs(&self.limbs, style)
                    .map_err(|_| std::fmt::Error)?;
                f.write_str(&s)
            }
        }

        impl<F: $crate::float::FloatLimb> std::fmt::LowerExp for $name<F> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let style = self.style($crate::context::Notation::Scientific, f.precision(), false);
                let s = $crate::float::text::format_limbs(&self.limbs, style)
                    .map_err(|_| std::fmt::Error)?;
                f.write_str(&s)
            }
        }

        impl<F: $crate::float::FloatLimb> std::fmt::UpperExp for $name<F> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let style = self.style($crate::context::Notation::Scientific, f.precision(), true);
                let s = $crate::float::text::format_limbs(&self.limbs, style)
                    .map_err(|_| std::fmt::Error)?;
                f.write_str(&s)
            }
        }

        impl<F: $crate::float::FloatLimb> std::fmt::Debug for $name<F> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.limbs).finish()
            }
        }
    };

    (@assign $name:ident, $trait:ident $method:ident $op:tt) => {
        impl<F: $crate::float::FloatLimb> std::ops::$trait for $name<F> {
            fn $method(&mut self, rhs: Self) {
                *self = *self $op rhs;
            }
        }

        impl<F: $crate::float::FloatLimb> std::ops::$trait<F> for $name<F> {
            fn $method(&mut self, rhs: F) {
                *self = *self $op rhs;
            }
        }
    };

    (@from_int $name:ident, $via:ident: $($t:ty)*) => {
        $(
            impl<F: $crate::float::FloatLimb> From<$t> for $name<F> {
                fn from(v: $t) -> Self {
                    Self::$via(v as _)
                }
            }
        )*
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_counts() {
        assert_eq!(digits10(53), 15);
        assert_eq!(max_digits10(53), 17);
        assert_eq!(digits10(106), 31);
        assert_eq!(max_digits10(106), 33);
        assert_eq!(digits10(212), 63);
        assert_eq!(max_digits10(212), 65);
        assert_eq!(digits10(24), 6);
        assert_eq!(max_digits10(24), 9);
    }
}
