//! Double-word composites: an unevaluated sum of two native floats.

use super::eft::{fast_two_sum, normalize_pair, two_prod, two_sqr, two_sum};
use super::FloatLimb;

/// `hi + lo` with `|lo| <= ulp(hi) / 2`, roughly `2p` bits of precision.
#[derive(Clone, Copy, Default)]
pub struct DoubleFloat<F = f64> {
    limbs: [F; 2],
}

/// 106-bit significand.
pub type DoubleDouble = DoubleFloat<f64>;
/// 48-bit significand.
pub type DoubleSingle = DoubleFloat<f32>;

impl<F: FloatLimb> DoubleFloat<F> {
    /// Renormalizes `hi + lo`.
    pub fn new(hi: F, lo: F) -> Self {
        let (hi, lo) = normalize_pair(hi, lo);
        Self { limbs: [hi, lo] }
    }

    pub fn lo(&self) -> F {
        self.limbs[1]
    }

    /// Relative spacing of the representation, `2^(2 - 2p)`.
    pub fn epsilon() -> Self {
        Self::from_limb(F::exp2i(2 - 2 * F::MANTISSA_DIGITS as i32))
    }

    pub fn max_value() -> Self {
        let max = F::max_value();
        let shift = F::MANTISSA_DIGITS as i32 + 1;
        Self {
            limbs: [max, FloatLimb::ldexp(max, -shift)],
        }
    }

    pub fn min_value() -> Self {
        -Self::max_value()
    }

    /// Smallest value whose low limb is still normal.
    pub fn min_positive() -> Self {
        Self::from_limb(FloatLimb::ldexp(
            F::min_positive_value(),
            F::MANTISSA_DIGITS as i32,
        ))
    }

    /// Packs a renormalized pair, collapsing overflow to the leading limb and
    /// a zero result to `zero`.
    fn finish(hi: F, lo: F, zero: F) -> Self {
        if !hi.is_finite() {
            Self::from_limb(hi)
        } else if hi.is_zero() {
            Self::from_limb(zero)
        } else {
            Self { limbs: [hi, lo] }
        }
    }

    /// IEEE-style sum: both halves are added with two-sums, then the error
    /// terms are folded back in.
    fn sum(a: Self, b: Self) -> Self {
        let [a_hi, a_lo] = a.limbs;
        let [b_hi, b_lo] = b.limbs;
        let s = a_hi + b_hi;
        if !s.is_finite() {
            return Self::from_limb(s);
        }
        let (s1, s2) = two_sum(a_hi, b_hi);
        let (t1, t2) = two_sum(a_lo, b_lo);
        let (s1, s2) = fast_two_sum(s1, s2 + t1);
        let (s1, s2) = fast_two_sum(s1, s2 + t2);
        let zero = if a.is_zero() && b.is_zero() { s } else { F::zero() };
        Self::finish(s1, s2, zero)
    }

    fn sum_limb(a: Self, b: F) -> Self {
        let [a_hi, a_lo] = a.limbs;
        let s = a_hi + b;
        if !s.is_finite() {
            return Self::from_limb(s);
        }
        let (s1, s2) = two_sum(a_hi, b);
        let (s1, s2) = fast_two_sum(s1, s2 + a_lo);
        let zero = if a.is_zero() && b.is_zero() { s } else { F::zero() };
        Self::finish(s1, s2, zero)
    }

    fn product(a: Self, b: Self) -> Self {
        let [a_hi, a_lo] = a.limbs;
        let [b_hi, b_lo] = b.limbs;
        let p = a_hi * b_hi;
        if !p.is_finite() {
            return Self::from_limb(p);
        }
        let (p1, p2) = two_prod(a_hi, b_hi);
        let (p1, p2) = fast_two_sum(p1, p2 + (a_hi * b_lo + a_lo * b_hi));
        Self::finish(p1, p2, p)
    }

    fn product_limb(a: Self, b: F) -> Self {
        let [a_hi, a_lo] = a.limbs;
        let p = a_hi * b;
        if !p.is_finite() {
            return Self::from_limb(p);
        }
        let (p1, p2) = two_prod(a_hi, b);
        let (p1, p2) = fast_two_sum(p1, p2 + a_lo * b);
        Self::finish(p1, p2, p)
    }

    /// Long division: the quotient of the leading limbs is refined twice
    /// against the exact residual.
    fn quotient(a: Self, b: Self) -> Self {
        let divisor = b.limbs[0];
        let q1 = a.limbs[0] / divisor;
        if !q1.is_finite() || !b.is_finite() || a.is_zero() {
            return Self::from_limb(q1);
        }
        let mut r = a - b * q1;
        let q2 = r.limbs[0] / divisor;
        r = r - b * q2;
        let q3 = r.limbs[0] / divisor;
        let (q1, q2) = fast_two_sum(q1, q2);
        Self::finish(q1, q2, q1) + q3
    }

    /// `self * self`, cheaper than the general product.
    pub fn sqr(self) -> Self {
        let [hi, lo] = self.limbs;
        let p = hi * hi;
        if !p.is_finite() {
            return Self::from_limb(p);
        }
        let (p1, p2) = two_sqr(hi);
        let (p1, p2) = fast_two_sum(p1, p2 + (F::TWO * hi * lo + lo * lo));
        Self::finish(p1, p2, p)
    }

    /// Karp's method: one correction of the native square root, computed as
    /// `ax + (a - ax^2) * x / 2` with `x ~ 1 / sqrt(a)`.
    pub fn sqrt(self) -> Self {
        let hi = self.limbs[0];
        if self.is_zero() {
            return self;
        }
        if hi < F::zero() {
            return Self::nan();
        }
        if !hi.is_finite() {
            return Self::from_limb(hi.sqrt());
        }
        // an even power of two keeps subnormal inputs exact and the seed finite
        let (_, exp) = FloatLimb::frexp(hi);
        let k = exp & !1;
        let a = self.ldexp(-k);
        let hi = a.limbs[0];
        let x = hi.sqrt().recip();
        let ax = hi * x;
        let residual = (a - Self::from_limb(ax).sqr()).limbs[0];
        let (s, e) = two_sum(ax, residual * (x * F::HALF));
        Self::finish(s, e, s).ldexp(k / 2)
    }

    pub fn floor(self) -> Self {
        let [hi, lo] = self.limbs;
        if !self.is_finite() {
            return self;
        }
        let floor_hi = hi.floor();
        if floor_hi != hi || lo.is_zero() {
            return Self::from_limb(floor_hi);
        }
        let (s, e) = fast_two_sum(floor_hi, lo.floor());
        Self::finish(s, e, s)
    }

    pub fn ceil(self) -> Self {
        let [hi, lo] = self.limbs;
        if !self.is_finite() {
            return self;
        }
        let ceil_hi = hi.ceil();
        if ceil_hi != hi || lo.is_zero() {
            return Self::from_limb(ceil_hi);
        }
        let (s, e) = fast_two_sum(ceil_hi, lo.ceil());
        Self::finish(s, e, s)
    }
}

impl_composite!(DoubleFloat, 2);

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rug::Float as MpFloat;

    use super::*;
    use crate::context::{Context, Notation};
    use crate::error::{Error, ParseError};
    use crate::int::Int;

    const PREC: u32 = 400;

    fn mp(x: DoubleDouble) -> MpFloat {
        MpFloat::with_val(PREC, x.hi()) + x.lo()
    }

    fn rel_err(got: DoubleDouble, exact: &MpFloat) -> f64 {
        let diff = MpFloat::with_val(PREC, &mp(got) - exact);
        if exact.is_zero() {
            return diff.to_f64().abs();
        }
        MpFloat::with_val(PREC, &diff / exact).abs().to_f64()
    }

    fn operand() -> impl Strategy<Value = DoubleDouble> {
        (
            prop_oneof![-1e50f64..-1e-50, 1e-50f64..1e50],
            -0.5f64..0.5,
        )
            .prop_map(|(hi, r)| DoubleDouble::new(hi, r * hi * f64::EPSILON))
    }

    fn dd(x: f64) -> DoubleDouble {
        DoubleDouble::from(x)
    }

    #[test]
    fn constructor_accepts_unordered_halves() {
        let x = DoubleDouble::new(1e-300, 1.0);
        assert_eq!((x.hi(), x.lo()), (1.0, 1e-300));
        let x = DoubleDouble::new(0.5, 3.0);
        assert_eq!((x.hi(), x.lo()), (3.5, 0.0));
        assert!(DoubleDouble::new(1.0, f64::INFINITY).is_infinite());
    }

    #[test]
    fn sqrt_of_subnormal_and_tiny_values() {
        for x in [1e-310, f64::MIN_POSITIVE, 5e-324, 1e-300] {
            let root = dd(x).sqrt();
            assert!(root.is_finite(), "sqrt({x:e})");
            assert_eq!(root.hi(), x.sqrt(), "sqrt({x:e})");
            let exact = MpFloat::with_val(PREC, MpFloat::with_val(PREC, x).sqrt_ref());
            assert!(rel_err(root, &exact) <= 2f64.powi(-102), "sqrt({x:e})");
        }
        assert!(DoubleSingle::from(f32::from_bits(1)).sqrt().is_finite());
    }

    #[test]
    fn division_round_trips_within_epsilon() {
        let tolerance = 2f64.powi(-104);
        for (a, b) in [(1.0, 3.0), (2.0, 7.0), (1e10, 3e-7), (-5.0, 11.0)] {
            let (a, b) = (dd(a), dd(b));
            let back = (a / b) * b;
            assert!(((back - a).abs() / a.abs()).hi() <= tolerance, "{a} / {b}");
        }
    }

    #[test]
    fn carries_bits_beyond_a_double() {
        let tiny = 2f64.powi(-80);
        let x = dd(1.0) + tiny;
        assert_eq!(x.limbs(), [1.0, tiny]);
        assert_eq!((x - 1.0).hi(), tiny);

        let third = dd(1.0) / 3.0;
        assert_eq!(third.hi(), 1.0 / 3.0);
        assert!(third.lo() != 0.0);
    }

    #[test]
    fn special_values_short_circuit() {
        let inf = DoubleDouble::infinity();
        assert_eq!((inf + 1.0).limbs(), [f64::INFINITY, 0.0]);
        assert!((inf - inf).is_nan());
        assert!((inf * dd(0.0)).is_nan());
        assert_eq!((dd(1.0) / dd(0.0)).limbs(), [f64::INFINITY, 0.0]);
        assert_eq!((dd(-1.0) / dd(0.0)).hi(), f64::NEG_INFINITY);
        assert!((dd(0.0) / dd(0.0)).is_nan());
        assert_eq!((dd(3.0) / inf).limbs(), [0.0, 0.0]);
        assert!(dd(-1.0).sqrt().is_nan());
        assert_eq!(inf.sqrt().hi(), f64::INFINITY);
        assert!(DoubleDouble::nan() != DoubleDouble::nan());
        assert_eq!(DoubleDouble::max_value() * 2.0, inf);
    }

    #[test]
    fn signed_zero_follows_ieee() {
        let neg_zero = dd(-0.0);
        assert!((neg_zero + neg_zero).is_sign_negative());
        assert!(!(neg_zero + dd(0.0)).is_sign_negative());
        let x = dd(1.5) + 2f64.powi(-70);
        assert!(!(x - x).is_sign_negative());
        assert!((neg_zero * 5.0).is_sign_negative());
        assert!((dd(0.0) / dd(-3.0)).is_sign_negative());
        assert!(neg_zero.sqrt().is_sign_negative());
        assert_eq!(neg_zero, dd(0.0));
        assert!(dd(-0.3).round().is_sign_negative());
    }

    #[test]
    fn rounding_functions_see_the_low_limb() {
        let x = dd(1.0) + 2f64.powi(-60);
        assert_eq!(x.floor(), 1.0);
        assert_eq!(x.ceil(), 2.0);
        assert_eq!((-x).trunc(), -1.0);

        let big = DoubleDouble::new(2f64.powi(60), 0.5);
        assert_eq!(big.floor().limbs(), [2f64.powi(60), 0.0]);
        assert_eq!(big.round().limbs(), [2f64.powi(60), 1.0]);
        let below = DoubleDouble::new(2f64.powi(60), -0.5);
        assert_eq!(below.floor().limbs(), [2f64.powi(60), -1.0]);

        assert_eq!(dd(2.5).round(), 3.0);
        assert_eq!(dd(-2.5).round(), -3.0);
        assert_eq!(dd(-2.4).round(), -2.0);
    }

    #[test]
    fn exponent_helpers() {
        let x = dd(3.0) / 7.0;
        assert_eq!(x.ldexp(10).ldexp(-10), x);
        let (m, e) = (x * 1e20).frexp();
        assert!((0.5..1.0).contains(&m.hi()));
        assert_eq!(m.ldexp(e), x * 1e20);

        let (m, e) = DoubleDouble::new(0.5, -2f64.powi(-60)).frexp();
        assert_eq!(e, -1);
        assert!(m < 1.0 && m >= 0.5);

        assert_eq!(dd(2.0).powi(10), 1024.0);
        assert_eq!(dd(2.0).powi(-2), 0.25);
        assert_eq!(dd(7.0).powi(0), 1.0);
        assert_eq!(dd(4.0).recip(), 0.25);
    }

    #[test]
    fn integer_conversions_are_exact() {
        let v = (1i128 << 100) + 1;
        let x = DoubleDouble::from(v);
        assert_eq!(x.limbs(), [2f64.powi(100), 1.0]);
        assert_eq!(x.to_i128(), Some(v));
        assert_eq!(DoubleDouble::from(u64::MAX).to_int().unwrap().to_u64(), Some(u64::MAX));

        let big: Int = "123456789012345678901234567890".parse().unwrap();
        let x = DoubleDouble::from_int(&big);
        assert_eq!(x.to_int().unwrap(), big);
        assert_eq!((dd(-7.9)).to_int().unwrap().to_i64(), Some(-7));
        assert_eq!(
            DoubleDouble::nan().to_int(),
            Err(Error::Domain { op: "to_int", reason: "value is not finite" })
        );
    }

    #[test]
    fn text_conversions() {
        assert_eq!(dd(0.1).to_string(), "0.100000000000000005551115123125783");
        let tenth: DoubleDouble = "0.1".parse().unwrap();
        assert_eq!(tenth.hi(), 0.1);
        assert!(tenth.lo() < 0.0);
        assert_eq!(tenth.to_string(), "0.1");
        assert_eq!(format!("{:.5}", dd(2.0).sqrt()), "1.41421");
        assert_eq!(format!("{:e}", dd(1234.5)), "1.234500e3");
        assert_eq!(format!("{:.2E}", dd(-0.00125)), "-1.25E-3");
        assert_eq!(format!("{:?}", dd(1.5)), "DoubleFloat([1.5, 0.0])");
        assert_eq!(
            "1..5".parse::<DoubleDouble>(),
            Err(Error::Parse(ParseError::MultipleDecimalPoints))
        );

        let ctx = Context::new().with_notation(Notation::Scientific).with_precision(3);
        assert_eq!(dd(31415.9).to_string_ctx(&ctx), "3.142e4");
    }

    #[test]
    fn limits() {
        assert_eq!(DoubleDouble::DIGITS, 106);
        assert_eq!(DoubleDouble::DIGITS10, 31);
        assert_eq!(DoubleDouble::MAX_DIGITS10, 33);
        assert_eq!(DoubleDouble::epsilon(), 2f64.powi(-104));
        assert_eq!(DoubleSingle::DIGITS, 48);
        assert_eq!(DoubleSingle::epsilon(), 2f32.powi(-46));
        assert!(DoubleDouble::max_value().is_finite());
        assert!(DoubleDouble::min_value() < DoubleDouble::max_value());
        assert_eq!(DoubleDouble::min_positive(), 2f64.powi(-969));
    }

    #[test]
    fn single_precision_limbs() {
        let third = DoubleSingle::from(1.0f32) / 3.0;
        assert_eq!(third.hi(), 1.0f32 / 3.0);
        let back = third * 3.0 - 1.0;
        assert!(back.abs().hi() <= 2f32.powi(-45));
        let root = DoubleSingle::from(2.0f32).sqrt();
        let err = (root.sqr() - 2.0).abs().hi();
        assert!(err <= 2f32.powi(-42));
    }

    #[test]
    fn sums_and_products_of_sequences() {
        let tenths: DoubleDouble = (0..10).map(|_| dd(1.0) / 10.0).sum();
        assert!(((tenths - 1.0).abs()).hi() < 2f64.powi(-100));
        let fact: DoubleDouble = (1..=20).map(DoubleDouble::from).product();
        assert_eq!(fact.to_i128(), Some(2_432_902_008_176_640_000));
    }

    proptest! {
        #[test]
        fn arithmetic_matches_the_oracle(a in operand(), b in operand()) {
            let tolerance = 2f64.powi(-100);
            let (ma, mb) = (mp(a), mp(b));
            prop_assert!(rel_err(a * b, &MpFloat::with_val(PREC, &ma * &mb)) <= tolerance);
            prop_assert!(rel_err(a / b, &MpFloat::with_val(PREC, &ma / &mb)) <= tolerance);
            prop_assert!(rel_err(a.sqr(), &MpFloat::with_val(PREC, ma.square_ref())) <= tolerance);
            // sums can cancel, so bound the error by the operands instead
            let sum = MpFloat::with_val(PREC, &ma + &mb);
            let scale = ma.clone().abs().max(&mb.clone().abs());
            let err = MpFloat::with_val(PREC, &mp(a + b) - &sum).abs();
            prop_assert!(MpFloat::with_val(PREC, &err / &scale).to_f64() <= tolerance);
        }

        #[test]
        fn sqrt_matches_the_oracle(a in operand()) {
            let a = a.abs();
            let exact = MpFloat::with_val(PREC, mp(a).sqrt_ref());
            prop_assert!(rel_err(a.sqrt(), &exact) <= 2f64.powi(-102));
        }

        #[test]
        fn text_round_trip(a in operand()) {
            let back: DoubleDouble = a.to_string().parse().unwrap();
            prop_assert!(((back - a).abs() / a.abs()).hi() <= 2f64.powi(-104));
        }

        #[test]
        fn constructor_is_order_independent(
            a in -1e20f64..1e20,
            b in -1.0f64..1.0,
            shift in 0i32..120,
        ) {
            let b = b * 2f64.powi(-shift);
            let exact = MpFloat::with_val(PREC, a) + b;
            for x in [DoubleDouble::new(a, b), DoubleDouble::new(b, a)] {
                prop_assert_eq!(mp(x), exact.clone());
                prop_assert_eq!(x.hi(), a + b);
                prop_assert_eq!(x.hi() + x.lo(), x.hi());
            }
        }

        #[test]
        fn sum_is_normalized(a in operand(), b in operand()) {
            let s = a + b;
            prop_assert_eq!(s.hi() + s.lo(), s.hi());
        }
    }
}
