//! Quad-word composites: an unevaluated sum of four native floats.

use super::eft::{
    fast_two_sum, renorm4, renorm5, three_sum, three_sum2, two_prod, two_sum,
};
use super::FloatLimb;

/// Four non-overlapping limbs in decreasing magnitude, roughly `4p` bits of
/// precision.
#[derive(Clone, Copy, Default)]
pub struct QuadFloat<F = f64> {
    limbs: [F; 4],
}

/// 212-bit significand.
pub type QuadDouble = QuadFloat<f64>;
/// 96-bit significand.
pub type QuadSingle = QuadFloat<f32>;

/// Takes the larger-magnitude head of the two limb queues.
fn take_larger<F: FloatLimb>(a: &[F; 4], b: &[F; 4], i: &mut usize, j: &mut usize) -> F {
    if *j >= 4 || (*i < 4 && a[*i].abs() > b[*j].abs()) {
        *i += 1;
        a[*i - 1]
    } else {
        *j += 1;
        b[*j - 1]
    }
}

/// Adds `c` into the running pair `(a, b)`; returns the part that no longer
/// fits, or zero if the pair absorbed everything.
fn accumulate<F: FloatLimb>(a: &mut F, b: &mut F, c: F) -> F {
    let (s, lo) = two_sum(*b, c);
    *b = lo;
    let (s, hi) = two_sum(*a, s);
    *a = hi;
    match (a.is_zero(), b.is_zero()) {
        (false, false) => s,
        (true, _) => {
            *a = s;
            F::zero()
        }
        (false, true) => {
            *b = *a;
            *a = s;
            F::zero()
        }
    }
}

impl<F: FloatLimb> QuadFloat<F> {
    /// Sums four terms, given in any order, into renormalized limbs.
    pub fn new(c0: F, c1: F, c2: F, c3: F) -> Self {
        [c1, c2, c3]
            .into_iter()
            .filter(|c| !c.is_zero())
            .fold(Self::from_limb(c0), Self::sum_limb)
    }

    /// Relative spacing of the representation, `2^(3 - 4p)`.
    pub fn epsilon() -> Self {
        Self::from_limb(F::exp2i(3 - 4 * F::MANTISSA_DIGITS as i32))
    }

    pub fn max_value() -> Self {
        let max = F::max_value();
        let shift = F::MANTISSA_DIGITS as i32 + 1;
        Self {
            limbs: [
                max,
                FloatLimb::ldexp(max, -shift),
                FloatLimb::ldexp(max, -2 * shift),
                FloatLimb::ldexp(max, -3 * shift),
            ],
        }
    }

    pub fn min_value() -> Self {
        -Self::max_value()
    }

    /// Smallest value whose lowest limb is still normal.
    pub fn min_positive() -> Self {
        Self::from_limb(FloatLimb::ldexp(
            F::min_positive_value(),
            3 * F::MANTISSA_DIGITS as i32,
        ))
    }

    /// Wraps renormalized limbs, collapsing overflow and zero results.
    fn finish(limbs: [F; 4], zero: F) -> Self {
        if !limbs[0].is_finite() {
            Self::from_limb(limbs[0])
        } else if limbs[0].is_zero() {
            Self::from_limb(zero)
        } else {
            Self { limbs }
        }
    }

    /// IEEE-style sum: merges both limb sequences by magnitude into a
    /// running accumulator, emitting a limb whenever it overflows.
    fn sum(a: Self, b: Self) -> Self {
        let s = a.limbs[0] + b.limbs[0];
        if !s.is_finite() {
            return Self::from_limb(s);
        }
        let (a_limbs, b_limbs) = (&a.limbs, &b.limbs);
        let (mut i, mut j, mut k) = (0, 0, 0);
        let mut x = [F::zero(); 4];

        let u = take_larger(a_limbs, b_limbs, &mut i, &mut j);
        let v = take_larger(a_limbs, b_limbs, &mut i, &mut j);
        let (mut u, mut v) = fast_two_sum(u, v);
        loop {
            if k == 4 {
                x[3] = x[3] + (u + v);
                break;
            }
            if i >= 4 && j >= 4 {
                x[k] = u;
                if k < 3 {
                    x[k + 1] = v;
                }
                break;
            }
            let t = take_larger(a_limbs, b_limbs, &mut i, &mut j);
            let spill = accumulate(&mut u, &mut v, t);
            if !spill.is_zero() {
                x[k] = spill;
                k += 1;
            }
        }
        for &rest in a_limbs[i..].iter().chain(&b_limbs[j..]) {
            x[3] = x[3] + rest;
        }

        let zero = if a.is_zero() && b.is_zero() { s } else { F::zero() };
        Self::finish(renorm4(x[0], x[1], x[2], x[3]), zero)
    }

    fn sum_limb(a: Self, b: F) -> Self {
        let s = a.limbs[0] + b;
        if !s.is_finite() {
            return Self::from_limb(s);
        }
        let [a0, a1, a2, a3] = a.limbs;
        let (c0, e) = two_sum(a0, b);
        let (c1, e) = two_sum(a1, e);
        let (c2, e) = two_sum(a2, e);
        let (c3, e) = two_sum(a3, e);
        let zero = if a.is_zero() && b.is_zero() { s } else { F::zero() };
        Self::finish(renorm5(c0, c1, c2, c3, e), zero)
    }

    /// Product keeping every term down to `O(eps^3)`; the remaining cross
    /// terms are added without error compensation.
    fn product(a: Self, b: Self) -> Self {
        let p = a.limbs[0] * b.limbs[0];
        if !p.is_finite() {
            return Self::from_limb(p);
        }
        let [a0, a1, a2, a3] = a.limbs;
        let [b0, b1, b2, b3] = b.limbs;

        let (p0, q0) = two_prod(a0, b0);
        let (p1, q1) = two_prod(a0, b1);
        let (p2, q2) = two_prod(a1, b0);
        let (p3, q3) = two_prod(a0, b2);
        let (p4, q4) = two_prod(a1, b1);
        let (p5, q5) = two_prod(a2, b0);

        // O(eps) terms
        let (p1, p2, q0) = three_sum(p1, p2, q0);

        // O(eps^2) terms
        let (p2, q1, q2) = three_sum(p2, q1, q2);
        let (p3, p4, p5) = three_sum(p3, p4, p5);
        let (s0, t0) = two_sum(p2, p3);
        let (s1, t1) = two_sum(q1, p4);
        let s2 = q2 + p5;
        let (s1, t0) = two_sum(s1, t0);
        let s2 = s2 + (t0 + t1);

        // O(eps^3) terms
        let s1 = s1 + (a0 * b3 + a1 * b2 + a2 * b1 + a3 * b0 + q0 + q3 + q4 + q5);

        Self::finish(renorm5(p0, p1, s0, s1, s2), p)
    }

    fn product_limb(a: Self, b: F) -> Self {
        let p = a.limbs[0] * b;
        if !p.is_finite() {
            return Self::from_limb(p);
        }
        let [a0, a1, a2, a3] = a.limbs;
        let (p0, q0) = two_prod(a0, b);
        let (p1, q1) = two_prod(a1, b);
        let (p2, q2) = two_prod(a2, b);
        let p3 = a3 * b;

        let (s1, s2) = two_sum(q0, p1);
        let (s2, q1, p2) = three_sum(s2, q1, p2);
        let (q1, q2) = three_sum2(q1, q2, p3);
        Self::finish(renorm5(p0, s1, s2, q1, q2 + p2), p)
    }

    /// Long division producing five quotient terms, each the leading-limb
    /// quotient of the running residual.
    fn quotient(a: Self, b: Self) -> Self {
        let divisor = b.limbs[0];
        let q0 = a.limbs[0] / divisor;
        if !q0.is_finite() || !b.is_finite() || a.is_zero() {
            return Self::from_limb(q0);
        }
        let mut r = a - b * q0;
        let mut q = [q0; 5];
        for slot in q.iter_mut().skip(1) {
            *slot = r.limbs[0] / divisor;
            r = r - b * *slot;
        }
        Self::finish(renorm5(q[0], q[1], q[2], q[3], q[4]), q0)
    }

    pub fn sqr(self) -> Self {
        self * self
    }

    /// Three Newton steps on `1 / sqrt(a)` seeded by the native root, then
    /// one multiplication by `a`. The input is first scaled by an even power
    /// of two into `[0.5, 2)`, so that the seed and its square stay finite.
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
        let (_, exp) = FloatLimb::frexp(hi);
        let k = exp & !1;
        let a = self.ldexp(-k);
        let half = Self::from_limb(F::HALF);
        let h = a * F::HALF;
        let mut r = Self::from_limb(a.limbs[0].sqrt().recip());
        for _ in 0..3 {
            r = r + (half - h * r.sqr()) * r;
        }
        (r * a).ldexp(k / 2)
    }

    pub fn floor(self) -> Self {
        if !self.is_finite() {
            return self;
        }
        let mut out = [F::zero(); 4];
        for (slot, &limb) in out.iter_mut().zip(&self.limbs) {
            *slot = limb.floor();
            if *slot != limb {
                break;
            }
        }
        Self::finish(renorm4(out[0], out[1], out[2], out[3]), out[0])
    }

    pub fn ceil(self) -> Self {
        if !self.is_finite() {
            return self;
        }
        let mut out = [F::zero(); 4];
        for (slot, &limb) in out.iter_mut().zip(&self.limbs) {
            *slot = limb.ceil();
            if *slot != limb {
                break;
            }
        }
        Self::finish(renorm4(out[0], out[1], out[2], out[3]), out[0])
    }
}

impl_composite!(QuadFloat, 4);

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rug::Float as MpFloat;

    use super::*;
    use crate::float::DoubleDouble;
    use crate::int::Int;

    const PREC: u32 = 600;

    fn mp(x: QuadDouble) -> MpFloat {
        x.limbs()
            .iter()
            .fold(MpFloat::with_val(PREC, 0), |acc, &l| acc + l)
    }

    fn rel_err(got: QuadDouble, exact: &MpFloat) -> f64 {
        let diff = MpFloat::with_val(PREC, &mp(got) - exact);
        MpFloat::with_val(PREC, &diff / exact).abs().to_f64()
    }

    fn operand() -> impl Strategy<Value = QuadDouble> {
        (
            prop_oneof![-1e40f64..-1e-40, 1e-40f64..1e40],
            -0.5f64..0.5,
            -0.5f64..0.5,
            -0.5f64..0.5,
        )
            .prop_map(|(c0, r1, r2, r3)| {
                let c1 = r1 * c0 * f64::EPSILON;
                let c2 = r2 * c1 * f64::EPSILON;
                let c3 = r3 * c2 * f64::EPSILON;
                QuadDouble::new(c0, c1, c2, c3)
            })
    }

    fn qd(x: f64) -> QuadDouble {
        QuadDouble::from(x)
    }

    #[test]
    fn constructor_accepts_unordered_terms() {
        let q = QuadDouble::new(1e-300, 1.0, 0.0, 0.0);
        assert_eq!(q.limbs(), [1.0, 1e-300, 0.0, 0.0]);

        let q = QuadDouble::new(2f64.powi(-120), 2f64.powi(-60), 1.0, 0.0);
        assert_eq!(q.limbs(), [1.0, 2f64.powi(-60), 2f64.powi(-120), 0.0]);

        let q = QuadDouble::new(0.0, 1.0, -1.0, 2f64.powi(-200));
        assert_eq!(q.limbs(), [2f64.powi(-200), 0.0, 0.0, 0.0]);
    }

    #[test]
    fn sqrt_of_subnormal_and_tiny_values() {
        for x in [1e-310, f64::MIN_POSITIVE, 5e-324, 1e-300] {
            let root = qd(x).sqrt();
            assert!(root.is_finite(), "sqrt({x:e})");
            assert_eq!(root.hi(), x.sqrt(), "sqrt({x:e})");
            let exact = MpFloat::with_val(PREC, MpFloat::with_val(PREC, x).sqrt_ref());
            assert!(rel_err(root, &exact) <= 2f64.powi(-204), "sqrt({x:e})");
        }
        assert!(QuadSingle::from(f32::from_bits(1)).sqrt().is_finite());
        assert!(QuadSingle::from(f32::MIN_POSITIVE).sqrt().is_finite());
    }

    #[test]
    fn division_round_trips_within_epsilon() {
        for (a, b) in [(1.0, 3.0), (2.0, 7.0), (-1e10, 3e-7)] {
            let (a, b) = (qd(a), qd(b));
            let back = (a / b) * b;
            assert!(((back - a).abs() / a.abs()).hi() <= 2f64.powi(-204), "{a} / {b}");
        }
    }

    #[test]
    fn sum_merges_limbs_by_magnitude() {
        let tiny = 2f64.powi(-150);
        let x = qd(1.0) + tiny;
        assert_eq!(x.limbs(), [1.0, tiny, 0.0, 0.0]);
        let y = x + QuadDouble::new(-1.0, 2f64.powi(-60), 0.0, 0.0);
        assert_eq!(y.limbs(), [2f64.powi(-60), tiny, 0.0, 0.0]);
        assert_eq!((x - x).limbs(), [0.0; 4]);
    }

    #[test]
    fn one_third_fills_the_low_limbs() {
        let third = qd(1.0) / 3.0;
        assert_eq!(third.hi(), 1.0 / 3.0);
        assert!(third.limbs()[2] != 0.0);
        let err = (third * 3.0 - 1.0).abs().hi();
        assert!(err <= 2f64.powi(-206));
        let dd_err = ((DoubleDouble::from(1.0) / 3.0) * 3.0 - 1.0).abs().hi();
        assert!(dd_err <= 2f64.powi(-102));
    }

    #[test]
    fn special_values_and_zero_signs() {
        let inf = QuadDouble::infinity();
        assert_eq!((inf + qd(1.0)).limbs(), [f64::INFINITY, 0.0, 0.0, 0.0]);
        assert!((inf - inf).is_nan());
        assert!((qd(0.0) / qd(0.0)).is_nan());
        assert_eq!((qd(-2.0) / qd(0.0)).hi(), f64::NEG_INFINITY);
        assert!(qd(-4.0).sqrt().is_nan());
        assert!((qd(-0.0) + qd(-0.0)).is_sign_negative());
        assert!((qd(-0.0) * qd(3.0)).is_sign_negative());
        assert!(!(qd(-0.0) + qd(0.0)).is_sign_negative());
        assert!((qd(0.0) / qd(-1.0)).is_sign_negative());
    }

    #[test]
    fn rounding_functions() {
        let x = QuadDouble::new(4.0, 2f64.powi(-80), 0.0, 0.0);
        assert_eq!(x.floor(), 4.0);
        assert_eq!(x.ceil(), 5.0);
        let y = QuadDouble::new(2f64.powi(80), 1.0, 0.25, 0.0);
        assert_eq!(y.floor().limbs(), [2f64.powi(80), 1.0, 0.0, 0.0]);
        assert_eq!(y.ceil().limbs(), [2f64.powi(80), 2.0, 0.0, 0.0]);
        assert_eq!(y.round().limbs(), [2f64.powi(80), 1.0, 0.0, 0.0]);
        assert_eq!(qd(-3.5).round(), -4.0);
        assert_eq!(qd(-3.5).trunc(), -3.0);
    }

    #[test]
    fn exact_integers() {
        let big: Int = "1234567890123456789012345678901234567890123456789012345"
            .parse()
            .unwrap();
        let x = QuadDouble::from_int(&big);
        assert_eq!(x.to_int().unwrap(), big);
        assert_eq!(QuadDouble::from(i128::MAX).to_i128(), Some(i128::MAX));
        assert_eq!(QuadDouble::from(u128::MAX).to_int().unwrap().to_u128(), Some(u128::MAX));
    }

    #[test]
    fn text_and_limits() {
        assert_eq!(QuadDouble::DIGITS, 212);
        assert_eq!(QuadDouble::DIGITS10, 63);
        assert_eq!(QuadDouble::MAX_DIGITS10, 65);
        assert_eq!(QuadDouble::epsilon(), 2f64.powi(-209));
        assert_eq!(QuadSingle::DIGITS, 96);
        assert_eq!(QuadDouble::min_positive(), 2f64.powi(-863));

        let pi: QuadDouble =
            "3.14159265358979323846264338327950288419716939937510582097494459230781640628620899"
                .parse()
                .unwrap();
        assert_eq!(pi.hi(), std::f64::consts::PI);
        assert_eq!(
            format!("{pi:.60}"),
            "3.141592653589793238462643383279502884197169399375105820974945"
        );
        assert_eq!(format!("{:.10}", pi), "3.1415926536");
        assert_eq!(format!("{:?}", qd(0.5)), "QuadFloat([0.5, 0.0, 0.0, 0.0])");
    }

    #[test]
    fn sqrt_of_two() {
        let root = qd(2.0).sqrt();
        let exact = MpFloat::with_val(PREC, 2).sqrt();
        assert!(rel_err(root, &exact) <= 2f64.powi(-204));
        assert!(((root.sqr() - 2.0).abs()).hi() <= 2f64.powi(-203));
    }

    #[test]
    fn single_precision_limbs() {
        let third = QuadSingle::from(1.0f32) / 3.0;
        let err = (third * 3.0 - 1.0).abs().hi();
        assert!(err <= 2f32.powi(-90));
        assert_eq!(QuadSingle::epsilon(), 2f32.powi(-93));
    }

    proptest! {
        #[test]
        fn arithmetic_matches_the_oracle(a in operand(), b in operand()) {
            let tolerance = 2f64.powi(-204);
            let (ma, mb) = (mp(a), mp(b));
            prop_assert!(rel_err(a * b, &MpFloat::with_val(PREC, &ma * &mb)) <= tolerance);
            prop_assert!(rel_err(a / b, &MpFloat::with_val(PREC, &ma / &mb)) <= tolerance);
            let sum = MpFloat::with_val(PREC, &ma + &mb);
            let scale = ma.clone().abs().max(&mb.clone().abs());
            let err = MpFloat::with_val(PREC, &mp(a + b) - &sum).abs();
            prop_assert!(MpFloat::with_val(PREC, &err / &scale).to_f64() <= tolerance);
        }

        #[test]
        fn mixed_operations_match_full_ones(a in operand(), b in -1e10f64..1e10) {
            let tolerance = 2f64.powi(-203);
            let full = qd(b);
            let scale = a.abs().hi().max(b.abs());
            prop_assert!(((a * b - a * full).abs() / (a * full).abs()).hi() <= tolerance);
            prop_assert!(((a + b) - (a + full)).abs().hi() / scale <= tolerance);
        }

        #[test]
        fn sqrt_matches_the_oracle(a in operand()) {
            let a = a.abs();
            let exact = MpFloat::with_val(PREC, mp(a).sqrt_ref());
            prop_assert!(rel_err(a.sqrt(), &exact) <= 2f64.powi(-204));
        }

        #[test]
        fn text_round_trip(a in operand()) {
            let back: QuadDouble = a.to_string().parse().unwrap();
            prop_assert!(((back - a).abs() / a.abs()).hi() <= 2f64.powi(-206));
        }

        #[test]
        fn constructor_is_order_independent(
            a in -1e20f64..1e20,
            b in -1.0f64..1.0,
            c in -1.0f64..1.0,
            shift in 0i32..150,
        ) {
            let (b, c) = (b * 2f64.powi(-shift / 2), c * 2f64.powi(-shift));
            let exact = [a, b, c].iter().fold(MpFloat::with_val(PREC, 0), |acc, &t| acc + t);
            let scale = a.abs().max(b.abs()).max(c.abs());
            for q in [
                QuadDouble::new(a, b, c, 0.0),
                QuadDouble::new(c, b, a, 0.0),
                QuadDouble::new(b, 0.0, c, a),
            ] {
                let err = MpFloat::with_val(PREC, &mp(q) - &exact).abs().to_f64();
                prop_assert!(err <= scale * 2f64.powi(-210));
                for pair in q.limbs().windows(2) {
                    prop_assert!(pair[1].abs() <= pair[0].abs() * f64::EPSILON);
                }
            }
        }

        #[test]
        fn limbs_do_not_overlap(a in operand(), b in operand()) {
            let p = (a * b).limbs();
            for pair in p.windows(2) {
                prop_assert!(pair[1].abs() <= pair[0].abs() * f64::EPSILON);
            }
        }
    }
}
