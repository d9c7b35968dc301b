//! Error-free transformations: each returns a rounded result together with
//! its exact rounding error, so that `hi + lo` equals the infinitely precise
//! value. All of them assume finite operands.

use super::FloatLimb;

/// `a + b = s + e` exactly.
#[inline]
pub fn two_sum<F: FloatLimb>(a: F, b: F) -> (F, F) {
    let s = a + b;
    let v = s - a;
    let e = (a - (s - v)) + (b - v);
    (s, e)
}

/// [`two_sum`] for `|a| >= |b|` (or `a == 0`).
#[inline]
pub fn fast_two_sum<F: FloatLimb>(a: F, b: F) -> (F, F) {
    let s = a + b;
    let e = b - (s - a);
    (s, e)
}

/// `a - b = s + e` exactly.
#[inline]
pub fn two_diff<F: FloatLimb>(a: F, b: F) -> (F, F) {
    let s = a - b;
    let bb = s - a;
    let e = (a - (s - bb)) - (b + bb);
    (s, e)
}

/// Splits `a` into `hi + lo` with each half holding at most
/// `ceil(p / 2)` significant bits.
#[inline]
pub fn split<F: FloatLimb>(a: F) -> (F, F) {
    if a > F::SPLIT_THRESHOLD || a < -F::SPLIT_THRESHOLD {
        let scaled = a.ldexp(-F::SPLIT_SHIFT);
        let t = F::SPLITTER * scaled;
        let hi = t - (t - scaled);
        let lo = scaled - hi;
        (hi.ldexp(F::SPLIT_SHIFT), lo.ldexp(F::SPLIT_SHIFT))
    } else {
        let t = F::SPLITTER * a;
        let hi = t - (t - a);
        (hi, a - hi)
    }
}

/// `a * b = p + e` exactly, using a fused multiply-add.
#[inline]
pub fn two_prod<F: FloatLimb>(a: F, b: F) -> (F, F) {
    let p = a * b;
    (p, a.mul_add(b, -p))
}

/// [`two_prod`] by Dekker splitting, for targets without a fast FMA.
pub fn two_prod_dekker<F: FloatLimb>(a: F, b: F) -> (F, F) {
    let p = a * b;
    let (a_hi, a_lo) = split(a);
    let (b_hi, b_lo) = split(b);
    let e = ((a_hi * b_hi - p) + a_hi * b_lo + a_lo * b_hi) + a_lo * b_lo;
    (p, e)
}

/// `a * a = p + e` exactly.
#[inline]
pub fn two_sqr<F: FloatLimb>(a: F) -> (F, F) {
    let p = a * a;
    (p, a.mul_add(a, -p))
}

/// Sums three terms into three non-overlapping terms.
#[inline]
pub fn three_sum<F: FloatLimb>(a: F, b: F, c: F) -> (F, F, F) {
    let (t1, t2) = two_sum(a, b);
    let (s, t3) = two_sum(c, t1);
    let (m, e) = two_sum(t2, t3);
    (s, m, e)
}

/// Sums three terms into two, dropping the error of the second.
#[inline]
pub fn three_sum2<F: FloatLimb>(a: F, b: F, c: F) -> (F, F) {
    let (t1, t2) = two_sum(a, b);
    let (s, t3) = two_sum(c, t1);
    (s, t2 + t3)
}

/// Renormalizes a pair in either order so that `|lo| <= ulp(hi) / 2`.
#[inline]
pub fn normalize_pair<F: FloatLimb>(hi: F, lo: F) -> (F, F) {
    let (s, e) = two_sum(hi, lo);
    if !s.is_finite() {
        return (s, F::zero());
    }
    (s, e)
}

/// Collapses `N` roughly ordered terms into four non-overlapping limbs.
///
/// A bottom-up pass of fast two-sums pushes error terms downward; a top-down
/// pass then emits a limb only when its residual is non-zero, so that exact
/// cancellations do not leave gaps that swallow the tail.
fn renorm<F: FloatLimb, const N: usize>(c: [F; N]) -> [F; 4] {
    let zero = F::zero();
    if !c[0].is_finite() {
        return [c[0], zero, zero, zero];
    }

    let mut t = [zero; N];
    let mut s = c[N - 1];
    for i in (0..N - 1).rev() {
        (s, t[i + 1]) = fast_two_sum(c[i], s);
    }
    t[0] = s;

    let mut out = [zero; 4];
    let mut k = 0;
    let mut s = t[0];
    for &term in &t[1..] {
        let (hi, lo) = fast_two_sum(s, term);
        if lo != zero {
            out[k] = hi;
            k += 1;
            if k == 4 {
                return out;
            }
            s = lo;
        } else {
            s = hi;
        }
    }
    out[k] = s;
    out
}

pub fn renorm4<F: FloatLimb>(c0: F, c1: F, c2: F, c3: F) -> [F; 4] {
    renorm([c0, c1, c2, c3])
}

/// [`renorm4`] folding in a fifth, smallest error term.
pub fn renorm5<F: FloatLimb>(c0: F, c1: F, c2: F, c3: F, c4: F) -> [F; 4] {
    renorm([c0, c1, c2, c3, c4])
}
