use std::cmp::Ordering;

use tracing::trace;

use super::BigInt;
use crate::error::{Error, Result};
use crate::limb::{
    cmp_magnitudes, shl_bits_in_place, shr_bits_in_place, CarryChain, DoubleLimb, Limb,
    LimbStore, Native, LIMB_BITS,
};

/// Divides `limbs` by `d != 0` in place, returning the remainder.
pub(crate) fn div_rem_limb_in_place(limbs: &mut LimbStore, d: Limb) -> Limb {
    let d = d as DoubleLimb;
    let mut rem: DoubleLimb = 0;
    for limb in limbs.as_mut_slice().iter_mut().rev() {
        let cur = (rem << LIMB_BITS) | *limb as DoubleLimb;
        *limb = (cur / d) as Limb;
        rem = cur % d;
    }
    limbs.normalize();
    rem as Limb
}

/// `(|a| / |b|, |a| % |b|)` for `b != 0`, by Knuth's algorithm D.
pub(crate) fn div_rem_magnitudes(a: &[Limb], b: &[Limb]) -> (LimbStore, LimbStore) {
    let la = a.iter().rposition(|&l| l != 0).map_or(1, |i| i + 1);
    let lb = b.iter().rposition(|&l| l != 0).map_or(1, |i| i + 1);
    let (a, b) = (&a[..la], &b[..lb]);

    if cmp_magnitudes(a, b) == Ordering::Less {
        return (LimbStore::zero(), LimbStore::from_slice(a));
    }
    if lb == 1 {
        let mut q = LimbStore::from_slice(a);
        let r = div_rem_limb_in_place(&mut q, b[0]);
        return (q, LimbStore::from_limb(r));
    }

    let n = lb;
    let m = la - n;
    trace!(dividend = la, divisor = lb, "long division");
    let shift = b[n - 1].leading_zeros();

    let mut v = b.to_vec();
    shl_bits_in_place(&mut v, shift);
    let mut u = Vec::with_capacity(la + 1);
    u.extend_from_slice(a);
    u.push(0);
    u[la] = shl_bits_in_place(&mut u[..la], shift);

    let base: DoubleLimb = 1 << LIMB_BITS;
    let v_top = v[n - 1] as DoubleLimb;
    let v_next = v[n - 2] as DoubleLimb;
    let mut q = LimbStore::with_len(m + 1);

    for j in (0..=m).rev() {
        let num = ((u[j + n] as DoubleLimb) << LIMB_BITS) | u[j + n - 1] as DoubleLimb;
        let mut qhat = num / v_top;
        let mut rhat = num % v_top;
        while qhat >= base || qhat * v_next > ((rhat << LIMB_BITS) | u[j + n - 2] as DoubleLimb) {
            qhat -= 1;
            rhat += v_top;
            if rhat >= base {
                break;
            }
        }

        // u[j..=j+n] -= qhat * v
        let mut carry: Limb = 0;
        let mut borrow = false;
        for i in 0..n {
            let p = qhat * v[i] as DoubleLimb + carry as DoubleLimb;
            carry = (p >> LIMB_BITS) as Limb;
            let (d1, b1) = u[i + j].overflowing_sub(p as Limb);
            let (d2, b2) = d1.overflowing_sub(borrow as Limb);
            u[i + j] = d2;
            borrow = b1 | b2;
        }
        let (d1, b1) = u[j + n].overflowing_sub(carry);
        let (d2, b2) = d1.overflowing_sub(borrow as Limb);
        u[j + n] = d2;

        let mut digit = qhat as Limb;
        if b1 | b2 {
            // qhat was one too large
            digit -= 1;
            let c = Native::add_assign_n(&mut u[j..j + n], &v, false);
            u[j + n] = u[j + n].wrapping_add(c as Limb);
        }
        q.as_mut_slice()[j] = digit;
    }

    shr_bits_in_place(&mut u[..n], shift);
    q.normalize();
    (q, LimbStore::from_slice(&u[..n]))
}

impl<const BITS: usize, const SIGNED: bool, const CHECKED: bool> BigInt<BITS, SIGNED, CHECKED> {
    /// Truncating quotient and remainder; the remainder takes the sign of
    /// `self`.
    pub fn divide_qr(&self, rhs: &Self) -> Result<(Self, Self)> {
        if rhs.is_zero() {
            return Err(Error::DivisionByZero);
        }
        let (q, r) = div_rem_magnitudes(self.mag.as_slice(), rhs.mag.as_slice());
        let quotient = Self::from_parts(q, self.negative != rhs.negative)?;
        let remainder = Self::from_parts(r, self.negative)?;
        Ok((quotient, remainder))
    }

    /// `self /= rhs`, truncating toward zero.
    pub fn eval_divide(&mut self, rhs: &Self) -> Result<()> {
        if rhs.is_zero() {
            return Err(Error::DivisionByZero);
        }
        let (q, _) = div_rem_magnitudes(self.mag.as_slice(), rhs.mag.as_slice());
        self.mag = q;
        self.negative ^= rhs.negative;
        self.finish()
    }

    /// `self %= rhs`; the result has the sign of the dividend.
    pub fn eval_modulus(&mut self, rhs: &Self) -> Result<()> {
        if rhs.is_zero() {
            return Err(Error::DivisionByZero);
        }
        let (_, r) = div_rem_magnitudes(self.mag.as_slice(), rhs.mag.as_slice());
        self.mag = r;
        self.finish()
    }

    /// `self /= d`, returning the magnitude of the remainder.
    pub fn eval_divide_limb(&mut self, d: Limb) -> Result<Limb> {
        if d == 0 {
            return Err(Error::DivisionByZero);
        }
        let rem = div_rem_limb_in_place(&mut self.mag, d);
        self.finish()?;
        Ok(rem)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rug::integer::Order;

    use super::*;
    use crate::int::{CheckedI128, Int, I128, U256};

    fn int(v: i128) -> Int {
        Int::from_i128(v).unwrap()
    }

    #[test]
    fn truncates_toward_zero() {
        for (a, b) in [(7, 2), (-7, 2), (7, -2), (-7, -2), (6, 3), (1, 5), (0, -3)] {
            let (q, r) = int(a).divide_qr(&int(b)).unwrap();
            assert_eq!(q.to_i128(), Some(a / b), "{a} / {b}");
            assert_eq!(r.to_i128(), Some(a % b), "{a} % {b}");
        }
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let mut v = int(10);
        assert_eq!(v.eval_divide(&Int::zero()), Err(Error::DivisionByZero));
        assert_eq!(v.eval_modulus(&Int::zero()), Err(Error::DivisionByZero));
        assert_eq!(v.eval_divide_limb(0), Err(Error::DivisionByZero));
        assert_eq!(v, int(10));
    }

    #[test]
    fn min_over_minus_one() {
        let mut v = I128::min_value().unwrap();
        v.eval_divide(&I128::from_i128(-1).unwrap()).unwrap();
        assert_eq!(v.to_i128(), Some(i128::MIN));

        let mut c = CheckedI128::min_value().unwrap();
        assert!(c.eval_divide(&CheckedI128::from_i128(-1).unwrap()).is_err());
    }

    #[test]
    fn correction_step_is_exercised() {
        // Divisors whose normalized top limbs make the first estimate too large.
        let a = [0, 0, 0, 1 << (LIMB_BITS - 1)];
        let b = [1, 0, 1 << (LIMB_BITS - 1)];
        let (q, r) = div_rem_magnitudes(&a, &b);
        let na = rug::Integer::from_digits(&a, Order::Lsf);
        let nb = rug::Integer::from_digits(&b, Order::Lsf);
        let (nq, nr) = na.div_rem(nb);
        assert_eq!(q.as_slice(), nq.to_digits::<Limb>(Order::Lsf).as_slice());
        assert_eq!(r.as_slice(), nr.to_digits::<Limb>(Order::Lsf).as_slice());
    }

    #[test]
    fn single_limb_division() {
        let mut v = U256::from_limbs(&[0, 0, 1]).unwrap();
        let rem = v.eval_divide_limb(3).unwrap();
        let expected = rug::Integer::from(1) << (2 * LIMB_BITS as u32);
        let (q, r) = expected.div_rem(rug::Integer::from(3));
        assert_eq!(v.limbs(), q.to_digits::<Limb>(Order::Lsf).as_slice());
        assert_eq!(rug::Integer::from(rem), r);
    }

    proptest! {
        #[test]
        fn quotient_and_remainder_reconstruct(
            a in prop::collection::vec(any::<Limb>(), 1..24),
            b in prop::collection::vec(any::<Limb>(), 1..12),
            a_neg: bool,
            b_neg: bool,
        ) {
            let mut x = Int::from_limbs(&a).unwrap();
            let mut y = Int::from_limbs(&b).unwrap();
            prop_assume!(!y.is_zero());
            if a_neg { x.eval_negate().unwrap(); }
            if b_neg { y.eval_negate().unwrap(); }

            let (q, r) = x.divide_qr(&y).unwrap();
            prop_assert_eq!(r.compare_magnitude(&y), Ordering::Less);
            prop_assert!(r.is_zero() || r.is_negative() == x.is_negative());

            let mut back = q.clone();
            back.eval_multiply(&y).unwrap();
            back.eval_add(&r).unwrap();
            prop_assert_eq!(back, x);
        }

        #[test]
        fn magnitudes_match_gmp(
            a in prop::collection::vec(any::<Limb>(), 1..40),
            b in prop::collection::vec(any::<Limb>(), 2..20),
        ) {
            let nb = rug::Integer::from_digits(&b, Order::Lsf);
            prop_assume!(nb != 0);
            let na = rug::Integer::from_digits(&a, Order::Lsf);
            let (q, r) = div_rem_magnitudes(&a, &b);
            let (nq, nr) = na.div_rem(nb);
            let digits = |n: &rug::Integer| {
                let mut d = n.to_digits::<Limb>(Order::Lsf);
                if d.is_empty() {
                    d.push(0);
                }
                d
            };
            prop_assert_eq!(q.as_slice(), digits(&nq).as_slice());
            prop_assert_eq!(r.as_slice(), digits(&nr).as_slice());
        }
    }
}
