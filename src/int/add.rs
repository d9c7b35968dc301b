use super::BigInt;
use crate::error::Result;
use crate::limb::{
    add_magnitude_assign, add_magnitudes, sub_magnitude_assign, sub_magnitudes, Limb, Native,
};

impl<const BITS: usize, const SIGNED: bool, const CHECKED: bool> BigInt<BITS, SIGNED, CHECKED> {
    /// `result = |a| + |b|` with the sign of `a`.
    pub fn add_unsigned(result: &mut Self, a: &Self, b: &Self) -> Result<()> {
        add_magnitudes::<Native>(&mut result.mag, a.mag.as_slice(), b.mag.as_slice());
        result.negative = a.negative;
        result.finish()
    }

    /// `result = |a| - |b|` with the sign of `a`, flipped when `|b| > |a|`.
    pub fn subtract_unsigned(result: &mut Self, a: &Self, b: &Self) -> Result<()> {
        let flipped = sub_magnitudes::<Native>(&mut result.mag, a.mag.as_slice(), b.mag.as_slice());
        result.negative = a.negative != flipped;
        result.finish()
    }

    /// `result = a + b`.
    pub fn add_into(result: &mut Self, a: &Self, b: &Self) -> Result<()> {
        if a.negative == b.negative {
            Self::add_unsigned(result, a, b)
        } else {
            Self::subtract_unsigned(result, a, b)
        }
    }

    /// `result = a - b`.
    pub fn subtract_into(result: &mut Self, a: &Self, b: &Self) -> Result<()> {
        if a.negative != b.negative {
            Self::add_unsigned(result, a, b)
        } else {
            Self::subtract_unsigned(result, a, b)
        }
    }

    /// `self += (-1)^negative * |mag|`.
    pub(crate) fn add_signed_magnitude(&mut self, mag: &[Limb], negative: bool) -> Result<()> {
        if self.negative == negative {
            add_magnitude_assign::<Native>(&mut self.mag, mag);
        } else {
            let flipped = sub_magnitude_assign::<Native>(&mut self.mag, mag);
            self.negative ^= flipped;
        }
        self.finish()
    }

    pub fn eval_add(&mut self, rhs: &Self) -> Result<()> {
        self.add_signed_magnitude(rhs.mag.as_slice(), rhs.negative)
    }

    pub fn eval_subtract(&mut self, rhs: &Self) -> Result<()> {
        let negative = !rhs.negative && !rhs.is_zero();
        self.add_signed_magnitude(rhs.mag.as_slice(), negative)
    }

    pub fn eval_add_limb(&mut self, limb: Limb) -> Result<()> {
        self.add_signed_magnitude(&[limb], false)
    }

    pub fn eval_subtract_limb(&mut self, limb: Limb) -> Result<()> {
        self.add_signed_magnitude(&[limb], limb != 0)
    }

    pub fn eval_increment(&mut self) -> Result<()> {
        self.eval_add_limb(1)
    }

    pub fn eval_decrement(&mut self) -> Result<()> {
        self.eval_subtract_limb(1)
    }

    pub fn eval_negate(&mut self) -> Result<()> {
        if !self.is_zero() {
            self.negative = !self.negative;
        }
        self.finish()
    }

    pub fn eval_abs(&mut self) -> Result<()> {
        self.negative = false;
        self.finish()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::int::{Int, U4096};
    use crate::limb::{Portable, LIMB_BITS};

    fn int(v: i128) -> Int {
        Int::from_i128(v).unwrap()
    }

    #[test]
    fn signed_addition_crosses_zero() {
        let mut v = int(5);
        v.eval_add(&int(-7)).unwrap();
        assert_eq!(v, int(-2));
        v.eval_subtract(&int(-2)).unwrap();
        assert_eq!(v, Int::zero());
        assert!(!v.is_negative());
        v.eval_subtract_limb(3).unwrap();
        assert_eq!(v, int(-3));
    }

    #[test]
    fn three_operand_forms_match_in_place() {
        let a = int(-1 << 100);
        let b = int(12345);
        let mut r = Int::zero();
        Int::add_into(&mut r, &a, &b).unwrap();
        let mut expected = a.clone();
        expected.eval_add(&b).unwrap();
        assert_eq!(r, expected);

        Int::subtract_into(&mut r, &b, &a).unwrap();
        assert_eq!(r, int(12345 + (1 << 100)));

        Int::subtract_unsigned(&mut r, &b, &a).unwrap();
        assert_eq!(r, int(-(1 << 100) + 12345));
    }

    #[test]
    fn wide_unsigned_add_matches_portable_chain() {
        let limbs = 4096 / LIMB_BITS;
        let a: Vec<Limb> = (0..limbs).map(|i| Limb::MAX - i as Limb).collect();
        let b: Vec<Limb> = (0..limbs).map(|i| (i as Limb).wrapping_mul(0x9E37_79B9)).collect();

        let mut sum = U4096::from_limbs(&a).unwrap();
        sum.eval_add(&U4096::from_limbs(&b).unwrap()).unwrap();

        let mut portable = crate::limb::LimbStore::zero();
        add_magnitudes::<Portable>(&mut portable, &a, &b);
        portable.truncate(limbs);
        portable.normalize();
        assert_eq!(sum.limbs(), portable.as_slice());
    }

    proptest! {
        #[test]
        fn addition_commutes_and_associates(a: i128, b: i128, c: i64) {
            let (a, b, c) = (int(a), int(b), int(c as i128));
            let mut ab = a.clone();
            ab.eval_add(&b).unwrap();
            let mut ba = b.clone();
            ba.eval_add(&a).unwrap();
            prop_assert_eq!(&ab, &ba);

            let mut ab_c = ab.clone();
            ab_c.eval_add(&c).unwrap();
            let mut bc = b.clone();
            bc.eval_add(&c).unwrap();
            let mut a_bc = a.clone();
            a_bc.eval_add(&bc).unwrap();
            prop_assert_eq!(&ab_c, &a_bc);
            prop_assert!(ab_c.limbs().len() == 1 || *ab_c.limbs().last().unwrap() != 0);
        }

        #[test]
        fn self_subtraction_is_zero(a: i128) {
            let a = int(a);
            let mut d = a.clone();
            d.eval_subtract(&a).unwrap();
            prop_assert!(d.is_zero());
            prop_assert!(!d.is_negative());
        }

        #[test]
        fn matches_native_arithmetic(a: i64, b: i64) {
            let mut s = int(a as i128);
            s.eval_add(&int(b as i128)).unwrap();
            prop_assert_eq!(s.to_i128(), Some(a as i128 + b as i128));
            let mut d = int(a as i128);
            d.eval_subtract(&int(b as i128)).unwrap();
            prop_assert_eq!(d.to_i128(), Some(a as i128 - b as i128));
        }
    }
}
