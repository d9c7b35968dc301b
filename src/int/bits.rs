use super::{ones, BigInt};
use crate::error::{Error, Result};
use crate::limb::{
    add_magnitude_assign, negate_limbs, shl_bits_in_place, shr_bits_in_place,
    sub_magnitude_assign, Limb, LimbStore, Native, LIMB_BITS,
};

pub(super) fn shl_magnitude(mag: &mut LimbStore, n: usize) {
    let whole = n / LIMB_BITS;
    let out = shl_bits_in_place(mag.as_mut_slice(), (n % LIMB_BITS) as u32);
    if out != 0 {
        mag.push(out);
    }
    if whole > 0 {
        let len = mag.len();
        mag.resize(len + whole);
        let limbs = mag.as_mut_slice();
        limbs.copy_within(0..len, whole);
        limbs[..whole].fill(0);
    }
    mag.normalize();
}

pub(super) fn shr_magnitude(mag: &mut LimbStore, n: usize) {
    let whole = n / LIMB_BITS;
    let len = mag.len();
    if whole >= len {
        mag.set_zero();
        return;
    }
    if whole > 0 {
        mag.as_mut_slice().copy_within(whole..len, 0);
        mag.truncate(len - whole);
    }
    shr_bits_in_place(mag.as_mut_slice(), (n % LIMB_BITS) as u32);
    mag.normalize();
}

#[derive(Clone, Copy)]
enum BitOp {
    And,
    Or,
    Xor,
}

impl BitOp {
    fn apply(self, a: Limb, b: Limb) -> Limb {
        match self {
            BitOp::And => a & b,
            BitOp::Or => a | b,
            BitOp::Xor => a ^ b,
        }
    }
}

impl<const BITS: usize, const SIGNED: bool, const CHECKED: bool> BigInt<BITS, SIGNED, CHECKED> {
    /// The value as `len` limbs of two's complement.
    fn twos_complement(&self, len: usize) -> Vec<Limb> {
        let mut limbs = self.mag.as_slice().to_vec();
        limbs.resize(len, 0);
        if self.negative {
            negate_limbs(&mut limbs);
        }
        limbs
    }

    /// Inverse of [`Self::twos_complement`], reading the top bit as the sign.
    fn set_twos_complement(&mut self, mut limbs: Vec<Limb>) {
        let negative = limbs.last().is_some_and(|&top| top >> (LIMB_BITS - 1) == 1);
        if negative {
            negate_limbs(&mut limbs);
        }
        self.mag = LimbStore::from_slice(&limbs);
        self.negative = negative && !self.mag.is_zero();
    }

    fn in_width(index: usize) -> bool {
        BITS == 0 || index < BITS
    }

    fn require_non_negative(&self, op: &'static str) -> Result<()> {
        if self.negative {
            Err(Error::domain(op, "negative value"))
        } else {
            Ok(())
        }
    }

    /// `self <<= n`. Fixed widths discard bits shifted past the top, or report
    /// [`Error::Overflow`] when checked and any significant bit is lost.
    pub fn eval_left_shift(&mut self, n: usize) -> Result<()> {
        if n == 0 || self.is_zero() {
            return Ok(());
        }
        if BITS != 0 && n >= BITS {
            self.mag.set_zero();
            self.negative = false;
            return if CHECKED {
                Err(Error::Overflow { bits: BITS })
            } else {
                Ok(())
            };
        }
        shl_magnitude(&mut self.mag, n);
        self.finish()
    }

    /// `self >>= n`; negative values round toward negative infinity.
    pub fn eval_right_shift(&mut self, n: usize) -> Result<()> {
        if n == 0 || self.is_zero() {
            return Ok(());
        }
        if self.negative {
            // floor(-m / 2^n) = -(((m - 1) >> n) + 1)
            sub_magnitude_assign::<Native>(&mut self.mag, &[1]);
            shr_magnitude(&mut self.mag, n);
            add_magnitude_assign::<Native>(&mut self.mag, &[1]);
        } else {
            shr_magnitude(&mut self.mag, n);
        }
        self.finish()
    }

    /// Bit `index` of the two's-complement representation. Always false past
    /// a fixed width; negative unbounded values read as infinitely
    /// sign-extended.
    pub fn bit_test(&self, index: usize) -> bool {
        if !Self::in_width(index) {
            return false;
        }
        let limb = index / LIMB_BITS;
        let bit = index % LIMB_BITS;
        if !self.negative {
            return (self.mag.get(limb) >> bit) & 1 == 1;
        }
        if limb >= self.mag.len() {
            return true;
        }
        let twos = self.twos_complement(self.mag.len());
        (twos[limb] >> bit) & 1 == 1
    }

    pub fn bit_set(&mut self, index: usize) -> Result<()> {
        self.require_non_negative("bit_set")?;
        if !Self::in_width(index) {
            return Ok(());
        }
        let limb = index / LIMB_BITS;
        if self.mag.len() <= limb {
            self.mag.resize(limb + 1);
        }
        self.mag.as_mut_slice()[limb] |= 1 << (index % LIMB_BITS);
        self.finish()
    }

    pub fn bit_unset(&mut self, index: usize) -> Result<()> {
        self.require_non_negative("bit_unset")?;
        let limb = index / LIMB_BITS;
        if !Self::in_width(index) || limb >= self.mag.len() {
            return Ok(());
        }
        self.mag.as_mut_slice()[limb] &= !(1 << (index % LIMB_BITS));
        self.finish()
    }

    pub fn bit_flip(&mut self, index: usize) -> Result<()> {
        self.require_non_negative("bit_flip")?;
        if !Self::in_width(index) {
            return Ok(());
        }
        let limb = index / LIMB_BITS;
        if self.mag.len() <= limb {
            self.mag.resize(limb + 1);
        }
        self.mag.as_mut_slice()[limb] ^= 1 << (index % LIMB_BITS);
        self.finish()
    }

    /// Index of the most significant set bit of the magnitude.
    pub fn msb(&self) -> Option<usize> {
        self.mag.bit_length().checked_sub(1)
    }

    /// Index of the least significant set bit, identical for `x` and `-x`.
    pub fn lsb(&self) -> Option<usize> {
        let limbs = self.mag.as_slice();
        let i = limbs.iter().position(|&l| l != 0)?;
        Some(i * LIMB_BITS + limbs[i].trailing_zeros() as usize)
    }

    /// Bits in the magnitude.
    pub fn bit_length(&self) -> usize {
        self.mag.bit_length()
    }

    /// Set bits in the magnitude.
    pub fn count_ones(&self) -> u64 {
        self.mag.as_slice().iter().map(|l| l.count_ones() as u64).sum()
    }

    fn bitwise(&mut self, rhs: &Self, op: BitOp) -> Result<()> {
        let len = self.mag.len().max(rhs.mag.len()) + 1;
        let a = self.twos_complement(len);
        let b = rhs.twos_complement(len);
        let limbs = a.iter().zip(&b).map(|(&x, &y)| op.apply(x, y)).collect();
        self.set_twos_complement(limbs);
        self.finish()
    }

    pub fn eval_bitwise_and(&mut self, rhs: &Self) -> Result<()> {
        self.bitwise(rhs, BitOp::And)
    }

    pub fn eval_bitwise_or(&mut self, rhs: &Self) -> Result<()> {
        self.bitwise(rhs, BitOp::Or)
    }

    pub fn eval_bitwise_xor(&mut self, rhs: &Self) -> Result<()> {
        self.bitwise(rhs, BitOp::Xor)
    }

    /// `!self`: `-self - 1` for signed types, `2^BITS - 1 - self` for fixed
    /// unsigned ones. Undefined for unbounded unsigned integers.
    pub fn eval_complement(&mut self) -> Result<()> {
        match (BITS, SIGNED) {
            (0, false) => Err(Error::domain("complement", "unbounded unsigned integer")),
            (_, false) => {
                let mut mask = ones(BITS);
                sub_magnitude_assign::<Native>(&mut mask, self.mag.as_slice());
                self.mag = mask;
                self.finish()
            }
            (_, true) => {
                self.eval_negate()?;
                self.eval_decrement()
            }
        }
    }
}
