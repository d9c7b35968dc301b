//! Limb words, the limb store and the carry-propagating primitives built on it.

mod carry;
mod magnitude;
mod store;

pub use carry::{adc, add_const, mac, sbb, sub_const, CarryChain, Native, Portable};
#[cfg(all(target_arch = "x86_64", target_pointer_width = "64"))]
pub use carry::Intrinsic;
pub(crate) use magnitude::negate_limbs;
pub use magnitude::{
    add_magnitude_assign, add_magnitudes, cmp_magnitudes, sub_magnitude_assign, sub_magnitudes,
};
pub use store::{LimbStore, INLINE_LIMBS};

#[cfg(target_pointer_width = "64")]
pub type Limb = u64;
#[cfg(target_pointer_width = "64")]
pub type DoubleLimb = u128;
#[cfg(target_pointer_width = "64")]
const LIMB_LOG2_BITS: usize = 6;
/// Most decimal digits any limb value of that many digits can hold.
#[cfg(target_pointer_width = "64")]
pub const LIMB_DIGITS: usize = 19;

#[cfg(target_pointer_width = "32")]
pub type Limb = u32;
#[cfg(target_pointer_width = "32")]
pub type DoubleLimb = u64;
#[cfg(target_pointer_width = "32")]
const LIMB_LOG2_BITS: usize = 5;
#[cfg(target_pointer_width = "32")]
pub const LIMB_DIGITS: usize = 9;

pub const LIMB_BITS: usize = 1 << LIMB_LOG2_BITS;

/// `10^LIMB_DIGITS`, the chunk base used by decimal conversion.
pub const LIMB_TEN_POW: Limb = ten_pow(LIMB_DIGITS);

const fn ten_pow(n: usize) -> Limb {
    let mut p: Limb = 1;
    let mut i = 0;
    while i < n {
        p *= 10;
        i += 1;
    }
    p
}

/// Word size of a limb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimbWidth {
    W32,
    W64,
}

impl LimbWidth {
    #[cfg(target_pointer_width = "64")]
    pub const NATIVE: LimbWidth = LimbWidth::W64;
    #[cfg(target_pointer_width = "32")]
    pub const NATIVE: LimbWidth = LimbWidth::W32;

    pub const fn bits(self) -> usize {
        match self {
            LimbWidth::W32 => 32,
            LimbWidth::W64 => 64,
        }
    }

    /// Number of limbs needed for `bits` bits.
    pub const fn limbs_for(self, bits: usize) -> usize {
        bits.div_ceil(self.bits())
    }

    pub const fn decimal_digits(self) -> usize {
        match self {
            LimbWidth::W32 => 9,
            LimbWidth::W64 => 19,
        }
    }
}

/// Shifts `limbs` left by `bits < LIMB_BITS`, returning the bits shifted out.
pub(crate) fn shl_bits_in_place(limbs: &mut [Limb], bits: u32) -> Limb {
    if bits == 0 {
        return 0;
    }
    let mut carry = 0;
    for limb in limbs.iter_mut() {
        let next = *limb >> (LIMB_BITS as u32 - bits);
        *limb = (*limb << bits) | carry;
        carry = next;
    }
    carry
}

/// Shifts `limbs` right by `bits < LIMB_BITS`, returning the bits shifted out
/// (left aligned).
pub(crate) fn shr_bits_in_place(limbs: &mut [Limb], bits: u32) -> Limb {
    if bits == 0 {
        return 0;
    }
    let mut carry = 0;
    for limb in limbs.iter_mut().rev() {
        let next = *limb << (LIMB_BITS as u32 - bits);
        *limb = (*limb >> bits) | carry;
        carry = next;
    }
    carry
}
