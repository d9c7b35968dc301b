//! Fixed- and variable-width big integers in sign-magnitude form with
//! two's-complement width semantics.

mod add;
mod bits;
mod convert;
mod div;
mod functions;
mod mul;
mod string;

use std::cmp::Ordering;
use std::fmt;

pub use mul::{mul_karatsuba, mul_schoolbook, KARATSUBA_MAX_DEPTH, KARATSUBA_THRESHOLD};

use crate::error::{Error, Result};
use crate::limb::{cmp_magnitudes, negate_limbs, Limb, LimbStore, LIMB_BITS};

/// Big integer backend.
///
/// * `BITS == 0` is unbounded; otherwise values are confined to `BITS` bits:
///   `[-2^(BITS-1), 2^(BITS-1) - 1]` when `SIGNED`, `[0, 2^BITS - 1]` when not.
/// * `CHECKED` turns results outside that range into [`Error::Overflow`];
///   unchecked types wrap modulo `2^BITS`.
///
/// Every `eval_*` method mutates `self` in place (the result aliases the first
/// operand). When an error is returned `self` still holds a valid in-range
/// value, but not a meaningful one.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BigInt<const BITS: usize = 0, const SIGNED: bool = true, const CHECKED: bool = false> {
    mag: LimbStore,
    negative: bool,
}

/// Unbounded signed integer.
pub type Int = BigInt;
/// Unbounded unsigned integer; negative results are errors.
pub type UInt = BigInt<0, false, false>;

pub type I128 = BigInt<128, true, false>;
pub type U128 = BigInt<128, false, false>;
pub type I256 = BigInt<256, true, false>;
pub type U256 = BigInt<256, false, false>;
pub type I512 = BigInt<512, true, false>;
pub type U512 = BigInt<512, false, false>;
pub type U1024 = BigInt<1024, false, false>;
pub type U4096 = BigInt<4096, false, false>;

pub type CheckedI128 = BigInt<128, true, true>;
pub type CheckedU128 = BigInt<128, false, true>;
pub type CheckedI256 = BigInt<256, true, true>;
pub type CheckedU256 = BigInt<256, false, true>;
pub type CheckedU4096 = BigInt<4096, false, true>;

impl<const BITS: usize, const SIGNED: bool, const CHECKED: bool> Default
    for BigInt<BITS, SIGNED, CHECKED>
{
    fn default() -> Self {
        Self::zero()
    }
}

impl<const BITS: usize, const SIGNED: bool, const CHECKED: bool> BigInt<BITS, SIGNED, CHECKED> {
    pub const WIDTH: usize = BITS;
    pub const IS_SIGNED: bool = SIGNED;
    pub const IS_CHECKED: bool = CHECKED;
    pub const IS_BOUNDED: bool = BITS != 0;

    /// Limbs needed to hold `BITS` bits.
    pub(crate) const MAX_LIMBS: usize = if BITS == 0 {
        usize::MAX
    } else {
        BITS.div_ceil(LIMB_BITS)
    };

    const TOP_MASK: Limb = if BITS % LIMB_BITS == 0 {
        Limb::MAX
    } else {
        ((1 as Limb) << (BITS % LIMB_BITS)) - 1
    };

    pub fn zero() -> Self {
        Self {
            mag: LimbStore::zero(),
            negative: false,
        }
    }

    pub fn one() -> Self {
        Self {
            mag: LimbStore::from_limb(1),
            negative: false,
        }
    }

    /// Non-negative value from little-endian limbs, fitted to the width.
    pub fn from_limbs(limbs: &[Limb]) -> Result<Self> {
        Self::from_parts(LimbStore::from_slice(limbs), false)
    }

    pub(crate) fn from_parts(mag: LimbStore, negative: bool) -> Result<Self> {
        let mut value = Self { mag, negative };
        value.finish()?;
        Ok(value)
    }

    /// Converts between integer types, applying the target's width policy.
    pub fn convert<const B2: usize, const S2: bool, const C2: bool>(
        &self,
    ) -> Result<BigInt<B2, S2, C2>> {
        BigInt::from_parts(self.mag.clone(), self.negative)
    }

    /// Little-endian magnitude limbs; never has a leading zero limb unless the
    /// value is zero.
    pub fn limbs(&self) -> &[Limb] {
        self.mag.as_slice()
    }

    pub(crate) fn magnitude(&self) -> &LimbStore {
        &self.mag
    }

    pub fn is_zero(&self) -> bool {
        self.mag.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn is_positive(&self) -> bool {
        !self.negative && !self.is_zero()
    }

    /// -1, 0 or 1.
    pub fn signum(&self) -> i32 {
        if self.negative {
            -1
        } else if self.is_zero() {
            0
        } else {
            1
        }
    }

    /// Restores the normalized form and applies the width policy.
    pub(crate) fn finish(&mut self) -> Result<()> {
        self.mag.normalize();
        if self.mag.is_zero() {
            self.negative = false;
        }
        self.fit_width()
    }

    fn fit_width(&mut self) -> Result<()> {
        if BITS == 0 {
            if !SIGNED && self.negative {
                self.negative = false;
                return Err(Error::NegativeUnsigned);
            }
            return Ok(());
        }
        if CHECKED && !self.in_range() {
            self.wrap();
            return Err(Error::Overflow { bits: BITS });
        }
        self.wrap();
        Ok(())
    }

    fn in_range(&self) -> bool {
        let len = self.mag.bit_length();
        if SIGNED {
            len < BITS || (self.negative && len == BITS && self.magnitude_is_power_of_two())
        } else {
            !self.negative && len <= BITS
        }
    }

    /// Reduces to the two's-complement value modulo `2^BITS`.
    fn wrap(&mut self) {
        let n = Self::MAX_LIMBS;
        if !self.negative && self.mag.len() < n && !(SIGNED && self.mag.len() * LIMB_BITS >= BITS) {
            return;
        }
        self.mag.resize(n);
        if self.negative {
            negate_limbs(self.mag.as_mut_slice());
            self.negative = false;
        }
        self.mag.as_mut_slice()[n - 1] &= Self::TOP_MASK;
        if SIGNED {
            let sign_bit = (BITS - 1) % LIMB_BITS;
            let limbs = self.mag.as_mut_slice();
            if (limbs[n - 1] >> sign_bit) & 1 == 1 {
                negate_limbs(limbs);
                limbs[n - 1] &= Self::TOP_MASK;
                self.negative = true;
            }
        }
        self.mag.normalize();
        if self.mag.is_zero() {
            self.negative = false;
        }
    }

    pub(crate) fn magnitude_is_power_of_two(&self) -> bool {
        let limbs = self.mag.as_slice();
        let (top, rest) = limbs.split_last().unwrap_or((&0, &[]));
        top.is_power_of_two() && rest.iter().all(|&l| l == 0)
    }

    /// Largest representable value, `None` when unbounded.
    pub fn max_value() -> Option<Self> {
        if BITS == 0 {
            return None;
        }
        let bits = if SIGNED { BITS - 1 } else { BITS };
        Some(Self {
            mag: ones(bits),
            negative: false,
        })
    }

    /// Smallest representable value, `None` for unbounded signed integers.
    pub fn min_value() -> Option<Self> {
        match (BITS, SIGNED) {
            (_, false) => Some(Self::zero()),
            (0, true) => None,
            (_, true) => {
                let mut mag = LimbStore::with_len((BITS - 1) / LIMB_BITS + 1);
                mag.as_mut_slice()[(BITS - 1) / LIMB_BITS] = 1 << ((BITS - 1) % LIMB_BITS);
                Some(Self {
                    mag,
                    negative: true,
                })
            }
        }
    }

    /// Signed comparison.
    pub fn compare(&self, rhs: &Self) -> Ordering {
        match (self.negative, rhs.negative) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => self.compare_magnitude(rhs),
            (true, true) => rhs.compare_magnitude(self),
        }
    }

    pub fn compare_magnitude(&self, rhs: &Self) -> Ordering {
        cmp_magnitudes(self.mag.as_slice(), rhs.mag.as_slice())
    }
}

/// Magnitude with the low `bits` bits set.
fn ones(bits: usize) -> LimbStore {
    let full = bits / LIMB_BITS;
    let rest = bits % LIMB_BITS;
    let mut mag = LimbStore::with_len(full + usize::from(rest != 0));
    let limbs = mag.as_mut_slice();
    limbs[..full].fill(Limb::MAX);
    if rest != 0 {
        limbs[full] = ((1 as Limb) << rest) - 1;
    }
    mag.normalize();
    mag
}

impl<const BITS: usize, const SIGNED: bool, const CHECKED: bool> Ord
    for BigInt<BITS, SIGNED, CHECKED>
{
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl<const BITS: usize, const SIGNED: bool, const CHECKED: bool> PartialOrd
    for BigInt<BITS, SIGNED, CHECKED>
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<const BITS: usize, const SIGNED: bool, const CHECKED: bool> fmt::Debug
    for BigInt<BITS, SIGNED, CHECKED>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BigInt<{BITS}")?;
        if !SIGNED {
            write!(f, ", unsigned")?;
        }
        if CHECKED {
            write!(f, ", checked")?;
        }
        write!(f, ">({self})")
    }
}
