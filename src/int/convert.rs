use super::bits::{shl_magnitude, shr_magnitude};
use super::BigInt;
use crate::error::{Error, Result};
use crate::limb::{Limb, LimbStore, LIMB_BITS};

const LIMBS_PER_U128: usize = 128 / LIMB_BITS;

fn limbs_of_u128(v: u128) -> LimbStore {
    let mut limbs = [0 as Limb; LIMBS_PER_U128];
    for (i, limb) in limbs.iter_mut().enumerate() {
        *limb = (v >> (i * LIMB_BITS)) as Limb;
    }
    LimbStore::from_slice(&limbs)
}

/// The low 128 bits of a magnitude.
fn low_u128(limbs: &[Limb]) -> u128 {
    limbs
        .iter()
        .take(LIMBS_PER_U128)
        .enumerate()
        .fold(0, |acc, (i, &l)| acc | (l as u128) << (i * LIMB_BITS))
}

impl<const BITS: usize, const SIGNED: bool, const CHECKED: bool> BigInt<BITS, SIGNED, CHECKED> {
    pub fn from_u128(v: u128) -> Result<Self> {
        Self::from_parts(limbs_of_u128(v), false)
    }

    pub fn from_i128(v: i128) -> Result<Self> {
        Self::from_parts(limbs_of_u128(v.unsigned_abs()), v < 0)
    }

    pub fn from_u64(v: u64) -> Result<Self> {
        Self::from_u128(v as u128)
    }

    pub fn from_i64(v: i64) -> Result<Self> {
        Self::from_i128(v as i128)
    }

    /// Truncates toward zero. NaN and infinities are domain errors.
    pub fn from_f64(v: f64) -> Result<Self> {
        if !v.is_finite() {
            return Err(Error::domain("from_f64", "value is not finite"));
        }
        let bits = v.to_bits();
        let negative = bits >> 63 == 1;
        let biased = ((bits >> 52) & 0x7ff) as i64;
        let fraction = bits & ((1 << 52) - 1);
        if biased == 0 {
            // subnormals and zero truncate to zero
            return Ok(Self::zero());
        }
        let mantissa = fraction | (1 << 52);
        let exp = biased - 1075;
        let mut mag = limbs_of_u128(mantissa as u128);
        if exp >= 0 {
            shl_magnitude(&mut mag, exp as usize);
        } else {
            shr_magnitude(&mut mag, exp.unsigned_abs() as usize);
        }
        Self::from_parts(mag, negative)
    }

    pub fn to_u128(&self) -> Option<u128> {
        if self.negative || self.mag.bit_length() > 128 {
            return None;
        }
        Some(low_u128(self.mag.as_slice()))
    }

    pub fn to_i128(&self) -> Option<i128> {
        if self.mag.bit_length() > 128 {
            return None;
        }
        let m = low_u128(self.mag.as_slice());
        if self.negative {
            0i128.checked_sub_unsigned(m)
        } else {
            i128::try_from(m).ok()
        }
    }

    pub fn to_u64(&self) -> Option<u64> {
        self.to_u128().and_then(|v| u64::try_from(v).ok())
    }

    pub fn to_i64(&self) -> Option<i64> {
        self.to_i128().and_then(|v| i64::try_from(v).ok())
    }

    /// Nearest `f64`, ties to even; infinite when the magnitude exceeds the
    /// `f64` range.
    pub fn to_f64(&self) -> f64 {
        let len = self.mag.bit_length();
        let magnitude = if len <= 64 {
            low_u128(self.mag.as_slice()) as u64 as f64
        } else {
            // 54 leading bits: 53 mantissa bits plus the rounding bit.
            let drop = len - 54;
            let mut top = self.mag.clone();
            shr_magnitude(&mut top, drop);
            let head = low_u128(top.as_slice()) as u64;
            let sticky = self.lsb().is_some_and(|i| i < drop);
            let mut mantissa = head >> 1;
            if head & 1 == 1 && (sticky || mantissa & 1 == 1) {
                mantissa += 1;
            }
            let exp = (drop + 1) as i32;
            if exp > 1023 {
                f64::INFINITY
            } else {
                mantissa as f64 * 2f64.powi(exp)
            }
        };
        if self.negative {
            -magnitude
        } else {
            magnitude
        }
    }

    /// Magnitude as little-endian bytes, at least one byte long.
    pub fn to_bytes_le(&self) -> Vec<u8> {
        let mut bytes: Vec<u8> = self
            .mag
            .as_slice()
            .iter()
            .flat_map(|l| l.to_le_bytes())
            .collect();
        while bytes.len() > 1 && bytes.last() == Some(&0) {
            bytes.pop();
        }
        bytes
    }

    /// Magnitude as big-endian bytes, at least one byte long.
    pub fn to_bytes_be(&self) -> Vec<u8> {
        let mut bytes = self.to_bytes_le();
        bytes.reverse();
        bytes
    }

    /// Non-negative value from little-endian bytes.
    pub fn from_bytes_le(bytes: &[u8]) -> Result<Self> {
        let limbs: Vec<Limb> = bytes
            .chunks(LIMB_BITS / 8)
            .map(|chunk| {
                let mut word = [0u8; LIMB_BITS / 8];
                word[..chunk.len()].copy_from_slice(chunk);
                Limb::from_le_bytes(word)
            })
            .collect();
        Self::from_limbs(&limbs)
    }

    /// Non-negative value from big-endian bytes.
    pub fn from_bytes_be(bytes: &[u8]) -> Result<Self> {
        let mut le = bytes.to_vec();
        le.reverse();
        Self::from_bytes_le(&le)
    }
}

macro_rules! impl_primitive_conversions {
    ($($t:ty => $from:ident, $to:ident;)*) => {$(
        impl<const BITS: usize, const SIGNED: bool, const CHECKED: bool> TryFrom<$t>
            for BigInt<BITS, SIGNED, CHECKED>
        {
            type Error = Error;

            fn try_from(v: $t) -> Result<Self> {
                Self::$from(v.into())
            }
        }

        impl<const BITS: usize, const SIGNED: bool, const CHECKED: bool>
            TryFrom<&BigInt<BITS, SIGNED, CHECKED>> for $t
        {
            type Error = Error;

            fn try_from(v: &BigInt<BITS, SIGNED, CHECKED>) -> Result<Self> {
                v.$to()
                    .and_then(|wide| <$t>::try_from(wide).ok())
                    .ok_or(Error::Overflow { bits: <$t>::BITS as usize })
            }
        }
    )*};
}

impl_primitive_conversions! {
    i8 => from_i128, to_i128;
    i16 => from_i128, to_i128;
    i32 => from_i128, to_i128;
    i64 => from_i128, to_i128;
    i128 => from_i128, to_i128;
    u8 => from_u128, to_u128;
    u16 => from_u128, to_u128;
    u32 => from_u128, to_u128;
    u64 => from_u128, to_u128;
    u128 => from_u128, to_u128;
}

impl<const BITS: usize, const SIGNED: bool, const CHECKED: bool> TryFrom<isize>
    for BigInt<BITS, SIGNED, CHECKED>
{
    type Error = Error;

    fn try_from(v: isize) -> Result<Self> {
        Self::from_i128(v as i128)
    }
}

impl<const BITS: usize, const SIGNED: bool, const CHECKED: bool> TryFrom<usize>
    for BigInt<BITS, SIGNED, CHECKED>
{
    type Error = Error;

    fn try_from(v: usize) -> Result<Self> {
        Self::from_u128(v as u128)
    }
}
