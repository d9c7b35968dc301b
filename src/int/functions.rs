use std::cmp::Ordering;

use super::bits::{shl_magnitude, shr_magnitude};
use super::div::div_rem_magnitudes;
use super::mul::mul_magnitudes;
use super::BigInt;
use crate::error::{Error, Result};
use crate::limb::{add_magnitudes, cmp_magnitudes, LimbStore, Native};

/// Greatest common divisor of two magnitudes.
fn gcd_magnitudes(a: &LimbStore, b: &LimbStore) -> LimbStore {
    let (mut a, mut b) = (a.clone(), b.clone());
    while !b.is_zero() {
        let (_, r) = div_rem_magnitudes(a.as_slice(), b.as_slice());
        a = b;
        b = r;
    }
    a
}

/// `floor(sqrt(n))` by Newton iteration from an overestimate.
fn isqrt_magnitude(n: &LimbStore) -> LimbStore {
    if n.is_zero() {
        return LimbStore::zero();
    }
    let mut x = LimbStore::from_limb(1);
    shl_magnitude(&mut x, n.bit_length().div_ceil(2));
    loop {
        let (q, _) = div_rem_magnitudes(n.as_slice(), x.as_slice());
        let mut y = LimbStore::zero();
        add_magnitudes::<Native>(&mut y, x.as_slice(), q.as_slice());
        shr_magnitude(&mut y, 1);
        if cmp_magnitudes(y.as_slice(), x.as_slice()) != Ordering::Less {
            return x;
        }
        x = y;
    }
}

impl<const BITS: usize, const SIGNED: bool, const CHECKED: bool> BigInt<BITS, SIGNED, CHECKED> {
    pub fn is_even(&self) -> bool {
        self.mag.get(0) & 1 == 0
    }

    pub fn is_odd(&self) -> bool {
        !self.is_even()
    }

    /// True for positive powers of two.
    pub fn is_power_of_two(&self) -> bool {
        !self.negative && !self.is_zero() && self.magnitude_is_power_of_two()
    }

    /// `self = self^exp` by square and multiply; `0^0 == 1`.
    pub fn eval_pow(&mut self, mut exp: u64) -> Result<()> {
        let mut base = std::mem::replace(self, Self::one());
        while exp > 0 {
            if exp & 1 == 1 {
                self.eval_multiply(&base)?;
            }
            exp >>= 1;
            if exp > 0 {
                let square = base.clone();
                base.eval_multiply(&square)?;
            }
        }
        Ok(())
    }

    pub fn pow(&self, exp: u64) -> Result<Self> {
        let mut v = self.clone();
        v.eval_pow(exp)?;
        Ok(v)
    }

    /// Non-negative greatest common divisor; `gcd(0, 0) == 0`.
    pub fn gcd(&self, rhs: &Self) -> Result<Self> {
        Self::from_parts(gcd_magnitudes(&self.mag, &rhs.mag), false)
    }

    pub fn eval_gcd(&mut self, rhs: &Self) -> Result<()> {
        self.mag = gcd_magnitudes(&self.mag, &rhs.mag);
        self.negative = false;
        self.finish()
    }

    /// Non-negative least common multiple; zero if either operand is zero.
    pub fn lcm(&self, rhs: &Self) -> Result<Self> {
        if self.is_zero() || rhs.is_zero() {
            return Ok(Self::zero());
        }
        let g = gcd_magnitudes(&self.mag, &rhs.mag);
        let (q, _) = div_rem_magnitudes(self.mag.as_slice(), g.as_slice());
        Self::from_parts(mul_magnitudes(q.as_slice(), rhs.mag.as_slice()), false)
    }

    /// `floor(sqrt(self))`; negative values are a domain error.
    pub fn isqrt(&self) -> Result<Self> {
        if self.negative {
            return Err(Error::domain("isqrt", "negative value"));
        }
        Self::from_parts(isqrt_magnitude(&self.mag), false)
    }
}
