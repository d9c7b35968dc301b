use tracing::trace;

use super::BigInt;
use crate::error::Result;
use crate::limb::{mac, CarryChain, DoubleLimb, Limb, LimbStore, Native, LIMB_BITS};

/// Smaller operand length (in limbs) below which multiplication is schoolbook.
pub const KARATSUBA_THRESHOLD: usize = 32;

/// Recursion depth past which Karatsuba falls back to schoolbook. Bounds stack
/// use and the scratch allocations made per level.
pub const KARATSUBA_MAX_DEPTH: usize = 12;

/// `limbs *= m`.
pub(crate) fn mul_limb_in_place(limbs: &mut LimbStore, m: Limb) {
    let mut carry = 0;
    for limb in limbs.as_mut_slice().iter_mut() {
        (*limb, carry) = mac(0, *limb, m, carry);
    }
    if carry != 0 {
        limbs.push(carry);
    }
    limbs.normalize();
}

fn significant(limbs: &[Limb]) -> &[Limb] {
    let len = limbs.iter().rposition(|&l| l != 0).map_or(0, |i| i + 1);
    &limbs[..len]
}

/// `out += x`; the sum must fit in `out`.
fn add_acc(out: &mut [Limb], x: &[Limb]) {
    let x = significant(x);
    let n = x.len();
    let mut carry = Native::add_assign_n(&mut out[..n], x, false);
    let mut i = n;
    while carry {
        let (sum, c) = out[i].overflowing_add(1);
        out[i] = sum;
        carry = c;
        i += 1;
    }
}

/// `out -= x`; the difference must be non-negative.
fn sub_acc(out: &mut [Limb], x: &[Limb]) {
    let x = significant(x);
    let n = x.len();
    let mut borrow = Native::sub_assign_n(&mut out[..n], x, false);
    let mut i = n;
    while borrow {
        let (diff, b) = out[i].overflowing_sub(1);
        out[i] = diff;
        borrow = b;
        i += 1;
    }
}

/// `out += a * b` in O(n*m).
fn schoolbook_acc(out: &mut [Limb], a: &[Limb], b: &[Limb]) {
    for (i, &bi) in b.iter().enumerate() {
        if bi == 0 {
            continue;
        }
        let mut carry = 0;
        for (j, &aj) in a.iter().enumerate() {
            (out[i + j], carry) = mac(out[i + j], aj, bi, carry);
        }
        let mut k = i + a.len();
        while carry != 0 {
            let (sum, c) = out[k].overflowing_add(carry);
            out[k] = sum;
            carry = c as Limb;
            k += 1;
        }
    }
}

fn add_halves(lo: &[Limb], hi: &[Limb]) -> Vec<Limb> {
    let mut sum = vec![0; lo.len().max(hi.len()) + 1];
    sum[..lo.len()].copy_from_slice(lo);
    add_acc(&mut sum, hi);
    sum
}

/// `out += a * b`, splitting at the limb midpoint while both operands are
/// large and the depth budget lasts.
fn karatsuba_acc(out: &mut [Limb], a: &[Limb], b: &[Limb], depth: usize) {
    let (a, b) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    if b.len() < KARATSUBA_THRESHOLD || depth >= KARATSUBA_MAX_DEPTH {
        if depth >= KARATSUBA_MAX_DEPTH && b.len() >= KARATSUBA_THRESHOLD {
            trace!(depth, a = a.len(), b = b.len(), "karatsuba depth cutoff");
        }
        schoolbook_acc(out, a, b);
        return;
    }

    let half = a.len().div_ceil(2);
    if b.len() <= half {
        for (k, chunk) in a.chunks(b.len()).enumerate() {
            karatsuba_acc(&mut out[k * b.len()..], chunk, b, depth);
        }
        return;
    }

    let (a0, a1) = a.split_at(half);
    let (b0, b1) = b.split_at(half);

    let mut z0 = vec![0; 2 * half];
    karatsuba_acc(&mut z0, a0, b0, depth + 1);
    let mut z2 = vec![0; a1.len() + b1.len()];
    karatsuba_acc(&mut z2, a1, b1, depth + 1);

    let sa = add_halves(a0, a1);
    let sb = add_halves(b0, b1);
    let mut z1 = vec![0; sa.len() + sb.len()];
    karatsuba_acc(&mut z1, significant(&sa), significant(&sb), depth + 1);
    sub_acc(&mut z1, &z0);
    sub_acc(&mut z1, &z2);

    add_acc(out, &z0);
    add_acc(&mut out[half..], &z1);
    add_acc(&mut out[2 * half..], &z2);
}

/// Magnitude product using schoolbook multiplication only.
pub fn mul_schoolbook(a: &[Limb], b: &[Limb]) -> LimbStore {
    let mut out = LimbStore::with_len(a.len() + b.len());
    schoolbook_acc(out.as_mut_slice(), a, b);
    out.normalize();
    out
}

/// Magnitude product using Karatsuba above [`KARATSUBA_THRESHOLD`].
pub fn mul_karatsuba(a: &[Limb], b: &[Limb]) -> LimbStore {
    let a = significant(a);
    let b = significant(b);
    if a.is_empty() || b.is_empty() {
        return LimbStore::zero();
    }
    let mut out = LimbStore::with_len(a.len() + b.len());
    karatsuba_acc(out.as_mut_slice(), a, b, 0);
    out.normalize();
    out
}

pub(crate) fn mul_magnitudes(a: &[Limb], b: &[Limb]) -> LimbStore {
    if a.len() == 1 && b.len() == 1 {
        let wide = a[0] as DoubleLimb * b[0] as DoubleLimb;
        return LimbStore::from_slice(&[wide as Limb, (wide >> LIMB_BITS) as Limb]);
    }
    if a.len().min(b.len()) >= KARATSUBA_THRESHOLD {
        trace!(a = a.len(), b = b.len(), "karatsuba multiply");
        mul_karatsuba(a, b)
    } else {
        mul_schoolbook(a, b)
    }
}

impl<const BITS: usize, const SIGNED: bool, const CHECKED: bool> BigInt<BITS, SIGNED, CHECKED> {
    pub fn eval_multiply(&mut self, rhs: &Self) -> Result<()> {
        self.mag = mul_magnitudes(self.mag.as_slice(), rhs.mag.as_slice());
        self.negative ^= rhs.negative;
        self.finish()
    }

    /// `result = a * b`.
    pub fn multiply_into(result: &mut Self, a: &Self, b: &Self) -> Result<()> {
        result.mag = mul_magnitudes(a.mag.as_slice(), b.mag.as_slice());
        result.negative = a.negative != b.negative;
        result.finish()
    }

    pub fn eval_multiply_limb(&mut self, m: Limb) -> Result<()> {
        mul_limb_in_place(&mut self.mag, m);
        self.finish()
    }
}
