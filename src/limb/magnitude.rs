//! Unsigned magnitude addition and subtraction over limb slices.
//!
//! The out-of-place forms write into a distinct `result`; the `_assign`
//! forms are the aliased case where the result is also the first operand.

use std::cmp::Ordering;

use super::{adc, sbb, CarryChain, DoubleLimb, Limb, LimbStore, LIMB_BITS};

/// Length of `limbs` ignoring leading zero limbs.
fn significant_len(limbs: &[Limb]) -> usize {
    limbs.iter().rposition(|&l| l != 0).map_or(0, |i| i + 1)
}

/// Compares two little-endian magnitudes, tolerating leading zero limbs.
pub fn cmp_magnitudes(a: &[Limb], b: &[Limb]) -> Ordering {
    let la = significant_len(a);
    let lb = significant_len(b);
    la.cmp(&lb)
        .then_with(|| a[..la].iter().rev().cmp(b[..lb].iter().rev()))
}

/// Two's complement negation of `limbs` modulo `2^(len * LIMB_BITS)`.
pub(crate) fn negate_limbs(limbs: &mut [Limb]) {
    let mut carry = true;
    for limb in limbs.iter_mut() {
        (*limb, carry) = adc(!*limb, 0, carry);
    }
}

fn set_double(result: &mut LimbStore, wide: DoubleLimb) {
    result.resize(2);
    let out = result.as_mut_slice();
    out[0] = wide as Limb;
    out[1] = (wide >> LIMB_BITS) as Limb;
    result.normalize();
}

/// `result = |a| + |b|`.
pub fn add_magnitudes<C: CarryChain>(result: &mut LimbStore, a: &[Limb], b: &[Limb]) {
    if a.len() == 1 && b.len() == 1 {
        set_double(result, a[0] as DoubleLimb + b[0] as DoubleLimb);
        return;
    }
    let (large, small) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let m = small.len();
    let x = large.len();

    result.resize(x);
    let out = result.as_mut_slice();
    let mut carry = C::add_n(&mut out[..m], &large[..m], small, false);
    let mut i = m;
    while carry && i < x {
        (out[i], carry) = adc(large[i], 0, true);
        i += 1;
    }
    out[i..x].copy_from_slice(&large[i..x]);
    if carry {
        result.push(1);
    }
    result.normalize();
}

/// `acc = |acc| + |b|`.
pub fn add_magnitude_assign<C: CarryChain>(acc: &mut LimbStore, b: &[Limb]) {
    if acc.len() == 1 && b.len() == 1 {
        let wide = acc.get(0) as DoubleLimb + b[0] as DoubleLimb;
        set_double(acc, wide);
        return;
    }
    let m = b.len();
    if acc.len() < m {
        acc.resize(m);
    }
    let x = acc.len();
    let out = acc.as_mut_slice();
    let mut carry = C::add_assign_n(&mut out[..m], b, false);
    let mut i = m;
    while carry && i < x {
        (out[i], carry) = adc(out[i], 0, true);
        i += 1;
    }
    if carry {
        acc.push(1);
    }
    acc.normalize();
}

/// `result = | |a| - |b| |`; returns true when `|a| < |b|`, in which case the
/// caller flips the sign it copied from `a`.
pub fn sub_magnitudes<C: CarryChain>(result: &mut LimbStore, a: &[Limb], b: &[Limb]) -> bool {
    if a.len() == 1 && b.len() == 1 {
        let (x, y) = (a[0], b[0]);
        result.resize(1);
        result.as_mut_slice()[0] = x.abs_diff(y);
        return x < y;
    }
    let n = a.len().max(b.len());
    let m = a.len().min(b.len());
    result.resize(n);
    let out = result.as_mut_slice();
    let mut borrow = C::sub_n(&mut out[..m], &a[..m], &b[..m], false);
    if a.len() >= b.len() {
        let mut i = m;
        while borrow && i < n {
            (out[i], borrow) = sbb(a[i], 0, true);
            i += 1;
        }
        out[i..n].copy_from_slice(&a[i..n]);
    } else {
        for i in m..n {
            (out[i], borrow) = sbb(0, b[i], borrow);
        }
    }
    if borrow {
        negate_limbs(out);
    }
    result.normalize();
    borrow
}

/// `acc = | |acc| - |b| |`; returns true when the borrow survived, i.e. the
/// stored magnitude is `|b| - |acc|`.
pub fn sub_magnitude_assign<C: CarryChain>(acc: &mut LimbStore, b: &[Limb]) -> bool {
    if acc.len() == 1 && b.len() == 1 {
        let x = acc.get(0);
        acc.as_mut_slice()[0] = x.abs_diff(b[0]);
        return x < b[0];
    }
    let m = b.len();
    if acc.len() < m {
        acc.resize(m);
    }
    let n = acc.len();
    let out = acc.as_mut_slice();
    let mut borrow = C::sub_assign_n(&mut out[..m], b, false);
    let mut i = m;
    while borrow && i < n {
        (out[i], borrow) = sbb(out[i], 0, true);
        i += 1;
    }
    if borrow {
        negate_limbs(out);
    }
    acc.normalize();
    borrow
}
