use super::{DoubleLimb, Limb, LIMB_BITS};

/// `a + b + carry`, returning the low limb and the carry out.
#[inline(always)]
pub const fn adc(a: Limb, b: Limb, carry: bool) -> (Limb, bool) {
    let (sum, c1) = a.overflowing_add(b);
    let (sum, c2) = sum.overflowing_add(carry as Limb);
    (sum, c1 | c2)
}

/// `a - b - borrow`, returning the low limb and the borrow out.
#[inline(always)]
pub const fn sbb(a: Limb, b: Limb, borrow: bool) -> (Limb, bool) {
    let (diff, b1) = a.overflowing_sub(b);
    let (diff, b2) = diff.overflowing_sub(borrow as Limb);
    (diff, b1 | b2)
}

/// `acc + a * b + carry` as `(low, high)`. Cannot overflow a double limb.
#[inline(always)]
pub const fn mac(acc: Limb, a: Limb, b: Limb, carry: Limb) -> (Limb, Limb) {
    let wide = acc as DoubleLimb + (a as DoubleLimb) * (b as DoubleLimb) + carry as DoubleLimb;
    (wide as Limb, (wide >> LIMB_BITS) as Limb)
}

/// Limb-wise addition usable in constant evaluation.
pub const fn add_const<const N: usize>(a: &[Limb; N], b: &[Limb; N]) -> ([Limb; N], bool) {
    let mut out = [0; N];
    let mut carry = false;
    let mut i = 0;
    while i < N {
        let (sum, c) = adc(a[i], b[i], carry);
        out[i] = sum;
        carry = c;
        i += 1;
    }
    (out, carry)
}

/// Limb-wise subtraction usable in constant evaluation.
pub const fn sub_const<const N: usize>(a: &[Limb; N], b: &[Limb; N]) -> ([Limb; N], bool) {
    let mut out = [0; N];
    let mut borrow = false;
    let mut i = 0;
    while i < N {
        let (diff, b1) = sbb(a[i], b[i], borrow);
        out[i] = diff;
        borrow = b1;
        i += 1;
    }
    (out, borrow)
}

/// Carry/borrow chains over equal-length limb slices.
///
/// Every implementation must produce bit-identical results to [`Portable`].
pub trait CarryChain {
    const NAME: &'static str;

    /// `out = a + b + carry`, returning the carry out of the top limb.
    fn add_n(out: &mut [Limb], a: &[Limb], b: &[Limb], carry: bool) -> bool;

    /// `out = a - b - borrow`, returning the borrow out of the top limb.
    fn sub_n(out: &mut [Limb], a: &[Limb], b: &[Limb], borrow: bool) -> bool;

    /// `acc += b + carry`.
    fn add_assign_n(acc: &mut [Limb], b: &[Limb], carry: bool) -> bool;

    /// `acc -= b + borrow`.
    fn sub_assign_n(acc: &mut [Limb], b: &[Limb], borrow: bool) -> bool;
}

/// Limb-by-limb chain built on [`adc`] and [`sbb`].
#[derive(Debug, Clone, Copy)]
pub struct Portable;

impl CarryChain for Portable {
    const NAME: &'static str = "portable";

    fn add_n(out: &mut [Limb], a: &[Limb], b: &[Limb], mut carry: bool) -> bool {
        debug_assert!(out.len() == a.len() && a.len() == b.len());
        for ((o, &x), &y) in out.iter_mut().zip(a).zip(b) {
            (*o, carry) = adc(x, y, carry);
        }
        carry
    }

    fn sub_n(out: &mut [Limb], a: &[Limb], b: &[Limb], mut borrow: bool) -> bool {
        debug_assert!(out.len() == a.len() && a.len() == b.len());
        for ((o, &x), &y) in out.iter_mut().zip(a).zip(b) {
            (*o, borrow) = sbb(x, y, borrow);
        }
        borrow
    }

    fn add_assign_n(acc: &mut [Limb], b: &[Limb], mut carry: bool) -> bool {
        debug_assert_eq!(acc.len(), b.len());
        for (o, &y) in acc.iter_mut().zip(b) {
            (*o, carry) = adc(*o, y, carry);
        }
        carry
    }

    fn sub_assign_n(acc: &mut [Limb], b: &[Limb], mut borrow: bool) -> bool {
        debug_assert_eq!(acc.len(), b.len());
        for (o, &y) in acc.iter_mut().zip(b) {
            (*o, borrow) = sbb(*o, y, borrow);
        }
        borrow
    }
}

/// Hardware add-with-carry chain, unrolled four limbs at a time.
#[cfg(all(target_arch = "x86_64", target_pointer_width = "64"))]
#[derive(Debug, Clone, Copy)]
pub struct Intrinsic;

#[cfg(all(target_arch = "x86_64", target_pointer_width = "64"))]
mod x86 {
    use core::arch::x86_64::{_addcarry_u64, _subborrow_u64};

    /// # Safety
    ///
    /// The target must support `adc`, which every x86-64 CPU does.
    #[inline(always)]
    pub(super) unsafe fn addc(c: u8, a: u64, b: u64, out: &mut u64) -> u8 {
        _addcarry_u64(c, a, b, out)
    }

    /// # Safety
    ///
    /// The target must support `sbb`, which every x86-64 CPU does.
    #[inline(always)]
    pub(super) unsafe fn subb(c: u8, a: u64, b: u64, out: &mut u64) -> u8 {
        _subborrow_u64(c, a, b, out)
    }
}

#[cfg(all(target_arch = "x86_64", target_pointer_width = "64"))]
impl CarryChain for Intrinsic {
    const NAME: &'static str = "x86_64-adc";

    fn add_n(out: &mut [Limb], a: &[Limb], b: &[Limb], carry: bool) -> bool {
        debug_assert!(out.len() == a.len() && a.len() == b.len());
        let mut c = carry as u8;
        let mut out_chunks = out.chunks_exact_mut(4);
        let mut a_chunks = a.chunks_exact(4);
        let mut b_chunks = b.chunks_exact(4);
        // SAFETY: this impl only exists on x86-64 targets.
        unsafe {
            for ((o, x), y) in (&mut out_chunks).zip(&mut a_chunks).zip(&mut b_chunks) {
                c = x86::addc(c, x[0], y[0], &mut o[0]);
                c = x86::addc(c, x[1], y[1], &mut o[1]);
                c = x86::addc(c, x[2], y[2], &mut o[2]);
                c = x86::addc(c, x[3], y[3], &mut o[3]);
            }
            let tail = out_chunks.into_remainder();
            for ((o, &x), &y) in tail.iter_mut().zip(a_chunks.remainder()).zip(b_chunks.remainder()) {
                c = x86::addc(c, x, y, o);
            }
        }
        c != 0
    }

    fn sub_n(out: &mut [Limb], a: &[Limb], b: &[Limb], borrow: bool) -> bool {
        debug_assert!(out.len() == a.len() && a.len() == b.len());
        let mut c = borrow as u8;
        let mut out_chunks = out.chunks_exact_mut(4);
        let mut a_chunks = a.chunks_exact(4);
        let mut b_chunks = b.chunks_exact(4);
        // SAFETY: this impl only exists on x86-64 targets.
        unsafe {
            for ((o, x), y) in (&mut out_chunks).zip(&mut a_chunks).zip(&mut b_chunks) {
                c = x86::subb(c, x[0], y[0], &mut o[0]);
                c = x86::subb(c, x[1], y[1], &mut o[1]);
                c = x86::subb(c, x[2], y[2], &mut o[2]);
                c = x86::subb(c, x[3], y[3], &mut o[3]);
            }
            let tail = out_chunks.into_remainder();
            for ((o, &x), &y) in tail.iter_mut().zip(a_chunks.remainder()).zip(b_chunks.remainder()) {
                c = x86::subb(c, x, y, o);
            }
        }
        c != 0
    }

    fn add_assign_n(acc: &mut [Limb], b: &[Limb], carry: bool) -> bool {
        debug_assert_eq!(acc.len(), b.len());
        let mut c = carry as u8;
        let mut acc_chunks = acc.chunks_exact_mut(4);
        let mut b_chunks = b.chunks_exact(4);
        // SAFETY: this impl only exists on x86-64 targets.
        unsafe {
            for (o, y) in (&mut acc_chunks).zip(&mut b_chunks) {
                c = x86::addc(c, o[0], y[0], &mut o[0]);
                c = x86::addc(c, o[1], y[1], &mut o[1]);
                c = x86::addc(c, o[2], y[2], &mut o[2]);
                c = x86::addc(c, o[3], y[3], &mut o[3]);
            }
            let tail = acc_chunks.into_remainder();
            for (o, &y) in tail.iter_mut().zip(b_chunks.remainder()) {
                c = x86::addc(c, *o, y, o);
            }
        }
        c != 0
    }

    fn sub_assign_n(acc: &mut [Limb], b: &[Limb], borrow: bool) -> bool {
        debug_assert_eq!(acc.len(), b.len());
        let mut c = borrow as u8;
        let mut acc_chunks = acc.chunks_exact_mut(4);
        let mut b_chunks = b.chunks_exact(4);
        // SAFETY: this impl only exists on x86-64 targets.
        unsafe {
            for (o, y) in (&mut acc_chunks).zip(&mut b_chunks) {
                c = x86::subb(c, o[0], y[0], &mut o[0]);
                c = x86::subb(c, o[1], y[1], &mut o[1]);
                c = x86::subb(c, o[2], y[2], &mut o[2]);
                c = x86::subb(c, o[3], y[3], &mut o[3]);
            }
            let tail = acc_chunks.into_remainder();
            for (o, &y) in tail.iter_mut().zip(b_chunks.remainder()) {
                c = x86::subb(c, *o, y, o);
            }
        }
        c != 0
    }
}

/// Chain selected for this build target.
#[cfg(all(target_arch = "x86_64", target_pointer_width = "64"))]
pub type Native = Intrinsic;
#[cfg(not(all(target_arch = "x86_64", target_pointer_width = "64")))]
pub type Native = Portable;
