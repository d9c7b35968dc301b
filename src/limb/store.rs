use std::fmt;

use smallvec::SmallVec;

use super::{Limb, LIMB_BITS};

/// Limbs kept inline before the store spills to the heap: 256 bits.
pub const INLINE_LIMBS: usize = 256 / LIMB_BITS;

/// Little-endian limb array holding the magnitude of an integer.
///
/// Values up to `INLINE_LIMBS` limbs live on the stack; fixed-width integers
/// narrower than that never allocate. The zero value is a single zero limb.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct LimbStore {
    limbs: SmallVec<[Limb; INLINE_LIMBS]>,
}

impl Default for LimbStore {
    fn default() -> Self {
        Self::zero()
    }
}

impl LimbStore {
    pub fn zero() -> Self {
        Self::from_limb(0)
    }

    pub fn from_limb(limb: Limb) -> Self {
        let mut limbs = SmallVec::new();
        limbs.push(limb);
        Self { limbs }
    }

    /// Builds a normalized store from little-endian limbs.
    pub fn from_slice(limbs: &[Limb]) -> Self {
        let mut store = Self {
            limbs: SmallVec::from_slice(limbs),
        };
        store.normalize();
        store
    }

    /// A zero-filled store of `len` limbs (not normalized).
    pub fn with_len(len: usize) -> Self {
        Self {
            limbs: smallvec::smallvec![0; len.max(1)],
        }
    }

    pub fn len(&self) -> usize {
        self.limbs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limbs.is_empty()
    }

    pub fn as_slice(&self) -> &[Limb] {
        &self.limbs
    }

    pub fn as_mut_slice(&mut self) -> &mut [Limb] {
        &mut self.limbs
    }

    /// Grows with zero limbs or drops high limbs.
    pub fn resize(&mut self, len: usize) {
        self.limbs.resize(len, 0);
    }

    pub fn push(&mut self, limb: Limb) {
        self.limbs.push(limb);
    }

    pub fn truncate(&mut self, len: usize) {
        self.limbs.truncate(len);
    }

    /// Most significant stored limb.
    pub fn top(&self) -> Limb {
        self.limbs.last().copied().unwrap_or(0)
    }

    pub fn is_zero(&self) -> bool {
        self.limbs.iter().all(|&l| l == 0)
    }

    /// Strips leading zero limbs, keeping at least one limb.
    pub fn normalize(&mut self) {
        while self.limbs.len() > 1 && self.limbs[self.limbs.len() - 1] == 0 {
            self.limbs.pop();
        }
        if self.limbs.is_empty() {
            self.limbs.push(0);
        }
    }

    pub fn is_normalized(&self) -> bool {
        match self.limbs.len() {
            0 => false,
            1 => true,
            n => self.limbs[n - 1] != 0,
        }
    }

    /// True while the limbs are held inline rather than on the heap.
    pub fn is_inline(&self) -> bool {
        !self.limbs.spilled()
    }

    pub fn set_zero(&mut self) {
        self.limbs.clear();
        self.limbs.push(0);
    }

    pub fn bit_length(&self) -> usize {
        let top = self.len() - 1;
        let high = self.limbs[top];
        if high == 0 {
            0
        } else {
            top * LIMB_BITS + (LIMB_BITS - high.leading_zeros() as usize)
        }
    }

    /// Limb at `index`, or zero past the end.
    pub fn get(&self, index: usize) -> Limb {
        self.limbs.get(index).copied().unwrap_or(0)
    }
}

impl fmt::Debug for LimbStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, limb) in self.limbs.iter().rev().enumerate() {
            if i > 0 {
                write!(f, "_")?;
            }
            write!(f, "{:0width$x}", limb, width = LIMB_BITS / 4)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_leading_zero_limbs() {
        let mut store = LimbStore::with_len(4);
        store.as_mut_slice()[1] = 7;
        assert!(!store.is_normalized());
        store.normalize();
        assert_eq!(store.as_slice(), &[0, 7]);
        assert!(store.is_normalized());

        let mut zero = LimbStore::with_len(3);
        zero.normalize();
        assert_eq!(zero.as_slice(), &[0]);
        assert!(zero.is_zero());
    }

    #[test]
    fn small_values_stay_inline() {
        let store = LimbStore::from_slice(&[1; INLINE_LIMBS]);
        assert!(store.is_inline());
        let mut big = store.clone();
        big.push(1);
        assert!(!big.is_inline());
    }

    #[test]
    fn bit_length_counts_top_limb() {
        assert_eq!(LimbStore::zero().bit_length(), 0);
        assert_eq!(LimbStore::from_limb(1).bit_length(), 1);
        assert_eq!(LimbStore::from_slice(&[0, 1]).bit_length(), LIMB_BITS + 1);
    }
}
