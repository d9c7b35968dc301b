//! Exact rational views of composites, used for conversions to and from
//! integers and decimal text.

use super::FloatLimb;
use crate::error::{Error, Result};
use crate::int::Int;

/// The exact value `mantissa * 2^exp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dyadic {
    pub mantissa: Int,
    pub exp: i64,
}

impl Dyadic {
    /// Exact sum of finite limbs; `None` if any limb is NaN or infinite.
    pub fn from_limbs<F: FloatLimb>(limbs: &[F]) -> Result<Option<Self>> {
        if limbs.iter().any(|l| !l.is_finite()) {
            return Ok(None);
        }
        let parts: Vec<_> = limbs
            .iter()
            .filter(|l| !l.is_zero())
            .map(|l| l.integer_decode())
            .collect();
        let Some(exp) = parts.iter().map(|&(_, e, _)| e as i64).min() else {
            return Ok(Some(Self {
                mantissa: Int::zero(),
                exp: 0,
            }));
        };
        let mut mantissa = Int::zero();
        for (m, e, sign) in parts {
            let mut term = Int::from_u64(m)?;
            term.eval_left_shift((e as i64 - exp) as usize)?;
            if sign < 0 {
                term.eval_negate()?;
            }
            mantissa.eval_add(&term)?;
        }
        Ok(Some(Self { mantissa, exp }))
    }

    pub fn from_int(v: &Int) -> Self {
        Self {
            mantissa: v.clone(),
            exp: 0,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.mantissa.is_negative()
    }

    /// The value rounded toward zero.
    pub fn trunc(&self) -> Result<Int> {
        let mut v = self.mantissa.clone();
        if self.exp >= 0 {
            v.eval_left_shift(self.exp as usize)?;
        } else {
            let negative = v.is_negative();
            v.eval_abs()?;
            v.eval_right_shift(self.exp.unsigned_abs() as usize)?;
            if negative {
                v.eval_negate()?;
            }
        }
        Ok(v)
    }
}

/// The exact value `num * 2^shift / den` with `den > 0`.
#[derive(Debug, Clone)]
pub(crate) struct Ratio {
    num: Int,
    den: Int,
    shift: i64,
}

impl Ratio {
    pub(crate) fn new(num: Int, den: Int) -> Self {
        Self { num, den, shift: 0 }
    }

    pub(crate) fn from_dyadic(d: Dyadic) -> Self {
        Self {
            num: d.mantissa,
            den: Int::one(),
            shift: d.exp,
        }
    }

    pub(crate) fn is_zero(&self) -> bool {
        self.num.is_zero()
    }

    /// The nearest `F`, ties to even, with gradual underflow and overflow to
    /// infinity.
    pub(crate) fn round<F: FloatLimb>(&self) -> Result<F> {
        let mut magnitude = self.num.clone();
        magnitude.eval_abs()?;
        let value: F = round_magnitude(&magnitude, &self.den, self.shift)?;
        Ok(if self.num.is_negative() { -value } else { value })
    }

    /// Subtracts a finite float exactly.
    pub(crate) fn subtract<F: FloatLimb>(&mut self, x: F) -> Result<()> {
        if x.is_zero() {
            return Ok(());
        }
        let (m, e, sign) = x.integer_decode();
        let e = e as i64;
        let t = self.shift.min(e);
        self.num.eval_left_shift((self.shift - t) as usize)?;
        let mut term = self.den.clone();
        term.eval_multiply(&Int::from_u64(m)?)?;
        term.eval_left_shift((e - t) as usize)?;
        if sign < 0 {
            self.num.eval_add(&term)?;
        } else {
            self.num.eval_subtract(&term)?;
        }
        self.shift = t;
        Ok(())
    }

    /// Splits into `N` limbs, each the correctly rounded residual of what
    /// the previous limbs left over.
    pub(crate) fn into_limbs<F: FloatLimb, const N: usize>(mut self) -> Result<[F; N]> {
        let mut limbs = [F::zero(); N];
        for limb in limbs.iter_mut() {
            if self.is_zero() {
                break;
            }
            *limb = self.round()?;
            if !limb.is_finite() {
                break;
            }
            self.subtract(*limb)?;
        }
        Ok(limbs)
    }
}

/// Rounds `num * 2^shift / den` (non-negative) to the nearest `F`.
fn round_magnitude<F: FloatLimb>(num: &Int, den: &Int, shift: i64) -> Result<F> {
    if num.is_zero() {
        return Ok(F::zero());
    }
    let p = F::MANTISSA_DIGITS as i64;
    let min_unit = F::MIN_EXP as i64 - p;
    // value in [2^(e - 1), 2^(e + 1))
    let e = num.bit_length() as i64 - den.bit_length() as i64 + shift;
    if e - 1 >= F::MAX_EXP as i64 {
        return Ok(F::infinity());
    }
    if e + 1 < min_unit - 1 {
        return Ok(F::zero());
    }

    // q = floor(value / 2^scale) carries at least two bits below the unit.
    let scale = (e - p - 2).max(min_unit - 2);
    let (mut n, mut d) = (num.clone(), den.clone());
    let k = shift - scale;
    if k >= 0 {
        n.eval_left_shift(k as usize)?;
    } else {
        d.eval_left_shift(k.unsigned_abs() as usize)?;
    }
    let (q, r) = n.divide_qr(&d)?;

    let unit = (scale + q.bit_length() as i64 - p).max(min_unit);
    let drop = (unit - scale) as usize;
    let half = q.bit_test(drop - 1);
    let below = !r.is_zero() || q.lsb().is_some_and(|i| i < drop - 1);
    let mut m = q.clone();
    m.eval_right_shift(drop)?;
    debug_assert!(m.bit_length() as i64 <= p);
    let mut mantissa = m.to_u64().ok_or(Error::Overflow {
        bits: u64::BITS as usize,
    })?;
    if half && (below || mantissa & 1 == 1) {
        mantissa += 1;
    }
    Ok(F::from_mantissa(mantissa).ldexp(unit as i32))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn ratio(num: i128, den: i128) -> Ratio {
        Ratio::new(Int::from_i128(num).unwrap(), Int::from_i128(den).unwrap())
    }

    #[test]
    fn rounds_ratios_like_the_native_parser() {
        assert_eq!(ratio(1, 10).round::<f64>().unwrap(), 0.1);
        assert_eq!(ratio(-2, 3).round::<f64>().unwrap(), -2.0 / 3.0);
        assert_eq!(ratio(1, 3).round::<f32>().unwrap(), 1.0f32 / 3.0);
        assert_eq!(ratio(0, 7).round::<f64>().unwrap(), 0.0);
    }

    #[test]
    fn ties_go_to_even() {
        // 2^53 + 1 is halfway between representable neighbours.
        let tie = ratio((1 << 53) + 1, 1);
        assert_eq!(tie.round::<f64>().unwrap(), 9007199254740992.0);
        let above = ratio((1 << 53) + 3, 1);
        assert_eq!(above.round::<f64>().unwrap(), 9007199254740996.0);
    }

    #[test]
    fn rounding_carries_into_the_next_binade() {
        // 2^54 - 1 needs one bit more than the mantissa holds
        let r = ratio((1 << 54) - 1, 1);
        assert_eq!(r.round::<f64>().unwrap(), 18014398509481984.0);
        assert_eq!(ratio(i128::MAX, 1).round::<f64>().unwrap(), i128::MAX as f64);
        assert_eq!(ratio(i128::MIN, 3).round::<f64>().unwrap(), i128::MIN as f64 / 3.0);
    }

    #[test]
    fn subnormal_and_overflow_boundaries() {
        let mut tiny = Ratio::from_dyadic(Dyadic {
            mantissa: Int::from_i64(3).unwrap(),
            exp: -1076,
        });
        // 0.75 * 2^-1074 rounds up to the smallest subnormal
        assert_eq!(tiny.round::<f64>().unwrap(), f64::from_bits(1));
        tiny.shift = -1077;
        assert_eq!(tiny.round::<f64>().unwrap(), 0.0);

        let huge = Ratio::from_dyadic(Dyadic {
            mantissa: Int::one(),
            exp: 1024,
        });
        assert_eq!(huge.round::<f64>().unwrap(), f64::INFINITY);
        let max = Ratio::from_dyadic(Dyadic::from_limbs(&[f64::MAX]).unwrap().unwrap());
        assert_eq!(max.round::<f64>().unwrap(), f64::MAX);
    }

    #[test]
    fn greedy_limbs_reconstruct_one_third() {
        let limbs: [f64; 4] = ratio(1, 3).into_limbs().unwrap();
        assert_eq!(limbs[0], 1.0 / 3.0);
        for pair in limbs.windows(2) {
            assert!(pair[1].abs() <= pair[0].abs() * f64::EPSILON);
        }
        let mut rest = ratio(1, 3);
        for &l in &limbs {
            rest.subtract(l).unwrap();
        }
        let left: f64 = rest.round().unwrap();
        assert!(left.abs() < 2f64.powi(-210));
    }

    #[test]
    fn dyadic_trunc_rounds_toward_zero() {
        let d = Dyadic::from_limbs(&[-2.75f64]).unwrap().unwrap();
        assert_eq!(d.trunc().unwrap().to_i64(), Some(-2));
        let d = Dyadic::from_limbs(&[1e20f64, 1.0]).unwrap().unwrap();
        assert_eq!(d.trunc().unwrap().to_u128(), Some(100_000_000_000_000_000_001));
        assert!(Dyadic::from_limbs(&[f64::NAN]).unwrap().is_none());
        assert!(Dyadic::from_limbs(&[0.0f64, 0.0]).unwrap().unwrap().is_zero());
    }

    proptest! {
        #[test]
        fn round_matches_native_division(num in 1i64..1 << 53, den in 1i64..1 << 53) {
            // both operands are exact doubles, so the native quotient is correctly rounded
            let expected = (num as f64) / (den as f64);
            let got: f64 = ratio(num as i128, den as i128).round().unwrap();
            prop_assert_eq!(got, expected);
        }

        #[test]
        fn wide_quotients_round_to_nearest(num: i128, den in 1i128..1 << 40) {
            let exact = rug::Float::with_val(600, num) / rug::Float::with_val(600, den);
            let got: f64 = ratio(num, den).round().unwrap();
            prop_assert_eq!(got, exact.to_f64());
        }

        #[test]
        fn float_round_trip(x in prop::num::f64::NORMAL | prop::num::f64::SUBNORMAL) {
            let d = Dyadic::from_limbs(&[x]).unwrap().unwrap();
            prop_assert_eq!(Ratio::from_dyadic(d).round::<f64>().unwrap(), x);
        }
    }
}
