//! Decimal formatting and parsing of composites through their exact values.

use std::cmp::Ordering;

use tracing::debug;

use super::exact::{Dyadic, Ratio};
use super::FloatLimb;
use crate::context::Notation;
use crate::error::{ParseError, Result};
use crate::int::Int;

/// Decimal exponents beyond which every limb type overflows or underflows.
const DECIMAL_EXP_LIMIT: i64 = 400;

const DEFAULT_DIGITS: usize = 6;

/// How a composite is laid out as text.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Style {
    pub notation: Notation,
    pub precision: Option<usize>,
    pub uppercase: bool,
    /// Significant digits for general notation without a precision.
    pub round_trip_digits: usize,
}

fn ten_pow(n: u64) -> Result<Int> {
    Int::from_u64(10)?.pow(n)
}

/// `|mantissa| * 2^exp * 10^pow10`, rounded half to even.
fn scaled_round(d: &Dyadic, pow10: i64) -> Result<Int> {
    let mut num = d.mantissa.clone();
    num.eval_abs()?;
    let mut den = Int::one();
    if d.exp >= 0 {
        num.eval_left_shift(d.exp as usize)?;
    } else {
        den.eval_left_shift(d.exp.unsigned_abs() as usize)?;
    }
    if pow10 >= 0 {
        num.eval_multiply(&ten_pow(pow10 as u64)?)?;
    } else {
        den.eval_multiply(&ten_pow(pow10.unsigned_abs())?)?;
    }
    let (mut q, mut r) = num.divide_qr(&den)?;
    r.eval_left_shift(1)?;
    match r.cmp(&den) {
        Ordering::Greater => q.eval_increment()?,
        Ordering::Equal if q.is_odd() => q.eval_increment()?,
        _ => {}
    }
    Ok(q)
}

/// Exactly `sig` decimal digits of `|d|` and the decimal exponent of the
/// first one.
fn significant_digits(d: &Dyadic, sig: usize) -> Result<(String, i64)> {
    if d.is_zero() {
        return Ok(("0".repeat(sig), 0));
    }
    let bits = d.mantissa.bit_length() as i64 + d.exp;
    let mut k = ((bits - 1) as f64 * std::f64::consts::LOG10_2).floor() as i64;
    loop {
        let digits = scaled_round(d, sig as i64 - 1 - k)?.to_string();
        match digits.len().cmp(&sig) {
            Ordering::Greater => k += 1,
            Ordering::Less => k -= 1,
            Ordering::Equal => return Ok((digits, k)),
        }
    }
}

fn positional(digits: &str, k: i64) -> String {
    let n = digits.len() as i64;
    if k < 0 {
        format!("0.{}{digits}", "0".repeat((-k - 1) as usize))
    } else if n <= k + 1 {
        format!("{digits}{}", "0".repeat((k + 1 - n) as usize))
    } else {
        let (int, frac) = digits.split_at(k as usize + 1);
        format!("{int}.{frac}")
    }
}

fn scientific(digits: &str, k: i64, exp_char: char) -> String {
    let (lead, rest) = digits.split_at(1);
    if rest.is_empty() {
        format!("{lead}{exp_char}{k}")
    } else {
        format!("{lead}.{rest}{exp_char}{k}")
    }
}

fn fixed(d: &Dyadic, precision: usize) -> Result<String> {
    let digits = scaled_round(d, precision as i64)?.to_string();
    if precision == 0 {
        return Ok(digits);
    }
    let padded = format!("{digits:0>width$}", width = precision + 1);
    let (int, frac) = padded.split_at(padded.len() - precision);
    Ok(format!("{int}.{frac}"))
}

/// Formats the exact sum of `limbs`.
pub(crate) fn format_limbs<F: FloatLimb>(limbs: &[F], style: Style) -> Result<String> {
    let lead = limbs[0];
    if lead.is_nan() {
        return Ok("NaN".to_string());
    }
    let sign = if lead.is_sign_negative() { "-" } else { "" };
    let Some(d) = Dyadic::from_limbs(limbs)? else {
        return Ok(format!("{sign}inf"));
    };
    let exp_char = if style.uppercase { 'E' } else { 'e' };

    let body = match style.notation {
        Notation::Fixed => fixed(&d, style.precision.unwrap_or(DEFAULT_DIGITS))?,
        Notation::Scientific => {
            let sig = style.precision.unwrap_or(DEFAULT_DIGITS) + 1;
            let (digits, k) = significant_digits(&d, sig)?;
            scientific(&digits, k, exp_char)
        }
        Notation::General => {
            let sig = style.precision.unwrap_or(style.round_trip_digits).max(1);
            let (digits, k) = significant_digits(&d, sig)?;
            let trimmed = match digits.trim_end_matches('0') {
                "" => "0",
                t => t,
            };
            if (-5..sig as i64).contains(&k) {
                positional(trimmed, k)
            } else {
                scientific(trimmed, k, exp_char)
            }
        }
    };
    Ok(format!("{sign}{body}"))
}

fn parse_exponent(chars: &[char], offset: usize) -> Result<i64> {
    let (negative, digits, offset) = match chars.first() {
        Some('-') => (true, &chars[1..], offset + 1),
        Some('+') => (false, &chars[1..], offset + 1),
        _ => (false, chars, offset),
    };
    if digits.is_empty() {
        return Err(ParseError::UnterminatedExponent.into());
    }
    let mut exp: i64 = 0;
    for (i, &c) in digits.iter().enumerate() {
        let d = c.to_digit(10).ok_or(ParseError::InvalidDigit {
            digit: c,
            position: offset + i,
        })?;
        exp = exp
            .checked_mul(10)
            .and_then(|e| e.checked_add(d as i64))
            .filter(|e| *e <= i32::MAX as i64)
            .ok_or(ParseError::ExponentOverflow)?;
    }
    Ok(if negative { -exp } else { exp })
}

/// Parses `[+-]digits[.digits][e[+-]digits]`, `inf`, `infinity` or `nan`
/// into `N` limbs, each the correctly rounded residual of the exact value.
pub(crate) fn parse_limbs<F: FloatLimb, const N: usize>(s: &str) -> Result<[F; N]> {
    let parsed = parse_inner(s);
    if let Err(err) = &parsed {
        debug!(input = s, %err, "composite parse failed");
    }
    parsed
}

fn parse_inner<F: FloatLimb, const N: usize>(s: &str) -> Result<[F; N]> {
    if s.is_empty() {
        return Err(ParseError::Empty.into());
    }
    let (negative, body, offset) = match s.as_bytes()[0] {
        b'-' => (true, &s[1..], 1),
        b'+' => (false, &s[1..], 1),
        _ => (false, s, 0),
    };
    let signed = |v: F| if negative { -v } else { v };
    let mut limbs = [F::zero(); N];

    match body.to_ascii_lowercase().as_str() {
        "inf" | "infinity" => {
            limbs[0] = signed(F::infinity());
            return Ok(limbs);
        }
        "nan" => {
            limbs[0] = F::nan();
            return Ok(limbs);
        }
        _ => {}
    }

    let chars: Vec<char> = body.chars().collect();
    let mut digits = String::with_capacity(chars.len());
    let mut frac_len: i64 = 0;
    let mut seen_point = false;
    let mut exp: i64 = 0;
    for (i, &c) in chars.iter().enumerate() {
        match c {
            '0'..='9' => {
                digits.push(c);
                frac_len += seen_point as i64;
            }
            '.' if seen_point => return Err(ParseError::MultipleDecimalPoints.into()),
            '.' => seen_point = true,
            'e' | 'E' => {
                exp = parse_exponent(&chars[i + 1..], offset + i + 1)?;
                break;
            }
            _ => {
                return Err(ParseError::InvalidDigit {
                    digit: c,
                    position: offset + i,
                }
                .into())
            }
        }
    }
    if digits.is_empty() {
        return Err(ParseError::MissingDigits.into());
    }

    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        limbs[0] = signed(F::zero());
        return Ok(limbs);
    }
    let e10 = exp - frac_len;
    let lead_exp = e10 + significant.len() as i64 - 1;
    if lead_exp > DECIMAL_EXP_LIMIT {
        limbs[0] = signed(F::infinity());
        return Ok(limbs);
    }
    if lead_exp < -DECIMAL_EXP_LIMIT {
        limbs[0] = signed(F::zero());
        return Ok(limbs);
    }

    let mut num = Int::from_str_radix(significant, 10)?;
    let mut den = Int::one();
    if e10 >= 0 {
        num.eval_multiply(&ten_pow(e10 as u64)?)?;
    } else {
        den = ten_pow(e10.unsigned_abs())?;
    }
    if negative {
        num.eval_negate()?;
    }
    let limbs: [F; N] = Ratio::new(num, den).into_limbs()?;
    if limbs[0].is_zero() {
        let mut zero = [F::zero(); N];
        zero[0] = signed(F::zero());
        return Ok(zero);
    }
    Ok(limbs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn general(limbs: &[f64], digits: usize) -> String {
        format_limbs(
            limbs,
            Style {
                notation: Notation::General,
                precision: None,
                uppercase: false,
                round_trip_digits: digits,
            },
        )
        .unwrap()
    }

    fn styled(limbs: &[f64], notation: Notation, precision: usize) -> String {
        format_limbs(
            limbs,
            Style {
                notation,
                precision: Some(precision),
                uppercase: false,
                round_trip_digits: 33,
            },
        )
        .unwrap()
    }

    #[test]
    fn general_notation_trims_and_switches_to_scientific() {
        assert_eq!(general(&[1.5, 0.0], 33), "1.5");
        assert_eq!(general(&[0.0, 0.0], 33), "0");
        assert_eq!(general(&[-0.0, 0.0], 33), "-0");
        assert_eq!(general(&[1e40, 0.0], 17), "1e40");
        assert_eq!(general(&[-2f64.powi(-23), 0.0], 33), "-1.1920928955078125e-7");
        assert_eq!(general(&[123456.0, 0.0], 33), "123456");
        assert_eq!(general(&[0.001, 0.0], 17), "0.001");
        assert_eq!(general(&[0.1, 0.0], 17), "0.10000000000000001");
        assert_eq!(general(&[f64::NEG_INFINITY, 0.0], 33), "-inf");
        assert_eq!(general(&[f64::NAN, 0.0], 33), "NaN");
    }

    #[test]
    fn limbs_contribute_digits_beyond_one_double() {
        assert_eq!(general(&[1.0, 2f64.powi(-60)], 33), "1.0000000000000000008673617379884");
    }

    #[test]
    fn fixed_and_scientific_layouts() {
        assert_eq!(styled(&[3.14159, 0.0], Notation::Fixed, 2), "3.14");
        assert_eq!(styled(&[0.005, 0.0], Notation::Fixed, 1), "0.0");
        assert_eq!(styled(&[2.5, 0.0], Notation::Fixed, 0), "2");
        assert_eq!(styled(&[-0.0625, 0.0], Notation::Fixed, 4), "-0.0625");
        assert_eq!(styled(&[1234.5, 0.0], Notation::Scientific, 2), "1.23e3");
        assert_eq!(styled(&[9.999, 0.0], Notation::Scientific, 1), "1.0e1");
        assert_eq!(styled(&[0.0, 0.0], Notation::Scientific, 2), "0.00e0");
    }

    #[test]
    fn parses_decimal_forms() {
        let third: [f64; 2] = parse_limbs("0.333333333333333333333333333333333").unwrap();
        assert_eq!(third[0], 1.0 / 3.0);
        assert!(third[1] != 0.0);

        let v: [f64; 2] = parse_limbs("-12.5e-1").unwrap();
        assert_eq!(v, [-1.25, 0.0]);
        let v: [f64; 4] = parse_limbs("+1E2").unwrap();
        assert_eq!(v, [100.0, 0.0, 0.0, 0.0]);
        let v: [f64; 2] = parse_limbs(".5").unwrap();
        assert_eq!(v[0], 0.5);
        let v: [f64; 2] = parse_limbs("-0.000").unwrap();
        assert!(v[0] == 0.0 && v[0].is_sign_negative());
        let v: [f64; 2] = parse_limbs("-Infinity").unwrap();
        assert_eq!(v[0], f64::NEG_INFINITY);
        let v: [f64; 2] = parse_limbs("nan").unwrap();
        assert!(v[0].is_nan());
        let v: [f64; 2] = parse_limbs("1e500").unwrap();
        assert_eq!(v[0], f64::INFINITY);
        let v: [f64; 2] = parse_limbs("-1e-500").unwrap();
        assert!(v[0] == 0.0 && v[0].is_sign_negative());
    }

    #[test]
    fn rejects_malformed_text() {
        let parse = |s: &str| parse_limbs::<f64, 2>(s).unwrap_err();
        assert_eq!(parse(""), Error::Parse(ParseError::Empty));
        assert_eq!(parse("1.2.3"), Error::Parse(ParseError::MultipleDecimalPoints));
        assert_eq!(parse("1e"), Error::Parse(ParseError::UnterminatedExponent));
        assert_eq!(parse("1e+"), Error::Parse(ParseError::UnterminatedExponent));
        assert_eq!(parse("1e99999999999"), Error::Parse(ParseError::ExponentOverflow));
        assert_eq!(parse("."), Error::Parse(ParseError::MissingDigits));
        assert_eq!(parse("-e5"), Error::Parse(ParseError::MissingDigits));
        assert_eq!(
            parse("12x"),
            Error::Parse(ParseError::InvalidDigit { digit: 'x', position: 2 })
        );
        assert_eq!(
            parse("-1e5z"),
            Error::Parse(ParseError::InvalidDigit { digit: 'z', position: 4 })
        );
        assert_eq!(
            parse(" 1"),
            Error::Parse(ParseError::InvalidDigit { digit: ' ', position: 0 })
        );
    }
}
