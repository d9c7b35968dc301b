use std::fmt;
use std::str::FromStr;

use tracing::debug;

use super::div::div_rem_limb_in_place;
use super::mul::mul_limb_in_place;
use super::BigInt;
use crate::context::Context;
use crate::error::{Error, ParseError, Result};
use crate::limb::{add_magnitude_assign, Limb, LimbStore, Native};

/// Largest power of `radix` that fits in a limb, with its exponent.
fn chunk_base(radix: u32) -> (Limb, usize) {
    let radix = radix as Limb;
    let mut base = radix;
    let mut digits = 1;
    while let Some(next) = base.checked_mul(radix) {
        base = next;
        digits += 1;
    }
    (base, digits)
}

const LOWER_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const UPPER_DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// `d` is always below the radix, which is at most 36.
fn digit_char(d: u32, uppercase: bool) -> char {
    let table = if uppercase { UPPER_DIGITS } else { LOWER_DIGITS };
    table[d as usize] as char
}

/// Digits of a magnitude in `radix`, most significant first, no sign.
pub(crate) fn magnitude_digits(mag: &LimbStore, radix: u32, uppercase: bool) -> String {
    if mag.is_zero() {
        return "0".to_string();
    }
    let (base, width) = chunk_base(radix);
    let mut rest = mag.clone();
    let mut chunks = Vec::new();
    while !rest.is_zero() {
        chunks.push(div_rem_limb_in_place(&mut rest, base));
    }

    let mut out = String::with_capacity(chunks.len() * width);
    let mut buf = vec!['0'; width];
    for (i, &chunk) in chunks.iter().rev().enumerate() {
        let mut c = chunk;
        for slot in buf.iter_mut().rev() {
            *slot = digit_char((c % radix as Limb) as u32, uppercase);
            c /= radix as Limb;
        }
        let digits = if i == 0 {
            let lead = buf.iter().position(|&ch| ch != '0').unwrap_or(width - 1);
            &buf[lead..]
        } else {
            &buf[..]
        };
        out.extend(digits);
    }
    out
}

/// Parses unsigned digits in `radix`; `offset` is the position of the first
/// digit in the original text, for error reporting.
fn parse_magnitude(digits: &str, radix: u32, offset: usize) -> Result<LimbStore> {
    if digits.is_empty() {
        return Err(ParseError::MissingDigits.into());
    }
    let (_, width) = chunk_base(radix);
    let mut mag = LimbStore::zero();
    let mut chunk: Limb = 0;
    let mut scale: Limb = 1;
    let mut pending = 0;
    for (i, c) in digits.chars().enumerate() {
        let d = c.to_digit(radix).ok_or(ParseError::InvalidDigit {
            digit: c,
            position: offset + i,
        })?;
        chunk = chunk * radix as Limb + d as Limb;
        scale *= radix as Limb;
        pending += 1;
        if pending == width {
            mul_limb_in_place(&mut mag, scale);
            add_magnitude_assign::<Native>(&mut mag, &[chunk]);
            (chunk, scale, pending) = (0, 1, 0);
        }
    }
    if pending > 0 {
        mul_limb_in_place(&mut mag, scale);
        add_magnitude_assign::<Native>(&mut mag, &[chunk]);
    }
    Ok(mag)
}

fn split_sign(s: &str) -> (bool, &str, usize) {
    match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..], 1),
        Some(b'+') => (false, &s[1..], 1),
        _ => (false, s, 0),
    }
}

impl<const BITS: usize, const SIGNED: bool, const CHECKED: bool> BigInt<BITS, SIGNED, CHECKED> {
    /// Parses `[+-]digits` in `radix` (2 to 36). The width policy applies to
    /// the parsed value, so `"-1"` is all ones in an unchecked unsigned type.
    pub fn from_str_radix(s: &str, radix: u32) -> Result<Self> {
        if !(2..=36).contains(&radix) {
            return Err(ParseError::InvalidRadix(radix).into());
        }
        if s.is_empty() {
            return Err(ParseError::Empty.into());
        }
        let (negative, digits, offset) = split_sign(s);
        let mag = parse_magnitude(digits, radix, offset)?;
        Self::from_parts(mag, negative)
    }

    /// Digits in `radix` with a leading `-` for negative values.
    pub fn to_string_radix(&self, radix: u32) -> Result<String> {
        if !(2..=36).contains(&radix) {
            return Err(ParseError::InvalidRadix(radix).into());
        }
        let digits = magnitude_digits(&self.mag, radix, false);
        Ok(if self.negative {
            format!("-{digits}")
        } else {
            digits
        })
    }

    /// Formats in the context's radix, with a base prefix when requested.
    pub fn to_string_ctx(&self, ctx: &Context) -> String {
        let radix = ctx.radix();
        let mut out = String::new();
        if self.negative {
            out.push('-');
        }
        if ctx.show_base() {
            out.push_str(match radix {
                16 => "0x",
                8 => "0o",
                2 => "0b",
                _ => "",
            });
        }
        out.push_str(&magnitude_digits(&self.mag, radix, ctx.uppercase()));
        out
    }
}

impl<const BITS: usize, const SIGNED: bool, const CHECKED: bool> FromStr
    for BigInt<BITS, SIGNED, CHECKED>
{
    type Err = Error;

    /// Decimal, or hexadecimal/binary/octal after a `0x`/`0b`/`0o` prefix.
    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(ParseError::Empty.into());
        }
        let (negative, rest, offset) = split_sign(s);
        let (radix, digits, offset) = match rest.get(..2) {
            Some("0x" | "0X") => (16, &rest[2..], offset + 2),
            Some("0b" | "0B") => (2, &rest[2..], offset + 2),
            Some("0o" | "0O") => (8, &rest[2..], offset + 2),
            _ => (10, rest, offset),
        };
        let parsed = parse_magnitude(digits, radix, offset)
            .and_then(|mag| Self::from_parts(mag, negative));
        if let Err(err) = &parsed {
            debug!(input = s, %err, "integer parse failed");
        }
        parsed
    }
}

macro_rules! impl_radix_fmt {
    ($($trait:ident => $radix:expr, $prefix:expr, $upper:expr;)*) => {$(
        impl<const BITS: usize, const SIGNED: bool, const CHECKED: bool> fmt::$trait
            for BigInt<BITS, SIGNED, CHECKED>
        {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let digits = magnitude_digits(&self.mag, $radix, $upper);
                f.pad_integral(!self.negative, $prefix, &digits)
            }
        }
    )*};
}

impl_radix_fmt! {
    Display => 10, "", false;
    LowerHex => 16, "0x", false;
    UpperHex => 16, "0x", true;
    Binary => 2, "0b", false;
    Octal => 8, "0o", false;
}
