//! Formatting and precision settings passed explicitly to conversions.

use std::ops::{Deref, DerefMut};

use crate::error::{ParseError, Result};

/// Layout of formatted composite floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Notation {
    /// Positional for moderate exponents, scientific otherwise; trailing
    /// zeros are trimmed.
    #[default]
    General,
    /// `d.ddd…e±x` with `precision` digits after the point.
    Scientific,
    /// Positional with `precision` digits after the point.
    Fixed,
}

/// Settings consumed by `to_string_ctx`.
///
/// There is no process-wide default: callers own a context and pass it by
/// reference. [`Context::scoped`] changes settings temporarily.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    precision: Option<usize>,
    notation: Notation,
    radix: u32,
    show_base: bool,
    uppercase: bool,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            precision: None,
            notation: Notation::General,
            radix: 10,
            show_base: false,
            uppercase: false,
        }
    }
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Digits to produce. `None` selects the type's round-trip digit count
    /// for general notation and six digits for the others.
    pub fn precision(&self) -> Option<usize> {
        self.precision
    }

    pub fn notation(&self) -> Notation {
        self.notation
    }

    /// Radix for integer output.
    pub fn radix(&self) -> u32 {
        self.radix
    }

    pub fn show_base(&self) -> bool {
        self.show_base
    }

    pub fn uppercase(&self) -> bool {
        self.uppercase
    }

    pub fn set_precision(&mut self, precision: Option<usize>) {
        self.precision = precision;
    }

    pub fn set_notation(&mut self, notation: Notation) {
        self.notation = notation;
    }

    pub fn set_radix(&mut self, radix: u32) -> Result<()> {
        if !(2..=36).contains(&radix) {
            return Err(ParseError::InvalidRadix(radix).into());
        }
        self.radix = radix;
        Ok(())
    }

    pub fn set_show_base(&mut self, show_base: bool) {
        self.show_base = show_base;
    }

    pub fn set_uppercase(&mut self, uppercase: bool) {
        self.uppercase = uppercase;
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn with_notation(mut self, notation: Notation) -> Self {
        self.notation = notation;
        self
    }

    /// Saves the current settings; they are restored when the guard drops,
    /// however the scope is left.
    pub fn scoped(&mut self) -> ContextGuard<'_> {
        let saved = self.clone();
        ContextGuard { ctx: self, saved }
    }
}

/// Restores a [`Context`] to the settings it had when the guard was taken.
pub struct ContextGuard<'a> {
    ctx: &'a mut Context,
    saved: Context,
}

impl Deref for ContextGuard<'_> {
    type Target = Context;

    fn deref(&self) -> &Context {
        self.ctx
    }
}

impl DerefMut for ContextGuard<'_> {
    fn deref_mut(&mut self) -> &mut Context {
        self.ctx
    }
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        std::mem::swap(self.ctx, &mut self.saved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn formats_in_hex(ctx: &mut Context, fail: bool) -> Result<u32> {
        let mut scoped = ctx.scoped();
        scoped.set_radix(16)?;
        scoped.set_precision(Some(3));
        if fail {
            scoped.set_radix(99)?;
        }
        Ok(scoped.radix())
    }

    #[test]
    fn guard_restores_on_every_exit_path() {
        let mut ctx = Context::default();
        assert_eq!(formats_in_hex(&mut ctx, false), Ok(16));
        assert_eq!(ctx, Context::default());

        assert_eq!(
            formats_in_hex(&mut ctx, true),
            Err(Error::Parse(ParseError::InvalidRadix(99)))
        );
        assert_eq!(ctx, Context::default());
    }

    #[test]
    fn guard_restores_after_panic() {
        let mut ctx = Context::default().with_precision(4);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut scoped = ctx.scoped();
            scoped.set_notation(Notation::Fixed);
            panic!("formatting failed");
        }));
        assert!(result.is_err());
        assert_eq!(ctx.notation(), Notation::General);
        assert_eq!(ctx.precision(), Some(4));
    }

    #[test]
    fn nested_scopes() {
        let mut ctx = Context::new();
        {
            let mut outer = ctx.scoped();
            outer.set_uppercase(true);
            {
                let mut inner = outer.scoped();
                inner.set_show_base(true);
                assert!(inner.uppercase() && inner.show_base());
            }
            assert!(outer.uppercase() && !outer.show_base());
        }
        assert!(!ctx.uppercase());
    }
}
