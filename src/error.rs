/// Failures reported by the integer and composite backends.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("division by zero")]
    DivisionByZero,
    #[error("overflow: result does not fit in {bits} bits")]
    Overflow { bits: usize },
    #[error("negative result for an unbounded unsigned integer")]
    NegativeUnsigned,
    #[error("{op} is undefined for this operand: {reason}")]
    Domain { op: &'static str, reason: &'static str },
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Malformed numeric text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("cannot parse a number from an empty string")]
    Empty,
    #[error("invalid digit {digit:?} at position {position}")]
    InvalidDigit { digit: char, position: usize },
    #[error("radix {0} is outside 2..=36")]
    InvalidRadix(u32),
    #[error("more than one decimal point")]
    MultipleDecimalPoints,
    #[error("exponent has no digits")]
    UnterminatedExponent,
    #[error("exponent is too large")]
    ExponentOverflow,
    #[error("mantissa has no digits")]
    MissingDigits,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) const fn domain(op: &'static str, reason: &'static str) -> Self {
        Self::Domain { op, reason }
    }
}
