//! Multiprecision arithmetic kernels: two's-complement big integers of fixed
//! or unbounded width, double- and quad-word float composites, and a generic
//! [`Number`] type over both.

pub mod context;
pub mod error;
pub mod float;
pub mod int;
pub mod limb;
pub mod number;

pub use context::{Context, ContextGuard, Notation};
pub use error::{Error, ParseError, Result};
pub use float::{DoubleDouble, DoubleFloat, DoubleSingle, QuadDouble, QuadFloat, QuadSingle};
pub use int::{BigInt, Int, UInt};
pub use number::{
    Backend, Float128, Float256, FloatBackend, Integer, IntegerBackend, Natural, Number,
    NumericLimits,
};
