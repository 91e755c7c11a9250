use std::fmt::{self, Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::{Error, Result};

/// A finite number usable as part of a cache key.
///
/// Equality and hashing go through the bit pattern, which is sound because
/// NaN is excluded and negative zero is folded into positive zero.
#[derive(Copy, Clone, PartialEq, PartialOrd)]
pub struct Operand(f64);

impl Operand {
    /// Wrap a number, rejecting NaN and infinities.
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(Error::NonFinite { value });
        }

        // `-0.0 == 0.0`, but their bits differ.
        Ok(Self(if value == 0.0 { 0.0 } else { value }))
    }

    /// The wrapped number.
    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl Eq for Operand {}

impl Hash for Operand {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl TryFrom<f64> for Operand {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Operand> for f64 {
    fn from(operand: Operand) -> Self {
        operand.0
    }
}

impl Debug for Operand {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Display for Operand {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// The key of one call to a binary function.
///
/// The pair is ordered: `(a, b)` and `(b, a)` are different keys, even for
/// commutative functions. Its text form is `a,b`.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct PairKey {
    a: Operand,
    b: Operand,
}

impl PairKey {
    /// Build the key for the call `f(a, b)`.
    pub fn new(a: f64, b: f64) -> Result<Self> {
        Ok(Self::from_operands(Operand::new(a)?, Operand::new(b)?))
    }

    /// Build a key from already validated operands.
    #[inline]
    pub fn from_operands(a: Operand, b: Operand) -> Self {
        Self { a, b }
    }

    /// The first argument.
    #[inline]
    pub fn a(&self) -> f64 {
        self.a.get()
    }

    /// The second argument.
    #[inline]
    pub fn b(&self) -> f64 {
        self.b.get()
    }

    /// The key with its arguments swapped.
    pub fn swapped(self) -> Self {
        Self { a: self.b, b: self.a }
    }
}

impl Debug for PairKey {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "PairKey({self})")
    }
}

impl Display for PairKey {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{},{}", self.a, self.b)
    }
}

impl FromStr for PairKey {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self> {
        let malformed = || Error::MalformedKey { text: text.into() };
        let (a, b) = text.split_once(',').ok_or_else(malformed)?;
        let a: f64 = a.trim().parse().map_err(|_| malformed())?;
        let b: f64 = b.trim().parse().map_err(|_| malformed())?;
        Self::new(a, b)
    }
}
