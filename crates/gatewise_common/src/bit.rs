//! Two-state logic values with boolean operators.
//!
//! Nets in a gate-level simulation only ever hold `0` or `1`; there is no
//! undefined or high-impedance state retained between steps.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};

/// A single two-state logic value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Bit {
    /// Logic low (0).
    #[default]
    Zero = 0,
    /// Logic high (1).
    One = 1,
}

/// Error returned when a character or integer is not a valid [`Bit`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid bit value '{0}'")]
pub struct ParseBitError(pub String);

impl Bit {
    /// Converts a character to a [`Bit`].
    ///
    /// Accepts only '0' and '1'.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Bit::Zero),
            '1' => Some(Bit::One),
            _ => None,
        }
    }

    /// Returns `true` if this is [`Bit::One`].
    pub fn is_one(self) -> bool {
        self == Bit::One
    }

    /// Returns the value as `0` or `1`.
    pub fn as_u64(self) -> u64 {
        self as u64
    }
}

impl From<bool> for Bit {
    fn from(value: bool) -> Self {
        if value {
            Bit::One
        } else {
            Bit::Zero
        }
    }
}

impl From<Bit> for bool {
    fn from(value: Bit) -> Self {
        value == Bit::One
    }
}

impl TryFrom<u64> for Bit {
    type Error = ParseBitError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Bit::Zero),
            1 => Ok(Bit::One),
            other => Err(ParseBitError(other.to_string())),
        }
    }
}

impl fmt::Display for Bit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bit::Zero => write!(f, "0"),
            Bit::One => write!(f, "1"),
        }
    }
}

impl BitAnd for Bit {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Bit::from(self.is_one() && rhs.is_one())
    }
}

impl BitOr for Bit {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Bit::from(self.is_one() || rhs.is_one())
    }
}

impl BitXor for Bit {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self {
        Bit::from(self != rhs)
    }
}

impl Not for Bit {
    type Output = Self;

    fn not(self) -> Self {
        match self {
            Bit::Zero => Bit::One,
            Bit::One => Bit::Zero,
        }
    }
}
