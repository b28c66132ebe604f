//! Shared foundational types used across the gatewise simulator.
//!
//! This crate provides two-state logic values, packed bit vectors used as the
//! transfer format for port values, and interned identifiers for module, port,
//! and cell-type names.

#![warn(missing_docs)]

pub mod bit;
pub mod bit_vec;
pub mod ident;

pub use bit::{Bit, ParseBitError};
pub use bit_vec::BitVec;
pub use ident::{Ident, Interner};
