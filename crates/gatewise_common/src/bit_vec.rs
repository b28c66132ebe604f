//! Packed vectors of two-state bits.
//!
//! [`BitVec`] is the bulk transfer format for port values: index 0 is the
//! least significant bit, matching the bit order of a port declaration.

use crate::bit::Bit;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A vector of [`Bit`]s packed 64 per `u64` word.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitVec {
    width: u32,
    /// Packed storage: 1 bit per value, 64 values per u64.
    data: Vec<u64>,
}

/// Number of bits packed per u64 word.
const BITS_PER_WORD: u32 = 64;

impl BitVec {
    /// Creates a new `BitVec` of the given width, initialized to all `Zero`.
    pub fn new(width: u32) -> Self {
        Self {
            width,
            data: vec![0; word_count(width)],
        }
    }

    /// Returns the number of bits in this vector.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns `true` if the vector has zero width.
    pub fn is_empty(&self) -> bool {
        self.width == 0
    }

    /// Gets the bit at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn get(&self, index: u32) -> Bit {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let word = self.data[(index / BITS_PER_WORD) as usize];
        Bit::from((word >> (index % BITS_PER_WORD)) & 1 != 0)
    }

    /// Sets the bit at the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn set(&mut self, index: u32, value: Bit) {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let word = &mut self.data[(index / BITS_PER_WORD) as usize];
        let mask = 1u64 << (index % BITS_PER_WORD);
        match value {
            Bit::One => *word |= mask,
            Bit::Zero => *word &= !mask,
        }
    }

    /// Creates a `BitVec` from a slice of bits, least significant first.
    pub fn from_bits(bits: &[Bit]) -> Self {
        let mut v = Self::new(bits.len() as u32);
        for (i, bit) in bits.iter().enumerate() {
            v.set(i as u32, *bit);
        }
        v
    }

    /// Creates a `BitVec` from a `u64` value with the given width.
    ///
    /// Bits beyond the given width are ignored.
    pub fn from_u64(value: u64, width: u32) -> Self {
        let mut v = Self::new(width);
        for i in 0..width.min(64) {
            v.set(i, Bit::from((value >> i) & 1 != 0));
        }
        v
    }

    /// Converts the vector to a `u64`.
    ///
    /// Returns `None` if the width exceeds 64 bits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.width > 64 {
            return None;
        }
        Some(self.data.first().copied().unwrap_or(0))
    }

    /// Splits the vector into `element_width`-bit unsigned integers, lowest element first.
    ///
    /// Returns `None` if `element_width` is zero, exceeds 64, or does not divide the width.
    pub fn to_elements(&self, element_width: u32) -> Option<Vec<u64>> {
        if element_width == 0 || element_width > 64 || self.width % element_width != 0 {
            return None;
        }
        let elements = (0..self.width / element_width)
            .map(|e| {
                (0..element_width).fold(0u64, |acc, i| {
                    acc | (self.get(e * element_width + i).as_u64() << i)
                })
            })
            .collect();
        Some(elements)
    }

    /// Packs `element_width`-bit unsigned integers into a vector, lowest element first.
    ///
    /// Returns `None` if `element_width` is zero or exceeds 64, or if any element
    /// does not fit in `element_width` bits.
    pub fn from_elements(elements: &[u64], element_width: u32) -> Option<Self> {
        if element_width == 0 || element_width > 64 {
            return None;
        }
        let mut v = Self::new(elements.len() as u32 * element_width);
        for (e, value) in elements.iter().enumerate() {
            if element_width < 64 && value >> element_width != 0 {
                return None;
            }
            for i in 0..element_width {
                v.set(e as u32 * element_width + i, Bit::from((value >> i) & 1 != 0));
            }
        }
        Some(v)
    }

    /// Iterates over the bits, least significant first.
    pub fn iter(&self) -> impl Iterator<Item = Bit> + '_ {
        (0..self.width).map(|i| self.get(i))
    }

    /// Parses a binary string like `"1010"` into a `BitVec`.
    ///
    /// The leftmost character is the most significant bit (highest index).
    /// Returns `None` if the string contains characters other than `0`/`1`.
    pub fn from_binary_str(s: &str) -> Option<Self> {
        let mut v = Self::new(s.len() as u32);
        for (i, c) in s.chars().rev().enumerate() {
            v.set(i as u32, Bit::from_char(c)?);
        }
        Some(v)
    }
}

impl FromIterator<Bit> for BitVec {
    fn from_iter<T: IntoIterator<Item = Bit>>(iter: T) -> Self {
        let bits: Vec<Bit> = iter.into_iter().collect();
        Self::from_bits(&bits)
    }
}

impl fmt::Display for BitVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..self.width).rev() {
            write!(f, "{}", self.get(i))?;
        }
        Ok(())
    }
}

impl fmt::Debug for BitVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitVec({self})")
    }
}

/// Returns the number of u64 words needed to store `width` bits.
fn word_count(width: u32) -> usize {
    width.div_ceil(BITS_PER_WORD) as usize
}
