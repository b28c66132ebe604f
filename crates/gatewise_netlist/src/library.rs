//! The cell library: function, arity and area of every primitive cell type.
//!
//! The loader consults a [`CellLibrary`] to classify netlist cells, and the
//! metrics layer uses it as the area table. [`default_library`] covers the
//! internal gate cells emitted by Yosys plus a set of short generic names;
//! callers may add or override entries before loading.

use crate::cell::{CellFunction, MAX_GATE_INPUTS};
use crate::error::LibraryError;
use std::collections::HashMap;

/// Library entry for one primitive cell type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellInfo {
    /// The logic function.
    pub function: CellFunction,
    /// Number of input pins.
    pub inputs: usize,
    /// Area cost of one instance.
    pub area: f64,
}

impl CellInfo {
    /// Creates an entry.
    pub fn new(function: CellFunction, inputs: usize, area: f64) -> Self {
        Self {
            function,
            inputs,
            area,
        }
    }

    /// Returns the input pin names in canonical order.
    pub fn input_pins(&self) -> Vec<&'static str> {
        self.function.input_pins(self.inputs)
    }
}

/// A mapping from cell type name to [`CellInfo`].
#[derive(Debug, Clone, Default)]
pub struct CellLibrary {
    cells: HashMap<String, CellInfo>,
}

impl CellLibrary {
    /// Creates an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the entry for `name`.
    ///
    /// Fixed-pin functions must declare exactly their pin count; variadic gates
    /// accept 1 to [`MAX_GATE_INPUTS`] inputs. Areas must be finite and
    /// non-negative.
    pub fn insert(&mut self, name: impl Into<String>, info: CellInfo) -> Result<(), LibraryError> {
        let name = name.into();
        let arity_ok = match info.function.fixed_arity() {
            Some(n) => info.inputs == n,
            None => (1..=MAX_GATE_INPUTS).contains(&info.inputs),
        };
        if !arity_ok {
            return Err(LibraryError::InvalidArity {
                cell: name,
                function: info.function.to_string(),
                inputs: info.inputs,
            });
        }
        if !info.area.is_finite() || info.area < 0.0 {
            return Err(LibraryError::InvalidArea {
                cell: name,
                area: info.area,
            });
        }
        self.cells.insert(name, info);
        Ok(())
    }

    /// Looks up a cell type.
    pub fn get(&self, name: &str) -> Option<&CellInfo> {
        self.cells.get(name)
    }

    /// Returns the area of one instance of a cell type.
    pub fn area(&self, name: &str) -> Result<f64, LibraryError> {
        self.get(name)
            .map(|info| info.area)
            .ok_or_else(|| LibraryError::UnknownCell(name.to_string()))
    }

    /// Sums `count * area` over a cell-type breakdown.
    pub fn breakdown_area<'a, I>(&self, breakdown: I) -> Result<f64, LibraryError>
    where
        I: IntoIterator<Item = (&'a str, usize)>,
    {
        breakdown
            .into_iter()
            .try_fold(0.0, |total, (name, count)| -> Result<f64, LibraryError> {
                Ok(total + count as f64 * self.area(name)?)
            })
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if the library has no entries.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// `(name, function, inputs, area)` for every default entry.
const DEFAULT_CELLS: &[(&str, CellFunction, usize, f64)] = {
    use gatewise_common::Bit::{One, Zero};
    use crate::cell::CellFunction::*;
    &[
        ("BUF", Buf, 1, 4.0),
        ("NOT", Not, 1, 2.0),
        ("AND", And, 2, 6.0),
        ("OR", Or, 2, 6.0),
        ("XOR", Xor, 2, 8.0),
        ("NAND", Nand, 2, 4.0),
        ("NOR", Nor, 2, 4.0),
        ("XNOR", Xnor, 2, 8.0),
        ("MUX", Mux, 3, 8.0),
        ("DFF", Dff, 2, 8.0),
        ("$_BUF_", Buf, 1, 4.0),
        ("$_NOT_", Not, 1, 2.0),
        ("$_AND_", And, 2, 6.0),
        ("$_OR_", Or, 2, 6.0),
        ("$_XOR_", Xor, 2, 8.0),
        ("$_NAND_", Nand, 2, 4.0),
        ("$_NOR_", Nor, 2, 4.0),
        ("$_XNOR_", Xnor, 2, 8.0),
        ("$_ANDNOT_", AndNot, 2, 6.0),
        ("$_ORNOT_", OrNot, 2, 6.0),
        ("$_MUX_", Mux, 3, 8.0),
        ("$_DFF_P_", Dff, 2, 8.0),
        ("$_DFF_N_", DffNeg, 2, 8.0),
        ("$_DFFE_PP_", DffEnable, 3, 10.0),
        ("$_DFF_PP0_", DffReset { value: Zero }, 3, 10.0),
        ("$_DFF_PP1_", DffReset { value: One }, 3, 10.0),
        ("$_SDFF_PP0_", DffReset { value: Zero }, 3, 10.0),
        ("$_SDFF_PP1_", DffReset { value: One }, 3, 10.0),
        ("$_SDFFE_PP0P_", DffResetEnable { value: Zero }, 4, 12.0),
        ("$_SDFFE_PP1P_", DffResetEnable { value: One }, 4, 12.0),
    ]
};

/// Returns the built-in library.
pub fn default_library() -> CellLibrary {
    let cells = DEFAULT_CELLS
        .iter()
        .map(|&(name, function, inputs, area)| {
            (name.to_string(), CellInfo::new(function, inputs, area))
        })
        .collect();
    CellLibrary { cells }
}
