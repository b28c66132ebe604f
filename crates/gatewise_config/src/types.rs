//! Configuration types deserialized from `gatewise.toml`.

use crate::error::ConfigFileError;
use gatewise_netlist::{default_library, CellFunction, CellInfo, CellLibrary};
use serde::Deserialize;
use std::collections::BTreeMap;

/// The top-level project configuration parsed from `gatewise.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    /// What to simulate.
    pub design: DesignSection,
    /// Roles and shapes of top-level ports, keyed by port name.
    #[serde(default)]
    pub ports: BTreeMap<String, PortConfig>,
    /// Custom or overriding cell library entries, keyed by cell type name.
    #[serde(default)]
    pub cells: BTreeMap<String, CellDef>,
}

/// The `[design]` table.
#[derive(Debug, Deserialize)]
pub struct DesignSection {
    /// Name of the top module.
    pub top: String,
    /// Path to the Yosys JSON netlist, relative to the project directory.
    pub netlist: String,
}

/// Role and shape of one top-level port.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PortConfig {
    /// Marks the port as the design clock.
    #[serde(default)]
    pub clock: bool,
    /// Marks the port as the design reset.
    #[serde(default)]
    pub reset: bool,
    /// Number of elements the port value is split into.
    #[serde(default)]
    pub elements: Option<u32>,
    /// Width of one element in bits.
    #[serde(default)]
    pub element_width: Option<u32>,
}

impl PortConfig {
    /// Returns `(elements, element_width)` when both are given.
    pub fn shape(&self) -> Option<(u32, u32)> {
        Some((self.elements?, self.element_width?))
    }
}

/// A cell library entry declared in the project file.
#[derive(Debug, Clone, Deserialize)]
pub struct CellDef {
    /// Function name, e.g. `"nand"` or `"dff"`.
    pub function: String,
    /// Input count. Defaults to the function's fixed pin count, or 2 for
    /// variadic gates.
    #[serde(default)]
    pub inputs: Option<usize>,
    /// Area of one instance.
    pub area: f64,
}

impl CellDef {
    /// Resolves this definition into a library entry.
    pub fn to_cell_info(&self) -> Result<CellInfo, ConfigFileError> {
        let function: CellFunction = self
            .function
            .parse()
            .map_err(|e: gatewise_netlist::ParseCellFunctionError| {
                ConfigFileError::ValidationError(e.to_string())
            })?;
        let inputs = self
            .inputs
            .or_else(|| function.fixed_arity())
            .unwrap_or(2);
        Ok(CellInfo::new(function, inputs, self.area))
    }
}

impl ProjectConfig {
    /// Returns the name of the port marked as clock, if any.
    pub fn clock_port(&self) -> Option<&str> {
        self.ports
            .iter()
            .find(|(_, p)| p.clock)
            .map(|(name, _)| name.as_str())
    }

    /// Returns the name of the port marked as reset, if any.
    pub fn reset_port(&self) -> Option<&str> {
        self.ports
            .iter()
            .find(|(_, p)| p.reset)
            .map(|(name, _)| name.as_str())
    }

    /// Builds the cell library: the defaults extended by every `[cells]` entry.
    pub fn cell_library(&self) -> Result<CellLibrary, ConfigFileError> {
        let mut library = default_library();
        for (name, def) in &self.cells {
            let info = def.to_cell_info()?;
            library
                .insert(name.clone(), info)
                .map_err(|e| ConfigFileError::ValidationError(e.to_string()))?;
        }
        Ok(library)
    }
}
