//! Error types for netlist loading and structural validation.

/// Errors raised while loading a netlist or resolving its hierarchy.
///
/// Every variant is fatal to construction: no partial netlist or design is
/// returned when one of these is produced.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The netlist file could not be read.
    #[error("failed to read netlist: {0}")]
    Io(#[from] std::io::Error),

    /// The netlist text is not valid Yosys JSON.
    #[error("malformed netlist JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A module name was referenced (as top or as an instance) but never defined.
    #[error("unknown module '{0}'")]
    UnknownModule(String),

    /// A cell's type is neither a module in the netlist nor a library cell.
    #[error("cell '{cell}' in module '{module}' has unknown type '{cell_type}'")]
    UnknownCellType {
        /// The module containing the cell.
        module: String,
        /// The cell instance name.
        cell: String,
        /// The unrecognized type name.
        cell_type: String,
    },

    /// A connection refers to a bit number that no port or named net declares.
    #[error("bit {bit} on '{owner}' in module '{module}' is not a declared net")]
    UndeclaredNet {
        /// The module containing the connection.
        module: String,
        /// The cell or port whose connection is undeclared.
        owner: String,
        /// The offending bit number.
        bit: u32,
    },

    /// A primitive cell is missing a required pin connection.
    #[error("cell '{cell}' in module '{module}' is missing pin '{pin}'")]
    MissingPin {
        /// The module containing the cell.
        module: String,
        /// The cell instance name.
        cell: String,
        /// The missing pin name.
        pin: String,
    },

    /// A connection names a pin the cell type or submodule does not have.
    #[error("cell '{cell}' in module '{module}' has no pin '{pin}'")]
    UnknownPin {
        /// The module containing the cell.
        module: String,
        /// The cell instance name.
        cell: String,
        /// The unrecognized pin name.
        pin: String,
    },

    /// A pin or instance binding has a different bit count than its declaration.
    #[error("'{pin}' on cell '{cell}' in module '{module}' is {actual} bits wide, expected {expected}")]
    WidthMismatch {
        /// The module containing the cell.
        module: String,
        /// The cell instance name.
        cell: String,
        /// The pin or port name.
        pin: String,
        /// The declared width.
        expected: usize,
        /// The connected width.
        actual: usize,
    },

    /// A bit string other than `0`, `1`, `x` or `z`.
    #[error("invalid bit value '{0}'")]
    InvalidBit(String),

    /// A port uses a direction the simulator cannot model.
    #[error("port '{port}' in module '{module}' has unsupported direction '{direction}'")]
    UnsupportedPortDirection {
        /// The module declaring the port.
        module: String,
        /// The port name.
        port: String,
        /// The direction as written in the netlist.
        direction: String,
    },

    /// A cell output or input port bit is tied directly to a constant.
    #[error("'{owner}' in module '{module}' drives a constant bit")]
    ConstantOutput {
        /// The module containing the connection.
        module: String,
        /// The cell or port tied to the constant.
        owner: String,
    },

    /// Module instantiation forms a cycle.
    #[error("hierarchy cycle: {0}")]
    HierarchyCycle(String),

    /// A net has more than one driver after flattening.
    #[error("net '{0}' has multiple drivers")]
    MultipleDrivers(String),

    /// A net is bound to both constant 0 and constant 1.
    #[error("net '{0}' is tied to both 0 and 1")]
    ShortedConstants(String),
}

/// Errors raised when adding a cell definition to a [`CellLibrary`](crate::library::CellLibrary).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LibraryError {
    /// The input count does not fit the function's pin set.
    #[error("cell '{cell}' declares {inputs} inputs, which '{function}' does not support")]
    InvalidArity {
        /// The cell type name.
        cell: String,
        /// The function name.
        function: String,
        /// The declared input count.
        inputs: usize,
    },

    /// The area is negative or not a finite number.
    #[error("cell '{cell}' has invalid area {area}")]
    InvalidArea {
        /// The cell type name.
        cell: String,
        /// The rejected area.
        area: f64,
    },

    /// A cell type has no library entry.
    #[error("no library entry for cell type '{0}'")]
    UnknownCell(String),
}
