//! Error types for design construction, configuration, evaluation and queries.
//!
//! Each concern has its own enum so callers can match on the exact failure;
//! [`DesignError`] wraps them for operations that can fail in several ways.

use gatewise_config::ConfigFileError;
use gatewise_netlist::{LibraryError, LoadError};

/// Invalid port configuration or port access.
///
/// Raised synchronously by the violating call; design state is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// No top-level port has this name.
    #[error("unknown port '{0}'")]
    UnknownPort(String),

    /// The port is already assigned the other clock/reset role.
    #[error("port '{0}' cannot be both clock and reset")]
    ClockAndReset(String),

    /// Clock and reset must be single-bit input ports.
    #[error("port '{0}' is not a single-bit input")]
    NotSingleBitInput(String),

    /// Only input ports can be written.
    #[error("port '{0}' is not an input")]
    NotAnInput(String),

    /// A bit buffer does not match the port width.
    #[error("port '{port}' is {expected} bits wide, got {actual}")]
    WidthMismatch {
        /// The port name.
        port: String,
        /// The port width.
        expected: usize,
        /// The buffer length.
        actual: usize,
    },

    /// An element shape whose total width differs from the port width.
    #[error("port '{port}' is {width} bits wide and cannot hold {elements} x {element_width} bits")]
    ShapeMismatch {
        /// The port name.
        port: String,
        /// The port width.
        width: usize,
        /// Requested element count.
        elements: u32,
        /// Requested element width.
        element_width: u32,
    },

    /// An element slice whose length differs from the configured element count.
    #[error("port '{port}' holds {expected} elements, got {actual}")]
    ElementCountMismatch {
        /// The port name.
        port: String,
        /// The configured element count.
        expected: usize,
        /// The supplied element count.
        actual: usize,
    },

    /// A value does not fit the port or element width.
    #[error("value does not fit in {width} bits of port '{port}'")]
    ValueOutOfRange {
        /// The port name.
        port: String,
        /// The available width.
        width: u32,
    },

    /// The port is too wide for a 64-bit integer or element.
    #[error("port '{port}' is {width} bits wide, wider than 64")]
    PortTooWide {
        /// The port name.
        port: String,
        /// The width that does not fit.
        width: usize,
    },

    /// A clocked step was requested without a clock port.
    #[error("no clock port configured")]
    MissingClock,

    /// A clocked reset was requested without both clock and reset ports.
    #[error("clock and reset ports must both be configured")]
    MissingClockOrReset,
}

/// The evaluation graph is not a DAG.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructuralError {
    /// A combinational path feeds back on itself without passing a register.
    #[error("combinational loop through net '{net}'")]
    CombinationalLoop {
        /// A net on the loop.
        net: String,
    },
}

/// Failures of metrics and net queries. Queries never modify the design.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// No module with this name is part of the resolved design.
    #[error("unknown module '{0}'")]
    UnknownModule(String),

    /// A cell type in scope has no entry in the area table.
    #[error("no area entry for cell type '{cell_type}' in module '{module}'")]
    MissingAreaEntry {
        /// The queried module.
        module: String,
        /// The cell type without an area.
        cell_type: String,
    },

    /// No net has this hierarchical name.
    #[error("unknown net '{0}'")]
    UnknownNet(String),
}

/// Any error a [`Design`](crate::Design) operation can raise.
#[derive(Debug, thiserror::Error)]
pub enum DesignError {
    /// The netlist could not be loaded or resolved.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The design contains a combinational loop.
    #[error(transparent)]
    Structural(#[from] StructuralError),

    /// Port configuration failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A metrics query failed.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// The project file is invalid.
    #[error(transparent)]
    ConfigFile(#[from] ConfigFileError),

    /// A cell library entry is invalid.
    #[error(transparent)]
    Library(#[from] LibraryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_width_mismatch() {
        let err = ConfigError::WidthMismatch {
            port: "a".to_string(),
            expected: 4,
            actual: 3,
        };
        assert_eq!(format!("{err}"), "port 'a' is 4 bits wide, got 3");
    }

    #[test]
    fn display_shape_mismatch() {
        let err = ConfigError::ShapeMismatch {
            port: "data".to_string(),
            width: 32,
            elements: 3,
            element_width: 8,
        };
        assert_eq!(
            format!("{err}"),
            "port 'data' is 32 bits wide and cannot hold 3 x 8 bits"
        );
    }

    #[test]
    fn display_missing_clock_or_reset() {
        assert_eq!(
            format!("{}", ConfigError::MissingClockOrReset),
            "clock and reset ports must both be configured"
        );
    }

    #[test]
    fn display_combinational_loop() {
        let err = StructuralError::CombinationalLoop {
            net: "top.n1".to_string(),
        };
        assert_eq!(format!("{err}"), "combinational loop through net 'top.n1'");
    }

    #[test]
    fn display_missing_area_entry() {
        let err = QueryError::MissingAreaEntry {
            module: "top".to_string(),
            cell_type: "AOI21".to_string(),
        };
        assert_eq!(
            format!("{err}"),
            "no area entry for cell type 'AOI21' in module 'top'"
        );
    }

    #[test]
    fn design_error_is_transparent() {
        let err: DesignError = ConfigError::UnknownPort("q".to_string()).into();
        assert_eq!(format!("{err}"), "unknown port 'q'");
        assert!(matches!(err, DesignError::Config(ConfigError::UnknownPort(_))));
    }

    #[test]
    fn load_error_converts() {
        let err: DesignError = LoadError::UnknownModule("top".to_string()).into();
        assert!(matches!(err, DesignError::Load(_)));
    }
}
