//! Parsing and validation of `gatewise.toml` project files.
//!
//! A project file names the top module and the netlist to simulate, assigns
//! clock/reset roles and element shapes to top-level ports, and may extend the
//! built-in cell library with custom cell types.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigFileError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
