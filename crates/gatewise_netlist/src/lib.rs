//! Structural model of a synthesized gate-level netlist.
//!
//! A [`Netlist`] holds one or more [`Module`] definitions. Each module owns its
//! ports, named nets and cells; cells are either library primitives with a
//! fixed boolean function or instances of another module. Netlists are loaded
//! from Yosys JSON (see [`yosys`]) against a [`CellLibrary`] that gives every
//! primitive cell type its function, arity and area.

#![warn(missing_docs)]

pub mod arena;
pub mod cell;
pub mod error;
pub mod ids;
pub mod library;
pub mod module;
pub mod net;
pub mod netlist;
pub mod port;
pub mod yosys;

pub use arena::{Arena, ArenaId};
pub use cell::{Cell, CellFunction, CellKind, ParseCellFunctionError};
pub use error::{LibraryError, LoadError};
pub use ids::{CellId, ModuleId, NetId, PortId};
pub use library::{default_library, CellInfo, CellLibrary};
pub use module::Module;
pub use net::{BitRef, Net};
pub use netlist::Netlist;
pub use port::{Port, PortDirection};
