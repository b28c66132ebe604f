//! Port definitions for module interfaces.
//!
//! A [`Port`] is one named, directed bit range in a module's external
//! interface. Its bits are the module-local nets that instance bindings in a
//! parent are joined to.

use crate::ids::PortId;
use crate::net::BitRef;
use gatewise_common::Ident;

/// The direction of a port on a module boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortDirection {
    /// An input port (data flows into the module).
    Input,
    /// An output port (data flows out of the module).
    Output,
}

impl PortDirection {
    /// Parses a Yosys direction string. `inout` is not a modelled direction.
    pub fn from_yosys(direction: &str) -> Option<Self> {
        match direction {
            "input" => Some(PortDirection::Input),
            "output" => Some(PortDirection::Output),
            _ => None,
        }
    }
}

/// A port in a module's external interface.
#[derive(Debug, Clone)]
pub struct Port {
    /// The unique ID of this port.
    pub id: PortId,
    /// The port name.
    pub name: Ident,
    /// The direction of data flow.
    pub direction: PortDirection,
    /// The bits of the port, least significant first.
    pub bits: Vec<BitRef>,
    /// Whether the port carries a signed value.
    pub signed: bool,
}

impl Port {
    /// Returns the port width in bits.
    pub fn width(&self) -> usize {
        self.bits.len()
    }

    /// Returns `true` for input ports.
    pub fn is_input(&self) -> bool {
        self.direction == PortDirection::Input
    }
}
