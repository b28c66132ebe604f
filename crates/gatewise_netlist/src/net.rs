//! Bit references and named nets.
//!
//! Connectivity inside a module is expressed at the bit level. Every pin and
//! port bit is a [`BitRef`]: either a module-local net bit number or a constant.
//! Named wires (the `netnames` section of a netlist) group bits under a name
//! and are what makes a bit number "declared".

use crate::ids::NetId;
use gatewise_common::{Bit, Ident};
use std::fmt;

/// A single bit as seen from inside one module.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BitRef {
    /// A module-local net bit, identified by its bit number.
    Net(u32),
    /// A constant tie-off.
    Const(Bit),
}

impl BitRef {
    /// Returns the local bit number if this refers to a net.
    pub fn net(self) -> Option<u32> {
        match self {
            BitRef::Net(bit) => Some(bit),
            BitRef::Const(_) => None,
        }
    }
}

impl fmt::Display for BitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitRef::Net(bit) => write!(f, "#{bit}"),
            BitRef::Const(value) => write!(f, "'{value}'"),
        }
    }
}

/// A named wire declared in a module.
#[derive(Debug, Clone)]
pub struct Net {
    /// The unique ID of this net within its module.
    pub id: NetId,
    /// The wire name.
    pub name: Ident,
    /// The bits of the wire, least significant first.
    pub bits: Vec<BitRef>,
    /// Whether the name was generated by synthesis rather than written by a user.
    pub hidden: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitref_net_accessor() {
        assert_eq!(BitRef::Net(5).net(), Some(5));
        assert_eq!(BitRef::Const(Bit::One).net(), None);
    }

    #[test]
    fn bitref_display() {
        assert_eq!(BitRef::Net(7).to_string(), "#7");
        assert_eq!(BitRef::Const(Bit::Zero).to_string(), "'0'");
    }
}
