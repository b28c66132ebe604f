//! Opaque ID newtypes for netlist entities.
//!
//! Each ID is a thin `u32` wrapper handed out by [`Arena::alloc`](crate::arena::Arena::alloc).
//! IDs are local to their container: a [`CellId`] or [`NetId`] is only meaningful
//! together with the [`Module`](crate::module::Module) that owns it.

use crate::arena::ArenaId;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl ArenaId for $name {
            fn from_raw(index: u32) -> Self {
                Self(index)
            }

            fn as_raw(self) -> u32 {
                self.0
            }
        }
    };
}

define_id!(
    /// Opaque, copyable ID for a module definition in a [`Netlist`](crate::netlist::Netlist).
    ModuleId
);

define_id!(
    /// Opaque, copyable ID for a cell (primitive or instance) within a module.
    CellId
);

define_id!(
    /// Opaque, copyable ID for a named net (a `netnames` entry) within a module.
    NetId
);

define_id!(
    /// Opaque, copyable ID for a port on a module.
    PortId
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn id_roundtrip() {
        let id = ModuleId::from_raw(42);
        assert_eq!(id.as_raw(), 42);
    }

    #[test]
    fn id_ordering_follows_index() {
        assert!(CellId::from_raw(1) < CellId::from_raw(2));
    }

    #[test]
    fn id_hash_in_set() {
        let mut set = HashSet::new();
        set.insert(NetId::from_raw(1));
        set.insert(NetId::from_raw(2));
        set.insert(NetId::from_raw(1));
        assert_eq!(set.len(), 2);
    }
}
