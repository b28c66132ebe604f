//! Module definitions: the unit of reuse in a hierarchical netlist.
//!
//! A [`Module`] owns its ports, named nets and cells. Instances of a module in
//! a parent share this one definition; per-instance state lives in the
//! simulator, never here.

use crate::arena::Arena;
use crate::cell::Cell;
use crate::ids::{CellId, ModuleId, NetId};
use crate::net::{BitRef, Net};
use crate::port::Port;
use gatewise_common::{Ident, Interner};
use std::collections::HashMap;

/// A single module definition.
#[derive(Debug, Clone)]
pub struct Module {
    /// The unique ID of this module in the netlist.
    pub id: ModuleId,
    /// The module name.
    pub name: Ident,
    /// The module's external port interface, in declaration order.
    pub ports: Vec<Port>,
    /// Named wires declared within this module.
    pub nets: Arena<NetId, Net>,
    /// Primitive cells and module instantiations.
    pub cells: Arena<CellId, Cell>,
}

impl Module {
    /// Creates an empty module.
    pub fn new(id: ModuleId, name: Ident) -> Self {
        Self {
            id,
            name,
            ports: Vec::new(),
            nets: Arena::new(),
            cells: Arena::new(),
        }
    }

    /// Looks up a port by name.
    pub fn port(&self, name: Ident) -> Option<&Port> {
        self.ports.iter().find(|p| p.name == name)
    }

    /// Returns every local bit number declared by a port or named net.
    pub fn declared_bits(&self) -> impl Iterator<Item = u32> + '_ {
        self.ports
            .iter()
            .flat_map(|p| p.bits.iter())
            .chain(self.nets.values().flat_map(|n| n.bits.iter()))
            .filter_map(|b| b.net())
    }

    /// Returns a readable label for every declared local bit.
    ///
    /// Port names win over net names, and user-written net names over names
    /// generated by synthesis. Buses are labelled `name[i]`.
    pub fn bit_labels(&self, interner: &Interner) -> HashMap<u32, String> {
        let mut labels = HashMap::new();
        let mut label = |bits: &[BitRef], name: &str, overwrite: bool| {
            for (i, bit) in bits.iter().enumerate() {
                let Some(bit) = bit.net() else { continue };
                if overwrite || !labels.contains_key(&bit) {
                    let text = if bits.len() > 1 {
                        format!("{name}[{i}]")
                    } else {
                        name.to_string()
                    };
                    labels.insert(bit, text);
                }
            }
        };
        for net in self.nets.values().filter(|n| n.hidden) {
            label(&net.bits, interner.resolve(net.name), false);
        }
        for net in self.nets.values().filter(|n| !n.hidden) {
            label(&net.bits, interner.resolve(net.name), true);
        }
        for port in &self.ports {
            label(&port.bits, interner.resolve(port.name), true);
        }
        labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{CellFunction, CellKind};
    use crate::ids::PortId;
    use crate::port::PortDirection;

    fn half_adder(interner: &Interner) -> Module {
        let mut m = Module::new(ModuleId::from_raw(0), interner.get_or_intern("half_adder"));
        m.ports.push(Port {
            id: PortId::from_raw(0),
            name: interner.get_or_intern("a"),
            direction: PortDirection::Input,
            bits: vec![BitRef::Net(2)],
            signed: false,
        });
        m.ports.push(Port {
            id: PortId::from_raw(1),
            name: interner.get_or_intern("b"),
            direction: PortDirection::Input,
            bits: vec![BitRef::Net(3)],
            signed: false,
        });
        m.nets.alloc(Net {
            id: NetId::from_raw(0),
            name: interner.get_or_intern("a"),
            bits: vec![BitRef::Net(2)],
            hidden: false,
        });
        m.nets.alloc(Net {
            id: NetId::from_raw(1),
            name: interner.get_or_intern("$auto$carry"),
            bits: vec![BitRef::Net(4)],
            hidden: true,
        });
        let and_type = interner.get_or_intern("$_AND_");
        m.cells.alloc(Cell {
            id: CellId::from_raw(0),
            name: interner.get_or_intern("u0"),
            kind: CellKind::Primitive {
                cell_type: and_type,
                function: CellFunction::And,
                inputs: vec![BitRef::Net(2), BitRef::Net(3)],
                output: BitRef::Net(4),
            },
        });
        m
    }

    #[test]
    fn port_lookup_by_name() {
        let interner = Interner::new();
        let m = half_adder(&interner);
        let b = interner.get_or_intern("b");
        assert_eq!(m.port(b).map(|p| p.width()), Some(1));
        assert!(m.port(interner.get_or_intern("c")).is_none());
    }

    #[test]
    fn declared_bits_cover_ports_and_nets() {
        let interner = Interner::new();
        let m = half_adder(&interner);
        let mut bits: Vec<u32> = m.declared_bits().collect();
        bits.sort_unstable();
        bits.dedup();
        assert_eq!(bits, vec![2, 3, 4]);
    }

    #[test]
    fn labels_prefer_ports_then_user_names() {
        let interner = Interner::new();
        let m = half_adder(&interner);
        let labels = m.bit_labels(&interner);
        assert_eq!(labels[&2], "a");
        assert_eq!(labels[&3], "b");
        assert_eq!(labels[&4], "$auto$carry");
    }
}
