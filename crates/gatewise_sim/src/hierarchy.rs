//! Hierarchy resolution: flattening an instance tree into one net space.
//!
//! Every instance of a module gets a contiguous block of *slots*, one per
//! declared local bit of that module. Instance port bindings join a child's
//! port slots with the parent's bound slots, and constant bindings tie a
//! slot's class to 0 or 1. Each remaining untied class becomes one
//! [`FlatNetId`], named after its outermost occurrence.
//!
//! Module definitions are never copied. An [`Instance`] record refers to its
//! [`ModuleId`] and carries only instance-local data: its hierarchical path,
//! its children and the flat nets it owns for toggle accounting.

use gatewise_common::{Bit, Ident, Interner};
use gatewise_netlist::{
    Arena, ArenaId, BitRef, CellFunction, CellKind, LoadError, Module, ModuleId, Netlist,
    PortDirection,
};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Opaque ID for a net in the flattened design.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct FlatNetId(u32);

impl FlatNetId {
    /// Creates a `FlatNetId` from a raw index.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    pub fn as_raw(self) -> u32 {
        self.0
    }

    /// Returns the index as `usize` for slice access.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl ArenaId for FlatNetId {
    fn from_raw(index: u32) -> Self {
        Self(index)
    }

    fn as_raw(self) -> u32 {
        self.0
    }
}

/// Opaque ID for an instance in the resolved hierarchy. The top is always index 0.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct InstanceId(u32);

impl InstanceId {
    /// The top-level instance.
    pub const TOP: InstanceId = InstanceId(0);

    /// Creates an `InstanceId` from a raw index.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

impl ArenaId for InstanceId {
    fn from_raw(index: u32) -> Self {
        Self(index)
    }

    fn as_raw(self) -> u32 {
        self.0
    }
}

/// A cell pin after flattening: a flat net or a constant.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Operand {
    /// A flattened net.
    Net(FlatNetId),
    /// A constant tie-off.
    Const(Bit),
}

/// A flattened net.
#[derive(Debug, Clone)]
pub struct FlatNet {
    /// Dotted hierarchical name of the outermost occurrence, e.g. `top.u0.sum`.
    pub name: String,
}

/// A primitive cell placed in the flat design.
#[derive(Debug, Clone)]
pub struct FlatCell {
    /// The instance containing the cell.
    pub instance: InstanceId,
    /// The cell instance name within its module.
    pub name: Ident,
    /// The library cell type.
    pub cell_type: Ident,
    /// The logic function.
    pub function: CellFunction,
    /// Input operands in canonical pin order.
    pub inputs: Vec<Operand>,
    /// The driven net.
    pub output: FlatNetId,
}

/// One occurrence of a module in the hierarchy.
#[derive(Debug, Clone)]
pub struct Instance {
    /// The instantiated module definition.
    pub module: ModuleId,
    /// Dotted path from the top, e.g. `top.ha0`.
    pub path: String,
    /// The parent instance, `None` for the top.
    pub parent: Option<InstanceId>,
    /// Child instances in cell order.
    pub children: Vec<InstanceId>,
    /// Flat nets this instance owns for toggle accounting: its internal and
    /// output nets. Nets bound to its input ports belong to the parent, except
    /// on the top instance.
    pub nets: Vec<FlatNetId>,
}

/// A top-level port with its bits resolved to operands.
#[derive(Debug, Clone)]
pub struct TopPort {
    /// The port name.
    pub name: String,
    /// The port direction.
    pub direction: PortDirection,
    /// The resolved bits, least significant first.
    pub bits: Vec<Operand>,
}

/// The result of flattening a hierarchy.
#[derive(Debug, Clone)]
pub struct FlatDesign {
    /// The top module definition.
    pub top: ModuleId,
    /// All flat nets.
    pub nets: Arena<FlatNetId, FlatNet>,
    /// All primitive cells.
    pub cells: Vec<FlatCell>,
    /// All instances in depth-first pre-order, top first.
    pub instances: Arena<InstanceId, Instance>,
    /// The top module's ports.
    pub ports: Vec<TopPort>,
    net_paths: HashMap<String, FlatNetId>,
}

impl FlatDesign {
    /// Returns the number of flat nets.
    pub fn net_count(&self) -> usize {
        self.nets.len()
    }

    /// Looks up a net by any of its hierarchical names.
    pub fn net_by_path(&self, path: &str) -> Option<FlatNetId> {
        self.net_paths.get(path).copied()
    }

    /// Returns the canonical name of a flat net.
    pub fn net_name(&self, id: FlatNetId) -> &str {
        &self.nets[id].name
    }
}

/// Per-module slot layout: local bit number to offset within an instance block.
struct ModuleLayout {
    bits: Vec<u32>,
    offsets: HashMap<u32, u32>,
    labels: HashMap<u32, String>,
}

impl ModuleLayout {
    fn new(module: &Module, interner: &Interner) -> Self {
        let mut bits: Vec<u32> = module.declared_bits().collect();
        bits.sort_unstable();
        bits.dedup();
        let offsets = bits
            .iter()
            .enumerate()
            .map(|(offset, &bit)| (bit, offset as u32))
            .collect();
        Self {
            bits,
            offsets,
            labels: module.bit_labels(interner),
        }
    }

    fn len(&self) -> u32 {
        self.bits.len() as u32
    }

    fn label(&self, bit: u32) -> String {
        self.labels
            .get(&bit)
            .cloned()
            .unwrap_or_else(|| format!("#{bit}"))
    }
}

/// An instance discovered while walking the hierarchy.
struct Frame<'n> {
    module: ModuleId,
    path: String,
    parent: Option<usize>,
    base: u32,
    bindings: &'n [(Ident, Vec<BitRef>)],
}

/// Union-find over slots, with an optional constant per class.
struct BitClasses {
    parent: Vec<u32>,
    tied: Vec<Option<Bit>>,
}

impl BitClasses {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len as u32).collect(),
            tied: vec![None; len],
        }
    }

    fn find(&mut self, mut slot: u32) -> u32 {
        while self.parent[slot as usize] != slot {
            let grandparent = self.parent[self.parent[slot as usize] as usize];
            self.parent[slot as usize] = grandparent;
            slot = grandparent;
        }
        slot
    }

    /// Joins two classes; the lower slot stays the root. Returns `false` if
    /// the classes are tied to different constants.
    fn union(&mut self, a: u32, b: u32) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return true;
        }
        let (keep, merged) = (ra.min(rb), ra.max(rb));
        self.parent[merged as usize] = keep;
        match (self.tied[keep as usize], self.tied[merged as usize]) {
            (Some(x), Some(y)) => x == y,
            (None, Some(y)) => {
                self.tied[keep as usize] = Some(y);
                true
            }
            _ => true,
        }
    }

    /// Ties a class to a constant. Returns `false` on a conflicting tie.
    fn tie(&mut self, slot: u32, value: Bit) -> bool {
        let root = self.find(slot) as usize;
        match self.tied[root] {
            Some(existing) => existing == value,
            None => {
                self.tied[root] = Some(value);
                true
            }
        }
    }
}

/// Flattens the instance tree below a top module.
pub struct HierarchyResolver<'n> {
    netlist: &'n Netlist,
    layouts: Vec<ModuleLayout>,
}

impl<'n> HierarchyResolver<'n> {
    /// Prepares slot layouts for every module in the netlist.
    pub fn new(netlist: &'n Netlist) -> Self {
        let layouts = netlist
            .modules
            .values()
            .map(|m| ModuleLayout::new(m, &netlist.interner))
            .collect();
        Self { netlist, layouts }
    }

    fn layout(&self, module: ModuleId) -> &ModuleLayout {
        &self.layouts[module.as_raw() as usize]
    }

    /// Resolves the hierarchy rooted at `top`.
    ///
    /// Fails on instantiation cycles, nets with more than one driver, classes
    /// tied to both constants, and constant-driven cell outputs.
    pub fn resolve(&self, top: ModuleId) -> Result<FlatDesign, LoadError> {
        let mut frames = Vec::new();
        let mut next_slot = 0u32;
        let top_path = self.netlist.module_name(top).to_string();
        self.enumerate(
            top,
            top_path,
            None,
            &[],
            &mut Vec::new(),
            &mut frames,
            &mut next_slot,
        )?;

        let mut classes = BitClasses::new(next_slot as usize);
        for frame in &frames {
            if let Some(parent) = frame.parent {
                self.bind_ports(&frames[parent], frame, &mut classes)?;
            }
        }

        let mut nets: Arena<FlatNetId, FlatNet> = Arena::new();
        let mut class_nets: HashMap<u32, FlatNetId> = HashMap::new();
        let mut operands = Vec::with_capacity(next_slot as usize);
        for frame in &frames {
            let layout = self.layout(frame.module);
            for (offset, &bit) in layout.bits.iter().enumerate() {
                let root = classes.find(frame.base + offset as u32);
                let operand = match classes.tied[root as usize] {
                    Some(value) => Operand::Const(value),
                    None => Operand::Net(*class_nets.entry(root).or_insert_with(|| {
                        nets.alloc(FlatNet {
                            name: format!("{}.{}", frame.path, layout.label(bit)),
                        })
                    })),
                };
                operands.push(operand);
            }
        }

        let mut driven = vec![false; nets.len()];
        let ports = self.top_ports(&frames[0], &operands, &mut driven)?;
        let cells = self.place_cells(&frames, &operands, &nets, &mut driven)?;
        let instances = self.instances(&frames, &operands);
        let net_paths = self.net_paths(&frames, &operands);

        debug!(
            "Resolved '{}': {} instances, {} cells, {} nets",
            self.netlist.module_name(top),
            instances.len(),
            cells.len(),
            nets.len()
        );

        Ok(FlatDesign {
            top,
            nets,
            cells,
            instances,
            ports,
            net_paths,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn enumerate(
        &self,
        module: ModuleId,
        path: String,
        parent: Option<usize>,
        bindings: &'n [(Ident, Vec<BitRef>)],
        stack: &mut Vec<ModuleId>,
        frames: &mut Vec<Frame<'n>>,
        next_slot: &mut u32,
    ) -> Result<(), LoadError> {
        if let Some(start) = stack.iter().position(|&m| m == module) {
            let mut names: Vec<&str> = stack[start..]
                .iter()
                .map(|&m| self.netlist.module_name(m))
                .collect();
            names.push(self.netlist.module_name(module));
            return Err(LoadError::HierarchyCycle(names.join(" -> ")));
        }

        let index = frames.len();
        frames.push(Frame {
            module,
            path: path.clone(),
            parent,
            base: *next_slot,
            bindings,
        });
        *next_slot += self.layout(module).len();

        stack.push(module);
        let netlist: &'n Netlist = self.netlist;
        for cell in netlist.module(module).cells.values() {
            if let CellKind::Instance {
                module: child,
                bindings,
            } = &cell.kind
            {
                let child_path = format!("{path}.{}", netlist.resolve(cell.name));
                self.enumerate(
                    *child,
                    child_path,
                    Some(index),
                    bindings,
                    stack,
                    frames,
                    next_slot,
                )?;
            }
        }
        stack.pop();
        Ok(())
    }

    fn slot(&self, frame: &Frame<'_>, owner: &str, bit: u32) -> Result<u32, LoadError> {
        self.layout(frame.module)
            .offsets
            .get(&bit)
            .map(|offset| frame.base + offset)
            .ok_or_else(|| LoadError::UndeclaredNet {
                module: self.netlist.module_name(frame.module).to_string(),
                owner: owner.to_string(),
                bit,
            })
    }

    fn operand(
        &self,
        operands: &[Operand],
        frame: &Frame<'_>,
        owner: &str,
        bit: BitRef,
    ) -> Result<Operand, LoadError> {
        match bit {
            BitRef::Const(value) => Ok(Operand::Const(value)),
            BitRef::Net(local) => Ok(operands[self.slot(frame, owner, local)? as usize]),
        }
    }

    fn bind_ports(
        &self,
        parent: &Frame<'_>,
        frame: &Frame<'_>,
        classes: &mut BitClasses,
    ) -> Result<(), LoadError> {
        let child = self.netlist.module(frame.module);
        for (port_name, outer_bits) in frame.bindings {
            let pin = self.netlist.resolve(*port_name);
            let port = child.port(*port_name).ok_or_else(|| LoadError::UnknownPin {
                module: self.netlist.module_name(parent.module).to_string(),
                cell: frame.path.clone(),
                pin: pin.to_string(),
            })?;
            if port.bits.len() != outer_bits.len() {
                return Err(LoadError::WidthMismatch {
                    module: self.netlist.module_name(parent.module).to_string(),
                    cell: frame.path.clone(),
                    pin: pin.to_string(),
                    expected: port.bits.len(),
                    actual: outer_bits.len(),
                });
            }
            for (&inner, &outer) in port.bits.iter().zip(outer_bits) {
                let consistent = match (inner, outer) {
                    (BitRef::Net(c), BitRef::Net(p)) => {
                        let a = self.slot(frame, pin, c)?;
                        let b = self.slot(parent, &frame.path, p)?;
                        classes.union(a, b)
                    }
                    (BitRef::Net(c), BitRef::Const(value)) => {
                        classes.tie(self.slot(frame, pin, c)?, value)
                    }
                    (BitRef::Const(value), BitRef::Net(p)) => {
                        classes.tie(self.slot(parent, &frame.path, p)?, value)
                    }
                    (BitRef::Const(a), BitRef::Const(b)) => a == b,
                };
                if !consistent {
                    return Err(LoadError::ShortedConstants(format!("{}.{pin}", frame.path)));
                }
            }
        }
        Ok(())
    }

    fn top_ports(
        &self,
        top: &Frame<'_>,
        operands: &[Operand],
        driven: &mut [bool],
    ) -> Result<Vec<TopPort>, LoadError> {
        let module = self.netlist.module(top.module);
        let mut ports = Vec::with_capacity(module.ports.len());
        for port in &module.ports {
            let name = self.netlist.resolve(port.name);
            let bits = port
                .bits
                .iter()
                .map(|&bit| self.operand(operands, top, name, bit))
                .collect::<Result<Vec<_>, _>>()?;
            if port.direction == PortDirection::Input {
                for bit in &bits {
                    match bit {
                        Operand::Net(id) => driven[id.index()] = true,
                        Operand::Const(_) => {
                            return Err(LoadError::ConstantOutput {
                                module: self.netlist.module_name(top.module).to_string(),
                                owner: name.to_string(),
                            })
                        }
                    }
                }
            }
            ports.push(TopPort {
                name: name.to_string(),
                direction: port.direction,
                bits,
            });
        }
        Ok(ports)
    }

    fn place_cells(
        &self,
        frames: &[Frame<'_>],
        operands: &[Operand],
        nets: &Arena<FlatNetId, FlatNet>,
        driven: &mut [bool],
    ) -> Result<Vec<FlatCell>, LoadError> {
        let mut cells = Vec::new();
        for (index, frame) in frames.iter().enumerate() {
            for cell in self.netlist.module(frame.module).cells.values() {
                let CellKind::Primitive {
                    cell_type,
                    function,
                    inputs,
                    output,
                } = &cell.kind
                else {
                    continue;
                };
                let cell_name = self.netlist.resolve(cell.name);
                let inputs = inputs
                    .iter()
                    .map(|&bit| self.operand(operands, frame, cell_name, bit))
                    .collect::<Result<Vec<_>, _>>()?;
                let output = match self.operand(operands, frame, cell_name, *output)? {
                    Operand::Net(id) => id,
                    Operand::Const(_) => {
                        return Err(LoadError::ConstantOutput {
                            module: self.netlist.module_name(frame.module).to_string(),
                            owner: format!("{}.{cell_name}", frame.path),
                        })
                    }
                };
                if std::mem::replace(&mut driven[output.index()], true) {
                    return Err(LoadError::MultipleDrivers(nets[output].name.clone()));
                }
                cells.push(FlatCell {
                    instance: InstanceId::from_raw(index as u32),
                    name: cell.name,
                    cell_type: *cell_type,
                    function: *function,
                    inputs,
                    output,
                });
            }
        }
        Ok(cells)
    }

    fn instances(&self, frames: &[Frame<'_>], operands: &[Operand]) -> Arena<InstanceId, Instance> {
        let mut instances: Arena<InstanceId, Instance> = Arena::new();
        for frame in frames {
            let layout = self.layout(frame.module);
            let module = self.netlist.module(frame.module);
            let block = &operands[frame.base as usize..(frame.base + layout.len()) as usize];

            let mut excluded = HashSet::new();
            if frame.parent.is_some() {
                for port in module.ports.iter().filter(|p| p.is_input()) {
                    for local in port.bits.iter().filter_map(|b| b.net()) {
                        if let Some(&offset) = layout.offsets.get(&local) {
                            if let Operand::Net(id) = block[offset as usize] {
                                excluded.insert(id);
                            }
                        }
                    }
                }
            }

            let mut owned: Vec<FlatNetId> = block
                .iter()
                .filter_map(|operand| match operand {
                    Operand::Net(id) if !excluded.contains(id) => Some(*id),
                    _ => None,
                })
                .collect();
            owned.sort_unstable();
            owned.dedup();

            instances.alloc(Instance {
                module: frame.module,
                path: frame.path.clone(),
                parent: frame.parent.map(|p| InstanceId::from_raw(p as u32)),
                children: Vec::new(),
                nets: owned,
            });
        }
        for (index, frame) in frames.iter().enumerate() {
            if let Some(parent) = frame.parent {
                instances[InstanceId::from_raw(parent as u32)]
                    .children
                    .push(InstanceId::from_raw(index as u32));
            }
        }
        instances
    }

    fn net_paths(&self, frames: &[Frame<'_>], operands: &[Operand]) -> HashMap<String, FlatNetId> {
        let mut paths = HashMap::new();
        for frame in frames {
            let module = self.netlist.module(frame.module);
            let named = module
                .ports
                .iter()
                .map(|p| (p.name, &p.bits))
                .chain(module.nets.values().map(|n| (n.name, &n.bits)));
            for (name, bits) in named {
                let name = self.netlist.resolve(name);
                for (i, &bit) in bits.iter().enumerate() {
                    if let Ok(Operand::Net(id)) = self.operand(operands, frame, name, bit) {
                        let key = if bits.len() > 1 {
                            format!("{}.{name}[{i}]", frame.path)
                        } else {
                            format!("{}.{name}", frame.path)
                        };
                        paths.entry(key).or_insert(id);
                    }
                }
            }
        }
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatewise_netlist::default_library;
    use serde_json::json;

    fn half_adder() -> serde_json::Value {
        json!({
            "ports": {
                "a": { "direction": "input", "bits": [2] },
                "b": { "direction": "input", "bits": [3] },
                "s": { "direction": "output", "bits": [4] },
                "c": { "direction": "output", "bits": [5] }
            },
            "cells": {
                "x0": { "type": "XOR", "connections": { "A": [2], "B": [3], "Y": [4] } },
                "a0": { "type": "AND", "connections": { "A": [2], "B": [3], "Y": [5] } }
            },
            "netnames": {
                "a": { "bits": [2] },
                "b": { "bits": [3] },
                "s": { "bits": [4] },
                "c": { "bits": [5] }
            }
        })
    }

    fn two_half_adders() -> serde_json::Value {
        json!({
            "modules": {
                "half_adder": half_adder(),
                "top": {
                    "ports": {
                        "x": { "direction": "input", "bits": [2, 3] },
                        "y": { "direction": "input", "bits": [4, 5] },
                        "s": { "direction": "output", "bits": [6, 7] },
                        "c": { "direction": "output", "bits": [8, 9] }
                    },
                    "cells": {
                        "ha0": { "type": "half_adder",
                                 "connections": { "a": [2], "b": [4], "s": [6], "c": [8] } },
                        "ha1": { "type": "half_adder",
                                 "connections": { "a": [3], "b": [5], "s": [7], "c": [9] } }
                    },
                    "netnames": {}
                }
            }
        })
    }

    fn resolve(value: &serde_json::Value, top: &str) -> Result<FlatDesign, LoadError> {
        let netlist = Netlist::from_yosys_str(&value.to_string(), &default_library())?;
        let top = netlist
            .module_by_name(top)
            .ok_or_else(|| LoadError::UnknownModule(top.to_string()))?;
        HierarchyResolver::new(&netlist).resolve(top)
    }

    #[test]
    fn flattens_instances_into_shared_nets() {
        let flat = resolve(&two_half_adders(), "top").unwrap();
        assert_eq!(flat.instances.len(), 3);
        assert_eq!(flat.cells.len(), 4);
        // 8 top bits; every half-adder bit is bound to one of them.
        assert_eq!(flat.net_count(), 8);
        assert_eq!(
            flat.net_by_path("top.ha0.a"),
            flat.net_by_path("top.x[0]")
        );
        assert_eq!(
            flat.net_by_path("top.ha1.c"),
            flat.net_by_path("top.c[1]")
        );
    }

    #[test]
    fn nets_are_named_after_outermost_occurrence() {
        let flat = resolve(&two_half_adders(), "top").unwrap();
        let id = flat.net_by_path("top.ha1.s").unwrap();
        assert_eq!(flat.net_name(id), "top.s[1]");
    }

    #[test]
    fn instance_paths_in_preorder() {
        let flat = resolve(&two_half_adders(), "top").unwrap();
        let paths: Vec<&str> = flat.instances.values().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["top", "top.ha0", "top.ha1"]);
        assert_eq!(flat.instances[InstanceId::TOP].children.len(), 2);
    }

    #[test]
    fn child_scope_excludes_its_inputs() {
        let flat = resolve(&two_half_adders(), "top").unwrap();
        let ha0 = &flat.instances[InstanceId::from_raw(1)];
        let expected: HashSet<FlatNetId> = ["top.s[0]", "top.c[0]"]
            .iter()
            .map(|p| flat.net_by_path(p).unwrap())
            .collect();
        assert_eq!(ha0.nets.iter().copied().collect::<HashSet<_>>(), expected);
        // The top owns everything, its own inputs included.
        assert_eq!(flat.instances[InstanceId::TOP].nets.len(), 8);
    }

    #[test]
    fn top_ports_resolved() {
        let flat = resolve(&two_half_adders(), "top").unwrap();
        let x = flat.ports.iter().find(|p| p.name == "x").unwrap();
        assert_eq!(x.direction, PortDirection::Input);
        assert_eq!(x.bits.len(), 2);
    }

    #[test]
    fn hierarchy_cycle_is_rejected() {
        let value = json!({
            "modules": {
                "a": { "ports": {}, "cells": { "u": { "type": "b", "connections": {} } }, "netnames": {} },
                "b": { "ports": {}, "cells": { "u": { "type": "a", "connections": {} } }, "netnames": {} }
            }
        });
        let err = resolve(&value, "a").unwrap_err();
        assert!(matches!(err, LoadError::HierarchyCycle(path) if path == "a -> b -> a"));
    }

    #[test]
    fn two_drivers_are_rejected() {
        let mut value = two_half_adders();
        // Both half adders drive top.c[0].
        value["modules"]["top"]["cells"]["ha1"]["connections"]["c"] = json!([8]);
        let err = resolve(&value, "top").unwrap_err();
        assert!(matches!(err, LoadError::MultipleDrivers(net) if net == "top.c[0]"));
    }

    #[test]
    fn driving_a_top_input_is_rejected() {
        let mut value = two_half_adders();
        value["modules"]["top"]["cells"]["ha0"]["connections"]["s"] = json!([2]);
        let err = resolve(&value, "top").unwrap_err();
        assert!(matches!(err, LoadError::MultipleDrivers(_)));
    }

    #[test]
    fn constant_binding_becomes_operand() {
        let mut value = two_half_adders();
        value["modules"]["top"]["cells"]["ha0"]["connections"]["b"] = json!(["1"]);
        let flat = resolve(&value, "top").unwrap();
        let and = flat
            .cells
            .iter()
            .find(|c| c.instance == InstanceId::from_raw(1) && c.function == CellFunction::And)
            .unwrap();
        assert_eq!(and.inputs[1], Operand::Const(Bit::One));
    }

    #[test]
    fn constant_driven_output_is_rejected() {
        let mut value = two_half_adders();
        value["modules"]["top"]["cells"]["ha0"]["connections"]["s"] = json!(["0"]);
        let err = resolve(&value, "top").unwrap_err();
        assert!(matches!(err, LoadError::ConstantOutput { .. }));
    }

    #[test]
    fn shorted_constants_are_rejected() {
        let value = json!({
            "modules": {
                "tie": {
                    "ports": {
                        "p": { "direction": "input", "bits": [2] },
                        "q": { "direction": "input", "bits": [2] }
                    },
                    "cells": {},
                    "netnames": {}
                },
                "top": {
                    "ports": {},
                    "cells": {
                        "t": { "type": "tie", "connections": { "p": ["0"], "q": ["1"] } }
                    },
                    "netnames": {}
                }
            }
        });
        let err = resolve(&value, "top").unwrap_err();
        assert!(matches!(err, LoadError::ShortedConstants(_)));
    }

    #[test]
    fn union_keeps_lowest_root() {
        let mut classes = BitClasses::new(4);
        assert!(classes.union(3, 1));
        assert!(classes.union(2, 3));
        assert_eq!(classes.find(2), 1);
        assert!(classes.tie(3, Bit::One));
        assert!(!classes.tie(2, Bit::Zero));
        assert!(classes.tie(0, Bit::Zero));
        assert!(!classes.union(0, 2));
    }
}
