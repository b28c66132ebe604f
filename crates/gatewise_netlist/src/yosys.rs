//! Loader for Yosys `write_json` netlists.
//!
//! The JSON maps module names to their `ports`, `cells` and `netnames`. Bits
//! are integers (net numbers local to the module) or the strings `"0"`, `"1"`,
//! `"x"` and `"z"`. Only the fields the simulator needs are read; attributes
//! and parameters are ignored.
//!
//! Loading runs in two passes. The first declares every module name so that
//! instances can reference modules defined later in the file. The second
//! builds each module, classifying every cell as an instance (its type names
//! a module) or a library primitive, and checking that every connection bit
//! is declared and every pin has the expected width.

use crate::cell::{Cell, CellKind};
use crate::error::LoadError;
use crate::ids::{CellId, ModuleId, PortId};
use crate::library::{CellInfo, CellLibrary};
use crate::module::Module;
use crate::net::{BitRef, Net};
use crate::netlist::Netlist;
use crate::port::{Port, PortDirection};
use gatewise_common::Bit;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::marker::PhantomData;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct YosysNetlist {
    #[serde(default)]
    modules: BTreeMap<String, YosysModule>,
}

#[derive(Debug, Deserialize)]
struct YosysModule {
    /// Kept in file order: the port list is the module's interface.
    #[serde(default, deserialize_with = "ordered_entries")]
    ports: Vec<(String, YosysPort)>,
    #[serde(default)]
    cells: BTreeMap<String, YosysCell>,
    #[serde(default)]
    netnames: BTreeMap<String, YosysNetName>,
}

#[derive(Debug, Deserialize)]
struct YosysPort {
    direction: String,
    bits: Vec<YosysBit>,
    #[serde(default)]
    signed: u8,
}

#[derive(Debug, Deserialize)]
struct YosysCell {
    #[serde(rename = "type")]
    cell_type: String,
    #[serde(default)]
    connections: BTreeMap<String, Vec<YosysBit>>,
}

#[derive(Debug, Deserialize)]
struct YosysNetName {
    #[serde(default)]
    hide_name: u8,
    bits: Vec<YosysBit>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum YosysBit {
    Net(u32),
    Special(String),
}

/// Deserializes a JSON object into its entries in document order, rejecting
/// repeated keys.
fn ordered_entries<'de, D, T>(deserializer: D) -> Result<Vec<(String, T)>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    struct Entries<T>(PhantomData<T>);

    impl<'de, T: Deserialize<'de>> Visitor<'de> for Entries<T> {
        type Value = Vec<(String, T)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a JSON object")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut entries: Vec<(String, T)> = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((key, value)) = map.next_entry::<String, T>()? {
                if entries.iter().any(|(existing, _)| *existing == key) {
                    return Err(de::Error::custom(format!("duplicate key '{key}'")));
                }
                entries.push((key, value));
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(Entries(PhantomData))
}

impl Netlist {
    /// Loads a netlist from Yosys JSON text.
    pub fn from_yosys_str(text: &str, library: &CellLibrary) -> Result<Self, LoadError> {
        let raw: YosysNetlist = serde_json::from_str(text)?;
        build(&raw, library)
    }

    /// Loads a netlist from Yosys JSON bytes.
    pub fn from_yosys_slice(bytes: &[u8], library: &CellLibrary) -> Result<Self, LoadError> {
        let raw: YosysNetlist = serde_json::from_slice(bytes)?;
        build(&raw, library)
    }

    /// Reads and loads a Yosys JSON file.
    pub fn from_yosys_file(
        path: impl AsRef<Path>,
        library: &CellLibrary,
    ) -> Result<Self, LoadError> {
        let path = path.as_ref();
        debug!("Reading netlist {}", path.display());
        let bytes = std::fs::read(path)?;
        Self::from_yosys_slice(&bytes, library)
    }
}

fn build(raw: &YosysNetlist, library: &CellLibrary) -> Result<Netlist, LoadError> {
    let mut netlist = Netlist::new();
    let ids: Vec<ModuleId> = raw
        .modules
        .keys()
        .map(|name| netlist.declare_module(name))
        .collect();

    for ((name, module), id) in raw.modules.iter().zip(ids) {
        let loader = ModuleLoader::new(&netlist, raw, library, name, module);
        let built = loader.load(id, module)?;
        debug!(
            "Loaded module '{}': {} ports, {} nets, {} cells",
            name,
            built.ports.len(),
            built.nets.len(),
            built.cells.len()
        );
        netlist.insert_module(built);
    }
    Ok(netlist)
}

struct ModuleLoader<'a> {
    netlist: &'a Netlist,
    raw: &'a YosysNetlist,
    library: &'a CellLibrary,
    name: &'a str,
    declared: HashSet<u32>,
}

impl<'a> ModuleLoader<'a> {
    fn new(
        netlist: &'a Netlist,
        raw: &'a YosysNetlist,
        library: &'a CellLibrary,
        name: &'a str,
        module: &YosysModule,
    ) -> Self {
        let declared = module
            .ports
            .iter()
            .flat_map(|(_, p)| p.bits.iter())
            .chain(module.netnames.values().flat_map(|n| n.bits.iter()))
            .filter_map(|bit| match bit {
                YosysBit::Net(n) => Some(*n),
                YosysBit::Special(_) => None,
            })
            .collect();
        Self {
            netlist,
            raw,
            library,
            name,
            declared,
        }
    }

    fn load(&self, id: ModuleId, raw: &YosysModule) -> Result<Module, LoadError> {
        let interner = &self.netlist.interner;
        let mut module = Module::new(id, interner.get_or_intern(self.name));

        for (index, (port_name, port)) in raw.ports.iter().enumerate() {
            let direction = PortDirection::from_yosys(&port.direction).ok_or_else(|| {
                LoadError::UnsupportedPortDirection {
                    module: self.name.to_string(),
                    port: port_name.clone(),
                    direction: port.direction.clone(),
                }
            })?;
            let bits = self.bits(port_name, &port.bits)?;
            if direction == PortDirection::Input && bits.iter().any(|b| b.net().is_none()) {
                return Err(LoadError::ConstantOutput {
                    module: self.name.to_string(),
                    owner: port_name.clone(),
                });
            }
            module.ports.push(Port {
                id: PortId::from_raw(index as u32),
                name: interner.get_or_intern(port_name),
                direction,
                bits,
                signed: port.signed != 0,
            });
        }

        for (net_name, net) in &raw.netnames {
            let bits = self.bits(net_name, &net.bits)?;
            module.nets.alloc(Net {
                id: module.nets.next_id(),
                name: interner.get_or_intern(net_name),
                bits,
                hidden: net.hide_name != 0,
            });
        }

        for (cell_name, cell) in &raw.cells {
            let kind = if let Some(sub) = self.netlist.module_by_name(&cell.cell_type) {
                self.instance(cell_name, cell, sub)?
            } else if let Some(info) = self.library.get(&cell.cell_type) {
                self.primitive(cell_name, cell, info)?
            } else {
                return Err(LoadError::UnknownCellType {
                    module: self.name.to_string(),
                    cell: cell_name.clone(),
                    cell_type: cell.cell_type.clone(),
                });
            };
            let id: CellId = module.cells.next_id();
            module.cells.alloc(Cell {
                id,
                name: interner.get_or_intern(cell_name),
                kind,
            });
        }

        Ok(module)
    }

    fn primitive(
        &self,
        cell_name: &str,
        cell: &YosysCell,
        info: &CellInfo,
    ) -> Result<CellKind, LoadError> {
        let input_pins = info.input_pins();
        let output_pin = info.function.output_pin();

        if let Some(pin) = cell
            .connections
            .keys()
            .find(|pin| pin.as_str() != output_pin && !input_pins.contains(&pin.as_str()))
        {
            return Err(LoadError::UnknownPin {
                module: self.name.to_string(),
                cell: cell_name.to_string(),
                pin: pin.clone(),
            });
        }

        let inputs = input_pins
            .iter()
            .map(|pin| self.pin_bit(cell_name, cell, pin))
            .collect::<Result<Vec<_>, _>>()?;
        let output = self.pin_bit(cell_name, cell, output_pin)?;
        if output.net().is_none() {
            return Err(LoadError::ConstantOutput {
                module: self.name.to_string(),
                owner: cell_name.to_string(),
            });
        }

        Ok(CellKind::Primitive {
            cell_type: self.netlist.interner.get_or_intern(&cell.cell_type),
            function: info.function,
            inputs,
            output,
        })
    }

    fn pin_bit(&self, cell_name: &str, cell: &YosysCell, pin: &str) -> Result<BitRef, LoadError> {
        let bits = cell
            .connections
            .get(pin)
            .ok_or_else(|| LoadError::MissingPin {
                module: self.name.to_string(),
                cell: cell_name.to_string(),
                pin: pin.to_string(),
            })?;
        match bits.as_slice() {
            [bit] => self.bit(cell_name, bit),
            _ => Err(LoadError::WidthMismatch {
                module: self.name.to_string(),
                cell: cell_name.to_string(),
                pin: pin.to_string(),
                expected: 1,
                actual: bits.len(),
            }),
        }
    }

    fn instance(
        &self,
        cell_name: &str,
        cell: &YosysCell,
        sub: ModuleId,
    ) -> Result<CellKind, LoadError> {
        let interner = &self.netlist.interner;
        let sub_ports = self
            .raw
            .modules
            .get(&cell.cell_type)
            .map(|m| &m.ports)
            .ok_or_else(|| LoadError::UnknownModule(cell.cell_type.clone()))?;

        if let Some(pin) = cell.connections.keys().find(|pin| !sub_ports.iter().any(|(name, _)| name == *pin)) {
            return Err(LoadError::UnknownPin {
                module: self.name.to_string(),
                cell: cell_name.to_string(),
                pin: pin.clone(),
            });
        }

        let mut bindings = Vec::with_capacity(cell.connections.len());
        for (port_name, port) in sub_ports {
            let Some(bits) = cell.connections.get(port_name) else {
                continue;
            };
            if bits.len() != port.bits.len() {
                return Err(LoadError::WidthMismatch {
                    module: self.name.to_string(),
                    cell: cell_name.to_string(),
                    pin: port_name.clone(),
                    expected: port.bits.len(),
                    actual: bits.len(),
                });
            }
            let bits = bits
                .iter()
                .map(|bit| self.bit(cell_name, bit))
                .collect::<Result<Vec<_>, _>>()?;
            bindings.push((interner.get_or_intern(port_name), bits));
        }

        Ok(CellKind::Instance {
            module: sub,
            bindings,
        })
    }

    fn bits(&self, owner: &str, bits: &[YosysBit]) -> Result<Vec<BitRef>, LoadError> {
        bits.iter().map(|bit| self.bit(owner, bit)).collect()
    }

    fn bit(&self, owner: &str, bit: &YosysBit) -> Result<BitRef, LoadError> {
        match bit {
            YosysBit::Net(n) if self.declared.contains(n) => Ok(BitRef::Net(*n)),
            YosysBit::Net(n) => Err(LoadError::UndeclaredNet {
                module: self.name.to_string(),
                owner: owner.to_string(),
                bit: *n,
            }),
            YosysBit::Special(s) => match s.as_str() {
                "0" => Ok(BitRef::Const(Bit::Zero)),
                "1" => Ok(BitRef::Const(Bit::One)),
                "x" | "z" => {
                    warn!(
                        "Undefined bit '{}' on '{}' in module '{}' treated as 0",
                        s, owner, self.name
                    );
                    Ok(BitRef::Const(Bit::Zero))
                }
                other => Err(LoadError::InvalidBit(other.to_string())),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellFunction;
    use crate::library::default_library;
    use serde_json::json;

    fn half_adder_json() -> serde_json::Value {
        json!({
            "modules": {
                "half_adder": {
                    "ports": {
                        "a": { "direction": "input", "bits": [2] },
                        "b": { "direction": "input", "bits": [3] },
                        "s": { "direction": "output", "bits": [4] },
                        "c": { "direction": "output", "bits": [5] }
                    },
                    "cells": {
                        "x0": {
                            "type": "$_XOR_",
                            "connections": { "A": [2], "B": [3], "Y": [4] }
                        },
                        "a0": {
                            "type": "$_AND_",
                            "connections": { "A": [2], "B": [3], "Y": [5] }
                        }
                    },
                    "netnames": {
                        "a": { "hide_name": 0, "bits": [2] },
                        "b": { "hide_name": 0, "bits": [3] },
                        "s": { "hide_name": 0, "bits": [4] },
                        "c": { "hide_name": 0, "bits": [5] }
                    }
                },
                "top": {
                    "ports": {
                        "x": { "direction": "input", "bits": [2, 3] },
                        "y": { "direction": "output", "bits": [4, 5] }
                    },
                    "cells": {
                        "ha0": {
                            "type": "half_adder",
                            "connections": { "a": [2], "b": [3], "s": [4], "c": [5] }
                        }
                    },
                    "netnames": {}
                }
            }
        })
    }

    fn load(value: &serde_json::Value) -> Result<Netlist, LoadError> {
        Netlist::from_yosys_str(&value.to_string(), &default_library())
    }

    #[test]
    fn ports_keep_file_order() {
        let text = r#"{ "modules": { "m": {
            "ports": {
                "y": { "direction": "output", "bits": [4] },
                "b": { "direction": "input", "bits": [3] },
                "a": { "direction": "input", "bits": [2] }
            },
            "cells": {
                "g": { "type": "$_AND_", "connections": { "A": [2], "B": [3], "Y": [4] } }
            }
        } } }"#;
        let netlist = Netlist::from_yosys_str(text, &default_library()).unwrap();
        let m = netlist.module(netlist.module_by_name("m").unwrap());
        let names: Vec<_> = m.ports.iter().map(|p| netlist.resolve(p.name)).collect();
        assert_eq!(names, ["y", "b", "a"]);
    }

    #[test]
    fn duplicate_port_is_rejected() {
        let text = r#"{ "modules": { "m": {
            "ports": {
                "a": { "direction": "input", "bits": [2] },
                "a": { "direction": "output", "bits": [3] }
            }
        } } }"#;
        let err = Netlist::from_yosys_str(text, &default_library()).unwrap_err();
        assert!(matches!(err, LoadError::Json(_)));
        assert!(err.to_string().contains("duplicate key 'a'"));
    }

    #[test]
    fn loads_modules_ports_and_cells() {
        let netlist = load(&half_adder_json()).unwrap();
        assert_eq!(netlist.module_count(), 2);
        let ha = netlist.module(netlist.module_by_name("half_adder").unwrap());
        assert_eq!(ha.ports.len(), 4);
        assert_eq!(ha.cells.len(), 2);
        assert_eq!(ha.nets.len(), 4);
        assert!(ha
            .cells
            .values()
            .all(|c| matches!(c.kind, CellKind::Primitive { .. })));
    }

    #[test]
    fn primitive_inputs_in_pin_order() {
        let netlist = load(&half_adder_json()).unwrap();
        let ha = netlist.module(netlist.module_by_name("half_adder").unwrap());
        let xor = ha
            .cells
            .values()
            .find(|c| netlist.resolve(c.name) == "x0")
            .unwrap();
        match &xor.kind {
            CellKind::Primitive {
                function,
                inputs,
                output,
                cell_type,
            } => {
                assert_eq!(*function, CellFunction::Xor);
                assert_eq!(inputs, &vec![BitRef::Net(2), BitRef::Net(3)]);
                assert_eq!(*output, BitRef::Net(4));
                assert_eq!(netlist.resolve(*cell_type), "$_XOR_");
            }
            CellKind::Instance { .. } => panic!("expected primitive"),
        }
    }

    #[test]
    fn instance_cells_reference_modules() {
        let netlist = load(&half_adder_json()).unwrap();
        let top = netlist.module(netlist.module_by_name("top").unwrap());
        let cell = top.cells.values().next().unwrap();
        match &cell.kind {
            CellKind::Instance { module, bindings } => {
                assert_eq!(netlist.module_name(*module), "half_adder");
                assert_eq!(bindings.len(), 4);
            }
            CellKind::Primitive { .. } => panic!("expected instance"),
        }
    }

    #[test]
    fn constant_bits_become_constants() {
        let mut value = half_adder_json();
        value["modules"]["half_adder"]["cells"]["a0"]["connections"]["B"] = json!(["1"]);
        let netlist = load(&value).unwrap();
        let ha = netlist.module(netlist.module_by_name("half_adder").unwrap());
        let and = ha
            .cells
            .values()
            .find(|c| netlist.resolve(c.name) == "a0")
            .unwrap();
        let CellKind::Primitive { inputs, .. } = &and.kind else {
            panic!("expected primitive");
        };
        assert_eq!(inputs[1], BitRef::Const(Bit::One));
    }

    #[test]
    fn undefined_bits_map_to_zero() {
        let mut value = half_adder_json();
        value["modules"]["half_adder"]["cells"]["a0"]["connections"]["B"] = json!(["x"]);
        assert!(load(&value).is_ok());
    }

    #[test]
    fn unknown_cell_type_is_rejected() {
        let mut value = half_adder_json();
        value["modules"]["half_adder"]["cells"]["a0"]["type"] = json!("$_AOI3_");
        let err = load(&value).unwrap_err();
        assert!(matches!(err, LoadError::UnknownCellType { cell_type, .. } if cell_type == "$_AOI3_"));
    }

    #[test]
    fn undeclared_bit_is_rejected() {
        let mut value = half_adder_json();
        value["modules"]["half_adder"]["cells"]["a0"]["connections"]["A"] = json!([42]);
        let err = load(&value).unwrap_err();
        assert!(matches!(err, LoadError::UndeclaredNet { bit: 42, .. }));
    }

    #[test]
    fn missing_pin_is_rejected() {
        let mut value = half_adder_json();
        value["modules"]["half_adder"]["cells"]["a0"]["connections"] =
            json!({ "A": [2], "Y": [5] });
        let err = load(&value).unwrap_err();
        assert!(matches!(err, LoadError::MissingPin { pin, .. } if pin == "B"));
    }

    #[test]
    fn unknown_primitive_pin_is_rejected() {
        let mut value = half_adder_json();
        value["modules"]["half_adder"]["cells"]["a0"]["connections"]["Z"] = json!([2]);
        let err = load(&value).unwrap_err();
        assert!(matches!(err, LoadError::UnknownPin { pin, .. } if pin == "Z"));
    }

    #[test]
    fn wide_primitive_pin_is_rejected() {
        let mut value = half_adder_json();
        value["modules"]["half_adder"]["cells"]["a0"]["connections"]["A"] = json!([2, 3]);
        let err = load(&value).unwrap_err();
        assert!(matches!(err, LoadError::WidthMismatch { expected: 1, actual: 2, .. }));
    }

    #[test]
    fn instance_width_mismatch_is_rejected() {
        let mut value = half_adder_json();
        value["modules"]["top"]["cells"]["ha0"]["connections"]["a"] = json!([2, 3]);
        let err = load(&value).unwrap_err();
        assert!(matches!(err, LoadError::WidthMismatch { pin, .. } if pin == "a"));
    }

    #[test]
    fn instance_unknown_port_is_rejected() {
        let mut value = half_adder_json();
        value["modules"]["top"]["cells"]["ha0"]["connections"]["cin"] = json!([2]);
        let err = load(&value).unwrap_err();
        assert!(matches!(err, LoadError::UnknownPin { pin, .. } if pin == "cin"));
    }

    #[test]
    fn constant_cell_output_is_rejected() {
        let mut value = half_adder_json();
        value["modules"]["half_adder"]["cells"]["a0"]["connections"]["Y"] = json!(["0"]);
        let err = load(&value).unwrap_err();
        assert!(matches!(err, LoadError::ConstantOutput { .. }));
    }

    #[test]
    fn inout_port_is_rejected() {
        let mut value = half_adder_json();
        value["modules"]["half_adder"]["ports"]["a"]["direction"] = json!("inout");
        let err = load(&value).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedPortDirection { .. }));
    }

    #[test]
    fn invalid_bit_string_is_rejected() {
        let mut value = half_adder_json();
        value["modules"]["half_adder"]["cells"]["a0"]["connections"]["A"] = json!(["q"]);
        let err = load(&value).unwrap_err();
        assert!(matches!(err, LoadError::InvalidBit(s) if s == "q"));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = Netlist::from_yosys_str("{ \"modules\": ", &default_library()).unwrap_err();
        assert!(matches!(err, LoadError::Json(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("netlist.json");
        std::fs::write(&path, half_adder_json().to_string()).unwrap();
        let netlist = Netlist::from_yosys_file(&path, &default_library()).unwrap();
        assert_eq!(netlist.module_count(), 2);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Netlist::from_yosys_file("/nonexistent/netlist.json", &default_library())
            .unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
