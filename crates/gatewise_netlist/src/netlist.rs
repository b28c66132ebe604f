//! Top-level netlist container.
//!
//! A [`Netlist`] holds every module definition read from one netlist source
//! together with the interner that owns their names. It is immutable once
//! loaded and is shared by every simulated instance of its modules.

use crate::arena::Arena;
use crate::ids::ModuleId;
use crate::module::Module;
use gatewise_common::{Ident, Interner};
use std::collections::HashMap;

/// All module definitions from one netlist source.
#[derive(Debug, Default)]
pub struct Netlist {
    /// All modules, keyed by [`ModuleId`].
    pub modules: Arena<ModuleId, Module>,
    /// Interner for module, port, net, cell and cell-type names.
    pub interner: Interner,
    by_name: HashMap<Ident, ModuleId>,
}

impl Netlist {
    /// Creates an empty netlist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves an ID for a module named `name` and returns it.
    ///
    /// The module body is supplied later through [`insert_module`](Netlist::insert_module),
    /// which lets instances refer to modules defined further down in the source.
    pub fn declare_module(&mut self, name: &str) -> ModuleId {
        let ident = self.interner.get_or_intern(name);
        if let Some(&id) = self.by_name.get(&ident) {
            return id;
        }
        let id = self.modules.alloc(Module::new(self.modules.next_id(), ident));
        self.by_name.insert(ident, id);
        id
    }

    /// Replaces the body of a declared module.
    pub fn insert_module(&mut self, module: Module) {
        let id = module.id;
        self.modules[id] = module;
    }

    /// Looks up a module by name.
    pub fn module_by_name(&self, name: &str) -> Option<ModuleId> {
        let ident = self.interner.get(name)?;
        self.by_name.get(&ident).copied()
    }

    /// Returns the module with the given ID.
    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id]
    }

    /// Returns the name of the module with the given ID.
    pub fn module_name(&self, id: ModuleId) -> &str {
        self.interner.resolve(self.modules[id].name)
    }

    /// Resolves an interned name.
    pub fn resolve(&self, ident: Ident) -> &str {
        self.interner.resolve(ident)
    }

    /// Returns the number of modules.
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_is_idempotent() {
        let mut netlist = Netlist::new();
        let a = netlist.declare_module("half_adder");
        let b = netlist.declare_module("half_adder");
        assert_eq!(a, b);
        assert_eq!(netlist.module_count(), 1);
    }

    #[test]
    fn lookup_by_name() {
        let mut netlist = Netlist::new();
        let top = netlist.declare_module("top");
        let sub = netlist.declare_module("sub");
        assert_eq!(netlist.module_by_name("top"), Some(top));
        assert_eq!(netlist.module_by_name("sub"), Some(sub));
        assert_eq!(netlist.module_by_name("missing"), None);
        assert_eq!(netlist.module_name(sub), "sub");
    }

    #[test]
    fn insert_replaces_body() {
        let mut netlist = Netlist::new();
        let id = netlist.declare_module("top");
        let mut module = Module::new(id, netlist.interner.get_or_intern("top"));
        module.nets.alloc(crate::net::Net {
            id: crate::ids::NetId::from_raw(0),
            name: netlist.interner.get_or_intern("w"),
            bits: vec![crate::net::BitRef::Net(2)],
            hidden: false,
        });
        netlist.insert_module(module);
        assert_eq!(netlist.module(id).nets.len(), 1);
    }
}
