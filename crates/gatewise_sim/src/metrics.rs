//! Per-module cell breakdown, area and toggle scope.
//!
//! Module definitions are shared by all their instances, so breakdowns are
//! computed once per [`ModuleId`], children before parents, and a parent adds
//! a child's memoized counts once per instance. Each breakdown is then priced
//! once against the cell library. Every query is answered from these tables.

use crate::error::QueryError;
use crate::hierarchy::{FlatDesign, FlatNetId};
use gatewise_common::{Ident, Interner};
use gatewise_netlist::{CellKind, CellLibrary, LibraryError, ModuleId, Netlist};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Precomputed metrics for every module reachable from the top.
#[derive(Debug, Clone)]
pub struct MetricsAggregator {
    names: Vec<String>,
    by_name: HashMap<String, ModuleId>,
    breakdowns: HashMap<ModuleId, HashMap<Ident, usize>>,
    areas: HashMap<ModuleId, Result<f64, String>>,
    scopes: HashMap<ModuleId, Vec<FlatNetId>>,
}

impl MetricsAggregator {
    /// Builds the tables for the resolved design.
    pub fn new(netlist: &Netlist, library: &CellLibrary, flat: &FlatDesign) -> Self {
        let mut names = Vec::new();
        let mut by_name = HashMap::new();
        for instance in flat.instances.values() {
            let name = netlist.module_name(instance.module);
            if !by_name.contains_key(name) {
                by_name.insert(name.to_string(), instance.module);
                names.push(name.to_string());
            }
        }

        let mut breakdowns: HashMap<ModuleId, HashMap<Ident, usize>> = HashMap::new();
        // Reverse pre-order visits every descendant before its ancestors.
        for instance in flat.instances.values().rev() {
            if breakdowns.contains_key(&instance.module) {
                continue;
            }
            let mut counts: HashMap<Ident, usize> = HashMap::new();
            for cell in netlist.module(instance.module).cells.values() {
                match &cell.kind {
                    CellKind::Primitive { cell_type, .. } => {
                        *counts.entry(*cell_type).or_default() += 1;
                    }
                    CellKind::Instance { module, .. } => {
                        if let Some(child) = breakdowns.get(module) {
                            for (&cell_type, &count) in child {
                                *counts.entry(cell_type).or_default() += count;
                            }
                        }
                    }
                }
            }
            breakdowns.insert(instance.module, counts);
        }

        let areas = breakdowns
            .iter()
            .map(|(&module, counts)| {
                let mut named: Vec<(&str, usize)> = counts
                    .iter()
                    .map(|(&cell_type, &count)| (netlist.resolve(cell_type), count))
                    .collect();
                named.sort_unstable();
                let area = library.breakdown_area(named).map_err(|err| match err {
                    LibraryError::UnknownCell(cell_type) => cell_type,
                    other => other.to_string(),
                });
                (module, area)
            })
            .collect();

        let scopes = Self::toggle_scopes(flat);
        debug!(
            "Metrics ready for {} modules across {} instances",
            names.len(),
            flat.instances.len()
        );
        Self {
            names,
            by_name,
            breakdowns,
            areas,
            scopes,
        }
    }

    /// Collects, per module, the nets owned by the subtree of every instance
    /// of that module.
    fn toggle_scopes(flat: &FlatDesign) -> HashMap<ModuleId, Vec<FlatNetId>> {
        let instances: Vec<_> = flat.instances.values().collect();
        let mut subtrees: Vec<BTreeSet<FlatNetId>> = vec![BTreeSet::new(); instances.len()];
        for (index, instance) in instances.iter().enumerate().rev() {
            let mut nets: BTreeSet<FlatNetId> = instance.nets.iter().copied().collect();
            for child in &instance.children {
                nets.extend(subtrees[child.as_raw() as usize].iter().copied());
            }
            subtrees[index] = nets;
        }

        let mut scopes: HashMap<ModuleId, BTreeSet<FlatNetId>> = HashMap::new();
        for (instance, nets) in instances.iter().zip(subtrees) {
            scopes.entry(instance.module).or_default().extend(nets);
        }
        scopes
            .into_iter()
            .map(|(module, nets)| (module, nets.into_iter().collect()))
            .collect()
    }

    /// Module names in the design, top first, in depth-first order of first use.
    pub fn module_names(&self) -> &[String] {
        &self.names
    }

    /// Resolves a module name within the design.
    pub fn module_id(&self, name: &str) -> Result<ModuleId, QueryError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| QueryError::UnknownModule(name.to_string()))
    }

    /// Counts primitive cells by type over the module and everything below it.
    pub fn breakdown(
        &self,
        name: &str,
        interner: &Interner,
    ) -> Result<HashMap<String, usize>, QueryError> {
        let module = self.module_id(name)?;
        Ok(self
            .breakdowns
            .get(&module)
            .map(|counts| {
                counts
                    .iter()
                    .map(|(&cell_type, &count)| (interner.resolve(cell_type).to_string(), count))
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Returns the total area of the module and everything below it.
    pub fn area(&self, name: &str) -> Result<f64, QueryError> {
        let module = self.module_id(name)?;
        match self.areas.get(&module) {
            Some(Ok(area)) => Ok(*area),
            Some(Err(cell_type)) => Err(QueryError::MissingAreaEntry {
                module: name.to_string(),
                cell_type: cell_type.clone(),
            }),
            None => Ok(0.0),
        }
    }

    /// Returns the nets counted for the module's toggle statistics.
    pub fn scope(&self, name: &str) -> Result<&[FlatNetId], QueryError> {
        let module = self.module_id(name)?;
        Ok(self.scopes.get(&module).map(Vec::as_slice).unwrap_or_default())
    }
}
