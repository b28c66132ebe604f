//! The [`Design`] facade: a loaded, flattened, ready-to-simulate netlist.

use crate::clock::{ClockController, ClockState};
use crate::engine::EvaluationEngine;
use crate::error::{ConfigError, DesignError, QueryError};
use crate::graph::SignalGraph;
use crate::hierarchy::{FlatDesign, FlatNetId, HierarchyResolver};
use crate::metrics::MetricsAggregator;
use crate::ports::{PortHandle, PortRegistry, PortShape};
use crate::toggle::{ToggleCounts, ToggleTracker};
use gatewise_common::{Bit, BitVec};
use gatewise_netlist::{CellLibrary, LoadError, Netlist, PortDirection};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// A simulated design rooted at one top module.
///
/// Construction resolves the hierarchy and the evaluation order once; every
/// later call works on flat storage. All nets start at 0 and nothing is
/// evaluated until the first [`eval`](Design::eval).
#[derive(Debug)]
pub struct Design {
    netlist: Netlist,
    library: CellLibrary,
    flat: FlatDesign,
    engine: EvaluationEngine,
    tracker: ToggleTracker,
    controller: ClockController,
    ports: PortRegistry,
    metrics: MetricsAggregator,
    clock_port: Option<PortHandle>,
    reset_port: Option<PortHandle>,
}

impl Design {
    /// Opens a design from a loaded netlist.
    ///
    /// Fails if `top` is not a module of the netlist, if the hierarchy cannot
    /// be flattened, or if the combinational logic contains a loop.
    pub fn open(top: &str, netlist: Netlist, library: CellLibrary) -> Result<Self, DesignError> {
        let top_id = netlist
            .module_by_name(top)
            .ok_or_else(|| LoadError::UnknownModule(top.to_string()))?;
        let flat = HierarchyResolver::new(&netlist).resolve(top_id)?;
        let order = SignalGraph::build(&flat).evaluation_order(&flat)?;

        let controller = ClockController::new(&flat.cells);
        let metrics = MetricsAggregator::new(&netlist, &library, &flat);
        debug!(
            "Opened design '{}': {} cells ({} registers), {} nets",
            top,
            flat.cells.len(),
            controller.register_count(),
            flat.net_count()
        );

        Ok(Self {
            tracker: ToggleTracker::new(flat.net_count()),
            ports: PortRegistry::new(&flat.ports),
            engine: EvaluationEngine::new(order),
            controller,
            metrics,
            netlist,
            library,
            flat,
            clock_port: None,
            reset_port: None,
        })
    }

    /// Parses Yosys JSON text and opens a design from it.
    pub fn open_str(top: &str, json: &str, library: CellLibrary) -> Result<Self, DesignError> {
        let netlist = Netlist::from_yosys_str(json, &library)?;
        Self::open(top, netlist, library)
    }

    /// Reads a Yosys JSON file and opens a design from it.
    pub fn open_file(
        top: &str,
        path: impl AsRef<Path>,
        library: CellLibrary,
    ) -> Result<Self, DesignError> {
        let netlist = Netlist::from_yosys_file(path, &library)?;
        Self::open(top, netlist, library)
    }

    /// Returns the top module name.
    pub fn top_name(&self) -> &str {
        self.netlist.module_name(self.flat.top)
    }

    /// Returns the netlist the design was built from.
    pub fn netlist(&self) -> &Netlist {
        &self.netlist
    }

    /// Returns the cell library used for area queries.
    pub fn library(&self) -> &CellLibrary {
        &self.library
    }

    /// Returns the number of flattened nets.
    pub fn net_count(&self) -> usize {
        self.flat.net_count()
    }

    /// Returns the number of flattened primitive cells.
    pub fn cell_count(&self) -> usize {
        self.flat.cells.len()
    }

    /// Returns the number of registers.
    pub fn register_count(&self) -> usize {
        self.controller.register_count()
    }

    // -- Port configuration --

    /// Resolves a port name to a handle for repeated access.
    pub fn port(&self, name: &str) -> Result<PortHandle, ConfigError> {
        self.ports.handle(name)
    }

    /// Iterates over top-level port names in declaration order.
    pub fn port_names(&self) -> impl Iterator<Item = &str> {
        self.ports.names()
    }

    /// Returns `true` if the port is an input.
    pub fn is_port_input(&self, name: &str) -> Result<bool, ConfigError> {
        Ok(self.port_direction(name)? == PortDirection::Input)
    }

    /// Returns the port direction.
    pub fn port_direction(&self, name: &str) -> Result<PortDirection, ConfigError> {
        Ok(self.ports.direction(self.ports.handle(name)?))
    }

    /// Returns the port width in bits.
    pub fn port_width(&self, name: &str) -> Result<usize, ConfigError> {
        Ok(self.ports.width(self.ports.handle(name)?))
    }

    /// Returns the port's element shape.
    pub fn port_shape(&self, name: &str) -> Result<PortShape, ConfigError> {
        Ok(self.ports.shape(self.ports.handle(name)?))
    }

    /// Sets the port's element shape, which must cover the port exactly.
    pub fn set_port_shape(&mut self, name: &str, shape: PortShape) -> Result<(), ConfigError> {
        let handle = self.ports.handle(name)?;
        self.ports.set_shape(handle, shape)
    }

    /// Marks a single-bit input port as the clock.
    pub fn set_clock(&mut self, name: &str) -> Result<(), ConfigError> {
        let handle = self.ports.handle(name)?;
        if self.reset_port == Some(handle) {
            return Err(ConfigError::ClockAndReset(name.to_string()));
        }
        let net = self.ports.control_net(handle)?;
        self.clock_port = Some(handle);
        self.controller.set_clock(Some(net));
        debug!("Clock port set to '{}'", name);
        Ok(())
    }

    /// Marks a single-bit input port as the reset.
    pub fn set_reset(&mut self, name: &str) -> Result<(), ConfigError> {
        let handle = self.ports.handle(name)?;
        if self.clock_port == Some(handle) {
            return Err(ConfigError::ClockAndReset(name.to_string()));
        }
        let net = self.ports.control_net(handle)?;
        self.reset_port = Some(handle);
        self.controller.set_reset(Some(net));
        debug!("Reset port set to '{}'", name);
        Ok(())
    }

    /// Returns the clock port name, if configured.
    pub fn clock_port(&self) -> Option<&str> {
        self.clock_port.map(|h| self.ports.name(h))
    }

    /// Returns the reset port name, if configured.
    pub fn reset_port(&self) -> Option<&str> {
        self.reset_port.map(|h| self.ports.name(h))
    }

    // -- Port data --

    /// Reads a port value.
    pub fn get_port_bits(&self, name: &str) -> Result<BitVec, ConfigError> {
        Ok(self.read_port(self.ports.handle(name)?))
    }

    /// Drives an input port. The buffer must match the port width exactly.
    pub fn set_port_bits(&mut self, name: &str, value: &BitVec) -> Result<(), ConfigError> {
        let handle = self.ports.handle(name)?;
        self.write_port(handle, value)
    }

    /// Reads a port value through a resolved handle.
    pub fn read_port(&self, handle: PortHandle) -> BitVec {
        self.ports.get_bits(handle, &self.tracker)
    }

    /// Drives an input port through a resolved handle.
    pub fn write_port(&mut self, handle: PortHandle, value: &BitVec) -> Result<(), ConfigError> {
        self.ports.set_bits(handle, value, &mut self.tracker)
    }

    /// Reads a port of at most 64 bits as an unsigned integer.
    pub fn get_port_u64(&self, name: &str) -> Result<u64, ConfigError> {
        self.ports.get_u64(self.ports.handle(name)?, &self.tracker)
    }

    /// Drives an input port of at most 64 bits from an unsigned integer.
    pub fn set_port_u64(&mut self, name: &str, value: u64) -> Result<(), ConfigError> {
        let handle = self.ports.handle(name)?;
        self.ports.set_u64(handle, value, &mut self.tracker)
    }

    /// Reads a port as unsigned elements of its configured shape.
    pub fn get_port_elements(&self, name: &str) -> Result<Vec<u64>, ConfigError> {
        self.ports.get_elements(self.ports.handle(name)?, &self.tracker)
    }

    /// Drives an input port from unsigned elements of its configured shape.
    pub fn set_port_elements(&mut self, name: &str, elements: &[u64]) -> Result<(), ConfigError> {
        let handle = self.ports.handle(name)?;
        self.ports.set_elements(handle, elements, &mut self.tracker)
    }

    // -- Evaluation --

    /// Settles all combinational logic. Register outputs are unchanged.
    pub fn eval(&mut self) {
        self.engine.settle(&self.flat.cells, &mut self.tracker);
    }

    /// Performs one clock edge. Requires a clock port.
    pub fn eval_clocked(&mut self) -> Result<(), ConfigError> {
        self.controller
            .eval_clocked(&self.flat.cells, &mut self.engine, &mut self.tracker)
    }

    /// Drives every net, registers included, to 0 without a clock edge.
    pub fn reset(&mut self) {
        self.controller.reset(&mut self.tracker);
    }

    /// Drives the reset port to 1 until the next [`eval_clocked`](Self::eval_clocked).
    /// Requires clock and reset ports.
    pub fn assert_reset(&mut self) -> Result<(), ConfigError> {
        self.controller
            .assert_reset(&self.flat.cells, &mut self.engine, &mut self.tracker)
    }

    /// Asserts reset for one clock edge. Requires clock and reset ports.
    pub fn reset_clocked(&mut self) -> Result<(), ConfigError> {
        self.controller
            .reset_clocked(&self.flat.cells, &mut self.engine, &mut self.tracker)
    }

    /// Returns the reset line state.
    pub fn clock_state(&self) -> ClockState {
        self.controller.state()
    }

    // -- Metrics --

    /// Module names in the design, top first.
    pub fn module_names(&self) -> &[String] {
        self.metrics.module_names()
    }

    /// Counts primitive cells by type in the module and all its instances.
    pub fn module_breakdown(&self, name: &str) -> Result<HashMap<String, usize>, QueryError> {
        self.metrics.breakdown(name, &self.netlist.interner)
    }

    /// Returns the area of the module and all its instances.
    pub fn module_area(&self, name: &str) -> Result<f64, QueryError> {
        self.metrics.area(name)
    }

    /// Sums rising and falling toggles over every instance of the module.
    pub fn module_total_toggle_count(&self, name: &str) -> Result<u64, QueryError> {
        Ok(self.module_toggle_counts(name)?.total())
    }

    /// Returns rising and falling toggles over every instance of the module.
    pub fn module_toggle_counts(&self, name: &str) -> Result<ToggleCounts, QueryError> {
        Ok(self.tracker.sum(self.metrics.scope(name)?))
    }

    /// Zeroes every toggle counter. Net values are unchanged.
    pub fn clear_toggle_counts(&mut self) {
        self.tracker.clear_counts();
    }

    fn net(&self, path: &str) -> Result<FlatNetId, QueryError> {
        self.flat
            .net_by_path(path)
            .ok_or_else(|| QueryError::UnknownNet(path.to_string()))
    }

    /// Reads a net by hierarchical name, e.g. `top.ha0.s`.
    pub fn net_value(&self, path: &str) -> Result<Bit, QueryError> {
        Ok(self.tracker.value(self.net(path)?))
    }

    /// Returns the toggle counts of a net by hierarchical name.
    pub fn net_toggle_counts(&self, path: &str) -> Result<ToggleCounts, QueryError> {
        Ok(self.tracker.counts(self.net(path)?))
    }
}
