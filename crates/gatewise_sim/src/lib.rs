//! Zero-delay gate-level simulation of synthesized netlists.
//!
//! A [`Design`] is opened from a [`Netlist`](gatewise_netlist::Netlist) and a
//! top module name. Opening flattens the module hierarchy into one net space
//! ([`hierarchy`]), orders the combinational cells topologically ([`graph`])
//! and rejects combinational loops. After that:
//!
//! - [`Design::eval`] settles combinational logic in one ordered pass,
//! - [`Design::eval_clocked`] performs one clock edge with all registers
//!   committing together,
//! - [`Design::reset`] and [`Design::reset_clocked`] clear state,
//! - every net write counts rising and falling transitions ([`toggle`]),
//! - cell breakdown, area and toggle totals are reported per module name
//!   ([`metrics`]).
//!
//! Ports are read and written as packed [`BitVec`](gatewise_common::BitVec)s,
//! integers, or shaped element lists ([`ports`]).

#![warn(missing_docs)]

pub mod clock;
pub mod design;
pub mod engine;
pub mod error;
pub mod graph;
pub mod hierarchy;
pub mod metrics;
pub mod ports;
pub mod project;
pub mod toggle;

pub use clock::{ClockController, ClockState};
pub use design::Design;
pub use engine::EvaluationEngine;
pub use error::{ConfigError, DesignError, QueryError, StructuralError};
pub use graph::SignalGraph;
pub use hierarchy::{FlatDesign, FlatNetId, HierarchyResolver, InstanceId, Operand};
pub use metrics::MetricsAggregator;
pub use ports::{PortHandle, PortRegistry, PortShape};
pub use toggle::{ToggleCounts, ToggleTracker};
