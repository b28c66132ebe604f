//! Combinational dependency graph and evaluation order.
//!
//! Nodes are combinational cells; an edge runs from the cell driving a net to
//! every combinational cell reading it. Sequential cells are left out
//! entirely, so a register output acts as a source and its data input as a
//! sink. The order is computed by in-degree counting (Kahn). Any node left
//! over sits on or behind a combinational loop.

use crate::error::StructuralError;
use crate::hierarchy::{FlatDesign, Operand};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// Dependency graph over the combinational cells of a flat design.
#[derive(Debug)]
pub struct SignalGraph {
    graph: DiGraph<usize, ()>,
}

impl SignalGraph {
    /// Builds the graph. Node weights are indices into `flat.cells`.
    pub fn build(flat: &FlatDesign) -> Self {
        let mut graph = DiGraph::<usize, ()>::new();
        let mut driver = HashMap::new();

        for (index, cell) in flat.cells.iter().enumerate() {
            if cell.function.is_sequential() {
                continue;
            }
            let node = graph.add_node(index);
            driver.insert(cell.output, node);
        }

        for node in graph.node_indices().collect::<Vec<_>>() {
            let cell = &flat.cells[graph[node]];
            for input in &cell.inputs {
                if let Operand::Net(net) = input {
                    if let Some(&from) = driver.get(net) {
                        graph.add_edge(from, node, ());
                    }
                }
            }
        }

        Self { graph }
    }

    /// Computes an evaluation order: every cell appears after all the cells
    /// driving its inputs. Fails if the graph contains a cycle.
    pub fn evaluation_order(&self, flat: &FlatDesign) -> Result<Vec<usize>, StructuralError> {
        let mut pending: Vec<usize> = self
            .graph
            .node_indices()
            .map(|n| self.graph.neighbors_directed(n, Direction::Incoming).count())
            .collect();
        let mut ready: VecDeque<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|n| pending[n.index()] == 0)
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(node) = ready.pop_front() {
            order.push(self.graph[node]);
            for next in self.graph.neighbors_directed(node, Direction::Outgoing) {
                pending[next.index()] -= 1;
                if pending[next.index()] == 0 {
                    ready.push_back(next);
                }
            }
        }

        if order.len() < self.graph.node_count() {
            let culprit = match toposort(&self.graph, None) {
                Err(cycle) => Some(cycle.node_id()),
                Ok(_) => self.graph.node_indices().find(|n| pending[n.index()] > 0),
            };
            let net = culprit
                .map(|node| flat.net_name(flat.cells[self.graph[node]].output).to_string())
                .unwrap_or_default();
            return Err(StructuralError::CombinationalLoop { net });
        }

        debug!("Evaluation order covers {} combinational cells", order.len());
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::HierarchyResolver;
    use gatewise_netlist::{default_library, Netlist};
    use serde_json::json;

    fn flatten(value: serde_json::Value) -> FlatDesign {
        let netlist = Netlist::from_yosys_str(&value.to_string(), &default_library()).unwrap();
        let top = netlist.module_by_name("top").unwrap();
        HierarchyResolver::new(&netlist).resolve(top).unwrap()
    }

    #[test]
    fn chain_is_ordered_by_dependency() {
        // y = !(a & b), cells declared in reverse dependency order.
        let flat = flatten(json!({
            "modules": { "top": {
                "ports": {
                    "a": { "direction": "input", "bits": [2] },
                    "b": { "direction": "input", "bits": [3] },
                    "y": { "direction": "output", "bits": [5] }
                },
                "cells": {
                    "g0": { "type": "NOT", "connections": { "A": [4], "Y": [5] } },
                    "g1": { "type": "AND", "connections": { "A": [2], "B": [3], "Y": [4] } }
                },
                "netnames": { "t": { "bits": [4] } }
            }}
        }));
        let graph = SignalGraph::build(&flat);
        let order = graph.evaluation_order(&flat).unwrap();
        let names: Vec<_> = order.iter().map(|&i| flat.cells[i].function).collect();
        assert_eq!(
            names,
            vec![
                gatewise_netlist::CellFunction::And,
                gatewise_netlist::CellFunction::Not
            ]
        );
    }

    #[test]
    fn register_breaks_feedback() {
        // q toggles through an inverter: q -> NOT -> d -> DFF -> q.
        let flat = flatten(json!({
            "modules": { "top": {
                "ports": {
                    "clk": { "direction": "input", "bits": [2] },
                    "q": { "direction": "output", "bits": [3] }
                },
                "cells": {
                    "inv": { "type": "NOT", "connections": { "A": [3], "Y": [4] } },
                    "ff": { "type": "DFF", "connections": { "C": [2], "D": [4], "Q": [3] } }
                },
                "netnames": { "d": { "bits": [4] } }
            }}
        }));
        let graph = SignalGraph::build(&flat);
        let order = graph.evaluation_order(&flat).unwrap();
        assert_eq!(order.len(), 1);
        assert_eq!(flat.cells[order[0]].function, gatewise_netlist::CellFunction::Not);
    }

    #[test]
    fn combinational_loop_is_detected() {
        let flat = flatten(json!({
            "modules": { "top": {
                "ports": {
                    "a": { "direction": "input", "bits": [2] },
                    "y": { "direction": "output", "bits": [3] }
                },
                "cells": {
                    "g0": { "type": "AND", "connections": { "A": [2], "B": [4], "Y": [3] } },
                    "g1": { "type": "BUF", "connections": { "A": [3], "Y": [4] } }
                },
                "netnames": { "fb": { "bits": [4] } }
            }}
        }));
        let graph = SignalGraph::build(&flat);
        let err = graph.evaluation_order(&flat).unwrap_err();
        let StructuralError::CombinationalLoop { net } = err;
        assert!(net == "top.y" || net == "top.fb", "unexpected net {net}");
    }
}
