//! Zero-delay combinational settle.
//!
//! A single pass over the topological order leaves every combinational net
//! consistent with its inputs. Register outputs are only read here, never
//! written.

use crate::hierarchy::{FlatCell, Operand};
use crate::toggle::ToggleTracker;
use gatewise_common::Bit;
use tracing::trace;

/// Reads an operand from net storage.
pub fn read(tracker: &ToggleTracker, operand: Operand) -> Bit {
    match operand {
        Operand::Net(net) => tracker.value(net),
        Operand::Const(value) => value,
    }
}

/// Evaluates combinational cells in a fixed dependency order.
#[derive(Debug, Clone)]
pub struct EvaluationEngine {
    order: Vec<usize>,
    scratch: Vec<Bit>,
}

impl EvaluationEngine {
    /// Creates an engine over an evaluation order from
    /// [`SignalGraph::evaluation_order`](crate::graph::SignalGraph::evaluation_order).
    pub fn new(order: Vec<usize>) -> Self {
        Self {
            order,
            scratch: Vec::new(),
        }
    }

    /// Recomputes every combinational net. Returns the number of nets whose
    /// value changed.
    pub fn settle(&mut self, cells: &[FlatCell], tracker: &mut ToggleTracker) -> usize {
        let mut changed = 0;
        for &index in &self.order {
            let cell = &cells[index];
            self.scratch.clear();
            self.scratch
                .extend(cell.inputs.iter().map(|&operand| read(tracker, operand)));
            if tracker.write(cell.output, cell.function.eval(&self.scratch)) {
                changed += 1;
            }
        }
        trace!("Settled {} cells, {} nets changed", self.order.len(), changed);
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::{FlatNetId, InstanceId};
    use gatewise_common::Ident;
    use gatewise_netlist::CellFunction;

    fn cell(function: CellFunction, inputs: Vec<Operand>, output: u32) -> FlatCell {
        FlatCell {
            instance: InstanceId::TOP,
            name: Ident::from_raw(0),
            cell_type: Ident::from_raw(0),
            function,
            inputs,
            output: FlatNetId::from_raw(output),
        }
    }

    fn net(i: u32) -> Operand {
        Operand::Net(FlatNetId::from_raw(i))
    }

    #[test]
    fn single_pass_settles_chain() {
        // n2 = n0 & n1; n3 = !n2
        let cells = vec![
            cell(CellFunction::And, vec![net(0), net(1)], 2),
            cell(CellFunction::Not, vec![net(2)], 3),
        ];
        let mut tracker = ToggleTracker::new(4);
        let mut engine = EvaluationEngine::new(vec![0, 1]);

        assert_eq!(engine.settle(&cells, &mut tracker), 1);
        assert_eq!(tracker.value(FlatNetId::from_raw(3)), Bit::One);

        tracker.write(FlatNetId::from_raw(0), Bit::One);
        tracker.write(FlatNetId::from_raw(1), Bit::One);
        assert_eq!(engine.settle(&cells, &mut tracker), 2);
        assert_eq!(tracker.value(FlatNetId::from_raw(2)), Bit::One);
        assert_eq!(tracker.value(FlatNetId::from_raw(3)), Bit::Zero);
    }

    #[test]
    fn second_settle_changes_nothing() {
        let cells = vec![cell(CellFunction::Nor, vec![net(0), net(1)], 2)];
        let mut tracker = ToggleTracker::new(3);
        let mut engine = EvaluationEngine::new(vec![0]);
        engine.settle(&cells, &mut tracker);
        assert_eq!(engine.settle(&cells, &mut tracker), 0);
        assert_eq!(tracker.counts(FlatNetId::from_raw(2)).total(), 1);
    }

    #[test]
    fn constants_feed_cells() {
        let cells = vec![cell(
            CellFunction::Or,
            vec![net(0), Operand::Const(Bit::One)],
            1,
        )];
        let mut tracker = ToggleTracker::new(2);
        EvaluationEngine::new(vec![0]).settle(&cells, &mut tracker);
        assert_eq!(tracker.value(FlatNetId::from_raw(1)), Bit::One);
    }
}
