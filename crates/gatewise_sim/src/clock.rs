//! Clocked stepping and reset.
//!
//! The design has one clock domain. An edge is abstract: the clock net is
//! never pulsed. Every register samples its inputs from a settled network and
//! all samples are committed together, so no register sees another's new
//! value within the same edge.

use crate::engine::{read, EvaluationEngine};
use crate::error::ConfigError;
use crate::hierarchy::{FlatCell, FlatNetId};
use crate::toggle::ToggleTracker;
use gatewise_common::Bit;
use tracing::trace;

/// Reset line state between calls.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ClockState {
    /// No special signal asserted.
    #[default]
    Idle,
    /// The reset net is held at 1.
    ResetAsserted,
}

/// Owns the clock/reset assignment and the register list.
#[derive(Debug, Clone)]
pub struct ClockController {
    clock: Option<FlatNetId>,
    reset: Option<FlatNetId>,
    registers: Vec<usize>,
    sampled: Vec<Bit>,
    state: ClockState,
}

impl ClockController {
    /// Collects the sequential cells of a flat cell list.
    pub fn new(cells: &[FlatCell]) -> Self {
        let registers: Vec<usize> = cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.function.is_sequential())
            .map(|(i, _)| i)
            .collect();
        Self {
            clock: None,
            reset: None,
            sampled: Vec::with_capacity(registers.len()),
            registers,
            state: ClockState::Idle,
        }
    }

    /// Assigns the clock net.
    pub fn set_clock(&mut self, net: Option<FlatNetId>) {
        self.clock = net;
    }

    /// Assigns the reset net.
    pub fn set_reset(&mut self, net: Option<FlatNetId>) {
        self.reset = net;
    }

    /// Returns the current state.
    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Returns the number of registers.
    pub fn register_count(&self) -> usize {
        self.registers.len()
    }

    /// Performs one clock edge: settle, sample every register, commit all
    /// samples, settle again. A held reset is released after the edge.
    pub fn eval_clocked(
        &mut self,
        cells: &[FlatCell],
        engine: &mut EvaluationEngine,
        tracker: &mut ToggleTracker,
    ) -> Result<(), ConfigError> {
        if self.clock.is_none() {
            return Err(ConfigError::MissingClock);
        }
        self.edge(cells, engine, tracker);
        if let (ClockState::ResetAsserted, Some(reset)) = (self.state, self.reset) {
            tracker.write(reset, Bit::Zero);
            engine.settle(cells, tracker);
            self.state = ClockState::Idle;
            trace!("Reset released");
        }
        Ok(())
    }

    /// Drives the reset net to 1 and settles. The reset stays asserted until
    /// the next clocked step.
    pub fn assert_reset(
        &mut self,
        cells: &[FlatCell],
        engine: &mut EvaluationEngine,
        tracker: &mut ToggleTracker,
    ) -> Result<(), ConfigError> {
        let (Some(_), Some(reset)) = (self.clock, self.reset) else {
            return Err(ConfigError::MissingClockOrReset);
        };
        tracker.write(reset, Bit::One);
        engine.settle(cells, tracker);
        self.state = ClockState::ResetAsserted;
        trace!("Reset asserted");
        Ok(())
    }

    /// Asserts reset, performs one edge, then releases reset and settles.
    pub fn reset_clocked(
        &mut self,
        cells: &[FlatCell],
        engine: &mut EvaluationEngine,
        tracker: &mut ToggleTracker,
    ) -> Result<(), ConfigError> {
        self.assert_reset(cells, engine, tracker)?;
        self.eval_clocked(cells, engine, tracker)
    }

    /// Drives every net to 0 without an edge or a settle.
    pub fn reset(&mut self, tracker: &mut ToggleTracker) {
        for index in 0..tracker.len() {
            tracker.write(FlatNetId::from_raw(index as u32), Bit::Zero);
        }
        self.state = ClockState::Idle;
        trace!("Zeroed {} nets", tracker.len());
    }

    fn edge(
        &mut self,
        cells: &[FlatCell],
        engine: &mut EvaluationEngine,
        tracker: &mut ToggleTracker,
    ) {
        engine.settle(cells, tracker);

        self.sampled.clear();
        let mut inputs = Vec::new();
        for &index in &self.registers {
            let cell = &cells[index];
            inputs.clear();
            inputs.extend(cell.inputs.iter().map(|&operand| read(tracker, operand)));
            let q = tracker.value(cell.output);
            self.sampled.push(cell.function.next_state(&inputs, q));
        }

        let mut committed = 0;
        for (&index, &value) in self.registers.iter().zip(&self.sampled) {
            if tracker.write(cells[index].output, value) {
                committed += 1;
            }
        }
        trace!(
            "Edge: {} registers sampled, {} changed",
            self.registers.len(),
            committed
        );

        engine.settle(cells, tracker);
    }
}
