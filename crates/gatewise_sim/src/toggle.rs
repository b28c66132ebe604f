//! Net value storage with per-net transition counting.
//!
//! Every write to a flat net goes through [`ToggleTracker::write`], which
//! compares against the stored value and bumps the rising or falling counter
//! only on an actual change. Re-writing an identical value never counts.

use crate::hierarchy::FlatNetId;
use gatewise_common::Bit;

/// Rising and falling transition counts for one net or a group of nets.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ToggleCounts {
    /// Number of 0 to 1 transitions.
    pub rising: u64,
    /// Number of 1 to 0 transitions.
    pub falling: u64,
}

impl ToggleCounts {
    /// Returns `rising + falling`.
    pub fn total(self) -> u64 {
        self.rising + self.falling
    }
}

impl std::ops::AddAssign for ToggleCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.rising += rhs.rising;
        self.falling += rhs.falling;
    }
}

/// Current values and toggle counters of every flat net.
#[derive(Debug, Clone)]
pub struct ToggleTracker {
    values: Vec<Bit>,
    rising: Vec<u64>,
    falling: Vec<u64>,
}

impl ToggleTracker {
    /// Creates storage for `net_count` nets, all at 0 with zero counts.
    pub fn new(net_count: usize) -> Self {
        Self {
            values: vec![Bit::Zero; net_count],
            rising: vec![0; net_count],
            falling: vec![0; net_count],
        }
    }

    /// Returns the current value of a net.
    pub fn value(&self, net: FlatNetId) -> Bit {
        self.values[net.index()]
    }

    /// Stores a value, counting the transition if it differs from the
    /// current one. Returns `true` if the value changed.
    pub fn write(&mut self, net: FlatNetId, value: Bit) -> bool {
        let slot = &mut self.values[net.index()];
        match (*slot, value) {
            (Bit::Zero, Bit::One) => self.rising[net.index()] += 1,
            (Bit::One, Bit::Zero) => self.falling[net.index()] += 1,
            _ => return false,
        }
        *slot = value;
        true
    }

    /// Returns the counts of one net.
    pub fn counts(&self, net: FlatNetId) -> ToggleCounts {
        ToggleCounts {
            rising: self.rising[net.index()],
            falling: self.falling[net.index()],
        }
    }

    /// Sums the counts over a set of nets.
    pub fn sum<'a>(&self, nets: impl IntoIterator<Item = &'a FlatNetId>) -> ToggleCounts {
        let mut total = ToggleCounts::default();
        for &net in nets {
            total += self.counts(net);
        }
        total
    }

    /// Zeroes every counter, leaving values untouched.
    pub fn clear_counts(&mut self) {
        self.rising.fill(0);
        self.falling.fill(0);
    }

    /// Returns the number of tracked nets.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no nets are tracked.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
