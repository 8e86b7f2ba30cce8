// Copyright 2026 the Locus Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Notification threshold lists.
//!
//! Hosts only notify when a target's intersection ratio crosses one of the
//! requested thresholds. Both watchers request the same evenly spaced table,
//! so a finer table yields finer-grained notifications at the cost of more
//! callback traffic.

use alloc::vec::Vec;

/// Default number of steps between `0.0` and `1.0`.
pub const DEFAULT_STEPS: u32 = 1000;

/// An ascending list of intersection ratios `0, 1/N, 2/N, …, 1`.
#[derive(Clone, Debug, PartialEq)]
pub struct ThresholdTable {
    steps: u32,
    levels: Vec<f64>,
}

impl ThresholdTable {
    /// Builds the table for `steps` equal subdivisions.
    ///
    /// `steps == 0` is a configuration error; it is treated as `1` (table
    /// `[0.0, 1.0]`) in release builds.
    #[must_use]
    pub fn new(steps: u32) -> Self {
        debug_assert!(steps > 0, "threshold table needs at least one step");
        let steps = steps.max(1);
        let levels = (0..=steps)
            .map(|i| f64::from(i) / f64::from(steps))
            .collect();
        Self { steps, levels }
    }

    /// Number of subdivisions.
    #[must_use]
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// The threshold levels, ascending, starting at `0.0` and ending at `1.0`.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.levels
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self::new(DEFAULT_STEPS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_has_thousand_and_one_levels() {
        let table = ThresholdTable::default();
        assert_eq!(table.steps(), 1000);
        assert_eq!(table.as_slice().len(), 1001);
        assert_eq!(table.as_slice()[0], 0.0);
        assert_eq!(table.as_slice()[500], 0.5);
        assert_eq!(table.as_slice()[1000], 1.0);
    }

    #[test]
    fn levels_are_strictly_ascending() {
        let table = ThresholdTable::new(7);
        assert!(
            table.as_slice().windows(2).all(|w| w[0] < w[1]),
            "levels not ascending: {:?}",
            table.as_slice()
        );
    }

    #[test]
    fn quarter_steps() {
        let table = ThresholdTable::new(4);
        assert_eq!(table.as_slice(), &[0.0, 0.25, 0.5, 0.75, 1.0]);
    }
}
