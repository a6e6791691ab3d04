//! Zone selection with asymmetric hysteresis.
//!
//! Rising temperature moves to a hotter zone immediately.  Falling
//! temperature only drops to a cooler zone once it is more than the
//! margin below that cooler zone's own threshold, which keeps the fan
//! from hunting when the reading sits on a boundary.
//!
//! The margin is measured against `threshold(raw_zone)`, not against the
//! boundary actually being crossed.

use super::zones::ZoneTable;

/// Reference hysteresis margin in degrees Celsius.
pub const DEFAULT_HYSTERESIS_C: i32 = 3;

/// Outcome of one selection step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Drive the fan at `level`.  `held` is true when hysteresis kept the
    /// previous zone instead of stepping down.
    Zone { index: usize, level: u8, held: bool },
    /// At or above the ceiling: hand the fan back to the firmware.
    Relinquish,
}

impl Selection {
    /// Zone index to remember for the next tick, if any.
    pub fn zone_index(&self) -> Option<usize> {
        match self {
            Self::Zone { index, .. } => Some(*index),
            Self::Relinquish => None,
        }
    }
}

/// Stateless selector; the previous zone is owned by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneSelector {
    margin_c: i32,
}

impl Default for ZoneSelector {
    fn default() -> Self {
        Self::new(DEFAULT_HYSTERESIS_C)
    }
}

impl ZoneSelector {
    pub fn new(margin_c: i32) -> Self {
        Self { margin_c }
    }

    pub fn margin(&self) -> i32 {
        self.margin_c
    }

    /// Zone a temperature falls into ignoring hysteresis: the first zone
    /// whose threshold is above `temp_c`, capped at the highest zone below
    /// the ceiling.
    pub fn raw_zone(table: &ZoneTable, temp_c: i32) -> usize {
        let top = table.highest_controllable();
        (0..top)
            .find(|&i| temp_c < table.threshold(i))
            .unwrap_or(top)
    }

    /// Pick the zone for `temp_c` given the zone chosen on the previous
    /// tick.
    ///
    /// `previous` must lie in `0..=table.highest_controllable()`.
    pub fn select(&self, table: &ZoneTable, temp_c: i32, previous: usize) -> Selection {
        debug_assert!(
            previous <= table.highest_controllable(),
            "previous zone {previous} out of range"
        );

        if temp_c >= table.ceiling_threshold() {
            return Selection::Relinquish;
        }

        let raw = Self::raw_zone(table, temp_c);

        if raw < previous && temp_c > table.threshold(raw) - self.margin_c {
            Selection::Zone {
                index: previous,
                level: table.level(previous),
                held: true,
            }
        } else {
            Selection::Zone {
                index: raw,
                level: table.level(raw),
                held: false,
            }
        }
    }
}
