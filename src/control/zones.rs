//! Temperature zone table.
//!
//! An ordered list of `(threshold, level)` pairs.  Thresholds and levels
//! both increase strictly; the last threshold is the ceiling at and above
//! which manual fan control is handed back to the firmware.
//!
//! ```text
//!   zone 0        zone 1        zone 2            relinquish
//!  ───────────┬─────────────┬─────────────────┬──────────────▶ °C
//!            60            65                75 (ceiling)
//! ```
//!
//! Storage is a fixed-capacity `heapless::Vec`; the table is built once at
//! startup and only read afterwards.

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Upper bound on the number of zones a table can hold.
pub const MAX_ZONES: usize = 8;

/// One row of the zone table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneEntry {
    /// Zone boundary in degrees Celsius.
    pub threshold_c: i32,
    /// Fan level written while in this zone (0-255).
    pub level: u8,
}

impl ZoneEntry {
    pub const fn new(threshold_c: i32, level: u8) -> Self {
        Self { threshold_c, level }
    }
}

/// Reference table for the A8J-class EC fan.  Levels around 85 and below
/// stop the fan entirely.
pub const REFERENCE_ZONES: [ZoneEntry; 4] = [
    ZoneEntry::new(60, 100),
    ZoneEntry::new(65, 120),
    ZoneEntry::new(70, 140),
    ZoneEntry::new(75, 160),
];

const fn rows_are_valid(rows: &[ZoneEntry]) -> bool {
    if rows.len() < 2 || rows.len() > MAX_ZONES {
        return false;
    }
    let mut i = 1;
    while i < rows.len() {
        if rows[i].threshold_c <= rows[i - 1].threshold_c || rows[i].level <= rows[i - 1].level {
            return false;
        }
        i += 1;
    }
    true
}

const _: () = assert!(
    rows_are_valid(&REFERENCE_ZONES),
    "REFERENCE_ZONES must be a valid zone table"
);

/// [`REFERENCE_ZONES`] as table storage.
pub(crate) fn reference_rows() -> Vec<ZoneEntry, MAX_ZONES> {
    let mut zones = Vec::new();
    // Fits: checked at compile time above.
    let _ = zones.extend_from_slice(&REFERENCE_ZONES);
    zones
}

/// Validated, immutable zone table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneTable {
    zones: Vec<ZoneEntry, MAX_ZONES>,
}

impl ZoneTable {
    /// Build a table, rejecting anything that is not strictly increasing
    /// in both threshold and level or that has fewer than two rows.
    pub fn new(entries: &[ZoneEntry]) -> Result<Self, ConfigError> {
        if entries.len() < 2 {
            return Err(ConfigError::TooFewZones(entries.len()));
        }
        if entries.len() > MAX_ZONES {
            return Err(ConfigError::TooManyZones(entries.len()));
        }

        for (i, pair) in entries.windows(2).enumerate() {
            if pair[1].threshold_c <= pair[0].threshold_c {
                return Err(ConfigError::ThresholdsNotIncreasing(i + 1));
            }
            if pair[1].level <= pair[0].level {
                return Err(ConfigError::LevelsNotIncreasing(i + 1));
            }
        }

        let mut zones = Vec::new();
        // Length was checked against MAX_ZONES above.
        let _ = zones.extend_from_slice(entries);
        Ok(Self { zones })
    }

    /// The reference four-zone table.
    pub fn reference() -> Self {
        Self {
            zones: reference_rows(),
        }
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    /// Threshold of zone `i`.  Panics if `i >= zone_count()`.
    pub fn threshold(&self, i: usize) -> i32 {
        self.zones[i].threshold_c
    }

    /// Level of zone `i`.  Panics if `i >= zone_count()`.
    pub fn level(&self, i: usize) -> u8 {
        self.zones[i].level
    }

    /// Temperature at and above which control is relinquished.
    pub fn ceiling_threshold(&self) -> i32 {
        self.threshold(self.zone_count() - 1)
    }

    /// Highest zone index the selector can choose below the ceiling.
    pub fn highest_controllable(&self) -> usize {
        self.zone_count() - 2
    }
}
