//! Fuzz target: zone table construction and selection
//!
//! Builds tables from arbitrary rows and drives the selector with an
//! arbitrary temperature trace, verifying:
//! - Malformed tables are rejected, never panic
//! - The selected zone is always controllable
//! - Relinquish happens exactly at or above the ceiling
//!
//! cargo fuzz run fuzz_zone_selector

#![no_main]

use libfuzzer_sys::fuzz_target;
use zonefan::control::{Selection, ZoneEntry, ZoneSelector, ZoneTable};

fuzz_target!(|data: &[u8]| {
    let Some((&header, rest)) = data.split_first() else {
        return;
    };
    let rows = usize::from(header % 10);
    if rest.len() < rows * 2 {
        return;
    }
    let (row_bytes, trace) = rest.split_at(rows * 2);

    let entries: Vec<ZoneEntry> = row_bytes
        .chunks_exact(2)
        .map(|c| ZoneEntry::new(i32::from(c[0] as i8), c[1]))
        .collect();
    let Ok(table) = ZoneTable::new(&entries) else {
        return;
    };

    let selector = ZoneSelector::new(i32::from(header >> 4));
    let mut previous = 0;
    for &b in trace {
        let temp = i32::from(b as i8);
        match selector.select(&table, temp, previous) {
            Selection::Zone { index, level, .. } => {
                assert!(temp < table.ceiling_threshold());
                assert!(index <= table.highest_controllable());
                assert_eq!(level, table.level(index));
                previous = index;
            }
            Selection::Relinquish => assert!(temp >= table.ceiling_threshold()),
        }
    }
});
