//! Zone table and hysteresis selection.

pub mod hysteresis;
pub mod zones;

pub use hysteresis::{Selection, ZoneSelector};
pub use zones::{ZoneEntry, ZoneTable};
