//! Embedded-controller fan driver for ASUS A8J-class laptops.
//!
//! Manual fan control takes two firmware calls:
//!
//! 1. `\_TZ.WTML(max_temp, 0)` registers the highest temperature manual
//!    control is allowed to run at.  Above it the firmware drops manual
//!    mode on its own and returns the fan to automatic control.
//! 2. `\_SB.ATKD.ECRW(word)` writes the fan speed register, with the
//!    level packed as `(0x84 << 16) | (level << 8) | 0xC4`.
//!
//! The firmware may leave manual mode at any time, so the limit is
//! re-registered with every level write.
//!
//! ## Safety contract
//!
//! Levels at roughly 85 and below stop the fan.  This driver writes what
//! it is told; the zone table decides what is safe.

use log::warn;

use crate::adapters::acpi_call::{AcpiBus, AcpiError};

/// Manual-control temperature limit method.
pub const EC_TEMP_LIMIT: &str = "\\_TZ.WTML";
/// EC register read/write method.
pub const EC_READ_WRITE: &str = "\\_SB.ATKD.ECRW";

const ECRW_WRITE_CMD: u64 = 0x84;
const ECRW_FAN_REG: u64 = 0xC4;

/// Pack a fan level into the ECRW command word.
pub const fn ecrw_word(level: u8) -> u64 {
    (ECRW_WRITE_CMD << 16) + ((level as u64) << 8) + ECRW_FAN_REG
}

/// Which firmware step failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcFanError {
    Limit(AcpiError),
    Write(AcpiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanMode {
    /// Firmware-managed.
    Automatic,
    /// Last written level.
    Manual { level: u8 },
}

pub struct EcFanDriver<B> {
    bus: B,
    mode: FanMode,
}

impl<B: AcpiBus> EcFanDriver<B> {
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            mode: FanMode::Automatic,
        }
    }

    /// Register `limit_c` and write `level`.
    ///
    /// The level is written even if the limit registration fails.  A write
    /// failure is reported in preference to a limit failure.
    pub fn set_level(&mut self, level: u8, limit_c: i32) -> Result<(), EcFanError> {
        let limit = self.register_limit(limit_c);
        if let Err(e) = limit {
            warn!("EC fan: {} failed: {}", EC_TEMP_LIMIT, e);
        }

        self.bus
            .evaluate(EC_READ_WRITE, &[ecrw_word(level)])
            .map_err(|e| {
                warn!("EC fan: {} failed: {}", EC_READ_WRITE, e);
                EcFanError::Write(e)
            })?;
        self.mode = FanMode::Manual { level };

        limit.map_err(EcFanError::Limit)
    }

    /// Register `limit_c` without writing a level, letting the firmware
    /// take the fan back once it sees the zone above the limit.
    pub fn release(&mut self, limit_c: i32) -> Result<(), EcFanError> {
        self.register_limit(limit_c).map_err(EcFanError::Limit)?;
        self.mode = FanMode::Automatic;
        Ok(())
    }

    pub fn mode(&self) -> FanMode {
        self.mode
    }

    fn register_limit(&mut self, limit_c: i32) -> Result<(), AcpiError> {
        // WTML takes an unsigned integer; a negative limit would wrap.
        let limit = u64::try_from(limit_c.max(0)).unwrap_or(0);
        self.bus.evaluate(EC_TEMP_LIMIT, &[limit, 0]).map(|_| ())
    }
}
