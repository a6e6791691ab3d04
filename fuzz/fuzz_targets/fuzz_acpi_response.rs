//! Fuzz target: `/proc/acpi/call` response parsing
//!
//! Feeds arbitrary text through `parse_response` and the thermal zone
//! encoding, verifying:
//! - No panics under arbitrary input
//! - Integer responses convert to Celsius or report `Malformed`
//!
//! cargo fuzz run fuzz_acpi_response

#![no_main]

use libfuzzer_sys::fuzz_target;
use zonefan::adapters::acpi_call::parse_response;
use zonefan::error::SensorError;
use zonefan::sensors::thermal::SensorEncoding;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };

    if let Ok(Some(raw)) = parse_response(text) {
        match SensorEncoding::DECI_KELVIN.to_celsius(raw) {
            Ok(_) | Err(SensorError::Malformed) => {}
            Err(e) => panic!("unexpected sensor error {e:?} for raw {raw}"),
        }
    }
});
