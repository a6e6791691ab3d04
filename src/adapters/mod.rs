//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements                        | Connects to                |
//! |-------------|-----------------------------------|----------------------------|
//! | `acpi_call` | AcpiBus                           | `/proc/acpi/call`          |
//! | `hardware`  | TemperatureSource, ActuatorSink   | thermal zone, EC fan       |
//! | `log_sink`  | EventSink                         | `log` facade               |
//! | `sim`       | TemperatureSource, ActuatorSink   | in-process thermal model   |

pub mod acpi_call;
pub mod hardware;
pub mod log_sink;
pub mod sim;
