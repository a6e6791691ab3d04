//! ACPI method evaluation through the `acpi_call` kernel module.
//!
//! The module exposes `/proc/acpi/call`: write a method path followed by
//! its integer arguments, then read the file back to get the result.
//!
//! ```text
//!   write  "\_TZ.WTML 0x4b 0x0"
//!   read   "0x0"                  integer result
//!          "Error: AE_NOT_FOUND"  evaluation failed
//!          "not called"           nothing was evaluated
//! ```
//!
//! The sensor and fan drivers only see the [`AcpiBus`] trait, so tests
//! substitute an in-memory bus.

use core::fmt;
use core::fmt::Write as _;
use std::io::ErrorKind;
use std::path::PathBuf;

use log::{debug, warn};

/// Default location of the `acpi_call` control file.
pub const ACPI_CALL_PATH: &str = "/proc/acpi/call";

/// Errors from evaluating an ACPI method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcpiError {
    /// `/proc/acpi/call` does not exist (module not loaded).
    Unavailable,
    /// Reading or writing the control file failed.
    Io,
    /// The interpreter reported an evaluation error.
    MethodFailed,
    /// The module reported that no call was made.
    NotCalled,
}

impl fmt::Display for AcpiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "acpi_call interface not available"),
            Self::Io => write!(f, "acpi_call I/O error"),
            Self::MethodFailed => write!(f, "method evaluation failed"),
            Self::NotCalled => write!(f, "method not called"),
        }
    }
}

impl std::error::Error for AcpiError {}

/// Evaluates ACPI control methods with integer arguments.
pub trait AcpiBus {
    /// Evaluate `method` with `args`.
    ///
    /// Returns `Ok(Some(value))` for an integer result and `Ok(None)` when
    /// the method succeeded without returning an integer.
    fn evaluate(&mut self, method: &str, args: &[u64]) -> Result<Option<u64>, AcpiError>;
}

impl<B: AcpiBus + ?Sized> AcpiBus for &mut B {
    fn evaluate(&mut self, method: &str, args: &[u64]) -> Result<Option<u64>, AcpiError> {
        (**self).evaluate(method, args)
    }
}

/// [`AcpiBus`] backed by the `/proc/acpi/call` file.
#[derive(Debug, Clone)]
pub struct ProcAcpiCall {
    path: PathBuf,
}

impl Default for ProcAcpiCall {
    fn default() -> Self {
        Self::new(ACPI_CALL_PATH)
    }
}

impl ProcAcpiCall {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Whether the control file exists.
    pub fn is_available(&self) -> bool {
        self.path.exists()
    }
}

impl AcpiBus for ProcAcpiCall {
    fn evaluate(&mut self, method: &str, args: &[u64]) -> Result<Option<u64>, AcpiError> {
        let request = format_request(method, args);
        debug!("ACPI: {}", request);

        std::fs::write(&self.path, request.as_bytes()).map_err(|e| match e.kind() {
            ErrorKind::NotFound => AcpiError::Unavailable,
            _ => AcpiError::Io,
        })?;

        let response = std::fs::read_to_string(&self.path).map_err(|_| AcpiError::Io)?;
        let result = parse_response(&response);
        if let Err(e) = result {
            warn!("ACPI: {} -> {} ({:?})", method, e, response.trim_end_matches('\0').trim());
        }
        result
    }
}

/// Build the line written to the control file.
pub fn format_request(method: &str, args: &[u64]) -> String {
    let mut line = String::from(method);
    for arg in args {
        let _ = write!(line, " {arg:#x}");
    }
    line
}

/// Interpret the text read back from the control file.
pub fn parse_response(raw: &str) -> Result<Option<u64>, AcpiError> {
    let text = raw.trim_end_matches('\0').trim();

    if text.starts_with("Error") {
        return Err(AcpiError::MethodFailed);
    }
    if text == "not called" {
        return Err(AcpiError::NotCalled);
    }

    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => Ok(u64::from_str_radix(hex, 16).ok()),
        // Buffers, strings, packages: the call ran but returned no integer.
        None => Ok(None),
    }
}
