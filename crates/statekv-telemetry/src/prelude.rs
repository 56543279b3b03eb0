//! Commonly used types for convenient import.
//!
//! ```rust,no_run
//! use statekv_telemetry::prelude::*;
//!
//! # fn main() -> TelemetryResult<()> {
//! setup_logging(&LogConfig::new("debug").with_format(LogFormat::Pretty))?;
//! # Ok(())
//! # }
//! ```

pub use crate::{LogConfig, LogFormat, LogTarget, TelemetryError, TelemetryResult};
pub use crate::{setup_default_logging, setup_logging};
