//! statekv Telemetry - logging setup for statekv hosts.
//!
//! Storage crates only emit `tracing` events. This crate installs the
//! global subscriber that renders them.
//!
//! # Example
//!
//! ```rust,no_run
//! use statekv_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), statekv_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Json)
//!     .with_directive("statekv_storage=debug");
//!
//! setup_logging(&config)?;
//! tracing::info!("logging ready");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{LogConfig, LogFormat, LogTarget, setup_default_logging, setup_logging};
