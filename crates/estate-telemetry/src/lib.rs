//! # Estate Telemetry
//!
//! Structured logging for the estate ledger.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use estate_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     init_telemetry(&TelemetryConfig::from_env()).expect("Failed to init telemetry");
//!     // Ledger spans and events are now written to stdout
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `ESTATE_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `ESTATE_JSON_LOGS` | `false` | JSON output (`true` inside containers) |
//! | `ESTATE_CONSOLE_OUTPUT` | `true` | Write log output |
//! | `ESTATE_SERVICE_NAME` | `estate-ledger` | Service name |

#![warn(missing_docs)]

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{build_filter, init_logging};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    /// Level filter directive did not parse.
    #[error("Invalid log filter: {0}")]
    Filter(String),

    /// A global subscriber is already installed.
    #[error("Failed to install subscriber: {0}")]
    AlreadyInitialized(String),
}

/// Initialize logging for the process.
///
/// Call once at startup. A second call returns
/// [`TelemetryError::AlreadyInitialized`].
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    init_logging(config)
}
