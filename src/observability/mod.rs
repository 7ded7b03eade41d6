//! # Observability
//!
//! Structured logging for the suite. Every fixture and scenario reports
//! through `tracing`; this module owns subscriber setup.

pub mod logging;

pub use logging::{init_logging, log_config_info};
