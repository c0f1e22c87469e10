//! # crashlabel utilities
//!
//! Shared utilities for the crashlabel workspace, currently the logging set-up
//! built on `tracing`.

pub mod logging;

// Re-export commonly used logging functions for convenience
pub use logging::{
    init_logging, init_logging_for_host, init_logging_with_level, LogFormat, LogLevel, LoggingError, LoggingGuard,
};
pub use tracing::{debug, error, info, trace, warn};
