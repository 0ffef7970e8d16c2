//! Shared utilities for reissuance nodes.

pub mod logging;

pub use logging::{init_logging, init_test_tracing, LogFormat, UnknownLogFormat};
