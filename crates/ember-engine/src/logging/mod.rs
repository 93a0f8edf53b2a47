//! Logger initialization.
//!
//! The crate itself only talks to the `log` facade; this sets up `env_logger`
//! for binaries and tests that want output.

mod init;

pub use init::{init_logging, LoggingConfig};
