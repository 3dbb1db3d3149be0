//! Process-level plumbing shared by binaries: layered configuration and logging setup.

pub mod config;
pub mod logging;

pub use config::{AppConfig, CliArgs, LoggingConfig, Section};
pub use logging::init_logging_from_config;
