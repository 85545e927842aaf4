//! Configuration module for the Sugar runtime.
//!
//! Layered loading (defaults, files, environment) of the logging, dispatch
//! and event-loop settings, plus validation of the merged result.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile};
pub use schema::{
    DispatchConfig, LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig, RuntimeConfig,
    SpanEventConfig, SugarConfig,
};
pub use validation::validate_config;
