//! Sugar Runtime - Orchestration layer for the Sugar interaction framework.
//!
//! This crate provides:
//! - Layered configuration loading (`ConfigLoader`, `SugarConfig`)
//! - Logging initialization (`LoggingBuilder`, `init_from_config`)
//! - The event loop (`SugarRuntime`), spawning one dispatch per interaction
//!
//! ```ignore
//! use sugar_runtime::SugarRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = SugarRuntime::builder().build(registry)?;
//!     let (sender, receiver) = runtime.channel();
//!
//!     tokio::spawn(platform.forward_into(sender));
//!
//!     // Run until Ctrl+C
//!     runtime.run(receiver).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

// Re-exports
pub use config::{
    ConfigError, ConfigLoader, ConfigResult, DispatchConfig, LoggingConfig, RuntimeConfig,
    SugarConfig,
};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{FmtSpan, LoggingBuilder, init_from_config};
pub use runtime::{
    InteractionReceiver, InteractionSender, RuntimeBuilder, RuntimeStats, SugarRuntime,
};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// This provides the commonly used logging macros alongside the runtime
/// entry points.
pub mod prelude {
    pub use super::{SugarConfig, SugarRuntime};
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
