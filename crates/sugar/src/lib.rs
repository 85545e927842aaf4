//! # Sugar
//!
//! Stateless interaction dispatch for Discord-style bots.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌─────────────┐     ┌────────────┐     ┌──────────────────────────┐
//! │   Platform   │────▶│   Runtime   │────▶│ Dispatcher │────▶│ middleware ▶ … ▶ handler │
//! │ (gateway/WS) │     │ (task/event)│     │ (registry) │     └──────────────────────────┘
//! └──────────────┘     └─────────────┘     └────────────┘
//! ```
//!
//! - **Core**: the custom ID codec, ID generation and the `Interaction` trait
//! - **Framework**: context, middlewares, builders, registry, dispatcher
//! - **Runtime**: configuration, logging and the event loop
//!
//! Components carry their own state in the custom ID, so a button created
//! by a previous process still routes to its handler with its arguments:
//!
//! ```rust,ignore
//! use sugar::prelude::*;
//!
//! let pong = component("pong").handler(|ctx: Context| async move {
//!     Ok::<_, BoxError>(format!("Pong! by {}", ctx.arg(0)?))
//! });
//! let button_id = pong.custom_id_with(["Al&ice"]); // "pong?Al$a;ice"
//!
//! let registry = Registry::builder()
//!     .register(slash_command("ping").handler(|_ctx: Context| async { "Pong!" }))
//!     .register(pong)
//!     .build();
//!
//! let runtime = SugarRuntime::builder().build(registry)?;
//! let (sender, receiver) = runtime.channel();
//! runtime.run(receiver).await?;
//! ```
//!
//! ## Features
//!
//! - `toml-config`: TOML configuration files (default)
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output

pub use sugar_core as core;
pub use sugar_framework as framework;
pub use sugar_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use sugar::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use sugar_runtime::{SugarConfig, SugarRuntime};

    // Definitions and dispatch
    pub use sugar_framework::prelude::*;
    pub use sugar_framework::{DispatchError, HandlerResponse, IntoFlow};
}
