//! # Sugar Framework
//!
//! The dispatch engine for interaction-based bots.
//!
//! This layer provides:
//! - Context threading and the middleware contract (continue, stop, abort)
//! - Sequential middleware chains with per-dispatch cursors
//! - Builders producing immutable handler definitions
//! - A partitioned, read-only registry
//! - The dispatcher, with a single error boundary and a `tower::Service` impl
//!
//! Configuration, logging setup and the event loop live in `sugar-runtime`.

pub mod builder;
pub mod chain;
pub mod context;
pub mod definition;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod registry;

pub use builder::{
    CommandBuilder, ComponentBuilder, SlashCommandBuilder, component, message_command,
    slash_command, user_command,
};
pub use chain::{ChainOutcome, MiddlewareChain};
pub use context::Context;
pub use definition::{HandlerConfig, HandlerDefinition};
pub use dispatcher::{DispatchOptions, DispatchOutcome, Dispatcher, DispatcherBuilder};
pub use error::{ContextError, ContextResult, DispatchError};
pub use handler::{
    BoxedAutocomplete, BoxedHandler, HandlerResponse, into_autocomplete, into_handler,
};
pub use middleware::{
    BoxedMiddleware, Flow, GuildOnly, IntoFlow, Middleware, MiddlewareResult, guild_only,
    into_middleware,
};
pub use registry::{CommandManifest, Registry, RegistryBuilder};
pub use tower::BoxError;

/// Prelude for common imports.
pub mod prelude {
    pub use super::{
        BoxError, CommandBuilder, ComponentBuilder, Context, DispatchOutcome, Dispatcher, Flow,
        HandlerDefinition, Middleware, Registry, component, guild_only, message_command,
        slash_command, user_command,
    };
    pub use sugar_core::prelude::*;
}
