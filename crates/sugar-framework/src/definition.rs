//! Finished handler definitions.
//!
//! A [`HandlerDefinition`] is the immutable record the registry stores: a
//! routing key, the partition it belongs to, an ordered middleware list, the
//! terminal handler and, for slash commands, an optional autocomplete
//! callback. Definitions are usually produced by the builders in
//! [`crate::builder`], which accumulate a [`HandlerConfig`] and finalize it.

use std::fmt;

use sugar_core::{HandlerKind, custom_id};

use crate::chain::MiddlewareChain;
use crate::handler::{BoxedAutocomplete, BoxedHandler};
use crate::middleware::BoxedMiddleware;

/// The plain configuration a builder accumulates.
///
/// Everything except the terminal handler, which is supplied to
/// [`finalize`](Self::finalize).
#[derive(Clone)]
pub struct HandlerConfig {
    /// Command name or base custom ID.
    pub routing_key: String,
    /// Registry partition.
    pub kind: HandlerKind,
    /// Human-readable description, used for the command manifest.
    pub description: Option<String>,
    /// Middlewares in registration order.
    pub middlewares: Vec<BoxedMiddleware>,
    /// Autocomplete callback. Ignored unless `kind` is a slash command.
    pub autocomplete: Option<BoxedAutocomplete>,
}

impl HandlerConfig {
    /// Creates an empty configuration for `kind`.
    pub fn new(kind: HandlerKind, routing_key: impl Into<String>) -> Self {
        Self {
            routing_key: routing_key.into(),
            kind,
            description: None,
            middlewares: Vec::new(),
            autocomplete: None,
        }
    }

    /// Produces the immutable definition.
    pub fn finalize(self, execute: BoxedHandler) -> HandlerDefinition {
        let autocomplete = match self.kind {
            HandlerKind::SlashCommand => self.autocomplete,
            _ => None,
        };
        HandlerDefinition {
            routing_key: self.routing_key,
            kind: self.kind,
            description: self.description,
            middlewares: self.middlewares,
            execute,
            autocomplete,
        }
    }
}

impl fmt::Debug for HandlerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerConfig")
            .field("routing_key", &self.routing_key)
            .field("kind", &self.kind)
            .field("description", &self.description)
            .field("middlewares", &self.middlewares.len())
            .field("autocomplete", &self.autocomplete.is_some())
            .finish()
    }
}

/// An immutable handler definition.
pub struct HandlerDefinition {
    routing_key: String,
    kind: HandlerKind,
    description: Option<String>,
    middlewares: Vec<BoxedMiddleware>,
    execute: BoxedHandler,
    autocomplete: Option<BoxedAutocomplete>,
}

impl HandlerDefinition {
    /// Returns the command name or base custom ID.
    pub fn routing_key(&self) -> &str {
        &self.routing_key
    }

    /// Returns the registry partition.
    pub fn kind(&self) -> HandlerKind {
        self.kind
    }

    /// Returns the description, if one was set.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the middlewares in registration order.
    pub fn middlewares(&self) -> &[BoxedMiddleware] {
        &self.middlewares
    }

    /// Returns a fresh chain over this definition's middlewares.
    pub fn chain(&self) -> MiddlewareChain<'_> {
        MiddlewareChain::new(&self.middlewares)
    }

    /// Returns the terminal handler.
    pub fn execute(&self) -> &BoxedHandler {
        &self.execute
    }

    /// Returns the autocomplete callback, if any.
    pub fn autocomplete(&self) -> Option<&BoxedAutocomplete> {
        self.autocomplete.as_ref()
    }

    /// Materializes an encoded identifier carrying `args`.
    ///
    /// Meant for component definitions; the routing key and every argument
    /// are escaped.
    ///
    /// ```rust,ignore
    /// let pong = component("pong").handler(pong_handler);
    /// assert_eq!(pong.custom_id_with(["Al&ice"]), "pong?Al$a;ice");
    /// ```
    pub fn custom_id_with<I, S>(&self, args: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        custom_id::compose(&self.routing_key, args)
    }
}

impl fmt::Debug for HandlerDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerDefinition")
            .field("routing_key", &self.routing_key)
            .field("kind", &self.kind)
            .field("middlewares", &self.middlewares.len())
            .field("autocomplete", &self.autocomplete.is_some())
            .finish_non_exhaustive()
    }
}
