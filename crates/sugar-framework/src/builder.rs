//! Builders producing [`HandlerDefinition`]s.
//!
//! Each builder accumulates a [`HandlerConfig`] and is finalized by
//! `.handler(f)`. Only [`SlashCommandBuilder`] offers `.autocomplete`, so an
//! autocomplete callback can never be attached to a definition that would
//! ignore it.
//!
//! # Example
//!
//! ```rust,ignore
//! use sugar_framework::prelude::*;
//!
//! let definitions = vec![
//!     slash_command("ping")
//!         .description("Replies with Pong!")
//!         .handler(|_ctx: Context| async { "Pong!" }),
//!     message_command("Quote")
//!         .middleware(guild_only("Servers only"))
//!         .handler(quote_handler),
//!     component("pong").handler(pong_handler),
//! ];
//! ```

use std::future::Future;

use sugar_core::{BoxedInteraction, HandlerKind, IdGenerator};

use crate::context::Context;
use crate::definition::{HandlerConfig, HandlerDefinition};
use crate::handler::{HandlerResponse, into_autocomplete, into_handler};
use crate::middleware::{Middleware, into_middleware};

macro_rules! shared_builder_methods {
    () => {
        /// Sets the description.
        pub fn description(mut self, description: impl Into<String>) -> Self {
            self.config.description = Some(description.into());
            self
        }

        /// Appends a middleware. Middlewares run in the order they are added.
        pub fn middleware<M: Middleware>(mut self, middleware: M) -> Self {
            self.config.middlewares.push(into_middleware(middleware));
            self
        }

        /// Sets the terminal handler and finalizes the definition.
        pub fn handler<F, Fut, R>(self, f: F) -> HandlerDefinition
        where
            F: Fn(Context) -> Fut + Send + Sync + 'static,
            Fut: Future<Output = R> + Send + 'static,
            R: HandlerResponse,
        {
            self.config.finalize(into_handler(f))
        }

        /// Returns the configuration accumulated so far.
        pub fn config(&self) -> &HandlerConfig {
            &self.config
        }
    };
}

/// Builds a slash command definition.
#[derive(Debug)]
pub struct SlashCommandBuilder {
    config: HandlerConfig,
}

impl SlashCommandBuilder {
    /// Starts a slash command named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            config: HandlerConfig::new(HandlerKind::SlashCommand, name),
        }
    }

    /// Sets the autocomplete callback.
    ///
    /// Autocomplete requests bypass the middleware chain.
    pub fn autocomplete<F, Fut, R>(mut self, f: F) -> Self
    where
        F: Fn(BoxedInteraction) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: HandlerResponse,
    {
        self.config.autocomplete = Some(into_autocomplete(f));
        self
    }

    shared_builder_methods!();
}

/// Builds a context-menu or slash command definition.
#[derive(Debug)]
pub struct CommandBuilder {
    config: HandlerConfig,
}

impl CommandBuilder {
    /// Starts a slash command. See [`SlashCommandBuilder`].
    pub fn slash(name: impl Into<String>) -> SlashCommandBuilder {
        SlashCommandBuilder::new(name)
    }

    /// Starts a user context-menu command.
    pub fn user_context(name: impl Into<String>) -> Self {
        Self {
            config: HandlerConfig::new(HandlerKind::UserContextCommand, name),
        }
    }

    /// Starts a message context-menu command.
    pub fn message_context(name: impl Into<String>) -> Self {
        Self {
            config: HandlerConfig::new(HandlerKind::MessageContextCommand, name),
        }
    }

    shared_builder_methods!();
}

/// Builds a component (button, modal, select menu) definition.
#[derive(Debug)]
pub struct ComponentBuilder {
    config: HandlerConfig,
}

impl ComponentBuilder {
    /// Starts a component with base custom ID `custom_id`.
    pub fn new(custom_id: impl Into<String>) -> Self {
        Self {
            config: HandlerConfig::new(HandlerKind::Component, custom_id),
        }
    }

    /// Starts a component whose base custom ID is issued by `ids`.
    pub fn generated(ids: &IdGenerator) -> Self {
        Self::new(ids.next_id())
    }

    /// Overrides the base custom ID.
    pub fn custom_id(mut self, custom_id: impl Into<String>) -> Self {
        self.config.routing_key = custom_id.into();
        self
    }

    shared_builder_methods!();
}

/// Creates a slash command builder.
///
/// # Example
///
/// ```rust,ignore
/// let ping = slash_command("ping").handler(|_ctx: Context| async { "Pong!" });
/// ```
pub fn slash_command(name: impl Into<String>) -> SlashCommandBuilder {
    SlashCommandBuilder::new(name)
}

/// Creates a user context-menu command builder.
pub fn user_command(name: impl Into<String>) -> CommandBuilder {
    CommandBuilder::user_context(name)
}

/// Creates a message context-menu command builder.
pub fn message_command(name: impl Into<String>) -> CommandBuilder {
    CommandBuilder::message_context(name)
}

/// Creates a component builder.
///
/// # Example
///
/// ```rust,ignore
/// let pong = component("pong").handler(|ctx: Context| async move {
///     Ok::<_, BoxError>(format!("Pong! by {}", ctx.arg(0)?))
/// });
/// ```
pub fn component(custom_id: impl Into<String>) -> ComponentBuilder {
    ComponentBuilder::new(custom_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sugar_core::AutocompleteChoice;

    #[test]
    fn test_kinds() {
        let noop = |_ctx: Context| async {};
        assert_eq!(
            slash_command("a").handler(noop).kind(),
            HandlerKind::SlashCommand
        );
        assert_eq!(
            user_command("b").handler(noop).kind(),
            HandlerKind::UserContextCommand
        );
        assert_eq!(
            message_command("c").handler(noop).kind(),
            HandlerKind::MessageContextCommand
        );
        assert_eq!(component("d").handler(noop).kind(), HandlerKind::Component);
    }

    #[test]
    fn test_middlewares_keep_order() {
        let builder = slash_command("mw")
            .description("test")
            .middleware(|ctx: Context| async move { ctx.with(1u8) })
            .middleware(|ctx: Context| async move { ctx.with(2u16) });
        assert_eq!(builder.config().middlewares.len(), 2);
        let def = builder.handler(|_ctx: Context| async {});
        assert_eq!(def.middlewares().len(), 2);
        assert_eq!(def.description(), Some("test"));
    }

    #[test]
    fn test_slash_autocomplete() {
        let def = slash_command("color")
            .autocomplete(|_i: BoxedInteraction| async {
                vec![AutocompleteChoice::new("white", "#ffffff")]
            })
            .handler(|_ctx: Context| async {});
        assert!(def.autocomplete().is_some());
    }

    #[test]
    fn test_generated_component_ids() {
        let ids = IdGenerator::with_prefix("demo");
        let first = ComponentBuilder::generated(&ids).handler(|_ctx: Context| async {});
        let second = ComponentBuilder::generated(&ids).handler(|_ctx: Context| async {});
        assert_eq!(first.routing_key(), "demo-1");
        assert_eq!(second.routing_key(), "demo-2");

        let renamed = ComponentBuilder::generated(&ids)
            .custom_id("explicit")
            .handler(|_ctx: Context| async {});
        assert_eq!(renamed.routing_key(), "explicit");
    }
}
