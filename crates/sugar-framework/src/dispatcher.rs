//! Interaction dispatcher for the Sugar framework.
//!
//! The [`Dispatcher`] turns one incoming interaction into at most one handler
//! invocation:
//!
//! 1. The interaction kind picks a [`Route`]: a registry partition, plus
//!    whether the full chain or only the autocomplete callback runs
//! 2. The routing key is looked up; components have their custom ID parsed
//!    into a key and an argument list first
//! 3. On a hit the definition's middlewares run in order, then the handler
//!
//! Every failure stops at the dispatcher. Lookup misses, vetoes, errors and
//! panics are all reported as a [`DispatchOutcome`] and logged; nothing is
//! ever propagated to the caller.
//!
//! ```rust,ignore
//! use sugar_framework::{Dispatcher, Registry};
//!
//! let dispatcher = Dispatcher::builder(registry)
//!     .error_reply("Something went wrong.")
//!     .build();
//!
//! let outcome = dispatcher.dispatch(interaction).await;
//! ```
//!
//! # Tower Integration
//!
//! `Dispatcher` implements `tower::Service<BoxedInteraction>`. Nothing in the
//! dispatcher times out on its own; wrap it in tower layers to bound how long
//! a stalled middleware or handler may run:
//!
//! ```rust,ignore
//! use tower::ServiceBuilder;
//! use tower::timeout::TimeoutLayer;
//! use std::time::Duration;
//!
//! let service = ServiceBuilder::new()
//!     .layer(TimeoutLayer::new(Duration::from_secs(3)))
//!     .service(dispatcher);
//! ```

use std::any::Any;
use std::convert::Infallible;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};

use futures::FutureExt;
use futures::future::BoxFuture;
use sugar_core::{BoxedInteraction, HandlerKind, Route, custom_id};
use tower::Service;
use tracing::{Instrument, Level, debug, error, span, trace, warn};

use crate::chain::ChainOutcome;
use crate::context::Context;
use crate::definition::HandlerDefinition;
use crate::error::DispatchError;
use crate::registry::Registry;

/// The result of dispatching one interaction.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// Every middleware continued and the handler succeeded.
    Completed,
    /// A middleware stopped the chain; the handler did not run.
    Stopped {
        /// Position of the stopping middleware.
        index: usize,
    },
    /// No definition is registered under the routing key.
    NotFound {
        /// Partition that was searched.
        kind: HandlerKind,
        /// Decoded routing key.
        key: String,
    },
    /// A middleware, handler or autocomplete callback failed.
    Failed(DispatchError),
    /// The interaction kind is not routed.
    Ignored,
    /// The autocomplete callback ran successfully.
    AutocompleteHandled,
    /// The slash command has no autocomplete callback.
    AutocompleteUnsupported,
}

impl DispatchOutcome {
    /// Returns `true` for [`DispatchOutcome::Completed`].
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Returns `true` for [`DispatchOutcome::Failed`].
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Returns `true` for [`DispatchOutcome::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns the contained error for failed dispatches.
    pub fn error(&self) -> Option<&DispatchError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Returns a short label, suitable for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Stopped { .. } => "stopped",
            Self::NotFound { .. } => "not_found",
            Self::Failed(_) => "failed",
            Self::Ignored => "ignored",
            Self::AutocompleteHandled => "autocomplete",
            Self::AutocompleteUnsupported => "autocomplete_unsupported",
        }
    }
}

/// Behavioural switches for the error boundary.
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    /// Reply sent to the user after a middleware or handler failure.
    pub error_reply: Option<String>,
    /// Whether lookup misses are logged.
    pub log_not_found: bool,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            error_reply: None,
            log_not_found: true,
        }
    }
}

struct DispatcherInner {
    registry: Arc<Registry>,
    options: DispatchOptions,
}

/// Routes interactions to the handler definitions of a [`Registry`].
///
/// Cloning is cheap; all clones share the same registry.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

impl Dispatcher {
    /// Creates a dispatcher with default options.
    pub fn new(registry: impl Into<Arc<Registry>>) -> Self {
        Self::builder(registry).build()
    }

    /// Starts configuring a dispatcher.
    pub fn builder(registry: impl Into<Arc<Registry>>) -> DispatcherBuilder {
        DispatcherBuilder {
            registry: registry.into(),
            options: DispatchOptions::default(),
        }
    }

    /// Returns the registry.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.inner.registry
    }

    /// Returns the active options.
    pub fn options(&self) -> &DispatchOptions {
        &self.inner.options
    }

    /// Dispatches one interaction.
    ///
    /// Never fails; the outcome describes what happened.
    pub async fn dispatch(&self, interaction: BoxedInteraction) -> DispatchOutcome {
        let Some(route) = interaction.kind().route() else {
            trace!(kind = ?interaction.kind(), "Interaction kind not routed");
            return DispatchOutcome::Ignored;
        };

        let kind = route.partition();
        let raw = interaction.routing_identifier().unwrap_or_default().to_string();
        let (key, args) = match route {
            Route::Execute(HandlerKind::Component) => {
                let (key, args) = custom_id::parse(&raw);
                (key, Some(args))
            }
            _ => (raw.clone(), None),
        };

        let span = span!(Level::DEBUG, "dispatch", kind = %kind, routing_key = %key);
        self.route(interaction, route, kind, key, args, &raw)
            .instrument(span)
            .await
    }

    async fn route(
        &self,
        interaction: BoxedInteraction,
        route: Route,
        kind: HandlerKind,
        key: String,
        args: Option<Vec<String>>,
        raw: &str,
    ) -> DispatchOutcome {
        let Some(definition) = self.inner.registry.get(kind, &key) else {
            if self.inner.options.log_not_found {
                warn!(%kind, routing_key = %key, identifier = raw, "No handler registered");
            }
            return DispatchOutcome::NotFound { kind, key };
        };

        let outcome = match route {
            Route::Autocomplete => Self::autocomplete(definition, Arc::clone(&interaction)).await,
            Route::Execute(_) => {
                let ctx = match args {
                    Some(args) => Context::with_args(Arc::clone(&interaction), args),
                    None => Context::new(Arc::clone(&interaction)),
                };
                Self::execute(definition, ctx).await
            }
        };

        if let DispatchOutcome::Failed(err) = &outcome {
            self.report(&interaction, route, &key, err).await;
        }
        outcome
    }

    async fn autocomplete(
        definition: &HandlerDefinition,
        interaction: BoxedInteraction,
    ) -> DispatchOutcome {
        let Some(callback) = definition.autocomplete() else {
            debug!("Slash command has no autocomplete callback");
            return DispatchOutcome::AutocompleteUnsupported;
        };
        let run = async { callback(interaction).await };
        match AssertUnwindSafe(run).catch_unwind().await {
            Ok(Ok(())) => DispatchOutcome::AutocompleteHandled,
            Ok(Err(source)) => DispatchOutcome::Failed(DispatchError::Autocomplete { source }),
            Err(payload) => DispatchOutcome::Failed(panicked(payload)),
        }
    }

    async fn execute(definition: &HandlerDefinition, ctx: Context) -> DispatchOutcome {
        let run = async {
            match definition.chain().run(ctx).await {
                ChainOutcome::Completed(ctx) => match (definition.execute())(ctx).await {
                    Ok(()) => DispatchOutcome::Completed,
                    Err(source) => DispatchOutcome::Failed(DispatchError::Handler { source }),
                },
                ChainOutcome::Stopped { index } => {
                    debug!(middleware_index = index, "Middleware stopped the chain");
                    DispatchOutcome::Stopped { index }
                }
                ChainOutcome::Aborted { index, error } => {
                    DispatchOutcome::Failed(DispatchError::Middleware {
                        index,
                        source: error,
                    })
                }
            }
        };

        match AssertUnwindSafe(run).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(payload) => DispatchOutcome::Failed(panicked(payload)),
        }
    }

    async fn report(
        &self,
        interaction: &BoxedInteraction,
        route: Route,
        key: &str,
        err: &DispatchError,
    ) {
        let kind = route.partition();
        error!(%kind, routing_key = key, error = %err, "Dispatch failed");

        // autocomplete requests cannot carry a text reply
        if route == Route::Autocomplete {
            return;
        }
        if let Some(text) = &self.inner.options.error_reply
            && let Err(e) = interaction.reply(text).await
        {
            warn!(error = %e, "Failed to send error reply");
        }
    }
}

fn panicked(payload: Box<dyn Any + Send>) -> DispatchError {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    };
    DispatchError::Panicked { message }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("handlers", &self.inner.registry.len())
            .field("options", &self.inner.options)
            .finish()
    }
}

/// Configures a [`Dispatcher`].
#[derive(Debug)]
pub struct DispatcherBuilder {
    registry: Arc<Registry>,
    options: DispatchOptions,
}

impl DispatcherBuilder {
    /// Sends `text` as a reply after a middleware or handler failure.
    pub fn error_reply(mut self, text: impl Into<String>) -> Self {
        self.options.error_reply = Some(text.into());
        self
    }

    /// Sets whether lookup misses are logged.
    pub fn log_not_found(mut self, enabled: bool) -> Self {
        self.options.log_not_found = enabled;
        self
    }

    /// Replaces all options at once.
    pub fn options(mut self, options: DispatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Finishes the dispatcher.
    pub fn build(self) -> Dispatcher {
        Dispatcher {
            inner: Arc::new(DispatcherInner {
                registry: self.registry,
                options: self.options,
            }),
        }
    }
}

impl Service<BoxedInteraction> for Dispatcher {
    type Response = DispatchOutcome;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, interaction: BoxedInteraction) -> Self::Future {
        let dispatcher = self.clone();
        async move { Ok(dispatcher.dispatch(interaction).await) }.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{component, slash_command};
    use sugar_core::AutocompleteChoice;
    use sugar_core::testing::MockInteraction;

    #[tokio::test]
    async fn test_other_is_ignored() {
        let dispatcher = Dispatcher::new(Registry::default());
        let (_, interaction) = MockInteraction::other().shared();
        assert!(matches!(
            dispatcher.dispatch(interaction).await,
            DispatchOutcome::Ignored
        ));
    }

    #[tokio::test]
    async fn test_component_key_is_decoded() {
        let registry = Registry::builder()
            .register(component("a?b").handler(|ctx: Context| async move {
                ctx.args().join(",")
            }))
            .build();
        let dispatcher = Dispatcher::new(registry);
        let (mock, interaction) = MockInteraction::button("a$q;b?x&y").shared();
        assert!(dispatcher.dispatch(interaction).await.is_completed());
        assert_eq!(mock.replies(), vec!["x,y"]);
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let registry = Registry::builder()
            .register(slash_command("boom").handler(|ctx: Context| async move {
                if ctx.args().is_empty() {
                    panic!("handler exploded");
                }
            }))
            .build();
        let dispatcher = Dispatcher::new(registry);
        let (_, interaction) = MockInteraction::slash("boom").shared();
        match dispatcher.dispatch(interaction).await {
            DispatchOutcome::Failed(DispatchError::Panicked { message }) => {
                assert_eq!(message, "handler exploded");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_autocomplete_panic_before_future_is_contained() {
        let registry = Registry::builder()
            .register(
                slash_command("color")
                    .autocomplete(|_i: BoxedInteraction| {
                        let first = Vec::<String>::new()[0].clone();
                        async move { vec![AutocompleteChoice::new(first.clone(), first)] }
                    })
                    .handler(|_ctx: Context| async {}),
            )
            .build();
        let dispatcher = Dispatcher::builder(registry)
            .error_reply("Something went wrong.")
            .build();

        let (mock, interaction) = MockInteraction::autocomplete("color", "w").shared();
        let outcome = AssertUnwindSafe(dispatcher.dispatch(interaction))
            .catch_unwind()
            .await
            .expect("panic must not escape dispatch");
        assert!(matches!(
            outcome,
            DispatchOutcome::Failed(DispatchError::Panicked { .. })
        ));
        assert!(mock.replies().is_empty());
        assert!(mock.responses().is_empty());
    }

    #[tokio::test]
    async fn test_handler_panic_before_future_is_contained() {
        let registry = Registry::builder()
            .register(slash_command("boom").handler(|ctx: Context| {
                let first = ctx.args()[0].clone();
                async move { first }
            }))
            .build();
        let dispatcher = Dispatcher::builder(registry)
            .error_reply("Something went wrong.")
            .build();

        let (mock, interaction) = MockInteraction::slash("boom").shared();
        let outcome = AssertUnwindSafe(dispatcher.dispatch(interaction))
            .catch_unwind()
            .await
            .expect("panic must not escape dispatch");
        assert!(matches!(
            outcome,
            DispatchOutcome::Failed(DispatchError::Panicked { .. })
        ));
        assert_eq!(mock.replies(), vec!["Something went wrong."]);
    }

    #[test]
    fn test_labels() {
        assert_eq!(DispatchOutcome::Completed.label(), "completed");
        assert_eq!(
            DispatchOutcome::NotFound {
                kind: HandlerKind::Component,
                key: "x".into()
            }
            .label(),
            "not_found"
        );
    }
}
