//! Middleware: ordered pre-processing steps that run before a handler.
//!
//! A middleware receives the current [`Context`] and decides what happens
//! next:
//!
//! - **continue** with a (possibly extended) context: [`Flow::Continue`]
//! - **stop** politely: [`Flow::Stop`]. The handler does not run and nothing
//!   is reported as an error. Use this after the middleware has already
//!   replied, e.g. a "guild only" guard.
//! - **abort** by returning `Err`. The chain stops and the error is handed to
//!   the dispatcher's error boundary.
//!
//! Any async closure taking a `Context` is a middleware. Its output can be
//! anything implementing [`IntoFlow`]:
//!
//! ```rust,ignore
//! // Infallible enrichment
//! let add_a = |ctx: Context| async move { ctx.with(ExampleA("exampleA".into())) };
//!
//! // Conditional stop
//! let only_admins = |ctx: Context| async move {
//!     if is_admin(&ctx).await { Flow::Continue(ctx) } else { Flow::Stop }
//! };
//!
//! // Fallible step
//! let load_profile = |ctx: Context| async move {
//!     let profile = fetch_profile(&ctx).await?;
//!     Ok::<_, BoxError>(ctx.with(profile))
//! };
//! ```

use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use tower::BoxError;
use tracing::{debug, warn};

use crate::context::Context;

/// What a middleware wants to happen next.
#[derive(Debug)]
pub enum Flow {
    /// Run the next middleware (or the handler) with this context.
    Continue(Context),
    /// End the dispatch without running the handler.
    Stop,
}

impl Flow {
    /// Returns `true` for [`Flow::Stop`].
    pub fn is_stop(&self) -> bool {
        matches!(self, Self::Stop)
    }
}

impl From<Context> for Flow {
    fn from(ctx: Context) -> Self {
        Self::Continue(ctx)
    }
}

impl From<Option<Context>> for Flow {
    fn from(ctx: Option<Context>) -> Self {
        ctx.map_or(Self::Stop, Self::Continue)
    }
}

/// The result of a single middleware step.
pub type MiddlewareResult = Result<Flow, BoxError>;

/// Conversion of middleware return values into a [`MiddlewareResult`].
pub trait IntoFlow: Send + 'static {
    /// Converts this value.
    fn into_flow(self) -> MiddlewareResult;
}

impl IntoFlow for Flow {
    fn into_flow(self) -> MiddlewareResult {
        Ok(self)
    }
}

impl IntoFlow for Context {
    fn into_flow(self) -> MiddlewareResult {
        Ok(Flow::Continue(self))
    }
}

/// `None` stops the chain.
impl IntoFlow for Option<Context> {
    fn into_flow(self) -> MiddlewareResult {
        Ok(self.into())
    }
}

impl<T, E> IntoFlow for Result<T, E>
where
    T: IntoFlow,
    E: Into<BoxError> + Send + 'static,
{
    fn into_flow(self) -> MiddlewareResult {
        self.map_err(Into::into).and_then(IntoFlow::into_flow)
    }
}

/// A pre-processing step in a handler's middleware chain.
pub trait Middleware: Send + Sync + 'static {
    /// Runs this step against the current context.
    fn handle(&self, ctx: Context) -> BoxFuture<'static, MiddlewareResult>;
}

impl<F, Fut, R> Middleware for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoFlow,
{
    fn handle(&self, ctx: Context) -> BoxFuture<'static, MiddlewareResult> {
        (self)(ctx).map(IntoFlow::into_flow).boxed()
    }
}

/// A type-erased middleware stored in a handler definition.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// Convert a middleware into a boxed middleware.
pub fn into_middleware<M: Middleware>(m: M) -> BoxedMiddleware {
    Arc::new(m)
}

// ============================================================================
// Built-in middlewares
// ============================================================================

/// Stops the chain for interactions outside a guild, after replying with a
/// fixed message.
///
/// Created by [`guild_only`].
#[derive(Debug, Clone)]
pub struct GuildOnly {
    message: Arc<str>,
}

/// Creates a guard that only lets guild interactions through.
///
/// Interactions without a guild get `message` as a reply and the handler is
/// skipped.
pub fn guild_only(message: impl Into<String>) -> GuildOnly {
    let message: String = message.into();
    GuildOnly {
        message: Arc::from(message),
    }
}

impl Middleware for GuildOnly {
    fn handle(&self, ctx: Context) -> BoxFuture<'static, MiddlewareResult> {
        let message = Arc::clone(&self.message);
        async move {
            if ctx.interaction().guild_id().is_some() {
                return Ok(Flow::Continue(ctx));
            }
            debug!("Interaction outside a guild, stopping");
            if let Err(e) = ctx.reply(&message).await {
                warn!(error = %e, "Failed to send guild-only notice");
            }
            Ok(Flow::Stop)
        }
        .boxed()
    }
}
