//! Sequential evaluation of a middleware list.
//!
//! [`MiddlewareChain`] walks a borrowed slice of middlewares with its own
//! cursor, so a handler definition's list is never consumed or reordered and
//! any number of dispatches can run the same list concurrently.
//!
//! Per dispatch the chain moves through these states:
//!
//! ```text
//! Pending(0) ─▶ Running(i) ─┬─▶ Running(i + 1)
//!                           ├─▶ Stopped    (middleware returned Flow::Stop)
//!                           ├─▶ Aborted    (middleware returned Err)
//!                           └─▶ Completed  (i == len, handler may run)
//! ```

use tower::BoxError;
use tracing::trace;

use crate::context::Context;
use crate::middleware::{BoxedMiddleware, Flow};

/// How a chain run ended.
#[derive(Debug)]
pub enum ChainOutcome {
    /// Every middleware continued; carries the final context.
    Completed(Context),
    /// The middleware at `index` stopped the chain.
    Stopped {
        /// Position of the stopping middleware.
        index: usize,
    },
    /// The middleware at `index` failed.
    Aborted {
        /// Position of the failing middleware.
        index: usize,
        /// The error it returned.
        error: BoxError,
    },
}

impl ChainOutcome {
    /// Returns `true` if the handler should run.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

/// Runs middlewares strictly in order, awaiting each before the next.
#[derive(Clone, Copy)]
pub struct MiddlewareChain<'a> {
    middlewares: &'a [BoxedMiddleware],
}

impl<'a> MiddlewareChain<'a> {
    /// Creates a chain over `middlewares`.
    pub fn new(middlewares: &'a [BoxedMiddleware]) -> Self {
        Self { middlewares }
    }

    /// Returns the number of steps in this chain.
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    /// Returns `true` if the chain has no steps.
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Threads `ctx` through every middleware.
    pub async fn run(&self, mut ctx: Context) -> ChainOutcome {
        for (index, middleware) in self.middlewares.iter().enumerate() {
            trace!(middleware_index = index, "Running middleware");
            match middleware.handle(ctx).await {
                Ok(Flow::Continue(next)) => ctx = next,
                Ok(Flow::Stop) => return ChainOutcome::Stopped { index },
                Err(error) => return ChainOutcome::Aborted { index, error },
            }
        }
        ChainOutcome::Completed(ctx)
    }
}

impl std::fmt::Debug for MiddlewareChain<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareChain")
            .field("len", &self.middlewares.len())
            .finish()
    }
}
