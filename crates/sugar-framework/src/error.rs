//! Error types for the Sugar framework.

use thiserror::Error;
use tower::BoxError;

/// A failure contained by the dispatcher's error boundary.
///
/// None of these ever escape [`Dispatcher::dispatch`](crate::Dispatcher::dispatch);
/// they are logged and reported through
/// [`DispatchOutcome::Failed`](crate::DispatchOutcome::Failed).
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A middleware returned an error; the chain was aborted.
    #[error("middleware #{index} failed: {source}")]
    Middleware {
        /// Position of the failing middleware in registration order.
        index: usize,
        /// The error returned by the middleware.
        source: BoxError,
    },

    /// The terminal handler returned an error.
    #[error("handler failed: {source}")]
    Handler {
        /// The error returned by the handler.
        source: BoxError,
    },

    /// The autocomplete callback returned an error.
    #[error("autocomplete failed: {source}")]
    Autocomplete {
        /// The error returned by the callback.
        source: BoxError,
    },

    /// A middleware or handler panicked.
    #[error("dispatch panicked: {message}")]
    Panicked {
        /// The panic payload, if it was a string.
        message: String,
    },
}

impl DispatchError {
    /// Returns the failing middleware index for middleware failures.
    pub fn middleware_index(&self) -> Option<usize> {
        match self {
            Self::Middleware { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// Errors that can occur when reading values from a [`Context`](crate::Context).
#[derive(Debug, Clone, Error)]
pub enum ContextError {
    /// No value of the requested type was added by any middleware.
    #[error("context value of type '{0}' not present")]
    Missing(&'static str),

    /// The requested argument index is out of range.
    #[error("argument #{index} missing (got {len} arguments)")]
    MissingArg {
        /// Requested index.
        index: usize,
        /// Number of arguments available.
        len: usize,
    },
}

/// Result type for context reads.
pub type ContextResult<T> = Result<T, ContextError>;
