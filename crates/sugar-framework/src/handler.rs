//! Terminal handlers and autocomplete callbacks.
//!
//! A handler is any async function of a [`Context`]. What it returns decides
//! what happens afterwards, through [`HandlerResponse`]:
//!
//! ```rust,ignore
//! // No return value
//! async fn log_only(ctx: Context) {
//!     tracing::info!(args = ?ctx.args(), "button pressed");
//! }
//!
//! // A String is sent as a reply
//! async fn pong(_ctx: Context) -> String {
//!     "Pong!".to_string()
//! }
//!
//! // Errors go to the dispatcher's error boundary
//! async fn fallible(ctx: Context) -> Result<String, BoxError> {
//!     let who = ctx.arg(0)?;
//!     Ok(format!("Pong! by {who}"))
//! }
//! ```
//!
//! Autocomplete callbacks receive the raw interaction instead of a context,
//! because they bypass the middleware chain. Returning a
//! `Vec<AutocompleteChoice>` answers the request.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use tower::BoxError;

use crate::context::Context;
use sugar_core::{AutocompleteChoice, BoxedInteraction, Interaction};

// ============================================================================
// HandlerResponse
// ============================================================================

/// A trait for types that can be returned from handlers.
#[async_trait]
pub trait HandlerResponse: Send + 'static {
    /// Process the handler response, performing any necessary side effects
    /// (e.g. sending a reply).
    async fn process_response(self, interaction: &dyn Interaction) -> Result<(), BoxError>;
}

/// Implementation for `()` - no response needed.
#[async_trait]
impl HandlerResponse for () {
    async fn process_response(self, _interaction: &dyn Interaction) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Implementation for `String` - sent as a text reply.
#[async_trait]
impl HandlerResponse for String {
    async fn process_response(self, interaction: &dyn Interaction) -> Result<(), BoxError> {
        interaction.reply(&self).await?;
        Ok(())
    }
}

/// Implementation for `&'static str` - sent as a text reply.
#[async_trait]
impl HandlerResponse for &'static str {
    async fn process_response(self, interaction: &dyn Interaction) -> Result<(), BoxError> {
        interaction.reply(self).await?;
        Ok(())
    }
}

/// Implementation for autocomplete choices - answers the request.
#[async_trait]
impl HandlerResponse for Vec<AutocompleteChoice> {
    async fn process_response(self, interaction: &dyn Interaction) -> Result<(), BoxError> {
        interaction.respond(self).await?;
        Ok(())
    }
}

/// Implementation for `Option<T>` where T implements HandlerResponse.
///
/// On Some, the inner value's response is handled. On None, no action is taken.
#[async_trait]
impl<T: HandlerResponse> HandlerResponse for Option<T> {
    async fn process_response(self, interaction: &dyn Interaction) -> Result<(), BoxError> {
        match self {
            Some(t) => t.process_response(interaction).await,
            None => Ok(()),
        }
    }
}

/// Implementation for `Result<T, E>` where T implements HandlerResponse.
///
/// On Ok, the inner value's response is handled. On Err, the error is
/// returned to the dispatcher.
#[async_trait]
impl<T, E> HandlerResponse for Result<T, E>
where
    T: HandlerResponse,
    E: Into<BoxError> + Send + 'static,
{
    async fn process_response(self, interaction: &dyn Interaction) -> Result<(), BoxError> {
        match self {
            Ok(t) => t.process_response(interaction).await,
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// Boxed handlers
// ============================================================================

/// A type-erased terminal handler.
pub type BoxedHandler = Arc<dyn Fn(Context) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync>;

/// A type-erased autocomplete callback.
pub type BoxedAutocomplete =
    Arc<dyn Fn(BoxedInteraction) -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync>;

/// Convert a handler function into a boxed handler.
pub fn into_handler<F, Fut, R>(f: F) -> BoxedHandler
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: HandlerResponse,
{
    Arc::new(move |ctx: Context| {
        let interaction = Arc::clone(ctx.interaction());
        f(ctx)
            .then(move |res| async move { res.process_response(interaction.as_ref()).await })
            .boxed()
    })
}

/// Convert an autocomplete function into a boxed callback.
pub fn into_autocomplete<F, Fut, R>(f: F) -> BoxedAutocomplete
where
    F: Fn(BoxedInteraction) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: HandlerResponse,
{
    Arc::new(move |interaction: BoxedInteraction| {
        let target = Arc::clone(&interaction);
        f(interaction)
            .then(move |res| async move { res.process_response(target.as_ref()).await })
            .boxed()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sugar_core::testing::MockInteraction;

    #[tokio::test]
    async fn test_unit_response() {
        let handler = into_handler(|_ctx: Context| async {});
        let (mock, boxed) = MockInteraction::slash("noop").shared();
        handler(Context::new(boxed)).await.unwrap();
        assert!(mock.replies().is_empty());
    }

    #[tokio::test]
    async fn test_string_response_replies() {
        let handler = into_handler(|_ctx: Context| async { "Pong!".to_string() });
        let (mock, boxed) = MockInteraction::slash("ping").shared();
        handler(Context::new(boxed)).await.unwrap();
        assert_eq!(mock.replies(), vec!["Pong!"]);
    }

    #[tokio::test]
    async fn test_failed_reply_is_an_error() {
        let handler = into_handler(|_ctx: Context| async { "Pong!" });
        let (_, boxed) = MockInteraction::slash("ping").fail_replies().shared();
        assert!(handler(Context::new(boxed)).await.is_err());
    }

    #[tokio::test]
    async fn test_result_err_propagates() {
        let handler = into_handler(|ctx: Context| async move {
            let first = ctx.arg(0)?.to_string();
            Ok::<_, BoxError>(first)
        });
        let (_, boxed) = MockInteraction::slash("args").shared();
        let err = handler(Context::new(boxed)).await.unwrap_err();
        assert!(err.to_string().contains("argument #0"));
    }

    #[tokio::test]
    async fn test_option_none_is_silent() {
        let handler = into_handler(|_ctx: Context| async { None::<String> });
        let (mock, boxed) = MockInteraction::slash("maybe").shared();
        handler(Context::new(boxed)).await.unwrap();
        assert!(mock.replies().is_empty());
    }

    #[tokio::test]
    async fn test_autocomplete_choices_respond() {
        let callback = into_autocomplete(|interaction: BoxedInteraction| async move {
            let focused = interaction.focused_value().unwrap_or("").to_string();
            ["white", "black"]
                .into_iter()
                .filter(|name| name.starts_with(&focused))
                .map(|name| AutocompleteChoice::new(name, name))
                .collect::<Vec<_>>()
        });
        let (mock, boxed) = MockInteraction::autocomplete("color", "wh").shared();
        callback(boxed).await.unwrap();
        assert_eq!(
            mock.responses(),
            vec![vec![AutocompleteChoice::new("white", "white")]]
        );
    }
}
