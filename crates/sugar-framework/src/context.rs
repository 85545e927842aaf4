//! The context threaded through a dispatch.
//!
//! A [`Context`] starts out holding the incoming interaction (and, for
//! components, the arguments decoded from its custom ID). Middlewares enrich
//! it by returning an extended copy built with [`Context::with`]; the
//! terminal handler receives whatever the last middleware produced.
//!
//! Values are keyed by type, so each middleware contributes its own small
//! struct:
//!
//! ```rust,ignore
//! #[derive(Clone)]
//! struct Caller(String);
//!
//! let middleware = |ctx: Context| async move {
//!     let caller = ctx.interaction().user_id().unwrap_or("unknown").to_string();
//!     ctx.with(Caller(caller))
//! };
//!
//! let handler = |ctx: Context| async move {
//!     let caller = ctx.require::<Caller>()?;
//!     Ok::<_, BoxError>(format!("hello {}", caller.0))
//! };
//! ```
//!
//! A context is owned by exactly one dispatch. Extending it consumes the old
//! value, so a middleware can never observe changes made after it returned.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use sugar_core::{BoxedInteraction, ReplyResult};

use crate::error::{ContextError, ContextResult};

type Extension = Arc<dyn Any + Send + Sync>;

/// The accumulated dispatch context handed to middlewares and handlers.
#[derive(Clone)]
pub struct Context {
    interaction: BoxedInteraction,
    args: Option<Vec<String>>,
    extensions: HashMap<TypeId, (&'static str, Extension)>,
}

impl Context {
    /// Creates the initial context for a command interaction.
    pub fn new(interaction: BoxedInteraction) -> Self {
        Self {
            interaction,
            args: None,
            extensions: HashMap::new(),
        }
    }

    /// Creates the initial context for a component interaction.
    pub fn with_args(interaction: BoxedInteraction, args: Vec<String>) -> Self {
        Self {
            interaction,
            args: Some(args),
            extensions: HashMap::new(),
        }
    }

    /// Returns the incoming interaction.
    pub fn interaction(&self) -> &BoxedInteraction {
        &self.interaction
    }

    /// Returns the decoded component arguments.
    ///
    /// Command contexts have no arguments and return an empty slice.
    pub fn args(&self) -> &[String] {
        self.args.as_deref().unwrap_or(&[])
    }

    /// Returns `true` if this context was created for a component.
    pub fn has_args(&self) -> bool {
        self.args.is_some()
    }

    /// Returns the argument at `index`.
    pub fn arg(&self, index: usize) -> ContextResult<&str> {
        let args = self.args();
        args.get(index)
            .map(String::as_str)
            .ok_or(ContextError::MissingArg {
                index,
                len: args.len(),
            })
    }

    /// Returns a new context that additionally holds `value`.
    ///
    /// A value of the same type added earlier is replaced.
    pub fn with<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.extensions
            .insert(TypeId::of::<T>(), (type_name::<T>(), Arc::new(value)));
        self
    }

    /// Returns the value of type `T`, if a middleware added one.
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|(_, value)| value.downcast_ref::<T>())
    }

    /// Returns the value of type `T`, or an error naming the missing type.
    pub fn require<T: Send + Sync + 'static>(&self) -> ContextResult<&T> {
        self.get::<T>()
            .ok_or(ContextError::Missing(type_name::<T>()))
    }

    /// Returns `true` if a value of type `T` is present.
    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        self.extensions.contains_key(&TypeId::of::<T>())
    }

    /// Returns the number of values added by middlewares.
    pub fn extension_count(&self) -> usize {
        self.extensions.len()
    }

    /// Sends a text reply through the interaction.
    pub async fn reply(&self, content: &str) -> ReplyResult<()> {
        self.interaction.reply(content).await
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.extensions.values().map(|(name, _)| *name).collect();
        names.sort_unstable();
        f.debug_struct("Context")
            .field("interaction", &self.interaction)
            .field("args", &self.args)
            .field("extensions", &names)
            .finish()
    }
}
