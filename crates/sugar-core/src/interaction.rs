//! The interaction collaborator.
//!
//! The dispatcher never talks to a platform directly. Platform integrations
//! wrap their native interaction objects in a type implementing
//! [`Interaction`], which exposes just enough to classify and route the
//! event, plus the reply operations that handlers and middlewares use.
//!
//! Interactions are type-erased as [`BoxedInteraction`] and can be
//! downcast back to the concrete platform type:
//!
//! ```rust,ignore
//! async fn handler(ctx: Context) {
//!     if let Some(native) = ctx.interaction().downcast_ref::<MyPlatformInteraction>() {
//!         // platform-specific API
//!     }
//! }
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ReplyError, ReplyResult};
use crate::kind::{HandlerKind, Route};

/// The flavour of select menu that produced a component interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectMenuKind {
    /// Free-form string options.
    String,
    /// User picker.
    User,
    /// Role picker.
    Role,
    /// User-or-role picker.
    Mentionable,
    /// Channel picker.
    Channel,
}

/// Classification of an incoming interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    /// A chat-input (slash) command invocation.
    ChatInputCommand,
    /// An autocomplete request for a slash command option.
    Autocomplete,
    /// A user context-menu command.
    UserContextMenuCommand,
    /// A message context-menu command.
    MessageContextMenuCommand,
    /// A button press.
    Button,
    /// A modal submission.
    ModalSubmit,
    /// A select menu choice.
    SelectMenu(SelectMenuKind),
    /// Anything the dispatcher does not route (pings, entry points, ...).
    Other,
}

impl InteractionKind {
    /// Resolves where this interaction is dispatched.
    ///
    /// Returns `None` for interactions with no handler partition.
    pub fn route(&self) -> Option<Route> {
        match self {
            Self::ChatInputCommand => Some(Route::Execute(HandlerKind::SlashCommand)),
            Self::Autocomplete => Some(Route::Autocomplete),
            Self::UserContextMenuCommand => Some(Route::Execute(HandlerKind::UserContextCommand)),
            Self::MessageContextMenuCommand => {
                Some(Route::Execute(HandlerKind::MessageContextCommand))
            }
            Self::Button | Self::ModalSubmit | Self::SelectMenu(_) => {
                Some(Route::Execute(HandlerKind::Component))
            }
            Self::Other => None,
        }
    }

    /// Returns `true` for buttons, modals and select menus.
    pub fn is_component(&self) -> bool {
        matches!(self, Self::Button | Self::ModalSubmit | Self::SelectMenu(_))
    }
}

/// A single autocomplete suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutocompleteChoice {
    /// The label shown to the user.
    pub name: String,
    /// The value submitted when the choice is picked.
    pub value: String,
}

impl AutocompleteChoice {
    /// Creates a new choice.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An incoming interaction, as seen by the dispatcher.
///
/// Implementations wrap a platform's native interaction. Only
/// [`kind`](Self::kind) and the identifier accessors are used for routing;
/// the reply operations are for handlers and middlewares.
#[async_trait]
pub trait Interaction: Any + Send + Sync {
    /// Classifies this interaction.
    fn kind(&self) -> InteractionKind;

    /// Returns the invoked command name for command and autocomplete
    /// interactions.
    fn command_name(&self) -> Option<&str> {
        None
    }

    /// Returns the raw (encoded) custom ID for component interactions.
    fn custom_id(&self) -> Option<&str> {
        None
    }

    /// Returns the guild the interaction happened in, if any.
    fn guild_id(&self) -> Option<&str> {
        None
    }

    /// Returns the user that triggered the interaction, if known.
    fn user_id(&self) -> Option<&str> {
        None
    }

    /// Returns the value of the focused option for autocomplete requests.
    fn focused_value(&self) -> Option<&str> {
        None
    }

    /// Sends a text reply.
    async fn reply(&self, content: &str) -> ReplyResult<()>;

    /// Answers an autocomplete request.
    async fn respond(&self, _choices: Vec<AutocompleteChoice>) -> ReplyResult<()> {
        Err(ReplyError::Unsupported("respond"))
    }

    /// Returns a reference to self as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl dyn Interaction {
    /// Attempts to downcast to the concrete interaction type.
    pub fn downcast_ref<T: Interaction>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Returns `true` if the concrete type is `T`.
    pub fn is<T: Interaction>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Returns the routing identifier: the command name for commands, the
    /// raw custom ID for components.
    pub fn routing_identifier(&self) -> Option<&str> {
        if self.kind().is_component() {
            self.custom_id()
        } else {
            self.command_name()
        }
    }
}

impl fmt::Debug for dyn Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interaction")
            .field("kind", &self.kind())
            .field("command_name", &self.command_name())
            .field("custom_id", &self.custom_id())
            .finish_non_exhaustive()
    }
}

/// A shared, type-erased interaction.
pub type BoxedInteraction = Arc<dyn Interaction>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_priority_table() {
        use InteractionKind::*;

        assert_eq!(
            ChatInputCommand.route(),
            Some(Route::Execute(HandlerKind::SlashCommand))
        );
        assert_eq!(Autocomplete.route(), Some(Route::Autocomplete));
        assert_eq!(
            UserContextMenuCommand.route(),
            Some(Route::Execute(HandlerKind::UserContextCommand))
        );
        assert_eq!(
            MessageContextMenuCommand.route(),
            Some(Route::Execute(HandlerKind::MessageContextCommand))
        );
        for kind in [
            Button,
            ModalSubmit,
            SelectMenu(SelectMenuKind::String),
            SelectMenu(SelectMenuKind::Channel),
        ] {
            assert_eq!(kind.route(), Some(Route::Execute(HandlerKind::Component)));
            assert!(kind.is_component());
        }
        assert_eq!(Other.route(), None);
    }
}
