//! In-memory interaction for tests and demos.
//!
//! [`MockInteraction`] records every reply so that assertions can be made
//! after a dispatch without any platform connection.
//!
//! ```rust
//! use sugar_core::testing::MockInteraction;
//!
//! let interaction = MockInteraction::button("pong?Al$a;ice").in_guild("42");
//! assert_eq!(interaction.custom_id_raw(), Some("pong?Al$a;ice"));
//! ```

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::trace;

use crate::error::{ReplyError, ReplyResult};
use crate::interaction::{
    AutocompleteChoice, BoxedInteraction, Interaction, InteractionKind, SelectMenuKind,
};

/// A scripted interaction that records replies.
#[derive(Debug)]
pub struct MockInteraction {
    kind: InteractionKind,
    command_name: Option<String>,
    custom_id: Option<String>,
    guild_id: Option<String>,
    user_id: Option<String>,
    focused: Option<String>,
    fail_replies: bool,
    replies: Mutex<Vec<String>>,
    responses: Mutex<Vec<Vec<AutocompleteChoice>>>,
}

impl MockInteraction {
    fn new(kind: InteractionKind) -> Self {
        Self {
            kind,
            command_name: None,
            custom_id: None,
            guild_id: None,
            user_id: None,
            focused: None,
            fail_replies: false,
            replies: Mutex::new(Vec::new()),
            responses: Mutex::new(Vec::new()),
        }
    }

    fn command(kind: InteractionKind, name: impl Into<String>) -> Self {
        let mut this = Self::new(kind);
        this.command_name = Some(name.into());
        this
    }

    fn component(kind: InteractionKind, custom_id: impl Into<String>) -> Self {
        let mut this = Self::new(kind);
        this.custom_id = Some(custom_id.into());
        this
    }

    /// A slash command invocation.
    pub fn slash(name: impl Into<String>) -> Self {
        Self::command(InteractionKind::ChatInputCommand, name)
    }

    /// An autocomplete request with the given focused value.
    pub fn autocomplete(name: impl Into<String>, focused: impl Into<String>) -> Self {
        let mut this = Self::command(InteractionKind::Autocomplete, name);
        this.focused = Some(focused.into());
        this
    }

    /// A user context-menu command.
    pub fn user_context(name: impl Into<String>) -> Self {
        Self::command(InteractionKind::UserContextMenuCommand, name)
    }

    /// A message context-menu command.
    pub fn message_context(name: impl Into<String>) -> Self {
        Self::command(InteractionKind::MessageContextMenuCommand, name)
    }

    /// A button press carrying a raw custom ID.
    pub fn button(custom_id: impl Into<String>) -> Self {
        Self::component(InteractionKind::Button, custom_id)
    }

    /// A modal submission carrying a raw custom ID.
    pub fn modal(custom_id: impl Into<String>) -> Self {
        Self::component(InteractionKind::ModalSubmit, custom_id)
    }

    /// A select menu choice carrying a raw custom ID.
    pub fn select(kind: SelectMenuKind, custom_id: impl Into<String>) -> Self {
        Self::component(InteractionKind::SelectMenu(kind), custom_id)
    }

    /// An interaction the dispatcher does not route.
    pub fn other() -> Self {
        Self::new(InteractionKind::Other)
    }

    /// Marks the interaction as happening inside a guild.
    pub fn in_guild(mut self, guild_id: impl Into<String>) -> Self {
        self.guild_id = Some(guild_id.into());
        self
    }

    /// Sets the triggering user.
    pub fn by_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Makes every reply operation fail.
    pub fn fail_replies(mut self) -> Self {
        self.fail_replies = true;
        self
    }

    /// Returns the raw custom ID.
    pub fn custom_id_raw(&self) -> Option<&str> {
        self.custom_id.as_deref()
    }

    /// Returns all text replies sent so far.
    pub fn replies(&self) -> Vec<String> {
        self.replies.lock().clone()
    }

    /// Returns all autocomplete responses sent so far.
    pub fn responses(&self) -> Vec<Vec<AutocompleteChoice>> {
        self.responses.lock().clone()
    }

    /// Wraps this interaction for dispatch, keeping a typed handle.
    pub fn shared(self) -> (Arc<Self>, BoxedInteraction) {
        let typed = Arc::new(self);
        let boxed: BoxedInteraction = typed.clone();
        (typed, boxed)
    }
}

#[async_trait]
impl Interaction for MockInteraction {
    fn kind(&self) -> InteractionKind {
        self.kind
    }

    fn command_name(&self) -> Option<&str> {
        self.command_name.as_deref()
    }

    fn custom_id(&self) -> Option<&str> {
        self.custom_id.as_deref()
    }

    fn guild_id(&self) -> Option<&str> {
        self.guild_id.as_deref()
    }

    fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    fn focused_value(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    async fn reply(&self, content: &str) -> ReplyResult<()> {
        if self.fail_replies {
            return Err(ReplyError::send_failed("mock configured to fail"));
        }
        trace!(content, "Mock reply");
        self.replies.lock().push(content.to_string());
        Ok(())
    }

    async fn respond(&self, choices: Vec<AutocompleteChoice>) -> ReplyResult<()> {
        if self.fail_replies {
            return Err(ReplyError::send_failed("mock configured to fail"));
        }
        if self.kind != InteractionKind::Autocomplete {
            return Err(ReplyError::Unsupported("respond"));
        }
        trace!(count = choices.len(), "Mock autocomplete response");
        self.responses.lock().push(choices);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
