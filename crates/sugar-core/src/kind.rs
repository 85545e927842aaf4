//! Handler kinds and routing classification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The partition a handler definition lives in.
///
/// Routing keys are unique within one partition only; a component and a
/// command may share the same textual key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerKind {
    /// Chat-input (slash) command, keyed by command name.
    SlashCommand,
    /// User context-menu command, keyed by command name.
    UserContextCommand,
    /// Message context-menu command, keyed by command name.
    MessageContextCommand,
    /// Button, modal or select menu, keyed by base custom ID.
    Component,
}

impl HandlerKind {
    /// All partitions, in dispatch priority order.
    pub const ALL: [HandlerKind; 4] = [
        HandlerKind::SlashCommand,
        HandlerKind::UserContextCommand,
        HandlerKind::MessageContextCommand,
        HandlerKind::Component,
    ];

    /// Returns the kind name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SlashCommand => "SlashCommand",
            Self::UserContextCommand => "UserContextMenuCommand",
            Self::MessageContextCommand => "MessageContextMenuCommand",
            Self::Component => "Component",
        }
    }

    /// Returns `true` for the three command partitions.
    pub fn is_command(&self) -> bool {
        !matches!(self, Self::Component)
    }

    /// Returns the platform's numeric application-command type.
    ///
    /// Components have no command type.
    pub fn command_type(&self) -> Option<u8> {
        match self {
            Self::SlashCommand => Some(1),
            Self::UserContextCommand => Some(2),
            Self::MessageContextCommand => Some(3),
            Self::Component => None,
        }
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HandlerKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "slash" | "slash_command" | "slashcommand" | "chat_input" => Self::SlashCommand,
            "user" | "user_context_command" | "usercontextmenucommand" => {
                Self::UserContextCommand
            }
            "message" | "message_context_command" | "messagecontextmenucommand" => {
                Self::MessageContextCommand
            }
            "component" => Self::Component,
            _ => return Err(()),
        })
    }
}

/// Where an incoming interaction is routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Run the middleware chain and the terminal handler of a definition
    /// in the given partition.
    Execute(HandlerKind),
    /// Run only the autocomplete callback of a slash command.
    Autocomplete,
}

impl Route {
    /// Returns the partition this route looks up.
    pub fn partition(&self) -> HandlerKind {
        match self {
            Self::Execute(kind) => *kind,
            Self::Autocomplete => HandlerKind::SlashCommand,
        }
    }
}
