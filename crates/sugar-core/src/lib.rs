//! # Sugar Core
//!
//! Foundation types for the Sugar interaction dispatch framework.
//!
//! This crate provides:
//! - **Identifier codec** ([`custom_id`]): embeds a routing key and an
//!   argument list in a single component custom ID, and recovers them
//! - **Identifier generation** ([`IdGenerator`]): per-instance sequential IDs
//!   for components without an explicit one
//! - **Interaction abstraction** ([`Interaction`], [`BoxedInteraction`]): the
//!   opaque event the dispatcher classifies and routes
//! - **Handler kinds** ([`HandlerKind`], [`Route`]): the four registry
//!   partitions and the routing decision for an interaction
//!
//! The dispatch engine itself lives in `sugar-framework`.

pub mod custom_id;
pub mod error;
pub mod id;
pub mod interaction;
pub mod kind;
pub mod testing;

pub use custom_id::CustomId;
pub use error::{ReplyError, ReplyResult};
pub use id::IdGenerator;
pub use interaction::{
    AutocompleteChoice, BoxedInteraction, Interaction, InteractionKind, SelectMenuKind,
};
pub use kind::{HandlerKind, Route};

/// Prelude for common imports.
pub mod prelude {
    pub use super::custom_id::{self, CustomId};
    pub use super::{
        AutocompleteChoice, BoxedInteraction, HandlerKind, IdGenerator, Interaction,
        InteractionKind, ReplyError, ReplyResult, Route, SelectMenuKind,
    };
}
