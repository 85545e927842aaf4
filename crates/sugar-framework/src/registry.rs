//! The handler registry.
//!
//! Four partitions, one per [`HandlerKind`], each mapping a routing key to a
//! [`HandlerDefinition`]. A registry is assembled once with
//! [`RegistryBuilder`] and is read-only afterwards, so any number of
//! dispatches can share it behind an `Arc` without locking.
//!
//! # Example
//!
//! ```rust,ignore
//! let registry = Registry::builder()
//!     .register(slash_command("ping").handler(ping))
//!     .register(component("pong").handler(pong))
//!     .build();
//!
//! assert!(registry.get(HandlerKind::Component, "pong").is_some());
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sugar_core::HandlerKind;
use tracing::debug;

use crate::definition::HandlerDefinition;

type Partition = HashMap<String, Arc<HandlerDefinition>>;

/// An immutable set of handler definitions, partitioned by kind.
#[derive(Debug, Default)]
pub struct Registry {
    slash_commands: Partition,
    user_commands: Partition,
    message_commands: Partition,
    components: Partition,
}

impl Registry {
    /// Starts building a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    fn partition(&self, kind: HandlerKind) -> &Partition {
        match kind {
            HandlerKind::SlashCommand => &self.slash_commands,
            HandlerKind::UserContextCommand => &self.user_commands,
            HandlerKind::MessageContextCommand => &self.message_commands,
            HandlerKind::Component => &self.components,
        }
    }

    /// Looks up `key` in the partition for `kind`.
    pub fn get(&self, kind: HandlerKind, key: &str) -> Option<&Arc<HandlerDefinition>> {
        self.partition(kind).get(key)
    }

    /// Returns the total number of definitions.
    pub fn len(&self) -> usize {
        HandlerKind::ALL.iter().map(|kind| self.len_of(*kind)).sum()
    }

    /// Returns `true` if no definitions are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of definitions in one partition.
    pub fn len_of(&self, kind: HandlerKind) -> usize {
        self.partition(kind).len()
    }

    /// Iterates over the definitions of one partition, in no particular order.
    pub fn iter_kind(&self, kind: HandlerKind) -> impl Iterator<Item = &Arc<HandlerDefinition>> {
        self.partition(kind).values()
    }

    /// Lists every command for registration with the platform.
    ///
    /// Ordered slash, user, message, and by name within a kind. Components
    /// are not part of the manifest.
    pub fn command_manifest(&self) -> Vec<CommandManifest> {
        HandlerKind::ALL
            .iter()
            .filter_map(|kind| kind.command_type().map(|ty| (*kind, ty)))
            .flat_map(|(kind, command_type)| {
                let mut entries: Vec<CommandManifest> = self
                    .iter_kind(kind)
                    .map(|def| CommandManifest {
                        name: def.routing_key().to_string(),
                        description: def.description().map(str::to_string),
                        command_type,
                    })
                    .collect();
                entries.sort_by(|a, b| a.name.cmp(&b.name));
                entries
            })
            .collect()
    }

    /// Serializes [`command_manifest`](Self::command_manifest) as JSON.
    pub fn manifest_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.command_manifest())
    }
}

/// One command entry in the registration manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandManifest {
    /// Command name.
    pub name: String,
    /// Command description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Platform command type: 1 chat input, 2 user, 3 message.
    #[serde(rename = "type")]
    pub command_type: u8,
}

/// Assembles a [`Registry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    registry: Registry,
}

impl RegistryBuilder {
    /// Adds a definition to its partition.
    ///
    /// A definition with the same key in the same partition is replaced.
    pub fn register(mut self, definition: HandlerDefinition) -> Self {
        self.insert(definition);
        self
    }

    /// Adds every definition from `definitions`, in order.
    pub fn extend<I>(mut self, definitions: I) -> Self
    where
        I: IntoIterator<Item = HandlerDefinition>,
    {
        for definition in definitions {
            self.insert(definition);
        }
        self
    }

    fn insert(&mut self, definition: HandlerDefinition) {
        let kind = definition.kind();
        let partition = match kind {
            HandlerKind::SlashCommand => &mut self.registry.slash_commands,
            HandlerKind::UserContextCommand => &mut self.registry.user_commands,
            HandlerKind::MessageContextCommand => &mut self.registry.message_commands,
            HandlerKind::Component => &mut self.registry.components,
        };
        let key = definition.routing_key().to_string();
        if partition.insert(key.clone(), Arc::new(definition)).is_some() {
            debug!(%kind, routing_key = %key, "Replaced existing handler definition");
        }
    }

    /// Finishes the registry.
    pub fn build(self) -> Registry {
        let registry = self.registry;
        debug!(
            slash = registry.slash_commands.len(),
            user = registry.user_commands.len(),
            message = registry.message_commands.len(),
            components = registry.components.len(),
            "Registry built"
        );
        registry
    }
}

impl FromIterator<HandlerDefinition> for Registry {
    fn from_iter<T: IntoIterator<Item = HandlerDefinition>>(iter: T) -> Self {
        Registry::builder().extend(iter).build()
    }
}
