//! JID-alias table: a channel may address the same logical workspace chat
//! under a platform-specific id (§4.G step 2).

use std::collections::HashMap;
use std::sync::RwLock;

/// Maps `(channel, chat_id_on_channel)` to the canonical chat id every
/// downstream component (queue, history, cursors) keys on.
///
/// Unregistered pairs resolve to the platform id itself — registration is
/// only needed where a channel's native id differs from the canonical one.
#[derive(Debug, Default)]
pub struct AliasTable {
    aliases: RwLock<HashMap<(String, String), String>>,
}

impl AliasTable {
    /// An empty table: every chat id resolves to itself until aliased.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an alias. Replaces any prior alias for the same pair.
    pub fn register(&self, channel: impl Into<String>, chat_id_on_channel: impl Into<String>, canonical: impl Into<String>) {
        let mut aliases = self.aliases.write().expect("alias table lock poisoned");
        aliases.insert((channel.into(), chat_id_on_channel.into()), canonical.into());
    }

    /// Resolve a platform-native chat id to its canonical form.
    #[must_use]
    pub fn resolve(&self, channel: &str, chat_id_on_channel: &str) -> String {
        let aliases = self.aliases.read().expect("alias table lock poisoned");
        aliases
            .get(&(channel.to_string(), chat_id_on_channel.to_string()))
            .cloned()
            .unwrap_or_else(|| chat_id_on_channel.to_string())
    }

    /// Remove an alias, reverting the pair to self-resolution.
    pub fn unregister(&self, channel: &str, chat_id_on_channel: &str) {
        let mut aliases = self.aliases.write().expect("alias table lock poisoned");
        aliases.remove(&(channel.to_string(), chat_id_on_channel.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_pair_resolves_to_itself() {
        let table = AliasTable::new();
        assert_eq!(table.resolve("telegram", "123"), "123");
    }

    #[test]
    fn registered_pair_resolves_to_the_canonical_id() {
        let table = AliasTable::new();
        table.register("telegram", "123", "acme-team");
        assert_eq!(table.resolve("telegram", "123"), "acme-team");
        assert_eq!(table.resolve("slack", "123"), "123", "aliasing is scoped to the channel");
    }

    #[test]
    fn unregister_reverts_to_self_resolution() {
        let table = AliasTable::new();
        table.register("telegram", "123", "acme-team");
        table.unregister("telegram", "123");
        assert_eq!(table.resolve("telegram", "123"), "123");
    }
}
