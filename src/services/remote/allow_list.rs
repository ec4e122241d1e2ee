//! Allow-list
//!
//! Operator-curated set of identities the bot talks to.

use script_relay_core::Identity;

/// Configured identities, in configuration order.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    ids: Vec<Identity>,
}

impl AllowList {
    pub fn new(ids: impl IntoIterator<Item = Identity>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    /// Whether `identity` is allowed (exact match, linear scan).
    pub fn is_available(&self, identity: &Identity) -> bool {
        self.ids.iter().any(|id| id == identity)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Identity> {
        self.ids.iter()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
