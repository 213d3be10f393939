use std::collections::{BTreeMap, BTreeSet};

use super::types::{LogicalKeyId, PhysicalKeyId};

/// Every key touched during the current session, kept so the watchdog can let
/// go of all of them at once.
///
/// Entries are keyed by the voted key and remember the physical key it was
/// remapped to, which is what gets released. Nothing is ever removed; a new
/// session starts with a fresh registry.
#[derive(Debug, Clone, Default)]
pub struct KnownKeysRegistry {
    keys: BTreeMap<LogicalKeyId, PhysicalKeyId>,
}

impl KnownKeysRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, logical: &LogicalKeyId, physical: &PhysicalKeyId) {
        if !self.keys.contains_key(logical) {
            tracing::debug!(key = %logical, physical = %physical, "registered key");
            self.keys.insert(logical.clone(), physical.clone());
        }
    }

    pub fn snapshot(&self) -> BTreeSet<PhysicalKeyId> {
        self.keys.values().cloned().collect()
    }

    pub fn entries(&self) -> Vec<(LogicalKeyId, PhysicalKeyId)> {
        self.keys
            .iter()
            .map(|(logical, physical)| (logical.clone(), physical.clone()))
            .collect()
    }

    pub fn contains(&self, physical: &PhysicalKeyId) -> bool {
        self.keys.values().any(|known| known == physical)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
