//! Storage ports: persisted identifiers and the active-ad registry.
//!
//! Both collaborators are owned by the integrating host. The adapter reads
//! and writes a couple of keys through [`KeyValueStore`] and asks
//! [`AdStorage`] one membership question for the concurrent-load guard; it
//! never iterates or mutates the active-ad set itself.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use tracing::debug;

/// Key under which the generated stable user identifier is persisted.
pub const USER_ID_KEY: &str = "viaduct.partner.user_id";

/// Key under which the age-restricted flag is persisted.
pub const AGE_RESTRICTED_KEY: &str = "viaduct.partner.age_restricted";

/// Host-owned key-value persistence.
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, last write wins.
    fn set(&self, key: &str, value: &str);
}

/// Host-owned registry of currently active ad instances.
///
/// The host inserts on creation and removes on disposal; the adapter only
/// queries membership.
pub trait AdStorage: Send + Sync {
    /// Whether any active instance targets this placement.
    fn has_active(&self, placement: &str) -> bool;
}

/// In-memory [`KeyValueStore`], for tests and hosts without persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }
}

/// In-memory [`AdStorage`] backed by a placement set.
#[derive(Debug, Default)]
pub struct MemoryAdStorage {
    active: Mutex<HashSet<String>>,
}

impl MemoryAdStorage {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a placement active.
    pub fn insert(&self, placement: &str) {
        self.active.lock().unwrap().insert(placement.to_string());
    }

    /// Mark a placement inactive.
    pub fn remove(&self, placement: &str) {
        self.active.lock().unwrap().remove(placement);
    }
}

impl AdStorage for MemoryAdStorage {
    fn has_active(&self, placement: &str) -> bool {
        self.active.lock().unwrap().contains(placement)
    }
}

/// Read the stable user identifier, generating and persisting it on first
/// use. The identifier survives for the lifetime of the store, never the
/// process alone.
pub fn stable_user_id(store: &dyn KeyValueStore) -> String {
    if let Some(existing) = store.get(USER_ID_KEY) {
        return existing;
    }
    let id = hex::encode(rand::random::<[u8; 16]>());
    store.set(USER_ID_KEY, &id);
    debug!(user_id = %id, "generated stable user identifier");
    id
}

/// Read the persisted age-restricted flag; absent means not restricted.
pub fn read_age_restricted(store: &dyn KeyValueStore) -> bool {
    store
        .get(AGE_RESTRICTED_KEY)
        .is_some_and(|v| v == "true")
}

/// Persist the age-restricted flag, last write wins.
pub fn write_age_restricted(store: &dyn KeyValueStore, restricted: bool) {
    store.set(AGE_RESTRICTED_KEY, if restricted { "true" } else { "false" });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_is_generated_once_and_reused() {
        let store = MemoryStore::new();

        let first = stable_user_id(&store);
        let second = stable_user_id(&store);

        assert_eq!(first, second);
        assert_eq!(first.len(), 32);
        assert_eq!(store.get(USER_ID_KEY), Some(first));
    }

    #[test]
    fn distinct_stores_get_distinct_ids() {
        let a = stable_user_id(&MemoryStore::new());
        let b = stable_user_id(&MemoryStore::new());
        assert_ne!(a, b);
    }

    #[test]
    fn age_restricted_defaults_to_false_and_last_write_wins() {
        let store = MemoryStore::new();
        assert!(!read_age_restricted(&store));

        write_age_restricted(&store, true);
        assert!(read_age_restricted(&store));

        write_age_restricted(&store, false);
        assert!(!read_age_restricted(&store));
    }

    #[test]
    fn ad_storage_membership() {
        let storage = MemoryAdStorage::new();
        assert!(!storage.has_active("slot"));

        storage.insert("slot");
        assert!(storage.has_active("slot"));

        storage.remove("slot");
        assert!(!storage.has_active("slot"));
    }
}
