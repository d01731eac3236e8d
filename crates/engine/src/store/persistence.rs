// JSON persistence adapter over a key-value backend.
//
// Reads never fail: an absent key, a backend read error or undecodable JSON
// all come back as `None` and the caller falls back to its default.

use ghostwrite_common::types::User;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use super::kv::KeyValueStore;
use super::StoreError;

/// Key holding the JSON array of documents.
pub const DOCUMENTS_KEY: &str = "ghostwrite.documents";
/// Key holding the JSON-encoded local identity.
pub const USER_KEY: &str = "ghostwrite.user";

pub struct Persistence {
    kv: Box<dyn KeyValueStore + Send>,
}

impl Persistence {
    pub fn new(kv: impl KeyValueStore + Send + 'static) -> Self {
        Self { kv: Box::new(kv) }
    }

    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.kv.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(error) => {
                warn!(key, %error, "failed to read persisted value, using default");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(key, %error, "persisted value is corrupt, using default");
                None
            }
        }
    }

    /// Synchronous write-through.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(value)
            .map_err(|source| StoreError::Encode { key: key.to_string(), source })?;
        self.kv.put(key, &encoded)
    }

    pub fn load_user(&self) -> Option<User> {
        self.load(USER_KEY)
    }

    pub fn save_user(&self, user: &User) -> Result<(), StoreError> {
        self.save(USER_KEY, user)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::store::kv::MemoryKvStore;

    fn user() -> User {
        User {
            id: "user-1".into(),
            name: "Tess".into(),
            color: "#3b82f6".into(),
            is_online: true,
            last_seen: Utc::now(),
            cursor_position: 0,
        }
    }

    #[test]
    fn absent_key_loads_none() {
        let persistence = Persistence::new(MemoryKvStore::new());
        assert!(persistence.load_user().is_none());
    }

    #[test]
    fn corrupt_value_loads_none() {
        let persistence = Persistence::new(MemoryKvStore::new().with_entry(USER_KEY, "{not json"));
        assert!(persistence.load_user().is_none());
    }

    #[test]
    fn wrong_shape_loads_none() {
        let persistence = Persistence::new(MemoryKvStore::new().with_entry(USER_KEY, "[1, 2, 3]"));
        assert!(persistence.load_user().is_none());
    }

    #[test]
    fn saved_user_is_loaded_back() {
        let kv = MemoryKvStore::new();
        let persistence = Persistence::new(kv.clone());
        let tess = user();

        persistence.save_user(&tess).unwrap();

        assert_eq!(persistence.load_user(), Some(tess));
        assert!(kv.raw(USER_KEY).unwrap().contains("\"isOnline\":true"));
    }

    #[test]
    fn save_surfaces_backend_failures() {
        let kv = MemoryKvStore::new();
        kv.set_fail_writes(true);
        let persistence = Persistence::new(kv);
        assert!(matches!(persistence.save_user(&user()), Err(StoreError::Unavailable(_))));
    }
}
