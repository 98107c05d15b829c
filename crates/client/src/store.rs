//! Typed slot layout of the persisted session.
//!
//! Three slots: `user` (JSON identity), `accessToken`, `refreshToken`.
//! Identity and access token together are the restore condition. An optional
//! fourth slot, `expiresIn`, keeps the last reported token lifetime so a
//! restored session renews on the same schedule.

use std::sync::Arc;
use std::time::Duration;

use shopdesk_auth::{SessionRecord, TokenPair, UserIdentity};

use crate::storage::{SessionStorage, StorageError};

pub const USER_SLOT: &str = "user";
pub const ACCESS_TOKEN_SLOT: &str = "accessToken";
pub const REFRESH_TOKEN_SLOT: &str = "refreshToken";
pub const TOKEN_LIFETIME_SLOT: &str = "expiresIn";

/// Single writer of the persisted session. Only the session core holds one.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self { storage }
    }

    /// Read back a persisted session.
    ///
    /// Returns `None` unless both the identity slot and the access-token slot
    /// are present. A missing refresh token still restores (with an empty
    /// refresh token); the next renewal tick then fails closed.
    pub fn load(&self) -> Option<SessionRecord> {
        let raw_identity = self.storage.get(USER_SLOT)?;
        let access_token = self.storage.get(ACCESS_TOKEN_SLOT)?;

        let identity: UserIdentity = match serde_json::from_str(&raw_identity) {
            Ok(identity) => identity,
            Err(err) => {
                tracing::warn!(error = %err, "persisted identity is unreadable; discarding session");
                self.clear();
                return None;
            }
        };

        let refresh_token = self.storage.get(REFRESH_TOKEN_SLOT).unwrap_or_default();
        Some(SessionRecord::new(identity, TokenPair::new(access_token, refresh_token)))
    }

    /// Persist a full record. On failure nothing is left behind.
    pub fn save(&self, record: &SessionRecord) -> Result<(), StorageError> {
        let identity = serde_json::to_string(&record.identity).map_err(|e| StorageError::Write {
            key: USER_SLOT.to_string(),
            reason: e.to_string(),
        })?;

        let result = self
            .write_tokens(&record.tokens)
            .and_then(|()| self.storage.set(USER_SLOT, &identity));
        if result.is_err() {
            self.clear();
        }
        result
    }

    /// Replace the token pair; the identity slot is not touched.
    pub fn replace_tokens(&self, tokens: &TokenPair) -> Result<(), StorageError> {
        self.write_tokens(tokens)
    }

    fn write_tokens(&self, tokens: &TokenPair) -> Result<(), StorageError> {
        self.storage.set(ACCESS_TOKEN_SLOT, &tokens.access_token)?;
        self.storage.set(REFRESH_TOKEN_SLOT, &tokens.refresh_token)
    }

    /// Remember the access-token lifetime in seconds; `None` forgets it.
    pub fn save_token_lifetime(&self, ttl: Option<Duration>) -> Result<(), StorageError> {
        match ttl {
            Some(ttl) => self
                .storage
                .set(TOKEN_LIFETIME_SLOT, &ttl.as_secs().to_string()),
            None => {
                self.storage.remove(TOKEN_LIFETIME_SLOT);
                Ok(())
            }
        }
    }

    /// Last remembered lifetime. Unparseable or zero values are ignored.
    pub fn token_lifetime(&self) -> Option<Duration> {
        self.storage
            .get(TOKEN_LIFETIME_SLOT)?
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn access_token(&self) -> Option<String> {
        self.storage.get(ACCESS_TOKEN_SLOT)
    }

    /// The refresh token, if present and non-empty.
    pub fn refresh_token(&self) -> Option<String> {
        self.storage
            .get(REFRESH_TOKEN_SLOT)
            .filter(|token| !token.is_empty())
    }

    pub fn clear(&self) {
        self.storage.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use shopdesk_auth::{Privilege, Role};
    use shopdesk_core::UserId;

    fn record() -> SessionRecord {
        SessionRecord::new(
            UserIdentity {
                user_id: UserId::new(1),
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                full_name: "Alice".to_string(),
                role: Role::Staff,
                privilege: Privilege::Read,
            },
            TokenPair::new("acc-1", "ref-1"),
        )
    }

    fn store() -> (SessionStore, MemoryStorage) {
        let storage = MemoryStorage::new();
        (SessionStore::new(Arc::new(storage.clone())), storage)
    }

    #[test]
    fn saved_record_loads_back() {
        let (store, storage) = store();
        store.save(&record()).unwrap();

        assert_eq!(storage.len(), 3);
        assert_eq!(store.load(), Some(record()));
    }

    #[test]
    fn identity_without_access_token_does_not_restore() {
        let (store, storage) = store();
        store.save(&record()).unwrap();
        storage.remove(ACCESS_TOKEN_SLOT);

        assert!(store.load().is_none());
    }

    #[test]
    fn access_token_without_identity_does_not_restore() {
        let (store, storage) = store();
        storage.set(ACCESS_TOKEN_SLOT, "acc").unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn unreadable_identity_is_discarded() {
        let (store, storage) = store();
        storage.set(USER_SLOT, "{not json").unwrap();
        storage.set(ACCESS_TOKEN_SLOT, "acc").unwrap();

        assert!(store.load().is_none());
        assert!(storage.is_empty());
    }

    #[test]
    fn missing_refresh_token_restores_but_reports_none() {
        let (store, storage) = store();
        store.save(&record()).unwrap();
        storage.remove(REFRESH_TOKEN_SLOT);

        let restored = store.load().unwrap();
        assert!(restored.tokens.refresh_token.is_empty());
        assert!(store.refresh_token().is_none());
    }

    #[test]
    fn replace_tokens_leaves_identity_alone() {
        let (store, storage) = store();
        store.save(&record()).unwrap();
        let identity_before = storage.get(USER_SLOT);

        store.replace_tokens(&TokenPair::new("acc-2", "ref-2")).unwrap();

        assert_eq!(storage.get(USER_SLOT), identity_before);
        assert_eq!(store.access_token().as_deref(), Some("acc-2"));
        assert_eq!(store.refresh_token().as_deref(), Some("ref-2"));
    }

    #[test]
    fn token_lifetime_is_remembered_until_cleared() {
        let (store, storage) = store();
        store.save(&record()).unwrap();
        assert!(store.token_lifetime().is_none());

        store.save_token_lifetime(Some(Duration::from_secs(60))).unwrap();
        assert_eq!(storage.get(TOKEN_LIFETIME_SLOT).as_deref(), Some("60"));
        assert_eq!(store.token_lifetime(), Some(Duration::from_secs(60)));

        store.save_token_lifetime(None).unwrap();
        assert!(store.token_lifetime().is_none());

        store.save_token_lifetime(Some(Duration::from_secs(900))).unwrap();
        store.clear();
        assert!(store.token_lifetime().is_none());
    }

    #[test]
    fn garbage_token_lifetime_is_ignored() {
        let (store, storage) = store();
        storage.set(TOKEN_LIFETIME_SLOT, "soon").unwrap();
        assert!(store.token_lifetime().is_none());

        storage.set(TOKEN_LIFETIME_SLOT, "0").unwrap();
        assert!(store.token_lifetime().is_none());
    }

    struct FullStorage;

    impl SessionStorage for FullStorage {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }
        fn set(&self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Write {
                key: key.to_string(),
                reason: "quota exceeded".to_string(),
            })
        }
        fn remove(&self, _key: &str) {}
        fn clear(&self) {}
    }

    #[test]
    fn write_failure_is_reported() {
        let store = SessionStore::new(Arc::new(FullStorage));
        let err = store.save(&record()).unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
    }
}
