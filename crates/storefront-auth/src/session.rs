//! Persisted login session.
//!
//! Three keys make up a session: the bearer token, the user record and a
//! logged-in flag. Anything unreadable is treated as "no session".

use storefront_fetch::TokenProvider;
use storefront_store::{keys, TypedStore};

use crate::user::UserRecord;

/// A complete stored session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: UserRecord,
}

/// Session persistence over the key-value store.
#[derive(Debug, Clone)]
pub struct SessionStore {
    store: TypedStore,
}

impl SessionStore {
    pub fn new(store: TypedStore) -> Self {
        Self { store }
    }

    /// Persist a fresh session.
    pub fn save(&self, token: &str, user: &UserRecord) -> Result<(), storefront_store::StoreError> {
        self.store.set_string(keys::AUTH_TOKEN, token)?;
        self.store.save(user)?;
        self.store.set_string(keys::IS_LOGGED_IN, "true")?;
        tracing::debug!(user_id = %user.user_id, "session saved");
        Ok(())
    }

    /// The stored bearer token.
    pub fn token(&self) -> Option<String> {
        match self.store.get_string(keys::AUTH_TOKEN) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "auth token unreadable");
                None
            }
        }
    }

    /// The stored user record.
    pub fn user(&self) -> Option<UserRecord> {
        match self.store.load::<UserRecord>() {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(error = %e, "stored user unreadable; ignoring session");
                None
            }
        }
    }

    /// Whether a usable session is stored.
    pub fn is_logged_in(&self) -> bool {
        self.session().is_some()
    }

    /// Token and user, if both are present and the flag is set.
    pub fn session(&self) -> Option<Session> {
        let flag = match self.store.get_string(keys::IS_LOGGED_IN) {
            Ok(flag) => flag,
            Err(e) => {
                tracing::warn!(error = %e, "login flag unreadable");
                None
            }
        };
        if flag.as_deref() != Some("true") {
            return None;
        }
        Some(Session {
            token: self.token()?,
            user: self.user()?,
        })
    }

    /// Forget the session.
    pub fn clear(&self) {
        for key in [keys::AUTH_TOKEN, keys::USER, keys::IS_LOGGED_IN] {
            if let Err(e) = self.store.delete(key) {
                tracing::warn!(key, error = %e, "failed to clear session key");
            }
        }
    }
}

impl TokenProvider for SessionStore {
    fn bearer_token(&self) -> Option<String> {
        self.token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::Role;
    use std::sync::Arc;
    use storefront_commerce::ids::UserId;
    use storefront_store::{KeyValueStore, MemoryStore};

    fn user() -> UserRecord {
        UserRecord {
            user_id: UserId::new("u1"),
            username: "ann".to_string(),
            email: Some("ann@shop.io".to_string()),
            role: Role::Admin,
        }
    }

    fn sessions() -> (Arc<MemoryStore>, SessionStore) {
        let backend = Arc::new(MemoryStore::new());
        (backend.clone(), SessionStore::new(TypedStore::new(backend)))
    }

    #[test]
    fn test_save_and_read_back() {
        let (backend, sessions) = sessions();
        sessions.save("tok-1", &user()).unwrap();

        let session = sessions.session().unwrap();
        assert_eq!(session.token, "tok-1");
        assert_eq!(session.user, user());
        assert_eq!(sessions.bearer_token().as_deref(), Some("tok-1"));
        assert_eq!(backend.get(keys::AUTH_TOKEN).unwrap().as_deref(), Some("tok-1"));
    }

    #[test]
    fn test_corrupt_user_means_no_session() {
        let (backend, sessions) = sessions();
        sessions.save("tok-1", &user()).unwrap();
        backend.set(keys::USER, "{broken").unwrap();

        assert!(sessions.session().is_none());
        assert!(!sessions.is_logged_in());
    }

    #[test]
    fn test_reads_unversioned_user() {
        let (backend, sessions) = sessions();
        backend.set(keys::AUTH_TOKEN, "t").unwrap();
        backend.set(keys::IS_LOGGED_IN, "true").unwrap();
        backend
            .set(keys::USER, r#"{"userId":"u9","username":"old","role":"user"}"#)
            .unwrap();

        assert_eq!(sessions.user().unwrap().user_id.as_str(), "u9");
        assert!(sessions.is_logged_in());
    }

    #[test]
    fn test_clear() {
        let (backend, sessions) = sessions();
        sessions.save("tok-1", &user()).unwrap();
        sessions.clear();

        assert!(sessions.session().is_none());
        assert!(backend.keys().unwrap().is_empty());
    }
}
