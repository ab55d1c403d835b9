use std::sync::Arc;

use tracing::{debug, warn};

use crate::tprintln;

use super::profile::Profile;
use super::role::Role;
use super::storage::{MemoryStorage, SessionStorage, StorageError};

pub type SessionToken = String;

/// Storage keys. One pair is used everywhere: token and role are written and
/// cleared together under these names.
pub const TOKEN_KEY: &str = "userToken";
pub const ROLE_KEY: &str = "userType";
pub const PROFILE_KEY: &str = "userData";

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: SessionToken,
    pub role: Role,
    pub profile: Option<Profile>,
}

/// Single source of truth for who is signed in and as what role.
///
/// Cheap to clone; clones share the same storage. The store never navigates:
/// callers redirect after `login`/`logout`.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
}

impl Default for SessionStore {
    fn default() -> Self { Self::in_memory() }
}

impl SessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self { Self { storage } }

    pub fn in_memory() -> Self { Self::new(Arc::new(MemoryStorage::new())) }

    /// Replace any prior session with `{role, token}` and an optional profile.
    /// The token is opaque and trusted until the backend rejects it.
    pub fn login(&self, role: Role, token: impl Into<SessionToken>, profile: Option<Profile>) {
        let token = token.into();
        self.logout();
        self.write(ROLE_KEY, role.as_str());
        self.write(TOKEN_KEY, &token);
        if let Some(p) = profile {
            self.write_profile(&p);
        }
        debug!(target: "campusgate::session", "session.login role={}", role);
    }

    /// Read the persisted pair. A token without a role, a role without a token,
    /// or an unrecognised role string all mean "no session".
    pub fn current_session(&self) -> Option<Session> {
        let token = self.storage.get(TOKEN_KEY).filter(|t| !t.is_empty());
        let role_raw = self.storage.get(ROLE_KEY);
        let (token, role_raw) = match (token, role_raw) {
            (Some(t), Some(r)) => (t, r),
            (None, None) => return None,
            (t, r) => {
                tprintln!("session.read half-pair token={} role={:?}", t.is_some(), r);
                return None;
            }
        };
        let role = match role_raw.parse::<Role>() {
            Ok(r) => r,
            Err(_) => {
                warn!(target: "campusgate::session", "ignoring stored session with unknown role '{}'", role_raw);
                return None;
            }
        };
        let profile = self.storage.get(PROFILE_KEY).and_then(|raw| match serde_json::from_str::<Profile>(&raw) {
            Ok(p) => Some(p),
            Err(e) => {
                warn!(target: "campusgate::session", "dropping unreadable cached profile: {}", e);
                None
            }
        });
        Some(Session { token, role, profile })
    }

    /// Clear token, role and profile. Safe to call when already signed out.
    pub fn logout(&self) {
        for key in [TOKEN_KEY, ROLE_KEY, PROFILE_KEY] {
            if let Err(e) = self.storage.remove(key) {
                warn!(target: "campusgate::session", "failed to clear '{}': {}", key, e);
            }
        }
        debug!(target: "campusgate::session", "session.logout");
    }

    /// Cache the self-lookup record. Has no effect on authorization and is
    /// ignored when nobody is signed in.
    pub fn set_profile(&self, profile: Profile) {
        if self.current_session().is_none() {
            debug!(target: "campusgate::session", "set_profile ignored: no session");
            return;
        }
        self.write_profile(&profile);
    }

    fn write_profile(&self, profile: &Profile) {
        match serde_json::to_string(profile) {
            Ok(text) => self.write(PROFILE_KEY, &text),
            Err(e) => warn!(target: "campusgate::session", "failed to encode profile: {}", e),
        }
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.storage.set(key, value) {
            log_storage_failure(key, &e);
        }
    }
}

fn log_storage_failure(key: &str, err: &StorageError) {
    warn!(target: "campusgate::session", "failed to persist '{}': {}", key, err);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str) -> Profile {
        Profile { first_name: Some(name.into()), ..Default::default() }
    }

    /// Memory storage whose writes to selected keys fail.
    #[derive(Default)]
    struct FailingStorage {
        inner: MemoryStorage,
        broken: parking_lot::Mutex<Vec<&'static str>>,
    }

    impl FailingStorage {
        fn break_key(&self, key: &'static str) { self.broken.lock().push(key); }

        fn check(&self, key: &str) -> Result<(), StorageError> {
            if self.broken.lock().iter().any(|k| *k == key) {
                return Err(StorageError::Io {
                    path: "session.json".into(),
                    source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
                });
            }
            Ok(())
        }
    }

    impl SessionStorage for FailingStorage {
        fn get(&self, key: &str) -> Option<String> { self.inner.get(key) }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.check(key)?;
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.check(key)?;
            self.inner.remove(key)
        }
    }

    #[test]
    fn login_then_read_returns_exact_pair() {
        let store = SessionStore::in_memory();
        store.login(Role::Admin, "abc", None);
        let s = store.current_session().unwrap();
        assert_eq!(s.role, Role::Admin);
        assert_eq!(s.token, "abc");
        assert!(s.profile.is_none());
    }

    #[test]
    fn relogin_drops_previous_profile() {
        let store = SessionStore::in_memory();
        store.login(Role::Faculty, "t1", Some(profile("Old")));
        assert!(store.current_session().unwrap().profile.is_some());
        store.login(Role::Student, "t2", None);
        let s = store.current_session().unwrap();
        assert_eq!(s, Session { token: "t2".into(), role: Role::Student, profile: None });
    }

    #[test]
    fn half_pairs_are_not_sessions() {
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::new(storage.clone());
        storage.set(TOKEN_KEY, "abc").unwrap();
        assert!(store.current_session().is_none());
        storage.remove(TOKEN_KEY).unwrap();
        storage.set(ROLE_KEY, "Admin").unwrap();
        assert!(store.current_session().is_none());
        storage.set(TOKEN_KEY, "").unwrap();
        assert!(store.current_session().is_none());
    }

    #[test]
    fn unknown_stored_role_is_no_session() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(TOKEN_KEY, "abc").unwrap();
        storage.set(ROLE_KEY, "Janitor").unwrap();
        assert!(SessionStore::new(storage).current_session().is_none());
    }

    #[test]
    fn logout_is_idempotent() {
        let store = SessionStore::in_memory();
        store.logout();
        assert!(store.current_session().is_none());
        store.login(Role::Admin, "abc", Some(profile("A")));
        store.logout();
        assert!(store.current_session().is_none());
        store.logout();
        assert!(store.current_session().is_none());
    }

    #[test]
    fn set_profile_updates_cache_only_when_signed_in() {
        let store = SessionStore::in_memory();
        store.set_profile(profile("Ghost"));
        store.login(Role::Student, "abc", None);
        assert!(store.current_session().unwrap().profile.is_none());

        store.set_profile(profile("Asha"));
        let s = store.current_session().unwrap();
        assert_eq!(s.role, Role::Student);
        assert_eq!(s.token, "abc");
        assert_eq!(s.profile.unwrap().first_name.as_deref(), Some("Asha"));
    }

    #[test]
    fn clones_share_state() {
        let a = SessionStore::in_memory();
        let b = a.clone();
        a.login(Role::Faculty, "t", None);
        assert_eq!(b.current_session().unwrap().role, Role::Faculty);
        b.logout();
        assert!(a.current_session().is_none());
    }

    #[test]
    fn failed_token_write_leaves_no_session() {
        let storage = Arc::new(FailingStorage::default());
        storage.break_key(TOKEN_KEY);
        let store = SessionStore::new(storage.clone());
        store.login(Role::Admin, "abc", None);
        assert_eq!(storage.get(ROLE_KEY).as_deref(), Some("Admin"));
        assert!(store.current_session().is_none());
    }

    #[test]
    fn failed_profile_write_keeps_session_without_profile() {
        let storage = Arc::new(FailingStorage::default());
        storage.break_key(PROFILE_KEY);
        let store = SessionStore::new(storage);
        store.login(Role::Student, "abc", Some(profile("Asha")));
        store.set_profile(profile("Asha"));
        let s = store.current_session().unwrap();
        assert_eq!((s.role, s.token.as_str()), (Role::Student, "abc"));
        assert!(s.profile.is_none());
    }

    #[test]
    fn partially_failed_logout_is_still_signed_out() {
        let storage = Arc::new(FailingStorage::default());
        let store = SessionStore::new(storage.clone());
        store.login(Role::Faculty, "abc", None);
        storage.break_key(ROLE_KEY);
        store.logout();
        store.logout();
        assert_eq!(storage.get(ROLE_KEY).as_deref(), Some("Faculty"));
        assert!(store.current_session().is_none());
    }
}
