//! Session store - the single source of truth for who is logged in
//!
//! A cheap, cloneable handle over a [`TabStorage`]. Only the login and logout
//! paths write to it.

use super::{MemoryTabStorage, Session, SessionFields, TabStorage};
use crate::auth::Role;
use crate::ClientResult;
use std::sync::Arc;
use tracing::{info, warn};

pub const KEY_NAME: &str = "name";
pub const KEY_PHONE: &str = "phone";
pub const KEY_ROLE: &str = "role";
pub const KEY_REGISTER_NO: &str = "registerNo";

const ALL_KEYS: [&str; 4] = [KEY_NAME, KEY_PHONE, KEY_ROLE, KEY_REGISTER_NO];

#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn TabStorage>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl SessionStore {
    pub fn new(storage: Arc<dyn TabStorage>) -> Self {
        Self { storage }
    }

    /// Store backed by a fresh in-memory tab
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTabStorage::new()))
    }

    /// Write all four fields, replacing whatever was there. No validation.
    pub fn set_session(&self, fields: &SessionFields) -> ClientResult<()> {
        self.storage.set_items(&[
            (KEY_NAME, fields.name.as_str()),
            (KEY_PHONE, fields.phone.as_str()),
            (KEY_ROLE, fields.role.as_str()),
            (KEY_REGISTER_NO, fields.register_no.as_str()),
        ])?;
        info!(
            register_no = %fields.register_no,
            role = %fields.role,
            "Session stored"
        );
        Ok(())
    }

    /// Stored role, or `Student` when unset or unrecognised
    pub fn get_role(&self) -> Role {
        Role::from_stored(self.read(KEY_ROLE).as_deref())
    }

    /// The raw stored role string, if any
    pub fn raw_role(&self) -> Option<String> {
        self.read(KEY_ROLE)
    }

    pub fn name(&self) -> Option<String> {
        self.read(KEY_NAME)
    }

    pub fn phone(&self) -> Option<String> {
        self.read(KEY_PHONE)
    }

    pub fn register_no(&self) -> Option<String> {
        self.read(KEY_REGISTER_NO)
    }

    /// The full session, present whenever a register number is stored.
    ///
    /// A missing role reads as `Student`, same as [`SessionStore::get_role`].
    pub fn get(&self) -> Option<Session> {
        let register_no = self.read(KEY_REGISTER_NO)?;
        Some(Session {
            name: self.name().unwrap_or_default(),
            phone: self.phone().unwrap_or_default(),
            role: self.get_role(),
            register_no,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.get().is_some()
    }

    /// Remove every session field
    pub fn clear(&self) -> ClientResult<()> {
        for key in ALL_KEYS {
            self.storage.remove_item(key)?;
        }
        info!("Session cleared");
        Ok(())
    }

    // Absent, empty and unreadable values all read as None
    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get_item(key) {
            Ok(Some(value)) if !value.is_empty() => Some(value),
            Ok(_) => None,
            Err(e) => {
                warn!(key, error = %e, "Failed to read session field, treating as absent");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staff() -> SessionFields {
        SessionFields::new("Ravi", "90000", "staff", "ST-01")
    }

    #[test]
    fn role_defaults_to_student() {
        let store = SessionStore::in_memory();
        assert_eq!(store.get_role(), Role::Student);
        assert!(!store.is_authenticated());
        assert_eq!(store.get(), None);
    }

    #[test]
    fn set_then_get_role() {
        let store = SessionStore::in_memory();
        store.set_session(&staff()).unwrap();

        assert_eq!(store.get_role(), Role::Staff);
        let session = store.get().unwrap();
        assert_eq!(session.name, "Ravi");
        assert_eq!(session.phone, "90000");
        assert_eq!(session.register_no, "ST-01");
    }

    #[test]
    fn clear_resets_everything() {
        let store = SessionStore::in_memory();
        store.set_session(&staff()).unwrap();
        store.clear().unwrap();

        assert_eq!(store.get_role(), Role::Student);
        assert_eq!(store.name(), None);
        assert_eq!(store.phone(), None);
        assert_eq!(store.register_no(), None);
        assert_eq!(store.raw_role(), None);
        assert!(!store.is_authenticated());
    }

    #[test]
    fn set_overwrites_previous_session() {
        let store = SessionStore::in_memory();
        store.set_session(&staff()).unwrap();
        store
            .set_session(&SessionFields::new("", "", "admin", "AD-1"))
            .unwrap();

        assert_eq!(store.get_role(), Role::Admin);
        assert_eq!(store.name(), None);
        assert_eq!(store.register_no().as_deref(), Some("AD-1"));
    }

    #[test]
    fn unknown_role_is_kept_raw_but_reads_as_student() {
        let store = SessionStore::in_memory();
        store
            .set_session(&SessionFields::new("X", "0", "dean", "D-1"))
            .unwrap();
        assert_eq!(store.raw_role().as_deref(), Some("dean"));
        assert_eq!(store.get_role(), Role::Student);
        assert_eq!(store.get().map(|s| s.role), Some(Role::Student));
    }

    #[test]
    fn session_requires_register_no() {
        let store = SessionStore::in_memory();
        store
            .set_session(&SessionFields::new("A", "1", "admin", ""))
            .unwrap();
        assert!(store.get().is_none());

        store
            .set_session(&SessionFields::new("A", "1", "", "R1"))
            .unwrap();
        assert_eq!(store.get().map(|s| s.role), Some(Role::Student));
    }

    #[test]
    fn clones_share_the_same_tab() {
        let store = SessionStore::in_memory();
        let other = store.clone();
        store.set_session(&staff()).unwrap();
        assert_eq!(other.get_role(), Role::Staff);
    }

    #[test]
    fn separate_stores_do_not_share() {
        let first = SessionStore::in_memory();
        let second = SessionStore::in_memory();
        first.set_session(&staff()).unwrap();
        assert!(!second.is_authenticated());
    }
}
