//! In-memory credential store for tests.

use crate::error::{Result, SessionError};
use crate::providers::CredentialStore;
use crate::state::Identity;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Raw persisted pair, before the validity collapse.
type RawEntry = Option<(Option<String>, Option<String>)>;

/// In-memory [`CredentialStore`].
///
/// Stores the raw `(userId, authToken)` pair rather than an [`Identity`] so
/// tests can stage half-populated or corrupt entries, the way another
/// process could have left them. Clones share the same entry.
#[derive(Debug, Clone, Default)]
pub struct MockCredentialStore {
    entry: Arc<Mutex<RawEntry>>,
    fail_writes: Arc<AtomicBool>,
}

impl MockCredentialStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with a complete identity.
    #[must_use]
    pub fn with_identity(user_id: impl Into<String>, auth_token: impl Into<String>) -> Self {
        let store = Self::new();
        store.set_stored_raw(Some(user_id.into()), Some(auth_token.into()));
        store
    }

    /// The currently stored identity, post-collapse, if the entry is valid.
    #[must_use]
    pub fn stored(&self) -> Option<Identity> {
        self.lock()
            .clone()
            .map(|(user_id, auth_token)| Identity::new(user_id, auth_token))
            .filter(Identity::is_valid)
    }

    /// Stage a raw entry, bypassing the validity collapse.
    pub fn set_stored_raw(&self, user_id: Option<String>, auth_token: Option<String>) {
        *self.lock() = Some((user_id, auth_token));
    }

    /// Drop the stored entry.
    pub fn clear_stored(&self) {
        *self.lock() = None;
    }

    /// Make subsequent `save`/`clear` calls fail with a storage error.
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RawEntry> {
        self.entry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SessionError::Storage("simulated write failure".into()));
        }
        Ok(())
    }
}

impl CredentialStore for MockCredentialStore {
    fn load(&self) -> Identity {
        self.lock()
            .clone()
            .map_or_else(Identity::empty, |(user_id, auth_token)| {
                Identity::new(user_id, auth_token)
            })
    }

    fn save(&self, identity: &Identity) -> Result<()> {
        self.check_writable()?;
        *self.lock() = Some((
            identity.user_id().map(String::from),
            identity.auth_token().map(String::from),
        ));
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.check_writable()?;
        *self.lock() = None;
        Ok(())
    }
}
