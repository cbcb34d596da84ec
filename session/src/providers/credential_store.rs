//! Credential store trait and file-backed implementation.
//!
//! The credential store is the durable mirror of the identity record. It is
//! the source of truth exactly once per process lifetime: at cold start,
//! before the in-memory state has been initialized. After that it is a
//! write-only projection of the canonical session state.

use crate::constants::persisted;
use crate::error::{Result, SessionError};
use crate::state::Identity;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Durable key/value persistence for the identity record.
///
/// # Implementation Notes
///
/// - `load` never fails: malformed or unreadable persisted data is treated
///   as absent, not as an error. Reconciliation must never throw.
/// - The store is shared across processes of the same user (the browser
///   analog is `localStorage`, shared across tabs). Concurrent writers are
///   tolerated with last-write-wins semantics; the next reconciliation
///   converges on whichever write landed.
pub trait CredentialStore: Send + Sync {
    /// Read the persisted identity.
    ///
    /// Returns the empty identity when nothing (or garbage) is persisted.
    fn load(&self) -> Identity;

    /// Persist the identity. Overwrites any previous entry.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Storage`] if the entry cannot be written.
    fn save(&self, identity: &Identity) -> Result<()>;

    /// Remove the persisted entry. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Storage`] if an existing entry cannot be
    /// removed.
    fn clear(&self) -> Result<()>;
}

/// Credential store backed by a JSON file.
///
/// The file holds the persisted keys `userId` and `authToken` as strings,
/// absent meaning logged out:
///
/// ```json
/// { "userId": "42", "authToken": "tok" }
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileCredentialStore {
    path: PathBuf,
}

impl JsonFileCredentialStore {
    /// Create a store at the given file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this store reads and writes.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl CredentialStore for JsonFileCredentialStore {
    fn load(&self) -> Identity {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Identity::empty(),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "credential file unreadable, treating as absent");
                return Identity::empty();
            },
        };

        match serde_json::from_slice::<Identity>(&bytes) {
            Ok(identity) => identity.normalize(),
            Err(err) => {
                // Non-string values, truncated writes from another process,
                // hand-edited files: all collapse to logged-out.
                tracing::warn!(
                    path = %self.path.display(),
                    %err,
                    "malformed persisted credentials ({} / {}), treating as absent",
                    persisted::USER_ID,
                    persisted::AUTH_TOKEN,
                );
                Identity::empty()
            },
        }
    }

    fn save(&self, identity: &Identity) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|err| SessionError::Storage(err.to_string()))?;
            }
        }

        let bytes = serde_json::to_vec_pretty(identity)
            .map_err(|err| SessionError::Storage(err.to_string()))?;
        fs::write(&self.path, bytes).map_err(|err| SessionError::Storage(err.to_string()))
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(SessionError::Storage(err.to_string())),
        }
    }
}
