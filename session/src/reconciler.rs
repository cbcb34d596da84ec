//! Session reconciler.
//!
//! Exactly one component computes canonical session state; the credential
//! store and the cookie jar are read-only projections recomputed from it.
//! In-memory and persisted identity are never merged ad hoc at call sites:
//! the merge happens once per reconciliation pass, with an explicit
//! precedence order.

use crate::constants::cookies;
use crate::providers::{CookieJar, CredentialStore};
use crate::state::{ReleaseTag, SessionState};

/// Single-writer arbiter of session state.
///
/// Called once at startup and after every auth operation.
///
/// # Algorithm
///
/// 1. Candidate identity: the in-memory state once it has been resolved
///    this process lifetime (even when empty, as after a logout), else the
///    persisted credential entry. The store is only authoritative at cold
///    start.
/// 2. Validity collapse: a half-populated identity is the empty identity.
/// 3. The logged-in flag is derived, never set independently.
/// 4. Projections are rewritten idempotently: credential store and the
///    gateway cookies.
///
/// No network calls; pure local-state arbitration. Reconciliation never
/// fails: malformed persisted data reads as absent, and projection write
/// failures are logged, not raised.
#[derive(Debug, Clone)]
pub struct Reconciler<C, K> {
    credentials: C,
    cookies: K,
    release_tag: ReleaseTag,
}

impl<C, K> Reconciler<C, K>
where
    C: CredentialStore,
    K: CookieJar,
{
    /// Create a reconciler over the given projections.
    pub const fn new(credentials: C, cookies: K, release_tag: ReleaseTag) -> Self {
        Self {
            credentials,
            cookies,
            release_tag,
        }
    }

    /// Resolve the canonical session state and rewrite the projections.
    ///
    /// Returns a snapshot of the resolved state.
    pub fn reconcile(&self, state: &mut SessionState) -> SessionState {
        // Precedence: in-memory beats persisted once resolved. An empty
        // initialized identity means a deliberate logout, not a cold start,
        // and must not be refilled from the store.
        let candidate = if state.is_initialized() || state.identity().is_valid() {
            state.identity().clone()
        } else {
            self.credentials.load()
        };

        // set_identity normalizes and derives the logged-in flag
        state.set_identity(candidate);
        state.mark_initialized();

        // Projection write-back, idempotent. Failures downgrade to warnings:
        // the canonical state is already resolved, and the next pass retries.
        if state.is_logged_in() {
            if let Err(err) = self.credentials.save(state.identity()) {
                tracing::warn!(%err, "failed to persist credentials");
            }
        } else if let Err(err) = self.credentials.clear() {
            tracing::warn!(%err, "failed to clear persisted credentials");
        }

        match state.identity().user_id() {
            Some(user_id) => self.cookies.set(cookies::USER_ID, user_id),
            None => self.cookies.remove(cookies::USER_ID),
        }
        self.cookies.set(cookies::ROUTING_TAG, self.release_tag.as_str());

        tracing::debug!(
            logged_in = state.is_logged_in(),
            release_tag = %self.release_tag,
            "session reconciled"
        );
        state.clone()
    }
}
