//! Session state types.
//!
//! This module defines the canonical in-memory session state and the shared
//! handle through which the rest of the crate reads it.
//!
//! Ownership discipline: [`SessionState`] is mutated only by the reducer and
//! the reconciler, except for the trace context whose sole writer is the
//! trace correlator. Everything else — credential store, cookie jar —
//! is a projection recomputed from this state, never merged back ad hoc.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, RwLock};

// ═══════════════════════════════════════════════════════════════════════
// Identity
// ═══════════════════════════════════════════════════════════════════════

/// The (user id, auth token) pair the client currently believes it is.
///
/// Invariant: a token without a subject is not an identity. Construction
/// collapses any half-populated or empty-string pair to the empty identity,
/// so a built `Identity` is always either fully valid or fully empty.
///
/// Serializes with the persisted key names (`userId`, `authToken`) so the
/// credential store can round-trip it directly.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Identity {
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,

    #[serde(rename = "authToken", skip_serializing_if = "Option::is_none")]
    auth_token: Option<String>,
}

impl Identity {
    /// Build an identity, collapsing invalid combinations to empty.
    ///
    /// Both fields must be present and non-empty; otherwise the result is
    /// [`Identity::empty`].
    #[must_use]
    pub fn new(user_id: Option<String>, auth_token: Option<String>) -> Self {
        match (user_id, auth_token) {
            (Some(id), Some(token)) if !id.is_empty() && !token.is_empty() => Self {
                user_id: Some(id),
                auth_token: Some(token),
            },
            _ => Self::empty(),
        }
    }

    /// The logged-out identity.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            user_id: None,
            auth_token: None,
        }
    }

    /// Re-apply the construction invariant to a deserialized identity.
    ///
    /// Used after reading persisted data, which may predate the invariant or
    /// have been written by another tab mid-logout.
    #[must_use]
    pub fn normalize(self) -> Self {
        Self::new(self.user_id, self.auth_token)
    }

    /// `true` iff both fields are present and non-empty.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(
            (&self.user_id, &self.auth_token),
            (Some(id), Some(token)) if !id.is_empty() && !token.is_empty()
        )
    }

    /// The user identifier, if any.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// The auth token, if any.
    #[must_use]
    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Release / Routing Tag
// ═══════════════════════════════════════════════════════════════════════

/// Label steering traffic to a backend deployment variant.
///
/// Projected into the `x-pre-higress-tag` cookie so the gateway can route
/// without parsing the request body. Set once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseTag {
    /// The stable release.
    #[default]
    Base,

    /// The gray (canary) release.
    Gray,
}

impl ReleaseTag {
    /// The wire form of the tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Gray => "gray",
        }
    }
}

impl fmt::Display for ReleaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Trace Context
// ═══════════════════════════════════════════════════════════════════════

/// Correlation identifiers linking a request to backend trace spans.
///
/// Transient: one per completed request, never persisted across reloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceContext {
    /// Backend-issued trace identifier.
    pub trace_id: String,

    /// Span identifier, when the backend reports one.
    pub span_id: Option<String>,

    /// When this context was observed on a response.
    pub observed_at: DateTime<Utc>,
}

// ═══════════════════════════════════════════════════════════════════════
// Session State
// ═══════════════════════════════════════════════════════════════════════

/// Canonical session state.
///
/// Fields are private: the logged-in flag can only change together with the
/// identity, so `is_logged_in() == identity().is_valid()` holds for every
/// reachable state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionState {
    identity: Identity,
    is_logged_in: bool,
    trace: Option<TraceContext>,
    initialized: bool,
}

impl SessionState {
    /// A fresh, logged-out state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current identity.
    #[must_use]
    pub const fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Whether the client currently holds a complete identity.
    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.is_logged_in
    }

    /// The most recently observed trace identifier, if any.
    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.trace.as_ref().map(|t| t.trace_id.as_str())
    }

    /// The most recently observed trace context, if any.
    #[must_use]
    pub const fn trace(&self) -> Option<&TraceContext> {
        self.trace.as_ref()
    }

    /// Whether this state has been resolved at least once this process
    /// lifetime.
    ///
    /// Before the first reconciliation the persisted credential entry is
    /// authoritative; after it (or after an explicit [`SessionState::reset`])
    /// the in-memory identity is, even when empty.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Mark this state as resolved for the current process lifetime.
    ///
    /// Called by the reconciler once the canonical identity is decided.
    pub fn mark_initialized(&mut self) {
        self.initialized = true;
    }

    /// Replace the identity, deriving the logged-in flag.
    ///
    /// Callers other than the reducer and the reconciler must not mutate
    /// identity; read through [`SessionHandle::snapshot`] instead.
    pub fn set_identity(&mut self, identity: Identity) {
        let identity = identity.normalize();
        self.is_logged_in = identity.is_valid();
        self.identity = identity;
    }

    /// Record a trace context. Sole writer: the trace correlator.
    pub fn set_trace(&mut self, trace: TraceContext) {
        self.trace = Some(trace);
    }

    /// Reset to the logged-out state.
    ///
    /// Full teardown: identity, derived flag, and trace context all clear
    /// together; the state is never partially torn down. A reset is an
    /// authoritative decision for this lifetime, so the state comes out
    /// initialized: the next reconciliation clears the persisted entry
    /// instead of resurrecting the session from it.
    pub fn reset(&mut self) {
        *self = Self {
            initialized: true,
            ..Self::default()
        };
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Session Handle
// ═══════════════════════════════════════════════════════════════════════

/// Shared handle to the canonical [`SessionState`].
///
/// An explicitly passed handle rather than an ambient global store. Every
/// reader takes a fresh snapshot per call,
/// so interleaved in-flight requests always see the latest completed
/// reconciliation pass rather than a value captured at construction time.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<SessionState>>,
}

impl SessionHandle {
    /// Create a handle over a fresh, logged-out state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a handle over a pre-populated state.
    #[must_use]
    pub fn init(state: SessionState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(state)),
        }
    }

    /// Clone of the current state.
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.read(Clone::clone)
    }

    /// Whether the current state holds a complete identity.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.read(SessionState::is_logged_in)
    }

    /// Run a closure against the current state.
    pub fn read<T>(&self, f: impl FnOnce(&SessionState) -> T) -> T {
        let guard = self.inner.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&guard)
    }

    /// Run a closure against the state with write access.
    ///
    /// Reserved for the reducer runtime, the reconciler, and the trace
    /// correlator; see the module-level ownership discipline.
    pub fn write<T>(&self, f: impl FnOnce(&mut SessionState) -> T) -> T {
        let mut guard = self.inner.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut guard)
    }

    /// Reset the state to logged-out.
    pub fn reset(&self) {
        self.write(SessionState::reset);
    }
}
