//! Session actions.
//!
//! This module defines all possible inputs to the session reducer.
//! Actions split into **commands** (user intent: log in, register, log out)
//! and **events** (results of async transport calls, fed back into the
//! reducer by the effect executor).

use crate::error::SessionError;
use uuid::Uuid;

/// Session action.
///
/// Actions are the only way to change the canonical session state. The
/// reducer is a pure function: `(State, Action, Env) → (State, Effects)`.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    // ═══════════════════════════════════════════════════════════════════════
    // Commands
    // ═══════════════════════════════════════════════════════════════════════
    /// Log in with username and password.
    ///
    /// # Flow
    ///
    /// 1. Reducer emits a transport effect for `POST /login`
    /// 2. The response is judged: HTTP success, `success: true`, and a
    ///    non-empty id/token pair
    /// 3. [`SessionAction::LoginSucceeded`] or [`SessionAction::LoginFailed`]
    ///    is fed back
    Login {
        /// Correlation ID for request tracing.
        correlation_id: Uuid,

        /// Account name.
        username: String,

        /// Account password.
        password: String,
    },

    /// Register a new account.
    ///
    /// Success requires HTTP 201 plus a well-formed identity payload, and
    /// auto-authenticates exactly like login.
    Register {
        /// Correlation ID for request tracing.
        correlation_id: Uuid,

        /// Account name.
        username: String,

        /// Account password.
        password: String,
    },

    /// Clear the session.
    ///
    /// Idempotent: logging out while logged out is a no-op, not an error.
    Logout {
        /// Correlation ID for request tracing.
        correlation_id: Uuid,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Events
    // ═══════════════════════════════════════════════════════════════════════
    /// Login call succeeded with a complete identity payload.
    LoginSucceeded {
        /// Correlation ID of the originating command.
        correlation_id: Uuid,

        /// Subject identifier returned by the backend.
        user_id: String,

        /// Auth token returned by the backend.
        auth_token: String,
    },

    /// Login call failed (transport error, protocol error, or an explicit
    /// rejection). Session state is left untouched.
    LoginFailed {
        /// Correlation ID of the originating command.
        correlation_id: Uuid,

        /// What went wrong.
        error: SessionError,
    },

    /// Registration created the account and returned a complete identity.
    RegisterSucceeded {
        /// Correlation ID of the originating command.
        correlation_id: Uuid,

        /// Subject identifier returned by the backend.
        user_id: String,

        /// Auth token returned by the backend.
        auth_token: String,
    },

    /// Registration failed. Carries a user-facing message when the backend
    /// rejected the request, a transport error otherwise.
    RegisterFailed {
        /// Correlation ID of the originating command.
        correlation_id: Uuid,

        /// What went wrong.
        error: SessionError,
    },
}

impl SessionAction {
    /// The correlation id carried by this action.
    #[must_use]
    pub const fn correlation_id(&self) -> Uuid {
        match self {
            Self::Login { correlation_id, .. }
            | Self::Register { correlation_id, .. }
            | Self::Logout { correlation_id }
            | Self::LoginSucceeded { correlation_id, .. }
            | Self::LoginFailed { correlation_id, .. }
            | Self::RegisterSucceeded { correlation_id, .. }
            | Self::RegisterFailed { correlation_id, .. } => *correlation_id,
        }
    }

    /// `true` for event actions produced by the effect executor.
    #[must_use]
    pub const fn is_event(&self) -> bool {
        matches!(
            self,
            Self::LoginSucceeded { .. }
                | Self::LoginFailed { .. }
                | Self::RegisterSucceeded { .. }
                | Self::RegisterFailed { .. }
        )
    }
}
