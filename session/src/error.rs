//! Error types for session and request-context operations.

use thiserror::Error;

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Error taxonomy for the session layer.
///
/// Three families, recovered at the boundary where they occur:
///
/// - **Transport**: the backend was unreachable. Surfaced to the caller as a
///   generic failure.
/// - **Protocol**: the backend answered, but not with what we needed.
///   Treated as an authentication/registration failure, never as a crash.
/// - **Local state**: persisted data could not be read or written. Persisted
///   corruption is normalized to "absent" before it ever becomes an error;
///   this variant only covers write failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    // ═══════════════════════════════════════════════════════════
    // Transport Errors
    // ═══════════════════════════════════════════════════════════

    /// Network unreachable or connection failed.
    #[error("network error: {message}")]
    Transport {
        /// Underlying transport error text.
        message: String,
    },

    /// The request exceeded its fixed timeout.
    #[error("request timed out")]
    Timeout,

    // ═══════════════════════════════════════════════════════════
    // Protocol Errors
    // ═══════════════════════════════════════════════════════════

    /// The backend answered with an unexpected status.
    #[error("unexpected status {status}")]
    Protocol {
        /// HTTP status code returned by the backend.
        status: u16,
    },

    /// The response payload did not match the expected shape.
    #[error("malformed response payload")]
    MalformedPayload,

    /// The backend explicitly rejected the credentials
    /// (`success: false` on an otherwise healthy response).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Registration was rejected by the backend.
    ///
    /// Carries a user-facing message, deliberately distinct from the raw
    /// transport or status text.
    #[error("{message}")]
    RegistrationRejected {
        /// User-facing rejection message.
        message: String,
    },

    // ═══════════════════════════════════════════════════════════
    // Local State Errors
    // ═══════════════════════════════════════════════════════════

    /// Writing to the credential store failed.
    #[error("credential storage error: {0}")]
    Storage(String),
}

impl SessionError {
    /// Returns `true` if this error came from the transport layer
    /// (unreachable backend, timeout).
    ///
    /// # Examples
    ///
    /// ```
    /// # use front_guess_session::SessionError;
    /// assert!(SessionError::Timeout.is_transport());
    /// assert!(!SessionError::MalformedPayload.is_transport());
    /// ```
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Timeout)
    }

    /// Returns `true` if this error carries a message meant for the user
    /// rather than for a log line.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::RegistrationRejected { .. } | Self::InvalidCredentials
        )
    }
}

impl From<reqwest::Error> for SessionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport {
                message: err.to_string(),
            }
        }
    }
}
