//! Session reducers.
//!
//! This module contains the pure reducer for session state.
//!
//! Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.
//! Commands produce transport effects; the events those effects feed back
//! are the only thing that mutates the identity, and each event applies its
//! mutation atomically — a failed call leaves the state byte-for-byte
//! unchanged.

use crate::actions::SessionAction;
use crate::constants::{endpoints, messages};
use crate::environment::SessionEnvironment;
use crate::error::SessionError;
use crate::pipeline::OutboundRequest;
use crate::providers::Transport;
use crate::state::{Identity, SessionState};
use front_guess_core::effect::Effect;
use front_guess_core::reducer::Reducer;
use front_guess_core::{smallvec, SmallVec};
use reqwest::StatusCode;
use serde_json::{json, Value};

/// Extract a non-empty `(id, authToken)` pair from an auth response body.
///
/// The backend has been seen returning the id both as a string and as a
/// number across deployments; both are accepted and stringified.
fn identity_payload(body: &Value) -> Option<(String, String)> {
    let user_id = match body.get("id") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return None,
    };
    let auth_token = body
        .get("authToken")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())?
        .to_string();
    Some((user_id, auth_token))
}

/// Session reducer.
///
/// Handles the login/register/logout state machine over
/// [`SessionState`].
#[derive(Debug, Clone)]
pub struct SessionReducer<T> {
    /// Phantom data to hold the transport type parameter.
    _phantom: std::marker::PhantomData<T>,
}

impl<T> SessionReducer<T> {
    /// Create a new session reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T> Default for SessionReducer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Reducer for SessionReducer<T>
where
    T: Transport + Clone + 'static,
{
    type State = SessionState;
    type Action = SessionAction;
    type Environment = SessionEnvironment<T>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ═══════════════════════════════════════════════════════════════
            // Login: call the exempt endpoint, judge the payload
            // ═══════════════════════════════════════════════════════════════
            SessionAction::Login {
                correlation_id,
                username,
                password,
            } => {
                let env = env.clone();
                smallvec![Effect::future(async move {
                    let request = OutboundRequest::post(
                        endpoints::LOGIN,
                        json!({ "username": username, "password": password }),
                    );
                    let response = match env.send(request).await {
                        Ok(response) => response,
                        Err(error) => {
                            return Some(SessionAction::LoginFailed {
                                correlation_id,
                                error,
                            })
                        },
                    };

                    // Success means all of: HTTP success, an explicit
                    // success flag, and a complete identity payload.
                    if !response.status.is_success() {
                        return Some(SessionAction::LoginFailed {
                            correlation_id,
                            error: SessionError::Protocol {
                                status: response.status.as_u16(),
                            },
                        });
                    }
                    let accepted = response
                        .body
                        .get("success")
                        .and_then(Value::as_bool)
                        .unwrap_or(false);
                    if !accepted {
                        return Some(SessionAction::LoginFailed {
                            correlation_id,
                            error: SessionError::InvalidCredentials,
                        });
                    }
                    match identity_payload(&response.body) {
                        Some((user_id, auth_token)) => Some(SessionAction::LoginSucceeded {
                            correlation_id,
                            user_id,
                            auth_token,
                        }),
                        None => Some(SessionAction::LoginFailed {
                            correlation_id,
                            error: SessionError::MalformedPayload,
                        }),
                    }
                })]
            },

            // ═══════════════════════════════════════════════════════════════
            // Register: created (201) + identity payload, else rejected
            // ═══════════════════════════════════════════════════════════════
            SessionAction::Register {
                correlation_id,
                username,
                password,
            } => {
                let env = env.clone();
                smallvec![Effect::future(async move {
                    let request = OutboundRequest::post(
                        endpoints::REGISTER,
                        json!({ "username": username, "password": password }),
                    );
                    let response = match env.send(request).await {
                        Ok(response) => response,
                        Err(error) => {
                            return Some(SessionAction::RegisterFailed {
                                correlation_id,
                                error,
                            })
                        },
                    };

                    if response.status == StatusCode::CREATED {
                        if let Some((user_id, auth_token)) = identity_payload(&response.body) {
                            return Some(SessionAction::RegisterSucceeded {
                                correlation_id,
                                user_id,
                                auth_token,
                            });
                        }
                    }
                    // Anything answered-but-not-created gets the user-facing
                    // message; the status went to the logs via the pipeline.
                    Some(SessionAction::RegisterFailed {
                        correlation_id,
                        error: SessionError::RegistrationRejected {
                            message: messages::REGISTRATION_FAILED.to_string(),
                        },
                    })
                })]
            },

            // ═══════════════════════════════════════════════════════════════
            // Logout: unconditional, idempotent teardown
            // ═══════════════════════════════════════════════════════════════
            SessionAction::Logout { correlation_id } => {
                tracing::info!(%correlation_id, was_logged_in = state.is_logged_in(), "logout");
                state.reset();
                smallvec![Effect::None]
            },

            // ═══════════════════════════════════════════════════════════════
            // Events: atomic identity mutations
            // ═══════════════════════════════════════════════════════════════
            SessionAction::LoginSucceeded {
                correlation_id,
                user_id,
                auth_token,
            }
            | SessionAction::RegisterSucceeded {
                correlation_id,
                user_id,
                auth_token,
            } => {
                tracing::info!(%correlation_id, %user_id, "session established");
                state.set_identity(Identity::new(Some(user_id), Some(auth_token)));
                smallvec![Effect::None]
            },

            SessionAction::LoginFailed {
                correlation_id,
                error,
            } => {
                // No partial identity: the state is untouched on failure
                tracing::warn!(%correlation_id, %error, "login failed");
                smallvec![Effect::None]
            },

            SessionAction::RegisterFailed {
                correlation_id,
                error,
            } => {
                tracing::warn!(%correlation_id, %error, "registration failed");
                smallvec![Effect::None]
            },
        }
    }
}
