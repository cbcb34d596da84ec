//! Session client.
//!
//! The imperative shell around the pure reducer: it owns the canonical
//! state handle, executes effects, and runs a reconciliation pass after
//! every dispatched action so the credential store and cookie jar never
//! drift from the in-memory state.

use crate::actions::SessionAction;
use crate::config::SessionConfig;
use crate::environment::SessionEnvironment;
use crate::error::Result;
use crate::pipeline::{BackendResponse, ContextInjector, OutboundRequest, Pipeline, TraceCorrelator};
use crate::providers::{
    CookieJar, CredentialStore, HttpTransport, JsonFileCredentialStore, MemoryCookieJar, Transport,
};
use crate::reconciler::Reconciler;
use crate::reducers::SessionReducer;
use crate::state::{Identity, SessionHandle, SessionState};
use front_guess_core::effect::Effect;
use front_guess_core::environment::SystemClock;
use front_guess_core::reducer::Reducer;
use std::collections::VecDeque;
use std::sync::Arc;
use uuid::Uuid;

/// Result of a registration attempt that reached the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The account was created and the session is now authenticated.
    Created(Identity),

    /// The backend rejected the registration.
    Rejected {
        /// User-facing rejection message.
        message: String,
    },
}

/// Session client.
///
/// Wires together the reducer, the effect executor, the middleware pipeline,
/// and the reconciler. One instance per backend; clones of the injected
/// providers share their underlying storage, so every in-flight request
/// observes the same session.
///
/// # Type Parameters
///
/// - `C`: credential store
/// - `K`: cookie jar
/// - `T`: HTTP transport
#[derive(Debug)]
pub struct SessionClient<C, K, T>
where
    T: Transport + Clone,
{
    session: SessionHandle,
    env: SessionEnvironment<T>,
    reducer: SessionReducer<T>,
    reconciler: Reconciler<C, K>,
}

impl SessionClient<JsonFileCredentialStore, MemoryCookieJar, HttpTransport> {
    /// Build a client with the production providers: file-backed credential
    /// store, in-memory cookie jar, and a reqwest transport.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the HTTP client cannot be constructed.
    pub fn with_defaults(config: SessionConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        let credentials = JsonFileCredentialStore::new(config.credentials_path.clone());
        Ok(Self::new(&config, credentials, MemoryCookieJar::new(), transport))
    }
}

impl<C, K, T> SessionClient<C, K, T>
where
    C: CredentialStore + Clone,
    K: CookieJar + Clone + 'static,
    T: Transport + Clone + 'static,
{
    /// Build a client over the given providers.
    #[must_use]
    pub fn new(config: &SessionConfig, credentials: C, cookies: K, transport: T) -> Self {
        let session = SessionHandle::new();

        let pipeline = Pipeline::new()
            .with_request_transform(Box::new(ContextInjector::new(
                session.clone(),
                cookies.clone(),
                config.release_tag,
            )))
            .with_response_transform(Box::new(TraceCorrelator::new(
                session.clone(),
                SystemClock,
            )));

        Self {
            session,
            env: SessionEnvironment::new(transport, Arc::new(pipeline)),
            reducer: SessionReducer::new(),
            reconciler: Reconciler::new(credentials, cookies, config.release_tag),
        }
    }

    /// Resume a persisted session, if one exists.
    ///
    /// Call once at startup, before the first request. A valid persisted
    /// identity flips the session to logged-in and re-projects the gateway
    /// cookies; an absent or corrupt entry leaves it logged out. Never
    /// fails.
    pub fn bootstrap(&self) -> SessionState {
        self.reconcile()
    }

    /// Snapshot of the current session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.session.snapshot()
    }

    /// The shared handle to the canonical state.
    #[must_use]
    pub const fn handle(&self) -> &SessionHandle {
        &self.session
    }

    /// Log in with the given credentials.
    ///
    /// Returns the established identity on success and `None` when the
    /// backend answered but rejected the attempt (wrong credentials,
    /// unexpected status, malformed payload). In either answered case the
    /// prior session state is preserved on failure.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the backend was unreachable or the
    /// request timed out.
    pub async fn login(&self, username: &str, password: &str) -> Result<Option<Identity>> {
        let processed = self
            .dispatch(SessionAction::Login {
                correlation_id: Uuid::new_v4(),
                username: username.to_string(),
                password: password.to_string(),
            })
            .await;

        for action in processed {
            match action {
                SessionAction::LoginSucceeded { user_id, auth_token, .. } => {
                    return Ok(Some(Identity::new(Some(user_id), Some(auth_token))));
                },
                SessionAction::LoginFailed { error, .. } => {
                    if error.is_transport() {
                        return Err(error);
                    }
                    return Ok(None);
                },
                _ => {},
            }
        }
        Ok(None)
    }

    /// Register a new account.
    ///
    /// A created account is immediately authenticated; no separate login
    /// call is needed.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the backend was unreachable or the
    /// request timed out. An answered rejection is a
    /// [`RegisterOutcome::Rejected`], not an error.
    pub async fn register(&self, username: &str, password: &str) -> Result<RegisterOutcome> {
        let processed = self
            .dispatch(SessionAction::Register {
                correlation_id: Uuid::new_v4(),
                username: username.to_string(),
                password: password.to_string(),
            })
            .await;

        for action in processed {
            match action {
                SessionAction::RegisterSucceeded { user_id, auth_token, .. } => {
                    return Ok(RegisterOutcome::Created(Identity::new(
                        Some(user_id),
                        Some(auth_token),
                    )));
                },
                SessionAction::RegisterFailed { error, .. } => {
                    if error.is_transport() {
                        return Err(error);
                    }
                    return Ok(RegisterOutcome::Rejected {
                        message: error.to_string(),
                    });
                },
                _ => {},
            }
        }
        Ok(RegisterOutcome::Rejected {
            message: crate::constants::messages::REGISTRATION_FAILED.to_string(),
        })
    }

    /// Clear the session. Idempotent; never fails.
    pub async fn logout(&self) {
        let _ = self
            .dispatch(SessionAction::Logout {
                correlation_id: Uuid::new_v4(),
            })
            .await;
    }

    /// Send an arbitrary request through the full pipeline.
    ///
    /// The context injector attaches identity headers and cookies per the
    /// current state; the trace correlator observes the response.
    ///
    /// # Errors
    ///
    /// Propagates transport errors. Any answered HTTP status resolves to
    /// `Ok`.
    pub async fn request(&self, request: OutboundRequest) -> Result<BackendResponse> {
        self.env.send(request).await
    }

    fn reconcile(&self) -> SessionState {
        self.session.write(|state| self.reconciler.reconcile(state))
    }

    /// Reduce an action, execute its effects, feed resulting events back,
    /// and reconcile once the queue drains.
    ///
    /// Returns every action processed, commands and events alike, in
    /// processing order.
    async fn dispatch(&self, action: SessionAction) -> Vec<SessionAction> {
        let mut pending = VecDeque::from([action]);
        let mut processed = Vec::new();

        while let Some(action) = pending.pop_front() {
            processed.push(action.clone());
            let effects = self
                .session
                .write(|state| self.reducer.reduce(state, action, &self.env));

            // Single-flight executor: effect batches here are tiny, so
            // Parallel degrades to in-order execution.
            let mut queue: VecDeque<Effect<SessionAction>> = effects.into_iter().collect();
            while let Some(effect) = queue.pop_front() {
                match effect {
                    Effect::None => {},
                    Effect::Parallel(effects) | Effect::Sequential(effects) => {
                        for effect in effects.into_iter().rev() {
                            queue.push_front(effect);
                        }
                    },
                    Effect::Delay { duration, action } => {
                        tokio::time::sleep(duration).await;
                        pending.push_back(*action);
                    },
                    Effect::Future(fut) => {
                        if let Some(action) = fut.await {
                            pending.push_back(action);
                        }
                    },
                }
            }
        }

        self.reconcile();
        processed
    }
}
