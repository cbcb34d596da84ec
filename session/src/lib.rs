//! # Front Guess Session
//!
//! Client-side session and request-context synchronization for the
//! front-guess backend.
//!
//! This crate decides, for every outgoing HTTP request, which identity to
//! attach, which release/routing tag to attach, and how to keep three
//! independent projections of that identity consistent: the in-memory
//! session state, the durable credential store, and the cookie jar read by
//! the gateway tier. It also captures the distributed trace identifier the
//! backend returns with every response.
//!
//! ## Architecture
//!
//! State changes flow through a single-writer reducer:
//!
//! ```text
//! Action → Reducer → (State, Effects) → Effect Execution → More Actions
//! ```
//!
//! The credential store and cookie jar are projections of the canonical
//! [`state::SessionState`], recomputed by the [`reconciler::Reconciler`]
//! after every auth operation. Outgoing requests pass through an explicit
//! middleware [`pipeline::Pipeline`]: the context injector attaches identity
//! headers and cookies, the trace correlator harvests `x-b3-traceid` from
//! responses.
//!
//! ## Example: login and a protected call
//!
//! ```rust,ignore
//! use front_guess_session::prelude::*;
//!
//! let client = SessionClient::with_defaults(SessionConfig::new("http://micro.example.com"))?;
//! client.bootstrap(); // resume a persisted session, if any
//!
//! if client.login("alice", "secret").await?.is_some() {
//!     let response = client
//!         .request(OutboundRequest::post("/guess", serde_json::json!({"number": 42})))
//!         .await?;
//! }
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod actions;
pub mod client;
pub mod config;
pub mod constants;
pub mod environment;
pub mod error;
pub mod pipeline;
pub mod providers;
pub mod reconciler;
pub mod reducers;
pub mod state;

// Mock providers for testing
#[cfg(feature = "test-utils")]
pub mod mocks;

// Re-export main types
pub use actions::SessionAction;
pub use client::{RegisterOutcome, SessionClient};
pub use config::SessionConfig;
pub use environment::SessionEnvironment;
pub use error::{Result, SessionError};
pub use pipeline::{BackendResponse, OutboundRequest, Pipeline};
pub use reconciler::Reconciler;
pub use reducers::SessionReducer;
pub use state::{Identity, ReleaseTag, SessionHandle, SessionState, TraceContext};

/// Convenience prelude for consumers of this crate.
pub mod prelude {
    pub use crate::client::{RegisterOutcome, SessionClient};
    pub use crate::config::SessionConfig;
    pub use crate::error::{Result, SessionError};
    pub use crate::pipeline::{BackendResponse, OutboundRequest};
    pub use crate::state::{Identity, ReleaseTag, SessionState};
}
