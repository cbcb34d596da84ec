//! Mock providers for tests.
//!
//! In-memory doubles for the injectable dependencies: scripted transport
//! responses and an inspectable credential store. Gated behind the
//! `test-utils` feature so downstream integration tests can use them too.

mod credential_store;
mod transport;

pub use credential_store::MockCredentialStore;
pub use transport::MockTransport;
