//! Provider traits and production implementations.
//!
//! Every external dependency of the session layer sits behind a trait so
//! reducers and the reconciler can be exercised at memory speed:
//!
//! - [`CredentialStore`]: durable identity persistence (survives restarts)
//! - [`CookieJar`]: the cookie projection read by the gateway tier
//! - [`Transport`]: the HTTP transport to the backend
//!
//! Production implementations live alongside the traits:
//! [`JsonFileCredentialStore`], [`MemoryCookieJar`], and [`HttpTransport`].

pub mod cookie_jar;
pub mod credential_store;
pub mod transport;

pub use cookie_jar::{CookieJar, MemoryCookieJar};
pub use credential_store::{CredentialStore, JsonFileCredentialStore};
pub use transport::{HttpTransport, Transport};
