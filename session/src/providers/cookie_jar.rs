//! Cookie jar trait and in-memory implementation.
//!
//! Cookies are how the gateway tier reads identity and the release/routing
//! tag without parsing request bodies. The jar is a projection of session
//! state, rewritten by the context injector on every request because cookies
//! can be evicted or go stale across tabs.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Name/value cookie storage projected onto outgoing requests.
pub trait CookieJar: Send + Sync {
    /// Set a cookie, replacing any previous value.
    fn set(&self, name: &str, value: &str);

    /// Remove a cookie. Removing an absent cookie is a no-op.
    fn remove(&self, name: &str);

    /// Read a cookie value.
    fn get(&self, name: &str) -> Option<String>;

    /// Serialize the jar into a `Cookie` request header value
    /// (`name=value; name2=value2`), or `None` when the jar is empty.
    fn header_value(&self) -> Option<String>;
}

/// In-process cookie jar.
///
/// `BTreeMap` keeps the serialized header deterministic. Cheap to clone;
/// clones share the same underlying jar, mirroring how every part of a
/// browser page sees the same `document.cookie`.
#[derive(Debug, Clone, Default)]
pub struct MemoryCookieJar {
    cookies: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryCookieJar {
    /// Create an empty jar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.cookies.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CookieJar for MemoryCookieJar {
    fn set(&self, name: &str, value: &str) {
        self.lock().insert(name.to_string(), value.to_string());
    }

    fn remove(&self, name: &str) {
        self.lock().remove(name);
    }

    fn get(&self, name: &str) -> Option<String> {
        self.lock().get(name).cloned()
    }

    fn header_value(&self) -> Option<String> {
        let cookies = self.lock();
        if cookies.is_empty() {
            return None;
        }
        Some(
            cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}
