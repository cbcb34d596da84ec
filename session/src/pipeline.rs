//! Request/response middleware pipeline.
//!
//! Rather than burying this logic in HTTP-client interceptor callbacks, it
//! is an explicit, ordered list of request and response transforms,
//! testable without a live HTTP stack:
//!
//! - [`ContextInjector`] decides which identity and routing context every
//!   outgoing request carries.
//! - [`TraceCorrelator`] harvests the backend trace identifier from every
//!   completed response, failed business calls included.

use crate::constants::{cookies, endpoints, headers, trace_fields};
use crate::providers::CookieJar;
use crate::state::{ReleaseTag, SessionHandle, TraceContext};
use front_guess_core::environment::Clock;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, COOKIE};
use reqwest::{Method, StatusCode};
use serde_json::Value;

// ═══════════════════════════════════════════════════════════════════════
// Request / Response models
// ═══════════════════════════════════════════════════════════════════════

/// An outgoing request, before transport.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    /// HTTP method.
    pub method: Method,

    /// Path relative to the backend base URL (e.g. `/login`).
    pub path: String,

    /// Request headers. Transforms add to these; explicit caller headers
    /// are never overridden.
    pub headers: HeaderMap,

    /// JSON request body, if any.
    pub body: Option<Value>,
}

impl OutboundRequest {
    /// Create a request with no body.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Create a GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Create a POST request with a JSON body.
    #[must_use]
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        let mut request = Self::new(Method::POST, path);
        request.body = Some(body);
        request
    }

    /// `true` if the target endpoint establishes identity rather than
    /// consuming it (login, register). Exempt requests never carry identity
    /// headers.
    #[must_use]
    pub fn is_exempt(&self) -> bool {
        endpoints::EXEMPT
            .iter()
            .any(|prefix| self.path.starts_with(prefix))
    }

    /// Read a header as a string, if present and valid UTF-8.
    #[must_use]
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// A completed response from the backend, any status.
#[derive(Debug, Clone)]
pub struct BackendResponse {
    /// HTTP status code.
    pub status: StatusCode,

    /// Response headers.
    pub headers: HeaderMap,

    /// Parsed JSON body, `Null` when the body was empty or not JSON.
    pub body: Value,
}

impl BackendResponse {
    /// A minimal response for tests and defaults.
    #[must_use]
    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Value::Null,
        }
    }

    /// Read a header as a string; lookup is case-insensitive.
    #[must_use]
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Read a non-empty string field from the JSON body.
    #[must_use]
    pub fn body_field_str(&self, field: &str) -> Option<&str> {
        self.body
            .get(field)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Pipeline
// ═══════════════════════════════════════════════════════════════════════

/// A `(request) -> request` transform applied before transport.
pub trait RequestTransform: Send + Sync {
    /// Transform an outgoing request.
    fn transform(&self, request: OutboundRequest) -> OutboundRequest;
}

/// A `(response) -> response` transform applied after transport.
pub trait ResponseTransform: Send + Sync {
    /// Transform (or observe) a completed response.
    fn transform(&self, response: BackendResponse) -> BackendResponse;
}

/// Ordered middleware pipeline.
///
/// Request transforms run in registration order before the transport;
/// response transforms run in registration order after it. Transforms are
/// stateless between calls: anything session-scoped is re-read from the
/// [`SessionHandle`] per invocation, so interleaved in-flight requests are
/// safe.
#[derive(Default)]
pub struct Pipeline {
    request_transforms: Vec<Box<dyn RequestTransform>>,
    response_transforms: Vec<Box<dyn ResponseTransform>>,
}

impl Pipeline {
    /// Create an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a request transform.
    #[must_use]
    pub fn with_request_transform(mut self, transform: Box<dyn RequestTransform>) -> Self {
        self.request_transforms.push(transform);
        self
    }

    /// Append a response transform.
    #[must_use]
    pub fn with_response_transform(mut self, transform: Box<dyn ResponseTransform>) -> Self {
        self.response_transforms.push(transform);
        self
    }

    /// Run all request transforms, in order.
    #[must_use]
    pub fn prepare(&self, request: OutboundRequest) -> OutboundRequest {
        self.request_transforms
            .iter()
            .fold(request, |request, transform| transform.transform(request))
    }

    /// Run all response transforms, in order.
    #[must_use]
    pub fn complete(&self, response: BackendResponse) -> BackendResponse {
        self.response_transforms
            .iter()
            .fold(response, |response, transform| transform.transform(response))
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("request_transforms", &self.request_transforms.len())
            .field("response_transforms", &self.response_transforms.len())
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Context Injector
// ═══════════════════════════════════════════════════════════════════════

/// Attaches identity and routing context to every outgoing request.
///
/// Policy:
///
/// - Protected requests get `X-User-ID` and `Authorization` (raw token)
///   when the session holds a valid identity. A missing identity is not an
///   injector error; the request is forwarded and the backend rejects it.
/// - Exempt requests (login, register) never carry identity headers: they
///   establish identity, they don't consume it.
/// - The identity and routing-tag cookies are re-projected on every request,
///   not just after login, because the jar can be evicted or go stale.
/// - A `Content-Type: application/json` default is applied without
///   overriding an explicit caller value.
///
/// Session state is re-read per call, so header values always reflect the
/// latest completed reconciliation pass.
pub struct ContextInjector<K> {
    session: SessionHandle,
    jar: K,
    release_tag: ReleaseTag,
}

impl<K: CookieJar> ContextInjector<K> {
    /// Create an injector over the given session handle and cookie jar.
    pub const fn new(session: SessionHandle, jar: K, release_tag: ReleaseTag) -> Self {
        Self {
            session,
            jar,
            release_tag,
        }
    }

    fn insert_header(headers: &mut HeaderMap, name: &str, value: &str) {
        let Ok(name) = HeaderName::from_bytes(name.as_bytes()) else {
            return;
        };
        match HeaderValue::from_str(value) {
            Ok(value) => {
                headers.insert(name, value);
            },
            Err(err) => {
                tracing::warn!(header = %name, %err, "header value not injectable, skipping");
            },
        }
    }
}

impl<K: CookieJar> RequestTransform for ContextInjector<K> {
    fn transform(&self, mut request: OutboundRequest) -> OutboundRequest {
        let state = self.session.snapshot();
        let identity = state.identity();

        // Cookie projection happens on every request, exempt or not: the
        // gateway routes on these even before a session exists.
        self.jar.set(cookies::ROUTING_TAG, self.release_tag.as_str());
        match identity.user_id() {
            Some(user_id) => self.jar.set(cookies::USER_ID, user_id),
            None => self.jar.remove(cookies::USER_ID),
        }
        if let Some(cookie_header) = self.jar.header_value() {
            Self::insert_header(&mut request.headers, COOKIE.as_str(), &cookie_header);
        }

        if request.is_exempt() {
            tracing::debug!(path = %request.path, "exempt endpoint, identity headers omitted");
        } else {
            match identity.user_id() {
                Some(user_id) => {
                    Self::insert_header(&mut request.headers, headers::USER_ID, user_id);
                    tracing::debug!(path = %request.path, "X-User-ID header added");
                },
                None => tracing::debug!(path = %request.path, "X-User-ID header NOT added"),
            }
            match identity.auth_token() {
                Some(token) => {
                    Self::insert_header(&mut request.headers, headers::AUTHORIZATION, token);
                    tracing::debug!(path = %request.path, "Authorization header added");
                },
                None => tracing::debug!(path = %request.path, "Authorization header NOT added"),
            }
        }

        if !request.headers.contains_key(CONTENT_TYPE) {
            Self::insert_header(
                &mut request.headers,
                CONTENT_TYPE.as_str(),
                headers::CONTENT_TYPE_JSON,
            );
        }

        request
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Trace Correlator
// ═══════════════════════════════════════════════════════════════════════

/// Extracts the backend trace identifier from completed responses.
///
/// Precedence: the `x-b3-traceid` response header (case-insensitive) wins;
/// the `trace_id` body field is the fallback. The span identifier only ever
/// arrives in the body.
///
/// The error path is the success path: a 4xx/5xx response still carries
/// headers, and its trace identifier is captured all the same. Absence of a
/// trace identifier leaves the previously observed context in place.
///
/// This is the sole writer of the session's trace context.
pub struct TraceCorrelator<Clk> {
    session: SessionHandle,
    clock: Clk,
}

impl<Clk: Clock> TraceCorrelator<Clk> {
    /// Create a correlator over the given session handle.
    pub const fn new(session: SessionHandle, clock: Clk) -> Self {
        Self { session, clock }
    }
}

impl<Clk: Clock> ResponseTransform for TraceCorrelator<Clk> {
    fn transform(&self, response: BackendResponse) -> BackendResponse {
        let trace_id = response
            .header_str(headers::TRACE_ID)
            .filter(|s| !s.is_empty())
            .or_else(|| response.body_field_str(trace_fields::TRACE_ID))
            .map(ToOwned::to_owned);

        match trace_id {
            Some(trace_id) => {
                let span_id = response
                    .body_field_str(trace_fields::SPAN_ID)
                    .map(ToOwned::to_owned);
                tracing::debug!(%trace_id, status = %response.status, "trace identifier captured");
                self.session.write(|state| {
                    state.set_trace(TraceContext {
                        trace_id,
                        span_id,
                        observed_at: self.clock.now(),
                    });
                });
            },
            // Normal, loggable, not a failure.
            None => tracing::debug!(status = %response.status, "no trace identifier on response"),
        }

        response
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Test code can unwrap

    use super::*;
    use crate::providers::MemoryCookieJar;
    use crate::state::{Identity, SessionState};
    use front_guess_core::environment::SystemClock;
    use serde_json::json;

    fn logged_in_handle(user_id: &str, token: &str) -> SessionHandle {
        let mut state = SessionState::new();
        state.set_identity(Identity::new(Some(user_id.into()), Some(token.into())));
        SessionHandle::init(state)
    }

    fn injector(session: SessionHandle) -> ContextInjector<MemoryCookieJar> {
        ContextInjector::new(session, MemoryCookieJar::new(), ReleaseTag::Base)
    }

    #[test]
    fn test_protected_request_gets_identity_headers() {
        let request = injector(logged_in_handle("42", "tok"))
            .transform(OutboundRequest::get("/scoreboard"));

        assert_eq!(request.header_str("X-User-ID"), Some("42"));
        assert_eq!(request.header_str("Authorization"), Some("tok"));
    }

    #[test]
    fn test_authorization_is_raw_token() {
        let request = injector(logged_in_handle("42", "tok"))
            .transform(OutboundRequest::get("/game"));
        // Raw token, no Bearer prefix
        assert_eq!(request.header_str("Authorization"), Some("tok"));
    }

    #[test]
    fn test_empty_session_omits_headers_entirely() {
        let request = injector(SessionHandle::new()).transform(OutboundRequest::get("/game"));

        // Omitted, not sent as "null" strings
        assert!(request.header_str("X-User-ID").is_none());
        assert!(request.header_str("Authorization").is_none());
    }

    #[test]
    fn test_exempt_endpoints_omit_identity_even_when_logged_in() {
        let injector = injector(logged_in_handle("42", "tok"));

        for path in ["/login", "/register"] {
            let request = injector.transform(OutboundRequest::post(path, json!({})));
            assert!(request.header_str("X-User-ID").is_none(), "{path}");
            assert!(request.header_str("Authorization").is_none(), "{path}");
        }
    }

    #[test]
    fn test_content_type_default_does_not_override() {
        let injector = injector(SessionHandle::new());

        let defaulted = injector.transform(OutboundRequest::get("/game"));
        assert_eq!(
            defaulted.header_str("content-type"),
            Some("application/json")
        );

        let mut explicit = OutboundRequest::get("/game");
        explicit
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        let explicit = injector.transform(explicit);
        assert_eq!(explicit.header_str("content-type"), Some("text/plain"));
    }

    #[test]
    fn test_cookies_projected_on_every_request() {
        let jar = MemoryCookieJar::new();
        let injector = ContextInjector::new(logged_in_handle("42", "tok"), jar.clone(), ReleaseTag::Gray);

        // Even an exempt request refreshes the jar
        let request = injector.transform(OutboundRequest::post("/login", json!({})));

        assert_eq!(jar.get("X-User-ID").as_deref(), Some("42"));
        assert_eq!(jar.get("x-pre-higress-tag").as_deref(), Some("gray"));
        assert_eq!(
            request.header_str("cookie"),
            Some("X-User-ID=42; x-pre-higress-tag=gray")
        );
    }

    #[test]
    fn test_stale_identity_cookie_is_dropped_when_logged_out() {
        let jar = MemoryCookieJar::new();
        jar.set("X-User-ID", "stale");
        let injector = ContextInjector::new(SessionHandle::new(), jar.clone(), ReleaseTag::Base);

        let _ = injector.transform(OutboundRequest::get("/game"));
        assert_eq!(jar.get("X-User-ID"), None);
    }

    #[test]
    fn test_injector_sees_latest_state_not_a_captured_one() {
        let session = SessionHandle::new();
        let injector = injector(session.clone());

        let before = injector.transform(OutboundRequest::get("/game"));
        assert!(before.header_str("X-User-ID").is_none());

        session.write(|state| {
            state.set_identity(Identity::new(Some("9".into()), Some("t9".into())));
        });

        let after = injector.transform(OutboundRequest::get("/game"));
        assert_eq!(after.header_str("X-User-ID"), Some("9"));
    }

    #[test]
    fn test_trace_captured_from_header() {
        let session = SessionHandle::new();
        let correlator = TraceCorrelator::new(session.clone(), SystemClock);

        let mut response = BackendResponse::empty(StatusCode::OK);
        response
            .headers
            .insert("x-b3-traceid", HeaderValue::from_static("abc123"));
        let _ = correlator.transform(response);

        assert_eq!(session.snapshot().trace_id(), Some("abc123"));
    }

    #[test]
    fn test_trace_header_lookup_is_case_insensitive() {
        let session = SessionHandle::new();
        let correlator = TraceCorrelator::new(session.clone(), SystemClock);

        let mut response = BackendResponse::empty(StatusCode::OK);
        // HeaderMap normalizes names; this mirrors a proxy sending mixed case
        response.headers.insert(
            HeaderName::from_bytes(b"X-B3-TraceId").unwrap(),
            HeaderValue::from_static("abc123"),
        );
        let _ = correlator.transform(response);

        assert_eq!(session.snapshot().trace_id(), Some("abc123"));
    }

    #[test]
    fn test_trace_header_wins_over_body() {
        let session = SessionHandle::new();
        let correlator = TraceCorrelator::new(session.clone(), SystemClock);

        let mut response = BackendResponse::empty(StatusCode::OK);
        response
            .headers
            .insert("x-b3-traceid", HeaderValue::from_static("from-header"));
        response.body = json!({ "trace_id": "from-body", "span_id": "span-1" });
        let _ = correlator.transform(response);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.trace_id(), Some("from-header"));
        // Span only ever arrives in the body
        assert_eq!(
            snapshot.trace().and_then(|t| t.span_id.as_deref()),
            Some("span-1")
        );
    }

    #[test]
    fn test_trace_captured_from_body_fields() {
        let session = SessionHandle::new();
        let correlator = TraceCorrelator::new(session.clone(), SystemClock);

        let mut response = BackendResponse::empty(StatusCode::OK);
        response.body = json!({ "trace_id": "tid-9", "span_id": "sid-3" });
        let _ = correlator.transform(response);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.trace_id(), Some("tid-9"));
        assert_eq!(
            snapshot.trace().and_then(|t| t.span_id.as_deref()),
            Some("sid-3")
        );
    }

    #[test]
    fn test_trace_captured_on_error_responses() {
        let session = SessionHandle::new();
        let correlator = TraceCorrelator::new(session.clone(), SystemClock);

        let mut response = BackendResponse::empty(StatusCode::INTERNAL_SERVER_ERROR);
        response
            .headers
            .insert("x-b3-traceid", HeaderValue::from_static("err-trace"));
        let _ = correlator.transform(response);

        assert_eq!(session.snapshot().trace_id(), Some("err-trace"));
    }

    #[test]
    fn test_absent_trace_leaves_previous_value() {
        let session = SessionHandle::new();
        let correlator = TraceCorrelator::new(session.clone(), SystemClock);

        let mut with_trace = BackendResponse::empty(StatusCode::OK);
        with_trace
            .headers
            .insert("x-b3-traceid", HeaderValue::from_static("abc123"));
        let _ = correlator.transform(with_trace);

        // Next response has no trace identifier: not reset to None
        let _ = correlator.transform(BackendResponse::empty(StatusCode::OK));
        assert_eq!(session.snapshot().trace_id(), Some("abc123"));
    }

    #[test]
    fn test_pipeline_applies_transforms_in_order() {
        struct PathSuffix(&'static str);
        impl RequestTransform for PathSuffix {
            fn transform(&self, mut request: OutboundRequest) -> OutboundRequest {
                request.path.push_str(self.0);
                request
            }
        }

        let pipeline = Pipeline::new()
            .with_request_transform(Box::new(PathSuffix("/a")))
            .with_request_transform(Box::new(PathSuffix("/b")));

        let request = pipeline.prepare(OutboundRequest::get("/base"));
        assert_eq!(request.path, "/base/a/b");
    }
}
