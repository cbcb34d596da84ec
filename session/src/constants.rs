//! Session layer constants.
//!
//! Wire names shared with the backend and the gateway tier. The backend and
//! the routing layer match on these strings verbatim, so they are collected
//! here rather than scattered through the pipeline.

/// Request and response header names.
pub mod headers {
    /// Identity header attached to protected requests.
    pub const USER_ID: &str = "X-User-ID";

    /// Authorization header. Carries the raw auth token, no `Bearer` prefix.
    pub const AUTHORIZATION: &str = "Authorization";

    /// Response header carrying the backend trace identifier (B3 propagation).
    ///
    /// Matched case-insensitively; stored lowercase because `HeaderMap`
    /// normalizes names to lowercase anyway.
    pub const TRACE_ID: &str = "x-b3-traceid";

    /// Default request content type, applied only when the caller has not
    /// set one explicitly.
    pub const CONTENT_TYPE_JSON: &str = "application/json";
}

/// Cookie names projected for the gateway tier.
pub mod cookies {
    /// Identity cookie read by the gateway without parsing the body.
    pub const USER_ID: &str = "X-User-ID";

    /// Release/routing tag cookie steering traffic to a deployment variant.
    pub const ROUTING_TAG: &str = "x-pre-higress-tag";
}

/// Keys used in the persisted credential entry.
pub mod persisted {
    /// Persisted user identifier key.
    pub const USER_ID: &str = "userId";

    /// Persisted auth token key.
    pub const AUTH_TOKEN: &str = "authToken";
}

/// Endpoint classification.
pub mod endpoints {
    /// Login endpoint (exempt: establishes identity).
    pub const LOGIN: &str = "/login";

    /// Register endpoint (exempt: establishes identity).
    pub const REGISTER: &str = "/register";

    /// Paths that never receive identity headers.
    pub const EXEMPT: &[&str] = &[LOGIN, REGISTER];
}

/// User-facing messages.
pub mod messages {
    /// Shown when registration is rejected. Deliberately generic: the raw
    /// status or transport text is for logs, not for users.
    pub const REGISTRATION_FAILED: &str = "registration failed, please try again";
}

/// Response body fields carrying trace context when no header is present.
pub mod trace_fields {
    /// Body field with the trace identifier.
    pub const TRACE_ID: &str = "trace_id";

    /// Body field with the span identifier.
    pub const SPAN_ID: &str = "span_id";
}
