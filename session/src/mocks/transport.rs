//! Scripted transport for tests.

use crate::error::{Result, SessionError};
use crate::pipeline::{BackendResponse, OutboundRequest};
use crate::providers::Transport;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

/// Scripted [`Transport`].
///
/// Responses are dequeued in FIFO order, one per `execute` call; every
/// executed request is recorded (post-pipeline, so tests can assert on the
/// injected headers). Clones share the script and the recording.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    script: Arc<Mutex<VecDeque<Result<BackendResponse>>>>,
    requests: Arc<Mutex<Vec<OutboundRequest>>>,
}

impl MockTransport {
    /// Create a transport with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response.
    pub fn enqueue(&self, response: BackendResponse) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Ok(response));
    }

    /// Queue a transport-level failure.
    pub fn enqueue_error(&self, error: SessionError) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Err(error));
    }

    /// Every request executed so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Transport for MockTransport {
    async fn execute(&self, request: OutboundRequest) -> Result<BackendResponse> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| {
                Err(SessionError::Transport {
                    message: "mock transport exhausted".into(),
                })
            })
    }
}
