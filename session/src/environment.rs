//! Session environment.
//!
//! This module defines the environment type for dependency injection in the
//! session reducer.

use crate::pipeline::{BackendResponse, OutboundRequest, Pipeline};
use crate::providers::Transport;
use crate::error::Result;
use std::sync::Arc;

/// Session environment.
///
/// Contains the dependencies the reducer's effects need: the transport and
/// the middleware pipeline wrapping it. Local projections (credential store,
/// cookie jar) are not here — they belong to the reconciler, which runs in
/// the imperative shell after the reducer, never inside it.
///
/// # Type Parameters
///
/// - `T`: HTTP transport
#[derive(Debug, Clone)]
pub struct SessionEnvironment<T>
where
    T: Transport + Clone,
{
    /// HTTP transport to the backend.
    pub transport: T,

    /// Middleware pipeline applied around every transport call.
    pub pipeline: Arc<Pipeline>,
}

impl<T> SessionEnvironment<T>
where
    T: Transport + Clone,
{
    /// Create a new session environment.
    #[must_use]
    pub const fn new(transport: T, pipeline: Arc<Pipeline>) -> Self {
        Self {
            transport,
            pipeline,
        }
    }

    /// Send a request through the pipeline: prepare, execute, complete.
    ///
    /// The response side runs for every answered request, 4xx/5xx included,
    /// so trace correlation is never skipped just because the business call
    /// failed.
    ///
    /// # Errors
    ///
    /// Propagates transport errors (unreachable backend, timeout). No
    /// response transforms run in that case; there is no response metadata
    /// to observe.
    pub async fn send(&self, request: OutboundRequest) -> Result<BackendResponse> {
        let prepared = self.pipeline.prepare(request);
        let response = self.transport.execute(prepared).await?;
        Ok(self.pipeline.complete(response))
    }
}
