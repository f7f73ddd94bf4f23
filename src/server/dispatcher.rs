//! # Request Dispatcher
//!
//! Consumes the decoded request stream and routes each request to its
//! operation handler.
//!
//! ## Processing Model
//!
//! Every accepted request runs in its own task, tracked against a drain
//! barrier. Nothing orders two in-flight requests, even for the same client:
//! a RemoveItem published right after an AddItem for the same value may apply
//! first, depending on which task wins the store lock. Callers that need
//! strict per-client ordering must serialize on their side.
//!
//! ## Shutdown
//!
//! When the cancellation token fires the dispatcher stops consuming, closes
//! the tracker, and waits for every already-started handler to finish before
//! returning. No handler is abandoned mid-flight.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::common::messages::{OperationKind, Request};

use super::service::StoreService;

/// Source of decoded requests.
///
/// Given a cancellation token, yields a sequential stream of requests and an
/// error if the stream cannot be established. Implementations must stop
/// producing and release their transport resources promptly once the token
/// fires.
#[async_trait]
pub trait RequestQueue {
    async fn requests(self, shutdown: CancellationToken) -> Result<mpsc::Receiver<Request>>;
}

/// Routes incoming requests to handlers and manages concurrent execution and
/// graceful shutdown.
pub struct Dispatcher {
    service: Arc<StoreService>,
}

impl Dispatcher {
    pub fn new(service: Arc<StoreService>) -> Self {
        Self { service }
    }

    /// Consume requests until the shutdown token fires or the queue closes,
    /// then drain in-flight handlers.
    ///
    /// Only a failure to establish the request stream is an error. Handler
    /// failures and unknown operation kinds degrade to warnings and never
    /// stop the loop.
    pub async fn run<Q: RequestQueue>(&self, queue: Q, shutdown: CancellationToken) -> Result<()> {
        let mut requests = queue
            .requests(shutdown.clone())
            .await
            .context("can't open request stream")?;

        // One task per accepted request; the tracker is the drain barrier on
        // shutdown. Handler concurrency is unbounded.
        let tracker = TaskTracker::new();

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                request = requests.recv() => match request {
                    Some(request) => self.dispatch(&tracker, request),
                    None => break, // queue closed upstream
                },
            }
        }

        tracker.close();
        info!("⏳ Draining {} in-flight request(s)...", tracker.len());
        tracker.wait().await;

        Ok(())
    }

    /// Parse the operation kind and start the handler. Unknown kinds are
    /// discarded with a warning and never reach a handler.
    fn dispatch(&self, tracker: &TaskTracker, request: Request) {
        let kind = match request.request_type.parse::<OperationKind>() {
            Ok(kind) => kind,
            Err(e) => {
                warn!("⚠️  Discarding request from client {}: {}", request.client_id, e);
                return;
            }
        };

        let service = Arc::clone(&self.service);
        tracker.spawn(async move {
            if let Err(e) = service.handle(kind, &request).await {
                warn!(
                    "⚠️  {} request from client {} failed: {}",
                    kind, request.client_id, e
                );
            }
        });
    }
}
