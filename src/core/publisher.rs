//! Outbound publish queue.
//!
//! Publishes are drained FIFO by a single worker task, so sends reach the
//! transport in the order they were queued. Each request carries a oneshot
//! completion slot; callers that care about delivery await the ticket,
//! chat-path callers drop it.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::transport::{Payload, StreamTransport};

const QUEUE_CAPACITY: usize = 16;

struct PublishRequest {
    stream: String,
    payload: Payload,
    done: oneshot::Sender<Result<(), String>>,
}

/// Resolves once the corresponding transport publish has completed.
pub struct PublishTicket {
    done: oneshot::Receiver<Result<(), String>>,
}

impl PublishTicket {
    /// Waits for the publish to complete. Errors carry the transport's own
    /// message; a publish dropped during shutdown reports the worker as
    /// stopped.
    pub async fn wait(self) -> Result<(), String> {
        match self.done.await {
            Ok(result) => result,
            Err(_) => Err("publish worker stopped".to_string()),
        }
    }
}

pub struct PublishService {
    tx: mpsc::Sender<PublishRequest>,
    cancel: CancellationToken,
}

impl PublishService {
    /// Spawns the worker task. Must be called from within a tokio runtime.
    pub fn spawn(transport: Arc<dyn StreamTransport>) -> Self {
        let (tx, mut rx) = mpsc::channel::<PublishRequest>(QUEUE_CAPACITY);
        let cancel = CancellationToken::new();
        let worker_cancel = cancel.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = worker_cancel.cancelled() => break,
                    maybe_request = rx.recv() => {
                        let Some(request) = maybe_request else { break };
                        let PublishRequest { stream, payload, done } = request;
                        let result = transport.publish(&stream, payload).await;
                        match &result {
                            Ok(()) => debug!(stream = %stream, "publish complete"),
                            Err(error) => warn!(stream = %stream, error = %error, "publish failed"),
                        }
                        let _ = done.send(result);
                    }
                }
            }
        });

        Self { tx, cancel }
    }

    /// Queues one publish. Suspends only when the queue is full.
    pub async fn enqueue(&self, stream: &str, payload: Payload) -> PublishTicket {
        let (done_tx, done_rx) = oneshot::channel();
        let request = PublishRequest {
            stream: stream.to_string(),
            payload,
            done: done_tx,
        };
        // A failed send means the worker is gone; the dropped request
        // resolves the ticket with an error.
        let _ = self.tx.send(request).await;
        PublishTicket { done: done_rx }
    }

    /// Stops the worker. The in-flight publish, if any, runs to completion;
    /// queued requests are dropped and their tickets resolve with an error.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::RecordingTransport;
    use futures_util::FutureExt;
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test]
    async fn ticket_resolves_after_publish_completes() {
        let transport = RecordingTransport::new();
        let service = PublishService::spawn(transport.clone());

        let ticket = service.enqueue("alpha", Payload::text("hello")).await;
        ticket.wait().await.unwrap();

        assert_eq!(
            transport.publishes(),
            vec![("alpha".to_string(), Payload::text("hello"))]
        );
    }

    #[tokio::test]
    async fn ticket_carries_transport_error() {
        let transport = RecordingTransport::new();
        transport.fail_publishes("stream unavailable");
        let service = PublishService::spawn(transport.clone());

        let ticket = service.enqueue("alpha", Payload::text("hello")).await;
        let error = ticket.wait().await.unwrap_err();

        assert_eq!(error, "stream unavailable");
        assert!(transport.publishes().is_empty());
    }

    #[tokio::test]
    async fn publishes_drain_in_enqueue_order() {
        let transport = RecordingTransport::new();
        let service = PublishService::spawn(transport.clone());

        let first = service.enqueue("alpha", Payload::text("one")).await;
        let second = service
            .enqueue("beta", Payload::Object(json!({"n": 2})))
            .await;
        let third = service.enqueue("alpha", Payload::text("three")).await;

        first.wait().await.unwrap();
        second.wait().await.unwrap();
        third.wait().await.unwrap();

        assert_eq!(
            transport.publishes(),
            vec![
                ("alpha".to_string(), Payload::text("one")),
                ("beta".to_string(), Payload::Object(json!({"n": 2}))),
                ("alpha".to_string(), Payload::text("three")),
            ]
        );
    }

    #[tokio::test]
    async fn dropped_tickets_do_not_stall_the_queue() {
        let transport = RecordingTransport::new();
        let service = PublishService::spawn(transport.clone());

        drop(service.enqueue("alpha", Payload::text("fire and forget")).await);
        let ticket = service.enqueue("alpha", Payload::text("tracked")).await;
        ticket.wait().await.unwrap();

        assert_eq!(transport.publishes().len(), 2);
    }

    #[tokio::test]
    async fn shutdown_stops_the_worker() {
        let transport = RecordingTransport::new();
        let service = PublishService::spawn(transport.clone());
        service.shutdown();

        let ticket = service.enqueue("alpha", Payload::text("late")).await;
        let result = tokio::time::timeout(Duration::from_secs(1), ticket.wait())
            .await
            .expect("ticket should resolve");
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn ticket_is_pending_until_awaited_publish_runs() {
        let transport = RecordingTransport::new();
        let service = PublishService::spawn(transport.clone());

        let ticket = service.enqueue("alpha", Payload::text("hello")).await;
        let mut wait = Box::pin(ticket.wait());
        // The worker may not have run yet; polling must not panic either way.
        let early = (&mut wait).now_or_never();
        if let Some(result) = early {
            result.unwrap();
        } else {
            wait.await.unwrap();
        }
        assert_eq!(transport.publishes().len(), 1);
    }
}
