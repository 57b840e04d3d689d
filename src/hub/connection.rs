/**
 * Connection Bookkeeping
 *
 * This module defines the per-connection delivery primitive used by the
 * hub. Every live client session gets a bounded queue; the hub enqueues
 * events with a non-blocking `try_send` and the transport's writer task
 * drains the queue onto the socket. A slow or dead connection therefore
 * never stalls a broadcast: when its queue is full the newest event for
 * that connection is dropped and everyone else is unaffected.
 */
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::shared::ServerEvent;

/// Opaque identifier of one live client session
pub type ConnectionId = Uuid;

/// Bounded, non-blocking sender half of a connection's outbound queue
#[derive(Debug)]
pub(crate) struct ConnectionSender {
    tx: mpsc::Sender<ServerEvent>,
}

impl ConnectionSender {
    /// Create a queue of the given capacity and return the sender together
    /// with the receiver for the transport's writer task
    pub(crate) fn new(capacity: usize) -> (Self, mpsc::Receiver<ServerEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Enqueue an event without blocking
    ///
    /// Returns `false` when the event was dropped because the queue is full
    /// (stalled consumer) or closed (dead consumer). Failures are isolated
    /// to this connection; callers keep broadcasting to the rest.
    pub(crate) fn deliver(&self, event: ServerEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::debug!("[Hub] Connection queue full, dropping event");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!("[Hub] Connection queue closed, dropping event");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::ChatMessage;

    #[test]
    fn test_deliver_drops_when_full_without_blocking() {
        let (sender, mut rx) = ConnectionSender::new(2);
        let event = ServerEvent::Message(ChatMessage::new("alice", "hi"));

        assert!(sender.deliver(event.clone()));
        assert!(sender.deliver(event.clone()));
        // Queue is full: the newest event is dropped, the call still returns.
        assert!(!sender.deliver(event.clone()));

        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_deliver_reports_closed_receiver() {
        let (sender, rx) = ConnectionSender::new(2);
        drop(rx);
        let event = ServerEvent::Message(ChatMessage::new("alice", "hi"));
        assert!(!sender.deliver(event));
    }
}
