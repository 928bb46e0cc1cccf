//! Shutdown coordination.

use std::fmt;

use tokio::sync::broadcast;

/// Why orderly termination began.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// SIGINT / Ctrl-C.
    Interrupt,
    /// SIGTERM.
    Terminate,
    /// Triggered programmatically.
    Requested,
}

impl ShutdownReason {
    /// Status reported in place of main's return value.
    pub fn exit_status(&self) -> i32 {
        match self {
            ShutdownReason::Interrupt => 130,
            ShutdownReason::Terminate => 143,
            ShutdownReason::Requested => 0,
        }
    }
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ShutdownReason::Interrupt => "interrupt",
            ShutdownReason::Terminate => "terminate",
            ShutdownReason::Requested => "requested",
        };
        f.write_str(label)
    }
}

/// Coordinator for orderly termination.
///
/// The launcher subscribes before main starts; the signal listener (or any
/// other holder of a clone) triggers it.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<ShutdownReason>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ShutdownReason> {
        self.tx.subscribe()
    }

    /// Signal every subscriber. A no-op when nobody listens.
    pub fn trigger(&self, reason: ShutdownReason) {
        tracing::info!(%reason, subscribers = self.tx.receiver_count(), "Shutdown triggered");
        let _ = self.tx.send(reason);
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Wait for the next shutdown reason on `rx`.
///
/// A lagging receiver skips to the newest reason. A closed channel means no
/// trigger can arrive any more and reads as [`ShutdownReason::Requested`].
pub async fn recv_reason(rx: &mut broadcast::Receiver<ShutdownReason>) -> ShutdownReason {
    loop {
        match rx.recv().await {
            Ok(reason) => return reason,
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                tracing::debug!(missed, "Shutdown receiver lagged");
            }
            Err(broadcast::error::RecvError::Closed) => return ShutdownReason::Requested,
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trigger_reaches_subscriber() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();
        shutdown.clone().trigger(ShutdownReason::Terminate);
        assert_eq!(rx.recv().await.unwrap(), ShutdownReason::Terminate);
    }

    #[tokio::test]
    async fn test_recv_reason_after_repeated_triggers() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();
        shutdown.trigger(ShutdownReason::Interrupt);
        shutdown.trigger(ShutdownReason::Terminate);
        assert_eq!(recv_reason(&mut rx).await, ShutdownReason::Terminate);
    }

    #[tokio::test]
    async fn test_recv_reason_on_closed_channel() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();
        drop(shutdown);
        assert_eq!(recv_reason(&mut rx).await, ShutdownReason::Requested);
    }

    #[test]
    fn test_exit_status() {
        assert_eq!(ShutdownReason::Interrupt.exit_status(), 130);
        assert_eq!(ShutdownReason::Requested.exit_status(), 0);
    }
}
