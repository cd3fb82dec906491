//! Shutdown coordination.

use tokio::sync::broadcast::{self, error::RecvError};

/// Coordinator for graceful shutdown.
///
/// Cloneable handle over a broadcast channel. Signal handlers and tests call
/// [`trigger`](Self::trigger); the server listens through a
/// [`ShutdownSignal`]. The first trigger starts a drain, a second one forces
/// it to stop.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(4);
        Self { tx }
    }

    /// Subscribe to shutdown triggers.
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Number of live subscribers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side of [`Shutdown`].
#[derive(Debug)]
pub struct ShutdownSignal {
    rx: broadcast::Receiver<()>,
}

impl ShutdownSignal {
    /// Wait for the next trigger. Dropping every [`Shutdown`] handle counts
    /// as a trigger.
    pub async fn recv(&mut self) {
        match self.rx.recv().await {
            Ok(()) | Err(RecvError::Lagged(_)) | Err(RecvError::Closed) => {}
        }
    }

    /// Wait for the next explicit trigger. Never resolves once every
    /// [`Shutdown`] handle is gone.
    pub async fn recv_forced(&mut self) {
        match self.rx.recv().await {
            Ok(()) | Err(RecvError::Lagged(_)) => {}
            Err(RecvError::Closed) => std::future::pending().await,
        }
    }
}

/// How a drain ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Every connection finished inside the grace period.
    Graceful,
    /// The grace period ran out with connections still open.
    DeadlineElapsed,
    /// A second trigger arrived while draining.
    Forced,
}

impl ShutdownOutcome {
    /// Process exit status for this outcome.
    pub fn exit_code(self) -> u8 {
        match self {
            ShutdownOutcome::Graceful => 0,
            ShutdownOutcome::DeadlineElapsed => 1,
            ShutdownOutcome::Forced => 130,
        }
    }
}
