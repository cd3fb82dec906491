//! OS signal handling.
//!
//! # Responsibilities
//! - Register handlers for SIGINT and SIGTERM (Ctrl+C elsewhere)
//! - Translate them into [`Shutdown`] triggers
//!
//! The first signal starts a graceful drain. The second one triggers again,
//! which the server treats as a request to stop draining immediately.

use tokio::task::JoinHandle;

use crate::lifecycle::shutdown::Shutdown;

/// Termination signals the process reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationSignal {
    Interrupt,
    Terminate,
}

impl std::fmt::Display for TerminationSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminationSignal::Interrupt => f.write_str("SIGINT"),
            TerminationSignal::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// Installed signal handlers.
#[derive(Debug)]
pub struct SignalListener {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl SignalListener {
    /// Register the handlers. Must run inside the Tokio runtime.
    #[cfg(unix)]
    pub fn install() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    #[cfg(not(unix))]
    pub fn install() -> std::io::Result<Self> {
        Ok(Self {})
    }

    /// Wait for the next termination signal.
    #[cfg(unix)]
    pub async fn recv(&mut self) -> TerminationSignal {
        tokio::select! {
            _ = self.interrupt.recv() => TerminationSignal::Interrupt,
            _ = self.terminate.recv() => TerminationSignal::Terminate,
        }
    }

    #[cfg(not(unix))]
    pub async fn recv(&mut self) -> TerminationSignal {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Ctrl+C handler failed");
            std::future::pending::<()>().await;
        }
        TerminationSignal::Interrupt
    }
}

/// Forward termination signals to `shutdown` from a background task.
pub fn spawn(shutdown: Shutdown) -> std::io::Result<JoinHandle<()>> {
    let mut signals = SignalListener::install()?;

    Ok(tokio::spawn(async move {
        let first = signals.recv().await;
        tracing::info!(
            signal = %first,
            "Shutting down gracefully, send the signal again to force"
        );
        shutdown.trigger();

        let second = signals.recv().await;
        tracing::warn!(signal = %second, "Second termination signal, forcing shutdown");
        shutdown.trigger();
    }))
}
