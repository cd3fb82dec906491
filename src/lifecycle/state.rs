//! Process lifecycle state machine.

use tokio::sync::watch;

/// Where the process is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LifecycleState {
    Starting,
    Serving,
    ShuttingDown,
    Exited,
}

impl LifecycleState {
    /// The only state this one may move to.
    pub fn successor(self) -> Option<LifecycleState> {
        match self {
            LifecycleState::Starting => Some(LifecycleState::Serving),
            LifecycleState::Serving => Some(LifecycleState::ShuttingDown),
            LifecycleState::ShuttingDown => Some(LifecycleState::Exited),
            LifecycleState::Exited => None,
        }
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LifecycleState::Starting => "starting",
            LifecycleState::Serving => "serving",
            LifecycleState::ShuttingDown => "shutting_down",
            LifecycleState::Exited => "exited",
        };
        f.write_str(name)
    }
}

/// Publishes [`LifecycleState`] changes to any number of observers.
#[derive(Debug)]
pub struct Lifecycle {
    tx: watch::Sender<LifecycleState>,
}

impl Lifecycle {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(LifecycleState::Starting);
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> LifecycleState {
        *self.tx.borrow()
    }

    /// Move to `next` if it is the successor of the current state.
    /// Returns whether the transition happened.
    pub fn advance(&self, next: LifecycleState) -> bool {
        let mut from = None;
        let moved = self.tx.send_if_modified(|state| {
            if state.successor() == Some(next) {
                from = Some(*state);
                *state = next;
                true
            } else {
                false
            }
        });

        match from {
            Some(from) => tracing::debug!(%from, to = %next, "Lifecycle transition"),
            None => tracing::warn!(current = %self.current(), requested = %next, "Rejected lifecycle transition"),
        }
        moved
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}
