//! Shutdown and error types for the event queue.

/// How the queue worker stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownMode {
    /// Graceful shutdown: The worker stops accepting events, applies every
    /// event already queued (running their completions), then exits.
    Graceful,
    /// Immediate shutdown: The worker exits right away. Queued events are
    /// dropped and their completions never run.
    Immediate,
}

/// Error returned when an event cannot be handed to the queue.
///
/// # Type Parameters
///
/// * `E`: The machine's event type. A rejected event is handed back through
///   [`SubmitError::Closed`].
#[derive(Debug, thiserror::Error)]
pub enum SubmitError<E> {
    /// The worker has stopped and no longer accepts events.
    #[error("event queue is closed")]
    Closed(E),
    /// The event was accepted but discarded before it was applied, either by
    /// an immediate shutdown or because the machine was released.
    #[error("queued event was dropped before it was applied")]
    Dropped,
}

impl<E> SubmitError<E> {
    /// Returns the rejected event, if the queue handed it back.
    pub fn into_event(self) -> Option<E> {
        match self {
            Self::Closed(event) => Some(event),
            Self::Dropped => None,
        }
    }
}

/// Error type returned by the queue's background task.
///
/// The engine has no failure modes of its own; this only reports runtime
/// failures of the Tokio task itself, such as a hook that panicked on the
/// worker.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// The worker panicked or was cancelled.
    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}
