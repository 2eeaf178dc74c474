//! Serialized event queue around a [`Machine`].
//!
//! Events submitted from any thread are applied one at a time, in submission
//! order, by a single Tokio task. Submitting never blocks: the caller learns
//! about completion only through an optional callback or by awaiting
//! [`QueuedMachine::handle_and_wait`].

use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::task::{Context, Poll};

use statekit_core::{Config, Machine};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::types::{ShutdownMode, SubmitError, TaskError};

/// What to do once a unit's event has been applied.
enum Completion<S> {
    Notify(Box<dyn FnOnce() + Send>),
    Reply(oneshot::Sender<S>),
}

/// One queued event.
struct Unit<S, E> {
    event: E,
    completion: Option<Completion<S>>,
}

/// Cloneable handle for submitting events to a [`QueuedMachine`].
///
/// A submitter does not keep the machine alive. Once the owning
/// [`QueuedMachine`] is dropped, events still submitted here are dequeued and
/// skipped. This is the handle hooks use to queue follow-up events; see
/// [`QueuedMachine::configure`].
pub struct Submitter<S, E> {
    units: mpsc::UnboundedSender<Unit<S, E>>,
}

impl<S, E> Clone for Submitter<S, E> {
    fn clone(&self) -> Self {
        Self {
            units: self.units.clone(),
        }
    }
}

impl<S, E> fmt::Debug for Submitter<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Submitter")
            .field("closed", &self.units.is_closed())
            .finish()
    }
}

impl<S, E: fmt::Debug> Submitter<S, E> {
    /// Queues `event` and returns immediately.
    ///
    /// Events submitted after the worker stopped are dropped; use
    /// [`try_handle`](Self::try_handle) to find out.
    pub fn handle(&self, event: E) {
        self.submit(event, None);
    }

    /// Queues `event`; `on_complete` runs on the worker once the machine has
    /// applied it and every hook has returned.
    ///
    /// If the [`QueuedMachine`] has been dropped by the time the event is
    /// dequeued, the event is skipped and `on_complete` never runs.
    pub fn handle_then<F>(&self, event: E, on_complete: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit(event, Some(Completion::Notify(Box::new(on_complete))));
    }

    /// Queues `event`, handing it back if the worker has stopped.
    pub fn try_handle(&self, event: E) -> Result<(), SubmitError<E>> {
        self.enqueue(Unit {
            event,
            completion: None,
        })
    }

    /// Queues `event` and waits until it has been applied, returning the
    /// machine's state at that point.
    pub async fn handle_and_wait(&self, event: E) -> Result<S, SubmitError<E>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.enqueue(Unit {
            event,
            completion: Some(Completion::Reply(reply_tx)),
        })?;
        reply_rx.await.map_err(|_| SubmitError::Dropped)
    }

    /// Returns `true` once the worker no longer accepts events.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.units.is_closed()
    }

    fn submit(&self, event: E, completion: Option<Completion<S>>) {
        if let Err(SubmitError::Closed(event)) = self.enqueue(Unit { event, completion }) {
            tracing::debug!(target: "statekit::queue", ?event, "queue closed, event dropped");
        }
    }

    fn enqueue(&self, unit: Unit<S, E>) -> Result<(), SubmitError<E>> {
        self.units
            .send(unit)
            .map_err(|mpsc::error::SendError(unit)| SubmitError::Closed(unit.event))
    }
}

/// A [`Machine`] driven by a single background worker.
///
/// All submissions, from any number of threads, go through one FIFO queue;
/// the worker applies them strictly one after another, so hooks never run
/// concurrently and never interleave between events. There is no synchronous
/// path to the wrapped machine.
///
/// Dropping the `QueuedMachine` releases the machine. Events still queued at
/// that point are skipped without running their completions, and the worker
/// exits once every [`Submitter`] is gone.
///
/// ```rust
/// use tokio_statekit::QueuedMachine;
///
/// #[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// enum State { Foo, Bar }
///
/// #[derive(Debug, PartialEq, Eq, Hash)]
/// enum Event { Go }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (machine, _task) = QueuedMachine::configure(State::Foo, |config, _| {
///     config.transition(State::Foo, Event::Go, State::Bar);
/// });
///
/// let state = machine.handle_and_wait(Event::Go).await.unwrap();
/// assert_eq!(state, State::Bar);
/// # }
/// ```
pub struct QueuedMachine<S, E> {
    machine: Arc<Mutex<Machine<S, E>>>,
    submitter: Submitter<S, E>,
    state_rx: watch::Receiver<S>,
    shutdown_tx: watch::Sender<Option<ShutdownMode>>,
}

impl<S, E> QueuedMachine<S, E>
where
    S: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static,
    E: Eq + Hash + fmt::Debug + Send + 'static,
{
    /// Places a machine in `initial` and starts its worker.
    ///
    /// Must be called from within a Tokio runtime. The returned [`QueueTask`]
    /// resolves when the worker exits.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn spawn(initial: S, config: Config<S, E>) -> (Self, QueueTask) {
        let (units_tx, units_rx) = mpsc::unbounded_channel();
        Self::start(initial, config, units_tx, units_rx)
    }

    /// Like [`spawn`](Self::spawn), building the configuration in place.
    ///
    /// `build` also receives a [`Submitter`] for the queue being created, so
    /// hooks can queue follow-up events. Such events run after the current
    /// one has finished, against whatever state the machine is in by then.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn configure<F>(initial: S, build: F) -> (Self, QueueTask)
    where
        F: FnOnce(&mut Config<S, E>, &Submitter<S, E>),
    {
        let (units_tx, units_rx) = mpsc::unbounded_channel();
        let submitter = Submitter { units: units_tx };

        let mut config = Config::new();
        build(&mut config, &submitter);

        Self::start(initial, config, submitter.units, units_rx)
    }

    fn start(
        initial: S,
        config: Config<S, E>,
        units_tx: mpsc::UnboundedSender<Unit<S, E>>,
        units_rx: mpsc::UnboundedReceiver<Unit<S, E>>,
    ) -> (Self, QueueTask) {
        let (state_tx, state_rx) = watch::channel(initial.clone());
        let (shutdown_tx, shutdown_rx) = watch::channel(None);

        let machine = Arc::new(Mutex::new(Machine::new(initial, config)));
        let worker = Worker {
            machine: Arc::downgrade(&machine),
            units: units_rx,
            shutdown: shutdown_rx,
            state_tx,
        };
        let handle = tokio::spawn(worker.run());

        (
            Self {
                machine,
                submitter: Submitter { units: units_tx },
                state_rx,
                shutdown_tx,
            },
            QueueTask { handle },
        )
    }

    /// Queues `event` and returns immediately.
    pub fn handle(&self, event: E) {
        self.submitter.handle(event);
    }

    /// Queues `event`; `on_complete` runs on the worker once it was applied.
    ///
    /// If this `QueuedMachine` is dropped before the event is dequeued, the
    /// event is skipped and `on_complete` never runs.
    pub fn handle_then<F>(&self, event: E, on_complete: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.submitter.handle_then(event, on_complete);
    }

    /// Queues `event`, handing it back if the worker has stopped.
    pub fn try_handle(&self, event: E) -> Result<(), SubmitError<E>> {
        self.submitter.try_handle(event)
    }

    /// Queues `event` and waits until it has been applied.
    pub async fn handle_and_wait(&self, event: E) -> Result<S, SubmitError<E>> {
        self.submitter.handle_and_wait(event).await
    }

    /// Returns a new handle for submitting events to this queue.
    #[must_use]
    pub fn submitter(&self) -> Submitter<S, E> {
        self.submitter.clone()
    }

    /// Returns the state published after the most recently applied event.
    #[must_use]
    pub fn state(&self) -> S {
        self.state_rx.borrow().clone()
    }

    /// Waits for the machine to reach the specified state.
    pub async fn wait_for_state(&self, target: S) -> Result<(), watch::error::RecvError> {
        let mut rx = self.state_rx.clone();
        while *rx.borrow_and_update() != target {
            rx.changed().await?;
        }
        Ok(())
    }

    /// Returns `true` while the worker task is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        Arc::weak_count(&self.machine) > 0
    }

    /// Initiates a graceful shutdown. Processes queued events before exiting.
    pub fn shutdown_graceful(&self) {
        let _ = self.shutdown_tx.send(Some(ShutdownMode::Graceful));
    }

    /// Initiates an immediate shutdown. Drops queued events.
    pub fn shutdown_immediate(&self) {
        let _ = self.shutdown_tx.send(Some(ShutdownMode::Immediate));
    }
}

impl<S: fmt::Debug, E> fmt::Debug for QueuedMachine<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuedMachine")
            .field("state", &*self.state_rx.borrow())
            .field("submitter", &self.submitter)
            .finish_non_exhaustive()
    }
}

/// Join handle for a queue's worker task.
///
/// Resolves when the worker exits: after a shutdown, or once the machine has
/// been released and every [`Submitter`] dropped.
#[derive(Debug)]
pub struct QueueTask {
    handle: JoinHandle<()>,
}

impl Future for QueueTask {
    type Output = Result<(), TaskError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle)
            .poll(cx)
            .map(|res| res.map_err(TaskError::Join))
    }
}

struct Worker<S, E> {
    machine: Weak<Mutex<Machine<S, E>>>,
    units: mpsc::UnboundedReceiver<Unit<S, E>>,
    shutdown: watch::Receiver<Option<ShutdownMode>>,
    state_tx: watch::Sender<S>,
}

impl<S, E> Worker<S, E>
where
    S: Clone + Eq + Hash + fmt::Debug,
    E: Eq + Hash + fmt::Debug,
{
    async fn run(mut self) {
        tracing::debug!(target: "statekit::queue", "worker started");
        let mut shutdown_open = true;

        loop {
            tokio::select! {
                biased;

                changed = self.shutdown.changed(), if shutdown_open => {
                    if changed.is_err() {
                        // Owner is gone; keep draining until the senders are too.
                        shutdown_open = false;
                        continue;
                    }
                    let mode = *self.shutdown.borrow_and_update();
                    match mode {
                        Some(ShutdownMode::Immediate) => {
                            self.units.close();
                            break;
                        }
                        Some(ShutdownMode::Graceful) => {
                            self.units.close();
                            while let Some(unit) = self.units.recv().await {
                                self.apply(unit);
                            }
                            break;
                        }
                        None => {}
                    }
                }
                unit = self.units.recv() => {
                    let Some(unit) = unit else { break };
                    self.apply(unit);
                }
            }
        }

        tracing::debug!(target: "statekit::queue", "worker stopped");
    }

    fn apply(&self, unit: Unit<S, E>) {
        let Some(machine) = self.machine.upgrade() else {
            tracing::trace!(
                target: "statekit::queue",
                event = ?unit.event,
                "machine released, skipping queued event"
            );
            return;
        };

        let state = {
            let machine = machine.lock().unwrap_or_else(PoisonError::into_inner);
            machine.handle(unit.event);
            machine.state()
        };
        self.state_tx.send_replace(state.clone());

        match unit.completion {
            Some(Completion::Notify(on_complete)) => on_complete(),
            Some(Completion::Reply(reply)) => {
                let _ = reply.send(state);
            }
            None => {}
        }
    }
}
