//! Resolution tracing.
//!
//! Every call to [`Machine::handle`](crate::Machine::handle) reports how the
//! event was resolved to the machine's [`TraceSink`] before any hook runs. The
//! default sink forwards to `tracing`; tests usually install a closure through
//! [`Config::trace_fn`](crate::Config::trace_fn) to capture the lines.

use std::fmt;

/// How a single event resolved against the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution<'a, S, E> {
    /// State the machine was in when the event arrived.
    pub from: &'a S,
    /// The event being handled.
    pub event: &'a E,
    /// State the event resolved to. Equal to `from` when nothing matched.
    pub to: &'a S,
}

impl<S: PartialEq, E> Resolution<'_, S, E> {
    /// Returns `true` if the event moves the machine to a different state.
    #[must_use]
    pub fn is_change(&self) -> bool {
        self.from != self.to
    }
}

impl<S, E> fmt::Display for Resolution<'_, S, E>
where
    S: fmt::Debug + PartialEq,
    E: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_change() {
            write!(f, "{:?}[{:?}] -> {:?}", self.from, self.event, self.to)
        } else {
            write!(f, "{:?}[{:?}] -> no change", self.from, self.event)
        }
    }
}

/// Destination for resolution traces.
pub trait TraceSink<S, E>: Send {
    /// Called once per handled event, before any lifecycle hook.
    fn trace(&self, resolution: &Resolution<'_, S, E>);
}

/// Emits each resolution as a `DEBUG` event on the `statekit::machine`
/// target. This is the sink a fresh [`Config`](crate::Config) starts with.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl<S, E> TraceSink<S, E> for TracingSink
where
    S: fmt::Debug + PartialEq,
    E: fmt::Debug,
{
    fn trace(&self, resolution: &Resolution<'_, S, E>) {
        tracing::debug!(
            target: "statekit::machine",
            from = ?resolution.from,
            event = ?resolution.event,
            to = ?resolution.to,
            changed = resolution.is_change(),
            "{resolution}"
        );
    }
}

/// Discards every resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl<S, E> TraceSink<S, E> for NoopSink {
    fn trace(&self, _resolution: &Resolution<'_, S, E>) {}
}

/// Adapts a closure into a [`TraceSink`].
pub struct FnSink<F>(pub F);

impl<F> fmt::Debug for FnSink<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSink").finish_non_exhaustive()
    }
}

impl<S, E, F> TraceSink<S, E> for FnSink<F>
where
    F: Fn(&Resolution<'_, S, E>) + Send,
{
    fn trace(&self, resolution: &Resolution<'_, S, E>) {
        (self.0)(resolution)
    }
}
