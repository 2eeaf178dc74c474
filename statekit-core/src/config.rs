//! Transition table and lifecycle hooks, collected before a machine exists.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use crate::trace::{FnSink, Resolution, TraceSink, TracingSink};

/// Hook run when leaving or entering a state. Receives `(old, new)`.
pub type Hook<S> = Box<dyn Fn(&S, &S) + Send>;

/// Hook run on every state change. Receives `(old, new, event)`.
pub type ChangeHook<S, E> = Box<dyn Fn(&S, &S, &E) + Send>;

/// Rule set for a [`Machine`](crate::Machine).
///
/// Every registration replaces an earlier one for the same key: one target per
/// `(from, event)` pair, one wildcard target per event, one enter hook and one
/// exit hook per state, and a single change hook. Nothing is validated; a rule
/// may point at a state that is never left, and states without rules are fine.
///
/// Once a `Config` is moved into a machine there is no way to reach it again,
/// so the rules are frozen for the machine's lifetime.
///
/// ```rust
/// use statekit_core::Config;
///
/// #[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// enum Door { Open, Closed }
///
/// #[derive(Debug, PartialEq, Eq, Hash)]
/// enum Push { Open, Close }
///
/// let mut config = Config::new();
/// config
///     .transition(Door::Closed, Push::Open, Door::Open)
///     .transition(Door::Open, Push::Close, Door::Closed)
///     .on_enter_simple(Door::Open, || println!("creak"));
///
/// assert_eq!(config.target(&Door::Closed, &Push::Open), Some(&Door::Open));
/// ```
pub struct Config<S, E> {
    pub(crate) transitions: HashMap<S, HashMap<E, S>>,
    pub(crate) wildcards: HashMap<E, S>,
    pub(crate) on_exit: HashMap<S, Hook<S>>,
    pub(crate) on_enter: HashMap<S, Hook<S>>,
    pub(crate) on_change: Option<ChangeHook<S, E>>,
    pub(crate) sink: Box<dyn TraceSink<S, E>>,
}

impl<S, E> Config<S, E>
where
    S: Eq + Hash + fmt::Debug + 'static,
    E: Eq + Hash + fmt::Debug + 'static,
{
    /// Creates an empty configuration that traces through [`TracingSink`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            transitions: HashMap::new(),
            wildcards: HashMap::new(),
            on_exit: HashMap::new(),
            on_enter: HashMap::new(),
            on_change: None,
            sink: Box::new(TracingSink),
        }
    }
}

impl<S, E> Default for Config<S, E>
where
    S: Eq + Hash + fmt::Debug + 'static,
    E: Eq + Hash + fmt::Debug + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S, E> Config<S, E>
where
    S: Eq + Hash,
    E: Eq + Hash,
{
    /// Moves the machine from `from` to `to` when `on` arrives.
    pub fn transition(&mut self, from: S, on: E, to: S) -> &mut Self {
        self.transitions.entry(from).or_default().insert(on, to);
        self
    }

    /// Moves the machine to `to` when `on` arrives in a state that has no
    /// rule of its own for `on`.
    pub fn transition_from_any(&mut self, on: E, to: S) -> &mut Self {
        self.wildcards.insert(on, to);
        self
    }

    /// Runs `hook(old, new)` right before the machine leaves `state`.
    pub fn on_exit<F>(&mut self, state: S, hook: F) -> &mut Self
    where
        F: Fn(&S, &S) + Send + 'static,
    {
        self.on_exit.insert(state, Box::new(hook));
        self
    }

    /// Like [`on_exit`](Self::on_exit), for a hook that ignores the states.
    pub fn on_exit_simple<F>(&mut self, state: S, hook: F) -> &mut Self
    where
        F: Fn() + Send + 'static,
    {
        self.on_exit(state, move |_: &S, _: &S| hook())
    }

    /// Runs `hook(old, new)` right after the machine enters `state`.
    pub fn on_enter<F>(&mut self, state: S, hook: F) -> &mut Self
    where
        F: Fn(&S, &S) + Send + 'static,
    {
        self.on_enter.insert(state, Box::new(hook));
        self
    }

    /// Like [`on_enter`](Self::on_enter), for a hook that ignores the states.
    pub fn on_enter_simple<F>(&mut self, state: S, hook: F) -> &mut Self
    where
        F: Fn() + Send + 'static,
    {
        self.on_enter(state, move |_: &S, _: &S| hook())
    }

    /// Runs `hook(old, new, event)` after every state change, once the enter
    /// hook (if any) has returned.
    pub fn on_change<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&S, &S, &E) + Send + 'static,
    {
        self.on_change = Some(Box::new(hook));
        self
    }

    /// Replaces the destination of resolution traces.
    pub fn trace_with<T>(&mut self, sink: T) -> &mut Self
    where
        T: TraceSink<S, E> + 'static,
    {
        self.sink = Box::new(sink);
        self
    }

    /// Sends resolution traces to a closure.
    pub fn trace_fn<F>(&mut self, sink: F) -> &mut Self
    where
        F: Fn(&Resolution<'_, S, E>) + Send + 'static,
    {
        self.trace_with(FnSink(sink))
    }

    /// Target of the state-specific rule for `(from, on)`, ignoring wildcards.
    #[must_use]
    pub fn target(&self, from: &S, on: &E) -> Option<&S> {
        self.transitions.get(from)?.get(on)
    }

    /// Target of the wildcard rule for `on`.
    #[must_use]
    pub fn wildcard_target(&self, on: &E) -> Option<&S> {
        self.wildcards.get(on)
    }

    /// Returns `true` if a state-specific rule exists for `(from, on)`.
    #[must_use]
    pub fn has_transition(&self, from: &S, on: &E) -> bool {
        self.target(from, on).is_some()
    }

    /// Number of state-specific rules.
    #[must_use]
    pub fn transition_count(&self) -> usize {
        self.transitions.values().map(HashMap::len).sum()
    }

    /// Resolves `event` in state `current`: the specific rule wins, then the
    /// wildcard, then the current state itself.
    pub(crate) fn resolve<'a>(&'a self, current: &'a S, event: &E) -> &'a S {
        self.target(current, event)
            .or_else(|| self.wildcards.get(event))
            .unwrap_or(current)
    }
}

impl<S: fmt::Debug, E: fmt::Debug> fmt::Debug for Config<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("transitions", &self.transitions)
            .field("wildcards", &self.wildcards)
            .field("on_exit", &self.on_exit.keys().collect::<Vec<_>>())
            .field("on_enter", &self.on_enter.keys().collect::<Vec<_>>())
            .field("on_change", &self.on_change.is_some())
            .finish_non_exhaustive()
    }
}
