//! The synchronous engine.

use std::cell::RefCell;
use std::fmt;
use std::hash::Hash;

use crate::config::Config;
use crate::trace::Resolution;

/// A table-driven state machine.
///
/// The machine holds exactly one current state and a frozen [`Config`]. Each
/// call to [`handle`](Self::handle) resolves the event, traces the outcome and,
/// if the state changes, runs the hooks in a fixed order:
///
/// 1. exit hook of the old state,
/// 2. the current state is replaced,
/// 3. enter hook of the new state,
/// 4. the change hook.
///
/// Events with no matching rule leave the machine untouched and run no hook.
///
/// `Machine` is `Send` but not `Sync`: it must be driven from one thread at a
/// time. Hooks may call back into [`handle`](Self::handle) on the same machine;
/// no borrow is held while a hook runs, and a call made from an enter or change
/// hook already observes the new state. Bounding such recursion is up to the
/// hooks themselves. For access from several threads, wrap the machine in the
/// queue provided by `tokio-statekit`.
///
/// ```rust
/// use statekit_core::Machine;
///
/// #[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// enum State { Foo, Bar }
///
/// #[derive(Debug, PartialEq, Eq, Hash)]
/// enum Event { Go }
///
/// let machine = Machine::configure(State::Foo, |config| {
///     config.transition(State::Foo, Event::Go, State::Bar);
/// });
///
/// assert!(machine.handle(Event::Go));
/// assert_eq!(machine.state(), State::Bar);
/// assert!(!machine.handle(Event::Go));
/// ```
pub struct Machine<S, E> {
    state: RefCell<S>,
    config: Config<S, E>,
}

impl<S, E> Machine<S, E>
where
    S: Clone + Eq + Hash + fmt::Debug + 'static,
    E: Eq + Hash + fmt::Debug + 'static,
{
    /// Places the machine in `initial`. No hook runs for the initial state.
    #[must_use]
    pub fn new(initial: S, config: Config<S, E>) -> Self {
        Self {
            state: RefCell::new(initial),
            config,
        }
    }

    /// Builds the configuration in place and places the machine in `initial`.
    #[must_use]
    pub fn configure<F>(initial: S, build: F) -> Self
    where
        F: FnOnce(&mut Config<S, E>),
    {
        let mut config = Config::new();
        build(&mut config);
        Self::new(initial, config)
    }
}

impl<S, E> Machine<S, E>
where
    S: Clone + Eq + Hash,
    E: Eq + Hash,
{
    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> S {
        self.state.borrow().clone()
    }

    /// Returns `true` if the machine is currently in `state`.
    #[must_use]
    pub fn is_in(&self, state: &S) -> bool {
        *self.state.borrow() == *state
    }

    /// Returns the state `event` would lead to, without tracing or running
    /// hooks.
    #[must_use]
    pub fn resolve(&self, event: &E) -> S {
        let current = self.state.borrow();
        self.config.resolve(&current, event).clone()
    }

    /// Feeds `event` to the machine.
    ///
    /// Returns `true` if the current state changed. A rule that leads back to
    /// the current state counts as no change.
    pub fn handle(&self, event: E) -> bool {
        let old = self.state();
        let new = self.resolve(&event);

        self.config.sink.trace(&Resolution {
            from: &old,
            event: &event,
            to: &new,
        });

        if old == new {
            return false;
        }

        if let Some(hook) = self.config.on_exit.get(&old) {
            hook(&old, &new);
        }

        self.state.replace(new.clone());

        if let Some(hook) = self.config.on_enter.get(&new) {
            hook(&old, &new);
        }
        if let Some(hook) = &self.config.on_change {
            hook(&old, &new, &event);
        }

        true
    }

    /// Read access to the frozen rule set.
    #[must_use]
    pub fn config(&self) -> &Config<S, E> {
        &self.config
    }

    /// Consumes the machine, returning its current state.
    #[must_use]
    pub fn into_state(self) -> S {
        self.state.into_inner()
    }
}

impl<S: fmt::Debug, E: fmt::Debug> fmt::Debug for Machine<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("state", &self.state)
            .field("config", &self.config)
            .finish()
    }
}
