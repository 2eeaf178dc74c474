//! # tokio-statekit
//!
//! Table-driven finite state machines with lifecycle hooks, plus a serialized
//! Tokio queue for driving them from many tasks and threads at once.
//!
//! A [`Config`] collects transitions (`from --event--> to`), wildcard
//! transitions that apply from any state, and hooks run on exit, on entry and
//! on every change. A [`Machine`] applies events synchronously; a
//! [`QueuedMachine`] applies them one at a time on a background worker.
//!
//! ## Example
//!
//! ```rust
//! use tokio_statekit::Machine;
//!
//! #[derive(Debug, Clone, PartialEq, Eq, Hash)]
//! enum Login {
//!     LoggedOut,
//!     LoggingIn,
//!     LoggedIn,
//! }
//!
//! #[derive(Debug, PartialEq, Eq, Hash)]
//! enum Action {
//!     Start,
//!     Success,
//!     Fail,
//!     Logout,
//! }
//!
//! let machine = Machine::configure(Login::LoggedOut, |config| {
//!     config
//!         .transition(Login::LoggedOut, Action::Start, Login::LoggingIn)
//!         .transition(Login::LoggingIn, Action::Success, Login::LoggedIn)
//!         .transition(Login::LoggingIn, Action::Fail, Login::LoggedOut)
//!         .transition(Login::LoggedIn, Action::Logout, Login::LoggedOut)
//!         .on_enter_simple(Login::LoggedIn, || println!("Login successful!"));
//! });
//!
//! machine.handle(Action::Start);
//! machine.handle(Action::Success);
//! assert_eq!(machine.state(), Login::LoggedIn);
//! ```

mod queue;
mod types;

#[doc(inline)]
pub use crate::queue::{QueueTask, QueuedMachine, Submitter};
#[doc(inline)]
pub use crate::types::*;
#[doc(inline)]
pub use statekit_core::*;
