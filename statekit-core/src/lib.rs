//! Core engine for tokio-statekit.
//!
//! A [`Machine`] is built from an initial state and a [`Config`] describing
//! which event moves which state where, plus optional hooks run on exit, on
//! entry and on every change. The queue wrapper in `tokio-statekit` builds on
//! top of this crate; use that crate unless you only need the synchronous
//! engine.

mod config;
mod machine;
mod trace;

pub use crate::config::{ChangeHook, Config, Hook};
pub use crate::machine::Machine;
pub use crate::trace::{FnSink, NoopSink, Resolution, TraceSink, TracingSink};
