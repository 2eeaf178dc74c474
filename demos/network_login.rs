//! Example: login whose result arrives from another thread.
//!
//! The request is queued from the main task while a "network" thread
//! reports the outcome through a cloned submitter.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_statekit::QueuedMachine;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum State {
    LoggedOut,
    LoggingIn,
    LoggedIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Event {
    SendLoginRequest,
    NetworkError,
    LoginSuccess,
    LoginFail,
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,statekit=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let (finished_tx, mut finished_rx) = mpsc::unbounded_channel();

    let (machine, task) = QueuedMachine::configure(State::LoggedOut, |config, _| {
        config
            .transition(State::LoggedOut, Event::SendLoginRequest, State::LoggingIn)
            .transition(State::LoggingIn, Event::NetworkError, State::LoggedOut)
            .transition(State::LoggingIn, Event::LoginFail, State::LoggedOut)
            .transition(State::LoggingIn, Event::LoginSuccess, State::LoggedIn)
            .on_exit(State::LoggingIn, move |_, result| {
                let _ = finished_tx.send(*result);
            });
    });

    machine.handle(Event::SendLoginRequest);

    let submitter = machine.submitter();
    std::thread::spawn(move || {
        // Simulate network latency
        std::thread::sleep(Duration::from_millis(50));
        submitter.handle(Event::LoginSuccess);
    });

    match finished_rx.recv().await {
        Some(State::LoggedIn) => println!("Login successful!"),
        Some(other) => println!("Login finished in {other:?}"),
        None => println!("Machine stopped before login finished"),
    }

    // Shutdown gracefully
    machine.shutdown_graceful();
    if let Err(e) = task.await {
        eprintln!("worker failed: {e}");
    }
}
