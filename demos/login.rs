//! Example: command-line login flow on the synchronous machine.
//!
//! Run with `RUST_LOG=statekit=debug` to see each resolution.

use tokio_statekit::Machine;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum LoginState {
    LoggedOut,
    LoggingIn,
    LoggedIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum LoginEvent {
    StartLogin,
    LoginSuccess,
    LoginFail,
    Logout,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let machine = Machine::configure(LoginState::LoggedOut, |config| {
        config
            .transition(LoginState::LoggedOut, LoginEvent::StartLogin, LoginState::LoggingIn)
            .transition(LoginState::LoggingIn, LoginEvent::LoginSuccess, LoginState::LoggedIn)
            .transition(LoginState::LoggingIn, LoginEvent::LoginFail, LoginState::LoggedOut)
            .transition(LoginState::LoggedIn, LoginEvent::Logout, LoginState::LoggedOut)
            .on_enter_simple(LoginState::LoggingIn, || println!("Logging in..."))
            .on_enter_simple(LoginState::LoggedIn, || println!("Login successful!"))
            .on_enter(LoginState::LoggedOut, |old, _| {
                if *old == LoginState::LoggingIn {
                    println!("Login failed!");
                } else {
                    println!("Logged out.");
                }
            });
    });

    machine.handle(LoginEvent::StartLogin); // User entered their credentials
    machine.handle(LoginEvent::LoginFail); // Wrong password
    machine.handle(LoginEvent::StartLogin); // Trying again
    machine.handle(LoginEvent::LoginSuccess);
    machine.handle(LoginEvent::Logout);
}
