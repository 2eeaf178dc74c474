use std::sync::{Arc, Mutex};

use tokio_statekit::{Config, Machine, NoopSink};

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

type Log = Arc<Mutex<Vec<String>>>;

fn login_machine(log: &Log) -> Machine<LoginState, LoginEvent> {
    use LoginEvent::*;
    use LoginState::*;

    let mut config = Config::new();
    config
        .transition(LoggedOut, StartLogin, LoggingIn)
        .transition(LoggingIn, LoginSuccess, LoggedIn)
        .transition(LoggingIn, LoginFail, LoggedOut)
        .transition(LoggedIn, Logout, LoggedOut)
        .trace_with(NoopSink);

    for state in [LoggedOut, LoggingIn, LoggedIn] {
        let exit = Arc::clone(log);
        let enter = Arc::clone(log);
        config
            .on_exit(state, move |old, new| {
                exit.lock().unwrap().push(format!("exit {old:?}->{new:?}"));
            })
            .on_enter(state, move |old, new| {
                enter.lock().unwrap().push(format!("enter {old:?}->{new:?}"));
            });
    }

    let change = Arc::clone(log);
    config.on_change(move |old, new, event| {
        change
            .lock()
            .unwrap()
            .push(format!("change {old:?}->{new:?} on {event:?}"));
    });

    Machine::new(LoggedOut, config)
}

#[test]
fn test_login_flow() {
    let log = Log::default();
    let machine = login_machine(&log);

    let steps = [
        (LoginEvent::StartLogin, LoginState::LoggingIn),
        (LoginEvent::LoginFail, LoginState::LoggedOut),
        (LoginEvent::StartLogin, LoginState::LoggingIn),
        (LoginEvent::LoginSuccess, LoginState::LoggedIn),
        (LoginEvent::Logout, LoginState::LoggedOut),
    ];

    let mut previous = machine.state();
    for (event, expected) in steps {
        log.lock().unwrap().clear();

        assert!(machine.handle(event));
        assert_eq!(machine.state(), expected);
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                format!("exit {previous:?}->{expected:?}"),
                format!("enter {previous:?}->{expected:?}"),
                format!("change {previous:?}->{expected:?} on {event:?}"),
            ]
        );
        previous = expected;
    }
}

#[test]
fn test_unmatched_events_are_ignored() {
    let log = Log::default();
    let machine = login_machine(&log);

    for event in [LoginEvent::LoginSuccess, LoginEvent::LoginFail, LoginEvent::Logout] {
        assert!(!machine.handle(event));
        assert_eq!(machine.state(), LoginState::LoggedOut);
    }
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn test_specific_rule_shadows_wildcard() {
    let machine = Machine::configure(LoginState::LoggingIn, |config| {
        config
            .transition_from_any(LoginEvent::Logout, LoginState::LoggedOut)
            .transition(LoginState::LoggingIn, LoginEvent::Logout, LoginState::LoggedIn);
    });

    machine.handle(LoginEvent::Logout);
    assert_eq!(machine.state(), LoginState::LoggedIn);

    machine.handle(LoginEvent::Logout);
    assert_eq!(machine.state(), LoginState::LoggedOut);
}

#[test]
fn test_enter_hook_sees_where_it_came_from() {
    let messages = Log::default();
    let sink = Arc::clone(&messages);

    let machine = Machine::configure(LoginState::LoggedOut, |config| {
        config
            .transition(LoginState::LoggedOut, LoginEvent::StartLogin, LoginState::LoggingIn)
            .transition(LoginState::LoggingIn, LoginEvent::LoginFail, LoginState::LoggedOut)
            .on_enter(LoginState::LoggedOut, move |old, _| {
                let line = if *old == LoginState::LoggingIn {
                    "Login failed!"
                } else {
                    "Logged out."
                };
                sink.lock().unwrap().push(line.to_string());
            });
    });

    machine.handle(LoginEvent::StartLogin);
    machine.handle(LoginEvent::LoginFail);
    assert_eq!(*messages.lock().unwrap(), vec!["Login failed!"]);
}
