//! Property-based tests for transition resolution.
//!
//! A machine built from a random rule list must agree with a plain
//! last-registration-wins model of the same list.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use proptest::prelude::*;
use tokio_statekit::{Machine, NoopSink};

const STATES: u8 = 5;
const EVENTS: u8 = 4;

#[derive(Debug, Clone)]
struct Rules {
    specific: Vec<(u8, u8, u8)>,
    wildcard: Vec<(u8, u8)>,
}

impl Rules {
    fn model(&self, state: u8, event: u8) -> u8 {
        let specific: HashMap<(u8, u8), u8> = self
            .specific
            .iter()
            .map(|&(from, on, to)| ((from, on), to))
            .collect();
        let wildcard: HashMap<u8, u8> = self.wildcard.iter().copied().collect();

        specific
            .get(&(state, event))
            .or_else(|| wildcard.get(&event))
            .copied()
            .unwrap_or(state)
    }
}

prop_compose! {
    fn arbitrary_rules()(
        specific in prop::collection::vec((0..STATES, 0..EVENTS, 0..STATES), 0..16),
        wildcard in prop::collection::vec((0..EVENTS, 0..STATES), 0..4),
    ) -> Rules {
        Rules { specific, wildcard }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Exit(u8, u8),
    Enter(u8, u8),
    Change(u8, u8, u8),
}

fn build(rules: &Rules, initial: u8, calls: &Arc<Mutex<Vec<Call>>>) -> Machine<u8, u8> {
    Machine::configure(initial, |config| {
        for &(from, on, to) in &rules.specific {
            config.transition(from, on, to);
        }
        for &(on, to) in &rules.wildcard {
            config.transition_from_any(on, to);
        }
        for state in 0..STATES {
            let (exit, enter) = (Arc::clone(calls), Arc::clone(calls));
            config
                .on_exit(state, move |old, new| exit.lock().unwrap().push(Call::Exit(*old, *new)))
                .on_enter(state, move |old, new| {
                    enter.lock().unwrap().push(Call::Enter(*old, *new))
                });
        }
        let change = Arc::clone(calls);
        config
            .on_change(move |old, new, event| {
                change.lock().unwrap().push(Call::Change(*old, *new, *event))
            })
            .trace_with(NoopSink);
    })
}

proptest! {
    #[test]
    fn machine_matches_last_wins_model(
        rules in arbitrary_rules(),
        initial in 0..STATES,
        events in prop::collection::vec(0..EVENTS, 0..32),
    ) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let machine = build(&rules, initial, &calls);

        let mut state = initial;
        for event in events {
            let next = rules.model(state, event);
            calls.lock().unwrap().clear();

            let changed = machine.handle(event);

            prop_assert_eq!(machine.state(), next);
            prop_assert_eq!(changed, next != state);

            let expected = if next == state {
                vec![]
            } else {
                vec![
                    Call::Exit(state, next),
                    Call::Enter(state, next),
                    Call::Change(state, next, event),
                ]
            };
            prop_assert_eq!(calls.lock().unwrap().clone(), expected);
            state = next;
        }
    }

    #[test]
    fn resolve_is_pure(rules in arbitrary_rules(), initial in 0..STATES, event in 0..EVENTS) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let machine = build(&rules, initial, &calls);

        prop_assert_eq!(machine.resolve(&event), rules.model(initial, event));
        prop_assert_eq!(machine.state(), initial);
        prop_assert!(calls.lock().unwrap().is_empty());
    }
}
