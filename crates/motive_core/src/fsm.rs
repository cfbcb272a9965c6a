//! Typed state machines
//!
//! Flat state machines over caller-defined state and event enums.
//! Supports:
//! - Guards (conditional transitions)
//! - Entry actions
//! - Transition history

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::fmt::Debug;
use std::hash::Hash;

/// A guard function that determines if a transition should occur
pub type Guard = Box<dyn Fn() -> bool>;

/// An action executed when a state is entered
pub type Action = Box<dyn FnMut()>;

/// A transition in the state machine
pub struct Transition<S, E> {
    pub from_state: S,
    pub event: E,
    pub to_state: S,
    pub guard: Option<Guard>,
}

impl<S, E> Transition<S, E> {
    /// Create a simple transition without guard
    pub fn new(from: S, event: E, to: S) -> Self {
        Self {
            from_state: from,
            event,
            to_state: to,
            guard: None,
        }
    }

    /// Add a guard condition
    pub fn with_guard<F: Fn() -> bool + 'static>(mut self, guard: F) -> Self {
        self.guard = Some(Box::new(guard));
        self
    }

    fn allows(&self) -> bool {
        self.guard.as_ref().map_or(true, |guard| guard())
    }
}

/// A state machine instance
pub struct StateMachine<S, E> {
    current_state: S,
    transitions: Vec<Transition<S, E>>,
    entry_callbacks: FxHashMap<S, SmallVec<[Action; 1]>>,
    history: Vec<(S, E, S)>,
}

impl<S, E> StateMachine<S, E>
where
    S: Copy + Eq + Hash + Debug,
    E: Copy + Eq + Debug,
{
    pub fn new(initial_state: S, transitions: Vec<Transition<S, E>>) -> Self {
        Self {
            current_state: initial_state,
            transitions,
            entry_callbacks: FxHashMap::default(),
            history: Vec::new(),
        }
    }

    pub fn current_state(&self) -> S {
        self.current_state
    }

    pub fn is_in(&self, state: S) -> bool {
        self.current_state == state
    }

    /// History of state transitions (for debugging)
    pub fn history(&self) -> &[(S, E, S)] {
        &self.history
    }

    /// Check if an event can trigger a transition from the current state
    pub fn can_send(&self, event: E) -> bool {
        self.transitions
            .iter()
            .any(|t| t.from_state == self.current_state && t.event == event && t.allows())
    }

    /// Send an event, returning the state after handling it.
    ///
    /// Events with no matching transition leave the machine untouched.
    pub fn send(&mut self, event: E) -> S {
        let current = self.current_state;
        let Some(to_state) = self
            .transitions
            .iter()
            .find(|t| t.from_state == current && t.event == event && t.allows())
            .map(|t| t.to_state)
        else {
            tracing::trace!(?current, ?event, "event ignored");
            return current;
        };

        self.current_state = to_state;
        self.history.push((current, event, to_state));

        if let Some(callbacks) = self.entry_callbacks.get_mut(&to_state) {
            for callback in callbacks.iter_mut() {
                callback();
            }
        }

        to_state
    }

    /// Register an entry callback for a state
    pub fn on_enter<F: FnMut() + 'static>(&mut self, state: S, callback: F) {
        self.entry_callbacks
            .entry(state)
            .or_default()
            .push(Box::new(callback));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    enum Light {
        Off,
        On,
        Broken,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Switch {
        Toggle,
        Smash,
    }

    fn light() -> StateMachine<Light, Switch> {
        StateMachine::new(
            Light::Off,
            vec![
                Transition::new(Light::Off, Switch::Toggle, Light::On),
                Transition::new(Light::On, Switch::Toggle, Light::Off),
                Transition::new(Light::On, Switch::Smash, Light::Broken),
            ],
        )
    }

    #[test]
    fn test_simple_transitions() {
        let mut fsm = light();
        assert_eq!(fsm.send(Switch::Toggle), Light::On);
        assert_eq!(fsm.send(Switch::Toggle), Light::Off);
        assert!(fsm.is_in(Light::Off));
    }

    #[test]
    fn test_invalid_event_no_transition() {
        let mut fsm = light();
        fsm.send(Switch::Smash);
        assert_eq!(fsm.current_state(), Light::Off);
        assert!(!fsm.can_send(Switch::Smash));
    }

    #[test]
    fn test_guard_blocks_transition() {
        let enabled = Rc::new(Cell::new(false));
        let gate = enabled.clone();
        let mut fsm = StateMachine::new(
            Light::Off,
            vec![Transition::new(Light::Off, Switch::Toggle, Light::On).with_guard(move || gate.get())],
        );

        fsm.send(Switch::Toggle);
        assert_eq!(fsm.current_state(), Light::Off);
        enabled.set(true);
        fsm.send(Switch::Toggle);
        assert_eq!(fsm.current_state(), Light::On);
    }

    #[test]
    fn test_entry_callbacks_and_history() {
        let entered = Rc::new(Cell::new(0));
        let counter = entered.clone();
        let mut fsm = light();
        fsm.on_enter(Light::On, move || counter.set(counter.get() + 1));

        fsm.send(Switch::Toggle);
        fsm.send(Switch::Toggle);
        fsm.send(Switch::Toggle);
        fsm.send(Switch::Smash);

        assert_eq!(entered.get(), 2);
        assert_eq!(fsm.history().len(), 4);
        assert_eq!(fsm.history()[3], (Light::On, Switch::Smash, Light::Broken));
    }
}
