//! Appear animation bookkeeping

use crate::native::NativeAnimation;
use motive_core::fsm::{StateMachine, Transition};
use std::rc::Rc;

/// Properties composed into the single `transform` style
pub const TRANSFORM_PROPERTIES: [&str; 20] = [
    "transformPerspective",
    "x",
    "y",
    "z",
    "translateX",
    "translateY",
    "translateZ",
    "scale",
    "scaleX",
    "scaleY",
    "rotate",
    "rotateX",
    "rotateY",
    "rotateZ",
    "skew",
    "skewX",
    "skewY",
    "originX",
    "originY",
    "transform",
];

pub fn is_transform_property(property: &str) -> bool {
    TRANSFORM_PROPERTIES.contains(&property)
}

/// Store key for `property` of the element with `appear_id`.
///
/// Transform components share one native animation, so they share a key.
pub fn appear_store_id(appear_id: &str, property: &str) -> String {
    let property = if is_transform_property(property) {
        "transform"
    } else {
        property
    };
    format!("{appear_id}: {property}")
}

/// Lifecycle of one optimised appear animation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AppearState {
    /// Placeholder holding native resources until keyframes are known
    Priming,
    Playing,
    /// Paused across a page transition, waiting to resume
    Suspended,
    Complete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppearEvent {
    Start,
    Suspend,
    Resume,
    Finish,
}

pub(crate) fn appear_machine(initial: AppearState) -> StateMachine<AppearState, AppearEvent> {
    use AppearEvent::*;
    use AppearState::*;
    StateMachine::new(
        initial,
        vec![
            Transition::new(Priming, Start, Playing),
            Transition::new(Playing, Suspend, Suspended),
            Transition::new(Suspended, Resume, Playing),
            Transition::new(Playing, Finish, Complete),
        ],
    )
}

pub(crate) struct AppearEntry {
    pub(crate) animation: Rc<dyn NativeAnimation>,
    /// `None` while priming
    pub(crate) start_time: Option<f64>,
    pub(crate) machine: StateMachine<AppearState, AppearEvent>,
}

impl AppearEntry {
    pub(crate) fn priming(animation: Rc<dyn NativeAnimation>) -> Self {
        Self {
            animation,
            start_time: None,
            machine: appear_machine(AppearState::Priming),
        }
    }

    pub(crate) fn playing(animation: Rc<dyn NativeAnimation>, start_time: f64) -> Self {
        Self {
            animation,
            start_time: Some(start_time),
            machine: appear_machine(AppearState::Playing),
        }
    }

    pub(crate) fn state(&self) -> AppearState {
        self.machine.current_state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_properties_share_a_key() {
        assert_eq!(appear_store_id("hero", "x"), "hero: transform");
        assert_eq!(appear_store_id("hero", "rotateZ"), "hero: transform");
        assert_eq!(appear_store_id("hero", "opacity"), "hero: opacity");
    }

    #[test]
    fn test_lifecycle() {
        let mut machine = appear_machine(AppearState::Priming);
        assert_eq!(machine.send(AppearEvent::Finish), AppearState::Priming);
        assert_eq!(machine.send(AppearEvent::Start), AppearState::Playing);
        assert_eq!(machine.send(AppearEvent::Suspend), AppearState::Suspended);
        assert_eq!(machine.send(AppearEvent::Resume), AppearState::Playing);
        assert_eq!(machine.send(AppearEvent::Finish), AppearState::Complete);
        assert_eq!(machine.send(AppearEvent::Start), AppearState::Complete);
    }
}
