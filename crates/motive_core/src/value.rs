//! Motion values
//!
//! A [`MotionValue`] is an observable cell holding the latest value of an
//! animated property. It remembers the value from the previous frame so it
//! can report velocity, and it owns at most one running animation.

use crate::config::MotionConfig;
use crate::frameloop::Frameloop;
use crate::math::velocity_per_second;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// A keyframe or motion value payload
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnimValue {
    Number(f64),
    /// Unit-bearing or non-numeric values (`"10px"`, `"#fff"`, `"visible"`)
    Text(String),
}

impl AnimValue {
    /// The value as a plain number, if it is one
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AnimValue::Number(n) => Some(*n),
            AnimValue::Text(_) => None,
        }
    }

    /// Parse the leading number of the value (`"10px"` → `10.0`)
    pub fn parse_number(&self) -> Option<f64> {
        match self {
            AnimValue::Number(n) => Some(*n),
            AnimValue::Text(text) => parse_leading_float(text),
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, AnimValue::Number(_))
    }
}

impl Default for AnimValue {
    fn default() -> Self {
        AnimValue::Number(0.0)
    }
}

impl From<f64> for AnimValue {
    fn from(value: f64) -> Self {
        AnimValue::Number(value)
    }
}

impl From<&str> for AnimValue {
    fn from(value: &str) -> Self {
        AnimValue::Text(value.to_string())
    }
}

impl From<String> for AnimValue {
    fn from(value: String) -> Self {
        AnimValue::Text(value)
    }
}

impl fmt::Display for AnimValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnimValue::Number(n) => write!(f, "{n}"),
            AnimValue::Text(text) => f.write_str(text),
        }
    }
}

/// Parse the longest numeric prefix of `text`
pub fn parse_leading_float(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (i, c) in text.char_indices() {
        match c {
            '+' | '-' if i == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }
    if !seen_digit {
        return None;
    }
    text[..end].parse().ok()
}

/// Events a motion value emits
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MotionEvent {
    Change,
    AnimationStart,
    AnimationComplete,
    AnimationCancel,
}

new_key_type! {
    /// Handle returned by [`MotionValue::on`]
    pub struct SubscriptionId;
}

/// Identity of a motion value, stable across clones
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MotionValueId(pub u64);

static NEXT_VALUE_ID: AtomicU64 = AtomicU64::new(1);

/// Something a motion value can stop when a new animation takes over
pub trait AnimationHandle {
    fn stop(&self);
}

type Listener = Rc<RefCell<dyn FnMut(&AnimValue)>>;

struct ValueState {
    current: AnimValue,
    prev: Option<AnimValue>,
    prev_frame_value: Option<AnimValue>,
    updated_at: f64,
    prev_updated_at: Option<f64>,
    listeners: SlotMap<SubscriptionId, (MotionEvent, Listener)>,
    animation: Option<Rc<dyn AnimationHandle>>,
}

/// Shared handle to an observable animated value
#[derive(Clone)]
pub struct MotionValue {
    id: MotionValueId,
    state: Rc<RefCell<ValueState>>,
    frame: Frameloop,
    velocity_window_ms: f64,
}

impl fmt::Debug for MotionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MotionValue")
            .field("id", &self.id)
            .field("current", &self.state.borrow().current)
            .finish()
    }
}

impl PartialEq for MotionValue {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl MotionValue {
    /// Create a value using the default velocity window
    pub fn new(frame: &Frameloop, initial: impl Into<AnimValue>) -> Self {
        Self::with_config(frame, &MotionConfig::default(), initial)
    }

    pub fn with_config(frame: &Frameloop, config: &MotionConfig, initial: impl Into<AnimValue>) -> Self {
        let now = frame.now();
        Self {
            id: MotionValueId(NEXT_VALUE_ID.fetch_add(1, Ordering::Relaxed)),
            state: Rc::new(RefCell::new(ValueState {
                current: initial.into(),
                prev: None,
                prev_frame_value: None,
                updated_at: now,
                prev_updated_at: None,
                listeners: SlotMap::with_key(),
                animation: None,
            })),
            frame: frame.clone(),
            velocity_window_ms: config.velocity_window_ms,
        }
    }

    pub fn id(&self) -> MotionValueId {
        self.id
    }

    pub fn get(&self) -> AnimValue {
        self.state.borrow().current.clone()
    }

    /// Current value parsed as a number
    pub fn get_number(&self) -> Option<f64> {
        self.state.borrow().current.parse_number()
    }

    /// Value before the most recent `set`
    pub fn prev(&self) -> Option<AnimValue> {
        self.state.borrow().prev.clone()
    }

    /// Set the value, tracking velocity and notifying `Change` listeners
    pub fn set(&self, value: impl Into<AnimValue>) {
        let value = value.into();
        let now = self.frame.now();
        let changed = {
            let mut state = self.state.borrow_mut();
            if state.updated_at != now {
                state.prev_frame_value = Some(state.current.clone());
                state.prev_updated_at = Some(state.updated_at);
            }
            let previous = std::mem::replace(&mut state.current, value.clone());
            let changed = previous != value;
            state.prev = Some(previous);
            state.updated_at = now;
            changed
        };
        if changed {
            self.notify(MotionEvent::Change, &value);
        }
    }

    /// Set the value without carrying velocity, stopping any animation
    pub fn jump(&self, value: impl Into<AnimValue>) {
        self.stop();
        self.set(value);
        let mut state = self.state.borrow_mut();
        state.prev = Some(state.current.clone());
        state.prev_frame_value = None;
        state.prev_updated_at = None;
    }

    /// Velocity in units per second.
    ///
    /// Zero for non-numeric values and when the last update is older than
    /// the velocity window.
    pub fn velocity(&self) -> f64 {
        let now = self.frame.now();
        let state = self.state.borrow();
        let (Some(prev), Some(prev_updated_at)) = (&state.prev_frame_value, state.prev_updated_at) else {
            return 0.0;
        };
        if now - state.updated_at > self.velocity_window_ms {
            return 0.0;
        }
        let (Some(current), Some(prev)) = (state.current.parse_number(), prev.parse_number()) else {
            return 0.0;
        };
        let elapsed = (state.updated_at - prev_updated_at).min(self.velocity_window_ms);
        velocity_per_second(current - prev, elapsed)
    }

    /// Subscribe to an event
    pub fn on<F>(&self, event: MotionEvent, listener: F) -> SubscriptionId
    where
        F: FnMut(&AnimValue) + 'static,
    {
        let listener: Listener = Rc::new(RefCell::new(listener));
        self.state.borrow_mut().listeners.insert((event, listener))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        let removed = self.state.borrow_mut().listeners.remove(id);
        drop(removed);
    }

    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    /// Emit `event` with the current value
    pub fn notify_event(&self, event: MotionEvent) {
        let value = self.get();
        self.notify(event, &value);
    }

    fn notify(&self, event: MotionEvent, value: &AnimValue) {
        let listeners: Vec<Listener> = self
            .state
            .borrow()
            .listeners
            .values()
            .filter(|(kind, _)| *kind == event)
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            // A listener re-entering itself through `set` is skipped
            if let Ok(mut listener) = listener.try_borrow_mut() {
                listener(value);
            }
        }
    }

    /// Hand ownership of a running animation to this value.
    ///
    /// Any previous animation is stopped first.
    pub fn start(&self, animation: Rc<dyn AnimationHandle>) {
        self.stop();
        self.state.borrow_mut().animation = Some(animation);
        self.notify_event(MotionEvent::AnimationStart);
    }

    /// Stop the running animation, if any
    pub fn stop(&self) {
        let animation = self.state.borrow_mut().animation.take();
        if let Some(animation) = animation {
            animation.stop();
            self.notify_event(MotionEvent::AnimationCancel);
        }
    }

    /// Called by an animation when it ran to completion
    pub fn finish_animation(&self) {
        let animation = self.state.borrow_mut().animation.take();
        if animation.is_some() {
            self.notify_event(MotionEvent::AnimationComplete);
        }
    }

    pub fn is_animating(&self) -> bool {
        self.state.borrow().animation.is_some()
    }

    /// Drop every listener and stop the running animation
    pub fn destroy(&self) {
        self.stop();
        let listeners = std::mem::take(&mut self.state.borrow_mut().listeners);
        drop(listeners);
    }
}
