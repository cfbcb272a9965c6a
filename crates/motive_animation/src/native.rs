//! Platform (compositor) animations
//!
//! Hosts that can run time-based animations off the main thread implement
//! [`NativeAnimator`]. Those animations are wrapped in [`NativePlayback`] so
//! they are controlled exactly like software ones.

use crate::easing::Easing;
use crate::error::{AnimationError, Result};
use crate::playback::{FinishCallbacks, PlayState, Playback};
use crate::scroll::ScrollTimeline;
use crate::transition::Transition;
use motive_core::math::{ms_to_seconds, seconds_to_ms};
use motive_core::{AnimValue, Capabilities, MotionConfig};
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, warn};

/// Properties the compositor can animate without layout or paint
pub const ACCELERATED_PROPERTIES: [&str; 4] = ["opacity", "clipPath", "filter", "transform"];

pub fn is_accelerated(property: &str) -> bool {
    ACCELERATED_PROPERTIES.contains(&property)
}

/// Easing in a form platform animations understand
#[derive(Clone, Debug, PartialEq)]
pub enum NativeEasing {
    Keyword(&'static str),
    CubicBezier([f64; 4]),
    /// `linear()` stops sampled from an arbitrary curve
    Linear(Vec<f64>),
}

impl fmt::Display for NativeEasing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeEasing::Keyword(keyword) => f.write_str(keyword),
            NativeEasing::CubicBezier([x1, y1, x2, y2]) => write!(f, "cubic-bezier({x1}, {y1}, {x2}, {y2})"),
            NativeEasing::Linear(points) => {
                f.write_str("linear(")?;
                for (i, point) in points.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", (point * 10_000.0).round() / 10_000.0)?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Translate an easing for a platform animation lasting `duration_ms`.
///
/// Curves without a native equivalent become `linear()` stops when the
/// platform supports them, otherwise `ease-out`.
pub fn map_easing_to_native(
    easing: &Easing,
    duration_ms: f64,
    capabilities: &Capabilities,
    config: &MotionConfig,
) -> NativeEasing {
    let keyword = match easing {
        Easing::Linear => Some("linear"),
        Easing::EaseIn => Some("ease-in"),
        Easing::EaseOut => Some("ease-out"),
        Easing::EaseInOut => Some("ease-in-out"),
        Easing::Hold => Some("steps(1, end)"),
        _ => None,
    };
    if let Some(keyword) = keyword {
        return NativeEasing::Keyword(keyword);
    }
    let bezier = match easing {
        Easing::CircIn => Some([0.0, 0.65, 0.55, 1.0]),
        Easing::CircOut => Some([0.55, 0.0, 1.0, 0.45]),
        Easing::BackIn => Some([0.31, 0.01, 0.66, -0.59]),
        other => other.bezier_points(),
    };
    if let Some(points) = bezier {
        return NativeEasing::CubicBezier(points);
    }
    if capabilities.linear_easing {
        return NativeEasing::Linear(easing.to_linear_points(duration_ms, config.linear_easing_resolution_ms));
    }
    NativeEasing::Keyword("ease-out")
}

/// Options for starting a platform animation. Times are in milliseconds.
#[derive(Clone, Debug, PartialEq)]
pub struct NativeKeyframeOptions {
    pub duration: f64,
    pub delay: f64,
    /// One easing per keyframe segment
    pub easing: Vec<NativeEasing>,
    /// Keyframe offsets in `[0, 1]`
    pub offsets: Option<Vec<f64>>,
    /// Total play count, `repeat + 1`
    pub iterations: f64,
}

impl NativeKeyframeOptions {
    pub fn from_transition(transition: &Transition, capabilities: &Capabilities, config: &MotionConfig) -> Self {
        let duration = seconds_to_ms(transition.duration.unwrap_or(config.default_duration));
        let easing = transition
            .ease
            .as_ref()
            .map(|ease| ease.as_slice().to_vec())
            .unwrap_or_else(|| vec![Easing::EaseOut])
            .iter()
            .map(|easing| map_easing_to_native(easing, duration, capabilities, config))
            .collect();
        Self {
            duration,
            delay: transition
                .delay
                .as_ref()
                .map(|delay| seconds_to_ms(delay.resolve(0, 1)))
                .unwrap_or(0.0),
            easing,
            offsets: transition.times.clone(),
            iterations: transition.repeat.unwrap_or(0) as f64 + 1.0,
        }
    }
}

/// A running platform animation
pub trait NativeAnimation {
    fn play(&self);
    fn pause(&self);
    /// Must be safe to call on an idle or already cancelled animation
    fn cancel(&self);
    fn finish(&self);

    /// Local time in milliseconds, `None` while not yet started
    fn current_time(&self) -> Option<f64>;
    fn set_current_time(&self, ms: f64);
    /// Timeline time the animation started at, `None` while pending
    fn start_time(&self) -> Option<f64>;
    fn set_start_time(&self, start_time: Option<f64>);
    fn playback_rate(&self) -> f64;
    fn set_playback_rate(&self, rate: f64);
    fn play_state(&self) -> PlayState;

    /// Replace the finish notification
    fn set_on_finish(&self, callback: Option<Box<dyn FnMut()>>);

    /// Run `callback` once the platform has allocated the animation
    fn on_ready(&self, callback: Box<dyn FnOnce()>) {
        callback();
    }

    /// Write the current animated value into the element's style
    fn commit_styles(&self) {}

    /// Drive this animation from a platform scroll timeline
    fn attach_timeline(&self, _timeline: &ScrollTimeline) -> bool {
        false
    }
}

/// Starts platform animations on elements
pub trait NativeAnimator {
    fn animate(
        &self,
        element_id: &str,
        property: &str,
        keyframes: &[AnimValue],
        options: &NativeKeyframeOptions,
    ) -> std::result::Result<Rc<dyn NativeAnimation>, String>;

    /// Set the element's final style once an animation is done with it
    fn commit_style(&self, element_id: &str, property: &str, value: &AnimValue);
}

struct NativeInner {
    animation: Rc<dyn NativeAnimation>,
    animator: Rc<dyn NativeAnimator>,
    element_id: String,
    property: String,
    final_value: AnimValue,
    options: NativeKeyframeOptions,
    finish: FinishCallbacks,
}

impl NativeInner {
    fn on_native_finish(&self) {
        self.animator
            .commit_style(&self.element_id, &self.property, &self.final_value);
        self.animation.cancel();
        debug!(element = %self.element_id, property = %self.property, "native animation finished");
        self.finish.resolve();
    }
}

/// [`Playback`] over a platform animation
#[derive(Clone)]
pub struct NativePlayback {
    inner: Rc<NativeInner>,
}

impl NativePlayback {
    /// Start a platform animation of `property` through `keyframes`
    pub fn start(
        animator: &Rc<dyn NativeAnimator>,
        element_id: &str,
        property: &str,
        keyframes: Vec<AnimValue>,
        options: NativeKeyframeOptions,
    ) -> Result<Self> {
        let final_value = keyframes
            .last()
            .cloned()
            .ok_or_else(|| AnimationError::EmptyKeyframes(property.to_string()))?;
        let animation = animator
            .animate(element_id, property, &keyframes, &options)
            .map_err(|reason| {
                warn!(element = element_id, property, %reason, "native animation failed to start");
                AnimationError::NativeUnavailable(reason)
            })?;
        Ok(Self::wrap(animation, animator.clone(), element_id, property, final_value, options))
    }

    /// Control an animation that is already running
    pub fn wrap(
        animation: Rc<dyn NativeAnimation>,
        animator: Rc<dyn NativeAnimator>,
        element_id: &str,
        property: &str,
        final_value: AnimValue,
        options: NativeKeyframeOptions,
    ) -> Self {
        let inner = Rc::new(NativeInner {
            animation,
            animator,
            element_id: element_id.to_string(),
            property: property.to_string(),
            final_value,
            options,
            finish: FinishCallbacks::default(),
        });
        let weak: Weak<NativeInner> = Rc::downgrade(&inner);
        inner.animation.set_on_finish(Some(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.on_native_finish();
            }
        })));
        Self { inner }
    }

    pub fn animation(&self) -> &Rc<dyn NativeAnimation> {
        &self.inner.animation
    }
}

impl Playback for NativePlayback {
    fn time(&self) -> f64 {
        ms_to_seconds(self.inner.animation.current_time().unwrap_or(0.0))
    }

    fn set_time(&self, seconds: f64) {
        self.inner.animation.set_current_time(seconds_to_ms(seconds));
    }

    fn duration(&self) -> f64 {
        let options = &self.inner.options;
        ms_to_seconds(options.duration * options.iterations)
    }

    fn speed(&self) -> f64 {
        self.inner.animation.playback_rate()
    }

    fn set_speed(&self, speed: f64) {
        self.inner.animation.set_playback_rate(speed);
    }

    fn state(&self) -> PlayState {
        self.inner.animation.play_state()
    }

    fn play(&self) {
        if self.state() == PlayState::Finished {
            self.inner.finish.reset();
        }
        self.inner.animation.play();
    }

    fn pause(&self) {
        self.inner.animation.pause();
    }

    fn stop(&self) {
        if self.state() == PlayState::Idle {
            return;
        }
        self.inner.animation.commit_styles();
        self.inner.animation.cancel();
    }

    fn complete(&self) {
        self.inner.animation.finish();
    }

    fn cancel(&self) {
        self.inner.finish.discard();
        self.inner.animation.set_on_finish(None);
        self.inner.animation.cancel();
    }

    fn on_finish(&self, callback: Box<dyn FnOnce()>) {
        self.inner.finish.push(callback);
    }

    fn attach_timeline(&self, timeline: &ScrollTimeline) -> bool {
        self.inner.animation.attach_timeline(timeline)
    }
}
