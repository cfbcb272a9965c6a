//! Software animation driven by the frame loop
//!
//! A [`ValueAnimation`] samples a generator once per frame in the `update`
//! phase and writes the result into a [`MotionValue`].

use crate::error::{AnimationError, Result};
use crate::generators::{calc_generator_duration, create_generator, Generator, GeneratorKind};
use crate::playback::{FinishCallbacks, PlayState, Playback};
use crate::transition::{Transition, TransitionType};
use motive_core::math::{ms_to_seconds, seconds_to_ms};
use motive_core::{AnimValue, AnimationHandle, Frameloop, MotionConfig, MotionValue, Phase, ProcessId};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{debug, trace};

struct DriverState {
    generator: Box<dyn Generator>,
    initial: AnimValue,
    final_value: AnimValue,
    /// Length of one iteration (ms)
    duration: f64,
    delay: f64,
    repeat: u32,
    repeat_delay: f64,
    /// Frame timestamp that corresponds to animation time 0
    start_time: Option<f64>,
    /// Animation time while not running (ms)
    hold_time: Option<f64>,
    speed: f64,
    state: PlayState,
    process: Option<ProcessId>,
    /// Whether the motion value currently lists this animation as its own
    owns_value: bool,
}

impl DriverState {
    fn total_duration(&self) -> f64 {
        self.duration * (self.repeat as f64 + 1.0) + self.repeat_delay * self.repeat as f64
    }

    fn current_time(&self, now: f64) -> f64 {
        match (self.hold_time, self.start_time) {
            (Some(hold), _) => hold,
            (None, Some(start)) => (now - start) * self.speed,
            (None, None) => 0.0,
        }
    }

    /// Value at animation time `t` (ms), `None` while still delayed
    fn sample(&mut self, t: f64) -> Option<(AnimValue, bool)> {
        let t = t - self.delay;
        if t < 0.0 {
            return None;
        }
        if t >= self.total_duration() {
            return Some((self.final_value.clone(), true));
        }
        let cycle = self.duration + self.repeat_delay;
        let local = if self.repeat > 0 && cycle > 0.0 {
            let iteration = (t / cycle).floor();
            (t - iteration * cycle).min(self.duration)
        } else {
            t
        };
        Some((self.generator.next(local).value, false))
    }
}

struct Inner {
    value: MotionValue,
    frame: Frameloop,
    state: RefCell<DriverState>,
    finish: FinishCallbacks,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(process) = self.state.get_mut().process.take() {
            self.frame.cancel(process);
        }
    }
}

/// Generator-driven animation of one motion value
#[derive(Clone)]
pub struct ValueAnimation {
    inner: Rc<Inner>,
}

impl ValueAnimation {
    /// Prepare an animation of `value` through `keyframes`.
    ///
    /// The animation is idle until [`Playback::play`] is called.
    pub fn new(
        frame: &Frameloop,
        value: &MotionValue,
        keyframes: Vec<AnimValue>,
        transition: &Transition,
        config: &MotionConfig,
    ) -> Result<Self> {
        if keyframes.is_empty() {
            return Err(AnimationError::EmptyKeyframes("value".to_string()));
        }
        let kind = match transition.kind() {
            TransitionType::Tween | TransitionType::Keyframes => GeneratorKind::Keyframes,
            TransitionType::Spring => GeneratorKind::Spring,
            TransitionType::Inertia => GeneratorKind::Inertia,
            TransitionType::Custom(name) => return Err(AnimationError::UnknownGenerator(name)),
        };

        let mut options = transition.generator_options(keyframes.clone());
        if transition.velocity.is_none() {
            options.velocity = value.velocity();
        }
        if kind == GeneratorKind::Keyframes && options.duration_ms.is_none() {
            options.duration_ms = Some(seconds_to_ms(config.default_duration));
        }

        // Measuring runs the generator; playback gets a fresh one
        let mut measure = create_generator(kind, &options)?;
        let duration = match measure.calculated_duration() {
            Some(duration) => duration,
            None => calc_generator_duration(
                measure.as_mut(),
                config.generator_time_step_ms,
                config.max_generator_duration_ms,
            )
            .min(config.max_generator_duration_ms),
        };
        let final_value = measure.next(duration).value;
        let mut generator = create_generator(kind, &options)?;
        let initial = generator.next(0.0).value;

        let delay = transition
            .delay
            .as_ref()
            .map(|delay| seconds_to_ms(delay.resolve(0, 1)))
            .unwrap_or(0.0);

        trace!(kind = kind.name(), duration, delay, "value animation created");
        Ok(Self {
            inner: Rc::new(Inner {
                value: value.clone(),
                frame: frame.clone(),
                state: RefCell::new(DriverState {
                    generator,
                    initial,
                    final_value,
                    duration,
                    delay,
                    repeat: transition.repeat.unwrap_or(0),
                    repeat_delay: transition.repeat_delay.map(seconds_to_ms).unwrap_or(0.0),
                    start_time: None,
                    hold_time: Some(0.0),
                    speed: 1.0,
                    state: PlayState::Idle,
                    process: None,
                    owns_value: false,
                }),
                finish: FinishCallbacks::default(),
            }),
        })
    }

    /// Create and immediately play
    pub fn start(
        frame: &Frameloop,
        value: &MotionValue,
        keyframes: Vec<AnimValue>,
        transition: &Transition,
        config: &MotionConfig,
    ) -> Result<Self> {
        let animation = Self::new(frame, value, keyframes, transition, config)?;
        animation.play();
        Ok(animation)
    }

    pub fn value(&self) -> &MotionValue {
        &self.inner.value
    }

    /// Play as if started at frame time `start_time` (ms), picking up an
    /// animation that was already running elsewhere
    pub fn play_from(&self, start_time: f64) {
        self.play();
        self.inner.state.borrow_mut().start_time = Some(start_time);
    }

    fn schedule(&self) {
        if self.inner.state.borrow().process.is_some() {
            return;
        }
        let weak: Weak<Inner> = Rc::downgrade(&self.inner);
        let process = self.inner.frame.schedule(
            Phase::Update,
            move |data| {
                if let Some(inner) = weak.upgrade() {
                    ValueAnimation { inner }.tick(data.timestamp);
                }
            },
            true,
            false,
        );
        self.inner.state.borrow_mut().process = Some(process);
    }

    fn unschedule(&self) {
        let process = self.inner.state.borrow_mut().process.take();
        if let Some(process) = process {
            self.inner.frame.cancel(process);
        }
    }

    fn tick(&self, timestamp: f64) {
        let t = {
            let mut state = self.inner.state.borrow_mut();
            if state.state != PlayState::Running {
                return;
            }
            let start = *state.start_time.get_or_insert(timestamp);
            (timestamp - start) * state.speed
        };
        self.render(t);
    }

    /// Write the value at animation time `t` (ms); finishes when past the end
    fn render(&self, t: f64) {
        let sample = self.inner.state.borrow_mut().sample(t);
        let Some((value, done)) = sample else {
            return;
        };
        self.inner.value.set(value);
        let running = self.inner.state.borrow().state == PlayState::Running;
        if done && running {
            self.finish();
        }
    }

    fn finish(&self) {
        let owned = {
            let mut state = self.inner.state.borrow_mut();
            state.state = PlayState::Finished;
            state.hold_time = Some(state.total_duration() + state.delay);
            std::mem::replace(&mut state.owns_value, false)
        };
        self.unschedule();
        debug!(value = ?self.inner.value.id(), "value animation finished");
        if owned {
            self.inner.value.finish_animation();
        }
        self.inner.finish.resolve();
    }

    /// Stop producing frames without touching the motion value
    fn teardown(&self) {
        {
            let mut state = self.inner.state.borrow_mut();
            let now = self.inner.frame.now();
            if state.hold_time.is_none() {
                state.hold_time = Some(state.current_time(now));
            }
            state.state = PlayState::Idle;
            state.owns_value = false;
        }
        self.unschedule();
    }
}

impl AnimationHandle for ValueAnimation {
    /// Called by the motion value when another animation takes over
    fn stop(&self) {
        self.teardown();
    }
}

impl Playback for ValueAnimation {
    fn time(&self) -> f64 {
        let now = self.inner.frame.now();
        ms_to_seconds(self.inner.state.borrow().current_time(now))
    }

    fn set_time(&self, seconds: f64) {
        let t = seconds_to_ms(seconds);
        {
            let mut state = self.inner.state.borrow_mut();
            if state.state == PlayState::Running && state.hold_time.is_none() {
                let now = self.inner.frame.now();
                state.start_time = Some(now - t / state.speed);
            } else {
                state.hold_time = Some(t);
            }
        }
        self.render(t);
    }

    fn duration(&self) -> f64 {
        ms_to_seconds(self.inner.state.borrow().total_duration())
    }

    fn speed(&self) -> f64 {
        self.inner.state.borrow().speed
    }

    fn set_speed(&self, speed: f64) {
        let now = self.inner.frame.now();
        let mut state = self.inner.state.borrow_mut();
        if state.hold_time.is_none() && speed != 0.0 {
            let current = state.current_time(now);
            state.start_time = Some(now - current / speed);
        }
        state.speed = speed;
    }

    fn state(&self) -> PlayState {
        self.inner.state.borrow().state
    }

    fn play(&self) {
        let (claim, now) = {
            let state = self.inner.state.borrow();
            if state.state == PlayState::Running {
                return;
            }
            (!state.owns_value, self.inner.frame.now())
        };

        // Claim the value first: it stops whatever animation held it
        if claim {
            self.inner.value.start(Rc::new(self.clone()));
        }

        {
            let mut state = self.inner.state.borrow_mut();
            if state.state == PlayState::Finished {
                state.hold_time = Some(0.0);
                self.inner.finish.reset();
            }
            state.start_time = match state.hold_time.take() {
                Some(hold) if hold > 0.0 => Some(now - hold / state.speed),
                _ => None,
            };
            state.state = PlayState::Running;
            state.owns_value = true;
        }
        self.schedule();
    }

    fn pause(&self) {
        {
            let now = self.inner.frame.now();
            let mut state = self.inner.state.borrow_mut();
            if state.state != PlayState::Running {
                return;
            }
            state.hold_time = Some(state.current_time(now));
            state.state = PlayState::Paused;
        }
        self.unschedule();
    }

    fn stop(&self) {
        let owned = self.inner.state.borrow().owns_value;
        if owned {
            // Routes back through AnimationHandle::stop
            self.inner.value.stop();
        }
        self.teardown();
    }

    fn complete(&self) {
        let end = {
            let mut state = self.inner.state.borrow_mut();
            if state.state == PlayState::Finished {
                return;
            }
            state.state = PlayState::Running;
            state.total_duration() + state.delay
        };
        self.render(end);
    }

    fn cancel(&self) {
        let initial = self.inner.state.borrow().initial.clone();
        self.inner.finish.discard();
        Playback::stop(self);
        self.inner.value.set(initial);
        self.inner.state.borrow_mut().hold_time = Some(0.0);
    }

    fn on_finish(&self, callback: Box<dyn FnOnce()>) {
        self.inner.finish.push(callback);
    }
}
