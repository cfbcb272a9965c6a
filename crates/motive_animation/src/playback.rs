//! Playback controls shared by software and native animations

use crate::scroll::ScrollTimeline;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Lifecycle of a running animation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PlayState {
    #[default]
    Idle,
    Running,
    Paused,
    Finished,
}

/// Controls for a started animation. Times are in seconds.
///
/// All methods take `&self`; implementations are shared handles.
pub trait Playback {
    fn time(&self) -> f64;
    fn set_time(&self, seconds: f64);
    fn duration(&self) -> f64;
    fn speed(&self) -> f64;
    fn set_speed(&self, speed: f64);
    fn state(&self) -> PlayState;

    fn play(&self);
    fn pause(&self);
    /// Stop where it is, keeping the current value
    fn stop(&self);
    /// Jump to the end and finish
    fn complete(&self);
    /// Abort and discard; never reports finished
    fn cancel(&self);

    /// Run `callback` once the animation finishes, immediately if it
    /// already has
    fn on_finish(&self, callback: Box<dyn FnOnce()>);

    /// Hand progress over to a platform scroll timeline.
    ///
    /// Returns `false` when the animation must be scrubbed in software.
    fn attach_timeline(&self, _timeline: &ScrollTimeline) -> bool {
        false
    }
}

/// Pending finish callbacks of one animation
#[derive(Default)]
pub(crate) struct FinishCallbacks {
    finished: Cell<bool>,
    callbacks: RefCell<Vec<Box<dyn FnOnce()>>>,
}

impl FinishCallbacks {
    pub(crate) fn push(&self, callback: Box<dyn FnOnce()>) {
        if self.finished.get() {
            callback();
        } else {
            self.callbacks.borrow_mut().push(callback);
        }
    }

    pub(crate) fn resolve(&self) {
        self.finished.set(true);
        let callbacks = std::mem::take(&mut *self.callbacks.borrow_mut());
        for callback in callbacks {
            callback();
        }
    }

    /// Forget the finished flag so a replay can finish again
    pub(crate) fn reset(&self) {
        self.finished.set(false);
    }

    /// Drop pending callbacks without running them
    pub(crate) fn discard(&self) {
        let callbacks = std::mem::take(&mut *self.callbacks.borrow_mut());
        drop(callbacks);
    }
}

/// Several animations controlled as one
#[derive(Clone, Default)]
pub struct GroupPlayback {
    animations: Vec<Rc<dyn Playback>>,
}

impl std::fmt::Debug for GroupPlayback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupPlayback")
            .field("len", &self.animations.len())
            .finish_non_exhaustive()
    }
}

impl GroupPlayback {
    pub fn new(animations: Vec<Rc<dyn Playback>>) -> Self {
        Self { animations }
    }

    pub fn push(&mut self, animation: Rc<dyn Playback>) {
        self.animations.push(animation);
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }

    pub fn animations(&self) -> &[Rc<dyn Playback>] {
        &self.animations
    }
}

impl Playback for GroupPlayback {
    fn time(&self) -> f64 {
        self.animations.first().map(|a| a.time()).unwrap_or(0.0)
    }

    fn set_time(&self, seconds: f64) {
        for animation in &self.animations {
            animation.set_time(seconds);
        }
    }

    fn duration(&self) -> f64 {
        self.animations.iter().map(|a| a.duration()).fold(0.0, f64::max)
    }

    fn speed(&self) -> f64 {
        self.animations.first().map(|a| a.speed()).unwrap_or(1.0)
    }

    fn set_speed(&self, speed: f64) {
        for animation in &self.animations {
            animation.set_speed(speed);
        }
    }

    fn state(&self) -> PlayState {
        let states: Vec<PlayState> = self.animations.iter().map(|a| a.state()).collect();
        if states.iter().any(|s| *s == PlayState::Running) {
            PlayState::Running
        } else if states.iter().any(|s| *s == PlayState::Paused) {
            PlayState::Paused
        } else if !states.is_empty() && states.iter().all(|s| *s == PlayState::Finished) {
            PlayState::Finished
        } else {
            PlayState::Idle
        }
    }

    fn play(&self) {
        for animation in &self.animations {
            animation.play();
        }
    }

    fn pause(&self) {
        for animation in &self.animations {
            animation.pause();
        }
    }

    fn stop(&self) {
        for animation in &self.animations {
            animation.stop();
        }
    }

    fn complete(&self) {
        for animation in &self.animations {
            animation.complete();
        }
    }

    fn cancel(&self) {
        for animation in &self.animations {
            animation.cancel();
        }
    }

    /// Fires once every member has finished
    fn on_finish(&self, callback: Box<dyn FnOnce()>) {
        if self.animations.is_empty() {
            callback();
            return;
        }
        let remaining = Rc::new(Cell::new(self.animations.len()));
        let callback = Rc::new(RefCell::new(Some(callback)));
        for animation in &self.animations {
            let remaining = remaining.clone();
            let callback = callback.clone();
            animation.on_finish(Box::new(move || {
                remaining.set(remaining.get() - 1);
                if remaining.get() == 0 {
                    let callback = callback.borrow_mut().take();
                    if let Some(callback) = callback {
                        callback();
                    }
                }
            }));
        }
    }

    fn attach_timeline(&self, timeline: &ScrollTimeline) -> bool {
        let mut attached = true;
        for animation in &self.animations {
            attached &= animation.attach_timeline(timeline);
        }
        attached
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Fake {
        time: Cell<f64>,
        duration: f64,
        state: Cell<PlayState>,
        finish: FinishCallbacks,
    }

    impl Playback for Fake {
        fn time(&self) -> f64 {
            self.time.get()
        }
        fn set_time(&self, seconds: f64) {
            self.time.set(seconds);
        }
        fn duration(&self) -> f64 {
            self.duration
        }
        fn speed(&self) -> f64 {
            1.0
        }
        fn set_speed(&self, _speed: f64) {}
        fn state(&self) -> PlayState {
            self.state.get()
        }
        fn play(&self) {
            self.state.set(PlayState::Running);
        }
        fn pause(&self) {
            self.state.set(PlayState::Paused);
        }
        fn stop(&self) {
            self.state.set(PlayState::Idle);
        }
        fn complete(&self) {
            self.state.set(PlayState::Finished);
            self.finish.resolve();
        }
        fn cancel(&self) {
            self.state.set(PlayState::Idle);
        }
        fn on_finish(&self, callback: Box<dyn FnOnce()>) {
            self.finish.push(callback);
        }
    }

    fn fake(duration: f64) -> Rc<Fake> {
        Rc::new(Fake {
            duration,
            ..Default::default()
        })
    }

    #[test]
    fn test_group_controls_every_member() {
        let a = fake(1.0);
        let b = fake(2.0);
        let group = GroupPlayback::new(vec![a.clone() as Rc<dyn Playback>, b.clone()]);
        assert_eq!(group.duration(), 2.0);

        group.set_time(0.5);
        assert_eq!(b.time(), 0.5);

        group.play();
        assert_eq!(group.state(), PlayState::Running);
        group.pause();
        assert_eq!(a.state(), PlayState::Paused);
    }

    #[test]
    fn test_group_finishes_after_all() {
        let a = fake(1.0);
        let b = fake(1.0);
        let group = GroupPlayback::new(vec![a.clone() as Rc<dyn Playback>, b.clone()]);
        let done = Rc::new(Cell::new(false));
        let flag = done.clone();
        group.on_finish(Box::new(move || flag.set(true)));

        a.complete();
        assert!(!done.get());
        b.complete();
        assert!(done.get());
        assert_eq!(group.state(), PlayState::Finished);
    }

    #[test]
    fn test_finish_after_the_fact_runs_immediately() {
        let callbacks = FinishCallbacks::default();
        callbacks.resolve();
        let ran = Rc::new(Cell::new(false));
        let flag = ran.clone();
        callbacks.push(Box::new(move || flag.set(true)));
        assert!(ran.get());
    }
}
