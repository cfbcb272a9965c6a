//! Optimised appear animations
//!
//! Appear animations start on the platform before the engine has mounted.
//! A single long, motionless priming animation is started first so the
//! platform allocates its animation resources while keyframes are still
//! being resolved. Once it is ready the real animation replaces it, and the
//! engine later takes over through [`HandoffHooks::handoff`].

use super::hooks::{CancelMode, HandoffDispatch, HandoffHooks};
use super::store::{appear_store_id, AppearEntry, AppearEvent, AppearState};
use crate::error::{AnimationError, Result};
use crate::native::{NativeAnimation, NativeAnimator, NativeEasing, NativeKeyframeOptions};
use motive_core::{AnimValue, Capabilities, Frameloop, MotionConfig, MotionEvent, MotionValue, SubscriptionId};
use indexmap::IndexSet;
use rustc_hash::FxHashMap;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tracing::{debug, warn};

type OnReady = Box<dyn FnOnce(Rc<dyn NativeAnimation>)>;

#[derive(Default)]
struct StoreState {
    entries: FxHashMap<String, AppearEntry>,
    /// Per element: `true` once its appear animations are done with
    complete: FxHashMap<String, bool>,
    suspended: IndexSet<String>,
    priming: Option<Rc<dyn NativeAnimation>>,
    /// Shared start time so every appear animation runs in sync
    start_frame_time: Option<f64>,
}

struct StoreInner {
    frame: Frameloop,
    config: MotionConfig,
    animator: Option<Rc<dyn NativeAnimator>>,
    hooks: HandoffDispatch,
    /// Set once the engine has mounted; appear animations are skipped after
    mounted: Cell<bool>,
    state: RefCell<StoreState>,
}

/// Process-wide store of optimised appear animations
#[derive(Clone)]
pub struct AppearStore {
    inner: Rc<StoreInner>,
}

impl AppearStore {
    /// Appear animations need native animations; without them the store
    /// stays empty.
    pub fn new(
        frame: &Frameloop,
        config: &MotionConfig,
        capabilities: &Capabilities,
        animator: Option<Rc<dyn NativeAnimator>>,
        hooks: HandoffDispatch,
    ) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                frame: frame.clone(),
                config: config.clone(),
                animator: animator.filter(|_| capabilities.native_animations),
                hooks,
                mounted: Cell::new(false),
                state: RefCell::new(StoreState::default()),
            }),
        }
    }

    fn from_weak(weak: &Weak<StoreInner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    /// Flag that the engine has mounted and owns every animation from now on
    pub fn set_mounted(&self, mounted: bool) {
        self.inner.mounted.set(mounted);
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.mounted.get()
    }

    pub fn len(&self) -> usize {
        self.inner.state.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lifecycle state of an element property's animation
    pub fn state(&self, appear_id: &str, property: &str) -> Option<AppearState> {
        let key = appear_store_id(appear_id, property);
        self.inner.state.borrow().entries.get(&key).map(AppearEntry::state)
    }

    /// Start the native appear animation of `property`.
    ///
    /// Returns `Ok(false)` when skipped: the engine is already mounted or the
    /// platform cannot run native animations. `on_ready` receives the real
    /// animation once it replaces the priming one.
    pub fn start_optimized_appear(
        &self,
        appear_id: &str,
        property: &str,
        keyframes: Vec<AnimValue>,
        options: NativeKeyframeOptions,
        on_ready: Option<OnReady>,
    ) -> Result<bool> {
        if self.inner.mounted.get() {
            debug!(appear_id, property, "engine mounted, appear animation skipped");
            return Ok(false);
        }
        let Some(animator) = self.inner.animator.clone() else {
            return Ok(false);
        };
        let first = keyframes
            .first()
            .cloned()
            .ok_or_else(|| AnimationError::EmptyKeyframes(property.to_string()))?;
        let key = appear_store_id(appear_id, property);

        self.inner.hooks.install(Rc::new(self.clone()));

        let existing = self.inner.state.borrow().priming.clone();
        let priming = match existing {
            Some(priming) => priming,
            None => {
                let priming_options = NativeKeyframeOptions {
                    duration: self.inner.config.priming_duration_ms,
                    delay: 0.0,
                    easing: vec![NativeEasing::Keyword("linear")],
                    offsets: None,
                    iterations: 1.0,
                };
                let priming = animator
                    .animate(appear_id, property, &[first.clone(), first], &priming_options)
                    .map_err(|reason| {
                        warn!(appear_id, property, %reason, "priming animation failed to start");
                        AnimationError::NativeUnavailable(reason)
                    })?;
                let mut state = self.inner.state.borrow_mut();
                state.priming = Some(priming.clone());
                state.entries.insert(key.clone(), AppearEntry::priming(priming.clone()));
                debug!(appear_id, property, "priming animation started");
                priming
            }
        };

        self.inner
            .state
            .borrow_mut()
            .complete
            .insert(appear_id.to_string(), false);

        let weak = Rc::downgrade(&self.inner);
        let appear_id = appear_id.to_string();
        let property = property.to_string();
        let ready_priming = priming.clone();
        priming.on_ready(Box::new(move || {
            let Some(store) = AppearStore::from_weak(&weak) else {
                return;
            };
            ready_priming.cancel();
            if let Err(error) = store.start_real(&animator, &appear_id, &property, &key, keyframes, options, on_ready) {
                warn!(%error, "appear animation failed to start");
            }
        }));
        Ok(true)
    }

    #[allow(clippy::too_many_arguments)]
    fn start_real(
        &self,
        animator: &Rc<dyn NativeAnimator>,
        appear_id: &str,
        property: &str,
        key: &str,
        keyframes: Vec<AnimValue>,
        options: NativeKeyframeOptions,
        on_ready: Option<OnReady>,
    ) -> Result<()> {
        let final_value = keyframes
            .last()
            .cloned()
            .ok_or_else(|| AnimationError::EmptyKeyframes(property.to_string()))?;
        let animation = animator
            .animate(appear_id, property, &keyframes, &options)
            .map_err(AnimationError::NativeUnavailable)?;

        let start_time = {
            let mut state = self.inner.state.borrow_mut();
            *state.start_frame_time.get_or_insert_with(|| self.inner.frame.now())
        };
        animation.set_start_time(Some(start_time));

        // Finishing commits the last keyframe and completes the element
        let weak = Rc::downgrade(&self.inner);
        let finished_animator = animator.clone();
        let (element, prop, store_key) = (appear_id.to_string(), property.to_string(), key.to_string());
        animation.set_on_finish(Some(Box::new(move || {
            finished_animator.commit_style(&element, &prop, &final_value);
            if let Some(store) = AppearStore::from_weak(&weak) {
                store.finish_entry(&element, &store_key);
            }
        })));

        let replaced = {
            let mut state = self.inner.state.borrow_mut();
            let entry = match state.entries.remove(key) {
                Some(mut entry) => {
                    entry.animation = animation.clone();
                    entry.start_time = Some(start_time);
                    entry.machine.send(AppearEvent::Start);
                    entry
                }
                None => AppearEntry::playing(animation.clone(), start_time),
            };
            state.entries.insert(key.to_string(), entry)
        };
        drop(replaced);
        debug!(appear_id, property, start_time, "appear animation playing");

        if let Some(on_ready) = on_ready {
            on_ready(animation);
        }
        Ok(())
    }

    fn finish_entry(&self, appear_id: &str, key: &str) {
        {
            let mut state = self.inner.state.borrow_mut();
            if let Some(entry) = state.entries.get_mut(key) {
                entry.machine.send(AppearEvent::Finish);
            }
        }
        self.mark_complete(appear_id);
    }

    /// Resume every suspended animation with its first start time
    pub fn resume_suspended(&self) {
        let mut state = self.inner.state.borrow_mut();
        let suspended = std::mem::take(&mut state.suspended);
        for key in suspended {
            let Some(entry) = state.entries.get_mut(&key) else {
                continue;
            };
            entry.animation.set_start_time(entry.start_time);
            entry.animation.play();
            entry.machine.send(AppearEvent::Resume);
            debug!(key = %key, "appear animation resumed");
        }
    }

    /// Cancel every animation and forget all state
    pub fn clear(&self) {
        let state = std::mem::take(&mut *self.inner.state.borrow_mut());
        for entry in state.entries.values() {
            entry.animation.cancel();
        }
        if let Some(priming) = &state.priming {
            priming.cancel();
        }
        self.inner.hooks.uninstall();
    }
}

impl HandoffHooks for AppearStore {
    fn has_optimized_animation(&self, appear_id: &str, property: Option<&str>) -> bool {
        let state = self.inner.state.borrow();
        match property {
            None => state.complete.contains_key(appear_id),
            Some(property) => state.entries.contains_key(&appear_store_id(appear_id, property)),
        }
    }

    fn mark_complete(&self, appear_id: &str) {
        let mut state = self.inner.state.borrow_mut();
        if let Some(complete) = state.complete.get_mut(appear_id) {
            *complete = true;
        }
    }

    fn is_complete(&self, appear_id: &str) -> bool {
        self.inner.state.borrow().complete.get(appear_id) == Some(&true)
    }

    fn cancel(&self, appear_id: &str, property: &str, mode: CancelMode) {
        let key = appear_store_id(appear_id, property);
        let Some(animation) = self
            .inner
            .state
            .borrow()
            .entries
            .get(&key)
            .map(|entry| entry.animation.clone())
        else {
            return;
        };

        match mode {
            CancelMode::Immediate => animation.cancel(),
            CancelMode::Deferred(frame) => {
                let outer = frame.clone();
                outer.post_render(move |_| {
                    let animation = animation.clone();
                    frame.post_render(move |_| animation.cancel());
                });
            }
            CancelMode::Suspend(frame) => {
                animation.pause();
                {
                    let mut state = self.inner.state.borrow_mut();
                    if let Some(entry) = state.entries.get_mut(&key) {
                        entry.machine.send(AppearEvent::Suspend);
                    }
                    state.suspended.insert(key.clone());
                }
                debug!(key = %key, "appear animation suspended");
                let weak = Rc::downgrade(&self.inner);
                frame.render(move |_| {
                    if let Some(store) = AppearStore::from_weak(&weak) {
                        store.resume_suspended();
                    }
                });
                return;
            }
        }

        let empty = {
            let mut state = self.inner.state.borrow_mut();
            let removed = state.entries.remove(&key);
            drop(removed);
            state.entries.is_empty()
        };
        debug!(key = %key, "appear animation cancelled");
        if empty {
            self.inner.hooks.uninstall();
        }
    }

    fn check_sync(
        &self,
        appear_id: &str,
        property: &str,
        value: &MotionValue,
        external: &MotionValue,
    ) -> Option<SubscriptionId> {
        if !self.has_optimized_animation(appear_id, Some(property)) {
            return None;
        }
        let weak = Rc::downgrade(&self.inner);
        let own_id: Rc<Cell<Option<SubscriptionId>>> = Rc::new(Cell::new(None));
        let slot = own_id.clone();
        let watched = value.clone();
        let external = external.clone();
        let (appear_id, property) = (appear_id.to_string(), property.to_string());
        let id = value.on(MotionEvent::Change, move |latest| {
            if external.get() == *latest {
                return;
            }
            if let Some(store) = AppearStore::from_weak(&weak) {
                store.cancel(&appear_id, &property, CancelMode::Immediate);
            }
            if let Some(id) = slot.take() {
                watched.unsubscribe(id);
            }
        });
        own_id.set(Some(id));
        Some(id)
    }

    fn handoff(&self, appear_id: &str, property: &str, frame: &Frameloop) -> Option<f64> {
        let key = appear_store_id(appear_id, property);
        let (animation, start_time) = {
            let state = self.inner.state.borrow();
            let entry = state.entries.get(&key)?;
            (entry.animation.clone(), entry.start_time)
        };

        let weak = Rc::downgrade(&self.inner);
        let (element, prop, finish_frame) = (appear_id.to_string(), property.to_string(), frame.clone());
        animation.set_on_finish(Some(Box::new(move || {
            if let Some(store) = AppearStore::from_weak(&weak) {
                store.cancel(&element, &prop, CancelMode::Deferred(finish_frame.clone()));
            }
        })));

        match start_time {
            Some(start_time) if !self.is_complete(appear_id) => {
                debug!(appear_id, property, start_time, "appear animation handed off");
                Some(start_time)
            }
            _ => {
                self.cancel(appear_id, property, CancelMode::Deferred(frame.clone()));
                None
            }
        }
    }
}
