//! Typed handoff hooks
//!
//! Code that renders before the animation engine is ready (and code in
//! other bundles) coordinates with appear animations through this table.
//! Calls made while nothing is installed fall back to "no optimised
//! animation".

use motive_core::{Frameloop, MotionValue, SubscriptionId};
use std::cell::RefCell;
use std::rc::Rc;

/// How to cancel an optimised appear animation
#[derive(Clone)]
pub enum CancelMode {
    /// Cancel now and forget the animation
    Immediate,
    /// Cancel after two `postRender` ticks so the replacement animation has
    /// rendered its first frame
    Deferred(Frameloop),
    /// Pause and keep the animation so it can resume with its first
    /// start time on the next `render`
    Suspend(Frameloop),
}

/// Coordination contract between appear animations and later code
pub trait HandoffHooks {
    /// With a property, whether a native animation exists for it. Without,
    /// whether the element started appear animations at all.
    fn has_optimized_animation(&self, appear_id: &str, property: Option<&str>) -> bool;

    /// Record that the element's appear animations are done with
    fn mark_complete(&self, appear_id: &str);

    fn is_complete(&self, appear_id: &str) -> bool;

    /// Cancel the element's native animation of `property`. Unknown
    /// animations are ignored.
    fn cancel(&self, appear_id: &str, property: &str, mode: CancelMode);

    /// Cancel the optimised animation as soon as `value` diverges from the
    /// externally controlled `external` value.
    ///
    /// Returns the change subscription on `value` when a check was set up.
    fn check_sync(
        &self,
        appear_id: &str,
        property: &str,
        value: &MotionValue,
        external: &MotionValue,
    ) -> Option<SubscriptionId>;

    /// Take over the running native animation.
    ///
    /// Returns its start time so a replacement animation can continue
    /// seamlessly, or `None` when there is nothing to continue.
    fn handoff(&self, appear_id: &str, property: &str, frame: &Frameloop) -> Option<f64>;
}

/// Slot the current [`HandoffHooks`] implementation is installed in
#[derive(Clone, Default)]
pub struct HandoffDispatch {
    hooks: Rc<RefCell<Option<Rc<dyn HandoffHooks>>>>,
}

impl HandoffDispatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&self, hooks: Rc<dyn HandoffHooks>) {
        *self.hooks.borrow_mut() = Some(hooks);
    }

    pub fn uninstall(&self) {
        let hooks = self.hooks.borrow_mut().take();
        drop(hooks);
    }

    pub fn is_installed(&self) -> bool {
        self.hooks.borrow().is_some()
    }

    fn current(&self) -> Option<Rc<dyn HandoffHooks>> {
        self.hooks.borrow().clone()
    }
}

impl HandoffHooks for HandoffDispatch {
    fn has_optimized_animation(&self, appear_id: &str, property: Option<&str>) -> bool {
        self.current()
            .is_some_and(|hooks| hooks.has_optimized_animation(appear_id, property))
    }

    fn mark_complete(&self, appear_id: &str) {
        if let Some(hooks) = self.current() {
            hooks.mark_complete(appear_id);
        }
    }

    fn is_complete(&self, appear_id: &str) -> bool {
        self.current().is_some_and(|hooks| hooks.is_complete(appear_id))
    }

    fn cancel(&self, appear_id: &str, property: &str, mode: CancelMode) {
        if let Some(hooks) = self.current() {
            hooks.cancel(appear_id, property, mode);
        }
    }

    fn check_sync(
        &self,
        appear_id: &str,
        property: &str,
        value: &MotionValue,
        external: &MotionValue,
    ) -> Option<SubscriptionId> {
        self.current()
            .and_then(|hooks| hooks.check_sync(appear_id, property, value, external))
    }

    fn handoff(&self, appear_id: &str, property: &str, frame: &Frameloop) -> Option<f64> {
        self.current()
            .and_then(|hooks| hooks.handoff(appear_id, property, frame))
    }
}
