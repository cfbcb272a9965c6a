//! Scroll-driven timelines
//!
//! A [`ScrollTimeline`] reports scroll progress the way platform scroll
//! timelines do: `current_time` as a percentage. Platforms without native
//! scroll timelines get a fallback fed by the [`ScrollRegistry`].

use super::info::{Axis, ScrollInfo};
use super::tracker::{ScrollHandlerId, ScrollNode, ScrollOptions, ScrollRegistry};
use crate::playback::Playback;
use motive_core::{Capabilities, Phase, ProcessId};
use rustc_hash::FxHashMap;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::debug;

/// A platform scroll timeline
pub trait NativeScrollTimeline {
    /// Scroll progress as a percentage, `None` while inactive
    fn current_time(&self) -> Option<f64>;
}

/// Creates platform scroll timelines
pub trait NativeScrollTimelineFactory {
    fn create(&self, container: &dyn ScrollNode, axis: Axis) -> Option<Rc<dyn NativeScrollTimeline>>;
}

/// Progress fed from scroll handlers
#[derive(Clone, Debug)]
pub struct FallbackTimeline {
    percent: Rc<Cell<Option<f64>>>,
    handler: ScrollHandlerId,
}

impl FallbackTimeline {
    pub fn handler(&self) -> ScrollHandlerId {
        self.handler
    }
}

/// Scroll progress source
#[derive(Clone)]
pub enum ScrollTimeline {
    Native(Rc<dyn NativeScrollTimeline>),
    Fallback(FallbackTimeline),
}

impl ScrollTimeline {
    /// Progress as a percentage, `None` before the first measurement
    pub fn current_time(&self) -> Option<f64> {
        match self {
            ScrollTimeline::Native(timeline) => timeline.current_time(),
            ScrollTimeline::Fallback(timeline) => timeline.percent.get(),
        }
    }

    /// Progress in `[0, 1]`
    pub fn progress(&self) -> f64 {
        self.current_time().map_or(0.0, |percent| percent / 100.0)
    }

    pub fn is_native(&self) -> bool {
        matches!(self, ScrollTimeline::Native(_))
    }
}

/// Cancels a scroll-driven callback or animation
#[must_use = "dropping the subscription leaves it running"]
pub struct ScrollSubscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl ScrollSubscription {
    fn new<F: FnOnce() + 'static>(cancel: F) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Stop receiving scroll updates. Safe to call once the subscription has
    /// nothing left to cancel.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

/// Timelines shared per `(container, axis)` plus scroll-linked playback
pub struct ScrollTimelines {
    registry: ScrollRegistry,
    native: Option<Rc<dyn NativeScrollTimelineFactory>>,
    cache: RefCell<FxHashMap<(String, Axis), ScrollTimeline>>,
}

impl ScrollTimelines {
    /// Native timelines are only created when `capabilities` allow them
    pub fn new(
        registry: ScrollRegistry,
        capabilities: &Capabilities,
        native: Option<Rc<dyn NativeScrollTimelineFactory>>,
    ) -> Self {
        Self {
            registry,
            native: native.filter(|_| capabilities.scroll_timeline),
            cache: RefCell::new(FxHashMap::default()),
        }
    }

    pub fn registry(&self) -> &ScrollRegistry {
        &self.registry
    }

    /// Timeline for `options`.
    ///
    /// Whole-container timelines are cached per container and axis and live
    /// until [`clear`](Self::clear). Timelines tracking a target or custom
    /// offsets are always software and created fresh on every call; the
    /// caller owns their scroll handler and must pass them to
    /// [`release_timeline`](Self::release_timeline) when done.
    pub fn get_timeline(&self, options: &ScrollOptions) -> ScrollTimeline {
        if options.target.is_some() || options.offset.is_some() {
            return self.fallback(options.clone());
        }
        let key = (options.container.id().to_string(), options.axis);
        if let Some(timeline) = self.cache.borrow().get(&key) {
            return timeline.clone();
        }

        let timeline = self
            .native
            .as_ref()
            .and_then(|factory| factory.create(options.container.as_ref(), options.axis))
            .map(ScrollTimeline::Native)
            .unwrap_or_else(|| self.fallback(options.clone()));
        debug!(container = %key.0, axis = ?key.1, native = timeline.is_native(), "scroll timeline created");
        self.cache.borrow_mut().insert(key, timeline.clone());
        timeline
    }

    /// Stop feeding a timeline returned by [`get_timeline`](Self::get_timeline).
    ///
    /// Cached and native timelines are left alone.
    pub fn release_timeline(&self, timeline: &ScrollTimeline) {
        if let Some(handler) = self.owned_handler(timeline) {
            self.registry.remove(handler);
        }
    }

    /// Handler of a fallback timeline that is not in the cache
    fn owned_handler(&self, timeline: &ScrollTimeline) -> Option<ScrollHandlerId> {
        let ScrollTimeline::Fallback(fallback) = timeline else {
            return None;
        };
        let cached = self.cache.borrow().values().any(|cached| {
            matches!(cached, ScrollTimeline::Fallback(other) if other.handler == fallback.handler)
        });
        (!cached).then_some(fallback.handler)
    }

    fn fallback(&self, options: ScrollOptions) -> ScrollTimeline {
        let percent = Rc::new(Cell::new(None));
        let sink = percent.clone();
        let axis = options.axis;
        let handler = self.registry.observe(options, move |info: &ScrollInfo| {
            sink.set(Some(info.axis(axis).progress * 100.0));
        });
        ScrollTimeline::Fallback(FallbackTimeline { percent, handler })
    }

    /// Call `on_progress` with `[0, 1]` progress whenever the timeline moves.
    ///
    /// Polls in the `update` phase every frame until cancelled.
    pub fn observe_timeline<F>(&self, timeline: &ScrollTimeline, mut on_progress: F) -> ProcessId
    where
        F: FnMut(f64) + 'static,
    {
        let timeline = timeline.clone();
        let mut previous: Option<f64> = None;
        self.registry.frame().schedule(
            Phase::Update,
            move |_| {
                let Some(percent) = timeline.current_time() else {
                    return;
                };
                if previous != Some(percent) {
                    on_progress(percent / 100.0);
                }
                previous = Some(percent);
            },
            true,
            false,
        )
    }

    /// Call `on_scroll` with progress along `options.axis` on every scroll
    pub fn scroll_callback<F>(&self, options: ScrollOptions, mut on_scroll: F) -> ScrollSubscription
    where
        F: FnMut(f64, &ScrollInfo) + 'static,
    {
        let axis = options.axis;
        let id = self
            .registry
            .observe(options, move |info| on_scroll(info.axis(axis).progress, info));
        let registry = self.registry.clone();
        ScrollSubscription::new(move || registry.remove(id))
    }

    /// Drive `animation` by scroll.
    ///
    /// Animations that accept a native timeline are handed over to it.
    /// Everything else is paused and scrubbed to `duration * progress` on
    /// every update.
    pub fn scroll_animation(&self, animation: Rc<dyn Playback>, options: &ScrollOptions) -> ScrollSubscription {
        let timeline = self.get_timeline(options);
        if timeline.is_native() && animation.attach_timeline(&timeline) {
            debug!("animation attached to native scroll timeline");
            return ScrollSubscription::new(move || animation.stop());
        }

        animation.pause();
        let scrubbed = animation.clone();
        let process = self.observe_timeline(&timeline, move |progress| {
            scrubbed.set_time(scrubbed.duration() * progress);
        });
        let frame = self.registry.frame().clone();
        let fallback = self.owned_handler(&timeline);
        let registry = self.registry.clone();
        ScrollSubscription::new(move || {
            frame.cancel(process);
            if let Some(handler) = fallback {
                registry.remove(handler);
            }
        })
    }

    /// Drop cached timelines and their scroll handlers
    pub fn clear(&self) {
        let cached: Vec<ScrollTimeline> = self.cache.borrow_mut().drain().map(|(_, timeline)| timeline).collect();
        for timeline in cached {
            if let ScrollTimeline::Fallback(fallback) = timeline {
                self.registry.remove(fallback.handler);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::PlayState;
    use crate::scroll::offsets::Viewport;
    use motive_core::{Frameloop, ManualClock, MotionConfig};

    struct Page {
        scroll_top: Cell<f64>,
    }

    impl ScrollNode for Page {
        fn id(&self) -> &str {
            "page"
        }
        fn scroll_position(&self) -> (f64, f64) {
            (0.0, self.scroll_top.get())
        }
        fn scroll_size(&self) -> (f64, f64) {
            (800.0, 2000.0)
        }
        fn client_size(&self) -> (f64, f64) {
            (800.0, 1000.0)
        }
        fn offset_within(&self, _container: &dyn ScrollNode) -> (f64, f64) {
            (0.0, 0.0)
        }
    }

    struct Platform;

    struct FixedTimeline;

    impl NativeScrollTimeline for FixedTimeline {
        fn current_time(&self) -> Option<f64> {
            Some(25.0)
        }
    }

    impl NativeScrollTimelineFactory for Platform {
        fn create(&self, _container: &dyn ScrollNode, _axis: Axis) -> Option<Rc<dyn NativeScrollTimeline>> {
            Some(Rc::new(FixedTimeline))
        }
    }

    #[derive(Default)]
    struct Scrubbed {
        time: Cell<f64>,
        state: Cell<PlayState>,
    }

    impl Playback for Scrubbed {
        fn time(&self) -> f64 {
            self.time.get()
        }
        fn set_time(&self, seconds: f64) {
            self.time.set(seconds);
        }
        fn duration(&self) -> f64 {
            2.0
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
        fn complete(&self) {}
        fn cancel(&self) {}
        fn on_finish(&self, _callback: Box<dyn FnOnce()>) {}
    }

    fn setup(capabilities: Capabilities, native: Option<Rc<dyn NativeScrollTimelineFactory>>) -> (ScrollTimelines, Frameloop) {
        let config = MotionConfig::default();
        let frame = Frameloop::new(Rc::new(ManualClock::new(0.0)), &config);
        let registry = ScrollRegistry::new(&frame, &config, Viewport::default());
        (ScrollTimelines::new(registry, &capabilities, native), frame)
    }

    #[test]
    fn test_timelines_are_cached_per_container_and_axis() {
        let (timelines, _frame) = setup(Capabilities::software(), None);
        let page: Rc<dyn ScrollNode> = Rc::new(Page {
            scroll_top: Cell::new(0.0),
        });
        let a = timelines.get_timeline(&ScrollOptions::new(page.clone()));
        let _b = timelines.get_timeline(&ScrollOptions::new(page.clone()));
        let _x = timelines.get_timeline(&ScrollOptions::new(page).with_axis(Axis::X));
        assert!(!a.is_native());
        assert_eq!(timelines.registry().handler_count(), 2);

        timelines.clear();
        assert_eq!(timelines.registry().handler_count(), 0);
    }

    #[test]
    fn test_offset_timelines_are_released_by_caller() {
        let (timelines, _frame) = setup(Capabilities::software(), None);
        let page: Rc<dyn ScrollNode> = Rc::new(Page {
            scroll_top: Cell::new(0.0),
        });
        let whole = timelines.get_timeline(&ScrollOptions::new(page.clone()));
        let options = ScrollOptions::new(page).with_offset(crate::scroll::offsets::ALL.to_vec());
        let first = timelines.get_timeline(&options);
        let second = timelines.get_timeline(&options);
        assert_eq!(timelines.registry().handler_count(), 3);

        timelines.release_timeline(&first);
        timelines.release_timeline(&second);
        assert_eq!(timelines.registry().handler_count(), 1);

        // Cached timelines stay registered until cleared
        timelines.release_timeline(&whole);
        assert_eq!(timelines.registry().handler_count(), 1);
        timelines.clear();
        assert_eq!(timelines.registry().handler_count(), 0);
    }

    #[test]
    fn test_native_factory_needs_capability() {
        let page: Rc<dyn ScrollNode> = Rc::new(Page {
            scroll_top: Cell::new(0.0),
        });
        let (software, _) = setup(Capabilities::software(), Some(Rc::new(Platform)));
        assert!(!software.get_timeline(&ScrollOptions::new(page.clone())).is_native());

        let capabilities = Capabilities {
            scroll_timeline: true,
            ..Capabilities::default()
        };
        let (native, _) = setup(capabilities, Some(Rc::new(Platform)));
        let timeline = native.get_timeline(&ScrollOptions::new(page));
        assert!(timeline.is_native());
        assert_eq!(timeline.progress(), 0.25);
    }

    #[test]
    fn test_scroll_animation_scrubs_in_software() {
        let (timelines, frame) = setup(Capabilities::software(), None);
        let page = Rc::new(Page {
            scroll_top: Cell::new(500.0),
        });
        let animation = Rc::new(Scrubbed::default());
        animation.play();
        let subscription = timelines.scroll_animation(animation.clone(), &ScrollOptions::new(page.clone()));
        assert_eq!(animation.state(), PlayState::Paused);

        frame.process_frame(16.0);
        frame.process_frame(32.0);
        assert_eq!(animation.time(), 1.0);

        page.scroll_top.set(1000.0);
        timelines.registry().notify_scroll("page");
        frame.process_frame(48.0);
        frame.process_frame(64.0);
        assert_eq!(animation.time(), 2.0);

        subscription.cancel();
        page.scroll_top.set(0.0);
        timelines.registry().notify_scroll("page");
        frame.process_frame(80.0);
        frame.process_frame(96.0);
        assert_eq!(animation.time(), 2.0);
    }
}
