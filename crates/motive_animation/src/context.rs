//! Process-wide motion context
//!
//! Everything that would otherwise be global state lives here: the frame
//! scheduler, the scroll listener registry, the appear animation store and
//! the handoff hooks. Create one [`MotionContext`] at startup with
//! [`MotionContext::builder`] and call [`MotionContext::teardown`] when the
//! host shuts down.

use crate::element::ElementRegistry;
use crate::generators::GeneratorFactory;
use crate::handoff::{AppearStore, HandoffDispatch};
use crate::native::NativeAnimator;
use crate::scroll::{NativeScrollTimelineFactory, ScrollRegistry, ScrollTimelines, Viewport};
use motive_core::{Capabilities, Clock, Frameloop, MotionConfig, PlatformProbe, SystemClock};
use rustc_hash::FxHashMap;
use std::rc::Rc;
use tracing::info;

/// Collects what a [`MotionContext`] needs before it is created
pub struct MotionContextBuilder {
    config: MotionConfig,
    clock: Option<Rc<dyn Clock>>,
    capabilities: Capabilities,
    animator: Option<Rc<dyn NativeAnimator>>,
    scroll_timelines: Option<Rc<dyn NativeScrollTimelineFactory>>,
    viewport: Viewport,
    generators: FxHashMap<String, GeneratorFactory>,
}

impl MotionContextBuilder {
    pub fn config(mut self, config: MotionConfig) -> Self {
        self.config = config;
        self
    }

    /// Time source of the frame scheduler; the system clock by default
    pub fn clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Probe the platform once for its capabilities
    pub fn probe(mut self, probe: &dyn PlatformProbe) -> Self {
        self.capabilities = Capabilities::detect(probe);
        self
    }

    pub fn capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn animator(mut self, animator: Rc<dyn NativeAnimator>) -> Self {
        self.animator = Some(animator);
        self
    }

    pub fn scroll_timelines(mut self, factory: Rc<dyn NativeScrollTimelineFactory>) -> Self {
        self.scroll_timelines = Some(factory);
        self
    }

    pub fn viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    /// Make a custom generator available to sequences as `type: "<name>"`
    pub fn generator(mut self, name: impl Into<String>, factory: GeneratorFactory) -> Self {
        self.generators.insert(name.into(), factory);
        self
    }

    /// Validate the configuration and create the context
    pub fn init(self) -> motive_core::Result<MotionContext> {
        self.config.validate()?;
        let clock = self.clock.unwrap_or_else(|| Rc::new(SystemClock::new()));
        let frame = Frameloop::new(clock, &self.config);
        let capabilities = self.capabilities;
        let animator = self.animator.filter(|_| capabilities.native_animations);

        let registry = ScrollRegistry::new(&frame, &self.config, self.viewport);
        let scroll = ScrollTimelines::new(registry, &capabilities, self.scroll_timelines);
        let hooks = HandoffDispatch::new();
        let appear = AppearStore::new(&frame, &self.config, &capabilities, animator.clone(), hooks.clone());
        let elements = ElementRegistry::new(&frame, &self.config);

        info!(?capabilities, "motion context initialised");
        Ok(MotionContext {
            config: self.config,
            capabilities,
            frame,
            scroll,
            appear,
            hooks,
            elements,
            animator,
            generators: self.generators,
        })
    }
}

/// Shared engine state, passed to every subsystem explicitly
pub struct MotionContext {
    config: MotionConfig,
    capabilities: Capabilities,
    frame: Frameloop,
    scroll: ScrollTimelines,
    appear: AppearStore,
    hooks: HandoffDispatch,
    elements: ElementRegistry,
    animator: Option<Rc<dyn NativeAnimator>>,
    generators: FxHashMap<String, GeneratorFactory>,
}

impl MotionContext {
    pub fn builder() -> MotionContextBuilder {
        MotionContextBuilder {
            config: MotionConfig::default(),
            clock: None,
            capabilities: Capabilities::software(),
            animator: None,
            scroll_timelines: None,
            viewport: Viewport::default(),
            generators: FxHashMap::default(),
        }
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn frame(&self) -> &Frameloop {
        &self.frame
    }

    pub fn scroll(&self) -> &ScrollTimelines {
        &self.scroll
    }

    pub fn scroll_registry(&self) -> &ScrollRegistry {
        self.scroll.registry()
    }

    pub fn appear(&self) -> &AppearStore {
        &self.appear
    }

    pub fn hooks(&self) -> &HandoffDispatch {
        &self.hooks
    }

    pub fn elements(&self) -> &ElementRegistry {
        &self.elements
    }

    /// Native animator, present only when the platform supports native
    /// animations
    pub fn animator(&self) -> Option<&Rc<dyn NativeAnimator>> {
        self.animator.as_ref()
    }

    pub fn generators(&self) -> &FxHashMap<String, GeneratorFactory> {
        &self.generators
    }

    /// The engine has mounted: later appear animations are skipped
    pub fn mark_mounted(&self) {
        self.appear.set_mounted(true);
    }

    /// Cancel everything and drop every listener, element and process
    pub fn teardown(&self) {
        self.scroll.clear();
        self.appear.clear();
        self.hooks.uninstall();
        self.elements.clear();
        self.frame.clear();
        info!("motion context torn down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motive_core::ManualClock;

    struct Browser;

    impl PlatformProbe for Browser {
        fn native_animations(&self) -> bool {
            true
        }
        fn scroll_timeline(&self) -> bool {
            false
        }
        fn linear_easing(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_probe_feeds_capabilities() {
        let context = MotionContext::builder()
            .clock(Rc::new(ManualClock::new(0.0)))
            .probe(&Browser)
            .init()
            .unwrap();
        assert!(context.capabilities().native_animations);
        assert!(context.capabilities().linear_easing);
        assert!(!context.capabilities().scroll_timeline);
        assert!(context.animator().is_none());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = MotionConfig {
            generator_time_step_ms: 0.0,
            ..MotionConfig::default()
        };
        assert!(MotionContext::builder().config(config).init().is_err());
    }

    #[test]
    fn test_teardown_drops_processes() {
        let context = MotionContext::builder()
            .clock(Rc::new(ManualClock::new(0.0)))
            .init()
            .unwrap();
        context.frame().update(|_| {});
        assert_eq!(context.frame().process_count(), 1);
        context.teardown();
        assert_eq!(context.frame().process_count(), 0);
    }
}
