//! Scroll position and progress as motion values

use super::offsets::ScrollOffset;
use super::tracker::{ScrollHandlerId, ScrollNode, ScrollOptions, ScrollRegistry};
use motive_core::{Frameloop, MotionValue};
use std::rc::Rc;
use tracing::warn;

/// A host node that may not be laid out yet
#[derive(Clone)]
pub enum NodeRef {
    Attached(Rc<dyn ScrollNode>),
    /// Requested but not mounted
    Detached,
}

/// Scroll position and progress of a container, updated on every scroll
pub struct ScrollMotionValues {
    pub scroll_x: MotionValue,
    pub scroll_y: MotionValue,
    pub scroll_x_progress: MotionValue,
    pub scroll_y_progress: MotionValue,
    handler: Option<ScrollHandlerId>,
}

impl ScrollMotionValues {
    /// Track `container`, optionally relative to `target`.
    ///
    /// A detached container or target is logged and leaves the values inert
    /// at zero.
    pub fn track(
        registry: &ScrollRegistry,
        frame: &Frameloop,
        container: NodeRef,
        target: Option<NodeRef>,
        offset: Option<ScrollOffset>,
    ) -> Self {
        let mut values = Self {
            scroll_x: MotionValue::new(frame, 0.0),
            scroll_y: MotionValue::new(frame, 0.0),
            scroll_x_progress: MotionValue::new(frame, 0.0),
            scroll_y_progress: MotionValue::new(frame, 0.0),
            handler: None,
        };

        let NodeRef::Attached(container) = container else {
            warn!("scroll container is not mounted, scroll values stay at 0");
            return values;
        };
        let target = match target {
            Some(NodeRef::Attached(target)) => Some(target),
            Some(NodeRef::Detached) => {
                warn!(container = container.id(), "scroll target is not mounted, scroll values stay at 0");
                return values;
            }
            None => None,
        };

        let mut options = ScrollOptions::new(container);
        options.target = target;
        options.offset = offset;

        let (x, y) = (values.scroll_x.clone(), values.scroll_y.clone());
        let (x_progress, y_progress) = (values.scroll_x_progress.clone(), values.scroll_y_progress.clone());
        values.handler = Some(registry.observe(options, move |info| {
            x.set(info.x.current);
            x_progress.set(info.x.progress);
            y.set(info.y.current);
            y_progress.set(info.y.progress);
        }));
        values
    }

    pub fn is_tracking(&self) -> bool {
        self.handler.is_some()
    }

    /// Stop tracking; the values keep their last state
    pub fn detach(&mut self, registry: &ScrollRegistry) {
        if let Some(handler) = self.handler.take() {
            registry.remove(handler);
        }
    }
}
