//! Scroll timeline tracking
//!
//! Scroll position of a container (optionally relative to a target inside
//! it) is turned into progress, which can drive callbacks, motion values or
//! animations in place of the frame clock.

mod info;
mod offsets;
mod timeline;
mod tracker;
mod values;

pub use info::{update_axis_info, Axis, AxisInfo, ScrollInfo};
pub use offsets::{preset, resolve_offsets, Edge, Intersection, ScrollOffset, Viewport, ALL, ANY, ENTER, EXIT};
pub use timeline::{
    FallbackTimeline, NativeScrollTimeline, NativeScrollTimelineFactory, ScrollSubscription, ScrollTimeline,
    ScrollTimelines,
};
pub use tracker::{ScrollHandlerId, ScrollNode, ScrollOptions, ScrollRegistry};
pub use values::{NodeRef, ScrollMotionValues};
