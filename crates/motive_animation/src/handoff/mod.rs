//! Native appear animation handoff
//!
//! Per element property an appear animation moves through
//! `Priming -> Playing -> Complete`, with `Suspended` entered and left
//! across page transitions.

mod appear;
mod hooks;
mod store;

pub use appear::AppearStore;
pub use hooks::{CancelMode, HandoffDispatch, HandoffHooks};
pub use store::{appear_store_id, is_transform_property, AppearEvent, AppearState, TRANSFORM_PROPERTIES};
