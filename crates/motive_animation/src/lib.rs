//! Motive Animation System
//!
//! Generators, keyframe sequences, scroll timelines and native handoff on
//! top of the `motive_core` frame scheduler.
//!
//! # Features
//!
//! - **Generators**: spring, inertia and keyframe generators sampled by time
//! - **Generator Easing**: physical generators baked into duration plus easing
//! - **Sequences**: timeline authoring resolved into per-property keyframes
//! - **Scroll Timelines**: scroll progress as a clock for animations
//! - **Native Handoff**: picking up accelerated appear animations mid-flight
//!
//! # Example
//!
//! ```rust
//! use motive_animation::{animate_sequence, MotionContext, Segment, SequenceOptions, Transition};
//! use motive_core::{ManualClock, MotionValue};
//! use std::rc::Rc;
//!
//! let clock = Rc::new(ManualClock::new(0.0));
//! let context = MotionContext::builder().clock(clock).init().unwrap();
//! let x = MotionValue::new(context.frame(), 0.0);
//!
//! let segments = vec![Segment::value(
//!     &x,
//!     vec![Some(0.0.into()), Some(100.0.into())],
//!     Transition::new().with_duration(1.0),
//! )];
//! let group = animate_sequence(&context, &segments, SequenceOptions::default()).unwrap();
//! assert_eq!(group.len(), 1);
//! ```

pub mod context;
pub mod driver;
pub mod easing;
pub mod element;
pub mod error;
pub mod generator_easing;
pub mod generators;
pub mod handoff;
pub mod interpolate;
pub mod keyframes;
pub mod native;
pub mod playback;
pub mod realize;
pub mod scroll;
pub mod sequence;
pub mod transition;

pub use context::{MotionContext, MotionContextBuilder};
pub use driver::ValueAnimation;
pub use easing::Easing;
pub use element::{ElementRegistry, VisualElement};
pub use error::{AnimationError, Result};
pub use generator_easing::{create_generator_easing, GeneratorEasing};
pub use generators::{Generator, GeneratorFactory, GeneratorKind, GeneratorOptions, GeneratorState};
pub use handoff::{AppearStore, CancelMode, HandoffDispatch, HandoffHooks};
pub use native::{NativeAnimation, NativeAnimator, NativeKeyframeOptions, NativePlayback};
pub use playback::{GroupPlayback, PlayState, Playback};
pub use realize::{animate_element_property, animate_sequence, animate_value, realize};
pub use scroll::{ScrollInfo, ScrollOptions, ScrollRegistry, ScrollTimeline, ScrollTimelines};
pub use sequence::{At, Segment, SequenceBuilder, SequenceDefinition, SequenceOptions, SubjectKey};
pub use transition::{Transition, TransitionType};
