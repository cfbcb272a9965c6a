//! Motive Core Runtime
//!
//! This crate provides the foundational primitives for the Motive animation
//! engine:
//!
//! - **Frame Scheduler**: phase-ordered callbacks flushed once per display refresh
//! - **Motion Values**: observable values with velocity tracking
//! - **State Machines**: typed flat state machines for animation lifecycles
//! - **Capabilities & Config**: probed platform features and engine tunables
//!
//! # Example
//!
//! ```rust
//! use motive_core::{Frameloop, ManualClock, MotionConfig, MotionValue, Phase};
//! use std::rc::Rc;
//!
//! let clock = Rc::new(ManualClock::new(0.0));
//! let frame = Frameloop::new(clock, &MotionConfig::default());
//! let x = MotionValue::new(&frame, 0.0);
//!
//! let target = x.clone();
//! frame.schedule(Phase::Update, move |_| target.set(100.0), false, false);
//! frame.process_frame(16.0);
//!
//! assert_eq!(x.get_number(), Some(100.0));
//! ```

pub mod capabilities;
pub mod config;
pub mod error;
pub mod frameloop;
pub mod fsm;
pub mod math;
pub mod value;

pub use capabilities::{Capabilities, PlatformProbe};
pub use config::MotionConfig;
pub use error::{MotionError, Result};
pub use frameloop::{Clock, FrameData, Frameloop, ManualClock, Phase, ProcessId, SystemClock};
pub use fsm::{StateMachine, Transition};
pub use value::{AnimValue, AnimationHandle, MotionEvent, MotionValue, MotionValueId, SubscriptionId};
