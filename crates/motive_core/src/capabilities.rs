//! Platform capability detection
//!
//! Capabilities are probed once when the motion context is created and then
//! threaded through as plain configuration. Missing capabilities are never
//! an error: each subsystem falls back to a software path.

use serde::{Deserialize, Serialize};

/// Questions the host platform answers once at startup
pub trait PlatformProbe {
    /// Native time-based animations can be started on elements
    fn native_animations(&self) -> bool;
    /// Native scroll-linked timelines exist
    fn scroll_timeline(&self) -> bool;
    /// Native animations accept keyframe lists with an implicit first value
    fn partial_keyframes(&self) -> bool {
        false
    }
    /// Native animations understand `linear()` easing stops
    fn linear_easing(&self) -> bool {
        false
    }
}

/// Result of probing the platform
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub native_animations: bool,
    pub scroll_timeline: bool,
    pub partial_keyframes: bool,
    pub linear_easing: bool,
}

impl Capabilities {
    /// Probe every capability once
    pub fn detect(probe: &dyn PlatformProbe) -> Self {
        let caps = Self {
            native_animations: probe.native_animations(),
            scroll_timeline: probe.scroll_timeline(),
            partial_keyframes: probe.partial_keyframes(),
            linear_easing: probe.linear_easing(),
        };
        tracing::debug!(?caps, "platform capabilities detected");
        caps
    }

    /// Headless platform: everything runs in software
    pub fn software() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingProbe {
        calls: Cell<u32>,
    }

    impl PlatformProbe for CountingProbe {
        fn native_animations(&self) -> bool {
            self.calls.set(self.calls.get() + 1);
            true
        }

        fn scroll_timeline(&self) -> bool {
            self.calls.set(self.calls.get() + 1);
            false
        }
    }

    #[test]
    fn test_detect_probes_once() {
        let probe = CountingProbe { calls: Cell::new(0) };
        let caps = Capabilities::detect(&probe);
        assert!(caps.native_animations);
        assert!(!caps.scroll_timeline);
        assert!(!caps.linear_easing);
        assert_eq!(probe.calls.get(), 2);
    }
}
