//! Live scroll metrics per axis

use motive_core::math::{clamp, progress, velocity_per_second};
use serde::{Deserialize, Serialize};

/// Scroll axis
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    #[default]
    Y,
}

/// Metrics of one scroll axis. Lengths and positions are in pixels.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisInfo {
    /// Scroll position
    pub current: f64,
    /// Scroll positions mapped to the progress breakpoints
    pub offset: Vec<f64>,
    /// Normalised progress in `[0, 1]`
    pub progress: f64,
    /// Scrollable distance, content length minus viewport length
    pub scroll_length: f64,
    /// Distance from the container origin to the target
    pub target_offset: f64,
    pub target_length: f64,
    pub container_length: f64,
    /// Pixels per second
    pub velocity: f64,
}

/// Scroll metrics of a container, for both axes
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ScrollInfo {
    /// Timestamp of the last update, in milliseconds
    pub time: f64,
    pub x: AxisInfo,
    pub y: AxisInfo,
}

impl ScrollInfo {
    pub fn axis(&self, axis: Axis) -> &AxisInfo {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
        }
    }

    pub fn axis_mut(&mut self, axis: Axis) -> &mut AxisInfo {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
        }
    }
}

/// Record a new scroll sample on `info`.
///
/// `elapsed_ms` is the time since the previous sample. Samples further
/// apart than `stale_ms` report zero velocity. Progress is clamped to
/// `[0, 1]` so overscroll never leaves the range.
pub fn update_axis_info(info: &mut AxisInfo, current: f64, scroll_length: f64, elapsed_ms: f64, stale_ms: f64) {
    let prev = info.current;
    info.current = current;
    info.scroll_length = scroll_length;

    info.offset.clear();
    info.offset.push(0.0);
    info.offset.push(scroll_length);
    info.progress = clamp(0.0, 1.0, progress(0.0, scroll_length, current));

    info.velocity = if elapsed_ms > stale_ms {
        0.0
    } else {
        velocity_per_second(current - prev, elapsed_ms)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_and_velocity() {
        let mut info = AxisInfo::default();
        update_axis_info(&mut info, 500.0, 1000.0, 16.0, 50.0);
        assert_eq!(info.progress, 0.5);
        assert_eq!(info.offset, vec![0.0, 1000.0]);
        assert_eq!(info.velocity, 500.0 * 1000.0 / 16.0);
    }

    #[test]
    fn test_overscroll_progress_is_clamped() {
        let mut info = AxisInfo::default();
        update_axis_info(&mut info, 960.0, 800.0, 16.0, 50.0);
        assert_eq!(info.progress, 1.0);
        assert_eq!(info.current, 960.0);
        update_axis_info(&mut info, -80.0, 800.0, 16.0, 50.0);
        assert_eq!(info.progress, 0.0);
    }

    #[test]
    fn test_stale_sample_has_no_velocity() {
        let mut info = AxisInfo::default();
        update_axis_info(&mut info, 100.0, 1000.0, 16.0, 50.0);
        update_axis_info(&mut info, 300.0, 1000.0, 51.0, 50.0);
        assert_eq!(info.velocity, 0.0);
        update_axis_info(&mut info, 400.0, 1000.0, 50.0, 50.0);
        assert_eq!(info.velocity, 2000.0);
    }
}
