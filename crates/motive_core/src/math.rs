//! Small numeric helpers shared by every subsystem

/// Progress of `value` between `from` and `to`.
///
/// Returns `1.0` when the range is empty.
#[inline]
pub fn progress(from: f64, to: f64, value: f64) -> f64 {
    let range = to - from;
    if range == 0.0 {
        1.0
    } else {
        (value - from) / range
    }
}

/// Linear mix between `from` and `to`
#[inline]
pub fn mix(from: f64, to: f64, progress: f64) -> f64 {
    from + (to - from) * progress
}

#[inline]
pub fn clamp(min: f64, max: f64, value: f64) -> f64 {
    value.max(min).min(max)
}

/// Wrap `value` into `[min, max)`
#[inline]
pub fn wrap(min: f64, max: f64, value: f64) -> f64 {
    let size = max - min;
    (((value - min) % size) + size) % size + min
}

/// Wrap an index into `0..len`
#[inline]
pub fn wrap_index(len: usize, index: usize) -> usize {
    if len == 0 {
        0
    } else {
        index % len
    }
}

/// Convert a per-frame delta into a per-second velocity
#[inline]
pub fn velocity_per_second(delta: f64, frame_duration_ms: f64) -> f64 {
    if frame_duration_ms != 0.0 {
        delta * (1000.0 / frame_duration_ms)
    } else {
        0.0
    }
}

#[inline]
pub fn seconds_to_ms(seconds: f64) -> f64 {
    seconds * 1000.0
}

#[inline]
pub fn ms_to_seconds(ms: f64) -> f64 {
    ms / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_empty_range() {
        assert_eq!(progress(5.0, 5.0, 7.0), 1.0);
        assert_eq!(progress(0.0, 10.0, 2.5), 0.25);
    }

    #[test]
    fn test_wrap_negative() {
        assert_eq!(wrap(0.0, 3.0, -1.0), 2.0);
        assert_eq!(wrap(0.0, 3.0, 4.0), 1.0);
    }

    #[test]
    fn test_velocity_zero_duration() {
        assert_eq!(velocity_per_second(10.0, 0.0), 0.0);
        assert_eq!(velocity_per_second(10.0, 100.0), 100.0);
    }
}
