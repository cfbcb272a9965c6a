//! Unrolling `repeat` into explicit keyframes

use crate::easing::{self, Easing};
use motive_core::AnimValue;

/// One segment's keyframes after repetition has been unrolled
#[derive(Clone, Debug, PartialEq)]
pub struct Repeated {
    pub keyframes: Vec<Option<AnimValue>>,
    /// Offsets in `[0, 1]` across the whole repeated run
    pub times: Vec<f64>,
    /// One easing per keyframe
    pub easings: Vec<Easing>,
    /// Total duration in seconds
    pub duration: f64,
}

/// Concatenate `repeat` extra cycles of `keyframes`.
///
/// Every cycle contributes one entry per keyframe to each array. The
/// easing leaving the last keyframe of a cycle is linear when cycles are
/// back to back, and a hold when `repeat_delay` separates them, so the
/// value rests at the end of a cycle until the next one starts.
pub fn expand_repeat(
    keyframes: &[Option<AnimValue>],
    times: &[f64],
    easings: &[Easing],
    duration: f64,
    repeat: u32,
    repeat_delay: f64,
) -> Repeated {
    let cycles = repeat as usize + 1;
    let count = keyframes.len();
    let repeat_delay = repeat_delay.max(0.0);
    let total = duration * cycles as f64 + repeat_delay * repeat as f64;

    let boundary = if repeat_delay > 0.0 {
        Easing::Hold
    } else {
        Easing::Linear
    };
    let cycle_easings: Vec<Easing> = (0..count)
        .map(|i| {
            if i + 1 == count {
                boundary.clone()
            } else {
                easing::for_segment(easings, i)
            }
        })
        .collect();

    let mut repeated = Repeated {
        keyframes: Vec::with_capacity(count * cycles),
        times: Vec::with_capacity(count * cycles),
        easings: Vec::with_capacity(count * cycles),
        duration: total,
    };

    for cycle in 0..cycles {
        let cycle_start = cycle as f64 * (duration + repeat_delay);
        repeated.keyframes.extend_from_slice(keyframes);
        repeated.easings.extend(cycle_easings.iter().cloned());
        for time in times {
            let at = cycle_start + time * duration;
            repeated.times.push(if total > 0.0 { at / total } else { 0.0 });
        }
    }
    repeated
}
