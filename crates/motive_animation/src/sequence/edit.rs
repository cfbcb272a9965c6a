//! Editing per-property keyframe timelines

use crate::easing::{self, Easing};
use motive_core::math::mix;
use motive_core::AnimValue;
use serde::Serialize;
use std::cmp::Ordering;

/// A keyframe placed on the absolute sequence timeline
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimedKeyframe {
    /// `None` inherits the previous value, or releases the property when last
    pub value: Option<AnimValue>,
    /// Absolute time in seconds
    pub at: f64,
    /// Easing of the segment leaving this keyframe
    pub easing: Easing,
}

/// Remove every keyframe strictly between `start` and `end`
pub fn erase_keyframes(sequence: &mut Vec<TimedKeyframe>, start: f64, end: f64) {
    sequence.retain(|keyframe| !(keyframe.at > start && keyframe.at < end));
}

/// Place `keyframes` between `start` and `end`, replacing anything they overlap.
///
/// `offsets` are in `[0, 1]` and `easings` wrap per keyframe.
pub fn add_keyframes(
    sequence: &mut Vec<TimedKeyframe>,
    keyframes: &[Option<AnimValue>],
    easings: &[Easing],
    offsets: &[f64],
    start: f64,
    end: f64,
) {
    erase_keyframes(sequence, start, end);
    for (i, value) in keyframes.iter().enumerate() {
        sequence.push(TimedKeyframe {
            value: value.clone(),
            at: mix(start, end, offsets[i]),
            easing: easing::for_segment(easings, i),
        });
    }
}

/// Order by time; at equal times `None` values sort last
pub fn compare_by_time(a: &TimedKeyframe, b: &TimedKeyframe) -> Ordering {
    if a.at == b.at {
        match (&a.value, &b.value) {
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            _ => Ordering::Equal,
        }
    } else {
        a.at.total_cmp(&b.at)
    }
}
