//! Keyframe offset and wildcard helpers

use motive_core::math::{mix, progress};
use motive_core::AnimValue;

/// Append `remaining` offsets evenly spaced between the last offset and 1
pub fn fill_offset(offset: &mut Vec<f64>, remaining: usize) {
    let min = offset.last().copied().unwrap_or(0.0);
    for i in 1..=remaining {
        let offset_progress = progress(0.0, remaining as f64, i as f64);
        offset.push(mix(min, 1.0, offset_progress));
    }
}

/// Evenly spaced offsets in `[0, 1]`, one per item
pub fn default_offset<T>(items: &[T]) -> Vec<f64> {
    let mut offset = vec![0.0];
    fill_offset(&mut offset, items.len().saturating_sub(1));
    offset
}

/// Replace `None` keyframes after the first with the preceding value.
///
/// A leading `None` is left for the caller to resolve, typically by reading
/// the live value.
pub fn fill_wildcards(keyframes: &mut [Option<AnimValue>]) {
    for i in 1..keyframes.len() {
        if keyframes[i].is_none() {
            keyframes[i] = keyframes[i - 1].clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_offset() {
        assert_eq!(default_offset(&[0; 1]), vec![0.0]);
        assert_eq!(default_offset(&[0; 2]), vec![0.0, 1.0]);
        assert_eq!(default_offset(&[0; 5]), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_fill_offset_from_partial() {
        let mut offset = vec![0.0, 0.5];
        fill_offset(&mut offset, 2);
        assert_eq!(offset, vec![0.0, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_fill_wildcards() {
        let mut keyframes = vec![None, Some(AnimValue::from(1.0)), None, Some(AnimValue::from(3.0)), None];
        fill_wildcards(&mut keyframes);
        assert_eq!(
            keyframes,
            vec![
                None,
                Some(1.0.into()),
                Some(1.0.into()),
                Some(3.0.into()),
                Some(3.0.into())
            ]
        );
    }
}
