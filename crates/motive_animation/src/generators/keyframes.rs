//! Duration-based tween through a list of keyframes

use super::{Generator, GeneratorState};
use crate::easing::Easing;
use crate::interpolate::Interpolator;
use crate::keyframes::default_offset;
use motive_core::AnimValue;

/// Tweens through `keyframes` over a fixed duration
#[derive(Clone, Debug)]
pub struct KeyframesGenerator {
    interpolator: Interpolator<AnimValue>,
    duration_ms: f64,
}

impl KeyframesGenerator {
    /// `times` are offsets in `[0, 1]` and default to even spacing.
    /// `ease` holds one easing per segment, or a single easing for all;
    /// it defaults to `easeInOut`.
    pub fn new(keyframes: Vec<AnimValue>, times: Option<&[f64]>, ease: &[Easing], duration_ms: f64) -> Self {
        let offsets = match times {
            Some(times) if times.len() == keyframes.len() => times.to_vec(),
            _ => default_offset(&keyframes),
        };
        let absolute: Vec<f64> = offsets.iter().map(|o| o * duration_ms).collect();
        let easings = if ease.is_empty() {
            vec![Easing::EaseInOut]
        } else {
            ease.to_vec()
        };
        Self {
            interpolator: Interpolator::new(&absolute, &keyframes, true, &easings),
            duration_ms,
        }
    }
}

impl Generator for KeyframesGenerator {
    fn next(&mut self, t: f64) -> GeneratorState {
        GeneratorState {
            value: self.interpolator.sample(t).unwrap_or_default(),
            done: t >= self.duration_ms,
        }
    }

    fn calculated_duration(&self) -> Option<f64> {
        Some(self.duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_tween() {
        let mut tween = KeyframesGenerator::new(vec![0.0.into(), 100.0.into()], None, &[Easing::Linear], 1000.0);
        assert_eq!(tween.next(0.0).value, AnimValue::Number(0.0));
        assert_eq!(tween.next(250.0).value, AnimValue::Number(25.0));
        let end = tween.next(1000.0);
        assert!(end.done);
        assert_eq!(end.value, AnimValue::Number(100.0));
    }

    #[test]
    fn test_custom_times() {
        let mut tween = KeyframesGenerator::new(
            vec![0.0.into(), 50.0.into(), 100.0.into()],
            Some(&[0.0, 0.8, 1.0]),
            &[Easing::Linear],
            1000.0,
        );
        assert_eq!(tween.next(400.0).value, AnimValue::Number(25.0));
        assert_eq!(tween.next(900.0).value, AnimValue::Number(75.0));
    }

    #[test]
    fn test_default_ease_is_symmetric() {
        let mut tween = KeyframesGenerator::new(vec![0.0.into(), 1.0.into()], None, &[], 100.0);
        let mid = tween.next(50.0).value.as_number().unwrap_or(0.0);
        assert!((mid - 0.5).abs() < 1e-3);
    }
}
