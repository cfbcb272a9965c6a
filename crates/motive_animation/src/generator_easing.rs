//! Generator easing adapter
//!
//! Native timelines cannot run a physics simulation, but they can follow an
//! arbitrary easing curve. This module samples a generator once over
//! `[0, scale]` and exposes the result as a progress easing plus the
//! duration the generator takes to settle.

use crate::easing::Easing;
use crate::error::Result;
use crate::generators::{
    calc_generator_duration, create_generator, Generator, GeneratorKind, GeneratorOptions,
};
use motive_core::math::ms_to_seconds;
use motive_core::MotionConfig;
use std::cell::RefCell;
use tracing::trace;

/// A generator flattened into a tween
#[derive(Clone, Debug)]
pub struct GeneratorEasing {
    pub ease: Easing,
    /// Settling time in seconds, capped at the configured maximum
    pub duration: f64,
}

/// Flatten a generator into an easing curve.
///
/// `create` is called once with `options` whose keyframes are replaced by
/// `[0, scale]`. A zero `scale` falls back to the configured default so the
/// curve stays finite.
pub fn create_generator_easing<F>(
    options: &GeneratorOptions,
    scale: f64,
    config: &MotionConfig,
    create: F,
) -> Result<GeneratorEasing>
where
    F: FnOnce(&GeneratorOptions) -> Result<Box<dyn Generator>>,
{
    let scale = if scale == 0.0 || !scale.is_finite() {
        config.generator_easing_scale
    } else {
        scale
    };

    let mut generator = create(&GeneratorOptions {
        keyframes: vec![0.0.into(), scale.into()],
        ..options.clone()
    })?;

    let duration_ms = calc_generator_duration(
        generator.as_mut(),
        config.generator_time_step_ms,
        config.max_generator_duration_ms,
    )
    .min(config.max_generator_duration_ms);
    trace!(duration_ms, scale, "generator easing");

    let generator = RefCell::new(generator);
    let ease = Easing::custom(move |progress| {
        let state = generator.borrow_mut().next(duration_ms * progress);
        state.value.as_number().unwrap_or(0.0) / scale
    });

    Ok(GeneratorEasing {
        ease,
        duration: ms_to_seconds(duration_ms),
    })
}

/// Flatten one of the built-in generators
pub fn builtin_generator_easing(
    kind: GeneratorKind,
    options: &GeneratorOptions,
    scale: f64,
    config: &MotionConfig,
) -> Result<GeneratorEasing> {
    create_generator_easing(options, scale, config, |options| create_generator(kind, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::{GeneratorState, SpringOptions};

    #[test]
    fn test_spring_easing_endpoints() {
        let config = MotionConfig::default();
        let easing =
            builtin_generator_easing(GeneratorKind::Spring, &GeneratorOptions::default(), 100.0, &config).unwrap();
        assert!(easing.duration > 0.0);
        assert!(easing.duration <= config.max_generator_duration_ms / 1000.0);
        assert_eq!(easing.ease.apply(0.0), 0.0);
        assert_eq!(easing.ease.apply(1.0), 1.0);
    }

    #[test]
    fn test_duration_spring_keeps_its_duration() {
        let options = GeneratorOptions {
            duration_ms: Some(500.0),
            spring: SpringOptions {
                bounce: Some(0.2),
                ..Default::default()
            },
            ..Default::default()
        };
        let easing = builtin_generator_easing(GeneratorKind::Spring, &options, 100.0, &MotionConfig::default()).unwrap();
        assert_eq!(easing.duration, 0.5);
    }

    struct NeverRests;

    impl Generator for NeverRests {
        fn next(&mut self, t: f64) -> GeneratorState {
            GeneratorState {
                value: (t / 100.0).sin().into(),
                done: false,
            }
        }
    }

    #[test]
    fn test_duration_is_capped() {
        let config = MotionConfig::default();
        let easing =
            create_generator_easing(&GeneratorOptions::default(), 100.0, &config, |_| Ok(Box::new(NeverRests)))
                .unwrap();
        assert_eq!(easing.duration, config.max_generator_duration_ms / 1000.0);
    }

    #[test]
    fn test_zero_scale_uses_default() {
        let config = MotionConfig::default();
        let easing =
            builtin_generator_easing(GeneratorKind::Spring, &GeneratorOptions::default(), 0.0, &config).unwrap();
        assert!(easing.ease.apply(0.5).is_finite());
    }
}
