//! Motion generators
//!
//! A generator is a stateful function of elapsed time that produces the
//! next value of a transition and eventually reports that it is at rest.
//! Springs and inertia are simulated; keyframes are a plain tween.

pub mod inertia;
pub mod keyframes;
pub mod spring;

pub use inertia::{InertiaGenerator, InertiaOptions};
pub use keyframes::KeyframesGenerator;
pub use spring::{find_spring, SpringGenerator, SpringOptions};

use crate::easing::Easing;
use crate::error::{AnimationError, Result};
use motive_core::math::velocity_per_second;
use motive_core::AnimValue;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Output of one generator step
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratorState {
    pub value: AnimValue,
    pub done: bool,
}

/// A resumable transition over time (milliseconds)
pub trait Generator {
    /// Sample the generator at `t` milliseconds after its start
    fn next(&mut self, t: f64) -> GeneratorState;

    /// Duration known up front, if any (ms)
    fn calculated_duration(&self) -> Option<f64> {
        None
    }
}

/// Constructs a user-supplied generator
pub type GeneratorFactory = Rc<dyn Fn(&GeneratorOptions) -> Result<Box<dyn Generator>>>;

/// Built-in generator families
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorKind {
    Spring,
    Inertia,
    Keyframes,
}

impl GeneratorKind {
    pub fn name(self) -> &'static str {
        match self {
            GeneratorKind::Spring => "spring",
            GeneratorKind::Inertia => "inertia",
            GeneratorKind::Keyframes => "keyframes",
        }
    }

    /// Whether the kind simulates physics rather than tweening
    pub fn is_physical(self) -> bool {
        matches!(self, GeneratorKind::Spring | GeneratorKind::Inertia)
    }
}

/// Everything a generator may be configured with
#[derive(Clone, Debug, Default)]
pub struct GeneratorOptions {
    pub keyframes: Vec<AnimValue>,
    /// Initial velocity in units per second
    pub velocity: f64,
    pub duration_ms: Option<f64>,
    /// Keyframe offsets in `[0, 1]`
    pub times: Option<Vec<f64>>,
    /// One easing, or one per keyframe segment
    pub ease: Vec<Easing>,
    pub spring: SpringOptions,
    pub inertia: InertiaOptions,
}

/// Instantiate a built-in generator
pub fn create_generator(kind: GeneratorKind, options: &GeneratorOptions) -> Result<Box<dyn Generator>> {
    if options.keyframes.is_empty() {
        return Err(AnimationError::EmptyKeyframes(kind.name().to_string()));
    }
    match kind {
        GeneratorKind::Spring => {
            let (from, to) = numeric_endpoints(kind, &options.keyframes)?;
            Ok(Box::new(SpringGenerator::new(
                &options.spring,
                options.duration_ms,
                options.velocity,
                from,
                to,
            )))
        }
        GeneratorKind::Inertia => {
            let (from, _) = numeric_endpoints(kind, &options.keyframes)?;
            Ok(Box::new(InertiaGenerator::new(&options.inertia, from, options.velocity)))
        }
        GeneratorKind::Keyframes => Ok(Box::new(KeyframesGenerator::new(
            options.keyframes.clone(),
            options.times.as_deref(),
            &options.ease,
            options.duration_ms.unwrap_or(300.0),
        ))),
    }
}

fn numeric_endpoints(kind: GeneratorKind, keyframes: &[AnimValue]) -> Result<(f64, f64)> {
    let numeric = |value: &AnimValue| {
        value.as_number().ok_or_else(|| AnimationError::NonNumericKeyframes {
            generator: kind.name(),
            found: value.to_string(),
        })
    };
    let from = numeric(&keyframes[0])?;
    let to = numeric(&keyframes[keyframes.len() - 1])?;
    Ok((from, to))
}

/// Simulate a generator until it reports rest.
///
/// Returns `f64::INFINITY` when it is still moving at `max_ms`.
pub fn calc_generator_duration(generator: &mut dyn Generator, step_ms: f64, max_ms: f64) -> f64 {
    let mut duration = 0.0;
    let mut state = generator.next(duration);
    while !state.done && duration < max_ms {
        duration += step_ms;
        state = generator.next(duration);
    }
    if duration >= max_ms {
        f64::INFINITY
    } else {
        duration
    }
}

/// Sample window used to estimate generator velocity (ms)
const VELOCITY_SAMPLE_MS: f64 = 5.0;

/// Velocity of a position function at `t`, in units per second
pub fn calc_generator_velocity<F: Fn(f64) -> f64>(resolve: F, t: f64, current: f64) -> f64 {
    let prev_t = (t - VELOCITY_SAMPLE_MS).max(0.0);
    velocity_per_second(current - resolve(prev_t), t - prev_t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spring_rejects_text() {
        let options = GeneratorOptions {
            keyframes: vec![AnimValue::from("red"), AnimValue::from("blue")],
            ..Default::default()
        };
        let err = create_generator(GeneratorKind::Spring, &options).err();
        assert!(matches!(
            err,
            Some(AnimationError::NonNumericKeyframes { generator: "spring", .. })
        ));
    }

    #[test]
    fn test_empty_keyframes() {
        let err = create_generator(GeneratorKind::Keyframes, &GeneratorOptions::default()).err();
        assert_eq!(err, Some(AnimationError::EmptyKeyframes("keyframes".into())));
    }

    #[test]
    fn test_duration_of_tween_is_its_duration() {
        let options = GeneratorOptions {
            keyframes: vec![0.0.into(), 1.0.into()],
            duration_ms: Some(400.0),
            ..Default::default()
        };
        let mut generator = create_generator(GeneratorKind::Keyframes, &options).unwrap();
        assert_eq!(calc_generator_duration(generator.as_mut(), 50.0, 20_000.0), 400.0);
    }
}
