//! Momentum scrolling with optional spring-loaded boundaries

use super::spring::{SpringGenerator, SpringOptions};
use super::{calc_generator_velocity, Generator, GeneratorState};
use crate::easing::EasingFn;
use serde::{Deserialize, Serialize};

/// Inertia configuration. Unset fields fall back to defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InertiaOptions {
    pub power: Option<f64>,
    /// Decay time constant in milliseconds
    pub time_constant: Option<f64>,
    pub bounce_damping: Option<f64>,
    pub bounce_stiffness: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub rest_delta: Option<f64>,
    pub rest_speed: Option<f64>,
    /// Snaps the projected resting point, e.g. to a grid
    #[serde(skip)]
    pub modify_target: Option<EasingFn>,
}

const DEFAULT_POWER: f64 = 0.8;
const DEFAULT_TIME_CONSTANT: f64 = 325.0;
const DEFAULT_BOUNCE_DAMPING: f64 = 10.0;
const DEFAULT_BOUNCE_STIFFNESS: f64 = 500.0;
const DEFAULT_REST_DELTA: f64 = 0.5;

/// Exponential decay towards a projected target, handing over to a spring
/// once a boundary is crossed
pub struct InertiaGenerator {
    origin: f64,
    amplitude: f64,
    target: f64,
    time_constant: f64,
    rest_delta: f64,
    min: Option<f64>,
    max: Option<f64>,
    bounce: SpringOptions,
    spring: Option<SpringGenerator>,
    /// Time at which the spring took over (ms)
    spring_start: f64,
}

impl InertiaGenerator {
    /// `velocity` is in units per second
    pub fn new(options: &InertiaOptions, origin: f64, velocity: f64) -> Self {
        let power = options.power.unwrap_or(DEFAULT_POWER);
        let time_constant = options.time_constant.unwrap_or(DEFAULT_TIME_CONSTANT);
        let rest_delta = options.rest_delta.unwrap_or(DEFAULT_REST_DELTA);

        let mut amplitude = power * velocity;
        let ideal = origin + amplitude;
        let target = match &options.modify_target {
            Some(modify) => modify.call(ideal),
            None => ideal,
        };
        if target != ideal {
            amplitude = target - origin;
        }

        let mut generator = Self {
            origin,
            amplitude,
            target,
            time_constant,
            rest_delta,
            min: options.min,
            max: options.max,
            bounce: SpringOptions {
                damping: Some(options.bounce_damping.unwrap_or(DEFAULT_BOUNCE_DAMPING)),
                stiffness: Some(options.bounce_stiffness.unwrap_or(DEFAULT_BOUNCE_STIFFNESS)),
                rest_delta: Some(rest_delta),
                rest_speed: options.rest_speed,
                ..Default::default()
            },
            spring: None,
            spring_start: 0.0,
        };

        // Starting outside the bounds springs straight back in
        if generator.is_out_of_bounds(origin) {
            let boundary = generator.nearest_boundary(origin);
            generator.spring = Some(SpringGenerator::new(&generator.bounce, None, velocity, origin, boundary));
        }
        generator
    }

    fn is_out_of_bounds(&self, v: f64) -> bool {
        self.min.is_some_and(|min| v < min) || self.max.is_some_and(|max| v > max)
    }

    fn nearest_boundary(&self, v: f64) -> f64 {
        match (self.min, self.max) {
            (None, Some(max)) => max,
            (Some(min), None) => min,
            (Some(min), Some(max)) => {
                if (min - v).abs() < (max - v).abs() {
                    min
                } else {
                    max
                }
            }
            (None, None) => v,
        }
    }

    fn calc_delta(&self, t: f64) -> f64 {
        -self.amplitude * (-t / self.time_constant).exp()
    }

    fn calc_latest(&self, t: f64) -> f64 {
        self.target + self.calc_delta(t)
    }

    /// Position and done flag of the decay phase
    fn decay(&self, t: f64) -> (f64, bool) {
        let delta = self.calc_delta(t);
        let latest = self.target + delta;
        let done = delta.abs() <= self.rest_delta;
        (if done { self.target } else { latest }, done)
    }

    pub fn origin(&self) -> f64 {
        self.origin
    }
}

impl Generator for InertiaGenerator {
    fn next(&mut self, t: f64) -> GeneratorState {
        if self.spring.is_none() {
            let (value, done) = self.decay(t);
            if !self.is_out_of_bounds(value) {
                return GeneratorState {
                    value: value.into(),
                    done,
                };
            }
            let velocity = calc_generator_velocity(|t| self.calc_latest(t), t, value);
            let boundary = self.nearest_boundary(value);
            self.spring_start = t;
            self.spring = Some(SpringGenerator::new(&self.bounce, None, velocity, value, boundary));
        }

        let elapsed = t - self.spring_start;
        let settled = GeneratorState {
            value: self.target.into(),
            done: true,
        };
        self.spring.as_mut().map_or(settled, |spring| spring.next(elapsed))
    }
}
