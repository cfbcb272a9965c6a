//! Damped harmonic oscillator
//!
//! Springs are configured either physically (stiffness, damping, mass) or
//! by feel (duration and bounce). The latter is converted into physical
//! parameters with a Newton-Raphson search.

use super::{calc_generator_velocity, Generator, GeneratorState};
use motive_core::math::clamp;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::warn;

pub const DEFAULT_STIFFNESS: f64 = 100.0;
pub const DEFAULT_DAMPING: f64 = 10.0;
pub const DEFAULT_MASS: f64 = 1.0;
pub const DEFAULT_DURATION_MS: f64 = 800.0;
pub const DEFAULT_BOUNCE: f64 = 0.3;

const REST_SPEED_GRANULAR: f64 = 0.01;
const REST_SPEED_DEFAULT: f64 = 2.0;
const REST_DELTA_GRANULAR: f64 = 0.005;
const REST_DELTA_DEFAULT: f64 = 0.5;

/// Below this displacement a spring is considered "granular" and uses
/// tighter rest thresholds
const GRANULAR_DISTANCE: f64 = 5.0;

const MIN_DURATION_S: f64 = 0.01;
const MAX_DURATION_S: f64 = 10.0;
const MIN_DAMPING_RATIO: f64 = 0.05;
const MAX_DAMPING_RATIO: f64 = 1.0;

const SAFE_MIN: f64 = 0.001;
const ROOT_ITERATIONS: usize = 12;

/// Cap on the hyperbolic argument of the overdamped solution
const MAX_OVERDAMPED_FREQ: f64 = 300.0;

/// Spring configuration. Unset fields fall back to defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpringOptions {
    pub stiffness: Option<f64>,
    pub damping: Option<f64>,
    pub mass: Option<f64>,
    pub bounce: Option<f64>,
    /// Perceived settle time in seconds
    pub visual_duration: Option<f64>,
    pub rest_speed: Option<f64>,
    pub rest_delta: Option<f64>,
}

impl SpringOptions {
    fn has_physics(&self) -> bool {
        self.stiffness.is_some() || self.damping.is_some() || self.mass.is_some()
    }
}

/// Physical parameters found for a duration/bounce pair
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FoundSpring {
    pub stiffness: f64,
    pub damping: f64,
    pub duration_ms: f64,
}

/// Find stiffness and damping that settle in `duration_ms` with `bounce`.
///
/// `velocity` is the initial velocity in units per millisecond, negated.
pub fn find_spring(duration_ms: f64, bounce: f64, velocity: f64, mass: f64) -> FoundSpring {
    if duration_ms > MAX_DURATION_S * 1000.0 {
        warn!(duration_ms, "Spring duration must be 10 seconds or less");
    }

    let damping_ratio = clamp(MIN_DAMPING_RATIO, MAX_DAMPING_RATIO, 1.0 - bounce);
    let duration = clamp(MIN_DURATION_S, MAX_DURATION_S, duration_ms / 1000.0);

    let undamped_freq = if damping_ratio < 1.0 {
        let envelope = |freq: f64| {
            let exponential_decay = freq * damping_ratio;
            let delta = exponential_decay * duration;
            let a = exponential_decay - velocity;
            let b = calc_angular_freq(freq, damping_ratio);
            let c = (-delta).exp();
            SAFE_MIN - (a / b) * c
        };
        let derivative = |freq: f64| {
            let exponential_decay = freq * damping_ratio;
            let delta = exponential_decay * duration;
            let d = delta * velocity + velocity;
            let e = damping_ratio.powi(2) * freq.powi(2) * duration;
            let f = (-delta).exp();
            let g = calc_angular_freq(freq.powi(2), damping_ratio);
            let factor = if -envelope(freq) + SAFE_MIN > 0.0 { -1.0 } else { 1.0 };
            (factor * ((d - e) * f)) / g
        };
        approximate_root(envelope, derivative, 5.0 / duration)
    } else {
        let envelope = |freq: f64| {
            let a = (-freq * duration).exp();
            let b = (freq - velocity) * duration + 1.0;
            -SAFE_MIN + a * b
        };
        let derivative = |freq: f64| {
            let a = (-freq * duration).exp();
            let b = (velocity - freq) * duration.powi(2);
            a * b
        };
        approximate_root(envelope, derivative, 5.0 / duration)
    };

    let duration_ms = duration * 1000.0;
    if undamped_freq.is_nan() {
        return FoundSpring {
            stiffness: DEFAULT_STIFFNESS,
            damping: DEFAULT_DAMPING,
            duration_ms,
        };
    }
    let stiffness = undamped_freq.powi(2) * mass;
    FoundSpring {
        stiffness,
        damping: damping_ratio * 2.0 * (mass * stiffness).sqrt(),
        duration_ms,
    }
}

fn approximate_root<E: Fn(f64) -> f64, D: Fn(f64) -> f64>(envelope: E, derivative: D, initial_guess: f64) -> f64 {
    let mut result = initial_guess;
    for _ in 1..ROOT_ITERATIONS {
        result -= envelope(result) / derivative(result);
    }
    result
}

fn calc_angular_freq(undamped_freq: f64, damping_ratio: f64) -> f64 {
    undamped_freq * (1.0 - damping_ratio * damping_ratio).sqrt()
}

#[derive(Clone, Copy, Debug)]
enum Solution {
    Underdamped { angular_freq: f64 },
    Critical,
    Overdamped { damped_angular_freq: f64 },
}

/// Spring generator between two numbers
#[derive(Clone, Debug)]
pub struct SpringGenerator {
    origin: f64,
    target: f64,
    /// Negated initial velocity, units per millisecond
    initial_velocity: f64,
    damping_ratio: f64,
    undamped_angular_freq: f64,
    rest_speed: f64,
    rest_delta: f64,
    solution: Solution,
    /// Set when the spring was derived from a duration; it then finishes
    /// exactly on time instead of by rest detection
    resolved_duration_ms: Option<f64>,
}

impl SpringGenerator {
    /// `velocity` is in units per second
    pub fn new(options: &SpringOptions, duration_ms: Option<f64>, velocity: f64, origin: f64, target: f64) -> Self {
        let initial_velocity = -(velocity / 1000.0);
        let mut stiffness = options.stiffness.unwrap_or(DEFAULT_STIFFNESS);
        let mut damping = options.damping.unwrap_or(DEFAULT_DAMPING);
        let mut mass = options.mass.unwrap_or(DEFAULT_MASS);
        let mut resolved_duration_ms = None;

        let by_feel = duration_ms.is_some() || options.bounce.is_some() || options.visual_duration.is_some();
        if !options.has_physics() && by_feel {
            let bounce = options.bounce.unwrap_or(DEFAULT_BOUNCE);
            mass = DEFAULT_MASS;
            if let Some(visual_duration) = options.visual_duration {
                let root = (2.0 * PI) / (visual_duration * 1.2);
                stiffness = root * root;
                damping = 2.0 * clamp(MIN_DAMPING_RATIO, MAX_DAMPING_RATIO, 1.0 - bounce) * stiffness.sqrt();
            } else {
                let found = find_spring(
                    duration_ms.unwrap_or(DEFAULT_DURATION_MS),
                    bounce,
                    initial_velocity,
                    mass,
                );
                stiffness = found.stiffness;
                damping = found.damping;
                resolved_duration_ms = Some(found.duration_ms);
            }
        }

        let damping_ratio = damping / (2.0 * (stiffness * mass).sqrt());
        let undamped_angular_freq = (stiffness / mass).sqrt() / 1000.0;
        let granular = (target - origin).abs() < GRANULAR_DISTANCE;

        let solution = if damping_ratio < 1.0 {
            Solution::Underdamped {
                angular_freq: calc_angular_freq(undamped_angular_freq, damping_ratio),
            }
        } else if damping_ratio == 1.0 {
            Solution::Critical
        } else {
            Solution::Overdamped {
                damped_angular_freq: undamped_angular_freq * (damping_ratio * damping_ratio - 1.0).sqrt(),
            }
        };

        Self {
            origin,
            target,
            initial_velocity,
            damping_ratio,
            undamped_angular_freq,
            rest_speed: options.rest_speed.unwrap_or(if granular {
                REST_SPEED_GRANULAR
            } else {
                REST_SPEED_DEFAULT
            }),
            rest_delta: options.rest_delta.unwrap_or(if granular {
                REST_DELTA_GRANULAR
            } else {
                REST_DELTA_DEFAULT
            }),
            solution,
            resolved_duration_ms,
        }
    }

    /// Position at `t` milliseconds
    pub fn position(&self, t: f64) -> f64 {
        let delta = self.target - self.origin;
        let zeta = self.damping_ratio;
        let omega = self.undamped_angular_freq;
        let v0 = self.initial_velocity;
        match self.solution {
            Solution::Underdamped { angular_freq } => {
                let envelope = (-zeta * omega * t).exp();
                self.target
                    - envelope
                        * (((v0 + zeta * omega * delta) / angular_freq) * (angular_freq * t).sin()
                            + delta * (angular_freq * t).cos())
            }
            Solution::Critical => self.target - (-omega * t).exp() * (delta + (v0 + omega * delta) * t),
            Solution::Overdamped { damped_angular_freq } => {
                let envelope = (-zeta * omega * t).exp();
                let freq = (damped_angular_freq * t).min(MAX_OVERDAMPED_FREQ);
                self.target
                    - (envelope
                        * ((v0 + zeta * omega * delta) * freq.sinh() + damped_angular_freq * delta * freq.cosh()))
                        / damped_angular_freq
            }
        }
    }

    pub fn damping_ratio(&self) -> f64 {
        self.damping_ratio
    }
}

impl Generator for SpringGenerator {
    fn next(&mut self, t: f64) -> GeneratorState {
        let current = self.position(t);
        let done = match self.resolved_duration_ms {
            Some(duration) => t >= duration,
            None => {
                let velocity = if self.damping_ratio < 1.0 {
                    if t == 0.0 {
                        self.initial_velocity * 1000.0
                    } else {
                        calc_generator_velocity(|t| self.position(t), t, current)
                    }
                } else {
                    0.0
                };
                velocity.abs() <= self.rest_speed && (self.target - current).abs() <= self.rest_delta
            }
        };
        GeneratorState {
            value: if done { self.target } else { current }.into(),
            done,
        }
    }

    fn calculated_duration(&self) -> Option<f64> {
        self.resolved_duration_ms
    }
}
