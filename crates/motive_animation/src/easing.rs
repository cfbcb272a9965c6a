//! Easing functions for animations

use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// A progress → progress function supplied at runtime
#[derive(Clone)]
pub struct EasingFn(Rc<dyn Fn(f64) -> f64>);

impl EasingFn {
    pub fn new<F: Fn(f64) -> f64 + 'static>(f: F) -> Self {
        Self(Rc::new(f))
    }

    #[inline]
    pub fn call(&self, t: f64) -> f64 {
        (self.0)(t)
    }
}

impl fmt::Debug for EasingFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EasingFn(..)")
    }
}

impl PartialEq for EasingFn {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Easing function type
///
/// Serializes as a camelCase name (`"easeInOut"`) or a cubic bezier array
/// (`[0.4, 0, 0.2, 1]`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EasingRepr", into = "EasingRepr")]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInQuart,
    EaseOutQuart,
    EaseInOutQuart,
    CircIn,
    CircOut,
    CircInOut,
    BackIn,
    BackOut,
    BackInOut,
    Anticipate,
    /// Holds the start value until the segment ends, then jumps
    Hold,
    CubicBezier(f64, f64, f64, f64),
    /// Runtime-defined curve, e.g. a spring sampled through a generator
    Custom(EasingFn),
}

const BACK_OUT: (f64, f64, f64, f64) = (0.33, 1.53, 0.69, 0.99);

impl Easing {
    /// Apply the easing function to a progress value (0.0 to 1.0)
    pub fn apply(&self, t: f64) -> f64 {
        match self {
            Easing::Linear => t,
            Easing::EaseIn => cubic_bezier_ease(t, 0.42, 0.0, 1.0, 1.0),
            Easing::EaseOut => cubic_bezier_ease(t, 0.0, 0.0, 0.58, 1.0),
            Easing::EaseInOut => cubic_bezier_ease(t, 0.42, 0.0, 0.58, 1.0),
            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::EaseInCubic => t * t * t,
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::EaseInQuart => t * t * t * t,
            Easing::EaseOutQuart => 1.0 - (1.0 - t).powi(4),
            Easing::EaseInOutQuart => {
                if t < 0.5 {
                    8.0 * t * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(4) / 2.0
                }
            }
            Easing::CircIn => circ_in(t),
            Easing::CircOut => 1.0 - circ_in(1.0 - t),
            Easing::CircInOut => mirror(circ_in, t),
            Easing::BackIn => back_in(t),
            Easing::BackOut => back_out(t),
            Easing::BackInOut => mirror(back_in, t),
            Easing::Anticipate => {
                let t = t * 2.0;
                if t < 1.0 {
                    0.5 * back_in(t)
                } else {
                    0.5 * (2.0 - 2f64.powf(-10.0 * (t - 1.0)))
                }
            }
            Easing::Hold => {
                if t < 1.0 {
                    0.0
                } else {
                    1.0
                }
            }
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier_ease(t, *x1, *y1, *x2, *y2),
            Easing::Custom(f) => f.call(t),
        }
    }

    /// Look up an easing by its camelCase name
    pub fn from_name(name: &str) -> Option<Self> {
        let easing = match name {
            "linear" => Easing::Linear,
            "easeIn" => Easing::EaseIn,
            "easeOut" => Easing::EaseOut,
            "easeInOut" => Easing::EaseInOut,
            "easeInQuad" => Easing::EaseInQuad,
            "easeOutQuad" => Easing::EaseOutQuad,
            "easeInOutQuad" => Easing::EaseInOutQuad,
            "easeInCubic" => Easing::EaseInCubic,
            "easeOutCubic" => Easing::EaseOutCubic,
            "easeInOutCubic" => Easing::EaseInOutCubic,
            "easeInQuart" => Easing::EaseInQuart,
            "easeOutQuart" => Easing::EaseOutQuart,
            "easeInOutQuart" => Easing::EaseInOutQuart,
            "circIn" => Easing::CircIn,
            "circOut" => Easing::CircOut,
            "circInOut" => Easing::CircInOut,
            "backIn" => Easing::BackIn,
            "backOut" => Easing::BackOut,
            "backInOut" => Easing::BackInOut,
            "anticipate" => Easing::Anticipate,
            "hold" => Easing::Hold,
            _ => return None,
        };
        Some(easing)
    }

    /// camelCase name, `None` for bezier and custom curves
    pub fn name(&self) -> Option<&'static str> {
        let name = match self {
            Easing::Linear => "linear",
            Easing::EaseIn => "easeIn",
            Easing::EaseOut => "easeOut",
            Easing::EaseInOut => "easeInOut",
            Easing::EaseInQuad => "easeInQuad",
            Easing::EaseOutQuad => "easeOutQuad",
            Easing::EaseInOutQuad => "easeInOutQuad",
            Easing::EaseInCubic => "easeInCubic",
            Easing::EaseOutCubic => "easeOutCubic",
            Easing::EaseInOutCubic => "easeInOutCubic",
            Easing::EaseInQuart => "easeInQuart",
            Easing::EaseOutQuart => "easeOutQuart",
            Easing::EaseInOutQuart => "easeInOutQuart",
            Easing::CircIn => "circIn",
            Easing::CircOut => "circOut",
            Easing::CircInOut => "circInOut",
            Easing::BackIn => "backIn",
            Easing::BackOut => "backOut",
            Easing::BackInOut => "backInOut",
            Easing::Anticipate => "anticipate",
            Easing::Hold => "hold",
            Easing::CubicBezier(..) | Easing::Custom(_) => return None,
        };
        Some(name)
    }

    /// Wrap a closure as an easing
    pub fn custom<F: Fn(f64) -> f64 + 'static>(f: F) -> Self {
        Easing::Custom(EasingFn::new(f))
    }

    /// Cubic bezier control points, for named curves that have them
    pub fn bezier_points(&self) -> Option<[f64; 4]> {
        match self {
            Easing::Linear => Some([0.0, 0.0, 1.0, 1.0]),
            Easing::EaseIn => Some([0.42, 0.0, 1.0, 1.0]),
            Easing::EaseOut => Some([0.0, 0.0, 0.58, 1.0]),
            Easing::EaseInOut => Some([0.42, 0.0, 0.58, 1.0]),
            Easing::BackOut => Some([BACK_OUT.0, BACK_OUT.1, BACK_OUT.2, BACK_OUT.3]),
            Easing::CubicBezier(x1, y1, x2, y2) => Some([*x1, *y1, *x2, *y2]),
            _ => None,
        }
    }

    /// Sample the curve into evenly spaced `linear()` stops.
    ///
    /// At least two stops are produced.
    pub fn to_linear_points(&self, duration_ms: f64, resolution_ms: f64) -> Vec<f64> {
        let count = ((duration_ms / resolution_ms).round() as usize).max(2);
        (0..count)
            .map(|i| self.apply(i as f64 / (count - 1) as f64))
            .collect()
    }
}

/// Easing for segment `index` of a per-segment easing list, wrapping around
pub fn for_segment(easings: &[Easing], index: usize) -> Easing {
    if easings.is_empty() {
        return Easing::default();
    }
    easings[index % easings.len()].clone()
}

fn circ_in(t: f64) -> f64 {
    1.0 - t.clamp(-1.0, 1.0).acos().sin()
}

fn back_out(t: f64) -> f64 {
    cubic_bezier_ease(t, BACK_OUT.0, BACK_OUT.1, BACK_OUT.2, BACK_OUT.3)
}

fn back_in(t: f64) -> f64 {
    1.0 - back_out(1.0 - t)
}

/// Mirror an ease-in curve into an in-out curve
fn mirror(ease: fn(f64) -> f64, t: f64) -> f64 {
    if t <= 0.5 {
        ease(2.0 * t) / 2.0
    } else {
        (2.0 - ease(2.0 * (1.0 - t))) / 2.0
    }
}

/// Cubic bezier easing calculation (same curve as CSS `cubic-bezier()`).
///
/// Uses Newton-Raphson with binary-search fallback for robustness.
fn cubic_bezier_ease(t: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    // Endpoints are always exact
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    if x1 == y1 && x2 == y2 {
        return t;
    }

    let x = t;

    // Solve for parameter `p` where bezier_x(p) == x using Newton-Raphson,
    // falling back to binary search if the slope is too flat.
    let mut p = x;
    for _ in 0..8 {
        let err = bezier_sample(p, x1, x2) - x;
        if err.abs() < 1e-7 {
            return bezier_sample(p, y1, y2);
        }
        let slope = bezier_slope(p, x1, x2);
        if slope.abs() < 1e-7 {
            break;
        }
        p -= err / slope;
    }

    // Binary search fallback (always converges)
    let mut lo = 0.0_f64;
    let mut hi = 1.0_f64;
    p = x;
    for _ in 0..20 {
        let val = bezier_sample(p, x1, x2);
        if (val - x).abs() < 1e-7 {
            break;
        }
        if val < x {
            lo = p;
        } else {
            hi = p;
        }
        p = (lo + hi) * 0.5;
    }

    bezier_sample(p, y1, y2)
}

/// Evaluate cubic bezier at parameter t: B(t) = 3(1-t)²t·p1 + 3(1-t)t²·p2 + t³
#[inline]
fn bezier_sample(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    ((a * t + b) * t + c) * t
}

/// Derivative of cubic bezier: B'(t) = 3(1-t)²·p1 + 6(1-t)t·(p2-p1) + 3t²·(1-p2)
#[inline]
fn bezier_slope(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    (3.0 * a * t + 2.0 * b) * t + c
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum EasingRepr {
    Named(String),
    Bezier([f64; 4]),
}

impl TryFrom<EasingRepr> for Easing {
    type Error = String;

    fn try_from(repr: EasingRepr) -> Result<Self, Self::Error> {
        match repr {
            EasingRepr::Named(name) => {
                Easing::from_name(&name).ok_or_else(|| format!("unknown easing `{name}`"))
            }
            EasingRepr::Bezier([x1, y1, x2, y2]) => Ok(Easing::CubicBezier(x1, y1, x2, y2)),
        }
    }
}

impl From<Easing> for EasingRepr {
    fn from(easing: Easing) -> Self {
        match easing {
            Easing::CubicBezier(x1, y1, x2, y2) => EasingRepr::Bezier([x1, y1, x2, y2]),
            Easing::Custom(_) => EasingRepr::Named("custom".to_string()),
            named => EasingRepr::Named(named.name().unwrap_or("linear").to_string()),
        }
    }
}
