//! Scroll offsets: where along a scroll a target's progress starts and ends

use super::info::{Axis, ScrollInfo};
use crate::interpolate::Interpolator;
use crate::keyframes::default_offset;
use motive_core::math::clamp;
use motive_core::value::parse_leading_float;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Viewport size used to resolve `vw` / `vh` edges
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// A point along a target or container length
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Edge {
    /// Fraction of the length: `start` is 0, `center` 0.5, `end` 1,
    /// `"25%"` is 0.25
    Fraction(f64),
    Px(f64),
    Vw(f64),
    Vh(f64),
}

impl Edge {
    pub const START: Edge = Edge::Fraction(0.0);
    pub const CENTER: Edge = Edge::Fraction(0.5);
    pub const END: Edge = Edge::Fraction(1.0);

    fn named(name: &str) -> Option<Edge> {
        match name {
            "start" => Some(Edge::START),
            "center" => Some(Edge::CENTER),
            "end" => Some(Edge::END),
            _ => None,
        }
    }

    /// Pixel position of this edge along `length`, shifted by `inset`
    pub fn resolve(&self, length: f64, inset: f64, viewport: &Viewport) -> f64 {
        let delta = match self {
            Edge::Fraction(fraction) => length * fraction,
            Edge::Px(px) => *px,
            Edge::Vw(vw) => vw / 100.0 * viewport.width,
            Edge::Vh(vh) => vh / 100.0 * viewport.height,
        };
        inset + delta
    }
}

impl FromStr for Edge {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(edge) = Edge::named(s) {
            return Ok(edge);
        }
        let number = parse_leading_float(s).ok_or_else(|| format!("invalid scroll edge `{s}`"))?;
        Ok(if s.ends_with("px") {
            Edge::Px(number)
        } else if s.ends_with('%') {
            Edge::Fraction(number / 100.0)
        } else if s.ends_with("vw") {
            Edge::Vw(number)
        } else if s.ends_with("vh") {
            Edge::Vh(number)
        } else {
            Edge::Fraction(number)
        })
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edge::Fraction(fraction) => write!(f, "{fraction}"),
            Edge::Px(px) => write!(f, "{px}px"),
            Edge::Vw(vw) => write!(f, "{vw}vw"),
            Edge::Vh(vh) => write!(f, "{vh}vh"),
        }
    }
}

/// One breakpoint: the scroll position at which `target` meets `container`.
///
/// Written as `"start end"` (target start meets container end), a single
/// edge (`"center"`, meeting the same container edge when named and the
/// container start otherwise), a number, or a `[target, container]` pair.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "IntersectionRepr", into = "IntersectionRepr")]
pub struct Intersection {
    pub target: Edge,
    pub container: Edge,
}

impl Intersection {
    pub const fn new(target: Edge, container: Edge) -> Self {
        Self { target, container }
    }

    /// Scroll position where the edges meet
    pub fn resolve(&self, container_length: f64, target_length: f64, target_inset: f64, viewport: &Viewport) -> f64 {
        let target_point = self.target.resolve(target_length, target_inset, viewport);
        let container_point = self.container.resolve(container_length, 0.0, viewport);
        target_point - container_point
    }
}

impl FromStr for Intersection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.split_once(' ') {
            Some((target, container)) => Ok(Self::new(target.parse()?, container.parse()?)),
            None => {
                let target: Edge = s.parse()?;
                let container = Edge::named(s).unwrap_or(Edge::START);
                Ok(Self::new(target, container))
            }
        }
    }
}

impl fmt::Display for Intersection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.target, self.container)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum IntersectionRepr {
    Fraction(f64),
    Pair([f64; 2]),
    Text(String),
}

impl TryFrom<IntersectionRepr> for Intersection {
    type Error = String;

    fn try_from(repr: IntersectionRepr) -> Result<Self, Self::Error> {
        match repr {
            IntersectionRepr::Fraction(fraction) => {
                Ok(Intersection::new(Edge::Fraction(fraction), Edge::Fraction(fraction)))
            }
            IntersectionRepr::Pair([target, container]) => {
                Ok(Intersection::new(Edge::Fraction(target), Edge::Fraction(container)))
            }
            IntersectionRepr::Text(text) => text.parse(),
        }
    }
}

impl From<Intersection> for IntersectionRepr {
    fn from(intersection: Intersection) -> Self {
        match (intersection.target, intersection.container) {
            (Edge::Fraction(target), Edge::Fraction(container)) => IntersectionRepr::Pair([target, container]),
            _ => IntersectionRepr::Text(intersection.to_string()),
        }
    }
}

/// Breakpoints mapped evenly onto progress `0..=1`
pub type ScrollOffset = Vec<Intersection>;

const fn fractions(target: f64, container: f64) -> Intersection {
    Intersection::new(Edge::Fraction(target), Edge::Fraction(container))
}

/// Target entering from the container end
pub const ENTER: [Intersection; 2] = [fractions(0.0, 1.0), fractions(1.0, 1.0)];
/// Target leaving through the container start
pub const EXIT: [Intersection; 2] = [fractions(0.0, 0.0), fractions(1.0, 0.0)];
/// Any part of the target visible
pub const ANY: [Intersection; 2] = [fractions(1.0, 0.0), fractions(0.0, 1.0)];
/// Whole scroll of the target through the container
pub const ALL: [Intersection; 2] = [fractions(0.0, 0.0), fractions(1.0, 1.0)];

/// Named preset offset
pub fn preset(name: &str) -> Option<ScrollOffset> {
    match name.to_ascii_lowercase().as_str() {
        "enter" => Some(ENTER.to_vec()),
        "exit" => Some(EXIT.to_vec()),
        "any" => Some(ANY.to_vec()),
        "all" => Some(ALL.to_vec()),
        _ => None,
    }
}

/// Resolve `offsets` for `axis` and recompute its progress.
///
/// Expects the target/container measurements on `info` to be current.
/// Progress is clamped to `[0, 1]` even when overscrolled.
pub fn resolve_offsets(info: &mut ScrollInfo, axis: Axis, offsets: &[Intersection], viewport: &Viewport) {
    let offsets = if offsets.is_empty() { &ALL[..] } else { offsets };
    let axis_info = info.axis_mut(axis);

    let (container_length, target_length, inset) =
        (axis_info.container_length, axis_info.target_length, axis_info.target_offset);
    axis_info.offset = offsets
        .iter()
        .map(|offset| offset.resolve(container_length, target_length, inset, viewport))
        .collect();

    let interpolator = Interpolator::new(&axis_info.offset, &default_offset(offsets), false, &[]);
    axis_info.progress = clamp(0.0, 1.0, interpolator.sample(axis_info.current).unwrap_or(0.0));
}
