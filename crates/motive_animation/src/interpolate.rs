//! Piecewise interpolation between keyframe values

use crate::easing::Easing;
use motive_core::math::{clamp, mix, progress};
use motive_core::value::parse_leading_float;
use motive_core::AnimValue;

/// Values that can be blended
pub trait Mix: Clone {
    fn mix(from: &Self, to: &Self, progress: f64) -> Self;
}

impl Mix for f64 {
    fn mix(from: &Self, to: &Self, progress: f64) -> Self {
        mix(*from, *to, progress)
    }
}

impl Mix for AnimValue {
    /// Numbers blend linearly, unit strings with matching units blend their
    /// numeric part, anything else switches as soon as progress leaves 0.
    fn mix(from: &Self, to: &Self, progress: f64) -> Self {
        match (from, to) {
            (AnimValue::Number(a), AnimValue::Number(b)) => AnimValue::Number(mix(*a, *b, progress)),
            (AnimValue::Text(a), AnimValue::Text(b)) => match (split_unit(a), split_unit(b)) {
                (Some((x, unit_a)), Some((y, unit_b))) if unit_a == unit_b => {
                    AnimValue::Text(format!("{}{}", mix(x, y, progress), unit_a))
                }
                _ => immediate(from, to, progress),
            },
            _ => immediate(from, to, progress),
        }
    }
}

fn immediate(from: &AnimValue, to: &AnimValue, progress: f64) -> AnimValue {
    if progress > 0.0 {
        to.clone()
    } else {
        from.clone()
    }
}

fn split_unit(text: &str) -> Option<(f64, &str)> {
    let number = parse_leading_float(text)?;
    let trimmed = text.trim();
    let unit_start = trimmed
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || *c == '.' || (*i == 0 && (*c == '-' || *c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    let unit = &trimmed[unit_start..];
    if unit.chars().all(|c| c.is_ascii_alphabetic() || c == '%') {
        Some((number, unit))
    } else {
        None
    }
}

/// Maps an input range onto output values
#[derive(Clone, Debug)]
pub struct Interpolator<T> {
    input: Vec<f64>,
    output: Vec<T>,
    easings: Vec<Easing>,
    clamp: bool,
}

impl<T: Mix> Interpolator<T> {
    /// Build an interpolator.
    ///
    /// `easings` apply per segment and wrap when shorter than the segment
    /// count. Descending inputs are reversed together with their outputs.
    /// Extra entries on the longer of `input` and `output` are ignored.
    pub fn new(input: &[f64], output: &[T], clamp: bool, easings: &[Easing]) -> Self {
        debug_assert_eq!(input.len(), output.len(), "input and output lengths differ");
        let len = input.len().min(output.len());
        let mut input = input[..len].to_vec();
        let mut output = output[..len].to_vec();
        if input.len() > 1 && input[0] > input[input.len() - 1] {
            input.reverse();
            output.reverse();
        }
        Self {
            input,
            output,
            easings: easings.to_vec(),
            clamp,
        }
    }

    /// Output at `value`, `None` when built from empty input
    pub fn sample(&self, value: f64) -> Option<T> {
        let len = self.input.len();
        match len {
            0 => return None,
            1 => return Some(self.output[0].clone()),
            2 if self.input[0] == self.input[1] => return Some(self.output[1].clone()),
            _ => {}
        }

        let value = if self.clamp {
            clamp(self.input[0], self.input[len - 1], value)
        } else {
            value
        };

        let mut segment = 0;
        while segment < len - 2 && value >= self.input[segment + 1] {
            segment += 1;
        }

        let mut local = progress(self.input[segment], self.input[segment + 1], value);
        if !self.easings.is_empty() {
            local = self.easings[segment % self.easings.len()].apply(local);
        }
        Some(T::mix(&self.output[segment], &self.output[segment + 1], local))
    }
}
