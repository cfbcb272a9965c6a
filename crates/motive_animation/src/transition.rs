//! Transition options
//!
//! A [`Transition`] describes how a value moves: duration, delay, easing,
//! keyframe times, repetition and generator parameters. Every field is
//! optional so transitions can be layered (sequence defaults, segment,
//! per-property override) with [`Transition::merge`].

use crate::easing::{self, Easing};
use crate::generators::{GeneratorKind, GeneratorOptions, InertiaOptions, SpringOptions};
use crate::sequence::offset::At;
use indexmap::IndexMap;
use motive_core::math::seconds_to_ms;
use motive_core::AnimValue;
use serde::{Deserialize, Serialize};

/// Animation type requested by a transition
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionType {
    Tween,
    #[default]
    Keyframes,
    Spring,
    Inertia,
    /// A generator registered on the sequence builder by name
    #[serde(untagged)]
    Custom(String),
}

impl TransitionType {
    /// Built-in generator kind behind the type, if any
    pub fn generator_kind(&self) -> Option<GeneratorKind> {
        match self {
            TransitionType::Spring => Some(GeneratorKind::Spring),
            TransitionType::Inertia => Some(GeneratorKind::Inertia),
            _ => None,
        }
    }

    /// Whether the type is driven by a generator rather than a tween
    pub fn is_generator(&self) -> bool {
        matches!(
            self,
            TransitionType::Spring | TransitionType::Inertia | TransitionType::Custom(_)
        )
    }
}

/// One easing for every segment, or one per keyframe segment
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ease {
    Single(Easing),
    PerSegment(Vec<Easing>),
}

impl Ease {
    pub fn as_slice(&self) -> &[Easing] {
        match self {
            Ease::Single(easing) => std::slice::from_ref(easing),
            Ease::PerSegment(easings) => easings,
        }
    }

    /// Easing for keyframe segment `index`, wrapping around
    pub fn for_segment(&self, index: usize) -> Easing {
        easing::for_segment(self.as_slice(), index)
    }
}

impl From<Easing> for Ease {
    fn from(easing: Easing) -> Self {
        Ease::Single(easing)
    }
}

/// Which element a stagger radiates from
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaggerFrom {
    #[default]
    First,
    Last,
    Center,
    #[serde(untagged)]
    Index(usize),
}

impl StaggerFrom {
    fn origin_index(&self, total: usize) -> f64 {
        let last = total.saturating_sub(1) as f64;
        match self {
            StaggerFrom::First => 0.0,
            StaggerFrom::Last => last,
            StaggerFrom::Center => last / 2.0,
            StaggerFrom::Index(index) => *index as f64,
        }
    }
}

/// Per-element delay increasing with distance from an origin element
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Stagger {
    /// Delay between neighbouring elements (seconds)
    pub each: f64,
    pub start_delay: f64,
    pub from: StaggerFrom,
    /// Redistributes the delays across the whole stagger
    pub ease: Option<Easing>,
}

impl Stagger {
    pub fn delay(&self, index: usize, total: usize) -> f64 {
        let distance = (self.from.origin_index(total) - index as f64).abs();
        let mut delay = self.each * distance;
        if let Some(ease) = &self.ease {
            let max_delay = total as f64 * self.each;
            if max_delay > 0.0 {
                delay = ease.apply(delay / max_delay) * max_delay;
            }
        }
        self.start_delay + delay
    }
}

/// Fixed delay or a stagger evaluated per subject
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Delay {
    Fixed(f64),
    Stagger(Stagger),
}

impl Delay {
    /// Delay in seconds for subject `index` of `total`
    pub fn resolve(&self, index: usize, total: usize) -> f64 {
        match self {
            Delay::Fixed(delay) => *delay,
            Delay::Stagger(stagger) => stagger.delay(index, total),
        }
    }
}

impl From<f64> for Delay {
    fn from(delay: f64) -> Self {
        Delay::Fixed(delay)
    }
}

/// Layerable transition options. Times are in seconds.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Transition {
    pub duration: Option<f64>,
    pub delay: Option<Delay>,
    pub ease: Option<Ease>,
    pub times: Option<Vec<f64>>,
    #[serde(rename = "type")]
    pub kind: Option<TransitionType>,
    pub repeat: Option<u32>,
    pub repeat_delay: Option<f64>,
    /// Initial velocity for generators (units per second)
    pub velocity: Option<f64>,
    /// Start offset inside a sequence
    pub at: Option<At>,

    pub stiffness: Option<f64>,
    pub damping: Option<f64>,
    pub mass: Option<f64>,
    pub bounce: Option<f64>,
    pub visual_duration: Option<f64>,
    pub rest_speed: Option<f64>,
    pub rest_delta: Option<f64>,

    pub power: Option<f64>,
    pub time_constant: Option<f64>,
    pub bounce_damping: Option<f64>,
    pub bounce_stiffness: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,

    /// Per-property overrides, plus an optional `default` entry
    #[serde(flatten, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Transition>,
}

macro_rules! layer {
    ($base:expr, $over:expr, $($field:ident),* $(,)?) => {
        Transition {
            $($field: $over.$field.clone().or_else(|| $base.$field.clone()),)*
            properties: {
                let mut properties = $base.properties.clone();
                for (key, value) in &$over.properties {
                    properties.insert(key.clone(), value.clone());
                }
                properties
            },
        }
    };
}

impl Transition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_delay(mut self, delay: impl Into<Delay>) -> Self {
        self.delay = Some(delay.into());
        self
    }

    pub fn with_ease(mut self, ease: impl Into<Ease>) -> Self {
        self.ease = Some(ease.into());
        self
    }

    pub fn with_times(mut self, times: Vec<f64>) -> Self {
        self.times = Some(times);
        self
    }

    pub fn with_type(mut self, kind: TransitionType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_repeat(mut self, repeat: u32) -> Self {
        self.repeat = Some(repeat);
        self
    }

    pub fn with_repeat_delay(mut self, repeat_delay: f64) -> Self {
        self.repeat_delay = Some(repeat_delay);
        self
    }

    pub fn with_at(mut self, at: impl Into<At>) -> Self {
        self.at = Some(at.into());
        self
    }

    /// Add an override applied only to `property`
    pub fn with_property(mut self, property: impl Into<String>, transition: Transition) -> Self {
        self.properties.insert(property.into(), transition);
        self
    }

    /// Layer `over` on top of `self`; set fields in `over` win
    pub fn merge(&self, over: &Transition) -> Transition {
        layer!(
            self,
            over,
            duration,
            delay,
            ease,
            times,
            kind,
            repeat,
            repeat_delay,
            velocity,
            at,
            stiffness,
            damping,
            mass,
            bounce,
            visual_duration,
            rest_speed,
            rest_delta,
            power,
            time_constant,
            bounce_damping,
            bounce_stiffness,
            min,
            max,
        )
    }

    /// The transition that applies to `property`.
    ///
    /// A property-specific override (or the `default` override) is merged
    /// over the shared options.
    pub fn for_property(&self, property: &str) -> Transition {
        let over = self
            .properties
            .get(property)
            .or_else(|| self.properties.get("default"));
        let mut base = self.clone();
        base.properties.clear();
        match over {
            Some(over) => base.merge(over),
            None => base,
        }
    }

    pub fn kind(&self) -> TransitionType {
        self.kind.clone().unwrap_or_default()
    }

    pub fn spring_options(&self) -> SpringOptions {
        SpringOptions {
            stiffness: self.stiffness,
            damping: self.damping,
            mass: self.mass,
            bounce: self.bounce,
            visual_duration: self.visual_duration,
            rest_speed: self.rest_speed,
            rest_delta: self.rest_delta,
        }
    }

    pub fn inertia_options(&self) -> InertiaOptions {
        InertiaOptions {
            power: self.power,
            time_constant: self.time_constant,
            bounce_damping: self.bounce_damping,
            bounce_stiffness: self.bounce_stiffness,
            min: self.min,
            max: self.max,
            rest_delta: self.rest_delta,
            rest_speed: self.rest_speed,
            modify_target: None,
        }
    }

    /// Generator options for animating through `keyframes`
    pub fn generator_options(&self, keyframes: Vec<AnimValue>) -> GeneratorOptions {
        GeneratorOptions {
            keyframes,
            velocity: self.velocity.unwrap_or(0.0),
            duration_ms: self.duration.map(seconds_to_ms),
            times: self.times.clone(),
            ease: self.ease.as_ref().map(|ease| ease.as_slice().to_vec()).unwrap_or_default(),
            spring: self.spring_options(),
            inertia: self.inertia_options(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_override() {
        let base = Transition::new().with_duration(1.0).with_ease(Easing::EaseIn);
        let over = Transition::new().with_duration(2.0);
        let merged = base.merge(&over);
        assert_eq!(merged.duration, Some(2.0));
        assert_eq!(merged.ease, Some(Ease::Single(Easing::EaseIn)));
    }

    #[test]
    fn test_property_override() {
        let transition = Transition::new()
            .with_duration(1.0)
            .with_property("opacity", Transition::new().with_duration(0.2))
            .with_property("default", Transition::new().with_delay(0.5));

        let opacity = transition.for_property("opacity");
        assert_eq!(opacity.duration, Some(0.2));
        assert_eq!(opacity.delay, None);

        let x = transition.for_property("x");
        assert_eq!(x.duration, Some(1.0));
        assert_eq!(x.delay, Some(Delay::Fixed(0.5)));
        assert!(x.properties.is_empty());
    }

    #[test]
    fn test_stagger() {
        let stagger = Stagger {
            each: 0.1,
            ..Default::default()
        };
        assert_eq!(stagger.delay(0, 5), 0.0);
        assert!((stagger.delay(3, 5) - 0.3).abs() < 1e-12);

        let center = Stagger {
            each: 0.1,
            from: StaggerFrom::Center,
            start_delay: 1.0,
            ease: None,
        };
        assert_eq!(center.delay(2, 5), 1.0);
        assert!((center.delay(0, 5) - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_deserialize() {
        let json = r#"{
            "duration": 2,
            "ease": ["easeIn", [0.1, 0.2, 0.3, 0.4]],
            "delay": { "each": 0.1, "from": "last" },
            "type": "spring",
            "at": "<",
            "opacity": { "duration": 0.5 }
        }"#;
        let transition: Transition = serde_json::from_str(json).unwrap();
        assert_eq!(transition.duration, Some(2.0));
        assert_eq!(
            transition.ease,
            Some(Ease::PerSegment(vec![
                Easing::EaseIn,
                Easing::CubicBezier(0.1, 0.2, 0.3, 0.4)
            ]))
        );
        assert_eq!(transition.kind(), TransitionType::Spring);
        assert_eq!(transition.at, Some(At::WithPrevious(0.0)));
        assert_eq!(transition.for_property("opacity").duration, Some(0.5));
        match transition.delay {
            Some(Delay::Stagger(stagger)) => assert_eq!(stagger.from, StaggerFrom::Last),
            other => panic!("expected stagger, got {other:?}"),
        }
    }

    #[test]
    fn test_bezier_is_single_ease() {
        let ease: Ease = serde_json::from_str("[0.1, 0.2, 0.3, 0.4]").unwrap();
        assert_eq!(ease, Ease::Single(Easing::CubicBezier(0.1, 0.2, 0.3, 0.4)));
    }
}
