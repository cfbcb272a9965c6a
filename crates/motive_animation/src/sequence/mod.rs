//! Keyframe sequence builder
//!
//! Merges an ordered list of timed segments, possibly targeting different
//! subjects and properties, into one absolute timeline per
//! (subject, property) pair. The result is a set of plain keyframe
//! animations that all share the sequence's total duration.
//!
//! ```rust
//! use motive_animation::sequence::{Segment, SequenceBuilder};
//! use motive_animation::transition::Transition;
//! use motive_core::MotionConfig;
//!
//! let config = MotionConfig::default();
//! let definition = SequenceBuilder::new(&config)
//!     .build(&[
//!         Segment::animate("a", [("x", vec![Some(100.0.into())])], Transition::new().with_duration(1.0)),
//!         Segment::animate("b", [("x", vec![Some(200.0.into())])], Transition::new().with_duration(1.0).with_at("<")),
//!     ])
//!     .unwrap();
//! assert_eq!(definition.total_duration, 1.0);
//! ```

pub mod edit;
pub mod offset;
pub mod repeat;

pub use edit::{add_keyframes, compare_by_time, erase_keyframes, TimedKeyframe};
pub use offset::{calc_next_time, At};
pub use repeat::{expand_repeat, Repeated};

use crate::easing::Easing;
use crate::error::{AnimationError, Result};
use crate::generator_easing::{builtin_generator_easing, create_generator_easing};
use crate::generators::GeneratorFactory;
use crate::keyframes::{default_offset, fill_offset};
use crate::transition::{Ease, Transition, TransitionType};
use indexmap::IndexMap;
use motive_core::math::progress;
use motive_core::{AnimValue, MotionConfig, MotionValue, MotionValueId};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use tracing::{debug, trace};

/// Property key used for segments that animate a bare motion value
pub const DEFAULT_PROPERTY: &str = "default";

/// Keyframes of one property; `None` inherits the previous value
pub type Keyframes = Vec<Option<AnimValue>>;

/// One entry of a sequence
#[derive(Clone, Debug, Deserialize)]
#[serde(from = "SegmentRepr")]
pub enum Segment {
    /// Records the current time under a name
    Label(String),
    /// Records a resolved `at` under a name without advancing time
    Marker { name: String, at: At },
    /// Animates properties of one or more elements
    Elements {
        targets: Vec<String>,
        keyframes: IndexMap<String, Keyframes>,
        transition: Transition,
    },
    /// Animates a single motion value
    Value {
        value: MotionValue,
        keyframes: Keyframes,
        transition: Transition,
    },
}

impl Segment {
    pub fn label(name: impl Into<String>) -> Self {
        Segment::Label(name.into())
    }

    pub fn marker(name: impl Into<String>, at: impl Into<At>) -> Self {
        Segment::Marker {
            name: name.into(),
            at: at.into(),
        }
    }

    /// Animate properties of the element `target`
    pub fn animate<K, I>(target: impl Into<String>, keyframes: I, transition: Transition) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Keyframes)>,
    {
        Segment::Elements {
            targets: vec![target.into()],
            keyframes: keyframes.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            transition,
        }
    }

    /// Animate the same properties on several elements, e.g. with a stagger
    pub fn animate_all<K, I>(targets: Vec<String>, keyframes: I, transition: Transition) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Keyframes)>,
    {
        Segment::Elements {
            targets,
            keyframes: keyframes.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            transition,
        }
    }

    pub fn value(value: &MotionValue, keyframes: Keyframes, transition: Transition) -> Self {
        Segment::Value {
            value: value.clone(),
            keyframes,
            transition,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SubjectRepr {
    One(String),
    Many(Vec<String>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum KeyframesRepr {
    Many(Vec<Option<AnimValue>>),
    One(Option<AnimValue>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SegmentRepr {
    Label(String),
    Marker { name: String, at: At },
    Animate(SubjectRepr, IndexMap<String, KeyframesRepr>, Transition),
    AnimateDefault(SubjectRepr, IndexMap<String, KeyframesRepr>),
}

impl From<SegmentRepr> for Segment {
    fn from(repr: SegmentRepr) -> Self {
        let elements = |subject: SubjectRepr, keyframes: IndexMap<String, KeyframesRepr>, transition| {
            let targets = match subject {
                SubjectRepr::One(id) => vec![id],
                SubjectRepr::Many(ids) => ids,
            };
            let keyframes = keyframes
                .into_iter()
                .map(|(key, frames)| {
                    let frames = match frames {
                        KeyframesRepr::Many(frames) => frames,
                        KeyframesRepr::One(frame) => vec![frame],
                    };
                    (key, frames)
                })
                .collect();
            Segment::Elements {
                targets,
                keyframes,
                transition,
            }
        };
        match repr {
            SegmentRepr::Label(name) => Segment::Label(name),
            SegmentRepr::Marker { name, at } => Segment::Marker { name, at },
            SegmentRepr::Animate(subject, keyframes, transition) => elements(subject, keyframes, transition),
            SegmentRepr::AnimateDefault(subject, keyframes) => elements(subject, keyframes, Transition::default()),
        }
    }
}

/// Identity of an animated subject
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SubjectKey {
    Element(String),
    Value(MotionValueId),
}

impl fmt::Display for SubjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectKey::Element(id) => f.write_str(id),
            SubjectKey::Value(id) => write!(f, "value#{}", id.0),
        }
    }
}

impl Serialize for SubjectKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Final keyframes and transitions of one subject
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AnimationDefinition {
    pub keyframes: IndexMap<String, Keyframes>,
    pub transition: IndexMap<String, Transition>,
}

/// Everything a sequence build produces
#[derive(Clone, Debug, Default, Serialize)]
pub struct SequenceDefinition {
    pub definitions: IndexMap<SubjectKey, AnimationDefinition>,
    /// Length of the whole sequence in seconds
    pub total_duration: f64,
    #[serde(skip)]
    pub values: FxHashMap<MotionValueId, MotionValue>,
}

impl SequenceDefinition {
    pub fn get(&self, subject: &SubjectKey) -> Option<&AnimationDefinition> {
        self.definitions.get(subject)
    }

    pub fn element(&self, id: &str) -> Option<&AnimationDefinition> {
        self.definitions.get(&SubjectKey::Element(id.to_string()))
    }
}

/// Sequence-wide options
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SequenceOptions {
    /// Defaults for every segment, also copied into produced transitions
    pub default_transition: Transition,
    /// Applied on top of every produced transition (e.g. sequence `repeat`)
    #[serde(flatten)]
    pub transition: Transition,
}

/// Builds [`SequenceDefinition`]s from segments
pub struct SequenceBuilder<'a> {
    config: &'a MotionConfig,
    options: SequenceOptions,
    generators: FxHashMap<String, GeneratorFactory>,
}

/// Mutable clocks of one build
struct Timeline {
    current: f64,
    prev: f64,
    total: f64,
    labels: FxHashMap<String, f64>,
}

impl<'a> SequenceBuilder<'a> {
    pub fn new(config: &'a MotionConfig) -> Self {
        Self {
            config,
            options: SequenceOptions::default(),
            generators: FxHashMap::default(),
        }
    }

    pub fn with_options(mut self, options: SequenceOptions) -> Self {
        self.options = options;
        self
    }

    /// Make a custom generator available as `type: "<name>"`
    pub fn with_generator(mut self, name: impl Into<String>, factory: GeneratorFactory) -> Self {
        self.generators.insert(name.into(), factory);
        self
    }

    /// Build the per-subject definitions for `segments`.
    ///
    /// The builder keeps no state between calls; identical input produces
    /// identical output.
    pub fn build(&self, segments: &[Segment]) -> Result<SequenceDefinition> {
        let mut sequences: IndexMap<SubjectKey, IndexMap<String, Vec<TimedKeyframe>>> = IndexMap::new();
        let mut values = FxHashMap::default();
        let mut timeline = Timeline {
            current: 0.0,
            prev: 0.0,
            total: 0.0,
            labels: FxHashMap::default(),
        };

        for segment in segments {
            match segment {
                Segment::Label(name) => {
                    timeline.labels.insert(name.clone(), timeline.current);
                }
                Segment::Marker { name, at } => {
                    let time = at.resolve(timeline.current, timeline.prev, &timeline.labels);
                    timeline.labels.insert(name.clone(), time);
                }
                Segment::Elements {
                    targets,
                    keyframes,
                    transition,
                } => {
                    let transition = self.options.default_transition.merge(transition);
                    self.seek(&mut timeline, &transition);
                    let mut max_duration: f64 = 0.0;
                    for (index, target) in targets.iter().enumerate() {
                        let subject = sequences.entry(SubjectKey::Element(target.clone())).or_default();
                        for (key, frames) in keyframes {
                            let sequence = subject.entry(key.clone()).or_default();
                            let duration = self.resolve_value_sequence(
                                key,
                                frames,
                                &transition.for_property(key),
                                sequence,
                                index,
                                targets.len(),
                                &mut timeline,
                            )?;
                            max_duration = max_duration.max(duration);
                        }
                    }
                    self.advance(&mut timeline, max_duration);
                }
                Segment::Value {
                    value,
                    keyframes,
                    transition,
                } => {
                    let transition = self.options.default_transition.merge(transition);
                    self.seek(&mut timeline, &transition);
                    values.insert(value.id(), value.clone());
                    let sequence = sequences
                        .entry(SubjectKey::Value(value.id()))
                        .or_default()
                        .entry(DEFAULT_PROPERTY.to_string())
                        .or_default();
                    let duration = self.resolve_value_sequence(
                        DEFAULT_PROPERTY,
                        keyframes,
                        &transition.for_property(DEFAULT_PROPERTY),
                        sequence,
                        0,
                        1,
                        &mut timeline,
                    )?;
                    self.advance(&mut timeline, duration);
                }
            }
        }

        let definitions = sequences
            .into_iter()
            .map(|(subject, properties)| {
                let definition = self.finalize(properties, timeline.total);
                (subject, definition)
            })
            .collect();

        debug!(
            segments = segments.len(),
            total_duration = timeline.total,
            "built animation sequence"
        );
        Ok(SequenceDefinition {
            definitions,
            total_duration: timeline.total,
            values,
        })
    }

    fn seek(&self, timeline: &mut Timeline, transition: &Transition) {
        if let Some(at) = &transition.at {
            timeline.current = at.resolve(timeline.current, timeline.prev, &timeline.labels);
        }
    }

    fn advance(&self, timeline: &mut Timeline, max_duration: f64) {
        timeline.prev = timeline.current;
        timeline.current += max_duration;
    }

    /// Place one property's keyframes; returns delay + duration
    #[allow(clippy::too_many_arguments)]
    fn resolve_value_sequence(
        &self,
        key: &str,
        keyframes: &[Option<AnimValue>],
        transition: &Transition,
        sequence: &mut Vec<TimedKeyframe>,
        subject_index: usize,
        subject_count: usize,
        timeline: &mut Timeline,
    ) -> Result<f64> {
        if keyframes.is_empty() {
            return Err(AnimationError::EmptyKeyframes(key.to_string()));
        }
        let mut keyframes = keyframes.to_vec();

        let delay = transition
            .delay
            .as_ref()
            .map(|delay| delay.resolve(subject_index, subject_count))
            .unwrap_or(0.0);
        let mut ease: Vec<Easing> = transition
            .ease
            .as_ref()
            .map(|ease| ease.as_slice().to_vec())
            .unwrap_or_else(|| vec![Easing::EaseOut]);
        let mut duration = transition.duration;

        let kind = transition.kind();
        if keyframes.len() <= 2 && kind.is_generator() {
            let scale = match keyframes.as_slice() {
                [Some(AnimValue::Number(from)), Some(AnimValue::Number(to))] => (to - from).abs(),
                _ => self.config.generator_easing_scale,
            };
            let options = transition.generator_options(Vec::new());
            let easing = match &kind {
                TransitionType::Custom(name) => {
                    let factory = self
                        .generators
                        .get(name)
                        .ok_or_else(|| AnimationError::UnknownGenerator(name.clone()))?;
                    create_generator_easing(&options, scale, self.config, |options| factory(options))?
                }
                builtin => match builtin.generator_kind() {
                    Some(generator) => builtin_generator_easing(generator, &options, scale, self.config)?,
                    None => return Err(AnimationError::UnknownGenerator(format!("{builtin:?}"))),
                },
            };
            trace!(property = key, duration = easing.duration, "generator flattened to easing");
            ease = vec![easing.ease];
            duration = Some(easing.duration);
        } else if let TransitionType::Custom(name) = &kind {
            if !self.generators.contains_key(name) {
                return Err(AnimationError::UnknownGenerator(name.clone()));
            }
        }
        let mut duration = duration.unwrap_or(self.config.default_duration);

        let start_time = timeline.current + delay;

        if keyframes.len() == 1 {
            keyframes.insert(0, None);
        }

        let mut times = transition.times.clone().unwrap_or_else(|| default_offset(&keyframes));
        if times.is_empty() {
            times.push(0.0);
        }
        if times.len() < keyframes.len() {
            let remaining = keyframes.len() - times.len();
            fill_offset(&mut times, remaining);
        }
        if times.len() != keyframes.len() {
            return Err(AnimationError::InvalidTimes {
                property: key.to_string(),
                reason: format!("{} times for {} keyframes", times.len(), keyframes.len()),
            });
        }

        if let Some(repeat) = transition.repeat.filter(|repeat| *repeat > 0) {
            if repeat >= self.config.max_repeat {
                return Err(AnimationError::RepeatTooHigh {
                    repeat,
                    max: self.config.max_repeat,
                });
            }
            let repeated = expand_repeat(
                &keyframes,
                &times,
                &ease,
                duration,
                repeat,
                transition.repeat_delay.unwrap_or(0.0),
            );
            keyframes = repeated.keyframes;
            times = repeated.times;
            ease = repeated.easings;
            duration = repeated.duration;
        }

        let target_time = start_time + duration;
        add_keyframes(sequence, &keyframes, &ease, &times, start_time, target_time);

        timeline.total = timeline.total.max(target_time);
        Ok(delay + duration)
    }

    /// Sort, normalise and pad each property timeline
    fn finalize(&self, properties: IndexMap<String, Vec<TimedKeyframe>>, total_duration: f64) -> AnimationDefinition {
        let mut definition = AnimationDefinition::default();
        // Timing and generator choice are already baked into the keyframes
        let mut base = self.options.default_transition.clone();
        base.properties.clear();
        base.at = None;
        base.delay = None;

        for (key, mut sequence) in properties {
            sequence.sort_by(compare_by_time);

            let mut keyframes = Vec::with_capacity(sequence.len() + 2);
            let mut offsets = Vec::with_capacity(sequence.len() + 2);
            let mut easings = Vec::with_capacity(sequence.len() + 2);
            for entry in sequence {
                keyframes.push(entry.value);
                offsets.push(progress(0.0, total_duration, entry.at));
                easings.push(entry.easing);
            }

            if offsets.first().is_some_and(|offset| *offset != 0.0) {
                offsets.insert(0, 0.0);
                keyframes.insert(0, keyframes[0].clone());
                easings.insert(0, Easing::EaseInOut);
            }
            if offsets.last().is_some_and(|offset| *offset != 1.0) {
                offsets.push(1.0);
                keyframes.push(None);
            }

            let transition = base.merge(&Transition {
                duration: Some(total_duration),
                kind: Some(TransitionType::Keyframes),
                ease: Some(Ease::PerSegment(easings)),
                times: Some(offsets),
                ..Default::default()
            });
            definition
                .transition
                .insert(key.clone(), transition.merge(&self.options.transition));
            definition.keyframes.insert(key, keyframes);
        }
        definition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::{Generator, GeneratorOptions, GeneratorState};
    use crate::transition::{Delay, Stagger};
    use std::rc::Rc;

    fn kf(values: &[f64]) -> Keyframes {
        values.iter().map(|v| Some(AnimValue::from(*v))).collect()
    }

    fn times(definition: &SequenceDefinition, id: &str, key: &str) -> Vec<f64> {
        definition.element(id).unwrap().transition[key].times.clone().unwrap()
    }

    #[test]
    fn test_sequential_segments() {
        let config = MotionConfig::default();
        let definition = SequenceBuilder::new(&config)
            .build(&[
                Segment::animate("a", [("x", kf(&[0.0, 100.0]))], Transition::new().with_duration(1.0)),
                Segment::animate("b", [("x", kf(&[0.0, 200.0]))], Transition::new().with_duration(1.0)),
            ])
            .unwrap();
        assert_eq!(definition.total_duration, 2.0);
        assert_eq!(times(&definition, "a", "x"), vec![0.0, 0.5, 1.0]);
        assert_eq!(definition.element("a").unwrap().keyframes["x"][2], None);
        assert_eq!(times(&definition, "b", "x"), vec![0.0, 0.5, 1.0]);
        assert_eq!(definition.element("b").unwrap().keyframes["x"][0], Some(0.0.into()));
    }

    #[test]
    fn test_with_previous_starts_together() {
        let config = MotionConfig::default();
        let definition = SequenceBuilder::new(&config)
            .build(&[
                Segment::animate("a", [("x", kf(&[0.0, 100.0]))], Transition::new().with_duration(1.0)),
                Segment::animate("b", [("x", kf(&[0.0, 200.0]))], Transition::new().with_duration(1.0).with_at("<")),
            ])
            .unwrap();
        assert_eq!(definition.total_duration, 1.0);
        assert_eq!(times(&definition, "a", "x"), vec![0.0, 1.0]);
        assert_eq!(times(&definition, "b", "x"), vec![0.0, 1.0]);
        assert_eq!(definition.element("a").unwrap().keyframes["x"], kf(&[0.0, 100.0]));
        assert_eq!(definition.element("b").unwrap().keyframes["x"], kf(&[0.0, 200.0]));
    }

    #[test]
    fn test_later_segment_replaces_overlapped_keyframes() {
        let config = MotionConfig::default();
        let definition = SequenceBuilder::new(&config)
            .build(&[
                Segment::animate("a", [("x", kf(&[0.0, 100.0, 200.0]))], Transition::new().with_duration(2.0)),
                Segment::animate("a", [("x", kf(&[50.0, 60.0]))], Transition::new().with_duration(1.0).with_at(0.5)),
            ])
            .unwrap();
        assert_eq!(definition.total_duration, 2.0);
        // The keyframe at 1s fell inside the second window and is gone
        assert_eq!(times(&definition, "a", "x"), vec![0.0, 0.25, 0.75, 1.0]);
        assert_eq!(
            definition.element("a").unwrap().keyframes["x"],
            kf(&[0.0, 50.0, 60.0, 200.0])
        );
    }

    #[test]
    fn test_label_and_relative_offsets() {
        let config = MotionConfig::default();
        let definition = SequenceBuilder::new(&config)
            .build(&[
                Segment::animate("a", [("x", kf(&[0.0, 1.0]))], Transition::new().with_duration(1.0)),
                Segment::label("mid"),
                Segment::animate("b", [("x", kf(&[0.0, 1.0]))], Transition::new().with_duration(1.0).with_at("+0.5")),
                Segment::animate("c", [("x", kf(&[0.0, 1.0]))], Transition::new().with_duration(1.0).with_at("mid")),
            ])
            .unwrap();
        assert_eq!(definition.total_duration, 2.5);
        let c = times(&definition, "c", "x");
        assert!((c[1] - 1.0 / 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_marker_does_not_advance_time() {
        let config = MotionConfig::default();
        let definition = SequenceBuilder::new(&config)
            .build(&[
                Segment::marker("later", 2.0),
                Segment::animate("a", [("x", kf(&[0.0, 1.0]))], Transition::new().with_duration(1.0)),
                Segment::animate("b", [("x", kf(&[0.0, 1.0]))], Transition::new().with_duration(1.0).with_at("later")),
            ])
            .unwrap();
        assert_eq!(definition.total_duration, 3.0);
    }

    #[test]
    fn test_single_keyframe_is_prefixed_with_wildcard() {
        let config = MotionConfig::default();
        let definition = SequenceBuilder::new(&config)
            .build(&[Segment::animate("a", [("opacity", kf(&[1.0]))], Transition::new())])
            .unwrap();
        let a = definition.element("a").unwrap();
        assert_eq!(a.keyframes["opacity"], vec![None, Some(1.0.into())]);
        assert_eq!(definition.total_duration, config.default_duration);
    }

    #[test]
    fn test_stagger_delays_each_target() {
        let config = MotionConfig::default();
        let transition = Transition::new().with_duration(1.0).with_delay(Delay::Stagger(Stagger {
            each: 0.5,
            ..Default::default()
        }));
        let definition = SequenceBuilder::new(&config)
            .build(&[Segment::animate_all(
                vec!["a".into(), "b".into(), "c".into()],
                [("x", kf(&[0.0, 1.0]))],
                transition,
            )])
            .unwrap();
        assert_eq!(definition.total_duration, 2.0);
        assert_eq!(times(&definition, "a", "x"), vec![0.0, 0.5, 1.0]);
        assert_eq!(times(&definition, "c", "x"), vec![0.0, 0.5, 1.0]);
        assert_eq!(
            definition.element("c").unwrap().keyframes["x"],
            vec![Some(0.0.into()), Some(0.0.into()), Some(1.0.into())]
        );
    }

    #[test]
    fn test_repeat_too_high() {
        let config = MotionConfig::default();
        let err = SequenceBuilder::new(&config)
            .build(&[Segment::animate(
                "a",
                [("x", kf(&[0.0, 1.0]))],
                Transition::new().with_repeat(config.max_repeat),
            )])
            .err();
        assert!(matches!(err, Some(AnimationError::RepeatTooHigh { .. })));
    }

    #[test]
    fn test_spring_segment_uses_generator_duration() {
        let config = MotionConfig::default();
        let transition = Transition {
            kind: Some(TransitionType::Spring),
            duration: Some(0.5),
            bounce: Some(0.2),
            ..Default::default()
        };
        let definition = SequenceBuilder::new(&config)
            .build(&[Segment::animate("a", [("x", kf(&[0.0, 300.0]))], transition)])
            .unwrap();
        assert_eq!(definition.total_duration, 0.5);
    }

    struct Linear;

    impl Generator for Linear {
        fn next(&mut self, t: f64) -> GeneratorState {
            GeneratorState {
                value: (t / 10.0).min(100.0).into(),
                done: t >= 1000.0,
            }
        }
    }

    #[test]
    fn test_custom_generators() {
        let config = MotionConfig::default();
        let segment = Segment::animate(
            "a",
            [("x", kf(&[0.0, 100.0]))],
            Transition::new().with_type(TransitionType::Custom("ramp".into())),
        );

        let err = SequenceBuilder::new(&config).build(std::slice::from_ref(&segment)).err();
        assert_eq!(err, Some(AnimationError::UnknownGenerator("ramp".into())));

        let definition = SequenceBuilder::new(&config)
            .with_generator(
                "ramp",
                Rc::new(|_: &GeneratorOptions| Ok::<_, AnimationError>(Box::new(Linear) as Box<dyn Generator>)),
            )
            .build(&[segment])
            .unwrap();
        assert_eq!(definition.total_duration, 1.0);
    }

    #[test]
    fn test_sequence_options_layer_into_transitions() {
        let config = MotionConfig::default();
        let options = SequenceOptions {
            default_transition: Transition::new().with_duration(2.0),
            transition: Transition::new().with_repeat(1),
        };
        let definition = SequenceBuilder::new(&config)
            .with_options(options)
            .build(&[Segment::animate("a", [("x", kf(&[0.0, 1.0]))], Transition::new())])
            .unwrap();
        assert_eq!(definition.total_duration, 2.0);
        let transition = &definition.element("a").unwrap().transition["x"];
        assert_eq!(transition.duration, Some(2.0));
        assert_eq!(transition.repeat, Some(1));
    }

    #[test]
    fn test_deserialize_segments() {
        let json = r#"[
            ["box", { "x": [0, 100] }, { "duration": 1 }],
            "after-box",
            { "name": "half", "at": 0.5 },
            [["a", "b"], { "opacity": 1 }],
            ["box", { "x": null }, { "at": "<" }]
        ]"#;
        let segments: Vec<Segment> = serde_json::from_str(json).unwrap();
        assert_eq!(segments.len(), 5);
        assert!(matches!(&segments[1], Segment::Label(name) if name == "after-box"));
        assert!(matches!(&segments[2], Segment::Marker { at: At::Time(t), .. } if *t == 0.5));
        match &segments[3] {
            Segment::Elements { targets, keyframes, .. } => {
                assert_eq!(targets.len(), 2);
                assert_eq!(keyframes["opacity"], vec![Some(AnimValue::from(1.0))]);
            }
            other => panic!("unexpected segment {other:?}"),
        }
        match &segments[4] {
            Segment::Elements { keyframes, .. } => assert_eq!(keyframes["x"], vec![None]),
            other => panic!("unexpected segment {other:?}"),
        }
    }
}
