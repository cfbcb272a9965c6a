//! Turning sequence definitions into running animations
//!
//! Each (subject, property) of a built sequence becomes one animation:
//! native when the property can run on the compositor and the platform
//! allows it, software otherwise.

use crate::context::MotionContext;
use crate::driver::ValueAnimation;
use crate::error::{AnimationError, Result};
use crate::handoff::HandoffHooks;
use crate::keyframes::fill_wildcards;
use crate::native::{is_accelerated, NativeAnimator, NativeKeyframeOptions, NativePlayback};
use crate::playback::{GroupPlayback, Playback};
use crate::sequence::{Keyframes, Segment, SequenceBuilder, SequenceDefinition, SequenceOptions, SubjectKey};
use crate::transition::Transition;
use motive_core::{AnimValue, MotionValue};
use std::rc::Rc;
use tracing::{debug, warn};

/// Build `segments` and start every resulting animation
pub fn animate_sequence(context: &MotionContext, segments: &[Segment], options: SequenceOptions) -> Result<GroupPlayback> {
    let mut builder = SequenceBuilder::new(context.config()).with_options(options);
    for (name, factory) in context.generators() {
        builder = builder.with_generator(name.clone(), factory.clone());
    }
    let definition = builder.build(segments)?;
    realize(context, &definition)
}

/// Start the animations described by `definition`
pub fn realize(context: &MotionContext, definition: &SequenceDefinition) -> Result<GroupPlayback> {
    let mut group = GroupPlayback::default();
    for (subject, animation) in &definition.definitions {
        for (property, keyframes) in &animation.keyframes {
            let transition = animation
                .transition
                .get(property)
                .cloned()
                .unwrap_or_default();
            let playback = match subject {
                SubjectKey::Value(id) => {
                    let value = definition
                        .values
                        .get(id)
                        .ok_or_else(|| AnimationError::UnknownSubject(subject.to_string()))?;
                    Rc::new(animate_value(context, value, keyframes, &transition)?) as Rc<dyn Playback>
                }
                SubjectKey::Element(element_id) => {
                    animate_element_property(context, element_id, property, keyframes, &transition)?
                }
            };
            group.push(playback);
        }
    }
    debug!(animations = group.len(), "sequence realised");
    Ok(group)
}

/// Animate a motion value through `keyframes` in software
pub fn animate_value(
    context: &MotionContext,
    value: &MotionValue,
    keyframes: &[Option<AnimValue>],
    transition: &Transition,
) -> Result<ValueAnimation> {
    let keyframes = resolve_keyframes(keyframes, || value.get());
    ValueAnimation::start(context.frame(), value, keyframes, transition, context.config())
}

/// Animate one property of a registered element
pub fn animate_element_property(
    context: &MotionContext,
    element_id: &str,
    property: &str,
    keyframes: &Keyframes,
    transition: &Transition,
) -> Result<Rc<dyn Playback>> {
    let element = context
        .elements()
        .get(element_id)
        .ok_or_else(|| AnimationError::UnknownSubject(element_id.to_string()))?;
    let fallback = keyframes.iter().flatten().next().cloned();
    let value = context
        .elements()
        .value(element_id, property, fallback)
        .ok_or_else(|| AnimationError::UnknownSubject(element_id.to_string()))?;
    let keyframes = resolve_keyframes(keyframes, || value.get());

    let start_time = element
        .appear_id()
        .and_then(|appear_id| context.hooks().handoff(appear_id, property, context.frame()));

    if is_accelerated(property) {
        if let Some(animator) = context.animator() {
            match start_native(context, animator, element_id, property, &value, keyframes.clone(), transition) {
                Ok(playback) => {
                    if let Some(start_time) = start_time {
                        playback.animation().set_start_time(Some(start_time));
                    }
                    return Ok(Rc::new(playback));
                }
                Err(error) => warn!(element = element_id, property, %error, "falling back to software animation"),
            }
        }
    }

    let animation = ValueAnimation::new(context.frame(), &value, keyframes, transition, context.config())?;
    match start_time {
        Some(start_time) => animation.play_from(start_time),
        None => animation.play(),
    }
    Ok(Rc::new(animation))
}

fn start_native(
    context: &MotionContext,
    animator: &Rc<dyn NativeAnimator>,
    element_id: &str,
    property: &str,
    value: &MotionValue,
    keyframes: Vec<AnimValue>,
    transition: &Transition,
) -> Result<NativePlayback> {
    let options = NativeKeyframeOptions::from_transition(transition, context.capabilities(), context.config());
    let final_value = keyframes.last().cloned();
    let playback = NativePlayback::start(animator, element_id, property, keyframes, options)?;
    // Native playback bypasses the motion value; sync it once finished
    if let Some(final_value) = final_value {
        let value = value.clone();
        playback.on_finish(Box::new(move || value.set(final_value)));
    }
    Ok(playback)
}

/// Concrete keyframes: a leading `None` reads the live value, later ones
/// repeat the previous keyframe
fn resolve_keyframes<F>(keyframes: &[Option<AnimValue>], read_live: F) -> Vec<AnimValue>
where
    F: FnOnce() -> AnimValue,
{
    let mut keyframes = keyframes.to_vec();
    if let Some(first) = keyframes.first_mut() {
        if first.is_none() {
            *first = Some(read_live());
        }
    }
    fill_wildcards(&mut keyframes);
    keyframes.into_iter().flatten().collect()
}
