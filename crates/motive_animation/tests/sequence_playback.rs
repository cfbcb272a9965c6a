//! Integration tests for sequences realised as running animations
//!
//! These tests verify that:
//! - Built sequences drive motion values and element renders frame by frame
//! - Accelerated properties go native and fall back to software on refusal
//! - Appear animations hand their start time over to the replacing animation

mod common;

use common::{approx, native_context, software_context, Element, Platform};
use motive_animation::sequence::Keyframes;
use motive_animation::{
    animate_sequence, AnimationError, Easing, NativeAnimation, PlayState, Playback, Segment, SequenceOptions, Transition,
};
use motive_core::{AnimValue, MotionValue};
use std::rc::Rc;

fn kf(values: &[f64]) -> Keyframes {
    values.iter().map(|v| Some(AnimValue::from(*v))).collect()
}

fn linear(duration: f64) -> Transition {
    Transition::new().with_duration(duration).with_ease(Easing::Linear)
}

#[test]
fn test_value_sequence_runs_to_completion() {
    let context = software_context(0.0);
    let a = MotionValue::new(context.frame(), 0.0);
    let b = MotionValue::new(context.frame(), 0.0);
    let segments = vec![
        Segment::value(&a, kf(&[0.0, 100.0]), linear(1.0)),
        Segment::value(&b, kf(&[0.0, 10.0]), linear(1.0)),
    ];
    let group = animate_sequence(&context, &segments, SequenceOptions::default()).unwrap();
    assert_eq!(group.len(), 2);
    approx(group.duration(), 2.0);

    context.frame().process_frame(0.0);
    context.frame().process_frame(1000.0);
    approx(a.get_number().unwrap(), 100.0);
    approx(b.get_number().unwrap(), 0.0);

    context.frame().process_frame(1500.0);
    approx(b.get_number().unwrap(), 5.0);

    context.frame().process_frame(2000.0);
    approx(b.get_number().unwrap(), 10.0);
    assert!(group.animations().iter().all(|a| a.state() == PlayState::Finished));
    assert_eq!(context.frame().process_count(), 0);
}

#[test]
fn test_element_sequence_renders_each_frame() {
    let context = software_context(0.0);
    let element = Element::new("box");
    context.elements().register(element.clone());

    let segments = vec![Segment::animate("box", [("x", kf(&[0.0, 100.0]))], linear(1.0))];
    animate_sequence(&context, &segments, SequenceOptions::default()).unwrap();

    context.frame().process_frame(0.0);
    context.frame().process_frame(500.0);
    approx(element.rendered("x").unwrap(), 50.0);
    let renders = element.renders.get();

    context.frame().process_frame(1000.0);
    approx(element.rendered("x").unwrap(), 100.0);
    assert_eq!(element.renders.get(), renders + 1);
}

#[test]
fn test_unknown_element_is_an_error() {
    let context = software_context(0.0);
    let segments = vec![Segment::animate("ghost", [("x", kf(&[0.0, 1.0]))], linear(1.0))];
    let error = animate_sequence(&context, &segments, SequenceOptions::default()).unwrap_err();
    assert_eq!(error, AnimationError::UnknownSubject("ghost".to_string()));
}

#[test]
fn test_json_segments() {
    let context = software_context(0.0);
    let element = Element::new("box");
    context.elements().register(element.clone());

    let segments: Vec<Segment> = serde_json::from_str(
        r#"[
            ["box", { "x": [0, 100] }, { "duration": 1, "ease": "linear" }],
            "settled",
            ["box", { "x": 0 }, { "duration": 1, "ease": "linear", "at": "settled" }]
        ]"#,
    )
    .unwrap();
    let group = animate_sequence(&context, &segments, SequenceOptions::default()).unwrap();
    approx(group.duration(), 2.0);

    context.frame().process_frame(0.0);
    context.frame().process_frame(1000.0);
    approx(element.rendered("x").unwrap(), 100.0);
    context.frame().process_frame(1500.0);
    approx(element.rendered("x").unwrap(), 50.0);
}

#[test]
fn test_accelerated_property_runs_natively() {
    let platform = Rc::new(Platform::default());
    let context = native_context(0.0, platform.clone());
    context.elements().register(Element::new("box"));

    let segments = vec![Segment::animate("box", [("opacity", kf(&[1.0, 0.0]))], linear(1.0))];
    let group = animate_sequence(&context, &segments, SequenceOptions::default()).unwrap();
    {
        let started = platform.started.borrow();
        assert_eq!(started.len(), 1);
        assert_eq!(started[0].property, "opacity");
        assert_eq!(started[0].keyframes, vec![AnimValue::from(1.0), AnimValue::from(0.0)]);
        assert_eq!(started[0].options.duration, 1000.0);
    }
    approx(group.duration(), 1.0);

    platform.last().finish();
    assert_eq!(*platform.committed.borrow(), vec![("opacity".to_string(), AnimValue::from(0.0))]);
    let opacity = context.elements().value("box", "opacity", None).unwrap();
    assert_eq!(opacity.get_number(), Some(0.0));
}

#[test]
fn test_refused_native_animation_falls_back_to_software() {
    let platform = Rc::new(Platform::default());
    platform.refuse.set(true);
    let context = native_context(0.0, platform.clone());
    let element = Element::new("box");
    context.elements().register(element.clone());

    let segments = vec![Segment::animate("box", [("opacity", kf(&[1.0, 0.0]))], linear(1.0))];
    animate_sequence(&context, &segments, SequenceOptions::default()).unwrap();
    assert!(platform.started.borrow().is_empty());

    context.frame().process_frame(0.0);
    context.frame().process_frame(500.0);
    approx(element.rendered("opacity").unwrap(), 0.5);
}

#[test]
fn test_software_animation_continues_appear_animation() {
    let platform = Rc::new(Platform::default());
    let context = native_context(40.0, platform.clone());
    let (keyframes, options) = {
        let transition = linear(1.0);
        (
            vec![AnimValue::from(0.0), AnimValue::from(100.0)],
            motive_animation::NativeKeyframeOptions::from_transition(&transition, context.capabilities(), context.config()),
        )
    };
    assert!(context
        .appear()
        .start_optimized_appear("hero", "x", keyframes, options, None)
        .unwrap());
    context.mark_mounted();

    let element = Element::appearing("box", "hero");
    context.elements().register(element.clone());
    let segments = vec![Segment::animate("box", [("x", kf(&[0.0, 100.0]))], linear(1.0))];
    animate_sequence(&context, &segments, SequenceOptions::default()).unwrap();

    // Picks up 500ms into the animation that started at 40
    context.frame().process_frame(540.0);
    approx(element.rendered("x").unwrap(), 50.0);
}

#[test]
fn test_native_animation_continues_appear_animation() {
    let platform = Rc::new(Platform::default());
    let context = native_context(40.0, platform.clone());
    let options = motive_animation::NativeKeyframeOptions::from_transition(
        &linear(1.0),
        context.capabilities(),
        context.config(),
    );
    context
        .appear()
        .start_optimized_appear("hero", "opacity", vec![0.0.into(), 1.0.into()], options, None)
        .unwrap();
    let appear = platform.last();

    context.elements().register(Element::appearing("box", "hero"));
    let segments = vec![Segment::animate("box", [("opacity", kf(&[0.0, 1.0]))], linear(1.0))];
    animate_sequence(&context, &segments, SequenceOptions::default()).unwrap();

    let replacement = platform.last();
    assert!(!Rc::ptr_eq(&appear, &replacement));
    assert_eq!(replacement.start_time.get(), Some(40.0));

    // The appear animation goes away two frames after it finishes
    appear.finish();
    context.frame().process_frame(56.0);
    context.frame().process_frame(72.0);
    assert!(appear.cancelled.get());
    assert!(context.appear().is_empty());
}
