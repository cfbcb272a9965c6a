//! Integration tests for scroll tracking through a motion context

mod common;

use common::{approx, software_context, Page};
use motive_animation::scroll::{Intersection, NodeRef, ScrollMotionValues, ScrollNode};
use motive_animation::{animate_value, Easing, ScrollOptions, Transition};
use std::cell::RefCell;
use std::rc::Rc;

fn scroll_to(context: &motive_animation::MotionContext, page: &Page, top: f64, timestamp: f64) {
    page.scroll_top.set(top);
    context.scroll_registry().notify_scroll("page");
    context.frame().process_frame(timestamp);
}

#[test]
fn test_progress_spans_scrollable_length() {
    let context = software_context(0.0);
    let page = Page::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let subscription = context
        .scroll()
        .scroll_callback(ScrollOptions::new(page.clone()), move |progress, info| {
            sink.borrow_mut().push((progress, info.y.scroll_length));
        });

    context.frame().process_frame(16.0);
    scroll_to(&context, &page, 1000.0, 32.0);
    assert_eq!(*seen.borrow(), vec![(0.0, 1000.0), (1.0, 1000.0)]);

    subscription.cancel();
    assert_eq!(context.scroll_registry().listener_count(), 0);
}

#[test]
fn test_overscroll_is_clamped() {
    let context = software_context(0.0);
    let page = Page::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let offset: Vec<Intersection> = vec!["start".parse().unwrap(), "end".parse().unwrap()];
    let _subscription = context.scroll().scroll_callback(
        ScrollOptions::new(page.clone()).with_offset(offset),
        move |progress, _| sink.borrow_mut().push(progress),
    );

    scroll_to(&context, &page, -200.0, 16.0);
    scroll_to(&context, &page, 1300.0, 32.0);
    assert_eq!(*seen.borrow(), vec![0.0, 1.0]);
}

#[test]
fn test_whole_container_overscroll_is_clamped() {
    let context = software_context(0.0);
    let page = Page::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let _subscription = context
        .scroll()
        .scroll_callback(ScrollOptions::new(page.clone()), move |progress, _| sink.borrow_mut().push(progress));
    let timeline = context.scroll().get_timeline(&ScrollOptions::new(page.clone()));
    assert!(!timeline.is_native());

    scroll_to(&context, &page, -200.0, 16.0);
    assert_eq!(timeline.current_time(), Some(0.0));
    scroll_to(&context, &page, 1300.0, 32.0);
    assert_eq!(timeline.current_time(), Some(100.0));
    assert_eq!(*seen.borrow(), vec![0.0, 1.0]);
}

#[test]
fn test_stale_velocity_reads_zero() {
    let context = software_context(0.0);
    let page = Page::new();
    let velocities = Rc::new(RefCell::new(Vec::new()));
    let sink = velocities.clone();
    let _subscription = context
        .scroll()
        .scroll_callback(ScrollOptions::new(page.clone()), move |_, info| sink.borrow_mut().push(info.y.velocity));

    context.frame().process_frame(0.0);
    scroll_to(&context, &page, 10.0, 10.0);
    scroll_to(&context, &page, 20.0, 200.0);
    let velocities = velocities.borrow();
    assert_eq!(velocities[1], 1000.0);
    assert_eq!(velocities[2], 0.0);
}

#[test]
fn test_scroll_scrubs_software_animation() {
    let context = software_context(0.0);
    let page = Page::new();
    let x = motive_core::MotionValue::new(context.frame(), 0.0);
    let animation = animate_value(
        &context,
        &x,
        &[Some(0.0.into()), Some(100.0.into())],
        &Transition::new().with_duration(1.0).with_ease(Easing::Linear),
    )
    .unwrap();

    let subscription = context
        .scroll()
        .scroll_animation(Rc::new(animation), &ScrollOptions::new(page.clone()));
    scroll_to(&context, &page, 500.0, 16.0);
    context.frame().process_frame(32.0);
    approx(x.get_number().unwrap(), 50.0);

    scroll_to(&context, &page, 250.0, 48.0);
    context.frame().process_frame(64.0);
    approx(x.get_number().unwrap(), 25.0);
    subscription.cancel();
}

#[test]
fn test_scroll_motion_values_follow_target() {
    struct Section;

    impl ScrollNode for Section {
        fn id(&self) -> &str {
            "section"
        }
        fn scroll_position(&self) -> (f64, f64) {
            (0.0, 0.0)
        }
        fn scroll_size(&self) -> (f64, f64) {
            (1000.0, 500.0)
        }
        fn client_size(&self) -> (f64, f64) {
            (1000.0, 500.0)
        }
        fn offset_within(&self, _container: &dyn ScrollNode) -> (f64, f64) {
            (0.0, 1000.0)
        }
    }

    let context = software_context(0.0);
    let page = Page::new();
    let offset: Vec<Intersection> = vec!["start end".parse().unwrap(), "end end".parse().unwrap()];
    let mut values = ScrollMotionValues::track(
        context.scroll_registry(),
        context.frame(),
        NodeRef::Attached(page.clone()),
        Some(NodeRef::Attached(Rc::new(Section))),
        Some(offset),
    );
    assert!(values.is_tracking());

    // Section enters at scroll 0 and is fully visible at 500
    scroll_to(&context, &page, 250.0, 16.0);
    approx(values.scroll_y.get_number().unwrap(), 250.0);
    approx(values.scroll_y_progress.get_number().unwrap(), 0.5);

    values.detach(context.scroll_registry());
    assert!(!values.is_tracking());
    assert_eq!(context.scroll_registry().listener_count(), 0);
}
