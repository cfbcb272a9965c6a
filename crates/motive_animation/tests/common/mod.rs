//! Host fakes shared by the integration tests

#![allow(dead_code)]

use indexmap::IndexMap;
use motive_animation::element::VisualElement;
use motive_animation::native::{NativeAnimation, NativeAnimator, NativeKeyframeOptions};
use motive_animation::scroll::ScrollNode;
use motive_animation::{MotionContext, PlayState};
use motive_core::{AnimValue, Capabilities, ManualClock};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Platform animation that only moves when told to
#[derive(Default)]
pub struct FakeAnimation {
    pub state: Cell<PlayState>,
    pub start_time: Cell<Option<f64>>,
    pub cancelled: Cell<bool>,
    on_finish: RefCell<Option<Box<dyn FnMut()>>>,
}

impl NativeAnimation for FakeAnimation {
    fn play(&self) {
        self.state.set(PlayState::Running);
    }
    fn pause(&self) {
        self.state.set(PlayState::Paused);
    }
    fn cancel(&self) {
        self.cancelled.set(true);
        self.state.set(PlayState::Idle);
    }
    fn finish(&self) {
        self.state.set(PlayState::Finished);
        let callback = self.on_finish.borrow_mut().take();
        if let Some(mut callback) = callback {
            callback();
        }
    }
    fn current_time(&self) -> Option<f64> {
        None
    }
    fn set_current_time(&self, _ms: f64) {}
    fn start_time(&self) -> Option<f64> {
        self.start_time.get()
    }
    fn set_start_time(&self, start_time: Option<f64>) {
        self.start_time.set(start_time);
    }
    fn playback_rate(&self) -> f64 {
        1.0
    }
    fn set_playback_rate(&self, _rate: f64) {}
    fn play_state(&self) -> PlayState {
        self.state.get()
    }
    fn set_on_finish(&self, callback: Option<Box<dyn FnMut()>>) {
        *self.on_finish.borrow_mut() = callback;
    }
}

pub struct Started {
    pub property: String,
    pub keyframes: Vec<AnimValue>,
    pub options: NativeKeyframeOptions,
    pub animation: Rc<FakeAnimation>,
}

/// Records every native animation and committed style
#[derive(Default)]
pub struct Platform {
    pub started: RefCell<Vec<Started>>,
    pub committed: RefCell<Vec<(String, AnimValue)>>,
    pub refuse: Cell<bool>,
}

impl Platform {
    pub fn last(&self) -> Rc<FakeAnimation> {
        self.started.borrow().last().map(|s| s.animation.clone()).unwrap()
    }
}

impl NativeAnimator for Platform {
    fn animate(
        &self,
        _element_id: &str,
        property: &str,
        keyframes: &[AnimValue],
        options: &NativeKeyframeOptions,
    ) -> Result<Rc<dyn NativeAnimation>, String> {
        if self.refuse.get() {
            return Err("compositor busy".to_string());
        }
        let animation = Rc::new(FakeAnimation::default());
        animation.play();
        self.started.borrow_mut().push(Started {
            property: property.to_string(),
            keyframes: keyframes.to_vec(),
            options: options.clone(),
            animation: animation.clone(),
        });
        Ok(animation)
    }

    fn commit_style(&self, _element_id: &str, property: &str, value: &AnimValue) {
        self.committed.borrow_mut().push((property.to_string(), value.clone()));
    }
}

/// Element that remembers what it was asked to render
pub struct Element {
    pub id: String,
    pub appear_id: Option<String>,
    pub rendered: RefCell<IndexMap<String, AnimValue>>,
    pub renders: Cell<u32>,
}

impl Element {
    pub fn new(id: &str) -> Rc<Self> {
        Rc::new(Self {
            id: id.to_string(),
            appear_id: None,
            rendered: RefCell::new(IndexMap::new()),
            renders: Cell::new(0),
        })
    }

    pub fn appearing(id: &str, appear_id: &str) -> Rc<Self> {
        Rc::new(Self {
            id: id.to_string(),
            appear_id: Some(appear_id.to_string()),
            rendered: RefCell::new(IndexMap::new()),
            renders: Cell::new(0),
        })
    }

    pub fn rendered(&self, property: &str) -> Option<f64> {
        self.rendered.borrow().get(property).and_then(|value| value.as_number())
    }
}

impl VisualElement for Element {
    fn id(&self) -> &str {
        &self.id
    }
    fn read_value_from_instance(&self, property: &str) -> Option<AnimValue> {
        match property {
            "opacity" => Some(1.0.into()),
            _ => None,
        }
    }
    fn build(&self, latest: &IndexMap<String, AnimValue>) {
        *self.rendered.borrow_mut() = latest.clone();
    }
    fn render_instance(&self) {
        self.renders.set(self.renders.get() + 1);
    }
    fn appear_id(&self) -> Option<&str> {
        self.appear_id.as_deref()
    }
}

/// Scrollable page: 2000 tall, 1000 visible
pub struct Page {
    pub scroll_top: Cell<f64>,
}

impl Page {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            scroll_top: Cell::new(0.0),
        })
    }
}

impl ScrollNode for Page {
    fn id(&self) -> &str {
        "page"
    }
    fn scroll_position(&self) -> (f64, f64) {
        (0.0, self.scroll_top.get())
    }
    fn scroll_size(&self) -> (f64, f64) {
        (1000.0, 2000.0)
    }
    fn client_size(&self) -> (f64, f64) {
        (1000.0, 1000.0)
    }
    fn offset_within(&self, _container: &dyn ScrollNode) -> (f64, f64) {
        (0.0, 0.0)
    }
}

pub fn software_context(start: f64) -> MotionContext {
    MotionContext::builder()
        .clock(Rc::new(ManualClock::new(start)))
        .init()
        .unwrap()
}

pub fn native_context(start: f64, platform: Rc<Platform>) -> MotionContext {
    MotionContext::builder()
        .clock(Rc::new(ManualClock::new(start)))
        .capabilities(Capabilities {
            native_animations: true,
            ..Capabilities::default()
        })
        .animator(platform)
        .init()
        .unwrap()
}

pub fn approx(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 1e-6, "expected {expected}, got {actual}");
}
