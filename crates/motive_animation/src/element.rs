//! Visual elements and their motion values
//!
//! The host renders; the engine only keeps one [`MotionValue`] per animated
//! property and asks the element to re-render, at most once per frame, when
//! any of them changes.

use indexmap::IndexMap;
use motive_core::{AnimValue, Frameloop, MotionConfig, MotionEvent, MotionValue, Phase, ProcessId};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::debug;

/// A host element the engine can animate
pub trait VisualElement {
    fn id(&self) -> &str;

    /// Called once when the element is registered
    fn mount(&self) {}

    /// Current rendered value of `property`, if the host can read it
    fn read_value_from_instance(&self, property: &str) -> Option<AnimValue>;

    /// Turn the latest property values into render state
    fn build(&self, latest: &IndexMap<String, AnimValue>);

    /// Apply the built render state to the instance
    fn render_instance(&self);

    /// Identifier of optimised appear animations started for this element
    fn appear_id(&self) -> Option<&str> {
        None
    }
}

struct Binding {
    element: Rc<dyn VisualElement>,
    values: RefCell<IndexMap<String, MotionValue>>,
    render: ProcessId,
}

impl Binding {
    fn latest(&self) -> IndexMap<String, AnimValue> {
        self.values
            .borrow()
            .iter()
            .map(|(property, value)| (property.clone(), value.get()))
            .collect()
    }
}

struct RegistryInner {
    frame: Frameloop,
    config: MotionConfig,
    bindings: RefCell<FxHashMap<String, Rc<Binding>>>,
}

/// Elements known to the engine, keyed by id
#[derive(Clone)]
pub struct ElementRegistry {
    inner: Rc<RegistryInner>,
}

impl ElementRegistry {
    pub fn new(frame: &Frameloop, config: &MotionConfig) -> Self {
        Self {
            inner: Rc::new(RegistryInner {
                frame: frame.clone(),
                config: config.clone(),
                bindings: RefCell::new(FxHashMap::default()),
            }),
        }
    }

    /// Register and mount `element`, replacing any element with the same id
    pub fn register(&self, element: Rc<dyn VisualElement>) {
        let id = element.id().to_string();
        let weak: Weak<RegistryInner> = Rc::downgrade(&self.inner);
        let render_id = id.clone();
        let render = self.inner.frame.register(move |_| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let binding = inner.bindings.borrow().get(&render_id).cloned();
            if let Some(binding) = binding {
                let latest = binding.latest();
                binding.element.build(&latest);
                binding.element.render_instance();
            }
        });

        element.mount();
        let binding = Rc::new(Binding {
            element,
            values: RefCell::new(IndexMap::new()),
            render,
        });
        let previous = self.inner.bindings.borrow_mut().insert(id.clone(), binding);
        if let Some(previous) = previous {
            Self::release(&self.inner.frame, &previous);
        }
        debug!(element = %id, "element registered");
    }

    /// Forget an element, destroying its motion values
    pub fn unregister(&self, id: &str) {
        let removed = self.inner.bindings.borrow_mut().remove(id);
        if let Some(binding) = removed {
            Self::release(&self.inner.frame, &binding);
            debug!(element = id, "element unregistered");
        }
    }

    fn release(frame: &Frameloop, binding: &Binding) {
        frame.unregister(binding.render);
        let values = std::mem::take(&mut *binding.values.borrow_mut());
        for value in values.values() {
            value.destroy();
        }
    }

    pub fn get(&self, id: &str) -> Option<Rc<dyn VisualElement>> {
        self.inner.bindings.borrow().get(id).map(|binding| binding.element.clone())
    }

    pub fn len(&self) -> usize {
        self.inner.bindings.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Motion value of `property`, created from the rendered value on first
    /// use (or `fallback` when the host cannot read it).
    ///
    /// Returns `None` for unknown elements.
    pub fn value(&self, id: &str, property: &str, fallback: Option<AnimValue>) -> Option<MotionValue> {
        let binding = self.inner.bindings.borrow().get(id).cloned()?;
        if let Some(value) = binding.values.borrow().get(property) {
            return Some(value.clone());
        }

        let initial = binding
            .element
            .read_value_from_instance(property)
            .or(fallback)
            .unwrap_or_default();
        let value = MotionValue::with_config(&self.inner.frame, &self.inner.config, initial);
        let frame = self.inner.frame.clone();
        let render = binding.render;
        value.on(MotionEvent::Change, move |_| {
            frame.queue(Phase::Render, render, false, false);
        });
        binding
            .values
            .borrow_mut()
            .insert(property.to_string(), value.clone());
        Some(value)
    }

    /// Latest values of every animated property of an element
    pub fn latest(&self, id: &str) -> Option<IndexMap<String, AnimValue>> {
        let binding = self.inner.bindings.borrow().get(id).cloned()?;
        Some(binding.latest())
    }

    /// Unregister every element
    pub fn clear(&self) {
        let bindings = std::mem::take(&mut *self.inner.bindings.borrow_mut());
        for binding in bindings.values() {
            Self::release(&self.inner.frame, binding);
        }
    }
}
