//! Scroll listeners
//!
//! Every observed container gets one shared listener, reference counted by
//! the handlers watching it. A scroll or resize on the container schedules
//! three passes over its handlers:
//!
//! 1. `read`: measure target and container layout
//! 2. `update`: sample scroll position, velocity and progress
//! 3. `postRender`: notify subscribers
//!
//! Layout is never read while values are being written.

use super::info::{update_axis_info, Axis, ScrollInfo};
use super::offsets::{resolve_offsets, ScrollOffset, Viewport};
use motive_core::{FrameData, Frameloop, MotionConfig, Phase, ProcessId};
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::debug;

new_key_type! {
    /// Handle to an observed scroll subscription
    pub struct ScrollHandlerId;
}

/// A scrollable container or a tracked target, as laid out by the host.
///
/// Pairs are `(x, y)` in pixels.
pub trait ScrollNode {
    /// Stable identity, used to share listeners between subscriptions
    fn id(&self) -> &str;
    fn scroll_position(&self) -> (f64, f64);
    /// Full content size (`scrollWidth`, `scrollHeight`)
    fn scroll_size(&self) -> (f64, f64);
    /// Visible size (`clientWidth`, `clientHeight`)
    fn client_size(&self) -> (f64, f64);
    /// Offset of this node's origin inside `container`'s scrolled content
    fn offset_within(&self, container: &dyn ScrollNode) -> (f64, f64);
}

/// What to observe
#[derive(Clone)]
pub struct ScrollOptions {
    pub container: Rc<dyn ScrollNode>,
    /// Defaults to the container itself
    pub target: Option<Rc<dyn ScrollNode>>,
    pub axis: Axis,
    /// Breakpoints mapped onto progress; the whole scroll when `None`
    pub offset: Option<ScrollOffset>,
}

impl ScrollOptions {
    pub fn new(container: Rc<dyn ScrollNode>) -> Self {
        Self {
            container,
            target: None,
            axis: Axis::Y,
            offset: None,
        }
    }

    pub fn with_target(mut self, target: Rc<dyn ScrollNode>) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    pub fn with_offset(mut self, offset: ScrollOffset) -> Self {
        self.offset = Some(offset);
        self
    }
}

type ScrollCallback = Box<dyn FnMut(&ScrollInfo)>;

struct Handler {
    options: ScrollOptions,
    info: RefCell<ScrollInfo>,
    on_scroll: RefCell<ScrollCallback>,
}

impl Handler {
    fn measure(&self) {
        let container = self.options.container.as_ref();
        let mut info = self.info.borrow_mut();
        let (client_x, client_y) = container.client_size();
        let (target_offset, target_length) = match &self.options.target {
            Some(target) if target.id() != container.id() => {
                (target.offset_within(container), target.client_size())
            }
            _ => ((0.0, 0.0), container.scroll_size()),
        };
        info.x.target_offset = target_offset.0;
        info.y.target_offset = target_offset.1;
        info.x.target_length = target_length.0;
        info.y.target_length = target_length.1;
        info.x.container_length = client_x;
        info.y.container_length = client_y;
    }

    fn update(&self, time: f64, stale_ms: f64, viewport: &Viewport) {
        let container = self.options.container.as_ref();
        let (scroll_x, scroll_y) = container.scroll_position();
        let (content_x, content_y) = container.scroll_size();
        let (client_x, client_y) = container.client_size();

        let mut info = self.info.borrow_mut();
        let elapsed = time - info.time;
        update_axis_info(&mut info.x, scroll_x, content_x - client_x, elapsed, stale_ms);
        update_axis_info(&mut info.y, scroll_y, content_y - client_y, elapsed, stale_ms);
        info.time = time;

        if self.options.offset.is_some() || self.options.target.is_some() {
            let offset = self.options.offset.as_deref().unwrap_or(&[]);
            resolve_offsets(&mut info, self.options.axis, offset, viewport);
        }
    }

    fn notify(&self) {
        let info = self.info.borrow().clone();
        (self.on_scroll.borrow_mut())(&info);
    }
}

struct ContainerListener {
    measure: ProcessId,
    update: ProcessId,
    notify: ProcessId,
    handlers: Vec<ScrollHandlerId>,
}

#[derive(Default)]
struct RegistryState {
    handlers: SlotMap<ScrollHandlerId, Rc<Handler>>,
    containers: FxHashMap<String, ContainerListener>,
}

impl RegistryState {
    fn handlers_of(&self, container: &str) -> Vec<Rc<Handler>> {
        self.containers
            .get(container)
            .map(|listener| {
                listener
                    .handlers
                    .iter()
                    .filter_map(|id| self.handlers.get(*id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }
}

struct RegistryInner {
    frame: Frameloop,
    stale_ms: f64,
    viewport: RefCell<Viewport>,
    state: RefCell<RegistryState>,
}

/// Shared scroll listeners for every observed container
#[derive(Clone)]
pub struct ScrollRegistry {
    inner: Rc<RegistryInner>,
}

impl ScrollRegistry {
    pub fn new(frame: &Frameloop, config: &MotionConfig, viewport: Viewport) -> Self {
        Self {
            inner: Rc::new(RegistryInner {
                frame: frame.clone(),
                stale_ms: config.scroll_velocity_stale_ms,
                viewport: RefCell::new(viewport),
                state: RefCell::new(RegistryState::default()),
            }),
        }
    }

    pub fn frame(&self) -> &Frameloop {
        &self.inner.frame
    }

    pub fn viewport(&self) -> Viewport {
        *self.inner.viewport.borrow()
    }

    /// Record a new viewport size and remeasure every container
    pub fn set_viewport(&self, viewport: Viewport) {
        *self.inner.viewport.borrow_mut() = viewport;
        let containers: Vec<String> = self.inner.state.borrow().containers.keys().cloned().collect();
        for container in containers {
            self.notify_scroll(&container);
        }
    }

    /// Observe scrolling described by `options`.
    ///
    /// `on_scroll` runs in `postRender` after every scroll or resize of the
    /// container, starting with the next frame.
    pub fn observe<F>(&self, options: ScrollOptions, on_scroll: F) -> ScrollHandlerId
    where
        F: FnMut(&ScrollInfo) + 'static,
    {
        let container_id = options.container.id().to_string();
        let handler = Rc::new(Handler {
            options,
            info: RefCell::new(ScrollInfo::default()),
            on_scroll: RefCell::new(Box::new(on_scroll)),
        });

        let needs_listener = !self.inner.state.borrow().containers.contains_key(&container_id);
        if needs_listener {
            let listener = self.create_listener(&container_id);
            self.inner
                .state
                .borrow_mut()
                .containers
                .insert(container_id.clone(), listener);
            debug!(container = %container_id, "scroll listener attached");
        }

        let id = {
            let mut state = self.inner.state.borrow_mut();
            let id = state.handlers.insert(handler);
            if let Some(listener) = state.containers.get_mut(&container_id) {
                listener.handlers.push(id);
            }
            id
        };
        self.notify_scroll(&container_id);
        id
    }

    /// Stop observing. The container listener goes away with its last
    /// handler. Unknown ids are ignored.
    pub fn remove(&self, id: ScrollHandlerId) {
        let released = {
            let mut state = self.inner.state.borrow_mut();
            let Some(handler) = state.handlers.remove(id) else {
                return;
            };
            let container_id = handler.options.container.id().to_string();
            let empty = match state.containers.get_mut(&container_id) {
                Some(listener) => {
                    listener.handlers.retain(|handler| *handler != id);
                    listener.handlers.is_empty()
                }
                None => false,
            };
            if empty {
                state.containers.remove(&container_id).map(|listener| (container_id, listener))
            } else {
                None
            }
        };

        if let Some((container_id, listener)) = released {
            for process in [listener.measure, listener.update, listener.notify] {
                self.inner.frame.unregister(process);
            }
            debug!(container = %container_id, "scroll listener detached");
        }
    }

    /// Host notification: `container` scrolled or was resized
    pub fn notify_scroll(&self, container: &str) {
        let processes = self
            .inner
            .state
            .borrow()
            .containers
            .get(container)
            .map(|listener| (listener.measure, listener.update, listener.notify));
        if let Some((measure, update, notify)) = processes {
            let frame = &self.inner.frame;
            frame.queue(Phase::Read, measure, false, true);
            frame.queue(Phase::Update, update, false, true);
            frame.queue(Phase::PostRender, notify, false, true);
        }
    }

    /// Latest metrics of a subscription
    pub fn info(&self, id: ScrollHandlerId) -> Option<ScrollInfo> {
        let state = self.inner.state.borrow();
        state.handlers.get(id).map(|handler| handler.info.borrow().clone())
    }

    /// Number of containers with a live listener
    pub fn listener_count(&self) -> usize {
        self.inner.state.borrow().containers.len()
    }

    pub fn handler_count(&self) -> usize {
        self.inner.state.borrow().handlers.len()
    }

    fn create_listener(&self, container_id: &str) -> ContainerListener {
        let frame = &self.inner.frame;
        let measure = frame.register(self.pass(container_id, |handler, _, _| handler.measure()));
        let update = frame.register(self.pass(container_id, |handler, data, inner| {
            let viewport = *inner.viewport.borrow();
            handler.update(data.timestamp, inner.stale_ms, &viewport);
        }));
        let notify = frame.register(self.pass(container_id, |handler, _, _| handler.notify()));
        ContainerListener {
            measure,
            update,
            notify,
            handlers: Vec::new(),
        }
    }

    /// A frame callback running `step` over the container's handlers.
    ///
    /// Handlers are collected before any of them run so they may observe or
    /// remove subscriptions from inside the callback.
    fn pass<S>(&self, container_id: &str, step: S) -> impl FnMut(&FrameData) + 'static
    where
        S: Fn(&Handler, &FrameData, &RegistryInner) + 'static,
    {
        let weak: Weak<RegistryInner> = Rc::downgrade(&self.inner);
        let container_id = container_id.to_string();
        move |data: &FrameData| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let handlers = inner.state.borrow().handlers_of(&container_id);
            for handler in handlers {
                step(&handler, data, &inner);
            }
        }
    }
}
