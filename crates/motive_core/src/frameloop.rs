//! Frame scheduler
//!
//! One ordered queue of per-phase callbacks, flushed once per display
//! refresh. Phases always run `read → update → preRender → render →
//! postRender`; within a phase callbacks run in the order they were queued.
//!
//! Callbacks may queue further work while a frame is being flushed:
//!
//! - queuing into a later phase runs it within the same frame
//! - queuing into the current phase runs it next frame, unless `immediate`
//!   is set, in which case it runs before the phase closes
//! - `keep_alive` re-queues the callback every frame until cancelled
//!
//! The host owns the display link. It either polls [`Frameloop::needs_frame`]
//! or installs a requester with [`Frameloop::set_frame_requester`], then calls
//! [`Frameloop::process_frame`] with the frame timestamp.

use crate::config::MotionConfig;
use crate::math::clamp;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Instant;

new_key_type! {
    /// Handle to a scheduled or registered callback
    pub struct ProcessId;
}

/// Frame phases in execution order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Read,
    Update,
    PreRender,
    Render,
    PostRender,
}

impl Phase {
    /// All phases in the order they are flushed
    pub const ALL: [Phase; 5] = [
        Phase::Read,
        Phase::Update,
        Phase::PreRender,
        Phase::Render,
        Phase::PostRender,
    ];

    #[inline]
    fn index(self) -> usize {
        match self {
            Phase::Read => 0,
            Phase::Update => 1,
            Phase::PreRender => 2,
            Phase::Render => 3,
            Phase::PostRender => 4,
        }
    }
}

/// Timing information handed to every callback
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameData {
    /// Milliseconds since the previous frame (clamped)
    pub delta: f64,
    /// Timestamp of the current frame in milliseconds
    pub timestamp: f64,
    /// Whether a frame is currently being flushed
    pub is_processing: bool,
}

/// Source of timestamps in milliseconds
pub trait Clock {
    fn now(&self) -> f64;
}

/// Monotonic wall clock measured from its creation
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Clock advanced by hand, for headless hosts and tests
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

/// Callback type run by the scheduler
pub type ProcessFn = Box<dyn FnMut(&FrameData)>;

struct Process {
    /// `None` while the callback is running
    callback: Option<ProcessFn>,
    /// Registered processes survive running and cancellation
    persistent: bool,
    keep_alive: bool,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Slot {
    Pending(ProcessId),
    Done(ProcessId),
    Cancelled,
}

#[derive(Default)]
struct Step {
    /// Queue being flushed this frame
    this_frame: Vec<Slot>,
    /// Queue for the next flush of this phase
    next_frame: SmallVec<[ProcessId; 8]>,
    processing: bool,
}

impl Step {
    fn has_pending(&self, id: ProcessId) -> bool {
        self.next_frame.contains(&id) || self.this_frame.contains(&Slot::Pending(id))
    }
}

struct LoopState {
    processes: SlotMap<ProcessId, Process>,
    steps: [Step; 5],
    data: FrameData,
    run_next_frame: bool,
    use_default_elapsed: bool,
    processing: bool,
    deferred_frame: Option<f64>,
}

struct Inner {
    state: RefCell<LoopState>,
    clock: Rc<dyn Clock>,
    requester: RefCell<Option<Rc<dyn Fn()>>>,
    max_elapsed_ms: f64,
    default_delta_ms: f64,
}

/// Shared handle to the frame scheduler
///
/// Cloning is cheap; all clones drive the same queues.
#[derive(Clone)]
pub struct Frameloop {
    inner: Rc<Inner>,
}

impl Frameloop {
    /// Create a scheduler reading time from `clock`
    pub fn new(clock: Rc<dyn Clock>, config: &MotionConfig) -> Self {
        Self {
            inner: Rc::new(Inner {
                state: RefCell::new(LoopState {
                    processes: SlotMap::with_key(),
                    steps: Default::default(),
                    data: FrameData::default(),
                    run_next_frame: false,
                    use_default_elapsed: true,
                    processing: false,
                    deferred_frame: None,
                }),
                clock,
                requester: RefCell::new(None),
                max_elapsed_ms: config.max_frame_elapsed_ms,
                default_delta_ms: config.default_frame_delta_ms,
            }),
        }
    }

    /// Scheduler on the system clock with default configuration
    pub fn with_system_clock() -> Self {
        Self::new(Rc::new(SystemClock::new()), &MotionConfig::default())
    }

    /// Install a callback invoked whenever the scheduler wants a frame
    pub fn set_frame_requester<F: Fn() + 'static>(&self, requester: F) {
        *self.inner.requester.borrow_mut() = Some(Rc::new(requester));
    }

    /// Current time: the frame timestamp while flushing, the clock otherwise
    pub fn now(&self) -> f64 {
        let state = self.inner.state.borrow();
        if state.processing {
            state.data.timestamp
        } else {
            self.inner.clock.now()
        }
    }

    /// Timing data of the latest frame
    pub fn frame_data(&self) -> FrameData {
        self.inner.state.borrow().data
    }

    /// Whether a frame has been requested since the last flush
    pub fn needs_frame(&self) -> bool {
        self.inner.state.borrow().run_next_frame
    }

    pub fn is_processing(&self) -> bool {
        self.inner.state.borrow().processing
    }

    /// Number of live processes (scheduled or registered)
    pub fn process_count(&self) -> usize {
        self.inner.state.borrow().processes.len()
    }

    /// Schedule a one-shot (or keep-alive) callback into `phase`
    pub fn schedule<F>(&self, phase: Phase, callback: F, keep_alive: bool, immediate: bool) -> ProcessId
    where
        F: FnMut(&FrameData) + 'static,
    {
        let id = self.inner.state.borrow_mut().processes.insert(Process {
            callback: Some(Box::new(callback)),
            persistent: false,
            keep_alive: false,
        });
        self.queue(phase, id, keep_alive, immediate);
        id
    }

    pub fn read<F: FnMut(&FrameData) + 'static>(&self, callback: F) -> ProcessId {
        self.schedule(Phase::Read, callback, false, false)
    }

    pub fn update<F: FnMut(&FrameData) + 'static>(&self, callback: F) -> ProcessId {
        self.schedule(Phase::Update, callback, false, false)
    }

    pub fn pre_render<F: FnMut(&FrameData) + 'static>(&self, callback: F) -> ProcessId {
        self.schedule(Phase::PreRender, callback, false, false)
    }

    pub fn render<F: FnMut(&FrameData) + 'static>(&self, callback: F) -> ProcessId {
        self.schedule(Phase::Render, callback, false, false)
    }

    pub fn post_render<F: FnMut(&FrameData) + 'static>(&self, callback: F) -> ProcessId {
        self.schedule(Phase::PostRender, callback, false, false)
    }

    /// Register a callback that stays alive until [`Frameloop::unregister`].
    ///
    /// It is not queued; use [`Frameloop::queue`] to run it.
    pub fn register<F: FnMut(&FrameData) + 'static>(&self, callback: F) -> ProcessId {
        self.inner.state.borrow_mut().processes.insert(Process {
            callback: Some(Box::new(callback)),
            persistent: true,
            keep_alive: false,
        })
    }

    /// Queue an existing process into `phase`.
    ///
    /// Queuing a process that is already queued in that phase is a no-op.
    /// Returns `false` if the process no longer exists.
    pub fn queue(&self, phase: Phase, id: ProcessId, keep_alive: bool, immediate: bool) -> bool {
        let requester = {
            let mut guard = self.inner.state.borrow_mut();
            let state = &mut *guard;
            let Some(process) = state.processes.get_mut(id) else {
                return false;
            };
            if keep_alive {
                process.keep_alive = true;
            }

            let step = &mut state.steps[phase.index()];
            if immediate && step.processing {
                let seen = step
                    .this_frame
                    .iter()
                    .any(|slot| matches!(slot, Slot::Pending(p) | Slot::Done(p) if *p == id));
                if !seen {
                    step.this_frame.push(Slot::Pending(id));
                }
            } else if !step.next_frame.contains(&id) {
                step.next_frame.push(id);
            }

            if state.run_next_frame {
                None
            } else {
                state.run_next_frame = true;
                state.use_default_elapsed = true;
                if state.processing {
                    None
                } else {
                    self.inner.requester.borrow().clone()
                }
            }
        };

        if let Some(request) = requester {
            request();
        }
        true
    }

    /// Remove a process from every phase.
    ///
    /// Safe to call mid-flush and on processes that already ran or never
    /// existed. One-shot processes are dropped; registered ones stay
    /// registered but dequeued.
    pub fn cancel(&self, id: ProcessId) {
        let removed = {
            let mut guard = self.inner.state.borrow_mut();
            let state = &mut *guard;
            for step in state.steps.iter_mut() {
                step.next_frame.retain(|queued| *queued != id);
                for slot in step.this_frame.iter_mut() {
                    if *slot == Slot::Pending(id) {
                        *slot = Slot::Cancelled;
                    }
                }
            }
            match state.processes.get_mut(id) {
                Some(process) if process.persistent => {
                    process.keep_alive = false;
                    None
                }
                Some(_) => state.processes.remove(id),
                None => None,
            }
        };
        drop(removed);
    }

    /// Cancel and drop a registered process
    pub fn unregister(&self, id: ProcessId) {
        self.cancel(id);
        let removed = self.inner.state.borrow_mut().processes.remove(id);
        drop(removed);
    }

    /// Whether `id` is waiting to run in any phase
    pub fn is_scheduled(&self, id: ProcessId) -> bool {
        let state = self.inner.state.borrow();
        state.steps.iter().any(|step| step.has_pending(id))
    }

    /// Drop every process and queue
    pub fn clear(&self) {
        let processes = {
            let mut state = self.inner.state.borrow_mut();
            for step in state.steps.iter_mut() {
                step.this_frame.clear();
                step.next_frame.clear();
            }
            state.run_next_frame = false;
            std::mem::take(&mut state.processes)
        };
        drop(processes);
    }

    /// Flush one frame at `timestamp` (milliseconds)
    pub fn process_frame(&self, timestamp: f64) {
        let data = {
            let mut state = self.inner.state.borrow_mut();
            if state.processing {
                state.deferred_frame = Some(timestamp);
                return;
            }
            state.run_next_frame = false;
            state.data.delta = if state.use_default_elapsed {
                self.inner.default_delta_ms
            } else {
                clamp(1.0, self.inner.max_elapsed_ms, timestamp - state.data.timestamp)
            };
            state.data.timestamp = timestamp;
            state.data.is_processing = true;
            state.processing = true;
            state.data
        };

        tracing::trace!(timestamp, delta = data.delta, "processing frame");

        for phase in Phase::ALL {
            self.process_step(phase, &data);
        }

        let (requester, deferred) = {
            let mut state = self.inner.state.borrow_mut();
            state.data.is_processing = false;
            state.processing = false;
            let requester = if state.run_next_frame {
                state.use_default_elapsed = false;
                self.inner.requester.borrow().clone()
            } else {
                None
            };
            (requester, state.deferred_frame.take())
        };

        if let Some(request) = requester {
            request();
        }
        if let Some(timestamp) = deferred {
            self.process_frame(timestamp);
        }
    }

    fn process_step(&self, phase: Phase, data: &FrameData) {
        let index = phase.index();
        {
            let mut state = self.inner.state.borrow_mut();
            let step = &mut state.steps[index];
            let queued: Vec<Slot> = step.next_frame.drain(..).map(Slot::Pending).collect();
            step.this_frame = queued;
            step.processing = true;
        }

        let mut cursor = 0;
        loop {
            let next = {
                let mut guard = self.inner.state.borrow_mut();
                let state = &mut *guard;
                let step = &mut state.steps[index];
                if cursor >= step.this_frame.len() {
                    step.this_frame.clear();
                    step.processing = false;
                    break;
                }
                let slot = step.this_frame[cursor];
                cursor += 1;
                let Slot::Pending(id) = slot else {
                    continue;
                };
                step.this_frame[cursor - 1] = Slot::Done(id);

                let Some(process) = state.processes.get_mut(id) else {
                    continue;
                };
                if process.keep_alive {
                    if !step.next_frame.contains(&id) {
                        step.next_frame.push(id);
                    }
                    state.run_next_frame = true;
                }
                process.callback.take().map(|callback| (id, callback))
            };

            let Some((id, mut callback)) = next else {
                continue;
            };
            callback(data);
            let dropped = self.restore(id, callback);
            drop(dropped);
        }
    }

    /// Put a callback back after it ran, dropping one-shot processes that
    /// are no longer queued. Returns whatever must be dropped outside the
    /// borrow.
    fn restore(&self, id: ProcessId, callback: ProcessFn) -> Option<ProcessFn> {
        let mut guard = self.inner.state.borrow_mut();
        let state = &mut *guard;
        let Some(process) = state.processes.get_mut(id) else {
            return Some(callback);
        };
        if process.callback.is_none() {
            process.callback = Some(callback);
        }
        let queued = state.steps.iter().any(|step| step.has_pending(id));
        if !process.persistent && !process.keep_alive && !queued {
            return state.processes.remove(id).and_then(|p| p.callback);
        }
        None
    }
}
