//! Standard runtime services backed by Rust's `std` library.
//!
//! This crate provides concrete implementations of the platform
//! abstraction traits defined in `threadnav-core`. A host constructs a
//! [`HostLoop`] over a [`Clock`], hands it to the reconciliation context
//! as its [`FrameScheduler`], and polls [`HostLoop::due_timers`] and
//! [`HostLoop::take_frames`] from its own event loop.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

use threadnav_core::{Clock, FrameId, FrameScheduler, TimerId};

/// Clock implementation backed by [`std::time`].
#[derive(Debug, Default, Clone)]
pub struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Self::Instant {
        Instant::now()
    }

    fn elapsed_millis(&self, since: Self::Instant) -> u64 {
        since.elapsed().as_millis() as u64
    }
}

impl StdClock {
    /// Returns the elapsed time as a [`Duration`] for convenience.
    pub fn elapsed(&self, since: Instant) -> Duration {
        since.elapsed()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now_millis: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now_millis
            .set(self.now_millis.get() + by.as_millis() as u64);
    }

    pub fn millis(&self) -> u64 {
        self.now_millis.get()
    }
}

impl Clock for ManualClock {
    type Instant = u64;

    fn now(&self) -> Self::Instant {
        self.now_millis.get()
    }

    fn elapsed_millis(&self, since: Self::Instant) -> u64 {
        self.now_millis.get().saturating_sub(since)
    }
}

#[derive(Debug)]
struct ArmedTimer {
    id: TimerId,
    deadline: u64,
}

#[derive(Default)]
struct LoopState {
    next_id: u64,
    timers: Vec<ArmedTimer>,
    frames: VecDeque<FrameId>,
    frame_requested: bool,
}

/// Single-threaded timer and frame queue driven by the host's event loop.
///
/// Arming only records a deadline; nothing fires until the host polls.
/// Timer and frame handles come from one counter and are never reused.
pub struct HostLoop<C: Clock> {
    clock: C,
    origin: C::Instant,
    state: RefCell<LoopState>,
    frame_waker: RefCell<Option<Rc<dyn Fn()>>>,
}

impl<C: Clock> HostLoop<C> {
    pub fn new(clock: C) -> Self {
        let origin = clock.now();
        Self {
            clock,
            origin,
            state: RefCell::new(LoopState::default()),
            frame_waker: RefCell::new(None),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Milliseconds since the loop was created.
    pub fn now_millis(&self) -> u64 {
        self.clock.elapsed_millis(self.origin)
    }

    /// Removes and returns every timer whose deadline has passed, earliest first.
    pub fn due_timers(&self) -> Vec<TimerId> {
        let now = self.now_millis();
        let mut state = self.state.borrow_mut();
        let (mut due, waiting): (Vec<ArmedTimer>, Vec<ArmedTimer>) = std::mem::take(&mut state.timers)
            .into_iter()
            .partition(|timer| timer.deadline <= now);
        state.timers = waiting;
        due.sort_by_key(|timer| (timer.deadline, timer.id));
        due.into_iter().map(|timer| timer.id).collect()
    }

    /// Removes and returns every requested frame, oldest first.
    pub fn take_frames(&self) -> Vec<FrameId> {
        let mut state = self.state.borrow_mut();
        state.frame_requested = false;
        state.frames.drain(..).collect()
    }

    /// Time until the earliest armed timer, zero when one is overdue.
    pub fn next_deadline(&self) -> Option<Duration> {
        let now = self.now_millis();
        self.state
            .borrow()
            .timers
            .iter()
            .map(|timer| timer.deadline.saturating_sub(now))
            .min()
            .map(Duration::from_millis)
    }

    pub fn armed_timers(&self) -> usize {
        self.state.borrow().timers.len()
    }

    pub fn pending_frames(&self) -> usize {
        self.state.borrow().frames.len()
    }

    pub fn has_pending_work(&self) -> bool {
        let state = self.state.borrow();
        !state.timers.is_empty() || !state.frames.is_empty()
    }

    /// Returns whether a frame has been requested since the last call.
    pub fn take_frame_request(&self) -> bool {
        std::mem::take(&mut self.state.borrow_mut().frame_requested)
    }

    /// Registers a waker that will be invoked whenever a new frame is requested.
    pub fn set_frame_waker(&self, waker: impl Fn() + 'static) {
        *self.frame_waker.borrow_mut() = Some(Rc::new(waker));
    }

    /// Clears any registered frame waker.
    pub fn clear_frame_waker(&self) {
        *self.frame_waker.borrow_mut() = None;
    }

    fn next_id(&self) -> u64 {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        state.next_id
    }

    fn wake(&self) {
        let waker = self.frame_waker.borrow().clone();
        if let Some(waker) = waker {
            waker();
        }
    }
}

impl<C: Clock> FrameScheduler for HostLoop<C> {
    fn arm_timer(&self, delay: Duration) -> TimerId {
        let id = TimerId(self.next_id());
        let deadline = self.now_millis() + delay.as_millis() as u64;
        self.state
            .borrow_mut()
            .timers
            .push(ArmedTimer { id, deadline });
        log::trace!("armed timer {} for t={deadline}ms", id.0);
        id
    }

    fn disarm_timer(&self, id: TimerId) {
        self.state.borrow_mut().timers.retain(|timer| timer.id != id);
    }

    fn request_frame(&self) -> FrameId {
        let id = FrameId(self.next_id());
        {
            let mut state = self.state.borrow_mut();
            state.frames.push_back(id);
            state.frame_requested = true;
        }
        self.wake();
        id
    }

    fn cancel_frame(&self, id: FrameId) {
        self.state.borrow_mut().frames.retain(|frame| *frame != id);
    }
}

impl<C: Clock> fmt::Debug for HostLoop<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("HostLoop")
            .field("now_millis", &self.now_millis())
            .field("timers", &state.timers)
            .field("frames", &state.frames)
            .finish()
    }
}
