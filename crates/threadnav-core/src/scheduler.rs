//! Two-stage debounce in front of the reconciler.
//!
//! `Idle --schedule_normal--> Pending --timer--> Queued --frame--> Idle`
//!
//! `schedule_immediate` skips the timer: any armed timer or frame is
//! cancelled and a fresh frame is requested. At most one timer and one
//! frame are outstanding at any time.

use std::time::Duration;

use crate::platform::{FrameId, FrameScheduler, TimerId};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    /// Debounce timer armed.
    Pending,
    /// Paint callback armed.
    Queued,
}

#[derive(Debug)]
pub struct RenderScheduler {
    delay: Duration,
    timer: Option<TimerId>,
    frame: Option<FrameId>,
}

impl RenderScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            timer: None,
            frame: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn state(&self) -> SchedulerState {
        if self.frame.is_some() {
            SchedulerState::Queued
        } else if self.timer.is_some() {
            SchedulerState::Pending
        } else {
            SchedulerState::Idle
        }
    }

    /// Arms the debounce timer unless a refresh is already on its way.
    /// Returns whether a timer was armed.
    pub fn schedule_normal<S: FrameScheduler + ?Sized>(&mut self, host: &S) -> bool {
        if self.state() != SchedulerState::Idle {
            return false;
        }
        self.arm_timer(host);
        log::trace!("scheduler: idle -> pending ({:?})", self.delay);
        true
    }

    /// Refresh at the very next paint opportunity.
    pub fn schedule_immediate<S: FrameScheduler + ?Sized>(&mut self, host: &S) {
        if let Some(timer) = self.timer.take() {
            host.disarm_timer(timer);
        }
        self.arm_frame(host);
        log::trace!("scheduler: immediate -> queued");
    }

    /// Called when a timer fires. Stale handles are ignored.
    /// Returns whether the scheduler moved to `Queued`.
    pub fn on_timer<S: FrameScheduler + ?Sized>(&mut self, host: &S, id: TimerId) -> bool {
        if self.timer != Some(id) {
            return false;
        }
        self.timer = None;
        self.arm_frame(host);
        log::trace!("scheduler: pending -> queued");
        true
    }

    /// Called when a paint callback fires. Returns `true` when the caller
    /// must run a refresh now.
    pub fn on_frame(&mut self, id: FrameId) -> bool {
        if self.frame != Some(id) {
            return false;
        }
        self.frame = None;
        log::trace!("scheduler: queued -> idle");
        true
    }

    /// Disarms everything outstanding.
    pub fn cancel<S: FrameScheduler + ?Sized>(&mut self, host: &S) {
        if let Some(timer) = self.timer.take() {
            host.disarm_timer(timer);
        }
        if let Some(frame) = self.frame.take() {
            host.cancel_frame(frame);
        }
    }

    fn arm_timer<S: FrameScheduler + ?Sized>(&mut self, host: &S) {
        if let Some(timer) = self.timer.take() {
            host.disarm_timer(timer);
        }
        self.timer = Some(host.arm_timer(self.delay));
    }

    fn arm_frame<S: FrameScheduler + ?Sized>(&mut self, host: &S) {
        if let Some(frame) = self.frame.take() {
            host.cancel_frame(frame);
        }
        self.frame = Some(host.request_frame());
    }
}

#[cfg(test)]
#[path = "tests/scheduler_tests.rs"]
mod tests;
