//! Platform abstraction traits for the navigator runtime.
//!
//! These traits let the engine delegate timers, paint-aligned callbacks
//! and timekeeping to the host event loop, so the same engine runs
//! against a browser, a std event loop, or a manually driven test clock.

use std::time::Duration;

/// Handle of an armed debounce timer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Handle of an armed paint-aligned callback.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(pub u64);

/// Arms and disarms the two kinds of deferred work the engine uses.
///
/// Implementations only record intent; they report firing back by
/// handing the returned handles to the render scheduler. Everything runs
/// on the host's single UI thread.
pub trait FrameScheduler {
    /// Arm a one-shot timer firing after `delay`.
    fn arm_timer(&self, delay: Duration) -> TimerId;

    /// Disarm a timer. Unknown or already fired handles are ignored.
    fn disarm_timer(&self, id: TimerId);

    /// Request a callback at the next paint opportunity.
    fn request_frame(&self) -> FrameId;

    /// Cancel a paint callback. Unknown or already fired handles are ignored.
    fn cancel_frame(&self, id: FrameId);
}

/// Provides timing information for the runtime.
pub trait Clock {
    /// Instant type produced by this clock implementation.
    type Instant: Copy;

    /// Returns the current instant.
    fn now(&self) -> Self::Instant;

    /// Returns the number of milliseconds elapsed since `since`.
    fn elapsed_millis(&self, since: Self::Instant) -> u64;
}
