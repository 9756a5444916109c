//! Rendering-frame scheduling contract.
//!
//! Pointer events can arrive faster than the display refreshes. Consumers that want at most one
//! state write per frame request a callback here and coalesce everything in between.

use std::{cell::RefCell, rc::Rc};

/// One-shot callback run on the next frame tick.
pub type FrameCallback = Box<dyn FnOnce()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Host-issued identifier for a pending frame callback.
pub struct FrameHandle(pub i64);

/// Host service that runs callbacks on the next rendering frame.
pub trait FrameScheduler {
    /// Schedules `callback` for the next frame tick.
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle;

    /// Cancels a pending callback. Unknown or already-run handles are ignored.
    fn cancel_frame(&self, handle: FrameHandle);
}

#[derive(Default)]
struct ManualFrames {
    next_id: i64,
    pending: Vec<(FrameHandle, FrameCallback)>,
}

#[derive(Clone, Default)]
/// Frame scheduler driven explicitly by the caller. Used by headless hosts and tests.
pub struct ManualFrameScheduler {
    inner: Rc<RefCell<ManualFrames>>,
}

impl ManualFrameScheduler {
    /// Returns the number of callbacks waiting for the next tick.
    pub fn pending_count(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    /// Runs every callback queued before this call and returns how many ran.
    ///
    /// Callbacks requested while the tick runs wait for the following tick.
    pub fn run_frame(&self) -> usize {
        let due = std::mem::take(&mut self.inner.borrow_mut().pending);
        let count = due.len();
        for (_, callback) in due {
            callback();
        }
        count
    }
}

impl FrameScheduler for ManualFrameScheduler {
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle {
        let mut frames = self.inner.borrow_mut();
        frames.next_id += 1;
        let handle = FrameHandle(frames.next_id);
        frames.pending.push((handle, callback));
        handle
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        self.inner
            .borrow_mut()
            .pending
            .retain(|(pending, _)| *pending != handle);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn manual_scheduler_runs_queued_callbacks_once() {
        let scheduler = ManualFrameScheduler::default();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        scheduler.request_frame(Box::new(move || counter.set(counter.get() + 1)));

        assert_eq!(scheduler.pending_count(), 1);
        assert_eq!(scheduler.run_frame(), 1);
        assert_eq!(scheduler.run_frame(), 0);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn cancelled_callbacks_never_run() {
        let scheduler = ManualFrameScheduler::default();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let handle = scheduler.request_frame(Box::new(move || counter.set(counter.get() + 1)));
        scheduler.cancel_frame(handle);

        assert_eq!(scheduler.run_frame(), 0);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn callbacks_requested_during_a_tick_wait_for_the_next_one() {
        let scheduler = ManualFrameScheduler::default();
        let hits = Rc::new(Cell::new(0));
        let inner_scheduler = scheduler.clone();
        let counter = hits.clone();
        scheduler.request_frame(Box::new(move || {
            let counter = counter.clone();
            inner_scheduler.request_frame(Box::new(move || counter.set(counter.get() + 1)));
        }));

        assert_eq!(scheduler.run_frame(), 1);
        assert_eq!(hits.get(), 0);
        assert_eq!(scheduler.run_frame(), 1);
        assert_eq!(hits.get(), 1);
    }
}
