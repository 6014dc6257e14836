use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture<T> {
    Click(T),
    LongPress(T),
}

#[derive(Debug, Clone, Copy)]
struct Pending<T> {
    target: T,
    deadline: Instant,
    fired: bool,
}

/// Distinguishes a click from a press held past the threshold.
///
/// `poll` drives the deferred long-press; `cancel` drops it outright so nothing fires later.
#[derive(Debug)]
pub struct LongPress<T> {
    threshold: Duration,
    pending: Option<Pending<T>>,
}

impl<T: Copy + PartialEq> LongPress<T> {
    pub fn new(threshold: Duration) -> Self {
        Self { threshold, pending: None }
    }

    pub fn press(&mut self, target: T, now: Instant) {
        self.pending = Some(Pending { target, deadline: now + self.threshold, fired: false });
    }

    /// Release before the deadline is a click; release after a fired long-press is nothing.
    pub fn release(&mut self, now: Instant) -> Option<Gesture<T>> {
        let pending = self.pending.take()?;
        if pending.fired {
            return None;
        }
        if now >= pending.deadline {
            return Some(Gesture::LongPress(pending.target));
        }
        Some(Gesture::Click(pending.target))
    }

    /// Pointer moved to `target` (or off every target with `None`).
    pub fn moved(&mut self, target: Option<T>) {
        let left = match &self.pending {
            Some(p) => target != Some(p.target),
            None => false,
        };
        if left {
            self.cancel();
        }
    }

    pub fn cancel(&mut self) {
        if self.pending.take().is_some() {
            log::trace!("long-press cancelled");
        }
    }

    pub fn poll(&mut self, now: Instant) -> Option<Gesture<T>> {
        let pending = self.pending.as_mut()?;
        if pending.fired || now < pending.deadline {
            return None;
        }
        pending.fired = true;
        Some(Gesture::LongPress(pending.target))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.pending, Some(Pending { fired: false, .. }))
    }
}
