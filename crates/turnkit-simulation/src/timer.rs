//! Cancellable tick handles.
//!
//! The scheduler never sleeps. It hands out a [`TickHandle`] naming the
//! instant the next tick is due; the host waits until then and passes the
//! handle back. Arming a new tick or cancelling invalidates older handles.

use std::time::{Duration, Instant};

/// A pending tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickHandle {
    id: u64,
    due: Instant,
}

impl TickHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Instant at which the host should fire this tick
    pub fn due(&self) -> Instant {
        self.due
    }
}

/// Hands out tick handles and remembers which one is live
#[derive(Debug, Clone)]
pub struct TickTimer {
    interval: Duration,
    next_id: u64,
    armed: Option<TickHandle>,
}

impl TickTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_id: 1,
            armed: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Arm a tick due one interval after `now`, replacing any armed one
    pub fn arm(&mut self, now: Instant) -> TickHandle {
        let handle = TickHandle {
            id: self.next_id,
            due: now + self.interval,
        };
        self.next_id += 1;
        self.armed = Some(handle);
        handle
    }

    pub fn cancel(&mut self) {
        self.armed = None;
    }

    pub fn armed(&self) -> Option<TickHandle> {
        self.armed
    }

    /// Consume `handle` if it is the live one. Stale handles are refused.
    pub fn accept(&mut self, handle: TickHandle) -> bool {
        match self.armed {
            Some(armed) if armed.id == handle.id => {
                self.armed = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arm_and_accept() {
        let mut timer = TickTimer::new(Duration::from_millis(16));
        let now = Instant::now();
        let handle = timer.arm(now);
        assert_eq!(handle.due(), now + Duration::from_millis(16));
        assert!(timer.accept(handle));
        // consumed
        assert!(!timer.accept(handle));
    }

    #[test]
    fn test_rearm_makes_old_handle_stale() {
        let mut timer = TickTimer::new(Duration::from_millis(16));
        let now = Instant::now();
        let old = timer.arm(now);
        let new = timer.arm(now);
        assert_ne!(old.id(), new.id());
        assert!(!timer.accept(old));
        assert!(timer.accept(new));
    }

    #[test]
    fn test_cancel() {
        let mut timer = TickTimer::new(Duration::from_millis(16));
        let handle = timer.arm(Instant::now());
        timer.cancel();
        assert!(timer.armed().is_none());
        assert!(!timer.accept(handle));
    }
}
