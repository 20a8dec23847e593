//! Trailing-edge debounce driven by an external clock.

use std::time::Duration;

/// Pending timer for the slider preview.
///
/// Each [`Debouncer::schedule`] pushes the deadline out to `now + delay`; the
/// host polls [`Debouncer::fire_if_due`] from its timer callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Duration>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Restart the quiet period from `now`.
    pub fn schedule(&mut self, now: Duration) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// When the host should poll next.
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Consume the pending timer if its deadline has passed.
    pub fn fire_if_due(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
