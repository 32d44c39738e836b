// SPDX-License-Identifier: MIT
//
// Heartbeat timer — a single one-shot deadline slot.
//
// The animator never schedules callbacks. It arms a deadline and whoever
// drives it (the `Driver`, or a test) calls `fire` with the current time.
// Because the slot holds one `Option<Instant>`, arming again replaces the
// pending deadline instead of adding a second one: there is never more
// than one heartbeat in flight.

use std::time::Instant;

/// A one-shot deadline that can be re-armed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timer {
    due: Option<Instant>,
}

impl Timer {
    #[must_use]
    pub const fn new() -> Self {
        Self { due: None }
    }

    /// Arm the timer for `at`, replacing any pending deadline.
    pub fn arm(&mut self, at: Instant) {
        self.due = Some(at);
    }

    /// The pending deadline, if armed.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.due
    }

    /// Consume the deadline if it has passed. Returns `true` exactly once
    /// per arming.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.due {
            Some(at) if at <= now => {
                self.due = None;
                true
            }
            _ => false,
        }
    }
}
