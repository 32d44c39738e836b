// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Driver — the blocking loop that gives an animator real time.
//
// The animator itself never sleeps and never spawns timers; it only knows
// when its next heartbeat is due. The driver closes that gap:
//
//   1. Check for a stop request (stop handle or SIGINT) and forward it.
//   2. `poll` the animator at the current instant. If a heartbeat ran,
//      hand the buffer to the frame callback so the host can redraw.
//   3. If the animation has ended (converged, stopped, failed), return.
//   4. Block until the next deadline. While the target is still loading,
//      block on the loader channel instead, so a finished load is picked
//      up immediately rather than at the next idle wake-up.
//
// Everything happens on the calling thread. Heartbeats run back to back in
// strict sequence, each one finishing its edit before the next deadline
// is even computed.
//
// # SIGINT Handling
//
// `install_interrupt_handler` sets a process-wide `AtomicBool` from a
// SIGINT handler. The loop checks it alongside the `StopHandle` each
// iteration, so Ctrl-C stops the animation cooperatively: the buffer keeps
// whatever was typed so far and is not saved.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::animator::{Animator, Status, Tick};
use crate::host::TextBuffer;

/// Longest the loop blocks without a deadline to wait for.
const IDLE_WAIT: Duration = Duration::from_millis(50);

// ─── SIGINT ─────────────────────────────────────────────────────────────────

/// Set by the SIGINT handler. Checked each loop iteration.
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
fn install_sigint_handler() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigint_handler as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGINT, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn sigint_handler(_sig: libc::c_int) {
    INTERRUPTED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
fn install_sigint_handler() {
    // No-op on non-unix platforms; Ctrl-C terminates the process.
}

// ─── Stop handle ────────────────────────────────────────────────────────────

/// A cloneable request to stop a running [`Driver`].
///
/// Safe to trigger from any thread. The driver forwards it to
/// [`Animator::stop`] at the top of its next iteration.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

// ─── Driver ─────────────────────────────────────────────────────────────────

/// Runs an [`Animator`] against a buffer in real time.
#[derive(Debug, Default)]
pub struct Driver {
    stop: StopHandle,
    watch_interrupts: bool,
}

impl Driver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle that stops this driver's animation.
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Treat SIGINT as a stop request for the rest of the process's life.
    pub fn install_interrupt_handler(&mut self) {
        install_sigint_handler();
        self.watch_interrupts = true;
    }

    fn stop_requested(&self) -> bool {
        self.stop.is_stopped() || (self.watch_interrupts && INTERRUPTED.load(Ordering::Relaxed))
    }

    /// Start the animator and drive it until it converges, stops, or fails.
    ///
    /// `on_tick` is called after every heartbeat with the buffer as it now
    /// stands. Returns the final [`Status`].
    pub fn run<B, F>(&mut self, animator: &mut Animator, buffer: &mut B, mut on_tick: F) -> Status
    where
        B: TextBuffer + ?Sized,
        F: FnMut(&B, &Tick),
    {
        animator.start();

        loop {
            if self.stop_requested() {
                animator.stop();
            }

            if let Some(tick) = animator.poll(Instant::now(), buffer) {
                on_tick(&*buffer, &tick);
            }

            let status = animator.status();
            if !matches!(status, Status::Loading | Status::Running) {
                return status;
            }

            let timeout = animator.next_deadline().map_or(IDLE_WAIT, |at| {
                at.saturating_duration_since(Instant::now()).min(IDLE_WAIT)
            });
            animator.wait(timeout);
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
