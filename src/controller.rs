// src/controller.rs
//! Regeneration control for interactive front-ends
//!
//! Option changes arrive in bursts (slider drags). Each change calls
//! [`Regenerator::schedule`]; only when no further change arrives within
//! [`DEBOUNCE_WINDOW`] does [`Regenerator::poll`] run the simulator. A run
//! that starts while another is in flight is refused with
//! `GenerationInProgress`. Failures are logged and handed back; the busy
//! flag is released either way so the next attempt is never blocked.
//!
//! Time is passed in explicitly, so the host decides how to tick.

use crate::error::{SdeError, SdeResult};
use crate::math_utils::Timer;
use crate::mc::Simulator;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(300);

/// Trailing-edge debounce: fires once, `window` after the last request
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Push the deadline out to `now + window`
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// `true` exactly once when the deadline has passed
    pub fn fire_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEBOUNCE_WINDOW)
    }
}

/// Single-flight flag around generation
#[derive(Debug, Default)]
pub struct RegenerationGate {
    busy: AtomicBool,
}

/// Releases the gate on drop, including on early return
#[derive(Debug)]
pub struct GateGuard<'a> {
    gate: &'a RegenerationGate,
}

impl RegenerationGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self) -> SdeResult<GateGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| GateGuard { gate: self })
            .map_err(|_| SdeError::GenerationInProgress)
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        self.gate.busy.store(false, Ordering::Release);
    }
}

/// Debounced, single-flight driver for any [`Simulator`]
pub struct Regenerator<S: Simulator> {
    simulator: S,
    debouncer: Debouncer,
    gate: RegenerationGate,
}

impl<S: Simulator> Regenerator<S> {
    pub fn new(simulator: S) -> Self {
        Self::with_window(simulator, DEBOUNCE_WINDOW)
    }

    pub fn with_window(simulator: S, window: Duration) -> Self {
        Self {
            simulator,
            debouncer: Debouncer::new(window),
            gate: RegenerationGate::new(),
        }
    }

    pub fn simulator(&self) -> &S {
        &self.simulator
    }

    /// Mutable access for option updates; follow with [`Self::schedule`]
    pub fn simulator_mut(&mut self) -> &mut S {
        &mut self.simulator
    }

    pub fn gate(&self) -> &RegenerationGate {
        &self.gate
    }

    pub fn schedule(&mut self, now: Instant) {
        self.debouncer.schedule(now);
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Run the simulator if a scheduled request has settled
    ///
    /// `None` while nothing is due.
    pub fn poll(&mut self, now: Instant) -> Option<SdeResult<S::Output>> {
        if self.debouncer.fire_due(now) {
            Some(self.regenerate())
        } else {
            None
        }
    }

    /// Generate immediately, bypassing the debounce
    pub fn regenerate(&self) -> SdeResult<S::Output> {
        let _guard = match self.gate.try_acquire() {
            Ok(guard) => guard,
            Err(err) => {
                warn!("regeneration skipped, previous run still in progress");
                return Err(err);
            }
        };

        let mut timer = Timer::new();
        timer.start();
        let result = self.simulator.generate();
        match &result {
            Ok(_) => info!(elapsed_ms = timer.elapsed_ms(), "visualization regenerated"),
            Err(err) => error!(error = %err, "error generating visualization"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Counting {
        calls: Cell<usize>,
        fail: bool,
    }

    impl Counting {
        fn new(fail: bool) -> Self {
            Self {
                calls: Cell::new(0),
                fail,
            }
        }
    }

    impl Simulator for Counting {
        type Output = usize;

        fn generate(&self) -> SdeResult<usize> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                Err(SdeError::NumericalInstability {
                    method: "test".to_string(),
                    reason: "forced".to_string(),
                })
            } else {
                Ok(self.calls.get())
            }
        }
    }

    #[test]
    fn test_debouncer_fires_once_after_window() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();
        assert!(!debouncer.fire_due(start));

        debouncer.schedule(start);
        assert!(!debouncer.fire_due(start + Duration::from_millis(299)));
        assert!(debouncer.fire_due(start + Duration::from_millis(300)));
        assert!(!debouncer.fire_due(start + Duration::from_millis(301)));
    }

    #[test]
    fn test_burst_collapses_to_one_run() {
        let start = Instant::now();
        let mut regen = Regenerator::new(Counting::new(false));

        for ms in [0, 100, 200, 250] {
            regen.schedule(start + Duration::from_millis(ms));
        }
        assert!(regen.poll(start + Duration::from_millis(500)).is_none());
        let out = regen.poll(start + Duration::from_millis(550));
        assert_eq!(out, Some(Ok(1)));
        assert!(regen.poll(start + Duration::from_secs(5)).is_none());
        assert_eq!(regen.simulator().calls.get(), 1);
    }

    #[test]
    fn test_busy_gate_refuses_second_run() {
        let regen = Regenerator::new(Counting::new(false));
        let guard = regen.gate().try_acquire().unwrap();
        assert_eq!(regen.regenerate(), Err(SdeError::GenerationInProgress));
        assert_eq!(regen.simulator().calls.get(), 0);

        drop(guard);
        assert_eq!(regen.regenerate(), Ok(1));
    }

    #[test]
    fn test_failure_releases_gate() {
        let regen = Regenerator::new(Counting::new(true));
        assert!(regen.regenerate().is_err());
        assert!(!regen.gate().is_busy());
        assert!(regen.regenerate().is_err());
        assert_eq!(regen.simulator().calls.get(), 2);
    }

    #[test]
    fn test_cancel_drops_pending_request() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(10));
        debouncer.schedule(start);
        assert!(debouncer.is_pending());
        debouncer.cancel();
        assert!(!debouncer.fire_due(start + Duration::from_secs(1)));
    }
}
