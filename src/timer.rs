//! Stopwatch for the active quiz.
//!
//! Elapsed time is derived from the wall clock, not from counted ticks, so
//! stop/start cycles accumulate exactly.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Source of wall-clock time in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        chrono::Utc::now().timestamp_millis().max(0) as u64
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimerState {
    pub start_epoch_ms: Option<u64>,
    pub accumulated_ms: u64,
    pub running: bool,
}

pub struct Timer {
    clock: Arc<dyn Clock>,
    state: TimerState,
}

impl Timer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            state: TimerState::default(),
        }
    }

    /// Start or resume. Does nothing if already running.
    pub fn start(&mut self) {
        if self.state.running {
            return;
        }
        self.state.start_epoch_ms = Some(self.clock.now_ms());
        self.state.running = true;
    }

    /// Pause, folding the current run into the accumulated total.
    pub fn stop(&mut self) {
        if !self.state.running {
            return;
        }
        self.state.accumulated_ms += self.current_run_ms();
        self.state.start_epoch_ms = None;
        self.state.running = false;
    }

    pub fn reset(&mut self) {
        self.state = TimerState::default();
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.state.accumulated_ms + self.current_run_ms())
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    fn current_run_ms(&self) -> u64 {
        match (self.state.running, self.state.start_epoch_ms) {
            (true, Some(start)) => self.clock.now_ms().saturating_sub(start),
            _ => 0,
        }
    }
}

/// `HH:MM:SS`, zero padded. Hours are not wrapped.
pub fn format_hms(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}
