//! Compilation lifecycle observers.
//!
//! The compiler reports progress, log lines, and failures through a
//! [`CompileHooks`] implementation supplied by the caller. Progress events
//! are rate-limited inside the statement-consumption loop so an observer
//! sees at most one roughly every 50 ms of wall clock.

use quill_diagnostic::Error;
use serde::Serialize;
use std::time::{Duration, Instant};

/// A progress snapshot over the statement-consumption loop.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Progress {
    /// Total statements in the file.
    pub total: usize,
    /// Statements consumed so far.
    pub current: usize,
    /// `current / total`, in percent.
    pub percent: f32,
    /// Caller-supplied correlation token (the source file id).
    pub token: String,
}

/// Observer of one compilation.
pub trait CompileHooks {
    /// Non-terminal log output.
    fn on_log(&mut self, _message: &str) {}
    /// Rate-limited progress during statement consumption.
    fn on_progress(&mut self, _progress: &Progress) {}
    /// Broadcast of a failure, emitted before the error is returned to the
    /// caller so observers can log it even when the caller does not.
    fn on_error(&mut self, _error: &Error) {}
}

/// Hooks that observe nothing.
#[derive(Default)]
pub struct NullHooks;

impl CompileHooks for NullHooks {}

/// Rate limiter for progress emission.
#[derive(Debug)]
pub(crate) struct ProgressMeter {
    last: Option<Instant>,
    interval: Duration,
}

impl ProgressMeter {
    pub(crate) fn new() -> Self {
        ProgressMeter {
            last: None,
            interval: Duration::from_millis(50),
        }
    }

    /// Whether enough wall clock has passed to emit again.
    pub(crate) fn ready(&mut self) -> bool {
        let now = Instant::now();
        match self.last {
            Some(last) if now.duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meter_fires_immediately_then_throttles() {
        let mut meter = ProgressMeter::new();
        assert!(meter.ready());
        // Back-to-back call inside the interval is suppressed.
        assert!(!meter.ready());
    }
}
