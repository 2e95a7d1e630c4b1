//! Stopwatch attached to connections in diagnostic mode.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// A finished timing section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopwatchEvent {
    /// Section name.
    pub name: String,
    /// Wall-clock duration of the section.
    pub duration: Duration,
}

/// Records named timing sections.
#[derive(Debug, Default)]
pub struct Stopwatch {
    events: Mutex<Vec<StopwatchEvent>>,
}

impl Stopwatch {
    /// Creates a stopwatch with no recorded sections.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a section. The section is recorded when the lap is stopped or dropped.
    pub fn start(&self, name: impl Into<String>) -> StopwatchLap<'_> {
        StopwatchLap {
            stopwatch: self,
            name: name.into(),
            started: Instant::now(),
            stopped: false,
        }
    }

    /// Returns the recorded sections in completion order.
    pub fn events(&self) -> Vec<StopwatchEvent> {
        self.events.lock().clone()
    }

    /// Returns the summed duration of all sections with the given name.
    pub fn total(&self, name: &str) -> Duration {
        self.events
            .lock()
            .iter()
            .filter(|e| e.name == name)
            .map(|e| e.duration)
            .sum()
    }

    /// Clears the recorded sections.
    pub fn reset(&self) {
        self.events.lock().clear();
    }

    fn record(&self, name: String, duration: Duration) {
        self.events.lock().push(StopwatchEvent { name, duration });
    }
}

/// A running section.
#[derive(Debug)]
pub struct StopwatchLap<'a> {
    stopwatch: &'a Stopwatch,
    name: String,
    started: Instant,
    stopped: bool,
}

impl StopwatchLap<'_> {
    /// Stops the section and returns its duration.
    pub fn stop(mut self) -> Duration {
        self.finish()
    }

    fn finish(&mut self) -> Duration {
        let duration = self.started.elapsed();
        if !self.stopped {
            self.stopped = true;
            self.stopwatch
                .record(std::mem::take(&mut self.name), duration);
        }
        duration
    }
}

impl Drop for StopwatchLap<'_> {
    fn drop(&mut self) {
        self.finish();
    }
}
