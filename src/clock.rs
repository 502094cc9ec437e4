use std::time::{Duration, Instant};

/// Step interval used when nothing else is configured.
pub const DEFAULT_STEP_INTERVAL: Duration = Duration::from_millis(150);

/// Gates simulation steps on wall time, independent of how often the host
/// renders.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    interval: Duration,
    last_step: Option<Instant>,
}

impl SimulationClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_step: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns true when a step is due at `now` and records it as fired. The
    /// first poll only sets the baseline. Missed steps are not caught up.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.last_step {
            None => {
                self.last_step = Some(now);
                false
            }
            Some(last) if now.saturating_duration_since(last) >= self.interval => {
                self.last_step = Some(now);
                true
            }
            Some(_) => false,
        }
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(DEFAULT_STEP_INTERVAL)
    }
}
