//! Wall-clock timing for steps and runs.

use std::time::Instant;

/// Measures elapsed milliseconds from the moment it is started.
#[derive(Debug, Clone, Copy)]
pub struct SpanTimer {
    start: Instant,
}

impl SpanTimer {
    /// Starts timing now.
    #[must_use]
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Returns the elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Stops the timer and returns the elapsed milliseconds.
    #[must_use]
    pub fn finish(self) -> f64 {
        self.elapsed_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_timer_measures_sleep() {
        let timer = SpanTimer::start();
        std::thread::sleep(Duration::from_millis(10));
        let midway = timer.elapsed_ms();
        let total = timer.finish();

        assert!(midway >= 10.0);
        assert!(total >= midway);
    }
}
