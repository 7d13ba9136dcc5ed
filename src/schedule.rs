use std::time::{Duration, Instant};

// The event loop polls with `time_until_due` and calls the board on `due`.
#[derive(Debug, Clone)]
pub struct ResetTicker {
    interval: Duration,
    last_fired: Instant,
}

impl ResetTicker {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last_fired: now,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn due(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last_fired) >= self.interval {
            self.last_fired = now;
            true
        } else {
            false
        }
    }

    pub fn time_until_due(&self, now: Instant) -> Duration {
        self.interval
            .saturating_sub(now.saturating_duration_since(self.last_fired))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_per_interval() {
        let start = Instant::now();
        let mut ticker = ResetTicker::new(Duration::from_secs(60), start);

        assert!(!ticker.due(start + Duration::from_secs(59)));
        assert!(ticker.due(start + Duration::from_secs(60)));
        assert!(!ticker.due(start + Duration::from_secs(61)));
        assert!(ticker.due(start + Duration::from_secs(125)));
    }

    #[test]
    fn remaining_time_counts_down() {
        let start = Instant::now();
        let ticker = ResetTicker::new(Duration::from_secs(60), start);
        assert_eq!(
            ticker.time_until_due(start + Duration::from_secs(45)),
            Duration::from_secs(15)
        );
        assert_eq!(
            ticker.time_until_due(start + Duration::from_secs(90)),
            Duration::ZERO
        );
    }
}
