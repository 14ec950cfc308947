//! Running attempt counters and throttled throughput snapshots.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Minimum wall-clock gap between two emitted snapshots.
pub const STATS_INTERVAL: Duration = Duration::from_secs(1);

/// Point-in-time throughput figures for an active run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub attempts: u64,
    pub elapsed_secs: f64,
    /// Attempts per second; zero while no time has elapsed.
    pub rate: f64,
}

impl StatsSnapshot {
    /// Compute a snapshot from raw figures.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compute(attempts: u64, elapsed_secs: f64) -> Self {
        let rate = if elapsed_secs > 0.0 {
            attempts as f64 / elapsed_secs
        } else {
            0.0
        };
        Self {
            attempts,
            elapsed_secs,
            rate,
        }
    }
}

/// Tracks attempts for one run and decides when a snapshot is due.
///
/// Emission is throttled by comparing against the timestamp of the last
/// emission, inline with line processing; there is no timer.
#[derive(Debug)]
pub struct StatsAggregator {
    attempts: u64,
    started: Instant,
    last_emit: Instant,
}

impl StatsAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Start the clock at an explicit instant. Used by tests to make the
    /// throttle deterministic.
    #[must_use]
    pub fn starting_at(now: Instant) -> Self {
        Self {
            attempts: 0,
            started: now,
            last_emit: now,
        }
    }

    /// Count one attempt and return the new total.
    pub fn record_attempt(&mut self) -> u64 {
        self.attempts = self.attempts.saturating_add(1);
        self.attempts
    }

    #[must_use]
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// A snapshot, if at least [`STATS_INTERVAL`] has passed since the last
    /// one was handed out.
    pub fn maybe_snapshot(&mut self, now: Instant) -> Option<StatsSnapshot> {
        if now.duration_since(self.last_emit) < STATS_INTERVAL {
            return None;
        }
        self.last_emit = now;
        Some(StatsSnapshot::compute(
            self.attempts,
            now.duration_since(self.started).as_secs_f64(),
        ))
    }
}

impl Default for StatsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_is_attempts_over_elapsed() {
        let snap = StatsSnapshot::compute(100, 20.0);
        assert!((snap.rate - 5.0).abs() < f64::EPSILON);
        assert_eq!(snap.attempts, 100);
    }

    #[test]
    fn rate_is_zero_at_zero_elapsed() {
        let snap = StatsSnapshot::compute(50, 0.0);
        assert!((snap.rate - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn attempts_increment_monotonically() {
        let mut stats = StatsAggregator::new();
        assert_eq!(stats.record_attempt(), 1);
        assert_eq!(stats.record_attempt(), 2);
        assert_eq!(stats.attempts(), 2);
    }

    #[test]
    fn snapshot_throttled_to_once_per_second() {
        let start = Instant::now();
        let mut stats = StatsAggregator::starting_at(start);
        stats.record_attempt();

        // Same instant: nothing due yet.
        assert!(stats.maybe_snapshot(start).is_none());
        assert!(stats
            .maybe_snapshot(start + Duration::from_millis(999))
            .is_none());

        let snap = stats
            .maybe_snapshot(start + Duration::from_secs(2))
            .expect("snapshot due after interval");
        assert_eq!(snap.attempts, 1);
        assert!((snap.elapsed_secs - 2.0).abs() < 0.001);

        // Throttle resets from the emission just handed out.
        assert!(stats
            .maybe_snapshot(start + Duration::from_millis(2500))
            .is_none());
        assert!(stats
            .maybe_snapshot(start + Duration::from_secs(3))
            .is_some());
    }
}
