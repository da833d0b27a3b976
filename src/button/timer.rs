//! Hold progress timer
//!
//! A periodic clock that counts fixed ticks toward a target duration and
//! reports normalized progress. The tick source is the scheduled deadline
//! of the next tick: the timer is active exactly while one is scheduled,
//! so stopping it leaves nothing behind that could fire later.

use std::time::Duration;

use tokio::time::Instant;
use tracing::trace;

/// Cadence of progress ticks
pub const TICK_INTERVAL: Duration = Duration::from_millis(10);

/// Result of running one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// No tick was scheduled
    Idle,
    /// Progress advanced, the timer is still running
    Advanced,
    /// Progress reached 1 and the timer stopped itself
    Completed,
}

#[derive(Debug)]
pub struct HoldTimer {
    progress: f64,
    duration: Duration,
    elapsed: Duration,
    next_tick: Option<Instant>,
}

impl Default for HoldTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl HoldTimer {
    pub fn new() -> Self {
        Self {
            progress: 0.0,
            duration: Duration::ZERO,
            elapsed: Duration::ZERO,
            next_tick: None,
        }
    }

    /// Normalized progress in `[0, 1]`
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn is_active(&self) -> bool {
        self.next_tick.is_some()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Deadline of the next scheduled tick, if running
    pub fn next_tick(&self) -> Option<Instant> {
        self.next_tick
    }

    /// Restart counting toward `duration`, with the first tick one interval after `now`
    ///
    /// Durations shorter than one tick are raised to one tick.
    pub fn start(&mut self, duration: Duration, now: Instant) {
        self.duration = duration.max(TICK_INTERVAL);
        self.elapsed = Duration::ZERO;
        self.progress = 0.0;
        self.next_tick = Some(now + TICK_INTERVAL);
        trace!(duration_ms = self.duration.as_millis() as u64, "hold timer started");
    }

    /// Run the scheduled tick, whatever its deadline
    pub fn tick(&mut self) -> Tick {
        let Some(deadline) = self.next_tick else {
            return Tick::Idle;
        };

        self.elapsed += TICK_INTERVAL;
        self.progress = if self.elapsed >= self.duration {
            1.0
        } else {
            (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
        };

        if self.progress >= 1.0 {
            self.stop();
            trace!("hold timer completed");
            Tick::Completed
        } else {
            self.next_tick = Some(deadline + TICK_INTERVAL);
            Tick::Advanced
        }
    }

    /// Run every tick due at or before `now`; returns true if the timer completed
    pub fn advance(&mut self, now: Instant) -> bool {
        while let Some(deadline) = self.next_tick {
            if deadline > now {
                break;
            }
            if self.tick() == Tick::Completed {
                return true;
            }
        }
        false
    }

    /// Cancel the tick source, keeping the last progress value
    pub fn stop(&mut self) {
        self.next_tick = None;
    }

    /// Cancel the tick source and clear progress
    pub fn reset(&mut self) {
        self.stop();
        self.progress = 0.0;
        self.elapsed = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_timer_is_idle() {
        let mut timer = HoldTimer::new();
        assert!(!timer.is_active());
        assert_eq!(timer.progress(), 0.0);
        assert_eq!(timer.duration(), Duration::ZERO);
        assert_eq!(timer.tick(), Tick::Idle);
    }

    #[test]
    fn test_completes_after_full_duration() {
        for ms in [10u64, 70, 500, 2000, 3000] {
            let t0 = Instant::now();
            let duration = Duration::from_millis(ms);
            let mut timer = HoldTimer::new();
            timer.start(duration, t0);

            assert!(!timer.advance(t0 + duration - TICK_INTERVAL));
            assert!(timer.is_active());
            assert!(timer.progress() < 1.0);

            assert!(timer.advance(t0 + duration));
            assert_eq!(timer.progress(), 1.0);
            assert!(!timer.is_active());
            assert_eq!(timer.next_tick(), None);
        }
    }

    #[test]
    fn test_progress_is_monotonic() {
        let t0 = Instant::now();
        let mut timer = HoldTimer::new();
        timer.start(Duration::from_millis(300), t0);

        let mut last = 0.0;
        while timer.is_active() {
            timer.tick();
            assert!(timer.progress() >= last);
            last = timer.progress();
        }
        assert_eq!(last, 1.0);
    }

    #[test]
    fn test_half_way_progress() {
        let t0 = Instant::now();
        let mut timer = HoldTimer::new();
        timer.start(Duration::from_secs(2), t0);
        timer.advance(t0 + Duration::from_secs(1));
        assert!((timer.progress() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_stop_keeps_progress() {
        let t0 = Instant::now();
        let mut timer = HoldTimer::new();
        timer.start(Duration::from_secs(1), t0);
        timer.advance(t0 + Duration::from_millis(250));
        timer.stop();

        assert!(!timer.is_active());
        assert!((timer.progress() - 0.25).abs() < 1e-9);
        // Nothing fires once stopped
        assert!(!timer.advance(t0 + Duration::from_secs(5)));
        assert!((timer.progress() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let t0 = Instant::now();
        let mut timer = HoldTimer::new();
        timer.start(Duration::from_secs(1), t0);
        timer.advance(t0 + Duration::from_millis(400));

        for _ in 0..3 {
            timer.reset();
            assert_eq!(timer.progress(), 0.0);
            assert_eq!(timer.elapsed(), Duration::ZERO);
            assert!(!timer.is_active());
        }
    }

    #[test]
    fn test_restart_clears_previous_run() {
        let t0 = Instant::now();
        let mut timer = HoldTimer::new();
        timer.start(Duration::from_secs(1), t0);
        timer.advance(t0 + Duration::from_millis(600));

        let t1 = t0 + Duration::from_millis(600);
        timer.start(Duration::from_secs(1), t1);
        assert_eq!(timer.progress(), 0.0);
        assert_eq!(timer.next_tick(), Some(t1 + TICK_INTERVAL));
    }

    #[test]
    fn test_zero_duration_is_raised_to_one_tick() {
        let t0 = Instant::now();
        let mut timer = HoldTimer::new();
        timer.start(Duration::ZERO, t0);
        assert_eq!(timer.duration(), TICK_INTERVAL);
        assert!(timer.advance(t0 + TICK_INTERVAL));
        assert_eq!(timer.progress(), 1.0);
    }
}
