//=========================================================================
// Frame Clock
//
// Measures the time between ticks and hands scenes a clamped delta.
//
// A tick that arrives very late (debugger pause, suspended terminal,
// slow hook) would otherwise hand `update` a huge `dt` and make the game
// jump. The delta is capped at `max_delta`, with a warning.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::{Duration, Instant};

use log::warn;

//=== Constants ===========================================================

/// Default ceiling for a single tick's delta.
pub const DEFAULT_MAX_DELTA: Duration = Duration::from_millis(250);

//=== FrameClock ==========================================================

#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Instant>,
    max_delta: Option<Duration>,
    frame_count: u64,
    total: f64,
}

impl FrameClock {
    /// Clock clamping each delta to `max_delta` (`None` disables the clamp).
    pub fn new(max_delta: Option<Duration>) -> Self {
        Self {
            last: None,
            max_delta,
            frame_count: 0,
            total: 0.0,
        }
    }

    /// Starts measuring from `now`; the next tick's delta is relative to it.
    pub fn reset(&mut self, now: Instant) {
        self.last = Some(now);
        self.frame_count = 0;
        self.total = 0.0;
    }

    /// Seconds since the previous call (or reset), clamped.
    ///
    /// The very first call without a prior reset returns `0.0`.
    pub fn advance(&mut self, now: Instant) -> f64 {
        let raw = match self.last {
            Some(last) => now.saturating_duration_since(last),
            None => Duration::ZERO,
        };
        self.last = Some(now);

        let dt = match self.max_delta {
            Some(max) if raw > max => {
                warn!(
                    "Tick took {:.1}ms, clamping delta to {}ms",
                    raw.as_secs_f64() * 1000.0,
                    max.as_millis()
                );
                max
            }
            _ => raw,
        };

        let dt = dt.as_secs_f64();
        self.frame_count += 1;
        self.total += dt;
        dt
    }

    pub fn max_delta(&self) -> Option<Duration> {
        self.max_delta
    }

    /// Ticks measured since the last reset.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Sum of all clamped deltas since the last reset, in seconds.
    pub fn total(&self) -> f64 {
        self.total
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(Some(DEFAULT_MAX_DELTA))
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
