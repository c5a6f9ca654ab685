//! Simulation clock: wall time as milliseconds since midnight, advanced in
//! fixed one-minute ticks.

use bevy_ecs::prelude::Resource;

/// Simulation timestamp in milliseconds since midnight.
pub type SimMillis = u64;

pub const ONE_SEC_MS: SimMillis = 1_000;
pub const ONE_MIN_MS: SimMillis = 60 * ONE_SEC_MS;
pub const ONE_HOUR_MS: SimMillis = 60 * ONE_MIN_MS;

/// Convert fractional minutes to milliseconds, rounding to the nearest ms.
pub fn mins_to_ms(mins: f64) -> SimMillis {
    (mins * ONE_MIN_MS as f64).round().max(0.0) as SimMillis
}

/// Convert a timestamp or span in milliseconds to fractional minutes.
pub fn ms_to_mins(ms: SimMillis) -> f64 {
    ms as f64 / ONE_MIN_MS as f64
}

/// Format a timestamp as `HH:MM` for progress output.
pub fn fmt_clock(ms: SimMillis) -> String {
    let total_mins = ms / ONE_MIN_MS;
    format!("{:02}:{:02}", (total_mins / 60) % 24, total_mins % 60)
}

#[derive(Debug, Clone, Resource)]
pub struct SimulationClock {
    now: SimMillis,
    tick_ms: SimMillis,
}

impl SimulationClock {
    pub fn new(start: SimMillis, tick_ms: SimMillis) -> Self {
        Self {
            now: start,
            tick_ms,
        }
    }

    pub fn now(&self) -> SimMillis {
        self.now
    }

    pub fn tick_ms(&self) -> SimMillis {
        self.tick_ms
    }

    /// Step the clock forward by one tick.
    pub fn advance(&mut self) {
        self.now += self.tick_ms;
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        // Evening shift start, one-minute ticks.
        Self::new(17 * ONE_HOUR_MS, ONE_MIN_MS)
    }
}
