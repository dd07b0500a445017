// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction and timestamp formatting.
//!
//! The `Clock` trait lets tests drive the relay with controlled time
//! instead of wall-clock sampling.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};

use crate::config::TimestampMode;

/// Source of "now" for batch timestamps.
pub trait Clock {
    fn now(&self) -> SystemTime;
}

/// Real clock using system time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Fake clock with shared, manually advanced time.
#[derive(Clone, Debug, Default)]
pub struct FakeClock {
    micros: Arc<AtomicU64>,
}

impl FakeClock {
    /// Create a fake clock at the given microseconds past the epoch.
    pub fn new(micros: u64) -> Self {
        Self {
            micros: Arc::new(AtomicU64::new(micros)),
        }
    }

    pub fn at_epoch() -> Self {
        Self::new(0)
    }

    /// Advance time; clones observe the change.
    pub fn advance(&self, duration: Duration) {
        self.micros
            .fetch_add(duration.as_micros() as u64, Ordering::SeqCst);
    }

    /// Set absolute time in microseconds past the epoch.
    pub fn set(&self, micros: u64) {
        self.micros.store(micros, Ordering::SeqCst);
    }
}

impl Clock for FakeClock {
    fn now(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_micros(self.micros.load(Ordering::SeqCst))
    }
}

/// Render an instant for display. Pure function of its inputs.
pub fn format_timestamp(
    instant: SystemTime,
    mode: TimestampMode,
    session_start: SystemTime,
) -> String {
    match mode {
        TimestampMode::Utc => {
            let utc: DateTime<Utc> = instant.into();
            utc.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
        }
        TimestampMode::Unix => seconds(instant.duration_since(UNIX_EPOCH).unwrap_or_default()),
        TimestampMode::Relative => {
            seconds(instant.duration_since(session_start).unwrap_or_default())
        }
    }
}

/// Seconds with six fixed decimals. Integral parts keep full microsecond
/// precision at epoch magnitudes, which f64 formatting would not.
fn seconds(duration: Duration) -> String {
    format!("{}.{:06}", duration.as_secs(), duration.subsec_micros())
}

#[cfg(test)]
#[path = "time_tests.rs"]
mod tests;
