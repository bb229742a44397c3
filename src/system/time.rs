//! Time keeping module
//!
//! Wall time is a boot-time reference plus the monotonic delta since;
//! the app only ever sees read-only [`ClockSample`]s of it.

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use embassy_time::Instant;

pub struct TimeReference {
    /// Clock time
    time: NaiveDateTime,
    /// Related system time
    instant: Instant,
}

impl Default for TimeReference {
    fn default() -> Self {
        Self {
            time: NaiveDateTime::UNIX_EPOCH,
            instant: Instant::from_ticks(0),
        }
    }
}

impl TimeReference {
    /// Create new time reference from NaiveDateTime
    pub fn from_datetime(time: NaiveDateTime) -> Self {
        Self {
            time,
            instant: Instant::now(),
        }
    }
}

/// Read-only snapshot of the wall clock, taken once per tick.
#[derive(Clone, Copy, Debug)]
pub struct ClockSample {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub day_of_year: u16,
    pub weekday: Weekday,
    pub day_of_month: u32,
}

pub struct TimeManager {
    reference: TimeReference,
}

impl TimeManager {
    /// Initialize time measurement on boot
    pub fn init() -> Self {
        Self {
            reference: TimeReference::default(),
        }
    }

    /// Get current time
    pub fn get_time(&self) -> NaiveDateTime {
        let now = Instant::now();
        NaiveDateTime::from_timestamp_micros(
            self.reference.time.timestamp_micros()
                + now.duration_since(self.reference.instant).as_micros() as i64,
        )
        .unwrap()
    }

    /// Update time reference
    pub fn set_time(&mut self, reference: TimeReference) {
        self.reference = reference;
    }

    /// Snapshot the current local time
    pub fn sample(&self) -> ClockSample {
        let time = self.get_time();
        ClockSample {
            hour: time.hour(),
            minute: time.minute(),
            second: time.second(),
            day_of_year: time.ordinal() as u16,
            weekday: time.weekday(),
            day_of_month: time.day(),
        }
    }
}
