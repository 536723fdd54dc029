use std::sync::{Arc, PoisonError, RwLock};

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};

/// Source of "now" for audit timestamps and of "today" for default draft dates.
pub trait Clock: std::fmt::Debug + Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Wall clock in the local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock that only moves when told to. Used for replaying recorded
/// scenarios and in tests.
#[derive(Debug, Clone)]
pub struct FixedClock {
    state: Arc<RwLock<NaiveDateTime>>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self { state: Arc::new(RwLock::new(now)) }
    }

    /// Clock pinned to midnight of `date`.
    pub fn at_date(date: NaiveDate) -> Self {
        Self::new(date.and_time(NaiveTime::MIN))
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }
}
