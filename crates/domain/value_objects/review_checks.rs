use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::review_checks::ReviewCheckEntity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewCheckSchedule {
    pub first_delay_seconds: i64,
    pub interval_seconds: i64,
    pub max_attempts: i32,
    pub max_api_errors: i32,
}

impl Default for ReviewCheckSchedule {
    fn default() -> Self {
        Self {
            first_delay_seconds: 120,
            interval_seconds: 300,
            max_attempts: 6,
            max_api_errors: 3,
        }
    }
}

impl ReviewCheckSchedule {
    pub fn first_check_at(&self, scanned_at: DateTime<Utc>) -> DateTime<Utc> {
        scanned_at + Duration::seconds(self.first_delay_seconds.max(0))
    }

    pub fn next_check_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::seconds(self.interval_seconds.max(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountChange {
    /// No count recorded yet; the observation becomes the baseline.
    Unknown,
    Unchanged,
    Increased { previous: i32 },
    /// Reviews were removed; the stored count must follow or later increases are masked.
    Decreased { previous: i32 },
}

pub fn detect_increase(last_known: Option<i32>, observed: i32) -> CountChange {
    match last_known {
        None => CountChange::Unknown,
        Some(previous) if observed > previous => CountChange::Increased { previous },
        Some(previous) if observed < previous => CountChange::Decreased { previous },
        Some(_) => CountChange::Unchanged,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    Reschedule { attempts: i32, api_errors: i32 },
    Abandon { attempts: i32, api_errors: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckProgress {
    pub attempts: i32,
    pub max_attempts: i32,
    pub api_errors: i32,
    pub max_api_errors: i32,
}

impl CheckProgress {
    pub fn of(check: &ReviewCheckEntity, max_api_errors: i32) -> Self {
        Self {
            attempts: check.attempts,
            max_attempts: check.max_attempts,
            api_errors: check.api_errors,
            max_api_errors,
        }
    }

    pub fn after_poll(&self) -> NextStep {
        let attempts = self.attempts + 1;
        if attempts >= self.max_attempts {
            NextStep::Abandon {
                attempts,
                api_errors: self.api_errors,
            }
        } else {
            NextStep::Reschedule {
                attempts,
                api_errors: self.api_errors,
            }
        }
    }

    pub fn after_api_error(&self) -> NextStep {
        let api_errors = self.api_errors + 1;
        if api_errors >= self.max_api_errors {
            NextStep::Abandon {
                attempts: self.attempts,
                api_errors,
            }
        } else {
            NextStep::Reschedule {
                attempts: self.attempts,
                api_errors,
            }
        }
    }
}
