//! Quota and billing-cycle arithmetic for one service

use chrono::{Months, NaiveDate, NaiveDateTime, NaiveTime};

/// ISPs bill in decimal gigabytes
pub const BYTES_PER_GB: f64 = 1_000_000_000.0;
const SECONDS_PER_DAY: f64 = 86_400.0;

pub const MONTHLY_INTERVAL: &str = "Monthly";
pub const BYTES_UNIT: &str = "bytes";

/// Validated usage for one service. Only monthly plans measured in bytes
/// make it this far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageRecord {
    pub service_id: String,
    pub quota_bytes: u64,
    pub used_bytes: u64,
    /// First day of the next billing cycle
    pub rollover_date: NaiveDate,
    pub plan_interval: String,
    pub unit: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsageMetrics {
    pub quota_gb: f64,
    pub remaining_gb: f64,
    pub remaining_pct: f64,
    pub days_remaining: f64,
    pub days_in_cycle: i64,
    pub days_remaining_pct: f64,
}

impl UsageMetrics {
    pub fn compute(record: &UsageRecord, now: NaiveDateTime) -> Self {
        let quota_gb = record.quota_bytes as f64 / BYTES_PER_GB;
        let remaining_gb = (record.quota_bytes as f64 - record.used_bytes as f64) / BYTES_PER_GB;
        let remaining_pct = percent(remaining_gb, quota_gb);

        let days_remaining = days_until(record.rollover_date, now);
        let days_in_cycle = days_in_cycle(record.rollover_date);
        let days_remaining_pct = percent(days_remaining, days_in_cycle as f64);

        Self {
            quota_gb,
            remaining_gb,
            remaining_pct,
            days_remaining,
            days_in_cycle,
            days_remaining_pct,
        }
    }
}

/// Fractional days from `now` to local midnight on `rollover`; negative once it has passed
pub fn days_until(rollover: NaiveDate, now: NaiveDateTime) -> f64 {
    let rollover = rollover.and_time(NaiveTime::MIN);
    (rollover - now).num_milliseconds() as f64 / 1000.0 / SECONDS_PER_DAY
}

/// Length of the billing cycle that ends at `rollover`
pub fn days_in_cycle(rollover: NaiveDate) -> i64 {
    rollover
        .checked_sub_months(Months::new(1))
        .map_or(0, |start| (rollover - start).num_days())
}

fn percent(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        100.0 * part / whole
    }
}
