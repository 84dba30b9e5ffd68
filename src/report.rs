//! Fetch, parse and summarise every service on the account

use chrono::NaiveDateTime;
use std::io::Write;

use crate::config::ApiConfig;
use crate::error::AppError;
use crate::providers::{parse_services, parse_usage, Request, UsageSource};
use crate::usage::UsageMetrics;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One summary line, e.g.
/// `2012-07-25 12:00:00 5.349 GB (53.5%) remaining, 21.5 days (69.4%) left, 10 GB quota`
pub fn format_line(timestamp: NaiveDateTime, metrics: &UsageMetrics) -> String {
    format!(
        "{} {:.3} GB ({:.1}%) remaining, {:.1} days ({:.1}%) left, {:.0} GB quota",
        timestamp.format(TIMESTAMP_FORMAT),
        metrics.remaining_gb,
        metrics.remaining_pct,
        metrics.days_remaining,
        metrics.days_remaining_pct,
        metrics.quota_gb,
    )
}

/// Print one line per service to `out`, one service at a time.
///
/// The first failure aborts the run. Returns how many services were reported.
pub async fn run_report<S, W, C>(
    source: &S,
    api: &ApiConfig,
    clock: C,
    out: &mut W,
) -> Result<usize, AppError>
where
    S: UsageSource + ?Sized,
    W: Write,
    C: Fn() -> NaiveDateTime,
{
    let body = source.fetch(Request::Services).await?;
    let services = parse_services(&body, &api.service_path)?;
    if services.is_empty() {
        log::warn!("No services found at {}", api.base_uri);
        return Ok(0);
    }
    log::debug!("Found {} service(s)", services.len());

    for service_id in &services {
        let body = source.fetch(Request::Usage(service_id)).await?;
        let record = parse_usage(&body, &api.usage_path, service_id)?;
        log::debug!("Usage for {}: {:?}", service_id, record);

        let now = clock();
        let metrics = UsageMetrics::compute(&record, now);
        writeln!(out, "{}", format_line(now, &metrics))?;
    }

    Ok(services.len())
}
