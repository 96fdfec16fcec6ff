use crate::config::WatchConfig;
use crate::core::alerts::{price_alerts, window_alerts};
use crate::core::retry::{RetryPolicy, Sleep};
use crate::core::seatmap::parse_seat_map;
use crate::models::domain::Alert;
use crate::services::fetcher::Fetcher;
use crate::services::notify::NotifySink;
use crate::services::sheets::SheetSink;
use chrono::NaiveDateTime;
use std::time::Duration;
use tracing::{error, info, warn};

/// Worksheet appends retry up to 3 times, waiting 30s x attempt between tries.
const APPEND_RETRY: RetryPolicy = RetryPolicy::new(3, Duration::from_secs(30));

/// Outcome of one monitoring cycle, for logging and tests.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub trips_checked: usize,
    pub trips_skipped: usize,
    pub alerts_published: usize,
    pub rows_buffered: usize,
    /// Set when the worksheet append exhausted its retries.
    pub degraded_write: bool,
}

/// Run one monitoring cycle: check every configured trip in order, publish
/// alerts, and flush the snapshot buffer to the worksheet in one batch.
///
/// Failures are contained per trip; nothing here is fatal. `now` is the
/// evaluation instant used for staleness checks and row timestamps.
pub async fn run_cycle(
    watch: &WatchConfig,
    fetcher: &Fetcher,
    notify: &dyn NotifySink,
    sheets: &dyn SheetSink,
    sleep: &dyn Sleep,
    now: NaiveDateTime,
) -> CycleReport {
    let mut report = CycleReport::default();
    let mut rows: Vec<Vec<String>> = Vec::new();
    let timestamp = now.format("%Y-%m-%d %H:%M:%S").to_string();

    for (idx, trip) in watch.trips.iter().enumerate() {
        info!("Checking trip {} : {}", idx, trip.url);
        report.trips_checked += 1;

        let body = match fetcher.post_form(&trip.url, &trip.data).await {
            Ok(body) => body,
            Err(e) => {
                error!("Unable to get seats for trip {} ({}): {}", idx, trip.name, e);
                report.trips_skipped += 1;
                continue;
            }
        };

        let summary = match parse_seat_map(&body, &trip.data, &trip.name, now) {
            Ok(summary) => summary,
            Err(skip) => {
                info!("Skipping trip {} ({}): {}", idx, trip.name, skip);
                report.trips_skipped += 1;
                continue;
            }
        };

        for snapshot in &summary.snapshots {
            rows.push(vec![
                timestamp.clone(),
                snapshot.cabin_type.clone(),
                snapshot.min_price.to_string(),
                snapshot.max_price.to_string(),
                snapshot.avg_price.to_string(),
                trip.name.clone(),
                format!("{} - {}", trip.name, snapshot.cabin_type),
            ]);
        }

        let mut alerts = price_alerts(&summary.snapshots, &trip.alerts, &trip.name);
        alerts.extend(window_alerts(
            &summary.window_seats,
            &summary.passenger,
            &trip.name,
        ));
        report.alerts_published += publish_alerts(notify, &alerts).await;
    }

    report.rows_buffered = rows.len();
    if !rows.is_empty() {
        info!("Writing {} rows to worksheet", rows.len());
        report.degraded_write = !append_with_retry(sheets, watch, &rows, sleep).await;
    }
    report
}

async fn publish_alerts(notify: &dyn NotifySink, alerts: &[Alert]) -> usize {
    let mut published = 0;
    for alert in alerts {
        info!("Sending alert with subject '{}'", alert.subject);
        match notify.publish(&alert.subject, &alert.message).await {
            Ok(()) => published += 1,
            Err(e) => error!("Unable to publish alert '{}': {}", alert.subject, e),
        }
    }
    published
}

/// Batched append with bounded retry. Returns false when the retries were
/// exhausted and the rows were dropped for this cycle.
async fn append_with_retry(
    sheets: &dyn SheetSink,
    watch: &WatchConfig,
    rows: &[Vec<String>],
    sleep: &dyn Sleep,
) -> bool {
    let mut attempt = 1;
    loop {
        match sheets
            .append_rows(&watch.gsheet.id, &watch.gsheet.tab, rows)
            .await
        {
            Ok(()) => return true,
            Err(e) => {
                warn!("Unable to write to worksheet (try {}): {}", attempt, e);
                match APPEND_RETRY.delay_after(attempt) {
                    Some(delay) => {
                        sleep.sleep(delay).await;
                        attempt += 1;
                    }
                    None => {
                        error!(
                            "Worksheet append failed after {} attempts, dropping {} rows this cycle",
                            APPEND_RETRY.max_attempts,
                            rows.len()
                        );
                        return false;
                    }
                }
            }
        }
    }
}
