use crate::config::SweepSettings;
use crate::core::extract::extract_prices;
use crate::core::pricetable::{PriceTable, TableError};
use crate::core::retry::{RetryPolicy, Sleep};
use crate::models::domain::PriceSample;
use crate::models::upstream::OfferSearchResponse;
use crate::services::fetcher::Fetcher;
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Per-day fetches retry only on the timeout class, back to back.
const DAY_FETCH_RETRY: RetryPolicy = RetryPolicy::no_backoff(5);

/// Offer-search request body for one departure day.
pub fn offer_search_payload(origin: &str, destination: &str, day: NaiveDate) -> Value {
    json!({
        "offersCriteria": {
            "resultsPageNum": 1,
            "resultsPerRequestNum": 20,
            "recordLocatorId": "",
            "pricingCriteria": {"priceableIn": ["CURRENCY"], "waiveChangeFee": false},
            "flightRequestCriteria": {
                "sortableOptionId": "customScore",
                "bundleOffer": false,
                "calendarSearch": false,
                "currentTripIndexId": "1",
                "selectedOfferId": "",
                "searchOriginDestination": [{
                    "departureLocalTs": day.format("%Y-%m-%dT00:00:00").to_string(),
                    "tripId": "1",
                    "origins": [{"airportCode": origin}],
                    "destinations": [{"airportCode": destination}],
                }],
            },
        },
        "isSearch": true,
    })
}

/// Fetch and extract one day's samples. Timeouts retry up to the bound;
/// any other failure abandons the day. Either way the failure stays local:
/// the day just contributes zero samples.
pub async fn fetch_day(
    fetcher: &Fetcher,
    url: &str,
    origin: &str,
    destination: &str,
    day: NaiveDate,
    sleep: &dyn Sleep,
) -> Vec<PriceSample> {
    let payload = offer_search_payload(origin, destination, day);
    let mut attempt = 1;
    loop {
        match fetcher.post_json(url, &payload).await {
            Ok(body) => {
                let response: OfferSearchResponse = match serde_json::from_value(body) {
                    Ok(response) => response,
                    Err(e) => {
                        warn!("No usable offer data for {}: {}", day, e);
                        return Vec::new();
                    }
                };
                let samples = extract_prices(&response, day);
                info!("Try {} for {} done ({} samples)", attempt, day, samples.len());
                return samples;
            }
            Err(e) if e.is_timeout() => {
                warn!("Try {} failed for {}: {}", attempt, day, e);
                match DAY_FETCH_RETRY.delay_after(attempt) {
                    Some(delay) => {
                        sleep.sleep(delay).await;
                        attempt += 1;
                    }
                    None => {
                        error!(
                            "Giving up on {} after {} attempts",
                            day, DAY_FETCH_RETRY.max_attempts
                        );
                        return Vec::new();
                    }
                }
            }
            Err(e) => {
                error!("Fetch for {} failed: {}", day, e);
                return Vec::new();
            }
        }
    }
}

/// Sweep a closed date range: one fetch task per day under a bounded
/// concurrency cap, fan-in merge of each task's local samples, then a
/// deduplicated, sorted table written to the output file.
///
/// Every scheduled day runs to completion (or exhausted retry) before the
/// table is written; a failed day never blocks its siblings.
pub async fn run_sweep(
    settings: &SweepSettings,
    fetcher: Arc<Fetcher>,
    sleep: Arc<dyn Sleep>,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<PriceTable, TableError> {
    let days: Vec<NaiveDate> = from.iter_days().take_while(|d| *d <= to).collect();
    info!(
        "Sweeping {}-{} from {} over {} day(s), {} in flight",
        settings.origin,
        settings.destination,
        from,
        days.len(),
        settings.max_in_flight
    );

    let semaphore = Arc::new(Semaphore::new(settings.max_in_flight));
    let mut tasks = JoinSet::new();
    for day in days {
        let semaphore = semaphore.clone();
        let fetcher = fetcher.clone();
        let sleep = sleep.clone();
        let url = settings.url.clone();
        let origin = settings.origin.clone();
        let destination = settings.destination.clone();
        tasks.spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return Vec::new();
            };
            fetch_day(&fetcher, &url, &origin, &destination, day, sleep.as_ref()).await
        });
    }

    let mut table = PriceTable::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(samples) => table.merge(samples),
            Err(e) => error!("Day task failed to complete: {}", e),
        }
    }

    table.dedupe_sort();
    table.write_csv(Path::new(&settings.output_path))?;
    info!(
        "Wrote {} samples to {}",
        table.len(),
        settings.output_path
    );
    Ok(table)
}

/// Read the last sweep's table back and log one row per (price, fare class,
/// stop count) minimum, listing every date that minimum was observed.
pub fn report_min_prices(output_path: &str) -> Result<(), TableError> {
    let table = PriceTable::read_csv(Path::new(output_path))?;
    for row in table.min_prices() {
        let dates: Vec<String> = row.dates.iter().map(|d| d.to_string()).collect();
        info!(
            "{} | {} stop(s) | min ${} on {}",
            row.fare_class,
            row.stop_count,
            row.price,
            dates.join(", ")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_carries_route_and_day() {
        let day = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        let payload = offer_search_payload("JFK", "CDG", day);
        let criteria = &payload["offersCriteria"]["flightRequestCriteria"];
        let od = &criteria["searchOriginDestination"][0];
        assert_eq!(od["departureLocalTs"], "2024-12-01T00:00:00");
        assert_eq!(od["origins"][0]["airportCode"], "JFK");
        assert_eq!(od["destinations"][0]["airportCode"], "CDG");
    }
}
