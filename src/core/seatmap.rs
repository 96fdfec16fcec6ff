use crate::models::domain::{CabinSnapshot, PassengerAssignment, SkipReason, WindowSeatIndex};
use crate::models::upstream::{SeatCabin, SeatMapResponse};
use chrono::{DateTime, NaiveDateTime};

/// Everything the alert evaluator and the worksheet buffer need from one
/// seat-map response.
#[derive(Debug, Clone)]
pub struct SeatMapSummary {
    pub snapshots: Vec<CabinSnapshot>,
    pub window_seats: WindowSeatIndex,
    pub passenger: PassengerAssignment,
}

/// Parse one decoded seat-map response into per-cabin snapshots, the
/// unoccupied-window-seat index and the passenger's resolved assignment.
///
/// `payload` is the originating form-encoded request body; the segment
/// number is recovered from it to pick the right passenger entry. `now` is
/// the evaluation instant: trips whose departure is not strictly in the
/// future are skipped, never alerted on.
pub fn parse_seat_map(
    body: &serde_json::Value,
    payload: &str,
    route_name: &str,
    now: NaiveDateTime,
) -> Result<SeatMapSummary, SkipReason> {
    let response: SeatMapResponse =
        serde_json::from_value(body.clone()).map_err(|_| SkipReason::NoData)?;
    let ism = response.retrieve_ism_response.ok_or(SkipReason::NoData)?;

    let segment = segment_number_from_payload(payload).ok_or(SkipReason::IncompleteTrip)?;
    let matched = ism
        .passengers
        .iter()
        .find(|p| p.segment_number.as_deref() == Some(segment.as_str()))
        .ok_or(SkipReason::IncompleteTrip)?;
    let seat_id = matched
        .seat_number
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or(SkipReason::IncompleteTrip)?
        .to_string();
    let flight_date = matched
        .flight_date
        .as_deref()
        .and_then(parse_flight_date)
        .ok_or(SkipReason::IncompleteTrip)?;
    if flight_date <= now {
        return Err(SkipReason::Departed);
    }

    let seat_map = ism.seat_map_do.ok_or(SkipReason::IncompleteTrip)?;

    let mut snapshots = Vec::new();
    let mut window_seats = WindowSeatIndex::new();
    let mut passenger_cabin = None;

    for cabin in &seat_map.seat_cabins {
        let boundary = window_boundary_letters(&cabin.seat_layout);
        let mut prices = Vec::new();

        for cell in cabin.seat_rows.iter().flat_map(|r| r.seat_columns.iter()) {
            let Some(id) = cell.seat_number.as_deref().filter(|s| !s.is_empty()) else {
                continue;
            };
            for offer in &cell.seat_offer {
                if let Some(amount) = offer.amount {
                    if amount > 0.0 {
                        prices.push(amount);
                    }
                }
            }
            if !cell.is_occupied() {
                if let (Some((first, last)), Some(column)) = (boundary, trailing_letter(id)) {
                    if column == first || column == last {
                        window_seats
                            .entry(cabin.cabin_type.clone())
                            .or_default()
                            .push(id.to_string());
                    }
                }
            }
            if id == seat_id {
                passenger_cabin = Some(cabin.cabin_type.clone());
            }
        }

        // A cabin with no positive offers contributes nothing.
        if let Some(snapshot) = snapshot_from_prices(cabin, &prices) {
            snapshots.push(snapshot);
        }
    }

    Ok(SeatMapSummary {
        snapshots,
        window_seats,
        passenger: PassengerAssignment {
            segment_number: segment,
            seat_id,
            cabin_type: passenger_cabin,
            flight_date,
            route_name: route_name.to_string(),
        },
    })
}

fn snapshot_from_prices(cabin: &SeatCabin, prices: &[f64]) -> Option<CabinSnapshot> {
    if prices.is_empty() {
        return None;
    }
    let min = prices.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = prices.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let sum = prices.iter().sum::<f64>();
    Some(CabinSnapshot {
        cabin_type: cabin.cabin_type.clone(),
        // Whole currency units: min/max truncate toward zero, the average is
        // the truncated sum integer-divided by the offer count.
        min_price: min as i64,
        max_price: max as i64,
        avg_price: sum as i64 / prices.len() as i64,
        sample_count: prices.len(),
    })
}

/// Seat-column letters at the physical window positions: first letter of the
/// first layout group and last letter of the last, with groups split on any
/// run of non-alphanumeric separators ("AB-CD-EF" -> ('A', 'F')).
pub fn window_boundary_letters(layout: &str) -> Option<(char, char)> {
    let groups: Vec<&str> = layout
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|g| !g.is_empty())
        .collect();
    let first = groups.first()?.chars().next()?;
    let last = groups.last()?.chars().last()?;
    Some((first.to_ascii_uppercase(), last.to_ascii_uppercase()))
}

/// Leading numeric portion of a seat id ("24C" -> 24).
pub fn seat_row_number(seat_id: &str) -> Option<u32> {
    let digits: String = seat_id.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Trailing column letter of a seat id ("24C" -> 'C').
pub fn trailing_letter(seat_id: &str) -> Option<char> {
    seat_id
        .chars()
        .last()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
}

/// Recover the segment number from a form-encoded request payload.
pub fn segment_number_from_payload(payload: &str) -> Option<String> {
    payload.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == "segmentNumber" && !value.is_empty()).then(|| value.to_string())
    })
}

fn parse_flight_date(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::{json, Value};

    fn eval_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 11, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn seat(id: &str, occupied: bool, amount: f64) -> Value {
        json!({
            "seatNumber": id,
            "occupied": occupied,
            "seatOffer": [{"amount": amount}],
        })
    }

    fn response_with_cabins(cabins: Value) -> Value {
        json!({
            "retrieveISMResponse": {
                "passengers": [{
                    "segmentNumber": "1",
                    "seatNumber": "24C",
                    "flightDate": "2024-12-20T18:30:00",
                }],
                "seatMapDO": {"seatCabins": cabins},
            }
        })
    }

    const PAYLOAD: &str = "cacheKeySuffix=abc&segmentNumber=1&appId=sho";

    #[test]
    fn test_boundary_letters() {
        assert_eq!(window_boundary_letters("AB-CD-EF"), Some(('A', 'F')));
        assert_eq!(window_boundary_letters("A-DG"), Some(('A', 'G')));
        assert_eq!(window_boundary_letters("ABC  DEF"), Some(('A', 'F')));
        assert_eq!(window_boundary_letters(""), None);
    }

    #[test]
    fn test_seat_id_helpers() {
        assert_eq!(seat_row_number("24C"), Some(24));
        assert_eq!(seat_row_number("7A"), Some(7));
        assert_eq!(seat_row_number("XX"), None);
        assert_eq!(trailing_letter("24c"), Some('C'));
        assert_eq!(trailing_letter("24"), None);
    }

    #[test]
    fn test_segment_number_from_payload() {
        assert_eq!(segment_number_from_payload(PAYLOAD).as_deref(), Some("1"));
        assert_eq!(segment_number_from_payload("a=b&c=d"), None);
        assert_eq!(segment_number_from_payload("segmentNumber="), None);
    }

    #[test]
    fn test_empty_response_is_no_data() {
        let result = parse_seat_map(&json!({}), PAYLOAD, "JFK-CDG", eval_time());
        assert_eq!(result.unwrap_err(), SkipReason::NoData);
    }

    #[test]
    fn test_unmatched_segment_is_incomplete() {
        let body = response_with_cabins(json!([]));
        let result = parse_seat_map(&body, "segmentNumber=9", "JFK-CDG", eval_time());
        assert_eq!(result.unwrap_err(), SkipReason::IncompleteTrip);
    }

    #[test]
    fn test_missing_seat_map_is_incomplete() {
        let body = json!({
            "retrieveISMResponse": {
                "passengers": [{
                    "segmentNumber": "1",
                    "seatNumber": "24C",
                    "flightDate": "2024-12-20T18:30:00",
                }],
            }
        });
        let result = parse_seat_map(&body, PAYLOAD, "JFK-CDG", eval_time());
        assert_eq!(result.unwrap_err(), SkipReason::IncompleteTrip);
    }

    #[test]
    fn test_departed_flight_is_skipped() {
        let body = response_with_cabins(json!([]));
        let late = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let result = parse_seat_map(&body, PAYLOAD, "JFK-CDG", late);
        assert_eq!(result.unwrap_err(), SkipReason::Departed);
    }

    #[test]
    fn test_cabin_without_offers_yields_no_snapshot() {
        let body = response_with_cabins(json!([{
            "cabinType": "FIRST",
            "seatLayout": "AB-CD",
            "seatRows": [{"seatColumns": [seat("2A", true, 0.0)]}],
        }]));
        let summary = parse_seat_map(&body, PAYLOAD, "JFK-CDG", eval_time()).unwrap();
        assert!(summary.snapshots.is_empty());
    }

    #[test]
    fn test_snapshot_math_truncates() {
        let body = response_with_cabins(json!([{
            "cabinType": "FIRST",
            "seatLayout": "AB-CD",
            "seatRows": [{"seatColumns": [
                seat("2A", true, 100.9),
                seat("2B", true, 201.9),
            ]}],
        }]));
        let summary = parse_seat_map(&body, PAYLOAD, "JFK-CDG", eval_time()).unwrap();
        let snapshot = &summary.snapshots[0];
        assert_eq!(snapshot.cabin_type, "FIRST");
        assert_eq!(snapshot.min_price, 100);
        assert_eq!(snapshot.max_price, 201);
        // (100.9 + 201.9) as i64 = 302, / 2 = 151
        assert_eq!(snapshot.avg_price, 151);
        assert_eq!(snapshot.sample_count, 2);
    }

    #[test]
    fn test_window_index_only_unoccupied_boundary_seats() {
        let body = response_with_cabins(json!([{
            "cabinType": "FIRST",
            "seatLayout": "AB-CD",
            "seatRows": [{"seatColumns": [
                seat("2A", false, 50.0),  // window, free
                seat("2B", false, 50.0),  // aisle, free
                seat("3D", true, 50.0),   // window, occupied
                seat("4D", false, 50.0),  // window, free
            ]}],
        }]));
        let summary = parse_seat_map(&body, PAYLOAD, "JFK-CDG", eval_time()).unwrap();
        assert_eq!(summary.window_seats["FIRST"], vec!["2A", "4D"]);
    }

    #[test]
    fn test_passenger_cabin_resolution() {
        let body = response_with_cabins(json!([
            {
                "cabinType": "FIRST",
                "seatLayout": "AB-CD",
                "seatRows": [{"seatColumns": [seat("2A", false, 50.0)]}],
            },
            {
                "cabinType": "COACH",
                "seatLayout": "ABC-DEF",
                "seatRows": [{"seatColumns": [seat("24C", true, 30.0)]}],
            },
        ]));
        let summary = parse_seat_map(&body, PAYLOAD, "JFK-CDG", eval_time()).unwrap();
        assert_eq!(summary.passenger.cabin_type.as_deref(), Some("COACH"));
        assert_eq!(summary.passenger.seat_id, "24C");
        assert_eq!(summary.passenger.route_name, "JFK-CDG");
    }

    #[test]
    fn test_unassigned_seat_stays_unresolved() {
        let body = response_with_cabins(json!([{
            "cabinType": "FIRST",
            "seatLayout": "AB-CD",
            "seatRows": [{"seatColumns": [seat("2A", false, 50.0)]}],
        }]));
        let summary = parse_seat_map(&body, PAYLOAD, "JFK-CDG", eval_time()).unwrap();
        assert_eq!(summary.passenger.cabin_type, None);
    }
}
