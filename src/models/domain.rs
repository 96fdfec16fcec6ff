use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;

/// Per-cabin price summary for one trip check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CabinSnapshot {
    pub cabin_type: String,
    pub min_price: i64,
    pub max_price: i64,
    pub avg_price: i64,
    pub sample_count: usize,
}

/// Cabin type -> unoccupied window seat ids, in seat-map order
pub type WindowSeatIndex = BTreeMap<String, Vec<String>>;

/// The passenger's seat on the flight leg being monitored
///
/// Resolved by matching the request payload's segment number against the
/// passenger list in the seat-map response. `cabin_type` is filled in during
/// the cabin walk when the assigned seat is found in the map; when it stays
/// unresolved, window-seat evaluation is skipped entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassengerAssignment {
    pub segment_number: String,
    pub seat_id: String,
    pub cabin_type: Option<String>,
    pub flight_date: NaiveDateTime,
    pub route_name: String,
}

/// One observed fare for one day of a bulk sweep
///
/// Field order doubles as the table sort key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PriceSample {
    pub date: NaiveDate,
    pub fare_class: String,
    pub price: i64,
    pub stop_count: u32,
}

/// Outbound notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub subject: String,
    pub message: String,
}

/// Why a trip check produced no data this cycle
///
/// None of these are errors; each one maps to a silent per-trip skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Top-level response payload empty or absent
    NoData,
    /// No passenger matched the segment, no seat assigned, or no seat map
    IncompleteTrip,
    /// Flight departure is not strictly in the future
    Departed,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NoData => write!(f, "no data in response"),
            SkipReason::IncompleteTrip => write!(f, "incomplete trip data"),
            SkipReason::Departed => write!(f, "flight already departed"),
        }
    }
}
