use crate::core::seatmap::seat_row_number;
use crate::models::domain::{Alert, CabinSnapshot, PassengerAssignment, WindowSeatIndex};
use std::collections::HashMap;

/// Price-drop alerts: one per cabin whose minimum observed seat price is at
/// or below the trip's configured threshold. Cabins absent from the
/// threshold map never alert.
pub fn price_alerts(
    snapshots: &[CabinSnapshot],
    thresholds: &HashMap<String, i64>,
    trip_name: &str,
) -> Vec<Alert> {
    snapshots
        .iter()
        .filter(|s| {
            thresholds
                .get(&s.cabin_type)
                .is_some_and(|threshold| s.min_price <= *threshold)
        })
        .map(|s| Alert {
            subject: format!(
                "Fare alert - {} for ${} ({})",
                s.cabin_type, s.min_price, trip_name
            ),
            message: "Buy it!".to_string(),
        })
        .collect()
}

/// Better-seat alerts: unoccupied window seats in the passenger's own cabin
/// that sit strictly forward (lower row number) of the current seat.
///
/// Row number is the ordering key, not the full seat id. An unresolved
/// passenger cabin yields no alerts rather than a guess.
pub fn window_alerts(
    window_seats: &WindowSeatIndex,
    passenger: &PassengerAssignment,
    trip_name: &str,
) -> Vec<Alert> {
    let Some(cabin) = passenger.cabin_type.as_deref() else {
        return Vec::new();
    };
    let Some(current_row) = seat_row_number(&passenger.seat_id) else {
        return Vec::new();
    };

    window_seats
        .get(cabin)
        .into_iter()
        .flatten()
        .filter(|seat| seat_row_number(seat).is_some_and(|row| row < current_row))
        .map(|seat| Alert {
            subject: format!("Better seat - {} ({})", seat, trip_name),
            message: format!(
                "Window seat {} is open, forward of your current seat {}",
                seat, passenger.seat_id
            ),
        })
        .collect()
}
