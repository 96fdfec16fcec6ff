// Core algorithm exports
pub mod alerts;
pub mod extract;
pub mod pricetable;
pub mod retry;
pub mod seatmap;

pub use alerts::{price_alerts, window_alerts};
pub use extract::{classify_fare_brand, extract_prices};
pub use pricetable::{MinPriceRow, PriceTable, TableError};
pub use retry::{NoSleep, RetryPolicy, Sleep, TokioSleep};
pub use seatmap::{parse_seat_map, seat_row_number, window_boundary_letters, SeatMapSummary};
