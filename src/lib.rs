//! Farewatch - airline seat-map price monitor and bulk fare sweep
//!
//! Two paths share one upstream HTTP client: a sequential monitoring cycle
//! that checks configured trips for price drops and better window seats, and
//! a bounded-concurrency sweep that collects daily offer prices over a date
//! range and reports per-class minimums.

pub mod config;
pub mod core;
pub mod models;
pub mod runner;
pub mod services;

// Re-export commonly used types
pub use config::{Settings, TripConfig, WatchConfig};
pub use models::{Alert, CabinSnapshot, PriceSample, SkipReason};
pub use runner::{run_cycle, run_sweep, CycleReport};
pub use self::core::{parse_seat_map, PriceTable, RetryPolicy};
pub use services::{Fetcher, NotifySink, SheetSink};

#[cfg(test)]
mod tests {
    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        assert_eq!(crate::core::classify_fare_brand("Economy"), "Main");
        assert_eq!(crate::core::seat_row_number("12A"), Some(12));
    }
}
