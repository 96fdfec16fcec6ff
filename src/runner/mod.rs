// Orchestration exports
pub mod monitor;
pub mod sweep;

pub use monitor::{run_cycle, CycleReport};
pub use sweep::{fetch_day, offer_search_payload, report_min_prices, run_sweep};
