// Model exports
pub mod domain;
pub mod upstream;

pub use domain::{
    Alert, CabinSnapshot, PassengerAssignment, PriceSample, SkipReason, WindowSeatIndex,
};
pub use upstream::{OfferSearchResponse, SeatMapResponse};
