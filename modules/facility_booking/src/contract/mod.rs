pub mod client;
pub mod error;
pub mod model;

pub use client::FacilityBookingApi;
pub use error::FacilityBookingError;
pub use model::*;
