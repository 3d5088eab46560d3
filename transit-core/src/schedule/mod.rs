//! Schedule data: trips and the shared store

pub mod store;
pub mod trip;

pub use store::ScheduleStore;
pub use trip::{apply_abbreviations, Trip, TripDecoder, TripError};
