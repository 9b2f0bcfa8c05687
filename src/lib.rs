//! Workout log: running and cycling records placed on a map, kept in a local
//! key/value store, shown as a sortable list and as map markers.

pub mod app;
pub mod cli;
pub mod error;
pub mod geo;
pub mod gpx;
pub mod storage;
pub mod store;
pub mod types;
pub mod utils;
pub mod views;

pub use error::{Error, GeolocationError, Result};
pub use store::{SortField, WorkoutStore};
pub use types::{Activity, Coordinates, Kind, Workout, WorkoutId};
