//! Great-circle distances.
//!
//! Provides the haversine distance oracle and a dense distance matrix
//! derived from it.

mod haversine;
mod matrix;

pub use haversine::{haversine_km, EARTH_RADIUS_KM};
pub use matrix::DistanceMatrix;
