//! Domain model types for equal-size geographic grouping.
//!
//! Provides the core abstractions: geo-located entities, coordinates used
//! for centroids, and the partition that maps every entity to a group.

mod entity;
mod partition;

pub use entity::{Entity, GeoPoint};
pub use partition::Partition;
