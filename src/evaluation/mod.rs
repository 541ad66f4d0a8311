//! Objectives, travel metrics, and group naming.
//!
//! - [`objective`] — Centroid and pairwise objectives, mean away distance
//! - [`metrics`] — Per-group and per-entity travel report
//! - [`labeling`] — Compass names derived from group centroids

mod labeling;
mod metrics;
mod objective;

pub use labeling::compass_names;
pub use metrics::{EntityMetrics, GroupMetrics, PartitionReport, Trip};
pub use objective::{average_away_distance, centroid_cost, intra_group_distance_sum};
