//! Swap-based local search over fixed-capacity partitions.
//!
//! Every operator exchanges the groups of two entities (or two equally sized
//! components), so group sizes never change.
//!
//! - [`centroid_swap`] — Entity swaps scored against group centroids
//! - [`pairwise_swap`] — Entity swaps scored on the intra-group pair sum
//! - [`component_swap`] — Whole-component swaps under hard grouping

mod centroid_swap;
mod component_swap;
mod pairwise_swap;
mod stats;

pub use centroid_swap::{centroid_swap_improve, DEFAULT_CENTROID_ITERATIONS};
pub use component_swap::{component_swap_improve, DEFAULT_COMPONENT_ITERATIONS};
pub use pairwise_swap::{pairwise_swap_improve, DEFAULT_PAIRWISE_ITERATIONS};
pub use stats::SwapStats;

/// Acceptance tolerance of every swap search, in km.
///
/// A swap is applied only if its delta is below `-IMPROVEMENT_EPS`. Swaps
/// that would change the objective by less than this are treated as ties.
pub const IMPROVEMENT_EPS: f64 = 1e-9;
