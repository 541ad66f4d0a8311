//! # u-grouping
//!
//! Capacity-constrained geographic grouping: split N located entities into
//! K groups of exactly M members so that members of a group lie close to
//! each other, optionally forcing nearby entities into the same group.
//!
//! ## Modules
//!
//! - [`models`] — Domain types (GeoPoint, Entity, Partition)
//! - [`distance`] — Haversine distance and the pairwise distance matrix
//! - [`constructive`] — k-means seeding and greedy capacity balancing
//! - [`local_search`] — Centroid, pairwise, and component swap descent
//! - [`constraints`] — Proximity components for hard grouping
//! - [`evaluation`] — Objectives, travel metrics, compass names
//! - [`solver`] — The staged pipeline tying everything together
//!
//! ## Example
//!
//! ```
//! use u_grouping::{GroupingConfig, GroupingSolver};
//! use u_grouping::models::Entity;
//!
//! let entities = vec![
//!     Entity::new("kiel", 54.32, 10.13),
//!     Entity::new("hamburg", 53.55, 10.00),
//!     Entity::new("munich", 48.14, 11.58),
//!     Entity::new("augsburg", 48.37, 10.90),
//! ];
//! let config = GroupingConfig::new(2, 2).with_search_iterations(500, 500, 500);
//! let outcome = GroupingSolver::new(config).solve(&entities).unwrap();
//! assert_eq!(outcome.partition.label(0), outcome.partition.label(1));
//! assert_eq!(outcome.names.len(), 2);
//! ```

pub mod config;
pub mod constraints;
pub mod constructive;
pub mod distance;
pub mod error;
pub mod evaluation;
pub mod local_search;
pub mod models;
pub mod solver;

pub use config::GroupingConfig;
pub use error::{GroupingError, Result};
pub use solver::{GroupingOutcome, GroupingSolver};
