//! Constructive stages that produce the first capacity-feasible partition.
//!
//! - [`KMeans`] — Lloyd's algorithm with k-means++ seeding and restarts,
//!   behind the [`Partitioner`] trait
//! - [`balance_capacity`] — Greedy minimum-marginal-cost moves until every
//!   group holds exactly its capacity

mod balance;
mod kmeans;

pub use balance::{balance_capacity, BalanceOutcome, DEFAULT_BALANCE_ITERATIONS};
pub use kmeans::{Clustering, KMeans, Partitioner};
