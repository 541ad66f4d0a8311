//! Capacity balancing by greedy minimum-marginal-cost moves.
//!
//! # Algorithm
//!
//! While some group holds more than `capacity` entities, recompute the group
//! centroids and consider every (entity in an over-capacity group,
//! under-capacity group) pair. The marginal cost of a move is the distance
//! from the entity to the target centroid minus its distance to its current
//! centroid. The single cheapest move is applied and the loop repeats.
//!
//! The heuristic is greedy and not guaranteed to minimise total
//! displacement.
//!
//! # Complexity
//!
//! O(N × K) per move; at most the number of surplus entities moves.

use log::debug;

use crate::distance::haversine_km;
use crate::error::{GroupingError, Result};
use crate::models::{Entity, GeoPoint, Partition};

/// Default iteration budget for [`balance_capacity`].
pub const DEFAULT_BALANCE_ITERATIONS: usize = 5000;

/// Result of capacity balancing.
#[derive(Debug, Clone)]
pub struct BalanceOutcome {
    /// Partition with exactly `capacity` members per group.
    pub partition: Partition,
    /// Number of single-entity reassignments performed.
    pub moves: usize,
}

#[derive(Debug, Clone, Copy)]
struct BalanceMove {
    entity: usize,
    to_group: usize,
    delta: f64,
}

/// Forces every group to contain exactly `capacity` entities.
///
/// # Arguments
///
/// * `entities` — All entities, indexed like `labels`
/// * `labels` — Initial group label per entity (any sizes)
/// * `k` — Number of groups
/// * `capacity` — Required members per group; `entities.len()` must equal
///   `k * capacity`
/// * `max_iterations` — Move budget before giving up
///
/// # Errors
///
/// [`GroupingError::BalanceNotConverged`] when the budget runs out and
/// [`GroupingError::BalanceStalled`] when no legal move exists. A partially
/// balanced partition is never returned.
///
/// # Examples
///
/// ```
/// use u_grouping::models::Entity;
/// use u_grouping::constructive::balance_capacity;
///
/// let entities = vec![
///     Entity::new("a", 50.0, 8.0),
///     Entity::new("b", 50.1, 8.1),
///     Entity::new("c", 50.2, 8.2),
///     Entity::new("d", 52.0, 13.0),
/// ];
/// let outcome = balance_capacity(&entities, &[0, 0, 0, 1], 2, 2, 100).unwrap();
/// assert_eq!(outcome.partition.group_sizes(), vec![2, 2]);
/// assert_eq!(outcome.moves, 1);
/// // The entity closest to the eastern group moves.
/// assert_eq!(outcome.partition.label(2), 1);
/// ```
pub fn balance_capacity(
    entities: &[Entity],
    labels: &[usize],
    k: usize,
    capacity: usize,
    max_iterations: usize,
) -> Result<BalanceOutcome> {
    if labels.len() != entities.len() {
        return Err(GroupingError::invalid_input(format!(
            "{} labels for {} entities",
            labels.len(),
            entities.len()
        )));
    }
    if capacity == 0 || k * capacity != entities.len() {
        return Err(GroupingError::invalid_input(format!(
            "{k} groups of {capacity} cannot hold {} entities",
            entities.len()
        )));
    }

    let mut partition = Partition::new(labels.to_vec(), k)?;
    let mut moves = 0;

    for _ in 0..max_iterations {
        let sizes = partition.group_sizes();
        let over: Vec<usize> = (0..k).filter(|&g| sizes[g] > capacity).collect();
        let under: Vec<usize> = (0..k).filter(|&g| sizes[g] < capacity).collect();
        if over.is_empty() && under.is_empty() {
            debug!("capacity balancing finished after {moves} moves");
            return Ok(BalanceOutcome { partition, moves });
        }

        let centroids = partition.centroids(entities);
        let Some(mv) = find_cheapest_move(entities, &partition, &centroids, &over, &under) else {
            return Err(GroupingError::BalanceStalled { over, under });
        };

        partition.assign(mv.entity, mv.to_group);
        moves += 1;
    }

    // The budget may run out exactly as the last move lands.
    if partition.group_sizes().iter().all(|&s| s == capacity) {
        return Ok(BalanceOutcome { partition, moves });
    }
    Err(GroupingError::BalanceNotConverged {
        iterations: max_iterations,
    })
}

/// Finds the globally cheapest move from an over-capacity group into an
/// under-capacity group. Ties keep the first candidate in (source group,
/// entity, target group) order.
fn find_cheapest_move(
    entities: &[Entity],
    partition: &Partition,
    centroids: &[Option<GeoPoint>],
    over: &[usize],
    under: &[usize],
) -> Option<BalanceMove> {
    let mut best: Option<BalanceMove> = None;

    for &from in over {
        let Some(source) = centroids[from] else {
            continue;
        };
        for entity in partition.members(from) {
            let point = entities[entity].point();
            let cost_from = haversine_km(point, source);
            for &to in under {
                // An empty group has no centroid and no members to travel to.
                let cost_to = centroids[to].map_or(0.0, |c| haversine_km(point, c));
                let delta = cost_to - cost_from;
                if best.as_ref().is_none_or(|b| delta < b.delta) {
                    best = Some(BalanceMove {
                        entity,
                        to_group: to,
                        delta,
                    });
                }
            }
        }
    }

    best
}
