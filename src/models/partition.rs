//! Group assignment of entities.

use serde::Serialize;

use super::{Entity, GeoPoint};
use crate::error::{GroupingError, Result};

/// A total, disjoint assignment of entities to groups `0..num_groups`.
///
/// Stored as one label per entity, so every entity belongs to exactly one
/// group by construction. Group sizes are not constrained here; the
/// capacity invariant is checked with [`Partition::validate`].
///
/// # Examples
///
/// ```
/// use u_grouping::models::Partition;
///
/// let p = Partition::new(vec![0, 1, 1, 0], 2).unwrap();
/// assert_eq!(p.group_sizes(), vec![2, 2]);
/// assert_eq!(p.members(1), vec![1, 2]);
/// assert!(p.validate(4, 2).is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Partition {
    labels: Vec<usize>,
    num_groups: usize,
}

impl Partition {
    /// Creates a partition from per-entity labels.
    ///
    /// Fails if `num_groups` is zero or any label is out of range.
    pub fn new(labels: Vec<usize>, num_groups: usize) -> Result<Self> {
        if num_groups == 0 {
            return Err(GroupingError::invalid_input("number of groups must be positive"));
        }
        if let Some((idx, &label)) = labels.iter().enumerate().find(|&(_, &l)| l >= num_groups) {
            return Err(GroupingError::invalid_input(format!(
                "entity {idx} has label {label}, expected < {num_groups}"
            )));
        }
        Ok(Self { labels, num_groups })
    }

    /// Per-entity group labels.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Group of entity `entity`.
    ///
    /// # Panics
    ///
    /// Panics if `entity` is out of bounds.
    pub fn label(&self, entity: usize) -> usize {
        self.labels[entity]
    }

    /// Number of groups (K).
    pub fn num_groups(&self) -> usize {
        self.num_groups
    }

    /// Number of entities (N).
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns `true` if the partition covers no entities.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Member count of every group.
    pub fn group_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.num_groups];
        for &l in &self.labels {
            sizes[l] += 1;
        }
        sizes
    }

    /// Entity indices in `group`, ascending.
    pub fn members(&self, group: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|&(_, &l)| l == group)
            .map(|(i, _)| i)
            .collect()
    }

    /// Members of every group, each list ascending.
    pub fn groups(&self) -> Vec<Vec<usize>> {
        let mut groups = vec![Vec::new(); self.num_groups];
        for (i, &l) in self.labels.iter().enumerate() {
            groups[l].push(i);
        }
        groups
    }

    /// Mean coordinate of each group; `None` for an empty group.
    pub fn centroids(&self, entities: &[Entity]) -> Vec<Option<GeoPoint>> {
        self.groups()
            .iter()
            .map(|members| GeoPoint::mean(members.iter().map(|&i| entities[i].point())))
            .collect()
    }

    /// Centroid of a single group.
    pub fn centroid(&self, entities: &[Entity], group: usize) -> Option<GeoPoint> {
        GeoPoint::mean(
            self.labels
                .iter()
                .enumerate()
                .filter(|&(_, &l)| l == group)
                .map(|(i, _)| entities[i].point()),
        )
    }

    /// Moves `entity` into `group`.
    pub(crate) fn assign(&mut self, entity: usize, group: usize) {
        debug_assert!(group < self.num_groups);
        self.labels[entity] = group;
    }

    /// Exchanges the groups of two entities.
    pub(crate) fn swap(&mut self, a: usize, b: usize) {
        self.labels.swap(a, b);
    }

    /// Checks the stage-boundary invariants: `expected_len` entities and
    /// exactly `capacity` members in every group.
    pub fn validate(&self, expected_len: usize, capacity: usize) -> Result<()> {
        if self.labels.len() != expected_len {
            return Err(GroupingError::invariant(format!(
                "partition covers {} entities, expected {expected_len}",
                self.labels.len()
            )));
        }
        if self.num_groups * capacity != expected_len {
            return Err(GroupingError::invariant(format!(
                "{} groups of {capacity} cannot hold {expected_len} entities",
                self.num_groups
            )));
        }
        for (group, size) in self.group_sizes().into_iter().enumerate() {
            if size != capacity {
                return Err(GroupingError::invariant(format!(
                    "group {group} has {size} members, expected {capacity}"
                )));
            }
        }
        Ok(())
    }
}
