//! Proximity components and their initial placement.
//!
//! Entities closer than a threshold must share a group. Connectivity is
//! transitive: if a–b and b–c are within the threshold, all three form one
//! component even when a–c is not.

use std::cmp::Reverse;

use log::debug;
use serde::Serialize;

use super::UnionFind;
use crate::distance::{haversine_km, DistanceMatrix};
use crate::error::{GroupingError, Result};
use crate::models::{Entity, GeoPoint, Partition};

/// Number of member indices quoted in an infeasibility diagnostic.
const DIAGNOSTIC_MEMBERS: usize = 8;

/// A maximal set of entities connected by proximity edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Component {
    members: Vec<usize>,
}

impl Component {
    /// Creates a component from entity indices (sorted on construction).
    pub fn new(mut members: Vec<usize>) -> Self {
        members.sort_unstable();
        Self { members }
    }

    /// Entity indices, ascending.
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if the component has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Mean coordinate of the members.
    pub fn centroid(&self, entities: &[Entity]) -> Option<GeoPoint> {
        GeoPoint::mean(self.members.iter().map(|&m| entities[m].point()))
    }
}

/// Builds proximity components over all entity pairs with distance at most
/// `threshold_km`.
///
/// Components are ordered by their smallest member; every entity appears in
/// exactly one component (isolated entities form singletons).
///
/// # Examples
///
/// ```
/// use u_grouping::models::Entity;
/// use u_grouping::distance::DistanceMatrix;
/// use u_grouping::constraints::build_components;
///
/// let entities = vec![
///     Entity::new("a", 50.00, 8.0),
///     Entity::new("b", 52.00, 13.0),
///     Entity::new("c", 50.05, 8.0),
/// ];
/// let dm = DistanceMatrix::from_entities(&entities);
/// let components = build_components(&dm, 50.0);
/// assert_eq!(components.len(), 2);
/// assert_eq!(components[0].members(), &[0, 2]);
/// assert_eq!(components[1].members(), &[1]);
/// ```
pub fn build_components(distances: &DistanceMatrix, threshold_km: f64) -> Vec<Component> {
    let n = distances.size();
    let mut uf = UnionFind::new(n);
    for i in 0..n {
        for j in (i + 1)..n {
            if distances.get(i, j) <= threshold_km {
                uf.union(i, j);
            }
        }
    }
    uf.groups().into_iter().map(Component::new).collect()
}

/// Fails if any component is larger than one group can hold.
pub fn check_feasible(components: &[Component], capacity: usize) -> Result<()> {
    match components.iter().enumerate().find(|(_, c)| c.len() > capacity) {
        Some((idx, c)) => Err(GroupingError::InfeasibleComponent {
            component: idx,
            size: c.len(),
            capacity,
            members: c.members.iter().copied().take(DIAGNOSTIC_MEMBERS).collect(),
        }),
        None => Ok(()),
    }
}

/// Places whole components into groups.
///
/// Components are handled largest first (ties keep their original order).
/// Each goes to the group whose centroid is closest to the component's
/// centroid among the groups with enough remaining capacity.
///
/// # Arguments
///
/// * `entities` — All entities
/// * `components` — Components covering every entity exactly once
/// * `centroids` — One reference centroid per group
/// * `capacity` — Members per group
///
/// # Errors
///
/// [`GroupingError::ComponentUnplaceable`] if no group has room for a
/// component; [`GroupingError::InvalidInput`] if the components do not
/// cover the entities or sizes are inconsistent.
pub fn assign_components(
    entities: &[Entity],
    components: &[Component],
    centroids: &[GeoPoint],
    capacity: usize,
) -> Result<Partition> {
    let n = entities.len();
    let k = centroids.len();
    if k * capacity != n {
        return Err(GroupingError::invalid_input(format!(
            "{k} groups of {capacity} cannot hold {n} entities"
        )));
    }
    check_feasible(components, capacity)?;

    let mut order: Vec<usize> = (0..components.len()).collect();
    order.sort_by_key(|&c| Reverse(components[c].len()));

    let mut labels = vec![usize::MAX; n];
    let mut remaining = vec![capacity; k];

    for comp_idx in order {
        let component = &components[comp_idx];
        let Some(center) = component.centroid(entities) else {
            continue;
        };

        let mut choices: Vec<(usize, f64)> = centroids
            .iter()
            .enumerate()
            .map(|(g, &c)| (g, haversine_km(center, c)))
            .collect();
        choices.sort_by(|a, b| a.1.total_cmp(&b.1));

        let picked = choices
            .into_iter()
            .map(|(g, _)| g)
            .find(|&g| remaining[g] >= component.len())
            .ok_or(GroupingError::ComponentUnplaceable {
                component: comp_idx,
                size: component.len(),
            })?;

        for &m in component.members() {
            if labels[m] != usize::MAX {
                return Err(GroupingError::invalid_input(format!(
                    "entity {m} appears in more than one component"
                )));
            }
            labels[m] = picked;
        }
        remaining[picked] -= component.len();
    }

    if let Some(missing) = labels.iter().position(|&l| l == usize::MAX) {
        return Err(GroupingError::invalid_input(format!(
            "entity {missing} is not covered by any component"
        )));
    }

    debug!(
        "placed {} components into {k} groups of {capacity}",
        components.len()
    );
    Partition::new(labels, k)
}

/// Checks that every component lies entirely inside one group.
pub fn check_components_intact(partition: &Partition, components: &[Component]) -> Result<()> {
    for (idx, component) in components.iter().enumerate() {
        let Some((&first, rest)) = component.members().split_first() else {
            continue;
        };
        let group = partition.label(first);
        if let Some(&split) = rest.iter().find(|&&m| partition.label(m) != group) {
            return Err(GroupingError::invariant(format!(
                "component {idx} is split: entity {first} in group {group}, entity {split} in group {}",
                partition.label(split)
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two tight pairs plus four isolated entities spread across Germany.
    fn sample() -> Vec<Entity> {
        vec![
            Entity::new("kiel", 54.32, 10.13),
            Entity::new("kiel-nord", 54.40, 10.15),
            Entity::new("munich", 48.14, 11.58),
            Entity::new("munich-ost", 48.13, 11.70),
            Entity::new("cologne", 50.94, 6.96),
            Entity::new("berlin", 52.52, 13.40),
            Entity::new("freiburg", 47.99, 7.85),
            Entity::new("dresden", 51.05, 13.74),
        ]
    }

    #[test]
    fn test_build_components() {
        let dm = DistanceMatrix::from_entities(&sample());
        let comps = build_components(&dm, 50.0);
        assert_eq!(comps.len(), 6);
        assert_eq!(comps[0].members(), &[0, 1]);
        assert_eq!(comps[1].members(), &[2, 3]);
        let total: usize = comps.iter().map(Component::len).sum();
        assert_eq!(total, 8);
    }

    #[test]
    fn test_transitive_chain() {
        // 0.3° of latitude ≈ 33 km between neighbours, 67 km end to end.
        let entities = vec![
            Entity::new("a", 50.0, 8.0),
            Entity::new("b", 50.3, 8.0),
            Entity::new("c", 50.6, 8.0),
        ];
        let dm = DistanceMatrix::from_entities(&entities);
        let comps = build_components(&dm, 40.0);
        assert_eq!(comps.len(), 1);
        assert_eq!(comps[0].len(), 3);
    }

    #[test]
    fn test_infeasible_component() {
        let dm = DistanceMatrix::from_entities(&sample());
        let comps = build_components(&dm, 50.0);
        let err = check_feasible(&comps, 1).unwrap_err();
        match err {
            GroupingError::InfeasibleComponent {
                component, size, ..
            } => {
                assert_eq!(component, 0);
                assert_eq!(size, 2);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_assign_keeps_components_together() {
        let entities = sample();
        let dm = DistanceMatrix::from_entities(&entities);
        let comps = build_components(&dm, 50.0);
        let centroids = vec![GeoPoint::new(53.0, 10.0), GeoPoint::new(49.0, 10.0)];
        let partition = assign_components(&entities, &comps, &centroids, 4).expect("feasible");
        assert!(partition.validate(8, 4).is_ok());
        assert!(check_components_intact(&partition, &comps).is_ok());
        assert_eq!(partition.label(0), 0);
        assert_eq!(partition.label(2), 1);
    }

    #[test]
    fn test_assign_unplaceable() {
        // Two components of three cannot share groups of four.
        let entities: Vec<Entity> = (0..8)
            .map(|i| {
                let lat = match i {
                    0..=2 => 50.0,
                    3..=5 => 53.0,
                    _ => 47.0 + i as f64,
                };
                Entity::new(format!("e{i}"), lat + (i % 3) as f64 * 0.01, 8.0)
            })
            .collect();
        let comps = vec![
            Component::new(vec![0, 1, 2]),
            Component::new(vec![3, 4, 5]),
            Component::new(vec![6]),
            Component::new(vec![7]),
        ];
        let centroids = vec![
            GeoPoint::new(50.0, 8.0),
            GeoPoint::new(53.0, 8.0),
            GeoPoint::new(55.0, 8.0),
            GeoPoint::new(45.0, 8.0),
        ];
        // 4 groups of 2: the three-member components do not fit at all.
        assert!(matches!(
            assign_components(&entities, &comps, &centroids, 2),
            Err(GroupingError::InfeasibleComponent { .. })
        ));

        let centroids = vec![GeoPoint::new(50.0, 8.0), GeoPoint::new(53.0, 8.0)];
        let comps = vec![
            Component::new(vec![0, 1, 2]),
            Component::new(vec![3, 4, 5]),
            Component::new(vec![6, 7]),
        ];
        assert!(matches!(
            assign_components(&entities, &comps, &centroids, 4),
            Err(GroupingError::ComponentUnplaceable { component: 2, size: 2 })
        ));
    }

    #[test]
    fn test_split_component_detected() {
        let partition = Partition::new(vec![0, 1, 0, 1], 2).expect("valid");
        let comps = vec![Component::new(vec![0, 1]), Component::new(vec![2, 3])];
        assert!(matches!(
            check_components_intact(&partition, &comps),
            Err(GroupingError::InvariantViolation(_))
        ));
        let ok = vec![Component::new(vec![0, 2]), Component::new(vec![1, 3])];
        assert!(check_components_intact(&partition, &ok).is_ok());
    }
}
