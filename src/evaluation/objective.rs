//! Objective functions over a partition.

use crate::distance::{haversine_km, DistanceMatrix};
use crate::models::{Entity, Partition};

/// Sum over all entities of the distance to their own group's centroid.
///
/// This is the proxy objective of the centroid local search.
pub fn centroid_cost(entities: &[Entity], partition: &Partition) -> f64 {
    let centroids = partition.centroids(entities);
    partition
        .labels()
        .iter()
        .enumerate()
        .filter_map(|(i, &g)| centroids[g].map(|c| haversine_km(entities[i].point(), c)))
        .sum()
}

/// Sum over all unordered same-group pairs of their distance.
///
/// This is the exact objective of the full-distance local search.
///
/// # Examples
///
/// ```
/// use u_grouping::distance::DistanceMatrix;
/// use u_grouping::evaluation::intra_group_distance_sum;
/// use u_grouping::models::Partition;
///
/// let dm = DistanceMatrix::from_data(
///     3,
///     vec![0.0, 1.0, 5.0, 1.0, 0.0, 7.0, 5.0, 7.0, 0.0],
/// ).unwrap();
/// let p = Partition::new(vec![0, 0, 1], 2).unwrap();
/// assert_eq!(intra_group_distance_sum(&dm, &p), 1.0);
/// ```
pub fn intra_group_distance_sum(distances: &DistanceMatrix, partition: &Partition) -> f64 {
    partition
        .groups()
        .iter()
        .map(|members| {
            let mut sum = 0.0;
            for (x, &i) in members.iter().enumerate() {
                for &j in &members[x + 1..] {
                    sum += distances.get(i, j);
                }
            }
            sum
        })
        .sum()
}

/// Mean over entities of their average away-distance: total distance to
/// the other members of their group divided by `capacity - 1`.
pub fn average_away_distance(
    distances: &DistanceMatrix,
    partition: &Partition,
    capacity: usize,
) -> f64 {
    let n = partition.len();
    if n == 0 {
        return 0.0;
    }
    let trips = capacity.saturating_sub(1).max(1) as f64;
    let groups = partition.groups();
    let total: f64 = (0..n)
        .map(|i| distances.sum_to(i, &groups[partition.label(i)], Some(i)) / trips)
        .sum();
    total / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> (Vec<Entity>, DistanceMatrix) {
        let entities = vec![
            Entity::new("nw", 53.0, 8.0),
            Entity::new("ne", 53.0, 9.0),
            Entity::new("sw", 52.0, 8.0),
            Entity::new("se", 52.0, 9.0),
        ];
        let dm = DistanceMatrix::from_entities(&entities);
        (entities, dm)
    }

    #[test]
    fn test_pair_sum_counts_each_pair_once() {
        let (_, dm) = square();
        let p = Partition::new(vec![0, 0, 1, 1], 2).expect("valid");
        let expected = dm.get(0, 1) + dm.get(2, 3);
        assert!((intra_group_distance_sum(&dm, &p) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_average_away_distance() {
        let (_, dm) = square();
        let p = Partition::new(vec![0, 0, 1, 1], 2).expect("valid");
        // Each entity has exactly one away trip.
        let expected = (2.0 * dm.get(0, 1) + 2.0 * dm.get(2, 3)) / 4.0;
        assert!((average_away_distance(&dm, &p, 2) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_centroid_cost_prefers_compact_groups() {
        let (entities, _) = square();
        let rows = Partition::new(vec![0, 0, 1, 1], 2).expect("valid");
        let diagonal = Partition::new(vec![0, 1, 1, 0], 2).expect("valid");
        assert!(centroid_cost(&entities, &rows) < centroid_cost(&entities, &diagonal));
    }

    #[test]
    fn test_same_group_swap_is_noop() {
        let (entities, dm) = square();
        let mut p = Partition::new(vec![0, 0, 1, 1], 2).expect("valid");
        let before = (intra_group_distance_sum(&dm, &p), centroid_cost(&entities, &p));
        let labels = p.labels().to_vec();
        p.swap(0, 1);
        assert_eq!(p.labels(), labels.as_slice());
        assert_eq!(before.0, intra_group_distance_sum(&dm, &p));
        assert_eq!(before.1, centroid_cost(&entities, &p));
    }
}
