//! Travel metrics for a finished partition.
//!
//! Every entity travels once to each other member of its group, so an
//! entity in a group of M has M − 1 away trips.

use serde::Serialize;

use super::average_away_distance;
use crate::distance::DistanceMatrix;
use crate::models::{Entity, Partition};

/// A single journey between two entities of the same group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trip {
    /// Id of the travelling entity.
    pub from: String,
    /// Id of the host entity.
    pub to: String,
    /// Name of the group both belong to.
    pub group: String,
    /// Great-circle distance in km.
    pub km: f64,
}

/// Distance figures for one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMetrics {
    /// Compass name of the group.
    pub name: String,
    /// Number of members.
    pub size: usize,
    /// Mean distance over all member pairs.
    pub avg_pair_km: f64,
    /// Largest distance between two members.
    pub max_pair_km: f64,
    /// The member pair at `max_pair_km`, if the group has two members.
    pub longest_trip: Option<Trip>,
    /// Member ids, sorted case-insensitively.
    pub members: Vec<String>,
}

/// Away-travel figures for one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityMetrics {
    /// Entity id.
    pub id: String,
    /// Name of the entity's group.
    pub group: String,
    /// Trips to the other members of the group (M − 1).
    pub away_trips: usize,
    /// Mean length of those trips in km.
    pub avg_away_km: f64,
    /// Sum of all away trips.
    pub season_km: f64,
    /// Longest single away trip in km.
    pub longest_away_km: f64,
}

/// Metrics for every group and entity of a partition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartitionReport {
    /// One entry per group, in group order.
    pub groups: Vec<GroupMetrics>,
    /// Ordered by group, then id.
    pub entities: Vec<EntityMetrics>,
    /// Mean over entities of their average away distance.
    pub avg_away_km: f64,
    /// Entity with the largest season total.
    pub max_season: Option<EntityMetrics>,
    /// Longest trip in any group.
    pub longest_trip: Option<Trip>,
}

impl PartitionReport {
    /// Computes the report.
    ///
    /// # Arguments
    ///
    /// * `entities` — All entities, indexed like the partition
    /// * `distances` — Pairwise distance matrix over `entities`
    /// * `partition` — A capacity-valid partition
    /// * `names` — One display name per group
    ///
    /// # Examples
    ///
    /// ```
    /// use u_grouping::distance::DistanceMatrix;
    /// use u_grouping::evaluation::PartitionReport;
    /// use u_grouping::models::{Entity, Partition};
    ///
    /// let entities = vec![
    ///     Entity::new("a", 50.0, 8.0),
    ///     Entity::new("b", 50.0, 9.0),
    ///     Entity::new("c", 48.0, 11.0),
    ///     Entity::new("d", 48.0, 11.5),
    /// ];
    /// let dm = DistanceMatrix::from_entities(&entities);
    /// let p = Partition::new(vec![0, 0, 1, 1], 2).unwrap();
    /// let names = vec!["North".to_string(), "South".to_string()];
    /// let report = PartitionReport::new(&entities, &dm, &p, &names);
    ///
    /// assert_eq!(report.groups[0].size, 2);
    /// assert_eq!(report.entities[0].away_trips, 1);
    /// let longest = report.longest_trip.unwrap();
    /// assert_eq!((longest.from.as_str(), longest.to.as_str()), ("a", "b"));
    /// ```
    pub fn new(
        entities: &[Entity],
        distances: &DistanceMatrix,
        partition: &Partition,
        names: &[String],
    ) -> Self {
        let name_of = |g: usize| names.get(g).cloned().unwrap_or_else(|| format!("Group {g}"));

        let mut groups = Vec::with_capacity(partition.num_groups());
        let mut entity_rows = Vec::with_capacity(partition.len());

        for (g, members) in partition.groups().into_iter().enumerate() {
            let name = name_of(g);
            groups.push(group_metrics(entities, distances, &members, &name));

            let mut rows: Vec<EntityMetrics> = members
                .iter()
                .map(|&i| entity_metrics(entities, distances, &members, i, &name))
                .collect();
            rows.sort_by(|a, b| a.id.cmp(&b.id));
            entity_rows.extend(rows);
        }

        let max_season = entity_rows
            .iter()
            .max_by(|a, b| a.season_km.total_cmp(&b.season_km))
            .cloned();
        let longest_trip = groups
            .iter()
            .filter_map(|g| g.longest_trip.as_ref())
            .max_by(|a, b| a.km.total_cmp(&b.km))
            .cloned();
        let capacity = partition.group_sizes().into_iter().max().unwrap_or(0);

        Self {
            groups,
            entities: entity_rows,
            avg_away_km: average_away_distance(distances, partition, capacity),
            max_season,
            longest_trip,
        }
    }

    /// Metrics of the group called `name`.
    pub fn group(&self, name: &str) -> Option<&GroupMetrics> {
        self.groups.iter().find(|g| g.name == name)
    }
}

fn group_metrics(
    entities: &[Entity],
    distances: &DistanceMatrix,
    members: &[usize],
    name: &str,
) -> GroupMetrics {
    let mut total = 0.0;
    let mut pairs = 0usize;
    let mut longest: Option<(usize, usize, f64)> = None;
    for (x, &i) in members.iter().enumerate() {
        for &j in &members[x + 1..] {
            let d = distances.get(i, j);
            total += d;
            pairs += 1;
            if longest.is_none_or(|(_, _, best)| d > best) {
                longest = Some((i, j, d));
            }
        }
    }

    let mut ids: Vec<String> = members.iter().map(|&i| entities[i].id().to_string()).collect();
    ids.sort_by_key(|id| id.to_lowercase());

    GroupMetrics {
        name: name.to_string(),
        size: members.len(),
        avg_pair_km: if pairs > 0 { total / pairs as f64 } else { 0.0 },
        max_pair_km: longest.map_or(0.0, |(_, _, d)| d),
        longest_trip: longest.map(|(i, j, km)| Trip {
            from: entities[i].id().to_string(),
            to: entities[j].id().to_string(),
            group: name.to_string(),
            km,
        }),
        members: ids,
    }
}

fn entity_metrics(
    entities: &[Entity],
    distances: &DistanceMatrix,
    members: &[usize],
    i: usize,
    group: &str,
) -> EntityMetrics {
    let away: Vec<f64> = members
        .iter()
        .filter(|&&m| m != i)
        .map(|&m| distances.get(i, m))
        .collect();
    let season_km: f64 = away.iter().sum();

    EntityMetrics {
        id: entities[i].id().to_string(),
        group: group.to_string(),
        away_trips: away.len(),
        avg_away_km: if away.is_empty() { 0.0 } else { season_km / away.len() as f64 },
        season_km,
        longest_away_km: away.iter().copied().fold(0.0, f64::max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Vec<Entity>, DistanceMatrix, Partition, Vec<String>) {
        let entities = vec![
            Entity::new("Kiel", 54.32, 10.13),
            Entity::new("bremen", 53.08, 8.80),
            Entity::new("Hamburg", 53.55, 10.00),
            Entity::new("munich", 48.14, 11.58),
            Entity::new("Augsburg", 48.37, 10.90),
            Entity::new("ulm", 48.40, 9.99),
        ];
        let dm = DistanceMatrix::from_entities(&entities);
        let p = Partition::new(vec![0, 0, 0, 1, 1, 1], 2).expect("valid");
        let names = vec!["North".to_string(), "South".to_string()];
        (entities, dm, p, names)
    }

    #[test]
    fn test_group_metrics() {
        let (entities, dm, p, names) = sample();
        let report = PartitionReport::new(&entities, &dm, &p, &names);
        let north = report.group("North").expect("named group");
        assert_eq!(north.size, 3);
        assert_eq!(north.members, vec!["bremen", "Hamburg", "Kiel"]);

        let expected_avg = (dm.get(0, 1) + dm.get(0, 2) + dm.get(1, 2)) / 3.0;
        assert!((north.avg_pair_km - expected_avg).abs() < 1e-9);
        let expected_max = dm.get(0, 1).max(dm.get(0, 2)).max(dm.get(1, 2));
        assert!((north.max_pair_km - expected_max).abs() < 1e-9);
        let trip = north.longest_trip.as_ref().expect("three members");
        assert!((trip.km - expected_max).abs() < 1e-9);
    }

    #[test]
    fn test_entity_metrics() {
        let (entities, dm, p, names) = sample();
        let report = PartitionReport::new(&entities, &dm, &p, &names);
        assert_eq!(report.entities.len(), 6);
        let kiel = report.entities.iter().find(|e| e.id == "Kiel").expect("present");
        assert_eq!(kiel.away_trips, 2);
        assert_eq!(kiel.group, "North");
        let season = dm.get(0, 1) + dm.get(0, 2);
        assert!((kiel.season_km - season).abs() < 1e-9);
        assert!((kiel.avg_away_km - season / 2.0).abs() < 1e-9);
        assert!((kiel.longest_away_km - dm.get(0, 1).max(dm.get(0, 2))).abs() < 1e-9);
    }

    #[test]
    fn test_summary_figures() {
        let (entities, dm, p, names) = sample();
        let report = PartitionReport::new(&entities, &dm, &p, &names);

        let best = report.max_season.as_ref().expect("non-empty");
        assert!(report.entities.iter().all(|e| e.season_km <= best.season_km));

        let longest = report.longest_trip.as_ref().expect("non-empty");
        assert!(report.groups.iter().all(|g| g.max_pair_km <= longest.km));

        let mean: f64 =
            report.entities.iter().map(|e| e.avg_away_km).sum::<f64>() / report.entities.len() as f64;
        assert!((report.avg_away_km - mean).abs() < 1e-9);
    }

    #[test]
    fn test_singleton_groups() {
        let entities = vec![Entity::new("a", 50.0, 8.0), Entity::new("b", 51.0, 9.0)];
        let dm = DistanceMatrix::from_entities(&entities);
        let p = Partition::new(vec![0, 1], 2).expect("valid");
        let report = PartitionReport::new(&entities, &dm, &p, &[]);
        assert_eq!(report.groups[0].name, "Group 0");
        assert!(report.groups[0].longest_trip.is_none());
        assert_eq!(report.entities[0].away_trips, 0);
        assert_eq!(report.avg_away_km, 0.0);
        assert!(report.longest_trip.is_none());
    }
}
