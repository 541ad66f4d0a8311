//! End-to-end grouping pipeline.
//!
//! # Stages
//!
//! 1. Unconstrained clustering ([`Partitioner`], k-means by default)
//! 2. Capacity balancing to exactly M members per group
//! 3. Centroid swap search
//! 4. Either whole-component placement and swaps (hard grouping) or the
//!    pairwise-distance swap search
//! 5. Compass names and the travel report
//!
//! The partition is checked after every stage. Any failed check aborts the
//! run with [`GroupingError::InvariantViolation`].

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::config::GroupingConfig;
use crate::constraints::{
    assign_components, build_components, check_components_intact, check_feasible, Component,
};
use crate::constructive::{balance_capacity, KMeans, Partitioner};
use crate::distance::DistanceMatrix;
use crate::error::{GroupingError, Result};
use crate::evaluation::{average_away_distance, compass_names, PartitionReport};
use crate::local_search::{
    centroid_swap_improve, component_swap_improve, pairwise_swap_improve, SwapStats,
};
use crate::models::{Entity, GeoPoint, Partition};

/// Shape of the proximity components found under hard grouping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentSummary {
    /// Linking distance in km.
    pub threshold_km: f64,
    /// Number of components, singletons included.
    pub count: usize,
    /// Size of the largest component.
    pub largest: usize,
    /// Entity pairs forced into the same group.
    pub linked_pairs: usize,
}

impl ComponentSummary {
    fn new(components: &[Component], threshold_km: f64) -> Self {
        Self {
            threshold_km,
            count: components.len(),
            largest: components.iter().map(Component::len).max().unwrap_or(0),
            linked_pairs: components.iter().map(|c| c.len() * (c.len() - 1) / 2).sum(),
        }
    }
}

/// Per-stage statistics of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageStats {
    /// Inertia of the initial clustering.
    pub kmeans_inertia: f64,
    /// Moves made by the capacity balancer.
    pub balance_moves: usize,
    /// Centroid swap search.
    pub centroid_search: SwapStats,
    /// Pairwise or component search, whichever ran.
    pub refinement: Option<SwapStats>,
    /// Present only under hard grouping.
    pub components: Option<ComponentSummary>,
}

/// Everything produced by [`GroupingSolver::solve`].
#[derive(Debug, Clone, Serialize)]
pub struct GroupingOutcome {
    /// Partition after the centroid search, kept for comparison.
    pub centroid_partition: Partition,
    /// Final partition.
    pub partition: Partition,
    /// Compass name per group of the final partition.
    pub names: Vec<String>,
    /// Travel metrics of the final partition.
    pub report: PartitionReport,
    /// Mean away distance after the centroid search.
    pub away_km_before: f64,
    /// Mean away distance of the final partition.
    pub away_km_after: f64,
    pub stats: StageStats,
}

impl GroupingOutcome {
    /// Group name of entity `entity`.
    pub fn group_name(&self, entity: usize) -> &str {
        &self.names[self.partition.label(entity)]
    }
}

/// Runs the full pipeline for one configuration.
///
/// # Examples
///
/// ```
/// use u_grouping::{GroupingConfig, GroupingSolver};
/// use u_grouping::models::Entity;
///
/// let entities = vec![
///     Entity::new("hamburg", 53.55, 10.00),
///     Entity::new("kiel", 54.32, 10.13),
///     Entity::new("bremen", 53.08, 8.80),
///     Entity::new("munich", 48.14, 11.58),
///     Entity::new("augsburg", 48.37, 10.90),
///     Entity::new("ulm", 48.40, 9.99),
/// ];
/// let config = GroupingConfig::new(2, 3).with_search_iterations(2000, 2000, 2000);
/// let outcome = GroupingSolver::new(config).solve(&entities).unwrap();
///
/// assert_eq!(outcome.partition.group_sizes(), vec![3, 3]);
/// assert_eq!(outcome.group_name(0), "North");
/// assert_eq!(outcome.group_name(3), "South");
/// ```
#[derive(Debug, Clone)]
pub struct GroupingSolver<P = KMeans> {
    config: GroupingConfig,
    partitioner: P,
}

impl GroupingSolver<KMeans> {
    /// Creates a solver that seeds with k-means as configured.
    pub fn new(config: GroupingConfig) -> Self {
        let partitioner = KMeans::new()
            .with_restarts(config.kmeans_restarts)
            .with_max_iterations(config.kmeans_max_iterations);
        Self {
            config,
            partitioner,
        }
    }
}

impl<P: Partitioner> GroupingSolver<P> {
    /// Replaces the initial clustering method.
    pub fn with_partitioner<Q: Partitioner>(self, partitioner: Q) -> GroupingSolver<Q> {
        GroupingSolver {
            config: self.config,
            partitioner,
        }
    }

    /// Returns the configuration this solver runs with.
    pub fn config(&self) -> &GroupingConfig {
        &self.config
    }

    /// Groups `entities` into `num_groups` groups of exactly `group_size`.
    ///
    /// # Errors
    ///
    /// [`GroupingError::InvalidInput`] for a bad configuration, an entity
    /// count other than K × M, or invalid coordinates. Stage failures
    /// (balancing, infeasible hard grouping, invariant checks) are passed
    /// through unchanged.
    pub fn solve(&self, entities: &[Entity]) -> Result<GroupingOutcome> {
        let cfg = &self.config;
        cfg.validate()?;
        validate_entities(entities, cfg)?;

        let (k, m, n) = (cfg.num_groups, cfg.group_size, entities.len());
        info!("grouping {n} entities into {k} groups of {m}");

        let distances = DistanceMatrix::from_entities(entities);

        let points: Vec<GeoPoint> = entities.iter().map(Entity::point).collect();
        let clustering = self.partitioner.cluster(&points, k, cfg.kmeans_seed)?;
        if clustering.labels.len() != n {
            return Err(GroupingError::invariant(format!(
                "partitioner returned {} labels for {n} entities",
                clustering.labels.len()
            )));
        }
        if clustering.centroids.len() != k {
            return Err(GroupingError::invariant(format!(
                "partitioner returned {} centroids for {k} groups",
                clustering.centroids.len()
            )));
        }
        debug!("initial clustering inertia {:.6}", clustering.inertia);

        let balanced = balance_capacity(
            entities,
            &clustering.labels,
            k,
            m,
            cfg.balance_max_iterations,
        )?;
        balanced.partition.validate(n, m)?;
        info!("capacity balancing: {} moves", balanced.moves);

        let mut partition = balanced.partition;
        let mut rng = StdRng::seed_from_u64(cfg.centroid_seed);
        let centroid_search =
            centroid_swap_improve(entities, &mut partition, cfg.centroid_iterations, &mut rng);
        partition.validate(n, m)?;
        info!(
            "centroid search: {} swaps, cost {:.2} -> {:.2} km",
            centroid_search.accepted, centroid_search.initial_cost, centroid_search.final_cost
        );
        let centroid_partition = partition.clone();

        let (refinement, components) = match cfg.hard_grouping_threshold_km {
            Some(threshold_km) => {
                let (stats, summary) = self.refine_hard(
                    entities,
                    &distances,
                    &clustering.centroids,
                    &mut partition,
                    threshold_km,
                )?;
                (Some(stats), Some(summary))
            }
            None if cfg.refine_full_distance => {
                let mut rng = StdRng::seed_from_u64(cfg.pairwise_seed);
                let stats = pairwise_swap_improve(
                    &distances,
                    &mut partition,
                    cfg.pairwise_iterations,
                    &mut rng,
                );
                partition.validate(n, m)?;
                info!(
                    "pairwise search: {} swaps, pair sum {:.2} -> {:.2} km",
                    stats.accepted, stats.initial_cost, stats.final_cost
                );
                (Some(stats), None)
            }
            None => (None, None),
        };

        let names = compass_names(entities, &partition);
        let report = PartitionReport::new(entities, &distances, &partition, &names);
        let away_km_before = average_away_distance(&distances, &centroid_partition, m);
        let away_km_after = average_away_distance(&distances, &partition, m);
        info!("mean away distance per entity: {away_km_before:.2} -> {away_km_after:.2} km");

        Ok(GroupingOutcome {
            centroid_partition,
            partition,
            names,
            report,
            away_km_before,
            away_km_after,
            stats: StageStats {
                kmeans_inertia: clustering.inertia,
                balance_moves: balanced.moves,
                centroid_search,
                refinement,
                components,
            },
        })
    }

    /// Rebuilds the partition from proximity components and improves it by
    /// component swaps.
    ///
    /// Components are placed against the centres of the initial clustering,
    /// so group `g` of the result is the group seeded by centroid `g`.
    fn refine_hard(
        &self,
        entities: &[Entity],
        distances: &DistanceMatrix,
        centroids: &[GeoPoint],
        partition: &mut Partition,
        threshold_km: f64,
    ) -> Result<(SwapStats, ComponentSummary)> {
        let cfg = &self.config;
        let (n, m) = (entities.len(), cfg.group_size);

        let components = build_components(distances, threshold_km);
        let summary = ComponentSummary::new(&components, threshold_km);
        info!(
            "hard grouping at {threshold_km} km: {} components, largest {}, {} linked pairs",
            summary.count, summary.largest, summary.linked_pairs
        );
        check_feasible(&components, m)?;

        let mut placed = assign_components(entities, &components, centroids, m)?;
        placed.validate(n, m)?;
        check_components_intact(&placed, &components)?;

        let mut rng = StdRng::seed_from_u64(cfg.component_seed);
        let stats = component_swap_improve(
            distances,
            &mut placed,
            &components,
            cfg.component_iterations,
            &mut rng,
        );
        placed.validate(n, m)?;
        check_components_intact(&placed, &components)?;
        info!(
            "component search: {} swaps, pair sum {:.2} -> {:.2} km",
            stats.accepted, stats.initial_cost, stats.final_cost
        );

        *partition = placed;
        Ok((stats, summary))
    }
}

fn validate_entities(entities: &[Entity], cfg: &GroupingConfig) -> Result<()> {
    if entities.len() != cfg.num_entities() {
        return Err(GroupingError::invalid_input(format!(
            "expected {} entities ({} groups of {}), got {}",
            cfg.num_entities(),
            cfg.num_groups,
            cfg.group_size,
            entities.len()
        )));
    }
    if let Some(bad) = entities.iter().find(|e| !e.is_valid()) {
        return Err(GroupingError::invalid_input(format!(
            "entity '{}' has invalid coordinates ({}, {})",
            bad.id(),
            bad.latitude(),
            bad.longitude()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constructive::Clustering;

    /// Four entities around (53, 9) followed by four around (48, 11).
    fn scenario_a() -> Vec<Entity> {
        vec![
            Entity::new("n0", 53.00, 9.00),
            Entity::new("n1", 53.15, 9.10),
            Entity::new("n2", 52.90, 8.85),
            Entity::new("n3", 53.05, 9.25),
            Entity::new("s0", 48.00, 11.00),
            Entity::new("s1", 48.10, 11.20),
            Entity::new("s2", 47.90, 10.90),
            Entity::new("s3", 48.05, 11.30),
        ]
    }

    fn fast(config: GroupingConfig) -> GroupingConfig {
        config.with_kmeans_restarts(10).with_search_iterations(3000, 3000, 3000)
    }

    #[test]
    fn test_two_clusters_split_exactly() {
        let entities = scenario_a();
        let outcome = GroupingSolver::new(fast(GroupingConfig::new(2, 4)))
            .solve(&entities)
            .expect("solvable");

        let p = &outcome.partition;
        assert!(p.validate(8, 4).is_ok());
        assert!((0..4).all(|i| p.label(i) == p.label(0)));
        assert!((4..8).all(|i| p.label(i) == p.label(4)));
        assert_ne!(p.label(0), p.label(4));
        assert_eq!(outcome.group_name(0), "North");
        assert_eq!(outcome.group_name(4), "South");
        assert!(outcome.away_km_after <= outcome.away_km_before + 1e-9);
    }

    #[test]
    fn test_close_pair_shares_group_for_every_seed() {
        // "pair-b" sits about 10 km from "pair-a"; every other entity is far
        // from all others.
        let entities = vec![
            Entity::new("pair-a", 51.00, 10.00),
            Entity::new("pair-b", 51.09, 10.00),
            Entity::new("north-0", 54.00, 9.00),
            Entity::new("north-1", 53.50, 11.00),
            Entity::new("north-2", 53.00, 8.00),
            Entity::new("south-0", 48.00, 11.00),
            Entity::new("south-1", 48.50, 9.00),
            Entity::new("south-2", 49.50, 12.50),
        ];
        for seed in [1, 7, 42, 99, 2024] {
            let config = fast(GroupingConfig::new(2, 4))
                .with_hard_grouping(50.0)
                .with_seed(seed);
            let outcome = GroupingSolver::new(config).solve(&entities).expect("feasible");
            assert_eq!(outcome.partition.label(0), outcome.partition.label(1), "seed {seed}");
            assert!(outcome.partition.validate(8, 4).is_ok());

            let summary = outcome.stats.components.as_ref().expect("hard mode");
            assert_eq!(summary.count, 7);
            assert_eq!(summary.linked_pairs, 1);
        }
    }

    #[test]
    fn test_infeasible_component() {
        // Three entities within a few km cannot fit a group of two.
        let entities = vec![
            Entity::new("a", 50.00, 8.00),
            Entity::new("b", 50.02, 8.00),
            Entity::new("c", 50.04, 8.00),
            Entity::new("d", 53.00, 12.00),
        ];
        let config = fast(GroupingConfig::new(2, 2)).with_hard_grouping(10.0);
        let err = GroupingSolver::new(config).solve(&entities).unwrap_err();
        assert!(matches!(
            err,
            GroupingError::InfeasibleComponent { size: 3, capacity: 2, .. }
        ));
    }

    #[test]
    fn test_deterministic() {
        let entities = scenario_a();
        let solver = GroupingSolver::new(fast(GroupingConfig::new(4, 2)));
        let a = solver.solve(&entities).expect("solvable");
        let b = solver.solve(&entities).expect("solvable");
        assert_eq!(a.partition, b.partition);
        assert_eq!(a.centroid_partition, b.centroid_partition);
        assert_eq!(a.names, b.names);
        assert_eq!(a.report, b.report);
        assert_eq!(a.away_km_before, b.away_km_before);
        assert_eq!(a.away_km_after, b.away_km_after);
        assert_eq!(a.stats, b.stats);
    }

    #[test]
    fn test_centroid_only_mode() {
        let entities = scenario_a();
        let config = fast(GroupingConfig::new(2, 4)).with_full_distance(false);
        let outcome = GroupingSolver::new(config).solve(&entities).expect("solvable");
        assert_eq!(outcome.partition, outcome.centroid_partition);
        assert!(outcome.stats.refinement.is_none());
        assert_eq!(outcome.away_km_before, outcome.away_km_after);
    }

    #[test]
    fn test_rejects_bad_input() {
        let entities = scenario_a();
        let solver = GroupingSolver::new(fast(GroupingConfig::new(3, 3)));
        assert!(matches!(solver.solve(&entities), Err(GroupingError::InvalidInput(_))));

        let mut broken = scenario_a();
        broken[5] = Entity::new("nowhere", 123.0, 11.0);
        let solver = GroupingSolver::new(fast(GroupingConfig::new(2, 4)));
        let err = solver.solve(&broken).unwrap_err();
        assert!(err.to_string().contains("nowhere"));
    }

    struct Striped;

    impl Partitioner for Striped {
        fn cluster(&self, points: &[GeoPoint], k: usize, _seed: u64) -> Result<Clustering> {
            Ok(Clustering {
                labels: (0..points.len()).map(|i| i % k).collect(),
                centroids: points[..k].to_vec(),
                inertia: 0.0,
            })
        }
    }

    /// Striped labels with caller-chosen centres.
    struct Seeded(Vec<GeoPoint>);

    impl Partitioner for Seeded {
        fn cluster(&self, points: &[GeoPoint], k: usize, _seed: u64) -> Result<Clustering> {
            Ok(Clustering {
                labels: (0..points.len()).map(|i| i % k).collect(),
                centroids: self.0.clone(),
                inertia: 0.0,
            })
        }
    }

    #[test]
    fn test_components_follow_clustering_centroids() {
        let entities = scenario_a();
        let north = GeoPoint::new(54.0, 9.0);
        let south = GeoPoint::new(48.0, 11.0);
        let config = fast(GroupingConfig::new(2, 4)).with_hard_grouping(50.0);

        let solve_with = |centroids: Vec<GeoPoint>| {
            GroupingSolver::new(config.clone())
                .with_partitioner(Seeded(centroids))
                .solve(&entities)
                .expect("feasible")
        };
        let a = solve_with(vec![north, south]);
        let b = solve_with(vec![south, north]);

        assert_eq!(a.stats.components.as_ref().map(|c| c.count), Some(2));
        assert!((0..4).all(|i| a.partition.label(i) == 0));
        assert!((4..8).all(|i| a.partition.label(i) == 1));
        assert!((0..4).all(|i| b.partition.label(i) == 1));
        assert!((4..8).all(|i| b.partition.label(i) == 0));
        assert_eq!(a.group_name(0), "North");
        assert_eq!(b.group_name(0), "North");
    }

    #[test]
    fn test_rejects_wrong_centroid_count() {
        let entities = scenario_a();
        let solver = GroupingSolver::new(fast(GroupingConfig::new(2, 4)))
            .with_partitioner(Seeded(vec![GeoPoint::new(50.0, 10.0)]));
        assert!(matches!(
            solver.solve(&entities),
            Err(GroupingError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_custom_partitioner() {
        let entities = scenario_a();
        let solver = GroupingSolver::new(fast(GroupingConfig::new(2, 4))).with_partitioner(Striped);
        let outcome = solver.solve(&entities).expect("solvable");
        assert_eq!(outcome.stats.balance_moves, 0);
        // Local search still pulls the two regions apart.
        let p = &outcome.partition;
        assert!((0..4).all(|i| p.label(i) == p.label(0)));
        assert!((4..8).all(|i| p.label(i) == p.label(4)));
    }
}
