//! Pipeline configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constructive::DEFAULT_BALANCE_ITERATIONS;
use crate::error::{GroupingError, Result};
use crate::local_search::{
    DEFAULT_CENTROID_ITERATIONS, DEFAULT_COMPONENT_ITERATIONS, DEFAULT_PAIRWISE_ITERATIONS,
};

/// Group counts, budgets, and seeds for every stage of the grouping
/// pipeline.
///
/// Missing fields in a JSON file take their default values.
///
/// # Examples
///
/// ```
/// use u_grouping::GroupingConfig;
///
/// let config = GroupingConfig::new(2, 3).with_hard_grouping(25.0).with_seed(9);
/// assert_eq!(config.num_entities(), 6);
/// assert!(config.validate().is_ok());
///
/// let parsed: GroupingConfig = serde_json::from_str(r#"{"num_groups": 3}"#).unwrap();
/// assert_eq!(parsed.num_groups, 3);
/// assert_eq!(parsed.group_size, 20);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    /// Number of groups (K).
    pub num_groups: usize,
    /// Members per group (M).
    pub group_size: usize,

    /// Random restarts of the initial k-means.
    pub kmeans_restarts: usize,
    /// Lloyd iteration cap per restart.
    pub kmeans_max_iterations: usize,
    /// Seed of the initial k-means.
    pub kmeans_seed: u64,

    /// Move budget of the capacity balancer.
    pub balance_max_iterations: usize,

    /// Trial budget and seed of the centroid swap search.
    pub centroid_iterations: usize,
    pub centroid_seed: u64,

    /// Run the pairwise-distance refinement after the centroid stage.
    /// Ignored when hard grouping is enabled.
    pub refine_full_distance: bool,
    /// Trial budget and seed of the pairwise swap search.
    pub pairwise_iterations: usize,
    pub pairwise_seed: u64,

    /// Entities at most this far apart (km) always share a group.
    pub hard_grouping_threshold_km: Option<f64>,
    /// Trial budget and seed of the component swap search.
    pub component_iterations: usize,
    pub component_seed: u64,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            num_groups: 4,
            group_size: 20,
            kmeans_restarts: 50,
            kmeans_max_iterations: 300,
            kmeans_seed: 42,
            balance_max_iterations: DEFAULT_BALANCE_ITERATIONS,
            centroid_iterations: DEFAULT_CENTROID_ITERATIONS,
            centroid_seed: 7,
            refine_full_distance: true,
            pairwise_iterations: DEFAULT_PAIRWISE_ITERATIONS,
            pairwise_seed: 11,
            hard_grouping_threshold_km: None,
            component_iterations: DEFAULT_COMPONENT_ITERATIONS,
            component_seed: 11,
        }
    }
}

impl GroupingConfig {
    /// Creates a configuration for `num_groups` groups of `group_size`
    /// entities with default budgets and seeds.
    pub fn new(num_groups: usize, group_size: usize) -> Self {
        Self {
            num_groups,
            group_size,
            ..Self::default()
        }
    }

    /// Loads a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Total number of entities the configuration expects (K × M).
    pub fn num_entities(&self) -> usize {
        self.num_groups * self.group_size
    }

    /// Sets the number of k-means restarts.
    pub fn with_kmeans_restarts(mut self, restarts: usize) -> Self {
        self.kmeans_restarts = restarts;
        self
    }

    /// Enables hard grouping at `threshold_km`.
    pub fn with_hard_grouping(mut self, threshold_km: f64) -> Self {
        self.hard_grouping_threshold_km = Some(threshold_km);
        self
    }

    /// Enables or disables the pairwise-distance refinement.
    pub fn with_full_distance(mut self, enabled: bool) -> Self {
        self.refine_full_distance = enabled;
        self
    }

    /// Sets the trial budgets of the three local searches.
    pub fn with_search_iterations(
        mut self,
        centroid: usize,
        pairwise: usize,
        component: usize,
    ) -> Self {
        self.centroid_iterations = centroid;
        self.pairwise_iterations = pairwise;
        self.component_iterations = component;
        self
    }

    /// Derives every stage seed from one base seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.kmeans_seed = seed;
        self.centroid_seed = seed.wrapping_add(1);
        self.pairwise_seed = seed.wrapping_add(2);
        self.component_seed = seed.wrapping_add(3);
        self
    }

    /// Rejects configurations no run could satisfy.
    pub fn validate(&self) -> Result<()> {
        if self.num_groups == 0 {
            return Err(GroupingError::invalid_input("num_groups must be at least 1"));
        }
        if self.group_size == 0 {
            return Err(GroupingError::invalid_input("group_size must be at least 1"));
        }
        if self.kmeans_restarts == 0 || self.kmeans_max_iterations == 0 {
            return Err(GroupingError::invalid_input(
                "k-means needs at least one restart and one iteration",
            ));
        }
        if let Some(t) = self.hard_grouping_threshold_km {
            if !t.is_finite() || t < 0.0 {
                return Err(GroupingError::invalid_input(format!(
                    "hard grouping threshold must be a non-negative distance, got {t}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GroupingConfig::default();
        assert_eq!(config.num_entities(), 80);
        assert_eq!(config.kmeans_restarts, 50);
        assert_eq!(config.centroid_iterations, 40_000);
        assert_eq!(config.pairwise_iterations, 70_000);
        assert_eq!(config.component_iterations, 30_000);
        assert_eq!((config.kmeans_seed, config.centroid_seed), (42, 7));
        assert!(config.refine_full_distance);
        assert!(config.hard_grouping_threshold_km.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(GroupingConfig::new(0, 5).validate().is_err());
        assert!(GroupingConfig::new(2, 0).validate().is_err());
        assert!(GroupingConfig::new(2, 2).with_kmeans_restarts(0).validate().is_err());
        assert!(GroupingConfig::new(2, 2).with_hard_grouping(-1.0).validate().is_err());
        assert!(GroupingConfig::new(2, 2)
            .with_hard_grouping(f64::NAN)
            .validate()
            .is_err());
    }

    #[test]
    fn test_partial_json() {
        let json = r#"{"num_groups": 2, "group_size": 5, "hard_grouping_threshold_km": 30.0}"#;
        let config: GroupingConfig = serde_json::from_str(json).expect("valid json");
        assert_eq!(config.num_entities(), 10);
        assert_eq!(config.hard_grouping_threshold_km, Some(30.0));
        assert_eq!(config.pairwise_seed, 11);
    }

    #[test]
    fn test_json_round_trip_through_file() {
        let config = GroupingConfig::new(3, 4).with_seed(100);
        let path = std::env::temp_dir()
            .join(format!("u-grouping-config-{}.json", std::process::id()));
        fs::write(&path, serde_json::to_string(&config).expect("serializes")).expect("writable");
        let loaded = GroupingConfig::from_json_file(&path).expect("loads");
        fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file() {
        let err = GroupingConfig::from_json_file("/nonexistent/u-grouping.json").unwrap_err();
        assert!(matches!(err, GroupingError::Io(_)));
    }
}
