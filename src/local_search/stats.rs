//! Local-search run statistics.

use serde::Serialize;

/// Counters and objective values from one local-search run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SwapStats {
    /// Trials drawn.
    pub iterations: usize,
    /// Trials that crossed groups and were scored.
    pub trials: usize,
    /// Swaps applied.
    pub accepted: usize,
    /// Objective before the run.
    pub initial_cost: f64,
    /// Objective after the run.
    pub final_cost: f64,
}

impl SwapStats {
    /// Reduction of the objective (non-negative for a descent run).
    pub fn improvement(&self) -> f64 {
        self.initial_cost - self.final_cost
    }
}
