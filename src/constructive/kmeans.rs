//! Lloyd's k-means with k-means++ seeding and restarts.
//!
//! # Algorithm
//!
//! Each restart seeds K centres with k-means++ (first centre uniform, later
//! centres drawn proportionally to squared distance from the nearest chosen
//! centre), then alternates assignment and mean-update steps until the
//! assignment stops changing or the iteration cap is reached. The restart
//! with the lowest inertia (sum of squared distances to assigned centres)
//! wins.
//!
//! Coordinates are treated as planar (degrees), which is adequate for
//! seeding: group sizes are fixed afterwards by the capacity balancer and
//! the local search works on great-circle distances.
//!
//! # Complexity
//!
//! O(R × I × N × K) for R restarts and I iterations.
//!
//! # Reference
//!
//! Arthur, D. & Vassilvitskii, S. (2007). "k-means++: The Advantages of
//! Careful Seeding", *Proceedings of SODA '07*, 1027-1035.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{GroupingError, Result};
use crate::models::GeoPoint;

/// Result of an unconstrained clustering run.
#[derive(Debug, Clone)]
pub struct Clustering {
    /// Cluster label per input point, each in `0..K`.
    pub labels: Vec<usize>,
    /// Cluster centres.
    pub centroids: Vec<GeoPoint>,
    /// Sum of squared planar distances from points to their centres.
    pub inertia: f64,
}

/// Produces an initial, size-unbalanced grouping.
///
/// Any clustering method works as long as it is seedable and returns one
/// label per point plus K centroids.
pub trait Partitioner {
    /// Clusters `points` into `k` groups.
    fn cluster(&self, points: &[GeoPoint], k: usize, seed: u64) -> Result<Clustering>;
}

/// Lloyd's algorithm with k-means++ seeding, repeated from several random
/// initializations.
///
/// # Examples
///
/// ```
/// use u_grouping::constructive::{KMeans, Partitioner};
/// use u_grouping::models::GeoPoint;
///
/// let points = vec![
///     GeoPoint::new(53.0, 9.0),
///     GeoPoint::new(53.1, 9.1),
///     GeoPoint::new(48.0, 11.0),
///     GeoPoint::new(48.1, 11.1),
/// ];
/// let result = KMeans::new().with_restarts(5).cluster(&points, 2, 42).unwrap();
/// assert_eq!(result.labels[0], result.labels[1]);
/// assert_ne!(result.labels[0], result.labels[2]);
/// ```
#[derive(Debug, Clone)]
pub struct KMeans {
    restarts: usize,
    max_iterations: usize,
}

impl KMeans {
    /// Creates a k-means partitioner with 50 restarts and 300 iterations per
    /// restart.
    pub fn new() -> Self {
        Self {
            restarts: 50,
            max_iterations: 300,
        }
    }

    /// Sets the number of random restarts (at least one).
    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts.max(1);
        self
    }

    /// Sets the iteration cap for a single restart.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    fn run_once<R: Rng>(&self, points: &[GeoPoint], k: usize, rng: &mut R) -> Clustering {
        let n = points.len();
        let mut centroids = plus_plus_init(points, k, rng);
        let mut labels = vec![usize::MAX; n];

        for _ in 0..self.max_iterations {
            let mut next: Vec<usize> = points.iter().map(|&p| nearest(&centroids, p)).collect();
            reseed_empty(points, &centroids, &mut next, k);

            let changed = next != labels;
            labels = next;
            centroids = update_centroids(points, &labels, &centroids);
            if !changed {
                break;
            }
        }

        let inertia = points
            .iter()
            .zip(&labels)
            .map(|(&p, &l)| sq_dist(p, centroids[l]))
            .sum();

        Clustering {
            labels,
            centroids,
            inertia,
        }
    }
}

impl Default for KMeans {
    fn default() -> Self {
        Self::new()
    }
}

impl Partitioner for KMeans {
    fn cluster(&self, points: &[GeoPoint], k: usize, seed: u64) -> Result<Clustering> {
        if points.is_empty() {
            return Err(GroupingError::invalid_input("cannot cluster an empty point set"));
        }
        if k == 0 || k > points.len() {
            return Err(GroupingError::invalid_input(format!(
                "cluster count {k} must be in 1..={}",
                points.len()
            )));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut best: Option<Clustering> = None;
        for _ in 0..self.restarts {
            let candidate = self.run_once(points, k, &mut rng);
            if best.as_ref().is_none_or(|b| candidate.inertia < b.inertia) {
                best = Some(candidate);
            }
        }

        best.ok_or_else(|| GroupingError::invariant("k-means produced no clustering"))
    }
}

fn sq_dist(a: GeoPoint, b: GeoPoint) -> f64 {
    let dlat = a.lat() - b.lat();
    let dlon = a.lon() - b.lon();
    dlat * dlat + dlon * dlon
}

/// Index of the centre closest to `p`; the lowest index wins ties.
fn nearest(centroids: &[GeoPoint], p: GeoPoint) -> usize {
    let mut best = 0;
    let mut best_d = f64::INFINITY;
    for (c, &centre) in centroids.iter().enumerate() {
        let d = sq_dist(p, centre);
        if d < best_d {
            best_d = d;
            best = c;
        }
    }
    best
}

fn plus_plus_init<R: Rng>(points: &[GeoPoint], k: usize, rng: &mut R) -> Vec<GeoPoint> {
    let n = points.len();
    let mut centres = Vec::with_capacity(k);
    centres.push(points[rng.random_range(0..n)]);

    let mut weights: Vec<f64> = points.iter().map(|&p| sq_dist(p, centres[0])).collect();
    while centres.len() < k {
        let total: f64 = weights.iter().sum();
        let idx = if total > 0.0 {
            let mut target = rng.random::<f64>() * total;
            let mut chosen = weights.iter().rposition(|&w| w > 0.0).unwrap_or(n - 1);
            for (i, &w) in weights.iter().enumerate() {
                if target < w {
                    chosen = i;
                    break;
                }
                target -= w;
            }
            chosen
        } else {
            // All points coincide with a chosen centre.
            rng.random_range(0..n)
        };

        let centre = points[idx];
        centres.push(centre);
        for (w, &p) in weights.iter_mut().zip(points) {
            *w = w.min(sq_dist(p, centre));
        }
    }
    centres
}

/// Gives every empty cluster the point farthest from its current centre,
/// taken from a cluster that keeps at least one member.
fn reseed_empty(points: &[GeoPoint], centroids: &[GeoPoint], labels: &mut [usize], k: usize) {
    let mut counts = vec![0usize; k];
    for &l in labels.iter() {
        counts[l] += 1;
    }

    for c in 0..k {
        if counts[c] > 0 {
            continue;
        }
        let farthest = (0..points.len())
            .filter(|&i| counts[labels[i]] > 1)
            .max_by(|&a, &b| {
                sq_dist(points[a], centroids[labels[a]])
                    .total_cmp(&sq_dist(points[b], centroids[labels[b]]))
            });
        if let Some(i) = farthest {
            counts[labels[i]] -= 1;
            labels[i] = c;
            counts[c] = 1;
        }
    }
}

fn update_centroids(points: &[GeoPoint], labels: &[usize], previous: &[GeoPoint]) -> Vec<GeoPoint> {
    previous
        .iter()
        .enumerate()
        .map(|(c, &old)| {
            GeoPoint::mean(
                points
                    .iter()
                    .zip(labels)
                    .filter(|&(_, &l)| l == c)
                    .map(|(&p, _)| p),
            )
            .unwrap_or(old)
        })
        .collect()
}
