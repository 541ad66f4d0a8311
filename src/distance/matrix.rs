//! Dense distance matrix.

use crate::models::Entity;

/// A dense n×n great-circle distance matrix stored in row-major order.
///
/// Built once per run from the entity list and read-only afterwards.
///
/// # Examples
///
/// ```
/// use u_grouping::models::Entity;
/// use u_grouping::distance::DistanceMatrix;
///
/// let entities = vec![
///     Entity::new("a", 0.0, 0.0),
///     Entity::new("b", 0.0, 1.0),
///     Entity::new("c", 1.0, 0.0),
/// ];
/// let dm = DistanceMatrix::from_entities(&entities);
/// assert_eq!(dm.size(), 3);
/// assert_eq!(dm.get(1, 1), 0.0);
/// assert_eq!(dm.get(0, 1), dm.get(1, 0));
/// ```
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    data: Vec<f64>,
    size: usize,
}

impl DistanceMatrix {
    /// Largest asymmetry accepted by [`DistanceMatrix::from_data`], in km.
    pub const SYMMETRY_TOLERANCE: f64 = 1e-9;

    /// Computes the haversine distance matrix for the given entities.
    pub fn from_entities(entities: &[Entity]) -> Self {
        let size = entities.len();
        let mut data = vec![0.0; size * size];
        for i in 0..size {
            for j in (i + 1)..size {
                let d = entities[i].distance_to(&entities[j]);
                data[i * size + j] = d;
                data[j * size + i] = d;
            }
        }
        Self { data, size }
    }

    /// Creates a distance matrix from a precomputed n×n grid.
    ///
    /// Returns `None` if the data length doesn't match `size * size` or the
    /// grid is not symmetric within [`Self::SYMMETRY_TOLERANCE`].
    pub fn from_data(size: usize, data: Vec<f64>) -> Option<Self> {
        if data.len() != size * size {
            return None;
        }
        let dm = Self { data, size };
        dm.is_symmetric(Self::SYMMETRY_TOLERANCE).then_some(dm)
    }

    /// Returns the distance between entities `from` and `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Number of entities in this matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns `true` if the matrix is symmetric within the given tolerance.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        (0..self.size).all(|i| {
            ((i + 1)..self.size).all(|j| (self.get(i, j) - self.get(j, i)).abs() <= tol)
        })
    }

    /// Sum of distances from `from` to every entity in `members`, skipping
    /// `exclude` if given.
    pub fn sum_to(&self, from: usize, members: &[usize], exclude: Option<usize>) -> f64 {
        members
            .iter()
            .filter(|&&m| Some(m) != exclude)
            .map(|&m| self.get(from, m))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entities() -> Vec<Entity> {
        vec![
            Entity::new("a", 50.0, 8.0),
            Entity::new("b", 50.5, 8.5),
            Entity::new("c", 52.0, 13.0),
        ]
    }

    #[test]
    fn test_from_entities() {
        let entities = sample_entities();
        let dm = DistanceMatrix::from_entities(&entities);
        assert_eq!(dm.size(), 3);
        assert_eq!(dm.get(0, 0), 0.0);
        assert!((dm.get(0, 2) - entities[0].distance_to(&entities[2])).abs() < 1e-12);
    }

    #[test]
    fn test_symmetric() {
        let dm = DistanceMatrix::from_entities(&sample_entities());
        assert!(dm.is_symmetric(1e-10));
    }

    #[test]
    fn test_from_data() {
        let dm = DistanceMatrix::from_data(2, vec![0.0, 5.0, 5.0, 0.0]).expect("valid");
        assert_eq!(dm.get(0, 1), 5.0);
        assert_eq!(dm.get(1, 0), 5.0);
    }

    #[test]
    fn test_from_data_invalid_size() {
        assert!(DistanceMatrix::from_data(2, vec![0.0, 1.0, 2.0]).is_none());
    }

    #[test]
    fn test_from_data_rejects_asymmetric_grid() {
        assert!(DistanceMatrix::from_data(2, vec![0.0, 10.0, 15.0, 0.0]).is_none());
        let dm = DistanceMatrix::from_data(2, vec![0.0, 10.0, 10.0 + 1e-12, 0.0])
            .expect("within tolerance");
        assert!(!dm.is_symmetric(0.0));
    }

    #[test]
    fn test_sum_to_with_exclusion() {
        let dm = DistanceMatrix::from_data(
            3,
            vec![
                0.0, 1.0, 2.0, //
                1.0, 0.0, 4.0, //
                2.0, 4.0, 0.0,
            ],
        )
        .expect("valid");
        assert_eq!(dm.sum_to(0, &[0, 1, 2], None), 3.0);
        assert_eq!(dm.sum_to(0, &[0, 1, 2], Some(2)), 1.0);
        assert_eq!(dm.sum_to(1, &[], None), 0.0);
    }
}
