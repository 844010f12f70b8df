//! Density-based clustering (DBSCAN).

use serde::Serialize;
use tracing::debug;

use crate::analyzers::features::{euclidean, FeatureMatrix};
use crate::analyzers::ClusteringError;

/// Label given to points that belong to no cluster.
pub const NOISE: i32 = -1;

const UNVISITED: i32 = -2;
const ALGORITHM: &str = "dbscan";

/// Flat cluster assignment for every retained row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityClustering {
    /// Cluster label per retained row; [`NOISE`] marks noise.
    pub labels: Vec<i32>,
    pub cluster_count: usize,
    pub noise_count: usize,
    pub eps: f64,
    pub min_samples: usize,
    /// Source row index of every labelled row.
    pub rows: Vec<usize>,
}

impl DensityClustering {
    /// Number of rows carrying `label`.
    pub fn cluster_size(&self, label: i32) -> usize {
        self.labels.iter().filter(|&&l| l == label).count()
    }
}

/// DBSCAN with a fixed radius and minimum neighborhood size.
///
/// A point is a core point when at least `min_samples` points (itself
/// included) lie within distance `eps`. Clusters are numbered from zero in
/// the order their first core point appears, so identical input always gives
/// identical labels.
#[derive(Debug, Clone, Copy)]
pub struct Dbscan {
    pub eps: f64,
    pub min_samples: usize,
}

impl Default for Dbscan {
    fn default() -> Self {
        Self {
            eps: 0.5,
            min_samples: 5,
        }
    }
}

impl Dbscan {
    pub fn new(eps: f64, min_samples: usize) -> Self {
        Self { eps, min_samples }
    }

    fn region(
        &self,
        features: &FeatureMatrix,
        point: usize,
    ) -> Result<Vec<usize>, ClusteringError> {
        let origin = features.row(point);
        let mut neighbors = Vec::new();
        for other in 0..features.n_rows() {
            let distance = euclidean(origin, features.row(other));
            if !distance.is_finite() {
                return Err(ClusteringError::NonFiniteDistance {
                    algorithm: ALGORITHM,
                });
            }
            if distance <= self.eps {
                neighbors.push(other);
            }
        }
        Ok(neighbors)
    }

    /// Labels every row of `features`.
    pub fn fit(&self, features: &FeatureMatrix) -> Result<DensityClustering, ClusteringError> {
        if !(self.eps.is_finite() && self.eps >= 0.0) || self.min_samples == 0 {
            return Err(ClusteringError::Numeric {
                algorithm: ALGORITHM,
                message: format!(
                    "invalid parameters eps={} min_samples={}",
                    self.eps, self.min_samples
                ),
            });
        }

        let n = features.n_rows();
        let mut labels = vec![UNVISITED; n];
        let mut cluster: i32 = 0;

        for point in 0..n {
            if labels[point] != UNVISITED {
                continue;
            }
            let neighbors = self.region(features, point)?;
            if neighbors.len() < self.min_samples {
                labels[point] = NOISE;
                continue;
            }

            labels[point] = cluster;
            // Each row is queued at most once: it is labelled when first reached.
            let mut queue = Vec::new();
            claim(&mut labels, &mut queue, &neighbors, cluster);
            let mut cursor = 0;
            while cursor < queue.len() {
                let candidate = queue[cursor];
                cursor += 1;
                let expansion = self.region(features, candidate)?;
                if expansion.len() >= self.min_samples {
                    claim(&mut labels, &mut queue, &expansion, cluster);
                }
            }
            cluster += 1;
        }

        let noise_count = labels.iter().filter(|&&l| l == NOISE).count();
        debug!(
            clusters = cluster,
            noise = noise_count,
            eps = self.eps,
            min_samples = self.min_samples,
            "DBSCAN finished"
        );

        Ok(DensityClustering {
            labels,
            cluster_count: cluster as usize,
            noise_count,
            eps: self.eps,
            min_samples: self.min_samples,
            rows: features.rows.clone(),
        })
    }
}

/// Assigns `cluster` to reachable rows that have no cluster yet. Rows seen
/// for the first time are queued for expansion; noise rows become border
/// points and are not expanded.
fn claim(labels: &mut [i32], queue: &mut Vec<usize>, neighbors: &[usize], cluster: i32) {
    for &neighbor in neighbors {
        match labels[neighbor] {
            UNVISITED => {
                labels[neighbor] = cluster;
                queue.push(neighbor);
            }
            NOISE => labels[neighbor] = cluster,
            _ => {}
        }
    }
}
