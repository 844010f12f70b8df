//! Agglomerative clustering with Ward linkage.
//!
//! Uses the nearest-neighbor chain algorithm over a condensed distance
//! matrix, updating distances with the Lance-Williams formula for Ward's
//! criterion. Memory is quadratic in the number of rows, which is why the
//! caller enforces a row limit.

use serde::Serialize;
use tracing::debug;

use crate::analyzers::features::{euclidean, FeatureMatrix};
use crate::analyzers::ClusteringError;

const ALGORITHM: &str = "ward";

/// One agglomeration step.
///
/// Leaves are numbered `0..n`; the cluster created by the `i`-th merge is
/// numbered `n + i`. `left < right` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Merge {
    pub left: usize,
    pub right: usize,
    pub distance: f64,
    /// Number of leaves under the new cluster.
    pub size: usize,
}

/// Full merge tree over the retained rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dendrogram {
    pub leaf_count: usize,
    /// Merges in non-decreasing distance order.
    pub merges: Vec<Merge>,
    /// Source row index of every leaf.
    pub rows: Vec<usize>,
}

impl Dendrogram {
    /// Id of the root cluster.
    pub fn root(&self) -> usize {
        if self.merges.is_empty() {
            0
        } else {
            self.leaf_count + self.merges.len() - 1
        }
    }

    /// Children of a non-leaf cluster.
    pub fn children(&self, node: usize) -> Option<(usize, usize)> {
        let merge = self.merges.get(node.checked_sub(self.leaf_count)?)?;
        Some((merge.left, merge.right))
    }

    /// Leaves in left-to-right drawing order.
    pub fn leaf_order(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.leaf_count);
        if self.leaf_count == 0 {
            return order;
        }
        let mut stack = vec![self.root()];
        while let Some(node) = stack.pop() {
            match self.children(node) {
                Some((left, right)) => {
                    stack.push(right);
                    stack.push(left);
                }
                None => order.push(node),
            }
        }
        order
    }

    /// Height of the tallest merge.
    pub fn max_distance(&self) -> f64 {
        self.merges.iter().map(|m| m.distance).fold(0.0, f64::max)
    }
}

/// Condensed upper-triangular distance storage.
struct Condensed {
    n: usize,
    values: Vec<f64>,
}

impl Condensed {
    fn index(&self, i: usize, j: usize) -> usize {
        let (i, j) = if i < j { (i, j) } else { (j, i) };
        self.n * i - (i * (i + 1)) / 2 + (j - i - 1)
    }

    fn get(&self, i: usize, j: usize) -> f64 {
        self.values[self.index(i, j)]
    }

    fn set(&mut self, i: usize, j: usize, value: f64) {
        let index = self.index(i, j);
        self.values[index] = value;
    }
}

/// Ward distance between cluster `i` and the union of `x` and `y`.
fn ward_update(d_xi: f64, d_yi: f64, d_xy: f64, size_x: f64, size_y: f64, size_i: f64) -> f64 {
    let t = 1.0 / (size_x + size_y + size_i);
    let squared = (size_i + size_x) * t * d_xi * d_xi + (size_i + size_y) * t * d_yi * d_yi
        - size_i * t * d_xy * d_xy;
    squared.max(0.0).sqrt()
}

/// Builds the Ward dendrogram of the rows of `features`.
///
/// Requires at least two rows.
pub fn ward_linkage(features: &FeatureMatrix) -> Result<Dendrogram, ClusteringError> {
    let n = features.n_rows();
    if n < 2 {
        return Err(ClusteringError::Numeric {
            algorithm: ALGORITHM,
            message: format!("{n} row(s) cannot be merged"),
        });
    }

    let mut distances = Condensed {
        n,
        values: Vec::with_capacity(n * (n - 1) / 2),
    };
    for i in 0..n {
        for j in (i + 1)..n {
            let d = euclidean(features.row(i), features.row(j));
            if !d.is_finite() {
                return Err(ClusteringError::NonFiniteDistance {
                    algorithm: ALGORITHM,
                });
            }
            distances.values.push(d);
        }
    }

    let mut size = vec![1usize; n];
    let mut chain: Vec<usize> = Vec::with_capacity(n);
    let mut raw: Vec<Merge> = Vec::with_capacity(n - 1);

    for _ in 0..(n - 1) {
        if chain.is_empty() {
            let start = size.iter().position(|&s| s > 0).ok_or_else(|| ClusteringError::Numeric {
                algorithm: ALGORITHM,
                message: "no active cluster left".to_string(),
            })?;
            chain.push(start);
        }

        let (x, y, current_min) = loop {
            let x = chain[chain.len() - 1];
            let previous = (chain.len() > 1).then(|| chain[chain.len() - 2]);
            let mut best = previous.map(|p| (p, distances.get(x, p)));

            for i in 0..n {
                if size[i] == 0 || i == x {
                    continue;
                }
                let d = distances.get(x, i);
                if best.map_or(true, |(_, min)| d < min) {
                    best = Some((i, d));
                }
            }

            let (y, min) = best.ok_or(ClusteringError::NonFiniteDistance {
                algorithm: ALGORITHM,
            })?;
            if previous == Some(y) {
                break (x, y, min);
            }
            chain.push(y);
        };

        if !current_min.is_finite() {
            return Err(ClusteringError::NonFiniteDistance {
                algorithm: ALGORITHM,
            });
        }

        chain.truncate(chain.len() - 2);
        let (x, y) = if x < y { (x, y) } else { (y, x) };
        let (size_x, size_y) = (size[x], size[y]);
        raw.push(Merge {
            left: x,
            right: y,
            distance: current_min,
            size: size_x + size_y,
        });

        size[x] = 0;
        size[y] = size_x + size_y;
        for i in 0..n {
            if size[i] == 0 || i == y {
                continue;
            }
            let updated = ward_update(
                distances.get(i, x),
                distances.get(i, y),
                current_min,
                size_x as f64,
                size_y as f64,
                size[i] as f64,
            );
            distances.set(i, y, updated);
        }
    }

    raw.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    let merges = relabel(raw, n);

    debug!(leaves = n, merges = merges.len(), "Ward linkage finished");
    Ok(Dendrogram {
        leaf_count: n,
        merges,
        rows: features.rows.clone(),
    })
}

/// Rewrites merges in slot terms into cluster ids: leaves `0..n`, the `i`-th
/// merge creates `n + i`.
fn relabel(merges: Vec<Merge>, n: usize) -> Vec<Merge> {
    let mut parent: Vec<usize> = (0..(2 * n - 1)).collect();
    let mut sizes: Vec<usize> = vec![1; 2 * n - 1];
    let mut next = n;

    fn find(parent: &mut [usize], mut node: usize) -> usize {
        let mut root = node;
        while parent[root] != root {
            root = parent[root];
        }
        while parent[node] != root {
            let up = parent[node];
            parent[node] = root;
            node = up;
        }
        root
    }

    merges
        .into_iter()
        .map(|merge| {
            let a = find(&mut parent, merge.left);
            let b = find(&mut parent, merge.right);
            let (left, right) = if a < b { (a, b) } else { (b, a) };
            parent[left] = next;
            parent[right] = next;
            sizes[next] = sizes[left] + sizes[right];
            let labeled = Merge {
                left,
                right,
                distance: merge.distance,
                size: sizes[next],
            };
            next += 1;
            labeled
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(points: &[f64]) -> FeatureMatrix {
        FeatureMatrix::from_rows(
            vec!["x".into()],
            points.iter().map(|&p| vec![p]).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_two_points() {
        let tree = ward_linkage(&line(&[0.0, 3.0])).unwrap();
        assert_eq!(
            tree.merges,
            vec![Merge {
                left: 0,
                right: 1,
                distance: 3.0,
                size: 2
            }]
        );
        assert_eq!(tree.root(), 2);
    }

    #[test]
    fn test_ward_merge_heights() {
        // Points 0 and 1 merge first, then 2 joins them, then 3 joins everything.
        let tree = ward_linkage(&line(&[0.0, 1.0, 3.0, 10.0])).unwrap();
        assert_eq!(tree.merges.len(), 3);

        assert_eq!((tree.merges[0].left, tree.merges[0].right), (0, 1));
        assert_eq!(tree.merges[0].distance, 1.0);

        assert_eq!((tree.merges[1].left, tree.merges[1].right), (2, 4));
        let expected = (4.0f64 / 3.0).sqrt() * 2.5;
        assert!((tree.merges[1].distance - expected).abs() < 1e-12);
        assert_eq!(tree.merges[1].size, 3);

        assert_eq!((tree.merges[2].left, tree.merges[2].right), (3, 5));
        assert_eq!(tree.merges[2].size, 4);
        assert!(tree.merges[2].distance > tree.merges[1].distance);
    }

    #[test]
    fn test_merges_are_monotonic_and_cover_all_leaves() {
        let tree = ward_linkage(&line(&[5.0, 1.0, 9.0, 2.0, 8.0, 1.5, 7.0])).unwrap();
        assert!(tree
            .merges
            .windows(2)
            .all(|w| w[0].distance <= w[1].distance));
        assert_eq!(tree.merges.last().unwrap().size, 7);

        let mut leaves = tree.leaf_order();
        assert_eq!(leaves.len(), 7);
        leaves.sort_unstable();
        assert_eq!(leaves, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn test_duplicate_points_merge_at_zero() {
        let tree = ward_linkage(&line(&[1.0, 1.0, 1.0])).unwrap();
        assert!(tree.merges.iter().all(|m| m.distance == 0.0));
    }

    #[test]
    fn test_single_row_is_rejected() {
        assert!(ward_linkage(&line(&[1.0])).is_err());
    }

    #[test]
    fn test_non_finite_distance() {
        let err = ward_linkage(&line(&[f64::MAX, -f64::MAX])).unwrap_err();
        assert_eq!(err, ClusteringError::NonFiniteDistance { algorithm: "ward" });
    }
}
