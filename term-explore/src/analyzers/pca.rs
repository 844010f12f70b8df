//! Two-component principal component analysis.
//!
//! The numeric columns are reduced to their complete rows and standardized.
//! The sample covariance matrix of the result is diagonalized with the cyclic
//! Jacobi method and every row is projected onto the two leading
//! eigenvectors.

use serde::Serialize;
use tracing::{debug, instrument};

use super::features::FeatureMatrix;
use super::{Analyzer, AnalyzerError, AnalyzerResult, Applicability, NotApplicableReason};
use crate::table::Table;

const MAX_SWEEPS: usize = 100;
const OFF_DIAGONAL_TOLERANCE: f64 = 1e-24;

/// Rows projected onto the first two principal components.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    /// Columns that took part in the projection.
    pub columns: Vec<String>,
    /// Source row index of every projected row.
    pub rows: Vec<usize>,
    pub coordinates: Vec<[f64; 2]>,
    /// Share of total variance carried by each component.
    pub explained_variance_ratio: [f64; 2],
    /// Unit-length component directions, one weight per column.
    pub loadings: [Vec<f64>; 2],
}

/// Eigenvalues and matching eigenvectors of a symmetric matrix, in
/// descending eigenvalue order. `vectors[k]` belongs to `values[k]`.
#[derive(Debug, Clone)]
pub struct SymmetricEigen {
    pub values: Vec<f64>,
    pub vectors: Vec<Vec<f64>>,
}

/// Diagonalizes a symmetric matrix with cyclic Jacobi rotations.
pub fn symmetric_eigen(matrix: &[Vec<f64>]) -> AnalyzerResult<SymmetricEigen> {
    let n = matrix.len();
    if matrix.iter().any(|row| row.len() != n) {
        return Err(AnalyzerError::invalid_data("matrix is not square"));
    }

    let mut a: Vec<Vec<f64>> = matrix.to_vec();
    let mut v: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();

    let scale: f64 = a.iter().flatten().map(|x| x * x).sum::<f64>().max(f64::MIN_POSITIVE);
    let mut converged = n < 2;
    for _ in 0..MAX_SWEEPS {
        let off: f64 = (0..n)
            .flat_map(|p| ((p + 1)..n).map(move |q| (p, q)))
            .map(|(p, q)| a[p][q] * a[p][q])
            .sum();
        if off <= OFF_DIAGONAL_TOLERANCE * scale {
            converged = true;
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                if a[p][q] == 0.0 {
                    continue;
                }
                let theta = (a[q][q] - a[p][p]) / (2.0 * a[p][q]);
                let sign = if theta >= 0.0 { 1.0 } else { -1.0 };
                let t = sign / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for row in a.iter_mut() {
                    let (akp, akq) = (row[p], row[q]);
                    row[p] = c * akp - s * akq;
                    row[q] = s * akp + c * akq;
                }
                for k in 0..n {
                    let (apk, aqk) = (a[p][k], a[q][k]);
                    a[p][k] = c * apk - s * aqk;
                    a[q][k] = s * apk + c * aqk;
                }
                for row in v.iter_mut() {
                    let (vkp, vkq) = (row[p], row[q]);
                    row[p] = c * vkp - s * vkq;
                    row[q] = s * vkp + c * vkq;
                }
            }
        }
    }

    if !converged {
        return Err(AnalyzerError::metric_computation(
            "eigen-decomposition did not converge",
        ));
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| a[j][j].total_cmp(&a[i][i]));
    let values = order.iter().map(|&i| a[i][i]).collect();
    let vectors = order
        .iter()
        .map(|&i| {
            let mut vector: Vec<f64> = (0..n).map(|k| v[k][i]).collect();
            orient(&mut vector);
            vector
        })
        .collect();
    Ok(SymmetricEigen { values, vectors })
}

/// Flips `vector` so its largest-magnitude entry is positive.
fn orient(vector: &mut [f64]) {
    let dominant = vector
        .iter()
        .copied()
        .max_by(|a, b| a.abs().total_cmp(&b.abs()))
        .unwrap_or_default();
    if dominant < 0.0 {
        vector.iter_mut().for_each(|x| *x = -*x);
    }
}

/// Sample covariance (n - 1) of a row-major matrix with centered columns.
fn covariance(data: &[Vec<f64>], n_cols: usize) -> Vec<Vec<f64>> {
    let denominator = (data.len().saturating_sub(1)).max(1) as f64;
    let mut cov = vec![vec![0.0; n_cols]; n_cols];
    for row in data {
        for i in 0..n_cols {
            for j in i..n_cols {
                cov[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..n_cols {
        for j in i..n_cols {
            cov[i][j] /= denominator;
            cov[j][i] = cov[i][j];
        }
    }
    cov
}

/// Projects the numeric subset of a table onto two principal components.
#[derive(Debug, Clone, Default)]
pub struct DimensionalityReducer;

impl DimensionalityReducer {
    pub const MIN_COLUMNS: usize = 2;
    pub const MIN_ROWS: usize = 2;

    pub fn new() -> Self {
        Self
    }

    /// Runs the projection on an already selected feature matrix.
    pub fn project(&self, features: &FeatureMatrix) -> AnalyzerResult<Applicability<Projection>> {
        if features.n_cols() < Self::MIN_COLUMNS {
            return Ok(Applicability::NotApplicable(
                NotApplicableReason::TooFewNumericColumns {
                    found: features.n_cols(),
                    required: Self::MIN_COLUMNS,
                },
            ));
        }
        if features.n_rows() < Self::MIN_ROWS {
            return Ok(Applicability::NotApplicable(NotApplicableReason::TooFewRows {
                found: features.n_rows(),
                required: Self::MIN_ROWS,
            }));
        }

        let standardized = features.standardized();
        let cov = covariance(standardized.data(), standardized.n_cols());
        let total_variance: f64 = (0..cov.len()).map(|i| cov[i][i]).sum();
        if !total_variance.is_finite() || cov.iter().flatten().any(|v| !v.is_finite()) {
            return Err(AnalyzerError::metric_computation(
                "covariance matrix is not finite; values overflow during standardization",
            ));
        }
        if total_variance <= f64::EPSILON {
            return Ok(Applicability::NotApplicable(NotApplicableReason::ZeroVariance));
        }

        let eigen = symmetric_eigen(&cov)?;
        let ratio = |k: usize| eigen.values[k].max(0.0) / total_variance;
        let first = eigen.vectors[0].clone();
        let second = eigen.vectors[1].clone();

        let coordinates = standardized
            .data()
            .iter()
            .map(|row| [dot(row, &first), dot(row, &second)])
            .collect();

        debug!(
            columns = features.n_cols(),
            rows = features.n_rows(),
            pc1 = ratio(0),
            pc2 = ratio(1),
            "Computed principal components"
        );

        Ok(Applicability::Applicable(Projection {
            columns: features.columns.clone(),
            rows: features.rows.clone(),
            coordinates,
            explained_variance_ratio: [ratio(0), ratio(1)],
            loadings: [first, second],
        }))
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

impl Analyzer for DimensionalityReducer {
    type Output = Applicability<Projection>;

    fn name(&self) -> &str {
        "pca"
    }

    fn description(&self) -> &str {
        "Projection onto the first two principal components"
    }

    #[instrument(skip(self, table), fields(rows = table.num_rows()))]
    fn analyze(&self, table: &Table) -> AnalyzerResult<Self::Output> {
        let features = FeatureMatrix::from_table(table)?;
        self.project(&features)
    }
}
