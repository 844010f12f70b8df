//! Analytical stages run over an ingested [`Table`](crate::table::Table).
//!
//! Every stage implements [`Analyzer`] and is independent of the others; the
//! [`AnalysisRunner`] executes them in sequence and turns failures and
//! inapplicable inputs into [`Degradation`] records instead of aborting.
//!
//! ## Available Analyzers
//!
//! - **Summarizer** (`summary`): per-column descriptive statistics and missing counts
//! - **Outlier Detector** (`outliers`): IQR fences per numeric column
//! - **Correlation Analyzer** (`correlation`): pairwise-complete Pearson matrix
//! - **Dimensionality Reducer** (`pca`): two-component principal component projection
//! - **Cluster Engine** (`clustering`): DBSCAN labels and a Ward dendrogram
//! - **Type Inference Engine** (`inference`): semantic column types from raw text
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use arrow::array::{ArrayRef, Float64Array};
//! use term_explore::analyzers::{Analyzer, OutlierDetector, Summarizer};
//! use term_explore::table::{SemanticType, Table};
//!
//! let values = Float64Array::from(vec![Some(1.0), None, Some(3.0), Some(250.0)]);
//! let table = Table::try_new(
//!     "example.csv",
//!     vec![("amount".to_string(), SemanticType::Numeric, Arc::new(values) as ArrayRef)],
//! )
//! .unwrap();
//!
//! let summary = Summarizer::new().analyze(&table).unwrap();
//! println!("{} missing values", summary.missing.total());
//!
//! let outliers = OutlierDetector::new().analyze(&table).unwrap();
//! for (column, count) in outliers.counts() {
//!     println!("{column}: {count} outliers");
//! }
//! ```

pub mod clustering;
pub mod correlation;
pub mod errors;
pub mod features;
pub mod inference;
pub mod outliers;
pub mod pca;
pub mod runner;
pub mod stats;
pub mod summary;
pub mod traits;
pub mod types;

pub use clustering::{
    ClusterEngine, ClusteringOutcome, ClusteringResults, Dbscan, Dendrogram, DensityClustering,
    Merge, CLUSTER_COLUMN, NOISE,
};
pub use correlation::{CorrelationAnalyzer, CorrelationMatrix, CorrelationPair};
pub use errors::{AnalyzerError, AnalyzerResult, ClusteringError};
pub use features::FeatureMatrix;
pub use inference::{TypeInferenceEngine, TypeInferenceResult};
pub use outliers::{OutlierDetector, OutlierEntry, OutlierReport};
pub use pca::{DimensionalityReducer, Projection};
pub use runner::{AnalysisResults, AnalysisRunner, Degradation, DegradationDetail};
pub use summary::{ColumnSummary, DatasetSummary, MissingValueReport, Summarizer};
pub use traits::Analyzer;
pub use types::{Applicability, NotApplicableReason};
