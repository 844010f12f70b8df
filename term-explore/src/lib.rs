//! # term-explore - Automated exploratory data analysis
//!
//! term-explore takes a single delimited data file of unknown encoding and
//! produces a short analytical report: descriptive statistics, missing values,
//! IQR outliers, a correlation matrix, a two-component PCA projection, DBSCAN
//! and Ward clustering, one SVG chart per plottable result, and a narrative
//! written by a remote text-generation service.
//!
//! ## Overview
//!
//! A run flows through five stages:
//!
//! 1. [`sources::Ingestor`] detects the byte encoding, parses the file, and
//!    infers a semantic type per column into a [`table::Table`].
//! 2. [`analyzers::AnalysisRunner`] runs every analyzer independently.
//! 3. [`render::VisualizationRenderer`] turns the plottable results into
//!    SVG artifacts.
//! 4. [`report::ReportAssembler`] merges everything into a
//!    [`report::ReportPayload`].
//! 5. A [`narrative::NarrativeGenerator`] describes the payload and
//!    [`report::ReportWriter`] saves the final Markdown report.
//!
//! Only ingestion, missing credentials, and writing the report can fail a
//! run. Analyses that do not apply to the data are reported as
//! [`analyzers::Applicability::NotApplicable`], and every skipped piece is
//! recorded as an [`analyzers::Degradation`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use term_explore::narrative::ChatCompletionClient;
//! use term_explore::prelude::*;
//!
//! # async fn example() -> Result<()> {
//! let config = NarrativeConfig::from_env()?;
//! let client = ChatCompletionClient::new(config)
//!     .map_err(|e| TermError::configuration(e.to_string()))?;
//!
//! let pipeline = Pipeline::new(PipelineConfig::default(), Arc::new(client));
//! let outcome = pipeline.run(Path::new("media.csv")).await?;
//!
//! println!("Report: {}", outcome.report_path.display());
//! for degradation in &outcome.degradations {
//!     println!("skipped {degradation}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Running the analyzers directly
//!
//! ```rust,no_run
//! use term_explore::analyzers::{Analyzer, CorrelationAnalyzer};
//! use term_explore::sources::Ingestor;
//!
//! let dataset = Ingestor::default().load("media.csv").unwrap();
//! match CorrelationAnalyzer::new().analyze(&dataset.table).unwrap() {
//!     term_explore::analyzers::Applicability::Applicable(matrix) => {
//!         for pair in matrix.strongest_pairs(3) {
//!             println!("{} ~ {}: {:.2}", pair.left, pair.right, pair.coefficient);
//!         }
//!     }
//!     term_explore::analyzers::Applicability::NotApplicable(reason) => {
//!         println!("correlation skipped: {reason}");
//!     }
//! }
//! ```

pub mod analyzers;
pub mod config;
pub mod error;
pub mod logging;
pub mod narrative;
pub mod pipeline;
pub mod prelude;
pub mod render;
pub mod report;
pub mod sources;
pub mod table;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_fixtures;

pub use error::{Result, TermError};
