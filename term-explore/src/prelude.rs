//! Prelude for commonly used types and traits in term-explore.

pub use crate::analyzers::{
    AnalysisResults, AnalysisRunner, Analyzer, Applicability, Degradation, NotApplicableReason,
};
pub use crate::config::{AnalysisConfig, NarrativeConfig, PipelineConfig, RenderConfig};
pub use crate::error::{ErrorContext, Result, TermError};
pub use crate::narrative::{NarrativeGenerator, NarrativeOutcome};
pub use crate::pipeline::{Pipeline, PipelineOutcome};
pub use crate::report::ReportPayload;
pub use crate::sources::{Ingestor, LoadedDataset};
pub use crate::table::{SemanticType, Table};
