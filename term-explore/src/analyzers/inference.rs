//! Semantic type inference for text columns.
//!
//! Every non-missing cell of a column is matched against a fixed set of
//! patterns. The first type in the precedence order numeric, boolean,
//! temporal that matches all cells wins; anything else is categorical. A
//! column without a single value stays [`SemanticType::Unknown`].
//!
//! ```rust
//! use term_explore::analyzers::inference::TypeInferenceEngine;
//! use term_explore::table::SemanticType;
//!
//! let engine = TypeInferenceEngine::new();
//! let result = engine.infer(&[Some("1.5"), None, Some("-2")]);
//! assert_eq!(result.semantic_type, SemanticType::Numeric);
//! assert_eq!(result.null_count, 1);
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::table::SemanticType;

/// Type inference result with confidence score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeInferenceResult {
    /// The inferred type
    pub semantic_type: SemanticType,
    /// Share of non-missing values matching the inferred type (0.0 to 1.0)
    pub confidence: f64,
    /// Number of non-missing values examined
    pub samples_analyzed: usize,
    /// Number of missing values encountered
    pub null_count: usize,
}

/// Match counts gathered over one column.
#[derive(Debug, Default)]
struct TypeStats {
    samples: usize,
    nulls: usize,
    numeric: usize,
    boolean: usize,
    temporal: usize,
}

struct TypePatterns {
    number: Regex,
    boolean_true: Regex,
    boolean_false: Regex,
    date_iso: Regex,
    date_us: Regex,
    date_eu: Regex,
    datetime_iso: Regex,
}

static PATTERNS: Lazy<TypePatterns> = Lazy::new(|| TypePatterns {
    number: Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("valid number pattern"),
    boolean_true: Regex::new(r"(?i)^(true|t|yes|y)$").expect("valid boolean pattern"),
    boolean_false: Regex::new(r"(?i)^(false|f|no|n)$").expect("valid boolean pattern"),
    date_iso: Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date pattern"),
    date_us: Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}$").expect("valid date pattern"),
    date_eu: Regex::new(r"^\d{1,2}\.\d{1,2}\.\d{4}$").expect("valid date pattern"),
    datetime_iso: Regex::new(r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}(:\d{2}(\.\d+)?)?")
        .expect("valid datetime pattern"),
});

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Infers column types from their textual cells.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeInferenceEngine;

impl TypeInferenceEngine {
    pub fn new() -> Self {
        Self
    }

    /// Infers the type of one column.
    pub fn infer(&self, values: &[Option<&str>]) -> TypeInferenceResult {
        let mut stats = TypeStats::default();
        for value in values {
            match value {
                None => stats.nulls += 1,
                Some(raw) => {
                    stats.samples += 1;
                    let trimmed = raw.trim();
                    if parse_number(trimmed).is_some() {
                        stats.numeric += 1;
                    }
                    if parse_boolean(trimmed).is_some() {
                        stats.boolean += 1;
                    }
                    if is_temporal(trimmed) {
                        stats.temporal += 1;
                    }
                }
            }
        }
        Self::determine_type(&stats)
    }

    fn determine_type(stats: &TypeStats) -> TypeInferenceResult {
        let (semantic_type, matches) = if stats.samples == 0 {
            (SemanticType::Unknown, 0)
        } else if stats.numeric == stats.samples {
            (SemanticType::Numeric, stats.numeric)
        } else if stats.boolean == stats.samples {
            (SemanticType::Boolean, stats.boolean)
        } else if stats.temporal == stats.samples {
            (SemanticType::Temporal, stats.temporal)
        } else {
            (SemanticType::Categorical, stats.samples)
        };

        let confidence = if stats.samples == 0 {
            0.0
        } else {
            matches as f64 / stats.samples as f64
        };

        TypeInferenceResult {
            semantic_type,
            confidence,
            samples_analyzed: stats.samples,
            null_count: stats.nulls,
        }
    }
}

/// Parses a finite number. Infinity and NaN spellings are rejected.
pub fn parse_number(value: &str) -> Option<f64> {
    let value = value.trim();
    if !PATTERNS.number.is_match(value) {
        return None;
    }
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a boolean literal (`true/false`, `yes/no`, `t/f`, `y/n`, any case).
pub fn parse_boolean(value: &str) -> Option<bool> {
    let value = value.trim();
    if PATTERNS.boolean_true.is_match(value) {
        Some(true)
    } else if PATTERNS.boolean_false.is_match(value) {
        Some(false)
    } else {
        None
    }
}

fn is_temporal(value: &str) -> bool {
    let patterns = &*PATTERNS;
    if patterns.date_iso.is_match(value) {
        return NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok();
    }
    if patterns.date_us.is_match(value) {
        return NaiveDate::parse_from_str(value, "%m/%d/%Y").is_ok();
    }
    if patterns.date_eu.is_match(value) {
        return NaiveDate::parse_from_str(value, "%d.%m.%Y").is_ok();
    }
    if patterns.datetime_iso.is_match(value) {
        return DateTime::parse_from_rfc3339(value).is_ok()
            || DATETIME_FORMATS
                .iter()
                .any(|format| NaiveDateTime::parse_from_str(value, format).is_ok());
    }
    false
}
