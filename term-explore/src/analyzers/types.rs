//! Shared result types for analyzers.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Why an analysis was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotApplicableReason {
    /// Fewer numeric columns than the analysis needs.
    TooFewNumericColumns { found: usize, required: usize },
    /// Fewer usable rows than the analysis needs.
    TooFewRows { found: usize, required: usize },
    /// The table has no numeric data at all.
    NoNumericData,
    /// Every selected column is constant.
    ZeroVariance,
}

impl fmt::Display for NotApplicableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotApplicableReason::TooFewNumericColumns { found, required } => {
                write!(f, "{found} numeric column(s) found, {required} required")
            }
            NotApplicableReason::TooFewRows { found, required } => {
                write!(f, "{found} complete row(s) found, {required} required")
            }
            NotApplicableReason::NoNumericData => write!(f, "no numeric data"),
            NotApplicableReason::ZeroVariance => write!(f, "all numeric columns are constant"),
        }
    }
}

/// Outcome of an analysis that only makes sense for some inputs.
///
/// Distinguishes "the analysis does not apply to this table" from a failure,
/// which is reported through `Err` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Applicability<T> {
    Applicable(T),
    NotApplicable(NotApplicableReason),
}

impl<T> Applicability<T> {
    pub fn is_applicable(&self) -> bool {
        matches!(self, Applicability::Applicable(_))
    }

    /// The result, if the analysis applied.
    pub fn applicable(&self) -> Option<&T> {
        match self {
            Applicability::Applicable(value) => Some(value),
            Applicability::NotApplicable(_) => None,
        }
    }

    /// The reason the analysis was skipped, if it was.
    pub fn reason(&self) -> Option<NotApplicableReason> {
        match self {
            Applicability::Applicable(_) => None,
            Applicability::NotApplicable(reason) => Some(*reason),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Applicability<U> {
        match self {
            Applicability::Applicable(value) => Applicability::Applicable(f(value)),
            Applicability::NotApplicable(reason) => Applicability::NotApplicable(reason),
        }
    }

    pub fn by_ref(&self) -> Applicability<&T> {
        match self {
            Applicability::Applicable(value) => Applicability::Applicable(value),
            Applicability::NotApplicable(reason) => Applicability::NotApplicable(*reason),
        }
    }
}

/// Serializes `(key, value)` pairs as a map, keeping their order.
pub(crate) fn serialize_pairs<S, K, V>(pairs: &[(K, V)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    K: Serialize,
    V: Serialize,
{
    let mut map = serializer.serialize_map(Some(pairs.len()))?;
    for (key, value) in pairs {
        map.serialize_entry(key, value)?;
    }
    map.end()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_is_tagged() {
        let applicable: Applicability<u32> = Applicability::Applicable(3);
        assert_eq!(
            serde_json::to_string(&applicable).unwrap(),
            r#"{"status":"applicable","value":3}"#
        );

        let skipped: Applicability<u32> =
            Applicability::NotApplicable(NotApplicableReason::TooFewNumericColumns {
                found: 1,
                required: 2,
            });
        let json = serde_json::to_value(&skipped).unwrap();
        assert_eq!(json["status"], "not_applicable");
        assert_eq!(json["value"]["kind"], "too_few_numeric_columns");
        assert_eq!(json["value"]["found"], 1);
    }

    #[test]
    fn test_accessors() {
        let skipped: Applicability<u32> =
            Applicability::NotApplicable(NotApplicableReason::ZeroVariance);
        assert!(!skipped.is_applicable());
        assert_eq!(skipped.applicable(), None);
        assert_eq!(skipped.reason(), Some(NotApplicableReason::ZeroVariance));

        let doubled = Applicability::Applicable(2).map(|v| v * 2);
        assert_eq!(doubled.applicable(), Some(&4));
    }

    #[test]
    fn test_reason_display() {
        let reason = NotApplicableReason::TooFewRows {
            found: 1,
            required: 2,
        };
        assert_eq!(reason.to_string(), "1 complete row(s) found, 2 required");
    }
}
