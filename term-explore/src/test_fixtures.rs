//! Canned tables for unit tests.
//!
//! Each fixture is small enough to verify by hand and exercises one shape of
//! input the analyzers must handle: mixed types, missing values, constant
//! columns, or no numeric data at all.

use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Float64Array, StringArray};

use crate::table::{SemanticType, Table};

fn build(name: &str, columns: Vec<(&str, SemanticType, ArrayRef)>) -> Table {
    Table::try_new(
        name,
        columns
            .into_iter()
            .map(|(column, semantic_type, array)| (column.to_string(), semantic_type, array))
            .collect(),
    )
    .expect("fixture columns are consistent")
}

/// Five rows with a numeric, a categorical, and a boolean column.
///
/// `price` and `in_stock` each have one missing value.
pub fn mixed_table() -> Table {
    build(
        "mixed.csv",
        vec![
            (
                "price",
                SemanticType::Numeric,
                Arc::new(Float64Array::from(vec![
                    Some(1.0),
                    Some(2.0),
                    None,
                    Some(3.0),
                    Some(4.0),
                ])),
            ),
            (
                "city",
                SemanticType::Categorical,
                Arc::new(StringArray::from(vec![
                    "Oslo", "Bergen", "Oslo", "Tromsø", "Bergen",
                ])),
            ),
            (
                "in_stock",
                SemanticType::Boolean,
                Arc::new(BooleanArray::from(vec![
                    Some(true),
                    None,
                    Some(false),
                    Some(true),
                    Some(true),
                ])),
            ),
        ],
    )
}

/// Six rows: a constant column, an entirely missing column, and a numeric
/// column with one clear outlier (100).
pub fn constant_and_missing_table() -> Table {
    build(
        "constant.csv",
        vec![
            (
                "constant",
                SemanticType::Numeric,
                Arc::new(Float64Array::from(vec![5.0; 6])),
            ),
            (
                "empty",
                SemanticType::Unknown,
                Arc::new(StringArray::from(vec![None::<&str>; 6])),
            ),
            (
                "value",
                SemanticType::Numeric,
                Arc::new(Float64Array::from(vec![1.0, 2.0, 3.0, 4.0, 100.0, 5.0])),
            ),
        ],
    )
}

/// Four rows with a single text column.
pub fn categorical_only_table() -> Table {
    build(
        "names.csv",
        vec![(
            "name",
            SemanticType::Categorical,
            Arc::new(StringArray::from(vec!["ada", "grace", "linus", "ada"])),
        )],
    )
}

/// Five rows, three numeric columns, no missing values and no outliers.
pub fn numeric_table() -> Table {
    build(
        "numeric.csv",
        vec![
            (
                "a",
                SemanticType::Numeric,
                Arc::new(Float64Array::from(vec![1.0, 2.0, 3.0, 4.0, 5.0])),
            ),
            (
                "b",
                SemanticType::Numeric,
                Arc::new(Float64Array::from(vec![2.0, 1.0, 4.0, 3.0, 5.0])),
            ),
            (
                "c",
                SemanticType::Numeric,
                Arc::new(Float64Array::from(vec![10.0, 8.0, 9.0, 7.0, 6.0])),
            ),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_shapes() {
        assert_eq!(mixed_table().num_rows(), 5);
        assert_eq!(constant_and_missing_table().num_rows(), 6);
        assert_eq!(categorical_only_table().num_columns(), 1);
        assert_eq!(numeric_table().numeric_columns().len(), 3);
    }
}
