//! Scatter plots of the PCA projection and of density clusters.

use std::ops::Range;

use arrow::array::{Array, Float64Array};
use plotters::prelude::*;

use super::RenderError;
use crate::analyzers::{Projection, CLUSTER_COLUMN, NOISE};
use crate::table::{ColumnData, Table};

/// Axis range covering `values` with a small margin on both sides.
fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return -1.0..1.0;
    }
    let span = max - min;
    let pad = if span > 0.0 { span * 0.05 } else { 1.0 };
    (min - pad)..(max + pad)
}

/// Fill style for a cluster label. Noise is black.
pub(crate) fn cluster_style(label: i32, cluster_count: usize) -> ShapeStyle {
    if label == NOISE {
        return BLACK.filled();
    }
    let hue = label as f64 / cluster_count.max(1) as f64;
    HSLColor(hue * 0.85, 0.7, 0.45).filled()
}

/// Scatter of the first two principal components.
pub fn pca_scatter(projection: &Projection, size: (u32, u32)) -> Result<String, RenderError> {
    let [first, second] = projection.explained_variance_ratio;
    let x_range = padded_range(projection.coordinates.iter().map(|p| p[0]));
    let y_range = padded_range(projection.coordinates.iter().map(|p| p[1]));

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("PCA Plot", ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, y_range)?;

        chart
            .configure_mesh()
            .x_desc(format!("Principal Component 1 ({:.1}%)", first * 100.0))
            .y_desc(format!("Principal Component 2 ({:.1}%)", second * 100.0))
            .draw()?;

        chart.draw_series(
            projection
                .coordinates
                .iter()
                .map(|&[x, y]| Circle::new((x, y), 4, BLUE.mix(0.7).filled())),
        )?;

        root.present()?;
    }
    Ok(svg)
}

/// Reads the trailing label column of a clustered view.
fn view_labels(view: &Table) -> Result<Vec<i32>, RenderError> {
    let index = view
        .num_columns()
        .checked_sub(1)
        .filter(|&i| view.column_name(i) == CLUSTER_COLUMN)
        .ok_or_else(|| {
            RenderError::Drawing(format!("table has no trailing '{CLUSTER_COLUMN}' column"))
        })?;
    let column = view
        .column(index)
        .map_err(|e| RenderError::Drawing(e.to_string()))?;
    (0..view.num_rows())
        .map(|row| {
            column
                .display_value(row)
                .and_then(|label| label.parse::<i32>().ok())
                .ok_or_else(|| RenderError::Drawing(format!("row {row} has no cluster label")))
        })
        .collect()
}

fn numeric_array(view: &Table, index: usize) -> Result<&Float64Array, RenderError> {
    match view.column(index) {
        Ok(ColumnData::Numeric(array)) => Ok(array),
        _ => Err(RenderError::Drawing(format!(
            "column '{}' is not numeric",
            view.column_name(index)
        ))),
    }
}

/// Scatter of a clustered view on its first two numeric columns, one color
/// per value of the trailing `cluster` column. With a single numeric column
/// the row position is used as the x axis.
///
/// Values are drawn in their original units.
pub fn cluster_scatter(view: &Table, size: (u32, u32)) -> Result<String, RenderError> {
    let labels = view_labels(view)?;
    let axes = view
        .numeric_columns()
        .into_iter()
        .take(2)
        .map(|index| {
            numeric_array(view, index).map(|values| (view.column_name(index).to_string(), values))
        })
        .collect::<Result<Vec<_>, RenderError>>()?;

    // Rows with a missing coordinate stay in place as `None` to keep labels aligned.
    let (x_desc, y_desc, points): (String, String, Vec<Option<(f64, f64)>>) = match axes[..] {
        [] => return Err(RenderError::Drawing("no numeric columns to plot".to_string())),
        [(ref name, values)] => (
            "Row".to_string(),
            name.clone(),
            (0..view.num_rows())
                .map(|row| (!values.is_null(row)).then(|| (row as f64, values.value(row))))
                .collect(),
        ),
        [(ref x_name, xs), (ref y_name, ys), ..] => (
            x_name.clone(),
            y_name.clone(),
            (0..view.num_rows())
                .map(|row| {
                    (!xs.is_null(row) && !ys.is_null(row)).then(|| (xs.value(row), ys.value(row)))
                })
                .collect(),
        ),
    };

    let mut legend: Vec<i32> = labels.clone();
    legend.sort_unstable();
    legend.dedup();
    let cluster_count = legend.iter().filter(|&&label| label != NOISE).count();
    // Clusters first, noise last in the legend.
    legend.sort_by_key(|&label| (label == NOISE, label));

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("DBSCAN Clustering", ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(60)
            .build_cartesian_2d(
                padded_range(points.iter().flatten().map(|p| p.0)),
                padded_range(points.iter().flatten().map(|p| p.1)),
            )?;

        chart.configure_mesh().x_desc(x_desc).y_desc(y_desc).draw()?;

        for &label in &legend {
            let style = cluster_style(label, cluster_count);
            let name = if label == NOISE {
                "noise".to_string()
            } else {
                format!("cluster {label}")
            };
            chart
                .draw_series(
                    points
                        .iter()
                        .zip(&labels)
                        .filter(|&(_, &l)| l == label)
                        .filter_map(|(&p, _)| p)
                        .map(|p| Circle::new(p, 4, style)),
                )?
                .label(name)
                .legend(move |(x, y)| Circle::new((x, y), 4, style));
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;

        root.present()?;
    }
    Ok(svg)
}
