//! Ward dendrogram drawing.

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::RenderError;
use crate::analyzers::Dendrogram;

/// Horizontal distance between neighbouring leaves.
const LEAF_SPACING: f64 = 10.0;
/// Leaf labels are dropped above this many leaves.
const MAX_LEAF_LABELS: usize = 60;

/// Position of every node (leaves then merges) in chart coordinates.
///
/// Leaves sit at height zero in drawing order; a merged cluster sits midway
/// between its children at its merge distance.
pub(crate) fn node_positions(tree: &Dendrogram) -> Vec<(f64, f64)> {
    let mut positions = vec![(0.0, 0.0); tree.leaf_count + tree.merges.len()];
    for (slot, leaf) in tree.leaf_order().into_iter().enumerate() {
        positions[leaf] = (LEAF_SPACING * slot as f64 + LEAF_SPACING / 2.0, 0.0);
    }
    for (index, merge) in tree.merges.iter().enumerate() {
        let x = (positions[merge.left].0 + positions[merge.right].0) / 2.0;
        positions[tree.leaf_count + index] = (x, merge.distance);
    }
    positions
}

/// Draws the full merge tree with U-shaped links.
pub fn dendrogram(tree: &Dendrogram, size: (u32, u32)) -> Result<String, RenderError> {
    let positions = node_positions(tree);
    let top = tree.max_distance().max(f64::EPSILON) * 1.05;
    let width = LEAF_SPACING * tree.leaf_count.max(1) as f64;
    let label_band = top * 0.06;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Hierarchical Clustering Dendrogram", ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0f64..width, -label_band..top)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(0)
            .x_desc("Row")
            .y_desc("Ward distance")
            .draw()?;

        chart.draw_series(tree.merges.iter().enumerate().map(|(index, merge)| {
            let (_, height) = positions[tree.leaf_count + index];
            let (left_x, left_height) = positions[merge.left];
            let (right_x, right_height) = positions[merge.right];
            PathElement::new(
                vec![
                    (left_x, left_height),
                    (left_x, height),
                    (right_x, height),
                    (right_x, right_height),
                ],
                BLUE.stroke_width(1),
            )
        }))?;

        if tree.leaf_count <= MAX_LEAF_LABELS {
            let style = ("sans-serif", 11)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Center));
            chart.draw_series((0..tree.leaf_count).map(|leaf| {
                let source_row = tree.rows.get(leaf).copied().unwrap_or(leaf);
                Text::new(
                    source_row.to_string(),
                    (positions[leaf].0, -label_band / 2.0),
                    style.clone(),
                )
            }))?;
        }

        root.present()?;
    }
    Ok(svg)
}
