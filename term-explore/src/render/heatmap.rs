//! Annotated correlation heatmap.

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::RenderError;
use crate::analyzers::CorrelationMatrix;

const MISSING_CELL: RGBColor = RGBColor(220, 220, 220);
const COLD: (f64, f64, f64) = (59.0, 76.0, 192.0);
const NEUTRAL: (f64, f64, f64) = (242.0, 242.0, 242.0);
const HOT: (f64, f64, f64) = (180.0, 4.0, 38.0);

/// Maps a coefficient in `[-1, 1]` onto a blue, white, red scale.
pub(crate) fn diverging_color(value: f64) -> RGBColor {
    let t = value.clamp(-1.0, 1.0);
    let (target, weight) = if t < 0.0 { (COLD, -t) } else { (HOT, t) };
    let mix = |from: f64, to: f64| (from + (to - from) * weight).round() as u8;
    RGBColor(
        mix(NEUTRAL.0, target.0),
        mix(NEUTRAL.1, target.1),
        mix(NEUTRAL.2, target.2),
    )
}

/// Draws `matrix` as a square grid with two-decimal cell annotations.
///
/// Row 0 is drawn at the top, so the diagonal runs from top-left to
/// bottom-right. Undefined coefficients are drawn as grey, unlabeled cells.
pub fn correlation_heatmap(
    matrix: &CorrelationMatrix,
    size: (u32, u32),
) -> Result<String, RenderError> {
    let n = matrix.size() as i32;
    let cells: Vec<(i32, i32)> = (0..n).flat_map(|i| (0..n).map(move |j| (i, j))).collect();
    let label = |value: &SegmentValue<i32>, flipped: bool| match value {
        SegmentValue::CenterOf(index) => {
            let index = if flipped { n - 1 - index } else { *index };
            matrix
                .columns
                .get(index as usize)
                .cloned()
                .unwrap_or_default()
        }
        _ => String::new(),
    };

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Correlation Matrix", ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(140)
            .build_cartesian_2d((0..n).into_segmented(), (0..n).into_segmented())?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(n as usize)
            .y_labels(n as usize)
            .x_label_formatter(&|v| label(v, false))
            .y_label_formatter(&|v| label(v, true))
            .draw()?;

        chart.draw_series(cells.iter().map(|&(i, j)| {
            let y = n - 1 - i;
            let color = matrix
                .get(i as usize, j as usize)
                .map_or(MISSING_CELL, diverging_color);
            Rectangle::new(
                [
                    (SegmentValue::Exact(j), SegmentValue::Exact(y)),
                    (SegmentValue::Exact(j + 1), SegmentValue::Exact(y + 1)),
                ],
                color.filled(),
            )
        }))?;

        let text_style = ("sans-serif", 14)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center));
        chart.draw_series(cells.iter().filter_map(|&(i, j)| {
            let value = matrix.get(i as usize, j as usize)?;
            Some(Text::new(
                format!("{value:.2}"),
                (SegmentValue::CenterOf(j), SegmentValue::CenterOf(n - 1 - i)),
                text_style.clone(),
            ))
        }))?;

        root.present()?;
    }
    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diverging_scale_endpoints() {
        assert_eq!(diverging_color(-1.0), RGBColor(59, 76, 192));
        assert_eq!(diverging_color(0.0), RGBColor(242, 242, 242));
        assert_eq!(diverging_color(1.0), RGBColor(180, 4, 38));
        assert_eq!(diverging_color(7.0), diverging_color(1.0));
    }

    #[test]
    fn test_heatmap_contains_annotations() {
        let matrix = CorrelationMatrix {
            columns: vec!["height".into(), "weight".into()],
            values: vec![vec![Some(1.0), Some(-0.25)], vec![Some(-0.25), Some(1.0)]],
        };
        let svg = correlation_heatmap(&matrix, (400, 400)).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("-0.25"));
        assert!(svg.contains("weight"));
    }
}
