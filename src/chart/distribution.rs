use std::path::PathBuf;

use plotters::coord::Shift;
use plotters::prelude::*;

use super::{padded_range, render, Figure, RenderOptions, AXIS_LABEL_FONT_SIZE, TICK_LABEL_FONT_SIZE, TITLE_FONT_SIZE};
use crate::data::model::SizeSet;
use crate::error::{AnalysisError, Result};

/// One box-and-whisker per size over all runs.  Outliers are not drawn.
///
/// `all_data[run]` must hold one time per size, in `sizes` order.
pub fn render_distribution(
    all_data: &[Vec<f64>],
    sizes: &SizeSet,
    name: &str,
    options: &RenderOptions,
) -> Result<PathBuf> {
    let labels = sizes.labels();
    let long = long_form(all_data, labels.len()).map_err(|e| AnalysisError::render(name, e))?;

    let mut groups: Vec<Vec<f64>> = vec![Vec::new(); labels.len()];
    for (idx, time) in long {
        groups[idx].push(time);
    }
    let boxes = groups
        .iter()
        .map(|times| BoxStats::of(times))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| AnalysisError::render(name, "a size has no times"))?;

    render(&Distribution { labels, groups, boxes }, name, options)
}

/// `(size_index, time)` pairs: each run's vector laid against the size axis.
fn long_form(all_data: &[Vec<f64>], size_count: usize) -> std::result::Result<Vec<(usize, f64)>, String> {
    if all_data.is_empty() || size_count == 0 {
        return Err("no runs to plot".to_string());
    }
    let mut pairs = Vec::with_capacity(all_data.len() * size_count);
    for (run, times) in all_data.iter().enumerate() {
        if times.len() != size_count {
            return Err(format!(
                "run {run} has {} times for {size_count} sizes",
                times.len()
            ));
        }
        pairs.extend(times.iter().copied().enumerate());
    }
    Ok(pairs)
}

// ---------------------------------------------------------------------------
// BoxStats – what one box-and-whisker shows
// ---------------------------------------------------------------------------

/// Quartiles (linearly interpolated) and whisker ends.
///
/// Whiskers stop at the most extreme sample within 1.5×IQR of the box, so
/// they never reach past the data.
#[derive(Debug, Clone, Copy, PartialEq)]
struct BoxStats {
    lower: f64,
    q1: f64,
    median: f64,
    q3: f64,
    upper: f64,
}

impl BoxStats {
    fn of(times: &[f64]) -> Option<Self> {
        if times.is_empty() {
            return None;
        }
        let mut sorted = times.to_vec();
        sorted.sort_by(f64::total_cmp);

        let q1 = percentile(&sorted, 0.25);
        let q3 = percentile(&sorted, 0.75);
        let reach = 1.5 * (q3 - q1);
        let lower = sorted.iter().copied().find(|&t| t >= q1 - reach).unwrap_or(q1);
        let upper = sorted.iter().rev().copied().find(|&t| t <= q3 + reach).unwrap_or(q3);

        Some(BoxStats {
            lower,
            q1,
            median: percentile(&sorted, 0.5),
            q3,
            upper,
        })
    }
}

/// `p`-quantile of sorted, non-empty data with linear interpolation.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = p * (sorted.len() - 1) as f64;
    let below = rank.floor() as usize;
    let above = rank.ceil() as usize;
    sorted[below] + (sorted[above] - sorted[below]) * (rank - below as f64)
}

struct Distribution {
    labels: Vec<String>,
    groups: Vec<Vec<f64>>,
    boxes: Vec<BoxStats>,
}

// Half widths in x units; one size occupies one unit.
const BOX_HALF_WIDTH: f64 = 0.4;
const CAP_HALF_WIDTH: f64 = 0.2;

impl Figure for Distribution {
    fn dimensions(&self) -> (u32, u32) {
        (2400, 800)
    }

    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>) -> anyhow::Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let y_range = padded_range(self.groups.iter().flatten().copied())
            .ok_or_else(|| anyhow::anyhow!("no times to plot"))?;
        let size_count = self.labels.len();

        let mut chart = ChartBuilder::on(root)
            .caption("time distribution per size", ("sans-serif", TITLE_FONT_SIZE))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d(-0.5..(size_count as f64 - 0.5), y_range)?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(size_count)
            .x_label_formatter(&|v: &f64| self.label_at(*v))
            .x_desc("size (bytes)")
            .y_desc("time (cycles)")
            .label_style(("sans-serif", TICK_LABEL_FONT_SIZE))
            .axis_desc_style(("sans-serif", AXIS_LABEL_FONT_SIZE))
            .draw()?;

        let boxes = || self.boxes.iter().enumerate().map(|(i, b)| (i as f64, b));

        chart.draw_series(boxes().map(|(x, b)| {
            Rectangle::new(
                [(x - BOX_HALF_WIDTH, b.q1), (x + BOX_HALF_WIDTH, b.q3)],
                BLUE.mix(0.25).filled(),
            )
        }))?;
        chart.draw_series(boxes().map(|(x, b)| {
            Rectangle::new(
                [(x - BOX_HALF_WIDTH, b.q1), (x + BOX_HALF_WIDTH, b.q3)],
                BLUE.stroke_width(1),
            )
        }))?;
        chart.draw_series(boxes().flat_map(|(x, b)| {
            [
                vec![(x - BOX_HALF_WIDTH, b.median), (x + BOX_HALF_WIDTH, b.median)],
                vec![(x, b.q3), (x, b.upper)],
                vec![(x, b.q1), (x, b.lower)],
                vec![(x - CAP_HALF_WIDTH, b.upper), (x + CAP_HALF_WIDTH, b.upper)],
                vec![(x - CAP_HALF_WIDTH, b.lower), (x + CAP_HALF_WIDTH, b.lower)],
            ]
            .map(|points| PathElement::new(points, BLUE.stroke_width(2)))
        }))?;

        Ok(())
    }
}

impl Distribution {
    /// Size label for an x tick that falls on a box centre.
    fn label_at(&self, x: f64) -> String {
        let nearest = x.round();
        if (x - nearest).abs() > 1e-6 || nearest < 0.0 {
            return String::new();
        }
        self.labels.get(nearest as usize).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartFormat;
    use crate::data::model::{Measurement, MeasurementTable};

    fn sizes(values: &[f64]) -> SizeSet {
        SizeSet::from_rows(&values.iter().map(|&s| Measurement::new(s, 0.0)).collect::<Vec<_>>())
    }

    #[test]
    fn long_form_pairs_times_with_size_positions() {
        let all = vec![vec![10.0, 20.0], vec![12.0, 22.0]];
        assert_eq!(
            long_form(&all, 2).unwrap(),
            vec![(0, 10.0), (1, 20.0), (0, 12.0), (1, 22.0)]
        );
    }

    #[test]
    fn whiskers_stop_at_the_last_sample_inside_the_fences() {
        // q1 = 11, q3 = 13, IQR = 2: fences at 8 and 16.
        let b = BoxStats::of(&[10.0, 11.0, 12.0, 13.0, 14.0, 100.0, 11.0, 13.0, 12.0]).unwrap();
        assert_eq!((b.q1, b.median, b.q3), (11.0, 12.0, 13.0));
        assert_eq!(b.lower, 10.0);
        assert_eq!(b.upper, 14.0);
    }

    #[test]
    fn quartiles_interpolate_between_samples() {
        let b = BoxStats::of(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!((b.q1, b.median, b.q3), (1.75, 2.5, 3.25));
        assert_eq!((b.lower, b.upper), (1.0, 4.0));

        let single = BoxStats::of(&[7.0]).unwrap();
        assert_eq!((single.lower, single.q1, single.q3, single.upper), (7.0, 7.0, 7.0, 7.0));
        assert!(BoxStats::of(&[]).is_none());
    }

    #[test]
    fn tick_labels_only_on_box_centres() {
        let d = Distribution {
            labels: vec!["64".to_string(), "128".to_string()],
            groups: Vec::new(),
            boxes: Vec::new(),
        };
        assert_eq!(d.label_at(1.0), "128");
        assert_eq!(d.label_at(0.5), "");
        assert_eq!(d.label_at(-0.5), "");
        assert_eq!(d.label_at(2.0), "");
    }

    #[test]
    fn ragged_run_is_a_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let options = RenderOptions {
            output_dir: dir.path().to_path_buf(),
            format: ChartFormat::Svg,
        };
        let all = vec![vec![10.0, 20.0], vec![12.0]];
        let err = render_distribution(&all, &sizes(&[64.0, 128.0]), "boxplot", &options).unwrap_err();
        assert!(matches!(err, AnalysisError::Render { .. }), "{err}");
    }

    #[test]
    fn empty_data_is_a_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let options = RenderOptions {
            output_dir: dir.path().to_path_buf(),
            format: ChartFormat::Svg,
        };
        let err = render_distribution(&[], &sizes(&[64.0]), "boxplot", &options).unwrap_err();
        assert!(matches!(err, AnalysisError::Render { .. }));
    }

    #[test]
    fn writes_boxplot_svg() {
        let dir = tempfile::tempdir().unwrap();
        let options = RenderOptions {
            output_dir: dir.path().to_path_buf(),
            format: ChartFormat::Svg,
        };
        let table = MeasurementTable::from_rows(
            [(64.0, 10.0), (128.0, 20.0), (64.0, 12.0), (128.0, 22.0), (64.0, 50.0), (128.0, 21.0)]
                .iter()
                .map(|&(s, t)| Measurement::new(s, t))
                .collect(),
        );
        let matrix = crate::data::reshape::RunMatrix::from_table(&table).unwrap();
        let path = render_distribution(matrix.runs(), matrix.sizes(), "boxplot", &options).unwrap();
        let svg = std::fs::read_to_string(path).unwrap();
        assert!(svg.contains("<svg"));
    }
}
