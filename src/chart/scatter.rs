use std::path::PathBuf;

use plotters::coord::Shift;
use plotters::prelude::*;

use super::{log_range, render, Figure, RenderOptions, AXIS_LABEL_FONT_SIZE, TICK_LABEL_FONT_SIZE, TITLE_FONT_SIZE};
use crate::color::generate_palette;
use crate::data::model::{format_size, SizeSet};
use crate::error::{AnalysisError, Result};

/// Every data point: one scatter series per run on log-log axes
/// (base-2 sizes, base-10 times).
pub fn render_scatter_loglog(
    all_data: &[Vec<f64>],
    sizes: &SizeSet,
    name: &str,
    options: &RenderOptions,
) -> Result<PathBuf> {
    if all_data.is_empty() {
        return Err(AnalysisError::render(name, "no runs to plot"));
    }
    if let Some((run, times)) = all_data
        .iter()
        .enumerate()
        .find(|(_, times)| times.len() != sizes.len())
    {
        return Err(AnalysisError::render(
            name,
            format!("run {run} has {} times for {} sizes", times.len(), sizes.len()),
        ));
    }

    let figure = AllRuns {
        sizes: sizes.as_slice().to_vec(),
        runs: all_data.to_vec(),
    };
    render(&figure, name, options)
}

struct AllRuns {
    sizes: Vec<f64>,
    runs: Vec<Vec<f64>>,
}

impl Figure for AllRuns {
    fn dimensions(&self) -> (u32, u32) {
        (2400, 800)
    }

    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>) -> anyhow::Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let x_range = log_range(self.sizes.iter().copied(), 2.0, "size")?;
        let y_range = log_range(self.runs.iter().flatten().copied(), 1.5, "time")?;

        let mut chart = ChartBuilder::on(root)
            .caption("all data points", ("sans-serif", TITLE_FONT_SIZE))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d(x_range.log_scale().base(2.0), y_range.log_scale())?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_label_formatter(&|x: &f64| format_size(x.round()))
            .x_desc("size (bytes)")
            .y_desc("time (cycles)")
            .label_style(("sans-serif", TICK_LABEL_FONT_SIZE))
            .axis_desc_style(("sans-serif", AXIS_LABEL_FONT_SIZE))
            .draw()?;

        let palette = generate_palette(self.runs.len());
        for (times, color) in self.runs.iter().zip(palette) {
            chart.draw_series(
                self.sizes
                    .iter()
                    .zip(times)
                    .map(|(&size, &time)| Circle::new((size, time), 3, color.filled())),
            )?;
        }

        Ok(())
    }
}
