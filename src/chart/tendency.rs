use std::path::PathBuf;

use plotters::coord::Shift;
use plotters::prelude::*;

use super::{padded_range, render, Figure, RenderOptions, AXIS_LABEL_FONT_SIZE, TICK_LABEL_FONT_SIZE, TITLE_FONT_SIZE};
use crate::data::aggregate::{Statistic, Summary};
use crate::data::model::format_size;
use crate::error::Result;

/// Plot size → mean (or median) as a line (upper panel) and as a scatter
/// (lower panel) over the same x range.
pub fn render_central_tendency(
    summary: &Summary,
    statistic: Statistic,
    name: &str,
    options: &RenderOptions,
) -> Result<PathBuf> {
    let figure = CentralTendency {
        points: summary.points(statistic),
        statistic,
    };
    render(&figure, name, options)
}

struct CentralTendency {
    points: Vec<(f64, f64)>,
    statistic: Statistic,
}

impl Figure for CentralTendency {
    fn dimensions(&self) -> (u32, u32) {
        (800, 640)
    }

    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>) -> anyhow::Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let x_range = padded_range(self.points.iter().map(|p| p.0))
            .ok_or_else(|| anyhow::anyhow!("no sizes to plot"))?;
        let y_range = padded_range(self.points.iter().map(|p| p.1))
            .ok_or_else(|| anyhow::anyhow!("no {} values to plot", self.statistic.name()))?;

        let panels = root.split_evenly((2, 1));
        let y_desc = format!("{} time (cycles)", self.statistic.name());

        let mut line_chart = ChartBuilder::on(&panels[0])
            .caption(
                format!("{} time per size", self.statistic.name()),
                ("sans-serif", TITLE_FONT_SIZE),
            )
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(70)
            .build_cartesian_2d(x_range.clone(), y_range.clone())?;

        line_chart
            .configure_mesh()
            .x_label_formatter(&|x: &f64| format_size(*x))
            .y_desc(y_desc.as_str())
            .label_style(("sans-serif", TICK_LABEL_FONT_SIZE))
            .axis_desc_style(("sans-serif", AXIS_LABEL_FONT_SIZE))
            .draw()?;

        line_chart.draw_series(LineSeries::new(self.points.iter().copied(), &BLUE))?;

        let mut scatter_chart = ChartBuilder::on(&panels[1])
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(x_range, y_range)?;

        scatter_chart
            .configure_mesh()
            .x_label_formatter(&|x: &f64| format_size(*x))
            .x_desc("size (bytes)")
            .y_desc(y_desc.as_str())
            .label_style(("sans-serif", TICK_LABEL_FONT_SIZE))
            .axis_desc_style(("sans-serif", AXIS_LABEL_FONT_SIZE))
            .draw()?;

        scatter_chart.draw_series(
            self.points
                .iter()
                .map(|&p| Circle::new(p, 4, BLUE.filled())),
        )?;

        Ok(())
    }
}
