/// Chart rendering: every chart is a [`Figure`] drawn onto a file backend.
///
/// ```text
///   Summary ──────► tendency      means.<ext>, medians.<ext>
///   RunMatrix ──┬─► distribution  boxplot.<ext>
///               └─► scatter       all_runs.<ext>
/// ```
pub mod distribution;
pub mod scatter;
pub mod tendency;

use std::ops::Range;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::data::aggregate::{Statistic, Summary};
use crate::data::reshape::RunMatrix;
use crate::error::{AnalysisError, Result};

pub use distribution::render_distribution;
pub use scatter::render_scatter_loglog;
pub use tendency::render_central_tendency;

// Font sizes
const TITLE_FONT_SIZE: u32 = 28;
const AXIS_LABEL_FONT_SIZE: u32 = 20;
const TICK_LABEL_FONT_SIZE: u32 = 16;

// ---------------------------------------------------------------------------
// Output options
// ---------------------------------------------------------------------------

/// File format of the written charts.
///
/// PNG exists only with the `ttf` feature: without a font stack plotters
/// cannot put text on a bitmap at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ChartFormat {
    #[default]
    Svg,
    #[cfg(feature = "ttf")]
    Png,
}

impl ChartFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ChartFormat::Svg => "svg",
            #[cfg(feature = "ttf")]
            ChartFormat::Png => "png",
        }
    }
}

/// Where and how charts are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub output_dir: PathBuf,
    pub format: ChartFormat,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            output_dir: PathBuf::from("."),
            format: ChartFormat::Svg,
        }
    }
}

impl RenderOptions {
    /// `<output_dir>/<name>.<ext>`
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.output_dir
            .join(format!("{name}.{}", self.format.extension()))
    }
}

// ---------------------------------------------------------------------------
// Figure – one drawable chart
// ---------------------------------------------------------------------------

/// A chart that can draw itself onto any plotters backend.
pub trait Figure {
    /// Pixel size of the whole figure.
    fn dimensions(&self) -> (u32, u32);

    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>) -> anyhow::Result<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static;
}

/// Draw `figure` to `<output_dir>/<name>.<ext>` and return the written path.
pub fn render<F: Figure>(figure: &F, name: &str, options: &RenderOptions) -> Result<PathBuf> {
    let path = options.path_for(name);
    let dimensions = figure.dimensions();

    let outcome = match options.format {
        ChartFormat::Svg => {
            let root = SVGBackend::new(&path, dimensions).into_drawing_area();
            draw_and_present(figure, &root)
        }
        #[cfg(feature = "ttf")]
        ChartFormat::Png => {
            let root = BitMapBackend::new(&path, dimensions).into_drawing_area();
            draw_and_present(figure, &root)
        }
    };
    outcome.map_err(|e| AnalysisError::render(name, format!("{e:#}")))?;

    log::info!("Generated: {}", path.display());
    Ok(path)
}

fn draw_and_present<F, DB>(figure: &F, root: &DrawingArea<DB, Shift>) -> anyhow::Result<()>
where
    F: Figure,
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    figure.draw(root)?;
    root.present()?;
    Ok(())
}

/// Render the full chart set: `means`, `medians`, `boxplot`, `all_runs`.
///
/// The first failure aborts the remaining charts.
pub fn render_all(
    summary: &Summary,
    matrix: &RunMatrix,
    options: &RenderOptions,
) -> Result<Vec<PathBuf>> {
    ensure_dir(&options.output_dir)?;

    Ok(vec![
        render_central_tendency(summary, Statistic::Mean, "means", options)?,
        render_central_tendency(summary, Statistic::Median, "medians", options)?,
        render_distribution(matrix.runs(), matrix.sizes(), "boxplot", options)?,
        render_scatter_loglog(matrix.runs(), matrix.sizes(), "all_runs", options)?,
    ])
}

fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| AnalysisError::Render {
        chart: "output directory".to_string(),
        message: format!("cannot create {}: {e}", dir.display()),
    })
}

// ---------------------------------------------------------------------------
// Axis helpers
// ---------------------------------------------------------------------------

/// `min..max` of `values` widened by 5% on each side.  A flat range is
/// widened around its single value so the axis is never empty.
pub(crate) fn padded_range(values: impl IntoIterator<Item = f64>) -> Option<Range<f64>> {
    let (min, max) = values
        .into_iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !min.is_finite() || !max.is_finite() {
        return None;
    }
    let span = max - min;
    let pad = if span > 0.0 {
        span * 0.05
    } else if min != 0.0 {
        min.abs() * 0.05
    } else {
        1.0
    };
    Some((min - pad)..(max + pad))
}

/// `min..max` for a log axis: every value must be positive.  The range is
/// widened by `factor` on both ends.
pub(crate) fn log_range(
    values: impl IntoIterator<Item = f64>,
    factor: f64,
    axis: &str,
) -> anyhow::Result<Range<f64>> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        if v <= 0.0 {
            anyhow::bail!("{axis} value {v} cannot be shown on a log scale");
        }
        min = min.min(v);
        max = max.max(v);
    }
    if !min.is_finite() || !max.is_finite() {
        anyhow::bail!("no {axis} values to plot");
    }
    Ok((min / factor)..(max * factor))
}
