use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::data::aggregate::{SizeStats, Summary};
use crate::data::model::format_size;
use crate::data::reshape::RunMatrix;
use crate::error::{AnalysisError, Result};

// ---------------------------------------------------------------------------
// Console diagnostics
// ---------------------------------------------------------------------------

/// Run and size counts, printed before any chart is drawn.
pub fn write_counts<W: Write>(out: &mut W, matrix: &RunMatrix) -> io::Result<()> {
    writeln!(
        out,
        "In total the experiment was repeated {} times",
        matrix.run_count()
    )?;
    writeln!(
        out,
        "In total {} different values were tested",
        matrix.size_count()
    )
}

/// Per-size mean / median table.
pub fn write_summary_table<W: Write>(out: &mut W, summary: &Summary) -> io::Result<()> {
    writeln!(
        out,
        "{:>14} {:>8} {:>14} {:>14} {:>14} {:>14}",
        "size", "samples", "mean", "median", "min", "max"
    )?;
    for e in summary.entries() {
        writeln!(
            out,
            "{:>14} {:>8} {:>14.2} {:>14.2} {:>14.2} {:>14.2}",
            format_size(e.size),
            e.samples,
            e.mean,
            e.median,
            e.min,
            e.max
        )?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON summary
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct SummaryReport<'a> {
    runs: usize,
    sizes: usize,
    stats: &'a [SizeStats],
}

/// Write the summary as pretty-printed JSON.
pub fn write_summary_json(path: &Path, summary: &Summary, matrix: &RunMatrix) -> Result<()> {
    let report_err = |message: String| AnalysisError::Report {
        path: path.display().to_string(),
        message,
    };

    let file = File::create(path).map_err(|e| report_err(e.to_string()))?;
    let mut writer = BufWriter::new(file);
    let report = SummaryReport {
        runs: matrix.run_count(),
        sizes: matrix.size_count(),
        stats: summary.entries(),
    };
    serde_json::to_writer_pretty(&mut writer, &report).map_err(|e| report_err(e.to_string()))?;
    writer.flush().map_err(|e| report_err(e.to_string()))?;

    log::info!("Wrote summary to {}", path.display());
    Ok(())
}
