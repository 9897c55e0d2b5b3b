use super::model::{MeasurementTable, SizeSet};
use crate::error::{AnalysisError, Result};

// ---------------------------------------------------------------------------
// RunMatrix – the table cut into complete sweeps
// ---------------------------------------------------------------------------

/// Times arranged as `runs[run][size_index]`, where `size_index` follows the
/// canonical [`SizeSet`] order.
///
/// Each run's rows are placed by their size label, not by their position
/// inside the run, so a run recorded in a different order still lines up
/// with every other run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunMatrix {
    sizes: SizeSet,
    runs: Vec<Vec<f64>>,
}

impl RunMatrix {
    /// Split `table` into contiguous runs of one row per distinct size.
    ///
    /// Fails with [`AnalysisError::IncompleteRun`] when the row count is not
    /// a multiple of the size count; a trailing partial run is never
    /// truncated.  Fails with [`AnalysisError::MisalignedRun`] when a run
    /// contains some size twice.
    pub fn from_table(table: &MeasurementTable) -> Result<Self> {
        let sizes = table.sizes().clone();
        let size_count = sizes.len();
        let row_count = table.len();

        if size_count == 0 || row_count % size_count != 0 {
            return Err(AnalysisError::IncompleteRun {
                rows: row_count,
                sizes: size_count,
            });
        }

        let run_count = row_count / size_count;
        let mut runs = Vec::with_capacity(run_count);

        let blocks = table
            .rows()
            .chunks_exact(size_count)
            .zip(table.size_indices().chunks_exact(size_count));
        for (run, (block, indices)) in blocks.enumerate() {
            let mut slots: Vec<Option<f64>> = vec![None; size_count];
            for (row, &idx) in block.iter().zip(indices) {
                if slots[idx].replace(row.time).is_some() {
                    return Err(AnalysisError::MisalignedRun {
                        run,
                        size: row.size,
                    });
                }
            }
            // S rows, S slots, no duplicates: every slot is filled.
            runs.push(slots.into_iter().flatten().collect());
        }

        log::debug!("Reshaped {row_count} rows into {run_count} runs of {size_count} sizes");
        Ok(RunMatrix { sizes, runs })
    }

    /// Per-run time vectors (`all_data`), each in canonical size order.
    pub fn runs(&self) -> &[Vec<f64>] {
        &self.runs
    }

    pub fn sizes(&self) -> &SizeSet {
        &self.sizes
    }

    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    pub fn size_count(&self) -> usize {
        self.sizes.len()
    }

    /// Times of the size at `size_index`, one per run, in run order.
    pub fn series(&self, size_index: usize) -> Vec<f64> {
        self.runs.iter().map(|run| run[size_index]).collect()
    }

    /// `(size, series)` for every size, in canonical order.
    pub fn per_size_series(&self) -> Vec<(f64, Vec<f64>)> {
        self.sizes
            .iter()
            .enumerate()
            .map(|(i, size)| (size, self.series(i)))
            .collect()
    }
}
