use crate::data::aggregate::Summary;
use crate::data::model::MeasurementTable;
use crate::data::reshape::RunMatrix;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Analysis – every view derived from one loaded table
// ---------------------------------------------------------------------------

/// The loaded table together with its two derived views.  The run matrix
/// and the summary are computed independently (positional runs vs. label
/// grouping); nothing is mutated afterwards.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub table: MeasurementTable,
    pub matrix: RunMatrix,
    pub summary: Summary,
}

impl Analysis {
    pub fn from_table(table: MeasurementTable) -> Result<Self> {
        let matrix = RunMatrix::from_table(&table)?;
        log::info!("Extracted the results for each size under analysis");

        let summary = Summary::from_table(&table);
        log::debug!("Computed statistics for {} sizes", summary.len());

        Ok(Analysis {
            table,
            matrix,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::data::aggregate::{mean, median};
    use crate::data::loader::{load_file, load_reader, LoadOptions};
    use crate::error::AnalysisError;

    const SWEEP: &str = "64,10\n128,20\n256,30\n64,12\n128,22\n256,32\n";

    fn analyze(text: &str) -> Result<Analysis> {
        Analysis::from_table(load_reader(text.as_bytes(), "test", &LoadOptions::default())?)
    }

    #[test]
    fn three_sizes_two_runs_end_to_end() {
        let a = analyze(SWEEP).unwrap();
        assert_eq!(a.matrix.run_count(), 2);
        assert_eq!(a.matrix.run_count() * a.matrix.size_count(), a.table.len());
        for (size, expected) in [(64.0, 11.0), (128.0, 21.0), (256.0, 31.0)] {
            let stats = a.summary.get(size).unwrap();
            assert_eq!(stats.mean, expected);
            assert_eq!(stats.median, expected);
        }
        assert_eq!(a.matrix.series(0), vec![10.0, 12.0]);
        assert_eq!(a.matrix.series(1), vec![20.0, 22.0]);
        assert_eq!(a.matrix.series(2), vec![30.0, 32.0]);
    }

    #[test]
    fn seven_rows_three_sizes_is_incomplete() {
        let err = analyze("64,1\n128,2\n256,3\n64,4\n128,5\n256,6\n64,7\n").unwrap_err();
        assert!(matches!(err, AnalysisError::IncompleteRun { rows: 7, sizes: 3 }));
    }

    #[test]
    fn empty_input_is_malformed() {
        let err = analyze("").unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedInput { .. }));
    }

    #[test]
    fn single_run_mean_equals_median() {
        let a = analyze("64,10\n128,20\n256,30\n").unwrap();
        assert_eq!(a.matrix.run_count(), 1);
        for (size, series) in a.matrix.per_size_series() {
            assert_eq!(series.len(), 1);
            let stats = a.summary.get(size).unwrap();
            assert_eq!(stats.mean, series[0]);
            assert_eq!(stats.median, series[0]);
        }
    }

    #[test]
    fn views_agree_when_runs_are_recorded_out_of_order() {
        let a = analyze("64,10\n128,20\n256,30\n128,24\n256,33\n64,15\n256,31\n64,11\n128,21\n").unwrap();
        assert_eq!(a.summary.sizes(), a.matrix.sizes().as_slice());
        for (size, series) in a.matrix.per_size_series() {
            let stats = a.summary.get(size).unwrap();
            assert_eq!(stats.mean, mean(&series));
            assert_eq!(stats.median, median(&series));
        }
    }

    #[test]
    fn repeated_runs_on_same_file_are_identical() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(SWEEP.as_bytes()).unwrap();
        file.flush().unwrap();

        let load = || Analysis::from_table(load_file(file.path(), &LoadOptions::default()).unwrap()).unwrap();
        assert_eq!(load().summary, load().summary);
    }
}
