use serde::Serialize;

use super::model::{MeasurementTable, SizeSet};

// ---------------------------------------------------------------------------
// SizeStats – central tendency of one size
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SizeStats {
    pub size: f64,
    pub samples: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

/// Which central-tendency value a chart shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statistic {
    Mean,
    Median,
}

impl Statistic {
    pub fn of(self, stats: &SizeStats) -> f64 {
        match self {
            Statistic::Mean => stats.mean,
            Statistic::Median => stats.median,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Statistic::Mean => "mean",
            Statistic::Median => "median",
        }
    }
}

// ---------------------------------------------------------------------------
// Summary – size → stats, in canonical size order
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    sizes: SizeSet,
    entries: Vec<SizeStats>,
}

impl Summary {
    /// Group rows by size label and compute statistics per size.
    ///
    /// Grouping ignores row positions entirely; entries follow the table's
    /// size-set order.
    pub fn from_table(table: &MeasurementTable) -> Self {
        let sizes = table.sizes().clone();
        let mut groups: Vec<Vec<f64>> = vec![Vec::new(); sizes.len()];
        for row in table.rows() {
            if let Some(idx) = sizes.position(row.size) {
                groups[idx].push(row.time);
            }
        }

        let entries = sizes
            .iter()
            .zip(&groups)
            .map(|(size, times)| stats_for(size, times))
            .collect();

        Summary { sizes, entries }
    }

    pub fn entries(&self) -> &[SizeStats] {
        &self.entries
    }

    pub fn get(&self, size: f64) -> Option<&SizeStats> {
        self.sizes.position(size).map(|idx| &self.entries[idx])
    }

    pub fn sizes(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.size).collect()
    }

    /// `(size, value)` points for one statistic.
    pub fn points(&self, statistic: Statistic) -> Vec<(f64, f64)> {
        self.entries
            .iter()
            .map(|e| (e.size, statistic.of(e)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Statistics of a non-empty sample.
pub fn stats_for(size: f64, times: &[f64]) -> SizeStats {
    SizeStats {
        size,
        samples: times.len(),
        mean: mean(times),
        median: median(times),
        min: times.iter().copied().fold(f64::INFINITY, f64::min),
        max: times.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Middle value; the mean of the two middle values for even counts.
pub fn median(values: &[f64]) -> f64 {
    let n = values.len();
    if n == 0 {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}
