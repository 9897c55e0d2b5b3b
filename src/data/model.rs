use std::collections::HashMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Measurement – one row of the input table
// ---------------------------------------------------------------------------

/// A single trial: the tested size and the time it took.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Grouping key, e.g. a buffer size in bytes.
    pub size: f64,
    /// Measured time, e.g. in cycles.
    pub time: f64,
}

impl Measurement {
    pub fn new(size: f64, time: f64) -> Self {
        Measurement { size, time }
    }
}

// ---------------------------------------------------------------------------
// SizeSet – distinct sizes in order of first appearance
// ---------------------------------------------------------------------------

/// Distinct size values in the order they first appear in the table.
///
/// This is the canonical size ordering: every grouping and every chart axis
/// follows it.  Lookups go through a hash index keyed on the value's bits.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeSet {
    sizes: Vec<f64>,
    index: HashMap<u64, usize>,
}

impl SizeSet {
    /// Collect the distinct sizes of `rows`, keeping first-appearance order.
    pub fn from_rows(rows: &[Measurement]) -> Self {
        Self::index_rows(rows).0
    }

    /// The size set of `rows` together with the canonical index of every
    /// row's size, in row order.
    pub fn index_rows(rows: &[Measurement]) -> (Self, Vec<usize>) {
        let mut set = SizeSet {
            sizes: Vec::new(),
            index: HashMap::new(),
        };
        let slots: Vec<usize> = rows.iter().map(|row| set.insert(row.size)).collect();
        (set, slots)
    }

    fn insert(&mut self, size: f64) -> usize {
        let next = self.sizes.len();
        let idx = *self.index.entry(size_key(size)).or_insert(next);
        if idx == next {
            self.sizes.push(size);
        }
        idx
    }

    /// Canonical index of `size`, if it is part of the set.
    pub fn position(&self, size: f64) -> Option<usize> {
        self.index.get(&size_key(size)).copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.sizes
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.sizes.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Human-readable labels, one per size, for categorical chart axes.
    pub fn labels(&self) -> Vec<String> {
        self.sizes.iter().map(|&s| format_size(s)).collect()
    }
}

/// Exact numeric identity of a size: its bit pattern, with `-0.0` folded
/// into `0.0`.
fn size_key(size: f64) -> u64 {
    if size == 0.0 {
        0.0f64.to_bits()
    } else {
        size.to_bits()
    }
}

/// Integral sizes print without a fractional part (`4096`, not `4096.0`).
pub fn format_size(size: f64) -> String {
    if size.fract() == 0.0 && size.abs() < 1e15 {
        format!("{}", size as i64)
    } else {
        format!("{size}")
    }
}

// ---------------------------------------------------------------------------
// MeasurementTable – the complete loaded input
// ---------------------------------------------------------------------------

/// The full input in acquisition order, with its size set and each row's
/// canonical size index pre-computed.
///
/// Rows are expected run-major: every size of run 0, then every size of
/// run 1, and so on.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementTable {
    rows: Vec<Measurement>,
    sizes: SizeSet,
    size_indices: Vec<usize>,
}

impl MeasurementTable {
    pub fn from_rows(rows: Vec<Measurement>) -> Self {
        let (sizes, size_indices) = SizeSet::index_rows(&rows);
        MeasurementTable {
            rows,
            sizes,
            size_indices,
        }
    }

    pub fn rows(&self) -> &[Measurement] {
        &self.rows
    }

    pub fn sizes(&self) -> &SizeSet {
        &self.sizes
    }

    /// `sizes().position(row.size)` for every row, in row order.
    pub fn size_indices(&self) -> &[usize] {
        &self.size_indices
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl fmt::Display for MeasurementTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} measurements over {} sizes",
            self.rows.len(),
            self.sizes.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[(f64, f64)]) -> MeasurementTable {
        MeasurementTable::from_rows(rows.iter().map(|&(s, t)| Measurement::new(s, t)).collect())
    }

    #[test]
    fn size_set_keeps_first_appearance_order() {
        let t = table(&[(256.0, 1.0), (64.0, 2.0), (256.0, 3.0), (128.0, 4.0), (64.0, 5.0)]);
        assert_eq!(t.sizes().as_slice(), &[256.0, 64.0, 128.0]);
        assert_eq!(t.sizes().position(128.0), Some(2));
        assert_eq!(t.sizes().position(512.0), None);
    }

    #[test]
    fn negative_zero_is_the_same_size() {
        let t = table(&[(0.0, 1.0), (-0.0, 2.0)]);
        assert_eq!(t.sizes().len(), 1);
        assert_eq!(t.sizes().position(-0.0), Some(0));
        assert_eq!(t.size_indices(), &[0, 0]);
    }

    #[test]
    fn row_indices_follow_labels_on_a_long_sweep() {
        let sizes: Vec<f64> = (10..25).map(|e| f64::from(1u32 << e)).collect();
        let rows: Vec<(f64, f64)> = (0..50)
            .flat_map(|run| sizes.iter().rev().map(move |&s| (s, f64::from(run))))
            .collect();
        let t = table(&rows);

        assert_eq!(t.sizes().len(), sizes.len());
        assert_eq!(t.sizes().position(1024.0), Some(sizes.len() - 1));
        for (row, &idx) in t.rows().iter().zip(t.size_indices()) {
            assert_eq!(t.sizes().as_slice()[idx], row.size);
            assert_eq!(t.sizes().position(row.size), Some(idx));
        }
    }

    #[test]
    fn labels_drop_integral_fraction() {
        let t = table(&[(4096.0, 1.0), (1.5, 2.0)]);
        assert_eq!(t.sizes().labels(), vec!["4096".to_string(), "1.5".to_string()]);
    }
}
