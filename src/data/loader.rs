use std::fs::File;
use std::io::Read;
use std::path::Path;

use arrow::array::{Array, ArrayRef, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{Measurement, MeasurementTable};
use crate::error::{AnalysisError, Result};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// How delimited text is split into fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    pub delimiter: u8,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions { delimiter: b',' }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a measurement table from a file.  Dispatch by extension.
///
/// * `.parquet` / `.pq` – first two columns, taken positionally
/// * anything else      – headerless delimited text, `size,time` per line
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<MeasurementTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    let source_name = path.display().to_string();

    let table = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path, &source_name)?,
        _ => {
            let file = File::open(path)
                .map_err(|e| AnalysisError::malformed(&source_name, format!("cannot open: {e}")))?;
            load_reader(file, &source_name, options)?
        }
    };

    log::info!("Loaded {table} from {source_name}");
    Ok(table)
}

/// Load delimited text from any reader, e.g. stdin or an in-memory buffer.
/// `source_name` only appears in error messages.
pub fn load_reader<R: Read>(
    reader: R,
    source_name: &str,
    options: &LoadOptions,
) -> Result<MeasurementTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(options.delimiter)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| AnalysisError::malformed(source_name, e.to_string()))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if record.len() != 2 {
            return Err(AnalysisError::malformed(
                source_name,
                format!(
                    "line {line}: expected 2 fields, found {} ({:?})",
                    record.len(),
                    record.iter().collect::<Vec<_>>()
                ),
            ));
        }

        let size = parse_field(&record[0], line, "size", source_name)?;
        let time = parse_field(&record[1], line, "time", source_name)?;
        rows.push(Measurement::new(size, time));
    }

    finish(rows, source_name)
}

fn parse_field(text: &str, line: u64, column: &str, source_name: &str) -> Result<f64> {
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(AnalysisError::malformed(
            source_name,
            format!("line {line}: {column} '{text}' is not a finite number"),
        )),
    }
}

fn finish(rows: Vec<Measurement>, source_name: &str) -> Result<MeasurementTable> {
    if rows.is_empty() {
        return Err(AnalysisError::malformed(source_name, "no measurements found"));
    }
    Ok(MeasurementTable::from_rows(rows))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Expected schema: at least two numeric columns; the first is the size, the
/// second the time.  Column names are ignored, matching the headerless text
/// format.
fn load_parquet(path: &Path, source_name: &str) -> Result<MeasurementTable> {
    let malformed = |detail: String| AnalysisError::malformed(source_name, detail);

    let file = File::open(path).map_err(|e| malformed(format!("cannot open: {e}")))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| malformed(format!("reading parquet metadata: {e}")))?;
    let reader = builder
        .build()
        .map_err(|e| malformed(format!("building parquet reader: {e}")))?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.map_err(|e| malformed(format!("reading record batch: {e}")))?;
        if batch.num_columns() < 2 {
            return Err(malformed(format!(
                "expected 2 columns, found {}",
                batch.num_columns()
            )));
        }

        let first_row = rows.len();
        let sizes = numeric_column(batch.column(0), first_row, "size").map_err(malformed)?;
        let times = numeric_column(batch.column(1), first_row, "time").map_err(malformed)?;

        rows.extend(
            sizes
                .into_iter()
                .zip(times)
                .map(|(size, time)| Measurement::new(size, time)),
        );
    }

    finish(rows, source_name)
}

/// Widen an integer or float column to `f64`, rejecting nulls and
/// non-finite values.  Errors name the absolute row (0-based).
fn numeric_column(
    col: &ArrayRef,
    first_row: usize,
    name: &str,
) -> std::result::Result<Vec<f64>, String> {
    let values: Vec<Option<f64>> = match col.data_type() {
        DataType::Float64 => downcast::<Float64Array>(col)?.iter().collect(),
        DataType::Float32 => downcast::<Float32Array>(col)?
            .iter()
            .map(|v| v.map(f64::from))
            .collect(),
        DataType::Int64 => downcast::<Int64Array>(col)?
            .iter()
            .map(|v| v.map(|i| i as f64))
            .collect(),
        DataType::Int32 => downcast::<Int32Array>(col)?
            .iter()
            .map(|v| v.map(f64::from))
            .collect(),
        other => return Err(format!("{name} column has type {other:?}, expected a number")),
    };

    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| match v {
            Some(x) if x.is_finite() => Ok(x),
            Some(x) => Err(format!("row {}: {name} {x} is not finite", first_row + i)),
            None => Err(format!("row {}: {name} is null", first_row + i)),
        })
        .collect()
}

fn downcast<T: 'static>(col: &ArrayRef) -> std::result::Result<&T, String> {
    col.as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| format!("unexpected array layout for {:?}", col.data_type()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    fn load_str(text: &str) -> Result<MeasurementTable> {
        load_reader(text.as_bytes(), "test", &LoadOptions::default())
    }

    #[test]
    fn parses_headerless_rows_in_order() {
        let table = load_str("64,10\n128,20\n256,30\n64,12\n128,22\n256,32\n").unwrap();
        assert_eq!(table.len(), 6);
        assert_eq!(table.rows()[3], Measurement::new(64.0, 12.0));
        assert_eq!(table.sizes().as_slice(), &[64.0, 128.0, 256.0]);
    }

    #[test]
    fn trims_whitespace_and_skips_blank_lines() {
        let table = load_str(" 64 , 10.5 \n\n128,  20\n").unwrap();
        assert_eq!(table.rows(), &[Measurement::new(64.0, 10.5), Measurement::new(128.0, 20.0)]);
    }

    #[test]
    fn custom_delimiter() {
        let options = LoadOptions { delimiter: b'\t' };
        let table = load_reader(&b"64\t10\n128\t20\n"[..], "tsv", &options).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn empty_input_is_malformed() {
        let err = load_str("").unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedInput { .. }), "{err}");
    }

    #[test]
    fn non_numeric_field_is_malformed() {
        let err = load_str("64,10\n128,fast\n").unwrap_err();
        match err {
            AnalysisError::MalformedInput { detail, .. } => {
                assert!(detail.contains("line 2"), "{detail}");
                assert!(detail.contains("fast"), "{detail}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn header_row_is_not_skipped() {
        let err = load_str("size,time\n64,10\n").unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedInput { .. }));
    }

    #[test]
    fn wrong_field_count_is_malformed() {
        assert!(load_str("64,10,3\n").is_err());
        assert!(load_str("64\n").is_err());
    }

    #[test]
    fn nan_is_rejected() {
        assert!(load_str("64,NaN\n").is_err());
    }

    #[test]
    fn missing_file_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("absent.csv"), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedInput { .. }));
    }

    #[test]
    fn loads_text_file_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "64,10").unwrap();
        writeln!(file, "128,20").unwrap();
        file.flush().unwrap();

        let table = load_file(file.path(), &LoadOptions::default()).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn loads_parquet_with_mixed_numeric_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("bytes", DataType::Int64, false),
            Field::new("cycles", DataType::Float64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![64, 128, 64, 128])),
                Arc::new(Float64Array::from(vec![10.0, 20.0, 12.0, 22.0])),
            ],
        )
        .unwrap();
        let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(&path, &LoadOptions::default()).unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(table.rows()[2], Measurement::new(64.0, 12.0));
        assert_eq!(table.sizes().as_slice(), &[64.0, 128.0]);
    }

    #[test]
    fn parquet_with_nulls_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nulls.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("size", DataType::Int32, false),
            Field::new("time", DataType::Float32, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int32Array::from(vec![64, 128])),
                Arc::new(Float32Array::from(vec![Some(1.0), None])),
            ],
        )
        .unwrap();
        let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let err = load_file(&path, &LoadOptions::default()).unwrap_err();
        match err {
            AnalysisError::MalformedInput { detail, .. } => assert!(detail.contains("null"), "{detail}"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
