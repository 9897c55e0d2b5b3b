use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use clap::Parser;
use parquet::arrow::ArrowWriter;

/// Write a synthetic cache-size sweep: every run reads buffers from
/// 2^min-exp to 2^max-exp bytes, one `size,time` row per buffer.
#[derive(Parser, Debug)]
#[command(name = "generate_sample")]
struct Args {
    /// Output file; `.parquet` writes Parquet, anything else CSV
    #[arg(default_value = "cache_size_results.csv")]
    output: PathBuf,

    /// Number of complete sweeps
    #[arg(short = 'r', long = "runs", default_value = "20")]
    runs: usize,

    #[arg(long = "min-exp", default_value = "10")]
    min_exp: u32,

    #[arg(long = "max-exp", default_value = "24")]
    max_exp: u32,

    #[arg(long = "seed", default_value = "42")]
    seed: u64,
}

/// (capacity in bytes, cycles per cache line) for each level of a
/// typical desktop hierarchy; anything larger is served from DRAM.
const LEVELS: &[(f64, f64)] = &[(32.0 * 1024.0, 4.0), (512.0 * 1024.0, 14.0), (8.0 * 1024.0 * 1024.0, 40.0)];
const DRAM_CYCLES_PER_LINE: f64 = 200.0;
const LINE_SIZE: f64 = 64.0;

fn cycles_per_line(size: f64) -> f64 {
    LEVELS
        .iter()
        .find(|&&(capacity, _)| size <= capacity)
        .map(|&(_, cycles)| cycles)
        .unwrap_or(DRAM_CYCLES_PER_LINE)
}

/// Deterministic noise source (SplitMix64); the same seed always yields
/// the same sweep.
struct Noise {
    state: u64,
}

impl Noise {
    fn seeded(seed: u64) -> Self {
        Noise { state: seed }
    }

    fn next_bits(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    fn uniform(&mut self) -> f64 {
        (self.next_bits() >> 11) as f64 * f64::EPSILON / 2.0
    }

    /// Normally distributed around `center` (Box-Muller).
    fn normal(&mut self, center: f64, spread: f64) -> f64 {
        let radius = (-2.0 * (1.0 - self.uniform()).ln()).sqrt();
        let angle = std::f64::consts::TAU * self.uniform();
        center + spread * radius * angle.cos()
    }
}

fn generate(args: &Args) -> (Vec<i64>, Vec<f64>) {
    let mut noise = Noise::seeded(args.seed);
    let mut sizes = Vec::new();
    let mut times = Vec::new();

    for _ in 0..args.runs {
        for exp in args.min_exp..=args.max_exp {
            let size = 1i64 << exp;
            let lines = size as f64 / LINE_SIZE;
            let ideal = lines * cycles_per_line(size as f64);
            // Occasional interrupts show up as a heavy right tail.
            let spike = if noise.uniform() < 0.02 { ideal * 3.0 } else { 0.0 };
            let time = (noise.normal(ideal, ideal * 0.05) + spike).max(1.0);

            sizes.push(size);
            times.push(time.round());
        }
    }
    (sizes, times)
}

fn write_csv(path: &Path, sizes: &[i64], times: &[f64]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .context("creating CSV file")?;
    for (size, time) in sizes.iter().zip(times) {
        writer
            .write_record([size.to_string(), time.to_string()])
            .context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV file")?;
    Ok(())
}

fn write_parquet(path: &Path, sizes: Vec<i64>, times: Vec<f64>) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("size", DataType::Int64, false),
        Field::new("time", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![Arc::new(Int64Array::from(sizes)), Arc::new(Float64Array::from(times))],
    )
    .context("building record batch")?;

    println!("{}", pretty_format_batches(&[batch.slice(0, batch.num_rows().min(5))])?);

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    anyhow::ensure!(args.min_exp <= args.max_exp, "--min-exp must not exceed --max-exp");
    anyhow::ensure!(args.max_exp < 63, "--max-exp must be below 63");

    let (sizes, times) = generate(&args);
    let rows = sizes.len();

    let is_parquet = args
        .output
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("parquet"));
    if is_parquet {
        write_parquet(&args.output, sizes, times)?;
    } else {
        write_csv(&args.output, &sizes, &times)?;
    }

    println!(
        "Wrote {rows} measurements ({} runs x {} sizes) to {}",
        args.runs,
        args.max_exp - args.min_exp + 1,
        args.output.display()
    );
    Ok(())
}
