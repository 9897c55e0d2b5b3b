mod chart;
mod color;
mod data;
mod error;
mod pipeline;
mod report;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use chart::{ChartFormat, RenderOptions};
use data::loader::{self, LoadOptions};
use error::AnalysisError;
use pipeline::Analysis;

#[derive(Parser, Debug)]
#[command(name = "timing-sweep")]
#[command(version, about = "Per-size statistics and charts for repeated timing sweeps", long_about = None)]
struct Args {
    /// Headerless `size,time` measurements (.csv / .txt, or .parquet); `-` reads stdin
    input: PathBuf,

    /// Directory the charts are written to
    #[arg(short = 'o', long = "output-dir", default_value = ".")]
    output_dir: PathBuf,

    /// Chart file format
    #[arg(short = 'f', long = "format", value_enum, default_value_t = ChartFormat::Svg)]
    format: ChartFormat,

    /// Field delimiter of text input
    #[arg(short = 'd', long = "delimiter", default_value = ",")]
    delimiter: char,

    /// Also write the per-size statistics as JSON
    #[arg(long = "summary-json")]
    summary_json: Option<PathBuf>,

    /// Print statistics only, without drawing charts
    #[arg(long = "no-charts")]
    no_charts: bool,

    /// Log more (-v info, -vv debug); RUST_LOG overrides
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:?}");
            match e.downcast_ref::<AnalysisError>() {
                Some(AnalysisError::Usage(_)) => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn run(args: &Args) -> Result<()> {
    let load_options = LoadOptions {
        delimiter: delimiter_byte(args.delimiter)?,
    };

    let table = if args.input.as_os_str() == "-" {
        loader::load_reader(io::stdin().lock(), "<stdin>", &load_options)
    } else {
        loader::load_file(&args.input, &load_options)
    }
    .with_context(|| format!("loading {}", args.input.display()))?;
    let analysis = Analysis::from_table(table)?;
    log::debug!("Analysis covers {}", analysis.table);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    report::write_counts(&mut out, &analysis.matrix)?;
    report::write_summary_table(&mut out, &analysis.summary)?;
    out.flush()?;

    if let Some(path) = &args.summary_json {
        report::write_summary_json(path, &analysis.summary, &analysis.matrix)?;
    }

    if args.no_charts {
        return Ok(());
    }

    let render_options = RenderOptions {
        output_dir: args.output_dir.clone(),
        format: args.format,
    };
    for path in chart::render_all(&analysis.summary, &analysis.matrix, &render_options)? {
        writeln!(out, "Generated: {}", path.display())?;
    }

    Ok(())
}

fn delimiter_byte(c: char) -> std::result::Result<u8, AnalysisError> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        Err(AnalysisError::Usage(format!(
            "delimiter must be a single ASCII character, got '{c}'"
        )))
    }
}
