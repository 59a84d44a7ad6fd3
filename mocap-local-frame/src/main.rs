/// Marker record frame converter main entry point
mod config;
mod converter;
mod decoder;
mod encoder;
mod error;
mod frame;
mod transform;

use clap::{ArgAction, Parser};
use config::MarkerIndexConfig;
use converter::{MarkerStreamConverter, ShortRecordPolicy, StreamOptions};
use error::ConvertError;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use transform::Direction;

/// Convert motion-capture marker records between world and pelvis-local frames.
#[derive(Parser, Debug)]
#[command(name = "mocap-local-frame", version, about, long_about = None)]
struct Cli {
    /// INI file with the [Indexies] LeftAsis, RightAsis and VSacral marker indices
    #[arg(short, long)]
    config: PathBuf,

    /// Whether the first input line is a header to skip
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    header: bool,

    /// Convert local records (markers, translation, quaternion) back to world records
    #[arg(long)]
    inverse: bool,

    /// Input CSV file (stdin when omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output CSV file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit a column header before the first output record
    #[arg(long)]
    write_header: bool,

    /// What to do with records that have too few fields
    #[arg(long, value_enum, default_value_t = ShortRecordPolicy::Skip)]
    short_records: ShortRecordPolicy,

    /// Records transformed together; values above 1 convert each batch in parallel
    #[arg(
        long,
        default_value_t = 1,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    batch_size: usize,

    /// Show a progress spinner on stderr
    #[arg(long)]
    progress: bool,

    /// Write a JSON run summary to this path
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Log filter (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&cli.log_level))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<(), ConvertError> {
    let indices = MarkerIndexConfig::load(&cli.config)?;
    let direction = if cli.inverse {
        Direction::LocalToWorld
    } else {
        Direction::WorldToLocal
    };
    let options = StreamOptions {
        has_header: cli.header,
        write_header: cli.write_header,
        short_records: cli.short_records,
        batch_size: cli.batch_size,
        show_progress: cli.progress,
    };

    let input: Box<dyn Read> = match &cli.input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(io::stdin().lock()),
    };
    let output: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };

    let converter = MarkerStreamConverter::new(direction, indices, options);
    let summary = converter.convert(input, output)?;

    if let Some(path) = &cli.summary {
        summary.save(path)?;
    }

    Ok(())
}
