//! CLI entrypoint for `logcred`.
//!
//! `extract` scans `*.log` files for credential lines, keeps the first
//! occurrence of each username/password pair and writes a timestamp-named
//! CSV. `merge` unions previously exported CSVs, keeps the earliest
//! occurrence of each pair and writes `deduplicated_data.csv`.
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use log::{LevelFilter, error};
use logcred::{
    export::save_records_csv,
    extract::{Extractor, LOG_EXTENSION},
    io::DEFAULT_MMAP_THRESHOLD_BYTES,
    merge::{DEFAULT_OUTPUT_NAME, Merger, TABLE_EXTENSION},
    record::Record,
    report::{Pipeline, render_export, render_summary},
    stats::RunStats,
    table::list_files_with_extension,
};

const EXIT_NO_INPUT: i32 = 2;
const EXIT_WRITE_FAILED: i32 = 3;
const EXIT_BAD_DIR: i32 = 4;

#[derive(Parser, Debug)]
#[command(
    name = "logcred",
    version,
    about = "Extract and merge credential records from authentication logs"
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Control color output (auto, always, never)
    #[arg(long = "color", value_enum, default_value_t = ColorChoice::Auto, global = true)]
    color: ColorChoice,

    /// Suppress summary output (still writes the output file)
    #[arg(short = 'q', long = "quiet", global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract credentials from every *.log file in a directory
    Extract {
        /// Directory holding the log files
        #[arg(short = 'd', long = "dir", default_value = ".")]
        dir: PathBuf,

        /// Output CSV path (default: <dir>/<YYYYMMDDHHMMSS>.csv)
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,

        /// Override mmap threshold in bytes. If zero, disable mmap.
        #[arg(long = "mmap-threshold", default_value_t = DEFAULT_MMAP_THRESHOLD_BYTES)]
        mmap_threshold: u64,
    },
    /// Merge exported CSV tables, keeping the earliest record per credential pair
    Merge {
        /// Directory holding the CSV tables
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Output file name, written inside DIR
        #[arg(long = "output-name", default_value = DEFAULT_OUTPUT_NAME)]
        output_name: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

/// Warnings (skipped files, bad timestamps) are always shown; `-v` adds
/// per-file progress.
fn init_logger(verbosity: u8) {
    let level = [LevelFilter::Warn, LevelFilter::Info, LevelFilter::Debug]
        [usize::from(verbosity).min(2)];
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .try_init();
}

fn apply_color_choice(choice: ColorChoice) {
    match choice {
        ColorChoice::Always => colored::control::set_override(true),
        ColorChoice::Never => colored::control::set_override(false),
        ColorChoice::Auto => colored::control::unset_override(),
    }
}

fn input_files(dir: &Path, extension: &str) -> Vec<PathBuf> {
    let paths = match list_files_with_extension(dir, extension) {
        Ok(p) => p,
        Err(e) => {
            error!("cannot list {}: {:#}", dir.display(), e);
            std::process::exit(EXIT_BAD_DIR);
        }
    };
    if paths.is_empty() {
        error!("no *.{} files found in {}", extension, dir.display());
        std::process::exit(EXIT_NO_INPUT);
    }
    paths
}

fn finish(pipeline: Pipeline, stats: &RunStats, records: &[Record], out: &Path, quiet: bool) {
    if !quiet {
        println!("{}", render_summary(pipeline, stats));
    }
    let written = match save_records_csv(records, out) {
        Ok(w) => w,
        Err(e) => {
            error!("failed to write {}: {:#}", out.display(), e);
            std::process::exit(EXIT_WRITE_FAILED);
        }
    };
    if !quiet {
        println!("{}", render_export(out, written));
    }
}

fn main() {
    let args = Args::parse();
    init_logger(args.verbose);
    apply_color_choice(args.color);

    match args.command {
        Command::Extract {
            dir,
            output,
            mmap_threshold,
        } => {
            let paths = input_files(&dir, LOG_EXTENSION);
            let threshold = if mmap_threshold == 0 {
                u64::MAX
            } else {
                mmap_threshold
            };
            let out = output.unwrap_or_else(|| {
                let ts = chrono::Local::now().format("%Y%m%d%H%M%S");
                dir.join(format!("{}.csv", ts))
            });
            let mut extractor = Extractor::new();
            extractor.load_from_file_paths_with_threshold(&paths, threshold);
            extractor.deduplicate();
            finish(
                Pipeline::Extract,
                &extractor.stats,
                &extractor.records,
                &out,
                args.quiet,
            );
        }
        Command::Merge { dir, output_name } => {
            let paths = input_files(&dir, TABLE_EXTENSION);
            let mut merger = Merger::new();
            merger.load_from_file_paths(&paths);
            merger.deduplicate();
            finish(
                Pipeline::Merge,
                &merger.stats,
                &merger.records,
                &dir.join(output_name),
                args.quiet,
            );
        }
    }
}
