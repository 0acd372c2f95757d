use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use bluenoise_mask_optimizer::export::{export_literal_array, export_ppm};
use bluenoise_mask_optimizer::logging::init_tracing;
use bluenoise_mask_optimizer::{MaskSettings, Optimizer, OptimizerError, PreviewFrame};
use clap::Parser;
use tracing::{error, info, warn};

/// Optimizes a blue-noise dither mask and exports it as `mask.ppm` and `mask.h`.
#[derive(Parser, Debug)]
#[command(name = "bmo", version, about)]
struct Args {
    /// Side of the mask, rounded up to a power of two in [128, 1024]
    #[arg(requires = "dimension")]
    mask_size: Option<usize>,

    /// Values per cell, in [1, 20]
    dimension: Option<usize>,

    /// Seed for reproducible runs (random if not specified)
    #[arg(long)]
    seed: Option<u64>,

    /// Passes to run before exporting
    #[arg(long, default_value_t = 1000)]
    iterations: u64,

    /// Stop after this many seconds even if passes remain
    #[arg(long)]
    seconds: Option<u64>,

    /// Milliseconds between progress reports
    #[arg(long, default_value_t = 100)]
    report_interval_ms: u64,

    /// Directory receiving the exported files
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Refresh `preview.png` in the output directory at every report
    #[arg(long)]
    preview: bool,
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Exit {
    Success = 0,
    InvalidArguments = 1,
    UnsupportedMaskSize = 2,
    ExportFailed = 3,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit as u8)
    }
}

fn main() -> ExitCode {
    init_tracing();
    match Args::try_parse() {
        Ok(args) => run(args).into(),
        Err(err) => {
            let _ = err.print();
            exit_for(&err).into()
        }
    }
}

/// `--help` and `--version` are successful runs; every other parse failure
/// is an invalid command line.
fn exit_for(err: &clap::Error) -> Exit {
    if err.use_stderr() {
        Exit::InvalidArguments
    } else {
        Exit::Success
    }
}

/// Checked before each pass, so a zero pass budget runs nothing.
fn finished(done: u64, budget: u64, deadline: Option<Instant>, now: Instant) -> bool {
    done >= budget || deadline.is_some_and(|d| now >= d)
}

fn run(args: Args) -> Exit {
    let (mask_size, dimension) = match (args.mask_size, args.dimension) {
        (Some(size), Some(dimension)) => (size, dimension),
        _ => (128, 1),
    };

    let mut settings = match MaskSettings::new(mask_size, dimension) {
        Ok(settings) => settings,
        Err(err) => {
            error!("{err}");
            return Exit::InvalidArguments;
        }
    };
    settings.seed = args.seed;

    let mut optimizer = match Optimizer::new(settings) {
        Ok(optimizer) => optimizer,
        Err(err @ OptimizerError::UnsupportedMaskSize { .. }) => {
            error!("{err}: please reduce the size of the mask");
            return Exit::UnsupportedMaskSize;
        }
        Err(err) => {
            error!("{err}");
            return Exit::InvalidArguments;
        }
    };
    info!("initialization complete, beginning the optimization");

    let started = Instant::now();
    let deadline = args.seconds.map(|s| started + Duration::from_secs(s));
    let report_interval = Duration::from_millis(args.report_interval_ms);
    let preview_path = args.output_dir.join("preview.png");
    let mut last_report = started;

    while !finished(optimizer.iterations(), args.iterations, deadline, Instant::now()) {
        let report = optimizer.run();
        let now = Instant::now();

        if now - last_report > report_interval {
            info!(
                iteration = report.iteration,
                "accepted permutations: {:>6}", report.accepted
            );
            if args.preview {
                if let Err(err) = PreviewFrame::capture(optimizer.mask()).write_png(&preview_path) {
                    warn!("could not write the preview: {err}");
                }
            }
            last_report = now;
        }
    }

    info!(
        iterations = optimizer.iterations(),
        elapsed = ?started.elapsed(),
        "exporting the mask"
    );
    let exported = export_ppm(optimizer.mask(), args.output_dir.join("mask.ppm"))
        .and_then(|()| export_literal_array(optimizer.mask(), args.output_dir.join("mask.h")));
    match exported {
        Ok(()) => Exit::Success,
        Err(err) => {
            error!("{err}");
            Exit::ExportFailed
        }
    }
}
