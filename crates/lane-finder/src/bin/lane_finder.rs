//! `lane-finder` command-line tool: fit lane lines on a bird's-eye mask image.

use clap::{Parser, Subcommand};
use lane_finder::detect::load_mask;
use lane_finder::detector::{LaneDetectConfig, LaneDetectReport, SlidingWindowParams};
use lane_finder::core::level_from_verbosity;
use log::info;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "lane-finder")]
#[command(about = "Fit lane lines and estimate curvature on bird's-eye binary masks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect both lane lines in a mask image and write a JSON report.
    Detect {
        /// Bird's-eye binary mask (any 8-bit image format).
        #[arg(long)]
        mask: Option<PathBuf>,

        /// JSON config (`LaneDetectConfig`); CLI flags override its values.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Report path (defaults to the config's `output_path`).
        #[arg(long)]
        out: Option<PathBuf>,

        /// Number of sliding windows per side.
        #[arg(long)]
        windows: Option<usize>,

        /// Window half-width in pixels.
        #[arg(long)]
        margin: Option<usize>,

        /// Pixels needed in a window before it re-centers.
        #[arg(long)]
        min_pixels: Option<usize>,

        /// Gray level at or above which a pixel is lane evidence.
        #[arg(long)]
        threshold: Option<u8>,

        /// Keep per-side pixels and the window trace in the report.
        #[arg(long)]
        include_pixels: bool,

        /// More log output (`-v` debug, `-vv` per-window trace).
        #[arg(long, short, action = clap::ArgAction::Count)]
        verbose: u8,
    },
    /// Print the default JSON config.
    DefaultConfig,
}

struct DetectArgs {
    mask: Option<PathBuf>,
    config: Option<PathBuf>,
    out: Option<PathBuf>,
    windows: Option<usize>,
    margin: Option<usize>,
    min_pixels: Option<usize>,
    threshold: Option<u8>,
    include_pixels: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Detect {
            mask,
            config,
            out,
            windows,
            margin,
            min_pixels,
            threshold,
            include_pixels,
            verbose,
        } => {
            init_logging(verbose);
            run_detect(DetectArgs {
                mask,
                config,
                out,
                windows,
                margin,
                min_pixels,
                threshold,
                include_pixels,
            })
        }
        Commands::DefaultConfig => print_default_config().map(|_| ExitCode::SUCCESS),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(feature = "tracing"))]
fn init_logging(verbose: u8) {
    let _ = lane_finder::core::init_with_level(level_from_verbosity(verbose));
}

#[cfg(feature = "tracing")]
fn init_logging(verbose: u8) {
    let level = level_from_verbosity(verbose);
    if verbose > 0 && std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", level.as_str().to_ascii_lowercase());
    }
    lane_finder::core::init_tracing(false);
    // No-op when the subscriber already bridged `log` records.
    let _ = tracing_log::LogTracer::init_with_filter(level);
}

fn resolve_config(args: &DetectArgs) -> CliResult<LaneDetectConfig> {
    let mut cfg = match &args.config {
        Some(path) => LaneDetectConfig::load_json(path)?,
        None => LaneDetectConfig::default(),
    };
    if let Some(mask) = &args.mask {
        cfg.mask_path = mask.to_string_lossy().into_owned();
    }
    if cfg.mask_path.is_empty() {
        return Err("no mask given: pass --mask or set mask_path in --config".into());
    }
    if let Some(out) = &args.out {
        cfg.output_path = Some(out.to_string_lossy().into_owned());
    }
    if let Some(threshold) = args.threshold {
        cfg.threshold = threshold;
    }
    if args.windows.is_some() || args.margin.is_some() || args.min_pixels.is_some() {
        let mut search = cfg.search.unwrap_or_default();
        if let Some(n) = args.windows {
            search.n_windows = n;
        }
        if let Some(m) = args.margin {
            search.margin = m;
        }
        if let Some(p) = args.min_pixels {
            search.min_pixels = p;
        }
        cfg.search = Some(search);
    }
    cfg.include_pixels |= args.include_pixels;
    Ok(cfg)
}

fn run_detect(args: DetectArgs) -> CliResult<ExitCode> {
    let cfg = resolve_config(&args)?;
    let mask = load_mask(&cfg.mask_path, cfg.threshold).map_err(|e| -> CliError {
        format!("failed to load mask {}: {e}", cfg.mask_path).into()
    })?;
    let view = mask.view();
    info!(
        "mask {}: {}x{}, {} lane pixels",
        cfg.mask_path,
        view.width(),
        view.height(),
        view.count_on()
    );

    let detector = cfg.build_detector();
    let mut report = LaneDetectReport::new(
        &cfg,
        args.config.as_deref(),
        view.width(),
        view.height(),
        view.count_on(),
    );
    let outcome = detector.detect(&view);
    let code = match outcome {
        Ok(detection) => {
            print_summary(&detection.curvature);
            report.set_detection(detection, cfg.include_pixels);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("detection failed: {err}");
            report.set_error(&err);
            ExitCode::from(2)
        }
    };

    let out_path = cfg.output_path();
    write_report(&report, &out_path)?;
    Ok(code)
}

fn print_summary(c: &lane_finder::CurvatureResult) {
    println!("left radius:  {}", format_radius(&c.left));
    println!("right radius: {}", format_radius(&c.right));
    println!("offset:       {:+.3} m", c.offset_m);
    println!("lane width:   {:.3} m", c.lane_width_m);
}

fn format_radius(r: &lane_finder::LineRadius) -> String {
    match r {
        lane_finder::LineRadius::Straight => "straight".to_string(),
        lane_finder::LineRadius::Curved { radius } => format!("{radius:.1} m"),
    }
}

fn write_report(report: &LaneDetectReport, path: &Path) -> CliResult<()> {
    report.write_json(path)?;
    info!("report written to {}", path.display());
    Ok(())
}

fn print_default_config() -> CliResult<()> {
    let cfg = LaneDetectConfig {
        search: Some(SlidingWindowParams::default()),
        ..LaneDetectConfig::default()
    };
    println!("{}", serde_json::to_string_pretty(&cfg)?);
    Ok(())
}
