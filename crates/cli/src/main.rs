//! mnh-stats - canopy height statistics from LiDAR MNH tiles
//!
//! Prints exactly one JSON object on stdout and always exits 0; failures are
//! reported in the payload's `"error"` key. There is no `--help` or
//! `--version` output: those are unknown arguments like any other.

use anyhow::{Context, Result};
use canopy_algorithms::{analyze_area, analyze_file, AnalysisConfig, AnalysisError, Report};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tracing::debug;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::FmtSubscriber;

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "mnh-stats")]
#[command(author, version, about = "Canopy height statistics from LiDAR MNH tiles", long_about = None)]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Raster band to read (1-indexed)
    #[arg(long, default_value = "1")]
    band: usize,

    /// Height cut-off in metres (default: 0 for a file, 0.5 for an area)
    #[arg(long)]
    min_height: Option<f64>,

    /// MNH GeoTIFF file, or a directory of tiles when a geometry is given
    path: Option<PathBuf>,

    /// GeoJSON geometry in EPSG:4326 selecting the area ('' for none)
    geometry: Option<String>,
}

/// What the positional arguments ask for
#[derive(Debug, PartialEq)]
enum Mode {
    File(PathBuf),
    Area { dir: PathBuf, geometry: String },
}

impl Cli {
    fn mode(&self) -> Result<Mode> {
        let path = self.path.clone().ok_or(AnalysisError::MissingPath)?;
        Ok(match &self.geometry {
            Some(geometry) => Mode::Area {
                dir: path,
                geometry: geometry.clone(),
            },
            None => Mode::File(path),
        })
    }

    fn config(&self) -> AnalysisConfig {
        AnalysisConfig {
            band: Some(self.band),
            min_height: self.min_height,
        }
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────

/// Logs go to stderr and stay silent unless `--verbose`, so stdout only
/// ever carries the JSON line.
fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { LevelFilter::DEBUG } else { LevelFilter::OFF };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber failed")
}

/// First line of a clap error, without its `error: ` prefix
fn clap_message(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).trim().to_string()
}

fn run(cli: &Cli) -> Report {
    if let Err(e) = setup_logging(cli.verbose) {
        return Report::error(format!("{e:#}"));
    }

    let mode = match cli.mode() {
        Ok(mode) => mode,
        Err(e) => return Report::error(e.to_string()),
    };
    let config = cli.config();

    let start = Instant::now();
    let report = match &mode {
        Mode::File(path) => analyze_file(path, &config),
        Mode::Area { dir, geometry } => analyze_area(dir, geometry, &config),
    };
    debug!("{:?} done in {:.2?}", mode, start.elapsed());
    report
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() {
    let report = match Cli::try_parse() {
        Ok(cli) => run(&cli),
        Err(e) => Report::error(clap_message(&e)),
    };
    println!("{}", report.to_json());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("mnh-stats").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn one_argument_is_file_mode() {
        let cli = parse(&["tile.tif"]);
        assert_eq!(cli.mode().unwrap(), Mode::File(PathBuf::from("tile.tif")));
        assert_eq!(cli.config(), AnalysisConfig { band: Some(1), min_height: None });
    }

    #[test]
    fn two_arguments_is_area_mode() {
        let cli = parse(&["--min-height", "2", "tiles/", "''"]);
        assert_eq!(
            cli.mode().unwrap(),
            Mode::Area {
                dir: PathBuf::from("tiles/"),
                geometry: "''".to_string()
            }
        );
        assert_eq!(cli.config().min_height, Some(2.0));
    }

    #[test]
    fn empty_string_geometry_still_selects_area_mode() {
        let cli = parse(&["tiles/", ""]);
        assert!(matches!(cli.mode().unwrap(), Mode::Area { .. }));
    }

    #[test]
    fn missing_path_message() {
        let cli = parse(&[]);
        assert_eq!(cli.mode().unwrap_err().to_string(), "Missing file path argument");
    }

    #[test]
    fn unknown_flag_is_reported_in_band() {
        let err = Cli::try_parse_from(["mnh-stats", "--bogus"]).unwrap_err();
        let report = Report::error(clap_message(&err));
        assert!(matches!(report, Report::Error(_)));
        assert!(!report.to_json().contains('\n'));
        assert!(clap_message(&err).contains("--bogus"));
    }

    #[test]
    fn help_and_version_stay_in_band() {
        for flag in ["--help", "-h", "--version", "-V"] {
            let err = Cli::try_parse_from(["mnh-stats", flag]).unwrap_err();
            let json = Report::error(clap_message(&err)).to_json();
            assert!(json.starts_with(r#"{"error":"#), "{flag}: {json}");
            assert!(!json.contains('\n'));
        }
    }
}
