//! # btc-outliers
//!
//! Command-line interface for interval Mahalanobis outlier detection on
//! hourly BTC bars.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use data_facade::{CsvConfig, CsvSource, DataError, DataSource};
use outlier::{
    interval_summaries, rolling_mean, AnomalyPipeline, AnomalyScorer, DistanceStats,
    OutlierError, PipelineConfig, ScoredSeries, ScoringConfig, Series, TargetColumn,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "btc_outliers=info,outlier_core=info,data_core=info";

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Outlier(#[from] OutlierError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV output error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{path}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Parser)]
#[command(name = "btc-outliers")]
#[command(about = "Interval Mahalanobis outlier detection for hourly price/volume bars", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score, detect and merge; write a JSON report
    Detect {
        /// Input CSV (CryptoDataDownload hourly layout)
        #[arg(short, long)]
        input: PathBuf,

        /// Pipeline configuration (JSON); flags override its fields
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Interval width in days
        #[arg(long)]
        interval_days: Option<i64>,

        /// Distributional detector threshold, in standard deviations
        #[arg(long)]
        std_threshold: Option<f64>,

        /// Relational detector threshold, in standard deviations
        #[arg(long)]
        relational_threshold: Option<f64>,

        /// Volume column regressed on price (volume_btc, volume_usd)
        #[arg(short, long)]
        target: Option<TargetColumn>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write per-row distances as CSV
    Score {
        /// Input CSV (CryptoDataDownload hourly layout)
        #[arg(short, long)]
        input: PathBuf,

        /// Interval width in days
        #[arg(long, default_value_t = outlier::DEFAULT_INTERVAL_DAYS)]
        interval_days: i64,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print per-interval time extent and mean price as JSON
    Intervals {
        /// Input CSV (CryptoDataDownload hourly layout)
        #[arg(short, long)]
        input: PathBuf,

        /// Interval width in days
        #[arg(long, default_value_t = outlier::DEFAULT_INTERVAL_DAYS)]
        interval_days: i64,
    },
}

/// Flag overrides applied on top of a configuration file.
#[derive(Debug, Default, Clone, Copy)]
struct Overrides {
    interval_days: Option<i64>,
    std_threshold: Option<f64>,
    relational_threshold: Option<f64>,
    target: Option<TargetColumn>,
}

fn load_series(input: &Path) -> CliResult<Series> {
    let source = CsvSource::new(input, CsvConfig::default());
    let (series, stats) = source.load_with_stats()?;
    if stats.dropped() > 0 {
        info!(
            invalid = stats.dropped_invalid,
            duplicate = stats.dropped_duplicate,
            "rows discarded during cleansing"
        );
    }
    Ok(series)
}

fn load_config(path: Option<&Path>, overrides: Overrides) -> CliResult<PipelineConfig> {
    let mut config = match path {
        Some(path) => {
            let file = File::open(path).map_err(|source| CliError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            serde_json::from_reader(BufReader::new(file))?
        }
        None => PipelineConfig::default(),
    };

    if let Some(days) = overrides.interval_days {
        config.scoring.interval_days = days;
    }
    if let Some(k) = overrides.std_threshold {
        config.distributional.std_threshold = k;
    }
    if let Some(k) = overrides.relational_threshold {
        config.relational.std_threshold = k;
    }
    if let Some(target) = overrides.target {
        config.relational.target = target;
    }
    config.validate()?;
    Ok(config)
}

/// Open `output` or fall back to stdout.
fn open_output(output: Option<&Path>) -> CliResult<Box<dyn Write>> {
    match output {
        Some(path) => {
            let file = File::create(path).map_err(|source| CliError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> CliResult<()> {
    let mut writer = open_output(output)?;
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)
        .and_then(|_| writer.flush())
        .map_err(|source| CliError::Io {
            path: output.map_or_else(|| PathBuf::from("<stdout>"), Path::to_path_buf),
            source,
        })
}

/// Run detect command
fn run_detect(
    input: PathBuf,
    config: Option<PathBuf>,
    overrides: Overrides,
    output: Option<PathBuf>,
) -> CliResult<()> {
    let config = load_config(config.as_deref(), overrides)?;
    let series = load_series(&input)?;

    let report = AnomalyPipeline::new(config)?.run(&series)?;
    eprintln!(
        "{} records, {} intervals: {} distributional, {} relational ({}), {} merged",
        report.record_count,
        report.interval_count,
        report.distributional.count,
        report.relational.count,
        config.relational.target,
        report.merged.count
    );
    if let Some(note) = unscored_note(&report.scored) {
        eprintln!("{}", note);
    }

    write_json(&report, output.as_deref())
}

/// One row of `score` output.
#[derive(Debug, Serialize)]
struct ScoreRow {
    timestamp: i64,
    price: f64,
    volume_btc: f64,
    volume_usd: f64,
    interval: u32,
    distance: Option<f64>,
    sigma_band: Option<u8>,
    rolling_mean: Option<f64>,
}

fn score_rows(scored: &ScoredSeries, interval_days: i64) -> CliResult<Vec<ScoreRow>> {
    let stats = DistanceStats::from_scored(scored);
    let prices: Vec<f64> = scored.iter().map(|r| r.record.price).collect();
    let window = ScoringConfig::new(interval_days).rolling_window_hours();
    let means = rolling_mean(&prices, window)?;

    Ok(scored
        .iter()
        .zip(means)
        .map(|(r, rolling_mean)| ScoreRow {
            timestamp: r.record.timestamp,
            price: r.record.price,
            volume_btc: r.record.volume_btc,
            volume_usd: r.record.volume_usd,
            interval: r.interval.get(),
            distance: r.distance,
            sigma_band: r.distance.and_then(|d| stats.sigma_band(d)),
            rolling_mean,
        })
        .collect())
}

/// Run score command
fn run_score(input: PathBuf, interval_days: i64, output: Option<PathBuf>) -> CliResult<()> {
    let scorer = AnomalyScorer::new(interval_days)?;
    let series = load_series(&input)?;
    let scored = scorer.score(&series)?;
    let rows = score_rows(&scored, interval_days)?;

    let mut writer = csv::Writer::from_writer(open_output(output.as_deref())?);
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|source| CliError::Io {
        path: output.unwrap_or_else(|| PathBuf::from("<stdout>")),
        source,
    })?;

    eprintln!("{} rows scored", scored.len());
    if let Some(note) = unscored_note(&scored) {
        eprintln!("{}", note);
    }
    Ok(())
}

/// Lists intervals that could not be fitted, if any.
fn unscored_note(scored: &ScoredSeries) -> Option<String> {
    if !scored.has_degenerate_intervals() {
        return None;
    }
    let labels: Vec<String> = scored
        .degenerate
        .iter()
        .map(|d| d.interval.to_string())
        .collect();
    Some(format!(
        "{} interval(s) left unscored: {}",
        labels.len(),
        labels.join(", ")
    ))
}

/// Run intervals command
fn run_intervals(input: PathBuf, interval_days: i64) -> CliResult<()> {
    let scorer = AnomalyScorer::new(interval_days)?;
    let series = load_series(&input)?;
    let segmentation = scorer.segmenter().segment(&series)?;
    write_json(&interval_summaries(&series, &segmentation), None)
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .init();
}

fn main() -> ExitCode {
    // Load .env file (optional - won't fail if missing)
    dotenvy::dotenv().ok();
    init_logging();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Detect {
            input,
            config,
            interval_days,
            std_threshold,
            relational_threshold,
            target,
            output,
        } => run_detect(
            input,
            config,
            Overrides {
                interval_days,
                std_threshold,
                relational_threshold,
                target,
            },
            output,
        ),

        Commands::Score {
            input,
            interval_days,
            output,
        } => run_score(input, interval_days, output),

        Commands::Intervals {
            input,
            interval_days,
        } => run_intervals(input, interval_days),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outlier::{DegenerateInterval, IntervalLabel, Record, RecordId, ScoredRecord};

    #[test]
    fn test_parse_detect_flags() {
        let cli = Cli::try_parse_from([
            "btc-outliers",
            "detect",
            "--input",
            "BTC-Hourly.csv",
            "--interval-days",
            "30",
            "--target",
            "volume-usd",
        ])
        .unwrap();
        match cli.command {
            Commands::Detect {
                interval_days,
                target,
                std_threshold,
                ..
            } => {
                assert_eq!(interval_days, Some(30));
                assert_eq!(target, Some(TargetColumn::VolumeUsd));
                assert_eq!(std_threshold, None);
            }
            _ => panic!("expected detect"),
        }
    }

    #[test]
    fn test_unknown_target_rejected() {
        let result = Cli::try_parse_from([
            "btc-outliers",
            "detect",
            "--input",
            "x.csv",
            "--target",
            "open",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_apply_over_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"scoring":{{"interval_days":30}},"distributional":{{"std_threshold":2.5}}}}"#).unwrap();

        let config = load_config(
            Some(file.path()),
            Overrides {
                std_threshold: Some(3.0),
                target: Some(TargetColumn::VolumeUsd),
                ..Overrides::default()
            },
        )
        .unwrap();
        assert_eq!(config.scoring.interval_days, 30);
        assert_eq!(config.distributional.std_threshold, 3.0);
        assert_eq!(config.relational.target, TargetColumn::VolumeUsd);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let err = load_config(
            None,
            Overrides {
                interval_days: Some(0),
                ..Overrides::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, CliError::Outlier(ref e) if e.is_configuration()));
    }

    #[test]
    fn test_score_rows() {
        let records = (0..3)
            .map(|i| ScoredRecord {
                id: RecordId(i),
                record: Record::new(i as i64 * 3600, 10.0 + i as f64, 1.0, 10.0),
                interval: IntervalLabel(1),
                distance: if i == 1 { None } else { Some(i as f64) },
            })
            .collect();
        let rows = score_rows(&ScoredSeries::new(records, Vec::new()), 1).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].distance, None);
        assert_eq!(rows[1].sigma_band, None);
        assert_eq!(rows[2].interval, 1);
        // one-day window is 24 rows; never filled here
        assert!(rows.iter().all(|r| r.rolling_mean.is_none()));
    }

    #[test]
    fn test_unscored_note() {
        let scored = ScoredSeries::new(Vec::new(), Vec::new());
        assert_eq!(unscored_note(&scored), None);

        let degenerate = [3, 1]
            .iter()
            .map(|&label| DegenerateInterval {
                interval: IntervalLabel(label),
                size: 1,
                reason: "singular covariance".to_string(),
            })
            .collect();
        let scored = ScoredSeries::new(Vec::new(), degenerate);
        assert_eq!(
            unscored_note(&scored).as_deref(),
            Some("2 interval(s) left unscored: 3, 1")
        );
    }
}
