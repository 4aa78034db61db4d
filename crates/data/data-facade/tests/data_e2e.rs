//! End-to-end tests for the data crates
//!
//! Loads CSV files from disk and feeds them to the detection pipeline.

use std::io::Write;

use data_facade::{CsvConfig, CsvSource, DataError, DataSource};
use outlier::prelude::*;
use tempfile::NamedTempFile;

const BANNER: &str = "https://www.CryptoDataDownload.com";
const HEADER: &str = "unix,date,symbol,open,high,low,close,Volume BTC,Volume USD";
const START: i64 = 1_577_836_800;

/// Hourly export, newest first as the exchange publishes it.
fn write_export(hours: i64) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", BANNER).unwrap();
    writeln!(file, "{}", HEADER).unwrap();
    for h in (0..hours).rev() {
        let close = 7_000.0 + ((h * 37) % 23) as f64 * 5.0;
        let volume = 20.0 + ((h * 11) % 7) as f64;
        writeln!(
            file,
            "{},2020-01-01,BTC/USD,0,0,0,{},{},{}",
            START + h * 3600,
            close,
            volume,
            volume * close
        )
        .unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn e2e_load_export_from_disk() {
    let file = write_export(72);
    let source = CsvSource::with_defaults(file.path());
    let (series, stats) = source.load_with_stats().unwrap();

    assert_eq!(series.len(), 72);
    assert_eq!(stats.rows_read, 72);
    assert_eq!(stats.dropped(), 0);
    assert_eq!(series.start_timestamp(), Some(START));
    assert!(series.timestamps().windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn e2e_cleansing_before_detection() {
    let mut file = write_export(48);
    writeln!(file, "{},2020-01-03,BTC/USD,0,0,0,NaN,1,1", START + 100 * 3600).unwrap();
    writeln!(file, "{},2020-01-03,BTC/USD,0,0,0,7000,inf,1", START + 101 * 3600).unwrap();
    writeln!(file, "{},2020-01-01,BTC/USD,0,0,0,9999,1,1", START).unwrap();
    file.flush().unwrap();

    let (series, stats) = CsvSource::with_defaults(file.path())
        .load_with_stats()
        .unwrap();
    assert_eq!(series.len(), 48);
    assert_eq!(stats.dropped_invalid, 2);
    assert_eq!(stats.dropped_duplicate, 1);
    // the exported row for START comes last in the file but first by position
    assert_ne!(series.records()[0].price, 9999.0);

    let config = PipelineConfig::builder()
        .interval_days(1)
        .distributional_threshold(2.0)
        .build()
        .unwrap();
    let report = AnomalyPipeline::new(config).unwrap().run(&series).unwrap();
    assert_eq!(report.record_count, 48);
    assert_eq!(report.interval_count, 2);
}

#[test]
fn e2e_missing_column_is_reported() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "unix,close,Volume BTC").unwrap();
    writeln!(file, "{},7000,1", START).unwrap();
    file.flush().unwrap();

    let err = CsvSource::with_defaults(file.path()).load().unwrap_err();
    assert_eq!(err, DataError::MissingColumn("Volume USD".to_string()));
}

#[test]
fn e2e_usd_volume_mapping() {
    let file = write_export(24);
    let config = CsvConfig::default();
    let series = CsvSource::new(file.path(), config).load().unwrap();
    let usd = series.column(TargetColumn::VolumeUsd);
    let btc = series.column(TargetColumn::VolumeBtc);
    for ((u, b), p) in usd.iter().zip(&btc).zip(series.prices()) {
        assert!((u - b * p).abs() < 1e-6);
    }
}
