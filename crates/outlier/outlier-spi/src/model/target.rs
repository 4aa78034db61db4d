//! Secondary columns for price/volume regression.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::record::Record;
use crate::error::OutlierError;

/// Volume column regressed against price by the relational detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetColumn {
    /// Volume denominated in BTC
    VolumeBtc,
    /// Volume denominated in USD
    VolumeUsd,
}

impl TargetColumn {
    /// Read this column from a record.
    pub fn value(&self, record: &Record) -> f64 {
        match self {
            TargetColumn::VolumeBtc => record.volume_btc,
            TargetColumn::VolumeUsd => record.volume_usd,
        }
    }

    /// Canonical identifier, as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetColumn::VolumeBtc => "volume_btc",
            TargetColumn::VolumeUsd => "volume_usd",
        }
    }
}

impl Default for TargetColumn {
    fn default() -> Self {
        TargetColumn::VolumeBtc
    }
}

impl FromStr for TargetColumn {
    type Err = OutlierError;

    /// Accepts `volume_btc`, `volume-btc` or the CSV header `Volume BTC`
    /// (and the USD equivalents), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();
        match normalized.as_str() {
            "volume_btc" => Ok(TargetColumn::VolumeBtc),
            "volume_usd" => Ok(TargetColumn::VolumeUsd),
            _ => Err(OutlierError::invalid_config(
                "target_column",
                format!("unrecognized column '{}', expected volume_btc or volume_usd", s),
            )),
        }
    }
}

impl std::fmt::Display for TargetColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TargetColumn::VolumeBtc => "Volume BTC",
            TargetColumn::VolumeUsd => "Volume USD",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_names() {
        assert_eq!("volume_btc".parse::<TargetColumn>().unwrap(), TargetColumn::VolumeBtc);
        assert_eq!("volume_usd".parse::<TargetColumn>().unwrap(), TargetColumn::VolumeUsd);
    }

    #[test]
    fn test_parse_header_and_kebab_forms() {
        assert_eq!("Volume BTC".parse::<TargetColumn>().unwrap(), TargetColumn::VolumeBtc);
        assert_eq!("volume-usd".parse::<TargetColumn>().unwrap(), TargetColumn::VolumeUsd);
        assert_eq!(" VOLUME_USD ".parse::<TargetColumn>().unwrap(), TargetColumn::VolumeUsd);
    }

    #[test]
    fn test_parse_unrecognized_is_configuration_error() {
        let err = "close".parse::<TargetColumn>().unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("close"));
    }

    #[test]
    fn test_value() {
        let record = Record::new(0, 100.0, 2.0, 200.0);
        assert_eq!(TargetColumn::VolumeBtc.value(&record), 2.0);
        assert_eq!(TargetColumn::VolumeUsd.value(&record), 200.0);
    }

    #[test]
    fn test_display_and_serde() {
        assert_eq!(TargetColumn::VolumeUsd.to_string(), "Volume USD");
        let json = serde_json::to_string(&TargetColumn::VolumeBtc).unwrap();
        assert_eq!(json, "\"volume_btc\"");
        let parsed: TargetColumn = serde_json::from_str("\"volume_usd\"").unwrap();
        assert_eq!(parsed, TargetColumn::VolumeUsd);
    }
}
