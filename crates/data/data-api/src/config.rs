//! CSV column mapping and cleansing options.

use data_spi::{DataError, Result};
use serde::{Deserialize, Serialize};

/// How CSV columns map onto record fields.
///
/// Defaults match the CryptoDataDownload hourly export
/// (`unix,date,symbol,open,high,low,close,Volume BTC,Volume USD`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvConfig {
    /// Unix-seconds timestamp column (default: `unix`)
    pub timestamp_column: String,
    /// Close price column (default: `close`)
    pub price_column: String,
    /// Base-currency volume column (default: `Volume BTC`)
    pub volume_btc_column: String,
    /// Quote-currency volume column (default: `Volume USD`)
    pub volume_usd_column: String,
    /// Skip a first line that is not the header (default: true)
    pub skip_banner: bool,
    /// Fail on the first bad row instead of dropping it (default: false)
    pub strict: bool,
    /// Field delimiter (default: `,`)
    pub delimiter: u8,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            timestamp_column: "unix".to_string(),
            price_column: "close".to_string(),
            volume_btc_column: "Volume BTC".to_string(),
            volume_usd_column: "Volume USD".to_string(),
            skip_banner: true,
            strict: false,
            delimiter: b',',
        }
    }
}

impl CsvConfig {
    pub fn builder() -> CsvConfigBuilder {
        CsvConfigBuilder::new()
    }

    /// Required columns in record field order.
    pub fn required_columns(&self) -> [&str; 4] {
        [
            self.timestamp_column.as_str(),
            self.price_column.as_str(),
            self.volume_btc_column.as_str(),
            self.volume_usd_column.as_str(),
        ]
    }

    /// Reject empty or duplicated column names.
    pub fn validate(&self) -> Result<()> {
        let columns = self.required_columns();
        if let Some(empty) = columns.iter().position(|c| c.trim().is_empty()) {
            return Err(DataError::ConfigError(format!(
                "column name #{} is empty",
                empty + 1
            )));
        }
        for (i, a) in columns.iter().enumerate() {
            if columns[i + 1..].contains(a) {
                return Err(DataError::ConfigError(format!(
                    "column '{}' is mapped to more than one field",
                    a
                )));
            }
        }
        Ok(())
    }
}

/// Builder for CsvConfig.
#[derive(Debug, Default)]
pub struct CsvConfigBuilder {
    config: CsvConfig,
}

impl CsvConfigBuilder {
    /// Create a new builder starting from the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timestamp_column(mut self, name: &str) -> Self {
        self.config.timestamp_column = name.to_string();
        self
    }

    pub fn price_column(mut self, name: &str) -> Self {
        self.config.price_column = name.to_string();
        self
    }

    pub fn volume_btc_column(mut self, name: &str) -> Self {
        self.config.volume_btc_column = name.to_string();
        self
    }

    pub fn volume_usd_column(mut self, name: &str) -> Self {
        self.config.volume_usd_column = name.to_string();
        self
    }

    pub fn skip_banner(mut self, skip: bool) -> Self {
        self.config.skip_banner = skip;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.config.strict = strict;
        self
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.config.delimiter = delimiter;
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<CsvConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
