// streampack Output - Telemetry output for streaming ingestion
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Configuration types for streampack Output

use crate::error::{OutputError, Result};
use crate::partition::PartitionStrategy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use streampack::{
    Backoff, DeliveryLimits, DEFAULT_MAX_RETRIES, SERVICE_MAX_RECORDS_PER_REQUEST,
    SERVICE_MAX_RECORD_BYTES, SERVICE_MAX_REQUEST_BYTES,
};

/// Smallest record size accepted from configuration
pub const MIN_RECORD_SIZE: usize = 1000;

/// Output configuration
///
/// Every field has a default, so a configuration file only needs the
/// stream name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Destination stream, must exist before connecting
    pub stream_name: String,

    /// Retry passes over failed records (default: 10)
    pub max_record_retries: u32,

    /// Maximum compressed record size in bytes (default: 1 MiB)
    pub max_record_size: usize,

    /// Maximum records per request (default: 500)
    pub max_records_per_request: usize,

    /// Maximum request size in bytes (default: 5 MiB)
    pub max_request_size: usize,

    /// Gzip level 0-9 (default: 9)
    pub compression_level: u32,

    /// Partition key strategy (default: random)
    pub partition: PartitionStrategy,

    /// Delay before each retry pass in milliseconds, 0 retries immediately
    pub retry_delay_ms: u64,

    /// When set, the retry delay doubles up to this many milliseconds
    pub retry_max_delay_ms: Option<u64>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            stream_name: String::new(),
            max_record_retries: DEFAULT_MAX_RETRIES,
            max_record_size: SERVICE_MAX_RECORD_BYTES,
            max_records_per_request: SERVICE_MAX_RECORDS_PER_REQUEST,
            max_request_size: SERVICE_MAX_REQUEST_BYTES,
            compression_level: 9,
            partition: PartitionStrategy::default(),
            retry_delay_ms: 0,
            retry_max_delay_ms: None,
        }
    }
}

impl OutputConfig {
    /// Default configuration for a stream
    pub fn for_stream(stream_name: impl Into<String>) -> Self {
        Self {
            stream_name: stream_name.into(),
            ..Default::default()
        }
    }

    /// Parse a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Check values against the service limits
    pub fn validate(&self) -> Result<()> {
        if self.stream_name.is_empty() {
            return Err(invalid("stream_name is required"));
        }
        if self.max_record_size < MIN_RECORD_SIZE {
            return Err(invalid(format!(
                "max_record_size must be at least {} bytes",
                MIN_RECORD_SIZE
            )));
        }
        if self.max_record_size > SERVICE_MAX_RECORD_BYTES {
            return Err(invalid(format!(
                "max_record_size must be less than or equal to the service limit of {} bytes",
                SERVICE_MAX_RECORD_BYTES
            )));
        }
        if self.max_records_per_request == 0
            || self.max_records_per_request > SERVICE_MAX_RECORDS_PER_REQUEST
        {
            return Err(invalid(format!(
                "max_records_per_request must be between 1 and {}",
                SERVICE_MAX_RECORDS_PER_REQUEST
            )));
        }
        if self.max_request_size == 0 || self.max_request_size > SERVICE_MAX_REQUEST_BYTES {
            return Err(invalid(format!(
                "max_request_size must be between 1 and {} bytes",
                SERVICE_MAX_REQUEST_BYTES
            )));
        }
        if self.compression_level > 9 {
            return Err(invalid("compression_level must be between 0 and 9"));
        }
        Ok(())
    }

    /// Packing and batching limits
    pub fn limits(&self) -> DeliveryLimits {
        DeliveryLimits {
            max_record_bytes: self.max_record_size,
            max_records_per_request: self.max_records_per_request,
            max_request_bytes: self.max_request_size,
            max_retries: self.max_record_retries,
        }
    }

    /// Delay policy between retry passes
    pub fn backoff(&self) -> Backoff {
        let initial = Duration::from_millis(self.retry_delay_ms);
        match (self.retry_delay_ms, self.retry_max_delay_ms) {
            (0, _) => Backoff::None,
            (_, None) => Backoff::Fixed(initial),
            (_, Some(max_ms)) => Backoff::Exponential {
                initial,
                max: Duration::from_millis(max_ms),
                multiplier: 2.0,
            },
        }
    }
}

fn invalid(message: impl Into<String>) -> OutputError {
    OutputError::InvalidConfig(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_config_default() {
        let config = OutputConfig::default();
        assert_eq!(config.max_record_retries, 10);
        assert_eq!(config.max_record_size, 1_048_576);
        assert_eq!(config.max_records_per_request, 500);
        assert_eq!(config.max_request_size, 5_242_880);
        assert_eq!(config.compression_level, 9);
        assert_eq!(config.partition, PartitionStrategy::Random);
        assert_eq!(config.backoff(), Backoff::None);
    }

    #[test]
    fn test_stream_name_required() {
        let config = OutputConfig::default();
        assert!(matches!(
            config.validate(),
            Err(OutputError::InvalidConfig(_))
        ));
        assert!(OutputConfig::for_stream("metrics").validate().is_ok());
    }

    #[test]
    fn test_record_size_bounds() {
        let mut config = OutputConfig::for_stream("metrics");
        config.max_record_size = 999;
        assert!(config.validate().is_err());

        config.max_record_size = 1000;
        assert!(config.validate().is_ok());

        config.max_record_size = SERVICE_MAX_RECORD_BYTES + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_request_bounds() {
        let mut config = OutputConfig::for_stream("metrics");
        config.max_records_per_request = 501;
        assert!(config.validate().is_err());

        let mut config = OutputConfig::for_stream("metrics");
        config.max_request_size = 0;
        assert!(config.validate().is_err());

        let mut config = OutputConfig::for_stream("metrics");
        config.compression_level = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_partial() {
        let config = OutputConfig::from_json(
            r#"{
                "stream_name": "StreamName",
                "max_record_retries": 3,
                "partition": { "method": "static", "key": "-" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.stream_name, "StreamName");
        assert_eq!(config.max_record_retries, 3);
        assert_eq!(config.partition, PartitionStrategy::fixed("-"));
        assert_eq!(config.max_record_size, SERVICE_MAX_RECORD_BYTES);
    }

    #[test]
    fn test_from_json_invalid() {
        let result = OutputConfig::from_json("{ not json");
        assert!(matches!(result, Err(OutputError::Parse(_))));
    }

    #[test]
    fn test_limits_mapping() {
        let mut config = OutputConfig::for_stream("metrics");
        config.max_record_size = 2048;
        config.max_record_retries = 0;
        let limits = config.limits();
        assert_eq!(limits.max_record_bytes, 2048);
        assert_eq!(limits.max_retries, 0);
        assert!(limits.validate().is_ok());
    }

    #[test]
    fn test_backoff_from_config() {
        let mut config = OutputConfig::for_stream("metrics");
        config.retry_delay_ms = 100;
        assert_eq!(config.backoff(), Backoff::Fixed(Duration::from_millis(100)));

        config.retry_max_delay_ms = Some(1000);
        assert_eq!(
            config.backoff(),
            Backoff::Exponential {
                initial: Duration::from_millis(100),
                max: Duration::from_millis(1000),
                multiplier: 2.0,
            }
        );
    }
}
