// streampack - Compressed record packing for streaming ingestion
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Delivery limits
//!
//! Defaults follow the Kinesis `PutRecords` API limits.

use crate::error::{PackError, Result};
use crate::estimator::min_record_budget;

/// Service limit on records per request
pub const SERVICE_MAX_RECORDS_PER_REQUEST: usize = 500;

/// Service limit on a single record (1 MiB)
pub const SERVICE_MAX_RECORD_BYTES: usize = 1_048_576;

/// Service limit on a whole request (5 MiB)
pub const SERVICE_MAX_REQUEST_BYTES: usize = 5_242_880;

/// Retry passes before failed records are dropped
pub const DEFAULT_MAX_RETRIES: u32 = 10;

/// Limits enforced while packing and batching records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryLimits {
    /// Maximum compressed bytes per record
    pub max_record_bytes: usize,
    /// Maximum records per request
    pub max_records_per_request: usize,
    /// Maximum cumulative wire size per request
    pub max_request_bytes: usize,
    /// Retry passes over failed records
    pub max_retries: u32,
}

impl Default for DeliveryLimits {
    fn default() -> Self {
        Self {
            max_record_bytes: SERVICE_MAX_RECORD_BYTES,
            max_records_per_request: SERVICE_MAX_RECORDS_PER_REQUEST,
            max_request_bytes: SERVICE_MAX_REQUEST_BYTES,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl DeliveryLimits {
    /// Default limits with a custom record budget
    pub fn with_max_record_bytes(max_record_bytes: usize) -> Self {
        Self {
            max_record_bytes,
            ..Default::default()
        }
    }

    /// Check the limits can produce and batch at least one record
    pub fn validate(&self) -> Result<()> {
        let min = min_record_budget();
        if self.max_record_bytes < min {
            return Err(PackError::InvalidConfig(format!(
                "max_record_bytes must be at least {} bytes, got {}",
                min, self.max_record_bytes
            )));
        }
        if self.max_records_per_request == 0 {
            return Err(PackError::InvalidConfig(
                "max_records_per_request must be greater than 0".to_string(),
            ));
        }
        if self.max_request_bytes == 0 {
            return Err(PackError::InvalidConfig(
                "max_request_bytes must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
