// streampack - Compressed record packing for streaming ingestion
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Error types for streampack
//!
//! Only failures that abort a delivery call live in [`PackError`]. Item-level
//! and record-level failures are recovered where they happen and never reach
//! the caller; their error types are defined next to the traits that produce
//! them ([`SerializeError`](crate::item::SerializeError) and
//! [`TransportError`](crate::transport::TransportError)).

use thiserror::Error;

/// Result type alias for streampack operations
pub type Result<T> = std::result::Result<T, PackError>;

/// Fatal errors for record generation and delivery
#[derive(Error, Debug)]
pub enum PackError {
    /// The compression stream failed to write, flush or finish
    #[error("Compression stream error: {0}")]
    Stream(#[from] std::io::Error),

    /// A finished record is larger than the estimator allowed
    #[error("Record overflow: {size} bytes exceeds maximum {max}")]
    RecordOverflow { size: usize, max: usize },

    /// Limits are inconsistent or too small to ever produce a record
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
