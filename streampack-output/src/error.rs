// streampack Output - Telemetry output for streaming ingestion
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Error types for streampack Output

use thiserror::Error;

/// Main error type for output operations
#[derive(Error, Debug)]
pub enum OutputError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Record packing or delivery failed
    #[error("Packing error: {0}")]
    Pack(#[from] streampack::PackError),

    /// Destination could not be verified
    #[error("Transport error: {0}")]
    Transport(#[from] streampack::TransportError),

    /// Configuration file is not valid JSON
    #[error("Configuration parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Configuration file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for output operations
pub type Result<T> = std::result::Result<T, OutputError>;
