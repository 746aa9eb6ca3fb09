// streampack Output - Telemetry output for streaming ingestion
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # streampack Output - Telemetry output for streaming ingestion
//!
//! This crate wires the streampack record pipeline into an output that
//! accepts telemetry points and ships them to a stream.
//!
//! ## Features
//!
//! - **Line protocol**: points are serialized one line each before packing
//! - **Partition strategies**: static, tag, measurement or random keys
//! - **Service limits**: configuration is validated against the ingestion
//!   service's record and request ceilings
//! - **JSON configuration**: every setting has a default
//!
//! ## Quick Start
//!
//! ```rust
//! use streampack::MemoryTransport;
//! use streampack_output::{OutputConfig, PartitionStrategy, Point, StreamOutput};
//!
//! let config = OutputConfig {
//!     partition: PartitionStrategy::Measurement,
//!     ..OutputConfig::for_stream("telemetry")
//! };
//! let mut output = StreamOutput::connect(config, MemoryTransport::new()).unwrap();
//!
//! let points = vec![
//!     Point::new("temperature", 1000).with_field("value", 22.5),
//!     Point::new("humidity", 1000).with_field("value", 65.0),
//! ];
//! let report = output.write(points).unwrap();
//!
//! // Both points fit into a single gzip record keyed by the first measurement
//! let record = &output.transport().delivered()[0];
//! assert_eq!(record.item_count(), 2);
//! assert_eq!(record.partition_key(), "temperature");
//! assert!(report.is_complete());
//! ```
//!
//! ## Architecture
//!
//! ```text
//! points ──▶ LineProtocol ──▶ RecordGenerator ──▶ BatchAssembler ──▶ Transport
//!                                  ▲                    │
//!                                  │              failed records
//!                           PartitionStrategy           ▼
//!                                              RetryCoordinator ──▶ ReplaySet
//! ```

mod config;
mod error;
mod line_protocol;
mod output;
mod partition;
mod point;

// Public API
pub use config::{OutputConfig, MIN_RECORD_SIZE};
pub use error::{OutputError, Result};
pub use line_protocol::LineProtocol;
pub use output::StreamOutput;
pub use partition::{PartitionStrategy, DEFAULT_PARTITION_KEY};
pub use point::{FieldValue, Point};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
