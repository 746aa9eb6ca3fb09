//! # streampack - Size-bounded gzip records for streaming ingestion
//!
//! Streaming ingestion services such as Kinesis enforce three independent
//! limits: bytes per record, records per request and bytes per request.
//! streampack packs serialized items into gzip records that never exceed the
//! record limit, groups records into requests under the other two, and
//! retries only the records a request reports as failed.
//!
//! ## Key Features
//!
//! - **Estimate before write**: a worst-case deflate bound decides whether an
//!   item fits before any compression work is spent on it
//! - **Lazy flushing**: the encoder is only flushed when the bound gets tight
//! - **Partial retries**: failed records are replayed as-is, never recompressed
//! - **Pluggable collaborators**: serializer, partition keys and transport are traits
//!
//! ## Quick Start
//!
//! ```rust
//! use streampack::{
//!     DeliveryLimits, FixedKey, MemoryTransport, RecordGenerator, RetryCoordinator,
//!     SerializeError, Serializer,
//! };
//!
//! struct Lines;
//!
//! impl Serializer<String> for Lines {
//!     fn serialize(&self, item: &String) -> Result<Vec<u8>, SerializeError> {
//!         Ok(format!("{}\n", item).into_bytes())
//!     }
//! }
//!
//! let limits = DeliveryLimits::default();
//! let mut generator =
//!     RecordGenerator::new(limits.max_record_bytes, Lines, FixedKey::new("sensors")).unwrap();
//! let coordinator = RetryCoordinator::from_limits(&limits);
//! let mut transport = MemoryTransport::new();
//!
//! generator.reset(vec!["temp value=22.5".to_string(), "temp value=22.6".to_string()]);
//! let report = coordinator.deliver(&mut generator, &mut transport).unwrap();
//!
//! assert!(report.is_complete());
//! assert_eq!(report.delivered_items, 2);
//! ```
//!
//! ## Modules
//!
//! - [`estimator`]: Worst-case compressed size bound
//! - [`generator`]: Packing items into gzip records
//! - [`record`]: Records, record sources and replay sets
//! - [`batch`]: Request assembly under count and size limits
//! - [`retry`]: Retry passes over failed records
//! - [`transport`]: Delivery abstraction and in-memory transport
//! - [`item`]: Serializer and partition key traits

// Modules
pub mod batch;
pub mod config;
pub mod error;
pub mod estimator;
pub mod generator;
pub mod item;
pub mod record;
pub mod retry;
pub mod transport;

// Re-exports for convenient access
pub use batch::{BatchAssembler, Drained};
pub use config::{
    DeliveryLimits, DEFAULT_MAX_RETRIES, SERVICE_MAX_RECORDS_PER_REQUEST, SERVICE_MAX_RECORD_BYTES,
    SERVICE_MAX_REQUEST_BYTES,
};
pub use error::{PackError, Result};
pub use estimator::{bounded_growth, min_record_budget, SizeEstimator};
pub use generator::{GeneratorState, RecordGenerator};
pub use item::{FixedKey, KeyProvider, RandomKey, SerializeError, Serializer};
pub use record::{Record, RecordSource, ReplaySet};
pub use retry::{Backoff, DeliveryReport, RetryCoordinator};
pub use transport::{MemoryTransport, RecordOutcome, Transport, TransportError};

/// Re-exported so hosts can pick a level without depending on flate2
pub use flate2::Compression;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
