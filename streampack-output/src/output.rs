// streampack Output - Telemetry output for streaming ingestion
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! High-level output API
//!
//! [`StreamOutput`] ties a validated [`OutputConfig`], a record generator over
//! line-protocol points and a retry coordinator to one [`Transport`].
//!
//! # Example
//!
//! ```rust
//! use streampack::MemoryTransport;
//! use streampack_output::{OutputConfig, Point, StreamOutput};
//!
//! let config = OutputConfig::for_stream("telemetry");
//! let mut output = StreamOutput::connect(config, MemoryTransport::new()).unwrap();
//!
//! let point = Point::new("temp", 1_700_000_000_000_000_000)
//!     .with_tag("room", "lab")
//!     .with_field("celsius", 22.5);
//! let report = output.write(vec![point]).unwrap();
//!
//! assert!(report.is_complete());
//! assert_eq!(output.transport().call_count(), 1);
//! ```

use crate::config::OutputConfig;
use crate::error::Result;
use crate::line_protocol::LineProtocol;
use crate::partition::PartitionStrategy;
use crate::point::Point;
use log::info;
use streampack::{Compression, DeliveryReport, RecordGenerator, RetryCoordinator, Transport};

/// Ships points to one stream through a transport
pub struct StreamOutput<T> {
    config: OutputConfig,
    generator: RecordGenerator<Point, LineProtocol, PartitionStrategy>,
    coordinator: RetryCoordinator,
    transport: T,
}

impl<T: Transport> StreamOutput<T> {
    /// Validate the configuration and verify the destination
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration is outside the service limits
    /// - The transport cannot reach the stream
    pub fn connect(config: OutputConfig, mut transport: T) -> Result<Self> {
        config.validate()?;
        let limits = config.limits();
        limits.validate()?;

        let generator = RecordGenerator::with_level(
            limits.max_record_bytes,
            LineProtocol,
            config.partition.clone(),
            Compression::new(config.compression_level),
        )?;
        let coordinator = RetryCoordinator::from_limits(&limits).with_backoff(config.backoff());

        transport.verify()?;
        info!(
            "Connected to stream '{}' (max record {} bytes, {} retries)",
            config.stream_name, limits.max_record_bytes, limits.max_retries
        );

        Ok(Self {
            config,
            generator,
            coordinator,
            transport,
        })
    }

    /// Deliver a group of points
    ///
    /// Points that cannot be serialized or are too large for a record are
    /// dropped with a warning. Records still failing after the configured
    /// retries are dropped and counted in the report.
    ///
    /// # Errors
    ///
    /// Returns an error only if the compression stream fails.
    pub fn write(&mut self, points: Vec<Point>) -> Result<DeliveryReport> {
        if points.is_empty() {
            return Ok(DeliveryReport::default());
        }

        self.generator.reset(points);
        let report = self
            .coordinator
            .deliver(&mut self.generator, &mut self.transport)?;
        Ok(report)
    }

    /// Get a reference to the output configuration
    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    /// Get a reference to the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get a mutable reference to the transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Shut the output down, handing back the transport
    pub fn close(self) -> T {
        self.transport
    }
}
