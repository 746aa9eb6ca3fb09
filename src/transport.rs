// streampack - Compressed record packing for streaming ingestion
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Transport abstraction
//!
//! A [`Transport`] submits one batch of records to the ingestion service and
//! reports, per record, whether it was accepted. [`MemoryTransport`] keeps
//! every request in memory and can be scripted to fail, for tests and local
//! pipelines.

use crate::record::Record;
use std::fmt;
use thiserror::Error;

/// The request itself failed; no record of the batch was accepted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Service cannot be reached
    #[error("Disconnected: {reason}")]
    Disconnected { reason: String },

    /// Request timed out
    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Service rejected the whole request
    #[error("Request rejected: {0}")]
    Rejected(String),
}

/// Per-record result of a batch submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Record was accepted by the service
    Delivered,
    /// Record was refused and may be retried
    Failed {
        /// Service error code (e.g. throughput exceeded)
        code: String,
        /// Human readable detail
        message: String,
    },
}

impl RecordOutcome {
    /// Create a failed outcome
    pub fn failed(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Check if the record was accepted
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

/// Batch submission to a record-oriented ingestion service
pub trait Transport {
    /// Submit a batch, returning one outcome per record in batch order
    ///
    /// Outcomes missing from the end of the list count as failures.
    fn put_records(&mut self, batch: &[Record]) -> Result<Vec<RecordOutcome>, TransportError>;

    /// Check that the destination exists and is reachable
    fn verify(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}

type Responder = Box<dyn FnMut(usize, &[Record]) -> Result<Vec<RecordOutcome>, TransportError>>;

/// In-memory transport that records every request
///
/// By default every record is accepted. A responder installed with
/// [`respond_with`](Self::respond_with) decides the outcome of each call; it
/// receives the zero-based call number and the batch.
pub struct MemoryTransport {
    requests: Vec<Vec<Record>>,
    delivered: Vec<Record>,
    responder: Option<Responder>,
    is_open: bool,
}

impl MemoryTransport {
    /// Create a transport that accepts everything
    pub fn new() -> Self {
        Self {
            requests: Vec::new(),
            delivered: Vec::new(),
            responder: None,
            is_open: true,
        }
    }

    /// Decide outcomes with a custom responder
    pub fn respond_with<F>(mut self, responder: F) -> Self
    where
        F: FnMut(usize, &[Record]) -> Result<Vec<RecordOutcome>, TransportError> + 'static,
    {
        self.responder = Some(Box::new(responder));
        self
    }

    /// Every batch submitted so far, in order
    pub fn requests(&self) -> &[Vec<Record>] {
        &self.requests
    }

    /// Number of `put_records` calls
    pub fn call_count(&self) -> usize {
        self.requests.len()
    }

    /// Records the transport accepted
    pub fn delivered(&self) -> &[Record] {
        &self.delivered
    }

    /// Total items carried by accepted records
    pub fn delivered_items(&self) -> usize {
        self.delivered.iter().map(Record::item_count).sum()
    }

    /// Close the transport; later calls fail with `Disconnected`
    pub fn close(&mut self) {
        self.is_open = false;
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryTransport")
            .field("requests", &self.requests.len())
            .field("delivered", &self.delivered.len())
            .field("is_open", &self.is_open)
            .finish()
    }
}

impl Transport for MemoryTransport {
    fn put_records(&mut self, batch: &[Record]) -> Result<Vec<RecordOutcome>, TransportError> {
        let call = self.requests.len();
        self.requests.push(batch.to_vec());

        if !self.is_open {
            return Err(TransportError::Disconnected {
                reason: "Transport is closed".to_string(),
            });
        }

        let outcomes = match self.responder.as_mut() {
            Some(responder) => responder(call, batch)?,
            None => vec![RecordOutcome::Delivered; batch.len()],
        };

        for (record, outcome) in batch.iter().zip(&outcomes) {
            if outcome.is_delivered() {
                self.delivered.push(record.clone());
            }
        }
        Ok(outcomes)
    }

    fn verify(&mut self) -> Result<(), TransportError> {
        if self.is_open {
            Ok(())
        } else {
            Err(TransportError::Disconnected {
                reason: "Transport is closed".to_string(),
            })
        }
    }
}
