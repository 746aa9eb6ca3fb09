// streampack - Compressed record packing for streaming ingestion
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Records and record sources
//!
//! A [`Record`] is one finalized gzip payload plus the partition key it is
//! addressed with. Records are pulled from a [`RecordSource`]: either the
//! live [`RecordGenerator`](crate::generator::RecordGenerator) or a
//! [`ReplaySet`] of records that failed an earlier pass.

use crate::error::Result;
use std::collections::VecDeque;

/// One compressed, addressable unit submitted to the ingestion service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    payload: Vec<u8>,
    partition_key: String,
    item_count: usize,
    wire_size: usize,
}

impl Record {
    /// Create a record from a finished payload
    ///
    /// The partition key counts towards the request size by its UTF-8 length.
    pub fn new(payload: Vec<u8>, partition_key: String, item_count: usize) -> Self {
        let wire_size = payload.len() + partition_key.len();
        Self {
            payload,
            partition_key,
            item_count,
            wire_size,
        }
    }

    /// Compressed payload bytes
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Partition key the record is addressed with
    pub fn partition_key(&self) -> &str {
        &self.partition_key
    }

    /// Number of items packed into this record
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Contribution to the cumulative request size
    pub fn wire_size(&self) -> usize {
        self.wire_size
    }

    /// Consume the record, returning its payload
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }
}

/// Pull-based sequence of records
///
/// `Ok(None)` marks the end of the sequence and keeps being returned on
/// every later call.
pub trait RecordSource {
    /// Produce the next record, or `None` once exhausted
    fn next_record(&mut self) -> Result<Option<Record>>;
}

/// Replays a fixed list of records in their original order
#[derive(Debug, Default)]
pub struct ReplaySet {
    records: VecDeque<Record>,
}

impl ReplaySet {
    /// Wrap already materialized records
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: records.into(),
        }
    }

    /// Records not yet replayed
    pub fn remaining(&self) -> usize {
        self.records.len()
    }

    /// Check if every record has been replayed
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordSource for ReplaySet {
    fn next_record(&mut self) -> Result<Option<Record>> {
        Ok(self.records.pop_front())
    }
}

impl From<Vec<Record>> for ReplaySet {
    fn from(records: Vec<Record>) -> Self {
        Self::new(records)
    }
}
