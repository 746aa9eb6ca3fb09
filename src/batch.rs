// streampack - Compressed record packing for streaming ingestion
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Batch assembly
//!
//! The [`BatchAssembler`] drains a [`RecordSource`] into requests that respect
//! both the record-count limit and the cumulative wire-size limit, submits
//! each one to a [`Transport`] and collects the records that failed.

use crate::config::DeliveryLimits;
use crate::error::Result;
use crate::record::{Record, RecordSource};
use crate::transport::{RecordOutcome, Transport};
use log::{debug, warn};
use std::time::Instant;

/// Result of draining one record source
#[derive(Debug, Default)]
pub struct Drained {
    /// Records that were not accepted, in submission order
    pub failed: Vec<Record>,
    /// Number of requests submitted
    pub requests: usize,
    /// Records accepted by the transport
    pub delivered_records: usize,
    /// Items carried by accepted records
    pub delivered_items: usize,
}

/// Records waiting to be submitted together
#[derive(Debug, Default)]
struct Batch {
    records: Vec<Record>,
    bytes: usize,
}

impl Batch {
    fn push(&mut self, record: Record) {
        self.bytes += record.wire_size();
        self.records.push(record);
    }

    fn take(&mut self) -> Vec<Record> {
        self.bytes = 0;
        std::mem::take(&mut self.records)
    }

    fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Groups records into size-bounded requests
#[derive(Debug, Clone)]
pub struct BatchAssembler {
    max_records: usize,
    max_bytes: usize,
}

impl BatchAssembler {
    /// Create an assembler with explicit request limits
    ///
    /// Zero limits are raised to one, so every record is still submitted.
    pub fn new(max_records_per_request: usize, max_request_bytes: usize) -> Self {
        Self {
            max_records: max_records_per_request.max(1),
            max_bytes: max_request_bytes.max(1),
        }
    }

    /// Create an assembler from delivery limits
    pub fn from_limits(limits: &DeliveryLimits) -> Self {
        Self::new(limits.max_records_per_request, limits.max_request_bytes)
    }

    /// Maximum records per request
    pub fn max_records(&self) -> usize {
        self.max_records
    }

    /// Maximum cumulative wire size per request
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Submit every record of `source`, returning the ones that failed
    ///
    /// Transport failures fail the whole batch and draining goes on. Only an
    /// error from the source itself aborts the drain.
    pub fn drain<S, T>(&self, source: &mut S, transport: &mut T) -> Result<Drained>
    where
        S: RecordSource + ?Sized,
        T: Transport + ?Sized,
    {
        let mut drained = Drained::default();
        let mut batch = Batch::default();

        while let Some(record) = source.next_record()? {
            let too_many = batch.records.len() + 1 > self.max_records;
            let too_big = batch.bytes + record.wire_size() > self.max_bytes;
            if !batch.is_empty() && (too_many || too_big) {
                self.submit(batch.take(), transport, &mut drained);
            }
            batch.push(record);
        }

        if !batch.is_empty() {
            self.submit(batch.take(), transport, &mut drained);
        }

        Ok(drained)
    }

    fn submit<T>(&self, records: Vec<Record>, transport: &mut T, drained: &mut Drained)
    where
        T: Transport + ?Sized,
    {
        let total = records.len();
        let start = Instant::now();
        let response = transport.put_records(&records);
        let elapsed = start.elapsed();
        drained.requests += 1;

        let outcomes = match response {
            Ok(outcomes) => outcomes,
            Err(e) => {
                warn!(
                    "Unable to write {} record(s) in {:?}: {}",
                    total, elapsed, e
                );
                drained.failed.extend(records);
                return;
            }
        };

        let mut outcomes = outcomes.into_iter();
        let mut delivered = 0;
        for record in records {
            match outcomes.next() {
                Some(RecordOutcome::Delivered) => {
                    delivered += 1;
                    drained.delivered_items += record.item_count();
                }
                _ => drained.failed.push(record),
            }
        }
        drained.delivered_records += delivered;

        debug!(
            "Wrote {} of {} record(s) in {:?}",
            delivered, total, elapsed
        );
    }
}
