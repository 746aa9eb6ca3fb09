// streampack - Compressed record packing for streaming ingestion
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Record generation
//!
//! The [`RecordGenerator`] packs serialized items into gzip records that never
//! exceed a byte budget. Before each write it asks the
//! [`SizeEstimator`] for the worst-case size of the record with the item
//! added. When that bound fails while unflushed bytes are outstanding, the
//! encoder is flushed and the bound recomputed from the measured length, so
//! records are only cut once the measured stream really is close to full.
//!
//! # Example
//!
//! ```rust
//! use streampack::{FixedKey, RecordGenerator, SerializeError, Serializer};
//!
//! struct Lines;
//!
//! impl Serializer<String> for Lines {
//!     fn serialize(&self, item: &String) -> Result<Vec<u8>, SerializeError> {
//!         Ok(format!("{}\n", item).into_bytes())
//!     }
//! }
//!
//! let mut generator = RecordGenerator::new(1024, Lines, FixedKey::new("pk")).unwrap();
//! generator.reset(vec!["cpu usage=1".to_string(), "cpu usage=2".to_string()]);
//!
//! let record = generator.next_record().unwrap().unwrap();
//! assert_eq!(record.item_count(), 2);
//! assert!(generator.next_record().unwrap().is_none());
//! ```

use crate::error::{PackError, Result};
use crate::estimator::{min_record_budget, SizeEstimator};
use crate::item::{KeyProvider, Serializer};
use crate::record::{Record, RecordSource};
use flate2::write::GzEncoder;
use flate2::Compression;
use log::warn;
use std::io::Write;

/// Where the generator is in its item sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorState {
    /// No items have been loaded yet
    Idle,
    /// Items remain to be packed
    Scanning,
    /// A record was just cut and the item that did not fit is next
    Yielding,
    /// Every item has been packed or dropped
    Exhausted,
}

/// Packs items into size-bounded gzip records
///
/// The generator owns its encoder exclusively. It is reused across delivery
/// calls through [`reset`](Self::reset) and must not be shared between
/// concurrent calls.
pub struct RecordGenerator<T, S, K> {
    serializer: S,
    keys: K,
    max_record_bytes: usize,
    level: Compression,
    items: Vec<T>,
    loaded: bool,
    yielded: bool,
    index: usize,
    /// Serialized bytes of `items[index]` that did not fit the last record
    carried: Option<Vec<u8>>,
    encoder: GzEncoder<Vec<u8>>,
    estimator: SizeEstimator,
}

impl<T, S, K> RecordGenerator<T, S, K>
where
    S: Serializer<T>,
    K: KeyProvider<T>,
{
    /// Create a generator using the best compression level
    pub fn new(max_record_bytes: usize, serializer: S, keys: K) -> Result<Self> {
        Self::with_level(max_record_bytes, serializer, keys, Compression::best())
    }

    /// Create a generator with a custom compression level
    pub fn with_level(
        max_record_bytes: usize,
        serializer: S,
        keys: K,
        level: Compression,
    ) -> Result<Self> {
        let min = min_record_budget();
        if max_record_bytes < min {
            return Err(PackError::InvalidConfig(format!(
                "max record size of {} bytes cannot hold gzip overhead, need at least {}",
                max_record_bytes, min
            )));
        }

        Ok(Self {
            serializer,
            keys,
            max_record_bytes,
            level,
            items: Vec::new(),
            loaded: false,
            yielded: false,
            index: 0,
            carried: None,
            encoder: GzEncoder::new(Vec::new(), level),
            estimator: SizeEstimator::new(),
        })
    }

    /// Discard any in-progress record and start over on `items`
    pub fn reset(&mut self, items: Vec<T>) {
        self.restart_stream();
        self.items = items;
        self.loaded = true;
        self.yielded = false;
        self.index = 0;
        self.carried = None;
    }

    /// Current state of the item scan
    pub fn state(&self) -> GeneratorState {
        if !self.loaded {
            GeneratorState::Idle
        } else if self.index >= self.items.len() {
            GeneratorState::Exhausted
        } else if self.yielded {
            GeneratorState::Yielding
        } else {
            GeneratorState::Scanning
        }
    }

    /// Index of the next item to be packed
    pub fn position(&self) -> usize {
        self.index
    }

    /// Byte budget of a single record
    pub fn max_record_bytes(&self) -> usize {
        self.max_record_bytes
    }

    /// Produce the next record, or `None` once every item is consumed
    pub fn next_record(&mut self) -> Result<Option<Record>> {
        let budget = self.max_record_bytes;
        let mut head = None;
        let mut folded = 0;
        self.yielded = false;

        while self.index < self.items.len() {
            let bytes = match self.carried.take() {
                Some(bytes) => bytes,
                None => match self.serializer.serialize(&self.items[self.index]) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        warn!(
                            "Dropping {}: {}",
                            self.serializer.describe(&self.items[self.index]),
                            e
                        );
                        self.index += 1;
                        continue;
                    }
                },
            };
            let len = bytes.len();

            // Tighten the bound before giving up on this record
            if !self.estimator.fits(len, budget) && self.estimator.pending() > 0 {
                self.encoder.flush()?;
                self.estimator.commit(self.encoder.get_ref().len());
            }

            if self.estimator.fits(len, budget) {
                self.encoder.write_all(&bytes)?;
                self.estimator.record_bytes(len);
                head.get_or_insert(self.index);
                folded += 1;
                self.index += 1;
                continue;
            }

            match head {
                None => {
                    warn!(
                        "Dropping excessively large {}: {} bytes cannot fit a {} byte record",
                        self.serializer.describe(&self.items[self.index]),
                        len,
                        budget
                    );
                    self.index += 1;
                }
                Some(head) => {
                    // Retried first on the next call
                    self.carried = Some(bytes);
                    self.yielded = true;
                    return self.finish_record(head, folded).map(Some);
                }
            }
        }

        match head {
            Some(head) => self.finish_record(head, folded).map(Some),
            None => Ok(None),
        }
    }

    fn finish_record(&mut self, head: usize, item_count: usize) -> Result<Record> {
        let payload = self.restart_stream().finish()?;
        if payload.len() > self.max_record_bytes {
            return Err(PackError::RecordOverflow {
                size: payload.len(),
                max: self.max_record_bytes,
            });
        }

        let partition_key = self.keys.partition_key(&self.items[head]);
        Ok(Record::new(payload, partition_key, item_count))
    }

    /// Swap in a fresh encoder, returning the previous one
    fn restart_stream(&mut self) -> GzEncoder<Vec<u8>> {
        self.estimator.reset();
        std::mem::replace(&mut self.encoder, GzEncoder::new(Vec::new(), self.level))
    }
}

impl<T, S, K> RecordSource for RecordGenerator<T, S, K>
where
    S: Serializer<T>,
    K: KeyProvider<T>,
{
    fn next_record(&mut self) -> Result<Option<Record>> {
        RecordGenerator::next_record(self)
    }
}
