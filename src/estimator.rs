// streampack - Compressed record packing for streaming ingestion
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Worst-case size estimation for a gzip stream being written
//!
//! The [`SizeEstimator`] answers "how large could this record become if I
//! wrote `n` more bytes?" without flushing the encoder. It combines the
//! stream length measured at the last flush (committed) with the raw bytes
//! written since then (pending), inflated by the deflate worst-case block
//! overhead. A sync flush of the pending bytes is also reserved, so flushing
//! never grows the stream past a size the bound already admitted.
//!
//! ```text
//! max_potential_size(n) = committed + bounded_growth(pending + n) + SYNC_FLUSH_OVERHEAD
//! bounded_growth(n)     = n + 5 * (n / 16383 + 1)
//! ```

/// Gzip member header emitted before the first deflate block
pub const GZIP_HEADER_LEN: usize = 10;

/// Gzip member trailer (CRC32 + ISIZE)
pub const GZIP_TRAILER_LEN: usize = 8;

/// Room for the final deflate block written when the stream is finished
///
/// At level 0 this is an empty stored block: 3 header bits, padding and
/// the LEN/NLEN pair.
pub const FINISH_BLOCK_ALLOWANCE: usize = 5;

/// Bytes reserved beyond the last measured flush
pub const TRAILER_ALLOWANCE: usize = GZIP_TRAILER_LEN + FINISH_BLOCK_ALLOWANCE;

/// Empty stored block a sync flush appends after the pending data
pub const SYNC_FLUSH_OVERHEAD: usize = 5;

/// Worst-case overhead of one deflate block
pub const BLOCK_OVERHEAD: usize = 5;

/// Raw bytes covered by one unit of block overhead
pub const BLOCK_SIZE: usize = 16383;

/// Upper bound on the deflate output for `n` raw bytes
pub fn bounded_growth(n: usize) -> usize {
    n + BLOCK_OVERHEAD * (n / BLOCK_SIZE + 1)
}

/// Conservative size tracker for one in-progress record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeEstimator {
    committed: usize,
    pending: usize,
}

impl SizeEstimator {
    /// Estimator for a fresh stream whose header has not been emitted yet
    pub fn new() -> Self {
        Self {
            committed: GZIP_HEADER_LEN + TRAILER_ALLOWANCE,
            pending: 0,
        }
    }

    /// Account for `n` raw bytes written to the encoder
    pub fn record_bytes(&mut self, n: usize) {
        self.pending += n;
    }

    /// Account for a flush that left the stream at `flushed_len` bytes
    pub fn commit(&mut self, flushed_len: usize) {
        self.committed = flushed_len + TRAILER_ALLOWANCE;
        self.pending = 0;
    }

    /// Upper bound on the finished record size after `additional` more bytes
    pub fn max_potential_size(&self, additional: usize) -> usize {
        self.committed + bounded_growth(self.pending + additional) + SYNC_FLUSH_OVERHEAD
    }

    /// Check whether `additional` bytes can be written without exceeding `budget`
    pub fn fits(&self, additional: usize, budget: usize) -> bool {
        self.max_potential_size(additional) <= budget
    }

    /// Return to the state of a fresh stream
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Committed bytes, trailer allowance included
    pub fn committed(&self) -> usize {
        self.committed
    }

    /// Raw bytes written since the last flush
    pub fn pending(&self) -> usize {
        self.pending
    }
}

impl Default for SizeEstimator {
    fn default() -> Self {
        Self::new()
    }
}

/// Smallest budget that can hold a record with one byte of payload
pub fn min_record_budget() -> usize {
    SizeEstimator::new().max_potential_size(1)
}
