// streampack - Compressed record packing for streaming ingestion
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Retry coordination
//!
//! The [`RetryCoordinator`] runs the [`BatchAssembler`] over a record source,
//! then keeps replaying only the records that failed until they are all
//! delivered or the retry ceiling is reached. Records still failing after the
//! last permitted pass are dropped and reported once.

use crate::batch::BatchAssembler;
use crate::config::DeliveryLimits;
use crate::error::Result;
use crate::record::{RecordSource, ReplaySet};
use crate::transport::Transport;
use log::{debug, error};
use std::time::{Duration, Instant};

/// Delay between retry passes
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Backoff {
    /// Retry immediately
    #[default]
    None,
    /// Constant delay before every pass
    Fixed(Duration),
    /// Delay grows geometrically with each pass
    Exponential {
        /// Delay before the first retry
        initial: Duration,
        /// Upper bound on any delay
        max: Duration,
        /// Growth factor per pass
        multiplier: f64,
    },
}

impl Backoff {
    /// Exponential backoff doubling from `initial`, capped at 30 seconds
    pub fn exponential(initial: Duration) -> Self {
        Self::Exponential {
            initial,
            max: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }

    /// Delay before retry pass `attempt` (1-indexed)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        match self {
            Self::None => Duration::ZERO,
            Self::Fixed(delay) => *delay,
            Self::Exponential {
                initial,
                max,
                multiplier,
            } => {
                let exp = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
                let delay_ms = initial.as_millis() as f64 * multiplier.powi(exp);
                let max_ms = max.as_millis() as f64;
                Duration::from_millis(delay_ms.min(max_ms) as u64)
            }
        }
    }
}

/// Outcome of one delivery call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Passes over the record source, first pass included
    pub passes: u32,
    /// Requests submitted across all passes
    pub requests: usize,
    /// Records accepted by the transport
    pub delivered_records: usize,
    /// Items carried by accepted records
    pub delivered_items: usize,
    /// Records given up on after the last retry
    pub dropped_records: usize,
    /// Items carried by dropped records
    pub dropped_items: usize,
    /// Time spent delivering
    pub elapsed: Duration,
}

impl DeliveryReport {
    /// Check if every record was accepted
    pub fn is_complete(&self) -> bool {
        self.dropped_records == 0
    }
}

/// Drives batches through the transport and retries failures
#[derive(Debug, Clone)]
pub struct RetryCoordinator {
    assembler: BatchAssembler,
    max_retries: u32,
    backoff: Backoff,
}

impl RetryCoordinator {
    /// Create a coordinator without delay between passes
    pub fn new(assembler: BatchAssembler, max_retries: u32) -> Self {
        Self {
            assembler,
            max_retries,
            backoff: Backoff::None,
        }
    }

    /// Create a coordinator from delivery limits
    pub fn from_limits(limits: &DeliveryLimits) -> Self {
        Self::new(BatchAssembler::from_limits(limits), limits.max_retries)
    }

    /// Wait according to `backoff` before each retry pass
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Retry ceiling
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Deliver every record of `source`
    ///
    /// Partial delivery is not an error: records that still fail after
    /// `max_retries` passes are logged and counted in the report. Only a
    /// failure of the source itself is returned.
    pub fn deliver<S, T>(&self, source: &mut S, transport: &mut T) -> Result<DeliveryReport>
    where
        S: RecordSource + ?Sized,
        T: Transport + ?Sized,
    {
        let start = Instant::now();
        let mut report = DeliveryReport::default();

        let mut drained = self.assembler.drain(source, transport)?;
        let mut attempt = 0;
        loop {
            report.passes += 1;
            report.requests += drained.requests;
            report.delivered_records += drained.delivered_records;
            report.delivered_items += drained.delivered_items;

            let failed = drained.failed;
            if failed.is_empty() {
                break;
            }

            attempt += 1;
            if attempt > self.max_retries {
                report.dropped_records = failed.len();
                report.dropped_items = failed.iter().map(|r| r.item_count()).sum();
                error!(
                    "Unable to write {} record(s) after {} attempts; {} items dropped",
                    report.dropped_records, attempt, report.dropped_items
                );
                break;
            }

            debug!("Retrying {} record(s)", failed.len());
            let delay = self.backoff.delay_for_attempt(attempt);
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }

            let mut replay = ReplaySet::new(failed);
            drained = self.assembler.drain(&mut replay, transport)?;
        }

        report.elapsed = start.elapsed();
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PackError;
    use crate::record::Record;
    use crate::transport::{MemoryTransport, RecordOutcome, TransportError};

    fn records(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| Record::new(vec![i as u8; 8], "k".to_string(), i + 1))
            .collect()
    }

    fn coordinator(max_retries: u32) -> RetryCoordinator {
        RetryCoordinator::new(BatchAssembler::new(2, 10_000), max_retries)
    }

    struct Broken;

    impl RecordSource for Broken {
        fn next_record(&mut self) -> Result<Option<Record>> {
            Err(PackError::Stream(std::io::Error::new(
                std::io::ErrorKind::Other,
                "encoder failed",
            )))
        }
    }

    #[test]
    fn test_backoff_delays() {
        assert_eq!(Backoff::None.delay_for_attempt(3), Duration::ZERO);
        assert_eq!(
            Backoff::Fixed(Duration::from_millis(50)).delay_for_attempt(3),
            Duration::from_millis(50)
        );

        let exp = Backoff::exponential(Duration::from_millis(100));
        assert_eq!(exp.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(exp.delay_for_attempt(2), Duration::from_millis(200));
        assert_eq!(exp.delay_for_attempt(4), Duration::from_millis(800));
        assert_eq!(exp.delay_for_attempt(20), Duration::from_secs(30));
    }

    #[test]
    fn test_all_delivered_first_pass() {
        let mut transport = MemoryTransport::new();
        let report = coordinator(3)
            .deliver(&mut ReplaySet::new(records(3)), &mut transport)
            .unwrap();

        assert_eq!(report.passes, 1);
        assert_eq!(report.requests, 2);
        assert_eq!(report.delivered_records, 3);
        assert_eq!(report.delivered_items, 6);
        assert!(report.is_complete());
    }

    #[test]
    fn test_failures_retried_until_success() {
        let mut transport = MemoryTransport::new().respond_with(|call, batch| {
            let outcome = if call < 2 {
                RecordOutcome::failed("ProvisionedThroughputExceededException", "busy")
            } else {
                RecordOutcome::Delivered
            };
            Ok(vec![outcome; batch.len()])
        });
        let report = coordinator(5)
            .deliver(&mut ReplaySet::new(records(2)), &mut transport)
            .unwrap();

        assert_eq!(report.passes, 3);
        assert_eq!(transport.call_count(), 3);
        assert_eq!(report.delivered_records, 2);
        assert!(report.is_complete());
    }

    #[test]
    fn test_drop_after_max_retries() {
        let mut transport = MemoryTransport::new()
            .respond_with(|_, _| Err(TransportError::Rejected("stream deleted".to_string())));
        let report = coordinator(2)
            .deliver(&mut ReplaySet::new(records(3)), &mut transport)
            .unwrap();

        // First pass plus two retries, two requests each
        assert_eq!(report.passes, 3);
        assert_eq!(transport.call_count(), 6);
        assert_eq!(report.dropped_records, 3);
        assert_eq!(report.dropped_items, 1 + 2 + 3);
        assert!(!report.is_complete());
    }

    #[test]
    fn test_zero_retries() {
        let mut transport = MemoryTransport::new()
            .respond_with(|_, batch| Ok(vec![RecordOutcome::failed("x", "y"); batch.len()]));
        let report = coordinator(0)
            .deliver(&mut ReplaySet::new(records(1)), &mut transport)
            .unwrap();

        assert_eq!(transport.call_count(), 1);
        assert_eq!(report.dropped_records, 1);
    }

    #[test]
    fn test_source_error_propagates() {
        let mut transport = MemoryTransport::new();
        let result = coordinator(3).deliver(&mut Broken, &mut transport);
        assert!(matches!(result, Err(PackError::Stream(_))));
        assert_eq!(transport.call_count(), 0);
    }

    #[test]
    fn test_fixed_backoff_waits() {
        let mut transport = MemoryTransport::new().respond_with(|call, batch| {
            let outcome = if call == 0 {
                RecordOutcome::failed("x", "y")
            } else {
                RecordOutcome::Delivered
            };
            Ok(vec![outcome; batch.len()])
        });
        let report = coordinator(1)
            .with_backoff(Backoff::Fixed(Duration::from_millis(20)))
            .deliver(&mut ReplaySet::new(records(1)), &mut transport)
            .unwrap();

        assert!(report.is_complete());
        assert!(report.elapsed >= Duration::from_millis(20));
    }
}
