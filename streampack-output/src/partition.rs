// streampack Output - Telemetry output for streaming ingestion
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Partition key strategies
//!
//! The key of a record is derived from the first point packed into it.

use crate::point::Point;
use serde::{Deserialize, Serialize};
use streampack::{KeyProvider, RandomKey};

/// Fallback key when a tag strategy finds neither the tag nor a default
pub const DEFAULT_PARTITION_KEY: &str = "telegraf";

/// How records are assigned a partition key
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PartitionStrategy {
    /// The same key for every record
    Static {
        /// Key value
        key: String,
    },
    /// Value of a tag of the first point
    Tag {
        /// Tag name
        key: String,
        /// Used when the tag is missing
        #[serde(default)]
        default: Option<String>,
    },
    /// Measurement name of the first point
    Measurement,
    /// Random key per record
    #[default]
    Random,
}

impl PartitionStrategy {
    /// Static key strategy
    pub fn fixed(key: impl Into<String>) -> Self {
        Self::Static { key: key.into() }
    }

    /// Tag strategy with an optional fallback
    pub fn tag(key: impl Into<String>, default: Option<String>) -> Self {
        Self::Tag {
            key: key.into(),
            default,
        }
    }
}

impl KeyProvider<Point> for PartitionStrategy {
    fn partition_key(&self, head: &Point) -> String {
        match self {
            Self::Static { key } => key.clone(),
            Self::Tag { key, default } => match head.tag(key) {
                Some(value) => value.to_string(),
                None => default
                    .as_deref()
                    .filter(|d| !d.is_empty())
                    .unwrap_or(DEFAULT_PARTITION_KEY)
                    .to_string(),
            },
            Self::Measurement => head.name().to_string(),
            Self::Random => RandomKey::generate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point() -> Point {
        Point::new("test1", 0)
            .with_tag("tag1", "value1")
            .with_field("value", 1i64)
    }

    #[test]
    fn test_static() {
        assert_eq!(PartitionStrategy::fixed("-").partition_key(&point()), "-");
        assert_eq!(PartitionStrategy::fixed("").partition_key(&point()), "");
    }

    #[test]
    fn test_tag() {
        let strategy = PartitionStrategy::tag("tag1", None);
        assert_eq!(strategy.partition_key(&point()), "value1");
    }

    #[test]
    fn test_tag_missing_uses_default() {
        let strategy = PartitionStrategy::tag("doesnotexist", Some("somedefault".to_string()));
        assert_eq!(strategy.partition_key(&point()), "somedefault");
    }

    #[test]
    fn test_tag_missing_without_default() {
        let strategy = PartitionStrategy::tag("doesnotexist", None);
        assert_eq!(strategy.partition_key(&point()), DEFAULT_PARTITION_KEY);
    }

    #[test]
    fn test_measurement() {
        assert_eq!(PartitionStrategy::Measurement.partition_key(&point()), "test1");
    }

    #[test]
    fn test_random() {
        let a = PartitionStrategy::Random.partition_key(&point());
        let b = PartitionStrategy::Random.partition_key(&point());
        assert_eq!(a.len(), 24);
        assert_ne!(a, b);
    }

    #[test]
    fn test_serde_shape() {
        let strategy: PartitionStrategy =
            serde_json::from_str(r#"{"method":"tag","key":"host"}"#).unwrap();
        assert_eq!(strategy, PartitionStrategy::tag("host", None));

        let json = serde_json::to_string(&PartitionStrategy::Measurement).unwrap();
        assert_eq!(json, r#"{"method":"measurement"}"#);
    }
}
