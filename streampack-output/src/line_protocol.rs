// streampack Output - Telemetry output for streaming ingestion
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Line protocol serialization
//!
//! # Format
//!
//! ```text
//! measurement[,tag=value...] field=value[,field=value...] timestamp\n
//!
//! integers:  42i      unsigned: 42u
//! strings:   "text"   booleans: true / false
//! ```
//!
//! Tags with empty values and non-finite floats are skipped. A point left
//! without any field cannot be represented and fails to serialize.

use crate::point::{FieldValue, Point};
use std::fmt::Write as _;
use streampack::{SerializeError, Serializer};

/// Serializes points as one line-protocol line each
#[derive(Debug, Clone, Copy, Default)]
pub struct LineProtocol;

impl LineProtocol {
    /// Render a point as a single newline-terminated line
    pub fn line(&self, point: &Point) -> Result<String, SerializeError> {
        if point.name().is_empty() {
            return Err(SerializeError::new("measurement name is empty"));
        }

        let mut line = String::with_capacity(64);
        escape_into(&mut line, point.name(), &[',', ' ']);

        for (key, value) in point.tags() {
            if key.is_empty() || value.is_empty() {
                continue;
            }
            line.push(',');
            escape_into(&mut line, key, &[',', '=', ' ']);
            line.push('=');
            escape_into(&mut line, value, &[',', '=', ' ']);
        }

        let mut written = 0;
        for (key, value) in point.fields() {
            if key.is_empty() {
                continue;
            }
            if let FieldValue::Float(v) = value {
                if !v.is_finite() {
                    continue;
                }
            }
            line.push(if written == 0 { ' ' } else { ',' });
            escape_into(&mut line, key, &[',', '=', ' ']);
            line.push('=');
            push_value(&mut line, value);
            written += 1;
        }

        if written == 0 {
            return Err(SerializeError::new(format!(
                "'{}' has no serializable fields",
                point.name()
            )));
        }

        let _ = write!(line, " {}", point.timestamp());
        line.push('\n');
        Ok(line)
    }
}

impl Serializer<Point> for LineProtocol {
    fn serialize(&self, item: &Point) -> Result<Vec<u8>, SerializeError> {
        self.line(item).map(String::into_bytes)
    }

    fn describe(&self, item: &Point) -> String {
        format!("'{}' metric", item.name())
    }
}

fn escape_into(out: &mut String, text: &str, special: &[char]) {
    for c in text.chars() {
        if c == '\n' {
            out.push_str("\\n");
            continue;
        }
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
}

fn push_value(out: &mut String, value: &FieldValue) {
    match value {
        FieldValue::Float(v) => {
            let _ = write!(out, "{}", v);
        }
        FieldValue::Integer(v) => {
            let _ = write!(out, "{}i", v);
        }
        FieldValue::Unsigned(v) => {
            let _ = write!(out, "{}u", v);
        }
        FieldValue::Boolean(v) => out.push_str(if *v { "true" } else { "false" }),
        FieldValue::String(v) => {
            out.push('"');
            for c in v.chars() {
                if c == '"' || c == '\\' {
                    out.push('\\');
                }
                out.push(c);
            }
            out.push('"');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_line() {
        let point = Point::new("cpu", 1_257_894_000_000_000_000)
            .with_tag("host", "server01")
            .with_field("value", 1i64);
        assert_eq!(
            LineProtocol.line(&point).unwrap(),
            "cpu,host=server01 value=1i 1257894000000000000\n"
        );
    }

    #[test]
    fn test_field_types() {
        let point = Point::new("m", 5)
            .with_field("a", 1.5)
            .with_field("b", -3i64)
            .with_field("c", 7u64)
            .with_field("d", true)
            .with_field("e", "say \"hi\"");
        assert_eq!(
            LineProtocol.line(&point).unwrap(),
            "m a=1.5,b=-3i,c=7u,d=true,e=\"say \\\"hi\\\"\" 5\n"
        );
    }

    #[test]
    fn test_escaping() {
        let point = Point::new("disk usage,x", 0)
            .with_tag("path", "/a b=c")
            .with_field("free space", 2i64);
        assert_eq!(
            LineProtocol.line(&point).unwrap(),
            "disk\\ usage\\,x,path=/a\\ b\\=c free\\ space=2i 0\n"
        );
    }

    #[test]
    fn test_empty_tag_skipped() {
        let point = Point::new("m", 0)
            .with_tag("empty", "")
            .with_field("v", 1i64);
        assert_eq!(LineProtocol.line(&point).unwrap(), "m v=1i 0\n");
    }

    #[test]
    fn test_no_fields_fails() {
        let point = Point::new("m", 0).with_tag("host", "a");
        assert!(LineProtocol.serialize(&point).is_err());

        let nan_only = Point::new("m", 0).with_field("v", f64::NAN);
        assert!(LineProtocol.serialize(&nan_only).is_err());
    }

    #[test]
    fn test_empty_name_fails() {
        let point = Point::new("", 0).with_field("v", 1i64);
        assert!(LineProtocol.serialize(&point).is_err());
    }

    #[test]
    fn test_describe() {
        let point = Point::new("mem", 0);
        assert_eq!(LineProtocol.describe(&point), "'mem' metric");
    }
}
