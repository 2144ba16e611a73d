//! Interval records parsed from posted test events
//!
//! A posted event is an untyped `string -> string` map. Parsing turns it into an
//! [`IntervalRecord`]: three identity fields that default to empty, and two
//! required RFC 3339 timestamps.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;

/// Key holding the logical application identity
pub const SOURCE_ID: &str = "source_id";
/// Key holding the running instance identity
pub const INSTANCE_ID: &str = "instance_id";
/// Key holding the process/run identity
pub const PROCESS_INSTANCE_ID: &str = "process_instance_id";
/// Key holding the interval start (RFC 3339)
pub const START: &str = "spike_start";
/// Key holding the interval end (RFC 3339)
pub const END: &str = "spike_end";

/// Failure to turn a posted field map into an [`IntervalRecord`]
#[derive(Error, Debug)]
pub enum IntervalParseError {
    #[error("{field} is missing")]
    Missing { field: &'static str },

    #[error("{field} is not an RFC 3339 timestamp ({value:?}): {source}")]
    Malformed {
        field: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("{field} must use an upper-case 'T' date/time separator and 'Z' ({value:?})")]
    NonCanonical { field: &'static str, value: String },
}

impl IntervalParseError {
    /// Name of the field that failed
    pub fn field(&self) -> &'static str {
        match self {
            Self::Missing { field }
            | Self::Malformed { field, .. }
            | Self::NonCanonical { field, .. } => field,
        }
    }
}

/// One reported time span for one app instance
///
/// No ordering is enforced between `start` and `end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalRecord {
    source_id: String,
    instance_id: String,
    process_instance_id: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl IntervalRecord {
    /// Parse a record from a decoded request body
    ///
    /// Identity fields are copied as-is and default to empty strings.
    /// `spike_start` is checked before `spike_end`.
    pub fn parse(fields: &HashMap<String, String>) -> Result<Self, IntervalParseError> {
        let identity = |key: &str| fields.get(key).cloned().unwrap_or_default();

        let start = parse_timestamp(fields, START)?;
        let end = parse_timestamp(fields, END)?;

        Ok(Self {
            source_id: identity(SOURCE_ID),
            instance_id: identity(INSTANCE_ID),
            process_instance_id: identity(PROCESS_INSTANCE_ID),
            start,
            end,
        })
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn process_instance_id(&self) -> &str {
        &self.process_instance_id
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

fn parse_timestamp(
    fields: &HashMap<String, String>,
    field: &'static str,
) -> Result<DateTime<Utc>, IntervalParseError> {
    let value = fields
        .get(field)
        .ok_or(IntervalParseError::Missing { field })?;

    let parsed = DateTime::parse_from_rfc3339(value).map_err(|source| {
        IntervalParseError::Malformed {
            field,
            value: value.clone(),
            source,
        }
    })?;

    // chrono also takes a space or lower-case 't' separator and a lower-case
    // 'z'; only the upper-case profile is accepted here.
    if value.as_bytes().get(10) != Some(&b'T') || value.ends_with('z') {
        return Err(IntervalParseError::NonCanonical {
            field,
            value: value.clone(),
        });
    }

    Ok(parsed.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_full_record() {
        let record = IntervalRecord::parse(&fields(&[
            ("source_id", "app1"),
            ("instance_id", "0"),
            ("process_instance_id", "p1"),
            ("spike_start", "2023-01-01T00:00:00Z"),
            ("spike_end", "2023-01-01T00:05:00Z"),
        ]))
        .expect("should parse");

        assert_eq!(record.source_id(), "app1");
        assert_eq!(record.instance_id(), "0");
        assert_eq!(record.process_instance_id(), "p1");
        assert_eq!(record.start().timestamp(), 1_672_531_200);
        assert_eq!(record.end().timestamp(), 1_672_531_500);
    }

    #[test]
    fn test_parse_identity_fields_default_to_empty() {
        let record = IntervalRecord::parse(&fields(&[
            ("spike_start", "2023-01-01T00:00:00Z"),
            ("spike_end", "2023-01-01T00:05:00Z"),
        ]))
        .expect("identity fields are optional");

        assert_eq!(record.source_id(), "");
        assert_eq!(record.instance_id(), "");
        assert_eq!(record.process_instance_id(), "");
    }

    #[test]
    fn test_parse_empty_map_reports_start_first() {
        let err = IntervalRecord::parse(&HashMap::new()).unwrap_err();
        assert!(matches!(err, IntervalParseError::Missing { field: "spike_start" }));
        assert_eq!(err.to_string(), "spike_start is missing");
    }

    #[test]
    fn test_parse_missing_end() {
        let err = IntervalRecord::parse(&fields(&[("spike_start", "2023-01-01T00:00:00Z")]))
            .unwrap_err();
        assert_eq!(err.field(), "spike_end");
    }

    #[test]
    fn test_parse_malformed_start_keeps_source() {
        use std::error::Error;

        let err = IntervalRecord::parse(&fields(&[
            ("spike_start", "yesterday"),
            ("spike_end", "2023-01-01T00:05:00Z"),
        ]))
        .unwrap_err();

        assert_eq!(err.field(), "spike_start");
        assert!(err.to_string().contains("\"yesterday\""));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_parse_rejects_date_without_time() {
        let err = IntervalRecord::parse(&fields(&[
            ("spike_start", "2023-01-01"),
            ("spike_end", "2023-01-01T00:05:00Z"),
        ]))
        .unwrap_err();
        assert!(matches!(err, IntervalParseError::Malformed { .. }));
    }

    #[test]
    fn test_parse_rejects_space_separator() {
        let err = IntervalRecord::parse(&fields(&[
            ("spike_start", "2023-01-01 00:00:00Z"),
            ("spike_end", "2023-01-01T00:05:00Z"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            IntervalParseError::NonCanonical { field: "spike_start", .. }
        ));
    }

    #[test]
    fn test_parse_rejects_lowercase_t_and_z() {
        for end in ["2023-01-01t00:05:00Z", "2023-01-01T00:05:00z", "2023-01-01t00:05:00z"] {
            let err = IntervalRecord::parse(&fields(&[
                ("spike_start", "2023-01-01T00:00:00Z"),
                ("spike_end", end),
            ]))
            .unwrap_err();
            assert!(
                matches!(err, IntervalParseError::NonCanonical { field: "spike_end", .. }),
                "{} should be rejected, got {:?}",
                end,
                err
            );
        }
    }

    #[test]
    fn test_parse_accepts_fractional_seconds() {
        let record = IntervalRecord::parse(&fields(&[
            ("spike_start", "2023-01-01T00:00:00.999Z"),
            ("spike_end", "2023-01-01T00:05:00.5+00:00"),
        ]))
        .expect("fractional seconds are valid");
        assert_eq!(record.start().timestamp(), 1_672_531_200);
        assert_eq!(record.end().timestamp(), 1_672_531_500);
    }

    #[test]
    fn test_parse_accepts_end_before_start() {
        let record = IntervalRecord::parse(&fields(&[
            ("spike_start", "2023-01-01T00:05:00Z"),
            ("spike_end", "2023-01-01T00:00:00Z"),
        ]))
        .expect("ordering is not enforced");
        assert!(record.end() < record.start());
    }

    #[test]
    fn test_parse_normalises_offsets_to_utc() {
        let record = IntervalRecord::parse(&fields(&[
            ("spike_start", "2023-01-01T02:00:00+02:00"),
            ("spike_end", "2022-12-31T19:05:00-05:00"),
        ]))
        .expect("offsets are valid RFC 3339");
        assert_eq!(record.start().timestamp(), 1_672_531_200);
        assert_eq!(record.end().timestamp(), 1_672_531_500);
    }

    #[test]
    fn test_parse_ignores_unknown_keys() {
        let record = IntervalRecord::parse(&fields(&[
            ("spike_start", "2023-01-01T00:00:00Z"),
            ("spike_end", "2023-01-01T00:05:00Z"),
            ("color", "blue"),
        ]));
        assert!(record.is_ok());
    }
}
