//! Field mapper: raw CRM records → canonical records.
//!
//! Renames every source field to its canonical name, treats nulls as
//! empty strings, and normalizes CRLF line endings. The canonical field
//! set is fixed at build time, so a missing source key means the query
//! and the field table disagree — a fatal configuration problem, not a
//! data-quality one.

use serde_json::Value;

use fieldpress_shared::{FIELD_MAP, FieldpressError, RawRecord, Record, Result};

/// Map one raw record into a canonical record.
pub fn map_record(raw: &RawRecord) -> Result<Record> {
    let mut record = Record::new();

    for (canonical, source) in FIELD_MAP {
        let value = raw.get(source).ok_or_else(|| {
            FieldpressError::mapping(format!("raw record has no key '{source}'"))
        })?;

        let text = match value {
            Value::Null => String::new(),
            Value::String(s) => s.replace("\r\n", "\n"),
            other => other.to_string(),
        };
        record.set(canonical, text);
    }

    Ok(record)
}

/// Map the full raw record set. Any mapping failure aborts the run —
/// partial rendering is never acceptable.
pub fn map_records(raw: &[RawRecord]) -> Result<Vec<Record>> {
    raw.iter().map(map_record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_record() -> RawRecord {
        let mut raw = RawRecord::new();
        for (_, source) in FIELD_MAP {
            raw.insert(source.to_string(), Value::Null);
        }
        raw.insert("Name".into(), Value::String("Bike Share".into()));
        raw.insert("Type__c".into(), Value::String("Solution".into()));
        raw
    }

    #[test]
    fn keys_are_renamed_to_canonical() {
        let record = map_record(&raw_record()).expect("map");
        assert_eq!(record.title(), "Bike Share");
        assert_eq!(record.get("type"), "Solution");
    }

    #[test]
    fn nulls_become_empty_strings() {
        let record = map_record(&raw_record()).expect("map");
        assert_eq!(record.get("who"), "");
        assert_eq!(record.get("learn_more"), "");
    }

    #[test]
    fn crlf_is_normalized() {
        let mut raw = raw_record();
        raw.insert(
            "Learn_More__c".into(),
            Value::String("Book\r\nGreat read\r\narticle\r\nhttp://x".into()),
        );
        let record = map_record(&raw).expect("map");
        assert_eq!(record.get("learn_more"), "Book\nGreat read\narticle\nhttp://x");
    }

    #[test]
    fn missing_source_key_is_fatal() {
        let mut raw = raw_record();
        raw.remove("Who__c");
        let err = map_record(&raw).unwrap_err();
        assert!(matches!(err, FieldpressError::Mapping { .. }));
        assert!(err.to_string().contains("Who__c"));
    }
}
