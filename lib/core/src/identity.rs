//! Identity normalization for incoming records
//!
//! Records arriving from clients may lack an `id` or a `thumbmark`, or may not
//! be records at all. Normalization gives every one of them both.

use crate::thumbmark::compute_thumbmark;
use crate::value::{TraitRecord, TraitValue};
use uuid::Uuid;

/// Generate a prefixed random identifier, e.g. `visitor_<uuid>`
pub fn generate_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4())
}

fn is_blank(value: Option<&TraitValue>) -> bool {
    match value {
        None | Some(TraitValue::Null) => true,
        Some(TraitValue::String(s)) => s.is_empty(),
        Some(TraitValue::Bool(b)) => !b,
        Some(TraitValue::Number(n)) => *n == 0.0 || n.is_nan(),
        Some(_) => false,
    }
}

/// Ensure a record carries an `id` and a `thumbmark`.
///
/// The thumbmark is computed after the id is filled in, so it covers the id.
pub fn ensure_record_identity(mut record: TraitRecord, id_prefix: &str) -> TraitRecord {
    if is_blank(record.get("id")) {
        record.insert("id".to_string(), TraitValue::String(generate_id(id_prefix)));
    }
    if is_blank(record.get("thumbmark")) {
        let thumbmark = compute_thumbmark(&record);
        record.insert("thumbmark".to_string(), TraitValue::String(thumbmark));
    }
    record
}

/// Normalize an arbitrary value into an identified record.
///
/// Non-record values are wrapped as `{id, value, thumbmark}` where the
/// thumbmark is computed over `{value}` alone.
pub fn ensure_identity(value: TraitValue, id_prefix: &str) -> TraitRecord {
    match value {
        TraitValue::Record(record) => ensure_record_identity(record, id_prefix),
        other => {
            let mut wrapped = TraitRecord::new();
            wrapped.insert("value".to_string(), other);
            let thumbmark = compute_thumbmark(&wrapped);

            let mut record = TraitRecord::new();
            record.insert("id".to_string(), TraitValue::String(generate_id(id_prefix)));
            if let Some(value) = wrapped.shift_remove("value") {
                record.insert("value".to_string(), value);
            }
            record.insert("thumbmark".to_string(), TraitValue::String(thumbmark));
            record
        }
    }
}
