//! Thumbmark hashing
//!
//! A thumbmark is a 16-character lowercase hex identifier derived from the
//! sorted multiset of a record's tokens, so key order never changes it.
//!
//! Tokens are ordered by UTF-16 code units, the hash consumes UTF-16 code
//! units of the joined string, and the length suffix of the second pass is
//! the UTF-16 code-unit count. For ASCII traits this is identical to hashing
//! bytes. Changing the encoding changes every non-ASCII thumbmark, so it is
//! fixed here.
//!
//! This is an identity bucket, not a security primitive.

use crate::flatten::{flatten, try_flatten, MAX_TRAIT_DEPTH};
use crate::value::{TraitRecord, TraitValue};
use crate::Result;

/// Width of a rendered thumbmark
pub const THUMBMARK_LEN: usize = 16;

/// Scale applied to positional similarity of non-identical thumbmarks
pub const NEAR_MISS_SCALE: f32 = 0.95;

const SEED: u32 = 5381;
const TOKEN_SEPARATOR: &str = "|";

/// 32-bit multiplicative rolling hash with wrapping arithmetic
fn rolling_hash(units: impl Iterator<Item = u16>) -> u32 {
    units.fold(SEED, |hash, unit| {
        (hash << 5).wrapping_add(hash) ^ u32::from(unit)
    })
}

/// Compute the thumbmark of a trait record
pub fn compute_thumbmark(record: &TraitRecord) -> String {
    thumbmark_from_tokens(flatten(record))
}

/// Compute the thumbmark, rejecting records nested deeper than [`MAX_TRAIT_DEPTH`]
pub fn try_compute_thumbmark(record: &TraitRecord) -> Result<String> {
    Ok(thumbmark_from_tokens(try_flatten(record, MAX_TRAIT_DEPTH)?))
}

/// Hash an already flattened token multiset
pub fn thumbmark_from_tokens(mut tokens: Vec<String>) -> String {
    tokens.sort_unstable_by(|a, b| a.encode_utf16().cmp(b.encode_utf16()));
    let canonical = tokens.join(TOKEN_SEPARATOR);
    let len = canonical.encode_utf16().count();

    let h1 = rolling_hash(canonical.encode_utf16());
    let h2 = rolling_hash(
        canonical
            .encode_utf16()
            .chain(TOKEN_SEPARATOR.encode_utf16())
            .chain(len.to_string().encode_utf16()),
    );

    let combined = (u64::from(h1) << 32) | u64::from(h2);
    let mut hex = format!("{:016x}", combined);
    hex.truncate(THUMBMARK_LEN);
    hex
}

/// The record's own string `thumbmark`, otherwise the computed one.
///
/// Any string counts, including an empty one, which then scores 0 in
/// [`thumbmark_similarity`].
pub fn record_thumbmark(record: &TraitRecord) -> String {
    match record.get("thumbmark") {
        Some(TraitValue::String(s)) => s.clone(),
        _ => compute_thumbmark(record),
    }
}

/// Similarity between two thumbmark strings.
///
/// Identical strings score 1. Otherwise the fraction of positions (over the
/// shorter string) holding the same character, scaled by [`NEAR_MISS_SCALE`]
/// so that a near miss never ties an exact match. Empty input scores 0.
pub fn thumbmark_similarity(a: &str, b: &str) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let len = a_chars.len().min(b_chars.len());
    let matches = a_chars
        .iter()
        .zip(b_chars.iter())
        .filter(|(x, y)| x == y)
        .count();

    (matches as f32 / len as f32) * NEAR_MISS_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::record_from_json;
    use serde_json::json;

    fn hash_str(s: &str) -> u32 {
        rolling_hash(s.encode_utf16())
    }

    #[test]
    fn test_rolling_hash_reference_values() {
        assert_eq!(hash_str(""), 5381);
        // 5381 * 33 ^ 'a'
        assert_eq!(hash_str("a"), (5381u32 * 33) ^ 97);
        assert_eq!(hash_str("ab"), (((5381u32 * 33) ^ 97).wrapping_mul(33)) ^ 98);
    }

    #[test]
    fn test_rolling_hash_wraps() {
        let long = "z".repeat(64);
        let expected = long
            .bytes()
            .fold(5381u32, |h, b| h.wrapping_mul(33) ^ u32::from(b));
        assert_eq!(hash_str(&long), expected);
    }

    #[test]
    fn test_empty_record_thumbmark() {
        let h1 = 5381u64;
        // "" + "|" + "0"
        let h2 = u64::from(hash_str("|0"));
        let expected = format!("{:016x}", (h1 << 32) | h2);

        let thumb = compute_thumbmark(&TraitRecord::new());
        assert_eq!(thumb, expected);
        assert_eq!(thumb.len(), THUMBMARK_LEN);
    }

    #[test]
    fn test_known_record_thumbmark() {
        let record = record_from_json(json!({"b": [3, 2], "a": 1})).unwrap();
        let canonical = "a:1|b:2|b:3";
        let h1 = u64::from(hash_str(canonical));
        let h2 = u64::from(hash_str(&format!("{}|{}", canonical, canonical.len())));
        assert_eq!(compute_thumbmark(&record), format!("{:016x}", (h1 << 32) | h2));
    }

    #[test]
    fn test_reference_thumbmarks() {
        let cases = [
            (json!({"b": [3, 2], "a": 1}), "df934c8e44ad2c92"),
            (json!({}), "00001505005970c9"),
            (json!({"tz": "東京"}), "0ad6832c1a8402e5"),
            (json!({"y": -3, "x": 0.5}), "5167de6da6008e90"),
            (json!({"x": 1e-7}), "86a4dac9c346a603"),
            (json!({"x": 1e21}), "5b401b7b2bb4dfb0"),
            (json!({"x": [[null, 1]]}), "7c7adb5a869f2392"),
            (json!({"x": [{"a": 1}]}), "f9bc448195cd79fb"),
        ];
        for (value, expected) in cases {
            let record = record_from_json(value.clone()).unwrap();
            assert_eq!(compute_thumbmark(&record), expected, "thumbmark of {}", value);
        }
    }

    #[test]
    fn test_key_order_independent() {
        let a = record_from_json(json!({
            "os": "Arch Linux",
            "screen": {"width": 2560, "height": 1440},
            "fonts": ["Roboto", "Fira Code"]
        }))
        .unwrap();
        let b = record_from_json(json!({
            "fonts": ["Roboto", "Fira Code"],
            "screen": {"height": 1440, "width": 2560},
            "os": "Arch Linux"
        }))
        .unwrap();

        assert_eq!(compute_thumbmark(&a), compute_thumbmark(&b));
        assert_eq!(compute_thumbmark(&a), compute_thumbmark(&a));
    }

    #[test]
    fn test_content_changes_thumbmark() {
        let a = record_from_json(json!({"os": "macOS 14"})).unwrap();
        let b = record_from_json(json!({"os": "macOS 15"})).unwrap();
        assert_ne!(compute_thumbmark(&a), compute_thumbmark(&b));
    }

    #[test]
    fn test_thumbmark_is_lower_hex() {
        let record = record_from_json(json!({"userAgent": "Mozilla/5.0 (X11; Linux x86_64)", "cats": 12})).unwrap();
        let thumb = compute_thumbmark(&record);
        assert_eq!(thumb.len(), 16);
        assert!(thumb.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_non_ascii_uses_utf16_units() {
        let record = record_from_json(json!({"tz": "東京"})).unwrap();
        let canonical = "tz:東京";
        let units = canonical.encode_utf16().count();
        assert_eq!(units, 5);
        let h1 = u64::from(hash_str(canonical));
        let h2 = u64::from(hash_str(&format!("{}|{}", canonical, units)));
        assert_eq!(compute_thumbmark(&record), format!("{:016x}", (h1 << 32) | h2));
    }

    #[test]
    fn test_record_thumbmark_prefers_own_value() {
        let with_own = record_from_json(json!({"thumbmark": "abc", "os": "x"})).unwrap();
        assert_eq!(record_thumbmark(&with_own), "abc");

        let empty_own = record_from_json(json!({"thumbmark": "", "os": "x"})).unwrap();
        assert_eq!(record_thumbmark(&empty_own), "");

        let numeric_own = record_from_json(json!({"thumbmark": 7, "os": "x"})).unwrap();
        assert_eq!(record_thumbmark(&numeric_own), compute_thumbmark(&numeric_own));
    }

    #[test]
    fn test_thumbmark_similarity() {
        assert_eq!(thumbmark_similarity("abcd", "abcd"), 1.0);
        assert_eq!(thumbmark_similarity("", "abcd"), 0.0);
        let half = thumbmark_similarity("abcd", "abzz");
        assert!((half - 0.5 * NEAR_MISS_SCALE).abs() < 1e-6);
        // shorter length bounds the comparison
        let prefix = thumbmark_similarity("ab", "abcd");
        assert!((prefix - NEAR_MISS_SCALE).abs() < 1e-6);
        assert!(prefix < 1.0);
    }
}
