//! Trait flattening
//!
//! Serializes a nested [`TraitRecord`] into `path:value` tokens. Paths are
//! dot-joined keys from the root; sequences emit one token per element under
//! the same path. Token order follows traversal order, so callers that need a
//! canonical order must sort.

use crate::value::{TraitRecord, TraitValue};
use crate::{Error, Result};

/// Nesting limit used by the checked entry points
pub const MAX_TRAIT_DEPTH: usize = 64;

/// Flatten a record into tokens in traversal order
pub fn flatten(record: &TraitRecord) -> Vec<String> {
    flatten_with_prefix(record, "")
}

/// Flatten a record whose keys live under `prefix`
pub fn flatten_with_prefix(record: &TraitRecord, prefix: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    walk(record, prefix, &mut tokens, 0, usize::MAX)
        .map(|_| tokens)
        .unwrap_or_default()
}

/// Flatten a record, failing with [`Error::Structural`] once nesting exceeds `max_depth`
pub fn try_flatten(record: &TraitRecord, max_depth: usize) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    walk(record, "", &mut tokens, 0, max_depth)?;
    Ok(tokens)
}

fn walk(
    record: &TraitRecord,
    prefix: &str,
    tokens: &mut Vec<String>,
    depth: usize,
    max_depth: usize,
) -> Result<()> {
    if depth > max_depth {
        return Err(Error::Structural {
            depth: max_depth,
            path: prefix.to_string(),
        });
    }

    for (key, value) in record {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            TraitValue::Sequence(items) => {
                tokens.extend(items.iter().map(|item| format!("{}:{}", path, item.canonical())));
            }
            TraitValue::Record(nested) => walk(nested, &path, tokens, depth + 1, max_depth)?,
            scalar => tokens.push(format!("{}:{}", path, scalar.canonical())),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::record_from_json;
    use serde_json::json;

    #[test]
    fn test_flatten_scalars_and_sequences() {
        let record = record_from_json(json!({"a": 1, "b": [2, 3]})).unwrap();
        assert_eq!(flatten(&record), vec!["a:1", "b:2", "b:3"]);
    }

    #[test]
    fn test_flatten_nested_paths() {
        let record = record_from_json(json!({
            "screen": {"width": 1920, "height": 1080},
            "timezone": "Europe/Rome",
            "doNotTrack": null
        }))
        .unwrap();

        assert_eq!(
            flatten(&record),
            vec![
                "screen.width:1920",
                "screen.height:1080",
                "timezone:Europe/Rome",
                "doNotTrack:null",
            ]
        );
    }

    #[test]
    fn test_sequence_elements_are_not_recursed() {
        let record = record_from_json(json!({"gpu": [{"vendor": "x"}, [1, 2]]})).unwrap();
        assert_eq!(flatten(&record), vec!["gpu:[object Object]", "gpu:1,2"]);
    }

    #[test]
    fn test_empty_record_and_empty_sequence() {
        assert!(flatten(&TraitRecord::new()).is_empty());
        let record = record_from_json(json!({"fonts": []})).unwrap();
        assert!(flatten(&record).is_empty());
    }

    #[test]
    fn test_prefix() {
        let record = record_from_json(json!({"w": 1})).unwrap();
        assert_eq!(flatten_with_prefix(&record, "viewport"), vec!["viewport.w:1"]);
    }

    #[test]
    fn test_try_flatten_depth_limit() {
        let mut value = json!({"leaf": true});
        for _ in 0..5 {
            value = json!({"n": value});
        }
        let record = record_from_json(value).unwrap();

        assert_eq!(try_flatten(&record, 5).unwrap(), vec!["n.n.n.n.n.leaf:true"]);
        match try_flatten(&record, 3) {
            Err(Error::Structural { depth, path }) => {
                assert_eq!(depth, 3);
                assert_eq!(path, "n.n.n.n");
            }
            other => panic!("expected structural error, got {:?}", other),
        }
    }
}
