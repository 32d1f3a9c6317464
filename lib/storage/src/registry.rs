use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use thumbprint_core::{compute_thumbmark, generate_id, RecognitionMeta, TraitRecord};
use tracing::debug;

/// Default number of entries returned by [`FingerprintRegistry::list`]
pub const DEFAULT_LIST_LIMIT: usize = 200;

/// A fingerprint the registry has seen, keyed by thumbmark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FingerprintEntry {
    pub id: String,
    pub thumbmark: String,
    pub data: TraitRecord,
    pub visit_count: u64,
    pub created_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub first_ip: Option<String>,
    pub last_ip: Option<String>,
}

/// Visit history of fingerprints, one entry per thumbmark
pub struct FingerprintRegistry {
    entries: RwLock<HashMap<String, FingerprintEntry>>,
    dirty: AtomicBool,
}

impl Default for FingerprintRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FingerprintRegistry {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            dirty: AtomicBool::new(false),
        }
    }

    /// Build a registry from previously saved entries
    pub fn from_entries(entries: Vec<FingerprintEntry>) -> Self {
        let map = entries
            .into_iter()
            .map(|e| (e.thumbmark.clone(), e))
            .collect();
        Self {
            entries: RwLock::new(map),
            dirty: AtomicBool::new(false),
        }
    }

    /// Record a visit of `record`, keyed by its thumbmark.
    ///
    /// A known thumbmark bumps the visit count, replaces the stored data and
    /// moves `last_seen`/`last_ip` forward while `created_at` and `first_ip`
    /// stay put. An unknown thumbmark starts a new entry with one visit.
    pub fn record_visit(
        &self,
        record: TraitRecord,
        client_ip: Option<String>,
        now: DateTime<Utc>,
    ) -> RecognitionMeta {
        let thumbmark = match record.get("thumbmark").and_then(|v| v.as_str()) {
            Some(own) if !own.is_empty() => own.to_string(),
            _ => compute_thumbmark(&record),
        };
        let mut entries = self.entries.write();
        self.dirty.store(true, Ordering::Release);

        if let Some(entry) = entries.get_mut(&thumbmark) {
            let previous_ip = entry.last_ip.clone().or_else(|| entry.first_ip.clone());

            entry.visit_count += 1;
            entry.data = record;
            entry.last_seen = now;
            if client_ip.is_some() {
                entry.last_ip = client_ip.clone();
            }

            let ip_changed = match (&previous_ip, &client_ip) {
                (Some(prev), Some(ip)) => Some(prev != ip),
                _ => None,
            };
            debug!(thumbmark = %thumbmark, visits = entry.visit_count, "Returning fingerprint");

            return RecognitionMeta {
                seen_before: true,
                visit_count: entry.visit_count,
                thumbmark,
                id: entry.id.clone(),
                first_seen: entry.created_at,
                last_seen: now,
                client_ip,
                previous_ip,
                ip_changed,
            };
        }

        let id = match record.get("id").and_then(|v| v.as_str()) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => generate_id("visitor"),
        };
        let entry = FingerprintEntry {
            id: id.clone(),
            thumbmark: thumbmark.clone(),
            data: record,
            visit_count: 1,
            created_at: now,
            last_seen: now,
            first_ip: client_ip.clone(),
            last_ip: client_ip.clone(),
        };
        entries.insert(thumbmark.clone(), entry);
        debug!(thumbmark = %thumbmark, "New fingerprint");

        RecognitionMeta {
            seen_before: false,
            visit_count: 1,
            thumbmark,
            id,
            first_seen: now,
            last_seen: now,
            client_ip,
            previous_ip: None,
            ip_changed: None,
        }
    }

    #[inline]
    pub fn get(&self, thumbmark: &str) -> Option<FingerprintEntry> {
        self.entries.read().get(thumbmark).cloned()
    }

    /// Remove the entry for a thumbmark
    pub fn remove(&self, thumbmark: &str) -> bool {
        let removed = self.entries.write().remove(thumbmark).is_some();
        if removed {
            self.dirty.store(true, Ordering::Release);
        }
        removed
    }

    /// Most recently created entries first
    pub fn list(&self, limit: usize) -> Vec<FingerprintEntry> {
        let mut all: Vec<FingerprintEntry> = self.entries.read().values().cloned().collect();
        all.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.thumbmark.cmp(&b.thumbmark))
        });
        all.truncate(limit);
        all
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// All entries, clearing the modified flag
    pub(crate) fn take_snapshot(&self) -> Vec<FingerprintEntry> {
        let entries = self.entries.read();
        self.dirty.store(false, Ordering::Release);
        entries.values().cloned().collect()
    }

    pub(crate) fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    /// Modified since the last snapshot
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;
    use thumbprint_core::record_from_json;

    fn visitor(os: &str) -> TraitRecord {
        record_from_json(json!({"id": format!("visitor_{}", os), "os": os})).unwrap()
    }

    #[test]
    fn test_new_visit() {
        let registry = FingerprintRegistry::new();
        let now = Utc::now();
        let meta = registry.record_visit(visitor("arch"), Some("1.2.3.4".into()), now);

        assert!(!meta.seen_before);
        assert_eq!(meta.visit_count, 1);
        assert_eq!(meta.id, "visitor_arch");
        assert_eq!(meta.previous_ip, None);

        let entry = registry.get(&meta.thumbmark).unwrap();
        assert_eq!(entry.first_ip.as_deref(), Some("1.2.3.4"));
        assert_eq!(entry.last_ip.as_deref(), Some("1.2.3.4"));
        assert!(registry.is_dirty());
    }

    #[test]
    fn test_returning_visit_preserves_first_seen() {
        let registry = FingerprintRegistry::new();
        let t0 = Utc::now();
        let t1 = t0 + Duration::minutes(5);
        let t2 = t1 + Duration::minutes(5);

        let first = registry.record_visit(visitor("arch"), Some("1.2.3.4".into()), t0);
        registry.record_visit(visitor("arch"), None, t1);
        let third = registry.record_visit(visitor("arch"), Some("5.6.7.8".into()), t2);

        assert!(third.seen_before);
        assert_eq!(third.visit_count, 3);
        assert_eq!(third.id, first.id);
        assert_eq!(third.first_seen, t0);
        assert_eq!(third.last_seen, t2);
        assert_eq!(third.previous_ip.as_deref(), Some("1.2.3.4"));
        assert_eq!(third.ip_changed, Some(true));

        let entry = registry.get(&first.thumbmark).unwrap();
        assert_eq!(entry.created_at, t0);
        assert_eq!(entry.first_ip.as_deref(), Some("1.2.3.4"));
        assert_eq!(entry.last_ip.as_deref(), Some("5.6.7.8"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_previous_ip_falls_back_to_first_ip() {
        let registry = FingerprintRegistry::from_entries(vec![FingerprintEntry {
            id: "visitor_x".into(),
            thumbmark: compute_thumbmark(&visitor("x")),
            data: visitor("x"),
            visit_count: 4,
            created_at: Utc::now(),
            last_seen: Utc::now(),
            first_ip: Some("9.9.9.9".into()),
            last_ip: None,
        }]);

        let meta = registry.record_visit(visitor("x"), Some("9.9.9.9".into()), Utc::now());
        assert_eq!(meta.visit_count, 5);
        assert_eq!(meta.previous_ip.as_deref(), Some("9.9.9.9"));
        assert_eq!(meta.ip_changed, Some(false));
    }

    #[test]
    fn test_remove_and_list_order() {
        let registry = FingerprintRegistry::new();
        let t0 = Utc::now();
        let a = registry.record_visit(visitor("a"), None, t0);
        let b = registry.record_visit(visitor("b"), None, t0 + Duration::seconds(1));
        registry.record_visit(visitor("c"), None, t0 + Duration::seconds(2));

        let listed = registry.list(2);
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, "visitor_c");
        assert_eq!(listed[1].thumbmark, b.thumbmark);

        assert!(registry.remove(&a.thumbmark));
        assert!(!registry.remove(&a.thumbmark));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.list(DEFAULT_LIST_LIMIT).len(), 2);
    }

    #[test]
    fn test_empty_own_thumbmark_is_computed() {
        let registry = FingerprintRegistry::new();
        let mut record = visitor("arch");
        record.insert("thumbmark".into(), "".into());

        let meta = registry.record_visit(record.clone(), None, Utc::now());
        assert_eq!(meta.thumbmark, compute_thumbmark(&record));
        assert!(registry.get("").is_none());

        let mut own = visitor("arch");
        own.insert("thumbmark".into(), "feedfacecafebeef".into());
        let meta = registry.record_visit(own, None, Utc::now());
        assert_eq!(meta.thumbmark, "feedfacecafebeef");
    }

    #[test]
    fn test_snapshot_clears_dirty() {
        let registry = FingerprintRegistry::new();
        registry.record_visit(visitor("a"), None, Utc::now());
        assert_eq!(registry.take_snapshot().len(), 1);
        assert!(!registry.is_dirty());
    }
}
