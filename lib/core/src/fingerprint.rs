//! Fingerprint snapshot types
//!
//! The browser-safe trait set a client collects, the snapshot it keeps
//! between sessions, and the recognition facts a server reports back.

use crate::thumbmark::compute_thumbmark;
use crate::value::{record_from_json, TraitRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Browser traits that can be collected without special permissions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SafeFingerprint {
    pub user_agent: Option<String>,
    pub platform: Option<String>,
    pub language: Option<String>,
    pub languages: Vec<String>,
    pub timezone: Option<String>,
    pub timezone_offset: Option<i32>,
    pub screen: ScreenTraits,
    pub viewport: ViewportTraits,
    pub hardware_concurrency: Option<u32>,
    pub device_memory: Option<f64>,
    pub max_touch_points: u32,
    pub time_since_page_load_ms: Option<f64>,
    pub connection: Option<String>,
    pub do_not_track: Option<String>,
    pub cookies_enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScreenTraits {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub avail_width: Option<u32>,
    pub avail_height: Option<u32>,
    pub color_depth: Option<u32>,
    pub pixel_depth: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewportTraits {
    pub inner_width: Option<u32>,
    pub inner_height: Option<u32>,
    pub device_pixel_ratio: Option<f64>,
}

impl SafeFingerprint {
    /// The traits as a schema-less record, keys in declaration order
    pub fn to_record(&self) -> TraitRecord {
        serde_json::to_value(self)
            .ok()
            .and_then(record_from_json)
            .unwrap_or_default()
    }

    /// `WxH` screen resolution, `nullxnull` style when unknown
    pub fn resolution(&self) -> String {
        fn dim(v: Option<u32>) -> String {
            v.map(|n| n.to_string()).unwrap_or_else(|| "null".to_string())
        }
        format!("{}x{}", dim(self.screen.width), dim(self.screen.height))
    }
}

/// Where a snapshot's thumbmark came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbmarkSource {
    /// Computed by the browser fingerprinting library
    Thumbmarkjs,
    /// Computed locally from the safe trait set
    Fallback,
}

/// A snapshot a client keeps between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFingerprint {
    pub thumbmark: String,
    pub source: ThumbmarkSource,
    pub collected_at: DateTime<Utc>,
    pub traits: SafeFingerprint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl StoredFingerprint {
    /// Snapshot the traits, deriving the thumbmark locally
    pub fn capture(traits: SafeFingerprint, collected_at: DateTime<Utc>) -> Self {
        Self {
            thumbmark: compute_thumbmark(&traits.to_record()),
            source: ThumbmarkSource::Fallback,
            collected_at,
            traits,
            note: None,
        }
    }
}

/// Server-side history of a thumbmark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionMeta {
    pub seen_before: bool,
    pub visit_count: u64,
    pub thumbmark: String,
    pub id: String,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    #[serde(default)]
    pub client_ip: Option<String>,
    #[serde(default)]
    pub previous_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_changed: Option<bool>,
}

impl RecognitionMeta {
    /// Both addresses are known and differ
    pub fn ip_moved(&self) -> Option<(&str, &str)> {
        match (self.previous_ip.as_deref(), self.client_ip.as_deref()) {
            (Some(prev), Some(now)) if !prev.is_empty() && !now.is_empty() && prev != now => {
                Some((prev, now))
            }
            _ => None,
        }
    }
}
