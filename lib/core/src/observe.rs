//! Session-to-session observation notes
//!
//! Compares the current snapshot against the one kept from a previous
//! session and against the server's recognition facts. Notes come out in a
//! fixed order: local stability, then recognition, then per-trait changes.
//! Earlier notes lead the narrative shown to the visitor.

use crate::fingerprint::{RecognitionMeta, StoredFingerprint};
use std::fmt;

/// A single observation about how a fingerprint behaved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    FirstVisit,
    StableThumbmark,
    ThumbmarkShifted,
    Recognized { visit_count: u64 },
    RecognizedWithoutLocalCopy,
    IpChanged { previous: String, current: String },
    TreatedAsNew,
    UserAgentChanged,
    PlatformChanged,
    LanguagesChanged,
    ScreenChanged,
    ViewportChanged,
    TimezoneChanged,
    ConnectionChanged,
    ConcurrencyChanged,
    NoDeviations,
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Observation::FirstVisit => write!(
                f,
                "No fingerprint was stored locally; this is a first visit or storage was cleared."
            ),
            Observation::StableThumbmark => write!(
                f,
                "The thumbmark matches the one saved last time; the fingerprint is stable across sessions."
            ),
            Observation::ThumbmarkShifted => write!(
                f,
                "The thumbmark differs from the saved copy; locally this looks like a new device."
            ),
            Observation::Recognized { visit_count } => {
                write!(f, "The server recognized this thumbmark (visit #{}).", visit_count)
            }
            Observation::RecognizedWithoutLocalCopy => write!(
                f,
                "The server linked this device even though no local fingerprint was stored; recognition survived a client reset."
            ),
            Observation::IpChanged { previous, current } => write!(
                f,
                "The IP address changed since the last visit ({} -> {}); recognition persisted across a network change or VPN.",
                previous, current
            ),
            Observation::TreatedAsNew => write!(f, "The server treated this thumbmark as new."),
            Observation::UserAgentChanged => write!(
                f,
                "The browser/OS signature changed; the user agent differs from the last visit."
            ),
            Observation::PlatformChanged => write!(
                f,
                "The platform string changed; the runtime or device family may differ."
            ),
            Observation::LanguagesChanged => write!(f, "Language preferences changed."),
            Observation::ScreenChanged => write!(
                f,
                "Screen resolution changed (resize, external display or a different device)."
            ),
            Observation::ViewportChanged => write!(
                f,
                "Viewport width shifted; the window was resized or the viewport scale differs."
            ),
            Observation::TimezoneChanged => write!(
                f,
                "Timezone changed; likely a VPN, travel or a virtualized browser profile."
            ),
            Observation::ConnectionChanged => write!(f, "Network connection type or quality changed."),
            Observation::ConcurrencyChanged => write!(
                f,
                "Reported CPU concurrency changed; the container or VM profile may differ."
            ),
            Observation::NoDeviations => write!(
                f,
                "No notable deviations detected; the fingerprint remained consistent."
            ),
        }
    }
}

/// Compare the current snapshot against the previous one and the recognition facts
pub fn observe(
    current: &StoredFingerprint,
    previous: Option<&StoredFingerprint>,
    recognition: Option<&RecognitionMeta>,
) -> Vec<Observation> {
    let mut notes = Vec::new();

    notes.push(match previous {
        None => Observation::FirstVisit,
        Some(prev) if prev.thumbmark == current.thumbmark => Observation::StableThumbmark,
        Some(_) => Observation::ThumbmarkShifted,
    });

    if let Some(meta) = recognition {
        if meta.seen_before {
            notes.push(Observation::Recognized { visit_count: meta.visit_count });
            if previous.is_none() {
                notes.push(Observation::RecognizedWithoutLocalCopy);
            }
            if let Some((prev_ip, ip)) = meta.ip_moved() {
                notes.push(Observation::IpChanged {
                    previous: prev_ip.to_string(),
                    current: ip.to_string(),
                });
            }
        } else {
            notes.push(Observation::TreatedAsNew);
        }
    }

    if let Some(prev) = previous {
        let (was, now) = (&prev.traits, &current.traits);

        if was.user_agent != now.user_agent {
            notes.push(Observation::UserAgentChanged);
        }
        if was.platform != now.platform {
            notes.push(Observation::PlatformChanged);
        }
        if was.language != now.language || was.languages != now.languages {
            notes.push(Observation::LanguagesChanged);
        }
        if was.screen.width != now.screen.width || was.screen.height != now.screen.height {
            notes.push(Observation::ScreenChanged);
        }
        if was.viewport.inner_width != now.viewport.inner_width {
            notes.push(Observation::ViewportChanged);
        }
        if was.timezone != now.timezone {
            notes.push(Observation::TimezoneChanged);
        }
        if was.connection != now.connection {
            notes.push(Observation::ConnectionChanged);
        }
        if was.hardware_concurrency != now.hardware_concurrency {
            notes.push(Observation::ConcurrencyChanged);
        }
    }

    if notes.is_empty() {
        notes.push(Observation::NoDeviations);
    }

    notes
}

/// Rendered observation notes, in narrative order
pub fn build_observations(
    current: &StoredFingerprint,
    previous: Option<&StoredFingerprint>,
    recognition: Option<&RecognitionMeta>,
) -> Vec<String> {
    observe(current, previous, recognition)
        .iter()
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::SafeFingerprint;
    use chrono::Utc;

    fn snapshot(thumbmark: &str) -> StoredFingerprint {
        let traits = SafeFingerprint {
            user_agent: Some("Mozilla/5.0 (X11; Linux x86_64) Firefox/128.0".into()),
            platform: Some("Linux x86_64".into()),
            language: Some("en-US".into()),
            languages: vec!["en-US".into(), "en".into()],
            timezone: Some("Europe/Rome".into()),
            hardware_concurrency: Some(16),
            connection: Some("4g".into()),
            ..Default::default()
        };
        let mut s = StoredFingerprint::capture(traits, Utc::now());
        s.thumbmark = thumbmark.to_string();
        s
    }

    fn recognition(seen_before: bool, previous_ip: Option<&str>, client_ip: Option<&str>) -> RecognitionMeta {
        let now = Utc::now();
        RecognitionMeta {
            seen_before,
            visit_count: if seen_before { 3 } else { 1 },
            thumbmark: "abc".into(),
            id: "visitor_1".into(),
            first_seen: now,
            last_seen: now,
            client_ip: client_ip.map(String::from),
            previous_ip: previous_ip.map(String::from),
            ip_changed: None,
        }
    }

    #[test]
    fn test_first_visit_only() {
        let current = snapshot("abc");
        assert_eq!(observe(&current, None, None), vec![Observation::FirstVisit]);
        let notes = build_observations(&current, None, None);
        assert_eq!(notes.len(), 1);
        assert!(notes[0].contains("first visit"));
    }

    #[test]
    fn test_stable_and_shifted() {
        let current = snapshot("abc");
        assert_eq!(
            observe(&current, Some(&snapshot("abc")), None),
            vec![Observation::StableThumbmark]
        );
        assert_eq!(
            observe(&current, Some(&snapshot("def")), None),
            vec![Observation::ThumbmarkShifted]
        );
    }

    #[test]
    fn test_recognition_without_local_copy() {
        let current = snapshot("abc");
        let meta = recognition(true, None, Some("5.6.7.8"));
        assert_eq!(
            observe(&current, None, Some(&meta)),
            vec![
                Observation::FirstVisit,
                Observation::Recognized { visit_count: 3 },
                Observation::RecognizedWithoutLocalCopy,
            ]
        );
    }

    #[test]
    fn test_ip_change_names_both_addresses() {
        let current = snapshot("abc");
        let previous = snapshot("abc");
        let meta = recognition(true, Some("1.2.3.4"), Some("5.6.7.8"));

        let notes = build_observations(&current, Some(&previous), Some(&meta));
        assert_eq!(notes.len(), 3);
        assert!(notes[2].contains("1.2.3.4"));
        assert!(notes[2].contains("5.6.7.8"));
    }

    #[test]
    fn test_treated_as_new() {
        let current = snapshot("abc");
        let meta = recognition(false, Some("1.2.3.4"), Some("5.6.7.8"));
        assert_eq!(
            observe(&current, None, Some(&meta)),
            vec![Observation::FirstVisit, Observation::TreatedAsNew]
        );
    }

    #[test]
    fn test_field_diffs_in_order() {
        let previous = snapshot("abc");
        let mut current = snapshot("def");
        current.traits.hardware_concurrency = Some(4);
        current.traits.user_agent = Some("Mozilla/5.0 (Windows NT 10.0) Edg/120".into());
        current.traits.languages = vec!["en".into(), "en-US".into()];
        current.traits.screen.height = Some(900);
        current.traits.timezone = Some("America/New_York".into());

        assert_eq!(
            observe(&current, Some(&previous), None),
            vec![
                Observation::ThumbmarkShifted,
                Observation::UserAgentChanged,
                Observation::LanguagesChanged,
                Observation::ScreenChanged,
                Observation::TimezoneChanged,
                Observation::ConcurrencyChanged,
            ]
        );
    }

    #[test]
    fn test_language_sequence_length_matters() {
        let previous = snapshot("abc");
        let mut current = snapshot("abc");
        current.traits.languages.push("it".into());
        assert!(observe(&current, Some(&previous), None).contains(&Observation::LanguagesChanged));
    }

    #[test]
    fn test_viewport_platform_connection() {
        let previous = snapshot("abc");
        let mut current = snapshot("abc");
        current.traits.platform = Some("MacIntel".into());
        current.traits.viewport.inner_width = Some(800);
        current.traits.connection = None;

        assert_eq!(
            observe(&current, Some(&previous), None),
            vec![
                Observation::StableThumbmark,
                Observation::PlatformChanged,
                Observation::ViewportChanged,
                Observation::ConnectionChanged,
            ]
        );
    }
}
