//! Case-insensitive header access.
//!
//! GitHub header names arrive with inconsistent casing (`X-GitHub-Event`,
//! `x-github-event`), so every key is folded to lower case before any lookup.

use std::collections::HashMap;

use axum::http::HeaderMap;

pub const EVENT_HEADER: &str = "x-github-event";
pub const DELIVERY_HEADER: &str = "x-github-delivery";
pub const SIGNATURE_SHA256_HEADER: &str = "x-hub-signature-256";
pub const SIGNATURE_SHA1_HEADER: &str = "x-hub-signature";

/// Request headers keyed by lower-cased name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedHeaders {
    inner: HashMap<String, String>,
}

impl NormalizedHeaders {
    /// Look up a header by name, in any casing.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Whether a header is present, regardless of its value.
    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(&name.to_ascii_lowercase())
    }

    /// The declared GitHub event type, empty when the header is absent.
    pub fn event_type(&self) -> &str {
        self.get(EVENT_HEADER).unwrap_or_default()
    }

    /// The GitHub delivery GUID, if sent.
    pub fn delivery_id(&self) -> Option<&str> {
        self.get(DELIVERY_HEADER)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Fold header names to lower case, keeping every value.
///
/// When two keys differ only by case, the one seen last wins.
pub fn normalize_headers<I, K, V>(headers: I) -> NormalizedHeaders
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let inner = headers
        .into_iter()
        .map(|(k, v)| (k.as_ref().to_ascii_lowercase(), v.into()))
        .collect();
    NormalizedHeaders { inner }
}

impl From<&HeaderMap> for NormalizedHeaders {
    /// Every header is kept. Non UTF-8 bytes in a value are replaced, so a
    /// malformed value still counts as present.
    fn from(headers: &HeaderMap) -> Self {
        normalize_headers(headers.iter().map(|(name, value)| {
            (name.as_str(), String::from_utf8_lossy(value.as_bytes()).into_owned())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_lookup_in_any_casing() {
        let headers = normalize_headers([
            ("X-GitHub-Event", "workflow_job"),
            ("X-Hub-Signature-256", "sha256=abc"),
        ]);

        assert_eq!(headers.get("x-github-event"), Some("workflow_job"));
        assert_eq!(headers.get("X-GITHUB-EVENT"), Some("workflow_job"));
        assert_eq!(headers.event_type(), "workflow_job");
        assert!(headers.contains("x-hub-signature-256"));
        assert!(!headers.contains(SIGNATURE_SHA1_HEADER));
    }

    #[test]
    fn test_mixed_case_only_header_is_kept() {
        let headers = normalize_headers([("X-GitHub-Delivery", "72d3162e")]);
        assert_eq!(headers.delivery_id(), Some("72d3162e"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_empty_headers() {
        let headers = normalize_headers(Vec::<(String, String)>::new());
        assert!(headers.is_empty());
        assert_eq!(headers.event_type(), "");
    }

    #[test]
    fn test_from_header_map() {
        let mut map = HeaderMap::new();
        map.insert("x-github-event", HeaderValue::from_static("push"));
        map.insert("x-bad", HeaderValue::from_bytes(b"\xff").unwrap());

        let headers = NormalizedHeaders::from(&map);
        assert_eq!(headers.event_type(), "push");
        assert!(headers.contains("x-bad"));
        assert_eq!(headers.get("x-bad"), Some("\u{fffd}"));
    }
}
