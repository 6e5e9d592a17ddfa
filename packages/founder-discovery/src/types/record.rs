//! Records produced by bulk discovery.

use serde::{Deserialize, Serialize};

/// A founder the answer engine surfaced for a set of criteria.
///
/// Produced fresh per discovery call and never persisted by this crate.
/// `name` is never empty and `confidence` is always within `[0, 1]`;
/// [`crate::pipeline::extract_list`] drops or repairs elements that would
/// break either invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryRecord {
    pub name: String,
    pub role: String,
    pub company: String,
    pub location: String,
    pub description: String,
    /// Canonical `https://www.linkedin.com/in/<handle>` form when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    pub confidence: f64,
}

impl DiscoveryRecord {
    /// Create a record with only a name; other text fields start empty.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: String::new(),
            company: String::new(),
            location: String::new(),
            description: String::new(),
            linkedin_url: None,
            confidence: 0.0,
        }
    }

    /// Splits `name` into first and last name on the last space.
    ///
    /// Single-word names have no last name.
    pub fn split_name(&self) -> (&str, Option<&str>) {
        match self.name.trim().rsplit_once(char::is_whitespace) {
            Some((first, last)) => (first.trim(), Some(last.trim())),
            None => (self.name.trim(), None),
        }
    }
}

/// Clamp a confidence into `[0, 1]`; non-finite values become 0.
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_linkedin_url_camel_case() {
        let mut record = DiscoveryRecord::named("Melanie Perkins");
        record.linkedin_url = Some("https://www.linkedin.com/in/melanieperkins".into());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["linkedinUrl"], "https://www.linkedin.com/in/melanieperkins");
    }

    #[test]
    fn test_split_name() {
        let record = DiscoveryRecord::named("Mary Ann Smith");
        assert_eq!(record.split_name(), ("Mary Ann", Some("Smith")));
        let record = DiscoveryRecord::named("Cher");
        assert_eq!(record.split_name(), ("Cher", None));
    }

    #[test]
    fn test_clamp_confidence() {
        assert_eq!(clamp_confidence(1.7), 1.0);
        assert_eq!(clamp_confidence(-0.2), 0.0);
        assert_eq!(clamp_confidence(0.42), 0.42);
        assert_eq!(clamp_confidence(f64::NAN), 0.0);
    }
}
