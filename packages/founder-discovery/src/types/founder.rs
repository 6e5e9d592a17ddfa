//! Persisted founder model and the partial updates enrichment produces.
//!
//! The store owns these rows' lifecycle; this crate only reads them and
//! merges partial updates into them.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationFailure;
use crate::id::Id;
use crate::types::record::DiscoveryRecord;

pub type FounderId = Id<FounderRecord>;
pub type TagId = Id<Tag>;
pub type StartupId = Id<Startup>;

/// A founder as stored in the relational store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct FounderRecord {
    pub id: FounderId,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub linkedin_url: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: String,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FounderRecord {
    /// New founder with the given name, dated now.
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: FounderId::new(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: None,
            linkedin_url: None,
            city: None,
            state: None,
            country: "Australia".to_string(),
            bio: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }

    /// Check the invariants the store boundary enforces on every row.
    pub fn validate(&self) -> Result<(), ValidationFailure> {
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err(ValidationFailure::InvalidRecord {
                detail: format!("founder {} has a blank name", self.id),
            });
        }
        Ok(())
    }

    /// Overwrite fields present in the patch; absent fields are left alone.
    pub fn apply(&mut self, patch: &EnrichmentPatch) {
        fn set(target: &mut String, value: &Option<String>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }
        fn set_opt(target: &mut Option<String>, value: &Option<String>) {
            if value.is_some() {
                *target = value.clone();
            }
        }

        set(&mut self.first_name, &patch.first_name);
        set(&mut self.last_name, &patch.last_name);
        set(&mut self.country, &patch.country);
        set_opt(&mut self.email, &patch.email);
        set_opt(&mut self.linkedin_url, &patch.linkedin_url);
        set_opt(&mut self.city, &patch.city);
        set_opt(&mut self.state, &patch.state);
        set_opt(&mut self.bio, &patch.bio);
        self.updated_at = Utc::now();
    }
}

/// A partial founder: only the fields that are known.
///
/// `None` means "not known / not found" and is never written to the
/// store; `Some("")` would be a found-but-empty value and is kept
/// distinct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<FounderId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl EnrichmentPatch {
    /// Patch naming the research subject.
    pub fn for_name(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
            ..Default::default()
        }
    }

    /// Non-blank first and last name, if both are present.
    pub fn subject_name(&self) -> Option<(&str, &str)> {
        let first = self.first_name.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let last = self.last_name.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some((first, last))
    }

    pub fn get(&self, field: EnrichedField) -> Option<&str> {
        match field {
            EnrichedField::LinkedinUrl => self.linkedin_url.as_deref(),
            EnrichedField::City => self.city.as_deref(),
            EnrichedField::State => self.state.as_deref(),
            EnrichedField::Bio => self.bio.as_deref(),
        }
    }

    pub fn set(&mut self, field: EnrichedField, value: impl Into<String>) {
        let value = Some(value.into());
        match field {
            EnrichedField::LinkedinUrl => self.linkedin_url = value,
            EnrichedField::City => self.city = value,
            EnrichedField::State => self.state = value,
            EnrichedField::Bio => self.bio = value,
        }
    }

    /// Enrichable fields that carry a value.
    pub fn enriched_fields(&self) -> Vec<EnrichedField> {
        EnrichedField::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_some())
            .collect()
    }

    /// Reject patches that would blank a stored founder's name.
    pub fn validate_for_update(&self) -> Result<(), ValidationFailure> {
        let blank = |v: &Option<String>| v.as_deref().is_some_and(|s| s.trim().is_empty());
        if blank(&self.first_name) || blank(&self.last_name) {
            return Err(ValidationFailure::InvalidRecord {
                detail: "patch would blank the founder's name".to_string(),
            });
        }
        Ok(())
    }

    /// True when the patch would change nothing in a store update.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.country.is_none()
            && self.enriched_fields().is_empty()
    }
}

impl From<&FounderRecord> for EnrichmentPatch {
    fn from(founder: &FounderRecord) -> Self {
        Self {
            id: Some(founder.id),
            first_name: Some(founder.first_name.clone()),
            last_name: Some(founder.last_name.clone()),
            email: founder.email.clone(),
            linkedin_url: founder.linkedin_url.clone(),
            city: founder.city.clone(),
            state: founder.state.clone(),
            country: Some(founder.country.clone()),
            bio: founder.bio.clone(),
        }
    }
}

/// Seed a research subject from a discovery result.
///
/// A single-word name leaves `last_name` unset, so enrichment of that
/// record fails name validation instead of guessing.
impl From<&DiscoveryRecord> for EnrichmentPatch {
    fn from(record: &DiscoveryRecord) -> Self {
        let (first_name, last_name) = record.split_name();
        Self {
            first_name: Some(first_name.to_string()),
            last_name: last_name.map(str::to_string),
            linkedin_url: record.linkedin_url.clone(),
            ..Default::default()
        }
    }
}

/// Fields enrichment can derive from an engine reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichedField {
    LinkedinUrl,
    City,
    State,
    Bio,
}

impl EnrichedField {
    pub const ALL: [EnrichedField; 4] = [
        EnrichedField::LinkedinUrl,
        EnrichedField::City,
        EnrichedField::State,
        EnrichedField::Bio,
    ];

    /// Column name in the founders table.
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrichedField::LinkedinUrl => "linkedin_url",
            EnrichedField::City => "city",
            EnrichedField::State => "state",
            EnrichedField::Bio => "bio",
        }
    }
}

impl fmt::Display for EnrichedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A label that can be attached to founders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Link between a founder and a tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct FounderTag {
    pub founder_id: FounderId,
    pub tag_id: TagId,
    pub confidence_score: Option<f64>,
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A startup a founder is or was involved in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Startup {
    pub id: StartupId,
    pub name: String,
    pub description: Option<String>,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub stage: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Startup {
    pub fn new(name: impl Into<String>, industry: Option<&str>) -> Self {
        Self {
            id: StartupId::new(),
            name: name.into(),
            description: None,
            website: None,
            industry: industry.map(str::to_string),
            stage: None,
            created_at: Utc::now(),
        }
    }
}

/// Link between a founder and a startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct FounderStartup {
    pub founder_id: FounderId,
    pub startup_id: StartupId,
    pub role: Option<String>,
    pub is_current: bool,
}

/// Filter for reading founders back out of the store.
///
/// Empty fields do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FounderFilter {
    /// Case-insensitive substring of the founder's city.
    pub city_like: Option<String>,
    /// Exact industry of any linked startup.
    pub industry: Option<String>,
    /// Founder carries at least one of these tag names.
    pub tags_in: BTreeSet<String>,
}

impl FounderFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn city_like(mut self, city: impl Into<String>) -> Self {
        self.city_like = Some(city.into());
        self
    }

    pub fn industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }

    pub fn tags_in(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags_in.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Trimmed city term; blank counts as unset.
    pub fn city_term(&self) -> Option<&str> {
        non_blank(&self.city_like)
    }

    /// Trimmed industry; blank counts as unset.
    pub fn industry_term(&self) -> Option<&str> {
        non_blank(&self.industry)
    }

    /// Non-blank tag names, trimmed.
    pub fn tag_names(&self) -> Vec<&str> {
        self.tags_in
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
