//! Field extraction rules for single-founder enrichment.
//!
//! Each rule is an independent pattern → setter pair. Rules never see each
//! other's output, so their order does not matter and a rule that finds
//! nothing does not stop the others. A schema-constrained engine reply can
//! replace any rule without touching the service.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::{Result, ValidationFailure};
use crate::traits::engine::EngineResponse;
use crate::types::founder::{EnrichedField, EnrichmentPatch};

static RE_LINKEDIN_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i:linkedin\.com)/in/([A-Za-z0-9-]+)").unwrap());
static RE_LINKEDIN_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i:(?:https?://)?(?:[a-z]{2,3}\.)?linkedin\.com)/in/([A-Za-z0-9-]+)/?(?:[?#]\S*)?$")
        .unwrap()
});
static RE_BASED_IN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bbased in\s+([^.;\n]+)").unwrap());
static RE_BACKGROUND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)background:([^.]+)").unwrap());

fn linkedin_profile(handle: &str) -> String {
    format!("https://www.linkedin.com/in/{}", handle)
}

/// Canonical profile URL for a value that is itself a LinkedIn profile URL.
///
/// Accepts an optional scheme, an optional `www.`/country subdomain, a
/// trailing slash, and a query string; anything else is `None`.
pub fn canonical_linkedin_url(url: &str) -> Option<String> {
    RE_LINKEDIN_URL
        .captures(url.trim())
        .map(|caps| linkedin_profile(&caps[1]))
}

/// A named extraction rule.
pub trait FieldRule: Send + Sync {
    fn name(&self) -> &'static str;

    /// Set whatever this rule finds in `text` on `patch`; return the fields set.
    fn apply(&self, text: &str, patch: &mut EnrichmentPatch) -> Vec<EnrichedField>;
}

/// First `linkedin.com/in/<handle>` mention, canonicalised.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkedinRule;

impl FieldRule for LinkedinRule {
    fn name(&self) -> &'static str {
        "linkedin"
    }

    fn apply(&self, text: &str, patch: &mut EnrichmentPatch) -> Vec<EnrichedField> {
        match RE_LINKEDIN_MENTION.captures(text) {
            Some(caps) => {
                patch.set(EnrichedField::LinkedinUrl, linkedin_profile(&caps[1]));
                vec![EnrichedField::LinkedinUrl]
            }
            None => vec![],
        }
    }
}

/// `based in <city>[, <state>]`.
///
/// The phrase runs to the next period, semicolon, or line break. The city
/// ends at the first comma; the following segment becomes the state only
/// when it reads like a place name.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocationRule;

impl LocationRule {
    fn looks_like_place(segment: &str) -> bool {
        let starts_ok = segment
            .chars()
            .next()
            .is_some_and(|c| c.is_uppercase() || c.is_ascii_digit());
        starts_ok && segment.split_whitespace().count() <= 3
    }
}

impl FieldRule for LocationRule {
    fn name(&self) -> &'static str {
        "location"
    }

    fn apply(&self, text: &str, patch: &mut EnrichmentPatch) -> Vec<EnrichedField> {
        let Some(caps) = RE_BASED_IN.captures(text) else {
            return vec![];
        };

        let mut segments = caps[1].split(',').map(str::trim);
        let mut found = Vec::new();

        if let Some(city) = segments.next().filter(|c| !c.is_empty()) {
            patch.set(EnrichedField::City, city);
            found.push(EnrichedField::City);
        }
        if let Some(state) = segments
            .next()
            .filter(|s| !s.is_empty() && Self::looks_like_place(s))
        {
            patch.set(EnrichedField::State, state);
            found.push(EnrichedField::State);
        }

        found
    }
}

/// `background: <text>` up to the next period.
#[derive(Debug, Clone, Copy, Default)]
pub struct BioRule;

impl FieldRule for BioRule {
    fn name(&self) -> &'static str {
        "bio"
    }

    fn apply(&self, text: &str, patch: &mut EnrichmentPatch) -> Vec<EnrichedField> {
        let bio = RE_BACKGROUND
            .captures(text)
            .map(|caps| {
                // Markdown emphasis around the label ("**Background:**") leaks into the capture
                caps[1]
                    .trim_matches(|c: char| c.is_whitespace() || c == '*' || c == '_')
                    .to_string()
            })
            .filter(|b| !b.is_empty());

        match bio {
            Some(bio) => {
                patch.set(EnrichedField::Bio, bio);
                vec![EnrichedField::Bio]
            }
            None => vec![],
        }
    }
}

/// Outcome of one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    pub rule: &'static str,
    pub fields: Vec<EnrichedField>,
}

/// An ordered set of rules applied independently to the same text.
pub struct FieldRules {
    rules: Vec<Box<dyn FieldRule>>,
}

impl Default for FieldRules {
    fn default() -> Self {
        Self::standard()
    }
}

impl FieldRules {
    /// No rules; every extraction returns its input unchanged.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// LinkedIn, location, and bio.
    pub fn standard() -> Self {
        Self::empty()
            .with_rule(LinkedinRule)
            .with_rule(LocationRule)
            .with_rule(BioRule)
    }

    pub fn with_rule(mut self, rule: impl FieldRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Run every rule over `text`, reporting the ones that set something.
    pub fn apply(&self, text: &str, patch: &mut EnrichmentPatch) -> Vec<RuleMatch> {
        self.rules
            .iter()
            .filter_map(|rule| {
                let fields = rule.apply(text, patch);
                (!fields.is_empty()).then(|| RuleMatch {
                    rule: rule.name(),
                    fields,
                })
            })
            .collect()
    }

    /// Merge everything the rules find in the reply onto a copy of `base`.
    ///
    /// # Errors
    ///
    /// `Validation { NameRequired }` when `base` lacks a non-blank first or
    /// last name. Checked before any rule runs.
    pub fn extract(&self, response: &EngineResponse, base: &EnrichmentPatch) -> Result<EnrichmentPatch> {
        require_subject_name(base)?;

        let mut patch = base.clone();
        let matches = self.apply(&response.content, &mut patch);

        debug!(
            rules_matched = matches.len(),
            rules_total = self.rules.len(),
            "Applied field rules"
        );

        Ok(patch)
    }
}

/// Fail with `name-required` unless both names are present and non-blank.
pub fn require_subject_name(base: &EnrichmentPatch) -> Result<(&str, &str)> {
    base.subject_name()
        .ok_or_else(|| ValidationFailure::NameRequired.into())
}

/// Merge fields found in the reply onto a copy of `base` using the standard rules.
pub fn extract_fields(response: &EngineResponse, base: &EnrichmentPatch) -> Result<EnrichmentPatch> {
    FieldRules::standard().extract(response, base)
}
