//! Structured search criteria for bulk discovery.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Funding stage a discovered founder's startup should be at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FundingStage {
    PreSeed,
    Seed,
    SeriesA,
    Growth,
}

impl FundingStage {
    /// Token used on the wire and in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            FundingStage::PreSeed => "pre-seed",
            FundingStage::Seed => "seed",
            FundingStage::SeriesA => "series-a",
            FundingStage::Growth => "growth",
        }
    }
}

/// Renders the stage as it reads in a sentence ("Series A", not "series-a").
impl fmt::Display for FundingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FundingStage::SeriesA => write!(f, "Series A"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

impl FromStr for FundingStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_lowercase().replace(['_', ' '], "-");
        match token.as_str() {
            "pre-seed" | "preseed" => Ok(FundingStage::PreSeed),
            "seed" => Ok(FundingStage::Seed),
            "series-a" => Ok(FundingStage::SeriesA),
            "growth" => Ok(FundingStage::Growth),
            _ => Err(format!("unknown funding stage: {}", s)),
        }
    }
}

/// What population to search for. Every field is optional; an absent
/// (or blank) field leaves that dimension unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiscoveryCriteria {
    pub location: Option<String>,
    pub industry: Option<String>,
    pub stage: Option<FundingStage>,
    pub diversity_attributes: BTreeSet<String>,
}

impl DiscoveryCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }

    pub fn with_stage(mut self, stage: FundingStage) -> Self {
        self.stage = Some(stage);
        self
    }

    pub fn with_diversity(mut self, attributes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.diversity_attributes
            .extend(attributes.into_iter().map(Into::into));
        self
    }

    pub fn location(&self) -> Option<&str> {
        non_blank(self.location.as_deref())
    }

    pub fn industry(&self) -> Option<&str> {
        non_blank(self.industry.as_deref())
    }

    /// Trimmed, non-blank diversity terms in sorted order.
    pub fn diversity_terms(&self) -> Vec<&str> {
        let terms: BTreeSet<&str> = self
            .diversity_attributes
            .iter()
            .filter_map(|t| non_blank(Some(t)))
            .collect();
        terms.into_iter().collect()
    }

    /// True when no dimension is constrained.
    pub fn is_unconstrained(&self) -> bool {
        self.location().is_none()
            && self.industry().is_none()
            && self.stage.is_none()
            && self.diversity_terms().is_empty()
    }
}

/// Trim whitespace and trailing sentence punctuation; `None` if nothing is left.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value
        .map(|v| v.trim().trim_end_matches(['.', ',', ';']).trim_end())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_parses_kebab_tokens() {
        assert_eq!("pre-seed".parse::<FundingStage>(), Ok(FundingStage::PreSeed));
        assert_eq!("Series_A".parse::<FundingStage>(), Ok(FundingStage::SeriesA));
        assert_eq!("growth".parse::<FundingStage>(), Ok(FundingStage::Growth));
        assert!("series-z".parse::<FundingStage>().is_err());
    }

    #[test]
    fn test_stage_serde_uses_kebab_case() {
        let json = serde_json::to_string(&FundingStage::SeriesA).unwrap();
        assert_eq!(json, "\"series-a\"");
        assert_eq!(FundingStage::SeriesA.to_string(), "Series A");
    }

    #[test]
    fn test_blank_fields_are_unconstrained() {
        let criteria = DiscoveryCriteria::new()
            .with_location("   ")
            .with_industry("")
            .with_diversity(["  "]);
        assert!(criteria.is_unconstrained());
    }

    #[test]
    fn test_punctuation_only_fields_are_unconstrained() {
        let criteria = DiscoveryCriteria::new()
            .with_location(" ;")
            .with_industry("...")
            .with_diversity([","]);
        assert_eq!(criteria.industry(), None);
        assert!(criteria.is_unconstrained());

        let criteria = DiscoveryCriteria::new().with_industry("fintech.");
        assert_eq!(criteria.industry(), Some("fintech"));
        assert!(!criteria.is_unconstrained());
    }

    #[test]
    fn test_diversity_terms_are_trimmed_and_deduplicated() {
        let criteria = DiscoveryCriteria::new().with_diversity(["women", " women ", "LGBTQI+"]);
        assert_eq!(criteria.diversity_terms(), vec!["LGBTQI+", "women"]);
    }

    #[test]
    fn test_deserializes_camel_case_with_missing_fields() {
        let criteria: DiscoveryCriteria =
            serde_json::from_str(r#"{"industry": "fintech", "diversityAttributes": ["migrant"]}"#)
                .unwrap();
        assert_eq!(criteria.industry(), Some("fintech"));
        assert_eq!(criteria.location(), None);
        assert_eq!(criteria.diversity_terms(), vec!["migrant"]);
    }
}
