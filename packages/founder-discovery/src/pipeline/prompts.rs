//! Prompt construction for the answer engine.
//!
//! Pure and deterministic: the same criteria always yield the same prompt.

use crate::config::Config;
use crate::types::criteria::DiscoveryCriteria;

/// Appended to every bulk discovery prompt. The field names must match
/// what [`super::extract_list`] reads.
pub const DISCOVERY_INSTRUCTIONS: &str = "For each founder, provide: their full name, current role, company name, location, brief description of their work, and LinkedIn URL if available. Format the response as a JSON array of objects with these fields: name, role, company, location, description, linkedinUrl, confidence (0-1).";

/// Appended to single-founder research prompts. Phrased so the reply
/// carries the markers the field rules look for.
pub const RESEARCH_INSTRUCTIONS: &str = "Summarise their background in one sentence that starts with \"Background:\". State where they are based as \"based in <city>, <state>.\" and include their LinkedIn profile URL (linkedin.com/in/...) if one exists.";

/// Builds natural-language prompts from structured input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBuilder {
    region: String,
    country: String,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self {
            region: "Australian".to_string(),
            country: "Australia".to_string(),
        }
    }
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Target a different population, e.g. `("New Zealand", "New Zealand")`.
    pub fn with_region(mut self, region: impl Into<String>, country: impl Into<String>) -> Self {
        self.region = region.into();
        self.country = country.into();
        self
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new().with_region(config.region.clone(), config.country.clone())
    }

    /// Bulk discovery prompt.
    ///
    /// Clauses are emitted in the fixed order diversity, industry, stage,
    /// location, each only when that criterion is present.
    pub fn build(&self, criteria: &DiscoveryCriteria) -> String {
        let mut sentence = String::from("Find");
        let region = self.region.trim();
        if !region.is_empty() {
            sentence.push(' ');
            sentence.push_str(region);
        }
        sentence.push_str(" startup founders");

        let diversity = criteria.diversity_terms();
        if !diversity.is_empty() {
            sentence.push_str(" who are ");
            sentence.push_str(&diversity.join(" or "));
        }
        if let Some(industry) = criteria.industry() {
            sentence.push_str(&format!(" in the {} industry", industry));
        }
        if let Some(stage) = criteria.stage {
            sentence.push_str(&format!(" at {} stage", stage));
        }
        if let Some(location) = criteria.location() {
            sentence.push_str(&format!(" based in {}", location));
        }

        format!("{}. {}", sentence, DISCOVERY_INSTRUCTIONS)
    }

    /// Single-subject research prompt.
    pub fn build_research(&self, first_name: &str, last_name: &str) -> String {
        format!(
            "Research {} {} entrepreneur {} startup background projects. {}",
            first_name.trim(),
            last_name.trim(),
            self.country.trim(),
            RESEARCH_INSTRUCTIONS
        )
    }
}

/// Strip trailing sentence punctuation so it does not collide with ours.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::criteria::FundingStage;
    use proptest::prelude::*;

    #[test]
    fn test_empty_criteria_is_a_plain_sentence() {
        let prompt = QueryBuilder::new().build(&DiscoveryCriteria::new());
        assert!(prompt.starts_with("Find Australian startup founders. For each founder"));
        assert!(!prompt.contains("who are"));
    }

    #[test]
    fn test_all_clauses_in_fixed_order() {
        let criteria = DiscoveryCriteria::new()
            .with_location("Adelaide")
            .with_industry("fintech")
            .with_stage(FundingStage::SeriesA)
            .with_diversity(["women", "First Nations"]);

        let prompt = QueryBuilder::new().build(&criteria);
        assert!(prompt.starts_with(
            "Find Australian startup founders who are First Nations or women in the fintech industry at Series A stage based in Adelaide. "
        ));
    }

    #[test]
    fn test_industry_precedes_location() {
        let criteria = DiscoveryCriteria::new()
            .with_industry("fintech")
            .with_location("Adelaide");
        let prompt = QueryBuilder::new().build(&criteria);

        let industry = prompt.find("fintech industry").unwrap();
        let location = prompt.find("based in Adelaide").unwrap();
        assert!(industry < location);
    }

    #[test]
    fn test_instruction_names_every_field() {
        let prompt = QueryBuilder::new().build(&DiscoveryCriteria::new());
        assert!(prompt.contains(
            "name, role, company, location, description, linkedinUrl, confidence"
        ));
        assert!(prompt.contains("JSON array"));
    }

    #[test]
    fn test_trailing_punctuation_in_values_is_dropped() {
        let criteria = DiscoveryCriteria::new().with_location("Perth.");
        let prompt = QueryBuilder::new().build(&criteria);
        assert!(prompt.contains("based in Perth. For each founder"));
    }

    #[test]
    fn test_punctuation_only_values_add_no_clause() {
        let criteria = DiscoveryCriteria::new()
            .with_industry("...")
            .with_location("Perth");
        let prompt = QueryBuilder::new().build(&criteria);
        assert!(prompt.starts_with("Find Australian startup founders based in Perth. For each founder"));
        assert!(!prompt.contains("  "));
    }

    #[test]
    fn test_custom_region() {
        let builder = QueryBuilder::new().with_region("New Zealand", "New Zealand");
        let prompt = builder.build(&DiscoveryCriteria::new());
        assert!(prompt.starts_with("Find New Zealand startup founders."));
        assert!(builder
            .build_research("Rod", "Drury")
            .starts_with("Research Rod Drury entrepreneur New Zealand startup"));
    }

    #[test]
    fn test_research_prompt_asks_for_markers_not_an_array() {
        let prompt = QueryBuilder::new().build_research(" Ada ", "Lovelace");
        assert!(prompt.starts_with("Research Ada Lovelace entrepreneur Australia startup background projects."));
        assert!(prompt.contains("Background:"));
        assert!(prompt.contains("based in"));
        assert!(prompt.contains("LinkedIn"));
        assert!(!prompt.contains("JSON array"));
    }

    fn word() -> impl Strategy<Value = String> {
        "[A-Z][a-z]{2,9}"
    }

    prop_compose! {
        fn arb_criteria()(
            location in proptest::option::of(word()),
            industry in proptest::option::of(word()),
            stage in proptest::option::of(prop_oneof![
                Just(FundingStage::PreSeed),
                Just(FundingStage::Seed),
                Just(FundingStage::SeriesA),
                Just(FundingStage::Growth),
            ]),
            diversity in proptest::collection::btree_set(word(), 0..3),
        ) -> DiscoveryCriteria {
            DiscoveryCriteria { location, industry, stage, diversity_attributes: diversity }
        }
    }

    proptest! {
        #[test]
        fn prop_prompt_is_well_formed(criteria in arb_criteria()) {
            let prompt = QueryBuilder::new().build(&criteria);
            prop_assert!(prompt.starts_with("Find Australian startup founders"));
            prop_assert!(!prompt.contains("is is"));
            prop_assert!(!prompt.contains("  "));
            prop_assert!(!prompt.contains(" ."));
            prop_assert!(prompt.ends_with(DISCOVERY_INSTRUCTIONS));
        }

        #[test]
        fn prop_prompt_is_deterministic(criteria in arb_criteria()) {
            let builder = QueryBuilder::new();
            prop_assert_eq!(builder.build(&criteria), builder.build(&criteria.clone()));
        }
    }
}
