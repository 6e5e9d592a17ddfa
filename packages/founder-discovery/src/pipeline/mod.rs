//! The discovery pipeline.
//!
//! - Prompt construction from criteria or a subject name
//! - Record list extraction from engine replies
//! - Field extraction rules for single-founder enrichment
//! - Per-invocation stage tracking

pub mod extract;
pub mod prompts;
pub mod rules;
pub mod stage;

pub use extract::extract_list;
pub use prompts::{QueryBuilder, DISCOVERY_INSTRUCTIONS, RESEARCH_INSTRUCTIONS};
pub use rules::{
    canonical_linkedin_url, extract_fields, BioRule, FieldRule, FieldRules, LinkedinRule,
    LocationRule, RuleMatch,
};
pub use stage::{Operation, PipelineRun, PipelineStage};
