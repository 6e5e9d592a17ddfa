//! Relational record store contract.
//!
//! The store owns persistence, transactions, and schema. This crate only
//! issues the parameterised reads and writes below; no raw query strings
//! cross this boundary. Implementations validate rows they hand back
//! against [`FounderRecord::validate`] rather than trusting the upstream
//! shape.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::founder::{EnrichmentPatch, FounderFilter, FounderId, FounderRecord, TagId};

/// `source` recorded on tags attached from engine output.
pub const TAG_SOURCE_AI_ANALYSIS: &str = "ai_analysis";

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Founders matching every populated field of the filter.
    async fn find_founders(&self, filter: &FounderFilter) -> Result<Vec<FounderRecord>>;

    /// Write the populated fields of `patch` onto the founder.
    ///
    /// `patch.id` is ignored; `id` selects the row. Absent fields are not
    /// touched.
    async fn update_founder(&self, id: FounderId, patch: &EnrichmentPatch) -> Result<()>;

    /// Return the id of the tag with this name, creating it if needed.
    async fn upsert_tag(&self, name: &str) -> Result<TagId>;

    /// Attach a tag to a founder, replacing any existing link's confidence
    /// and source.
    async fn link_founder_tag(
        &self,
        founder_id: FounderId,
        tag_id: TagId,
        confidence: f64,
        source: &str,
    ) -> Result<()>;
}
