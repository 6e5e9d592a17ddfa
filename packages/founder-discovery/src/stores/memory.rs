//! In-memory record store for testing and development.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{DiscoveryError, Result};
use crate::traits::store::RecordStore;
use crate::types::founder::{
    EnrichmentPatch, FounderFilter, FounderId, FounderRecord, FounderStartup, FounderTag, Startup,
    StartupId, Tag, TagId,
};

/// In-memory founders, startups, and tags.
///
/// Applies the same filter semantics and row validation as the Postgres
/// store. Not suitable for production as data is lost on restart.
pub struct MemoryRecordStore {
    founders: RwLock<HashMap<FounderId, FounderRecord>>,
    startups: RwLock<HashMap<StartupId, Startup>>,
    founder_startups: RwLock<Vec<FounderStartup>>,
    tags: RwLock<HashMap<TagId, Tag>>,
    founder_tags: RwLock<HashMap<(FounderId, TagId), FounderTag>>,
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self {
            founders: RwLock::new(HashMap::new()),
            startups: RwLock::new(HashMap::new()),
            founder_startups: RwLock::new(Vec::new()),
            tags: RwLock::new(HashMap::new()),
            founder_tags: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a founder row as-is.
    ///
    /// Rows are not validated here; invalid rows are rejected when read.
    pub fn insert_founder(&self, founder: FounderRecord) -> FounderId {
        let id = founder.id;
        self.founders.write().unwrap().insert(id, founder);
        id
    }

    pub fn insert_startup(&self, startup: Startup) -> StartupId {
        let id = startup.id;
        self.startups.write().unwrap().insert(id, startup);
        id
    }

    /// Record that a founder works on a startup.
    pub fn link_startup(&self, founder_id: FounderId, startup_id: StartupId, role: Option<&str>) {
        self.founder_startups.write().unwrap().push(FounderStartup {
            founder_id,
            startup_id,
            role: role.map(str::to_string),
            is_current: true,
        });
    }

    pub fn founder(&self, id: FounderId) -> Option<FounderRecord> {
        self.founders.read().unwrap().get(&id).cloned()
    }

    pub fn tag_by_name(&self, name: &str) -> Option<Tag> {
        self.tags
            .read()
            .unwrap()
            .values()
            .find(|t| t.name == name)
            .cloned()
    }

    pub fn tag_count(&self) -> usize {
        self.tags.read().unwrap().len()
    }

    /// Tags attached to a founder.
    pub fn founder_tags(&self, founder_id: FounderId) -> Vec<FounderTag> {
        let mut links: Vec<FounderTag> = self
            .founder_tags
            .read()
            .unwrap()
            .values()
            .filter(|ft| ft.founder_id == founder_id)
            .cloned()
            .collect();
        links.sort_by_key(|ft| ft.created_at);
        links
    }

    /// Clear all stored data.
    pub fn clear(&self) {
        self.founders.write().unwrap().clear();
        self.startups.write().unwrap().clear();
        self.founder_startups.write().unwrap().clear();
        self.tags.write().unwrap().clear();
        self.founder_tags.write().unwrap().clear();
    }

    fn works_in_industry(&self, founder_id: FounderId, industry: &str) -> bool {
        let startups = self.startups.read().unwrap();
        self.founder_startups
            .read()
            .unwrap()
            .iter()
            .filter(|link| link.founder_id == founder_id)
            .filter_map(|link| startups.get(&link.startup_id))
            .any(|s| s.industry.as_deref() == Some(industry))
    }

    fn has_any_tag(&self, founder_id: FounderId, names: &[&str]) -> bool {
        let tags = self.tags.read().unwrap();
        self.founder_tags
            .read()
            .unwrap()
            .values()
            .filter(|ft| ft.founder_id == founder_id)
            .filter_map(|ft| tags.get(&ft.tag_id))
            .any(|t| names.contains(&t.name.as_str()))
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn find_founders(&self, filter: &FounderFilter) -> Result<Vec<FounderRecord>> {
        let city = filter.city_term().map(str::to_lowercase);
        let industry = filter.industry_term();
        let tag_names = filter.tag_names();

        let candidates: Vec<FounderRecord> = self.founders.read().unwrap().values().cloned().collect();

        let mut matched = Vec::new();
        for founder in candidates {
            if let Some(city) = &city {
                let in_city = founder
                    .city
                    .as_deref()
                    .is_some_and(|c| c.to_lowercase().contains(city.as_str()));
                if !in_city {
                    continue;
                }
            }
            if let Some(industry) = industry {
                if !self.works_in_industry(founder.id, industry) {
                    continue;
                }
            }
            if !tag_names.is_empty() && !self.has_any_tag(founder.id, &tag_names) {
                continue;
            }

            founder.validate()?;
            matched.push(founder);
        }

        matched.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(matched)
    }

    async fn update_founder(&self, id: FounderId, patch: &EnrichmentPatch) -> Result<()> {
        patch.validate_for_update()?;

        let mut founders = self.founders.write().unwrap();
        let founder = founders
            .get_mut(&id)
            .ok_or_else(|| DiscoveryError::storage(format!("founder {} not found", id)))?;
        founder.apply(patch);
        Ok(())
    }

    async fn upsert_tag(&self, name: &str) -> Result<TagId> {
        let mut tags = self.tags.write().unwrap();
        if let Some(existing) = tags.values().find(|t| t.name == name) {
            return Ok(existing.id);
        }

        let tag = Tag {
            id: TagId::new(),
            name: name.to_string(),
            category: None,
            description: None,
            created_at: Utc::now(),
        };
        let id = tag.id;
        tags.insert(id, tag);
        Ok(id)
    }

    async fn link_founder_tag(
        &self,
        founder_id: FounderId,
        tag_id: TagId,
        confidence: f64,
        source: &str,
    ) -> Result<()> {
        if !self.founders.read().unwrap().contains_key(&founder_id) {
            return Err(DiscoveryError::storage(format!("founder {} not found", founder_id)));
        }
        if !self.tags.read().unwrap().contains_key(&tag_id) {
            return Err(DiscoveryError::storage(format!("tag {} not found", tag_id)));
        }

        let mut links = self.founder_tags.write().unwrap();
        let created_at = links
            .get(&(founder_id, tag_id))
            .map(|existing| existing.created_at)
            .unwrap_or_else(Utc::now);
        links.insert(
            (founder_id, tag_id),
            FounderTag {
                founder_id,
                tag_id,
                confidence_score: Some(confidence),
                source: Some(source.to_string()),
                created_at,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn founder(first: &str, last: &str, city: &str) -> FounderRecord {
        let mut f = FounderRecord::new(first, last);
        f.city = Some(city.to_string());
        f
    }

    #[tokio::test]
    async fn test_city_filter_is_case_insensitive_substring() {
        let store = MemoryRecordStore::new();
        store.insert_founder(founder("Jane", "Citizen", "North Sydney"));
        store.insert_founder(founder("Sam", "Lee", "Melbourne"));

        let found = store
            .find_founders(&FounderFilter::new().city_like("sydney"))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].first_name, "Jane");
    }

    #[tokio::test]
    async fn test_industry_filter_uses_linked_startups() {
        let store = MemoryRecordStore::new();
        let jane = store.insert_founder(founder("Jane", "Citizen", "Adelaide"));
        store.insert_founder(founder("Sam", "Lee", "Adelaide"));
        let startup = store.insert_startup(Startup::new("PayRight", Some("Fintech")));
        store.link_startup(jane, startup, Some("CEO"));

        let found = store
            .find_founders(&FounderFilter::new().industry("Fintech"))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, jane);

        let none = store
            .find_founders(&FounderFilter::new().industry("fintech"))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_tag_filter_matches_any() {
        let store = MemoryRecordStore::new();
        let jane = store.insert_founder(founder("Jane", "Citizen", "Perth"));
        let sam = store.insert_founder(founder("Sam", "Lee", "Perth"));
        store.insert_founder(founder("Alex", "Ng", "Perth"));

        let women = store.upsert_tag("women").await.unwrap();
        let regional = store.upsert_tag("regional").await.unwrap();
        store.link_founder_tag(jane, women, 0.9, "ai_analysis").await.unwrap();
        store.link_founder_tag(sam, regional, 0.6, "ai_analysis").await.unwrap();

        let found = store
            .find_founders(&FounderFilter::new().tags_in(["women", "regional"]))
            .await
            .unwrap();
        let ids: Vec<_> = found.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![jane, sam]);
    }

    #[tokio::test]
    async fn test_blank_name_rows_are_rejected_on_read() {
        let store = MemoryRecordStore::new();
        store.insert_founder(founder("Jane", " ", "Hobart"));

        let err = store.find_founders(&FounderFilter::new()).await.unwrap_err();
        assert_eq!(err.reason(), Some("invalid-record"));
    }

    #[tokio::test]
    async fn test_update_applies_only_present_fields() {
        let store = MemoryRecordStore::new();
        let mut f = founder("Jane", "Citizen", "Hobart");
        f.bio = Some("Old".into());
        let id = store.insert_founder(f);

        let patch = EnrichmentPatch {
            state: Some("TAS".into()),
            ..Default::default()
        };
        store.update_founder(id, &patch).await.unwrap();

        let stored = store.founder(id).unwrap();
        assert_eq!(stored.state.as_deref(), Some("TAS"));
        assert_eq!(stored.city.as_deref(), Some("Hobart"));
        assert_eq!(stored.bio.as_deref(), Some("Old"));
    }

    #[tokio::test]
    async fn test_update_missing_founder_is_storage_error() {
        let store = MemoryRecordStore::new();
        let err = store
            .update_founder(FounderId::new(), &EnrichmentPatch::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);
    }

    #[tokio::test]
    async fn test_upsert_tag_is_idempotent() {
        let store = MemoryRecordStore::new();
        let a = store.upsert_tag("climate").await.unwrap();
        let b = store.upsert_tag("climate").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(store.tag_count(), 1);
    }

    #[tokio::test]
    async fn test_relinking_replaces_confidence() {
        let store = MemoryRecordStore::new();
        let jane = store.insert_founder(founder("Jane", "Citizen", "Perth"));
        let tag = store.upsert_tag("women").await.unwrap();

        store.link_founder_tag(jane, tag, 0.4, "ai_analysis").await.unwrap();
        store.link_founder_tag(jane, tag, 0.8, "manual").await.unwrap();

        let links = store.founder_tags(jane);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].confidence_score, Some(0.8));
        assert_eq!(links[0].source.as_deref(), Some("manual"));
    }

    #[tokio::test]
    async fn test_link_unknown_tag_fails() {
        let store = MemoryRecordStore::new();
        let jane = store.insert_founder(founder("Jane", "Citizen", "Perth"));
        let err = store
            .link_founder_tag(jane, TagId::new(), 0.5, "ai_analysis")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);
    }
}
