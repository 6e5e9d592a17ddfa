//! Discovery service: the orchestrator callers talk to.
//!
//! Each `discover`/`enrich` call is a sequential build → query → extract
//! pipeline with its own [`PipelineRun`]. The service keeps no cross-call
//! state, so one instance can be cloned and called concurrently.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{DiscoveryError, Result, ValidationFailure};
use crate::pipeline::rules::require_subject_name;
use crate::pipeline::{extract_list, FieldRules, Operation, PipelineRun, QueryBuilder};
use crate::traits::engine::{AnswerEngine, EngineResponse, SourcePolicy};
use crate::traits::store::{RecordStore, TAG_SOURCE_AI_ANALYSIS};
use crate::types::criteria::DiscoveryCriteria;
use crate::types::founder::{EnrichmentPatch, FounderFilter, FounderId, FounderRecord, TagId};
use crate::types::record::DiscoveryRecord;

/// Per-call limits on the network stage.
#[derive(Debug, Clone, Default)]
pub struct InvocationOptions {
    /// Overrides the service default when set
    pub timeout: Option<Duration>,
    pub cancel: Option<CancellationToken>,
}

impl InvocationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn ensure_not_cancelled(&self) -> Result<()> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(DiscoveryError::Cancelled),
            _ => Ok(()),
        }
    }
}

/// Founder discovery and enrichment over an answer engine and a record store.
#[derive(Clone)]
pub struct DiscoveryService {
    engine: Arc<dyn AnswerEngine>,
    store: Arc<dyn RecordStore>,
    queries: QueryBuilder,
    rules: Arc<FieldRules>,
    default_timeout: Option<Duration>,
}

impl DiscoveryService {
    pub fn new(engine: Arc<dyn AnswerEngine>, store: Arc<dyn RecordStore>) -> Self {
        Self {
            engine,
            store,
            queries: QueryBuilder::default(),
            rules: Arc::new(FieldRules::standard()),
            default_timeout: None,
        }
    }

    /// Apply region wording and the default timeout from config.
    pub fn with_config(mut self, config: &Config) -> Self {
        self.queries = QueryBuilder::from_config(config);
        self.default_timeout = config.timeout;
        self
    }

    pub fn with_queries(mut self, queries: QueryBuilder) -> Self {
        self.queries = queries;
        self
    }

    pub fn with_rules(mut self, rules: FieldRules) -> Self {
        self.rules = Arc::new(rules);
        self
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    pub fn queries(&self) -> &QueryBuilder {
        &self.queries
    }

    // =========================================================================
    // Discovery
    // =========================================================================

    /// Find founders matching `criteria`.
    ///
    /// Repeating a call may return different founders; the engine is not
    /// deterministic.
    pub async fn discover(&self, criteria: &DiscoveryCriteria) -> Result<Vec<DiscoveryRecord>> {
        self.discover_with(criteria, InvocationOptions::default()).await
    }

    pub async fn discover_with(
        &self,
        criteria: &DiscoveryCriteria,
        options: InvocationOptions,
    ) -> Result<Vec<DiscoveryRecord>> {
        let mut run = PipelineRun::new(Operation::Discover);

        match self.run_discover(&mut run, criteria, &options).await {
            Ok(records) => {
                info!(
                    records = records.len(),
                    elapsed_ms = run.elapsed().as_millis() as u64,
                    "Discovery complete"
                );
                Ok(records)
            }
            Err(e) => Err(run.fail(e)),
        }
    }

    async fn run_discover(
        &self,
        run: &mut PipelineRun,
        criteria: &DiscoveryCriteria,
        options: &InvocationOptions,
    ) -> Result<Vec<DiscoveryRecord>> {
        options.ensure_not_cancelled()?;

        run.advance();
        let prompt = self.queries.build(criteria);
        debug!(
            prompt_len = prompt.len(),
            unconstrained = criteria.is_unconstrained(),
            "Built discovery prompt"
        );

        run.advance();
        let response = self
            .query_engine(&prompt, &SourcePolicy::discovery(), options)
            .await?;

        run.advance();
        let records = extract_list(&response)?;

        run.advance();
        Ok(records)
    }

    // =========================================================================
    // Enrichment
    // =========================================================================

    /// Research one founder and merge what was found onto `partial`.
    ///
    /// A reply with nothing extractable returns `partial` unchanged.
    ///
    /// # Errors
    ///
    /// `Validation { NameRequired }` before any network call when `partial`
    /// lacks a first or last name.
    pub async fn enrich(&self, partial: &EnrichmentPatch) -> Result<EnrichmentPatch> {
        self.enrich_with(partial, InvocationOptions::default()).await
    }

    pub async fn enrich_with(
        &self,
        partial: &EnrichmentPatch,
        options: InvocationOptions,
    ) -> Result<EnrichmentPatch> {
        let mut run = PipelineRun::new(Operation::Enrich);

        match self.run_enrich(&mut run, partial, &options).await {
            Ok(patch) => {
                info!(
                    fields_found = patch.enriched_fields().len(),
                    elapsed_ms = run.elapsed().as_millis() as u64,
                    "Enrichment complete"
                );
                Ok(patch)
            }
            Err(e) => Err(run.fail(e)),
        }
    }

    /// Research a founder surfaced by [`Self::discover`].
    ///
    /// The record's name is split into first and last name on the last
    /// space; its LinkedIn URL, if any, is carried into the result.
    pub async fn enrich_discovered(
        &self,
        record: &DiscoveryRecord,
        options: InvocationOptions,
    ) -> Result<EnrichmentPatch> {
        self.enrich_with(&EnrichmentPatch::from(record), options).await
    }

    async fn run_enrich(
        &self,
        run: &mut PipelineRun,
        partial: &EnrichmentPatch,
        options: &InvocationOptions,
    ) -> Result<EnrichmentPatch> {
        let (first_name, last_name) = require_subject_name(partial)?;
        options.ensure_not_cancelled()?;

        run.advance();
        let prompt = self.queries.build_research(first_name, last_name);

        run.advance();
        let response = self
            .query_engine(&prompt, &SourcePolicy::research(), options)
            .await?;

        run.advance();
        let patch = self.rules.extract(&response, partial)?;

        run.advance();
        Ok(patch)
    }

    async fn query_engine(
        &self,
        prompt: &str,
        policy: &SourcePolicy,
        options: &InvocationOptions,
    ) -> Result<EngineResponse> {
        self.bounded(self.engine.query(prompt, policy), options).await
    }

    /// Run one network call under the effective timeout and cancel token.
    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T>>,
        options: &InvocationOptions,
    ) -> Result<T> {
        let timeout = options.timeout.or(self.default_timeout);

        let timed = async {
            match timeout {
                Some(after) => match tokio::time::timeout(after, call).await {
                    Ok(result) => result,
                    Err(_) => Err(DiscoveryError::Timeout { after }),
                },
                None => call.await,
            }
        };

        match &options.cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(DiscoveryError::Cancelled),
                    result = timed => result,
                }
            }
            None => timed.await,
        }
    }

    // =========================================================================
    // Store pass-throughs
    // =========================================================================

    // Store calls are bounded by the service default timeout only.

    pub async fn find_founders(&self, filter: &FounderFilter) -> Result<Vec<FounderRecord>> {
        let founders = self
            .bounded(self.store.find_founders(filter), &InvocationOptions::default())
            .await?;
        debug!(count = founders.len(), "Loaded founders");
        Ok(founders)
    }

    /// Persist an enrichment result.
    ///
    /// Returns `false` without touching the store when the patch carries no
    /// enriched fields.
    pub async fn save_enrichment(&self, founder_id: FounderId, patch: &EnrichmentPatch) -> Result<bool> {
        let fields = patch.enriched_fields();
        if fields.is_empty() {
            debug!(founder_id = %founder_id, "Nothing to save");
            return Ok(false);
        }

        self.bounded(
            self.store.update_founder(founder_id, patch),
            &InvocationOptions::default(),
        )
        .await?;

        info!(
            founder_id = %founder_id,
            fields = ?fields.iter().map(|f| f.as_str()).collect::<Vec<_>>(),
            "Saved enrichment"
        );
        Ok(true)
    }

    /// Attach a tag to a founder as an AI-derived label.
    ///
    /// # Errors
    ///
    /// - `Validation { ConfidenceOutOfRange }` unless `0 <= confidence <= 1`
    /// - `Validation { EmptyTagName }` for a blank tag name
    pub async fn tag_founder(&self, founder_id: FounderId, tag_name: &str, confidence: f64) -> Result<TagId> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(ValidationFailure::ConfidenceOutOfRange.into());
        }
        let tag_name = tag_name.trim();
        if tag_name.is_empty() {
            return Err(ValidationFailure::EmptyTagName.into());
        }

        let options = InvocationOptions::default();
        let tag_id = self.bounded(self.store.upsert_tag(tag_name), &options).await?;
        self.bounded(
            self.store
                .link_founder_tag(founder_id, tag_id, confidence, TAG_SOURCE_AI_ANALYSIS),
            &options,
        )
        .await?;

        info!(founder_id = %founder_id, tag = tag_name, confidence, "Tagged founder");
        Ok(tag_id)
    }

    /// Enrich a stored founder and write back what was found.
    pub async fn enrich_and_save(&self, founder: &FounderRecord) -> Result<EnrichmentPatch> {
        self.enrich_and_save_with(founder, InvocationOptions::default())
            .await
    }

    /// Like [`Self::enrich_and_save`]; the options bound the engine call.
    pub async fn enrich_and_save_with(
        &self,
        founder: &FounderRecord,
        options: InvocationOptions,
    ) -> Result<EnrichmentPatch> {
        let patch = self
            .enrich_with(&EnrichmentPatch::from(founder), options)
            .await?;
        self.save_enrichment(founder.id, &patch).await?;
        Ok(patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builders() {
        let token = CancellationToken::new();
        let options = InvocationOptions::new()
            .with_timeout(Duration::from_secs(5))
            .with_cancel(token.clone());
        assert_eq!(options.timeout, Some(Duration::from_secs(5)));
        assert!(options.ensure_not_cancelled().is_ok());

        token.cancel();
        assert!(matches!(
            options.ensure_not_cancelled(),
            Err(DiscoveryError::Cancelled)
        ));
    }
}
