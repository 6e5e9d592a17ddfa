//! Founder Discovery
//!
//! Finds startup founders matching structured criteria by asking a
//! web-grounded answer engine, and enriches individual founder profiles
//! with LinkedIn, location, and background details.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use founder_discovery::{Config, DiscoveryCriteria, DiscoveryService, MemoryRecordStore, PerplexityEngine};
//!
//! let config = Config::from_env()?;
//! let service = DiscoveryService::new(
//!     Arc::new(PerplexityEngine::from_config(&config)),
//!     Arc::new(MemoryRecordStore::new()),
//! )
//! .with_config(&config);
//!
//! let criteria = DiscoveryCriteria::new()
//!     .with_industry("fintech")
//!     .with_location("Adelaide");
//! let founders = service.discover(&criteria).await?;
//! ```
//!
//! # Modules
//!
//! - [`types`] - Criteria, discovered records, persisted founders
//! - [`traits`] - Answer engine and record store seams
//! - [`pipeline`] - Prompt building, extraction, stage tracking
//! - [`engines`] - Perplexity answer engine
//! - [`stores`] - Record stores (memory, Postgres behind `postgres`)
//! - [`service`] - The orchestrator
//! - [`testing`] - Mock answer engine

pub mod config;
pub mod engines;
pub mod error;
pub mod id;
pub mod pipeline;
pub mod security;
pub mod service;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

pub use config::Config;
pub use engines::PerplexityEngine;
pub use error::{DiscoveryError, ErrorKind, ExtractionFailure, Result, ValidationFailure};
pub use id::Id;
pub use pipeline::{
    extract_fields, extract_list, FieldRule, FieldRules, PipelineRun, PipelineStage, QueryBuilder,
};
pub use service::{DiscoveryService, InvocationOptions};
pub use stores::MemoryRecordStore;
pub use traits::engine::{AnswerEngine, EngineResponse, SourcePolicy};
pub use traits::store::{RecordStore, TAG_SOURCE_AI_ANALYSIS};
pub use types::criteria::{DiscoveryCriteria, FundingStage};
pub use types::founder::{
    EnrichedField, EnrichmentPatch, FounderFilter, FounderId, FounderRecord, FounderStartup,
    FounderTag, Startup, StartupId, Tag, TagId,
};
pub use types::record::DiscoveryRecord;

#[cfg(feature = "postgres")]
pub use stores::PostgresRecordStore;

// Re-export testing utilities
pub use testing::{MockAnswerEngine, MockEngineCall};
