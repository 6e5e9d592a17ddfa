//! Core trait abstractions.
//!
//! The service depends only on these seams; applications inject the
//! Perplexity engine and a real store, tests inject the mocks from
//! [`crate::testing`] and [`crate::stores::MemoryRecordStore`].

pub mod engine;
pub mod store;
