//! Answer-engine implementations.

pub mod perplexity;

pub use perplexity::PerplexityEngine;
