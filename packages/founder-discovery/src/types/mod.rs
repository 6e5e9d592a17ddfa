//! Domain types: search criteria, discovered records, and the persisted
//! founder model that enrichment patches.

pub mod criteria;
pub mod founder;
pub mod record;
