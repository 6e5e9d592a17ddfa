//! Credential handling.

pub mod credentials;

pub use credentials::{EngineCredentials, SecretString};
