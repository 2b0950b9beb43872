//! Entity source abstraction for FlavorDB-style catalogs.
//!
//! This module defines the [`EntitySource`] trait, a unified interface for
//! fetching one upstream entity by its integer id. The reconciliation pass in
//! `pairing_engine` only talks to this trait, so it can run against the live
//! REST API, an on-disk replay cache ([`cache::CachedSource`]), or a test fake.
//!
//! An empty id slot is not an error: sources report it as
//! [`EntityPayload::NotFound`] and the caller moves on to the next id.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use flavor_ingestor::providers::{EntityPayload, EntitySource, ProviderError};
//!
//! struct EmptyCatalog;
//!
//! #[async_trait]
//! impl EntitySource for EmptyCatalog {
//!     async fn fetch_entity(&self, _entity_id: u32) -> Result<EntityPayload, ProviderError> {
//!         Ok(EntityPayload::NotFound)
//!     }
//! }
//! ```

pub mod cache;
pub mod flavordb_rest;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use snafu::{Backtrace, Snafu};

/// Outcome of fetching one entity id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "body", rename_all = "snake_case")]
pub enum EntityPayload {
    /// The id exists; the raw JSON body is returned undecoded.
    Found(serde_json::Value),
    /// The id slot is empty upstream (HTTP 404).
    NotFound,
}

/// Trait for fetching single entities from an upstream catalog.
///
/// Implementations must be shareable across tasks; a failure for one id must
/// not poison later calls for other ids.
#[async_trait]
pub trait EntitySource: Send + Sync {
    /// Fetches the entity stored under `entity_id`.
    ///
    /// # Returns
    ///
    /// * `Ok(EntityPayload::Found(_))` - the raw JSON body.
    /// * `Ok(EntityPayload::NotFound)` - nothing is stored under this id.
    /// * `Err(ProviderError)` - transport or API failure for this id only.
    async fn fetch_entity(&self, entity_id: u32) -> Result<EntityPayload, ProviderError>;
}

#[async_trait]
impl<S: EntitySource + ?Sized> EntitySource for Box<S> {
    async fn fetch_entity(&self, entity_id: u32) -> Result<EntityPayload, ProviderError> {
        (**self).fetch_entity(entity_id).await
    }
}

/// Errors that can occur during the creation of a provider instance
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The configured base URL cannot be used.
    #[snafu(display("Invalid base URL {url:?}: {message}"))]
    InvalidBaseUrl {
        url: String,
        message: String,
        backtrace: Backtrace,
    },
}

/// Errors that can occur within an `EntitySource` implementation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    /// An error during an API request (e.g., network failure, timeout, undecodable body).
    #[snafu(display("entity {entity_id}: request failed: {source}"))]
    Reqwest {
        entity_id: u32,
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The API answered with a non-success status other than 404.
    #[snafu(display("entity {entity_id}: API error {status}: {message}"))]
    Api {
        entity_id: u32,
        status: u16,
        message: String,
        backtrace: Backtrace,
    },
}
