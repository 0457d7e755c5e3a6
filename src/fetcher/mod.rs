//! Sources of registry metadata for Forge modules.
//!
//! This module provides the [`MetadataFetcher`] trait used by the update
//! checker to learn a module's latest version and deprecation state, and
//! [`SnapshotFetcher`], which serves metadata that was fetched ahead of
//! time and saved to a JSON file.

mod snapshot;

pub use snapshot::SnapshotFetcher;

use crate::model::{ModuleMetadata, ModuleReference};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Module not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid metadata: {0}")]
    InvalidData(String),
}

/// Trait for looking up registry metadata for a module.
///
/// Implementations are called once per Forge-hosted module and may be
/// called concurrently for different modules.
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self, module: &ModuleReference) -> Result<ModuleMetadata, FetchError>;
}
