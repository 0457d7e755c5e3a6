use crate::checker::normalize_slug;
use crate::model::{ModuleMetadata, ModuleReference};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::{FetchError, MetadataFetcher};

/// Serves Forge metadata from a snapshot keyed by module identifier.
///
/// The snapshot file is a JSON object mapping module names (either
/// `owner/name` or `owner-name`) to metadata:
///
/// ```json
/// {
///   "puppetlabs/apache": { "latest_version": "12.1.0" },
///   "puppetlabs-ntp": {
///     "latest_version": "10.1.0",
///     "deprecated": true,
///     "deprecated_for": "Use puppet/chrony instead",
///     "superseded_by": "puppet/chrony"
///   }
/// }
/// ```
#[derive(Debug, Default)]
pub struct SnapshotFetcher {
    modules: HashMap<String, ModuleMetadata>,
}

impl SnapshotFetcher {
    pub fn new(modules: HashMap<String, ModuleMetadata>) -> Self {
        Self {
            modules: modules
                .into_iter()
                .map(|(name, meta)| (normalize_slug(&name), meta))
                .collect(),
        }
    }

    pub fn load_file(path: &Path) -> Result<Self, FetchError> {
        let content = fs::read_to_string(path)?;
        let modules: HashMap<String, ModuleMetadata> = serde_json::from_str(&content)
            .map_err(|e| FetchError::InvalidData(format!("{}: {}", path.display(), e)))?;

        tracing::debug!(path = %path.display(), modules = modules.len(), "loaded metadata snapshot");
        Ok(Self::new(modules))
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[async_trait]
impl MetadataFetcher for SnapshotFetcher {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    async fn fetch(&self, module: &ModuleReference) -> Result<ModuleMetadata, FetchError> {
        let slug = module.slug();
        let metadata = self
            .modules
            .get(&slug)
            .cloned()
            .ok_or(FetchError::NotFound(slug))?;

        if metadata.latest_version.trim().is_empty() {
            return Err(FetchError::InvalidData(format!(
                "{} has no latest version",
                module.name
            )));
        }

        Ok(metadata)
    }
}
