use futures::stream::{self, StreamExt};
use std::sync::Arc;

use super::advisory::AdvisoryRegistry;
use super::version::is_newer;
use crate::fetcher::MetadataFetcher;
use crate::model::{ModuleReference, UpdateCheckResult};

/// Default number of metadata lookups in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Checks declared modules for newer releases, deprecation, and advisories.
///
/// Metadata comes from a [`MetadataFetcher`]; advisories come from a shared,
/// read-only [`AdvisoryRegistry`]. Git-pinned modules are never looked up.
///
/// # Example
///
/// ```
/// use forgecheck::checker::{AdvisoryRegistry, UpdateChecker};
/// use forgecheck::fetcher::SnapshotFetcher;
/// use forgecheck::model::ModuleReference;
/// use std::sync::Arc;
///
/// let checker = UpdateChecker::new(SnapshotFetcher::default(), Arc::new(AdvisoryRegistry::new()))
///     .with_concurrency(4);
/// let modules = vec![ModuleReference::forge("puppetlabs/apache", "5.0.0", 1)];
///
/// let results = futures::executor::block_on(checker.check_for_updates(&modules));
/// assert_eq!(results.len(), 1);
/// // Not in the snapshot, so the result is degraded rather than an error
/// assert!(!results[0].has_update);
/// assert!(results[0].fetch_error.is_some());
/// ```
pub struct UpdateChecker<F> {
    fetcher: F,
    registry: Arc<AdvisoryRegistry>,
    concurrency: usize,
}

impl<F: MetadataFetcher> UpdateChecker<F> {
    /// Creates a checker with [`DEFAULT_CONCURRENCY`] lookups in flight.
    pub fn new(fetcher: F, registry: Arc<AdvisoryRegistry>) -> Self {
        Self {
            fetcher,
            registry,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Sets how many metadata lookups may run at once. Zero is raised to one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Checks every module, returning one result per module in input order.
    ///
    /// Lookups run concurrently. A failed lookup only degrades that
    /// module's result.
    ///
    /// # Errors
    ///
    /// This never fails as a whole. Fetch errors are logged and recorded in
    /// [`UpdateCheckResult::fetch_error`] for the affected module, which keeps
    /// its current version and reports no update.
    pub async fn check_for_updates(&self, modules: &[ModuleReference]) -> Vec<UpdateCheckResult> {
        stream::iter(modules)
            .map(|module| self.check_module(module))
            .buffered(self.concurrency)
            .collect()
            .await
    }

    async fn check_module(&self, module: &ModuleReference) -> UpdateCheckResult {
        if module.is_version_controlled() {
            tracing::debug!(module = %module.name, "skipping git module");
            return UpdateCheckResult::unchanged(module);
        }

        let current = module.version.as_str();

        match self.fetcher.fetch(module).await {
            Ok(metadata) => {
                let security_status = self.registry.security_status(
                    &module.name,
                    current,
                    metadata.deprecated,
                );

                UpdateCheckResult {
                    module: module.clone(),
                    current_version: current.to_string(),
                    has_update: is_newer(&metadata.latest_version, current),
                    latest_version: metadata.latest_version,
                    deprecated: metadata.deprecated,
                    deprecated_for: metadata.deprecated_for,
                    superseded_by: metadata.superseded_by,
                    security_status: Some(security_status),
                    fetch_error: None,
                }
            }
            Err(e) => {
                tracing::warn!(
                    module = %module.name,
                    fetcher = self.fetcher.name(),
                    error = %e,
                    "metadata lookup failed"
                );

                // Advisories are local, so they are still reported.
                UpdateCheckResult {
                    security_status: Some(
                        self.registry
                            .security_status(&module.name, current, false),
                    ),
                    fetch_error: Some(e.to_string()),
                    ..UpdateCheckResult::unchanged(module)
                }
            }
        }
    }
}
