//! In-memory security advisory registry.
//!
//! Advisories are keyed by a normalized module slug, so `puppetlabs/apache`
//! and `puppetlabs-apache` resolve to the same entry. The registry is filled
//! during a registration phase and then shared read-only (for example behind
//! an `Arc`) while modules are checked.
//!
//! # Example
//!
//! ```
//! use forgecheck::checker::AdvisoryRegistry;
//! use forgecheck::model::{SecurityAdvisory, Severity};
//!
//! let mut registry = AdvisoryRegistry::new();
//! registry.add(
//!     "puppetlabs/apache",
//!     SecurityAdvisory::new("FORGE-1", "Header injection", Severity::High, "< 2.0.0")
//!         .with_fixed_version("2.0.0"),
//! );
//!
//! assert_eq!(registry.query("puppetlabs-apache", Some("1.4.0")).len(), 1);
//! assert!(registry.query("puppetlabs-apache", Some("2.0.0")).is_empty());
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::version::{is_newer, is_sentinel_version};
use crate::model::{SecurityAdvisory, SecurityStatus};

/// Canonical form of a module identifier: lower-cased, with `/` turned into `-`.
pub fn normalize_slug(identifier: &str) -> String {
    identifier.trim().to_lowercase().replace('/', "-")
}

/// An advisory as it appears in an import file, tagged with its module.
#[derive(Deserialize)]
struct AdvisoryRecord {
    module: String,
    #[serde(flatten)]
    advisory: SecurityAdvisory,
}

#[derive(Debug, Default)]
pub struct AdvisoryRegistry {
    entries: HashMap<String, Vec<SecurityAdvisory>>,
}

impl AdvisoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads advisories from a JSON array of records, each carrying a `module` field.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid advisory JSON.
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read advisories from {}", path.display()))?;
        let records: Vec<AdvisoryRecord> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse advisories in {}", path.display()))?;

        let mut registry = Self::new();
        for record in records {
            registry.add(&record.module, record.advisory);
        }

        tracing::debug!(
            path = %path.display(),
            advisories = registry.len(),
            "loaded advisory registry"
        );
        Ok(registry)
    }

    /// Registers an advisory, appending to any already stored for the module.
    pub fn add(&mut self, module: &str, advisory: SecurityAdvisory) {
        self.entries
            .entry(normalize_slug(module))
            .or_default()
            .push(advisory);
    }

    /// Returns advisories for a module, in registration order.
    ///
    /// Without an installed version every advisory is returned. With one,
    /// only advisories whose range covers that version and whose fix (if
    /// any) is newer than it are returned.
    pub fn query(&self, module: &str, installed_version: Option<&str>) -> Vec<SecurityAdvisory> {
        let Some(advisories) = self.entries.get(&normalize_slug(module)) else {
            return Vec::new();
        };

        match installed_version {
            None => advisories.clone(),
            Some(version) => advisories
                .iter()
                .filter(|a| applies_to(a, version))
                .cloned()
                .collect(),
        }
    }

    /// Builds the security status attached to an update check result.
    pub fn security_status(
        &self,
        module: &str,
        installed_version: &str,
        deprecated: bool,
    ) -> SecurityStatus {
        let advisories = self.query(module, Some(installed_version));
        SecurityStatus {
            module_slug: normalize_slug(module),
            has_advisories: !advisories.is_empty(),
            advisories,
            deprecated,
        }
    }

    /// Drops every advisory for which `keep` returns false.
    pub fn retain(&mut self, mut keep: impl FnMut(&SecurityAdvisory) -> bool) {
        for advisories in self.entries.values_mut() {
            advisories.retain(|a| keep(a));
        }
    }

    /// Total number of registered advisories.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(Vec::is_empty)
    }
}

fn applies_to(advisory: &SecurityAdvisory, installed: &str) -> bool {
    if let Some(fixed) = &advisory.fixed_version {
        if !is_newer(fixed, installed) {
            return false;
        }
    }

    range_matches(&advisory.affected_versions, installed)
}

/// Evaluates a single-clause comparator expression against a version.
///
/// Expressions that cannot be understood are treated as matching. A
/// symbolic installed version only matches the open range.
fn range_matches(range: &str, version: &str) -> bool {
    let range = range.trim();
    if range.is_empty() || range == "*" {
        return true;
    }

    if is_sentinel_version(version) {
        return false;
    }

    let (op, threshold) = ["<=", ">=", "==", "<", ">", "="]
        .iter()
        .find_map(|op| range.strip_prefix(op).map(|rest| (*op, rest.trim())))
        .unwrap_or(("=", range));

    let numeric = threshold.split(['-', '+']).next().unwrap_or_default();
    let plain_version = !numeric.is_empty()
        && numeric
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'v'));
    if threshold.is_empty() || !plain_version {
        tracing::debug!(range, "unsupported advisory range, assuming affected");
        return true;
    }

    match op {
        "<" => is_newer(threshold, version),
        "<=" => !is_newer(version, threshold),
        ">" => is_newer(version, threshold),
        ">=" => !is_newer(threshold, version),
        _ => !is_newer(version, threshold) && !is_newer(threshold, version),
    }
}
