use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ModuleReference, SecurityAdvisory, Severity};

/// Registry metadata for one module, as supplied by a [`crate::fetcher::MetadataFetcher`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleMetadata {
    pub latest_version: String,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated_for: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superseded_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityStatus {
    pub module_slug: String,
    pub has_advisories: bool,
    pub advisories: Vec<SecurityAdvisory>,
    pub deprecated: bool,
}

impl SecurityStatus {
    /// The most severe advisory, if any.
    pub fn highest_severity(&self) -> Option<Severity> {
        self.advisories.iter().map(|a| a.severity).max()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCheckResult {
    pub module: ModuleReference,
    pub current_version: String,
    pub latest_version: String,
    pub has_update: bool,
    pub deprecated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated_for: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superseded_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_status: Option<SecurityStatus>,
    /// Set when registry metadata could not be obtained for this module.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_error: Option<String>,
}

impl UpdateCheckResult {
    /// A result carrying no update information: latest equals current.
    pub fn unchanged(module: &ModuleReference) -> Self {
        let version = module.pinned_version().to_string();
        Self {
            module: module.clone(),
            current_version: version.clone(),
            latest_version: version,
            has_update: false,
            deprecated: false,
            deprecated_for: None,
            superseded_by: None,
            security_status: None,
            fetch_error: None,
        }
    }

    pub fn has_security_advisory(&self) -> bool {
        self.security_status
            .as_ref()
            .map(|s| s.has_advisories)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateKind {
    Major,
    Minor,
    Patch,
}

impl UpdateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateKind::Major => "major",
            UpdateKind::Minor => "minor",
            UpdateKind::Patch => "patch",
        }
    }
}

impl std::fmt::Display for UpdateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Final per-module report record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleUpdate {
    pub name: String,
    pub current_version: String,
    pub latest_version: String,
    pub has_update: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_kind: Option<UpdateKind>,
    pub deprecated: bool,
    pub has_security_advisory: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest_severity: Option<Severity>,
    pub advisories: Vec<SecurityAdvisory>,
    pub changelog: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateReport {
    pub generated_at: DateTime<Utc>,
    pub updates: Vec<ModuleUpdate>,
}

impl UpdateReport {
    pub fn new(updates: Vec<ModuleUpdate>) -> Self {
        Self {
            generated_at: Utc::now(),
            updates,
        }
    }

    pub fn outdated_count(&self) -> usize {
        self.updates.iter().filter(|u| u.has_update).count()
    }

    pub fn vulnerable_count(&self) -> usize {
        self.updates.iter().filter(|u| u.has_security_advisory).count()
    }

    pub fn deprecated_count(&self) -> usize {
        self.updates.iter().filter(|u| u.deprecated).count()
    }

    pub fn highest_severity(&self) -> Option<Severity> {
        self.updates.iter().filter_map(|u| u.highest_severity).max()
    }
}
