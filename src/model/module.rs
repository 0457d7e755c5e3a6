use serde::{Deserialize, Serialize};

use crate::checker::normalize_slug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleSource {
    Forge,
    Git,
}

impl ModuleSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleSource::Forge => "forge",
            ModuleSource::Git => "git",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ModuleSource::Forge => "Forge",
            ModuleSource::Git => "Git",
        }
    }
}

impl std::fmt::Display for ModuleSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A single `mod` declaration from a Puppetfile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleReference {
    pub name: String,
    pub version: String,
    pub source: ModuleSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_locator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<String>,
    pub declaration_line: usize,
}

impl ModuleReference {
    pub fn forge(name: impl Into<String>, version: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            source: ModuleSource::Forge,
            source_locator: None,
            source_ref: None,
            declaration_line: line,
        }
    }

    /// A module pinned to a git repository. The ref doubles as its version.
    pub fn git(
        name: impl Into<String>,
        locator: impl Into<String>,
        git_ref: Option<String>,
        line: usize,
    ) -> Self {
        Self {
            name: name.into(),
            version: git_ref.clone().unwrap_or_else(|| "HEAD".to_string()),
            source: ModuleSource::Git,
            source_locator: Some(locator.into()),
            source_ref: git_ref,
            declaration_line: line,
        }
    }

    pub fn slug(&self) -> String {
        normalize_slug(&self.name)
    }

    pub fn is_version_controlled(&self) -> bool {
        self.source == ModuleSource::Git
    }

    /// The version this module is pinned to, as reported back to the user.
    pub fn pinned_version(&self) -> &str {
        self.source_ref.as_deref().unwrap_or(&self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_module_uses_ref_as_version() {
        let module = ModuleReference::git(
            "apache",
            "https://github.com/puppetlabs/puppetlabs-apache.git",
            Some("v5.1.0".to_string()),
            7,
        );

        assert!(module.is_version_controlled());
        assert_eq!(module.version, "v5.1.0");
        assert_eq!(module.pinned_version(), "v5.1.0");
    }

    #[test]
    fn test_git_module_without_ref_tracks_head() {
        let module = ModuleReference::git("ntp", "git@example.com:ntp.git", None, 1);
        assert_eq!(module.pinned_version(), "HEAD");
        assert_eq!(module.source_ref, None);
    }

    #[test]
    fn test_forge_module_slug() {
        let module = ModuleReference::forge("PuppetLabs/Apache", "5.0.0", 1);
        assert_eq!(module.slug(), "puppetlabs-apache");
        assert!(!module.is_version_controlled());
    }
}
