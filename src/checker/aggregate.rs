//! Turns update check results into report records with a readable changelog.

use super::version::classify_update;
use crate::model::{ModuleUpdate, UpdateCheckResult};

/// Converts check results into report records, one per result, in order.
///
/// `has_security_advisory` is true only when the result carries a security
/// status with at least one advisory.
///
/// # Example
///
/// ```
/// use forgecheck::checker::to_module_updates;
/// use forgecheck::model::{ModuleReference, UpdateCheckResult};
///
/// let module = ModuleReference::forge("puppetlabs/apache", "5.0.0", 1);
/// let updates = to_module_updates(&[UpdateCheckResult::unchanged(&module)]);
///
/// assert_eq!(updates.len(), 1);
/// assert!(!updates[0].has_security_advisory);
/// assert!(updates[0].changelog.is_empty());
/// ```
pub fn to_module_updates(results: &[UpdateCheckResult]) -> Vec<ModuleUpdate> {
    results.iter().map(to_module_update).collect()
}

fn to_module_update(result: &UpdateCheckResult) -> ModuleUpdate {
    let status = result.security_status.as_ref().filter(|s| s.has_advisories);
    let advisories = status.map(|s| s.advisories.clone()).unwrap_or_default();

    let update_kind = if result.has_update {
        classify_update(&result.current_version, &result.latest_version)
    } else {
        None
    };

    ModuleUpdate {
        name: result.module.name.clone(),
        current_version: result.current_version.clone(),
        latest_version: result.latest_version.clone(),
        has_update: result.has_update,
        update_kind,
        deprecated: result.deprecated,
        has_security_advisory: result.has_security_advisory(),
        highest_severity: status.and_then(|s| s.highest_severity()),
        advisories,
        changelog: build_changelog(result),
    }
}

/// Builds the changelog text for one result.
///
/// Sections appear in a fixed order, separated by a blank line:
///
/// 1. deprecation, with the `deprecated_for` reason verbatim and the
///    superseding module if known
/// 2. security advisories, one `- [SEVERITY] title (id)` entry each,
///    followed by the advisory description when it has one
/// 3. the version delta, or a note when update information was unavailable
///
/// Sections that do not apply are left out, so an up-to-date module with no
/// advisories yields an empty string.
pub fn build_changelog(result: &UpdateCheckResult) -> String {
    let mut sections: Vec<String> = Vec::new();

    if result.deprecated {
        let mut section = String::from("**Deprecated**: This module is deprecated.");
        if let Some(reason) = &result.deprecated_for {
            section.push_str(&format!(" Reason: {}", reason));
        }
        if let Some(replacement) = &result.superseded_by {
            section.push_str(&format!(" Superseded by `{}`.", replacement));
        }
        sections.push(section);
    }

    if let Some(status) = result.security_status.as_ref().filter(|s| s.has_advisories) {
        let mut lines = vec!["**Security Advisories**:".to_string()];
        for advisory in &status.advisories {
            let mut line = format!(
                "- [{}] {} ({}",
                advisory.severity.label(),
                advisory.title,
                advisory.id
            );
            if let Some(fixed) = &advisory.fixed_version {
                line.push_str(&format!(", fixed in {}", fixed));
            }
            line.push(')');
            lines.push(line);
            if !advisory.description.is_empty() {
                lines.push(format!("  {}", advisory.description));
            }
        }
        sections.push(lines.join("\n"));
    }

    if let Some(error) = &result.fetch_error {
        sections.push(format!("Update information unavailable: {}", error));
    } else if result.has_update {
        let mut line = format!(
            "Update available: {} -> {}",
            result.current_version, result.latest_version
        );
        if let Some(kind) = classify_update(&result.current_version, &result.latest_version) {
            line.push_str(&format!(" ({})", kind));
        }
        sections.push(line);
    }

    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModuleReference, SecurityAdvisory, SecurityStatus, Severity, UpdateKind};

    fn result(current: &str, latest: &str, has_update: bool) -> UpdateCheckResult {
        let module = ModuleReference::forge("puppetlabs/apache", current, 1);
        UpdateCheckResult {
            current_version: current.to_string(),
            latest_version: latest.to_string(),
            has_update,
            ..UpdateCheckResult::unchanged(&module)
        }
    }

    #[test]
    fn test_deprecation_section() {
        let mut r = result("1.0.0", "1.0.0", false);
        r.deprecated = true;
        r.deprecated_for = Some("Use new/module instead".to_string());
        r.superseded_by = Some("new/module".to_string());

        let update = &to_module_updates(&[r])[0];
        assert!(update.deprecated);
        assert!(update.changelog.contains("deprecated"));
        assert!(update.changelog.contains("Use new/module instead"));
        assert!(update.changelog.contains("Superseded by `new/module`"));
        assert!(!update.has_security_advisory);
    }

    #[test]
    fn test_security_section() {
        let mut r = result("1.0.0", "2.0.0", true);
        r.security_status = Some(SecurityStatus {
            module_slug: "puppetlabs-apache".to_string(),
            has_advisories: true,
            advisories: vec![SecurityAdvisory::new(
                "FORGE-9",
                "Remote code execution",
                Severity::Critical,
                "< 2.0.0",
            )
            .with_fixed_version("2.0.0")],
            deprecated: false,
        });

        let update = &to_module_updates(&[r])[0];
        assert!(update.has_security_advisory);
        assert_eq!(update.highest_severity, Some(Severity::Critical));
        assert!(update.changelog.contains("CRITICAL"));
        assert!(update.changelog.contains("Remote code execution"));
        assert!(update.changelog.contains("fixed in 2.0.0"));
    }

    #[test]
    fn test_deprecation_reason_is_kept_verbatim() {
        let mut r = result("1.0.0", "1.0.0", false);
        r.deprecated = true;
        r.deprecated_for = Some("See docs...".to_string());

        let changelog = build_changelog(&r);
        assert!(changelog.contains("Reason: See docs..."));
    }

    #[test]
    fn test_advisory_description_is_listed() {
        let mut r = result("1.0.0", "1.0.0", false);
        r.security_status = Some(SecurityStatus {
            module_slug: "puppetlabs-apache".to_string(),
            has_advisories: true,
            advisories: vec![
                SecurityAdvisory::new("A-1", "Open redirect", Severity::Medium, "< 2.0.0")
                    .with_description("Crafted Host headers redirect clients."),
                SecurityAdvisory::new("A-2", "Weak ciphers", Severity::High, "< 2.0.0"),
            ],
            deprecated: false,
        });

        let update = &to_module_updates(&[r])[0];
        assert_eq!(update.highest_severity, Some(Severity::High));
        assert_eq!(
            update.changelog,
            "**Security Advisories**:\n\
             - [MEDIUM] Open redirect (A-1)\n  \
             Crafted Host headers redirect clients.\n\
             - [HIGH] Weak ciphers (A-2)"
        );
    }

    #[test]
    fn test_section_order() {
        let mut r = result("1.0.0", "2.0.0", true);
        r.deprecated = true;
        r.security_status = Some(SecurityStatus {
            module_slug: "puppetlabs-apache".to_string(),
            has_advisories: true,
            advisories: vec![SecurityAdvisory::new("X", "Bad", Severity::Low, "*")],
            deprecated: true,
        });

        let changelog = build_changelog(&r);
        let deprecated = changelog.find("Deprecated").unwrap();
        let security = changelog.find("Security Advisories").unwrap();
        let delta = changelog.find("Update available").unwrap();
        assert!(deprecated < security && security < delta);
    }

    #[test]
    fn test_status_without_advisories_is_false() {
        let mut r = result("1.0.0", "1.0.0", false);
        r.security_status = Some(SecurityStatus {
            module_slug: "puppetlabs-apache".to_string(),
            has_advisories: false,
            advisories: Vec::new(),
            deprecated: false,
        });

        let update = &to_module_updates(&[r])[0];
        assert!(!update.has_security_advisory);
        assert!(update.changelog.is_empty());
    }

    #[test]
    fn test_version_delta_and_kind() {
        let update = &to_module_updates(&[result("1.2.0", "1.3.0", true)])[0];
        assert_eq!(update.update_kind, Some(UpdateKind::Minor));
        assert_eq!(update.changelog, "Update available: 1.2.0 -> 1.3.0 (minor)");
    }

    #[test]
    fn test_fetch_error_note() {
        let mut r = result("1.0.0", "1.0.0", false);
        r.fetch_error = Some("Module not found: puppetlabs-apache".to_string());

        let changelog = build_changelog(&r);
        assert_eq!(
            changelog,
            "Update information unavailable: Module not found: puppetlabs-apache"
        );
    }

    #[test]
    fn test_order_preserved() {
        let results = vec![
            result("1.0.0", "1.0.0", false),
            result("2.0.0", "3.0.0", true),
        ];
        let updates = to_module_updates(&results);
        assert_eq!(updates.len(), 2);
        assert!(!updates[0].has_update);
        assert!(updates[1].has_update);
    }
}
