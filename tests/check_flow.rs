use forgecheck::checker::{to_module_updates, AdvisoryRegistry, UpdateChecker};
use forgecheck::fetcher::SnapshotFetcher;
use forgecheck::model::{ModuleMetadata, SecurityAdvisory, Severity, UpdateKind, UpdateReport};
use forgecheck::puppetfile::parse_puppetfile;
use std::collections::HashMap;
use std::sync::Arc;

const PUPPETFILE: &str = r#"
forge 'https://forgeapi.puppet.com'

mod 'puppetlabs/apache', '5.0.0'
mod 'puppetlabs-ntp', '10.0.0'
mod 'puppetlabs/unlisted', '1.0.0'
mod 'puppetlabs-stdlib', :latest
mod 'puppetlabs/concat',
  :git => 'https://github.com/puppetlabs/puppetlabs-concat.git',
  :tag => 'v1.0.0'
"#;

fn snapshot() -> SnapshotFetcher {
    let mut modules = HashMap::new();
    modules.insert(
        "puppetlabs/apache".to_string(),
        ModuleMetadata {
            latest_version: "12.1.0".to_string(),
            ..Default::default()
        },
    );
    modules.insert(
        "puppetlabs-ntp".to_string(),
        ModuleMetadata {
            latest_version: "10.1.0".to_string(),
            deprecated: true,
            deprecated_for: Some("Use puppet/chrony instead".to_string()),
            superseded_by: Some("puppet/chrony".to_string()),
        },
    );
    modules.insert(
        "puppetlabs-stdlib".to_string(),
        ModuleMetadata {
            latest_version: "9.6.0".to_string(),
            ..Default::default()
        },
    );
    modules.insert(
        "puppetlabs-concat".to_string(),
        ModuleMetadata {
            latest_version: "9.0.0".to_string(),
            ..Default::default()
        },
    );
    SnapshotFetcher::new(modules)
}

fn registry() -> AdvisoryRegistry {
    let mut registry = AdvisoryRegistry::new();
    registry.add(
        "puppetlabs-apache",
        SecurityAdvisory::new(
            "FORGE-2023-0042",
            "mod_status exposed by default",
            Severity::Critical,
            "< 6.0.0",
        )
        .with_fixed_version("6.0.0")
        .with_published_at("2023-06-01"),
    );
    registry.add(
        "puppetlabs/concat",
        SecurityAdvisory::new("FORGE-2022-0007", "Unsafe temp files", Severity::Low, "< 2.0.0"),
    );
    registry
}

#[tokio::test]
async fn test_full_check() {
    let modules = parse_puppetfile(PUPPETFILE).unwrap();
    assert_eq!(modules.len(), 5);

    let checker = UpdateChecker::new(snapshot(), Arc::new(registry())).with_concurrency(2);
    let results = checker.check_for_updates(&modules).await;
    let report = UpdateReport::new(to_module_updates(&results));

    let names: Vec<_> = report.updates.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "puppetlabs/apache",
            "puppetlabs-ntp",
            "puppetlabs/unlisted",
            "puppetlabs-stdlib",
            "puppetlabs/concat",
        ]
    );

    let apache = &report.updates[0];
    assert!(apache.has_update);
    assert_eq!(apache.update_kind, Some(UpdateKind::Major));
    assert!(apache.has_security_advisory);
    assert!(apache.changelog.contains("CRITICAL"));
    assert!(apache.changelog.contains("mod_status exposed by default"));

    let ntp = &report.updates[1];
    assert!(ntp.has_update);
    assert!(ntp.deprecated);
    assert!(ntp.changelog.contains("Use puppet/chrony instead"));
    assert!(ntp.changelog.contains("Superseded by `puppet/chrony`"));
    assert!(!ntp.has_security_advisory);

    let unlisted = &report.updates[2];
    assert!(!unlisted.has_update);
    assert_eq!(unlisted.latest_version, "1.0.0");
    assert!(unlisted.changelog.contains("Update information unavailable"));

    let stdlib = &report.updates[3];
    assert!(!stdlib.has_update);
    assert_eq!(stdlib.current_version, "latest");

    // Git-pinned modules are reported as-is even when the Forge has newer releases
    let concat = &report.updates[4];
    assert!(!concat.has_update);
    assert!(!concat.has_security_advisory);
    assert_eq!(concat.current_version, "v1.0.0");

    assert_eq!(report.outdated_count(), 2);
    assert_eq!(report.highest_severity(), Some(Severity::Critical));
}

#[tokio::test]
async fn test_report_serializes_to_json() {
    let modules = parse_puppetfile("mod 'puppetlabs/apache', '5.0.0'").unwrap();
    let checker = UpdateChecker::new(snapshot(), Arc::new(registry()));
    let results = checker.check_for_updates(&modules).await;
    let report = UpdateReport::new(to_module_updates(&results));

    let json: serde_json::Value = serde_json::to_value(&report).unwrap();
    let update = &json["updates"][0];
    assert_eq!(update["name"], "puppetlabs/apache");
    assert_eq!(update["has_security_advisory"], true);
    assert_eq!(update["update_kind"], "major");
    assert_eq!(update["advisories"][0]["severity"], "critical");
}
