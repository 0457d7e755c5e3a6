use crate::model::{Severity, UpdateReport};
use anyhow::Result;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct UpdateRow {
    #[tabled(rename = "Module")]
    name: String,
    #[tabled(rename = "Current")]
    current: String,
    #[tabled(rename = "Latest")]
    latest: String,
    #[tabled(rename = "Type")]
    update_type: String,
    #[tabled(rename = "Status")]
    status: String,
}

#[derive(Tabled)]
struct AdvisoryRow {
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Module")]
    module: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Fixed In")]
    fixed_in: String,
}

pub fn print_cli_table(report: &UpdateReport) -> Result<()> {
    print!("{}", render_table(report));
    Ok(())
}

pub(crate) fn render_table(report: &UpdateReport) -> String {
    let mut out = String::new();

    out.push('\n');
    out.push_str(&format!(
        "Checked at: {}\n\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    if report.updates.is_empty() {
        out.push_str("No modules found.\n");
        return out;
    }

    out.push_str(&format!("Checked {} modules:\n\n", report.updates.len()));

    let rows: Vec<UpdateRow> = report
        .updates
        .iter()
        .map(|u| UpdateRow {
            name: truncate(&u.name, 40),
            current: u.current_version.clone(),
            latest: u.latest_version.clone(),
            update_type: u
                .update_kind
                .map(|k| k.as_str().to_string())
                .unwrap_or_else(|| "-".to_string()),
            status: status_label(u.has_update, u.deprecated, u.has_security_advisory),
        })
        .collect();
    out.push_str(&Table::new(rows).with(Style::rounded()).to_string());
    out.push('\n');

    let mut advisories: Vec<AdvisoryRow> = Vec::new();
    let mut ranked: Vec<_> = report
        .updates
        .iter()
        .flat_map(|u| u.advisories.iter().map(move |a| (u, a)))
        .collect();
    ranked.sort_by(|(_, a), (_, b)| b.severity.cmp(&a.severity));

    for (update, advisory) in ranked {
        advisories.push(AdvisoryRow {
            severity: format_severity(&advisory.severity),
            module: update.name.clone(),
            id: advisory.id.clone(),
            title: truncate(&advisory.title, 50),
            fixed_in: advisory
                .fixed_version
                .clone()
                .unwrap_or_else(|| "-".to_string()),
        });
    }

    if !advisories.is_empty() {
        out.push_str(&format!("\nFound {} security advisories:\n\n", advisories.len()));
        out.push_str(&Table::new(advisories).with(Style::rounded()).to_string());
        out.push('\n');
    }

    let notes: Vec<_> = report
        .updates
        .iter()
        .filter(|u| u.deprecated)
        .collect();
    if !notes.is_empty() {
        out.push_str("\nDeprecated modules:\n");
        for update in notes {
            out.push_str(&format!("\n{}\n", update.name));
            for line in update.changelog.lines() {
                out.push_str(&format!("  {}\n", line));
            }
        }
    }

    out.push('\n');
    out.push_str(&summary(report));
    out
}

fn status_label(has_update: bool, deprecated: bool, vulnerable: bool) -> String {
    let mut labels = Vec::new();
    if vulnerable {
        labels.push("vulnerable");
    }
    if deprecated {
        labels.push("deprecated");
    }
    if has_update {
        labels.push("outdated");
    }

    if labels.is_empty() {
        "up to date".to_string()
    } else {
        labels.join(", ")
    }
}

fn format_severity(severity: &Severity) -> String {
    match severity {
        Severity::Critical => "\x1b[31mCRITICAL\x1b[0m".to_string(),
        Severity::High => "\x1b[91mHIGH\x1b[0m".to_string(),
        Severity::Medium => "\x1b[33mMEDIUM\x1b[0m".to_string(),
        Severity::Low => "\x1b[32mLOW\x1b[0m".to_string(),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}

fn summary(report: &UpdateReport) -> String {
    let major = report
        .updates
        .iter()
        .filter(|u| u.update_kind == Some(crate::model::UpdateKind::Major))
        .count();

    let mut out = String::from("Summary:\n");
    out.push_str(&format!("  Total modules: {}\n", report.updates.len()));

    let outdated = report.outdated_count();
    if outdated > 0 && major > 0 {
        out.push_str(&format!(
            "  Outdated modules: {} ({} major updates)\n",
            outdated, major
        ));
    } else {
        out.push_str(&format!("  Outdated modules: {}\n", outdated));
    }

    out.push_str(&format!("  Deprecated modules: {}\n", report.deprecated_count()));
    out.push_str(&format!(
        "  Modules with advisories: {}\n",
        report.vulnerable_count()
    ));
    out
}
