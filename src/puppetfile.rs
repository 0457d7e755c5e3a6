//! Puppetfile parsing.
//!
//! Turns the `mod` declarations of a Puppetfile into [`ModuleReference`]s.
//! Supported forms:
//!
//! ```ruby
//! forge 'https://forgeapi.puppet.com'
//!
//! mod 'puppetlabs/apache', '5.0.0'
//! mod 'puppetlabs-stdlib', :latest
//! mod 'puppetlabs-ntp'
//! mod 'concat',
//!   :git => 'https://github.com/puppetlabs/puppetlabs-concat.git',
//!   :tag => 'v7.1.0'
//! mod 'firewall', git: 'https://github.com/puppetlabs/puppetlabs-firewall.git', ref: 'main'
//! ```
//!
//! Modules without a version are recorded as `latest`.

use anyhow::{bail, Context, Result};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use crate::model::ModuleReference;

static MOD_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^mod\s*\(?\s*['"]([^'"]+)['"]"#).expect("valid module name regex")
});

static QUOTED_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*,\s*['"]([^'"]*)['"]"#).expect("valid version regex"));

static SYMBOL_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*,\s*:(\w+)\s*(?:,|\)|$)").expect("valid symbol regex"));

static OPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?::(\w+)\s*=>|\b(\w+):)\s*(?:['"]([^'"]*)['"]|:(\w+)|(true|false))"#)
        .expect("valid option regex")
});

/// Keys naming the git ref to check out, in order of preference.
const REF_KEYS: &[&str] = &["ref", "tag", "commit", "branch"];

/// Reads and parses a Puppetfile from disk.
pub fn parse_file(path: &Path) -> Result<Vec<ModuleReference>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read Puppetfile {}", path.display()))?;
    parse_puppetfile(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Parses Puppetfile content into module references, in declaration order.
pub fn parse_puppetfile(content: &str) -> Result<Vec<ModuleReference>> {
    let mut modules = Vec::new();

    for (line, declaration) in declarations(content) {
        if let Some(module) = parse_declaration(&declaration, line)? {
            modules.push(module);
        }
    }

    tracing::debug!(modules = modules.len(), "parsed Puppetfile");
    Ok(modules)
}

/// Groups `mod` statements with their continuation lines.
///
/// Returns each statement with the 1-based line its `mod` keyword is on.
fn declarations(content: &str) -> Vec<(usize, String)> {
    let mut result: Vec<(usize, String)> = Vec::new();
    let mut continuing = false;

    for (idx, raw) in content.lines().enumerate() {
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        if continuing {
            if let Some((_, text)) = result.last_mut() {
                text.push(' ');
                text.push_str(line);
            }
        } else if line.starts_with("mod ") || line.starts_with("mod(") {
            result.push((idx + 1, line.to_string()));
        } else {
            // forge, moduledir and other directives
            continue;
        }

        continuing = line.ends_with(',');
    }

    result
}

fn strip_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    for (idx, c) in line.char_indices() {
        match (quote, c) {
            (None, '#') => return &line[..idx],
            (None, '\'' | '"') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            _ => {}
        }
    }
    line
}

fn parse_declaration(text: &str, line: usize) -> Result<Option<ModuleReference>> {
    let Some(caps) = MOD_NAME.captures(text) else {
        bail!("Invalid module declaration on line {}: {}", line, text);
    };
    let name = caps[1].to_string();
    let rest = &text[caps.get(0).map(|m| m.end()).unwrap_or(text.len())..];

    let mut options: Vec<(String, String)> = Vec::new();
    for opt in OPTION.captures_iter(rest) {
        let key = opt.get(1).or_else(|| opt.get(2)).map(|m| m.as_str());
        let value = opt.get(3).or_else(|| opt.get(4)).or_else(|| opt.get(5));
        if let (Some(key), Some(value)) = (key, value) {
            options.push((key.to_string(), value.as_str().to_string()));
        }
    }
    let option = |key: &str| {
        options
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    };

    if let Some(url) = option("git") {
        let git_ref = REF_KEYS.iter().find_map(|key| option(*key));
        return Ok(Some(ModuleReference::git(name, url, git_ref, line)));
    }

    if option("svn").is_some() || option("local").is_some() {
        tracing::warn!(module = %name, line, "skipping module with unsupported source");
        return Ok(None);
    }

    let version = if let Some(v) = QUOTED_VERSION.captures(rest) {
        v[1].to_string()
    } else if let Some(v) = SYMBOL_VERSION.captures(rest) {
        v[1].to_string()
    } else {
        "latest".to_string()
    };

    Ok(Some(ModuleReference::forge(name, version, line)))
}
