use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use forgecheck::{
    checker::{to_module_updates, AdvisoryRegistry, UpdateChecker},
    config::Config,
    fetcher::SnapshotFetcher,
    model::{Severity, UpdateReport},
    output::{format_report_to_string, print_report, OutputFormat},
    puppetfile,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Exit codes for CI integration
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const CRITICAL_VULN: u8 = 2;
    pub const HIGH_VULN: u8 = 3;
    pub const MEDIUM_VULN: u8 = 4;
    pub const LOW_VULN: u8 = 5;
    pub const ERROR: u8 = 1;
}

#[derive(Parser)]
#[command(name = "forgecheck")]
#[command(
    author,
    version,
    about = "Check Puppetfile modules for updates, deprecations and security advisories"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the modules declared in a Puppetfile
    Check {
        /// Path to the Puppetfile
        #[arg(default_value = "Puppetfile")]
        puppetfile: PathBuf,

        /// Forge metadata snapshot (JSON)
        #[arg(short, long)]
        metadata: Option<PathBuf>,

        /// Security advisory database (JSON)
        #[arg(short, long)]
        advisories: Option<PathBuf>,

        /// Output format (table, json)
        #[arg(short, long)]
        format: Option<String>,

        /// Write output to file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Exit with error if advisories at or above this severity are found
        #[arg(long, value_enum)]
        fail_on: Option<FailLevel>,

        /// Maximum number of concurrent metadata lookups
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FailLevel {
    Critical,
    High,
    Medium,
    Low,
}

impl FailLevel {
    fn threshold(self) -> Severity {
        match self {
            FailLevel::Critical => Severity::Critical,
            FailLevel::High => Severity::High,
            FailLevel::Medium => Severity::Medium,
            FailLevel::Low => Severity::Low,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

async fn run() -> Result<u8> {
    let cli = Cli::parse();
    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "ignoring unreadable config file");
        Config::default()
    });

    match cli.command {
        Commands::Check {
            puppetfile,
            metadata,
            advisories,
            format,
            output,
            fail_on,
            concurrency,
        } => {
            let options = CheckOptions {
                metadata: metadata.or_else(|| config.metadata_file.clone()),
                advisories: advisories.or_else(|| config.advisories_file.clone()),
                format: format.unwrap_or_else(|| config.default_format.clone()),
                output,
                fail_on,
                concurrency: concurrency.unwrap_or(config.concurrency),
            };
            run_check(&puppetfile, options, &config).await
        }
        Commands::Config { init, path } => {
            handle_config(init, path)?;
            Ok(exit_codes::SUCCESS)
        }
    }
}

struct CheckOptions {
    metadata: Option<PathBuf>,
    advisories: Option<PathBuf>,
    format: String,
    output: Option<PathBuf>,
    fail_on: Option<FailLevel>,
    concurrency: usize,
}

async fn run_check(path: &Path, options: CheckOptions, config: &Config) -> Result<u8> {
    let format = OutputFormat::from_str(&options.format).map_err(|e| anyhow::anyhow!(e))?;
    let is_interactive = format == OutputFormat::Table && options.output.is_none();

    let mut modules = puppetfile::parse_file(path)?;
    modules.retain(|m| {
        let ignored = config.ignore.should_ignore_module(&m.name);
        if ignored {
            tracing::info!(module = %m.name, "ignoring module");
        }
        !ignored
    });

    let fetcher = match &options.metadata {
        Some(path) => SnapshotFetcher::load_file(path)
            .with_context(|| format!("Failed to load metadata snapshot {}", path.display()))?,
        None => {
            tracing::warn!("no metadata snapshot given, update information will be unavailable");
            SnapshotFetcher::default()
        }
    };

    let mut registry = match &options.advisories {
        Some(path) => AdvisoryRegistry::load_file(path)?,
        None => AdvisoryRegistry::new(),
    };
    registry.retain(|a| !config.ignore.should_ignore_advisory(&a.id));

    let progress = if is_interactive {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("Checking {} modules...", modules.len()));
        Some(pb)
    } else {
        None
    };

    let checker =
        UpdateChecker::new(fetcher, Arc::new(registry)).with_concurrency(options.concurrency);
    let results = checker.check_for_updates(&modules).await;
    let report = UpdateReport::new(to_module_updates(&results));

    if let Some(pb) = progress {
        pb.finish_with_message(format!(
            "Found {} outdated modules",
            report.outdated_count()
        ));
    }

    if let Some(path) = &options.output {
        let content = format_report_to_string(&report, format)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
    } else {
        print_report(&report, format)?;
    }

    Ok(determine_exit_code(&report, options.fail_on))
}

/// Determine the exit code based on advisories found and --fail-on setting
fn determine_exit_code(report: &UpdateReport, fail_on: Option<FailLevel>) -> u8 {
    let Some(fail_on) = fail_on else {
        return exit_codes::SUCCESS;
    };

    match report.highest_severity() {
        Some(severity) if severity >= fail_on.threshold() => match severity {
            Severity::Critical => exit_codes::CRITICAL_VULN,
            Severity::High => exit_codes::HIGH_VULN,
            Severity::Medium => exit_codes::MEDIUM_VULN,
            Severity::Low => exit_codes::LOW_VULN,
        },
        _ => exit_codes::SUCCESS,
    }
}

fn handle_config(init: bool, show_path: bool) -> Result<()> {
    let config_path = Config::config_path();

    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config file already exists at: {}", config_path.display());
            return Ok(());
        }

        let config = Config::default();
        config.save()?;
        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Default configuration:");
        println!("{}", Config::generate_default_config());
        return Ok(());
    }

    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        println!("Config file: {}", config_path.display());
        println!();
        println!("{}", content);
    } else {
        println!("No config file found.");
        println!("Run 'forgecheck config --init' to create one.");
        println!();
        println!("Config path: {}", config_path.display());
    }

    Ok(())
}
