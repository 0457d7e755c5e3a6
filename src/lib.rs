pub mod checker;
pub mod config;
pub mod fetcher;
pub mod model;
pub mod output;
pub mod puppetfile;

pub use checker::{AdvisoryRegistry, UpdateChecker};
pub use config::Config;
pub use model::{
    ModuleReference, ModuleSource, ModuleUpdate, SecurityAdvisory, Severity, UpdateCheckResult,
    UpdateReport,
};
