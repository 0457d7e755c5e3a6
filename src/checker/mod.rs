mod advisory;
mod aggregate;
mod update;
mod version;

pub use advisory::{normalize_slug, AdvisoryRegistry};
pub use aggregate::{build_changelog, to_module_updates};
pub use update::{UpdateChecker, DEFAULT_CONCURRENCY};
pub use version::{classify_update, is_newer};
