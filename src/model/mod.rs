//! Core data types for module references, advisories, and update reports.
//!
//! This module contains the fundamental types used throughout forgecheck:
//!
//! - [`ModuleReference`] - A module declared in a Puppetfile
//! - [`ModuleSource`] - Where a module comes from (Forge or git)
//! - [`SecurityAdvisory`] - A known vulnerability affecting a module
//! - [`UpdateCheckResult`] - Per-module outcome of an update check
//! - [`ModuleUpdate`] - Final report record for one module
//! - [`UpdateReport`] - Complete report for a run
//!
//! # Example
//!
//! ```
//! use forgecheck::{ModuleReference, UpdateReport};
//!
//! let module = ModuleReference::forge("puppetlabs/apache", "5.0.0", 3);
//! assert_eq!(module.slug(), "puppetlabs-apache");
//!
//! let report = UpdateReport::new(Vec::new());
//! println!("Checked {} modules", report.updates.len());
//! ```

mod advisory;
mod module;
mod update;

pub use advisory::*;
pub use module::*;
pub use update::*;
