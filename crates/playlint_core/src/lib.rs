//! # playlint_core
//!
//! Core conformance checking engine for playlint.
//!
//! This crate provides:
//! - Rule sources, the rule registry and profile resolution
//! - Detectors and the matcher engine
//! - A lazy, parallel project walker
//! - The `Checker` orchestrator and report aggregation
//! - Configuration loading and report formatters
//!
//! ## Example
//!
//! ```rust,ignore
//! use playlint_core::{CancelToken, CheckSettings, Checker, builtin_sources, resolve};
//!
//! let sources = builtin_sources()?;
//! let ruleset = resolve("strict-2026", &sources)?;
//! let checker = Checker::new("path/to/project", ruleset, CheckSettings::default())?;
//!
//! let report = checker.run(&CancelToken::new())?;
//! for finding in &report.findings {
//!     println!("{}: {} [{}]", finding.path, finding.message, finding.rule_id);
//! }
//! ```

mod builtin;
mod cancel;
mod checker;
mod config;
pub mod detector;
pub mod engine;
mod error;
mod finding;
pub mod formatters;
mod registry;
mod report;
pub mod resolver;
mod rule;
mod source;
pub mod walker;

pub use builtin::builtin_sources;
pub use cancel::CancelToken;
pub use checker::{CheckSettings, Checker};
pub use config::{CheckerConfig, DEFAULT_PROFILE};
pub use detector::{Detector, DetectorSpec};
pub use error::CheckerError;
pub use finding::{Finding, Severity};
pub use formatters::generate_sarif;
pub use registry::RuleRegistry;
pub use report::{Report, Summary};
pub use resolver::{available_profiles, resolve};
pub use rule::{Rule, RuleDefinition, RuleSet};
pub use source::RuleSource;
pub use walker::{ProjectFile, ProjectWalker, WalkConfig, WalkItem, WalkStream};
