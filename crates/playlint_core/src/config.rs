//! Checker configuration.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use jsonc_parser::ParseOptions;
use jsonschema::Validator;
use serde::{Deserialize, Serialize};

use crate::checker::CheckSettings;
use crate::error::CheckerError;
use crate::finding::Severity;
use crate::walker::WalkConfig;

// Embed the schema
const SCHEMA_JSON: &str = include_str!("../../../schemas/v1/config.json");
static CONFIG_SCHEMA: OnceLock<Validator> = OnceLock::new();

/// Profile used when neither the command line nor the config names one.
pub const DEFAULT_PROFILE: &str = "strict-2026";

/// Configuration file contents.
///
/// Every field is optional so that command-line flags can be layered on
/// top; unset fields fall back to built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckerConfig {
    /// Directory to check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,

    /// Profile to apply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// File patterns to include.
    #[serde(default)]
    pub include: Vec<String>,

    /// File patterns to exclude.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Lowest severity that fails the run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_on: Option<Severity>,

    /// Rule source files.
    #[serde(default)]
    pub rules: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_links: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub respect_gitignore: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_hidden: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_capacity: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,

    /// Base directory for resolving relative paths (root, rules).
    /// This is usually the directory containing the configuration file.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl CheckerConfig {
    /// Config file names, in discovery order.
    pub const CONFIG_FILES: [&'static str; 2] = [".playlint.jsonc", ".playlint.json"];

    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds a config file directly inside `dir`.
    pub fn discover(dir: impl AsRef<Path>) -> Option<PathBuf> {
        let dir = dir.as_ref();
        Self::CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    }

    /// Loads configuration from a file.
    ///
    /// Supports `.playlint.jsonc` and `.playlint.json`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CheckerError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CheckerError::config(format!("Failed to read config {}: {}", path.display(), e))
        })?;

        let mut config = Self::from_json(&content)?;

        if let Some(parent) = path.parent() {
            config.base_dir = Some(parent.to_path_buf());
        }

        Ok(config)
    }

    /// Parses configuration from JSONC with schema validation.
    pub fn from_json(json: &str) -> Result<Self, CheckerError> {
        let value = jsonc_parser::parse_to_serde_value(json, &ParseOptions::default())
            .map_err(|e| CheckerError::config(format!("Invalid JSON: {}", e)))?
            .unwrap_or_else(|| serde_json::Value::Object(Default::default()));

        let schema = CONFIG_SCHEMA.get_or_init(|| {
            let schema_json: serde_json::Value =
                serde_json::from_str(SCHEMA_JSON).expect("Invalid embedded config schema");
            Validator::new(&schema_json).expect("Invalid config schema compilation")
        });

        if let Err(e) = schema.validate(&value) {
            let error_msg = format!("{} at {}", e, e.instance_path());
            return Err(CheckerError::config(format!(
                "Config validation failed: {}",
                error_msg
            )));
        }

        serde_json::from_value(value)
            .map_err(|e| CheckerError::config(format!("Invalid config: {}", e)))
    }

    /// Resolves a path from the config against its base directory.
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        match &self.base_dir {
            Some(base) if path.is_relative() && !base.as_os_str().is_empty() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// The root to check, defaulting to the base directory (or `.`).
    pub fn root_path(&self) -> PathBuf {
        self.resolve_path(self.root.as_deref().unwrap_or("."))
    }

    /// Rule source paths, resolved against the base directory.
    pub fn rule_paths(&self) -> Vec<PathBuf> {
        self.rules.iter().map(|p| self.resolve_path(p)).collect()
    }

    /// The profile to apply.
    pub fn profile(&self) -> &str {
        self.profile.as_deref().unwrap_or(DEFAULT_PROFILE)
    }

    /// The failure threshold.
    pub fn fail_on(&self) -> Severity {
        self.fail_on.unwrap_or(Severity::Error)
    }

    /// Run timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Builds the walk configuration.
    pub fn walk_config(&self) -> WalkConfig {
        let defaults = WalkConfig::default();
        WalkConfig {
            respect_gitignore: self.respect_gitignore.unwrap_or(defaults.respect_gitignore),
            include_hidden: self.include_hidden.unwrap_or(defaults.include_hidden),
            threads: self.threads.unwrap_or(defaults.threads),
            follow_links: self.follow_links.unwrap_or(defaults.follow_links),
            max_depth: self.max_depth.or(defaults.max_depth),
            include_patterns: self.include.clone(),
            exclude_patterns: self.exclude.clone(),
            channel_capacity: self
                .channel_capacity
                .unwrap_or(defaults.channel_capacity)
                .max(1),
            ..defaults
        }
    }

    /// Builds the settings of a check run.
    pub fn check_settings(&self) -> CheckSettings {
        CheckSettings {
            walk: self.walk_config(),
            fail_on: self.fail_on(),
            threads: self.threads.unwrap_or(0),
        }
    }

    /// Contents written by `playlint init`.
    pub fn template() -> &'static str {
        r#"{
  // Profile to apply: "strict-2026" or "pragmatic-2026"
  "profile": "strict-2026",
  "include": [],
  "exclude": ["**/node_modules/**", "**/dist/**"],
  // Lowest severity that fails the run
  "failOn": "error",
  // Rule source files; the built-in playbooks are used when empty
  "rules": []
}
"#
    }
}
