//! Subcommand implementations

pub mod check;
pub mod init;
pub mod rules;

use std::path::{Path, PathBuf};

use miette::{IntoDiagnostic, Result};
use playlint_core::{CheckerConfig, RuleSource, builtin_sources};
use tracing::info;

/// Loads the config named by `--config`, or the one discovered in the
/// current directory, or defaults.
pub fn load_config(path: Option<&Path>) -> Result<CheckerConfig> {
    if let Some(path) = path {
        return CheckerConfig::from_file(path).into_diagnostic();
    }

    if let Some(path) = CheckerConfig::discover(".") {
        info!("Using config: {}", path.display());
        return CheckerConfig::from_file(&path).into_diagnostic();
    }

    info!("No config file found, using defaults");
    Ok(CheckerConfig::new())
}

/// Loads rule sources: command-line files first, then the config's, then
/// the built-in playbooks.
pub fn load_sources(cli_paths: &[PathBuf], config: &CheckerConfig) -> Result<Vec<RuleSource>> {
    let paths = if cli_paths.is_empty() {
        config.rule_paths()
    } else {
        cli_paths.to_vec()
    };

    if paths.is_empty() {
        return builtin_sources().into_diagnostic();
    }

    paths
        .iter()
        .map(|path| {
            info!("Loading rule source: {}", path.display());
            RuleSource::from_file(path).into_diagnostic()
        })
        .collect()
}
