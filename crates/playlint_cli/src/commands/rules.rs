//! Rules command implementation

use std::path::PathBuf;

use miette::{IntoDiagnostic, Result};
use playlint_core::{available_profiles, resolve};
use tracing::info;

use super::{load_config, load_sources};
use crate::cli::Cli;

pub fn run_list(cli: &Cli, profile: Option<&str>, rules: &[PathBuf]) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let profile = profile.unwrap_or(config.profile());
    let sources = load_sources(rules, &config)?;
    let ruleset = resolve(profile, &sources).into_diagnostic()?;

    println!("Profile {} ({} rules):", ruleset.profile(), ruleset.len());
    for rule in ruleset.rules() {
        let definition = rule.definition();
        println!(
            "  {:<32} {:<8} {:<10} {:<28} {}",
            rule.id(),
            rule.severity().as_str(),
            definition.detector.kind(),
            definition.applies_to,
            rule.message()
        );
    }
    Ok(())
}

pub fn run_verify(cli: &Cli, files: &[PathBuf]) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let sources = load_sources(files, &config)?;

    for source in &sources {
        source.verify_round_trip().into_diagnostic()?;
        info!("Verified rule source '{}'", source.name);
    }

    let profiles = available_profiles(&sources);
    for profile in &profiles {
        let ruleset = resolve(profile, &sources).into_diagnostic()?;
        println!("ok  {} ({} rules)", profile, ruleset.len());
    }

    println!(
        "Verified {} rule sources, {} profiles",
        sources.len(),
        profiles.len()
    );
    Ok(())
}
