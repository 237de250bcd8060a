//! Check command implementation

use std::time::Duration;

use miette::{IntoDiagnostic, Result};
use playlint_core::{CancelToken, CheckSettings, Checker, CheckerConfig, resolve};

use super::{load_config, load_sources};
use crate::cli::{CheckArgs, Cli};
use crate::output::{output_report, print_summary};

pub fn run_check(cli: &Cli, args: &CheckArgs) -> Result<bool> {
    let config = load_config(cli.config.as_deref())?;

    // Rules are resolved before anything is walked.
    let profile = args.profile.as_deref().unwrap_or(config.profile());
    let sources = load_sources(&args.rules, &config)?;
    let ruleset = resolve(profile, &sources).into_diagnostic()?;

    let root = args.root.clone().unwrap_or_else(|| config.root_path());
    let settings = merge_settings(args, &config);
    let cancel = match args.timeout.map(Duration::from_secs).or(config.timeout()) {
        Some(timeout) => CancelToken::with_timeout(timeout),
        None => CancelToken::new(),
    };

    let checker = Checker::new(root, ruleset, settings).into_diagnostic()?;
    let report = checker.run(&cancel).into_diagnostic()?;

    output_report(&report, args.format)?;
    print_summary(&report);

    Ok(report.has_failures())
}

/// Layers command-line flags over the config file.
fn merge_settings(args: &CheckArgs, config: &CheckerConfig) -> CheckSettings {
    let mut settings = config.check_settings();

    if !args.include.is_empty() {
        settings.walk.include_patterns = args.include.clone();
    }
    if !args.exclude.is_empty() {
        settings.walk.exclude_patterns = args.exclude.clone();
    }
    if let Some(fail_on) = args.fail_on {
        settings.fail_on = fail_on;
    }
    if let Some(threads) = args.threads {
        settings.threads = threads;
        settings.walk.threads = threads;
    }
    if let Some(depth) = args.max_depth {
        settings.walk.max_depth = Some(depth);
    }
    if args.no_follow_links {
        settings.walk.follow_links = false;
    }
    if args.no_gitignore {
        settings.walk.respect_gitignore = false;
    }
    if args.hidden {
        settings.walk.include_hidden = true;
    }

    settings
}
