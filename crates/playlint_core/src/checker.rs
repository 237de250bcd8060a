//! Check orchestration: walker → bounded channel → worker pool → report.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use tracing::{info, warn};

use crate::cancel::CancelToken;
use crate::engine::evaluate_file;
use crate::error::CheckerError;
use crate::finding::{Finding, Severity};
use crate::report::Report;
use crate::rule::RuleSet;
use crate::walker::{ProjectWalker, WalkConfig, WalkItem};

/// Settings for one check run.
#[derive(Debug, Clone)]
pub struct CheckSettings {
    /// File walking options.
    pub walk: WalkConfig,
    /// Lowest severity that makes the run fail.
    pub fail_on: Severity,
    /// Worker threads evaluating rules. 0 uses all available CPUs.
    pub threads: usize,
}

impl Default for CheckSettings {
    fn default() -> Self {
        Self {
            walk: WalkConfig::default(),
            fail_on: Severity::Error,
            threads: 0,
        }
    }
}

/// Runs a rule set against a project tree.
#[derive(Debug, Clone)]
pub struct Checker {
    walker: ProjectWalker,
    ruleset: Arc<RuleSet>,
    settings: CheckSettings,
}

impl Checker {
    /// Creates a checker for `root`.
    ///
    /// Fails before anything is walked if the root or the walk patterns are
    /// invalid.
    pub fn new(
        root: impl Into<PathBuf>,
        ruleset: impl Into<Arc<RuleSet>>,
        settings: CheckSettings,
    ) -> Result<Self, CheckerError> {
        let walker = ProjectWalker::new(root, settings.walk.clone())?;
        Ok(Self {
            walker,
            ruleset: ruleset.into(),
            settings,
        })
    }

    pub fn ruleset(&self) -> &RuleSet {
        &self.ruleset
    }

    pub fn settings(&self) -> &CheckSettings {
        &self.settings
    }

    /// Walks the tree and evaluates every file.
    ///
    /// Walk and read problems become findings. When `cancel` is raised the
    /// walk stops, files already handed to workers are still evaluated, and
    /// the report is marked incomplete.
    pub fn run(&self, cancel: &CancelToken) -> Result<Report, CheckerError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.settings.threads)
            .thread_name(|i| format!("playlint-worker-{}", i))
            .build()
            .map_err(|e| CheckerError::config(format!("failed to start worker pool: {}", e)))?;

        info!(
            "Checking {} with profile '{}' ({} rules)",
            self.walker.root().display(),
            self.ruleset.profile(),
            self.ruleset.len()
        );

        let stream = self.walker.walk(cancel);
        let stats = stream.stats();
        let (findings, files_checked) = pool.install(|| self.evaluate_items(stream));

        Ok(self.finish(findings, files_checked, stats.interrupted()))
    }

    /// Evaluates walk items in parallel on the current rayon pool.
    ///
    /// Returns the findings and the number of files evaluated.
    fn evaluate_items<I>(&self, items: I) -> (Vec<Finding>, usize)
    where
        I: Iterator<Item = WalkItem> + Send,
    {
        let files_checked = AtomicUsize::new(0);
        let ruleset = &self.ruleset;

        let findings = items
            .par_bridge()
            .flat_map_iter(|item| match item {
                WalkItem::File(file) => {
                    files_checked.fetch_add(1, Ordering::Relaxed);
                    evaluate_file(ruleset, &file)
                }
                other => {
                    if let WalkItem::Unreadable { path, reason, .. } = &other {
                        warn!("Skipping {}: {}", path, reason);
                    }
                    other.to_finding().into_iter().collect()
                }
            })
            .collect();

        (findings, files_checked.into_inner())
    }

    fn finish(&self, findings: Vec<Finding>, files_checked: usize, interrupted: bool) -> Report {
        let mut report =
            Report::aggregate_with(findings, self.settings.fail_on).with_files_checked(files_checked);
        if interrupted {
            warn!("Check was cancelled; the report is incomplete");
            report = report.mark_incomplete();
        }

        info!(
            "Checked {} files: {} errors, {} warnings, {} info",
            report.files_checked, report.summary.error, report.summary.warning, report.summary.info
        );
        report
    }
}
