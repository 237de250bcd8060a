//! End-to-end tests for the built-in playbook profiles
//!
//! Runs the strict and pragmatic profiles over the same project tree and
//! checks the reports, the config layer and the SARIF output together.

use std::fs;
use std::path::Path;

use playlint_core::{
    CancelToken, Checker, CheckerConfig, Report, Severity, builtin_sources, generate_sarif,
    resolve,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const SERVER_JS: &str = "const mongoose = require('mongoose');
const app = require('express')();
app.get('/users', async (req, res) => {
  res.json(await mongoose.model('User').find());
});
mongoose.connect('mongodb://localhost:27017/app');
";

const USERS_CONTROLLER_JS: &str = "export function list(req, res) {
  var users = [];
  res.json(users);
}
";

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn sample_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "src/server.js", SERVER_JS);
    write(temp.path(), "src/users.controller.js", USERS_CONTROLLER_JS);
    write(
        temp.path(),
        "node_modules/left-pad/index.js",
        "console.log('vendored');\n",
    );
    temp
}

fn run_profile(root: &Path, profile: &str, config: &CheckerConfig) -> Report {
    let sources = builtin_sources().unwrap();
    let ruleset = resolve(profile, &sources).unwrap();
    Checker::new(root, ruleset, config.check_settings())
        .unwrap()
        .run(&CancelToken::new())
        .unwrap()
}

fn excluding_vendored() -> CheckerConfig {
    CheckerConfig::from_json(r#"{ "exclude": ["node_modules/**"] }"#).unwrap()
}

type Row<'a> = (&'a str, &'a str, Option<u32>, Option<u32>, Severity);

fn rows(report: &Report) -> Vec<Row<'_>> {
    report
        .findings
        .iter()
        .map(|f| {
            (
                f.rule_id.as_str(),
                f.path.as_str(),
                f.line,
                f.column,
                f.severity,
            )
        })
        .collect()
}

#[test]
fn strict_profile_reports_every_violation_as_error() {
    let project = sample_project();
    let report = run_profile(project.path(), "strict-2026", &excluding_vendored());

    assert_eq!(
        rows(&report),
        vec![
            ("require-repository-layer", "src/server.js", Some(1), Some(7), Severity::Error),
            ("no-hardcoded-mongo-uri", "src/server.js", Some(6), Some(19), Severity::Error),
            ("controller-structured-logger", "src/users.controller.js", None, None, Severity::Error),
            ("no-var-declarations", "src/users.controller.js", Some(2), Some(3), Severity::Error),
        ]
    );
    assert_eq!(report.files_checked, 2);
    assert_eq!(report.exit_status, 1);
}

#[test]
fn pragmatic_profile_relaxes_severities_on_the_same_tree() {
    let project = sample_project();
    let report = run_profile(project.path(), "pragmatic-2026", &excluding_vendored());

    assert_eq!(
        rows(&report),
        vec![
            ("no-hardcoded-mongo-uri", "src/server.js", Some(6), Some(19), Severity::Error),
            ("controller-structured-logger", "src/users.controller.js", None, None, Severity::Warning),
            ("no-var-declarations", "src/users.controller.js", Some(2), Some(3), Severity::Warning),
            ("require-repository-layer", "src/server.js", Some(1), Some(7), Severity::Info),
        ]
    );
    assert_eq!(report.summary.error, 1);
    assert_eq!(report.summary.warning, 2);
    assert_eq!(report.summary.info, 1);
}

#[test]
fn config_threshold_decides_exit_status() {
    let project = TempDir::new().unwrap();
    write(project.path(), "src/users.controller.js", USERS_CONTROLLER_JS);

    let lenient = run_profile(project.path(), "pragmatic-2026", &CheckerConfig::new());
    assert_eq!(lenient.exit_status, 0);
    assert!(!lenient.has_failures());

    let config = CheckerConfig::from_json(r#"{ "failOn": "warning" }"#).unwrap();
    let strict_threshold = run_profile(project.path(), "pragmatic-2026", &config);
    assert_eq!(strict_threshold.exit_status, 1);
    assert_eq!(strict_threshold.findings, lenient.findings);
}

#[test]
fn vendored_files_are_checked_unless_excluded() {
    let project = sample_project();
    let config = CheckerConfig::from_json(r#"{ "respectGitignore": false }"#).unwrap();
    let report = run_profile(project.path(), "strict-2026", &config);

    assert_eq!(report.files_checked, 3);
    assert!(
        report
            .findings
            .iter()
            .any(|f| f.path == "node_modules/left-pad/index.js" && f.rule_id == "no-console-log")
    );
}

#[test]
fn repeated_runs_produce_identical_reports() {
    let project = sample_project();
    let config = excluding_vendored();

    let first = run_profile(project.path(), "strict-2026", &config);
    let second = run_profile(project.path(), "strict-2026", &config);

    assert_eq!(first, second);
}

#[test]
fn sarif_output_mirrors_the_report() {
    let project = sample_project();
    let report = run_profile(project.path(), "strict-2026", &excluding_vendored());

    let sarif: serde_json::Value =
        serde_json::from_str(&generate_sarif(&report).unwrap()).unwrap();
    let run = &sarif["runs"][0];
    let results = run["results"].as_array().unwrap();

    assert_eq!(results.len(), report.findings.len());
    assert_eq!(run["invocations"][0]["executionSuccessful"], true);
    for (result, finding) in results.iter().zip(&report.findings) {
        assert_eq!(result["ruleId"], finding.rule_id.as_str());
        assert_eq!(result["level"], "error");
    }
}
