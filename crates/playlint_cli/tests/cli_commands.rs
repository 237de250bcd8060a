//! Integration tests for CLI commands
//!
//! Tests for init, rules, and configuration discovery.

use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to create a command for the playlint CLI
fn playlint_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_playlint"))
}

/// Helper to get fixtures directory
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

mod init_command {
    use super::*;

    #[test]
    fn creates_new_config_file() {
        let temp_dir = TempDir::new().unwrap();

        playlint_cmd()
            .current_dir(temp_dir.path())
            .arg("init")
            .assert()
            .success()
            .stderr(predicate::str::contains("Created .playlint.jsonc"));

        let config_path = temp_dir.path().join(".playlint.jsonc");
        assert!(config_path.exists());

        let content = fs::read_to_string(config_path).unwrap();
        assert!(content.contains("\"profile\": \"strict-2026\""));
        assert!(content.contains("failOn"));
    }

    #[test]
    fn fails_when_config_exists_without_force() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(".playlint.jsonc");
        fs::write(&config_path, "{}").unwrap();

        playlint_cmd()
            .current_dir(temp_dir.path())
            .arg("init")
            .assert()
            .code(2)
            .stderr(predicate::str::contains("already exists"));

        assert_eq!(fs::read_to_string(config_path).unwrap(), "{}");
    }

    #[test]
    fn overwrites_config_with_force() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(".playlint.jsonc");
        fs::write(&config_path, r#"{"profile": "custom"}"#).unwrap();

        playlint_cmd()
            .current_dir(temp_dir.path())
            .arg("init")
            .arg("--force")
            .assert()
            .success();

        let content = fs::read_to_string(config_path).unwrap();
        assert!(!content.contains("custom"));
        assert!(content.contains("strict-2026"));
    }

    #[test]
    fn generated_config_is_accepted_by_check() {
        let temp_dir = TempDir::new().unwrap();

        playlint_cmd()
            .current_dir(temp_dir.path())
            .arg("init")
            .assert()
            .success();

        playlint_cmd()
            .current_dir(temp_dir.path())
            .arg("check")
            .assert()
            .success()
            .stderr(predicate::str::contains("Using config"));
    }
}

mod rules_command {
    use super::*;

    #[test]
    fn lists_builtin_strict_rules() {
        playlint_cmd()
            .args(["rules", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Profile strict-2026 (9 rules):"))
            .stdout(predicate::str::contains("controller-structured-logger"))
            .stdout(predicate::str::contains("absence"));
    }

    #[test]
    fn lists_another_profile() {
        playlint_cmd()
            .args(["rules", "list", "--profile", "pragmatic-2026"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Profile pragmatic-2026 (7 rules):"));
    }

    #[test]
    fn verifies_builtin_playbooks() {
        playlint_cmd()
            .args(["rules", "verify"])
            .assert()
            .success()
            .stdout(predicate::str::contains("ok  pragmatic-2026 (7 rules)"))
            .stdout(predicate::str::contains("ok  strict-2026 (9 rules)"))
            .stdout(predicate::str::contains("Verified 2 rule sources, 2 profiles"));
    }

    #[test]
    fn verify_reports_conflicts() {
        let rules = fixtures_dir().join("rules");

        playlint_cmd()
            .args(["rules", "verify"])
            .arg(rules.join("logging.jsonc"))
            .arg(rules.join("logging-override.jsonc"))
            .assert()
            .code(2)
            .stderr(predicate::str::contains("logging-override.jsonc"));
    }

    #[test]
    fn verify_rejects_invalid_detector() {
        playlint_cmd()
            .args(["rules", "verify"])
            .arg(fixtures_dir().join("rules/broken.jsonc"))
            .assert()
            .code(2)
            .stderr(predicate::str::contains("bad-regex"));
    }
}

mod config_discovery {
    use super::*;

    #[test]
    fn discovered_config_selects_profile() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child(".playlint.jsonc")
            .write_str(r#"{ "profile": "pragmatic-2026", "failOn": "warning" }"#)
            .unwrap();
        temp.child("src/app.js")
            .write_str("console.log('hi');\n")
            .unwrap();

        // pragmatic reports console.log as info, below the threshold
        playlint_cmd()
            .current_dir(temp.path())
            .arg("check")
            .assert()
            .success()
            .stdout(predicate::str::contains("\"severity\": \"info\""));
    }

    #[test]
    fn command_line_profile_overrides_config() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child(".playlint.jsonc")
            .write_str(r#"{ "profile": "pragmatic-2026", "failOn": "warning" }"#)
            .unwrap();
        temp.child("src/app.js")
            .write_str("console.log('hi');\n")
            .unwrap();

        playlint_cmd()
            .current_dir(temp.path())
            .args(["check", "--profile", "strict-2026"])
            .assert()
            .code(1)
            .stdout(predicate::str::contains("\"severity\": \"warning\""));
    }

    #[test]
    fn explicit_config_resolves_paths_against_its_directory() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("ci/playlint.jsonc")
            .write_str(r#"{ "root": "../app", "rules": ["logging.jsonc"] }"#)
            .unwrap();
        temp.child("ci/logging.jsonc")
            .write_str(
                &fs::read_to_string(fixtures_dir().join("rules/logging.jsonc")).unwrap(),
            )
            .unwrap();
        temp.child("app/index.ts")
            .write_str("var x = 1;\nconsole.log(x);\n")
            .unwrap();

        // only the configured source applies, so `var` goes unreported
        let output = playlint_cmd()
            .arg("--config")
            .arg(temp.path().join("ci/playlint.jsonc"))
            .arg("check")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
        let findings = report["findings"].as_array().unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0]["ruleId"], "no-console-log");
        assert_eq!(findings[0]["path"], "index.ts");
    }

    #[test]
    fn invalid_config_exits_with_2() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child(".playlint.jsonc")
            .write_str(r#"{ "failOn": "fatal" }"#)
            .unwrap();

        playlint_cmd()
            .current_dir(temp.path())
            .arg("check")
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Config validation failed"));
    }
}
