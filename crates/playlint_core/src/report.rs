//! Report aggregation.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::finding::{Finding, Severity};

/// Number of findings per severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub error: usize,
    pub warning: usize,
    pub info: usize,
}

impl Summary {
    /// Counts `findings` per severity.
    pub fn count(findings: &[Finding]) -> Self {
        let mut summary = Self::default();
        for finding in findings {
            match finding.severity {
                Severity::Error => summary.error += 1,
                Severity::Warning => summary.warning += 1,
                Severity::Info => summary.info += 1,
            }
        }
        summary
    }

    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Error => self.error,
            Severity::Warning => self.warning,
            Severity::Info => self.info,
        }
    }

    pub fn total(&self) -> usize {
        self.error + self.warning + self.info
    }
}

/// The result of one check run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Deduplicated findings, most severe first.
    pub findings: Vec<Finding>,
    pub summary: Summary,
    /// Number of files that were read and evaluated.
    pub files_checked: usize,
    /// True when the run was cancelled before the walk finished.
    pub incomplete: bool,
    /// `1` if any finding is at or above `fail_on`, else `0`.
    pub exit_status: i32,
    pub fail_on: Severity,
}

impl Report {
    /// Aggregates findings with the default `error` threshold.
    pub fn aggregate(findings: Vec<Finding>) -> Self {
        Self::aggregate_with(findings, Severity::Error)
    }

    /// Deduplicates, sorts and counts `findings`.
    ///
    /// Findings sharing `(ruleId, path, line)` collapse to the first one in
    /// report order.
    pub fn aggregate_with(mut findings: Vec<Finding>, fail_on: Severity) -> Self {
        findings.sort_by(compare);

        let mut seen = HashSet::new();
        let mut deduped = Vec::with_capacity(findings.len());
        for finding in findings {
            let key = (finding.rule_id.clone(), finding.path.clone(), finding.line);
            if seen.insert(key) {
                deduped.push(finding);
            }
        }

        let summary = Summary::count(&deduped);
        let exit_status = if deduped.iter().any(|f| f.severity.is_at_least(fail_on)) {
            1
        } else {
            0
        };

        Self {
            findings: deduped,
            summary,
            files_checked: 0,
            incomplete: false,
            exit_status,
            fail_on,
        }
    }

    /// Records how many files were evaluated.
    pub fn with_files_checked(mut self, files_checked: usize) -> Self {
        self.files_checked = files_checked;
        self
    }

    /// Marks the report as produced by a cancelled run.
    pub fn mark_incomplete(mut self) -> Self {
        self.incomplete = true;
        self
    }

    /// Returns true if the run should fail.
    pub fn has_failures(&self) -> bool {
        self.exit_status != 0
    }
}

/// Report order: severity descending, then path, line (whole-file first),
/// column and rule id.
fn compare(a: &Finding, b: &Finding) -> Ordering {
    b.severity
        .cmp(&a.severity)
        .then_with(|| a.path.cmp(&b.path))
        .then_with(|| a.line.cmp(&b.line))
        .then_with(|| a.column.cmp(&b.column))
        .then_with(|| a.rule_id.cmp(&b.rule_id))
        .then_with(|| a.message.cmp(&b.message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn finding(rule: &str, path: &str, severity: Severity, line: Option<u32>) -> Finding {
        let finding = Finding::new(rule, path, severity, format!("{} message", rule));
        match line {
            Some(line) => finding.at(line, 1),
            None => finding,
        }
    }

    fn sample() -> Vec<Finding> {
        vec![
            finding("no-console-log", "src/b.js", Severity::Warning, Some(4)),
            finding("no-var", "src/a.js", Severity::Warning, Some(9)),
            finding("controller-logger", "src/users.controller.ts", Severity::Error, None),
            finding("no-var", "src/a.js", Severity::Warning, Some(2)),
            finding("symlink-cycle", "loop", Severity::Info, None),
            finding("no-console-log", "src/a.js", Severity::Warning, None),
        ]
    }

    #[test]
    fn test_sort_order() {
        let report = Report::aggregate(sample());
        let order: Vec<(&str, &str, Option<u32>)> = report
            .findings
            .iter()
            .map(|f| (f.rule_id.as_str(), f.path.as_str(), f.line))
            .collect();
        assert_eq!(
            order,
            vec![
                ("controller-logger", "src/users.controller.ts", None),
                ("no-console-log", "src/a.js", None),
                ("no-var", "src/a.js", Some(2)),
                ("no-var", "src/a.js", Some(9)),
                ("no-console-log", "src/b.js", Some(4)),
                ("symlink-cycle", "loop", None),
            ]
        );
    }

    #[test]
    fn test_dedup_keeps_one_per_rule_path_line() {
        let findings = vec![
            Finding::new("r", "a.js", Severity::Warning, "m").at(3, 10),
            Finding::new("r", "a.js", Severity::Warning, "m").at(3, 2),
            Finding::new("r", "a.js", Severity::Warning, "m").at(4, 1),
            Finding::new("other", "a.js", Severity::Warning, "m").at(3, 2),
        ];
        let report = Report::aggregate(findings);
        assert_eq!(report.findings.len(), 3);
        assert_eq!(report.findings[1].rule_id, "r");
        assert_eq!(report.findings[1].column, Some(2));
        assert_eq!(report.summary.warning, 3);
    }

    #[test]
    fn test_summary_counts() {
        let report = Report::aggregate(sample());
        assert_eq!(
            report.summary,
            Summary {
                error: 1,
                warning: 4,
                info: 1
            }
        );
        assert_eq!(report.summary.total(), report.findings.len());
        assert_eq!(report.summary.get(Severity::Warning), 4);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let once = Report::aggregate(sample());
        let twice = Report::aggregate(once.findings.clone());
        assert_eq!(once, twice);
    }

    #[rstest]
    #[case::error_default(Severity::Error, vec![Severity::Warning, Severity::Info], 0)]
    #[case::error_hit(Severity::Error, vec![Severity::Error], 1)]
    #[case::warning_threshold(Severity::Warning, vec![Severity::Warning], 1)]
    #[case::info_threshold(Severity::Info, vec![Severity::Info], 1)]
    #[case::empty(Severity::Info, vec![], 0)]
    fn test_exit_status(
        #[case] fail_on: Severity,
        #[case] severities: Vec<Severity>,
        #[case] expected: i32,
    ) {
        let findings = severities
            .into_iter()
            .enumerate()
            .map(|(i, s)| finding("r", "a.js", s, Some(i as u32 + 1)))
            .collect();
        let report = Report::aggregate_with(findings, fail_on);
        assert_eq!(report.exit_status, expected);
        assert_eq!(report.has_failures(), expected == 1);
    }

    #[test]
    fn test_serialized_shape() {
        let report = Report::aggregate(sample())
            .with_files_checked(3)
            .mark_incomplete();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["filesChecked"], 3);
        assert_eq!(json["incomplete"], true);
        assert_eq!(json["exitStatus"], 1);
        assert_eq!(json["failOn"], "error");
        assert_eq!(json["summary"]["warning"], 4);
        assert_eq!(json["findings"][0]["ruleId"], "controller-logger");
    }
}
