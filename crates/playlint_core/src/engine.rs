//! Matcher engine: turns detector hits into findings.

use tracing::debug;

use crate::detector::{Hit, LineIndex};
use crate::finding::Finding;
use crate::rule::{Rule, RuleSet};
use crate::walker::ProjectFile;

/// Evaluates one rule against one file.
///
/// Returns nothing when the rule's `appliesTo` glob does not match the
/// file's relative path.
pub fn evaluate(rule: &Rule, file: &ProjectFile) -> Vec<Finding> {
    if !rule.applies_to(&file.relative_path) {
        return Vec::new();
    }
    let index = LineIndex::new(&file.contents);
    evaluate_indexed(rule, file, &index)
}

/// Evaluates every applicable rule of `ruleset` against one file.
pub fn evaluate_file(ruleset: &RuleSet, file: &ProjectFile) -> Vec<Finding> {
    let index = LineIndex::new(&file.contents);
    let findings: Vec<Finding> = ruleset
        .applicable(&file.relative_path)
        .flat_map(|rule| evaluate_indexed(rule, file, &index))
        .collect();
    debug!("{}: {} findings", file.relative_path, findings.len());
    findings
}

fn evaluate_indexed(rule: &Rule, file: &ProjectFile, index: &LineIndex) -> Vec<Finding> {
    rule.detector()
        .hits(&file.contents, index)
        .into_iter()
        .map(|hit| {
            let finding = Finding::new(
                rule.id(),
                file.relative_path.as_str(),
                rule.severity(),
                rule.message(),
            );
            match hit {
                Hit::WholeFile => finding,
                Hit::At(position) => finding.at(position.line + 1, position.column + 1),
            }
        })
        .collect()
}
