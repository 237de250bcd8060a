//! SARIF (Static Analysis Results Interchange Format) output formatter.
//!
//! Implements SARIF 2.1.0 format for integration with GitHub Advanced Security
//! and other CI/CD tools.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::finding::{Finding, Severity};
use crate::report::Report;

/// SARIF version constant
const SARIF_VERSION: &str = "2.1.0";

const SARIF_SCHEMA: &str =
    "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";

/// Tool information for SARIF
const TOOL_NAME: &str = "playlint";

/// Key under which finding fingerprints are published.
const FINGERPRINT_KEY: &str = "playlint/v1";

/// Generates SARIF output from a report
pub fn generate_sarif(report: &Report) -> Result<String, serde_json::Error> {
    let sarif_log = SarifLog::from_report(report);
    serde_json::to_string_pretty(&sarif_log)
}

/// Root SARIF log structure
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifLog {
    #[serde(rename = "$schema")]
    schema: &'static str,
    version: &'static str,
    runs: Vec<Run>,
}

impl SarifLog {
    fn from_report(report: &Report) -> Self {
        Self {
            schema: SARIF_SCHEMA,
            version: SARIF_VERSION,
            runs: vec![Run::from_report(report)],
        }
    }
}

/// A single run of the tool
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct Run {
    tool: Tool,
    invocations: Vec<Invocation>,
    results: Vec<SarifResult>,
}

impl Run {
    fn from_report(report: &Report) -> Self {
        // Sorted by id so output is stable across runs
        let mut rules: BTreeMap<&str, ReportingDescriptor> = BTreeMap::new();
        for finding in &report.findings {
            rules
                .entry(finding.rule_id.as_str())
                .or_insert_with(|| ReportingDescriptor::new(&finding.rule_id, &finding.message));
        }

        Self {
            tool: Tool {
                driver: ToolComponent::new(rules.into_values().collect()),
            },
            invocations: vec![Invocation {
                execution_successful: !report.incomplete,
            }],
            results: report.findings.iter().map(SarifResult::from_finding).collect(),
        }
    }
}

/// Tool information
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    driver: ToolComponent,
}

/// Tool component (driver)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolComponent {
    name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    rules: Vec<ReportingDescriptor>,
}

impl ToolComponent {
    fn new(rules: Vec<ReportingDescriptor>) -> Self {
        Self {
            name: TOOL_NAME,
            version: option_env!("CARGO_PKG_VERSION"),
            rules,
        }
    }
}

/// Run invocation status
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct Invocation {
    execution_successful: bool,
}

/// Rule descriptor
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportingDescriptor {
    id: String,
    short_description: Message,
}

impl ReportingDescriptor {
    fn new(id: &str, message: &str) -> Self {
        Self {
            id: id.to_string(),
            short_description: Message::text(message),
        }
    }
}

/// A message
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct Message {
    text: String,
}

impl Message {
    fn text(s: impl Into<String>) -> Self {
        Self { text: s.into() }
    }
}

/// A single result (finding)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifResult {
    rule_id: String,
    level: &'static str,
    message: Message,
    locations: Vec<Location>,
    partial_fingerprints: HashMap<&'static str, String>,
}

impl SarifResult {
    fn from_finding(finding: &Finding) -> Self {
        let level = match finding.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "note",
        };

        Self {
            rule_id: finding.rule_id.clone(),
            level,
            message: Message::text(&finding.message),
            locations: vec![Location {
                physical_location: PhysicalLocation::from_finding(finding),
            }],
            partial_fingerprints: HashMap::from([(FINGERPRINT_KEY, finding.fingerprint())]),
        }
    }
}

/// Location information
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct Location {
    physical_location: PhysicalLocation,
}

/// Physical location
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct PhysicalLocation {
    artifact_location: ArtifactLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    region: Option<Region>,
}

impl PhysicalLocation {
    fn from_finding(finding: &Finding) -> Self {
        Self {
            artifact_location: ArtifactLocation {
                uri: finding.path.clone(),
            },
            region: finding.line.map(|line| Region {
                start_line: line,
                start_column: finding.column,
            }),
        }
    }
}

/// Artifact location (file path)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ArtifactLocation {
    uri: String,
}

/// Region (line/column information)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct Region {
    start_line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_column: Option<u32>,
}
