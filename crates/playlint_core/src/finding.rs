//! Finding types for check results.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Severity level for rules and findings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Error - must be fixed.
    #[default]
    Error,
    /// Warning - should be reviewed.
    Warning,
    /// Info - informational message.
    Info,
}

impl Severity {
    /// All severities, most severe first.
    pub const ALL: [Severity; 3] = [Severity::Error, Severity::Warning, Severity::Info];

    fn rank(self) -> u8 {
        match self {
            Severity::Error => 2,
            Severity::Warning => 1,
            Severity::Info => 0,
        }
    }

    /// Returns true if `self` is as severe as `threshold` or more.
    pub fn is_at_least(self, threshold: Severity) -> bool {
        self.rank() >= threshold.rank()
    }

    /// Lowercase name as used in rule sources and reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Orders by severity: `Info < Warning < Error`.
impl Ord for Severity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" | "warn" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            other => Err(format!(
                "unknown severity '{}' (expected error, warning, or info)",
                other
            )),
        }
    }
}

/// A single reported rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    /// The rule that produced this finding.
    pub rule_id: String,

    /// Path relative to the checked root, `/`-separated.
    pub path: String,

    /// One-based line. `None` for whole-file findings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,

    /// One-based character column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,

    /// Severity level.
    pub severity: Severity,

    /// Human-readable message.
    pub message: String,
}

impl Finding {
    /// Creates a whole-file finding.
    pub fn new(
        rule_id: impl Into<String>,
        path: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            path: path.into(),
            line: None,
            column: None,
            severity,
            message: message.into(),
        }
    }

    /// Sets a one-based line/column location.
    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// Returns the identity used for deduplication.
    pub fn dedup_key(&self) -> (&str, &str, Option<u32>) {
        (&self.rule_id, &self.path, self.line)
    }

    /// Stable fingerprint of this finding.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.rule_id.as_bytes());
        hasher.update(&[0]);
        hasher.update(self.path.as_bytes());
        hasher.update(&[0]);
        hasher.update(&self.line.unwrap_or(0).to_le_bytes());
        hasher.update(&[0]);
        hasher.update(self.message.as_bytes());
        hasher.finalize().to_hex().to_string()
    }
}
