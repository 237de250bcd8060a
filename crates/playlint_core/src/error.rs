//! Checker error types.

use thiserror::Error;

/// Errors that can occur while loading rules, resolving profiles, or
/// configuring a run.
///
/// Every variant is fatal for the run. Problems with individual files
/// never surface here; they are reported as findings instead.
#[derive(Debug, Error)]
pub enum CheckerError {
    /// Configuration error (bad flags, paths, or config file).
    #[error("Configuration error: {0}")]
    Config(String),

    /// A rule source document could not be parsed or failed validation.
    #[error("Invalid rule source '{source_name}': {message}")]
    RuleSource {
        source_name: String,
        message: String,
    },

    /// The same rule id was declared twice with an identical definition.
    #[error("Duplicate rule id '{id}' in {source_name}")]
    DuplicateRule { id: String, source_name: String },

    /// The same rule id was declared with contradictory definitions.
    #[error("Conflicting definitions for rule '{id}': {first} and {second} disagree on {reason}")]
    RuleConflict {
        id: String,
        first: String,
        second: String,
        reason: String,
    },

    /// No rule source declares the requested profile.
    #[error("Profile '{profile}' not found (available: {})", format_available(.available))]
    ProfileNotFound {
        profile: String,
        available: Vec<String>,
    },

    /// A rule's `appliesTo` glob is not a valid pattern.
    #[error("Invalid glob '{pattern}' in rule '{rule_id}': {message}")]
    InvalidGlob {
        rule_id: String,
        pattern: String,
        message: String,
    },

    /// A rule's detector could not be compiled.
    #[error("Invalid detector in rule '{rule_id}': {message}")]
    DetectorCompile { rule_id: String, message: String },

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CheckerError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a rule source error.
    pub fn rule_source(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RuleSource {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Creates a detector compile error.
    pub fn detector(rule_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DetectorCompile {
            rule_id: rule_id.into(),
            message: message.into(),
        }
    }
}

fn format_available(available: &[String]) -> String {
    if available.is_empty() {
        "none".to_string()
    } else {
        available.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_message_names_both_sources() {
        let err = CheckerError::RuleConflict {
            id: "no-console-log".to_string(),
            first: "strict.jsonc".to_string(),
            second: "pragmatic.jsonc".to_string(),
            reason: "severity (warning vs error)".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("no-console-log"));
        assert!(msg.contains("strict.jsonc"));
        assert!(msg.contains("pragmatic.jsonc"));
    }

    #[test]
    fn test_profile_not_found_lists_available() {
        let err = CheckerError::ProfileNotFound {
            profile: "nonexistent".to_string(),
            available: vec!["pragmatic-2026".to_string(), "strict-2026".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Profile 'nonexistent' not found (available: pragmatic-2026, strict-2026)"
        );

        let none = CheckerError::ProfileNotFound {
            profile: "x".to_string(),
            available: vec![],
        };
        assert!(none.to_string().ends_with("(available: none)"));
    }
}
