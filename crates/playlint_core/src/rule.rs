//! Rules and rule sets.

use std::collections::HashSet;

use globset::{Glob, GlobMatcher};
use serde::{Deserialize, Serialize};

use crate::detector::{Detector, DetectorSpec};
use crate::error::CheckerError;
use crate::finding::Severity;

fn default_applies_to() -> String {
    "**/*".to_string()
}

/// Declarative rule definition, as written in a rule source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDefinition {
    /// Unique rule id (e.g. `no-console-log`).
    pub id: String,

    /// Human-readable description, used as the finding message.
    #[serde(default)]
    pub description: String,

    /// Severity of findings produced by this rule.
    pub severity: Severity,

    /// Glob selecting the files this rule applies to.
    #[serde(default = "default_applies_to")]
    pub applies_to: String,

    /// Detection logic.
    pub detector: DetectorSpec,
}

/// A compiled, immutable rule.
#[derive(Debug, Clone)]
pub struct Rule {
    definition: RuleDefinition,
    glob: GlobMatcher,
    detector: Detector,
}

impl Rule {
    /// Compiles a rule definition, validating its glob and detector.
    pub fn compile(definition: RuleDefinition) -> Result<Self, CheckerError> {
        let glob = Glob::new(&definition.applies_to)
            .map_err(|e| CheckerError::InvalidGlob {
                rule_id: definition.id.clone(),
                pattern: definition.applies_to.clone(),
                message: e.kind().to_string(),
            })?
            .compile_matcher();
        let detector = Detector::compile(&definition.detector, &definition.id)?;

        Ok(Self {
            definition,
            glob,
            detector,
        })
    }

    pub fn id(&self) -> &str {
        &self.definition.id
    }

    pub fn severity(&self) -> Severity {
        self.definition.severity
    }

    /// Message attached to findings of this rule.
    pub fn message(&self) -> &str {
        if self.definition.description.is_empty() {
            &self.definition.id
        } else {
            &self.definition.description
        }
    }

    pub fn detector(&self) -> &Detector {
        &self.detector
    }

    pub fn definition(&self) -> &RuleDefinition {
        &self.definition
    }

    /// Returns true if this rule applies to the given root-relative path.
    pub fn applies_to(&self, relative_path: &str) -> bool {
        self.glob.is_match(relative_path)
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.definition == other.definition
    }
}

impl Eq for Rule {}

/// An ordered, conflict-free collection of rules under one profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    profile: String,
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Creates a rule set, enforcing that rule ids are unique.
    pub fn new(profile: impl Into<String>, rules: Vec<Rule>) -> Result<Self, CheckerError> {
        let profile = profile.into();
        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.id()) {
                return Err(CheckerError::DuplicateRule {
                    id: rule.id().to_string(),
                    source_name: format!("profile '{}'", profile),
                });
            }
        }
        Ok(Self { profile, rules })
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Looks up a rule by id.
    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.id() == id)
    }

    /// Rules whose glob matches the given root-relative path.
    pub fn applicable<'a>(&'a self, relative_path: &'a str) -> impl Iterator<Item = &'a Rule> + 'a {
        self.rules
            .iter()
            .filter(move |rule| rule.applies_to(relative_path))
    }

    /// The definitions this rule set was compiled from, in order.
    pub fn definitions(&self) -> Vec<RuleDefinition> {
        self.rules.iter().map(|rule| rule.definition.clone()).collect()
    }
}
