//! Rule registry: collects definitions for one profile and compiles them.

use std::collections::HashMap;

use tracing::debug;

use crate::error::CheckerError;
use crate::rule::{Rule, RuleDefinition, RuleSet};
use crate::source::RuleSource;

/// A definition together with the source that declared it.
#[derive(Debug, Clone)]
struct Entry {
    definition: RuleDefinition,
    source_name: String,
}

/// Accumulates rule definitions for one profile.
///
/// Definitions are validated as they are added; [`RuleRegistry::build`]
/// compiles globs and detectors into an immutable [`RuleSet`].
#[derive(Debug, Default)]
pub struct RuleRegistry {
    profile: String,
    entries: Vec<Entry>,
    by_id: HashMap<String, usize>,
}

impl RuleRegistry {
    /// Creates an empty registry for `profile`.
    pub fn new(profile: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
            ..Default::default()
        }
    }

    /// Loads every definition `source` declares for `profile`.
    pub fn load(source: &RuleSource, profile: &str) -> Result<RuleSet, CheckerError> {
        let definitions =
            source
                .definitions_for(profile)
                .ok_or_else(|| CheckerError::ProfileNotFound {
                    profile: profile.to_string(),
                    available: source.profile_names().map(str::to_string).collect(),
                })?;

        let mut registry = Self::new(profile);
        for definition in definitions {
            registry.add(definition.clone(), &source.name)?;
        }
        registry.build()
    }

    /// Adds a definition declared by `source_name`.
    ///
    /// A repeated id is accepted only when it comes from a different
    /// source with the same severity and detector; the first definition
    /// is kept.
    pub fn add(
        &mut self,
        definition: RuleDefinition,
        source_name: &str,
    ) -> Result<(), CheckerError> {
        if let Some(&index) = self.by_id.get(&definition.id) {
            let existing = &self.entries[index];

            if let Some(reason) = disagreement(&existing.definition, &definition) {
                return Err(CheckerError::RuleConflict {
                    id: definition.id,
                    first: existing.source_name.clone(),
                    second: source_name.to_string(),
                    reason,
                });
            }

            if existing.source_name == source_name {
                return Err(CheckerError::DuplicateRule {
                    id: definition.id,
                    source_name: source_name.to_string(),
                });
            }

            debug!(
                "Rule '{}' from '{}' merged into definition from '{}'",
                definition.id, source_name, existing.source_name
            );
            return Ok(());
        }

        self.by_id.insert(definition.id.clone(), self.entries.len());
        self.entries.push(Entry {
            definition,
            source_name: source_name.to_string(),
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compiles the collected definitions into a rule set.
    pub fn build(self) -> Result<RuleSet, CheckerError> {
        let rules = self
            .entries
            .into_iter()
            .map(|entry| Rule::compile(entry.definition))
            .collect::<Result<Vec<_>, _>>()?;
        debug!("Compiled {} rules for profile '{}'", rules.len(), self.profile);
        RuleSet::new(self.profile, rules)
    }
}

/// Describes how two definitions of the same id contradict each other.
fn disagreement(first: &RuleDefinition, second: &RuleDefinition) -> Option<String> {
    if first.severity != second.severity {
        return Some(format!(
            "severity ({} vs {})",
            first.severity, second.severity
        ));
    }
    if first.detector != second.detector {
        if first.detector.kind() != second.detector.kind() {
            return Some(format!(
                "detector ({} vs {})",
                first.detector.kind(),
                second.detector.kind()
            ));
        }
        return Some(format!("detector ({} settings)", first.detector.kind()));
    }
    None
}
