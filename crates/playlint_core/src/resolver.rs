//! Profile resolution across several rule sources.

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::error::CheckerError;
use crate::registry::RuleRegistry;
use crate::rule::RuleSet;
use crate::source::RuleSource;

/// Merges every source declaring `profile` into one rule set.
///
/// Sources that do not declare the profile are ignored. Fails with
/// [`CheckerError::ProfileNotFound`] when none declares it, and with
/// [`CheckerError::RuleConflict`] when two sources disagree on a rule.
pub fn resolve(profile: &str, sources: &[RuleSource]) -> Result<RuleSet, CheckerError> {
    let contributing: Vec<&RuleSource> = sources.iter().filter(|s| s.declares(profile)).collect();

    if contributing.is_empty() {
        return Err(CheckerError::ProfileNotFound {
            profile: profile.to_string(),
            available: available_profiles(sources),
        });
    }

    let mut registry = RuleRegistry::new(profile);
    for source in contributing {
        debug!("Merging rule source '{}' for profile '{}'", source.name, profile);
        if let Some(definitions) = source.definitions_for(profile) {
            for definition in definitions {
                registry.add(definition.clone(), &source.name)?;
            }
        }
    }

    let ruleset = registry.build()?;
    info!("Resolved profile '{}' with {} rules", profile, ruleset.len());
    Ok(ruleset)
}

/// Every profile declared by any source, sorted and deduplicated.
pub fn available_profiles(sources: &[RuleSource]) -> Vec<String> {
    sources
        .iter()
        .flat_map(|s| s.profile_names())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Rule;
    use pretty_assertions::assert_eq;

    fn source(name: &str, body: &str) -> RuleSource {
        RuleSource::parse(body, name).unwrap()
    }

    fn strict() -> RuleSource {
        source(
            "strict.jsonc",
            r#"{
                "profiles": {
                    "strict-2026": [
                        { "id": "no-console-log", "severity": "warning", "detector": { "kind": "substring", "text": "console.log" } },
                        { "id": "require-repository-layer", "severity": "error", "detector": { "kind": "absence", "text": "Repository" } }
                    ]
                }
            }"#,
        )
    }

    fn pragmatic() -> RuleSource {
        source(
            "pragmatic.jsonc",
            r#"{
                "profiles": {
                    "pragmatic-2026": [
                        { "id": "require-repository-layer", "severity": "info", "detector": { "kind": "absence", "text": "Repository" } }
                    ]
                }
            }"#,
        )
    }

    #[test]
    fn test_only_declaring_sources_contribute() {
        let sources = vec![strict(), pragmatic()];
        let set = resolve("pragmatic-2026", &sources).unwrap();
        let ids: Vec<&str> = set.rules().iter().map(Rule::id).collect();
        assert_eq!(ids, vec!["require-repository-layer"]);
    }

    #[test]
    fn test_profile_not_found() {
        let sources = vec![strict(), pragmatic(), strict()];
        let err = resolve("nonexistent", &sources).unwrap_err();
        match err {
            CheckerError::ProfileNotFound { profile, available } => {
                assert_eq!(profile, "nonexistent");
                assert_eq!(available, vec!["pragmatic-2026", "strict-2026"]);
            }
            other => panic!("expected ProfileNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_no_sources_at_all() {
        let err = resolve("strict-2026", &[]).unwrap_err();
        assert!(err.to_string().ends_with("(available: none)"));
    }

    #[test]
    fn test_cross_source_severity_conflict() {
        let team = source(
            "team.jsonc",
            r#"{
                "profiles": {
                    "strict-2026": [
                        { "id": "no-console-log", "severity": "error", "detector": { "kind": "substring", "text": "console.log" } }
                    ]
                }
            }"#,
        );
        let err = resolve("strict-2026", &[strict(), team]).unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, CheckerError::RuleConflict { .. }));
        assert!(msg.contains("strict.jsonc"), "{}", msg);
        assert!(msg.contains("team.jsonc"), "{}", msg);
    }

    #[test]
    fn test_identical_rules_merge_across_sources() {
        let set = resolve("strict-2026", &[strict(), strict()]);
        // Same name in both: treated as a repeat within one source.
        assert!(matches!(set, Err(CheckerError::DuplicateRule { .. })));

        let mut copy = strict();
        copy.name = "copy.jsonc".to_string();
        let set = resolve("strict-2026", &[strict(), copy]).unwrap();
        assert_eq!(set.len(), 2);
    }
}
