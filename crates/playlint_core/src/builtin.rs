//! Built-in playbook rule sources.

use crate::error::CheckerError;
use crate::source::RuleSource;

const STRICT_PLAYBOOK: &str = include_str!("../../../playbooks/strict.jsonc");
const PRAGMATIC_PLAYBOOK: &str = include_str!("../../../playbooks/pragmatic.jsonc");

/// Parses the embedded playbooks.
///
/// Used when neither the config nor the command line names rule sources.
pub fn builtin_sources() -> Result<Vec<RuleSource>, CheckerError> {
    Ok(vec![
        RuleSource::parse(STRICT_PLAYBOOK, "builtin:strict")?,
        RuleSource::parse(PRAGMATIC_PLAYBOOK, "builtin:pragmatic")?,
    ])
}
