//! Rule source documents.
//!
//! A rule source is a JSONC document declaring rules for one or more
//! profiles:
//!
//! ```jsonc
//! {
//!   "name": "strict-playbook",
//!   // shared by every profile declared below
//!   "rules": [],
//!   "profiles": {
//!     "strict-2026": [
//!       {
//!         "id": "no-console-log",
//!         "description": "Use the structured logger instead of console.log",
//!         "severity": "warning",
//!         "appliesTo": "**/*.{js,jsx,ts,tsx}",
//!         "detector": { "kind": "substring", "text": "console.log" }
//!       }
//!     ]
//!   }
//! }
//! ```
//!
//! Documents are validated against an embedded JSON Schema before they
//! are deserialized, and serialize back losslessly via [`RuleSource::to_json`].

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use jsonc_parser::ParseOptions;
use jsonschema::Validator;
use serde::{Deserialize, Serialize};

use crate::error::CheckerError;
use crate::registry::RuleRegistry;
use crate::rule::RuleDefinition;

// Embed the schema
const SCHEMA_JSON: &str = include_str!("../../../schemas/v1/rules.json");
static RULES_SCHEMA: OnceLock<Validator> = OnceLock::new();

/// A parsed rule source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSource {
    /// Schema reference, kept so the document serializes back as written.
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Name used in conflict messages.
    #[serde(default)]
    pub name: String,

    /// Rules shared by every profile this document declares.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<RuleDefinition>,

    /// Profile name to the rules it adds.
    #[serde(default)]
    pub profiles: BTreeMap<String, Vec<RuleDefinition>>,
}

impl RuleSource {
    /// Loads a rule source from a file.
    ///
    /// The file path is used as the source name unless the document
    /// declares one.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CheckerError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let content = fs::read_to_string(path)
            .map_err(|e| CheckerError::rule_source(&display, format!("failed to read: {}", e)))?;
        Self::parse(&content, &display)
    }

    /// Parses a rule source from JSONC text with schema validation.
    pub fn parse(text: &str, fallback_name: &str) -> Result<Self, CheckerError> {
        let value = jsonc_parser::parse_to_serde_value(text, &ParseOptions::default())
            .map_err(|e| CheckerError::rule_source(fallback_name, format!("invalid JSONC: {}", e)))?
            .ok_or_else(|| CheckerError::rule_source(fallback_name, "document is empty"))?;

        let schema = RULES_SCHEMA.get_or_init(|| {
            let schema_json: serde_json::Value =
                serde_json::from_str(SCHEMA_JSON).expect("Invalid embedded rules schema");
            Validator::new(&schema_json).expect("Invalid rules schema compilation")
        });

        if let Err(e) = schema.validate(&value) {
            return Err(CheckerError::rule_source(
                fallback_name,
                format!("{} at {}", e, e.instance_path()),
            ));
        }

        let mut source: RuleSource = serde_json::from_value(value)
            .map_err(|e| CheckerError::rule_source(fallback_name, e.to_string()))?;
        if source.name.is_empty() {
            source.name = fallback_name.to_string();
        }
        Ok(source)
    }

    /// Serializes this source as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, CheckerError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Returns true if this document declares `profile`.
    pub fn declares(&self, profile: &str) -> bool {
        self.profiles.contains_key(profile)
    }

    /// Names of the profiles declared in this document, sorted.
    pub fn profile_names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Definitions contributing to `profile`: shared rules first, then the
    /// profile's own. `None` when the profile is not declared here.
    pub fn definitions_for<'a>(
        &'a self,
        profile: &str,
    ) -> Option<impl Iterator<Item = &'a RuleDefinition> + 'a> {
        let own = self.profiles.get(profile)?;
        Some(self.rules.iter().chain(own.iter()))
    }

    /// Self-test: every declared profile compiles, and serializing then
    /// re-parsing the document yields an equal source and equal rule sets.
    pub fn verify_round_trip(&self) -> Result<(), CheckerError> {
        let json = self.to_json()?;
        let reparsed = Self::parse(&json, &self.name)?;
        if reparsed != *self {
            return Err(CheckerError::rule_source(
                &self.name,
                "round-trip produced a different document",
            ));
        }

        for profile in self.profile_names() {
            let original = RuleRegistry::load(self, profile)?;
            let restored = RuleRegistry::load(&reparsed, profile)?;
            if original != restored {
                return Err(CheckerError::rule_source(
                    &self.name,
                    format!("round-trip changed the rule set for profile '{}'", profile),
                ));
            }
        }
        Ok(())
    }
}
