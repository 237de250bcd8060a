//! Detectors: the matching logic behind a rule.
//!
//! A detector is declared in a rule source as a tagged object
//! (`{"kind": "substring", "text": "console.log"}`) and compiled once when
//! the rule set is loaded. Compilation rejects anything that could only
//! fail (or misbehave) at match time, so matching itself is infallible.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CheckerError;

/// Declarative detector definition, as written in a rule source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DetectorSpec {
    /// Matches every occurrence of a regular expression.
    Regex { pattern: String },
    /// Matches every occurrence of a literal string.
    Substring { text: String },
    /// Matches once per file when a literal string never occurs.
    Absence { text: String },
    /// Matches once per file when every child matches at least once.
    Composite { all: Vec<DetectorSpec> },
}

impl DetectorSpec {
    /// Short name of the detector kind.
    pub fn kind(&self) -> &'static str {
        match self {
            DetectorSpec::Regex { .. } => "regex",
            DetectorSpec::Substring { .. } => "substring",
            DetectorSpec::Absence { .. } => "absence",
            DetectorSpec::Composite { .. } => "composite",
        }
    }
}

/// Zero-based position inside a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TextPosition {
    /// Zero-based line offset.
    pub line: u32,
    /// Zero-based column, counted in characters.
    pub column: u32,
}

/// A single detector match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// The whole file matches (absence detectors).
    WholeFile,
    /// A match at a specific position.
    At(TextPosition),
}

/// Byte offsets of line starts, used to turn match offsets into positions.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    /// Builds the index for `text`.
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    /// Number of lines in the indexed text.
    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    /// Converts a byte offset into a zero-based line/column position.
    pub fn position(&self, text: &str, offset: usize) -> TextPosition {
        let line = self.starts.partition_point(|&start| start <= offset) - 1;
        let line_start = self.starts[line];
        let column = text
            .get(line_start..offset)
            .map_or(0, |prefix| prefix.chars().count());
        TextPosition {
            line: line as u32,
            column: column as u32,
        }
    }
}

/// A compiled detector.
#[derive(Debug, Clone)]
pub enum Detector {
    Regex(Regex),
    Substring(String),
    Absence(String),
    Composite(Vec<Detector>),
}

impl Detector {
    /// Compiles a detector definition for the rule `rule_id`.
    pub fn compile(spec: &DetectorSpec, rule_id: &str) -> Result<Self, CheckerError> {
        match spec {
            DetectorSpec::Regex { pattern } => {
                if pattern.is_empty() {
                    return Err(CheckerError::detector(rule_id, "regex pattern is empty"));
                }
                let regex = Regex::new(pattern).map_err(|e| {
                    CheckerError::detector(rule_id, format!("invalid regex '{}': {}", pattern, e))
                })?;
                if can_match_empty(pattern) {
                    return Err(CheckerError::detector(
                        rule_id,
                        format!("regex '{}' can match the empty string", pattern),
                    ));
                }
                Ok(Detector::Regex(regex))
            }
            DetectorSpec::Substring { text } => {
                if text.is_empty() {
                    return Err(CheckerError::detector(rule_id, "substring text is empty"));
                }
                Ok(Detector::Substring(text.clone()))
            }
            DetectorSpec::Absence { text } => {
                if text.is_empty() {
                    return Err(CheckerError::detector(rule_id, "absence text is empty"));
                }
                Ok(Detector::Absence(text.clone()))
            }
            DetectorSpec::Composite { all } => {
                if all.is_empty() {
                    return Err(CheckerError::detector(
                        rule_id,
                        "composite detector needs at least one child",
                    ));
                }
                let children = all
                    .iter()
                    .map(|child| Detector::compile(child, rule_id))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Detector::Composite(children))
            }
        }
    }

    /// Returns every hit of this detector in `text`.
    ///
    /// `absence` and `composite` detectors produce at most one hit per file.
    pub fn hits(&self, text: &str, index: &LineIndex) -> Vec<Hit> {
        match self {
            Detector::Regex(regex) => regex
                .find_iter(text)
                .filter(|m| !m.is_empty())
                .map(|m| Hit::At(index.position(text, m.start())))
                .collect(),
            Detector::Substring(needle) => text
                .match_indices(needle.as_str())
                .map(|(offset, _)| Hit::At(index.position(text, offset)))
                .collect(),
            Detector::Absence(_) | Detector::Composite(_) => {
                self.first_hit(text, index).into_iter().collect()
            }
        }
    }

    /// Returns the first hit of this detector in `text`, if any.
    pub fn first_hit(&self, text: &str, index: &LineIndex) -> Option<Hit> {
        match self {
            Detector::Regex(regex) => regex
                .find_iter(text)
                .find(|m| !m.is_empty())
                .map(|m| Hit::At(index.position(text, m.start()))),
            Detector::Substring(needle) => text
                .find(needle.as_str())
                .map(|offset| Hit::At(index.position(text, offset))),
            Detector::Absence(needle) => (!text.contains(needle.as_str())).then_some(Hit::WholeFile),
            Detector::Composite(children) => {
                let (first, rest) = children.split_first()?;
                let hit = first.first_hit(text, index)?;
                rest.iter()
                    .all(|child| child.first_hit(text, index).is_some())
                    .then_some(hit)
            }
        }
    }
}

/// True if some match of `pattern` is zero-length, including zero-width
/// assertions such as `\b` that only match inside non-empty text.
fn can_match_empty(pattern: &str) -> bool {
    match regex_syntax::Parser::new().parse(pattern) {
        Ok(hir) => hir.properties().minimum_len() == Some(0),
        Err(_) => true,
    }
}
