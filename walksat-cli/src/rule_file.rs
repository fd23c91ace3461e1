//! Reading of rule files
//!
//! Each non-empty line holds one rule. A line may start with `WEIGHT:`,
//! where `.` as weight marks a hard rule. Lines starting with `#` are ignored.

use std::path::{Path, PathBuf};

use walksat::{error::Error, grounding::Rule};

use crate::error::CliError;

/// Marks a hard rule in place of a weight
const HARD_MARKER: &str = ".";

/// Rules read from a rule file
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct RuleFile {
    /// The rules in file order
    pub(crate) rules: Vec<Rule>,
    /// One weight per rule, `None` for hard rules;
    /// absent if no line carries a weight
    pub(crate) weights: Option<Vec<Option<f64>>>,
}

impl RuleFile {
    /// Read the rule file at `path`.
    pub(crate) fn read(path: &Path) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path)
            .map_err(|error| Error::from(error).with_file(path))?;
        Self::parse(&content, path)
    }

    /// Parse the content of a rule file; `filename` is only used for errors.
    ///
    /// Lines without weight are hard rules, unless no line has a weight at all.
    pub(crate) fn parse(content: &str, filename: &Path) -> Result<Self, CliError> {
        let mut rules = Vec::new();
        let mut weights = Vec::new();
        let mut weighted = false;

        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (weight, text) = match Self::split_weight(line) {
                Some((weight, text)) => {
                    weighted = true;
                    let weight = Self::parse_weight(weight).ok_or_else(|| {
                        CliError::RuleFileParsing {
                            filename: PathBuf::from(filename),
                            line: index + 1,
                            reason: format!("invalid weight `{weight}`"),
                        }
                    })?;
                    (weight, text)
                }
                None => (None, line),
            };

            if text.is_empty() {
                return Err(CliError::RuleFileParsing {
                    filename: PathBuf::from(filename),
                    line: index + 1,
                    reason: "missing rule".to_string(),
                });
            }

            rules.push(Rule::new(text));
            weights.push(weight);
        }

        log::debug!("read {} rules from {}", rules.len(), filename.display());

        Ok(Self {
            rules,
            weights: weighted.then_some(weights),
        })
    }

    /// Split off a leading `WEIGHT:`, if the part before the first colon looks like one.
    fn split_weight(line: &str) -> Option<(&str, &str)> {
        let (prefix, text) = line.split_once(':')?;
        let prefix = prefix.trim();

        let looks_like_weight = prefix == HARD_MARKER
            || prefix
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'));

        (!prefix.is_empty() && looks_like_weight).then(|| (prefix, text.trim()))
    }

    fn parse_weight(weight: &str) -> Option<Option<f64>> {
        if weight == HARD_MARKER {
            return Some(None);
        }

        weight.parse().ok().map(Some)
    }
}
