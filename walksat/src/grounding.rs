//! This module defines the interface to external grounders.
//!
//! Grounding, i.e. instantiating first-order rules with the rows of the relations,
//! is not performed by this crate. A [Grounder] hands over the resulting
//! [RawGroundRule]s, which address atoms by their flat index
//! (see [crate::atoms::AtomTable]).

use std::{
    fmt::Display,
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{error::Error, relation::Relation};

/// Operator tag of disjunctive ground rules
pub const OPERATOR_DISJUNCTION: &str = "disjunction";
/// Operator tag of arithmetic equality ground rules
pub const OPERATOR_EQUALITY: &str = "equality";

/// A first-order rule, kept as opaque text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    text: String,
}

impl Rule {
    /// Create a new [Rule].
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Return the text of this rule.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// One instantiation of a rule as produced by a grounder
///
/// The rule reads `Σ coefficients[i] * atoms[i] <operator> constant`,
/// where disjunctions use coefficient `1` for positive
/// and `-1` for negated literals: a literal with coefficient `1` holds
/// if its atom is true.
///
/// Only the tags [OPERATOR_DISJUNCTION] and [OPERATOR_EQUALITY] are accepted.
/// Ground programs using the short tags `|` and `=` encode negation
/// with the opposite sign and are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGroundRule {
    /// Index of the rule this is an instantiation of
    pub rule_index: usize,
    /// Operator tag
    pub operator: String,
    /// Constant offset
    #[serde(default)]
    pub constant: f64,
    /// Coefficient of each atom
    pub coefficients: Vec<f64>,
    /// Flat atom indices
    pub atoms: Vec<usize>,
}

impl RawGroundRule {
    /// Create a disjunctive ground rule.
    pub fn disjunction(rule_index: usize, atoms: Vec<usize>, coefficients: Vec<f64>) -> Self {
        Self {
            rule_index,
            operator: OPERATOR_DISJUNCTION.to_string(),
            constant: 0.0,
            coefficients,
            atoms,
        }
    }

    /// Create an equality ground rule.
    pub fn equality(
        rule_index: usize,
        atoms: Vec<usize>,
        coefficients: Vec<f64>,
        constant: f64,
    ) -> Self {
        Self {
            rule_index,
            operator: OPERATOR_EQUALITY.to_string(),
            constant,
            coefficients,
            atoms,
        }
    }
}

/// Source of ground rules
pub trait Grounder: std::fmt::Debug {
    /// Instantiate `rules` over `relations`.
    ///
    /// Errors are passed on to the caller unchanged.
    fn ground(&self, relations: &[Relation], rules: &[Rule]) -> Result<Vec<RawGroundRule>, Error>;
}

/// Ground rules computed ahead of time
impl Grounder for Vec<RawGroundRule> {
    fn ground(&self, _relations: &[Relation], _rules: &[Rule]) -> Result<Vec<RawGroundRule>, Error> {
        Ok(self.clone())
    }
}

/// Serialized output of an external grounder
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundProgram {
    /// The ground rules
    pub ground_rules: Vec<RawGroundRule>,
}

impl GroundProgram {
    /// Read a JSON ground program from `reader`.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        Ok(serde_json::from_reader(reader)?)
    }
}

/// [Grounder] reading a JSON [GroundProgram] written by an external grounder
#[derive(Debug, Clone)]
pub struct PrecomputedGrounder {
    path: PathBuf,
}

impl PrecomputedGrounder {
    /// Create a grounder reading from the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Return the path of the ground program.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Grounder for PrecomputedGrounder {
    fn ground(&self, _relations: &[Relation], _rules: &[Rule]) -> Result<Vec<RawGroundRule>, Error> {
        let program = File::open(&self.path)
            .map_err(Error::from)
            .and_then(|file| GroundProgram::from_reader(BufReader::new(file)))
            .map_err(|error| error.with_file(&self.path))?;

        log::info!(
            "read {} ground rules from {}",
            program.ground_rules.len(),
            self.path.display()
        );

        Ok(program.ground_rules)
    }
}
