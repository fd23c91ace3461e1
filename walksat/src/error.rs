//! Error-handling module for the crate

use std::path::PathBuf;

use thiserror::Error;

/// Error-Collection for all the possible Errors occurring in this crate
#[allow(variant_size_differences)]
#[derive(Error, Debug)]
pub enum Error {
    /// Relations need at least one argument column
    #[error("relation \"{relation}\" must have a positive arity")]
    InvalidArity {
        /// Name of the relation
        relation: String,
    },
    /// A row does not fit the arity of its relation
    #[error("row {row:?} does not fit relation \"{relation}\" with arity {arity}")]
    RowArity {
        /// Name of the relation
        relation: String,
        /// Arity of the relation
        arity: usize,
        /// The offending row
        row: Vec<String>,
    },
    /// The trailing truth value of an observed row is not a number
    #[error("truth value \"{value}\" of relation \"{relation}\" is not a number")]
    TruthValue {
        /// Name of the relation
        relation: String,
        /// The unparsable value
        value: String,
    },
    /// Negative priors are probabilities
    #[error("negative prior {prior} of relation \"{relation}\" is not within [0, 1]")]
    InvalidPrior {
        /// Name of the relation
        relation: String,
        /// The rejected prior
        prior: f64,
    },
    /// Ground rule operators other than disjunction and equality
    #[error("unsupported ground rule operator: \"{operator}\"")]
    UnsupportedOperator {
        /// The operator tag found in the ground rule
        operator: String,
    },
    /// A ground rule refers to an atom outside of the atom table
    #[error("ground rule refers to atom {index}, but only {count} atoms exist")]
    UnknownAtom {
        /// The flat atom index
        index: usize,
        /// Number of atoms in the table
        count: usize,
    },
    /// A ground rule originates from a rule that does not exist
    #[error("ground rule refers to rule {index}, but only {count} rules exist")]
    UnknownRule {
        /// The rule index
        index: usize,
        /// Number of rules
        count: usize,
    },
    /// Atom and coefficient lists of a ground rule differ in length
    #[error("ground rule has {atoms} atoms but {coefficients} coefficients")]
    CoefficientCount {
        /// Number of atoms
        atoms: usize,
        /// Number of coefficients
        coefficients: usize,
    },
    /// Disjunctions only allow the coefficients 1 and -1
    #[error("disjunction coefficient {coefficient} is neither 1 nor -1")]
    DisjunctionCoefficient {
        /// The rejected coefficient
        coefficient: f64,
    },
    /// The number of weights differs from the number of rules
    #[error("expected {rules} rule weights, got {weights}")]
    WeightCount {
        /// Number of rules
        rules: usize,
        /// Number of weights
        weights: usize,
    },
    /// Rule weights must be finite and non-negative
    #[error("weight {weight} of rule {rule} is not a finite non-negative number")]
    InvalidWeight {
        /// Index of the rule
        rule: usize,
        /// The rejected weight
        weight: f64,
    },
    /// Search parameters out of range
    #[error("invalid search parameter {parameter}: {reason}")]
    InvalidParameter {
        /// Name of the parameter
        parameter: &'static str,
        /// What is wrong with it
        reason: String,
    },
    /// Error while reading a file
    #[error("failed to read \"{filename}\": {error}")]
    Reading {
        /// Underlying error
        error: Box<Error>,
        /// Name of the file that could not be read
        filename: PathBuf,
    },
    /// IO Error
    #[error(transparent)]
    IO(#[from] std::io::Error),
    /// CSV serialization/deserialization error
    #[error(transparent)]
    Csv(#[from] csv::Error),
    /// JSON deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Attach the name of the file that was being read.
    pub fn with_file(self, filename: impl Into<PathBuf>) -> Self {
        Self::Reading {
            error: Box::new(self),
            filename: filename.into(),
        }
    }
}
