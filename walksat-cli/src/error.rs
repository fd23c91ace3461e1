//! This module defines all the errors that can occur while executing walksat-cli.

use std::path::PathBuf;

use thiserror::Error;

/// Error that occur during execution of the CLI app
#[derive(Error, Debug)]
pub enum CliError {
    /// Error if the MLN engine is used without ground rules
    #[error("the mln engine requires a ground program (--ground-program)")]
    NoGroundProgram,
    /// Error if a relation was declared more than once
    #[error("relation `{name}` is declared more than once")]
    DuplicateRelation {
        /// Name of the relation
        name: String,
    },
    /// Error if data or a prior refers to an undeclared relation
    #[error("relation `{name}` has not been declared (use --relation {name}/ARITY)")]
    UndeclaredRelation {
        /// Name of the relation
        name: String,
    },
    /// Error while parsing a line of the rule file
    #[error("unable to parse line {line} of rule file `{filename}`: {reason}")]
    RuleFileParsing {
        /// Filename of the rule file
        filename: PathBuf,
        /// Line number, starting at 1
        line: usize,
        /// What is wrong with the line
        reason: String,
    },
    /// Error if writing results would replace an existing file
    #[error("file `{filename}` already exists (use --overwrite-results to replace it)")]
    OutputExists {
        /// Path of the existing file
        filename: PathBuf,
    },
    /// Error while writing a result file
    #[error("error while writing results to `{filename}`: {error}")]
    Writing {
        /// Underlying error
        error: csv::Error,
        /// Path of the result file
        filename: PathBuf,
    },
    /// Error resulting from io operations
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    /// Error originating from walksat
    #[error(transparent)]
    WalksatError(#[from] walksat::error::Error),
}
