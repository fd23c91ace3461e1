//! This module defines [Relation], the relational data inference runs over.

use std::{fmt::Display, fs::File, io::Read, path::Path};

use crate::error::Error;

/// Default column delimiter of relation data files
pub const DEFAULT_DELIMITER: u8 = b'\t';

/// Which part of a relation rows are added to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    /// Rows with a known truth value
    Observed,
    /// Rows whose truth value is inferred
    Unobserved,
}

/// Observed fact of a relation
#[derive(Debug, Clone, PartialEq)]
pub struct ObservedRow {
    arguments: Vec<String>,
    value: Option<f64>,
}

impl ObservedRow {
    /// Return the argument columns of this row.
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Return the stored truth value, if the row has a trailing value column.
    pub fn value(&self) -> Option<f64> {
        self.value
    }
}

/// A predicate together with its observed and unobserved rows
///
/// Row order is significant: atoms are numbered per relation
/// with observed rows first and unobserved rows after them,
/// each in insertion order (see [crate::atoms::AtomTable]).
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    name: String,
    arity: usize,
    observed: Vec<ObservedRow>,
    unobserved: Vec<Vec<String>>,
    negative_prior: Option<f64>,
}

impl Relation {
    /// Create a new empty [Relation].
    pub fn new(name: impl Into<String>, arity: usize) -> Result<Self, Error> {
        let name = name.into();
        if arity == 0 {
            return Err(Error::InvalidArity { relation: name });
        }

        Ok(Self {
            name,
            arity,
            observed: Vec::new(),
            unobserved: Vec::new(),
            negative_prior: None,
        })
    }

    /// Set the probability with which unobserved atoms of this relation
    /// start out as true.
    pub fn with_negative_prior(mut self, prior: f64) -> Result<Self, Error> {
        if !(0.0..=1.0).contains(&prior) {
            return Err(Error::InvalidPrior {
                relation: self.name,
                prior,
            });
        }

        self.negative_prior = Some(prior);
        Ok(self)
    }

    /// Return the name of this relation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the number of argument columns.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Return the observed rows in insertion order.
    pub fn observed_rows(&self) -> &[ObservedRow] {
        &self.observed
    }

    /// Return the unobserved argument tuples in insertion order.
    pub fn unobserved_rows(&self) -> &[Vec<String>] {
        &self.unobserved
    }

    /// Return whether there is anything to infer for this relation.
    pub fn has_unobserved_rows(&self) -> bool {
        !self.unobserved.is_empty()
    }

    /// Return the negative prior of this relation, if one is configured.
    pub fn negative_prior(&self) -> Option<f64> {
        self.negative_prior
    }

    /// Return the number of atoms (observed and unobserved) of this relation.
    pub fn atom_count(&self) -> usize {
        self.observed.len() + self.unobserved.len()
    }

    /// Add an observed row.
    ///
    /// The row either has exactly `arity` columns, in which case it counts as true,
    /// or one additional trailing column holding its truth value.
    pub fn add_observed(&mut self, mut row: Vec<String>) -> Result<(), Error> {
        let value = if row.len() == self.arity + 1 {
            let raw = row.pop().unwrap_or_default();
            let value = raw.trim().parse::<f64>().map_err(|_| Error::TruthValue {
                relation: self.name.clone(),
                value: raw,
            })?;
            Some(value)
        } else if row.len() == self.arity {
            None
        } else {
            return Err(self.arity_error(row));
        };

        self.observed.push(ObservedRow {
            arguments: row,
            value,
        });
        Ok(())
    }

    /// Add an unobserved row consisting of exactly `arity` columns.
    pub fn add_unobserved(&mut self, row: Vec<String>) -> Result<(), Error> {
        if row.len() != self.arity {
            return Err(self.arity_error(row));
        }

        self.unobserved.push(row);
        Ok(())
    }

    /// Add several rows of the given kind, returning how many were added.
    pub fn add_rows<Rows, Row, Column>(&mut self, rows: Rows, kind: DataKind) -> Result<usize, Error>
    where
        Rows: IntoIterator<Item = Row>,
        Row: IntoIterator<Item = Column>,
        Column: Into<String>,
    {
        let mut count = 0;
        for row in rows {
            let row = row.into_iter().map(Into::into).collect();
            match kind {
                DataKind::Observed => self.add_observed(row)?,
                DataKind::Unobserved => self.add_unobserved(row)?,
            }
            count += 1;
        }

        Ok(count)
    }

    /// Read delimiter separated rows without a header from `reader`.
    pub fn load_reader<R: Read>(
        &mut self,
        reader: R,
        kind: DataKind,
        delimiter: u8,
    ) -> Result<usize, Error> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(reader);

        let mut count = 0;
        for record in reader.records() {
            let record = record?;
            self.add_rows([record.iter()], kind)?;
            count += 1;
        }

        log::debug!("read {count} {kind:?} rows for relation {}", self.name);
        Ok(count)
    }

    /// Read delimiter separated rows without a header from the file at `path`.
    pub fn load_file(
        &mut self,
        path: impl AsRef<Path>,
        kind: DataKind,
        delimiter: u8,
    ) -> Result<usize, Error> {
        let path = path.as_ref();
        File::open(path)
            .map_err(Error::from)
            .and_then(|file| self.load_reader(file, kind, delimiter))
            .map_err(|error| error.with_file(path))
    }

    fn arity_error(&self, row: Vec<String>) -> Error {
        Error::RowArity {
            relation: self.name.clone(),
            arity: self.arity,
            row,
        }
    }
}

impl Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::*;

    fn friends() -> Relation {
        Relation::new("Friends", 2).unwrap()
    }

    #[test]
    fn observed_rows_with_and_without_value() {
        let mut relation = friends();
        relation
            .add_rows([vec!["a", "b"], vec!["b", "c", "0.0"]], DataKind::Observed)
            .unwrap();

        let rows = relation.observed_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].arguments(), ["a", "b"]);
        assert_eq!(rows[0].value(), None);
        assert_eq!(rows[1].arguments(), ["b", "c"]);
        assert_eq!(rows[1].value(), Some(0.0));
        assert!(!relation.has_unobserved_rows());
    }

    #[test]
    fn malformed_rows_are_rejected() {
        let mut relation = friends();

        assert!(matches!(
            relation.add_unobserved(vec!["a".to_string()]),
            Err(Error::RowArity { arity: 2, .. })
        ));
        assert!(matches!(
            relation.add_unobserved(vec!["a".into(), "b".into(), "1".into()]),
            Err(Error::RowArity { .. })
        ));
        assert!(matches!(
            relation.add_observed(vec!["a".into(), "b".into(), "yes".into()]),
            Err(Error::TruthValue { .. })
        ));
        assert_eq!(relation.atom_count(), 0);
    }

    #[test]
    fn configuration_checks() {
        assert!(matches!(
            Relation::new("Empty", 0),
            Err(Error::InvalidArity { .. })
        ));
        assert!(matches!(
            friends().with_negative_prior(1.5),
            Err(Error::InvalidPrior { .. })
        ));
        assert_eq!(
            friends().with_negative_prior(0.25).unwrap().negative_prior(),
            Some(0.25)
        );
    }

    #[test]
    fn load_tab_separated() {
        let mut relation = friends();
        let data = "alice\tbob\nbob\tcarol\t0.5\n";

        let count = relation
            .load_reader(data.as_bytes(), DataKind::Observed, DEFAULT_DELIMITER)
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(relation.observed_rows()[1].value(), Some(0.5));

        let count = relation
            .load_reader("carol\talice\n".as_bytes(), DataKind::Unobserved, DEFAULT_DELIMITER)
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(relation.unobserved_rows(), [vec!["carol", "alice"]]);
        assert_eq!(relation.atom_count(), 3);
        assert_eq!(relation.to_string(), "Friends/2");
    }
}
