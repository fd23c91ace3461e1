//! This module defines [AtomTable].

use std::ops::Range;

use crate::{
    error::Error,
    relation::{DataKind, Relation},
};

/// Dense index of an unobserved atom
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VariableId(usize);

impl VariableId {
    /// Create a [VariableId] from its position in the [AtomTable].
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the position of this variable in the [AtomTable].
    pub fn index(self) -> usize {
        self.0
    }
}

/// Entry of the [AtomTable]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Atom {
    /// Atom with a known truth value;
    /// `None` if the row did not carry an explicit value
    Observed(Option<f64>),
    /// Atom whose truth value is searched for
    Unobserved(VariableId),
}

/// Unobserved atom together with where it came from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Variable {
    relation: usize,
    row: usize,
    negative_prior: Option<f64>,
}

impl Variable {
    /// Index of the owning relation in declaration order.
    pub fn relation(&self) -> usize {
        self.relation
    }

    /// Index of the row within the unobserved rows of the owning relation.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Negative prior of the owning relation.
    pub fn negative_prior(&self) -> Option<f64> {
        self.negative_prior
    }
}

/// Arena of all ground atoms
///
/// Atoms are addressed by a flat index that enumerates,
/// for each relation in declaration order, first its observed rows
/// and then its unobserved rows. This is the addressing external grounders use.
/// Unobserved atoms additionally receive a dense [VariableId]
/// in the same order, so the variables of one relation form a contiguous range.
#[derive(Debug, Clone, Default)]
pub struct AtomTable {
    atoms: Vec<Atom>,
    variables: Vec<Variable>,
    /// First flat index of each relation
    relation_offsets: Vec<usize>,
    /// Variables of each relation
    relation_variables: Vec<Range<usize>>,
}

impl AtomTable {
    /// Build the atom table for the given relations.
    pub fn new(relations: &[Relation]) -> Self {
        let mut table = Self::default();

        for (relation_index, relation) in relations.iter().enumerate() {
            table.relation_offsets.push(table.atoms.len());

            table.atoms.extend(
                relation
                    .observed_rows()
                    .iter()
                    .map(|row| Atom::Observed(row.value())),
            );

            let first_variable = table.variables.len();
            for row in 0..relation.unobserved_rows().len() {
                table
                    .atoms
                    .push(Atom::Unobserved(VariableId(table.variables.len())));
                table.variables.push(Variable {
                    relation: relation_index,
                    row,
                    negative_prior: relation.negative_prior(),
                });
            }

            table
                .relation_variables
                .push(first_variable..table.variables.len());
        }

        log::debug!(
            "atom table: {} atoms, {} unobserved",
            table.atoms.len(),
            table.variables.len()
        );

        table
    }

    /// Return the total number of atoms.
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    /// Return whether the table contains no atoms.
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Look up the atom with the given flat index.
    pub fn resolve(&self, index: usize) -> Result<Atom, Error> {
        self.atoms.get(index).copied().ok_or(Error::UnknownAtom {
            index,
            count: self.atoms.len(),
        })
    }

    /// Return the flat index of a row, if it exists.
    pub fn flat_index(&self, relation: usize, kind: DataKind, row: usize) -> Option<usize> {
        let offset = *self.relation_offsets.get(relation)?;
        let variables = self.relation_variables.get(relation)?;
        let end = self
            .relation_offsets
            .get(relation + 1)
            .copied()
            .unwrap_or(self.atoms.len());
        let observed = end - offset - variables.len();

        match kind {
            DataKind::Observed => (row < observed).then_some(offset + row),
            DataKind::Unobserved => (row < variables.len()).then_some(offset + observed + row),
        }
    }

    /// Return the number of unobserved atoms.
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Return information about the given variable.
    pub fn variable(&self, id: VariableId) -> &Variable {
        &self.variables[id.0]
    }

    /// Iterate over all variables in table order.
    pub fn variables(&self) -> impl Iterator<Item = (VariableId, &Variable)> {
        self.variables
            .iter()
            .enumerate()
            .map(|(index, variable)| (VariableId(index), variable))
    }

    /// Iterate over the variables of the given relation in row order.
    pub fn relation_variables(&self, relation: usize) -> impl Iterator<Item = VariableId> {
        self.relation_variables
            .get(relation)
            .cloned()
            .unwrap_or_default()
            .map(VariableId)
    }
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::*;

    fn relations() -> Vec<Relation> {
        let mut friends = Relation::new("Friends", 2).unwrap();
        friends
            .add_rows([["a", "b"], ["b", "a"]], DataKind::Observed)
            .unwrap();

        let mut smokes = Relation::new("Smokes", 1)
            .unwrap()
            .with_negative_prior(0.1)
            .unwrap();
        smokes
            .add_rows([vec!["a", "0"]], DataKind::Observed)
            .unwrap();
        smokes
            .add_rows([["b"], ["c"]], DataKind::Unobserved)
            .unwrap();

        let mut cancer = Relation::new("Cancer", 1).unwrap();
        cancer.add_rows([["a"]], DataKind::Unobserved).unwrap();

        vec![friends, smokes, cancer]
    }

    #[test]
    fn flat_layout() {
        let table = AtomTable::new(&relations());

        assert_eq!(table.len(), 6);
        assert_eq!(table.variable_count(), 3);
        assert_eq!(table.resolve(0).unwrap(), Atom::Observed(None));
        assert_eq!(table.resolve(2).unwrap(), Atom::Observed(Some(0.0)));
        assert_eq!(
            table.resolve(3).unwrap(),
            Atom::Unobserved(VariableId::new(0))
        );
        assert_eq!(
            table.resolve(5).unwrap(),
            Atom::Unobserved(VariableId::new(2))
        );
        assert!(matches!(
            table.resolve(6),
            Err(Error::UnknownAtom { index: 6, count: 6 })
        ));
    }

    #[test]
    fn flat_index_is_a_bijection() {
        let relations = relations();
        let table = AtomTable::new(&relations);

        let mut seen = Vec::new();
        for (relation_index, relation) in relations.iter().enumerate() {
            for row in 0..relation.observed_rows().len() {
                seen.push(table.flat_index(relation_index, DataKind::Observed, row).unwrap());
            }
            for row in 0..relation.unobserved_rows().len() {
                seen.push(
                    table
                        .flat_index(relation_index, DataKind::Unobserved, row)
                        .unwrap(),
                );
            }
        }

        assert_eq!(seen, (0..table.len()).collect::<Vec<_>>());
        assert_eq!(table.flat_index(0, DataKind::Unobserved, 0), None);
        assert_eq!(table.flat_index(3, DataKind::Observed, 0), None);
    }

    #[test]
    fn variables_per_relation() {
        let table = AtomTable::new(&relations());

        assert_eq!(table.relation_variables(0).count(), 0);
        assert_eq!(
            table.relation_variables(1).collect::<Vec<_>>(),
            vec![VariableId::new(0), VariableId::new(1)]
        );
        assert_eq!(
            table.relation_variables(2).collect::<Vec<_>>(),
            vec![VariableId::new(2)]
        );

        let variable = table.variable(VariableId::new(1));
        assert_eq!(variable.relation(), 1);
        assert_eq!(variable.row(), 1);
        assert_eq!(variable.negative_prior(), Some(0.1));
        assert_eq!(table.variable(VariableId::new(2)).negative_prior(), None);
    }
}
