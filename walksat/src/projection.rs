//! This module maps assignments back to the rows of the relations.

use crate::{
    atoms::{Assignment, AtomTable},
    relation::Relation,
};

/// Unobserved row together with its inferred truth value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    arguments: Vec<String>,
    value: bool,
}

impl ResultRow {
    /// Create a new [ResultRow].
    pub fn new(arguments: Vec<String>, value: bool) -> Self {
        Self { arguments, value }
    }

    /// Return the argument columns.
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Return the inferred truth value.
    pub fn value(&self) -> bool {
        self.value
    }

    /// Return the row as columns, with the value as trailing `1` or `0`.
    pub fn to_record(&self) -> Vec<String> {
        let value = if self.value { "1" } else { "0" };
        self.arguments
            .iter()
            .cloned()
            .chain(std::iter::once(value.to_string()))
            .collect()
    }
}

/// Inferred rows of one relation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationResults {
    name: String,
    rows: Vec<ResultRow>,
}

impl RelationResults {
    /// Create a new [RelationResults].
    pub fn new(name: impl Into<String>, rows: Vec<ResultRow>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Return the name of the relation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the inferred rows in the order of the unobserved rows.
    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }
}

/// Inferred rows of every relation that has unobserved rows,
/// in relation declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InferenceResults {
    relations: Vec<RelationResults>,
}

impl InferenceResults {
    /// Add the results of one relation.
    pub fn push(&mut self, results: RelationResults) {
        self.relations.push(results);
    }

    /// Return the rows inferred for the relation called `name`.
    pub fn get(&self, name: &str) -> Option<&[ResultRow]> {
        self.relations
            .iter()
            .find(|results| results.name == name)
            .map(|results| results.rows())
    }

    /// Iterate over the results of all relations.
    pub fn iter(&self) -> impl Iterator<Item = &RelationResults> {
        self.relations.iter()
    }

    /// Return the number of relations with results.
    pub fn len(&self) -> usize {
        self.relations.len()
    }

    /// Return whether no relation has results.
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}

/// Projects an [Assignment] onto the unobserved rows of the relations
#[derive(Debug, Clone, Copy)]
pub struct ResultProjector<'a> {
    relations: &'a [Relation],
    atoms: &'a AtomTable,
}

impl<'a> ResultProjector<'a> {
    /// Create a projector for `relations`, whose variables are laid out in `atoms`.
    pub fn new(relations: &'a [Relation], atoms: &'a AtomTable) -> Self {
        Self { relations, atoms }
    }

    /// Build the result rows for `assignment`.
    pub fn project(&self, assignment: &Assignment) -> InferenceResults {
        let mut results = InferenceResults::default();

        for (index, relation) in self.relations.iter().enumerate() {
            if !relation.has_unobserved_rows() {
                continue;
            }

            let rows = relation
                .unobserved_rows()
                .iter()
                .zip(self.atoms.relation_variables(index))
                .map(|(row, variable)| ResultRow::new(row.clone(), assignment.get(variable)))
                .collect();

            results.push(RelationResults::new(relation.name(), rows));
        }

        results
    }
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::*;
    use crate::relation::DataKind;

    #[test]
    fn project_in_declaration_order() {
        let mut friends = Relation::new("Friends", 2).unwrap();
        friends.add_rows([["a", "b"]], DataKind::Observed).unwrap();

        let mut smokes = Relation::new("Smokes", 1).unwrap();
        smokes.add_rows([["a"]], DataKind::Observed).unwrap();
        smokes
            .add_rows([["b"], ["c"]], DataKind::Unobserved)
            .unwrap();

        let mut cancer = Relation::new("Cancer", 1).unwrap();
        cancer.add_rows([["c"]], DataKind::Unobserved).unwrap();

        let relations = vec![friends, smokes, cancer];
        let atoms = AtomTable::new(&relations);
        let assignment = Assignment::from(vec![true, false, true]);

        let results = ResultProjector::new(&relations, &atoms).project(&assignment);

        assert_eq!(results.len(), 2);
        assert!(results.get("Friends").is_none());
        assert_eq!(
            results.get("Smokes").unwrap(),
            [
                ResultRow::new(vec!["b".to_string()], true),
                ResultRow::new(vec!["c".to_string()], false),
            ]
        );
        assert_eq!(
            results.get("Cancer").unwrap()[0].to_record(),
            ["c", "1"]
        );
        assert_eq!(
            results.iter().map(RelationResults::name).collect::<Vec<_>>(),
            ["Smokes", "Cancer"]
        );
    }
}
