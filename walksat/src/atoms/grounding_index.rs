//! This module defines [AtomGroundingIndex].

use super::VariableId;

/// For each variable, the ground rules it occurs in
#[derive(Debug, Clone, Default)]
pub struct AtomGroundingIndex {
    rules: Vec<Vec<usize>>,
}

impl AtomGroundingIndex {
    /// Create an empty index over `variable_count` variables.
    pub fn new(variable_count: usize) -> Self {
        Self {
            rules: vec![Vec::new(); variable_count],
        }
    }

    /// Record that `variable` occurs in the ground rule with index `rule`.
    ///
    /// Rules are expected in ascending order; a rule mentioning the
    /// same variable twice is recorded once.
    pub fn insert(&mut self, variable: VariableId, rule: usize) {
        let rules = &mut self.rules[variable.index()];
        if rules.last() != Some(&rule) {
            rules.push(rule);
        }
    }

    /// Return the indices of the ground rules `variable` occurs in.
    pub fn rules(&self, variable: VariableId) -> &[usize] {
        &self.rules[variable.index()]
    }

    /// Return the number of variables that occur in at least one ground rule.
    pub fn grounded_variable_count(&self) -> usize {
        self.rules.iter().filter(|rules| !rules.is_empty()).count()
    }
}
