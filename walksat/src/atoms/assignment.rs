//! This module defines [Assignment].

use super::VariableId;

/// Truth value of every variable of an [super::AtomTable]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Assignment {
    values: Vec<bool>,
}

impl Assignment {
    /// Return the value of `variable`.
    pub fn get(&self, variable: VariableId) -> bool {
        self.values[variable.index()]
    }

    /// Negate the value of `variable`.
    pub fn flip(&mut self, variable: VariableId) {
        let value = &mut self.values[variable.index()];
        *value = !*value;
    }

    /// Return the number of variables.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Return whether there are no variables.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Return the values in variable order.
    pub fn values(&self) -> &[bool] {
        &self.values
    }
}

impl From<Vec<bool>> for Assignment {
    fn from(values: Vec<bool>) -> Self {
        Self { values }
    }
}

impl FromIterator<bool> for Assignment {
    fn from_iter<T: IntoIterator<Item = bool>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
