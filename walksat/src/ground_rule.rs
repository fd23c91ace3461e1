//! This module defines [GroundRule], a compiled constraint over unobserved atoms.

use std::{fmt::Display, str::FromStr};

use crate::{
    atoms::{Assignment, VariableId},
    error::Error,
    grounding::{OPERATOR_DISJUNCTION, OPERATOR_EQUALITY},
};

/// Weight standing in for rules without a configured weight
pub const HARD_WEIGHT: f64 = 1000.0;

/// Operator of a ground rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOperator {
    /// At least one literal has to be true
    Disjunction,
    /// The weighted sum of the atoms has to equal the constant
    Equality,
}

impl FromStr for RuleOperator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            OPERATOR_DISJUNCTION => Ok(Self::Disjunction),
            OPERATOR_EQUALITY => Ok(Self::Equality),
            _ => Err(Error::UnsupportedOperator {
                operator: s.to_string(),
            }),
        }
    }
}

/// Possibly negated variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Literal {
    variable: VariableId,
    positive: bool,
}

impl Literal {
    /// Create a new [Literal].
    pub fn new(variable: VariableId, positive: bool) -> Self {
        Self { variable, positive }
    }

    /// Return the variable of this literal.
    pub fn variable(&self) -> VariableId {
        self.variable
    }

    /// Return whether this literal is not negated.
    pub fn is_positive(&self) -> bool {
        self.positive
    }

    /// Evaluate this literal.
    pub fn is_true(&self, assignment: &Assignment) -> bool {
        assignment.get(self.variable) == self.positive
    }
}

/// Constraint expressed by a [GroundRule]
#[derive(Debug, Clone, PartialEq)]
pub enum GroundRuleKind {
    /// Satisfied if any literal is true
    Disjunction(Vec<Literal>),
    /// Satisfied if the sum of `coefficient * value` over all terms
    /// equals the constant exactly
    Equality {
        /// Variables with their coefficients
        terms: Vec<(VariableId, f64)>,
        /// Right-hand side, with all observed atoms folded in
        constant: f64,
    },
}

/// Compiled ground rule
///
/// Violating a ground rule costs its full weight,
/// satisfying it costs nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundRule {
    rule_index: usize,
    weight: f64,
    kind: GroundRuleKind,
}

impl GroundRule {
    /// Create a new [GroundRule].
    pub fn new(rule_index: usize, weight: f64, kind: GroundRuleKind) -> Self {
        Self {
            rule_index,
            weight,
            kind,
        }
    }

    /// Return the index of the rule this was instantiated from.
    pub fn rule_index(&self) -> usize {
        self.rule_index
    }

    /// Return the weight of this rule.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Return the constraint of this rule.
    pub fn kind(&self) -> &GroundRuleKind {
        &self.kind
    }

    /// Return the number of variables in this rule.
    pub fn len(&self) -> usize {
        match &self.kind {
            GroundRuleKind::Disjunction(literals) => literals.len(),
            GroundRuleKind::Equality { terms, .. } => terms.len(),
        }
    }

    /// Return whether this rule mentions no variables.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the variable at the given position.
    pub fn variable(&self, position: usize) -> VariableId {
        match &self.kind {
            GroundRuleKind::Disjunction(literals) => literals[position].variable(),
            GroundRuleKind::Equality { terms, .. } => terms[position].0,
        }
    }

    /// Iterate over the variables of this rule in order.
    pub fn variables(&self) -> impl Iterator<Item = VariableId> + '_ {
        (0..self.len()).map(|position| self.variable(position))
    }

    /// Return whether the rule holds under `assignment`.
    pub fn is_satisfied(&self, assignment: &Assignment) -> bool {
        match &self.kind {
            GroundRuleKind::Disjunction(literals) => {
                literals.iter().any(|literal| literal.is_true(assignment))
            }
            GroundRuleKind::Equality { terms, constant } => {
                let sum: f64 = terms
                    .iter()
                    .filter(|(variable, _)| assignment.get(*variable))
                    .map(|(_, coefficient)| coefficient)
                    .sum();

                sum == *constant
            }
        }
    }

    /// Return the weighted loss of this rule under `assignment`.
    pub fn loss(&self, assignment: &Assignment) -> f64 {
        if self.is_satisfied(assignment) {
            0.0
        } else {
            self.weight
        }
    }
}

impl Display for GroundRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: ", self.weight)?;

        match &self.kind {
            GroundRuleKind::Disjunction(literals) => {
                for (position, literal) in literals.iter().enumerate() {
                    if position > 0 {
                        f.write_str(" | ")?;
                    }
                    if !literal.is_positive() {
                        f.write_str("!")?;
                    }
                    write!(f, "v{}", literal.variable().index())?;
                }
                Ok(())
            }
            GroundRuleKind::Equality { terms, constant } => {
                for (position, (variable, coefficient)) in terms.iter().enumerate() {
                    if position > 0 {
                        f.write_str(" + ")?;
                    }
                    write!(f, "{coefficient} * v{}", variable.index())?;
                }
                write!(f, " = {constant}")
            }
        }
    }
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::*;

    fn var(index: usize) -> VariableId {
        VariableId::new(index)
    }

    #[test]
    fn operator_tags() {
        assert_eq!(
            "disjunction".parse::<RuleOperator>().unwrap(),
            RuleOperator::Disjunction
        );
        assert_eq!(
            "equality".parse::<RuleOperator>().unwrap(),
            RuleOperator::Equality
        );

        // Short tags stem from grounders that negate atoms with coefficient 1.
        for tag in ["|", "=", "<="] {
            assert!(matches!(
                tag.parse::<RuleOperator>(),
                Err(Error::UnsupportedOperator { .. })
            ));
        }
    }

    #[test]
    fn disjunction_truth_table() {
        // A | !B
        let rule = GroundRule::new(
            0,
            2.5,
            GroundRuleKind::Disjunction(vec![
                Literal::new(var(0), true),
                Literal::new(var(1), false),
            ]),
        );

        let loss = |a: bool, b: bool| rule.loss(&Assignment::from(vec![a, b]));
        assert_eq!(loss(false, true), 2.5);
        assert_eq!(loss(true, false), 0.0);
        assert_eq!(loss(false, false), 0.0);
        assert_eq!(loss(true, true), 0.0);
    }

    #[test]
    fn equality_is_exact() {
        // X - Y = 0
        let rule = GroundRule::new(
            1,
            HARD_WEIGHT,
            GroundRuleKind::Equality {
                terms: vec![(var(0), 1.0), (var(1), -1.0)],
                constant: 0.0,
            },
        );

        assert_eq!(rule.loss(&Assignment::from(vec![true, true])), 0.0);
        assert_eq!(rule.loss(&Assignment::from(vec![false, false])), 0.0);
        assert_eq!(rule.loss(&Assignment::from(vec![true, false])), HARD_WEIGHT);
        assert_eq!(rule.loss(&Assignment::from(vec![false, true])), HARD_WEIGHT);
    }

    #[test]
    fn equality_with_folded_constant() {
        // X + Y + Z = 1, i.e. exactly one is true
        let rule = GroundRule::new(
            0,
            1.0,
            GroundRuleKind::Equality {
                terms: vec![(var(0), 1.0), (var(1), 1.0), (var(2), 1.0)],
                constant: 1.0,
            },
        );

        assert!(rule.is_satisfied(&Assignment::from(vec![false, true, false])));
        assert!(!rule.is_satisfied(&Assignment::from(vec![true, true, false])));
        assert!(!rule.is_satisfied(&Assignment::from(vec![false, false, false])));
        assert_eq!(rule.variables().collect::<Vec<_>>(), [var(0), var(1), var(2)]);
    }

    #[test]
    fn display() {
        let rule = GroundRule::new(
            0,
            1.0,
            GroundRuleKind::Disjunction(vec![
                Literal::new(var(3), false),
                Literal::new(var(5), true),
            ]),
        );
        assert_eq!(rule.to_string(), "1: !v3 | v5");
    }
}
