//! This module defines [GroundRuleCompiler],
//! which folds raw ground rules against the observed data.

use crate::{
    atoms::{Assignment, Atom, AtomGroundingIndex, AtomTable, VariableId},
    error::Error,
    ground_rule::{GroundRule, GroundRuleKind, Literal, RuleOperator, HARD_WEIGHT},
    grounding::RawGroundRule,
    relation::Relation,
};

/// Weight of every rule if no weights are configured
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Counts collected while compiling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompilationStatistics {
    /// Number of raw ground rules received
    pub raw: usize,
    /// Number of rules dropped because an observed atom satisfies them
    pub trivial: usize,
    /// Number of rules dropped because they contain no unobserved atom
    pub constant: usize,
}

/// Result of compiling a single raw ground rule
#[derive(Debug)]
enum Compiled {
    /// Rule that depends on unobserved atoms
    Rule(GroundRule),
    /// Rule that always holds
    Trivial,
    /// Rule without unobserved atoms that never holds
    Violated,
}

/// Ground rules over the unobserved atoms, ready for search
#[derive(Debug, Clone)]
pub struct CompiledProgram {
    atoms: AtomTable,
    rules: Vec<GroundRule>,
    grounding_index: AtomGroundingIndex,
    constant_loss: f64,
    statistics: CompilationStatistics,
}

impl CompiledProgram {
    /// Return the atom table the rules refer to.
    pub fn atoms(&self) -> &AtomTable {
        &self.atoms
    }

    /// Return the compiled ground rules.
    pub fn rules(&self) -> &[GroundRule] {
        &self.rules
    }

    /// Return the index from variables to the rules they occur in.
    pub fn grounding_index(&self) -> &AtomGroundingIndex {
        &self.grounding_index
    }

    /// Return the negative prior of `variable`.
    pub fn negative_prior(&self, variable: VariableId) -> Option<f64> {
        self.atoms.variable(variable).negative_prior()
    }

    /// Return the summed weight of dropped rules that no assignment can satisfy.
    pub fn constant_loss(&self) -> f64 {
        self.constant_loss
    }

    /// Return the counts collected while compiling.
    pub fn statistics(&self) -> CompilationStatistics {
        self.statistics
    }

    /// Compute the total loss of `assignment` from scratch.
    pub fn total_loss(&self, assignment: &Assignment) -> f64 {
        self.rules.iter().map(|rule| rule.loss(assignment)).sum()
    }
}

/// Compiles raw ground rules into [GroundRule]s over unobserved atoms
///
/// Observed atoms are replaced by their truth value and folded into the constant.
/// Disjunctions that an observed atom already satisfies are dropped.
#[derive(Debug)]
pub struct GroundRuleCompiler {
    atoms: AtomTable,
    weights: Vec<f64>,
}

impl GroundRuleCompiler {
    /// Create a compiler for `rule_count` rules over `relations`.
    ///
    /// Without `weights` every rule weighs [DEFAULT_WEIGHT].
    /// Otherwise there has to be one entry per rule,
    /// where `None` marks a hard rule weighing [HARD_WEIGHT].
    pub fn new(
        relations: &[Relation],
        rule_count: usize,
        weights: Option<&[Option<f64>]>,
    ) -> Result<Self, Error> {
        let weights = match weights {
            None | Some([]) => vec![DEFAULT_WEIGHT; rule_count],
            Some(weights) => Self::resolve_weights(rule_count, weights)?,
        };

        Ok(Self {
            atoms: AtomTable::new(relations),
            weights,
        })
    }

    fn resolve_weights(rule_count: usize, weights: &[Option<f64>]) -> Result<Vec<f64>, Error> {
        if weights.len() != rule_count {
            return Err(Error::WeightCount {
                rules: rule_count,
                weights: weights.len(),
            });
        }

        weights
            .iter()
            .enumerate()
            .map(|(rule, weight)| match weight {
                None => Ok(HARD_WEIGHT),
                Some(weight) if weight.is_finite() && *weight >= 0.0 => Ok(*weight),
                Some(weight) => Err(Error::InvalidWeight {
                    rule,
                    weight: *weight,
                }),
            })
            .collect()
    }

    /// Return the atom table built from the relations.
    pub fn atoms(&self) -> &AtomTable {
        &self.atoms
    }

    /// Compile all `raw_rules`.
    ///
    /// Fails on the first malformed raw ground rule.
    pub fn compile<Rules>(self, raw_rules: Rules) -> Result<CompiledProgram, Error>
    where
        Rules: IntoIterator<Item = RawGroundRule>,
    {
        let mut rules = Vec::new();
        let mut grounding_index = AtomGroundingIndex::new(self.atoms.variable_count());
        let mut constant_loss = 0.0;
        let mut statistics = CompilationStatistics::default();

        for raw_rule in raw_rules {
            statistics.raw += 1;

            match self.compile_rule(&raw_rule)? {
                Compiled::Rule(rule) => {
                    log::trace!("ground rule {}: {rule}", rules.len());

                    for variable in rule.variables() {
                        grounding_index.insert(variable, rules.len());
                    }
                    rules.push(rule);
                }
                Compiled::Trivial => statistics.trivial += 1,
                Compiled::Violated => {
                    log::warn!(
                        "ground rule of rule {} is violated by observed atoms alone",
                        raw_rule.rule_index
                    );

                    statistics.constant += 1;
                    constant_loss += self.weights[raw_rule.rule_index];
                }
            }
        }

        log::info!(
            "compiled {} ground rules over {} variables ({} trivial, {} constant dropped)",
            rules.len(),
            grounding_index.grounded_variable_count(),
            statistics.trivial,
            statistics.constant,
        );

        Ok(CompiledProgram {
            atoms: self.atoms,
            rules,
            grounding_index,
            constant_loss,
            statistics,
        })
    }

    fn compile_rule(&self, raw_rule: &RawGroundRule) -> Result<Compiled, Error> {
        let operator: RuleOperator = raw_rule.operator.parse()?;

        if raw_rule.atoms.len() != raw_rule.coefficients.len() {
            return Err(Error::CoefficientCount {
                atoms: raw_rule.atoms.len(),
                coefficients: raw_rule.coefficients.len(),
            });
        }

        let weight = *self
            .weights
            .get(raw_rule.rule_index)
            .ok_or(Error::UnknownRule {
                index: raw_rule.rule_index,
                count: self.weights.len(),
            })?;

        let pairs = raw_rule.atoms.iter().zip(&raw_rule.coefficients);

        let kind = match operator {
            RuleOperator::Disjunction => {
                let mut literals = Vec::new();
                let mut trivial = false;

                for (&atom, &coefficient) in pairs {
                    let positive = if coefficient == 1.0 {
                        true
                    } else if coefficient == -1.0 {
                        false
                    } else {
                        return Err(Error::DisjunctionCoefficient { coefficient });
                    };

                    match self.atoms.resolve(atom)? {
                        Atom::Observed(value) => {
                            trivial |= (value.unwrap_or(1.0) > 0.0) == positive;
                        }
                        Atom::Unobserved(variable) => {
                            literals.push(Literal::new(variable, positive))
                        }
                    }
                }

                if trivial {
                    return Ok(Compiled::Trivial);
                }
                if literals.is_empty() {
                    return Ok(Compiled::Violated);
                }

                GroundRuleKind::Disjunction(literals)
            }
            RuleOperator::Equality => {
                let mut terms = Vec::new();
                let mut constant = raw_rule.constant;

                for (&atom, &coefficient) in pairs {
                    match self.atoms.resolve(atom)? {
                        Atom::Observed(value) => constant -= coefficient * value.unwrap_or(1.0),
                        Atom::Unobserved(variable) => terms.push((variable, coefficient)),
                    }
                }

                if terms.is_empty() {
                    return Ok(if constant == 0.0 {
                        Compiled::Trivial
                    } else {
                        Compiled::Violated
                    });
                }

                GroundRuleKind::Equality { terms, constant }
            }
        };

        Ok(Compiled::Rule(GroundRule::new(
            raw_rule.rule_index,
            weight,
            kind,
        )))
    }
}
