//! This module defines [MaxWalkSat], a single attempt of the local search.
//!
//! Each flip first picks a violated ground rule uniformly at random.
//! With probability `noise` a random variable of that rule is flipped,
//! otherwise the variable whose flip reduces the loss of its incident rules the most.

use rand::Rng;

use crate::{
    atoms::{Assignment, VariableId},
    compiler::CompiledProgram,
};

/// Number of flips between two progress messages
pub const LOG_MOD: usize = 50;

/// Result of a single search attempt
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    /// Number of this attempt, starting at 1
    pub attempt: usize,
    /// The final assignment
    pub assignment: Assignment,
    /// Total loss of the final assignment
    pub loss: f64,
    /// Number of flips performed
    pub flips: usize,
}

/// One run of MaxWalkSat
#[derive(Debug, Clone, Copy)]
pub struct MaxWalkSat<'a> {
    program: &'a CompiledProgram,
    noise: f64,
    max_flips: usize,
}

impl<'a> MaxWalkSat<'a> {
    /// Create a new [MaxWalkSat] search over `program`.
    pub fn new(program: &'a CompiledProgram, noise: f64, max_flips: usize) -> Self {
        Self {
            program,
            noise,
            max_flips,
        }
    }

    /// Draw the initial value of every variable.
    ///
    /// Variables with a negative prior start out true with that probability,
    /// all others are true with probability one half.
    pub fn initial_assignment<R: Rng + ?Sized>(&self, rng: &mut R) -> Assignment {
        self.program
            .atoms()
            .variables()
            .map(|(_, variable)| match variable.negative_prior() {
                Some(prior) => rng.gen::<f64>() < prior,
                None => rng.gen(),
            })
            .collect()
    }

    /// Run the search until all rules are satisfied or the flip budget is used up.
    pub fn run<R: Rng + ?Sized>(&self, attempt: usize, rng: &mut R) -> Attempt {
        let rules = self.program.rules();
        let mut walk = Walk::new(self.program, self.initial_assignment(rng));

        log::debug!(
            "attempt {attempt}, iteration 0, loss {}, max flips {}",
            walk.total_loss,
            self.max_flips
        );

        let mut flips = 0;
        while walk.total_loss > 0.0 && flips < self.max_flips {
            flips += 1;

            // Positive total loss guarantees a violated rule exists.
            let rule = loop {
                let candidate = rng.gen_range(0..rules.len());
                if walk.losses[candidate] > 0.0 {
                    break &rules[candidate];
                }
            };

            let variable = if rng.gen::<f64>() < self.noise {
                Some(rule.variable(rng.gen_range(0..rule.len())))
            } else {
                walk.best_variable(rule.variables())
            };

            if let Some(variable) = variable {
                walk.flip(variable);
            }

            if flips % LOG_MOD == 0 {
                log::debug!(
                    "attempt {attempt}, iteration {flips}, loss {}",
                    walk.total_loss
                );
            }
        }

        if walk.total_loss == 0.0 {
            log::debug!("attempt {attempt}: full satisfaction found");
        }

        log::info!(
            "attempt {attempt} complete, iteration {flips}, loss {}",
            walk.total_loss
        );

        Attempt {
            attempt,
            assignment: walk.assignment,
            loss: walk.total_loss,
            flips,
        }
    }
}

/// State of an ongoing search attempt
#[derive(Debug)]
struct Walk<'a> {
    program: &'a CompiledProgram,
    assignment: Assignment,
    /// Current weighted loss of each rule
    losses: Vec<f64>,
    /// Sum of `losses` in rule order
    total_loss: f64,
}

impl<'a> Walk<'a> {
    fn new(program: &'a CompiledProgram, assignment: Assignment) -> Self {
        let losses: Vec<f64> = program
            .rules()
            .iter()
            .map(|rule| rule.loss(&assignment))
            .collect();
        let total_loss = losses.iter().sum();

        Self {
            program,
            assignment,
            losses,
            total_loss,
        }
    }

    /// Return the variable whose flip reduces the loss of its rules the most.
    ///
    /// On ties the earliest variable wins. A variable is returned
    /// even if no flip reduces the loss.
    fn best_variable(&mut self, variables: impl Iterator<Item = VariableId>) -> Option<VariableId> {
        let mut best: Option<(VariableId, f64)> = None;

        for variable in variables {
            let gain = self.flip_gain(variable);
            if best.map_or(true, |(_, best_gain)| gain > best_gain) {
                best = Some((variable, gain));
            }
        }

        best.map(|(variable, _)| variable)
    }

    /// Return by how much flipping `variable` would reduce the loss of its rules.
    fn flip_gain(&mut self, variable: VariableId) -> f64 {
        let program = self.program;
        let rules = program.rules();
        let incident = program.grounding_index().rules(variable);

        let before: f64 = incident.iter().map(|&rule| self.losses[rule]).sum();
        self.assignment.flip(variable);
        let after: f64 = incident
            .iter()
            .map(|&rule| rules[rule].loss(&self.assignment))
            .sum();
        self.assignment.flip(variable);

        before - after
    }

    fn flip(&mut self, variable: VariableId) {
        let program = self.program;
        let rules = program.rules();

        self.assignment.flip(variable);
        for &rule in program.grounding_index().rules(variable) {
            self.losses[rule] = rules[rule].loss(&self.assignment);
        }

        self.total_loss = self.losses.iter().sum();
        debug_assert_eq!(self.total_loss, self.program.total_loss(&self.assignment));
    }
}

#[cfg(test)]
mod test {
    use quickcheck_macros::quickcheck;
    use rand::SeedableRng;
    use test_log::test;

    use super::*;
    use crate::{
        compiler::GroundRuleCompiler,
        grounding::RawGroundRule,
        relation::{DataKind, Relation},
        search::SearchRng,
    };

    /// A single relation with `count` unobserved atoms.
    fn program(count: usize, prior: Option<f64>, raw_rules: Vec<RawGroundRule>) -> CompiledProgram {
        let mut relation = Relation::new("Atom", 1).unwrap();
        if let Some(prior) = prior {
            relation = relation.with_negative_prior(prior).unwrap();
        }
        relation
            .add_rows((0..count).map(|i| [i.to_string()]), DataKind::Unobserved)
            .unwrap();

        let rule_count = raw_rules
            .iter()
            .map(|rule| rule.rule_index + 1)
            .max()
            .unwrap_or(0);

        GroundRuleCompiler::new(&[relation], rule_count, None)
            .unwrap()
            .compile(raw_rules)
            .unwrap()
    }

    #[test]
    fn single_disjunction_is_satisfied() {
        // A | B
        let program = program(
            2,
            None,
            vec![RawGroundRule::disjunction(0, vec![0, 1], vec![1.0, 1.0])],
        );

        let mut rng = SearchRng::seed_from_u64(4);
        let attempt = MaxWalkSat::new(&program, 0.05, 100).run(1, &mut rng);

        assert_eq!(attempt.loss, 0.0);
        let values = attempt.assignment.values();
        assert!(values[0] || values[1]);
        assert!(attempt.flips <= 1);
    }

    #[test]
    fn same_seed_same_result() {
        // A chain of implications with a contradiction at the end.
        let mut raw_rules: Vec<_> = (0..9)
            .map(|i| RawGroundRule::disjunction(0, vec![i, i + 1], vec![-1.0, 1.0]))
            .collect();
        raw_rules.push(RawGroundRule::disjunction(0, vec![0], vec![1.0]));
        raw_rules.push(RawGroundRule::disjunction(0, vec![9], vec![-1.0]));
        let program = program(10, None, raw_rules);
        let search = MaxWalkSat::new(&program, 0.3, 200);

        let first = search.run(1, &mut SearchRng::seed_from_u64(17));
        let second = search.run(1, &mut SearchRng::seed_from_u64(17));

        assert_eq!(first, second);
        assert!(first.loss > 0.0);
        assert_eq!(first.flips, 200);
        assert_eq!(first.loss, program.total_loss(&first.assignment));
    }

    #[test]
    fn greedy_step_prefers_earliest_on_ties() {
        // A | B with both false: flipping either satisfies the rule.
        let program = program(
            2,
            Some(0.0),
            vec![RawGroundRule::disjunction(0, vec![0, 1], vec![1.0, 1.0])],
        );
        let search = MaxWalkSat::new(&program, 0.0, 10);

        let attempt = search.run(1, &mut SearchRng::seed_from_u64(0));
        assert_eq!(attempt.flips, 1);
        assert_eq!(attempt.assignment.values(), [true, false]);
    }

    #[test]
    fn greedy_step_maximizes_gain() {
        // A | B, !A, B | C with a prior that makes everything false initially.
        // Flipping B satisfies the first rule without breaking the second.
        let program = program(
            3,
            Some(0.0),
            vec![
                RawGroundRule::disjunction(0, vec![0, 1], vec![1.0, 1.0]),
                RawGroundRule::disjunction(0, vec![0], vec![-1.0]),
                RawGroundRule::disjunction(0, vec![1, 2], vec![1.0, 1.0]),
            ],
        );
        let search = MaxWalkSat::new(&program, 0.0, 10);

        let attempt = search.run(1, &mut SearchRng::seed_from_u64(3));
        assert_eq!(attempt.loss, 0.0);
        assert_eq!(attempt.flips, 1);
        assert_eq!(attempt.assignment.values(), [false, true, false]);
    }

    #[test]
    fn negative_prior_biases_initialization() {
        let always = program(50, Some(1.0), vec![]);
        let never = program(50, Some(0.0), vec![]);
        let mut rng = SearchRng::seed_from_u64(9);

        let search = MaxWalkSat::new(&always, 0.5, 10);
        assert!(search.initial_assignment(&mut rng).values().iter().all(|&value| value));

        let search = MaxWalkSat::new(&never, 0.5, 10);
        assert!(search.initial_assignment(&mut rng).values().iter().all(|&value| !value));
    }

    #[test]
    fn empty_program() {
        let program = program(3, None, vec![]);
        let attempt = MaxWalkSat::new(&program, 0.1, 100).run(1, &mut SearchRng::seed_from_u64(1));

        assert_eq!(attempt.loss, 0.0);
        assert_eq!(attempt.flips, 0);
        assert_eq!(attempt.assignment.len(), 3);
    }

    #[quickcheck]
    fn reported_loss_matches_recomputation(seed: u64, noise: u8, flips: u8) -> bool {
        // Mutually exclusive pairs and an exactly-two constraint over five atoms.
        let mut raw_rules: Vec<_> = (0..4)
            .map(|i| RawGroundRule::disjunction(0, vec![i, i + 1], vec![-1.0, -1.0]))
            .collect();
        raw_rules.push(RawGroundRule::equality(
            1,
            vec![0, 1, 2, 3, 4],
            vec![1.0; 5],
            2.0,
        ));
        raw_rules.push(RawGroundRule::disjunction(0, vec![0, 4], vec![1.0, 1.0]));
        let program = program(5, None, raw_rules);

        let noise = f64::from(noise) / f64::from(u8::MAX);
        let attempt = MaxWalkSat::new(&program, noise, usize::from(flips))
            .run(1, &mut SearchRng::seed_from_u64(seed));

        attempt.loss == program.total_loss(&attempt.assignment)
            && attempt.flips <= usize::from(flips)
    }
}
