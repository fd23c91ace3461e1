//! This module defines [InferenceEngine] and its implementations.

use rand::{Rng, SeedableRng};

use crate::{
    atoms::{Assignment, AtomTable},
    compiler::{CompiledProgram, GroundRuleCompiler},
    error::Error,
    grounding::{Grounder, Rule},
    projection::{InferenceResults, ResultProjector},
    relation::Relation,
    search::{resolve_seed, MultiTrySearch, SearchOutcome, SearchParameters, SearchRng},
};

/// Common interface of engines inferring the unobserved rows of relations
pub trait InferenceEngine: std::fmt::Debug {
    /// Infer a truth value for every unobserved row.
    fn solve(&self, parameters: &SearchParameters) -> Result<InferenceResults, Error>;
}

/// Markov logic network with MaxWalkSat inference
#[derive(Debug)]
pub struct MlnEngine<G> {
    relations: Vec<Relation>,
    rules: Vec<Rule>,
    weights: Option<Vec<Option<f64>>>,
    grounder: G,
}

impl<G: Grounder> MlnEngine<G> {
    /// Create a new [MlnEngine].
    ///
    /// If given, `weights` holds one entry per rule, `None` marking hard rules.
    /// Without weights every rule weighs one.
    pub fn new(
        relations: Vec<Relation>,
        rules: Vec<Rule>,
        weights: Option<Vec<Option<f64>>>,
        grounder: G,
    ) -> Self {
        Self {
            relations,
            rules,
            weights,
            grounder,
        }
    }

    /// Return the relations.
    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// Return the rules.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Ground the rules and compile the result.
    pub fn compile(&self) -> Result<CompiledProgram, Error> {
        let compiler =
            GroundRuleCompiler::new(&self.relations, self.rules.len(), self.weights.as_deref())?;
        let raw_rules = self.grounder.ground(&self.relations, &self.rules)?;

        compiler.compile(raw_rules)
    }

    /// Infer the unobserved rows and also return details on the search.
    pub fn solve_with_outcome(
        &self,
        parameters: &SearchParameters,
    ) -> Result<(InferenceResults, SearchOutcome), Error> {
        parameters.validate()?;

        let program = self.compile()?;
        log::info!(
            "Building an MLN with {} ground rules and {} variables",
            program.rules().len(),
            program.atoms().variable_count()
        );

        let outcome = MultiTrySearch::new(&program, *parameters)?.run();
        if program.constant_loss() > 0.0 {
            log::info!(
                "ground rules violated by observations alone add {} to the loss",
                program.constant_loss()
            );
        }

        let results =
            ResultProjector::new(&self.relations, program.atoms()).project(&outcome.assignment);

        Ok((results, outcome))
    }
}

impl<G: Grounder> InferenceEngine for MlnEngine<G> {
    fn solve(&self, parameters: &SearchParameters) -> Result<InferenceResults, Error> {
        self.solve_with_outcome(parameters)
            .map(|(results, _)| results)
    }
}

/// Baseline engine assigning uniformly random truth values
#[derive(Debug)]
pub struct RandomEngine {
    relations: Vec<Relation>,
}

impl RandomEngine {
    /// Create a new [RandomEngine].
    pub fn new(relations: Vec<Relation>) -> Self {
        Self { relations }
    }
}

impl InferenceEngine for RandomEngine {
    fn solve(&self, parameters: &SearchParameters) -> Result<InferenceResults, Error> {
        let seed = resolve_seed(parameters.seed);
        log::info!("random assignment with seed {seed}");

        let mut rng = SearchRng::seed_from_u64(seed);
        let atoms = AtomTable::new(&self.relations);
        let assignment: Assignment = (0..atoms.variable_count()).map(|_| rng.gen()).collect();

        Ok(ResultProjector::new(&self.relations, &atoms).project(&assignment))
    }
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::*;
    use crate::{grounding::RawGroundRule, relation::DataKind};

    fn relations() -> Vec<Relation> {
        let mut smokes = Relation::new("Smokes", 1).unwrap();
        smokes.add_rows([["a"]], DataKind::Observed).unwrap();
        smokes.add_rows([["b"]], DataKind::Unobserved).unwrap();

        let mut cancer = Relation::new("Cancer", 1).unwrap();
        cancer
            .add_rows([["a"], ["b"]], DataKind::Unobserved)
            .unwrap();

        vec![smokes, cancer]
    }

    fn engine(weights: Option<Vec<Option<f64>>>) -> MlnEngine<Vec<RawGroundRule>> {
        // Smokes(X) -> Cancer(X)
        let ground_rules = vec![
            RawGroundRule::disjunction(0, vec![0, 2], vec![-1.0, 1.0]),
            RawGroundRule::disjunction(0, vec![1, 3], vec![-1.0, 1.0]),
        ];

        MlnEngine::new(
            relations(),
            vec![Rule::new("Smokes(X) -> Cancer(X)")],
            weights,
            ground_rules,
        )
    }

    #[test]
    fn implication_is_enforced() {
        let parameters = SearchParameters::default().with_seed(5);
        let (results, outcome) = engine(Some(vec![None])).solve_with_outcome(&parameters).unwrap();

        assert_eq!(outcome.loss, 0.0);
        assert!(results.get("Cancer").unwrap()[0].value());

        let smokes_b = results.get("Smokes").unwrap()[0].value();
        let cancer_b = results.get("Cancer").unwrap()[1].value();
        assert!(!smokes_b || cancer_b);
    }

    #[test]
    fn results_cover_unobserved_rows() {
        let results = engine(None)
            .solve(&SearchParameters::default().with_seed(1))
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results.get("Smokes").unwrap().len(), 1);
        assert_eq!(results.get("Cancer").unwrap().len(), 2);
    }

    #[test]
    fn configuration_errors_surface_before_search() {
        assert!(matches!(
            engine(Some(vec![None, None])).solve(&SearchParameters::default()),
            Err(Error::WeightCount { .. })
        ));
        assert!(matches!(
            engine(None).solve(&SearchParameters::default().with_noise(-0.1)),
            Err(Error::InvalidParameter { .. })
        ));
    }

    #[test]
    fn engines_are_interchangeable() {
        let engines: Vec<Box<dyn InferenceEngine>> = vec![
            Box::new(engine(None)),
            Box::new(RandomEngine::new(relations())),
        ];
        let parameters = SearchParameters::default().with_seed(3);

        for engine in engines {
            let results = engine.solve(&parameters).unwrap();
            assert_eq!(
                results.iter().map(|relation| relation.rows().len()).collect::<Vec<_>>(),
                [1, 2]
            );
        }
    }

    #[test]
    fn random_engine_is_seeded() {
        let engine = RandomEngine::new(relations());
        let parameters = SearchParameters::default().with_seed(8);

        assert_eq!(
            engine.solve(&parameters).unwrap(),
            engine.solve(&parameters).unwrap()
        );
    }
}
