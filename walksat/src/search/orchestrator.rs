//! This module defines [MultiTrySearch], which repeats [MaxWalkSat] attempts
//! and keeps the best one.

use rand::{Rng, SeedableRng};

use crate::{
    atoms::Assignment,
    compiler::CompiledProgram,
    error::Error,
    search::{resolve_seed, Attempt, MaxWalkSat, SearchParameters, SearchRng},
};

/// Loss and effort of one finished attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttemptSummary {
    /// Number of the attempt, starting at 1
    pub attempt: usize,
    /// Final loss of the attempt
    pub loss: f64,
    /// Number of flips performed
    pub flips: usize,
}

/// Best assignment found over all attempts
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Assignment of the best attempt
    pub assignment: Assignment,
    /// Loss of the best attempt
    pub loss: f64,
    /// Number of the best attempt
    pub best_attempt: usize,
    /// Summaries of all attempts that were run, in order
    pub attempts: Vec<AttemptSummary>,
    /// Seed the random number generator was initialized with
    pub seed: u64,
}

/// Runs up to `max_tries` attempts on one shared random stream
#[derive(Debug, Clone, Copy)]
pub struct MultiTrySearch<'a> {
    program: &'a CompiledProgram,
    parameters: SearchParameters,
}

impl<'a> MultiTrySearch<'a> {
    /// Create a new [MultiTrySearch].
    pub fn new(program: &'a CompiledProgram, parameters: SearchParameters) -> Result<Self, Error> {
        parameters.validate()?;

        Ok(Self {
            program,
            parameters,
        })
    }

    /// Run the search with a generator seeded from the parameters,
    /// or from a fresh random seed if none is set.
    pub fn run(&self) -> SearchOutcome {
        let seed = resolve_seed(self.parameters.seed);
        log::info!("search seed: {seed}");

        let mut rng = SearchRng::seed_from_u64(seed);
        let (best, attempts) = self.run_with(&mut rng);

        log::info!(
            "search complete, best attempt: {}, loss: {}",
            best.attempt,
            best.loss
        );

        SearchOutcome {
            assignment: best.assignment,
            loss: best.loss,
            best_attempt: best.attempt,
            attempts,
            seed,
        }
    }

    /// Run the attempts on the given generator.
    ///
    /// Returns the first attempt with the lowest loss together with the summaries of all attempts.
    /// Stops after the first attempt without loss.
    pub fn run_with<R: Rng + ?Sized>(&self, rng: &mut R) -> (Attempt, Vec<AttemptSummary>) {
        let max_flips = self
            .parameters
            .flip_budget(self.program.grounding_index().grounded_variable_count());
        let search = MaxWalkSat::new(self.program, self.parameters.noise, max_flips);

        let mut best = search.run(1, rng);
        let mut attempts = vec![summary(&best)];

        for attempt in 2..=self.parameters.max_tries {
            if best.loss == 0.0 {
                break;
            }

            let current = search.run(attempt, rng);
            attempts.push(summary(&current));

            if current.loss < best.loss {
                best = current;
            }
        }

        (best, attempts)
    }
}

fn summary(attempt: &Attempt) -> AttemptSummary {
    AttemptSummary {
        attempt: attempt.attempt,
        loss: attempt.loss,
        flips: attempt.flips,
    }
}
