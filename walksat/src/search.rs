//! This module implements MaxWalkSat search over a [crate::compiler::CompiledProgram].

pub mod orchestrator;
pub mod parameters;
pub mod solver;

use rand::Rng;

pub use orchestrator::{AttemptSummary, MultiTrySearch, SearchOutcome};
pub use parameters::SearchParameters;
pub use solver::{Attempt, MaxWalkSat};

/// Random number generator driving the search
pub type SearchRng = rand_pcg::Pcg64;

/// Return `seed`, or a fresh random seed if none is given.
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| rand::thread_rng().gen())
}
