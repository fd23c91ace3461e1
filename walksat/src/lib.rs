//! Weighted rule inference over relational data
//!
//! Raw ground rules produced by an external grounder are compiled against the
//! observed data of a set of [relation::Relation]s and the remaining
//! unobserved atoms are assigned by MaxWalkSat local search.

#![deny(
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts
)]
#![warn(
    missing_docs,
    unused_import_braces,
    unused_qualifications,
    unused_extern_crates,
    variant_size_differences
)]

pub mod atoms;
pub mod compiler;
pub mod engine;
pub mod error;
pub mod ground_rule;
pub mod grounding;
pub mod projection;
pub mod relation;
pub mod search;
