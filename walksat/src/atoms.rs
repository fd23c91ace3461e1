//! This module defines the atom arena shared by compilation, search and projection.

mod assignment;
mod grounding_index;
mod table;

pub use assignment::Assignment;
pub use grounding_index::AtomGroundingIndex;
pub use table::{Atom, AtomTable, Variable, VariableId};
