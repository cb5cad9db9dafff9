//! Conjunctive query processing across one or more index files.

mod processor;

pub use processor::*;
