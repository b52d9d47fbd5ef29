//! Pipeline entry points for gazette archiving.
//!
//! - `GazetteResolver::resolve`: Issue and notice identifiers for a date
//! - `GazetteResolver::run` / `run_pipeline`: Full archive of a date into storage

mod archive;
#[cfg(test)]
mod fake;
mod resolve;
mod resolver;

pub use resolver::{GazetteResolver, run_pipeline};
