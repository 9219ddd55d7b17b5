//! matchcheck-core - Core library for test/implementation consistency analysis
//!
//! This crate extracts lightweight lexical facts from a test corpus and an
//! implementation corpus (call sites, definitions, declared exceptions,
//! exception assertions) and cross-references them into a report of
//! errors and warnings. It never parses a full grammar.
//!
//! # Features
//!
//! - `parallel` - Evaluate rules in parallel (brings in `rayon`)
//!
//! # Example
//!
//! ```ignore
//! use matchcheck_core::{check, Conventions};
//!
//! let report = check(&test_source, &impl_source, &Conventions::default());
//! assert!(report.success);
//! ```

mod extract;
mod facts;
mod report;
mod rules;
pub mod scan;
mod suggest;

pub use extract::{
    CallSite, CallSites, Definition, Definitions, ExceptionAssertion, ExceptionAssertions, Fact,
    PatternKind, Patterns, ThrowDeclaration, ThrowDeclarations,
};
pub use facts::{CallArity, FactStore, Signature};
pub use matchcheck_config::Conventions;
pub use report::Report;
pub use rules::{Corpus, Finding, Location, Rule, Severity};
pub use scan::Syntax;

/// Extract facts from both corpora and run every rule over them.
pub fn check(test_corpus: &str, impl_corpus: &str, conventions: &Conventions) -> Report {
    let patterns = Patterns::new(conventions);
    let facts = FactStore::build(&patterns, test_corpus, impl_corpus);
    Report::compute(&facts, conventions)
}
