//! matchcheck - Check that tests and implementation agree
//!
//! matchcheck reads a test source file and an implementation source file,
//! extracts call sites, definitions and declared exceptions from both, and
//! reports calls to missing methods, argument count mismatches, untested
//! methods and untested exceptions.

pub mod config;
pub mod output;

use std::io::ErrorKind;
use std::path::Path;

use facet::Facet;
use matchcheck_core::{Conventions, Report};
use tracing::{debug, info};

/// Why a run produced no report.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct Failure {
    /// Always `false`
    pub success: bool,
    pub error: String,
}

impl Failure {
    fn new(error: String) -> Self {
        Self {
            success: false,
            error,
        }
    }
}

/// Result of validating a test file against an implementation file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Checked(Report),
    /// A corpus could not be read; nothing was analyzed
    Failed(Failure),
}

impl Validation {
    pub fn success(&self) -> bool {
        match self {
            Validation::Checked(report) => report.is_passing(),
            Validation::Failed(_) => false,
        }
    }

    /// Process exit status: errors fail the run, warnings never do.
    pub fn exit_code(&self) -> i32 {
        if self.success() { 0 } else { 1 }
    }

    pub fn report(&self) -> Option<&Report> {
        match self {
            Validation::Checked(report) => Some(report),
            Validation::Failed(_) => None,
        }
    }
}

/// Read both corpora and check them against each other.
pub fn validate_files(test_file: &Path, impl_file: &Path, conventions: &Conventions) -> Validation {
    let test_corpus = match read_corpus(test_file) {
        Ok(text) => text,
        Err(failure) => return Validation::Failed(failure),
    };
    let impl_corpus = match read_corpus(impl_file) {
        Ok(text) => text,
        Err(failure) => return Validation::Failed(failure),
    };

    let report = matchcheck_core::check(&test_corpus, &impl_corpus, conventions);
    info!(
        errors = report.error_count,
        warnings = report.warning_count,
        "validated {} against {}",
        test_file.display(),
        impl_file.display()
    );
    Validation::Checked(report)
}

fn read_corpus(path: &Path) -> Result<String, Failure> {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            debug!(path = %path.display(), bytes = text.len(), "read corpus");
            Ok(text)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Err(Failure::new(format!(
            "File not found: {}",
            path.display()
        ))),
        Err(e) => Err(Failure::new(format!(
            "Failed to read {}: {}",
            path.display(),
            e
        ))),
    }
}
