//! Aggregation of rule findings into a single report.

use std::collections::HashSet;

use facet::Facet;
use matchcheck_config::Conventions;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::debug;

use crate::facts::FactStore;
use crate::rules::{Finding, Rule, Severity};

/// Outcome of checking one test corpus against one implementation corpus.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct Report {
    /// `true` iff there are no errors; warnings never affect it
    pub success: bool,
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
    pub error_count: usize,
    pub warning_count: usize,
    /// Test methods detected in the test corpus
    pub test_methods: usize,
}

impl Report {
    /// Run every rule against `facts` and aggregate the results.
    pub fn compute(facts: &FactStore, conventions: &Conventions) -> Self {
        let per_rule = evaluate_rules(facts, conventions);
        for (rule, findings) in Rule::ALL.iter().zip(&per_rule) {
            debug!(rule = rule.as_str(), findings = findings.len(), "rule evaluated");
        }
        Self::from_findings(per_rule.into_iter().flatten(), facts.test_methods.len())
    }

    /// Split findings by severity, keeping first-seen order and dropping
    /// repeats of an identical message.
    pub fn from_findings(findings: impl IntoIterator<Item = Finding>, test_methods: usize) -> Self {
        let mut seen: HashSet<(Severity, String)> = HashSet::new();
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        for finding in findings {
            if !seen.insert((finding.severity, finding.message.clone())) {
                continue;
            }
            match finding.severity {
                Severity::Error => errors.push(finding),
                Severity::Warning => warnings.push(finding),
            }
        }

        Self {
            success: errors.is_empty(),
            error_count: errors.len(),
            warning_count: warnings.len(),
            errors,
            warnings,
            test_methods,
        }
    }

    /// Whether the run passes; warnings never fail it.
    pub fn is_passing(&self) -> bool {
        self.success
    }
}

/// Findings per rule, in [`Rule::ALL`] order regardless of how the rules
/// were scheduled.
#[cfg(feature = "parallel")]
fn evaluate_rules(facts: &FactStore, conventions: &Conventions) -> Vec<Vec<Finding>> {
    Rule::ALL
        .par_iter()
        .map(|rule| rule.check(facts, conventions))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn evaluate_rules(facts: &FactStore, conventions: &Conventions) -> Vec<Vec<Finding>> {
    Rule::ALL
        .iter()
        .map(|rule| rule.check(facts, conventions))
        .collect()
}
