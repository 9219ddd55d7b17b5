//! Validation rules.
//!
//! Each rule is a pure function of the [`FactStore`] and the naming
//! conventions. Rules never see each other's findings.

use std::collections::BTreeSet;

use facet::Facet;
use matchcheck_config::Conventions;

use crate::facts::FactStore;
use crate::suggest::suggest_similar_method;

/// How much a finding matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Facet)]
#[facet(rename_all = "snake_case")]
#[repr(u8)]
pub enum Severity {
    /// A test calls something that doesn't exist or calls it wrongly
    Error,
    /// Something is implemented or declared but never exercised
    Warning,
}

/// The validation rules, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Facet)]
#[facet(rename_all = "snake_case")]
#[repr(u8)]
pub enum Rule {
    UndefinedMethod,
    UntestedMethod,
    UntestedException,
    ArityMismatch,
}

/// Which of the two inputs a location points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Facet)]
#[facet(rename_all = "snake_case")]
#[repr(u8)]
pub enum Corpus {
    Test,
    Implementation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Facet)]
pub struct Location {
    pub corpus: Corpus,
    /// 1-based
    pub line: usize,
}

impl Location {
    fn test(line: usize) -> Self {
        Self {
            corpus: Corpus::Test,
            line,
        }
    }

    fn implementation(line: usize) -> Self {
        Self {
            corpus: Corpus::Implementation,
            line,
        }
    }
}

/// One reported mismatch or gap.
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct Finding {
    pub rule: Rule,
    pub severity: Severity,
    pub message: String,
    /// Method or exception names the finding is about
    #[facet(default)]
    pub subject: Option<String>,
    /// A defined method that may have been meant instead
    #[facet(default)]
    pub hint: Option<String>,
    /// The first place the finding shows up: a test call site for errors,
    /// a definition for untested methods
    #[facet(default)]
    pub location: Option<Location>,
}

impl Rule {
    pub const ALL: [Rule; 4] = [
        Rule::UndefinedMethod,
        Rule::UntestedMethod,
        Rule::UntestedException,
        Rule::ArityMismatch,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Rule::UndefinedMethod => "undefined-method",
            Rule::UntestedMethod => "untested-method",
            Rule::UntestedException => "untested-exception",
            Rule::ArityMismatch => "arity-mismatch",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            Rule::UndefinedMethod | Rule::ArityMismatch => Severity::Error,
            Rule::UntestedMethod | Rule::UntestedException => Severity::Warning,
        }
    }

    pub fn check(self, facts: &FactStore, conventions: &Conventions) -> Vec<Finding> {
        match self {
            Rule::UndefinedMethod => undefined_methods(facts, conventions),
            Rule::UntestedMethod => untested_methods(facts, conventions),
            Rule::UntestedException => untested_exceptions(facts),
            Rule::ArityMismatch => arity_mismatches(facts),
        }
    }

    fn finding(self, message: String, subject: impl Into<String>) -> Finding {
        Finding {
            rule: self,
            severity: self.severity(),
            message,
            subject: Some(subject.into()),
            hint: None,
            location: None,
        }
    }
}

fn undefined_methods(facts: &FactStore, conventions: &Conventions) -> Vec<Finding> {
    let mut findings = Vec::new();
    for methods in facts.calls_by_receiver.values() {
        for method in methods {
            if conventions.is_helper(method) || facts.definitions.contains_key(method) {
                continue;
            }
            let mut finding = Rule::UndefinedMethod.finding(
                format!("Method '{method}' is called in tests but not found in implementation"),
                method,
            );
            finding.hint = suggest_similar_method(
                method,
                facts.definitions.keys().map(String::as_str),
            )
            .map(str::to_string);
            finding.location = facts.first_call_line(method).map(Location::test);
            findings.push(finding);
        }
    }
    findings
}

fn untested_methods(facts: &FactStore, conventions: &Conventions) -> Vec<Finding> {
    let called = facts.called_methods();
    facts
        .definitions
        .iter()
        .filter(|(name, _)| !conventions.is_private(name) && !conventions.is_structural(name))
        .filter(|(name, _)| !called.contains(name.as_str()))
        .map(|(name, signature)| {
            let mut finding = Rule::UntestedMethod.finding(
                format!("Public method '{name}' is not called from any test"),
                name,
            );
            finding.location = Some(Location::implementation(signature.line));
            finding
        })
        .collect()
}

/// All untested types go into one combined finding.
fn untested_exceptions(facts: &FactStore) -> Vec<Finding> {
    let untested: Vec<&str> = facts
        .thrown_exceptions()
        .into_iter()
        .filter(|exception| !facts.asserted_exceptions.contains(*exception))
        .collect();
    if untested.is_empty() {
        return Vec::new();
    }
    let names = untested.join(", ");
    vec![Rule::UntestedException.finding(
        format!("Exceptions declared but not tested: {names}"),
        names,
    )]
}

/// Overloads are not modeled: each name is compared against the single
/// definition the fact store retained for it.
fn arity_mismatches(facts: &FactStore) -> Vec<Finding> {
    let mut findings = Vec::new();
    for (method, calls) in &facts.call_arities {
        let Some(signature) = facts.definitions.get(method) else {
            continue;
        };
        let expected = signature.arity;
        let observed: BTreeSet<usize> = calls.iter().map(|call| call.arity).collect();
        for count in observed.into_iter().filter(|&count| count != expected) {
            let mut finding = Rule::ArityMismatch.finding(
                format!(
                    "Method '{method}' called with {count} params in test, \
                     but defined with {expected} in implementation"
                ),
                method,
            );
            finding.location = calls
                .iter()
                .find(|call| call.arity == count)
                .map(|call| Location::test(call.line));
            findings.push(finding);
        }
    }
    findings
}
