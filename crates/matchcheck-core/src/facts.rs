//! Facts extracted from the two corpora, keyed for lookup by the rules.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace, warn};

use crate::extract::Patterns;

/// One call site of a method in the test corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallArity {
    pub arity: usize,
    pub line: usize,
}

/// The retained definition of a method in the implementation corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub parameters: String,
    pub arity: usize,
    pub line: usize,
}

/// Read-only view of one test corpus and one implementation corpus.
///
/// Maps are ordered so every rule walks them deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactStore {
    /// Receiver name to the methods called on it in tests
    pub calls_by_receiver: BTreeMap<String, BTreeSet<String>>,
    /// Method name to the argument count of each call site, in textual order
    pub call_arities: BTreeMap<String, Vec<CallArity>>,
    /// Method name to its signature; the last definition of a name wins
    pub definitions: BTreeMap<String, Signature>,
    /// Names defined more than once in the implementation
    pub duplicate_definitions: BTreeSet<String>,
    /// Method name to the exception types it declares
    pub throws: BTreeMap<String, BTreeSet<String>>,
    /// Exception types that tests assert are thrown
    pub asserted_exceptions: BTreeSet<String>,
    /// Test methods found in the test corpus, in textual order
    pub test_methods: Vec<String>,
}

impl FactStore {
    pub fn build(patterns: &Patterns, test_corpus: &str, impl_corpus: &str) -> Self {
        let mut facts = FactStore::default();

        for call in patterns.call_sites(test_corpus) {
            facts
                .call_arities
                .entry(call.method.clone())
                .or_default()
                .push(CallArity {
                    arity: call.arity,
                    line: call.line,
                });
            facts
                .calls_by_receiver
                .entry(call.receiver)
                .or_default()
                .insert(call.method);
        }

        for def in patterns.definitions(impl_corpus) {
            let signature = Signature {
                parameters: def.parameters,
                arity: def.arity,
                line: def.line,
            };
            if let Some(previous) = facts.definitions.insert(def.name.clone(), signature) {
                warn!(
                    method = %def.name,
                    line = def.line,
                    previous_line = previous.line,
                    "method defined more than once; keeping the last definition"
                );
                facts.duplicate_definitions.insert(def.name);
            }
        }

        for decl in patterns.throw_declarations(impl_corpus) {
            facts
                .throws
                .entry(decl.method)
                .or_default()
                .extend(decl.exceptions);
        }

        for assertion in patterns.exception_assertions(test_corpus) {
            trace!(exception = %assertion.exception, line = assertion.line, "exception asserted");
            facts.asserted_exceptions.insert(assertion.exception);
        }

        facts.test_methods = patterns
            .test_methods(test_corpus)
            .map(|def| def.name)
            .collect();

        debug!(
            receivers = facts.calls_by_receiver.len(),
            called_methods = facts.call_arities.len(),
            definitions = facts.definitions.len(),
            throwing_methods = facts.throws.len(),
            asserted_exceptions = facts.asserted_exceptions.len(),
            test_methods = facts.test_methods.len(),
            "built fact store"
        );

        facts
    }

    /// Every method name called through any receiver.
    pub fn called_methods(&self) -> BTreeSet<&str> {
        self.calls_by_receiver
            .values()
            .flatten()
            .map(String::as_str)
            .collect()
    }

    /// Line of the first call to `method` in the test corpus.
    pub fn first_call_line(&self, method: &str) -> Option<usize> {
        self.call_arities
            .get(method)
            .and_then(|calls| calls.first())
            .map(|call| call.line)
    }

    /// Every exception type declared by any definition.
    pub fn thrown_exceptions(&self) -> BTreeSet<&str> {
        self.throws
            .values()
            .flatten()
            .map(String::as_str)
            .collect()
    }
}
