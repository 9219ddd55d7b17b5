//! Configuration schema for matchcheck
//!
//! Config lives at `.config/matchcheck/config.styx` relative to the working
//! directory. Every field is optional; anything left unset keeps the
//! built-in conventions.

use facet::Facet;

/// Helpers from assertion and mocking frameworks that tests call but no
/// implementation is expected to define.
pub const DEFAULT_HELPER_METHODS: &[&str] = &[
    "assertEquals",
    "assertTrue",
    "assertFalse",
    "reset",
    "given",
    "verify",
];

/// Methods every object carries; never reported as untested.
pub const DEFAULT_STRUCTURAL_METHODS: &[&str] = &["equals", "hashCode", "toString", "getClass"];

pub const DEFAULT_PRIVATE_PREFIXES: &[&str] = &["_"];

pub const DEFAULT_TEST_PREFIXES: &[&str] = &["test", "should", "when"];

pub const DEFAULT_DEFINITION_KEYWORDS: &[&str] = &["fun", "def"];

/// Root configuration for matchcheck, as written on disk
#[derive(Debug, Clone, Default, Facet)]
pub struct Config {
    /// Replaces the helper allow-list used when looking for undefined methods
    #[facet(default)]
    pub helper_methods: Option<Vec<String>>,

    /// Appended to the helper allow-list
    #[facet(default)]
    pub extra_helper_methods: Vec<String>,

    /// Replaces the structural allow-list used when looking for untested methods
    #[facet(default)]
    pub structural_methods: Option<Vec<String>>,

    /// Appended to the structural allow-list
    #[facet(default)]
    pub extra_structural_methods: Vec<String>,

    /// Name prefixes marking a definition as internal
    #[facet(default)]
    pub private_prefixes: Option<Vec<String>>,

    /// Name prefixes marking a definition in the test corpus as a test
    #[facet(default)]
    pub test_prefixes: Option<Vec<String>>,

    /// Keywords introducing a function or method definition
    #[facet(default)]
    pub definition_keywords: Option<Vec<String>>,
}

/// Naming conventions the checker runs with, after defaults are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conventions {
    pub helper_methods: Vec<String>,
    pub structural_methods: Vec<String>,
    pub private_prefixes: Vec<String>,
    pub test_prefixes: Vec<String>,
    pub definition_keywords: Vec<String>,
}

impl Conventions {
    pub fn is_helper(&self, method: &str) -> bool {
        self.helper_methods.iter().any(|m| m == method)
    }

    pub fn is_structural(&self, method: &str) -> bool {
        self.structural_methods.iter().any(|m| m == method)
    }

    pub fn is_private(&self, method: &str) -> bool {
        self.private_prefixes
            .iter()
            .any(|p| !p.is_empty() && method.starts_with(p.as_str()))
    }

    pub fn is_test_name(&self, name: &str) -> bool {
        self.test_prefixes
            .iter()
            .any(|p| !p.is_empty() && name.starts_with(p.as_str()))
    }
}

impl Default for Conventions {
    fn default() -> Self {
        Config::default().conventions()
    }
}

impl Config {
    /// Resolve the on-disk config against the built-in conventions.
    pub fn conventions(&self) -> Conventions {
        let mut helper_methods = resolve(&self.helper_methods, DEFAULT_HELPER_METHODS);
        helper_methods.extend(self.extra_helper_methods.iter().cloned());

        let mut structural_methods = resolve(&self.structural_methods, DEFAULT_STRUCTURAL_METHODS);
        structural_methods.extend(self.extra_structural_methods.iter().cloned());

        Conventions {
            helper_methods,
            structural_methods,
            private_prefixes: resolve(&self.private_prefixes, DEFAULT_PRIVATE_PREFIXES),
            test_prefixes: resolve(&self.test_prefixes, DEFAULT_TEST_PREFIXES),
            definition_keywords: resolve(&self.definition_keywords, DEFAULT_DEFINITION_KEYWORDS),
        }
    }
}

fn resolve(configured: &Option<Vec<String>>, defaults: &[&str]) -> Vec<String> {
    match configured {
        Some(values) => values.clone(),
        None => defaults.iter().map(|s| s.to_string()).collect(),
    }
}
