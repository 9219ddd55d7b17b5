//! Integration tests for `matchcheck`.
//!
//! Each test writes a test corpus and an implementation corpus into a temp
//! directory, then exercises either the library API or the compiled binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use matchcheck::output::{OutputFormat, render_validation};
use matchcheck::{Validation, validate_files};
use matchcheck_core::{Conventions, Rule};

// ============================================================================
// Helpers
// ============================================================================

/// Write both corpora and return their paths.
fn write_corpora(dir: &Path, tests: &str, implementation: &str) -> (PathBuf, PathBuf) {
    let test_file = dir.join("UserServiceTest.kt");
    let impl_file = dir.join("UserService.kt");
    fs::write(&test_file, tests).unwrap();
    fs::write(&impl_file, implementation).unwrap();
    (test_file, impl_file)
}

/// Run the binary with the given arguments from inside `dir`.
fn run(dir: &Path, args: &[&Path]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_matchcheck"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run matchcheck")
}

const IMPL: &str = r#"
package com.acme.user

class UserService(private val repository: UserRepository) {
    @Throws(ValidationError::class, NotFoundError::class)
    fun register(name: String, email: String): User {
        if (name.isBlank()) throw ValidationError("name")
        return repository.save(User(name = name, email = email))
    }

    @Throws(NotFoundError::class)
    fun findById(id: Long): User = repository.findById(id) ?: throw NotFoundError(id)

    fun rename(id: Long, name: String) {}

    private fun _audit(event: String) {}

    override fun toString(): String = "UserService"
}
"#;

const PASSING_TESTS: &str = r#"
class UserServiceTest {
    private val service = UserService(FakeRepository())

    @Test
    fun shouldRegisterUser() {
        val user = service.register("ann", "ann@example.com")
        assertEquals("ann", user.name)
    }

    @Test
    fun shouldRejectBlankName() {
        assertThrows<ValidationError> { service.register("", "x@example.com") }
    }

    @Test
    fun whenUserIsMissing() {
        assertThrows<NotFoundError> { service.findById(404) }
    }
}
"#;

// ============================================================================
// Library API
// ============================================================================

/// Warnings alone leave the run passing.
#[test]
fn test_warnings_only_passes() {
    let dir = tempfile::tempdir().unwrap();
    let (tests, implementation) = write_corpora(dir.path(), PASSING_TESTS, IMPL);

    let validation = validate_files(&tests, &implementation, &Conventions::default());
    let report = validation.report().expect("files exist");

    assert!(report.success);
    assert_eq!(report.error_count, 0);
    assert_eq!(report.test_methods, 3);
    let warnings: Vec<&str> = report.warnings.iter().map(|f| f.message.as_str()).collect();
    assert_eq!(
        warnings,
        vec!["Public method 'rename' is not called from any test"]
    );
    assert_eq!(validation.exit_code(), 0);
}

/// A misspelled call and a wrong argument count are both errors.
#[test]
fn test_undefined_and_arity_errors_fail() {
    let dir = tempfile::tempdir().unwrap();
    let tests = PASSING_TESTS
        .replace("service.findById(404)", "service.findByID(404)")
        .replace(
            "service.register(\"ann\", \"ann@example.com\")",
            "service.register(\"ann\")",
        );
    let (tests, implementation) = write_corpora(dir.path(), &tests, IMPL);

    let validation = validate_files(&tests, &implementation, &Conventions::default());
    let report = validation.report().expect("files exist");

    let rules: Vec<Rule> = report.errors.iter().map(|f| f.rule).collect();
    assert_eq!(rules, vec![Rule::UndefinedMethod, Rule::ArityMismatch]);
    assert_eq!(report.errors[0].hint.as_deref(), Some("findById"));
    assert_eq!(
        report.errors[1].message,
        "Method 'register' called with 1 params in test, but defined with 2 in implementation"
    );
    assert!(!report.success);
    assert_eq!(validation.exit_code(), 1);
}

/// Declared exceptions without an assertion are reported together.
#[test]
fn test_untested_exceptions_are_listed() {
    let dir = tempfile::tempdir().unwrap();
    let tests = PASSING_TESTS.replace("assertThrows<NotFoundError>", "runCatching");
    let (tests, implementation) = write_corpora(dir.path(), &tests, IMPL);

    let validation = validate_files(&tests, &implementation, &Conventions::default());
    let report = validation.report().expect("files exist");

    let untested: Vec<&str> = report
        .warnings
        .iter()
        .filter(|f| f.rule == Rule::UntestedException)
        .map(|f| f.message.as_str())
        .collect();
    assert_eq!(
        untested,
        vec!["Exceptions declared but not tested: NotFoundError"]
    );
}

/// A missing file is a structured failure, never a partial report.
#[test]
fn test_missing_file_is_a_failure() {
    let dir = tempfile::tempdir().unwrap();
    let (_, implementation) = write_corpora(dir.path(), PASSING_TESTS, IMPL);
    let missing = dir.path().join("DoesNotExist.kt");

    let validation = validate_files(&missing, &implementation, &Conventions::default());

    match &validation {
        Validation::Failed(failure) => {
            assert!(!failure.success);
            assert!(failure.error.starts_with("File not found:"), "{}", failure.error);
            assert!(failure.error.contains("DoesNotExist.kt"));
        }
        Validation::Checked(report) => panic!("expected a failure, got {report:?}"),
    }
    assert!(validation.report().is_none());
    assert_eq!(validation.exit_code(), 1);
}

/// Identical inputs render identical output.
#[test]
fn test_rendering_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let tests = PASSING_TESTS.replace("service.findById(404)", "service.lookup(404)");
    let (tests, implementation) = write_corpora(dir.path(), &tests, IMPL);
    let conventions = Conventions::default();

    let render = || {
        let validation = validate_files(&tests, &implementation, &conventions);
        render_validation(&validation, OutputFormat::Text, false).unwrap()
    };
    assert_eq!(render(), render());
}

// ============================================================================
// Binary
// ============================================================================

#[test]
fn test_binary_exits_zero_with_warnings() {
    let dir = tempfile::tempdir().unwrap();
    let (tests, implementation) = write_corpora(dir.path(), PASSING_TESTS, IMPL);

    let output = run(dir.path(), &[&tests, &implementation]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(0), "stdout: {stdout}");
    assert!(stdout.contains("PASSED: All tests match implementation"));
    assert!(stdout.contains("WARNINGS (1):"));
    assert!(stdout.contains("Total: 0 errors, 1 warnings"));
}

#[test]
fn test_binary_exits_one_on_error() {
    let dir = tempfile::tempdir().unwrap();
    let tests = PASSING_TESTS.replace("service.findById(404)", "service.lookup(404)");
    let (tests, implementation) = write_corpora(dir.path(), &tests, IMPL);

    let output = run(dir.path(), &[&tests, &implementation]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(1), "stdout: {stdout}");
    assert!(stdout.contains("FAILED: Found mismatches"));
    assert!(stdout.contains(
        "Method 'lookup' is called in tests but not found in implementation [test line 18]"
    ));
}

#[test]
fn test_binary_missing_file_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let (tests, _) = write_corpora(dir.path(), PASSING_TESTS, IMPL);
    let missing = dir.path().join("Missing.kt");

    let output = run(dir.path(), &[&tests, &missing]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("File not found:"), "stdout: {stdout}");
    assert!(!stdout.contains("Total:"));
}

#[test]
fn test_binary_without_arguments_prints_usage() {
    let dir = tempfile::tempdir().unwrap();

    let output = run(dir.path(), &[]);

    assert_ne!(output.status.code(), Some(0));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"), "stderr: {stderr}");
}
