//! Lexical pattern extraction.
//!
//! Every extractor is a lazy iterator over one corpus, yielding facts in
//! textual order. Iterators hold no state beyond their position, so
//! extracting the same kind twice gives the same sequence.

use matchcheck_config::Conventions;
use regex::{CaptureMatches, Regex};

use crate::scan::{
    LineIndex, Syntax, arity, balanced, is_ident_byte, opening_paren, parameter_arity,
    top_level_segments,
};

/// `receiver.method(` with whitespace allowed around the dot.
const CALL_SITE: &str = r"(\w+)\s*\.\s*(\w+)\s*\(";

/// Java-style clause after a parameter list: `throws A, b.B`
const THROWS_CLAUSE: &str = r"\bthrows\s+([\w.]+(?:\s*,\s*[\w.]+)*)";

const THROWS_ANNOTATION: &str = r"@Throws\s*\(([^)]*)\)";

/// KDoc and Javadoc tags: `@throws NotFoundError when ...`
const THROWS_DOC_TAG: &str = r"@(?:throws|exception)\s+([\w.]+)";

/// One alternative per assertion idiom. The first only marks where an
/// `assertThatThrownBy` chain starts; the type is read from that chain.
/// Every other alternative captures the type in exactly one group.
const EXCEPTION_ASSERTION: &str = concat!(
    r"\b(assertThatThrownBy)\b",
    r"|\bassertThrows\s*<\s*(\w+)",
    r"|\bassertThrows\s*\(\s*(\w+)\s*(?:::class|\.class)",
    r"|\bassertFailsWith\s*<\s*(\w+)",
    r"|\bshouldThrow\w*\s*<\s*(\w+)",
    r"|\bassertThatExceptionOfType\s*\(\s*(\w+)",
);

/// Chained assertions that name the thrown type.
const INSTANCE_ASSERTIONS: &[&str] = &["isInstanceOf", "isExactlyInstanceOf"];

/// A method invocation through a named receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub receiver: String,
    pub method: String,
    /// Verbatim text between the call's parentheses
    pub arguments: String,
    /// Top-level argument count
    pub arity: usize,
    /// Byte offset of the receiver
    pub offset: usize,
    pub line: usize,
}

/// A function or method declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub name: String,
    /// Verbatim text between the declaration's parentheses
    pub parameters: String,
    /// Parameter count, not counting a leading `self`
    pub arity: usize,
    /// Byte offset of the declaring keyword
    pub offset: usize,
    /// Byte offset just past the closing parenthesis
    pub end: usize,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrowDeclaration {
    pub method: String,
    pub exceptions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionAssertion {
    pub exception: String,
    pub line: usize,
}

/// The kinds of fact the extractor knows how to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternKind {
    CallSite,
    Definition,
    TestMethod,
    Throws,
    ExceptionAssertion,
}

/// A fact of any kind, as yielded by [`Patterns::extract`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fact {
    CallSite(CallSite),
    Definition(Definition),
    TestMethod(Definition),
    Throws(ThrowDeclaration),
    ExceptionAssertion(ExceptionAssertion),
}

/// Compiled lexical patterns for one set of naming conventions.
#[derive(Debug, Clone)]
pub struct Patterns {
    call_site: Regex,
    /// `None` when no definition keywords are configured
    definition: Option<Regex>,
    throws_clause: Regex,
    throws_annotation: Regex,
    throws_doc_tag: Regex,
    exception_assertion: Regex,
    conventions: Conventions,
}

impl Patterns {
    pub fn new(conventions: &Conventions) -> Self {
        Self {
            call_site: compile(CALL_SITE),
            definition: definition_pattern(&conventions.definition_keywords).map(|p| compile(&p)),
            throws_clause: compile(THROWS_CLAUSE),
            throws_annotation: compile(THROWS_ANNOTATION),
            throws_doc_tag: compile(THROWS_DOC_TAG),
            exception_assertion: compile(EXCEPTION_ASSERTION),
            conventions: conventions.clone(),
        }
    }

    pub fn call_sites<'p, 't>(&'p self, text: &'t str) -> CallSites<'p, 't> {
        CallSites {
            text,
            syntax: Syntax::detect(text),
            lines: LineIndex::new(text),
            matches: self.call_site.captures_iter(text),
        }
    }

    pub fn definitions<'p, 't>(&'p self, text: &'t str) -> Definitions<'p, 't> {
        Definitions {
            text,
            syntax: Syntax::detect(text),
            lines: LineIndex::new(text),
            matches: self.definition.as_ref().map(|re| re.captures_iter(text)),
        }
    }

    /// Definitions whose name marks them as a test.
    pub fn test_methods<'p, 't>(&'p self, text: &'t str) -> impl Iterator<Item = Definition> + 'p
    where
        't: 'p,
    {
        self.definitions(text)
            .filter(move |def| self.conventions.is_test_name(&def.name))
    }

    pub fn throw_declarations<'p, 't>(&'p self, text: &'t str) -> ThrowDeclarations<'p, 't> {
        ThrowDeclarations {
            patterns: self,
            text,
            definitions: self.definitions(text),
            previous_end: 0,
            clauses: self.throws_clause.captures_iter(text),
        }
    }

    pub fn exception_assertions<'p, 't>(&'p self, text: &'t str) -> ExceptionAssertions<'p, 't> {
        ExceptionAssertions {
            text,
            syntax: Syntax::detect(text),
            lines: LineIndex::new(text),
            matches: self.exception_assertion.captures_iter(text),
        }
    }

    /// Extract every fact of `kind` from `text`.
    pub fn extract<'p, 't>(
        &'p self,
        kind: PatternKind,
        text: &'t str,
    ) -> Box<dyn Iterator<Item = Fact> + 'p>
    where
        't: 'p,
    {
        match kind {
            PatternKind::CallSite => Box::new(self.call_sites(text).map(Fact::CallSite)),
            PatternKind::Definition => Box::new(self.definitions(text).map(Fact::Definition)),
            PatternKind::TestMethod => Box::new(self.test_methods(text).map(Fact::TestMethod)),
            PatternKind::Throws => Box::new(self.throw_declarations(text).map(Fact::Throws)),
            PatternKind::ExceptionAssertion => Box::new(
                self.exception_assertions(text)
                    .map(Fact::ExceptionAssertion),
            ),
        }
    }
}

impl Default for Patterns {
    fn default() -> Self {
        Self::new(&Conventions::default())
    }
}

/// Built-in patterns are constants and keywords are escaped, so compiling never fails.
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern:?}: {e}"))
}

/// `fun name(`, `fun <T> name(`, `fun String.name(` for each keyword.
fn definition_pattern(keywords: &[String]) -> Option<String> {
    let keywords: Vec<String> = keywords
        .iter()
        .filter(|k| !k.is_empty())
        .map(|k| regex::escape(k))
        .collect();
    if keywords.is_empty() {
        return None;
    }
    Some(format!(
        r"\b(?:{})\s+(?:<[^(]*?>\s*)?(?:[\w<>?]+\.)?(\w+)\s*\(",
        keywords.join("|")
    ))
}

pub struct CallSites<'p, 't> {
    text: &'t str,
    syntax: Syntax,
    lines: LineIndex,
    matches: CaptureMatches<'p, 't>,
}

impl Iterator for CallSites<'_, '_> {
    type Item = CallSite;

    fn next(&mut self) -> Option<CallSite> {
        loop {
            let caps = self.matches.next()?;
            let whole = caps.get(0)?;
            let open = whole.end() - 1;
            // An unclosed argument list is not a call site.
            let Some(span) = balanced(self.text, open, self.syntax) else {
                continue;
            };
            let arguments = &self.text[span];
            return Some(CallSite {
                receiver: caps[1].to_string(),
                method: caps[2].to_string(),
                arguments: arguments.to_string(),
                arity: arity(arguments, self.syntax),
                offset: whole.start(),
                line: self.lines.line(whole.start()),
            });
        }
    }
}

pub struct Definitions<'p, 't> {
    text: &'t str,
    syntax: Syntax,
    lines: LineIndex,
    matches: Option<CaptureMatches<'p, 't>>,
}

impl Iterator for Definitions<'_, '_> {
    type Item = Definition;

    fn next(&mut self) -> Option<Definition> {
        let matches = self.matches.as_mut()?;
        loop {
            let caps = matches.next()?;
            let whole = caps.get(0)?;
            let open = whole.end() - 1;
            let Some(span) = balanced(self.text, open, self.syntax) else {
                continue;
            };
            let end = span.end + 1;
            let parameters = &self.text[span];
            return Some(Definition {
                name: caps[1].to_string(),
                parameters: parameters.to_string(),
                arity: parameter_arity(parameters, self.syntax),
                offset: whole.start(),
                end,
                line: self.lines.line(whole.start()),
            });
        }
    }
}

/// Pairs methods with the exceptions they declare.
///
/// Keyword definitions come first, in textual order, with the
/// `@Throws(...)` annotations and `@throws` doc tags just above them. Then
/// every `throws` clause that follows a parameter list, attributed to the
/// name in front of that list, whether or not it was declared with a
/// keyword.
pub struct ThrowDeclarations<'p, 't> {
    patterns: &'p Patterns,
    text: &'t str,
    definitions: Definitions<'p, 't>,
    previous_end: usize,
    clauses: CaptureMatches<'p, 't>,
}

impl Iterator for ThrowDeclarations<'_, '_> {
    type Item = ThrowDeclaration;

    fn next(&mut self) -> Option<ThrowDeclaration> {
        for def in self.definitions.by_ref() {
            let preamble = &self.text[self.previous_end.min(def.offset)..def.offset];
            self.previous_end = def.end;

            let mut exceptions = Vec::new();
            for caps in self.patterns.throws_annotation.captures_iter(preamble) {
                exceptions.extend(caps[1].split(',').filter_map(exception_name));
            }
            for caps in self.patterns.throws_doc_tag.captures_iter(preamble) {
                exceptions.extend(exception_name(&caps[1]));
            }
            if !exceptions.is_empty() {
                return Some(ThrowDeclaration {
                    method: def.name,
                    exceptions,
                });
            }
        }

        loop {
            let caps = self.clauses.next()?;
            let Some(method) = declaring_method(self.text, caps.get(0)?.start()) else {
                continue;
            };
            let exceptions: Vec<String> = caps[1].split(',').filter_map(exception_name).collect();
            if exceptions.is_empty() {
                continue;
            }
            return Some(ThrowDeclaration { method, exceptions });
        }
    }
}

/// `load` in `User load(long id) throws ...`: the name in front of the
/// parameter list that a `throws` clause starting at `clause` follows.
fn declaring_method(text: &str, clause: usize) -> Option<String> {
    let head = text[..clause].trim_end();
    let close = head.len().checked_sub(1)?;
    let open = opening_paren(head, close)?;
    let before = head[..open].trim_end();
    let len = before.bytes().rev().take_while(|b| is_ident_byte(*b)).count();
    let name = &before[before.len() - len..];
    (!name.is_empty()).then(|| name.to_string())
}

/// `NotFoundError`, `NotFoundError::class`, `NotFoundError.class` and
/// `com.acme.NotFoundError` all name `NotFoundError`.
fn exception_name(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let path = raw.split("::").next().unwrap_or(raw);
    let path = path.strip_suffix(".class").unwrap_or(path);
    let name = path.rsplit('.').next().unwrap_or(path).trim();
    if !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        Some(name.to_string())
    } else {
        None
    }
}

pub struct ExceptionAssertions<'p, 't> {
    text: &'t str,
    syntax: Syntax,
    lines: LineIndex,
    matches: CaptureMatches<'p, 't>,
}

impl Iterator for ExceptionAssertions<'_, '_> {
    type Item = ExceptionAssertion;

    fn next(&mut self) -> Option<ExceptionAssertion> {
        loop {
            let caps = self.matches.next()?;
            if let Some(keyword) = caps.get(1) {
                let Some((exception, offset)) =
                    asserted_instance(self.text, keyword.end(), self.syntax)
                else {
                    continue;
                };
                return Some(ExceptionAssertion {
                    exception,
                    line: self.lines.line(offset),
                });
            }
            let Some(name) = caps.iter().skip(2).flatten().next() else {
                continue;
            };
            return Some(ExceptionAssertion {
                exception: name.as_str().to_string(),
                line: self.lines.line(name.start()),
            });
        }
    }
}

/// Walk `{ ... }.hasMessage("x").isInstanceOf(X::class.java)` starting
/// right after `assertThatThrownBy`. Yields the type named by the first
/// instance assertion in the chain and its offset; the walk stops at the
/// end of the chain, never in the next statement.
fn asserted_instance(text: &str, from: usize, syntax: Syntax) -> Option<(String, usize)> {
    let bytes = text.as_bytes();
    let block = balanced(text, skip_whitespace(bytes, from), syntax)?;
    let mut i = block.end + 1;
    loop {
        i = skip_whitespace(bytes, i);
        if bytes.get(i) != Some(&b'.') {
            return None;
        }
        let name_start = skip_whitespace(bytes, i + 1);
        let name_len = bytes[name_start..]
            .iter()
            .take_while(|b| is_ident_byte(**b))
            .count();
        let name = &text[name_start..name_start + name_len];
        let arguments = balanced(text, skip_whitespace(bytes, name_start + name_len), syntax)?;
        if INSTANCE_ASSERTIONS.contains(&name) {
            let first = top_level_segments(&text[arguments.clone()], syntax)
                .into_iter()
                .next()?;
            return exception_name(first).map(|exception| (exception, arguments.start));
        }
        i = arguments.end + 1;
    }
}

fn skip_whitespace(bytes: &[u8], from: usize) -> usize {
    from + bytes[from.min(bytes.len())..]
        .iter()
        .take_while(|b| b.is_ascii_whitespace())
        .count()
}
