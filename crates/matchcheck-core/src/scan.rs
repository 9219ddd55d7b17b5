//! Delimiter-aware scanning over unparsed source text.
//!
//! Regexes find where a call or definition starts; everything that has to
//! respect nesting (argument lists, parameter lists, top-level commas) goes
//! through the depth-counting walkers here. String literals, char literals
//! and comments are skipped as opaque so delimiters inside them never count.
//! What counts as a comment depends on the corpus [`Syntax`].

use std::ops::Range;

/// Comment and literal conventions of one corpus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Syntax {
    /// `//` and `/* */` comments, `"""` raw strings (Kotlin, Java, Scala, ...)
    #[default]
    CFamily,
    /// `#` comments, `'''`/`"""` strings; `//` is floor division
    Python,
}

impl Syntax {
    /// Guess the syntax from the text: a block header such as
    /// `def name(...):` or `class Name:` marks Python.
    pub fn detect(text: &str) -> Self {
        let python = text.lines().map(str::trim).any(|line| {
            let header = line.starts_with("def ")
                || line.starts_with("async def ")
                || line.starts_with("class ");
            header && line.ends_with(':')
        });
        if python {
            Syntax::Python
        } else {
            Syntax::CFamily
        }
    }
}

/// Byte range strictly between the `(`, `[` or `{` at `open` and its match.
///
/// Returns `None` when `open` is not an opening delimiter or the text ends
/// before it is closed.
pub fn balanced(text: &str, open: usize, syntax: Syntax) -> Option<Range<usize>> {
    let bytes = text.as_bytes();
    let (opener, closer) = match *bytes.get(open)? {
        b'(' => (b'(', b')'),
        b'[' => (b'[', b']'),
        b'{' => (b'{', b'}'),
        _ => return None,
    };

    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        if let Some(next) = skip_opaque(bytes, i, syntax) {
            i = next;
            continue;
        }
        if bytes[i] == opener {
            depth += 1;
        } else if bytes[i] == closer {
            depth -= 1;
            if depth == 0 {
                return Some(open + 1..i);
            }
        }
        i += 1;
    }
    None
}

/// Index of the `(` matching the `)` at `close`, walking backwards.
///
/// Literals and comments are not recognized in this direction, so this is
/// only meant for short declaration headers.
pub fn opening_paren(text: &str, close: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(close) != Some(&b')') {
        return None;
    }
    let mut depth = 0usize;
    for i in (0..=close).rev() {
        match bytes[i] {
            b')' => depth += 1,
            b'(' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split an argument or parameter list on commas that sit at nesting depth
/// zero. Segments are trimmed; empty ones are dropped.
pub fn top_level_segments(text: &str, syntax: Syntax) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut nesting = 0usize;
    let mut angles = 0usize;
    let mut start = 0usize;
    let mut i = 0usize;

    while i < bytes.len() {
        if let Some(next) = skip_opaque(bytes, i, syntax) {
            i = next;
            continue;
        }
        match bytes[i] {
            b'(' | b'[' | b'{' => nesting += 1,
            b')' | b']' | b'}' => nesting = nesting.saturating_sub(1),
            b'<' if opens_generic(bytes, i) => angles += 1,
            b'>' if angles > 0 && !is_arrow(bytes, i) => angles -= 1,
            b',' if nesting == 0 && angles == 0 => {
                push_segment(&text[start..i], &mut segments);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    push_segment(&text[start..], &mut segments);
    segments
}

/// Number of top-level arguments or parameters in a list.
pub fn arity(list: &str, syntax: Syntax) -> usize {
    top_level_segments(list, syntax).len()
}

/// Like [`arity`], but a leading receiver parameter (`self`, `cls`,
/// `&self`, `&mut self`) does not count.
pub fn parameter_arity(list: &str, syntax: Syntax) -> usize {
    let segments = top_level_segments(list, syntax);
    match segments.first() {
        Some(first) if is_receiver_parameter(first) => segments.len() - 1,
        _ => segments.len(),
    }
}

fn is_receiver_parameter(segment: &str) -> bool {
    let name = segment.split(':').next().unwrap_or(segment).trim();
    matches!(name, "self" | "cls" | "&self" | "&mut self" | "mut self")
}

fn push_segment<'a>(segment: &'a str, segments: &mut Vec<&'a str>) {
    let segment = segment.trim();
    if !segment.is_empty() {
        segments.push(segment);
    }
}

/// If a string literal, char literal or comment starts at `i`, the index
/// just past it.
fn skip_opaque(bytes: &[u8], i: usize, syntax: Syntax) -> Option<usize> {
    let rest = &bytes[i..];
    match (syntax, bytes[i]) {
        (_, b'"') if rest.starts_with(b"\"\"\"") => Some(skip_past(bytes, i + 3, b"\"\"\"")),
        (Syntax::Python, b'\'') if rest.starts_with(b"'''") => Some(skip_past(bytes, i + 3, b"'''")),
        (_, b'"' | b'\'') => Some(skip_quoted(bytes, i)),
        (Syntax::CFamily, b'/') if rest.starts_with(b"//") => Some(skip_past(bytes, i + 2, b"\n")),
        (Syntax::CFamily, b'/') if rest.starts_with(b"/*") => Some(skip_past(bytes, i + 2, b"*/")),
        (Syntax::Python, b'#') => Some(skip_past(bytes, i + 1, b"\n")),
        _ => None,
    }
}

/// Index just past the next `terminator` at or after `from`, or the end of
/// the text when there is none.
fn skip_past(bytes: &[u8], from: usize, terminator: &[u8]) -> usize {
    find(bytes, from, terminator)
        .map(|end| end + terminator.len())
        .unwrap_or(bytes.len())
}

/// Quoted literals never span lines; an unterminated one ends at the newline.
fn skip_quoted(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => return i,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn find(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from >= bytes.len() {
        return None;
    }
    bytes[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|pos| from + pos)
}

/// `List<Int>`, `Map<out K, V>`, `Array<*>`: a `<` glued to an identifier
/// and followed by a type. `a < b` and `i<n` stay comparisons.
fn opens_generic(bytes: &[u8], i: usize) -> bool {
    let glued = i > 0 && is_ident_byte(bytes[i - 1]);
    if !glued {
        return false;
    }
    let rest = &bytes[i + 1..];
    match rest.first() {
        Some(b) if b.is_ascii_uppercase() => true,
        Some(b'*' | b'?' | b'<') => true,
        _ => rest.starts_with(b"out ") || rest.starts_with(b"in "),
    }
}

fn is_arrow(bytes: &[u8], i: usize) -> bool {
    i > 0 && matches!(bytes[i - 1], b'-' | b'=')
}

pub(crate) fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Maps byte offsets to 1-based line numbers.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { line_starts }
    }

    pub fn line(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx + 1,
            Err(idx) => idx,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const C: Syntax = Syntax::CFamily;
    const PY: Syntax = Syntax::Python;

    #[test]
    fn balanced_skips_nested_calls() {
        let text = "service.save(build(a, b), c)";
        let open = text.find('(').unwrap();
        let span = balanced(text, open, C).unwrap();
        assert_eq!(&text[span], "build(a, b), c");
    }

    #[test]
    fn balanced_matches_braces() {
        let text = "assertThatThrownBy { svc.load(\"}\") }.hasMessage(\"x\")";
        let open = text.find('{').unwrap();
        let span = balanced(text, open, C).unwrap();
        assert_eq!(&text[span], " svc.load(\"}\") ");
    }

    #[test]
    fn balanced_ignores_parens_in_strings() {
        let text = r#"repo.find(")", 'x')"#;
        let open = text.find('(').unwrap();
        let span = balanced(text, open, C).unwrap();
        assert_eq!(&text[span], r#"")", 'x'"#);
    }

    #[test]
    fn balanced_ignores_comments() {
        let text = "run(a, // trailing )\n b /* ) */)";
        let span = balanced(text, 3, C).unwrap();
        assert_eq!(&text[span], "a, // trailing )\n b /* ) */");
    }

    #[test]
    fn balanced_unclosed_is_none() {
        assert_eq!(balanced("call(a, (b)", 4, C), None);
        assert_eq!(balanced("no paren here", 0, C), None);
    }

    #[test]
    fn python_floor_division_is_not_a_comment() {
        let text = "calc.div(a // b, c)\nother.call(x)";
        let open = text.find('(').unwrap();
        let span = balanced(text, open, PY).unwrap();
        assert_eq!(&text[span], "a // b, c");
        assert_eq!(arity("a // b, c", PY), 2);
    }

    #[test]
    fn python_hash_comments_are_opaque() {
        let text = "calc.add(a, # closing ) here\n b)";
        let span = balanced(text, 8, PY).unwrap();
        assert_eq!(&text[span], "a, # closing ) here\n b");
        assert_eq!(arity("'''a, b''', c", PY), 2);
    }

    #[test]
    fn syntax_detection() {
        assert_eq!(Syntax::detect("class Calc:\n    def add(self, a, b):\n        pass"), PY);
        assert_eq!(Syntax::detect("def test_div(self) -> None:\n    pass"), PY);
        assert_eq!(Syntax::detect("class Calc : Base() {\n    fun add(a: Int) = a\n}"), C);
        assert_eq!(Syntax::detect(""), C);
    }

    #[test]
    fn opening_paren_walks_back_over_nesting() {
        let text = "load(@Named(\"id\") long id) throws X";
        let close = text.rfind(')').unwrap();
        assert_eq!(opening_paren(text, close), Some(4));
        assert_eq!(opening_paren("a)", 1), None);
        assert_eq!(opening_paren("abc", 1), None);
    }

    #[test]
    fn segments_respect_nesting() {
        assert_eq!(
            top_level_segments("build(a, b), listOf(1, 2, 3), c", C),
            vec!["build(a, b)", "listOf(1, 2, 3)", "c"]
        );
        assert_eq!(arity("x: Map<String, List<Int>>, y: Int", C), 2);
        assert_eq!(arity("mapOf<String, Int>()", C), 1);
        assert_eq!(arity("items: Array<out T>, count: Int", C), 2);
    }

    #[test]
    fn segments_treat_comparisons_as_operators() {
        assert_eq!(arity("a < b, c > d", C), 2);
        assert_eq!(arity("i<n, flag", C), 2);
    }

    #[test]
    fn segments_ignore_commas_in_literals_and_lambdas() {
        assert_eq!(arity(r#""a, b", 'c'"#, C), 2);
        assert_eq!(arity("{ x, y -> x + y }", C), 1);
        assert_eq!(arity("f: (Int, Int) -> Int, g: Int", C), 2);
    }

    #[test]
    fn empty_segments_are_dropped() {
        assert_eq!(arity("", C), 0);
        assert_eq!(arity("   \n  ", C), 0);
        assert_eq!(arity("a, b,", C), 2);
    }

    #[test]
    fn receiver_parameters_do_not_count() {
        assert_eq!(parameter_arity("self, items, tax", PY), 2);
        assert_eq!(parameter_arity("cls", PY), 0);
        assert_eq!(parameter_arity("&mut self, input: &str", C), 1);
        assert_eq!(parameter_arity("self_test, other", PY), 2);
        assert_eq!(parameter_arity("items, self", PY), 2);
    }

    #[test]
    fn line_index_is_one_based() {
        let text = "first\nsecond\nthird";
        let lines = LineIndex::new(text);
        assert_eq!(lines.line(0), 1);
        assert_eq!(lines.line(5), 1);
        assert_eq!(lines.line(6), 2);
        assert_eq!(lines.line(text.find("third").unwrap()), 3);
    }
}
