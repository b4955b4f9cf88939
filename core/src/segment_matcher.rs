//! `SegmentMatcher` — Per-segment validation
//!
//! Every node of a route tree validates the value placed at its level. Literal
//! segments accept only their own text; dynamic segments accept values that
//! fully match the named group's inner pattern.
//!
//! Route patterns are written for PCRE, where `\d`, `\w` and `\s` are ASCII.
//! `regex` makes them Unicode-aware, so they are rewritten to ASCII POSIX
//! classes before compiling: `[\d]+` accepts `42` but not `٤٢`.

use regex::Regex;
use std::fmt;

/// Validator for one path segment.
///
/// # Example
///
/// ```
/// use pathwright::SegmentMatcher;
///
/// let literal = SegmentMatcher::literal("revisions");
/// assert!(literal.matches("revisions"));
/// assert!(!literal.matches("Revisions")); // case-sensitive
///
/// let id = SegmentMatcher::pattern(r"[\d]+").unwrap();
/// assert!(id.matches("12"));
/// assert!(!id.matches("12a")); // full match, not containment
/// ```
#[derive(Debug, Clone)]
pub enum SegmentMatcher {
    /// Exact string equality with the literal segment text.
    Literal(String),
    /// Full match against a named group's inner pattern (RE2 semantics, linear time).
    Pattern {
        /// The inner pattern as written in the route table.
        source: String,
        /// `^(?:source)$`, compiled once.
        regex: Regex,
    },
}

impl SegmentMatcher {
    /// Create a literal matcher.
    #[must_use]
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    /// Compile a pattern matcher.
    ///
    /// The pattern is wrapped as `^(?:pattern)$` so an alternation such as
    /// `a|b` cannot match a value that merely starts or ends with one branch.
    /// Perl classes are narrowed to ASCII first.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the pattern is not valid `regex` syntax.
    pub fn pattern(source: &str) -> Result<Self, regex::Error> {
        Regex::new(&format!("^(?:{})$", ascii_classes(source))).map(|regex| Self::Pattern {
            source: source.to_owned(),
            regex,
        })
    }

    /// Check a candidate value for this segment.
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Literal(text) => value == text,
            Self::Pattern { regex, .. } => regex.is_match(value),
        }
    }

    /// Returns `true` for pattern matchers.
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::Pattern { .. })
    }

    /// The literal text or the inner pattern, as written in the route table.
    #[must_use]
    pub fn source(&self) -> &str {
        match self {
            Self::Literal(text) => text,
            Self::Pattern { source, .. } => source,
        }
    }
}

impl fmt::Display for SegmentMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => write!(f, "Literal(\"{text}\")"),
            Self::Pattern { source, .. } => write!(f, "Pattern(\"{source}\")"),
        }
    }
}

/// Rewrite `\d`, `\w`, `\s` and their negations as ASCII POSIX classes.
///
/// Inside a bracket class the escape becomes `[:digit:]`, outside it becomes
/// `[[:digit:]]`. Escaped backslashes and existing POSIX classes pass through.
fn ascii_classes(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    let mut class_depth = 0usize;
    // a `]` right after `[` or `[^` is literal
    let mut class_start = false;

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                class_start = false;
                let Some(escaped) = chars.next() else {
                    out.push(c);
                    break;
                };
                match posix_class(escaped) {
                    Some(name) if class_depth > 0 => {
                        out.push_str("[:");
                        out.push_str(name);
                        out.push_str(":]");
                    }
                    Some(name) => {
                        out.push_str("[[:");
                        out.push_str(name);
                        out.push_str(":]]");
                    }
                    None => {
                        out.push(c);
                        out.push(escaped);
                    }
                }
            }
            '[' if class_depth > 0 && chars.peek() == Some(&':') => {
                class_start = false;
                out.push(c);
                for posix in chars.by_ref() {
                    out.push(posix);
                    if posix == ']' {
                        break;
                    }
                }
            }
            '[' => {
                class_depth += 1;
                out.push(c);
                if chars.peek() == Some(&'^') {
                    out.push('^');
                    chars.next();
                }
                class_start = true;
            }
            ']' if class_depth > 0 && !class_start => {
                class_depth -= 1;
                out.push(c);
            }
            _ => {
                class_start = false;
                out.push(c);
            }
        }
    }
    out
}

fn posix_class(escape: char) -> Option<&'static str> {
    match escape {
        'd' => Some("digit"),
        'D' => Some("^digit"),
        'w' => Some("word"),
        'W' => Some("^word"),
        's' => Some("space"),
        'S' => Some("^space"),
        _ => None,
    }
}
