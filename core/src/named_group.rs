//! Named capture groups inside route segments.
//!
//! Route strings embed PCRE-style named groups: `(?P<id>[\d]+)`. Both the
//! `(?P<name>…)` and the bare `(?<name>…)` spellings are recognized. The inner
//! pattern ends at the first `)` that is not escaped, not inside a character
//! class, and not closing a nested group, so `(?P<plugin>[^.\/]+(?:\/[^.\/]+)?)`
//! is read as one group.

/// A named group found inside one route segment.
///
/// # Example
///
/// ```
/// use pathwright::NamedGroup;
///
/// let group = NamedGroup::find(r"(?P<id>[\d]+)").unwrap();
/// assert_eq!(group.name, "id");
/// assert_eq!(group.pattern, r"[\d]+");
///
/// assert!(NamedGroup::find("revisions").is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedGroup<'a> {
    /// The group name, e.g. `id`.
    pub name: &'a str,
    /// The inner pattern, e.g. `[\d]+`.
    pub pattern: &'a str,
}

impl<'a> NamedGroup<'a> {
    /// Find the first named group in `segment`.
    ///
    /// Text around the group is allowed and ignored. Returns `None` if the
    /// segment holds no well-formed named group.
    #[must_use]
    pub fn find(segment: &'a str) -> Option<Self> {
        segment
            .match_indices("(?")
            .find_map(|(start, _)| scan_group(&segment[start..]))
            .map(|(group, _)| group)
    }
}

/// Returns `true` if `segment` contains the opening of a named group
/// (`(?P<` or a `(?<` that is not a lookbehind), whether or not the group is
/// well-formed.
///
/// A segment for which this is `true` but [`NamedGroup::find`] is `None` is a
/// grammar error in the route table.
#[must_use]
pub fn opens_group(segment: &str) -> bool {
    segment
        .match_indices("(?")
        .any(|(start, _)| {
            let rest = &segment[start + 2..];
            rest.starts_with("P<")
                || (rest.starts_with('<') && !rest.starts_with("<=") && !rest.starts_with("<!"))
        })
}

/// Split a route string into its `/`-separated components.
///
/// A `/` inside a named group's pattern does not split. Empty components
/// (leading, trailing or doubled slashes) are dropped.
///
/// ```
/// use pathwright::split_path;
///
/// assert_eq!(
///     split_path(r"plugins/(?P<plugin>[^.\/]+(?:\/[^.\/]+)?)"),
///     vec!["plugins", r"(?P<plugin>[^.\/]+(?:\/[^.\/]+)?)"],
/// );
/// ```
#[must_use]
pub fn split_path(path: &str) -> Vec<&str> {
    let bytes = path.as_bytes();
    let mut components = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'/' => {
                if i > start {
                    components.push(&path[start..i]);
                }
                i += 1;
                start = i;
            }
            b'(' => match scan_group(&path[i..]) {
                Some((_, len)) => i += len,
                None => i += 1,
            },
            _ => i += 1,
        }
    }

    if start < bytes.len() {
        components.push(&path[start..]);
    }
    components
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

/// Byte offset of the group name in `s`, which must start with `(?`.
fn name_offset(s: &str) -> Option<usize> {
    let rest = s.strip_prefix("(?")?;
    let offset = if rest.starts_with("P<") {
        4
    } else if rest.starts_with('<') {
        3
    } else {
        return None;
    };
    // `(?<=` and `(?<!` are lookbehinds, not names
    s[offset..]
        .chars()
        .next()
        .filter(|c| is_name_char(*c))
        .map(|_| offset)
}

/// Scan a named group at the very start of `s`.
///
/// Returns the group and the byte length of the whole `(?P<name>pattern)` token.
fn scan_group(s: &str) -> Option<(NamedGroup<'_>, usize)> {
    let name_start = name_offset(s)?;
    let name_len = s[name_start..].find(|c: char| !is_name_char(c))?;
    let name_end = name_start + name_len;
    if s.as_bytes().get(name_end) != Some(&b'>') {
        return None;
    }

    let body_start = name_end + 1;
    let body_len = body_len(&s[body_start..])?;
    let group = NamedGroup {
        name: &s[name_start..name_end],
        pattern: &s[body_start..body_start + body_len],
    };
    Some((group, body_start + body_len + 1))
}

/// Length of a group body, up to but excluding the `)` that closes the group.
fn body_len(body: &str) -> Option<usize> {
    let bytes = body.as_bytes();
    let mut depth = 0usize;
    let mut in_class = false;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'[' if !in_class => {
                in_class = true;
                // a `]` right after `[` or `[^` is literal
                if bytes.get(i + 1) == Some(&b'^') {
                    i += 1;
                }
                if bytes.get(i + 1) == Some(&b']') {
                    i += 1;
                }
            }
            b']' if in_class => in_class = false,
            b'(' if !in_class => depth += 1,
            b')' if !in_class => {
                if depth == 0 {
                    return Some(i);
                }
                depth -= 1;
            }
            _ => {}
        }
        i += 1;
    }
    None
}
