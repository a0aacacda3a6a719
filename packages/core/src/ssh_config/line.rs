//! Line classification for OpenSSH client config files
//!
//! Every raw line maps to exactly one [`LineKind`]. Classification never fails:
//! anything that does not fit a known shape degrades to [`LineKind::Comment`]
//! so that hand-edited files with unusual syntax still load.

/// The shape of a single config line, borrowing from the original text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Empty or whitespace-only
    Blank,
    /// Comment, or a line too malformed to mean anything
    Comment,
    /// `# Tags: a, b, c` with at least one non-empty tag
    TagComment(Vec<&'a str>),
    /// `Host pattern [pattern...]`
    HostDecl(Vec<&'a str>),
    /// Any other `Keyword value` line (value may be empty)
    Directive { keyword: &'a str, value: &'a str },
}

/// Classify one line of an SSH config file
pub fn classify(line: &str) -> LineKind<'_> {
    let trimmed = line.trim_start_matches('\u{feff}').trim();

    if trimmed.is_empty() {
        return LineKind::Blank;
    }

    if trimmed.starts_with('#') {
        return parse_tag_comment(trimmed).map_or(LineKind::Comment, LineKind::TagComment);
    }

    let (keyword, value) = split_keyword(trimmed);
    if keyword.is_empty() {
        return LineKind::Comment;
    }

    if keyword.eq_ignore_ascii_case("host") {
        let patterns: Vec<&str> = value.split_whitespace().collect();
        if patterns.is_empty() {
            return LineKind::Comment;
        }
        return LineKind::HostDecl(patterns);
    }

    LineKind::Directive { keyword, value }
}

/// Split a trimmed line into keyword and value.
///
/// The keyword ends at the first whitespace or `=`; OpenSSH accepts both
/// `Port 22` and `Port=22` (and `Port = 22`).
pub(crate) fn split_keyword(line: &str) -> (&str, &str) {
    let end = line
        .find(|c: char| c.is_whitespace() || c == '=')
        .unwrap_or(line.len());
    let (keyword, rest) = line.split_at(end);
    let rest = rest.trim_start();
    let rest = rest.strip_prefix('=').unwrap_or(rest);
    (keyword, rest.trim())
}

/// Parse `# Tags: a, b` (keyword case-insensitive). Returns `None` for any
/// other comment, including a tag comment whose list is empty.
fn parse_tag_comment(comment: &str) -> Option<Vec<&str>> {
    let body = comment.strip_prefix('#')?.trim_start();
    body.get(..4).filter(|k| k.eq_ignore_ascii_case("tags"))?;
    let list = body[4..].trim_start().strip_prefix(':')?;

    let tags: Vec<&str> = list
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();

    if tags.is_empty() { None } else { Some(tags) }
}
