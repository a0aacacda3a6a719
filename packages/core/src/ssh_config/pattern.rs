//! Host pattern matching
//!
//! OpenSSH `Host` patterns: `*` matches any run of characters, `?` matches
//! exactly one, anything else matches itself. A pattern prefixed with `!`
//! negates: if it matches, the whole pattern list is rejected regardless of
//! the other patterns. Like `ssh`, which lowercases the host name before
//! matching, pattern application ignores ASCII case.

/// Whether a pattern names a single concrete host
pub fn is_literal(pattern: &str) -> bool {
    !pattern.starts_with('!') && !pattern.contains(['*', '?'])
}

/// Whether `name` is selected by a `Host` pattern list.
///
/// At least one positive pattern must match and no negated pattern may match.
/// A list containing only negations never matches.
pub fn matches_any(name: &str, patterns: &[String]) -> bool {
    let mut matched = false;

    for pattern in patterns {
        match pattern.strip_prefix('!') {
            Some(negated) => {
                if glob_match(negated, name) {
                    return false;
                }
            }
            None => {
                if !matched && glob_match(pattern, name) {
                    matched = true;
                }
            }
        }
    }

    matched
}

/// Glob match with `*` and `?`, iterative with single-star backtracking.
/// ASCII letters match regardless of case.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0, 0);
    let mut star: Option<usize> = None;
    let mut star_text = 0;

    while t < text.len() {
        if p < pattern.len() && pattern[p] == '*' {
            star = Some(p);
            star_text = t;
            p += 1;
        } else if p < pattern.len()
            && (pattern[p] == '?' || pattern[p].eq_ignore_ascii_case(&text[t]))
        {
            p += 1;
            t += 1;
        } else if let Some(star_pos) = star {
            // Let the last star swallow one more character
            p = star_pos + 1;
            star_text += 1;
            t = star_text;
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}
