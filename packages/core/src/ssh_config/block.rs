//! Host block assembly
//!
//! Groups classified lines into `Host` blocks in file order. Lines before the
//! first `Host` line (global defaults) and lines after a `Match` line are not
//! attributed to any block; they stay in the file untouched.

use super::line::{LineKind, classify};
use super::pattern::{is_literal, matches_any};

/// One directive line inside a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawDirective {
    pub keyword: String,
    pub value: String,
    /// 1-based line number
    pub line: usize,
}

/// A `Host` declaration plus the directives that follow it
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawBlock {
    pub patterns: Vec<String>,
    /// 1-based line number of the `Host` line
    pub line: usize,
    /// Tags from the `# Tags:` comment attached to this block
    pub tags: Vec<String>,
    /// 1-based line number of the attached tag comment
    pub tag_line: Option<usize>,
    pub directives: Vec<RawDirective>,
}

impl RawBlock {
    fn new(line: usize, patterns: Vec<&str>, pending: Option<(usize, Vec<String>)>) -> Self {
        let (tag_line, tags) = match pending {
            Some((tag_line, tags)) => (Some(tag_line), tags),
            None => (None, Vec::new()),
        };
        Self {
            patterns: patterns.into_iter().map(String::from).collect(),
            line,
            tags,
            tag_line,
            directives: Vec::new(),
        }
    }

    /// Whether `name` appears verbatim as a literal pattern of this block
    pub fn declares(&self, name: &str) -> bool {
        self.literal_names().any(|n| n == name)
    }

    /// Whether this block applies to `name` under glob and negation rules
    pub fn matches(&self, name: &str) -> bool {
        matches_any(name, &self.patterns)
    }

    /// Literal (addressable) names declared by this block
    pub fn literal_names(&self) -> impl Iterator<Item = &str> {
        self.patterns
            .iter()
            .map(String::as_str)
            .filter(|p| is_literal(p))
    }

    /// Last line that belongs to this block: its final directive, or the
    /// `Host` line itself for an empty block
    pub fn end_line(&self) -> usize {
        self.directives.last().map_or(self.line, |d| d.line)
    }

    /// First line that belongs to this block, counting its tag comment
    pub fn start_line(&self) -> usize {
        self.tag_line.unwrap_or(self.line)
    }
}

/// Split config text into `Host` blocks, in file order
pub(crate) fn assemble(text: &str) -> Vec<RawBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<RawBlock> = None;
    let mut pending_tags: Option<(usize, Vec<String>)> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;

        match classify(raw) {
            LineKind::Blank => {}
            LineKind::Comment => pending_tags = None,
            LineKind::TagComment(tags) => {
                pending_tags = Some((line, tags.into_iter().map(String::from).collect()));
            }
            LineKind::HostDecl(patterns) => {
                blocks.extend(current.take());
                current = Some(RawBlock::new(line, patterns, pending_tags.take()));
            }
            LineKind::Directive { keyword, value } => {
                pending_tags = None;

                // Match starts a block type this model does not handle
                if keyword.eq_ignore_ascii_case("match") {
                    blocks.extend(current.take());
                    continue;
                }

                if let Some(block) = current.as_mut() {
                    block.directives.push(RawDirective {
                        keyword: keyword.to_string(),
                        value: value.to_string(),
                        line,
                    });
                }
            }
        }
    }

    blocks.extend(current);
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_group_under_nearest_host() {
        let text = "\
User global
Host a
    HostName a.example.com
    Port 22

Host b c
    User bob
";
        let blocks = assemble(text);
        assert_eq!(blocks.len(), 2);

        assert_eq!(blocks[0].patterns, vec!["a"]);
        assert_eq!(blocks[0].line, 2);
        assert_eq!(blocks[0].directives.len(), 2);
        assert_eq!(blocks[0].end_line(), 4);

        assert_eq!(blocks[1].patterns, vec!["b", "c"]);
        assert_eq!(blocks[1].line, 6);
        assert_eq!(blocks[1].directives[0].keyword, "User");
        assert_eq!(blocks[1].directives[0].value, "bob");
    }

    #[test]
    fn tag_comment_attaches_across_blank_lines() {
        let text = "# Tags: prod, web\n\n\nHost a\n";
        let blocks = assemble(text);
        assert_eq!(blocks[0].tags, vec!["prod", "web"]);
        assert_eq!(blocks[0].tag_line, Some(1));
        assert_eq!(blocks[0].start_line(), 1);
    }

    #[test]
    fn tag_comment_broken_by_directive_or_comment() {
        let text = "\
# Tags: lost
User root
Host a
# Tags: also-lost
# unrelated
Host b
";
        let blocks = assemble(text);
        assert!(blocks[0].tags.is_empty());
        assert!(blocks[1].tags.is_empty());
        assert_eq!(blocks[1].tag_line, None);
    }

    #[test]
    fn tag_comment_inside_block_goes_to_next_host() {
        let text = "Host a\n    User x\n# Tags: db\nHost b\n";
        let blocks = assemble(text);
        assert!(blocks[0].tags.is_empty());
        assert_eq!(blocks[0].end_line(), 2);
        assert_eq!(blocks[1].tags, vec!["db"]);
    }

    #[test]
    fn match_line_ends_host_block() {
        let text = "Host a\n    User x\nMatch user root\n    Port 99\nHost b\n    Port 1\n";
        let blocks = assemble(text);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].directives.len(), 1);
        assert_eq!(blocks[1].directives[0].line, 6);
    }

    #[test]
    fn empty_block_ends_at_host_line() {
        let blocks = assemble("Host lonely\n");
        assert_eq!(blocks[0].end_line(), 1);
    }

    #[test]
    fn literal_names_skip_globs_and_negations() {
        let blocks = assemble("Host a web* !b ?x c\n");
        let names: Vec<&str> = blocks[0].literal_names().collect();
        assert_eq!(names, vec!["a", "c"]);
    }
}
