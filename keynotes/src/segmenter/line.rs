//! Line splitting and single-line classification.

pub(crate) const FENCE: &str = "```";

/// Prefixes that mark a line as a heading without any `#` marker.
pub(crate) const LABELS: [&str; 3] = ["Answer:", "Explanation:", "Summary:"];

/// One source line with its terminator removed.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Line<'a> {
    pub text: &'a str,
    /// Byte offset of the first character.
    pub start: usize,
}

impl Line<'_> {
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Split on `\n`, dropping one trailing `\r` per line. Empty lines are kept,
/// so a text ending in a newline has a final empty line.
pub(crate) fn split_lines(source: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut offset = 0;
    for piece in source.split('\n') {
        let text = piece.strip_suffix('\r').unwrap_or(piece);
        lines.push(Line { text, start: offset });
        offset += piece.len() + 1;
    }
    lines
}

/// What a line would start if a new block began on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineKind<'a> {
    Blank,
    FenceOpen { language: &'a str },
    Bullet { item: &'a str },
    Heading { content: &'a str },
    Text,
}

impl LineKind<'_> {
    /// Human name used in warnings, `None` for lines that start nothing special.
    pub fn describe(&self) -> Option<&'static str> {
        match self {
            LineKind::FenceOpen { .. } => Some("a code fence"),
            LineKind::Bullet { .. } => Some("a list item"),
            LineKind::Heading { .. } => Some("a heading"),
            LineKind::Blank | LineKind::Text => None,
        }
    }
}

/// Classify a line. Precedence is fixed: fence, bullet, heading, text.
pub(crate) fn classify(text: &str) -> LineKind<'_> {
    let line = text.trim_end();
    if line.trim_start().is_empty() {
        return LineKind::Blank;
    }
    if let Some(rest) = line.strip_prefix(FENCE) {
        return LineKind::FenceOpen {
            language: rest.trim(),
        };
    }
    if let Some(item) = bullet_item(line) {
        return LineKind::Bullet { item };
    }
    if let Some(content) = heading_content(line) {
        return LineKind::Heading { content };
    }
    LineKind::Text
}

/// `-` or `*`, at least one whitespace character, then text.
/// Tested against the fully trimmed line; returns the text.
pub(crate) fn bullet_item(text: &str) -> Option<&str> {
    let line = text.trim();
    let rest = line.strip_prefix(|c: char| c == '-' || c == '*')?;
    let item = rest.trim_start();
    if item.len() == rest.len() || item.is_empty() {
        return None;
    }
    Some(item)
}

/// A closing fence is any raw line starting with the fence marker.
/// Returns whatever follows the marker, trimmed.
pub(crate) fn closing_fence(text: &str) -> Option<&str> {
    text.strip_prefix(FENCE).map(str::trim)
}

/// 1-6 `#` then whitespace, or a label prefix. Expects a right-trimmed line.
fn heading_content(line: &str) -> Option<&str> {
    let after_hashes = line.trim_start_matches('#');
    let hashes = line.len() - after_hashes.len();
    if (1..=6).contains(&hashes) && after_hashes.starts_with(char::is_whitespace) {
        return Some(after_hashes.trim_start());
    }
    if LABELS.iter().any(|label| line.starts_with(label)) {
        // Only a leading `#` run is ever stripped, so labels stay in place.
        return Some(line);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_keeps_empty_lines_and_offsets() {
        let lines = split_lines("a\r\n\nbc\n");
        let texts: Vec<&str> = lines.iter().map(|l| l.text).collect();
        assert_eq!(texts, vec!["a", "", "bc", ""]);
        assert_eq!(lines[2].start, 4);
        assert_eq!(lines[2].end(), 6);
    }

    #[test]
    fn lone_carriage_return_is_not_a_separator() {
        let lines = split_lines("a\rb");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "a\rb");
    }

    #[test]
    fn fence_language_is_trimmed() {
        assert_eq!(
            classify("```  rust  "),
            LineKind::FenceOpen { language: "rust" }
        );
        assert_eq!(classify("```"), LineKind::FenceOpen { language: "" });
    }

    #[test]
    fn indented_fence_is_not_a_fence() {
        assert_eq!(classify("  ```js"), LineKind::Text);
    }

    #[test]
    fn bullets() {
        assert_eq!(bullet_item("- a"), Some("a"));
        assert_eq!(bullet_item("*\tb c"), Some("b c"));
        assert_eq!(bullet_item("   -   spaced  "), Some("spaced"));
        assert_eq!(bullet_item("-"), None);
        assert_eq!(bullet_item("- "), None);
        assert_eq!(bullet_item("-x"), None);
        assert_eq!(bullet_item("**bold** text"), None);
        assert_eq!(bullet_item("+ plus"), None);
    }

    #[test]
    fn hash_headings() {
        assert_eq!(classify("# A"), LineKind::Heading { content: "A" });
        assert_eq!(
            classify("######   Six  "),
            LineKind::Heading { content: "Six" }
        );
        assert_eq!(classify("####### Seven"), LineKind::Text);
        assert_eq!(classify("#NoSpace"), LineKind::Text);
        assert_eq!(classify("## "), LineKind::Text);
    }

    #[test]
    fn label_headings_keep_their_label() {
        assert_eq!(
            classify("Answer: 42"),
            LineKind::Heading { content: "Answer: 42" }
        );
        assert_eq!(
            classify("Summary:"),
            LineKind::Heading { content: "Summary:" }
        );
        assert_eq!(classify("answer: lower"), LineKind::Text);
        assert_eq!(classify(" Explanation: indented"), LineKind::Text);
    }

    #[test]
    fn precedence_is_fence_then_bullet_then_heading() {
        assert_eq!(
            classify("```- a"),
            LineKind::FenceOpen { language: "- a" }
        );
        assert_eq!(classify("- # a"), LineKind::Bullet { item: "# a" });
    }

    #[test]
    fn whitespace_only_is_blank() {
        assert_eq!(classify(""), LineKind::Blank);
        assert_eq!(classify(" \t "), LineKind::Blank);
    }

    #[test]
    fn closing_fence_reports_trailing_text() {
        assert_eq!(closing_fence("```"), Some(""));
        assert_eq!(closing_fence("``` python "), Some("python"));
        assert_eq!(closing_fence(" ```"), None);
    }
}
