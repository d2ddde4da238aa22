use std::fmt;

/// One classified unit of a summary text.
/// Blocks are built once per segmentation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Block {
    /// Verbatim interior of a fenced region. `language` may be empty.
    Code { language: String, content: String },
    /// Consecutive bullet lines, markers stripped. Never empty.
    List { items: Vec<String> },
    /// A single `#` heading (markers stripped) or a label line (label kept).
    Heading { content: String },
    /// Consecutive prose lines joined with single spaces.
    Paragraph { content: String },
}

/// Fieldless discriminant of [`Block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Code,
    List,
    Heading,
    Paragraph,
}

impl Block {
    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Code { .. } => BlockKind::Code,
            Block::List { .. } => BlockKind::List,
            Block::Heading { .. } => BlockKind::Heading,
            Block::Paragraph { .. } => BlockKind::Paragraph,
        }
    }
}

impl BlockKind {
    pub const ALL: [BlockKind; 4] = [
        BlockKind::Code,
        BlockKind::List,
        BlockKind::Heading,
        BlockKind::Paragraph,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Code => "code",
            BlockKind::List => "list",
            BlockKind::Heading => "heading",
            BlockKind::Paragraph => "paragraph",
        }
    }

    /// Inverse of [`BlockKind::as_str`].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Markdown-like approximation of the block. Lossy: paragraphs come back
/// on one line and label headings are written as-is.
impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Block::Code { language, content } => {
                writeln!(f, "```{}", language)?;
                if !content.is_empty() {
                    writeln!(f, "{}", content)?;
                }
                writeln!(f, "```")
            }
            Block::List { items } => {
                for item in items {
                    writeln!(f, "- {}", item)?;
                }
                Ok(())
            }
            Block::Heading { content } => writeln!(f, "{}", content),
            Block::Paragraph { content } => writeln!(f, "{}", content),
        }
    }
}
