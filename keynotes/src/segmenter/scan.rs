use std::ops::Range;

use tracing::trace;

use crate::Segment;
use crate::block::Block;
use crate::segmenter::diagnostic::SegmentWarning;
use crate::segmenter::line::{Line, LineKind, bullet_item, classify, closing_fence, split_lines};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run the line state machine over `source`.
pub(crate) fn scan_blocks(source: &str, file_id: usize) -> (Vec<Segment>, Vec<SegmentWarning>) {
    let lines = split_lines(source);
    let mut scanner = Scanner::new(&lines, file_id);

    let mut cursor = 0;
    while cursor < lines.len() {
        match scanner.step(cursor) {
            Step::Advance => cursor += 1,
            Step::Reprocess => {}
        }
    }

    scanner.finish()
}

// ---------------------------------------------------------------------------
// Scan state
// ---------------------------------------------------------------------------

/// What the scanner is in the middle of. Open blocks remember the index of
/// the line they started on.
enum State<'a> {
    Idle,
    InFence {
        language: &'a str,
        open: usize,
        body: Vec<&'a str>,
    },
    InList {
        first: usize,
        items: Vec<&'a str>,
    },
    InParagraph {
        first: usize,
        parts: Vec<&'a str>,
    },
}

/// Whether the current line was consumed.
enum Step {
    Advance,
    /// The line ended the open block and must be classified again from `Idle`.
    Reprocess,
}

struct Scanner<'a> {
    lines: &'a [Line<'a>],
    file_id: usize,
    state: State<'a>,
    segments: Vec<Segment>,
    warnings: Vec<SegmentWarning>,
}

impl<'a> Scanner<'a> {
    fn new(lines: &'a [Line<'a>], file_id: usize) -> Self {
        Scanner {
            lines,
            file_id,
            state: State::Idle,
            segments: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn step(&mut self, i: usize) -> Step {
        let line = self.lines[i];

        match std::mem::replace(&mut self.state, State::Idle) {
            State::Idle => {
                self.start_block(i);
                Step::Advance
            }

            // Everything up to the next fence line is taken verbatim.
            State::InFence {
                language,
                open,
                mut body,
            } => {
                match closing_fence(line.text) {
                    Some(trailing) => {
                        if !trailing.is_empty() {
                            self.warn(
                                SegmentWarning::warning(
                                    "closing code fence carries trailing text",
                                    line.start..line.end(),
                                    self.file_id,
                                )
                                .with_note(format!("`{}` is ignored", trailing)),
                            );
                        }
                        self.emit(code_block(language, &body), open..i + 1);
                    }
                    None => {
                        body.push(line.text);
                        self.state = State::InFence {
                            language,
                            open,
                            body,
                        };
                    }
                }
                Step::Advance
            }

            State::InList { first, mut items } => match bullet_item(line.text) {
                Some(item) => {
                    items.push(item);
                    self.state = State::InList { first, items };
                    Step::Advance
                }
                None => {
                    self.emit(list_block(&items), first..i);
                    Step::Reprocess
                }
            },

            // Greedy: once started, only a blank line ends a paragraph.
            State::InParagraph { first, mut parts } => {
                if line.is_blank() {
                    self.emit(paragraph_block(&parts), first..i);
                } else {
                    self.check_absorbed(&line);
                    parts.push(line.text);
                    self.state = State::InParagraph { first, parts };
                }
                Step::Advance
            }
        }
    }

    /// Classify line `i` from `Idle` and open (or directly emit) a block.
    fn start_block(&mut self, i: usize) {
        let line = self.lines[i];
        match classify(line.text) {
            LineKind::Blank => {}
            LineKind::FenceOpen { language } => {
                self.state = State::InFence {
                    language,
                    open: i,
                    body: Vec::new(),
                };
            }
            LineKind::Bullet { item } => {
                self.state = State::InList {
                    first: i,
                    items: vec![item],
                };
            }
            LineKind::Heading { content } => {
                self.emit(
                    Block::Heading {
                        content: content.to_string(),
                    },
                    i..i + 1,
                );
            }
            LineKind::Text => {
                self.state = State::InParagraph {
                    first: i,
                    parts: vec![line.text],
                };
            }
        }
    }

    /// Flag a line that would have started its own block after a blank line.
    fn check_absorbed(&mut self, line: &Line<'_>) {
        if let Some(what) = classify(line.text).describe() {
            self.warn(
                SegmentWarning::warning(
                    format!("line looks like {} but continues the preceding paragraph", what),
                    line.start..line.end(),
                    self.file_id,
                )
                .with_note("separate it from the paragraph with a blank line"),
            );
        }
    }

    fn emit(&mut self, block: Block, lines: Range<usize>) {
        let span = self.lines[lines.start].start..self.lines[lines.end - 1].end();
        trace!(kind = %block.kind(), ?lines, "emit block");
        self.segments.push(Segment { block, span, lines });
    }

    fn warn(&mut self, warning: SegmentWarning) {
        trace!(message = %warning.message, span = ?warning.span, "segment warning");
        self.warnings.push(warning);
    }

    /// Close whatever is still open at end of input.
    fn finish(mut self) -> (Vec<Segment>, Vec<SegmentWarning>) {
        let end = self.lines.len();

        match std::mem::replace(&mut self.state, State::Idle) {
            State::Idle => {}
            State::InFence {
                language,
                open,
                body,
            } => {
                let line = self.lines[open];
                self.warn(
                    SegmentWarning::warning(
                        "unterminated code fence",
                        line.start..line.end(),
                        self.file_id,
                    )
                    .with_note("the code block runs to the end of the text"),
                );
                self.emit(code_block(language, &body), open..end);
            }
            State::InList { first, items } => self.emit(list_block(&items), first..end),
            State::InParagraph { first, parts } => {
                self.emit(paragraph_block(&parts), first..end)
            }
        }

        (self.segments, self.warnings)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn code_block(language: &str, body: &[&str]) -> Block {
    Block::Code {
        language: language.to_string(),
        content: body.join("\n"),
    }
}

fn list_block(items: &[&str]) -> Block {
    Block::List {
        items: items.iter().map(|s| s.to_string()).collect(),
    }
}

/// Raw lines joined with one space; only the ends of the result are trimmed.
fn paragraph_block(parts: &[&str]) -> Block {
    Block::Paragraph {
        content: parts.join(" ").trim().to_string(),
    }
}
