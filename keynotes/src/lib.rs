pub mod block;
pub mod segmenter;

use std::ops::Range;

use crate::block::Block;
use crate::segmenter::SegmentWarning;

pub use segmenter::{Segmenter, segment};

/// A segmented summary text.
#[derive(Debug, Clone)]
pub struct Segmentation {
    /// Blocks in document order, each with its source location.
    pub segments: Vec<Segment>,
    /// Degraded-classification warnings. Never affect `segments`.
    pub warnings: Vec<SegmentWarning>,
    /// The source file ID (for error reporting with codespan-reporting).
    pub source_id: usize,
}

/// A block together with the region of the source it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub block: Block,
    /// Byte span in source, fence lines included for code blocks.
    pub span: Range<usize>,
    /// 0-based line range in source.
    pub lines: Range<usize>,
}

impl Segmentation {
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.segments.iter().map(|s| &s.block)
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.segments.into_iter().map(|s| s.block).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }
}
