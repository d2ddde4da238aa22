pub mod diagnostic;
mod line;
mod scan;

pub use diagnostic::SegmentWarning;

use tracing::debug;

use crate::Segmentation;
use crate::block::Block;

/// Segmenter entry point.
pub struct Segmenter<'a> {
    source: &'a str,
    file_id: usize,
}

impl<'a> Segmenter<'a> {
    pub fn new(source: &'a str, file_id: usize) -> Self {
        Segmenter { source, file_id }
    }

    /// Split the source into blocks. Total: every input yields a
    /// (possibly empty) segmentation, problems are only reported as warnings.
    pub fn segment(&self) -> Segmentation {
        let (segments, warnings) = scan::scan_blocks(self.source, self.file_id);
        debug!(
            bytes = self.source.len(),
            blocks = segments.len(),
            warnings = warnings.len(),
            "segmented text"
        );
        Segmentation {
            segments,
            warnings,
            source_id: self.file_id,
        }
    }
}

/// Segment `text` into blocks, discarding spans and warnings.
pub fn segment(text: &str) -> Vec<Block> {
    Segmenter::new(text, 0).segment().into_blocks()
}
