use std::sync::Arc;

use keynotes::block::Block;

use crate::cache::SegmentCache;

/// What a summary slot shows: either the sentinel or the segmented text.
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryView<'a> {
    /// Absent or empty text. The segmenter is never called for it.
    NotGenerated,
    Ready {
        /// The original text, kept for copying.
        raw: &'a str,
        blocks: Arc<[Block]>,
    },
}

impl<'a> SummaryView<'a> {
    pub fn from_text(text: Option<&'a str>) -> Self {
        match present(text) {
            Some(raw) => SummaryView::Ready {
                raw,
                blocks: keynotes::segment(raw).into(),
            },
            None => SummaryView::NotGenerated,
        }
    }

    /// Like [`SummaryView::from_text`], reusing blocks for text seen before.
    pub fn from_text_cached(text: Option<&'a str>, cache: &mut SegmentCache) -> Self {
        match present(text) {
            Some(raw) => SummaryView::Ready {
                raw,
                blocks: cache.get_or_segment(raw),
            },
            None => SummaryView::NotGenerated,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, SummaryView::Ready { .. })
    }

    pub fn blocks(&self) -> &[Block] {
        match self {
            SummaryView::Ready { blocks, .. } => blocks,
            SummaryView::NotGenerated => &[],
        }
    }

    /// Text for the "copy summary" action. Always the original string,
    /// never rebuilt from blocks.
    pub fn clipboard_text(&self) -> &'a str {
        match self {
            SummaryView::Ready { raw, .. } => raw,
            SummaryView::NotGenerated => "",
        }
    }
}

fn present(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.trim().is_empty())
}
