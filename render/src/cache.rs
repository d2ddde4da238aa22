use std::collections::HashMap;
use std::sync::Arc;

use keynotes::block::Block;
use tracing::debug;

/// Memoized segmentation keyed by the exact input string.
/// Sound because segmentation is a pure function of its input.
#[derive(Debug, Default)]
pub struct SegmentCache {
    entries: HashMap<String, Arc<[Block]>>,
    hits: u64,
    misses: u64,
}

impl SegmentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_segment(&mut self, text: &str) -> Arc<[Block]> {
        if let Some(blocks) = self.entries.get(text) {
            self.hits += 1;
            return Arc::clone(blocks);
        }

        self.misses += 1;
        let blocks: Arc<[Block]> = keynotes::segment(text).into();
        debug!(bytes = text.len(), blocks = blocks.len(), "segment cache miss");
        self.entries.insert(text.to_string(), Arc::clone(&blocks));
        blocks
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry, e.g. when the displayed summaries are replaced.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
