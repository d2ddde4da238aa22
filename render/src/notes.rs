use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use tracing::debug;

use crate::cache::SegmentCache;
use crate::error::RenderError;
use crate::renderer::{Renderer, render_view};
use crate::view::SummaryView;

/// Shown when a set contains no notes at all.
pub const NO_SUMMARIES: &str =
    "No summaries available yet. They will be generated once results are published.";

/// Progress of summary generation for a whole set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryStatus {
    #[default]
    Pending,
    Generating,
    Ready,
    Failed,
}

impl SummaryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SummaryStatus::Pending => "pending",
            SummaryStatus::Generating => "generating",
            SummaryStatus::Ready => "ready",
            SummaryStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for SummaryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SummaryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(SummaryStatus::Pending),
            "generating" => Ok(SummaryStatus::Generating),
            "ready" => Ok(SummaryStatus::Ready),
            "failed" => Ok(SummaryStatus::Failed),
            other => Err(format!("unknown summary status: {}", other)),
        }
    }
}

/// One question and its generated summary, if any.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KeyNote {
    pub question: String,
    #[serde(default)]
    pub summary: Option<String>,
}

/// A page of key notes, e.g. all questions of one contest.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KeyNoteSet {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default)]
    pub status: SummaryStatus,

    /// `[[note]]` tables, in display order.
    #[serde(default, rename = "note")]
    pub notes: Vec<KeyNote>,
}

fn default_title() -> String {
    "Summarized Key Notes".to_string()
}

impl KeyNoteSet {
    pub fn from_toml(source: &str) -> Result<Self, RenderError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, RenderError> {
        let source = std::fs::read_to_string(path).map_err(|source| RenderError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let set = Self::from_toml(&source)?;
        debug!(path = %path.display(), notes = set.notes.len(), "loaded key-note set");
        Ok(set)
    }
}

/// Render a whole set: header, then every question followed by its summary.
/// Identical summary texts are segmented once.
pub fn render_key_notes<R: Renderer + ?Sized>(
    set: &KeyNoteSet,
    cache: &mut SegmentCache,
    out: &mut R,
) -> Result<(), RenderError> {
    out.header(&set.title, set.status)?;

    if set.notes.is_empty() {
        return out.paragraph(NO_SUMMARIES);
    }

    for note in &set.notes {
        out.begin_note(&note.question)?;
        let view = SummaryView::from_text_cached(note.summary.as_deref(), cache);
        render_view(&view, out)?;
        out.end_note()?;
    }
    Ok(())
}
