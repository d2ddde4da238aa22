use keynotes::block::Block;

use crate::error::RenderError;
use crate::notes::SummaryStatus;
use crate::view::SummaryView;

/// A presentation target. One method per block variant, so a new variant
/// cannot be added without every renderer handling it.
pub trait Renderer {
    fn code(&mut self, language: &str, content: &str) -> Result<(), RenderError>;
    fn list(&mut self, items: &[String]) -> Result<(), RenderError>;
    fn heading(&mut self, content: &str) -> Result<(), RenderError>;
    fn paragraph(&mut self, content: &str) -> Result<(), RenderError>;

    /// Sentinel shown instead of an absent or empty summary.
    fn not_generated(&mut self) -> Result<(), RenderError>;

    /// Page header of a key-note set.
    fn header(&mut self, title: &str, status: SummaryStatus) -> Result<(), RenderError>;
    fn begin_note(&mut self, question: &str) -> Result<(), RenderError>;
    fn end_note(&mut self) -> Result<(), RenderError>;
}

pub fn render_block<R: Renderer + ?Sized>(block: &Block, out: &mut R) -> Result<(), RenderError> {
    match block {
        Block::Code { language, content } => out.code(language, content),
        Block::List { items } => out.list(items),
        Block::Heading { content } => out.heading(content),
        Block::Paragraph { content } => out.paragraph(content),
    }
}

pub fn render_blocks<R: Renderer + ?Sized>(blocks: &[Block], out: &mut R) -> Result<(), RenderError> {
    for block in blocks {
        render_block(block, out)?;
    }
    Ok(())
}

pub fn render_view<R: Renderer + ?Sized>(view: &SummaryView<'_>, out: &mut R) -> Result<(), RenderError> {
    match view {
        SummaryView::NotGenerated => out.not_generated(),
        SummaryView::Ready { blocks, .. } => render_blocks(blocks, out),
    }
}
