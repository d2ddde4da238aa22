pub mod cache;
pub mod error;
pub mod html;
pub mod notes;
pub mod renderer;
pub mod text;
pub mod view;

pub use cache::SegmentCache;
pub use error::RenderError;
pub use html::HtmlRenderer;
pub use notes::{KeyNote, KeyNoteSet, SummaryStatus, render_key_notes};
pub use renderer::{Renderer, render_block, render_blocks, render_view};
pub use text::TextRenderer;
pub use view::SummaryView;
