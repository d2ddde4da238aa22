use std::io::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::error::RenderError;
use crate::notes::SummaryStatus;
use crate::renderer::Renderer;

/// HTML fragment output. Every piece of summary text is escaped.
pub struct HtmlRenderer<W: Write> {
    out: W,
}

impl<W: Write> HtmlRenderer<W> {
    pub fn new(out: W) -> Self {
        HtmlRenderer { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for HtmlRenderer<W> {
    fn code(&mut self, language: &str, content: &str) -> Result<(), RenderError> {
        if language.is_empty() {
            write!(self.out, "<pre><code>")?;
        } else {
            write!(
                self.out,
                "<pre><code class=\"language-{}\">",
                encode_double_quoted_attribute(language)
            )?;
        }
        writeln!(self.out, "{}</code></pre>", encode_text(content))?;
        Ok(())
    }

    fn list(&mut self, items: &[String]) -> Result<(), RenderError> {
        writeln!(self.out, "<ul>")?;
        for item in items {
            writeln!(self.out, "<li>{}</li>", encode_text(item))?;
        }
        writeln!(self.out, "</ul>")?;
        Ok(())
    }

    fn heading(&mut self, content: &str) -> Result<(), RenderError> {
        writeln!(self.out, "<h4>{}</h4>", encode_text(content))?;
        Ok(())
    }

    fn paragraph(&mut self, content: &str) -> Result<(), RenderError> {
        writeln!(self.out, "<p>{}</p>", encode_text(content))?;
        Ok(())
    }

    fn not_generated(&mut self) -> Result<(), RenderError> {
        writeln!(self.out, "<div class=\"not-generated\">Not generated yet</div>")?;
        Ok(())
    }

    fn header(&mut self, title: &str, status: SummaryStatus) -> Result<(), RenderError> {
        writeln!(self.out, "<h1>{}</h1>", encode_text(title))?;
        writeln!(
            self.out,
            "<p class=\"status\">Status: <span class=\"status-{0}\">{0}</span></p>",
            status
        )?;
        Ok(())
    }

    fn begin_note(&mut self, question: &str) -> Result<(), RenderError> {
        writeln!(self.out, "<section class=\"key-note\">")?;
        writeln!(self.out, "<h2>{}</h2>", encode_text(question))?;
        Ok(())
    }

    fn end_note(&mut self) -> Result<(), RenderError> {
        writeln!(self.out, "</section>")?;
        Ok(())
    }
}
