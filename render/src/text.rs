use std::io::Write;

use crate::error::RenderError;
use crate::notes::SummaryStatus;
use crate::renderer::Renderer;

/// Plain terminal text. Blocks are separated by one blank line.
pub struct TextRenderer<W: Write> {
    out: W,
    /// Blocks written since the last note began.
    written: usize,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        TextRenderer { out, written: 0 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn gap(&mut self) -> Result<(), RenderError> {
        if self.written > 0 {
            writeln!(self.out)?;
        }
        self.written += 1;
        Ok(())
    }
}

fn underline(text: &str, ch: char) -> String {
    std::iter::repeat_n(ch, text.chars().count()).collect()
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn code(&mut self, language: &str, content: &str) -> Result<(), RenderError> {
        self.gap()?;
        if !language.is_empty() {
            writeln!(self.out, "[{}]", language)?;
        }
        for line in content.split('\n') {
            if line.is_empty() {
                writeln!(self.out)?;
            } else {
                writeln!(self.out, "    {}", line)?;
            }
        }
        Ok(())
    }

    fn list(&mut self, items: &[String]) -> Result<(), RenderError> {
        self.gap()?;
        for item in items {
            writeln!(self.out, "\u{2022} {}", item)?;
        }
        Ok(())
    }

    fn heading(&mut self, content: &str) -> Result<(), RenderError> {
        self.gap()?;
        writeln!(self.out, "{}", content)?;
        writeln!(self.out, "{}", underline(content, '-'))?;
        Ok(())
    }

    fn paragraph(&mut self, content: &str) -> Result<(), RenderError> {
        self.gap()?;
        writeln!(self.out, "{}", content)?;
        Ok(())
    }

    fn not_generated(&mut self) -> Result<(), RenderError> {
        self.gap()?;
        writeln!(self.out, "Not generated yet")?;
        Ok(())
    }

    fn header(&mut self, title: &str, status: SummaryStatus) -> Result<(), RenderError> {
        writeln!(self.out, "{}", title)?;
        writeln!(self.out, "{}", underline(title, '='))?;
        writeln!(self.out, "Status: {}", status)?;
        Ok(())
    }

    fn begin_note(&mut self, question: &str) -> Result<(), RenderError> {
        writeln!(self.out)?;
        writeln!(self.out, "Question: {}", question)?;
        writeln!(self.out)?;
        self.written = 0;
        Ok(())
    }

    fn end_note(&mut self) -> Result<(), RenderError> {
        Ok(())
    }
}
