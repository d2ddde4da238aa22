use std::io::Write;

use keynotes::block::Block;
use keynotes_render::{
    HtmlRenderer, KeyNoteSet, RenderError, Renderer, SegmentCache, SummaryStatus, SummaryView,
    TextRenderer, render_blocks, render_key_notes, render_view,
};

fn html(source: Option<&str>) -> String {
    let view = SummaryView::from_text(source);
    let mut renderer = HtmlRenderer::new(Vec::new());
    render_view(&view, &mut renderer).expect("render failed");
    String::from_utf8(renderer.into_inner()).unwrap()
}

fn text(source: Option<&str>) -> String {
    let view = SummaryView::from_text(source);
    let mut renderer = TextRenderer::new(Vec::new());
    render_view(&view, &mut renderer).expect("render failed");
    String::from_utf8(renderer.into_inner()).unwrap()
}

const NOTES: &str = r#"
title = "Contest 3"
status = "ready"

[[note]]
question = "What is 2+2?"
summary = "Answer: 4"

[[note]]
question = "Define recursion"

[[note]]
question = "Same again"
summary = "Answer: 4"
"#;

#[test]
fn absent_or_empty_text_is_not_generated() {
    assert_eq!(SummaryView::from_text(None), SummaryView::NotGenerated);
    assert_eq!(SummaryView::from_text(Some("")), SummaryView::NotGenerated);
    assert_eq!(SummaryView::from_text(Some(" \n\t\n")), SummaryView::NotGenerated);
    assert!(SummaryView::from_text(Some("x")).is_generated());
}

#[test]
fn clipboard_uses_the_original_text() {
    let raw = "# T\n- a  \n\n\nline\nbreaks";
    let view = SummaryView::from_text(Some(raw));
    assert_eq!(view.clipboard_text(), raw);
    assert_eq!(view.blocks().len(), 3);
    assert_eq!(SummaryView::NotGenerated.clipboard_text(), "");
}

#[test]
fn html_maps_each_variant() {
    let source = "```rust\nfn main() {}\n```\n- a < b\n- c & d\n### T\nAnswer: x\n\npara \"q\"";
    assert_eq!(
        html(Some(source)),
        "<pre><code class=\"language-rust\">fn main() {}</code></pre>\n\
         <ul>\n<li>a &lt; b</li>\n<li>c &amp; d</li>\n</ul>\n\
         <h4>T</h4>\n\
         <h4>Answer: x</h4>\n\
         <p>para \"q\"</p>\n"
    );
}

#[test]
fn html_code_without_language_has_no_class() {
    assert_eq!(
        html(Some("```\n<b>\n\n</b>\n```")),
        "<pre><code>&lt;b&gt;\n\n&lt;/b&gt;</code></pre>\n"
    );
}

#[test]
fn html_language_attribute_is_escaped() {
    assert_eq!(
        html(Some("```a\"b\nx\n```")),
        "<pre><code class=\"language-a&quot;b\">x</code></pre>\n"
    );
}

#[test]
fn html_not_generated_sentinel() {
    assert_eq!(
        html(None),
        "<div class=\"not-generated\">Not generated yet</div>\n"
    );
}

#[test]
fn text_output() {
    assert_eq!(
        text(Some("# Title\n\n- a\n- b\n\n```sh\nls\n\ncd\n```\nend")),
        "Title\n-----\n\n\u{2022} a\n\u{2022} b\n\n[sh]\n    ls\n\n    cd\n\nend\n"
    );
    assert_eq!(text(Some("")), "Not generated yet\n");
}

/// Records which variant hooks were called.
#[derive(Default)]
struct Tally {
    calls: Vec<&'static str>,
}

impl Renderer for Tally {
    fn code(&mut self, _: &str, _: &str) -> Result<(), RenderError> {
        self.calls.push("code");
        Ok(())
    }
    fn list(&mut self, _: &[String]) -> Result<(), RenderError> {
        self.calls.push("list");
        Ok(())
    }
    fn heading(&mut self, _: &str) -> Result<(), RenderError> {
        self.calls.push("heading");
        Ok(())
    }
    fn paragraph(&mut self, _: &str) -> Result<(), RenderError> {
        self.calls.push("paragraph");
        Ok(())
    }
    fn not_generated(&mut self) -> Result<(), RenderError> {
        self.calls.push("not_generated");
        Ok(())
    }
    fn header(&mut self, _: &str, _: SummaryStatus) -> Result<(), RenderError> {
        self.calls.push("header");
        Ok(())
    }
    fn begin_note(&mut self, _: &str) -> Result<(), RenderError> {
        self.calls.push("begin_note");
        Ok(())
    }
    fn end_note(&mut self) -> Result<(), RenderError> {
        self.calls.push("end_note");
        Ok(())
    }
}

#[test]
fn dispatch_covers_every_variant_in_order() {
    let blocks = keynotes::segment("p\n\n- l\n# h\n```\nc\n```");
    let mut tally = Tally::default();
    render_blocks(&blocks, &mut tally).unwrap();
    assert_eq!(tally.calls, vec!["paragraph", "list", "heading", "code"]);
    for (block, call) in blocks.iter().zip(&tally.calls) {
        assert_eq!(block.kind().as_str(), *call);
    }
}

#[test]
fn cache_is_keyed_by_exact_text() {
    let mut cache = SegmentCache::new();
    let a = cache.get_or_segment("- a\n- b");
    let b = cache.get_or_segment("- a\n- b");
    let c = cache.get_or_segment("- a\n- b\n");
    assert!(std::sync::Arc::ptr_eq(&a, &b));
    assert_eq!(*a, *c);
    assert_eq!(cache.hits(), 1);
    assert_eq!(cache.misses(), 2);
    assert_eq!(cache.len(), 2);
    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn cached_view_matches_uncached() {
    let mut cache = SegmentCache::new();
    let source = Some("Summary: s\n- x");
    assert_eq!(
        SummaryView::from_text_cached(source, &mut cache),
        SummaryView::from_text(source)
    );
    assert_eq!(
        SummaryView::from_text_cached(Some(""), &mut cache),
        SummaryView::NotGenerated
    );
    assert_eq!(cache.len(), 1);
}

#[test]
fn key_note_set_renders_as_text() {
    let set = KeyNoteSet::from_toml(NOTES).unwrap();
    assert_eq!(set.status, SummaryStatus::Ready);
    assert_eq!(set.notes.len(), 3);
    assert_eq!(set.notes[1].summary, None);

    let mut cache = SegmentCache::new();
    let mut renderer = TextRenderer::new(Vec::new());
    render_key_notes(&set, &mut cache, &mut renderer).unwrap();
    let out = String::from_utf8(renderer.into_inner()).unwrap();

    assert_eq!(
        out,
        "Contest 3\n=========\nStatus: ready\n\
         \nQuestion: What is 2+2?\n\nAnswer: 4\n---------\n\
         \nQuestion: Define recursion\n\nNot generated yet\n\
         \nQuestion: Same again\n\nAnswer: 4\n---------\n"
    );
    assert_eq!(cache.misses(), 1);
    assert_eq!(cache.hits(), 1);
}

#[test]
fn key_note_set_renders_as_html() {
    let set = KeyNoteSet::from_toml("[[note]]\nquestion = \"Q <1>\"\nsummary = \"plain\"").unwrap();
    assert_eq!(set.title, "Summarized Key Notes");
    assert_eq!(set.status, SummaryStatus::Pending);

    let mut renderer = HtmlRenderer::new(Vec::new());
    render_key_notes(&set, &mut SegmentCache::new(), &mut renderer).unwrap();
    let out = String::from_utf8(renderer.into_inner()).unwrap();
    assert_eq!(
        out,
        "<h1>Summarized Key Notes</h1>\n\
         <p class=\"status\">Status: <span class=\"status-pending\">pending</span></p>\n\
         <section class=\"key-note\">\n<h2>Q &lt;1&gt;</h2>\n<p>plain</p>\n</section>\n"
    );
}

#[test]
fn empty_key_note_set_says_so() {
    let set = KeyNoteSet::from_toml("title = \"T\"").unwrap();
    let mut renderer = TextRenderer::new(Vec::new());
    render_key_notes(&set, &mut SegmentCache::new(), &mut renderer).unwrap();
    let out = String::from_utf8(renderer.into_inner()).unwrap();
    assert!(out.ends_with("No summaries available yet. They will be generated once results are published.\n"));
}

#[test]
fn key_note_set_loads_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(NOTES.as_bytes()).unwrap();
    let set = KeyNoteSet::load(file.path()).unwrap();
    assert_eq!(set.title, "Contest 3");
}

#[test]
fn key_note_errors() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.toml");
    let err = KeyNoteSet::load(&missing).unwrap_err();
    assert!(matches!(err, RenderError::Read { .. }));
    assert!(err.to_string().contains("missing.toml"));

    let err = KeyNoteSet::from_toml("status = \"done\"").unwrap_err();
    assert!(matches!(err, RenderError::Toml(_)));
}

#[test]
fn status_parses_case_insensitively() {
    assert_eq!("Generating".parse::<SummaryStatus>(), Ok(SummaryStatus::Generating));
    assert_eq!(" failed ".parse::<SummaryStatus>(), Ok(SummaryStatus::Failed));
    assert!("done".parse::<SummaryStatus>().is_err());
    assert_eq!(SummaryStatus::default().to_string(), "pending");
}

#[test]
fn write_failures_surface_as_io_errors() {
    struct Broken;
    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("closed"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let blocks = vec![Block::Paragraph {
        content: "x".to_string(),
    }];
    let err = render_blocks(&blocks, &mut HtmlRenderer::new(Broken)).unwrap_err();
    assert!(matches!(err, RenderError::Io(_)));
}
