use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use keynotes::Segmenter;
use keynotes::block::{Block, BlockKind};
use keynotes::segmenter::SegmentWarning;
use keynotes_render::{HtmlRenderer, RenderError, Renderer, SummaryView, TextRenderer, render_view};

#[derive(Debug, Deserialize)]
pub struct ExpectedWarning {
    /// Substring that must appear in the warning message.
    pub contains: String,

    /// If set, the warning's span must start on this 1-based source line.
    #[serde(default)]
    pub line: Option<usize>,
}

/// One expected block. Fields left out are not compared.
#[derive(Debug, Deserialize)]
pub struct ExpectedBlock {
    /// `code`, `list`, `heading` or `paragraph`.
    pub kind: String,

    #[serde(default)]
    pub content: Option<String>,

    #[serde(default)]
    pub items: Option<Vec<String>>,

    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TestConfig {
    /// Human-readable test description.
    #[serde(default)]
    pub description: Option<String>,

    /// Exact block sequence.
    #[serde(default)]
    pub expect_blocks: Option<Vec<ExpectedBlock>>,

    /// Expected HTML rendering (trimmed comparison).
    #[serde(default)]
    pub expect_html: Option<String>,

    /// Expected text rendering (trimmed comparison).
    #[serde(default)]
    pub expect_text: Option<String>,

    /// Expected warnings. If present (even empty), warning count and content are checked.
    #[serde(default)]
    pub expect_warnings: Option<Vec<ExpectedWarning>>,

    /// If true, the summary must be treated as not generated.
    #[serde(default)]
    pub expect_not_generated: bool,
}

/// Split a `.test.md` file into its TOML frontmatter and the summary text.
fn parse_test_file(content: &str) -> Result<(TestConfig, &str), String> {
    let content = content.trim_start_matches('\u{feff}');

    let after_open = content
        .strip_prefix("---")
        .ok_or("missing opening --- frontmatter delimiter")?;
    let after_open = after_open
        .strip_prefix('\n')
        .or_else(|| after_open.strip_prefix("\r\n"))
        .unwrap_or(after_open);

    // The closing delimiter is a line that is exactly `---`, so expected
    // text rendering may contain dashed underlines.
    let mut offset = 0;
    let mut close = None;
    for line in after_open.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == "---" {
            close = Some((offset, offset + line.len()));
            break;
        }
        offset += line.len();
    }
    let (close_start, close_end) = close.ok_or("missing closing --- frontmatter delimiter")?;

    let toml_str = &after_open[..close_start];
    let source = &after_open[close_end..];

    let config: TestConfig =
        toml::from_str(toml_str).map_err(|e| format!("TOML parse error: {}", e))?;

    Ok((config, source))
}

pub struct TestResult {
    pub path: PathBuf,
    pub description: Option<String>,
    /// `None` on success, the failure reason otherwise.
    pub failure: Option<String>,
}

impl TestResult {
    fn label(&self) -> &str {
        self.description.as_deref().unwrap_or_else(|| {
            self.path
                .file_name()
                .and_then(|s| s.to_str())
                .and_then(|s| s.strip_suffix(".test.md"))
                .unwrap_or("?")
        })
    }
}

fn run_single_test(path: &Path) -> TestResult {
    let fail = |description: Option<String>, reason: String| TestResult {
        path: path.to_path_buf(),
        description,
        failure: Some(reason),
    };

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => return fail(None, format!("cannot read file: {}", e)),
    };

    let (config, source) = match parse_test_file(&content) {
        Ok(pair) => pair,
        Err(e) => return fail(None, format!("frontmatter error: {}", e)),
    };

    debug!(path = %path.display(), "running fixture");
    TestResult {
        path: path.to_path_buf(),
        description: config.description.clone(),
        failure: check_fixture(&config, source),
    }
}

/// Evaluate every expectation in turn; the first mismatch wins.
fn check_fixture(config: &TestConfig, source: &str) -> Option<String> {
    let view = SummaryView::from_text(Some(source));

    if config.expect_not_generated && view.is_generated() {
        return Some("expected the summary to be treated as not generated".into());
    }
    if !config.expect_not_generated && !view.is_generated() && config.expect_blocks.is_some() {
        return Some("summary is empty and was treated as not generated".into());
    }

    if let Some(expected) = &config.expect_blocks {
        if let Some(reason) = check_blocks(view.blocks(), expected) {
            return Some(reason);
        }
    }

    if let Some(expected) = &config.expect_html {
        let actual = render_to_string(&view, HtmlRenderer::new(Vec::new()), HtmlRenderer::into_inner);
        if let Some(reason) = compare_output("html", expected, actual) {
            return Some(reason);
        }
    }

    if let Some(expected) = &config.expect_text {
        let actual = render_to_string(&view, TextRenderer::new(Vec::new()), TextRenderer::into_inner);
        if let Some(reason) = compare_output("text", expected, actual) {
            return Some(reason);
        }
    }

    if let Some(expected) = &config.expect_warnings {
        let warnings = Segmenter::new(source, 0).segment().warnings;
        if let Some(reason) = check_warnings(source, &warnings, expected) {
            return Some(reason);
        }
    }

    None
}

fn render_to_string<R: Renderer>(
    view: &SummaryView<'_>,
    mut renderer: R,
    into_inner: fn(R) -> Vec<u8>,
) -> Result<String, RenderError> {
    render_view(view, &mut renderer)?;
    Ok(String::from_utf8_lossy(&into_inner(renderer)).into_owned())
}

fn compare_output(
    what: &str,
    expected: &str,
    actual: Result<String, RenderError>,
) -> Option<String> {
    let actual = match actual {
        Ok(a) => a,
        Err(e) => return Some(format!("{} rendering failed: {}", what, e)),
    };
    let (expected, actual) = (expected.trim(), actual.trim());
    if expected == actual {
        None
    } else {
        Some(format!(
            "{} mismatch\n  expected:\n{}\n  actual:\n{}",
            what,
            indent(expected),
            indent(actual)
        ))
    }
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|l| format!("    {}", l))
        .collect::<Vec<_>>()
        .join("\n")
}

fn check_blocks(actual: &[Block], expected: &[ExpectedBlock]) -> Option<String> {
    if actual.len() != expected.len() {
        let kinds: Vec<&str> = actual.iter().map(|b| b.kind().as_str()).collect();
        return Some(format!(
            "expected {} block(s), got {} [{}]",
            expected.len(),
            actual.len(),
            kinds.join(", ")
        ));
    }

    for (i, (block, want)) in actual.iter().zip(expected).enumerate() {
        let Some(kind) = BlockKind::from_name(&want.kind) else {
            return Some(format!("block[{}]: unknown kind \"{}\"", i, want.kind));
        };
        if block.kind() != kind {
            return Some(format!(
                "block[{}]: expected {}, got {}",
                i,
                kind,
                block.kind()
            ));
        }

        let mismatch = match block {
            Block::Code { language, content } => field("language", &want.language, language)
                .or_else(|| field("content", &want.content, content)),
            Block::List { items } => match &want.items {
                Some(want_items) if want_items != items => {
                    Some(format!("items: expected {:?}, got {:?}", want_items, items))
                }
                _ => None,
            },
            Block::Heading { content } | Block::Paragraph { content } => {
                field("content", &want.content, content)
            }
        };
        if let Some(reason) = mismatch {
            return Some(format!("block[{}] ({}): {}", i, kind, reason));
        }
    }

    None
}

fn field(name: &str, expected: &Option<String>, actual: &str) -> Option<String> {
    match expected {
        Some(want) if want != actual => {
            Some(format!("{}: expected {:?}, got {:?}", name, want, actual))
        }
        _ => None,
    }
}

/// Convert a byte offset in `source` to a 1-based line number.
fn byte_offset_to_line(source: &str, offset: usize) -> usize {
    source[..offset.min(source.len())]
        .bytes()
        .filter(|&b| b == b'\n')
        .count()
        + 1
}

/// Check that actual warnings match expectations. Returns `Some(reason)` on mismatch.
fn check_warnings(
    source: &str,
    actual: &[SegmentWarning],
    expected: &[ExpectedWarning],
) -> Option<String> {
    if actual.len() != expected.len() {
        let actual_msgs: Vec<String> = actual.iter().map(|w| format!("  - {}", w)).collect();
        return Some(format!(
            "expected {} warning(s), got {}\n  actual warnings:\n{}",
            expected.len(),
            actual.len(),
            if actual_msgs.is_empty() {
                "    (none)".to_string()
            } else {
                actual_msgs.join("\n")
            }
        ));
    }

    for (i, (actual, expected)) in actual.iter().zip(expected).enumerate() {
        if !actual.message.contains(&expected.contains) {
            return Some(format!(
                "warning[{}]: expected message containing \"{}\", got: {}",
                i, expected.contains, actual
            ));
        }

        if let Some(expected_line) = expected.line {
            let actual_line = byte_offset_to_line(source, actual.span.start);
            if actual_line != expected_line {
                return Some(format!(
                    "warning[{}]: expected on line {}, but span is on line {}",
                    i, expected_line, actual_line
                ));
            }
        }
    }

    None
}

/// Discover `.test.md` files grouped by category (subfolder relative to root).
/// Files directly in `root` get category "" (uncategorized).
fn discover_categorized(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    collect_tests(root, root, &mut categories);
    for files in categories.values_mut() {
        files.sort();
    }
    categories
}

fn collect_tests(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_tests(&path, root, out);
        } else if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(".test.md"))
        {
            let category = path
                .parent()
                .and_then(|p| p.strip_prefix(root).ok())
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_default();
            out.entry(category).or_default().push(path);
        }
    }
}

fn category_label(cat: &str) -> &str {
    if cat.is_empty() { "(root)" } else { cat }
}

/// List available categories for the given test path.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }

    let categories = discover_categorized(path);
    if categories.is_empty() {
        eprintln!("no .test.md files found in {}", path.display());
        return;
    }

    eprintln!("available categories:");
    for (cat, files) in &categories {
        eprintln!("  {} ({} tests)", category_label(cat), files.len());
    }
}

struct Style {
    no_color: bool,
}

impl Style {
    fn paint(&self, s: &str, code: &str) -> String {
        if self.no_color {
            s.to_string()
        } else {
            format!("\x1b[{}m{}\x1b[0m", code, s)
        }
    }

    fn pass(&self) -> String {
        self.paint("PASS", "32")
    }

    fn fail(&self) -> String {
        self.paint("FAIL", "31")
    }

    fn bold(&self, s: &str) -> String {
        self.paint(s, "1")
    }
}

/// Restrict `all` to the requested categories (and their subcategories).
fn select_categories<'a>(
    all: &'a BTreeMap<String, Vec<PathBuf>>,
    requested: &[String],
) -> BTreeMap<&'a str, &'a Vec<PathBuf>> {
    if requested.is_empty() {
        return all.iter().map(|(k, v)| (k.as_str(), v)).collect();
    }

    let mut selected = BTreeMap::new();
    for req in requested {
        let req = req.trim_matches('/');
        let before = selected.len();
        for (cat, files) in all {
            if cat == req || cat.starts_with(&format!("{}/", req)) {
                selected.insert(cat.as_str(), files);
            }
        }
        if selected.len() == before {
            eprintln!(
                "warning: category '{}' not found (available: {})",
                req,
                all.keys()
                    .map(|k| category_label(k))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }
    selected
}

/// Run all `.test.md` files under `path` (or a single file).
/// Returns exit code: 0 = all pass, 1 = any failure.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    let style = Style { no_color };

    let all_categories = if path.is_file() {
        BTreeMap::from([(String::new(), vec![path.to_path_buf()])])
    } else {
        discover_categorized(path)
    };

    if all_categories.is_empty() {
        eprintln!("no .test.md files found in {}", path.display());
        return 1;
    }

    let run_categories = if path.is_file() {
        select_categories(&all_categories, &[])
    } else {
        select_categories(&all_categories, categories)
    };
    if run_categories.is_empty() {
        eprintln!("no matching categories found");
        return 1;
    }

    let mut passed = 0usize;
    let mut failures: Vec<TestResult> = Vec::new();

    for (cat, files) in &run_categories {
        eprintln!();
        eprintln!("{}", style.bold(category_label(cat)));

        for file in *files {
            let result = run_single_test(file);
            if result.failure.is_none() {
                passed += 1;
                eprintln!("  {}  {}", style.pass(), result.label());
            } else {
                eprintln!("  {}  {}", style.fail(), result.label());
                failures.push(result);
            }
        }
    }

    if !failures.is_empty() {
        eprintln!();
        eprintln!("failures:");
        for f in &failures {
            eprintln!();
            eprintln!("  --- {} ---", f.path.display());
            for line in f.failure.iter().flat_map(|r| r.lines()) {
                eprintln!("  {}", line);
            }
        }
    }

    eprintln!();
    let failed = failures.len();
    if failed == 0 {
        eprintln!("test result: {}. {} passed, 0 failed", style.paint("ok", "32"), passed);
        0
    } else {
        eprintln!(
            "test result: {}. {} passed, {} failed (of {})",
            style.paint("FAILED", "31"),
            passed,
            failed,
            passed + failed
        );
        1
    }
}
