mod test_runner;

use std::io::{self, Read};
use std::path::Path;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use tracing::debug;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use keynotes::block::Block;
use keynotes::segmenter::SegmentWarning;
use keynotes::{Segment, Segmenter};
use keynotes_render::{
    HtmlRenderer, KeyNoteSet, RenderError, Renderer, SegmentCache, SummaryView, TextRenderer,
    render_key_notes, render_view,
};

const SUBCOMMANDS: &[&str] = &["segment", "render", "notes", "test", "help"];

/// Longest excerpt shown per block in the outline.
const EXCERPT_CHARS: usize = 60;

#[derive(Parser)]
#[command(name = "keynotes", version, about = "Structured summary segmenter")]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// More log output (-v debug, -vv trace). KEYNOTES_LOG overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Segment a summary and print its block outline
    Segment(SegmentArgs),

    /// Render a summary as HTML or text
    Render(RenderArgs),

    /// Render a TOML set of key notes
    Notes(NotesArgs),

    /// Run .test.md fixture files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct SegmentArgs {
    /// Summary text file, or - for stdin
    file: String,

    /// Only report warnings (exit 0 unless --deny-warnings)
    #[arg(long)]
    check: bool,

    /// Dump the segmentation with spans
    #[arg(long)]
    ast: bool,

    /// Exit with status 1 if any warning was produced
    #[arg(long)]
    deny_warnings: bool,
}

#[derive(clap::Args)]
struct RenderArgs {
    /// Summary text file, or - for stdin
    file: String,

    #[arg(short, long, value_enum, default_value_t = Format::Html)]
    format: Format,
}

#[derive(clap::Args)]
struct NotesArgs {
    /// TOML file with `title`, `status` and `[[note]]` tables
    file: String,

    #[arg(short, long, value_enum, default_value_t = Format::Html)]
    format: Format,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.md file or directory containing them
    path: String,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Html,
    Text,
}

fn main() {
    // `keynotes file.md` is shorthand for `keynotes segment file.md`.
    let mut args: Vec<String> = std::env::args().collect();
    if let Some(pos) = args
        .iter()
        .skip(1)
        .position(|a| !a.starts_with('-') || a == "-")
        .map(|p| p + 1)
    {
        if !SUBCOMMANDS.contains(&args[pos].as_str()) {
            args.insert(pos, "segment".to_string());
        }
    }

    let cli = Cli::parse_from(&args);
    init_logging(cli.verbose);

    let exit_code = match cli.command {
        Command::Segment(segment_args) => do_segment(segment_args, cli.no_color),
        Command::Render(render_args) => do_render(render_args),
        Command::Notes(notes_args) => do_notes(notes_args),
        Command::Test(test_args) => {
            let path = Path::new(&test_args.path);
            if test_args.list_categories {
                test_runner::list_categories(path);
                return;
            }
            test_runner::run_tests(path, cli.no_color, &test_args.category)
        }
    };
    process::exit(exit_code);
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_env("KEYNOTES_LOG").unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();
}

/// Read a file, or stdin when `path` is `-`.
fn read_source(path: &str) -> Result<String, String> {
    if path == "-" {
        let mut source = String::new();
        io::stdin()
            .read_to_string(&mut source)
            .map_err(|e| format!("cannot read stdin: {}", e))?;
        return Ok(source);
    }
    std::fs::read_to_string(path).map_err(|e| format!("cannot read '{}': {}", path, e))
}

fn do_segment(args: SegmentArgs, no_color: bool) -> i32 {
    let source = match read_source(&args.file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {}", e);
            return 1;
        }
    };

    let mut files = SimpleFiles::new();
    let file_id = files.add(args.file.clone(), source.clone());

    let segmentation = Segmenter::new(&source, file_id).segment();
    emit_warnings(&files, &segmentation.warnings, no_color);

    if args.check {
        eprintln!(
            "ok: {} segmented into {} block(s), {} warning(s)",
            args.file,
            segmentation.len(),
            segmentation.warnings.len()
        );
    } else if args.ast {
        println!("{:#?}", segmentation);
    } else {
        for segment in &segmentation.segments {
            println!("{}", outline_line(segment));
        }
    }

    if args.deny_warnings && !segmentation.warnings.is_empty() {
        1
    } else {
        0
    }
}

fn do_render(args: RenderArgs) -> i32 {
    let source = match read_source(&args.file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {}", e);
            return 1;
        }
    };

    let view = SummaryView::from_text(Some(&source));
    report(with_renderer(args.format, |out| render_view(&view, out)))
}

fn do_notes(args: NotesArgs) -> i32 {
    let set = match KeyNoteSet::load(Path::new(&args.file)) {
        Ok(set) => set,
        Err(e) => {
            eprintln!("error: {}", e);
            return 1;
        }
    };

    let mut cache = SegmentCache::new();
    let code = report(with_renderer(args.format, |out| {
        render_key_notes(&set, &mut cache, out)
    }));
    debug!(
        hits = cache.hits(),
        misses = cache.misses(),
        "key-note segmentation cache"
    );
    code
}

/// Run `f` against a renderer for `format` writing to stdout.
fn with_renderer(
    format: Format,
    f: impl FnOnce(&mut dyn Renderer) -> Result<(), RenderError>,
) -> Result<(), RenderError> {
    let stdout = io::stdout();
    match format {
        Format::Html => f(&mut HtmlRenderer::new(stdout.lock())),
        Format::Text => f(&mut TextRenderer::new(stdout.lock())),
    }
}

fn report(result: Result<(), RenderError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("error: {}", e);
            1
        }
    }
}

fn emit_warnings(files: &SimpleFiles<String, String>, warnings: &[SegmentWarning], no_color: bool) {
    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();
    for warning in warnings {
        let diagnostic = warning.to_diagnostic();
        let _ = term::emit_to_write_style(&mut writer.lock(), &config, files, &diagnostic);
    }
}

/// `  3-5    list       2 items: first item`
fn outline_line(segment: &Segment) -> String {
    let lines = format!("{}-{}", segment.lines.start + 1, segment.lines.end);
    let summary = match &segment.block {
        Block::Code { language, content } => {
            let count = if content.is_empty() {
                0
            } else {
                content.split('\n').count()
            };
            if language.is_empty() {
                format!("{} line(s)", count)
            } else {
                format!("[{}] {} line(s)", language, count)
            }
        }
        Block::List { items } => format!(
            "{} item(s): {}",
            items.len(),
            excerpt(items.first().map(String::as_str).unwrap_or_default())
        ),
        Block::Heading { content } | Block::Paragraph { content } => excerpt(content),
    };
    format!("{:>9}  {:<9}  {}", lines, segment.block.kind(), summary)
}

fn excerpt(text: &str) -> String {
    if text.chars().count() <= EXCERPT_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(EXCERPT_CHARS).collect();
    format!("{}...", cut)
}
