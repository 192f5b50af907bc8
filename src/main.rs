//! taglight CLI
//!
//! One-shot mode scans a file against a tag definition document and
//! prints it with ANSI truecolor spans. Watch mode keeps the real
//! engine running: the file is re-scanned on every change and the
//! buffer is reprinted when a fresh result lands.

use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use taglight::registry::CompiledTag;
use taglight::{
    BufferSurface, Color, CompiledPatternSet, HighlightEngine, PollOutcome, Span, TagSet,
    TextSurface,
};

/// Regex-driven syntax highlighting for the terminal
#[derive(Parser, Debug)]
#[command(name = "taglight", version, about = "Regex-driven syntax highlighting")]
struct CliArgs {
    /// File to highlight
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Tag definition document (.json, .yaml or .yml)
    #[arg(short, long, value_name = "TAGS")]
    tags: PathBuf,

    /// Re-scan and reprint whenever the file changes
    #[arg(short, long)]
    watch: bool,

    /// Print the raw span list instead of colored text
    #[arg(long)]
    spans: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();

    let definitions = TagSet::from_file(&args.tags)
        .with_context(|| format!("loading tag definitions from {}", args.tags.display()))?;

    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;

    if args.watch {
        watch(&args, definitions, text)
    } else {
        let set = CompiledPatternSet::compile(&definitions)?;
        let spans = taglight::scanner::scan(&text, &set);
        if args.spans {
            print_spans(&spans);
        } else {
            print!("{}", render(&text, &spans, &set));
        }
        Ok(())
    }
}

/// Drive the engine against the file, reprinting on every applied scan
fn watch(args: &CliArgs, definitions: TagSet, text: String) -> Result<()> {
    let mut engine = HighlightEngine::new(&definitions)?;
    let mut surface = BufferSurface::new(text);

    let (tx, rx) = mpsc::channel();
    let mut debouncer = notify_debouncer_mini::new_debouncer(Duration::from_millis(100), tx)?;
    debouncer
        .watcher()
        .watch(&args.file, notify::RecursiveMode::NonRecursive)?;
    tracing::info!("Watching {}", args.file.display());

    engine.trigger(&surface);
    loop {
        // File changes re-snapshot the buffer and supersede the scan
        while let Ok(result) = rx.try_recv() {
            match result {
                Ok(_events) => match std::fs::read_to_string(&args.file) {
                    Ok(content) => {
                        surface.set_text(content);
                        engine.trigger(&surface);
                    }
                    Err(e) => tracing::warn!("Failed to re-read {}: {}", args.file.display(), e),
                },
                Err(e) => tracing::warn!("File watcher error: {:?}", e),
            }
        }

        match engine.poll(&mut surface) {
            PollOutcome::Applied => {
                let spans = regions_as_spans(&surface);
                let text = surface.full_text();
                let set = engine.registry().patterns();
                if let Err(e) = repaint(&mut std::io::stdout(), &text, &spans, &set) {
                    tracing::warn!("Failed to repaint: {}", e);
                }
            }
            PollOutcome::Pending | PollOutcome::Idle => {}
        }

        std::thread::sleep(Duration::from_millis(3));
    }
}

/// Clear the screen, repaint the highlighted buffer and flush.
///
/// The flush matters: without it a final line with no trailing newline
/// stays in the stdout buffer until the next repaint.
fn repaint<W: std::io::Write>(
    out: &mut W,
    text: &str,
    spans: &[Span],
    set: &CompiledPatternSet,
) -> std::io::Result<()> {
    write!(out, "\x1b[2J\x1b[H{}", render(text, spans, set))?;
    out.flush()
}

/// Rebuild a span list from what the surface currently shows
fn regions_as_spans(surface: &BufferSurface) -> Vec<Span> {
    surface
        .tagged()
        .flat_map(|(tag, regions)| {
            regions
                .iter()
                .map(move |&(start, end)| Span::new(tag, start, end))
        })
        .collect()
}

fn print_spans(spans: &[Span]) {
    for span in spans {
        println!("{}\t{}\t{}", span.tag, span.start, span.end);
    }
}

/// Paint spans over the text with ANSI truecolor escapes.
///
/// Spans are applied in order, so a later tag overwrites an earlier one
/// where they overlap, matching how a surface applies regions.
fn render(text: &str, spans: &[Span], set: &CompiledPatternSet) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut styles: Vec<Option<usize>> = vec![None; chars.len()];

    for span in spans {
        let Some(tag_index) = set.tags().iter().position(|t| t.name == span.tag) else {
            continue;
        };
        for slot in styles
            .iter_mut()
            .take(span.end.min(chars.len()))
            .skip(span.start)
        {
            *slot = Some(tag_index);
        }
    }

    let mut out = String::with_capacity(text.len());
    let mut current: Option<usize> = None;
    for (ch, style) in chars.iter().zip(&styles) {
        if *style != current {
            out.push_str("\x1b[0m");
            if let Some(tag_index) = style {
                out.push_str(&escape_for(&set.tags()[*tag_index]));
            }
            current = *style;
        }
        out.push(*ch);
    }
    if current.is_some() {
        out.push_str("\x1b[0m");
    }
    out
}

fn escape_for(tag: &CompiledTag) -> String {
    let Color { r, g, b, .. } = tag.style.foreground;
    let mut escape = format!("\x1b[38;2;{};{};{}m", r, g, b);
    if let Some(Color { r, g, b, .. }) = tag.style.background {
        escape.push_str(&format!("\x1b[48;2;{};{};{}m", r, g, b));
    }
    escape
}
