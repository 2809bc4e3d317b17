//! CLI binary for pdf2mag.
//!
//! A thin shim over the library crate: maps flags to `AnalysisConfig`, shows
//! a spinner while the extraction call is in flight, prints the rendered
//! magazine (or raw JSON), and offers an interactive reader loop driving the
//! viewer state machine.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2mag::{analyze, render, AnalysisConfig, AnalysisOutput, PdfHandle, ViewerState};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI definition ───────────────────────────────────────────────────────

/// Turn a magazine PDF into a structured, paywall-aware digital edition.
#[derive(Parser, Debug)]
#[command(name = "pdf2mag", version, about, long_about = None)]
struct Cli {
    /// Magazine PDF: local path or HTTP/HTTPS URL (advisory limit 50 MB)
    input: String,

    /// Gemini model to use
    #[arg(long, default_value = pdf2mag::config::DEFAULT_MODEL)]
    model: String,

    /// API base URL (local gateways, tests)
    #[arg(long, hide = true)]
    api_base: Option<String>,

    /// Per-call timeout in seconds
    #[arg(long, default_value_t = 300)]
    timeout: u64,

    /// Download timeout for URL inputs in seconds
    #[arg(long, default_value_t = 120)]
    download_timeout: u64,

    /// Print the extracted magazine as raw JSON instead of rendered text
    #[arg(long)]
    json: bool,

    /// Write the extracted magazine JSON to a file (atomic write)
    #[arg(long, short, value_name = "FILE")]
    out: Option<PathBuf>,

    /// Render only this page (1-indexed)
    #[arg(long, value_name = "N")]
    page: Option<usize>,

    /// Open the interactive reader after extraction
    #[arg(long, short)]
    read: bool,

    /// Suppress the progress spinner and stats
    #[arg(long, short)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut builder = AnalysisConfig::builder()
        .model(&cli.model)
        .api_timeout_secs(cli.timeout)
        .download_timeout_secs(cli.download_timeout);
    if let Some(ref base) = cli.api_base {
        builder = builder.api_base(base);
    }
    let config = builder.build().context("invalid configuration")?;

    let spinner = if cli.quiet {
        None
    } else {
        Some(make_spinner(&cli.model))
    };

    let result = analyze(&cli.input, &config).await;

    if let Some(ref s) = spinner {
        s.finish_and_clear();
    }

    let output = match result {
        Ok(output) => output,
        Err(e) => {
            let headline = if e.is_model_output_error() {
                "The model returned an invalid format."
            } else {
                "Analysis failed."
            };
            eprintln!("{} {}", red("✗"), bold(headline));
            eprintln!("{}", dim("Retry by re-running with the same file."));
            return Err(e).context("magazine analysis");
        }
    };

    if !cli.quiet {
        print_stats(&output);
    }

    if let Some(ref path) = cli.out {
        pdf2mag::analyze::save_magazine_json(&output.magazine, path)
            .await
            .context("writing magazine JSON")?;
        eprintln!("{} wrote {}", green("✓"), path.display());
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&output.magazine)?);
        return Ok(());
    }

    if let Some(n) = cli.page {
        match output.magazine.page(n) {
            Some(page) => print!("{}", render::render_page(page)),
            None => anyhow::bail!(
                "page {n} is out of range (magazine has {} pages)",
                output.magazine.page_count()
            ),
        }
        return Ok(());
    }

    if cli.read {
        // The handle scopes the PDF binary to the reader session; dropping
        // it at the end of this call releases the temp copy on every path.
        let pdf_bytes = read_original_bytes(&cli.input, cli.download_timeout).await?;
        let handle = PdfHandle::new(&pdf_bytes).context("creating PDF handle")?;
        reader_loop(&output, &handle)?;
        return Ok(());
    }

    print!("{}", render::render_magazine(&output.magazine));
    Ok(())
}

fn make_spinner(model: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
    bar.set_style(style);
    bar.set_prefix("Analysing");
    bar.set_message(format!("asking {model} to map the layout…"));
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

fn print_stats(output: &AnalysisOutput) {
    let s = &output.stats;
    eprintln!(
        "{} {} — {} pages · {:.1} MB · {}ms · {} prompt / {} completion tokens",
        green("✓"),
        bold(&output.magazine.meta.title),
        output.magazine.page_count(),
        s.pdf_bytes as f64 / (1024.0 * 1024.0),
        s.duration_ms,
        s.prompt_tokens,
        s.completion_tokens,
    );
}

/// Fetch the original bytes again for the reader's PDF handle.
async fn read_original_bytes(input: &str, download_timeout_secs: u64) -> Result<Vec<u8>> {
    let resolved = pdf2mag::pipeline::input::resolve_input(input, download_timeout_secs)
        .await
        .context("re-reading the PDF for the reader")?;
    Ok(resolved.into_bytes())
}

// ── Interactive reader ───────────────────────────────────────────────────

/// Stdin-driven reading loop over the viewer state machine. Commands:
/// n/p page turns, `g N` jump, +/- zoom, f fit width, o viewer URL, q quit.
fn reader_loop(output: &AnalysisOutput, handle: &PdfHandle) -> Result<()> {
    let magazine = &output.magazine;
    let mut state = ViewerState::new(magazine.page_count());
    let mut last_view = None;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        let view = state.view_descriptor();
        if last_view != Some(view) {
            println!();
            print!("{}", render::render_current(magazine, &state));
            println!(
                "{}",
                dim(&format!(
                    "zoom: {}  viewer: {}",
                    if state.fit_to_width() {
                        "fit width".to_string()
                    } else {
                        format!("{}%", state.zoom_percent())
                    },
                    handle.viewer_url(&view)
                ))
            );
            last_view = Some(view);
        }

        let next_hint = if state.can_go_next() { "n".to_string() } else { dim("n") };
        let prev_hint = if state.can_go_prev() { "p".to_string() } else { dim("p") };
        print!(
            "{} ",
            cyan(&format!(
                "[{prev_hint}|{next_hint}|g N|+|-|f|o|q]>"
            ))
        );
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(l) => l?,
            None => break, // EOF ends the session
        };
        let cmd = line.trim();

        match cmd {
            "" => {}
            "n" => state.next_page(),
            "p" => state.prev_page(),
            "+" => state.zoom_in(),
            "-" => state.zoom_out(),
            "f" => state.fit_width(),
            "o" => println!("{}", handle.viewer_url(&state.view_descriptor())),
            "q" => break,
            _ => {
                if let Some(rest) = cmd.strip_prefix("g ") {
                    // Out-of-range or non-numeric input silently keeps the
                    // current page, like the jump field reverting.
                    if let Ok(n) = rest.trim().parse::<usize>() {
                        state.jump_to_page(n);
                    }
                } else {
                    println!(
                        "{}",
                        dim("commands: n(ext) p(rev) g N(jump) + - f(it) o(pen url) q(uit)")
                    );
                }
            }
        }
    }
    Ok(())
}
