//! CLI binary for edgequake-notes2docx.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and writes the resulting document.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_notes2docx::{
    convert, default_output_path, resolve_backend, ConversionConfig, ConversionProgressCallback,
    Engine, NotesError, ProgressCallback, TranscriptionMode, DEFAULT_DOWNLOAD_NAME,
    DOCX_MIME_TYPE,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner shown while the model reads the photo.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        Arc::new(Self { bar })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_transcription_start(&self, engine: Engine) {
        self.bar.set_prefix("Transcribing");
        self.bar
            .set_message(format!("{engine} is analyzing your note…"));
        self.bar.enable_steady_tick(Duration::from_millis(80));
    }

    fn on_transcription_complete(&self, engine: Engine, markdown_len: usize) {
        self.bar.println(format!(
            "  {} {engine} returned {}",
            green("✓"),
            dim(&format!("{markdown_len} chars"))
        ));
        self.bar.set_prefix("Building");
        self.bar.set_message("Word document…");
    }

    fn on_transcription_error(&self, engine: Engine, error: &str) {
        self.bar.finish_and_clear();
        let msg = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        eprintln!("  {} {engine}: {}", red("✗"), red(&msg));
    }

    fn on_document_ready(&self, _block_count: usize, _document_bytes: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Transcribe with Groq (writes notes_structured.docx next to the photo)
  notes2docx notes.jpg

  # Gemini, explicit output path
  notes2docx --engine gemini notes.png -o chem.docx

  # Keep spelling exactly as written
  notes2docx --mode strict notes.jpg

  # Also save the Markdown the model returned
  notes2docx notes.jpg --markdown-out notes.md

  # Machine-readable summary
  notes2docx --json notes.jpg > summary.json

ENGINES:
  Engine   Default model                                   Mode flag
  ──────   ─────────────────────────────────────────────   ─────────
  groq     meta-llama/llama-4-maverick-17b-128e-instruct   ✓
  gemini   gemini-1.5-flash                                ignored

ENVIRONMENT VARIABLES:
  GROQ_API_KEY            Groq API key
  GEMINI_API_KEY          Google Gemini API key
  NOTES2DOCX_*            Any flag, e.g. NOTES2DOCX_ENGINE=gemini
  RUST_LOG                Override log filter (e.g. edgequake_notes2docx=debug)
"#;

/// Convert a photo of handwritten chemistry notes into a Word document.
#[derive(Parser, Debug)]
#[command(
    name = "notes2docx",
    version,
    about = "Convert photos of handwritten chemistry notes into Word documents",
    long_about = "Send a photo of handwritten notes to a Vision Language Model (Groq or \
Google Gemini), map the returned Markdown onto Word headings, bullets and paragraphs, and \
attach the original photo for reference.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Photo of the notes (jpg, jpeg or png).
    input: PathBuf,

    /// Write the document here instead of `<stem>_structured.docx`.
    #[arg(short, long, env = "NOTES2DOCX_OUTPUT")]
    output: Option<PathBuf>,

    /// Transcription engine.
    #[arg(long, env = "NOTES2DOCX_ENGINE", value_enum, default_value = "groq")]
    engine: EngineArg,

    /// Transcription mode (groq only).
    #[arg(long, env = "NOTES2DOCX_MODE", value_enum, default_value = "relaxed")]
    mode: ModeArg,

    /// API key. Falls back to GROQ_API_KEY / GEMINI_API_KEY.
    #[arg(long, env = "NOTES2DOCX_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model ID. Defaults to the engine's model.
    #[arg(long, env = "NOTES2DOCX_MODEL")]
    model: Option<String>,

    /// API base URL for an OpenAI-compatible endpoint (groq engine only).
    #[arg(long, env = "NOTES2DOCX_BASE_URL")]
    base_url: Option<String>,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, env = "NOTES2DOCX_TEMPERATURE", default_value_t = 0.2)]
    temperature: f32,

    /// Backend call timeout in seconds. Unbounded if unset.
    #[arg(long, env = "NOTES2DOCX_API_TIMEOUT")]
    api_timeout: Option<u64>,

    /// Also write the cleaned Markdown to this file.
    #[arg(long, env = "NOTES2DOCX_MARKDOWN_OUT")]
    markdown_out: Option<PathBuf>,

    /// Print the cleaned Markdown to stdout.
    #[arg(long, env = "NOTES2DOCX_PRINT_MARKDOWN")]
    print_markdown: bool,

    /// Print a JSON summary (blocks, stats, output path) to stdout.
    #[arg(long, env = "NOTES2DOCX_JSON")]
    json: bool,

    /// Disable the spinner.
    #[arg(long, env = "NOTES2DOCX_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "NOTES2DOCX_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "NOTES2DOCX_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum EngineArg {
    Groq,
    Gemini,
}

impl From<EngineArg> for Engine {
    fn from(v: EngineArg) -> Self {
        match v {
            EngineArg::Groq => Engine::Groq,
            EngineArg::Gemini => Engine::Gemini,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Relaxed,
    Strict,
}

impl From<ModeArg> for TranscriptionMode {
    fn from(v: ModeArg) -> Self {
        match v {
            ModeArg::Relaxed => TranscriptionMode::Relaxed,
            ModeArg::Strict => TranscriptionMode::Strict,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner gives all the feedback that matters, so INFO logs are
    // muted while it is active.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let mut config = build_config(&cli, progress_cb)?;

    if !config.engine.supports_mode() && matches!(cli.mode, ModeArg::Strict) && !cli.quiet {
        eprintln!(
            "{} --mode is ignored by {}",
            yellow("⚠"),
            config.engine
        );
    }

    // ── Resolve the backend up front: no key, no network call ────────────
    match resolve_backend(&config) {
        Ok(backend) => config.backend = Some(backend),
        Err(e @ NotesError::MissingApiKey { .. }) => {
            eprintln!("{} {e}", yellow("⚠"));
            return Ok(ExitCode::from(2));
        }
        Err(e) => return Err(e).context("Failed to set up the transcription backend"),
    }

    // ── Run conversion ───────────────────────────────────────────────────
    let output = convert(&cli.input, &config)
        .await
        .context("Conversion failed")?;

    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input));
    write_document(&output_path, &output.docx)?;

    if let Some(ref md_path) = cli.markdown_out {
        std::fs::write(md_path, &output.markdown)
            .with_context(|| format!("Failed to write Markdown to {}", md_path.display()))?;
    }

    if cli.print_markdown {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(output.markdown.as_bytes())
            .context("Failed to write to stdout")?;
        if !output.markdown.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
    }

    if cli.json {
        let summary = serde_json::json!({
            "output_path": output_path,
            "mime_type": DOCX_MIME_TYPE,
            "download_name": DEFAULT_DOWNLOAD_NAME,
            "blocks": output.blocks,
            "stats": output.stats,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
        );
    } else if !cli.quiet {
        let stats = &output.stats;
        eprintln!(
            "{}  {} blocks via {}  {}ms  →  {}",
            green("✔"),
            stats.block_count,
            stats.engine,
            stats.total_duration_ms,
            bold(&output_path.display().to_string()),
        );
        if !stats.image_embedded {
            eprintln!("   {} original photo could not be embedded", yellow("⚠"));
        }
        if let (Some(input), Some(out)) = (stats.input_tokens, stats.output_tokens) {
            eprintln!(
                "   {} tokens in  /  {} tokens out",
                dim(&input.to_string()),
                dim(&out.to_string()),
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .engine(cli.engine.into())
        .mode(cli.mode.into())
        .temperature(cli.temperature);

    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key);
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref url) = cli.base_url {
        builder = builder.base_url(url);
    }
    if let Some(secs) = cli.api_timeout {
        builder = builder.api_timeout_secs(secs);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Write via a sibling temp file so an interrupted run leaves no partial document.
fn write_document(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let tmp = path.with_extension("docx.tmp");
    std::fs::write(&tmp, bytes).with_context(|| format!("Failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, path).with_context(|| format!("Failed to write {}", path.display()))
}
