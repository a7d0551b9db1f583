//! CLI binary for edgequake-html2md.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use edgequake_html2md::{
    convert_to_file, convert_with, default_output_path, ConversionConfig,
    ConversionProgressCallback, Html2MdError, HtmlConverter, PandocConverter,
    PassthroughConverter, ProgressCallback, Stage,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner whose message follows the current
/// pipeline stage.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.set_message("checking converter…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, input: &str, html_bytes: usize) {
        self.bar.set_prefix("Converting");
        self.bar.println(format!(
            "{} {}  {}",
            cyan("◆"),
            bold(input),
            dim(&format!("{html_bytes} bytes of HTML"))
        ));
    }

    fn on_stage_start(&self, stage: Stage) {
        self.bar.set_message(format!("{stage}…"));
    }

    fn on_stage_complete(&self, stage: Stage, output_len: usize) {
        self.bar.println(format!(
            "  {} {:<22} {}",
            green("✓"),
            stage.label(),
            dim(&format!("{output_len:>7} bytes")),
        ));
    }

    fn on_conversion_complete(&self, _output_len: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert page.html to page.md (with header and footer)
  html2md page.html

  # Choose the output path
  html2md page.html notes/page.md

  # Body only, no front matter or references block
  html2md --no-header page.html

  # Print to stdout
  html2md --stdout page.html

  # Convert from URL
  html2md https://example.org/lecture.html lecture.md

  # Clean Markdown that pandoc already produced
  html2md --skip-convert raw.markdown clean.md

  # Fail on unmatched \[ \( $$ delimiters
  html2md --strict-math page.html

CLEANUP RULES:
  1. Drop ::: fence lines and lines made only of dashes
  2. Unwrap [text]{attributes} spans
  3. Drop {…} blocks containing a '.' (e.g. {.unnumbered})
  4. Collapse \\[ \\( \\] \\) to single-backslash delimiters
  5. Fold [ \[ … \] ] into \[ … \]
  6. Inside \[…\], \(…\), $$…$$ only: \x → x, \\x → \x

ENVIRONMENT VARIABLES:
  HTML2MD_CONVERTER       Converter binary (default: pandoc)
  HTML2MD_TO              Converter output format (default: markdown)
  HTML2MD_STRICT_MATH     Fail on unmatched math delimiters
  RUST_LOG                Log filter, overrides -v / -q
"#;

/// Convert HTML files and URLs to clean Markdown.
#[derive(Parser, Debug)]
#[command(
    name = "html2md",
    version,
    about = "Convert HTML files and URLs to clean, math-friendly Markdown",
    long_about = "Convert HTML documents (local files or URLs) to Markdown with pandoc, then \
strip pandoc-only artifacts and unescape TeX inside math delimiters. The result is wrapped in \
a front-matter header and a references footer unless --no-header is given.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local HTML file path or HTTP/HTTPS URL.
    input: String,

    /// Output file. Default: input with its extension replaced by .md.
    output: Option<PathBuf>,

    /// Omit the header and footer template.
    #[arg(long)]
    no_header: bool,

    /// Write Markdown to stdout instead of a file.
    #[arg(long)]
    stdout: bool,

    /// Print the structured result (ConversionOutput) as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Converter executable.
    #[arg(long, env = "HTML2MD_CONVERTER", default_value = "pandoc")]
    converter: String,

    /// Converter output format (pandoc writer name).
    #[arg(long, env = "HTML2MD_TO", default_value = "markdown")]
    to: String,

    /// Extra argument passed to the converter (repeatable).
    #[arg(long = "converter-arg", value_name = "ARG", allow_hyphen_values = true)]
    converter_args: Vec<String>,

    /// Treat the input as already-converted Markdown; run the cleanup only.
    #[arg(long)]
    skip_convert: bool,

    /// Fail on math delimiters that have no partner.
    #[arg(long, env = "HTML2MD_STRICT_MATH")]
    strict_math: bool,

    /// File whose contents replace the default header.
    #[arg(long, value_name = "FILE")]
    header_file: Option<PathBuf>,

    /// File whose contents replace the default footer.
    #[arg(long, value_name = "FILE")]
    footer_file: Option<PathBuf>,

    /// Extension for the default output path.
    #[arg(long, default_value = "md")]
    extension: String,

    /// HTTP download timeout in seconds.
    #[arg(long, default_value_t = 120)]
    download_timeout: u64,

    /// Disable the progress spinner.
    #[arg(long, env = "HTML2MD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Usage errors exit with 1, like every other failure; --help/--version exit 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    // ── Logging setup ────────────────────────────────────────────────────
    let to_stdout = cli.stdout || cli.json;
    let show_progress = !cli.quiet && !cli.no_progress && !cli.verbose;
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

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb).await?;

    let result = if cli.skip_convert {
        run(&cli, &PassthroughConverter, &config, to_stdout).await
    } else {
        run(&cli, &PandocConverter::from_config(&config), &config, to_stdout).await
    };

    if let Err(ref e) = result {
        if is_input_error(e) {
            eprintln!("{}", Cli::command().render_usage());
            eprintln!("For more information, try '--help'.");
        }
    }
    result
}

/// Errors caused by the INPUT argument itself, which get the usage line.
fn is_input_error(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<Html2MdError>(),
        Some(Html2MdError::FileNotFound { .. } | Html2MdError::InvalidInput { .. })
    )
}

async fn run<C: HtmlConverter>(
    cli: &Cli,
    converter: &C,
    config: &ConversionConfig,
    to_stdout: bool,
) -> Result<()> {
    if to_stdout {
        let output = convert_with(converter, &cli.input, config)
            .await
            .context("Conversion failed")?;

        let stdout = io::stdout();
        let mut handle = stdout.lock();
        if cli.json {
            let json =
                serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
            writeln!(handle, "{json}").context("Failed to write to stdout")?;
        } else {
            handle
                .write_all(output.markdown.as_bytes())
                .context("Failed to write to stdout")?;
        }
        return Ok(());
    }

    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input, &config.output_extension));

    if same_file(Path::new(&cli.input), &output_path) {
        anyhow::bail!(
            "Output path '{}' is the input file; pass an explicit output path",
            output_path.display()
        );
    }

    let stats = convert_to_file(converter, &cli.input, &output_path, config)
        .await
        .context("Conversion failed")?;

    if !cli.quiet {
        eprintln!(
            "{}  Converted {}  →  {}",
            green("✔"),
            bold(&cli.input),
            bold(&output_path.display().to_string()),
        );
        eprintln!(
            "   {}",
            dim(&format!(
                "{} bytes  ·  {} lines dropped  ·  {} math spans  ·  {}ms",
                stats.output_bytes,
                stats.lines_removed,
                stats.math_spans,
                stats.total_duration_ms
            )),
        );
        if !stats.template_applied {
            eprintln!("   {}", cyan("Note: header and footer were omitted (--no-header)."));
        }
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .include_template(!cli.no_header)
        .converter_program(cli.converter.clone())
        .converter_to(cli.to.clone())
        .converter_args(cli.converter_args.clone())
        .strict_math(cli.strict_math)
        .output_extension(cli.extension.clone())
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref path) = cli.header_file {
        builder = builder.header(read_template_part(path).await?);
    }
    if let Some(ref path) = cli.footer_file {
        builder = builder.footer(read_template_part(path).await?);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

async fn read_template_part(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read template file {:?}", path))
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_positional_output() {
        let cli = Cli::try_parse_from(["html2md", "--no-header", "in.html", "out.md"]).unwrap();
        assert!(cli.no_header);
        assert_eq!(cli.input, "in.html");
        assert_eq!(cli.output, Some(PathBuf::from("out.md")));
    }

    #[test]
    fn test_cli_missing_input_is_error() {
        let err = Cli::try_parse_from(["html2md", "--stdout"]).unwrap_err();
        assert!(err.use_stderr());
    }

    #[test]
    fn test_cli_converter_args() {
        let cli = Cli::try_parse_from([
            "html2md",
            "--converter-arg",
            "--wrap=none",
            "--converter-arg=--columns=80",
            "in.html",
        ])
        .unwrap();
        assert_eq!(cli.converter_args, vec!["--wrap=none", "--columns=80"]);
    }

    #[test]
    fn test_input_errors_get_usage() {
        let missing = anyhow::Error::new(Html2MdError::FileNotFound {
            path: PathBuf::from("gone.html"),
        })
        .context("Conversion failed");
        assert!(is_input_error(&missing));

        let blank = anyhow::Error::new(Html2MdError::InvalidInput { input: " ".into() });
        assert!(is_input_error(&blank));

        let download = anyhow::Error::new(Html2MdError::DownloadFailed {
            url: "https://example.org".into(),
            reason: "HTTP 404".into(),
        })
        .context("Conversion failed");
        assert!(!is_input_error(&download));
    }

    #[test]
    fn test_usage_names_the_input_argument() {
        let usage = Cli::command().render_usage().to_string();
        assert!(usage.contains("html2md"), "{usage}");
        assert!(usage.contains("<INPUT>"), "{usage}");
    }

    #[test]
    fn test_same_file() {
        assert!(same_file(Path::new("a.md"), Path::new("a.md")));
        assert!(!same_file(Path::new("a.html"), Path::new("a.md")));
    }
}
