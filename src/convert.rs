//! Conversion entry points.
//!
//! Every entry point funnels into the same sequence: check the converter,
//! resolve and read the input, convert, clean, assemble. They differ only in
//! where the HTML comes from and where the result goes:
//!
//! | Function | HTML from | Result |
//! |----------|-----------|--------|
//! | [`convert`] | path/URL, pandoc from config | [`ConversionOutput`] |
//! | [`convert_with`] | path/URL, caller's converter | [`ConversionOutput`] |
//! | [`convert_html`] | string in memory | [`ConversionOutput`] |
//! | [`convert_to_file`] | path/URL | file on disk + [`ConversionStats`] |
//! | [`convert_sync`] | path/URL, blocking | [`ConversionOutput`] |

use crate::config::ConversionConfig;
use crate::error::Html2MdError;
use crate::output::{ConversionOutput, ConversionStats};
use crate::pipeline::converter::{HtmlConverter, PandocConverter};
use crate::pipeline::postprocess::{self, run_stage};
use crate::pipeline::input;
use crate::progress::Stage;
use crate::template::Template;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Convert an HTML file or URL to Markdown using the converter named in `config`.
///
/// This is the primary entry point for the library.
///
/// # Errors
/// - [`Html2MdError::MissingDependency`] when the converter is not installed
///   (checked before the input is touched)
/// - file not found / permission denied / download failures
/// - converter failures
/// - [`Html2MdError::UnbalancedMathDelimiter`] in strict-math mode
pub async fn convert(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Html2MdError> {
    let converter = PandocConverter::from_config(config);
    convert_with(&converter, input_str, config).await
}

/// Convert an HTML file or URL with an explicit converter.
pub async fn convert_with<C: HtmlConverter>(
    converter: &C,
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Html2MdError> {
    let total_start = Instant::now();
    let input_str = input_str.as_ref();
    info!("Starting conversion: {}", input_str);

    // ── Step 1: Converter must exist before anything else ────────────────
    converter.check_available().await?;

    // ── Step 2: Resolve input ────────────────────────────────────────────
    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;
    let html = input::read_html(resolved.path()).await?;
    debug!("Read {} bytes of HTML", html.len());

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(input_str, html.len());
    }

    // `resolved` (and any downloaded temp dir) lives until the pipeline ends.
    let output = run_pipeline(converter, &html, config, total_start).await;
    drop(resolved);
    output
}

/// Convert HTML text already in memory.
pub async fn convert_html<C: HtmlConverter>(
    converter: &C,
    html: &str,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Html2MdError> {
    let total_start = Instant::now();
    converter.check_available().await?;
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start("<memory>", html.len());
    }
    run_pipeline(converter, html, config, total_start).await
}

/// Convert and write the result to `output_path`.
///
/// Uses atomic write (temp file in the target directory + rename) so a
/// failed run never leaves a truncated file behind; the temp file is removed
/// on every error path.
pub async fn convert_to_file<C: HtmlConverter>(
    converter: &C,
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, Html2MdError> {
    let output = convert_with(converter, input_str, config).await?;
    let path = output_path.as_ref().to_path_buf();

    let markdown = output.markdown;
    let target = path.clone();
    tokio::task::spawn_blocking(move || write_atomic(&target, &markdown))
        .await
        .map_err(|e| Html2MdError::Internal(format!("Output writer panicked: {e}")))??;

    info!("Wrote {}", path.display());
    Ok(output.stats)
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input_str: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Html2MdError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Html2MdError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(input_str, config))
}

/// Join header, body and footer.
///
/// Layout: header (if any), a blank line, the body, a newline, footer (if
/// any). The body is copied verbatim.
pub fn assemble_document(body: &str, template: Option<&Template>) -> String {
    let extra = template.map_or(0, |t| t.header.len() + t.footer.len());
    let mut out = String::with_capacity(body.len() + extra + 2);

    if let Some(t) = template {
        out.push_str(&t.header);
    }
    out.push('\n');
    out.push_str(body);
    out.push('\n');
    if let Some(t) = template {
        out.push_str(&t.footer);
    }
    out
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn run_pipeline<C: HtmlConverter>(
    converter: &C,
    html: &str,
    config: &ConversionConfig,
    total_start: Instant,
) -> Result<ConversionOutput, Html2MdError> {
    let progress = config.progress_callback.as_deref();

    // ── Convert ──────────────────────────────────────────────────────────
    if let Some(cb) = progress {
        cb.on_stage_start(Stage::Convert);
    }
    let convert_start = Instant::now();
    let converted = converter.convert(html).await?;
    let convert_duration_ms = convert_start.elapsed().as_millis() as u64;
    if let Some(cb) = progress {
        cb.on_stage_complete(Stage::Convert, converted.len());
    }
    info!(
        "{} produced {} bytes in {}ms",
        converter.name(),
        converted.len(),
        convert_duration_ms
    );

    // ── Clean ────────────────────────────────────────────────────────────
    let cleanup_start = Instant::now();
    let cleanup = postprocess::clean_with(&converted, config.strict_math, progress)?;
    let cleanup_duration_ms = cleanup_start.elapsed().as_millis() as u64;
    debug!(
        "Cleanup removed {} lines, unescaped {} math spans",
        cleanup.lines_removed, cleanup.math_spans
    );

    // ── Assemble ─────────────────────────────────────────────────────────
    let template = config.template();
    let markdown = run_stage(progress, Stage::Assemble, || {
        assemble_document(&cleanup.body, template.as_ref())
    });

    let stats = ConversionStats {
        html_bytes: html.len(),
        converted_bytes: converted.len(),
        body_bytes: cleanup.body.len(),
        output_bytes: markdown.len(),
        lines_removed: cleanup.lines_removed,
        math_spans: cleanup.math_spans,
        template_applied: template.is_some(),
        convert_duration_ms,
        cleanup_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion complete: {} bytes, {}ms total",
        stats.output_bytes, stats.total_duration_ms
    );
    if let Some(cb) = progress {
        cb.on_conversion_complete(markdown.len());
    }

    Ok(ConversionOutput {
        markdown,
        body: cleanup.body,
        stats,
    })
}

fn write_atomic(path: &Path, contents: &str) -> Result<(), Html2MdError> {
    let fail = |source: std::io::Error| Html2MdError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(fail)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(fail)?;
    tmp.write_all(contents.as_bytes()).map_err(fail)?;
    tmp.persist(path).map_err(|e| fail(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{DEFAULT_FOOTER, DEFAULT_HEADER};

    #[test]
    fn test_assemble_with_template() {
        let t = Template::default();
        let doc = assemble_document("Hello\n", Some(&t));
        assert_eq!(doc, format!("{DEFAULT_HEADER}\nHello\n\n{DEFAULT_FOOTER}"));
    }

    #[test]
    fn test_assemble_without_template() {
        assert_eq!(assemble_document("Hello\n", None), "\nHello\n\n");
    }

    #[test]
    fn test_assemble_keeps_body_verbatim() {
        let body = "\\( a\\_b \\)\n::: kept\n";
        let doc = assemble_document(body, None);
        assert!(doc.contains(body));
    }

    #[test]
    fn test_write_atomic_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/out.md");
        write_atomic(&target, "# Done\n").unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "# Done\n");

        // Only the target remains; the temp file was renamed onto it.
        let entries = std::fs::read_dir(target.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_write_atomic_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.md");
        std::fs::write(&target, "old").unwrap();
        write_atomic(&target, "new").unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "new");
    }
}
