//! HTML → Markdown conversion: the external-converter seam.
//!
//! The cleanup passes only care that *something* turned HTML into Markdown
//! text. [`HtmlConverter`] is that something. The production implementation
//! is [`PandocConverter`], which pipes HTML through a `pandoc` child process;
//! tests and callers that already hold Markdown inject their own.
//!
//! ## Why pipes instead of temp files?
//!
//! pandoc reads stdin and writes stdout natively, so nothing touches the disk
//! and there is nothing to clean up if the process dies half-way. stdin is
//! fed concurrently with reading stdout; writing the whole document first
//! would deadlock once pandoc fills its stdout pipe buffer.

use crate::config::ConversionConfig;
use crate::error::Html2MdError;
use std::future::Future;
use std::io::ErrorKind;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Turns HTML text into lightweight-markup text.
///
/// Implementations must be stateless between calls; the pipeline calls
/// [`check_available`](HtmlConverter::check_available) once before reading
/// input and [`convert`](HtmlConverter::convert) once per document.
pub trait HtmlConverter: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &str;

    /// Verify the converter can run at all (binary installed, etc.).
    fn check_available(&self) -> impl Future<Output = Result<(), Html2MdError>> + Send {
        async { Ok(()) }
    }

    /// Convert one HTML document.
    fn convert(&self, html: &str) -> impl Future<Output = Result<String, Html2MdError>> + Send;
}

/// Runs `pandoc -f <from> -t <to> [extra args]` over stdin/stdout.
#[derive(Debug, Clone)]
pub struct PandocConverter {
    program: String,
    from: String,
    to: String,
    extra_args: Vec<String>,
}

impl Default for PandocConverter {
    fn default() -> Self {
        Self {
            program: "pandoc".to_string(),
            from: "html".to_string(),
            to: "markdown".to_string(),
            extra_args: Vec::new(),
        }
    }
}

impl PandocConverter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Build a converter from the `converter_*` fields of `config`.
    pub fn from_config(config: &ConversionConfig) -> Self {
        Self {
            program: config.converter_program.clone(),
            from: config.converter_from.clone(),
            to: config.converter_to.clone(),
            extra_args: config.converter_args.clone(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments passed to the converter, in order.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            self.from.clone(),
            "-t".to_string(),
            self.to.clone(),
        ];
        args.extend(self.extra_args.iter().cloned());
        args
    }

    fn io_error(&self, source: std::io::Error) -> Html2MdError {
        if source.kind() == ErrorKind::NotFound {
            self.missing()
        } else {
            Html2MdError::ConverterIo {
                tool: self.program.clone(),
                source,
            }
        }
    }

    fn missing(&self) -> Html2MdError {
        Html2MdError::MissingDependency {
            tool: self.program.clone(),
            hint: "Install pandoc (https://pandoc.org/installing.html) or point \
                   --converter / HTML2MD_CONVERTER at an existing binary."
                .to_string(),
        }
    }
}

impl HtmlConverter for PandocConverter {
    fn name(&self) -> &str {
        &self.program
    }

    async fn check_available(&self) -> Result<(), Html2MdError> {
        let status = Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| self.io_error(e))?;

        if !status.success() {
            return Err(self.missing());
        }
        debug!("Converter '{}' is available", self.program);
        Ok(())
    }

    async fn convert(&self, html: &str) -> Result<String, Html2MdError> {
        let args = self.args();
        debug!("Running {} {}", self.program, args.join(" "));

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.io_error(e))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Html2MdError::Internal("converter stdin was not captured".into()))?;
        let input = html.as_bytes().to_vec();
        let feed = async move {
            stdin.write_all(&input).await?;
            stdin.shutdown().await
        };

        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output.map_err(|e| self.io_error(e))?;

        if !output.status.success() {
            return Err(Html2MdError::ConverterFailed {
                tool: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        // A broken pipe only matters if the converter also failed.
        if let Err(e) = fed {
            debug!("Converter closed stdin early: {}", e);
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Returns its input unchanged: for documents that are already Markdown and
/// only need the cleanup passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughConverter;

impl HtmlConverter for PassthroughConverter {
    fn name(&self) -> &str {
        "passthrough"
    }

    async fn convert(&self, html: &str) -> Result<String, Html2MdError> {
        Ok(html.to_string())
    }
}
