//! Configuration types for HTML-to-Markdown conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across tasks and to log exactly what a run
//! was asked to do.

use crate::error::Html2MdError;
use crate::progress::ProgressCallback;
use crate::template::Template;
use std::fmt;

/// Configuration for an HTML-to-Markdown conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_html2md::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .include_template(false)
///     .strict_math(true)
///     .converter_program("/usr/local/bin/pandoc")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Wrap the body with the header/footer template. Default: true.
    pub include_template: bool,

    /// Custom header text. If None, uses [`crate::template::DEFAULT_HEADER`].
    pub header: Option<String>,

    /// Custom footer text. If None, uses [`crate::template::DEFAULT_FOOTER`].
    pub footer: Option<String>,

    /// Converter executable, looked up on `PATH` if not absolute. Default: "pandoc".
    pub converter_program: String,

    /// Converter input format. Default: "html".
    pub converter_from: String,

    /// Converter output format. Default: "markdown".
    ///
    /// The cleanup passes target pandoc's own Markdown dialect; `gfm` or
    /// `commonmark_x` work too but produce fewer artifacts to clean.
    pub converter_to: String,

    /// Extra arguments appended to the converter command line.
    pub converter_args: Vec<String>,

    /// Fail on unmatched math delimiters instead of leaving them untouched. Default: false.
    ///
    /// Spans are matched non-greedily, so a missing closer silently pairs the
    /// opener with the next span's closer or leaves the tail unprocessed.
    /// Strict mode turns that into [`Html2MdError::UnbalancedMathDelimiter`]
    /// pointing at the first stray delimiter.
    pub strict_math: bool,

    /// Extension of the default output file. Default: "md".
    pub output_extension: String,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Optional progress callback. Default: None.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            include_template: true,
            header: None,
            footer: None,
            converter_program: "pandoc".to_string(),
            converter_from: "html".to_string(),
            converter_to: "markdown".to_string(),
            converter_args: Vec::new(),
            strict_math: false,
            output_extension: "md".to_string(),
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("include_template", &self.include_template)
            .field("header", &self.header.as_ref().map(|h| h.len()))
            .field("footer", &self.footer.as_ref().map(|h| h.len()))
            .field("converter_program", &self.converter_program)
            .field("converter_from", &self.converter_from)
            .field("converter_to", &self.converter_to)
            .field("converter_args", &self.converter_args)
            .field("strict_math", &self.strict_math)
            .field("output_extension", &self.output_extension)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The header/footer pair to wrap the body with, or None when disabled.
    pub fn template(&self) -> Option<Template> {
        self.include_template
            .then(|| Template::with_overrides(self.header.as_deref(), self.footer.as_deref()))
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn include_template(mut self, v: bool) -> Self {
        self.config.include_template = v;
        self
    }

    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.config.header = Some(header.into());
        self
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.config.footer = Some(footer.into());
        self
    }

    pub fn converter_program(mut self, program: impl Into<String>) -> Self {
        self.config.converter_program = program.into();
        self
    }

    pub fn converter_from(mut self, format: impl Into<String>) -> Self {
        self.config.converter_from = format.into();
        self
    }

    pub fn converter_to(mut self, format: impl Into<String>) -> Self {
        self.config.converter_to = format.into();
        self
    }

    pub fn converter_arg(mut self, arg: impl Into<String>) -> Self {
        self.config.converter_args.push(arg.into());
        self
    }

    pub fn converter_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.converter_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn strict_math(mut self, v: bool) -> Self {
        self.config.strict_math = v;
        self
    }

    pub fn output_extension(mut self, ext: impl Into<String>) -> Self {
        let ext = ext.into();
        self.config.output_extension = ext.trim_start_matches('.').to_string();
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Html2MdError> {
        let c = &self.config;
        if c.converter_program.trim().is_empty() {
            return Err(Html2MdError::InvalidConfig(
                "Converter program must not be empty".into(),
            ));
        }
        if c.converter_from.trim().is_empty() || c.converter_to.trim().is_empty() {
            return Err(Html2MdError::InvalidConfig(
                "Converter input and output formats must not be empty".into(),
            ));
        }
        if c.output_extension.is_empty() {
            return Err(Html2MdError::InvalidConfig(
                "Output extension must not be empty".into(),
            ));
        }
        if c.download_timeout_secs == 0 {
            return Err(Html2MdError::InvalidConfig(
                "Download timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{DEFAULT_FOOTER, DEFAULT_HEADER};

    #[test]
    fn test_defaults() {
        let c = ConversionConfig::default();
        assert!(c.include_template);
        assert!(!c.strict_math);
        assert_eq!(c.converter_program, "pandoc");
        assert_eq!(c.converter_to, "markdown");
        assert_eq!(c.output_extension, "md");
    }

    #[test]
    fn test_builder_sets_fields() {
        let c = ConversionConfig::builder()
            .include_template(false)
            .strict_math(true)
            .converter_args(["--wrap=none", "--columns=100"])
            .output_extension(".markdown")
            .build()
            .unwrap();
        assert!(!c.include_template);
        assert!(c.strict_math);
        assert_eq!(c.converter_args, vec!["--wrap=none", "--columns=100"]);
        assert_eq!(c.output_extension, "markdown");
    }

    #[test]
    fn test_builder_rejects_empty_program() {
        let err = ConversionConfig::builder()
            .converter_program("  ")
            .build()
            .unwrap_err();
        assert!(matches!(err, Html2MdError::InvalidConfig(_)));
    }

    #[test]
    fn test_builder_rejects_empty_extension() {
        assert!(ConversionConfig::builder()
            .output_extension(".")
            .build()
            .is_err());
    }

    #[test]
    fn test_template_disabled() {
        let c = ConversionConfig::builder()
            .include_template(false)
            .build()
            .unwrap();
        assert!(c.template().is_none());
    }

    #[test]
    fn test_template_overrides() {
        let c = ConversionConfig::builder().footer("END\n").build().unwrap();
        let t = c.template().unwrap();
        assert_eq!(t.header, DEFAULT_HEADER);
        assert_eq!(t.footer, "END\n");
        assert_ne!(t.footer, DEFAULT_FOOTER);
    }

    #[test]
    fn test_debug_hides_callback() {
        let dbg = format!("{:?}", ConversionConfig::default());
        assert!(dbg.contains("converter_program"));
        assert!(dbg.contains("progress_callback: None"));
    }
}
