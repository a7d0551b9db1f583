//! Header and footer wrapped around the converted body.
//!
//! The defaults turn the output into a ready-to-edit pandoc document: YAML
//! front matter to fill in, and a references section where citeproc places
//! the bibliography. Callers can override either part via
//! [`crate::config::ConversionConfig::header`] / `footer`; the constants here
//! are used only when no override is provided.

/// Default header: empty YAML front matter.
pub const DEFAULT_HEADER: &str = r#"---
title: ""
author: ""
date: ""
bibliography: references.bib
link-citations: true
---
"#;

/// Default footer: the references block.
pub const DEFAULT_FOOTER: &str = r#"# References

::: {#refs}
:::
"#;

/// The header/footer pair applied by the assembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub header: String,
    pub footer: String,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            header: DEFAULT_HEADER.to_string(),
            footer: DEFAULT_FOOTER.to_string(),
        }
    }
}

impl Template {
    /// Default template with either part optionally replaced.
    pub fn with_overrides(header: Option<&str>, footer: Option<&str>) -> Self {
        let default = Self::default();
        Self {
            header: header.map_or(default.header, str::to_string),
            footer: footer.map_or(default.footer, str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_front_matter() {
        assert!(DEFAULT_HEADER.starts_with("---\n"));
        assert!(DEFAULT_HEADER.ends_with("---\n"));
    }

    #[test]
    fn footer_holds_refs_div() {
        assert!(DEFAULT_FOOTER.contains("{#refs}"));
        assert!(DEFAULT_FOOTER.ends_with('\n'));
    }

    #[test]
    fn overrides_replace_only_given_parts() {
        let t = Template::with_overrides(Some("HEAD\n"), None);
        assert_eq!(t.header, "HEAD\n");
        assert_eq!(t.footer, DEFAULT_FOOTER);
    }
}
