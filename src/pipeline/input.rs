//! Input resolution: normalise a user-supplied path or URL to HTML text.
//!
//! ## Why download to a temp file?
//!
//! Downloading into a `TempDir` gives URL inputs the same shape as local
//! ones (a path we can read and name the output after), and the directory is
//! removed when [`ResolvedInput`] is dropped, on success, error or panic.

use crate::error::Html2MdError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// Where the HTML lives on disk.
pub enum ResolvedInput {
    Local(PathBuf),
    /// Downloaded page; the file disappears with `_temp_dir`.
    Downloaded { path: PathBuf, _temp_dir: TempDir },
}

impl ResolvedInput {
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local(p) => p,
            ResolvedInput::Downloaded { path, .. } => path,
        }
    }
}

pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Map `input` to a readable file, downloading HTTP(S) URLs first.
///
/// Blank input is rejected with [`Html2MdError::InvalidInput`].
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, Html2MdError> {
    if input.trim().is_empty() {
        return Err(Html2MdError::InvalidInput {
            input: input.to_string(),
        });
    }
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        resolve_local(input)
    }
}

/// Read an HTML file as text.
///
/// Invalid UTF-8 is replaced rather than rejected: converters emit their own
/// diagnostics for broken markup, and one bad byte should not sink a page.
pub async fn read_html(path: &Path) -> Result<String, Html2MdError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Html2MdError::FileNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => Html2MdError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => Html2MdError::Internal(format!("Failed to read '{}': {}", path.display(), e)),
    })?;

    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            warn!(
                "'{}' is not valid UTF-8; invalid sequences replaced",
                path.display()
            );
            Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
        }
    }
}

/// Default output location: the input with its extension replaced.
///
/// URL inputs are named after the last path segment and written to the
/// current directory.
pub fn default_output_path(input: &str, extension: &str) -> PathBuf {
    let base = if is_url(input) {
        PathBuf::from(filename_from_url(input))
    } else {
        PathBuf::from(input)
    };
    base.with_extension(extension)
}

fn resolve_local(path_str: &str) -> Result<ResolvedInput, Html2MdError> {
    let path = PathBuf::from(path_str);

    // Opening the file is the only portable read-permission check.
    let opened = std::fs::File::open(&path).and_then(|f| f.metadata());
    match opened {
        Ok(meta) if meta.is_file() => {
            debug!("Local HTML: {} ({} bytes)", path.display(), meta.len());
            Ok(ResolvedInput::Local(path))
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(Html2MdError::PermissionDenied { path })
        }
        _ => Err(Html2MdError::FileNotFound { path }),
    }
}

fn download_error(url: &str, timeout_secs: u64, e: reqwest::Error) -> Html2MdError {
    if e.is_timeout() {
        Html2MdError::DownloadTimeout {
            url: url.to_string(),
            secs: timeout_secs,
        }
    } else {
        Html2MdError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }
}

/// Stream a URL into a fresh temp directory.
async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedInput, Html2MdError> {
    use tokio::io::AsyncWriteExt;

    info!("Downloading HTML from: {}", url);
    let fail = |e| download_error(url, timeout_secs, e);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(fail)?;
    let mut response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(fail)?;

    let temp_dir = TempDir::new()
        .map_err(|e| Html2MdError::Internal(format!("Cannot create temp dir: {e}")))?;
    let path = temp_dir.path().join(filename_from_url(url));
    let write_err = |e: std::io::Error| {
        Html2MdError::Internal(format!("Cannot write '{}': {e}", path.display()))
    };

    let mut file = tokio::fs::File::create(&path).await.map_err(write_err)?;
    let mut total = 0usize;
    while let Some(chunk) = response.chunk().await.map_err(fail)? {
        total += chunk.len();
        file.write_all(&chunk).await.map_err(write_err)?;
    }
    file.flush().await.map_err(write_err)?;

    info!("Downloaded {} bytes to {}", total, path.display());
    Ok(ResolvedInput::Downloaded {
        path,
        _temp_dir: temp_dir,
    })
}

/// Last non-empty URL path segment, or `downloaded.html`.
fn filename_from_url(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()?
                .next_back()
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "downloaded.html".to_string())
}
