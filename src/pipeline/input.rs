//! Input resolution: normalise a user-supplied path or URL to PDF bytes.
//!
//! The whole file is loaded into memory because the Gemini call ships the
//! binary inline in the request body — there is no local page-by-page
//! processing that would benefit from streaming. We validate the `%PDF`
//! magic before returning so callers get a meaningful error rather than a
//! rejected upload. URL inputs land in a `TempDir` first so a partial
//! download never masquerades as a complete file; the directory is removed
//! on drop even if the process panics.

use crate::error::MagazineError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info, warn};

/// Advisory size note shown to users; uploads above this are logged, not
/// rejected — the inference service is the enforcement point.
pub const ADVISORY_MAX_BYTES: u64 = 50 * 1024 * 1024;

/// The resolved input: the PDF bytes plus where they came from.
#[derive(Debug)]
pub struct ResolvedInput {
    path: PathBuf,
    bytes: Vec<u8>,
    /// Keeps a downloaded file alive until processing completes.
    _temp_dir: Option<TempDir>,
}

impl ResolvedInput {
    /// Path of the local PDF file (original or downloaded copy).
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The raw PDF bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the input, returning the bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Validate the `%PDF` magic and the advisory size limit.
pub fn validate_pdf_bytes(bytes: &[u8], path: &Path) -> Result<(), MagazineError> {
    let mut magic = [0u8; 4];
    let len = bytes.len().min(4);
    magic[..len].copy_from_slice(&bytes[..len]);
    if &magic != b"%PDF" {
        return Err(MagazineError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }
    if bytes.len() as u64 > ADVISORY_MAX_BYTES {
        warn!(
            "PDF is {} MB, above the advisory 50 MB note; the API may reject it",
            bytes.len() / (1024 * 1024)
        );
    }
    Ok(())
}

/// Resolve the input string to local PDF bytes.
///
/// If the input is a URL, download it to a temporary directory.
/// If the input is a local file, validate it exists and is readable.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, MagazineError> {
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        resolve_local(input)
    }
}

/// Resolve a local file path, validating existence and PDF magic bytes.
fn resolve_local(path_str: &str) -> Result<ResolvedInput, MagazineError> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(MagazineError::FileNotFound { path });
    }

    let bytes = match std::fs::read(&path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(MagazineError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(MagazineError::FileNotFound { path });
        }
    };

    validate_pdf_bytes(&bytes, &path)?;
    debug!("Resolved local PDF: {} ({} bytes)", path.display(), bytes.len());

    Ok(ResolvedInput {
        path,
        bytes,
        _temp_dir: None,
    })
}

/// Download a URL to a temporary directory and return its bytes.
async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedInput, MagazineError> {
    info!("Downloading PDF from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| MagazineError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            MagazineError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            MagazineError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(MagazineError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let filename = extract_filename(url);

    let temp_dir = TempDir::new().map_err(|e| MagazineError::Internal(e.to_string()))?;
    let file_path = temp_dir.path().join(&filename);

    let bytes = response
        .bytes()
        .await
        .map_err(|e| MagazineError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?
        .to_vec();

    validate_pdf_bytes(&bytes, &file_path)?;

    tokio::fs::write(&file_path, &bytes)
        .await
        .map_err(|e| MagazineError::Internal(format!("Failed to write temp file: {}", e)))?;

    info!("Downloaded to: {}", file_path.display());

    Ok(ResolvedInput {
        path: file_path,
        bytes,
        _temp_dir: Some(temp_dir),
    })
}

/// Extract a reasonable filename from the URL path.
fn extract_filename(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }

    "downloaded.pdf".to_string()
}
