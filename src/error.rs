//! Error types for the pdf2mag library.
//!
//! The taxonomy mirrors the three user-facing failure classes of the
//! extraction flow:
//!
//! * **Configuration** — [`MagazineError::ApiKeyMissing`]: checked before any
//!   network I/O; nothing to retry until the environment is fixed.
//! * **Service** — [`MagazineError::ApiError`] / [`MagazineError::ApiTimeout`]:
//!   the inference call itself failed; the message is surfaced verbatim and a
//!   retry is a fresh `analyze` call.
//! * **Model compliance** — [`MagazineError::InvalidModelOutput`]: the service
//!   answered, but the body is not the magazine JSON we asked for. Kept
//!   distinct from service errors because a requested `responseSchema` is a
//!   strong hint, not a contract. The raw payload is logged at `error!` level
//!   for diagnosis and is deliberately not part of the display message.
//!
//! Input and I/O variants follow the same conventions: one variant per
//! failure, with a message that tells the user what to do next.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf2mag library.
#[derive(Debug, Error)]
pub enum MagazineError {
    // ── Configuration errors ──────────────────────────────────────────────
    /// No Gemini API key available; checked before any request is attempted.
    #[error(
        "GEMINI_API_KEY is not set.\n\
         Export it (export GEMINI_API_KEY=...) or pass an explicit key in AnalysisConfig."
    )]
    ApiKeyMissing,

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Service errors ────────────────────────────────────────────────────
    /// The Gemini API returned a transport failure or a non-success status.
    /// `status` is `None` when the request never reached the service.
    #[error("Gemini API error: {message}")]
    ApiError {
        status: Option<u16>,
        message: String,
    },

    /// The extraction call exceeded the configured timeout.
    #[error("Gemini API call timed out after {secs}s\nIncrease --timeout for large magazines.")]
    ApiTimeout { secs: u64 },

    // ── Model-compliance errors ───────────────────────────────────────────
    /// The service responded, but the body is not valid magazine JSON.
    ///
    /// The offending payload is logged via `tracing` at the point of failure;
    /// only the parse reason travels in the error value.
    #[error("The model returned an invalid format: {reason}\nRaw payload available in the diagnostic log (RUST_LOG=pdf2mag=error).")]
    InvalidModelOutput { reason: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MagazineError {
    /// True when the failure is a model-compliance problem rather than a
    /// transport or configuration one. Callers use this to pick between the
    /// generic "invalid format" message and the verbatim service error.
    pub fn is_model_output_error(&self) -> bool {
        matches!(self, MagazineError::InvalidModelOutput { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_missing_mentions_env_var() {
        let msg = MagazineError::ApiKeyMissing.to_string();
        assert!(msg.contains("GEMINI_API_KEY"), "got: {msg}");
    }

    #[test]
    fn api_error_display() {
        let e = MagazineError::ApiError {
            status: Some(429),
            message: "HTTP 429: quota exceeded".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("429"), "got: {msg}");
        assert!(msg.contains("quota exceeded"));
    }

    #[test]
    fn invalid_output_never_embeds_payload() {
        let e = MagazineError::InvalidModelOutput {
            reason: "expected value at line 1 column 1".into(),
        };
        assert!(e.is_model_output_error());
        assert!(e.to_string().contains("invalid format"));
    }

    #[test]
    fn not_a_pdf_shows_magic() {
        let e = MagazineError::NotAPdf {
            path: PathBuf::from("cover.png"),
            magic: *b"\x89PNG",
        };
        assert!(e.to_string().contains("cover.png"));
    }
}
