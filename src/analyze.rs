//! Top-level analysis entry points.
//!
//! One call, one magazine: `analyze` resolves the input, ships the whole PDF
//! to Gemini with the structured-output schema, and returns the parsed
//! [`Magazine`] graph atomically. Any failure yields `Err` — a partial
//! magazine is never constructed, so the caller's "no magazine loaded" state
//! stays clean and a retry is simply a fresh call.
//!
//! Nothing here guards against overlapping calls: each invocation is
//! independent and stateless, so two concurrent analyses both complete (or
//! fail) on their own. Single-flight coordination, if wanted, belongs in the
//! embedding application.

use crate::config::AnalysisConfig;
use crate::error::MagazineError;
use crate::model::Magazine;
use crate::pipeline::{encode, gemini, input};
use std::time::Instant;
use tracing::{debug, info};

/// A completed analysis: the magazine plus request accounting.
#[derive(Debug)]
pub struct AnalysisOutput {
    pub magazine: Magazine,
    pub stats: AnalysisStats,
}

/// Accounting for one analysis call.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct AnalysisStats {
    /// Size of the uploaded PDF in bytes.
    pub pdf_bytes: u64,
    /// Prompt tokens reported by the API (0 when unreported).
    pub prompt_tokens: u32,
    /// Completion tokens reported by the API (0 when unreported).
    pub completion_tokens: u32,
    /// Wall-clock duration of the whole analysis in milliseconds.
    pub duration_ms: u64,
}

/// Analyse a magazine PDF from a local path or HTTP/HTTPS URL.
///
/// This is the primary entry point for the library.
///
/// # Errors
/// - [`MagazineError::ApiKeyMissing`] before any I/O when no credential is
///   available
/// - input errors (`FileNotFound`, `NotAPdf`, download failures)
/// - [`MagazineError::ApiError`] / [`MagazineError::ApiTimeout`] when the
///   service call fails
/// - [`MagazineError::InvalidModelOutput`] when the service answers with
///   something other than the magazine JSON
pub async fn analyze(
    input_str: impl AsRef<str>,
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, MagazineError> {
    let input_str = input_str.as_ref();
    let total_start = Instant::now();

    // ── Step 1: Credential precondition (before any I/O) ─────────────────
    let api_key = resolve_api_key(config)?;

    // ── Step 2: Resolve input ────────────────────────────────────────────
    info!("Starting magazine analysis: {}", input_str);
    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;
    let pdf_bytes = resolved.into_bytes();

    run_extraction(&api_key, pdf_bytes, config, total_start).await
}

/// Analyse magazine PDF bytes already in memory.
///
/// This is the entry point for callers that received the file as an upload
/// rather than a path. The bytes are validated (`%PDF` magic, advisory size
/// note) exactly like a local file.
pub async fn analyze_from_bytes(
    bytes: &[u8],
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, MagazineError> {
    let total_start = Instant::now();

    let api_key = resolve_api_key(config)?;
    input::validate_pdf_bytes(bytes, std::path::Path::new("<memory>"))?;

    run_extraction(&api_key, bytes.to_vec(), config, total_start).await
}

/// Write an extracted magazine as pretty JSON, atomically.
///
/// Temp file in the target directory, then rename — a crash mid-write never
/// leaves a truncated file at `path`.
pub async fn save_magazine_json(
    magazine: &Magazine,
    path: impl AsRef<std::path::Path>,
) -> Result<(), MagazineError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(magazine)
        .map_err(|e| MagazineError::Internal(format!("magazine serialisation: {e}")))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                MagazineError::OutputWriteFailed {
                    path: path.to_path_buf(),
                    source: e,
                }
            })?;
        }
    }

    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, &json)
        .await
        .map_err(|e| MagazineError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| MagazineError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
    Ok(())
}

/// Synchronous wrapper around [`analyze`].
///
/// Creates a temporary tokio runtime internally.
pub fn analyze_sync(
    input_str: impl AsRef<str>,
    config: &AnalysisConfig,
) -> Result<AnalysisOutput, MagazineError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| MagazineError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(analyze(input_str, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn run_extraction(
    api_key: &str,
    pdf_bytes: Vec<u8>,
    config: &AnalysisConfig,
    total_start: Instant,
) -> Result<AnalysisOutput, MagazineError> {
    // ── Step 3: Encode payload ───────────────────────────────────────────
    let pdf_len = pdf_bytes.len() as u64;
    let inline = encode::encode_pdf(&pdf_bytes);
    drop(pdf_bytes);

    // ── Step 4: One extraction call ──────────────────────────────────────
    let response = gemini::extract_magazine(api_key, &inline, config).await?;

    let stats = AnalysisStats {
        pdf_bytes: pdf_len,
        prompt_tokens: response.prompt_tokens,
        completion_tokens: response.completion_tokens,
        duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Extracted \"{}\" — {} pages in {}ms ({} prompt / {} completion tokens)",
        response.magazine.meta.title,
        response.magazine.page_count(),
        stats.duration_ms,
        stats.prompt_tokens,
        stats.completion_tokens
    );

    Ok(AnalysisOutput {
        magazine: response.magazine,
        stats,
    })
}

/// Resolve the API key: explicit config value first, then `GEMINI_API_KEY`.
///
/// This is the configuration-error gate of the flow — it runs before the
/// file is even opened, so a misconfigured environment fails instantly.
fn resolve_api_key(config: &AnalysisConfig) -> Result<String, MagazineError> {
    let env_key = std::env::var("GEMINI_API_KEY").ok();
    let key = api_key_from(config.api_key.as_deref(), env_key.as_deref())?;
    debug!("API key resolved ({} chars)", key.len());
    Ok(key)
}

/// Pure credential-selection logic, split out so tests can cover it without
/// mutating the process environment.
fn api_key_from(
    explicit: Option<&str>,
    env: Option<&str>,
) -> Result<String, MagazineError> {
    explicit
        .or(env)
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .ok_or(MagazineError::ApiKeyMissing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_key_wins_over_env() {
        let key = api_key_from(Some("from-config"), Some("from-env")).unwrap();
        assert_eq!(key, "from-config");
    }

    #[test]
    fn env_key_used_when_no_explicit() {
        let key = api_key_from(None, Some("from-env")).unwrap();
        assert_eq!(key, "from-env");
    }

    #[test]
    fn blank_keys_are_missing() {
        assert!(matches!(
            api_key_from(None, None),
            Err(MagazineError::ApiKeyMissing)
        ));
        assert!(matches!(
            api_key_from(Some("   "), None),
            Err(MagazineError::ApiKeyMissing)
        ));
        assert!(matches!(
            api_key_from(None, Some("")),
            Err(MagazineError::ApiKeyMissing)
        ));
    }

    #[tokio::test]
    async fn save_magazine_json_is_atomic_and_round_trips() {
        let magazine = Magazine::from_model_json(crate::model::tests::FIXTURE).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edition.json");

        save_magazine_json(&magazine, &path).await.unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());

        let reloaded: Magazine =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(reloaded.meta.title, magazine.meta.title);
        assert_eq!(reloaded.page_count(), magazine.page_count());
    }

    #[tokio::test]
    async fn bad_bytes_fail_before_network() {
        // Key present, bytes invalid: the input gate runs before any request.
        let config = crate::AnalysisConfig::builder()
            .api_key("test-key")
            .api_base("http://127.0.0.1:9") // would fail if ever reached
            .build()
            .unwrap();
        let err = analyze_from_bytes(b"not a pdf", &config).await.unwrap_err();
        assert!(matches!(err, MagazineError::NotAPdf { .. }));
    }
}
