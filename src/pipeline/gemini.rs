//! Gemini interaction: build the structured-output request and call the API.
//!
//! Implements the subset of the Google AI Studio `generateContent` REST
//! surface this crate needs: one user turn carrying the instruction text and
//! the inline PDF, a system instruction, and a `generationConfig` that
//! requests `application/json` output against the magazine schema. All
//! prompt and schema content lives in [`crate::prompts`] so it can change
//! without touching the transport code here.
//!
//! ## Failure split
//!
//! Transport failures and non-2xx statuses are **service errors**
//! ([`MagazineError::ApiError`] / [`MagazineError::ApiTimeout`]) and surface
//! verbatim. A 2xx body that is not the requested magazine JSON is a
//! **model-compliance error** ([`MagazineError::InvalidModelOutput`]): the
//! requested `responseSchema` is advisory, so the raw payload is preserved
//! in the diagnostic log and the user gets a generic invalid-format message.
//!
//! There is no retry loop: the caller owns the retry decision, and for this
//! flow a retry is a fresh upload.

use crate::config::AnalysisConfig;
use crate::error::MagazineError;
use crate::model::Magazine;
use crate::pipeline::encode::InlineData;
use crate::prompts::{magazine_response_schema, SYSTEM_PROMPT, USER_INSTRUCTION};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

// ── Request wire types ───────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    system_instruction: Content<'a>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    InlineData { inline_data: &'a InlineData },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    temperature: f32,
    max_output_tokens: u32,
    response_mime_type: &'static str,
    response_schema: &'a Value,
}

// ── Response wire types ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

/// Error envelope returned on non-2xx statuses.
#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

// ── Results ──────────────────────────────────────────────────────────────

/// A parsed extraction response: the magazine plus token accounting.
#[derive(Debug)]
pub struct ExtractionResponse {
    pub magazine: Magazine,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// Issue the single extraction call and parse the result.
///
/// The caller has already resolved credentials; a missing key never reaches
/// this function.
pub async fn extract_magazine(
    api_key: &str,
    pdf: &InlineData,
    config: &AnalysisConfig,
) -> Result<ExtractionResponse, MagazineError> {
    let schema = magazine_response_schema();
    let body = build_request(pdf, &schema, config);
    let url = request_url(config);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.api_timeout_secs))
        .build()
        .map_err(|e| MagazineError::Internal(format!("HTTP client build failed: {e}")))?;

    info!("Calling {} ({} base64 bytes of PDF)", config.model, pdf.data.len());
    let start = Instant::now();

    let response = client
        .post(&url)
        .query(&[("key", api_key)])
        .json(&body)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                MagazineError::ApiTimeout {
                    secs: config.api_timeout_secs,
                }
            } else {
                MagazineError::ApiError {
                    status: None,
                    message: e.to_string(),
                }
            }
        })?;

    let status = response.status();
    let raw = response.text().await.map_err(|e| {
        if e.is_timeout() {
            MagazineError::ApiTimeout {
                secs: config.api_timeout_secs,
            }
        } else {
            MagazineError::ApiError {
                status: Some(status.as_u16()),
                message: format!("failed to read response body: {e}"),
            }
        }
    })?;

    if !status.is_success() {
        let message = serde_json::from_str::<ApiErrorEnvelope>(&raw)
            .map(|env| env.error.message)
            .unwrap_or_else(|_| raw.clone());
        return Err(MagazineError::ApiError {
            status: Some(status.as_u16()),
            message: format!("HTTP {}: {}", status.as_u16(), message),
        });
    }

    debug!(
        "Model responded in {}ms with {} bytes",
        start.elapsed().as_millis(),
        raw.len()
    );

    let (text, usage) = candidate_text(&raw)?;
    let magazine = Magazine::from_model_json(&text)?;

    Ok(ExtractionResponse {
        magazine,
        prompt_tokens: usage.prompt_token_count,
        completion_tokens: usage.candidates_token_count,
    })
}

/// `{api_base}/models/{model}:generateContent`
fn request_url(config: &AnalysisConfig) -> String {
    format!(
        "{}/models/{}:generateContent",
        config.api_base.trim_end_matches('/'),
        config.model
    )
}

fn build_request<'a>(
    pdf: &'a InlineData,
    schema: &'a Value,
    config: &'a AnalysisConfig,
) -> GenerateContentRequest<'a> {
    let system_prompt = config.system_prompt.as_deref().unwrap_or(SYSTEM_PROMPT);

    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user"),
            parts: vec![
                Part::Text {
                    text: USER_INSTRUCTION,
                },
                Part::InlineData { inline_data: pdf },
            ],
        }],
        system_instruction: Content {
            role: None,
            parts: vec![Part::Text {
                text: system_prompt,
            }],
        },
        generation_config: GenerationConfig {
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            response_mime_type: "application/json",
            response_schema: schema,
        },
    }
}

/// Pull the first candidate's text out of a 2xx response body.
///
/// An unparsable envelope, no candidates, or an empty part list are all
/// model-compliance failures: the service said 200 but did not deliver the
/// asked-for payload. The raw body is logged here for diagnosis.
fn candidate_text(raw: &str) -> Result<(String, UsageMetadata), MagazineError> {
    let envelope: GenerateContentResponse = serde_json::from_str(raw).map_err(|e| {
        error!(payload = raw, "response envelope failed to parse: {e}");
        MagazineError::InvalidModelOutput {
            reason: format!("unparsable response envelope: {e}"),
        }
    })?;

    let usage = envelope.usage_metadata.unwrap_or_default();

    let candidate = envelope.candidates.into_iter().next().ok_or_else(|| {
        error!(payload = raw, "response contained no candidates");
        MagazineError::InvalidModelOutput {
            reason: "response contained no candidates".into(),
        }
    })?;

    let text: String = candidate
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = match candidate.finish_reason.as_deref() {
            Some(r) => format!("candidate had no text (finish reason: {r})"),
            None => "candidate had no text".to_string(),
        };
        error!(payload = raw, "{reason}");
        return Err(MagazineError::InvalidModelOutput { reason });
    }

    Ok((text, usage))
}
