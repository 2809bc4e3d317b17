//! Configuration for a magazine analysis call.
//!
//! All behaviour is controlled through [`AnalysisConfig`], built via its
//! [`AnalysisConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs, serialise them for logging, and diff two runs
//! to understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! Positional constructors break on every new field. The builder lets
//! callers set only what they care about and rely on documented defaults.

use crate::error::MagazineError;
use serde::{Deserialize, Serialize};

/// Default Gemini REST endpoint base (model name is appended per call).
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model; magazine layout extraction needs the Pro tier's long
/// visual context, Flash-class models drop elements on dense pages.
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";

/// Configuration for a PDF-magazine analysis.
///
/// Built via [`AnalysisConfig::builder()`] or [`AnalysisConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2mag::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .model("gemini-2.5-pro")
///     .api_timeout_secs(600)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Gemini model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// Explicit API key. When `None`, `GEMINI_API_KEY` is read from the
    /// process environment; absence of both fails before any network call.
    /// Skipped on serialisation so a logged config never leaks the key.
    #[serde(skip_serializing, default)]
    pub api_key: Option<String>,

    /// API base URL. Default: [`DEFAULT_API_BASE`]. Overridable so tests can
    /// point the client at a local endpoint.
    pub api_base: String,

    /// Sampling temperature. Default: 0.1.
    ///
    /// Extraction is transcription, not composition — low temperature keeps
    /// the model faithful to what is on the page.
    pub temperature: f32,

    /// Maximum tokens the model may generate. Default: 65536.
    ///
    /// A dense 60-page magazine serialises to tens of thousands of tokens of
    /// JSON; truncation mid-document is unrecoverable, so the ceiling is
    /// generous.
    pub max_output_tokens: u32,

    /// Per-call timeout in seconds. Default: 300.
    ///
    /// A whole-magazine extraction is one long request; the model reads every
    /// page before the first response byte arrives.
    pub api_timeout_secs: u64,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Custom system prompt. If None, uses [`crate::prompts::SYSTEM_PROMPT`].
    pub system_prompt: Option<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            temperature: 0.1,
            max_output_tokens: 65536,
            api_timeout_secs: 300,
            download_timeout_secs: 120,
            system_prompt: None,
        }
    }
}

impl AnalysisConfig {
    /// Create a new builder for `AnalysisConfig`.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`AnalysisConfig`].
#[derive(Debug)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.config.api_base = base.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_output_tokens(mut self, n: u32) -> Self {
        self.config.max_output_tokens = n.max(1);
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs.max(1);
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs.max(1);
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalysisConfig, MagazineError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(MagazineError::InvalidConfig(
                "Model name must not be empty".into(),
            ));
        }
        if c.api_base.trim().is_empty() {
            return Err(MagazineError::InvalidConfig(
                "API base URL must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
