//! Configuration types for note transcription.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Keeping every knob in one struct makes
//! it easy to log the settings of a run and to inject a pre-built backend in
//! tests.

use crate::backends::TranscriptionBackend;
use crate::error::NotesError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Configuration for a single image-to-document conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_notes2docx::{ConversionConfig, Engine, TranscriptionMode};
///
/// let config = ConversionConfig::builder()
///     .engine(Engine::Groq)
///     .mode(TranscriptionMode::Strict)
///     .api_key("gsk_test")
///     .build()
///     .unwrap();
/// assert_eq!(config.engine, Engine::Groq);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Which transcription backend to call. Default: [`Engine::Groq`].
    pub engine: Engine,

    /// API key for the selected engine.
    ///
    /// If None, the key is read from the engine's environment variable
    /// (`GROQ_API_KEY` / `GEMINI_API_KEY`) when the backend is resolved.
    /// A missing key fails the request before any network call.
    pub api_key: Option<String>,

    /// Model identifier. If None, uses [`Engine::default_model`].
    pub model: Option<String>,

    /// API base URL for the chat-completions engine. If None, uses
    /// [`Engine::default_base_url`]. The Gemini endpoint is fixed, so
    /// setting this together with [`Engine::Gemini`] fails validation.
    pub base_url: Option<String>,

    /// Exact vs. lightly-corrected transcription. Only the chat-completions
    /// engine honours it. Default: [`TranscriptionMode::Relaxed`].
    pub mode: TranscriptionMode,

    /// Sampling temperature for the chat-completions engine. Default: 0.2.
    ///
    /// Low temperature keeps the model faithful to the handwriting.
    pub temperature: f32,

    /// Maximum tokens the chat-completions engine may generate. Default: 4096.
    pub max_tokens: usize,

    /// Per-call timeout in seconds. Default: None (wait indefinitely).
    pub api_timeout_secs: Option<u64>,

    /// Display width of the reference image in the document. Default: 6.0.
    pub image_width_inches: f64,

    /// Pre-constructed backend. Takes precedence over `engine`/`api_key`.
    pub backend: Option<Arc<dyn TranscriptionBackend>>,

    /// Optional progress callback for stage events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            engine: Engine::default(),
            api_key: None,
            model: None,
            base_url: None,
            mode: TranscriptionMode::default(),
            temperature: 0.2,
            max_tokens: 4096,
            api_timeout_secs: None,
            image_width_inches: 6.0,
            backend: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("engine", &self.engine)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("mode", &self.mode)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("image_width_inches", &self.image_width_inches)
            .field(
                "backend",
                &self.backend.as_ref().map(|_| "<dyn TranscriptionBackend>"),
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

    /// The model that will be requested, after applying the engine default.
    pub fn effective_model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.engine.default_model())
    }

    /// The base URL that will be used, after applying the engine default.
    pub fn effective_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.engine.default_base_url())
    }
}

/// Builder for [`ConversionConfig`].
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl fmt::Debug for ConversionConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl ConversionConfigBuilder {
    pub fn engine(mut self, engine: Engine) -> Self {
        self.config.engine = engine;
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    pub fn mode(mut self, mode: TranscriptionMode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = Some(secs);
        self
    }

    pub fn image_width_inches(mut self, inches: f64) -> Self {
        self.config.image_width_inches = inches;
        self
    }

    pub fn backend(mut self, backend: Arc<dyn TranscriptionBackend>) -> Self {
        self.config.backend = Some(backend);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, NotesError> {
        let c = &self.config;
        if !(c.image_width_inches > 0.0 && c.image_width_inches <= 20.0) {
            return Err(NotesError::InvalidConfig(format!(
                "Image width must be in (0, 20] inches, got {}",
                c.image_width_inches
            )));
        }
        if c.max_tokens == 0 {
            return Err(NotesError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        if c.api_timeout_secs == Some(0) {
            return Err(NotesError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        if let Some(ref url) = c.base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(NotesError::InvalidConfig(format!(
                    "Base URL must be http(s), got '{url}'"
                )));
            }
            if c.engine == Engine::Gemini {
                return Err(NotesError::InvalidConfig(
                    "A custom base URL is only supported for the groq engine".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// The two interchangeable transcription engines.
///
/// | Engine | Provider | Key variable |
/// |--------|----------|--------------|
/// | `Groq`   | OpenAI-compatible `/chat/completions` | `GROQ_API_KEY` |
/// | `Gemini` | Google `models/{model}:generateContent` | `GEMINI_API_KEY` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    /// Llama 4 Maverick served by Groq. Fast; honours the mode flag. (default)
    #[default]
    Groq,
    /// Google Gemini Flash. Good on complex layouts.
    Gemini,
}

impl Engine {
    /// Lower-case identifier used in logs and on the CLI.
    pub fn as_str(&self) -> &'static str {
        match self {
            Engine::Groq => "groq",
            Engine::Gemini => "gemini",
        }
    }

    /// Environment variable the API key is read from.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Engine::Groq => "GROQ_API_KEY",
            Engine::Gemini => "GEMINI_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Engine::Groq => "meta-llama/llama-4-maverick-17b-128e-instruct",
            Engine::Gemini => "gemini-1.5-flash",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Engine::Groq => "https://api.groq.com/openai/v1",
            Engine::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        }
    }

    /// Whether this engine's prompt changes with [`TranscriptionMode`].
    pub fn supports_mode(&self) -> bool {
        matches!(self, Engine::Groq)
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How freely the model may correct what it reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptionMode {
    /// Minor spelling fixes allowed for standard chemistry terms. (default)
    #[default]
    Relaxed,
    /// Keep unclear text exactly as written.
    Strict,
}
