use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use crate::error::{Result, SubtradError};

/// Default OpenAI-compatible endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default endpoint used for `deepseek*` models
pub const DEFAULT_DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";

fn default_temperature() -> f32 {
    0.3
}

fn default_target_language() -> String {
    "cat".to_string()
}

fn default_target_language_name() -> String {
    "Catalan".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub translate: TranslateConfig,
    pub selection: SelectionConfig,
    pub media: MediaConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateConfig {
    /// API credential for the chat completion endpoint (environment only)
    #[serde(skip_serializing)]
    pub api_key: String,
    /// Custom API base URL; resolved from the model name when unset
    pub base_url: Option<String>,
    /// Chat completion model identifier
    pub model: Option<String>,
    /// Sampling temperature sent with every chat completion call
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Translation mode: single backend or dual-backend reconciliation
    pub mode: TranslationMode,
    /// Cues per block; falls back to the mode default when unset
    pub block_size: Option<usize>,
    /// Target language code, also used as the mkvmerge language tag
    #[serde(default = "default_target_language")]
    pub target_language: String,
    /// Human readable target language name used in prompts
    #[serde(default = "default_target_language_name")]
    pub target_language_name: String,
    /// Source phrase overrides appended to the translation prompt
    pub glossary: Vec<GlossaryEntry>,
    /// Free-form instructions appended after the glossary
    pub extra_instructions: Vec<String>,
    /// Optional HTTP request timeout; no timeout when unset
    pub request_timeout_secs: Option<u64>,
    /// Local rule-based machine translation engine
    pub rule_based: RuleBasedConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationMode {
    /// Single: one chat completion call per block
    #[default]
    Single,
    /// Dual: rule-based and chat translations merged by a reconciliation call
    Dual,
}

impl TranslationMode {
    /// Number of cues per block when no explicit size is configured
    pub fn default_block_size(&self) -> usize {
        match self {
            TranslationMode::Single => 10,
            TranslationMode::Dual => 50,
        }
    }
}

impl std::str::FromStr for TranslationMode {
    type Err = SubtradError;

    fn from_str(mode: &str) -> Result<Self> {
        match mode.to_lowercase().as_str() {
            "single" => Ok(TranslationMode::Single),
            "dual" => Ok(TranslationMode::Dual),
            _ => Err(SubtradError::Config(format!(
                "Invalid translation mode '{}'. Valid modes: single, dual",
                mode
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleBasedConfig {
    /// Path to the MT engine binary (e.g., apertium)
    pub binary_path: String,
    /// Source language code -> engine pipeline name
    pub pipelines: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Language preference sets, tried in order
    pub languages: Vec<LanguagePreference>,
    /// Skip tracks flagged as forced
    pub reject_forced: bool,
    /// Track name fragments marking SDH or commentary tracks
    pub blocked_name_tokens: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePreference {
    /// Canonical code reported for a match, e.g. "spa"
    pub code: String,
    /// Prefixes accepted for the track language field
    pub prefixes: Vec<String>,
}

impl LanguagePreference {
    pub fn new(code: &str, prefixes: &[&str]) -> Self {
        Self {
            code: code.to_string(),
            prefixes: prefixes.iter().map(|p| p.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Path to mkvmerge binary (track listing and muxing)
    pub mkvmerge_path: String,
    /// Path to mkvextract binary
    pub mkvextract_path: String,
    /// Container extensions picked up from the input folder
    pub container_extensions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Mux the translated subtitles into a new container
    pub embed_subtitles: bool,
    /// Extension used for extracted and translated subtitle files
    pub subtitle_extension: String,
    /// Suffix inserted before the extension of the new container
    pub embedded_suffix: String,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        let mut pipelines = BTreeMap::new();
        pipelines.insert("spa".to_string(), "spa-cat".to_string());
        pipelines.insert("eng".to_string(), "eng-cat".to_string());

        Self {
            api_key: String::new(),
            base_url: None,
            model: None,
            temperature: default_temperature(),
            mode: TranslationMode::Single,
            block_size: None,
            target_language: default_target_language(),
            target_language_name: default_target_language_name(),
            glossary: Vec::new(),
            extra_instructions: Vec::new(),
            request_timeout_secs: None,
            rule_based: RuleBasedConfig {
                binary_path: "apertium".to_string(),
                pipelines,
            },
        }
    }
}

impl Default for RuleBasedConfig {
    fn default() -> Self {
        TranslateConfig::default().rule_based
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            languages: vec![
                LanguagePreference::new("spa", &["spa"]),
                LanguagePreference::new("eng", &["eng"]),
            ],
            reject_forced: true,
            blocked_name_tokens: [
                "sdh",
                "hearing",
                "discapacitat",
                "commentary",
                "director",
                "comentarios",
                "comment",
            ]
            .iter()
            .map(|t| t.to_string())
            .collect(),
        }
    }
}

impl SelectionConfig {
    /// Looser policy accepting two-letter codes and forced tracks
    pub fn loose() -> Self {
        Self {
            languages: vec![
                LanguagePreference::new("spa", &["es", "spa"]),
                LanguagePreference::new("eng", &["en", "eng"]),
            ],
            reject_forced: false,
            ..Self::default()
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            mkvmerge_path: "mkvmerge".to_string(),
            mkvextract_path: "mkvextract".to_string(),
            container_extensions: vec!["mkv".to_string()],
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            embed_subtitles: false,
            subtitle_extension: "srt".to_string(),
            embedded_suffix: "CAT".to_string(),
        }
    }
}

impl TranslateConfig {
    /// Model identifier, empty when not configured
    pub fn model_name(&self) -> &str {
        self.model.as_deref().unwrap_or_default()
    }

    /// Base URL for chat completions, falling back on the model family default
    pub fn resolved_base_url(&self) -> String {
        let url = match &self.base_url {
            Some(url) if !url.trim().is_empty() => url.trim().to_string(),
            _ if self.model_name().to_lowercase().starts_with("deepseek") => {
                DEFAULT_DEEPSEEK_BASE_URL.to_string()
            }
            _ => DEFAULT_BASE_URL.to_string(),
        };
        url.trim_end_matches('/').to_string()
    }

    /// Cues per block for the configured mode
    pub fn effective_block_size(&self) -> usize {
        self.block_size.unwrap_or_else(|| self.mode.default_block_size())
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SubtradError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| SubtradError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SubtradError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| SubtradError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Overlay settings from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Overlay settings from an arbitrary variable lookup.
    ///
    /// Recognized variables: `API_KEY`, `MODEL`, `BASE_URL`,
    /// `DEEPSEEK_BASE_URL` (only for `deepseek*` models) and `EMBED_SUBS`
    /// (any non-empty value enables embedding).
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("API_KEY") {
            self.translate.api_key = key.trim().to_string();
        }
        if let Some(model) = non_empty("MODEL") {
            self.translate.model = Some(model.trim().to_string());
        }

        let base_url_var = if self.translate.model_name().to_lowercase().starts_with("deepseek") {
            "DEEPSEEK_BASE_URL"
        } else {
            "BASE_URL"
        };
        if let Some(url) = non_empty(base_url_var) {
            self.translate.base_url = Some(url.trim().to_string());
        }

        if non_empty("EMBED_SUBS").is_some() {
            self.output.embed_subtitles = true;
        }
    }

    /// Check the settings every run needs before touching any container
    pub fn validate(&self) -> Result<()> {
        if self.translate.api_key.is_empty() {
            return Err(SubtradError::Config(
                "API key not found in the API_KEY environment variable".to_string(),
            ));
        }
        if self.translate.model_name().trim().is_empty() {
            return Err(SubtradError::Config(
                "Model not found in the MODEL environment variable or config file".to_string(),
            ));
        }
        if self.translate.block_size == Some(0) {
            return Err(SubtradError::Config("Block size must be at least 1".to_string()));
        }
        if self.translate.target_language.trim().is_empty() {
            return Err(SubtradError::Config("Target language must not be empty".to_string()));
        }
        if !(0.0..=2.0).contains(&self.translate.temperature) {
            return Err(SubtradError::Config(format!(
                "Temperature {} is outside 0.0..=2.0",
                self.translate.temperature
            )));
        }
        if self.selection.languages.is_empty() {
            return Err(SubtradError::Config(
                "At least one subtitle language preference is required".to_string(),
            ));
        }
        Ok(())
    }
}
