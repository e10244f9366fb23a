use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::PathBuf;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO)
    pub source_language: String,

    /// Target language code (ISO)
    pub target_language: String,

    /// Translation config
    pub translation: TranslationConfig,

    /// Overlay layout config
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Font lookup config
    #[serde(default)]
    pub fonts: FontConfig,

    /// Output locations
    #[serde(default)]
    pub output: OutputConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: LibreTranslate HTTP API
    #[default]
    LibreTranslate,
    // @provider: Ollama
    Ollama,
}

impl TranslationProvider {
    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::LibreTranslate => "libretranslate".to_string(),
            Self::Ollama => "ollama".to_string(),
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "libretranslate" => Ok(Self::LibreTranslate),
            "ollama" => Ok(Self::Ollama),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name (Ollama only)
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        match provider_type {
            TranslationProvider::LibreTranslate => Self {
                provider_type: "libretranslate".to_string(),
                model: String::new(),
                api_key: String::new(),
                endpoint: default_libretranslate_endpoint(),
                timeout_secs: default_timeout_secs(),
            },
            TranslationProvider::Ollama => Self {
                provider_type: "ollama".to_string(),
                model: default_ollama_model(),
                api_key: String::new(),
                endpoint: default_ollama_endpoint(),
                timeout_secs: default_ollama_timeout_secs(),
            },
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// System prompt template for LLM providers
    /// Placeholders: {source_language}, {target_language}
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Delay in milliseconds enforced before every translation call
    #[serde(default = "default_rate_limit_delay_ms")]
    pub rate_limit_delay_ms: u64,

    /// Attempts per text before it is dropped
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base backoff between attempts (in milliseconds), doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Temperature parameter for LLM providers (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Blocks per translation batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Longer texts are split into chunks of at most this many characters
    #[serde(default = "default_max_chars_per_request")]
    pub max_chars_per_request: usize,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            rate_limit_delay_ms: default_rate_limit_delay_ms(),
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            temperature: default_temperature(),
            batch_size: default_batch_size(),
            max_chars_per_request: default_max_chars_per_request(),
        }
    }
}

/// Overlay geometry and styling, in PDF points
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LayoutConfig {
    /// Font size of the translated text
    #[serde(default = "default_font_size")]
    pub font_size: f64,

    /// Estimated glyph width as a fraction of the font size
    #[serde(default = "default_char_width_factor")]
    pub char_width_factor: f64,

    /// Line height as a multiple of the font size
    #[serde(default = "default_line_height_factor")]
    pub line_height_factor: f64,

    /// Distance kept from every page edge
    #[serde(default = "default_margin")]
    pub margin: f64,

    /// Vertical step between a placement and the one it collided with
    #[serde(default = "default_gap")]
    pub gap: f64,

    /// Horizontal step when moving to a new column
    #[serde(default = "default_column_gap")]
    pub column_gap: f64,

    /// Background padding around the text footprint
    #[serde(default = "default_padding")]
    pub padding: f64,

    /// Opacity of the white background (0.0 to 1.0)
    #[serde(default = "default_background_opacity")]
    pub background_opacity: f64,

    /// Stroke width of the connector line
    #[serde(default = "default_connector_width")]
    pub connector_width: f64,

    /// Gray level of the connector line (0.0 black to 1.0 white)
    #[serde(default = "default_connector_gray")]
    pub connector_gray: f64,

    /// Opacity of the connector line
    #[serde(default = "default_connector_opacity")]
    pub connector_opacity: f64,

    /// Size the text from the source bbox instead of using `font_size`
    #[serde(default)]
    pub adaptive_font_size: bool,

    /// Lower bound for adaptive sizing
    #[serde(default = "default_min_font_size")]
    pub min_font_size: f64,

    /// Upper bound for adaptive sizing
    #[serde(default = "default_max_font_size")]
    pub max_font_size: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            font_size: default_font_size(),
            char_width_factor: default_char_width_factor(),
            line_height_factor: default_line_height_factor(),
            margin: default_margin(),
            gap: default_gap(),
            column_gap: default_column_gap(),
            padding: default_padding(),
            background_opacity: default_background_opacity(),
            connector_width: default_connector_width(),
            connector_gray: default_connector_gray(),
            connector_opacity: default_connector_opacity(),
            adaptive_font_size: false,
            min_font_size: default_min_font_size(),
            max_font_size: default_max_font_size(),
        }
    }
}

/// Font lookup configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FontConfig {
    /// TrueType files tried in order; the first usable one is embedded
    #[serde(default = "default_font_search_paths")]
    pub search_paths: Vec<PathBuf>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            search_paths: default_font_search_paths(),
        }
    }
}

/// Output locations
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    /// Directory receiving translated documents
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Directory receiving per-run log files
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Write a `.meta.json` sidecar next to each output
    #[serde(default = "default_true")]
    pub write_metadata: bool,

    /// Mirror log records into a per-run file
    #[serde(default = "default_true")]
    pub file_log: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            log_dir: default_log_dir(),
            write_metadata: true,
            file_log: true,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_ollama_timeout_secs() -> u64 {
    120
}

fn default_rate_limit_delay_ms() -> u64 {
    200
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    500 // doubled on each retry
}

fn default_temperature() -> f32 {
    0.3
}

fn default_batch_size() -> usize {
    10
}

fn default_max_chars_per_request() -> usize {
    1000
}

fn default_font_size() -> f64 {
    12.0
}

fn default_char_width_factor() -> f64 {
    0.6
}

fn default_line_height_factor() -> f64 {
    1.2
}

fn default_margin() -> f64 {
    5.0
}

fn default_gap() -> f64 {
    5.0
}

fn default_column_gap() -> f64 {
    10.0
}

fn default_padding() -> f64 {
    4.0
}

fn default_background_opacity() -> f64 {
    0.9
}

fn default_connector_width() -> f64 {
    0.3
}

fn default_connector_gray() -> f64 {
    0.7
}

fn default_connector_opacity() -> f64 {
    0.5
}

fn default_min_font_size() -> f64 {
    8.0
}

fn default_max_font_size() -> f64 {
    16.0
}

fn default_true() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_font_search_paths() -> Vec<PathBuf> {
    [
        "fonts/Amiri-Regular.ttf",
        "fonts/NotoNaskhArabic-Regular.ttf",
        "/usr/share/fonts/truetype/fonts-arabeyes/ae_AlArabiya.ttf",
        "/usr/share/fonts/truetype/arabic/Amiri-Regular.ttf",
        "/usr/share/fonts/truetype/noto/NotoNaskhArabic-Regular.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    ]
    .iter()
    .map(PathBuf::from)
    .collect()
}

fn default_libretranslate_endpoint() -> String {
    "http://localhost:5000".to_string()
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2:3b".to_string()
}

fn default_system_prompt() -> String {
    "You are a professional translator. Translate the following text from {source_language} to {target_language}. Only respond with the translated text, without any explanations or notes.".to_string()
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let _source_name = crate::language_utils::get_language_name(&self.source_language)?;
        let _target_name = crate::language_utils::get_language_name(&self.target_language)?;

        if crate::language_utils::language_codes_match(&self.source_language, &self.target_language) {
            return Err(anyhow!(
                "Source and target language are the same: {} / {}",
                self.source_language,
                self.target_language
            ));
        }

        let common = &self.translation.common;
        if common.batch_size == 0 {
            return Err(anyhow!("translation.common.batch_size must be at least 1"));
        }
        if common.max_attempts == 0 {
            return Err(anyhow!("translation.common.max_attempts must be at least 1"));
        }
        if common.max_chars_per_request == 0 {
            return Err(anyhow!("translation.common.max_chars_per_request must be at least 1"));
        }

        let layout = &self.layout;
        let positive = [
            ("font_size", layout.font_size),
            ("char_width_factor", layout.char_width_factor),
            ("line_height_factor", layout.line_height_factor),
            ("min_font_size", layout.min_font_size),
            ("max_font_size", layout.max_font_size),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(anyhow!("layout.{} must be a positive number, got {}", name, value));
            }
        }
        if layout.min_font_size > layout.max_font_size {
            return Err(anyhow!("layout.min_font_size must not exceed layout.max_font_size"));
        }
        let non_negative = [
            ("margin", layout.margin),
            ("gap", layout.gap),
            ("column_gap", layout.column_gap),
            ("padding", layout.padding),
            ("connector_width", layout.connector_width),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(anyhow!("layout.{} must not be negative, got {}", name, value));
            }
        }
        let unit = [
            ("background_opacity", layout.background_opacity),
            ("connector_gray", layout.connector_gray),
            ("connector_opacity", layout.connector_opacity),
        ];
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(anyhow!("layout.{} must be between 0.0 and 1.0, got {}", name, value));
            }
        }

        // The public LibreTranslate instance rejects keyless requests
        if self.translation.provider == TranslationProvider::LibreTranslate
            && self.translation.get_endpoint().contains("libretranslate.com")
            && self.translation.get_api_key().is_empty()
        {
            return Err(anyhow!("An API key is required for the public LibreTranslate endpoint"));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: "en".to_string(),
            target_language: "ar".to_string(),
            translation: TranslationConfig::default(),
            layout: LayoutConfig::default(),
            fonts: FontConfig::default(),
            output: OutputConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        let provider_str = self.provider.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        match self.provider {
            TranslationProvider::Ollama => default_ollama_model(),
            TranslationProvider::LibreTranslate => String::new(),
        }
    }

    /// Get the API key for the active provider
    pub fn get_api_key(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.api_key.clone())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        match self.provider {
            TranslationProvider::Ollama => default_ollama_endpoint(),
            TranslationProvider::LibreTranslate => default_libretranslate_endpoint(),
        }
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        if let Some(provider_config) = self.get_active_provider_config() {
            if provider_config.timeout_secs > 0 {
                return provider_config.timeout_secs;
            }
        }

        match self.provider {
            TranslationProvider::Ollama => default_ollama_timeout_secs(),
            TranslationProvider::LibreTranslate => default_timeout_secs(),
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            available_providers: vec![
                ProviderConfig::new(TranslationProvider::LibreTranslate),
                ProviderConfig::new(TranslationProvider::Ollama),
            ],
            common: TranslationCommonConfig::default(),
        }
    }
}
