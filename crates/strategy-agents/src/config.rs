//! Configuration for the market strategy pipeline
//!
//! The environment is read once, by [`StrategyConfigBuilder::with_env`].
//! Everything downstream receives the resolved values explicitly.

use crate::error::{AgentError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use strategy_llm::providers::{DEFAULT_GEMINI_MODEL, DEFAULT_OPENAI_MODEL};
use strategy_utils::{env_parse, env_var};

/// Default Google News base URL
pub const DEFAULT_NEWS_BASE_URL: &str = "https://news.google.com";

/// Default CSS selector for headline anchors on the news search page
pub const DEFAULT_HEADLINE_SELECTOR: &str = "a.DY5T1d";

/// Language-model backend used by the strategist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    /// Google Generative Language API
    #[default]
    Gemini,
    /// OpenAI or any compatible chat completions server
    OpenAI,
}

impl LlmBackend {
    /// Backend identifier used in logs and on the command line
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAI => "openai",
        }
    }

    /// Model used when none is configured
    pub fn default_model(self) -> &'static str {
        match self {
            Self::Gemini => DEFAULT_GEMINI_MODEL,
            Self::OpenAI => DEFAULT_OPENAI_MODEL,
        }
    }

    /// Environment variable holding this backend's API key
    pub fn api_key_var(self) -> &'static str {
        match self {
            Self::Gemini => "GOOGLE_API_KEY",
            Self::OpenAI => "OPENAI_API_KEY",
        }
    }
}

impl fmt::Display for LlmBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAI),
            other => Err(format!("unknown provider '{other}', expected gemini or openai")),
        }
    }
}

/// How the data synthesizer fills the price column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum MarketDataMode {
    /// Fixed values 75, 80, 78
    #[default]
    Fixed,
    /// Integers drawn uniformly from `[low, high]`
    ///
    /// A seed makes the draw reproducible; without one the RNG is seeded
    /// from OS entropy.
    Uniform {
        low: u32,
        high: u32,
        seed: Option<u64>,
    },
}

/// An API key that never shows up in Debug output
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key, for building request headers
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Configuration for one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Directory the chart and the report are written to
    pub output_dir: PathBuf,

    /// File name of the chart image
    pub chart_file: String,

    /// File name of the PDF report
    pub report_file: String,

    /// TrueType font used for chart text; system fonts are probed when unset
    pub chart_font: Option<PathBuf>,

    /// Base URL of the news search site
    pub news_base_url: String,

    /// CSS selector matching headline anchors
    pub headline_selector: String,

    /// Maximum number of headlines kept
    pub max_headlines: usize,

    /// News request timeout
    pub news_timeout: Duration,

    /// Synthetic data mode
    pub data_mode: MarketDataMode,

    /// Language-model backend
    pub provider: LlmBackend,

    /// Model name
    pub model: String,

    /// API key for the selected backend
    #[serde(skip)]
    pub api_key: Option<ApiKey>,

    /// Custom API base URL for the selected backend
    pub api_base: Option<String>,

    /// Maximum tokens to generate
    pub max_tokens: usize,

    /// Sampling temperature
    pub temperature: f32,

    /// Language-model request timeout
    pub llm_timeout: Duration,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            chart_file: "chart.png".to_string(),
            report_file: "strategy_report.pdf".to_string(),
            chart_font: None,
            news_base_url: DEFAULT_NEWS_BASE_URL.to_string(),
            headline_selector: DEFAULT_HEADLINE_SELECTOR.to_string(),
            max_headlines: 5,
            news_timeout: Duration::from_secs(30),
            data_mode: MarketDataMode::Fixed,
            provider: LlmBackend::Gemini,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            api_key: None,
            api_base: None,
            max_tokens: 2048,
            temperature: 0.7,
            llm_timeout: Duration::from_secs(120),
        }
    }
}

impl StrategyConfig {
    /// Create a new configuration builder
    pub fn builder() -> StrategyConfigBuilder {
        StrategyConfigBuilder::default()
    }

    /// Defaults overridden by the environment
    pub fn from_env() -> Result<Self> {
        Self::builder().with_env()?.build()
    }

    /// Full path of the chart image
    pub fn chart_path(&self) -> PathBuf {
        self.output_dir.join(&self.chart_file)
    }

    /// Full path of the PDF report
    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(&self.report_file)
    }

    /// Validate the configuration
    ///
    /// A missing API key is not a validation error; the strategist reports
    /// it when it runs so that earlier stages still execute.
    pub fn validate(&self) -> Result<()> {
        if self.max_headlines == 0 {
            return Err(AgentError::ConfigError(
                "max_headlines must be greater than 0".to_string(),
            ));
        }

        if let MarketDataMode::Uniform { low, high, .. } = self.data_mode {
            if low > high {
                return Err(AgentError::ConfigError(format!(
                    "uniform data range is empty: low {low} > high {high}"
                )));
            }
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(AgentError::ConfigError(format!(
                "temperature must be within [0, 2], got {}",
                self.temperature
            )));
        }

        if self.max_tokens == 0 {
            return Err(AgentError::ConfigError(
                "max_tokens must be greater than 0".to_string(),
            ));
        }

        for (name, value) in [
            ("chart_file", &self.chart_file),
            ("report_file", &self.report_file),
            ("model", &self.model),
            ("headline_selector", &self.headline_selector),
        ] {
            if value.trim().is_empty() {
                return Err(AgentError::ConfigError(format!("{name} must not be empty")));
            }
        }

        url::Url::parse(&self.news_base_url)?;
        Ok(())
    }
}

/// Builder for StrategyConfig
#[derive(Debug, Default)]
pub struct StrategyConfigBuilder {
    output_dir: Option<PathBuf>,
    chart_file: Option<String>,
    report_file: Option<String>,
    chart_font: Option<PathBuf>,
    news_base_url: Option<String>,
    headline_selector: Option<String>,
    max_headlines: Option<usize>,
    news_timeout: Option<Duration>,
    data_mode: Option<MarketDataMode>,
    provider: Option<LlmBackend>,
    model: Option<String>,
    api_key: Option<ApiKey>,
    api_base: Option<String>,
    max_tokens: Option<usize>,
    temperature: Option<f32>,
    llm_timeout: Option<Duration>,
    // Keys found in the environment, resolved against the backend in build()
    env_gemini_key: Option<ApiKey>,
    env_openai_key: Option<ApiKey>,
}

impl StrategyConfigBuilder {
    /// Set the output directory
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Set the chart file name
    pub fn chart_file(mut self, name: impl Into<String>) -> Self {
        self.chart_file = Some(name.into());
        self
    }

    /// Set the report file name
    pub fn report_file(mut self, name: impl Into<String>) -> Self {
        self.report_file = Some(name.into());
        self
    }

    /// Set the TrueType font used for chart text
    pub fn chart_font(mut self, path: impl Into<PathBuf>) -> Self {
        self.chart_font = Some(path.into());
        self
    }

    /// Set the news search base URL
    pub fn news_base_url(mut self, url: impl Into<String>) -> Self {
        self.news_base_url = Some(url.into());
        self
    }

    /// Set the headline CSS selector
    pub fn headline_selector(mut self, selector: impl Into<String>) -> Self {
        self.headline_selector = Some(selector.into());
        self
    }

    /// Set the maximum number of headlines
    pub fn max_headlines(mut self, max: usize) -> Self {
        self.max_headlines = Some(max);
        self
    }

    /// Set the news request timeout
    pub fn news_timeout(mut self, timeout: Duration) -> Self {
        self.news_timeout = Some(timeout);
        self
    }

    /// Set the synthetic data mode
    pub fn data_mode(mut self, mode: MarketDataMode) -> Self {
        self.data_mode = Some(mode);
        self
    }

    /// Set the language-model backend
    pub fn provider(mut self, provider: LlmBackend) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the model name
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the API key explicitly; takes precedence over the environment
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(ApiKey::new(key));
        self
    }

    /// Set a custom API base URL
    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = Some(base.into());
        self
    }

    /// Set maximum tokens to generate
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the language-model request timeout
    pub fn llm_timeout(mut self, timeout: Duration) -> Self {
        self.llm_timeout = Some(timeout);
        self
    }

    /// Fill unset values from the environment
    ///
    /// Reads `STRATEGY_PROVIDER`, `STRATEGY_MODEL`, `STRATEGY_OUTPUT_DIR`,
    /// `STRATEGY_CHART_FONT`, `STRATEGY_NEWS_URL`, `GOOGLE_API_KEY` (or
    /// `GEMINI_API_KEY`), `OPENAI_API_KEY` and `OPENAI_API_BASE`. Values
    /// already set on the builder win.
    pub fn with_env(mut self) -> Result<Self> {
        if self.provider.is_none() {
            self.provider = env_parse::<LlmBackend>("STRATEGY_PROVIDER")?;
        }
        self.model = self.model.or_else(|| env_var("STRATEGY_MODEL"));
        self.output_dir = self
            .output_dir
            .or_else(|| env_var("STRATEGY_OUTPUT_DIR").map(PathBuf::from));
        self.chart_font = self
            .chart_font
            .or_else(|| env_var("STRATEGY_CHART_FONT").map(PathBuf::from));
        self.news_base_url = self.news_base_url.or_else(|| env_var("STRATEGY_NEWS_URL"));
        self.env_gemini_key = env_var("GOOGLE_API_KEY")
            .or_else(|| env_var("GEMINI_API_KEY"))
            .map(ApiKey::new);
        self.env_openai_key = env_var("OPENAI_API_KEY").map(ApiKey::new);
        if self.api_base.is_none() && self.provider == Some(LlmBackend::OpenAI) {
            self.api_base = env_var("OPENAI_API_BASE");
        }
        Ok(self)
    }

    /// Build the configuration
    pub fn build(self) -> Result<StrategyConfig> {
        let defaults = StrategyConfig::default();
        let provider = self.provider.unwrap_or(defaults.provider);

        let api_key = self.api_key.or(match provider {
            LlmBackend::Gemini => self.env_gemini_key,
            LlmBackend::OpenAI => self.env_openai_key,
        });

        let config = StrategyConfig {
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            chart_file: self.chart_file.unwrap_or(defaults.chart_file),
            report_file: self.report_file.unwrap_or(defaults.report_file),
            chart_font: self.chart_font,
            news_base_url: self.news_base_url.unwrap_or(defaults.news_base_url),
            headline_selector: self.headline_selector.unwrap_or(defaults.headline_selector),
            max_headlines: self.max_headlines.unwrap_or(defaults.max_headlines),
            news_timeout: self.news_timeout.unwrap_or(defaults.news_timeout),
            data_mode: self.data_mode.unwrap_or(defaults.data_mode),
            provider,
            model: self
                .model
                .unwrap_or_else(|| provider.default_model().to_string()),
            api_key,
            api_base: self.api_base,
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            llm_timeout: self.llm_timeout.unwrap_or(defaults.llm_timeout),
        };

        config.validate()?;
        Ok(config)
    }
}

/// Whether `path` points at an existing regular file
pub(crate) fn is_file(path: &Path) -> bool {
    path.metadata().map(|m| m.is_file()).unwrap_or(false)
}
