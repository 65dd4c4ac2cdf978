use secrecy::Secret;
use service_core::config::{self as core_config, get_env, get_env_opt, parse_env};
use service_core::error::AppError;

const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_ANTHROPIC_API_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4000;

/// Four chart images rarely fit the framework's 2 MiB default.
const DEFAULT_MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub common: core_config::Config,
    pub anthropic: AnthropicConfig,
    pub analysis: AnalysisSettings,
}

#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: Secret<String>,
    pub base_url: String,
    pub model: String,
    pub api_version: String,
    pub max_tokens: u32,
    /// Upstream request timeout. `None` waits for as long as the API takes.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    /// Validate the model output against the documented report shape.
    pub strict_schema: bool,
    pub max_body_bytes: usize,
}

impl AnalysisConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = core_config::is_prod();

        let max_tokens = get_env(
            "ANTHROPIC_MAX_TOKENS",
            Some(&DEFAULT_MAX_TOKENS.to_string()),
            is_prod,
        )?;
        let strict_schema = get_env("ANALYSIS_STRICT_SCHEMA", Some("false"), is_prod)?;
        let max_body_bytes = get_env(
            "ANALYSIS_MAX_BODY_BYTES",
            Some(&DEFAULT_MAX_BODY_BYTES.to_string()),
            is_prod,
        )?;
        let timeout_secs = get_env_opt("ANTHROPIC_TIMEOUT_SECS")
            .map(|raw| parse_env::<u64>("ANTHROPIC_TIMEOUT_SECS", &raw))
            .transpose()?;

        Ok(AnalysisConfig {
            common: common_config,
            anthropic: AnthropicConfig {
                api_key: Secret::new(get_env("ANTHROPIC_API_KEY", None, is_prod)?),
                base_url: get_env(
                    "ANTHROPIC_BASE_URL",
                    Some(DEFAULT_ANTHROPIC_BASE_URL),
                    is_prod,
                )?,
                model: get_env("ANTHROPIC_MODEL", Some(DEFAULT_ANTHROPIC_MODEL), is_prod)?,
                api_version: get_env(
                    "ANTHROPIC_API_VERSION",
                    Some(DEFAULT_ANTHROPIC_API_VERSION),
                    is_prod,
                )?,
                max_tokens: parse_env("ANTHROPIC_MAX_TOKENS", &max_tokens)?,
                timeout_secs,
            },
            analysis: AnalysisSettings {
                strict_schema: parse_env("ANALYSIS_STRICT_SCHEMA", &strict_schema)?,
                max_body_bytes: parse_env("ANALYSIS_MAX_BODY_BYTES", &max_body_bytes)?,
            },
        })
    }
}

impl AnthropicConfig {
    /// Settings for a given key with every other field at its default.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            base_url: DEFAULT_ANTHROPIC_BASE_URL.to_string(),
            model: DEFAULT_ANTHROPIC_MODEL.to_string(),
            api_version: DEFAULT_ANTHROPIC_API_VERSION.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: None,
        }
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            strict_schema: false,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}
