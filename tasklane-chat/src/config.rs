//! Gateway configuration.

use std::time::Duration;

use tasklane_stream::DecoderConfig;

use crate::error::ConfigError;

/// Default gateway base URL.
pub const DEFAULT_BASE_URL: &str = "https://ai.gateway.tasklane.dev";

/// Default model used for chat completions.
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";

/// Environment variable overriding [`GatewayConfig::base_url`].
pub const ENV_BASE_URL: &str = "TASKLANE_GATEWAY_URL";
/// Environment variable overriding [`GatewayConfig::model`].
pub const ENV_MODEL: &str = "TASKLANE_MODEL";
/// Environment variable setting [`GatewayConfig::timeout`], in whole seconds.
pub const ENV_TIMEOUT_SECS: &str = "TASKLANE_TIMEOUT_SECS";
/// Environment variable setting [`DecoderConfig::max_line_retries`].
pub const ENV_MAX_LINE_RETRIES: &str = "TASKLANE_MAX_LINE_RETRIES";

/// Static configuration for a [`GatewayClient`](crate::GatewayClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Gateway base URL, without the `/v1/...` path.
    pub base_url: String,

    /// Model identifier sent with every request.
    pub model: String,

    /// Whole-request timeout, including reading the streamed body.
    ///
    /// A timeout that fires mid-stream ends the reply as a transport failure.
    pub timeout: Option<Duration>,

    /// Stream decoder tuning.
    pub decoder: DecoderConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            timeout: None,
            decoder: DecoderConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Build a config from the process environment, starting from defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build a config from an arbitrary variable lookup, starting from defaults.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get(ENV_BASE_URL) {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = get(ENV_MODEL) {
            config.model = model;
        }
        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            let secs = parse_number::<u64>(ENV_TIMEOUT_SECS, &raw)?;
            config.timeout = Some(Duration::from_secs(secs));
        }
        if let Some(raw) = get(ENV_MAX_LINE_RETRIES) {
            config.decoder.max_line_retries = Some(parse_number::<u32>(ENV_MAX_LINE_RETRIES, &raw)?);
        }

        tracing::debug!(
            base_url = %config.base_url,
            model = %config.model,
            timeout = ?config.timeout,
            max_line_retries = ?config.decoder.max_line_retries,
            "loaded gateway config"
        );
        Ok(config)
    }
}

fn parse_number<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError {
        var: var.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}
