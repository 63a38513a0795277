//! Environment-driven configuration loading
//!
//! The binary calls `dotenvy::dotenv()` before this, so a local `.env` file
//! feeds the same variables.

use std::time::Duration;

use super::builder::SiteBotConfigBuilder;
use super::types::{ConfigError, SiteBotConfig};

impl SiteBotConfig {
    /// Build a configuration from process environment variables
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnv` when a variable is present but not
    /// parseable, or any validation error from the builder.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Same as [`SiteBotConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = SiteBotConfig::builder();

        if let Some(key) = lookup("OPENAI_API_KEY") {
            builder = builder.openai_api_key(key);
        }
        if let Some(key) = lookup("SITEBOT_EMBEDDING_API_KEY") {
            builder = builder.embedding_api_key(key);
        }
        if let Some(url) = lookup("OPENAI_BASE_URL").filter(|v| !v.trim().is_empty()) {
            builder = builder.openai_base_url(url.trim());
        }
        if let Some(model) = lookup("SITEBOT_MODEL").filter(|v| !v.trim().is_empty()) {
            builder = builder.completion_model(model.trim());
        }
        if let Some(model) = lookup("SITEBOT_EMBEDDING_MODEL").filter(|v| !v.trim().is_empty()) {
            builder = builder.embedding_model(model.trim());
        }
        if let Some(proxy) = lookup("SITEBOT_PROXY").or_else(|| lookup("HTTPS_PROXY")) {
            builder = builder.proxy(proxy);
        }
        if let Some(raw) = lookup("SITEBOT_HEADLESS") {
            builder = builder.headless(parse_bool("SITEBOT_HEADLESS", &raw)?);
        }
        if let Some(raw) = lookup("SITEBOT_MAX_PAGES") {
            builder = builder.max_pages(parse_num("SITEBOT_MAX_PAGES", &raw)?);
        }
        if let Some(raw) = lookup("SITEBOT_MAX_TARGET_PAGES") {
            builder = builder.max_target_pages(parse_num("SITEBOT_MAX_TARGET_PAGES", &raw)?);
        }
        if let Some(raw) = lookup("SITEBOT_CHUNK_SIZE") {
            builder = builder.chunk_size(parse_num("SITEBOT_CHUNK_SIZE", &raw)?);
        }
        if let Some(raw) = lookup("SITEBOT_CHUNK_OVERLAP") {
            builder = builder.chunk_overlap(parse_num("SITEBOT_CHUNK_OVERLAP", &raw)?);
        }
        if let Some(raw) = lookup("SITEBOT_FETCH_TIMEOUT_SECS") {
            let secs: u64 = parse_num("SITEBOT_FETCH_TIMEOUT_SECS", &raw)?;
            builder = builder.fetch_timeout(Duration::from_secs(secs));
        }
        if let Some(raw) = lookup("SITEBOT_RUN_TIMEOUT_SECS") {
            let secs: u64 = parse_num("SITEBOT_RUN_TIMEOUT_SECS", &raw)?;
            builder = builder.run_timeout(Duration::from_secs(secs));
        }
        if let Some(raw) = lookup("SITEBOT_MAX_CONCURRENT_FETCHES") {
            builder =
                builder.max_concurrent_fetches(parse_num("SITEBOT_MAX_CONCURRENT_FETCHES", &raw)?);
        }
        builder = apply_settle(builder, &lookup)?;
        if let Some(raw) = lookup("SITEBOT_RETRIEVAL_TOP_K") {
            builder = builder.retrieval_top_k(parse_num("SITEBOT_RETRIEVAL_TOP_K", &raw)?);
        }
        if let Some(addr) = lookup("SITEBOT_BIND_ADDR").filter(|v| !v.trim().is_empty()) {
            builder = builder.bind_addr(addr.trim());
        }

        builder.build()
    }
}

fn apply_settle<F>(
    builder: SiteBotConfigBuilder,
    lookup: &F,
) -> Result<SiteBotConfigBuilder, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let min = lookup("SITEBOT_SETTLE_MIN_MS");
    let max = lookup("SITEBOT_SETTLE_MAX_MS");
    if min.is_none() && max.is_none() {
        return Ok(builder);
    }

    let (default_min, default_max) = builder.inner.settle_range();
    let min = match min {
        Some(raw) => Duration::from_millis(parse_num("SITEBOT_SETTLE_MIN_MS", &raw)?),
        None => default_min,
    };
    let max = match max {
        Some(raw) => Duration::from_millis(parse_num("SITEBOT_SETTLE_MAX_MS", &raw)?),
        None => default_max,
    };
    Ok(builder.settle_range(min, max))
}

/// Parse a boolean flag: 1/0, true/false, yes/no, on/off (case-insensitive)
pub fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(var, raw)),
    }
}

fn parse_num<T: std::str::FromStr>(var: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse::<T>().map_err(|_| invalid(var, raw))
}

fn invalid(var: &str, raw: &str) -> ConfigError {
    ConfigError::InvalidEnv {
        var: var.to_string(),
        value: raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = SiteBotConfig::from_lookup(lookup_from(&[])).unwrap();
        assert!(config.headless());
        assert_eq!(config.fetch_timeout(), Duration::from_secs(45));
        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
    }

    #[test]
    fn reads_overrides() {
        let config = SiteBotConfig::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-abc"),
            ("SITEBOT_HEADLESS", "off"),
            ("SITEBOT_MAX_PAGES", "4"),
            ("SITEBOT_SETTLE_MIN_MS", "0"),
            ("SITEBOT_SETTLE_MAX_MS", "10"),
            ("HTTPS_PROXY", "http://proxy.local:3128"),
        ]))
        .unwrap();
        assert_eq!(config.openai_api_key(), Some("sk-abc"));
        assert_eq!(config.max_pages(), 4);
        assert_eq!(config.proxy(), Some("http://proxy.local:3128"));
        assert_eq!(
            config.settle_range(),
            (Duration::ZERO, Duration::from_millis(10))
        );
    }

    #[test]
    fn sitebot_proxy_wins_over_https_proxy() {
        let config = SiteBotConfig::from_lookup(lookup_from(&[
            ("SITEBOT_PROXY", "http://a:1"),
            ("HTTPS_PROXY", "http://b:2"),
        ]))
        .unwrap();
        assert_eq!(config.proxy(), Some("http://a:1"));
    }

    #[test]
    fn rejects_garbage_numbers() {
        let err = SiteBotConfig::from_lookup(lookup_from(&[("SITEBOT_MAX_PAGES", "ten")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { ref var, .. } if var == "SITEBOT_MAX_PAGES"));
    }

    #[test]
    fn parse_bool_accepts_common_spellings() {
        for raw in ["1", "TRUE", "yes", "On"] {
            assert!(parse_bool("X", raw).unwrap());
        }
        for raw in ["0", "false", "No", "OFF"] {
            assert!(!parse_bool("X", raw).unwrap());
        }
        assert!(parse_bool("X", "maybe").is_err());
    }
}
