use std::env;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::TubefeedError;

const DEFAULT_SEARCH_QUERY: &str = "cricket";
const DEFAULT_PUBLISHED_AFTER: &str = "2024-01-01T00:00:00Z";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Database
    pub database_url: String,

    // Ingestion
    pub youtube_api_keys: Vec<String>,
    pub search_query: String,
    pub published_after: DateTime<Utc>,
    pub poll_interval: Duration,
    pub request_timeout: Duration,

    // Web server
    pub web_host: String,
    pub web_port: u16,
}

impl AppConfig {
    /// Load `.env` (if any) and read configuration from the process environment.
    pub fn from_env() -> Result<Self, TubefeedError> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| env::var(key).ok())?;
        config.log_keys();
        Ok(config)
    }

    /// Build a config from any key lookup. `from_env` uses the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, TubefeedError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| TubefeedError::Config(format!("{key} environment variable is required")))
        };

        let youtube_api_keys = parse_api_keys(&required("YOUTUBE_API_KEYS")?);
        if youtube_api_keys.is_empty() {
            return Err(TubefeedError::Config(
                "YOUTUBE_API_KEYS must contain at least one key".to_string(),
            ));
        }

        let published_after = lookup("PUBLISHED_AFTER")
            .unwrap_or_else(|| DEFAULT_PUBLISHED_AFTER.to_string());
        let published_after = DateTime::parse_from_rfc3339(published_after.trim())
            .map_err(|e| TubefeedError::Config(format!("PUBLISHED_AFTER must be RFC 3339: {e}")))?
            .with_timezone(&Utc);

        let poll_interval = Duration::from_secs(parse_number(
            &lookup,
            "POLL_INTERVAL_SECS",
            DEFAULT_POLL_INTERVAL_SECS,
        )?);
        if poll_interval.is_zero() {
            return Err(TubefeedError::Config(
                "POLL_INTERVAL_SECS must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            youtube_api_keys,
            search_query: lookup("SEARCH_QUERY")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SEARCH_QUERY.to_string()),
            published_after,
            poll_interval,
            request_timeout: Duration::from_secs(parse_number(
                &lookup,
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
            web_host: lookup("WEB_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            web_port: parse_number(&lookup, "WEB_PORT", 8080)?,
        })
    }

    fn log_keys(&self) {
        fn preview(val: &str) -> String {
            let head: String = val.chars().take(5).collect();
            format!("{head}...({} chars)", val.chars().count())
        }

        tracing::info!("Config loaded:");
        tracing::info!("  DATABASE_URL: {}", preview(&self.database_url));
        for (i, key) in self.youtube_api_keys.iter().enumerate() {
            tracing::info!("  YOUTUBE_API_KEYS[{i}]: {}", preview(key));
        }
        tracing::info!("  SEARCH_QUERY: {}", self.search_query);
        tracing::info!("  PUBLISHED_AFTER: {}", self.published_after.to_rfc3339());
        tracing::info!("  POLL_INTERVAL_SECS: {}", self.poll_interval.as_secs());
        tracing::info!("  REQUEST_TIMEOUT_SECS: {}", self.request_timeout.as_secs());
        tracing::info!("  WEB: {}:{}", self.web_host, self.web_port);
    }
}

/// Split a comma-separated key list, dropping blanks.
pub fn parse_api_keys(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_number<F, T>(lookup: &F, key: &str, default: T) -> Result<T, TubefeedError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + Copy,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| TubefeedError::Config(format!("{key} must be a number"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_vars_missing() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/tubefeed"),
            ("YOUTUBE_API_KEYS", "k1,k2"),
        ]))
        .unwrap();

        assert_eq!(config.youtube_api_keys, vec!["k1", "k2"]);
        assert_eq!(config.search_query, "cricket");
        assert_eq!(
            config.published_after,
            "2024-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
        assert_eq!(config.poll_interval, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.web_port, 8080);
    }

    #[test]
    fn empty_key_pool_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/tubefeed"),
            ("YOUTUBE_API_KEYS", " , ,"),
        ]))
        .unwrap_err();
        assert!(matches!(err, TubefeedError::Config(_)));
    }

    #[test]
    fn missing_database_url_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("YOUTUBE_API_KEYS", "k1")])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn bad_numbers_and_timestamps_are_rejected() {
        let base = [
            ("DATABASE_URL", "postgres://localhost/tubefeed"),
            ("YOUTUBE_API_KEYS", "k1"),
        ];

        let mut with_port = base.to_vec();
        with_port.push(("WEB_PORT", "eighty"));
        assert!(AppConfig::from_lookup(lookup_from(&with_port)).is_err());

        let mut with_interval = base.to_vec();
        with_interval.push(("POLL_INTERVAL_SECS", "0"));
        assert!(AppConfig::from_lookup(lookup_from(&with_interval)).is_err());

        let mut with_floor = base.to_vec();
        with_floor.push(("PUBLISHED_AFTER", "last tuesday"));
        assert!(AppConfig::from_lookup(lookup_from(&with_floor)).is_err());
    }

    #[test]
    fn api_keys_are_trimmed() {
        assert_eq!(parse_api_keys(" a , b,,c "), vec!["a", "b", "c"]);
        assert!(parse_api_keys("").is_empty());
    }
}
