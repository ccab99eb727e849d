use crate::errors::ConfigError;
use chrono_tz::Tz;
use std::{env, time::Duration};
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api-gateway-production-22bb.up.railway.app";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub api_url: Url,
    pub refresh_interval: Duration,
    pub banner_timeout: Duration,
    pub log_limit: u32,
    pub timezone: Tz,
    pub http_timeout: Duration,
}

impl Config {
    pub fn new(api_url: Url) -> Self {
        Self {
            port: 8080,
            api_url,
            refresh_interval: Duration::from_secs(300),
            banner_timeout: Duration::from_secs(10),
            log_limit: 50,
            timezone: chrono_tz::America::Sao_Paulo,
            http_timeout: Duration::from_secs(30),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup("DASHBOARD_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let mut config = Self::new(Url::parse(api_url.trim())?);

        if let Some(port) = lookup("PORT") {
            config.port = port.trim().parse().map_err(|_| ConfigError::Port(port))?;
        }
        if let Some(zone) = lookup("DASHBOARD_TIMEZONE") {
            config.timezone = zone.trim().parse().map_err(|_| ConfigError::Timezone(zone))?;
        }

        let number = |key: &str| lookup(key).and_then(|value| value.trim().parse::<u64>().ok());
        if let Some(secs) = number("DASHBOARD_REFRESH_SECS") {
            config.refresh_interval = Duration::from_secs(secs.clamp(5, 3600));
        }
        if let Some(secs) = number("DASHBOARD_BANNER_SECS") {
            config.banner_timeout = Duration::from_secs(secs);
        }
        if let Some(limit) = number("DASHBOARD_LOG_LIMIT") {
            config.log_limit = u32::try_from(limit).unwrap_or(u32::MAX);
        }
        if let Some(secs) = number("DASHBOARD_HTTP_TIMEOUT_SECS").filter(|secs| *secs > 0) {
            config.http_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_point_at_production_gateway() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_url.as_str(), "https://api-gateway-production-22bb.up.railway.app/");
        assert_eq!(config.port, 8080);
        assert_eq!(config.refresh_interval, Duration::from_secs(300));
        assert_eq!(config.banner_timeout, Duration::from_secs(10));
        assert_eq!(config.log_limit, 50);
        assert_eq!(config.timezone, chrono_tz::America::Sao_Paulo);
    }

    #[test]
    fn overrides_are_applied_and_clamped() {
        let config = Config::from_lookup(lookup(&[
            ("DASHBOARD_API_URL", "http://127.0.0.1:8081"),
            ("PORT", "9000"),
            ("DASHBOARD_REFRESH_SECS", "1"),
            ("DASHBOARD_LOG_LIMIT", "20"),
            ("DASHBOARD_TIMEZONE", "UTC"),
            ("DASHBOARD_BANNER_SECS", "oops"),
        ]))
        .unwrap();
        assert_eq!(config.api_url.as_str(), "http://127.0.0.1:8081/");
        assert_eq!(config.port, 9000);
        assert_eq!(config.refresh_interval, Duration::from_secs(5));
        assert_eq!(config.log_limit, 20);
        assert_eq!(config.timezone, chrono_tz::UTC);
        assert_eq!(config.banner_timeout, Duration::from_secs(10));
    }

    #[test]
    fn invalid_values_are_errors() {
        assert!(matches!(
            Config::from_lookup(lookup(&[("PORT", "http")])),
            Err(ConfigError::Port(_))
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("DASHBOARD_API_URL", "not a url")])),
            Err(ConfigError::ApiUrl(_))
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("DASHBOARD_TIMEZONE", "Mars/Base")])),
            Err(ConfigError::Timezone(_))
        ));
    }
}
