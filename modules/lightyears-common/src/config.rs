use std::collections::HashMap;

use crate::error::ConfigError;

const DEFAULT_FEED_URL: &str = "https://api.em6.co.nz/ords/em6/data_api/free/price?";
const DEFAULT_CSV_PATH: &str = "nz_energy_data.csv";
const DEFAULT_NOTION_DATABASE_ID: &str = "1cb596796eb480e69b76e1c9da8aa7c6";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

/// Configuration for the energy poller, built once at startup.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub feed_url: String,
    pub csv_path: String,
    /// Required only when the Postgres sink is selected.
    pub database_url: Option<String>,
}

/// Configuration for the obligation extractor, built once at startup.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub notion_api_key: String,
    pub notion_database_id: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub host: String,
    pub port: u16,
    /// Run webhook-triggered passes on a background task and acknowledge immediately.
    pub background: bool,
}

impl PollerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config = Self::from_vars(&EnvSource::Process)?;
        config.log_keys();
        Ok(config)
    }

    fn from_vars(env: &EnvSource) -> Result<Self, ConfigError> {
        Ok(Self {
            feed_url: env.get_or("EM6_FEED_URL", DEFAULT_FEED_URL),
            csv_path: env.get_or("POLLER_CSV_PATH", DEFAULT_CSV_PATH),
            database_url: env.get("DATABASE_URL"),
        })
    }

    /// The database URL, or a `Missing` error naming the variable.
    pub fn require_database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or_else(|| ConfigError::Missing("DATABASE_URL".to_string()))
    }

    fn log_keys(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  EM6_FEED_URL: {}", self.feed_url);
        tracing::info!("  POLLER_CSV_PATH: {}", self.csv_path);
        tracing::info!(
            "  DATABASE_URL: {}",
            self.database_url
                .as_deref()
                .map(redact_url)
                .unwrap_or_else(|| "<not set>".to_string())
        );
    }
}

impl ExtractorConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config = Self::from_vars(&EnvSource::Process)?;
        config.log_keys();
        Ok(config)
    }

    fn from_vars(env: &EnvSource) -> Result<Self, ConfigError> {
        let port_raw = env.get_or("EXTRACTOR_PORT", "5000");
        let port = port_raw.parse().map_err(|_| ConfigError::Invalid {
            key: "EXTRACTOR_PORT".to_string(),
            value: port_raw.clone(),
            reason: "must be a port number".to_string(),
        })?;

        let background_raw = env.get_or("EXTRACTOR_BACKGROUND", "false");
        let background = parse_bool(&background_raw).ok_or_else(|| ConfigError::Invalid {
            key: "EXTRACTOR_BACKGROUND".to_string(),
            value: background_raw.clone(),
            reason: "must be true or false".to_string(),
        })?;

        Ok(Self {
            notion_api_key: env.required("NOTION_API_KEY")?,
            notion_database_id: env.get_or("NOTION_DATABASE_ID", DEFAULT_NOTION_DATABASE_ID),
            openai_api_key: env.required("OPENAI_API_KEY")?,
            openai_model: env.get_or("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
            host: env.get_or("EXTRACTOR_HOST", "0.0.0.0"),
            port,
            background,
        })
    }

    fn log_keys(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  NOTION_API_KEY: {}", preview(&self.notion_api_key));
        tracing::info!("  NOTION_DATABASE_ID: {}", self.notion_database_id);
        tracing::info!("  OPENAI_API_KEY: {}", preview(&self.openai_api_key));
        tracing::info!("  OPENAI_MODEL: {}", self.openai_model);
        tracing::info!("  EXTRACTOR_BACKGROUND: {}", self.background);
    }
}

/// Where variables are read from. Tests use a fixed map instead of the process env.
enum EnvSource {
    Process,
    #[cfg_attr(not(test), allow(dead_code))]
    Fixed(HashMap<String, String>),
}

impl EnvSource {
    fn get(&self, key: &str) -> Option<String> {
        let value = match self {
            EnvSource::Process => std::env::var(key).ok(),
            EnvSource::Fixed(map) => map.get(key).cloned(),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.get(key)
            .ok_or_else(|| ConfigError::Missing(key.to_string()))
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn preview(val: &str) -> String {
    let n = val.char_indices().nth(5).map(|(i, _)| i).unwrap_or(val.len());
    format!("{}...({} chars)", &val[..n], val.chars().count())
}

/// Hide the password component of a connection URL.
fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            let creds = &url[scheme_end + 3..at];
            match creds.find(':') {
                Some(colon) => format!(
                    "{}://{}:***{}",
                    &url[..scheme_end],
                    &creds[..colon],
                    &url[at..]
                ),
                None => url.to_string(),
            }
        }
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(pairs: &[(&str, &str)]) -> EnvSource {
        EnvSource::Fixed(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn poller_defaults() {
        let config = PollerConfig::from_vars(&fixed(&[])).unwrap();
        assert_eq!(config.feed_url, DEFAULT_FEED_URL);
        assert_eq!(config.csv_path, "nz_energy_data.csv");
        assert!(config.database_url.is_none());
        assert_eq!(
            config.require_database_url(),
            Err(ConfigError::Missing("DATABASE_URL".to_string()))
        );
    }

    #[test]
    fn extractor_requires_keys() {
        let err = ExtractorConfig::from_vars(&fixed(&[("OPENAI_API_KEY", "sk-x")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("NOTION_API_KEY".to_string()));
    }

    #[test]
    fn extractor_reads_overrides() {
        let config = ExtractorConfig::from_vars(&fixed(&[
            ("NOTION_API_KEY", "secret_abc"),
            ("OPENAI_API_KEY", "sk-abc"),
            ("EXTRACTOR_PORT", "8080"),
            ("EXTRACTOR_BACKGROUND", "true"),
            ("OPENAI_MODEL", "gpt-4.1"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert!(config.background);
        assert_eq!(config.openai_model, "gpt-4.1");
        assert_eq!(config.notion_database_id, DEFAULT_NOTION_DATABASE_ID);
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn blank_values_count_as_unset() {
        let err = ExtractorConfig::from_vars(&fixed(&[
            ("NOTION_API_KEY", "  "),
            ("OPENAI_API_KEY", "sk-abc"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing("NOTION_API_KEY".to_string()));
    }

    #[test]
    fn bad_port_is_invalid() {
        let err = ExtractorConfig::from_vars(&fixed(&[
            ("NOTION_API_KEY", "secret_abc"),
            ("OPENAI_API_KEY", "sk-abc"),
            ("EXTRACTOR_PORT", "http"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "EXTRACTOR_PORT"));
    }

    #[test]
    fn redact_url_hides_password() {
        assert_eq!(
            redact_url("postgres://energy:hunter2@db:5432/readings"),
            "postgres://energy:***@db:5432/readings"
        );
        assert_eq!(redact_url("postgres://db/readings"), "postgres://db/readings");
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        assert_eq!(preview("sk-abcdefgh"), "sk-ab...(11 chars)");
        assert_eq!(preview("ab"), "ab...(2 chars)");
    }
}
