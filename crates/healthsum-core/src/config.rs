//! Client configuration

use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

pub const DEFAULT_UPLOAD_URL: &str = "http://localhost:5000/upload";
pub const DEFAULT_HISTORY_URL: &str = "/api/history";
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 15 * 1024 * 1024;
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 200;
pub const DEFAULT_LOG_FILTER: &str = "info";

/// What the history panel shows when the history endpoint fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryFallback {
    /// No entries; the failure is only logged
    #[default]
    Empty,
    /// Fixed illustrative entries for local development
    Demo,
}

impl std::str::FromStr for HistoryFallback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "empty" => Ok(HistoryFallback::Empty),
            "demo" => Ok(HistoryFallback::Demo),
            other => Err(format!(
                "Unknown history fallback: {}. Use 'empty' or 'demo'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub upload_url: String,
    pub history_url: String,
    /// Base URL for fetching one history record by id (`<detail_url>/<id>`)
    pub detail_url: Option<String>,
    pub max_upload_bytes: u64,
    #[serde(deserialize_with = "positive_millis")]
    pub tick_interval_ms: u64,
    pub history_fallback: HistoryFallback,
    /// `tracing` filter directive for clients without an environment (browser)
    pub log_filter: String,
}

fn positive_millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let millis = u64::deserialize(deserializer)?;
    if millis == 0 {
        return Err(serde::de::Error::custom("tick_interval_ms must be at least 1"));
    }
    Ok(millis)
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            history_url: DEFAULT_HISTORY_URL.to_string(),
            detail_url: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            history_fallback: HistoryFallback::Empty,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl ClientConfig {
    /// Parse a JSON object, filling missing fields with defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    /// URL of a single history record, if a detail endpoint is configured
    pub fn detail_url_for(&self, id: &str) -> Option<String> {
        self.detail_url
            .as_deref()
            .map(|base| format!("{}/{}", base.trim_end_matches('/'), id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_service_contract() {
        let config = ClientConfig::default();
        assert_eq!(config.upload_url, "http://localhost:5000/upload");
        assert_eq!(config.max_upload_bytes, 15 * 1024 * 1024);
        assert_eq!(config.tick_interval(), Duration::from_millis(200));
        assert_eq!(config.history_fallback, HistoryFallback::Empty);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            ClientConfig::from_json(r#"{"history_url":"https://api.example/history"}"#).unwrap();
        assert_eq!(config.history_url, "https://api.example/history");
        assert_eq!(config.upload_url, DEFAULT_UPLOAD_URL);
        assert_eq!(config.tick_interval_ms, DEFAULT_TICK_INTERVAL_MS);
    }

    #[test]
    fn test_zero_tick_interval_is_rejected() {
        let err = ClientConfig::from_json(r#"{"tick_interval_ms":0}"#).unwrap_err();
        assert!(err.to_string().contains("tick_interval_ms must be at least 1"));
        assert_eq!(ClientConfig::from_json(r#"{"tick_interval_ms":1}"#).unwrap().tick_interval_ms, 1);
    }

    #[test]
    fn test_tick_interval_never_zero() {
        let config = ClientConfig {
            tick_interval_ms: 0,
            ..ClientConfig::default()
        };
        assert_eq!(config.tick_interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_history_fallback_from_json() {
        let config = ClientConfig::from_json(r#"{"history_fallback":"demo"}"#).unwrap();
        assert_eq!(config.history_fallback, HistoryFallback::Demo);
    }

    #[test]
    fn test_history_fallback_from_str() {
        assert_eq!("Demo".parse::<HistoryFallback>(), Ok(HistoryFallback::Demo));
        assert!("mock".parse::<HistoryFallback>().is_err());
    }

    #[test]
    fn test_detail_url_for() {
        let mut config = ClientConfig::default();
        assert_eq!(config.detail_url_for("42"), None);

        config.detail_url = Some("http://localhost:5000/summary/".to_string());
        assert_eq!(
            config.detail_url_for("42").as_deref(),
            Some("http://localhost:5000/summary/42")
        );
    }
}
