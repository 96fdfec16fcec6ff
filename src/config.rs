use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub monitor: MonitorSettings,
    pub sweep: SweepSettings,
    pub sheets: SheetsSettings,
    pub notify: NotifySettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitorSettings {
    /// Path to the watch-config JSON document (trips + worksheet target)
    pub watch_config_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SweepSettings {
    /// Offer-search endpoint URL
    pub url: String,
    pub origin: String,
    pub destination: String,
    #[serde(default = "default_output_path")]
    pub output_path: String,
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

fn default_output_path() -> String {
    "prices.csv".to_string()
}

fn default_max_in_flight() -> usize {
    7
}

#[derive(Debug, Clone, Deserialize)]
pub struct SheetsSettings {
    pub base_url: String,
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifySettings {
    pub topic_url: String,
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Configuration file (config/default.toml)
    /// 2. Local overrides (config/local.toml)
    /// 3. Environment variables (prefixed with FAREWATCH_)
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("FAREWATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("FAREWATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Error)]
pub enum WatchConfigError {
    #[error("unable to read watch config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid watch config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Per-run trip list plus the worksheet target, a separate JSON document
/// so trips can change without redeploying.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    pub trips: Vec<TripConfig>,
    pub gsheet: GsheetConfig,
}

/// One monitored trip
#[derive(Debug, Clone, Deserialize)]
pub struct TripConfig {
    /// Seat-map endpoint URL
    pub url: String,
    /// Form-encoded request payload, carries the segment number
    pub data: String,
    pub name: String,
    /// Cabin type -> price threshold; cabins not listed never alert
    #[serde(default)]
    pub alerts: HashMap<String, i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GsheetConfig {
    pub id: String,
    pub tab: String,
}

impl WatchConfig {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, WatchConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_config_parses() {
        let raw = r#"{
            "trips": [{
                "url": "https://example.test/seat/RetrieveSeatMapAction",
                "data": "segmentNumber=1&cacheKeySuffix=x",
                "name": "JFK-CDG",
                "alerts": {"FIRST": 350}
            }],
            "gsheet": {"id": "doc1", "tab": "Prices"}
        }"#;
        let watch: WatchConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(watch.trips.len(), 1);
        assert_eq!(watch.trips[0].alerts["FIRST"], 350);
        assert_eq!(watch.gsheet.tab, "Prices");
    }

    #[test]
    fn test_trip_alerts_default_empty() {
        let raw = r#"{"url": "u", "data": "d", "name": "n"}"#;
        let trip: TripConfig = serde_json::from_str(raw).unwrap();
        assert!(trip.alerts.is_empty());
    }

    #[test]
    fn test_sweep_defaults() {
        assert_eq!(default_output_path(), "prices.csv");
        assert_eq!(default_max_in_flight(), 7);
    }

    #[test]
    fn test_missing_watch_config_is_fatal() {
        let err = WatchConfig::from_path("/nonexistent/watch.json").unwrap_err();
        assert!(matches!(err, WatchConfigError::Io(_)));
    }
}
