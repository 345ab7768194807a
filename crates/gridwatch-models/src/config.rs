use serde::{Deserialize, Serialize};

/// Top-level configuration for gridwatch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GridwatchConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub forecast: ForecastConfig,
}

/// Configuration for the backing meter store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    /// Path to the SQLite meter database (written by the collection
    /// pipeline, read by gridwatch).
    pub sqlite_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            sqlite_path: "data/gridwatch.db".to_string(),
        }
    }
}

/// Configuration for the two in-process caches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheConfig {
    /// TTL in seconds for the building catalog slot.
    #[serde(default = "default_catalog_ttl")]
    pub catalog_ttl_seconds: u64,
    /// Maximum number of memoized forecast results.
    #[serde(default = "default_forecast_capacity")]
    pub forecast_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            catalog_ttl_seconds: default_catalog_ttl(),
            forecast_capacity: default_forecast_capacity(),
        }
    }
}

/// Configuration for the forecast invoker and default model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastConfig {
    /// Horizon used when the caller omits one (10-minute steps).
    #[serde(default = "default_horizon")]
    pub default_horizon: usize,
    /// Maximum number of model executions running at once.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_jobs: usize,
    /// Season length the default model repeats (144 = one day of
    /// 10-minute samples).
    #[serde(default = "default_season_length")]
    pub season_length: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            default_horizon: default_horizon(),
            max_concurrent_jobs: default_max_concurrent(),
            season_length: default_season_length(),
        }
    }
}

fn default_catalog_ttl() -> u64 {
    3600
}
fn default_forecast_capacity() -> usize {
    128
}
fn default_horizon() -> usize {
    144
}
fn default_max_concurrent() -> usize {
    2
}
fn default_season_length() -> usize {
    144
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = GridwatchConfig::default();
        assert_eq!(config.cache.catalog_ttl_seconds, 3600);
        assert_eq!(config.cache.forecast_capacity, 128);
        assert_eq!(config.forecast.default_horizon, 144);
        assert_eq!(config.forecast.max_concurrent_jobs, 2);
    }

    #[test]
    fn deserialize_example_config() {
        let toml_str = r#"
[store]
sqlite_path = "/var/lib/gridwatch/meters.db"

[cache]
catalog_ttl_seconds = 600
forecast_capacity = 32

[forecast]
default_horizon = 24
max_concurrent_jobs = 1
season_length = 144
"#;
        let config: GridwatchConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.store.sqlite_path, "/var/lib/gridwatch/meters.db");
        assert_eq!(config.cache.catalog_ttl_seconds, 600);
        assert_eq!(config.cache.forecast_capacity, 32);
        assert_eq!(config.forecast.default_horizon, 24);
    }

    #[test]
    fn deserialize_minimal_config() {
        let toml_str = r#"
[store]
sqlite_path = "data/meters.db"
"#;
        let config: GridwatchConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.store.sqlite_path, "data/meters.db");
        // Omitted sections fall back to defaults
        assert_eq!(config.cache.forecast_capacity, 128);
        assert_eq!(config.forecast.season_length, 144);
    }

    #[test]
    fn roundtrip_config() {
        let config = GridwatchConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: GridwatchConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }
}
