pub mod config;
pub mod forecast;
pub mod reading;
pub mod timefmt;

pub use config::{CacheConfig, ForecastConfig, GridwatchConfig, StoreConfig};
pub use forecast::{ForecastKey, ForecastResult, QUANTILE_COUNT};
pub use reading::{EnergyReading, METER_TABLE_DDL};
