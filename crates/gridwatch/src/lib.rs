//! gridwatch - building energy query and forecast tools
//!
//! Answers building-level energy-usage queries and produces short-horizon
//! forecasts from cumulative meter readings, exposed as callable tools to an
//! orchestrating agent.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use gridwatch::models::GridwatchConfig;
//! use gridwatch::tools::{ToolCall, ToolService};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = GridwatchConfig::default();
//! let service = gridwatch::build_service(&config)?;
//! let call: ToolCall = serde_json::from_str(r#"{"tool": "get_monitored_buildings"}"#)?;
//! let envelope = service.dispatch(&call).await;
//! # Ok(())
//! # }
//! ```

pub use gridwatch_cache as cache;
pub use gridwatch_models as models;
pub use gridwatch_store as store;
pub use gridwatch_tools as tools;

use std::sync::Arc;

use gridwatch_models::config::GridwatchConfig;
use gridwatch_store::MeterStore;
use gridwatch_tools::{SeasonalNaive, ToolService};

/// Build a ToolService from configuration: open the read-only meter store,
/// construct both caches and the bounded forecast invoker, and wire them
/// together. Called once at startup; the service lives for the process.
pub fn build_service(config: &GridwatchConfig) -> Result<ToolService, anyhow::Error> {
    let store = MeterStore::open(&config.store.sqlite_path)?;
    let model = Arc::new(SeasonalNaive::new(config.forecast.season_length));
    Ok(ToolService::new(Arc::new(store), model, config))
}
