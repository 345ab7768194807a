use std::sync::Arc;
use std::time::Duration;

use gridwatch_cache::{LruCache, TtlSlot};
use gridwatch_models::config::GridwatchConfig;
use gridwatch_models::forecast::{ForecastKey, ForecastResult};
use gridwatch_models::timefmt;
use gridwatch_store::{QuerySpec, QueryStore, SqlValue};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::envelope::{failure, success};
use crate::error::ToolError;
use crate::invoker::ForecastInvoker;
use crate::model::ForecastModel;
use crate::series::extract_series;

const SQL_MONITORED_BUILDINGS: &str =
    "SELECT DISTINCT building FROM meter_readings ORDER BY building";

const SQL_DATA_RANGE: &str = "SELECT MIN(recorded_at) AS start_datetime, \
     MAX(recorded_at) AS end_datetime FROM meter_readings WHERE building = ?1";

const SQL_USAGE_RANGE: &str = "SELECT building, data_value, recorded_at FROM meter_readings \
     WHERE building = ?1 AND recorded_at >= ?2 AND recorded_at <= ?3 \
     ORDER BY recorded_at ASC";

/// One tool invocation as received from the transport collaborator.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCall {
    pub tool: String,
    #[serde(default)]
    pub args: Value,
}

/// A memoized forecast: the model output plus the number of historical
/// samples it was computed from (surfaced in `meta.data_points`).
#[derive(Debug, Clone)]
pub struct CachedForecast {
    pub data_points: usize,
    pub result: ForecastResult,
}

/// Per-tool coordinator: validate, consult the relevant cache, query the
/// store, run the forecaster, store back, and shape the envelope.
///
/// Both caches are created here once and owned for the life of the service;
/// the service itself is `Send + Sync` and shared across concurrent
/// dispatches behind an `Arc`.
pub struct ToolService {
    store: Arc<dyn QueryStore>,
    catalog: TtlSlot<Vec<String>>,
    forecasts: LruCache<ForecastKey, CachedForecast>,
    invoker: ForecastInvoker,
    default_horizon: usize,
}

impl ToolService {
    pub fn new(
        store: Arc<dyn QueryStore>,
        model: Arc<dyn ForecastModel>,
        config: &GridwatchConfig,
    ) -> Self {
        Self {
            store,
            catalog: TtlSlot::new(Duration::from_secs(config.cache.catalog_ttl_seconds)),
            forecasts: LruCache::new(config.cache.forecast_capacity),
            invoker: ForecastInvoker::new(model, config.forecast.max_concurrent_jobs),
            default_horizon: config.forecast.default_horizon.max(1),
        }
    }

    /// Replace the catalog TTL. Tests use sub-second windows.
    pub fn with_catalog_ttl(mut self, ttl: Duration) -> Self {
        self.catalog = TtlSlot::new(ttl);
        self
    }

    pub fn catalog_cache(&self) -> &TtlSlot<Vec<String>> {
        &self.catalog
    }

    pub fn forecast_cache(&self) -> &LruCache<ForecastKey, CachedForecast> {
        &self.forecasts
    }

    /// Resolve a named tool call to an envelope. Every failure anywhere in
    /// the pipeline is logged here with full detail and converted to a
    /// failure envelope; nothing propagates to the transport as a fault.
    pub async fn dispatch(&self, call: &ToolCall) -> Value {
        let request_id = Uuid::new_v4();
        info!(%request_id, tool = %call.tool, "tool call received");

        match self.route(call).await {
            Ok(envelope) => {
                info!(%request_id, tool = %call.tool, "tool call succeeded");
                envelope
            }
            Err(err) => {
                if err.is_expected() {
                    warn!(%request_id, tool = %call.tool, error = %err, "tool call rejected");
                } else {
                    error!(%request_id, tool = %call.tool, error = %err, "tool call failed");
                }
                failure(&err.to_string())
            }
        }
    }

    async fn route(&self, call: &ToolCall) -> Result<Value, ToolError> {
        match call.tool.as_str() {
            "get_current_time" => Ok(self.current_time()),
            "get_monitored_buildings" => self.monitored_buildings().await,
            "get_building_data_range" => {
                let building = str_arg(&call.args, "building")?;
                self.building_data_range(&building).await
            }
            "get_energy_usages" => {
                let (start, end, building) = window_args(&call.args)?;
                self.energy_usages(&start, &end, &building).await
            }
            "get_total_energy_usage" => {
                let (start, end, building) = window_args(&call.args)?;
                self.total_energy_usage(&start, &end, &building).await
            }
            "forecast_energy_usage" => {
                let (start, end, building) = window_args(&call.args)?;
                let horizon = horizon_arg(&call.args, self.default_horizon)?;
                self.forecast_energy_usage(&start, &end, &building, horizon)
                    .await
            }
            other => Err(ToolError::Validation(format!("unknown tool '{other}'"))),
        }
    }

    /// Current local date and time.
    pub fn current_time(&self) -> Value {
        let now = chrono::Local::now().naive_local();
        let mut payload = Map::new();
        payload.insert("current_time".to_string(), json!(timefmt::to_iso(&now)));
        success(json!({}), payload)
    }

    /// The building catalog: every building currently producing readings.
    /// Served from the TTL slot when fresh.
    pub async fn monitored_buildings(&self) -> Result<Value, ToolError> {
        if let Some(buildings) = self.catalog.get() {
            debug!("catalog cache hit");
            return Ok(Self::catalog_envelope(&buildings));
        }

        let rows = self
            .store
            .execute(QuerySpec::new(SQL_MONITORED_BUILDINGS))
            .await?;
        let buildings: Vec<String> = rows
            .iter()
            .filter_map(|row| row.get("building").and_then(SqlValue::as_str))
            .map(str::to_string)
            .collect();

        if buildings.is_empty() {
            return Err(ToolError::NoData);
        }

        self.catalog.put(buildings.clone());
        Ok(Self::catalog_envelope(&buildings))
    }

    fn catalog_envelope(buildings: &[String]) -> Value {
        let mut payload = Map::new();
        payload.insert("buildings".to_string(), json!(buildings));
        success(json!({}), payload)
    }

    /// First and last collection instants for one building.
    pub async fn building_data_range(&self, building: &str) -> Result<Value, ToolError> {
        validate_building(building)?;

        let rows = self
            .store
            .execute(QuerySpec::with_params(
                SQL_DATA_RANGE,
                vec![building.into()],
            ))
            .await?;

        // MIN/MAX over an empty window comes back as a single all-NULL row.
        let (start, end) = rows
            .first()
            .and_then(|row| {
                let start = row.get("start_datetime")?.as_str()?;
                let end = row.get("end_datetime")?.as_str()?;
                Some((start.to_string(), end.to_string()))
            })
            .ok_or(ToolError::NoData)?;

        let mut payload = Map::new();
        payload.insert(
            "start_datetime".to_string(),
            json!(timefmt::wire_to_iso(&start)),
        );
        payload.insert(
            "end_datetime".to_string(),
            json!(timefmt::wire_to_iso(&end)),
        );
        Ok(success(json!({ "building": building }), payload))
    }

    /// The 10-minute reading series for one building over a window.
    pub async fn energy_usages(
        &self,
        start: &str,
        end: &str,
        building: &str,
    ) -> Result<Value, ToolError> {
        let rows = self.usage_rows(start, end, building).await?;
        if rows.is_empty() {
            return Err(ToolError::NoData);
        }

        let infos: Vec<Value> = rows
            .iter()
            .map(|row| {
                let recorded_at = row
                    .get("recorded_at")
                    .and_then(SqlValue::as_str)
                    .map(timefmt::wire_to_iso)
                    .unwrap_or_default();
                json!({
                    "building": row.get("building").and_then(SqlValue::as_str).unwrap_or(building),
                    "data_value": row.get("data_value").and_then(SqlValue::as_f64),
                    "recorded_at": recorded_at,
                })
            })
            .collect();

        let mut payload = Map::new();
        payload.insert("energy_usage_infos".to_string(), json!(infos));
        Ok(success(json!({ "building": building }), payload))
    }

    /// Total usage over a window: the absolute difference between the first
    /// and last cumulative readings, sign-independent.
    pub async fn total_energy_usage(
        &self,
        start: &str,
        end: &str,
        building: &str,
    ) -> Result<Value, ToolError> {
        let rows = self.usage_rows(start, end, building).await?;
        let series = extract_series(&rows, "data_value")?;

        let first = series.first().copied().unwrap_or_default();
        let last = series.last().copied().unwrap_or_default();
        let total_usage = (last - first).abs();

        let mut payload = Map::new();
        payload.insert("total_usage".to_string(), json!(total_usage));
        Ok(success(json!({ "building": building }), payload))
    }

    /// Forecast future usage from the window's readings. Memoized by the
    /// exact argument tuple in the LRU cache.
    ///
    /// Two concurrent misses for the same key may both run the model and
    /// both store; the last write wins. De-duplication is deliberately not
    /// done here.
    pub async fn forecast_energy_usage(
        &self,
        start: &str,
        end: &str,
        building: &str,
        horizon: usize,
    ) -> Result<Value, ToolError> {
        validate_window(start, end, building)?;

        let key = ForecastKey {
            start: start.to_string(),
            end: end.to_string(),
            building: building.to_string(),
            horizon,
        };

        if let Some(cached) = self.forecasts.get(&key) {
            debug!(building, horizon, "forecast cache hit");
            return Self::forecast_envelope(&key, cached.data_points, &cached.result);
        }

        let rows = self.usage_rows(start, end, building).await?;
        let series = extract_series(&rows, "data_value")?;
        let data_points = series.len();

        let result = self.invoker.forecast(series, horizon).await?;
        self.forecasts.put(
            key.clone(),
            CachedForecast {
                data_points,
                result: result.clone(),
            },
        );

        Self::forecast_envelope(&key, data_points, &result)
    }

    fn forecast_envelope(
        key: &ForecastKey,
        data_points: usize,
        result: &ForecastResult,
    ) -> Result<Value, ToolError> {
        let forecast =
            serde_json::to_value(result).map_err(|e| ToolError::Forecast(e.to_string()))?;
        let mut payload = Map::new();
        payload.insert("forecast".to_string(), forecast);
        Ok(success(
            json!({
                "building": key.building,
                "horizon": key.horizon,
                "data_points": data_points,
            }),
            payload,
        ))
    }

    async fn usage_rows(
        &self,
        start: &str,
        end: &str,
        building: &str,
    ) -> Result<Vec<gridwatch_store::ResultRow>, ToolError> {
        validate_window(start, end, building)?;
        let rows = self
            .store
            .execute(QuerySpec::with_params(
                SQL_USAGE_RANGE,
                vec![building.into(), start.into(), end.into()],
            ))
            .await?;
        Ok(rows)
    }
}

fn validate_building(building: &str) -> Result<(), ToolError> {
    if building.trim().is_empty() {
        return Err(ToolError::Validation(
            "building must be a non-empty string".to_string(),
        ));
    }
    Ok(())
}

fn validate_window(start: &str, end: &str, building: &str) -> Result<(), ToolError> {
    validate_building(building)?;
    let start_dt = timefmt::parse_wire(start).map_err(|e| {
        ToolError::Validation(format!(
            "start_date_time must be 'YYYY-MM-DD HH:MM:SS': {e}"
        ))
    })?;
    let end_dt = timefmt::parse_wire(end).map_err(|e| {
        ToolError::Validation(format!("end_date_time must be 'YYYY-MM-DD HH:MM:SS': {e}"))
    })?;
    if start_dt > end_dt {
        return Err(ToolError::Validation(
            "start_date_time must not be after end_date_time".to_string(),
        ));
    }
    Ok(())
}

fn str_arg(args: &Value, name: &str) -> Result<String, ToolError> {
    args.get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ToolError::Validation(format!("missing or non-string argument '{name}'")))
}

fn window_args(args: &Value) -> Result<(String, String, String), ToolError> {
    Ok((
        str_arg(args, "start_date_time")?,
        str_arg(args, "end_date_time")?,
        str_arg(args, "building")?,
    ))
}

fn horizon_arg(args: &Value, default: usize) -> Result<usize, ToolError> {
    match args.get("horizon") {
        None | Some(Value::Null) => Ok(default),
        Some(value) => value
            .as_u64()
            .filter(|h| *h >= 1)
            .map(|h| h as usize)
            .ok_or_else(|| {
                ToolError::Validation("horizon must be a positive integer".to_string())
            }),
    }
}
