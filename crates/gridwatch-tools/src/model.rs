use gridwatch_models::forecast::{ForecastResult, QUANTILE_COUNT};
use thiserror::Error;

/// Failure inside a forecasting model call.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct ModelError(pub String);

/// The opaque forecasting function: series in, point/quantile forecast out.
///
/// Implementations are synchronous and may be computationally heavy; the
/// [`crate::invoker::ForecastInvoker`] is responsible for keeping them off
/// the async request path. A model is called exactly once per invocation
/// with no retries.
pub trait ForecastModel: Send + Sync {
    fn forecast(&self, series: &[f64], horizon: usize) -> Result<ForecastResult, ModelError>;
}

/// Standard-normal z-scores for the deciles q10..q90.
const DECILE_Z: [f64; 9] = [
    -1.2816, -0.8416, -0.5244, -0.2533, 0.0, 0.2533, 0.5244, 0.8416, 1.2816,
];

/// Deterministic seasonal-naive model: repeats the last observed season and
/// derives quantile spread from the mean absolute step between samples.
pub struct SeasonalNaive {
    season: usize,
}

impl SeasonalNaive {
    pub fn new(season: usize) -> Self {
        Self {
            season: season.max(1),
        }
    }
}

impl Default for SeasonalNaive {
    fn default() -> Self {
        // One day of 10-minute samples.
        Self::new(144)
    }
}

impl ForecastModel for SeasonalNaive {
    fn forecast(&self, series: &[f64], horizon: usize) -> Result<ForecastResult, ModelError> {
        if series.is_empty() {
            return Err(ModelError("input series is empty".to_string()));
        }

        let season_len = self.season.min(series.len());
        let base = &series[series.len() - season_len..];
        let point_forecast: Vec<f64> = (0..horizon).map(|i| base[i % season_len]).collect();

        let spread = if series.len() > 1 {
            series
                .windows(2)
                .map(|pair| (pair[1] - pair[0]).abs())
                .sum::<f64>()
                / (series.len() - 1) as f64
        } else {
            0.0
        };

        let quantile_forecast: Vec<Vec<f64>> = point_forecast
            .iter()
            .map(|&p| {
                let mut row = Vec::with_capacity(QUANTILE_COUNT);
                row.push(p);
                row.extend(DECILE_Z.iter().map(|z| p + z * spread));
                row
            })
            .collect();

        Ok(ForecastResult {
            point_forecast,
            quantile_forecast: Some(quantile_forecast),
        })
    }
}
