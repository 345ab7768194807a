use serde::{Deserialize, Serialize};

/// Number of values per quantile row: index 0 is the mean, indices 1-9 are
/// the ascending deciles q10..q90.
pub const QUANTILE_COUNT: usize = 10;

/// Cache key for a forecast call. Equality is value equality over the exact
/// argument tuple; two requests with the same window, building and horizon
/// resolve to the same cached result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForecastKey {
    pub start: String,
    pub end: String,
    pub building: String,
    pub horizon: usize,
}

/// Output of one forecasting call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// One representative predicted value per future step; length == horizon.
    pub point_forecast: Vec<f64>,
    /// Per-step distribution rows of [`QUANTILE_COUNT`] values each, when the
    /// model produces them; length == horizon.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantile_forecast: Option<Vec<Vec<f64>>>,
}

impl ForecastResult {
    /// Check the output-length invariant against a horizon.
    pub fn shape_matches(&self, horizon: usize) -> bool {
        if self.point_forecast.len() != horizon {
            return false;
        }
        match &self.quantile_forecast {
            None => true,
            Some(rows) => {
                rows.len() == horizon && rows.iter().all(|row| row.len() == QUANTILE_COUNT)
            }
        }
    }
}
