use std::sync::Arc;

use gridwatch_models::forecast::ForecastResult;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::error::ToolError;
use crate::model::ForecastModel;

/// Runs the opaque model off the async request path.
///
/// Each invocation takes a permit from a bounded pool, then executes the
/// synchronous model on the tokio blocking pool and awaits it, so the
/// scheduler keeps serving other requests during inference. The output
/// length invariant is enforced here, after the call.
pub struct ForecastInvoker {
    model: Arc<dyn ForecastModel>,
    permits: Arc<Semaphore>,
}

impl ForecastInvoker {
    pub fn new(model: Arc<dyn ForecastModel>, max_concurrent: usize) -> Self {
        Self {
            model,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    pub async fn forecast(
        &self,
        series: Vec<f64>,
        horizon: usize,
    ) -> Result<ForecastResult, ToolError> {
        let _permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| ToolError::Forecast(format!("forecast worker pool closed: {e}")))?;

        debug!(data_points = series.len(), horizon, "dispatching model call");
        let model = Arc::clone(&self.model);
        let result = tokio::task::spawn_blocking(move || model.forecast(&series, horizon))
            .await
            .map_err(|e| ToolError::Forecast(format!("forecast task failed: {e}")))?
            .map_err(|e| ToolError::Forecast(e.to_string()))?;

        if !result.shape_matches(horizon) {
            return Err(ToolError::Forecast(format!(
                "model output shape does not match horizon {horizon}"
            )));
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::CountingModel;
    use crate::model::ModelError;
    use gridwatch_models::forecast::QUANTILE_COUNT;
    use std::time::{Duration, Instant};

    #[tokio::test]
    async fn forecast_returns_model_output() {
        let invoker = ForecastInvoker::new(Arc::new(CountingModel::new()), 2);
        let result = invoker.forecast(vec![1.0, 2.0, 3.0], 24).await.unwrap();
        assert_eq!(result.point_forecast.len(), 24);
        assert_eq!(result.quantile_forecast.unwrap().len(), 24);
    }

    #[tokio::test]
    async fn model_failure_wraps_as_forecast_error() {
        let invoker = ForecastInvoker::new(Arc::new(CountingModel::failing()), 2);
        let result = invoker.forecast(vec![1.0], 24).await;
        assert!(matches!(result, Err(ToolError::Forecast(_))));
    }

    #[tokio::test]
    async fn shape_violation_is_rejected() {
        struct ShortModel;
        impl crate::model::ForecastModel for ShortModel {
            fn forecast(
                &self,
                _series: &[f64],
                horizon: usize,
            ) -> Result<ForecastResult, ModelError> {
                Ok(ForecastResult {
                    point_forecast: vec![0.0; horizon.saturating_sub(1)],
                    quantile_forecast: None,
                })
            }
        }

        let invoker = ForecastInvoker::new(Arc::new(ShortModel), 1);
        let result = invoker.forecast(vec![1.0, 2.0], 24).await;
        assert!(matches!(result, Err(ToolError::Forecast(msg)) if msg.contains("shape")));
    }

    #[tokio::test]
    async fn bad_quantile_width_is_rejected() {
        struct NarrowModel;
        impl crate::model::ForecastModel for NarrowModel {
            fn forecast(
                &self,
                _series: &[f64],
                horizon: usize,
            ) -> Result<ForecastResult, ModelError> {
                Ok(ForecastResult {
                    point_forecast: vec![0.0; horizon],
                    quantile_forecast: Some(vec![vec![0.0; QUANTILE_COUNT - 1]; horizon]),
                })
            }
        }

        let invoker = ForecastInvoker::new(Arc::new(NarrowModel), 1);
        assert!(invoker.forecast(vec![1.0], 4).await.is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn scheduler_stays_free_during_inference() {
        // A slow model call must not stop unrelated async work from running.
        let invoker = Arc::new(ForecastInvoker::new(
            Arc::new(CountingModel::slow(Duration::from_millis(300))),
            1,
        ));

        let slow = {
            let invoker = Arc::clone(&invoker);
            tokio::spawn(async move { invoker.forecast(vec![1.0, 2.0], 4).await })
        };

        let started = Instant::now();
        tokio::time::sleep(Duration::from_millis(10)).await;
        let quick_elapsed = started.elapsed();

        assert!(
            quick_elapsed < Duration::from_millis(200),
            "async task was blocked for {quick_elapsed:?}"
        );
        assert!(slow.await.unwrap().is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn permit_bound_serializes_model_calls() {
        let model = Arc::new(CountingModel::slow(Duration::from_millis(50)));
        let invoker = Arc::new(ForecastInvoker::new(model.clone(), 1));

        let started = Instant::now();
        let a = {
            let invoker = Arc::clone(&invoker);
            tokio::spawn(async move { invoker.forecast(vec![1.0], 2).await })
        };
        let b = {
            let invoker = Arc::clone(&invoker);
            tokio::spawn(async move { invoker.forecast(vec![2.0], 2).await })
        };

        assert!(a.await.unwrap().is_ok());
        assert!(b.await.unwrap().is_ok());
        // With a single permit the two 50ms calls cannot fully overlap.
        assert!(started.elapsed() >= Duration::from_millis(100));
        assert_eq!(model.call_count(), 2);
    }
}
