pub mod envelope;
pub mod error;
pub mod invoker;
pub mod model;
pub mod series;
pub mod service;

pub use error::ToolError;
pub use invoker::ForecastInvoker;
pub use model::{ForecastModel, SeasonalNaive};
pub use service::{ToolCall, ToolService};
