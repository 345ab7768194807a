use gridwatch_store::StoreError;
use thiserror::Error;

/// The full failure taxonomy of the tool pipeline. Every variant is caught
/// at the dispatch boundary and rendered as a `{"error": "..."}` envelope;
/// none escape to the transport as a raised fault.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("invalid request: {0}")]
    Validation(String),

    /// A well-formed request over an empty window. Not a system fault.
    #[error("no data found for the requested building and period")]
    NoData,

    #[error("result set is missing a numeric '{0}' column")]
    BadColumn(String),

    #[error("database query failed: {0}")]
    Store(#[from] StoreError),

    #[error("forecast failed: {0}")]
    Forecast(String),
}

impl ToolError {
    /// Expected outcomes (caller mistakes, empty windows) log at warn;
    /// everything else is a real fault.
    pub fn is_expected(&self) -> bool {
        matches!(self, ToolError::Validation(_) | ToolError::NoData)
    }
}
