use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("only SELECT queries may be executed")]
    NotReadOnly,

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("store worker error: {0}")]
    Worker(String),
}
