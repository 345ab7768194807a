pub mod error;
pub mod meter;
pub mod row;

pub use error::StoreError;
pub use meter::{MeterStore, QueryStore};
pub use row::{QuerySpec, ResultRow, SqlParam, SqlValue};
