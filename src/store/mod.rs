// src/store/mod.rs
use anyhow::Result;

use crate::dataset::Record;

#[cfg(test)]
pub mod memory;
pub mod rest;

pub use rest::RestStore;

/// A remote table the dataset is written to and read back from.
///
/// Every call is a single blocking round trip from the caller's point of
/// view; implementations neither retry nor batch.
#[allow(async_fn_in_trait)]
pub trait TableStore {
    /// Submit all `records` to `table` in one call.
    async fn insert(&self, table: &str, records: &[Record]) -> Result<()>;

    /// Exact number of rows currently in `table`.
    async fn count(&self, table: &str) -> Result<u64>;

    /// Value of `column` for every row of `table`; `None` for SQL nulls.
    async fn select_column(&self, table: &str, column: &str) -> Result<Vec<Option<String>>>;

    /// Every row of `table` as a [`Record`], ordered by `id`.
    async fn fetch_records(&self, table: &str) -> Result<Vec<Record>>;
}
