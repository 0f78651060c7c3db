//! The boundary between the toolkit and the underlying access layer.
//!
//! Everything above this trait is pure statement assembly and page
//! arithmetic; everything below it is driver plumbing (connection
//! acquisition, binding, decoding). Implementations execute statements
//! with positional `?` parameters and return rows as ordered column→value
//! maps. They perform no retries and no classification — failures
//! propagate unchanged.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value as JsonValue;

use crate::error::Result;

/// A decoded row: column name → JSON value, in result-set column order.
pub type Row = IndexMap<String, JsonValue>;

/// A parameterized-execution primitive over one backing database.
#[async_trait]
pub trait Executor: Send + Sync {
   /// The database product name, used once per context to resolve the
   /// dialect (e.g. `"MySQL"`, `"PostgreSQL"`, `"Oracle"`).
   async fn product_name(&self) -> Result<String>;

   /// Run a mutating statement; returns the affected-row count.
   async fn execute(&self, sql: &str, values: &[JsonValue]) -> Result<u64>;

   /// Run a read statement; returns all matching rows.
   async fn fetch_all(&self, sql: &str, values: &[JsonValue]) -> Result<Vec<Row>>;

   /// Run a single-value read statement (`COUNT(*)` and friends); returns
   /// the scalar in the first column of the first row.
   async fn fetch_scalar(&self, sql: &str, values: &[JsonValue]) -> Result<i64>;
}
