//! # sqlx-crud-mysql
//!
//! The MySQL face of the sqlx-crud toolkit: an [`Executor`] over a sqlx
//! [`MySqlPool`]. Statements arrive from the core with positional `?`
//! parameters — exactly MySQL's native placeholder grammar — so execution
//! is bind-and-run with no text rewriting.

mod bind;
mod decode;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::MySqlPool;
use sqlx::Row as _;

use sqlx_crud_core::{Executor, Result, Row};

/// Parameterized-execution primitive over a MySQL connection pool.
///
/// Pooling itself belongs to sqlx; this type only adapts binding and row
/// decoding to the toolkit's JSON value model.
pub struct MySqlExecutor {
   pool: MySqlPool,
}

impl MySqlExecutor {
   /// Wrap an existing connection pool.
   pub fn new(pool: MySqlPool) -> Self {
      Self { pool }
   }

   /// The underlying pool.
   pub fn pool(&self) -> &MySqlPool {
      &self.pool
   }
}

#[async_trait]
impl Executor for MySqlExecutor {
   async fn product_name(&self) -> Result<String> {
      // The pool is typed to one backend; no metadata round trip needed.
      Ok("MySQL".to_string())
   }

   async fn execute(&self, sql: &str, values: &[JsonValue]) -> Result<u64> {
      let mut query = sqlx::query(sql);
      for value in values {
         query = bind::bind_value(query, value.clone());
      }
      let result = query.execute(&self.pool).await?;
      Ok(result.rows_affected())
   }

   async fn fetch_all(&self, sql: &str, values: &[JsonValue]) -> Result<Vec<Row>> {
      let mut query = sqlx::query(sql);
      for value in values {
         query = bind::bind_value(query, value.clone());
      }
      let rows = query.fetch_all(&self.pool).await?;
      rows.iter().map(decode::row_to_json).collect()
   }

   async fn fetch_scalar(&self, sql: &str, values: &[JsonValue]) -> Result<i64> {
      let mut query = sqlx::query(sql);
      for value in values {
         query = bind::bind_value(query, value.clone());
      }
      let row = query.fetch_one(&self.pool).await?;
      Ok(row.try_get::<i64, _>(0)?)
   }
}
