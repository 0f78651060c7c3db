//! # sqlx-crud-postgres
//!
//! The PostgreSQL face of the sqlx-crud toolkit: an [`Executor`] over a
//! sqlx [`PgPool`]. The core emits positional `?` parameters; PostgreSQL
//! only accepts numbered `$N` placeholders, so every statement passes
//! through the quote-aware renumbering rewrite before it is bound.

mod bind;
mod decode;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use sqlx::Row as _;

use sqlx_crud_core::params::number_placeholders;
use sqlx_crud_core::{Executor, Result, Row};

/// Parameterized-execution primitive over a PostgreSQL connection pool.
pub struct PgExecutor {
   pool: PgPool,
}

impl PgExecutor {
   /// Wrap an existing connection pool.
   pub fn new(pool: PgPool) -> Self {
      Self { pool }
   }

   /// The underlying pool.
   pub fn pool(&self) -> &PgPool {
      &self.pool
   }
}

#[async_trait]
impl Executor for PgExecutor {
   async fn product_name(&self) -> Result<String> {
      Ok("PostgreSQL".to_string())
   }

   async fn execute(&self, sql: &str, values: &[JsonValue]) -> Result<u64> {
      let sql = number_placeholders(sql);
      let mut query = sqlx::query(&sql);
      for value in values {
         query = bind::bind_value(query, value.clone());
      }
      let result = query.execute(&self.pool).await?;
      Ok(result.rows_affected())
   }

   async fn fetch_all(&self, sql: &str, values: &[JsonValue]) -> Result<Vec<Row>> {
      let sql = number_placeholders(sql);
      let mut query = sqlx::query(&sql);
      for value in values {
         query = bind::bind_value(query, value.clone());
      }
      let rows = query.fetch_all(&self.pool).await?;
      rows.iter().map(decode::row_to_json).collect()
   }

   async fn fetch_scalar(&self, sql: &str, values: &[JsonValue]) -> Result<i64> {
      let sql = number_placeholders(sql);
      let mut query = sqlx::query(&sql);
      for value in values {
         query = bind::bind_value(query, value.clone());
      }
      let row = query.fetch_one(&self.pool).await?;
      Ok(row.try_get::<i64, _>(0)?)
   }
}

#[cfg(test)]
mod tests {
   use sqlx_crud_core::params::number_placeholders;

   // The rewrite itself is covered in the core; these pin the statement
   // shapes this executor actually sends.

   #[test]
   fn page_statement_renumbers_in_order() {
      assert_eq!(
         number_placeholders("SELECT * FROM t WHERE category = ? LIMIT 20 OFFSET 40"),
         "SELECT * FROM t WHERE category = $1 LIMIT 20 OFFSET 40"
      );
   }

   #[test]
   fn expanded_in_list_renumbers_every_marker() {
      assert_eq!(
         number_placeholders("DELETE FROM t WHERE id IN (?, ?, ?)"),
         "DELETE FROM t WHERE id IN ($1, $2, $3)"
      );
   }
}
