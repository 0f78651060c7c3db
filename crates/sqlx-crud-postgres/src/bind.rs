//! JSON value → PostgreSQL parameter binding.

use serde_json::Value as JsonValue;
use sqlx::Postgres;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::types::Json;

/// Bind one JSON value to the next numbered parameter.
///
/// Unsigned values past i64::MAX have no native PostgreSQL integer type
/// and degrade to f64; arrays and objects bind as JSONB documents.
pub(crate) fn bind_value<'q>(
   query: Query<'q, Postgres, PgArguments>,
   value: JsonValue,
) -> Query<'q, Postgres, PgArguments> {
   match value {
      JsonValue::Null => query.bind(None::<String>),
      JsonValue::Bool(value) => query.bind(value),
      JsonValue::Number(number) => {
         if let Some(value) = number.as_i64() {
            query.bind(value)
         } else {
            query.bind(number.as_f64().unwrap_or(f64::NAN))
         }
      }
      JsonValue::String(value) => query.bind(value),
      value @ (JsonValue::Array(_) | JsonValue::Object(_)) => query.bind(Json(value)),
   }
}
