//! JSON value → MySQL parameter binding.

use serde_json::Value as JsonValue;
use sqlx::MySql;
use sqlx::mysql::MySqlArguments;
use sqlx::query::Query;
use sqlx::types::Json;

/// Bind one JSON value to the next positional parameter.
///
/// Numbers bind as the narrowest of i64/u64/f64 that holds them; arrays
/// and objects bind as JSON documents.
pub(crate) fn bind_value<'q>(
   query: Query<'q, MySql, MySqlArguments>,
   value: JsonValue,
) -> Query<'q, MySql, MySqlArguments> {
   match value {
      JsonValue::Null => query.bind(None::<String>),
      JsonValue::Bool(value) => query.bind(value),
      JsonValue::Number(number) => {
         if let Some(value) = number.as_i64() {
            query.bind(value)
         } else if let Some(value) = number.as_u64() {
            query.bind(value)
         } else {
            query.bind(number.as_f64().unwrap_or(f64::NAN))
         }
      }
      JsonValue::String(value) => query.bind(value),
      value @ (JsonValue::Array(_) | JsonValue::Object(_)) => query.bind(Json(value)),
   }
}
