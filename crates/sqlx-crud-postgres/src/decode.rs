//! PostgreSQL row → JSON decoding.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::Value as JsonValue;
use sqlx::postgres::PgRow;
use sqlx::{Column as _, Row as _, TypeInfo as _, ValueRef as _};

use sqlx_crud_core::{Error, Result, Row};

/// Decode a row into an ordered column→value map.
pub(crate) fn row_to_json(row: &PgRow) -> Result<Row> {
   let mut out = Row::with_capacity(row.columns().len());
   for (index, column) in row.columns().iter().enumerate() {
      out.insert(column.name().to_string(), decode_column(row, index)?);
   }
   Ok(out)
}

fn decode_column(row: &PgRow, index: usize) -> Result<JsonValue> {
   let raw = row.try_get_raw(index)?;
   if raw.is_null() {
      return Ok(JsonValue::Null);
   }
   let type_name = raw.type_info().name().to_string();

   let value = match type_name.as_str() {
      "BOOL" => JsonValue::Bool(row.try_get::<bool, _>(index)?),
      "INT2" => JsonValue::from(row.try_get::<i16, _>(index)?),
      "INT4" => JsonValue::from(row.try_get::<i32, _>(index)?),
      "INT8" => JsonValue::from(row.try_get::<i64, _>(index)?),
      "FLOAT4" => JsonValue::from(row.try_get::<f32, _>(index)?),
      "FLOAT8" => JsonValue::from(row.try_get::<f64, _>(index)?),
      "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => {
         JsonValue::String(row.try_get::<String, _>(index)?)
      }
      "UUID" => JsonValue::String(row.try_get::<uuid::Uuid, _>(index)?.to_string()),
      "DATE" => JsonValue::String(row.try_get::<time::Date, _>(index)?.to_string()),
      "TIME" => JsonValue::String(row.try_get::<time::Time, _>(index)?.to_string()),
      "TIMESTAMP" => {
         JsonValue::String(row.try_get::<time::PrimitiveDateTime, _>(index)?.to_string())
      }
      "TIMESTAMPTZ" => {
         JsonValue::String(row.try_get::<time::OffsetDateTime, _>(index)?.to_string())
      }
      "JSON" | "JSONB" => row.try_get::<JsonValue, _>(index)?,
      "BYTEA" => JsonValue::String(BASE64.encode(row.try_get::<Vec<u8>, _>(index)?)),
      other => return Err(Error::UnsupportedDatatype(other.to_string())),
   };
   Ok(value)
}
