//! MySQL row → JSON decoding.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::Value as JsonValue;
use sqlx::mysql::MySqlRow;
use sqlx::{Column as _, Row as _, TypeInfo as _, ValueRef as _};

use sqlx_crud_core::{Error, Result, Row};

/// Decode a row into an ordered column→value map.
pub(crate) fn row_to_json(row: &MySqlRow) -> Result<Row> {
   let mut out = Row::with_capacity(row.columns().len());
   for (index, column) in row.columns().iter().enumerate() {
      out.insert(column.name().to_string(), decode_column(row, index)?);
   }
   Ok(out)
}

fn decode_column(row: &MySqlRow, index: usize) -> Result<JsonValue> {
   let raw = row.try_get_raw(index)?;
   if raw.is_null() {
      return Ok(JsonValue::Null);
   }
   let type_name = raw.type_info().name().to_string();

   let value = match type_name.as_str() {
      "BOOLEAN" => JsonValue::Bool(row.try_get::<bool, _>(index)?),
      "TINYINT" => JsonValue::from(row.try_get::<i8, _>(index)?),
      "SMALLINT" => JsonValue::from(row.try_get::<i16, _>(index)?),
      "MEDIUMINT" | "INT" => JsonValue::from(row.try_get::<i32, _>(index)?),
      "BIGINT" => JsonValue::from(row.try_get::<i64, _>(index)?),
      "TINYINT UNSIGNED" => JsonValue::from(row.try_get::<u8, _>(index)?),
      "SMALLINT UNSIGNED" | "YEAR" => JsonValue::from(row.try_get::<u16, _>(index)?),
      "MEDIUMINT UNSIGNED" | "INT UNSIGNED" => JsonValue::from(row.try_get::<u32, _>(index)?),
      "BIGINT UNSIGNED" | "BIT" => JsonValue::from(row.try_get::<u64, _>(index)?),
      "FLOAT" => JsonValue::from(row.try_get::<f32, _>(index)?),
      "DOUBLE" => JsonValue::from(row.try_get::<f64, _>(index)?),
      // The wire representation of DECIMAL is text; decode past the type
      // check and keep the exact digits.
      "DECIMAL" => JsonValue::String(row.try_get_unchecked::<String, _>(index)?),
      "CHAR" | "VARCHAR" | "TEXT" | "TINYTEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM" | "SET" => {
         JsonValue::String(row.try_get::<String, _>(index)?)
      }
      "DATE" => JsonValue::String(row.try_get::<time::Date, _>(index)?.to_string()),
      "TIME" => JsonValue::String(row.try_get::<time::Time, _>(index)?.to_string()),
      "DATETIME" => {
         JsonValue::String(row.try_get::<time::PrimitiveDateTime, _>(index)?.to_string())
      }
      "TIMESTAMP" => {
         JsonValue::String(row.try_get::<time::OffsetDateTime, _>(index)?.to_string())
      }
      "JSON" => row.try_get::<JsonValue, _>(index)?,
      "BINARY" | "VARBINARY" | "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
         JsonValue::String(BASE64.encode(row.try_get::<Vec<u8>, _>(index)?))
      }
      other => return Err(Error::UnsupportedDatatype(other.to_string())),
   };
   Ok(value)
}
