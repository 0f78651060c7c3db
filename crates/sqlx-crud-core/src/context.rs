//! The context facade composing dialect, builders, planner, and executor.

use std::any::type_name;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map as JsonMap, Value as JsonValue};
use tokio::sync::OnceCell;
use tracing::debug;
use uuid::Uuid;

use sqlx_crud_dialect::Dialect;

use crate::builder::{self, OrderColumn, get_ci};
use crate::error::{Error, Result};
use crate::executor::{Executor, Row};
use crate::ident::validate_identifier;
use crate::mapping::{MappingCache, Record, TableMapping};
use crate::page::{self, PageResult};
use crate::params;

/// A database context: one executor plus the two per-context caches (the
/// resolved dialect and the per-type table mappings).
///
/// The context carries no other state — every operation is a pure function
/// of its inputs and those caches, so one context is safely shared across
/// concurrent callers.
pub struct DbContext<E: Executor> {
   executor: E,
   dialect: OnceCell<Dialect>,
   mappings: MappingCache,
}

impl<E: Executor> DbContext<E> {
   /// Wrap an executor in a fresh context.
   pub fn new(executor: E) -> Self {
      Self {
         executor,
         dialect: OnceCell::new(),
         mappings: MappingCache::default(),
      }
   }

   /// The underlying execution primitive.
   pub fn executor(&self) -> &E {
      &self.executor
   }

   /// The dialect of the backing database.
   ///
   /// Resolved from the executor's product name at most once per context;
   /// concurrent first callers share a single resolution. An unrecognized
   /// product is a fatal configuration error — there is no default
   /// dialect.
   pub async fn dialect(&self) -> Result<Dialect> {
      self
         .dialect
         .get_or_try_init(|| async {
            let name = self.executor.product_name().await?;
            Dialect::resolve(&name).ok_or(Error::UnknownDatabaseProduct { name })
         })
         .await
         .copied()
   }

   // ─── raw statement surface ───

   /// Run a mutating statement with positional parameters.
   pub async fn execute(&self, sql: &str, values: &[JsonValue]) -> Result<u64> {
      debug!(sql, ?values, "execute");
      self.executor.execute(sql, values).await
   }

   /// Run a read statement and return all matching rows.
   pub async fn fetch_all(&self, sql: &str, values: &[JsonValue]) -> Result<Vec<Row>> {
      debug!(sql, ?values, "fetch_all");
      self.executor.fetch_all(sql, values).await
   }

   /// Run a read statement expected to match zero or one row.
   pub async fn fetch_one(&self, sql: &str, values: &[JsonValue]) -> Result<Option<Row>> {
      let mut rows = self.fetch_all(sql, values).await?;
      match rows.len() {
         0 => Ok(None),
         1 => Ok(rows.pop()),
         count => Err(Error::MultipleRowsReturned(count)),
      }
   }

   /// [`fetch_all`](DbContext::fetch_all) with rows converted to a typed
   /// record through serde (column names must match field names).
   pub async fn fetch_all_as<T: DeserializeOwned>(
      &self,
      sql: &str,
      values: &[JsonValue],
   ) -> Result<Vec<T>> {
      let rows = self.fetch_all(sql, values).await?;
      rows.into_iter().map(row_to_record).collect()
   }

   /// [`fetch_one`](DbContext::fetch_one) with the row converted to a
   /// typed record through serde.
   pub async fn fetch_one_as<T: DeserializeOwned>(
      &self,
      sql: &str,
      values: &[JsonValue],
   ) -> Result<Option<T>> {
      match self.fetch_one(sql, values).await? {
         Some(row) => Ok(Some(row_to_record(row)?)),
         None => Ok(None),
      }
   }

   /// Total row count of `sql`, computed by wrapping it in
   /// `SELECT COUNT(*) FROM ( ... ) tmp` with the same bound values. The
   /// derived-table alias is accepted by every supported dialect, so the
   /// wrap needs no dialect dispatch.
   pub async fn count(&self, sql: &str, values: &[JsonValue]) -> Result<u64> {
      let count_sql = format!("SELECT COUNT(*) FROM ( {sql} ) tmp");
      debug!(sql = %count_sql, ?values, "count");
      let total = self.executor.fetch_scalar(&count_sql, values).await?;
      Ok(total.max(0) as u64)
   }

   /// Whether `sql` matches at least one row.
   pub async fn exists(&self, sql: &str, values: &[JsonValue]) -> Result<bool> {
      Ok(self.count(sql, values).await? > 0)
   }

   /// Run `sql` as a bounded page.
   ///
   /// The total is counted first with the same bound values; a zero total,
   /// a zero page size, or a page number past the last page yields an
   /// empty result (never an error) without executing the rewritten
   /// statement. Otherwise the dialect rewrites the statement to the
   /// `[offset, offset + page_size)` window and the rows come back along
   /// with the pagination metadata.
   pub async fn fetch_page(
      &self,
      sql: &str,
      page_num: u64,
      page_size: u64,
      values: &[JsonValue],
   ) -> Result<PageResult<Row>> {
      let total = self.count(sql, values).await?;
      let (page_num, pages, window) = page::plan(page_num, page_size, total);
      let records = match window {
         Some(window) => {
            let paged = self.dialect().await?.page_sql(sql, window.offset, window.limit);
            self.fetch_all(&paged, values).await?
         }
         None => Vec::new(),
      };
      Ok(PageResult::new(page_num, page_size, total, pages, records))
   }

   /// [`fetch_page`](DbContext::fetch_page) with rows converted to typed
   /// records through serde.
   pub async fn fetch_page_as<T: DeserializeOwned>(
      &self,
      sql: &str,
      page_num: u64,
      page_size: u64,
      values: &[JsonValue],
   ) -> Result<PageResult<T>> {
      let page = self.fetch_page(sql, page_num, page_size, values).await?;
      try_map_page(page, row_to_record)
   }

   // ─── table surface ───

   /// Insert one column map. An empty map is a no-op reporting 0 rows.
   pub async fn insert(&self, table: &str, row: &Row) -> Result<u64> {
      match builder::insert_sql(table, row)? {
         Some((sql, values)) => self.execute(&sql, &values).await,
         None => Ok(0),
      }
   }

   /// Insert many rows sharing one column list, one statement execution
   /// per row. Rows missing a column bind NULL for it. Empty columns or
   /// rows are a no-op.
   pub async fn insert_many(&self, table: &str, columns: &[&str], rows: &[Row]) -> Result<u64> {
      if rows.is_empty() {
         return Ok(0);
      }
      let Some(sql) = builder::insert_many_sql(table, columns)? else {
         return Ok(0);
      };
      let mut affected = 0;
      for row in rows {
         let values: Vec<JsonValue> = columns
            .iter()
            .map(|column| get_ci(row, column).cloned().unwrap_or(JsonValue::Null))
            .collect();
         affected += self.execute(&sql, &values).await?;
      }
      Ok(affected)
   }

   /// Update rows matching `filter`. No-op when either map is empty or
   /// when the SET clause collapses after identical-entry exclusion.
   pub async fn update(&self, table: &str, set: &Row, filter: &Row) -> Result<u64> {
      match builder::update_sql(table, set, filter)? {
         Some((sql, values)) => self.execute(&sql, &values).await,
         None => Ok(0),
      }
   }

   /// Delete rows matching `filter`. An empty predicate map is a no-op —
   /// an unconditional DELETE is never issued from one.
   pub async fn delete(&self, table: &str, filter: &Row) -> Result<u64> {
      match builder::delete_sql(table, filter)? {
         Some((sql, values)) => self.execute(&sql, &values).await,
         None => Ok(0),
      }
   }

   /// Delete rows whose `column` is in `values`, partitioning large
   /// collections into safe `IN` chunks. Empty collection is a no-op.
   pub async fn delete_in(&self, table: &str, column: &str, values: &[JsonValue]) -> Result<u64> {
      match builder::delete_in_sql(table, column, values)? {
         Some((sql, named)) => {
            let (sql, values) = params::expand_named(&sql, &named)?;
            self.execute(&sql, &values).await
         }
         None => Ok(0),
      }
   }

   /// Select all rows matching `filter` (all rows of the table when the
   /// filter is empty), optionally ordered.
   pub async fn find_all(
      &self,
      table: &str,
      filter: &Row,
      order: &[OrderColumn],
   ) -> Result<Vec<Row>> {
      let (sql, values) = builder::select_sql(table, filter, order)?;
      self.fetch_all(&sql, &values).await
   }

   /// Select the zero-or-one row matching `filter`. An empty filter is a
   /// no-op returning `None` rather than an arbitrary row.
   pub async fn find_one(&self, table: &str, filter: &Row) -> Result<Option<Row>> {
      if filter.is_empty() {
         return Ok(None);
      }
      let (sql, values) = builder::select_sql(table, filter, &[])?;
      self.fetch_one(&sql, &values).await
   }

   /// Select rows whose `column` is in `values`. Empty collection yields
   /// an empty result without executing anything.
   pub async fn find_in(
      &self,
      table: &str,
      column: &str,
      values: &[JsonValue],
      order: &[OrderColumn],
   ) -> Result<Vec<Row>> {
      match builder::select_in_sql(table, column, values, order)? {
         Some((sql, named)) => {
            let (sql, values) = params::expand_named(&sql, &named)?;
            self.fetch_all(&sql, &values).await
         }
         None => Ok(Vec::new()),
      }
   }

   /// Page through rows matching `filter`, composing the predicate builder
   /// with the page planner.
   pub async fn page(
      &self,
      table: &str,
      filter: &Row,
      page_num: u64,
      page_size: u64,
      order: &[OrderColumn],
   ) -> Result<PageResult<Row>> {
      let (sql, values) = builder::select_sql(table, filter, order)?;
      self.fetch_page(&sql, page_num, page_size, &values).await
   }

   /// Rows of the subtree rooted at `start_value`: the seed row plus every
   /// transitive child joined through `join_column`.
   pub async fn descendants(
      &self,
      table: &str,
      start_column: &str,
      start_value: JsonValue,
      join_column: &str,
   ) -> Result<Vec<Row>> {
      validate_identifier(table)?;
      validate_identifier(start_column)?;
      validate_identifier(join_column)?;
      let sql = self
         .dialect()
         .await?
         .down_recursive_sql(table, start_column, join_column)?;
      self.fetch_all(&sql, std::slice::from_ref(&start_value)).await
   }

   /// Rows on the path from `start_value` up to the root: the seed row
   /// plus every transitive parent.
   pub async fn ancestors(
      &self,
      table: &str,
      start_column: &str,
      start_value: JsonValue,
      join_column: &str,
   ) -> Result<Vec<Row>> {
      validate_identifier(table)?;
      validate_identifier(start_column)?;
      validate_identifier(join_column)?;
      let sql = self
         .dialect()
         .await?
         .up_recursive_sql(table, start_column, join_column)?;
      self.fetch_all(&sql, std::slice::from_ref(&start_value)).await
   }

   /// The physical column names of `table`, in declaration order, read
   /// from the dialect's metadata catalog.
   pub async fn table_columns(&self, table: &str) -> Result<Vec<String>> {
      validate_identifier(table)?;
      let sql = self.dialect().await?.column_sql(table);
      let rows = self.fetch_all(&sql, &[]).await?;
      let mut columns = Vec::with_capacity(rows.len());
      for row in rows {
         if let Some(JsonValue::String(name)) = row.into_values().next() {
            columns.push(name);
         }
      }
      Ok(columns)
   }

   // ─── record surface ───

   /// The validated table mapping for `T`, memoized per type.
   pub fn mapping<T: Record>(&self) -> Result<Arc<TableMapping>> {
      self.mappings.get::<T>()
   }

   /// Insert a record.
   ///
   /// When the record carries no key value, a mapping with a generated key
   /// assigns a fresh UUID string and writes it back into the record;
   /// otherwise the key column is left out of the statement so the backend
   /// may assign its own.
   pub async fn insert_record<T>(&self, record: &mut T) -> Result<u64>
   where
      T: Record + Serialize + DeserializeOwned,
   {
      let mapping = self.mapping::<T>()?;
      let mut obj = to_object(record, type_name::<T>())?;
      let key_blank = obj.get(mapping.key_field()).is_none_or(value_is_blank);

      if key_blank && mapping.has_generated_key() {
         obj.insert(
            mapping.key_field().to_string(),
            JsonValue::String(Uuid::new_v4().to_string()),
         );
         *record = serde_json::from_value(JsonValue::Object(obj.clone()))?;
      }

      let mut row = record_columns(&obj, &mapping, false);
      if key_blank && !mapping.has_generated_key() {
         row.shift_remove(mapping.key_column());
      }
      self.insert(mapping.table(), &row).await
   }

   /// Update a record by its key. With `skip_null`, null and blank-string
   /// fields stay out of the SET clause so partial records only touch the
   /// columns they carry.
   pub async fn update_record<T>(&self, record: &T, skip_null: bool) -> Result<u64>
   where
      T: Record + Serialize,
   {
      let mapping = self.mapping::<T>()?;
      let obj = to_object(record, type_name::<T>())?;
      let key_value = record_key(&obj, &mapping, type_name::<T>())?;

      let mut set = record_columns(&obj, &mapping, skip_null);
      set.shift_remove(mapping.key_column());
      let filter = Row::from_iter([(mapping.key_column().to_string(), key_value)]);
      self.update(mapping.table(), &set, &filter).await
   }

   /// Insert the record when its key is absent or unknown to the table,
   /// update it otherwise.
   pub async fn save_record<T>(&self, record: &mut T) -> Result<u64>
   where
      T: Record + Serialize + DeserializeOwned,
   {
      let mapping = self.mapping::<T>()?;
      let obj = to_object(record, type_name::<T>())?;
      let key_value = obj
         .get(mapping.key_field())
         .filter(|value| !value_is_blank(value))
         .cloned();

      match key_value {
         None => self.insert_record(record).await,
         Some(value) => {
            let filter = Row::from_iter([(mapping.key_column().to_string(), value)]);
            let (sql, values) = builder::select_sql(mapping.table(), &filter, &[])?;
            if self.count(&sql, &values).await? > 0 {
               self.update_record(record, false).await
            } else {
               self.insert_record(record).await
            }
         }
      }
   }

   /// Delete a record by its key value.
   pub async fn delete_record<T>(&self, record: &T) -> Result<u64>
   where
      T: Record + Serialize,
   {
      let mapping = self.mapping::<T>()?;
      let obj = to_object(record, type_name::<T>())?;
      let key_value = obj
         .get(mapping.key_field())
         .cloned()
         .unwrap_or(JsonValue::Null);
      let filter = Row::from_iter([(mapping.key_column().to_string(), key_value)]);
      self.delete(mapping.table(), &filter).await
   }

   /// Delete the row of `T` with the given key value.
   pub async fn delete_by_id<T: Record>(&self, id: JsonValue) -> Result<u64> {
      let mapping = self.mapping::<T>()?;
      let filter = Row::from_iter([(mapping.key_column().to_string(), id)]);
      self.delete(mapping.table(), &filter).await
   }

   /// Delete the rows of `T` whose keys are in `ids`, chunked safely.
   /// Empty collection is a no-op.
   pub async fn delete_by_ids<T: Record>(&self, ids: &[JsonValue]) -> Result<u64> {
      let mapping = self.mapping::<T>()?;
      self.delete_in(mapping.table(), mapping.key_column(), ids).await
   }

   /// Fetch the record of `T` with the given key value.
   pub async fn find_by_id<T>(&self, id: JsonValue) -> Result<Option<T>>
   where
      T: Record + DeserializeOwned,
   {
      let mapping = self.mapping::<T>()?;
      let filter = Row::from_iter([(mapping.key_column().to_string(), id)]);
      match self.find_one(mapping.table(), &filter).await? {
         Some(row) => Ok(Some(record_from_row(row, &mapping)?)),
         None => Ok(None),
      }
   }

   /// Fetch the records of `T` whose keys are in `ids`. Empty collection
   /// yields an empty result without executing anything.
   pub async fn find_by_ids<T>(&self, ids: &[JsonValue], order: &[OrderColumn]) -> Result<Vec<T>>
   where
      T: Record + DeserializeOwned,
   {
      let mapping = self.mapping::<T>()?;
      let rows = self
         .find_in(mapping.table(), mapping.key_column(), ids, order)
         .await?;
      rows
         .into_iter()
         .map(|row| record_from_row(row, &mapping))
         .collect()
   }

   /// Query by example: the example's non-null fields become an equality
   /// predicate.
   pub async fn find_matching<T>(&self, example: &T, order: &[OrderColumn]) -> Result<Vec<T>>
   where
      T: Record + Serialize + DeserializeOwned,
   {
      let mapping = self.mapping::<T>()?;
      let obj = to_object(example, type_name::<T>())?;
      let filter = record_columns(&obj, &mapping, true);
      let rows = self.find_all(mapping.table(), &filter, order).await?;
      rows
         .into_iter()
         .map(|row| record_from_row(row, &mapping))
         .collect()
   }

   /// Query by example with pagination.
   pub async fn page_matching<T>(
      &self,
      example: &T,
      page_num: u64,
      page_size: u64,
      order: &[OrderColumn],
   ) -> Result<PageResult<T>>
   where
      T: Record + Serialize + DeserializeOwned,
   {
      let mapping = self.mapping::<T>()?;
      let obj = to_object(example, type_name::<T>())?;
      let filter = record_columns(&obj, &mapping, true);
      let page = self
         .page(mapping.table(), &filter, page_num, page_size, order)
         .await?;
      try_map_page(page, |row| record_from_row(row, &mapping))
   }
}

fn try_map_page<T, R>(
   page: PageResult<T>,
   f: impl FnMut(T) -> Result<R>,
) -> Result<PageResult<R>> {
   let PageResult {
      page_num,
      page_size,
      total,
      pages,
      row_start,
      row_end,
      records,
   } = page;
   let records = records.into_iter().map(f).collect::<Result<Vec<R>>>()?;
   Ok(PageResult {
      page_num,
      page_size,
      total,
      pages,
      row_start,
      row_end,
      records,
   })
}

fn to_object<T: Serialize>(
   record: &T,
   type_name: &'static str,
) -> Result<JsonMap<String, JsonValue>> {
   match serde_json::to_value(record)? {
      JsonValue::Object(map) => Ok(map),
      _ => Err(Error::Mapping {
         type_name,
         reason: "record must serialize to an object".to_string(),
      }),
   }
}

/// Null, or a string that is empty after trimming.
fn value_is_blank(value: &JsonValue) -> bool {
   match value {
      JsonValue::Null => true,
      JsonValue::String(text) => text.trim().is_empty(),
      _ => false,
   }
}

/// Project a serialized record onto its physical columns, in the
/// mapping's declaration order.
fn record_columns(
   obj: &JsonMap<String, JsonValue>,
   mapping: &TableMapping,
   skip_blank: bool,
) -> Row {
   let mut row = Row::new();
   for (field, column) in mapping.columns() {
      if let Some(value) = obj.get(field) {
         if skip_blank && value_is_blank(value) {
            continue;
         }
         row.insert(column.clone(), value.clone());
      }
   }
   row
}

fn record_key(
   obj: &JsonMap<String, JsonValue>,
   mapping: &TableMapping,
   type_name: &'static str,
) -> Result<JsonValue> {
   obj.get(mapping.key_field())
      .filter(|value| !value_is_blank(value))
      .cloned()
      .ok_or_else(|| Error::Mapping {
         type_name,
         reason: format!("record has no value for key field '{}'", mapping.key_field()),
      })
}

/// Translate a physical row back to a record, column→field, tolerating
/// the case changes drivers apply to unquoted identifiers.
fn record_from_row<T: DeserializeOwned>(row: Row, mapping: &TableMapping) -> Result<T> {
   let mut obj = JsonMap::with_capacity(mapping.columns().len());
   for (field, column) in mapping.columns() {
      if let Some(value) = get_ci(&row, column) {
         obj.insert(field.clone(), value.clone());
      }
   }
   Ok(serde_json::from_value(JsonValue::Object(obj))?)
}

/// Direct row→record conversion for raw-SQL results: column names are
/// taken as field names.
fn row_to_record<T: DeserializeOwned>(row: Row) -> Result<T> {
   let obj: JsonMap<String, JsonValue> = row.into_iter().collect();
   Ok(serde_json::from_value(JsonValue::Object(obj))?)
}
